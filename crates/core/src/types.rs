/// Tasks are keyed by an opaque UUID generated at submission time.
pub type TaskId = uuid::Uuid;

/// Users are identified by the UUID subject of their access token.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
