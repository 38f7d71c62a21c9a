//! Entity structs shared by both store backends.
//!
//! Each struct is `FromRow` for the Postgres backend and `Serialize` for
//! API responses; the in-memory backend constructs the same types directly.

pub mod history;
pub mod task;
