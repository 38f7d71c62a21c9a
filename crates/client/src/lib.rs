//! Polling client for the imagen generation service.
//!
//! Submits a prompt, then polls the status endpoint on a fixed interval
//! until the task reaches a terminal state, the attempt budget runs out,
//! or the session is cancelled by a newer submission.

pub mod api;
pub mod poller;
pub mod session;

pub use api::{ApiClient, ClientError};
pub use poller::{PollConfig, PollOutcome, PollProgress};
pub use session::{GenerationSession, SessionOutcome};
