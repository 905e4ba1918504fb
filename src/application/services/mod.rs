pub mod retry;
pub mod router;
pub mod runner;

pub use retry::{RetryPolicy, RetryingChannel};
pub use router::{AlertRouter, RouterOptions};
pub use runner::{JobContext, JobOutcome, JobRunner, JobState};
