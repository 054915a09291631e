pub mod error;
pub mod retry;
pub mod telemetry;

pub use error::{Error, Result};
pub use retry::{retry_transient, RetryError, RetryPolicy, Transient};
pub use telemetry::init_tracing;
