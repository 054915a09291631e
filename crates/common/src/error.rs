use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),

    #[error("Tracing initialisation failed: {0}")]
    Telemetry(String),
}

pub type Result<T> = std::result::Result<T, Error>;
