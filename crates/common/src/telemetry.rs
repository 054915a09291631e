//! Tracing bootstrap shared by the service binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{Error, Result};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directives` is used, e.g.
/// `"golden_ami_service=debug,tower_http=debug"`.
pub fn init_tracing(default_directives: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| Error::Telemetry(e.to_string()))
}
