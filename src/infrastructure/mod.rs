pub mod error;
pub mod logging;
pub mod network;

pub use error::{ErrorCategory, ReportError};
pub use logging::{setup_logging, LoggingConfig};
pub use network::{build_client, NetworkConfig};
