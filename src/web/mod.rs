//! Web server module for cover-validator
//!
//! Exposes the cover check as a small REST API.
//!
//! # Features
//!
//! - Multipart cover upload (`cover_file` field, PNG or PDF)
//! - Synchronous JSON report per request
//! - Health check with tool availability
//!
//! # Usage
//!
//! Enable the `web` feature and use the `serve` subcommand:
//!
//! ```bash
//! cargo build --features web
//! cover-validator serve --port 5000
//! ```

mod routes;
mod server;

pub use routes::{api_routes, AppState, HealthResponse, ToolStatus, ValidationResponse};
pub use server::{ServerConfig, WebServer};

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default upload limit in bytes (50 MB)
pub const DEFAULT_UPLOAD_LIMIT: usize = 50 * 1024 * 1024;

/// Multipart field carrying the cover
pub const COVER_FIELD: &str = "cover_file";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_PORT, 5000);
        assert_eq!(DEFAULT_BIND, "127.0.0.1");
        assert_eq!(DEFAULT_UPLOAD_LIMIT, 50 * 1024 * 1024);
        assert_eq!(COVER_FIELD, "cover_file");
    }
}
