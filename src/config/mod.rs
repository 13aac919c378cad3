use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Service configuration for the image endpoints
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind address (default: 0.0.0.0)
    pub host: IpAddr,

    /// Bind port (default: 8000)
    pub port: u16,

    /// Root directory for originals; derivatives go under `processed/` (default: ./uploads)
    pub upload_dir: PathBuf,

    /// Maximum request body size in bytes (default: 10 MB)
    pub max_upload_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            upload_dir: PathBuf::from("./uploads"),
            max_upload_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            host: env::var("HOST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.host),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),
        }
    }

    /// Config rooted at an arbitrary directory, used by tests and tooling
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            ..Self::default()
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Upload cap in whole MB, rounded up so the limit is never understated
    pub fn max_upload_size_mb(&self) -> usize {
        self.max_upload_size.div_ceil(1024 * 1024)
    }
}
