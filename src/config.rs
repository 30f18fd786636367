use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MediLogic";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address when `MEDILOGIC_BIND` is unset or invalid.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Admin token used when `ADMIN_TOKEN` is unset. Only suitable for local use.
pub const DEFAULT_ADMIN_TOKEN: &str = "admin123";

/// Reports directory when `MEDILOGIC_REPORTS_DIR` is unset.
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medilogic_lib=info,medilogic=info,tower_http=warn"
}

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub admin_token: String,
    pub reports_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            admin_token: DEFAULT_ADMIN_TOKEN.to_string(),
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
        }
    }
}

impl ServerConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = match get("MEDILOGIC_BIND") {
            Some(raw) => raw.trim().parse::<SocketAddr>().unwrap_or_else(|e| {
                tracing::warn!(value = %raw, error = %e, "Invalid MEDILOGIC_BIND, using default");
                default_bind()
            }),
            None => default_bind(),
        };

        let admin_token = get("ADMIN_TOKEN").unwrap_or_else(|| {
            tracing::warn!("ADMIN_TOKEN not set, using the built-in default token");
            DEFAULT_ADMIN_TOKEN.to_string()
        });

        let reports_dir = get("MEDILOGIC_REPORTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR));

        Self {
            bind,
            admin_token,
            reports_dir,
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}
