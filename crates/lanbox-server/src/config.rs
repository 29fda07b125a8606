use anyhow::{Context, Result};
use tracing::warn;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_STORE_URI: &str = "sqlite://lanbox.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_uri: String,
    pub max_upload_bytes: Option<usize>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", v))?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = get("MAX_UPLOAD_BYTES")
            .map(|v| {
                v.trim()
                    .parse()
                    .with_context(|| format!("MAX_UPLOAD_BYTES must be a byte count, got '{}'", v))
            })
            .transpose()?;

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
            store_uri: store_uri(&get),
            max_upload_bytes,
        })
    }
}

/// `STORE_URI`, else `MONGO_URI` (so a leftover Mongo deployment fails
/// loudly on its scheme instead of falling back), else the default.
fn store_uri<G>(get: G) -> String
where
    G: Fn(&str) -> Option<String>,
{
    match (get("STORE_URI"), get("MONGO_URI")) {
        (Some(uri), Some(_)) => {
            warn!("Both STORE_URI and MONGO_URI are set; ignoring MONGO_URI");
            uri
        }
        (Some(uri), None) | (None, Some(uri)) => uri,
        (None, None) => DEFAULT_STORE_URI.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.store_uri, "sqlite://lanbox.db");
        assert_eq!(cfg.max_upload_bytes, None);
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("STORE_URI", "memory://"),
            ("MAX_UPLOAD_BYTES", "1048576"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.store_uri, "memory://");
        assert_eq!(cfg.max_upload_bytes, Some(1_048_576));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let cfg = config(&[("PORT", ""), ("STORE_URI", "  ")]).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.store_uri, "sqlite://lanbox.db");
    }

    #[test]
    fn mongo_uri_is_read_when_store_uri_is_unset() {
        let cfg = config(&[("MONGO_URI", "mongodb://db:27017/app")]).unwrap();
        assert_eq!(cfg.store_uri, "mongodb://db:27017/app");
    }

    #[test]
    fn store_uri_wins_over_mongo_uri() {
        let cfg = config(&[("STORE_URI", "memory://"), ("MONGO_URI", "mongodb://db")]).unwrap();
        assert_eq!(cfg.store_uri, "memory://");
    }

    #[test]
    fn invalid_port_is_an_error() {
        assert!(config(&[("PORT", "http")]).is_err());
        assert!(config(&[("PORT", "70000")]).is_err());
        assert!(config(&[("MAX_UPLOAD_BYTES", "lots")]).is_err());
    }
}
