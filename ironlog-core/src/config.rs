//! Data-service configuration: which store(s) to use and how to recover.

use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    /// Local store only; never touches the network.
    Local,
    /// Remote store only; local retry governed by `fallback_to_local`.
    Remote,
    /// Remote-when-online with local cache and deferred remote sync.
    #[default]
    Hybrid,
}

impl DataSource {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(DataSource::Local),
            "remote" => Some(DataSource::Remote),
            "hybrid" => Some(DataSource::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataServiceConfig {
    pub data_source: DataSource,
    /// Retry a failed remote operation against the local store.
    pub fallback_to_local: bool,
    /// Mirror hybrid-mode writes to the remote store.
    pub sync_to_remote: bool,
}

impl Default for DataServiceConfig {
    fn default() -> Self {
        Self {
            data_source: DataSource::Hybrid,
            fallback_to_local: true,
            sync_to_remote: true,
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

impl DataServiceConfig {
    /// Read configuration from `IRONLOG_DATA_SOURCE`,
    /// `IRONLOG_FALLBACK_TO_LOCAL` and `IRONLOG_SYNC_TO_REMOTE`; anything
    /// unset keeps its default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let data_source = env::var("IRONLOG_DATA_SOURCE")
            .ok()
            .and_then(|v| DataSource::parse(&v))
            .unwrap_or(defaults.data_source);
        Self {
            data_source,
            fallback_to_local: env_flag("IRONLOG_FALLBACK_TO_LOCAL", defaults.fallback_to_local),
            sync_to_remote: env_flag("IRONLOG_SYNC_TO_REMOTE", defaults.sync_to_remote),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_hybrid_with_fallback_and_sync() {
        let config = DataServiceConfig::default();
        assert_eq!(config.data_source, DataSource::Hybrid);
        assert!(config.fallback_to_local);
        assert!(config.sync_to_remote);
    }

    #[test]
    fn data_source_parsing() {
        assert_eq!(DataSource::parse("local"), Some(DataSource::Local));
        assert_eq!(DataSource::parse("Remote"), Some(DataSource::Remote));
        assert_eq!(DataSource::parse("HYBRID"), Some(DataSource::Hybrid));
        assert_eq!(DataSource::parse("other"), None);
    }
}
