use std::path::PathBuf;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub page_size: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("EARLY_SIGNAL_DATA_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let database_url = lookup("DATABASE_URL").filter(|value| !value.trim().is_empty());

        let page_size = lookup("EARLY_SIGNAL_PAGE_SIZE")
            .and_then(|raw| match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => Some(size),
                _ => {
                    tracing::warn!(
                        page_size = %raw,
                        default = DEFAULT_PAGE_SIZE,
                        "invalid EARLY_SIGNAL_PAGE_SIZE, using default"
                    );
                    None
                }
            })
            .unwrap_or(DEFAULT_PAGE_SIZE);

        tracing::debug!(
            data_dir = %data_dir.display(),
            postgres = database_url.is_some(),
            page_size,
            "configuration loaded"
        );

        Self {
            data_dir,
            database_url,
            page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.database_url.is_none());
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("EARLY_SIGNAL_DATA_DIR", "/var/lib/early-signal"),
            ("DATABASE_URL", "postgres://localhost/early"),
            ("EARLY_SIGNAL_PAGE_SIZE", "50"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/early-signal"));
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/early"));
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn invalid_page_size_falls_back() {
        assert_eq!(config_from(&[("EARLY_SIGNAL_PAGE_SIZE", "0")]).page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config_from(&[("EARLY_SIGNAL_PAGE_SIZE", "lots")]).page_size, DEFAULT_PAGE_SIZE);
        assert!(config_from(&[("DATABASE_URL", "  ")]).database_url.is_none());
    }
}
