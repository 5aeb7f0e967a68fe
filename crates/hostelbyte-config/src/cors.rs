use std::env;

/// Origins allowed to call the API from a browser.
const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Reads the comma-separated `ALLOWED_ORIGINS` list.
    pub fn from_env() -> Self {
        let raw = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.to_string());
        Self::from_list(&raw)
    }

    pub fn from_list(raw: &str) -> Self {
        Self {
            allowed_origins: raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_list_trims_and_skips_blanks() {
        let config = CorsConfig::from_list(" https://warden.example , ,http://localhost:5173,");
        assert_eq!(
            config.allowed_origins,
            vec!["https://warden.example", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_default_origins() {
        assert_eq!(CorsConfig::from_list(DEFAULT_ORIGINS).allowed_origins.len(), 2);
    }
}
