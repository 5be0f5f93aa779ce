pub mod loader;

pub use loader::{load, save_last_widget};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Fetch tuning and endpoint overrides.
///
/// Endpoints live in the config file instead of being baked into the
/// widgets, so a mirror or a stub server can be substituted without a
/// rebuild. URLs are validated once at startup via [`Endpoints`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub nasa_endpoint: String,
    pub geoip_endpoint: String,
    pub ip_endpoint: String,
    pub default_query: String,
    pub default_page: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            nasa_endpoint: "https://images-api.nasa.gov/search".to_string(),
            geoip_endpoint: "https://freegeoip.app/json/".to_string(),
            ip_endpoint: "https://api.ipify.org/?format=json".to_string(),
            default_query: "moon land".to_string(),
            default_page: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub last_widget: Option<String>,
}

/// Parsed endpoint URLs, validated once at startup.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub nasa: Url,
    pub geoip: Url,
    pub ip: Url,
}

impl AppConfig {
    /// Validate and parse the configured endpoint URLs.
    ///
    /// # Errors
    /// Returns an error naming the offending endpoint if one is not a
    /// valid URL.
    pub fn endpoints(&self) -> color_eyre::Result<Endpoints> {
        let parse = |name: &str, value: &str| {
            Url::parse(value)
                .map_err(|e| color_eyre::eyre::eyre!("invalid {name} endpoint `{value}`: {e}"))
        };
        Ok(Endpoints {
            nasa: parse("NASA image search", &self.fetch.nasa_endpoint)?,
            geoip: parse("GeoIP", &self.fetch.geoip_endpoint)?,
            ip: parse("IP resolver", &self.fetch.ip_endpoint)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints_are_valid_urls() {
        let config = AppConfig::default();
        let endpoints = config.endpoints().unwrap();
        assert_eq!(endpoints.nasa.host_str(), Some("images-api.nasa.gov"));
        assert_eq!(endpoints.geoip.path(), "/json/");
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let config = AppConfig {
            fetch: FetchConfig {
                nasa_endpoint: "not a url".to_string(),
                ..FetchConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.endpoints().is_err());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = toml::from_str("[fetch]\ntimeout_secs = 3\n").unwrap();
        assert_eq!(config.fetch.timeout_secs, 3);
        assert_eq!(config.theme.name, "Catppuccin Mocha");
        assert!(config.fetch.nasa_endpoint.contains("images-api.nasa.gov"));
    }
}
