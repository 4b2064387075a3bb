use crate::config::AppConfig;
use std::sync::Arc;

/// Key/value view over the loaded configuration
pub trait ConfigProvider: Send + Sync {
    /// Get a specific config value by key
    fn get_config_raw(&self, key: &str) -> Option<serde_json::Value>;
}

/// Implementation of ConfigProvider that uses AppConfig
pub struct AppConfigProvider(Arc<AppConfig>);

impl AppConfigProvider {
    pub fn new(config: AppConfig) -> Self {
        Self(Arc::new(config))
    }

    pub fn from_arc(config: Arc<AppConfig>) -> Self {
        Self(config)
    }

    pub fn inner(&self) -> &AppConfig {
        &self.0
    }
}

impl ConfigProvider for AppConfigProvider {
    fn get_config_raw(&self, key: &str) -> Option<serde_json::Value> {
        match key {
            "server" => serde_json::to_value(&self.0.server).ok(),
            "logging" => self
                .0
                .logging
                .as_ref()
                .and_then(|v| serde_json::to_value(v).ok()),
            _ => self.0.setting(key).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_and_sections_are_exposed() {
        let mut config = AppConfig::default();
        config
            .settings
            .insert("VIA_ROUTES_MODULE".into(), json!("site.routes"));
        let provider = AppConfigProvider::new(config);

        assert_eq!(
            provider.get_config_raw("VIA_ROUTES_MODULE"),
            Some(json!("site.routes"))
        );
        assert_eq!(
            provider.get_config_raw("server").unwrap()["port"],
            json!(8080)
        );
        assert_eq!(provider.get_config_raw("UNKNOWN"), None);
    }
}
