use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use azsql_common::{
    config::{Config, ConfigManager, GlobalConfig, GlobalConfigManager},
    constants::ARM_API_URL,
};
use tracing::trace;

/// Settings for talking to the management API, from flags and env vars
/// falling back to the global config file.
pub struct RequestContext {
    global: GlobalConfig,
    config_path: PathBuf,
    subscription_id: Option<String>,
    access_token: Option<String>,
    api_url: Option<String>,
}

impl RequestContext {
    /// Create a [`RequestContext`] from the global configuration file of `profile`,
    /// writing an empty one first if it does not exist yet.
    pub fn load_global(profile: Option<String>) -> Result<Self> {
        let mut global: Config<_, GlobalConfig> = Config::new(GlobalConfigManager::new(profile)?);
        if !global.exists() {
            trace!(path = %global.manager.path().display(), "creating global config file");
            global.create()?;
        }
        global
            .open()
            .context("Unable to load global configuration")?;

        let config_path = global.manager.path();
        let content = global
            .as_ref()
            .context("global configuration was not loaded")?;

        Ok(Self::new(
            GlobalConfig {
                subscription_id: content.subscription_id.clone(),
                access_token: content.access_token.clone(),
                api_url: content.api_url.clone(),
            },
            config_path,
        ))
    }

    pub fn new(global: GlobalConfig, config_path: PathBuf) -> Self {
        Self {
            global,
            config_path,
            subscription_id: None,
            access_token: None,
            api_url: None,
        }
    }

    pub fn set_subscription_id(&mut self, subscription_id: Option<String>) {
        self.subscription_id = subscription_id;
    }

    pub fn set_access_token(&mut self, access_token: Option<String>) {
        self.access_token = access_token;
    }

    pub fn set_api_url(&mut self, api_url: Option<String>) {
        self.api_url = api_url;
    }

    pub fn api_url(&self) -> String {
        if let Some(api_url) = self.api_url.clone() {
            api_url
        } else if let Some(api_url) = self.global.api_url.clone() {
            api_url
        } else {
            ARM_API_URL.to_string()
        }
    }

    pub fn subscription_id(&self) -> Result<String> {
        self.subscription_id
            .clone()
            .or_else(|| self.global.subscription_id.clone())
            .ok_or_else(|| self.missing("subscription_id"))
            .context("No subscription selected, pass --subscription or set AZURE_SUBSCRIPTION_ID")
    }

    pub fn access_token(&self) -> Result<String> {
        self.access_token
            .clone()
            .or_else(|| self.global.access_token.clone())
            .ok_or_else(|| self.missing("access_token"))
            .context("No access token found, pass --access-token or set AZURE_ACCESS_TOKEN")
    }

    fn missing(&self, key: &str) -> anyhow::Error {
        anyhow!(
            "`{key}` is not set in configuration file: `{}`",
            self.config_path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn context(global: GlobalConfig) -> RequestContext {
        RequestContext::new(global, PathBuf::from("/tmp/azsql/config.toml"))
    }

    #[test]
    fn flags_win_over_the_config_file() {
        let mut ctx = context(GlobalConfig {
            subscription_id: Some("from-file".to_string()),
            access_token: Some("file-token".to_string()),
            api_url: Some("http://file".to_string()),
        });
        ctx.set_subscription_id(Some("from-flag".to_string()));
        ctx.set_access_token(Some("flag-token".to_string()));
        ctx.set_api_url(Some("http://flag".to_string()));

        assert_eq!(ctx.subscription_id().unwrap(), "from-flag");
        assert_eq!(ctx.access_token().unwrap(), "flag-token");
        assert_eq!(ctx.api_url(), "http://flag");
    }

    #[test]
    fn config_file_fills_unset_flags() {
        let ctx = context(GlobalConfig {
            subscription_id: Some("from-file".to_string()),
            access_token: Some("file-token".to_string()),
            api_url: None,
        });

        assert_eq!(ctx.subscription_id().unwrap(), "from-file");
        assert_eq!(ctx.access_token().unwrap(), "file-token");
        assert_eq!(ctx.api_url(), ARM_API_URL);
    }

    #[test]
    fn missing_values_point_at_the_config_file() {
        let ctx = context(GlobalConfig::default());

        let err = ctx.access_token().unwrap_err();
        assert_eq!(
            err.to_string(),
            "No access token found, pass --access-token or set AZURE_ACCESS_TOKEN"
        );
        assert!(format!("{err:#}").contains("/tmp/azsql/config.toml"));
        assert!(ctx.subscription_id().is_err());
    }
}
