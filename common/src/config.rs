use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Helper trait for dispatching fs ops for different config files
pub trait ConfigManager: Sized {
    fn directory(&self) -> PathBuf;

    fn filename(&self) -> PathBuf;

    fn path(&self) -> PathBuf {
        self.directory().join(self.filename())
    }

    fn exists(&self) -> bool {
        self.path().exists()
    }

    fn create<C>(&self) -> Result<()>
    where
        C: Serialize + Default,
    {
        if self.exists() {
            return Ok(());
        }
        let config = C::default();
        self.save(&config)
    }

    fn open<C>(&self) -> Result<C>
    where
        C: for<'de> Deserialize<'de>,
    {
        let path = self.path();
        let config_string = File::open(&path)
            .and_then(|mut f| {
                let mut buf = String::new();
                f.read_to_string(&mut buf)?;
                Ok(buf)
            })
            .with_context(|| anyhow!("Unable to read configuration file: {}", path.display()))?;
        toml::from_str(config_string.as_str())
            .with_context(|| anyhow!("Invalid configuration file: {}", path.display()))
    }

    fn save<C>(&self, config: &C) -> Result<()>
    where
        C: Serialize,
    {
        let path = self.path();
        std::fs::create_dir_all(self.directory())?;

        let mut config_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let config_str = toml::to_string_pretty(config)?;
        config_file
            .write_all(config_str.as_bytes())
            .with_context(|| anyhow!("Could not write the configuration file: {}", path.display()))?;
        Ok(())
    }
}

/// Manages `<config dir>/azsql/config.toml`, or `config.<profile>.toml` when a profile is selected
pub struct GlobalConfigManager {
    directory: PathBuf,
    profile: Option<String>,
}

impl GlobalConfigManager {
    pub fn new(profile: Option<String>) -> Result<Self> {
        if let Some(ref s) = profile {
            if s.is_empty() || s.chars().any(|c| !c.is_ascii_alphanumeric()) {
                return Err(anyhow!("Invalid profile name: '{s}'"));
            }
        }

        let directory = dirs::config_dir()
            .ok_or_else(|| {
                anyhow!(
                    "Could not find a configuration directory. Your operating system may not be supported."
                )
            })?
            .join("azsql");

        Ok(Self { directory, profile })
    }
}

impl ConfigManager for GlobalConfigManager {
    fn directory(&self) -> PathBuf {
        self.directory.clone()
    }

    fn filename(&self) -> PathBuf {
        match self.profile.as_ref() {
            Some(profile) => PathBuf::from(format!("config.{profile}.toml")),
            None => PathBuf::from("config.toml"),
        }
    }
}

/// Defaults used when the matching flag or environment variable is not given.
#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct GlobalConfig {
    pub subscription_id: Option<String>,
    /// Bearer token for the management API
    pub access_token: Option<String>,
    /// Only needed for sovereign clouds or testing
    pub api_url: Option<String>,
}

/// A handler for configuration files. The type parameter `M` is the [`ConfigManager`] which handles
/// indirection around file location and serde. The type parameter `C` is the configuration content.
pub struct Config<M, C> {
    pub manager: M,
    config: Option<C>,
}

impl<M, C> Config<M, C>
where
    M: ConfigManager,
    C: Serialize + for<'de> Deserialize<'de>,
{
    /// Creates a new [`Config`] instance, without opening the underlying file
    pub fn new(manager: M) -> Self {
        Self {
            manager,
            config: None,
        }
    }

    /// Opens the underlying config file, as handled by the [`ConfigManager`]
    pub fn open(&mut self) -> Result<()> {
        let config = self.manager.open()?;
        self.config = Some(config);
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.manager.exists()
    }

    /// Returns `None` if the config has not been opened.
    pub fn as_ref(&self) -> Option<&C> {
        self.config.as_ref()
    }

    /// Ask the [`ConfigManager`] to create a default config file at the location it manages.
    ///
    /// If the file already exists, is a no-op.
    pub fn create(&self) -> Result<()>
    where
        C: Default,
    {
        self.manager.create::<C>()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    struct DirConfigManager(PathBuf);

    impl ConfigManager for DirConfigManager {
        fn directory(&self) -> PathBuf {
            self.0.join("azsql")
        }

        fn filename(&self) -> PathBuf {
            PathBuf::from("config.toml")
        }
    }

    #[test]
    fn create_writes_a_default_file_once() {
        let dir = TempDir::new().unwrap();
        let mut config: Config<_, GlobalConfig> =
            Config::new(DirConfigManager(dir.path().to_path_buf()));

        assert!(!config.exists());
        config.create().unwrap();
        assert!(config.exists());

        config.open().unwrap();
        assert_eq!(config.as_ref(), Some(&GlobalConfig::default()));
    }

    #[test]
    fn reads_values_written_by_hand() {
        let dir = TempDir::new().unwrap();
        let manager = DirConfigManager(dir.path().to_path_buf());
        std::fs::create_dir_all(manager.directory()).unwrap();
        std::fs::write(
            manager.path(),
            "subscription_id = \"00000000-1111-2222-3333-444444444444\"\naccess_token = \"token\"\n",
        )
        .unwrap();

        let mut config: Config<_, GlobalConfig> = Config::new(manager);
        config.open().unwrap();
        let content = config.as_ref().unwrap();

        assert_eq!(
            content.subscription_id.as_deref(),
            Some("00000000-1111-2222-3333-444444444444")
        );
        assert_eq!(content.access_token.as_deref(), Some("token"));
        assert_eq!(content.api_url, None);
    }

    #[test]
    fn invalid_file_names_its_path() {
        let dir = TempDir::new().unwrap();
        let manager = DirConfigManager(dir.path().to_path_buf());
        std::fs::create_dir_all(manager.directory()).unwrap();
        std::fs::write(manager.path(), "subscription_id = ").unwrap();

        let mut config: Config<_, GlobalConfig> = Config::new(manager);
        let err = config.open().unwrap_err();

        assert!(err.to_string().starts_with("Invalid configuration file"));
    }

    #[test]
    fn rejects_bad_profile_names() {
        assert!(GlobalConfigManager::new(Some("../etc".to_string())).is_err());
        assert!(GlobalConfigManager::new(Some(String::new())).is_err());
    }
}
