use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com/recipes/";
pub const DEFAULT_RECIPE_AMOUNT: u32 = 10;
pub const MAX_RECIPE_AMOUNT: u32 = 100;
pub const API_KEY_ENV: &str = "SPOONFUL_API_KEY";

pub struct Config {
    pub db_path: PathBuf,
    pub settings_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "spoonful").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config {
            db_path: data_dir.join("recipes.db"),
            settings_path: proj_dirs.config_dir().join("config.toml"),
        })
    }
}

/// User settings persisted in `config.toml`. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: String,
    pub recipe_amount: u32,
    pub base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            recipe_amount: DEFAULT_RECIPE_AMOUNT,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: Settings = toml::from_str(&text)
            .with_context(|| format!("Invalid settings file: {}", path.display()))?;
        validate_amount(settings.recipe_amount)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }
        let text = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .context("Failed to set settings file permissions")?;
        }
        Ok(())
    }

    pub fn set_recipe_amount(&mut self, amount: u32) -> Result<()> {
        validate_amount(amount)?;
        self.recipe_amount = amount;
        Ok(())
    }

    /// Replace the stored key with `env_key` when it is set and non-empty.
    #[must_use]
    pub fn with_env_key(mut self, env_key: Option<String>) -> Self {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key.trim().to_string();
        }
        self
    }
}

fn validate_amount(amount: u32) -> Result<()> {
    if !(1..=MAX_RECIPE_AMOUNT).contains(&amount) {
        bail!("Recipe amount must be between 1 and {MAX_RECIPE_AMOUNT}, got {amount}");
    }
    Ok(())
}

/// Show only the last four characters of an API key.
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let visible: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{visible}")
}
