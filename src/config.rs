use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::transfer::TransferMode;

pub const DEFAULT_CONFIG_FILE: &str = "force-transfer.json";

/// The on-disk configuration, keyed the same way as the host's settings form.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub run_now: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_name: String,
    #[serde(default)]
    pub season: SeasonValue,
    #[serde(
        default = "default_transfer_type",
        deserialize_with = "null_as_default_transfer_type"
    )]
    pub transfer_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: false,
            run_now: false,
            source_path: String::new(),
            target_path: String::new(),
            media_name: String::new(),
            season: SeasonValue::default(),
            transfer_type: default_transfer_type(),
        }
    }
}

fn default_transfer_type() -> String {
    TransferMode::default().to_string()
}

/// The settings form stores cleared fields as `null`; read those as unset.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_transfer_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_transfer_type))
}

/// Season as typed into the form: usually a JSON integer or free text, but
/// any other JSON value is accepted and coerced.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SeasonValue {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

impl Default for SeasonValue {
    fn default() -> Self {
        Self::Text("1".to_string())
    }
}

impl SeasonValue {
    pub fn coerce(&self) -> u32 {
        match self {
            Self::Number(n) => u32::try_from(*n).unwrap_or(1),
            Self::Text(text) => coerce_season(text),
            // floats are truncated; null, bools, arrays and objects mean season 1
            Self::Other(value) => value
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f < f64::from(u32::MAX) + 1.0)
                .map(|f| f.trunc() as u32)
                .unwrap_or(1),
        }
    }
}

/// Parses a season number, falling back to season 1 on anything unparseable.
pub fn coerce_season(input: &str) -> u32 {
    input.trim().parse().unwrap_or(1)
}

/// Values passed on the command line that win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source_path: Option<PathBuf>,
    pub target_path: Option<PathBuf>,
    pub media_name: Option<String>,
    pub season: Option<String>,
    pub mode: Option<TransferMode>,
}

/// Immutable inputs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub media_name: String,
    pub season: u32,
    pub mode: TransferMode,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    source_path: Option<PathBuf>,
    target_path: Option<PathBuf>,
    media_name: Option<String>,
    season: Option<u32>,
    mode: Option<TransferMode>,
}

impl RunConfigBuilder {
    pub fn source<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.source_path = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn target<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.target_path = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn media_name(mut self, name: impl Into<String>) -> Self {
        self.media_name = Some(name.into());
        self
    }

    pub fn season(mut self, season: u32) -> Self {
        self.season = Some(season);
        self
    }

    pub fn mode(mut self, mode: TransferMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Missing fields stay empty; the coordinator rejects them at run time.
    pub fn build(self) -> RunConfig {
        RunConfig {
            source_path: self.source_path.unwrap_or_default(),
            target_path: self.target_path.unwrap_or_default(),
            media_name: self.media_name.unwrap_or_default(),
            season: self.season.unwrap_or(1),
            mode: self.mode.unwrap_or_default(),
        }
    }
}

/// Host-side gate deciding whether an invocation starts a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub enabled: bool,
    pub run_now: bool,
}

impl Trigger {
    pub fn should_fire(&self, forced: bool) -> bool {
        forced || (self.enabled && self.run_now)
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub run: RunConfig,
    pub trigger: Trigger,
    /// File the configuration came from, if any.
    pub origin: Option<PathBuf>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `force-transfer.json` in the working directory when it exists.
    pub fn resolve(
        path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, ConfigError> {
        let config_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        let config = match &config_path {
            Some(config_path) => Self::read(config_path)?,
            None => Config::default(),
        };

        let mut resolved = Self::resolve_config(config, overrides)?;
        resolved.origin = config_path;
        Ok(resolved)
    }

    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, ConfigError> {
        let mode = match overrides.mode {
            Some(mode) => mode,
            None => config.transfer_type.parse()?,
        };
        let season = match overrides.season {
            Some(season) => coerce_season(&season),
            None => config.season.coerce(),
        };

        let run = RunConfig {
            source_path: overrides
                .source_path
                .unwrap_or_else(|| PathBuf::from(config.source_path)),
            target_path: overrides
                .target_path
                .unwrap_or_else(|| PathBuf::from(config.target_path)),
            media_name: overrides.media_name.unwrap_or(config.media_name),
            season,
            mode,
        };

        Ok(ResolvedConfig {
            run,
            trigger: Trigger {
                enabled: config.enabled,
                run_now: config.run_now,
            },
            origin: None,
        })
    }

    /// Flips `run_now` back off in the file, leaving every other key as written.
    pub fn reset_run_now(path: &Path) -> Result<(), ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut value: serde_json::Value =
            serde_json::from_str(&content).map_err(|err| ConfigError::Parse(err.to_string()))?;

        match value.as_object_mut() {
            Some(object) => {
                object.insert("run_now".to_string(), serde_json::Value::Bool(false));
            }
            None => {
                return Err(ConfigError::Parse(
                    "config root must be a JSON object".to_string(),
                ));
            }
        }

        let json = serde_json::to_string_pretty(&value)
            .map_err(|err| ConfigError::Parse(err.to_string()))?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        let resolved = ConfigLoader::resolve_config(config, ConfigOverrides::default()).unwrap();

        assert_eq!(resolved.run.season, 1);
        assert_eq!(resolved.run.mode, TransferMode::Symlink);
        assert!(!resolved.trigger.enabled);
        assert!(!resolved.trigger.run_now);
    }

    #[test]
    fn test_season_coercion() {
        assert_eq!(coerce_season("3"), 3);
        assert_eq!(coerce_season(" 02 "), 2);
        assert_eq!(coerce_season("two"), 1);
        assert_eq!(coerce_season(""), 1);
        assert_eq!(SeasonValue::Number(4).coerce(), 4);
        assert_eq!(SeasonValue::Number(-1).coerce(), 1);
        assert_eq!(SeasonValue::Other(serde_json::json!(2.9)).coerce(), 2);
        assert_eq!(SeasonValue::Other(serde_json::json!(-3.0)).coerce(), 1);
        assert_eq!(SeasonValue::Other(serde_json::Value::Null).coerce(), 1);
        assert_eq!(SeasonValue::Other(serde_json::json!([2])).coerce(), 1);
    }

    #[test]
    fn test_trigger() {
        let armed = Trigger {
            enabled: true,
            run_now: true,
        };
        let disabled = Trigger {
            enabled: false,
            run_now: true,
        };
        assert!(armed.should_fire(false));
        assert!(!disabled.should_fire(false));
        assert!(disabled.should_fire(true));
    }
}
