//! Configuration layering, file discovery, and environment overrides

use std::collections::HashMap;
use std::str::FromStr;
use camino::Utf8PathBuf;
use plook_core::error::PlookError;
use crate::toml::{PlookToml, RegistryKind};
use crate::ConfigResult;

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "plook.toml";

/// Environment variables read by the loader, lowest priority first
pub const ENV_KEYS: &[&str] = &[
    "PORT",
    "PLOOK_PORT",
    "PLOOK_BIND",
    "PLOOK_CORS",
    "PLOOK_REGISTRY",
    "PLOOK_REGISTRY_URL",
    "PLOOK_REGISTRY_TOKEN",
    "PLOOK_GITHUB_API_URL",
    "GITHUB_TOKEN",
    "PLOOK_GITHUB_TOKEN",
    "PLOOK_RAW_HOST",
    "PLOOK_TIMEOUT_SECS",
    "PLOOK_RACE_TIMEOUT_SECS",
    "PLOOK_USER_AGENT",
    "PLOOK_CACHE_CAPACITY",
];

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Explicit `--config` path, bypasses discovery
    explicit: Option<Utf8PathBuf>,
    /// Override for the global config location
    global_path: Option<Utf8PathBuf>,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Where the effective file configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Built-in defaults only
    Defaults,
    /// Global config file
    Global(Utf8PathBuf),
    /// Project plook.toml, possibly layered over the global file
    Project(Utf8PathBuf),
    /// File given with `--config`
    Explicit(Utf8PathBuf),
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd, explicit: None, global_path: None }
    }

    /// Use this file instead of searching for plook.toml
    pub fn with_explicit(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    /// Use this file as the global configuration
    pub fn with_global_path(mut self, path: Utf8PathBuf) -> Self {
        self.global_path = Some(path);
        self
    }

    /// Load the global and project files and layer them, without overrides
    pub async fn load_file_config(&self) -> ConfigResult<(PlookToml, ConfigSource)> {
        let global = self.load_global_table().await?;
        let project = self.load_project_table().await?;

        let (table, source) = match (global, project) {
            (None, None) => (::toml::Table::new(), ConfigSource::Defaults),
            (Some((table, path)), None) => (table, ConfigSource::Global(path)),
            (global, Some((table, source))) => {
                let mut base = global.map(|(table, _)| table).unwrap_or_default();
                merge_tables(&mut base, table);
                (base, source)
            }
        };

        Ok((crate::toml::from_table(table)?, source))
    }

    /// Load every layer: files, then the process environment, then CLI flags
    pub async fn load(&self, cli_overrides: &HashMap<String, String>) -> ConfigResult<(PlookToml, ConfigSource)> {
        let (config, source) = self.load_file_config().await?;
        let merged = ConfigLayering::merge_configs(config, &collect_env_overrides(), cli_overrides)?;
        Ok((merged, source))
    }

    /// Find configuration file in project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current = self.cwd.as_path();

        loop {
            let config_path = current.join(filename);
            if config_path.is_file() {
                return Some(config_path);
            }

            // Move up one directory
            current = current.parent()?;
        }
    }

    /// Location of the global configuration file
    pub fn global_config_path(&self) -> ConfigResult<Utf8PathBuf> {
        if let Some(path) = &self.global_path {
            return Ok(path.clone());
        }

        let home_dir = dirs::home_dir()
            .ok_or_else(|| PlookError::ConfigValidation {
                field: "home_dir".to_string(),
                reason: "Could not determine home directory".to_string(),
            })?;

        Ok(Utf8PathBuf::try_from(home_dir)
            .map_err(|e| PlookError::ConfigValidation {
                field: "home_dir".to_string(),
                reason: format!("Invalid home directory path: {}", e),
            })?
            .join(".plook")
            .join("config.toml"))
    }

    async fn load_global_table(&self) -> ConfigResult<Option<(::toml::Table, Utf8PathBuf)>> {
        // A missing home directory just means there is no global layer
        let Ok(path) = self.global_config_path() else {
            return Ok(None);
        };

        if !path.is_file() {
            return Ok(None);
        }

        let table = crate::toml::load_table_from_file(&path).await?;
        Ok(Some((table, path)))
    }

    async fn load_project_table(&self) -> ConfigResult<Option<(::toml::Table, ConfigSource)>> {
        if let Some(path) = &self.explicit {
            let table = crate::toml::load_table_from_file(path).await?;
            return Ok(Some((table, ConfigSource::Explicit(path.clone()))));
        }

        match self.resolve_config_path(PROJECT_CONFIG_FILE) {
            Some(path) => {
                let table = crate::toml::load_table_from_file(&path).await?;
                Ok(Some((table, ConfigSource::Project(path))))
            }
            None => Ok(None),
        }
    }
}

impl ConfigLayering {
    /// Apply environment then CLI overrides on top of the file configuration and validate the result
    pub fn merge_configs(
        file_config: PlookToml,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<PlookToml> {
        let mut merged = file_config;

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut merged, env_overrides)?;

        // Apply CLI flag overrides (highest priority)
        Self::apply_cli_overrides(&mut merged, cli_overrides)?;

        crate::toml::validate_config(&merged)?;

        Ok(merged)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: &mut PlookToml, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for key in ENV_KEYS {
            let Some(value) = overrides.get(*key) else {
                continue;
            };

            match *key {
                "PORT" | "PLOOK_PORT" => config.server.port = parse_field(key, value)?,
                "PLOOK_BIND" => config.server.bind = value.clone(),
                "PLOOK_CORS" => config.server.cors = parse_bool(key, value)?,
                "PLOOK_REGISTRY" => config.registry.kind = RegistryKind::from_str(value)?,
                "PLOOK_REGISTRY_URL" => config.registry.url = Some(value.clone()),
                "PLOOK_REGISTRY_TOKEN" => config.registry.token = Some(value.clone()),
                "PLOOK_GITHUB_API_URL" => config.registry.github_api_url = Some(value.clone()),
                "GITHUB_TOKEN" | "PLOOK_GITHUB_TOKEN" => config.registry.github_token = Some(value.clone()),
                "PLOOK_RAW_HOST" => config.upstream.raw_host = value.clone(),
                "PLOOK_TIMEOUT_SECS" => config.upstream.timeout_secs = parse_field(key, value)?,
                "PLOOK_RACE_TIMEOUT_SECS" => config.upstream.race_timeout_secs = parse_field(key, value)?,
                "PLOOK_USER_AGENT" => config.upstream.user_agent = value.clone(),
                "PLOOK_CACHE_CAPACITY" => config.cache.capacity = parse_field(key, value)?,
                _ => {}
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(config: &mut PlookToml, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "bind" => config.server.bind = value.clone(),
                "port" => config.server.port = parse_field("--port", value)?,
                "registry" => config.registry.kind = RegistryKind::from_str(value)?,
                "registry_url" => config.registry.url = Some(value.clone()),
                "raw_host" => config.upstream.raw_host = value.clone(),
                "cors" => config.server.cors = parse_bool("--cors", value)?,
                other => {
                    return Err(PlookError::ConfigValidation {
                        field: other.to_string(),
                        reason: format!("Unknown CLI override '{}'", other),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Read every known variable from the process environment
pub fn collect_env_overrides() -> HashMap<String, String> {
    ENV_KEYS
        .iter()
        .filter_map(|key| {
            std::env::var(key)
                .ok()
                .filter(|value| !value.is_empty())
                .map(|value| (key.to_string(), value))
        })
        .collect()
}

/// Deep-merge `overlay` into `base`; tables merge key by key, anything else is replaced
pub fn merge_tables(base: &mut ::toml::Table, overlay: ::toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(::toml::Value::Table(existing)), ::toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn parse_field<T: FromStr>(field: &str, value: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| PlookError::ConfigValidation {
        field: field.to_string(),
        reason: format!("Invalid value '{}': {}", value, e),
    })
}

fn parse_bool(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PlookError::ConfigValidation {
            field: field.to_string(),
            reason: format!("Expected a boolean, got '{}'", value),
        }),
    }
}
