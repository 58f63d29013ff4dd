//! Command implementations and dispatch logic.
//!
//! Every command receives the effective configuration and a shared
//! [`CommandContext`]. [`build_plook`] wires the configured registry, slug
//! cache and upstream racer into one pipeline for either command.

use std::collections::HashMap;
use std::sync::Arc;

use camino::Utf8PathBuf;
use tracing::{debug, info, warn};

use plook_config::{ConfigLoader, PlookToml, RegistryKind};
use plook_core::error::{PlookError, PlookResult};
use plook_registry::bower::{DEFAULT_BOWER_REGISTRY, DEFAULT_GITHUB_API};
use plook_registry::client::DEFAULT_NPM_REGISTRY;
use plook_registry::{AuthConfig, BowerRegistry, ClientConfig, NpmRegistry, PackageRegistry, SlugCache};
use plook_resolver::{CandidateRacer, PackageResolver, Plook, RacerConfig};

use crate::output::errors::ErrorFormatter;
use crate::output::OutputHandler;
use crate::{Cli, Commands};

pub mod resolve;
pub mod serve;


/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    pub errors: ErrorFormatter,
}

impl CommandContext {
    /// Create a new command context in the current directory
    pub fn new() -> PlookResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| PlookError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::try_from(cwd)
            .map_err(|e| PlookError::ConfigValidation {
                field: "cwd".to_string(),
                reason: format!("Current directory is not valid UTF-8: {}", e),
            })?;

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
            errors: ErrorFormatter::default(),
        })
    }

    /// Load the layered configuration: files, environment, then the flags in `cli`
    pub async fn load_config(&self, cli: &Cli) -> PlookResult<PlookToml> {
        let loader = ConfigLoader::new(self.cwd.clone()).with_explicit(cli.config.clone());
        let (config, source) = loader.load(&cli_overrides(cli)).await?;

        debug!("Loaded configuration from {:?}", source);
        Ok(config)
    }
}

/// Collect the configuration overrides given as flags
pub fn cli_overrides(cli: &Cli) -> HashMap<String, String> {
    let mut overrides = HashMap::new();

    if let Some(bind) = &cli.bind {
        overrides.insert("bind".to_string(), bind.clone());
    }
    if let Some(port) = cli.port {
        overrides.insert("port".to_string(), port.to_string());
    }
    if let Some(registry) = &cli.registry {
        overrides.insert("registry".to_string(), registry.clone());
    }
    if let Some(raw_host) = &cli.raw_host {
        overrides.insert("raw_host".to_string(), raw_host.clone());
    }

    overrides
}

/// Build the resolution pipeline described by `config`
pub fn build_plook(config: &PlookToml) -> PlookResult<Plook> {
    let client = ClientConfig {
        timeout: config.upstream.timeout(),
        user_agent: config.upstream.user_agent.clone(),
    };

    let registry: Arc<dyn PackageRegistry> = match config.registry.kind {
        RegistryKind::Npm => Arc::new(NpmRegistry::with_config(
            config.registry.url.as_deref().unwrap_or(DEFAULT_NPM_REGISTRY),
            &client,
            &AuthConfig { token: config.registry.token.clone() },
        )?),
        RegistryKind::Bower => {
            if config.registry.github_token.is_none() {
                warn!("No GitHub token configured, tag listing uses the unauthenticated API rate limit");
            }
            Arc::new(BowerRegistry::with_config(
                config.registry.url.as_deref().unwrap_or(DEFAULT_BOWER_REGISTRY),
                config.registry.github_api_url.as_deref().unwrap_or(DEFAULT_GITHUB_API),
                &client,
                &AuthConfig { token: config.registry.github_token.clone() },
            )?)
        }
    };

    let cache = Arc::new(SlugCache::with_capacity(config.cache.capacity));
    let resolver = PackageResolver::with_cache(registry, cache);

    let racer = CandidateRacer::with_config(RacerConfig {
        raw_host: config.upstream.raw_host.clone(),
        timeout: config.upstream.timeout(),
        race_timeout: config.upstream.race_timeout(),
        user_agent: config.upstream.user_agent.clone(),
    })?;

    Ok(Plook::new(resolver, racer))
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, config: &PlookToml, ctx: &CommandContext) -> PlookResult<()> {
    match command {
        Commands::Serve => {
            info!("Serving {} packages on {}", config.registry.kind, config.server.address());
            serve::execute(config, ctx).await
        }
        Commands::Resolve { package, version, file } => {
            info!("Resolving {}@{}/{}", package, version, file);
            resolve::execute(&package, &version, &file, config, ctx).await.map(|_| ())
        }
    }
}
