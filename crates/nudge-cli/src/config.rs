//! Configuration file management for nudge.
//!
//! Provides an optional TOML config file at `~/.config/nudge/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use nudge_core::generator::{GeneratorConfig, ProviderKind, build_generator};
use nudge_core::notes::{NotionClient, NotionConfig};
use nudge_core::{PlanRequestHandler, PromptStyle};
use nudge_store::StoreConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub provider: ProviderSection,
    pub notion: NotionSection,
    pub server: ServerSection,
    pub todo: TodoSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// `gemini` or `openai`.
    pub kind: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// `plain` or `with_system_role`.
    pub prompt_style: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionSection {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub title_property: Option<String>,
    pub body_property: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoSection {
    pub path: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the nudge config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/nudge` or `~/.config/nudge`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("nudge");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("nudge")
}

/// Return the path to the nudge config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file. A missing file is `Ok(None)`; a file that
/// exists but does not parse is an error.
pub fn load_config_from(path: &Path) -> Result<Option<ConfigFile>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read config file at {}", path.display()));
        }
    };
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix, since it may hold API keys.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Starter config written by `nudge init`. Secrets are left out so they can
/// come from the environment.
pub fn starter_config(provider: ProviderKind) -> ConfigFile {
    ConfigFile {
        provider: ProviderSection {
            kind: Some(provider.to_string()),
            model: Some(provider.default_model().to_string()),
            ..ProviderSection::default()
        },
        notion: NotionSection {
            title_property: Some(NotionConfig::DEFAULT_TITLE_PROPERTY.to_string()),
            body_property: Some(NotionConfig::DEFAULT_BODY_PROPERTY.to_string()),
            ..NotionSection::default()
        },
        server: ServerSection {
            bind: Some(ServerConfig::DEFAULT_BIND.to_string()),
            port: Some(ServerConfig::DEFAULT_PORT),
        },
        todo: TodoSection {
            path: Some(PathBuf::from(StoreConfig::DEFAULT_PATH)),
        },
    }
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line, highest priority.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub provider: Option<String>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub todo_file: Option<PathBuf>,
}

/// Where the HTTP surface listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl ServerConfig {
    pub const DEFAULT_BIND: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 5000;
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct NudgeConfig {
    pub generator: GeneratorConfig,
    pub prompt_style: PromptStyle,
    /// `None` disables Notion write-back.
    pub notion: Option<NotionConfig>,
    pub server: ServerConfig,
    pub store: StoreConfig,
}

/// Read a non-blank environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl NudgeConfig {
    /// Resolve configuration from the user's config file, the environment,
    /// and `cli`.
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file = load_config_from(&config_path())?.unwrap_or_default();
        Self::resolve_with(file, cli)
    }

    /// Resolve using the chain: CLI flag > env var > config file > default.
    ///
    /// - Provider: `--provider` > `NUDGE_PROVIDER` > `provider.kind` > `gemini`
    /// - API key: `GEMINI_API_KEY` / `OPENAI_API_KEY` > `provider.api_key` > none
    /// - Notion: `NOTION_TOKEN` + `NOTION_DATABASE_ID` > `[notion]` > disabled
    /// - Port: `--port` > `PORT` > `server.port` > 5000
    /// - Task file: `--file` > `NUDGE_TODO_FILE` > `todo.path` > `tasks.json`
    pub fn resolve_with(file: ConfigFile, cli: &CliOverrides) -> Result<Self> {
        // Generator.
        let provider_name = cli
            .provider
            .clone()
            .or_else(|| env_var("NUDGE_PROVIDER"))
            .or(file.provider.kind)
            .unwrap_or_else(|| ProviderKind::Gemini.to_string());
        let provider: ProviderKind = provider_name.parse()?;

        let mut generator = GeneratorConfig::new(provider);
        if let Some(model) = env_var("NUDGE_MODEL").or(file.provider.model) {
            generator = generator.with_model(model);
        }
        if let Some(base_url) = env_var("NUDGE_API_BASE_URL").or(file.provider.base_url) {
            generator = generator.with_base_url(base_url);
        }
        if let Some(secs) = file.provider.timeout_secs {
            generator = generator.with_timeout(Duration::from_secs(secs));
        }
        generator.api_key = env_var(provider.api_key_env()).or(file.provider.api_key);

        let prompt_style = match env_var("NUDGE_PROMPT_STYLE").or(file.provider.prompt_style) {
            Some(style) => style.parse()?,
            None => provider.default_prompt_style(),
        };

        // Notion.
        let notion = NotionConfig::from_parts(
            env_var("NOTION_TOKEN").or(file.notion.token),
            env_var("NOTION_DATABASE_ID").or(file.notion.database_id),
        )
        .map(|cfg| {
            let title = file
                .notion
                .title_property
                .unwrap_or_else(|| cfg.title_property.clone());
            let body = file
                .notion
                .body_property
                .unwrap_or_else(|| cfg.body_property.clone());
            cfg.with_properties(title, body)
        });

        // Server.
        let port = match cli.port {
            Some(p) => p,
            None => match env_var("PORT") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("PORT env var is not a valid port: {raw:?}"))?,
                None => file.server.port.unwrap_or(ServerConfig::DEFAULT_PORT),
            },
        };
        let bind = cli
            .bind
            .clone()
            .or(file.server.bind)
            .unwrap_or_else(|| ServerConfig::DEFAULT_BIND.to_string());

        // Task store.
        let store = match &cli.todo_file {
            Some(path) => StoreConfig::new(path.clone()),
            None => StoreConfig::from_env().unwrap_or_else(|| {
                StoreConfig::new(
                    file.todo
                        .path
                        .unwrap_or_else(|| PathBuf::from(StoreConfig::DEFAULT_PATH)),
                )
            }),
        };

        Ok(Self {
            generator,
            prompt_style,
            notion,
            server: ServerConfig { bind, port },
            store,
        })
    }

    /// Wire the generator and (optional) Notion client into a handler.
    pub fn build_handler(&self) -> Result<PlanRequestHandler> {
        let generator = build_generator(self.generator.clone())
            .context("failed to build generation client")?;
        if self.generator.api_key.is_none() {
            tracing::warn!(
                provider = %self.generator.provider,
                "{} is not set; plan requests will report a missing key",
                self.generator.provider.api_key_env()
            );
        }

        let mut handler = PlanRequestHandler::new(Arc::from(generator), self.prompt_style);
        match &self.notion {
            Some(cfg) => {
                let client =
                    NotionClient::new(cfg.clone()).context("failed to build Notion client")?;
                tracing::info!(database_id = %cfg.database_id, "Notion write-back enabled");
                handler = handler.with_note_store(Arc::new(client));
            }
            None => tracing::warn!(
                "NOTION_TOKEN or NOTION_DATABASE_ID is not set; Notion write-back is disabled"
            ),
        }
        Ok(handler)
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
