use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub agent: AgentConfig,
    pub clinic: ClinicConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub system_prompt: String,
    pub max_rounds: u32,
}

/// Clinic-wide scheduling context: the fixed offset all calendar arithmetic
/// runs in, and the flat tax applied to every booking.
#[derive(Clone, Debug)]
pub struct ClinicConfig {
    pub utc_offset_minutes: i32,
    pub tax: Decimal,
}

impl ClinicConfig {
    pub fn offset(&self) -> FixedOffset {
        // Validated to lie within +/- 14h at load time.
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    OpenAi,
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub max_rounds: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "Your name is MediBot. \
You are an AI medical help assistant for a clinic. \
You can book or cancel appointments, update patient contact details, and \
list a patient's appointments or reports by calling the available tools. \
Never reveal a patient's internal id in your replies.";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://medibot.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: None,
                base_url: Some("http://localhost:11434/v1".to_string()),
                model: "llama3.1".to_string(),
                timeout_secs: 60,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                health_check_port: 8080,
                graceful_shutdown_secs: 15,
            },
            auth: AuthConfig { jwt_secret: String::new().into() },
            agent: AgentConfig {
                system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
                max_rounds: 8,
            },
            clinic: ClinicConfig {
                // Asia/Kolkata, UTC+05:30. No DST, so a fixed offset is exact.
                utc_offset_minutes: 330,
                tax: Decimal::ZERO,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("medibot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(api_key) = llm.api_key {
                self.llm.api_key = Some(secret_value(api_key));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(auth) = patch.auth {
            if let Some(jwt_secret) = auth.jwt_secret {
                self.auth.jwt_secret = secret_value(jwt_secret);
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(system_prompt) = agent.system_prompt {
                self.agent.system_prompt = system_prompt;
            }
            if let Some(max_rounds) = agent.max_rounds {
                self.agent.max_rounds = max_rounds;
            }
        }

        if let Some(clinic) = patch.clinic {
            if let Some(utc_offset_minutes) = clinic.utc_offset_minutes {
                self.clinic.utc_offset_minutes = utc_offset_minutes;
            }
            if let Some(tax) = clinic.tax {
                self.clinic.tax = tax;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("MEDIBOT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("MEDIBOT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("MEDIBOT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("MEDIBOT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("MEDIBOT_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MEDIBOT_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("MEDIBOT_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("MEDIBOT_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("MEDIBOT_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("MEDIBOT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("MEDIBOT_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MEDIBOT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("MEDIBOT_SERVER_PORT") {
            self.server.port = parse_u16("MEDIBOT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("MEDIBOT_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("MEDIBOT_SERVER_HEALTH_CHECK_PORT", &value)?;
        }

        if let Some(value) = read_env("MEDIBOT_JWT_SECRET") {
            self.auth.jwt_secret = secret_value(value);
        }

        if let Some(value) = read_env("MEDIBOT_AGENT_MAX_ROUNDS") {
            self.agent.max_rounds = parse_u32("MEDIBOT_AGENT_MAX_ROUNDS", &value)?;
        }

        if let Some(value) = read_env("MEDIBOT_CLINIC_UTC_OFFSET_MINUTES") {
            self.clinic.utc_offset_minutes =
                parse_i32("MEDIBOT_CLINIC_UTC_OFFSET_MINUTES", &value)?;
        }
        if let Some(value) = read_env("MEDIBOT_APPOINTMENT_TAX") {
            self.clinic.tax = value.parse::<Decimal>().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "MEDIBOT_APPOINTMENT_TAX".to_string(),
                    value,
                }
            })?;
        }

        let log_level = read_env("MEDIBOT_LOGGING_LEVEL").or_else(|| read_env("MEDIBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("MEDIBOT_LOGGING_FORMAT").or_else(|| read_env("MEDIBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(jwt_secret) = overrides.jwt_secret {
            self.auth.jwt_secret = secret_value(jwt_secret);
        }
        if let Some(max_rounds) = overrides.max_rounds {
            self.agent.max_rounds = max_rounds;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_llm(&self.llm)?;
        validate_server(&self.server)?;
        validate_auth(&self.auth)?;
        validate_agent(&self.agent)?;
        validate_clinic(&self.clinic)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("medibot.toml"), PathBuf::from("config/medibot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    match llm.provider {
        LlmProvider::OpenAi => {
            let missing = llm
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for the openai provider".to_string(),
                ));
            }
        }
        LlmProvider::Ollama => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for the ollama provider".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    if server.health_check_port == server.port {
        return Err(ConfigError::Validation(
            "server.health_check_port must differ from server.port".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_auth(auth: &AuthConfig) -> Result<(), ConfigError> {
    if auth.jwt_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "auth.jwt_secret is required: set it in medibot.toml or MEDIBOT_JWT_SECRET"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_agent(agent: &AgentConfig) -> Result<(), ConfigError> {
    if agent.system_prompt.trim().is_empty() {
        return Err(ConfigError::Validation(
            "agent.system_prompt must not be empty".to_string(),
        ));
    }

    if agent.max_rounds == 0 || agent.max_rounds > 64 {
        return Err(ConfigError::Validation(
            "agent.max_rounds must be in range 1..=64".to_string(),
        ));
    }

    Ok(())
}

fn validate_clinic(clinic: &ClinicConfig) -> Result<(), ConfigError> {
    if clinic.utc_offset_minutes.abs() > 14 * 60 {
        return Err(ConfigError::Validation(
            "clinic.utc_offset_minutes must be within +/- 840".to_string(),
        ));
    }

    if clinic.tax < Decimal::ZERO {
        return Err(ConfigError::Validation("clinic.tax must not be negative".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_i32(key: &str, value: &str) -> Result<i32, ConfigError> {
    value.parse::<i32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    llm: Option<LlmPatch>,
    server: Option<ServerPatch>,
    auth: Option<AuthPatch>,
    agent: Option<AgentPatch>,
    clinic: Option<ClinicPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthPatch {
    jwt_secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    system_prompt: Option<String>,
    max_rounds: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ClinicPatch {
    utc_offset_minutes: Option<i32>,
    tax: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    const MEDIBOT_VARS: &[&str] = &[
        "MEDIBOT_DATABASE_URL",
        "MEDIBOT_DATABASE_MAX_CONNECTIONS",
        "MEDIBOT_DATABASE_TIMEOUT_SECS",
        "MEDIBOT_LLM_PROVIDER",
        "MEDIBOT_LLM_API_KEY",
        "MEDIBOT_LLM_BASE_URL",
        "MEDIBOT_LLM_MODEL",
        "MEDIBOT_LLM_TIMEOUT_SECS",
        "MEDIBOT_SERVER_BIND_ADDRESS",
        "MEDIBOT_SERVER_PORT",
        "MEDIBOT_SERVER_HEALTH_CHECK_PORT",
        "MEDIBOT_JWT_SECRET",
        "MEDIBOT_AGENT_MAX_ROUNDS",
        "MEDIBOT_CLINIC_UTC_OFFSET_MINUTES",
        "MEDIBOT_APPOINTMENT_TAX",
        "MEDIBOT_LOGGING_LEVEL",
        "MEDIBOT_LOG_LEVEL",
        "MEDIBOT_LOGGING_FORMAT",
        "MEDIBOT_LOG_FORMAT",
    ];

    fn clear_vars() {
        for var in MEDIBOT_VARS {
            env::remove_var(var);
        }
    }

    fn options_with_secret() -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                jwt_secret: Some("test-secret".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[test]
    fn defaults_load_with_a_secret_override() {
        let _guard = env_lock().lock().unwrap();
        clear_vars();

        let config = AppConfig::load(options_with_secret()).expect("load");
        assert_eq!(config.database.url, "sqlite://medibot.db");
        assert_eq!(config.clinic.utc_offset_minutes, 330);
        assert_eq!(config.agent.max_rounds, 8);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn missing_jwt_secret_fails_validation() {
        let _guard = env_lock().lock().unwrap();
        clear_vars();

        let error = AppConfig::load(LoadOptions::default()).unwrap_err();
        assert!(matches!(error, ConfigError::Validation(_)));
        assert!(error.to_string().contains("jwt_secret"));
    }

    #[test]
    fn file_values_apply_and_env_wins_over_file() {
        let _guard = env_lock().lock().unwrap();
        clear_vars();

        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("medibot.toml");
        fs::write(
            &path,
            r#"
[database]
url = "sqlite://from-file.db"

[auth]
jwt_secret = "file-secret"

[clinic]
utc_offset_minutes = 0
tax = "18.00"

[agent]
max_rounds = 3
"#,
        )
        .expect("write config");

        env::set_var("MEDIBOT_DATABASE_URL", "sqlite://from-env.db");
        let config = AppConfig::load(LoadOptions {
            config_path: Some(path),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("load");
        env::remove_var("MEDIBOT_DATABASE_URL");

        assert_eq!(config.database.url, "sqlite://from-env.db");
        assert_eq!(config.auth.jwt_secret.expose_secret(), "file-secret");
        assert_eq!(config.clinic.utc_offset_minutes, 0);
        assert_eq!(config.clinic.tax, Decimal::new(1800, 2));
        assert_eq!(config.agent.max_rounds, 3);
    }

    #[test]
    fn missing_required_file_is_reported() {
        let _guard = env_lock().lock().unwrap();
        clear_vars();

        let error = AppConfig::load(LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .unwrap_err();
        assert!(matches!(error, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn zero_max_rounds_is_rejected() {
        let _guard = env_lock().lock().unwrap();
        clear_vars();

        let mut options = options_with_secret();
        options.overrides.max_rounds = Some(0);
        let error = AppConfig::load(options).unwrap_err();
        assert!(error.to_string().contains("max_rounds"));
    }

    #[test]
    fn absurd_clinic_offset_is_rejected() {
        let _guard = env_lock().lock().unwrap();
        clear_vars();

        env::set_var("MEDIBOT_CLINIC_UTC_OFFSET_MINUTES", "1000");
        let error = AppConfig::load(options_with_secret()).unwrap_err();
        env::remove_var("MEDIBOT_CLINIC_UTC_OFFSET_MINUTES");
        assert!(error.to_string().contains("utc_offset_minutes"));
    }

    #[test]
    fn non_sqlite_database_url_is_rejected() {
        let _guard = env_lock().lock().unwrap();
        clear_vars();

        let mut options = options_with_secret();
        options.overrides.database_url = Some("postgres://nope".to_string());
        let error = AppConfig::load(options).unwrap_err();
        assert!(error.to_string().contains("database.url"));
    }

    #[test]
    fn clinic_offset_builds_a_fixed_offset() {
        let _guard = env_lock().lock().unwrap();
        clear_vars();

        let config = AppConfig::load(options_with_secret()).expect("load");
        assert_eq!(config.clinic.offset().local_minus_utc(), 330 * 60);
    }
}
