use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use medibot_agent::llm::OpenAiChatClient;
use medibot_agent::toolset::{register_all, SystemClock, ToolContext};
use medibot_agent::{Dispatcher, LlmError, ToolRegistry};
use medibot_core::config::{AppConfig, ConfigError, LoadOptions};
use medibot_db::repositories::{
    SqlAppointmentRepository, SqlDoctorRepository, SqlPatientRepository,
};
use medibot_db::{connect, migrations, DbPool};

use crate::chat::ChatState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub chat_state: ChatState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client construction failed: {0}")]
    Llm(#[source] LlmError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "server.bootstrap.start", "starting application bootstrap");

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "server.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "server.bootstrap.migrations_applied", "database migrations applied");

    let patients = Arc::new(SqlPatientRepository::new(db_pool.clone()));
    let context = ToolContext {
        patients: patients.clone(),
        doctors: Arc::new(SqlDoctorRepository::new(db_pool.clone())),
        appointments: Arc::new(SqlAppointmentRepository::new(db_pool.clone())),
        clinic_offset: config.clinic.offset(),
        tax: config.clinic.tax,
        clock: Arc::new(SystemClock),
    };

    let mut registry = ToolRegistry::new();
    register_all(&mut registry, context);

    let llm = OpenAiChatClient::from_config(&config.llm).map_err(BootstrapError::Llm)?;
    let dispatcher = Dispatcher::new(
        Arc::new(llm),
        registry,
        config.agent.system_prompt.clone(),
        config.agent.max_rounds,
    );
    info!(
        event_name = "server.bootstrap.agent_ready",
        provider = ?config.llm.provider,
        model = %config.llm.model,
        "agent runtime constructed"
    );

    let chat_state = ChatState {
        dispatcher: Arc::new(dispatcher),
        patients,
        jwt_secret: config.auth.jwt_secret.clone(),
    };

    Ok(Application { config, db_pool, chat_state })
}
