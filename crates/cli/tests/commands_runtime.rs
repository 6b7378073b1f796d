use std::env;
use std::sync::{Mutex, OnceLock};

use medibot_cli::commands::{migrate, seed};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(
        &[
            ("MEDIBOT_JWT_SECRET", "test-secret"),
            ("MEDIBOT_DATABASE_URL", "sqlite::memory:"),
        ],
        || {
            let result = migrate::run();
            assert_eq!(result.exit_code, 0, "expected successful migrate run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "migrate");
            assert_eq!(payload["status"], "ok");
        },
    );
}

#[test]
fn migrate_returns_config_failure_without_secret() {
    with_env(&[("MEDIBOT_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_reports_the_demo_dataset() {
    with_env(
        &[
            ("MEDIBOT_JWT_SECRET", "test-secret"),
            ("MEDIBOT_DATABASE_URL", "sqlite::memory:"),
        ],
        || {
            let result = seed::run();
            assert_eq!(result.exit_code, 0, "expected successful seed run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "seed");
            assert_eq!(payload["status"], "ok");

            let message = payload["message"].as_str().unwrap_or("");
            assert!(message.contains("2 patients"));
            assert!(message.contains("2 doctors"));
        },
    );
}

#[test]
fn seed_rejects_non_sqlite_urls() {
    with_env(
        &[
            ("MEDIBOT_JWT_SECRET", "test-secret"),
            ("MEDIBOT_DATABASE_URL", "postgres://nope"),
        ],
        || {
            let result = seed::run();
            assert_eq!(result.exit_code, 2, "expected config validation failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "config_validation");
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "MEDIBOT_DATABASE_URL",
        "MEDIBOT_DATABASE_MAX_CONNECTIONS",
        "MEDIBOT_DATABASE_TIMEOUT_SECS",
        "MEDIBOT_JWT_SECRET",
        "MEDIBOT_LLM_PROVIDER",
        "MEDIBOT_LLM_API_KEY",
        "MEDIBOT_LLM_BASE_URL",
        "MEDIBOT_LLM_MODEL",
        "MEDIBOT_LLM_TIMEOUT_SECS",
        "MEDIBOT_SERVER_BIND_ADDRESS",
        "MEDIBOT_SERVER_PORT",
        "MEDIBOT_SERVER_HEALTH_CHECK_PORT",
        "MEDIBOT_AGENT_MAX_ROUNDS",
        "MEDIBOT_CLINIC_UTC_OFFSET_MINUTES",
        "MEDIBOT_APPOINTMENT_TAX",
        "MEDIBOT_LOGGING_LEVEL",
        "MEDIBOT_LOGGING_FORMAT",
        "MEDIBOT_LOG_LEVEL",
        "MEDIBOT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
