//! Configuration module for the quiz host.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Name of the silent administrative identity when none is configured.
pub const DEFAULT_ADMIN_NAME: &str = "_secadmin";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the facilitator control routes
    pub control_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Optional JSON file the question bank is seeded from at startup
    pub questions_path: Option<PathBuf>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Reserved player name whose answers are never scored
    pub admin_name: String,
    /// Seconds since the last poll during which a player name stays taken
    pub login_window_secs: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let control_psk = env::var("QUIZ_CONTROL_PSK").ok();

        let db_path = env::var("QUIZ_DB_PATH")
            .unwrap_or_else(|_| "./data/quiz.sqlite".to_string())
            .into();

        let questions_path = env::var("QUIZ_QUESTIONS_PATH").ok().map(PathBuf::from);

        let bind_addr = env::var("QUIZ_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
            .parse()
            .expect("Invalid QUIZ_BIND_ADDR format");

        let log_level = env::var("QUIZ_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let admin_name = env::var("QUIZ_ADMIN_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string());

        let login_window_secs = env::var("QUIZ_LOGIN_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);

        Self {
            control_psk,
            db_path,
            questions_path,
            bind_addr,
            log_level,
            admin_name,
            login_window_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    // Tests in this module mutate process-wide environment variables.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: [&str; 7] = [
        "QUIZ_CONTROL_PSK",
        "QUIZ_DB_PATH",
        "QUIZ_QUESTIONS_PATH",
        "QUIZ_BIND_ADDR",
        "QUIZ_LOG_LEVEL",
        "QUIZ_ADMIN_NAME",
        "QUIZ_LOGIN_WINDOW_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = Config::from_env();

        assert!(config.control_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/quiz.sqlite"));
        assert!(config.questions_path.is_none());
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5000");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.admin_name, DEFAULT_ADMIN_NAME);
        assert_eq!(config.login_window_secs, 4);
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("QUIZ_ADMIN_NAME", "   ");
        env::set_var("QUIZ_LOGIN_WINDOW_SECS", "not-a-number");
        env::set_var("QUIZ_QUESTIONS_PATH", "/tmp/questions.json");

        let config = Config::from_env();

        assert_eq!(config.admin_name, DEFAULT_ADMIN_NAME);
        assert_eq!(config.login_window_secs, 4);
        assert_eq!(
            config.questions_path,
            Some(PathBuf::from("/tmp/questions.json"))
        );

        clear_env();
    }
}
