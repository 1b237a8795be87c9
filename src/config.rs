//! Environment configuration.
//!
//! Loaded once at startup, fail-fast: a missing required variable stops the
//! process before it binds a socket.

use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Local,
    Production,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub env: Env,
}

impl AppConfig {
    pub fn load() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;
        let env = match env::var("ENVIRONMENT").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };
        Ok(AppConfig {
            database_url,
            jwt_secret,
            env,
        })
    }

    pub fn is_local(&self) -> bool {
        self.env == Env::Local
    }
}

impl Default for AppConfig {
    /// Test configuration: local environment, throwaway secret.
    fn default() -> Self {
        AppConfig {
            database_url: String::new(),
            jwt_secret: "test-secret".to_string(),
            env: Env::Local,
        }
    }
}
