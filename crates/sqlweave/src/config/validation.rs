//! Configuration validation.

use super::{ConnectionConfig, ENGINE_MYSQL, ENGINE_POSTGRES};
use crate::error::{Result, WeaveError};

/// Validate a connection profile.
pub fn validate(config: &ConnectionConfig) -> Result<()> {
    match config.engine.as_str() {
        ENGINE_POSTGRES | ENGINE_MYSQL => {}
        other => {
            return Err(WeaveError::Config(format!(
                "unknown engine '{}' (must be one of {}, {})",
                other, ENGINE_POSTGRES, ENGINE_MYSQL
            )));
        }
    }

    if config.name.is_empty() {
        return Err(WeaveError::Config("name is required".into()));
    }
    if config.user.is_empty() {
        return Err(WeaveError::Config("user is required".into()));
    }
    if config.host.is_empty() {
        return Err(WeaveError::Config("host must not be empty".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ConnectionConfig {
        ConnectionConfig {
            engine: "pg".to_string(),
            name: "appdb".to_string(),
            user: "app".to_string(),
            password: "secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: None,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_unknown_engine_rejected() {
        let mut config = valid_config();
        config.engine = "oracle".to_string();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, WeaveError::Config(_)));
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_empty_database_name_rejected() {
        let mut config = valid_config();
        config.name = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_user_rejected() {
        let mut config = valid_config();
        config.user = String::new();
        assert!(validate(&config).is_err());
    }
}
