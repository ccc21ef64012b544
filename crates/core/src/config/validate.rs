use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - `batch.skip_existing` and `batch.force` are not both set
/// - `batch.parallelism` and `retry.max_attempts` are at least 1
/// - `retry.base_delay_ms` does not exceed `retry.max_delay_ms`
/// - `api.base_url` is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.batch.skip_existing && config.batch.force {
        return Err(ConfigError::ValidationError(
            "batch.skip_existing and batch.force cannot be used together".to_string(),
        ));
    }

    if config.batch.parallelism == 0 {
        return Err(ConfigError::ValidationError(
            "batch.parallelism must be at least 1".to_string(),
        ));
    }

    if config.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "retry.max_attempts must be at least 1".to_string(),
        ));
    }

    if config.retry.base_delay_ms > config.retry.max_delay_ms {
        return Err(ConfigError::ValidationError(format!(
            "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
            config.retry.base_delay_ms, config.retry.max_delay_ms
        )));
    }

    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.base_url cannot be empty".to_string(),
        ));
    }

    Ok(())
}
