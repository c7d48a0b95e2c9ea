//! CLI error types and exit codes

use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error (including partially failed migrations)
/// - 2: Configuration error
/// - 3: API / network error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}\n\nRun 'conformity-migrate configure' to create the configuration file.")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigFormat(#[from] serde_yaml::Error),

    #[error("API error: {0}")]
    Api(#[from] conformity_client::ApiClientError),

    #[error(transparent)]
    Migration(#[from] conformity_migration::MigrationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration finished with failures in: {}", .0.join(", "))]
    Partial(Vec<String>),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::ConfigFormat(_) => 2,
            CliError::Api(_) => 3,
            CliError::Migration(_) | CliError::Io(_) | CliError::Partial(_) => 1,
        }
    }

    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_config() {
        assert_eq!(CliError::Config("missing".to_string()).exit_code(), 2);
    }

    #[test]
    fn test_exit_code_api() {
        let err = CliError::Api(conformity_client::ApiClientError::AuthError(
            "denied".to_string(),
        ));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_partial() {
        let err = CliError::Partial(vec!["custom profiles".to_string()]);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("custom profiles"));
    }
}
