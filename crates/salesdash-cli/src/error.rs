use salesdash_core::{ConfigError, FetchError, WarehouseError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("analysis halted: {0}")]
    Halted(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Fetch(_) | Self::Halted(_) => 3,
            Self::Serialization(_) => 4,
            Self::Warehouse(_) => 5,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_separate_user_errors_from_source_errors() {
        assert_eq!(CliError::from(ConfigError::EmptyQuery).exit_code(), 2);
        assert_eq!(CliError::Halted(String::from("404")).exit_code(), 3);
        let fetch = FetchError::Status {
            url: String::from("https://example.test/x.sql"),
            status: 404,
        };
        assert_eq!(CliError::from(fetch).exit_code(), 3);
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy");
        assert_eq!(CliError::from(io).exit_code(), 10);
    }
}
