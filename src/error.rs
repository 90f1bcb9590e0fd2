use thiserror::Error;

/// Errors raised while sampling the network counters.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Errors raised while persisting the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config path")]
    NoConfigPath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
