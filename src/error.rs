use thiserror::Error;

use crate::config::ConfigError;
use crate::refine::ProviderError;
use crate::server::ServerError;

/// Startup and run failures of the `prompt-refiner` binary.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("failed to set up generation service client: {0}")]
    Provider(#[from] ProviderError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
