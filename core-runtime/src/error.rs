use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
