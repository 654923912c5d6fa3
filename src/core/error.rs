use thiserror::Error;

use crate::core::types::{PlayerId, UnitId};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("Insufficient points: needed {needed}, available {available}")]
    InsufficientPoints { needed: u32, available: u32 },

    #[error("Invalid unit record: {0}")]
    InvalidUnitRecord(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;
