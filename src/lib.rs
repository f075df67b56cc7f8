use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocsChatError>;

#[derive(Error, Debug)]
pub enum DocsChatError {
    #[error("Engine error: {0}")]
    Engine(#[from] engine::EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod corpus;
pub mod crawler;
pub mod engine;
pub mod server;
