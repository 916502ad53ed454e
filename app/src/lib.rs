pub mod app;
pub mod compose;
pub mod error;
pub mod ffmpeg;
pub mod frames;
pub mod generate;
pub mod output;
pub mod quality;
pub mod render;
pub mod source;

pub use error::MediaError;

#[derive(Debug, thiserror::Error)]
pub enum VeepiacAppError {
    #[error(transparent)]
    Config(#[from] app::ConfigError),
    #[error(transparent)]
    Database(#[from] database::DatabaseError),
}
