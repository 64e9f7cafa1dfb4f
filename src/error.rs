use thiserror::Error;

/// Everything that can go wrong while mounting, configuring or capturing the effect.
#[derive(Debug, Error)]
pub enum SplashError {
    #[error("no graphics context could be acquired for the canvas")]
    ContextUnavailable,

    #[error("failed to compile {program} program: {reason}")]
    ProgramCompile {
        program: &'static str,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("splash cursor is not mounted")]
    NotMounted,

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, SplashError>;
