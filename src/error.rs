use thiserror::Error;

#[derive(Error, Debug)]
pub enum PercolationError {
    #[error("Grid size {0} is outside the supported range {min}..={max}", min = crate::settings::MIN_SIZE, max = crate::settings::MAX_SIZE)]
    InvalidSize(usize),

    #[error("Occupation probability {0} is outside 0.0..=1.0")]
    InvalidProbability(f64),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Preset name {0} is reserved by a built-in preset")]
    ReservedPresetName(String),

    #[error("Preset {name} would overwrite the file of preset {existing}")]
    PresetFileConflict { name: String, existing: String },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("GIF encoding error: {0}")]
    Gif(#[from] gif::EncodingError),
}

pub type Result<T> = std::result::Result<T, PercolationError>;
