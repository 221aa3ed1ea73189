//! Error types for chordmap

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChordmapError {
    #[error("Unknown note: {0}")]
    UnknownNote(String),
    #[error("Unknown genre: {0}")]
    UnknownGenre(String),
    #[error("Unknown generation mode: {0} (expected random, weighted or classic)")]
    UnknownMode(String),
    #[error("Progression length must be at least 1, got {0}")]
    InvalidLength(usize),
}

pub type Result<T> = std::result::Result<T, ChordmapError>;
