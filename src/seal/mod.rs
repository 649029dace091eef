//! Hanko (personal/company seal) generation.

pub mod handlers;
pub mod image;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SealError {
    #[error("seal text is empty")]
    EmptyText,
    #[error("seal image encoding failed: {0}")]
    Encode(#[from] ::image::ImageError),
}
