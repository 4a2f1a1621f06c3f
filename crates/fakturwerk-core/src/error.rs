// SPDX-License-Identifier: MIT
//
// Unified error types for Fakturwerk.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level error type for all Fakturwerk operations.
#[derive(Debug, Error)]
pub enum FakturwerkError {
    // -- Financial derivation errors --
    #[error("invalid line item at index {index}: {reason}")]
    InvalidLineItem { index: u32, reason: String },

    #[error("{name} rate {value} is outside [0, 1]")]
    InvalidRate { name: &'static str, value: Decimal },

    // -- Symbol encoding errors --
    #[error("payload of {length} characters exceeds {symbology} capacity")]
    PayloadTooLarge { symbology: String, length: usize },

    #[error("character {character:?} is not encodable in {symbology}")]
    UnsupportedCharacter { symbology: String, character: char },

    // -- Raster compositing errors --
    #[error("cannot allocate {width}x{height} raster buffer: {reason}")]
    BufferAllocationFailed {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("image encoding failed: {0}")]
    EncodingFailed(String),

    // -- Render backend errors --
    #[error("render backend '{backend}' failed: {cause}")]
    RenderFailed { backend: String, cause: String },

    #[error("no render backend named '{0}'")]
    UnknownBackend(String),

    // -- Asset / persistence --
    #[error("invalid embeddable asset: {0}")]
    InvalidAsset(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FakturwerkError>;
