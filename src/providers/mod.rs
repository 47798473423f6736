//! AI provider clients and the feature adapters built on them.
//!
//! `huggingface` and `assemblyai` are the external integrations; the
//! remaining modules are one-per-feature adapters that wrap a single
//! inference call and absorb failures into catalog fallbacks.

pub mod assemblyai;
pub mod chat;
pub mod code;
pub mod content;
pub mod fallback;
pub mod huggingface;
pub mod image;
pub mod music;
pub mod speech;
pub mod video;

use base64::{engine::general_purpose, Engine as _};

/// Render bytes as a `data:` URI.
pub(crate) fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}
