use std::path::PathBuf;

use taffy::{NodeId, TaffyError};

/// Errors surfaced by tree mutation and resource loading.
///
/// Event dispatch and frame composition never fail; only the operations
/// that touch the layout arena or the platform return this type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("layout tree error: {0}")]
    Layout(#[from] TaffyError),

    #[error("element {0:?} is not part of the document")]
    UnknownElement(NodeId),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {0}")]
    ImageDecode(String),

    #[error("failed to parse font {name}: {reason}")]
    FontParse { name: String, reason: &'static str },

    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("texture buffer holds {actual} bytes, expected {expected}")]
    TextureSize { expected: usize, actual: usize },

    #[error("adaptor does not support {0}")]
    Unsupported(&'static str),

    #[error("adaptor is already in use")]
    AdaptorBusy,
}

pub type Result<T> = std::result::Result<T, Error>;
