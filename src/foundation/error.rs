use crate::foundation::core::{AssetId, SurfaceId};

/// Convenience result type used across the crate.
pub type StageResult<T> = Result<T, StageError>;

/// Every failure the core reports to its host.
///
/// Errors raised while applying a batch are wrapped in [`StageError::BatchAborted`] so the host
/// learns which operation (by index and tag) stopped the batch without inspecting it.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// No surface is registered under this id.
    #[error("surface not found: \"{surface}\"")]
    SurfaceNotFound {
        /// Requested surface id.
        surface: SurfaceId,
    },

    /// An operation or paint referenced an asset the surface has not loaded.
    #[error("asset not found on surface \"{surface}\": \"{asset}\"")]
    AssetNotFound {
        /// Surface the lookup ran against.
        surface: SurfaceId,
        /// Missing asset id.
        asset: AssetId,
    },

    /// Fetching or decoding an asset failed.
    #[error("failed to load asset \"{asset}\" from '{url}' for surface \"{surface}\": {cause}")]
    AssetLoadFailed {
        /// Surface whose manifest contained the asset.
        surface: SurfaceId,
        /// Asset id from the request.
        asset: AssetId,
        /// Asset url from the request.
        url: String,
        /// Underlying failure, rendered to text.
        cause: String,
    },

    /// An operation payload could not be interpreted.
    #[error("invalid operation {tag}: {reason}")]
    InvalidOperation {
        /// Wire tag of the operation.
        tag: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A batch stopped at `index`; operations before it were applied.
    #[error("batch on surface \"{surface}\" aborted at operation #{index} ({tag}): {source}")]
    BatchAborted {
        /// Surface the batch targeted.
        surface: SurfaceId,
        /// Zero-based position of the failing operation.
        index: usize,
        /// Wire tag of the failing operation.
        tag: String,
        /// The failure itself.
        #[source]
        source: Box<StageError>,
    },

    /// Input rejected before any work started.
    #[error("validation error: {0}")]
    Validation(String),

    /// Message (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else (IO, encoding, backend failures).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StageError {
    /// Build a [`StageError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StageError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`StageError::InvalidOperation`].
    pub fn invalid_op(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`StageError::SurfaceNotFound`].
    pub fn surface_not_found(surface: &SurfaceId) -> Self {
        Self::SurfaceNotFound {
            surface: surface.clone(),
        }
    }

    /// Build a [`StageError::AssetNotFound`].
    pub fn asset_not_found(surface: &SurfaceId, asset: &AssetId) -> Self {
        Self::AssetNotFound {
            surface: surface.clone(),
            asset: asset.clone(),
        }
    }

    /// The innermost error, looking through [`StageError::BatchAborted`].
    pub fn root_cause(&self) -> &StageError {
        match self {
            Self::BatchAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for StageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
