use crate::foundation::core::{AssetId, SurfaceId};
use crate::scene::ops::RawOperation;

/// A named image resource to load for a surface.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetRequest {
    /// Id the decoded image is stored under.
    pub id: AssetId,
    /// Where to fetch the bytes from.
    pub url: String,
}

impl AssetRequest {
    /// Construct a request.
    pub fn new(id: impl Into<AssetId>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// A pixel-region read-back request.
///
/// The region `(x, y, width, height)` is copied into a destination of the same size; pixels
/// outside the source surface read as transparent.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Source surface.
    pub surface_id: SurfaceId,
    /// Left edge of the region in surface pixels (fractions are floored).
    pub x: f64,
    /// Top edge of the region in surface pixels (fractions are floored).
    pub y: f64,
    /// Region width, must be non-zero.
    pub width: u32,
    /// Region height, must be non-zero.
    pub height: u32,
}

/// Messages the host sends to the core.
///
/// Wire shape: internally tagged by `"type"` (`register`, `render`, `export`, `unregister`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostMessage {
    /// Create (or replace) a surface and load its assets.
    Register {
        /// Surface id.
        id: SurfaceId,
        /// Width in pixels; the configured default when absent.
        #[serde(default)]
        width: Option<u32>,
        /// Height in pixels; the configured default when absent.
        #[serde(default)]
        height: Option<u32>,
        /// Assets to load, in order.
        #[serde(default, alias = "assetRequests")]
        assets: Vec<AssetRequest>,
    },
    /// Apply one operation batch.
    Render {
        /// Target surface.
        #[serde(alias = "id")]
        surface_id: SurfaceId,
        /// Operations, applied in order.
        #[serde(default)]
        operations: Vec<RawOperation>,
    },
    /// Read back a pixel region.
    Export(ExportRequest),
    /// Drop a surface and its assets.
    Unregister {
        /// Surface id.
        id: SurfaceId,
    },
}

impl HostMessage {
    /// The surface this message addresses.
    pub fn surface_id(&self) -> &SurfaceId {
        match self {
            Self::Register { id, .. } | Self::Unregister { id } => id,
            Self::Render { surface_id, .. } => surface_id,
            Self::Export(req) => &req.surface_id,
        }
    }
}

/// Events the core sends back to the host.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CoreEvent {
    /// Every declared asset loaded; fired once per registration.
    Ready {
        /// Surface id.
        id: SurfaceId,
    },
    /// The surface could not be created (for example, it exceeds the size limit).
    RegisterFailed {
        /// Surface id.
        id: SurfaceId,
        /// Failure description.
        reason: String,
    },
    /// An asset failed to load; readiness will not fire for this registration.
    LoadFailed {
        /// Surface id.
        id: SurfaceId,
        /// Failing asset id.
        asset: AssetId,
        /// Failing asset url.
        url: String,
        /// Failure description.
        reason: String,
    },
    /// A batch was applied completely.
    Rendered {
        /// Surface id.
        surface_id: SurfaceId,
    },
    /// A batch stopped early, or addressed a missing surface.
    RenderFailed {
        /// Surface id.
        surface_id: SurfaceId,
        /// Index of the failing operation, if one was reached.
        index: Option<usize>,
        /// Tag of the failing operation, if one was reached.
        tag: Option<String>,
        /// Failure description.
        reason: String,
    },
    /// Export result.
    Exported {
        /// Surface id.
        surface_id: SurfaceId,
        /// `data:image/png;base64,...` URI of the region.
        encoded_image: String,
        /// Straight-alpha RGBA bytes, row-major.
        pixels: Vec<u8>,
    },
    /// Export could not be served.
    ExportFailed {
        /// Surface id.
        surface_id: SurfaceId,
        /// Failure description.
        reason: String,
    },
}

impl CoreEvent {
    /// The surface this event concerns.
    pub fn surface_id(&self) -> &SurfaceId {
        match self {
            Self::Ready { id } | Self::RegisterFailed { id, .. } | Self::LoadFailed { id, .. } => {
                id
            }
            Self::Rendered { surface_id }
            | Self::RenderFailed { surface_id, .. }
            | Self::Exported { surface_id, .. }
            | Self::ExportFailed { surface_id, .. } => surface_id,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/messages.rs"]
mod tests;
