use std::sync::Arc;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::assets::fetch::AssetFetcher;
use crate::foundation::core::SurfaceId;
use crate::foundation::error::{StageError, StageResult};
use crate::scene::messages::AssetRequest;

/// Loads a surface's asset manifest.
///
/// Requests are fetched and decoded one after another in list order; the first failure stops the
/// chain and is reported as [`StageError::AssetLoadFailed`] for that request.
#[derive(Clone)]
pub struct AssetLoader {
    fetcher: Arc<dyn AssetFetcher>,
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader").finish_non_exhaustive()
    }
}

impl AssetLoader {
    /// Create a loader over a fetcher.
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self { fetcher }
    }

    /// Load every request in order, returning the decoded images in the same order.
    #[tracing::instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn load_all(
        &self,
        surface: &SurfaceId,
        requests: &[AssetRequest],
    ) -> StageResult<Vec<Arc<DecodedImage>>> {
        let mut out = Vec::with_capacity(requests.len());
        for req in requests {
            let image = self.load_one(req).await.map_err(|e| {
                tracing::warn!(asset = %req.id, url = %req.url, error = %e, "asset load failed");
                StageError::AssetLoadFailed {
                    surface: surface.clone(),
                    asset: req.id.clone(),
                    url: req.url.clone(),
                    cause: e.to_string(),
                }
            })?;
            tracing::debug!(
                asset = %req.id,
                width = image.width,
                height = image.height,
                "asset decoded"
            );
            out.push(Arc::new(image));
        }
        Ok(out)
    }

    async fn load_one(&self, req: &AssetRequest) -> StageResult<DecodedImage> {
        let bytes = self.fetcher.fetch(&req.url).await?;
        let id = req.id.clone();
        tokio::task::spawn_blocking(move || decode_image(id, &bytes))
            .await
            .map_err(|e| StageError::Other(anyhow::anyhow!("decode task failed: {e}")))?
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
