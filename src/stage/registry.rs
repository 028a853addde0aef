use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{AssetId, Size, SurfaceId};
use crate::foundation::error::{StageError, StageResult};
use crate::render::backend::SurfaceBackend;
use crate::render::context::DrawingContext;
use crate::stage::config::StageConfig;

/// A registered drawing target plus the images loaded for it.
///
/// `images` only ever holds fully decoded assets: a manifest is installed all at once or not at
/// all.
#[derive(Debug)]
pub struct Surface<C> {
    id: SurfaceId,
    context: C,
    images: HashMap<AssetId, Arc<DecodedImage>>,
    generation: u64,
}

impl<C: DrawingContext> Surface<C> {
    /// Surface id.
    pub fn id(&self) -> &SurfaceId {
        &self.id
    }

    /// Size of the drawing target.
    pub fn size(&self) -> Size {
        Size::new(self.context.width(), self.context.height())
    }

    /// The drawing context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// The drawing context, mutably.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Registration generation; bumps every time the id is (re-)registered.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Look up a loaded image.
    pub fn image(&self, id: &AssetId) -> StageResult<&Arc<DecodedImage>> {
        self.images
            .get(id)
            .ok_or_else(|| StageError::asset_not_found(&self.id, id))
    }

    /// Whether an image is loaded under `id`.
    pub fn has_image(&self, id: &AssetId) -> bool {
        self.images.contains_key(id)
    }

    /// Ids of the loaded images, sorted.
    pub fn image_ids(&self) -> Vec<&AssetId> {
        let mut ids: Vec<&AssetId> = self.images.keys().collect();
        ids.sort();
        ids
    }
}

/// Owns every live surface, keyed by id.
///
/// Surfaces are created through the injected [`SurfaceBackend`], so the same registry type serves
/// the raster backend in production and the recording backend in tests.
pub struct SurfaceRegistry<B: SurfaceBackend> {
    backend: B,
    config: StageConfig,
    surfaces: HashMap<SurfaceId, Surface<B::Context>>,
    next_generation: u64,
}

impl<B: SurfaceBackend> std::fmt::Debug for SurfaceRegistry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&SurfaceId> = self.surfaces.keys().collect();
        ids.sort();
        f.debug_struct("SurfaceRegistry")
            .field("surfaces", &ids)
            .field("next_generation", &self.next_generation)
            .finish_non_exhaustive()
    }
}

impl<B: SurfaceBackend> SurfaceRegistry<B> {
    /// Empty registry over `backend`.
    pub fn new(backend: B, config: StageConfig) -> Self {
        Self {
            backend,
            config,
            surfaces: HashMap::new(),
            next_generation: 1,
        }
    }

    /// The configuration surfaces are created with.
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Create the surface `id`, replacing any surface already registered under it.
    ///
    /// The replaced surface's drawing state and images are dropped, also when the new surface
    /// cannot be created. Returns the new registration generation, which
    /// [`SurfaceRegistry::install_images`] checks against.
    #[tracing::instrument(skip(self, id), fields(id = %id))]
    pub fn register(
        &mut self,
        id: SurfaceId,
        width: Option<u32>,
        height: Option<u32>,
    ) -> StageResult<u64> {
        let replaced = self.surfaces.remove(&id).is_some();
        let size = self.config.surface_size(width, height)?;
        let context = self.backend.create(size)?;
        let generation = self.next_generation;
        self.next_generation += 1;

        self.surfaces.insert(
            id.clone(),
            Surface {
                id,
                context,
                images: HashMap::new(),
                generation,
            },
        );
        tracing::debug!(
            width = size.width,
            height = size.height,
            generation,
            replaced,
            "surface registered"
        );
        Ok(generation)
    }

    /// Record a fully loaded manifest for the registration `generation` of `id`.
    ///
    /// Returns `Ok(false)` without touching anything when the surface has been re-registered
    /// since the load started.
    pub fn install_images(
        &mut self,
        id: &SurfaceId,
        generation: u64,
        images: Vec<Arc<DecodedImage>>,
    ) -> StageResult<bool> {
        let surface = self.get_mut(id)?;
        if surface.generation != generation {
            tracing::debug!(
                id = %id,
                expected = generation,
                current = surface.generation,
                "discarding assets of a stale registration"
            );
            return Ok(false);
        }
        for image in images {
            surface.images.insert(image.id.clone(), image);
        }
        Ok(true)
    }

    /// Borrow a surface.
    pub fn get(&self, id: &SurfaceId) -> StageResult<&Surface<B::Context>> {
        self.surfaces
            .get(id)
            .ok_or_else(|| StageError::surface_not_found(id))
    }

    /// Borrow a surface mutably.
    pub fn get_mut(&mut self, id: &SurfaceId) -> StageResult<&mut Surface<B::Context>> {
        self.surfaces
            .get_mut(id)
            .ok_or_else(|| StageError::surface_not_found(id))
    }

    /// Remove a surface, returning it.
    pub fn unregister(&mut self, id: &SurfaceId) -> StageResult<Surface<B::Context>> {
        let removed = self
            .surfaces
            .remove(id)
            .ok_or_else(|| StageError::surface_not_found(id))?;
        tracing::debug!(id = %id, "surface unregistered");
        Ok(removed)
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &SurfaceId) -> bool {
        self.surfaces.contains_key(id)
    }

    /// Number of live surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// True when no surface is registered.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/registry.rs"]
mod tests;
