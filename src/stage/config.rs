use crate::assets::fetch::FetchOpts;
use crate::foundation::core::Size;
use crate::foundation::error::{StageError, StageResult};

/// Env var overriding [`FetchOpts::assets_root`].
pub const ENV_ASSETS_ROOT: &str = "CANVAS_STAGE_ASSETS_ROOT";
/// Env var overriding [`StageConfig::max_dimension`].
pub const ENV_MAX_DIMENSION: &str = "CANVAS_STAGE_MAX_DIMENSION";
/// Env var overriding [`FetchOpts::allow_http`] (`1`/`true`/`yes`/`on`).
pub const ENV_ALLOW_HTTP: &str = "CANVAS_STAGE_ALLOW_HTTP";

/// Runtime settings shared by the registry, the loader and the service.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Width used when a register message omits it.
    pub default_width: u32,
    /// Height used when a register message omits it.
    pub default_height: u32,
    /// Largest accepted width or height. The raster backend cannot exceed `u16::MAX`.
    pub max_dimension: u32,
    /// Capacity of the service's message and event channels.
    pub event_buffer: usize,
    /// Asset fetching options.
    pub fetch: FetchOpts,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            default_width: 300,
            default_height: 150,
            max_dimension: u32::from(u16::MAX),
            event_buffer: 64,
            fetch: FetchOpts::default(),
        }
    }
}

impl StageConfig {
    /// Defaults overlaid with the `CANVAS_STAGE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay overrides read through `lookup` (keyed by the `ENV_*` names).
    ///
    /// Unparseable values are ignored with a debug log.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = lookup(ENV_ASSETS_ROOT).filter(|v| !v.trim().is_empty()) {
            self.fetch.assets_root = root.into();
        }
        if let Some(raw) = lookup(ENV_MAX_DIMENSION) {
            match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => self.max_dimension = n,
                _ => tracing::debug!(value = %raw, "ignoring {ENV_MAX_DIMENSION}"),
            }
        }
        if let Some(raw) = lookup(ENV_ALLOW_HTTP) {
            match parse_flag(&raw) {
                Some(flag) => self.fetch.allow_http = flag,
                None => tracing::debug!(value = %raw, "ignoring {ENV_ALLOW_HTTP}"),
            }
        }
        self
    }

    /// Return a config with a different default surface size.
    pub fn with_default_size(mut self, width: u32, height: u32) -> Self {
        self.default_width = width;
        self.default_height = height;
        self
    }

    /// Return a config with a different dimension cap.
    pub fn with_max_dimension(mut self, max: u32) -> Self {
        self.max_dimension = max;
        self
    }

    /// Return a config with a different channel capacity.
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    /// Return a config with different fetch options.
    pub fn with_fetch(mut self, fetch: FetchOpts) -> Self {
        self.fetch = fetch;
        self
    }

    /// Largest side, in pixels, a surface or an export region may have.
    pub fn dimension_cap(&self) -> u32 {
        self.max_dimension.min(u32::from(u16::MAX))
    }

    /// Resolve a requested surface size, applying defaults and the dimension cap.
    pub fn surface_size(&self, width: Option<u32>, height: Option<u32>) -> StageResult<Size> {
        let size = Size::new(
            width.unwrap_or(self.default_width),
            height.unwrap_or(self.default_height),
        );
        let cap = self.dimension_cap();
        if size.width > cap || size.height > cap {
            return Err(StageError::validation(format!(
                "surface size {}x{} exceeds the {cap}px limit",
                size.width, size.height
            )));
        }
        Ok(size)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/config.rs"]
mod tests;
