//! Asset fetching, image decoding and the sequential per-surface loader.

/// Image decoding into premultiplied RGBA8.
pub mod decode;
/// URL resolution and byte fetching.
pub mod fetch;
/// Ordered loading of a surface's asset manifest.
pub mod loader;
