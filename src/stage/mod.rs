//! Surfaces and everything that acts on them: configuration, the registry, paint resolution,
//! batch interpretation and pixel export.

/// Runtime configuration.
pub mod config;
/// Region read-back and PNG encoding.
pub mod export;
/// Operation batch interpreter.
pub mod interpreter;
/// Paint specification resolver.
pub mod paint;
/// The surface registry.
pub mod registry;
