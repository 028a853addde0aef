use std::collections::HashMap;
use std::path::PathBuf;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_canvas_element() {
    let cfg = StageConfig::default();
    assert_eq!(cfg.default_width, 300);
    assert_eq!(cfg.default_height, 150);
    assert_eq!(cfg.max_dimension, 65535);
    assert!(!cfg.fetch.allow_http);
}

#[test]
fn overrides_apply_known_keys() {
    let cfg = StageConfig::default().with_overrides(lookup(&[
        (ENV_ASSETS_ROOT, "/srv/assets"),
        (ENV_MAX_DIMENSION, "4096"),
        (ENV_ALLOW_HTTP, "yes"),
    ]));
    assert_eq!(cfg.fetch.assets_root, PathBuf::from("/srv/assets"));
    assert_eq!(cfg.max_dimension, 4096);
    assert!(cfg.fetch.allow_http);
}

#[test]
fn bad_override_values_are_ignored() {
    let cfg = StageConfig::default().with_overrides(lookup(&[
        (ENV_MAX_DIMENSION, "huge"),
        (ENV_ALLOW_HTTP, "maybe"),
        (ENV_ASSETS_ROOT, "  "),
    ]));
    assert_eq!(cfg, StageConfig::default());
}

#[test]
fn surface_size_uses_defaults_and_cap() {
    let cfg = StageConfig::default().with_max_dimension(200);
    assert_eq!(cfg.surface_size(Some(10), None).unwrap(), Size::new(10, 150));
    assert!(matches!(
        cfg.surface_size(Some(201), Some(1)),
        Err(StageError::Validation(_))
    ));
    assert_eq!(cfg.surface_size(Some(0), Some(0)).unwrap(), Size::new(0, 0));
}

#[test]
fn cap_never_exceeds_u16() {
    let cfg = StageConfig::default().with_max_dimension(u32::MAX);
    assert_eq!(cfg.dimension_cap(), 65535);
    assert!(cfg.surface_size(Some(70_000), Some(1)).is_err());
}

#[test]
fn deserializes_partial_json() {
    let cfg: StageConfig =
        serde_json::from_str(r#"{"default_width": 64, "fetch": {"allow_http": true}}"#).unwrap();
    assert_eq!(cfg.default_width, 64);
    assert_eq!(cfg.default_height, 150);
    assert!(cfg.fetch.allow_http);
    assert_eq!(cfg.fetch.assets_root, PathBuf::from("."));
}
