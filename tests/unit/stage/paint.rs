use std::sync::Arc;

use super::*;
use crate::assets::decode::DecodedImage;
use crate::foundation::core::AssetId;
use crate::render::backend::RecordingBackend;
use crate::scene::style::Repetition;
use crate::stage::config::StageConfig;

fn registry_with_tile() -> (SurfaceRegistry<RecordingBackend>, SurfaceId) {
    let mut reg = SurfaceRegistry::new(RecordingBackend, StageConfig::default());
    let id = SurfaceId::from("s");
    let generation = reg.register(id.clone(), Some(4), Some(4)).unwrap();
    let tile = DecodedImage::from_premul(AssetId::from("tile"), 1, 1, vec![0, 0, 255, 255]);
    reg.install_images(&id, generation, vec![Arc::new(tile)])
        .unwrap();
    (reg, id)
}

#[test]
fn plain_passes_through_unchanged() {
    let (reg, id) = registry_with_tile();
    let paint = resolve_in(&reg, &id, &PaintSpec::plain("not even a color")).unwrap();
    assert_eq!(paint, Paint::Color("not even a color".to_owned()));
}

#[test]
fn pattern_resolves_loaded_asset() {
    let (reg, id) = registry_with_tile();
    let spec = PaintSpec::Pattern {
        id: AssetId::from("tile"),
        repetition: Repetition::RepeatX,
    };
    match resolve_in(&reg, &id, &spec).unwrap() {
        Paint::Pattern { image, repetition } => {
            assert_eq!(image.id.as_str(), "tile");
            assert_eq!(repetition, Repetition::RepeatX);
        }
        other => panic!("unexpected paint {other:?}"),
    }
}

#[test]
fn pattern_with_missing_asset_names_it() {
    let (reg, id) = registry_with_tile();
    let spec = PaintSpec::Pattern {
        id: AssetId::from("nope"),
        repetition: Repetition::Repeat,
    };
    match resolve_in(&reg, &id, &spec) {
        Err(StageError::AssetNotFound { surface, asset }) => {
            assert_eq!(surface.as_str(), "s");
            assert_eq!(asset.as_str(), "nope");
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn unknown_surface_is_reported() {
    let (reg, _) = registry_with_tile();
    assert!(matches!(
        resolve_in(&reg, &SurfaceId::from("other"), &PaintSpec::plain("red")),
        Err(StageError::SurfaceNotFound { .. })
    ));
}

#[test]
fn gradient_keeps_stop_order() {
    let (reg, id) = registry_with_tile();
    let stops = vec![
        ColorStop::new(1.0, "blue"),
        ColorStop::new(0.0, "red"),
        ColorStop::new(0.5, "lime"),
    ];
    let spec = PaintSpec::LinearGradient {
        x1: 0.0,
        y1: 0.0,
        x2: 10.0,
        y2: 0.0,
        stops: stops.clone(),
    };
    assert_eq!(
        resolve_in(&reg, &id, &spec).unwrap(),
        Paint::LinearGradient {
            x0: 0.0,
            y0: 0.0,
            x1: 10.0,
            y1: 0.0,
            stops,
        }
    );
}

#[test]
fn out_of_range_offset_is_invalid() {
    let (reg, id) = registry_with_tile();
    let spec = PaintSpec::LinearGradient {
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 1.0,
        stops: vec![ColorStop::new(1.5, "red")],
    };
    match resolve_in(&reg, &id, &spec) {
        Err(StageError::InvalidOperation { tag, .. }) => assert_eq!(tag, "LINEAR_GRADIENT"),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn bad_stop_color_is_invalid() {
    let (reg, id) = registry_with_tile();
    let spec = PaintSpec::RadialGradient {
        x1: 0.0,
        y1: 0.0,
        r1: 0.0,
        x2: 0.0,
        y2: 0.0,
        r2: 5.0,
        stops: vec![ColorStop::new(0.0, "red"), ColorStop::new(1.0, "bogus")],
    };
    assert!(matches!(
        resolve_in(&reg, &id, &spec),
        Err(StageError::InvalidOperation { .. })
    ));
}

#[test]
fn negative_radius_is_invalid() {
    let (reg, id) = registry_with_tile();
    let spec = PaintSpec::RadialGradient {
        x1: 0.0,
        y1: 0.0,
        r1: -1.0,
        x2: 0.0,
        y2: 0.0,
        r2: 5.0,
        stops: Vec::new(),
    };
    match resolve_in(&reg, &id, &spec) {
        Err(StageError::InvalidOperation { tag, reason }) => {
            assert_eq!(tag, "RADIAL_GRADIENT");
            assert!(reason.contains("non-negative"));
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn empty_stop_list_is_accepted() {
    let (reg, id) = registry_with_tile();
    let spec = PaintSpec::LinearGradient {
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 0.0,
        stops: Vec::new(),
    };
    assert!(resolve_in(&reg, &id, &spec).is_ok());
}
