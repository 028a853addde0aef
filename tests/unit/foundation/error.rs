use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StageError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        StageError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        StageError::invalid_op("ARC", "negative radius")
            .to_string()
            .contains("invalid operation ARC: negative radius")
    );
    assert!(
        StageError::surface_not_found(&SurfaceId::from("main"))
            .to_string()
            .contains("surface not found: \"main\"")
    );
}

#[test]
fn root_cause_unwraps_nested_batch_errors() {
    let inner = StageError::asset_not_found(&SurfaceId::from("s"), &AssetId::from("hero"));
    let err = StageError::BatchAborted {
        surface: SurfaceId::from("s"),
        index: 3,
        tag: "DRAW_IMAGE".to_string(),
        source: Box::new(inner),
    };

    assert!(err.to_string().contains("#3 (DRAW_IMAGE)"));
    match err.root_cause() {
        StageError::AssetNotFound { asset, .. } => assert_eq!(asset.as_str(), "hero"),
        other => panic!("unexpected root cause: {other:?}"),
    }
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_map_to_serde_variant() {
    let err: StageError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, StageError::Serde(_)));
}
