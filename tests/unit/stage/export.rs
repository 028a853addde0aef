use super::*;
use crate::foundation::core::SurfaceId;
use crate::render::backend::{CpuBackend, RecordingBackend};
use crate::render::context::Paint;
use crate::stage::config::StageConfig;

fn request(id: &str, x: f64, y: f64, width: u32, height: u32) -> ExportRequest {
    ExportRequest {
        surface_id: SurfaceId::from(id),
        x,
        y,
        width,
        height,
    }
}

fn painted_registry() -> SurfaceRegistry<CpuBackend> {
    let mut reg = SurfaceRegistry::new(CpuBackend::default(), StageConfig::default());
    let id = SurfaceId::from("s");
    reg.register(id.clone(), Some(4), Some(4)).unwrap();
    let ctx = reg.get_mut(&id).unwrap().context_mut();
    ctx.set_fill_style(Paint::Color("#ff0000".to_owned()));
    ctx.fill_rect(0.0, 0.0, 2.0, 2.0);
    reg
}

#[test]
fn crop_pads_outside_the_source() {
    // 2x2 source with distinct alpha per pixel.
    let src = [
        1, 1, 1, 10, 2, 2, 2, 20, //
        3, 3, 3, 30, 4, 4, 4, 40,
    ];
    let out = crop_rgba8(&src, 2, 2, 1, -1, 2, 2);
    assert_eq!(out, vec![0, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 20, 0, 0, 0, 0]);

    let none = crop_rgba8(&src, 2, 2, 5, 5, 1, 1);
    assert_eq!(none, vec![0, 0, 0, 0]);
}

#[test]
fn export_copies_region_without_scaling() {
    let reg = painted_registry();
    let out = export(&reg, &request("s", 1.0, 1.0, 3, 2)).unwrap();
    assert_eq!((out.width, out.height), (3, 2));
    assert_eq!(out.pixels.len(), 3 * 2 * 4);
    assert_eq!(&out.pixels[0..4], &[255, 0, 0, 255]);
    assert_eq!(&out.pixels[4..8], &[0, 0, 0, 0]);
    assert_eq!(&out.pixels[12..16], &[0, 0, 0, 0]);
}

#[test]
fn fractional_origin_is_floored() {
    let reg = painted_registry();
    let a = export(&reg, &request("s", 0.9, 0.2, 2, 2)).unwrap();
    let b = export(&reg, &request("s", 0.0, 0.0, 2, 2)).unwrap();
    assert_eq!(a.pixels, b.pixels);
}

#[test]
fn png_and_pixels_agree() {
    let reg = painted_registry();
    let out = export(&reg, &request("s", 0.0, 0.0, 4, 4)).unwrap();
    let uri = out.data_uri();
    assert!(uri.starts_with("data:image/png;base64,"));

    let png = png_from_data_uri(&uri).unwrap();
    assert_eq!(png, out.png);
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (4, 4));
    assert_eq!(decoded.into_raw(), out.pixels);
}

#[test]
fn empty_region_is_rejected() {
    let reg = painted_registry();
    assert!(matches!(
        export(&reg, &request("s", 0.0, 0.0, 0, 3)),
        Err(StageError::Validation(_))
    ));
    assert!(matches!(
        export(&reg, &request("s", f64::NAN, 0.0, 1, 1)),
        Err(StageError::Validation(_))
    ));
}

#[test]
fn unknown_surface_is_reported() {
    let reg = SurfaceRegistry::new(RecordingBackend, StageConfig::default());
    assert!(matches!(
        export(&reg, &request("missing", 0.0, 0.0, 1, 1)),
        Err(StageError::SurfaceNotFound { .. })
    ));
}

#[test]
fn bad_data_uri_is_rejected() {
    assert!(png_from_data_uri("data:text/plain,hi").is_err());
    assert!(png_from_data_uri("data:image/png;base64,***").is_err());
}

#[test]
fn far_away_origin_reads_transparent() {
    let reg = painted_registry();
    for (x, y) in [(1e300, 0.0), (-1e300, 0.0), (0.0, 1e300), (-1e300, -1e300)] {
        let out = export(&reg, &request("s", x, y, 2, 1)).unwrap();
        assert_eq!(out.pixels, vec![0u8; 8], "origin ({x}, {y})");
    }
    let edge = crop_rgba8(&[9; 16], 2, 2, i64::MAX - 1, i64::MAX - 1, 3, 3);
    assert!(edge.iter().all(|b| *b == 0));
}

#[test]
fn oversized_region_is_rejected() {
    let mut reg = SurfaceRegistry::new(
        RecordingBackend,
        StageConfig::default().with_max_dimension(64),
    );
    reg.register(SurfaceId::from("s"), Some(8), Some(8)).unwrap();
    assert!(matches!(
        export(&reg, &request("s", 0.0, 0.0, 65, 1)),
        Err(StageError::Validation(_))
    ));
    assert!(matches!(
        export(&reg, &request("s", 0.0, 0.0, 1, u32::MAX)),
        Err(StageError::Validation(_))
    ));
    assert!(export(&reg, &request("s", 0.0, 0.0, 64, 64)).is_ok());
}
