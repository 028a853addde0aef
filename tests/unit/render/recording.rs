use super::*;

#[test]
fn records_calls_in_order() {
    let mut ctx = RecordingContext::new(Size::new(4, 3));
    ctx.begin_path();
    ctx.move_to(1.0, 2.0);
    ctx.line_to(3.0, 4.0);
    ctx.fill(None);

    assert_eq!(
        ctx.calls(),
        &[
            DrawCall::BeginPath,
            DrawCall::MoveTo(1.0, 2.0),
            DrawCall::LineTo(3.0, 4.0),
            DrawCall::Fill(None),
        ]
    );
    assert_eq!(ctx.take_calls().len(), 4);
    assert!(ctx.calls().is_empty());
}

#[test]
fn negative_radius_is_rejected_without_recording() {
    let mut ctx = RecordingContext::new(Size::new(1, 1));
    let err = ctx.arc(0.0, 0.0, -1.0, 0.0, 1.0, false).unwrap_err();
    assert!(matches!(err, StageError::InvalidOperation { ref tag, .. } if tag == "ARC"));
    assert!(ctx.arc_to(0.0, 0.0, 1.0, 1.0, -2.0).is_err());
    assert!(ctx.calls().is_empty());
}

#[test]
fn snapshot_is_transparent_at_surface_size() {
    let ctx = RecordingContext::new(Size::new(2, 3));
    let frame = ctx.snapshot();
    assert_eq!((frame.width, frame.height), (2, 3));
    assert_eq!(frame.data.len(), 24);
    assert!(frame.data.iter().all(|b| *b == 0));
}
