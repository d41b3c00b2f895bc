//! Interaction Integration Tests
//!
//! Exercises the core model the way the editor does:
//! - Shape-aware hit-testing through scaled layers
//! - Selection clicks (exclusive and additive)
//! - Group move and scale gestures with a mixed selection

use layerstack_core::{
    hit_test, Composition, DragState, GestureKind, Layer, LayerId, PixelBuffer, Point, Rect,
    TransformConfig, TransformController,
};

/// An 8x8 layer whose top-left 4x4 quadrant is transparent.
fn notched(x: f64, y: f64) -> Layer {
    let mut data = Vec::with_capacity(8 * 8 * 4);
    for py in 0..8 {
        for px in 0..8 {
            let alpha = if px < 4 && py < 4 { 0 } else { 255 };
            data.extend_from_slice(&[10, 10, 10, alpha]);
        }
    }
    Layer::new(
        "notched",
        PixelBuffer::from_rgba(8, 8, data).expect("buffer"),
    )
    .with_position(x, y)
}

fn solid(size: u32, x: f64, y: f64) -> Layer {
    Layer::new(
        "solid",
        PixelBuffer::solid(size, size, [200, 200, 200, 255]).expect("buffer"),
    )
    .with_position(x, y)
}

fn ids(composition: &Composition) -> Vec<LayerId> {
    composition.layers().iter().map(Layer::id).collect()
}

#[test]
fn test_hit_test_outside_every_rect_is_none() {
    let mut composition = Composition::new();
    composition.add_layer(solid(10, 0.0, 0.0));
    composition.add_layer(solid(10, 30.0, 30.0));

    for point in [
        Point::new(-1.0, 5.0),
        Point::new(10.0, 5.0),
        Point::new(20.0, 20.0),
        Point::new(40.0, 40.0),
    ] {
        assert!(hit_test(composition.layers(), point).is_none(), "{point:?}");
    }
}

#[test]
fn test_transparent_pixel_falls_through_after_scaling() {
    let mut composition = Composition::new();
    let below = composition.add_layer(solid(32, 0.0, 0.0));
    let above = composition.add_layer(notched(0.0, 0.0).with_size(32.0, 32.0));

    // Native (2, 2) is transparent; at 4x it covers display (8..12, 8..12).
    assert_eq!(composition.layer_at(Point::new(10.0, 10.0)), Some(below));
    // Native (6, 6) is opaque.
    assert_eq!(composition.layer_at(Point::new(26.0, 26.0)), Some(above));
}

#[test]
fn test_exclusive_and_additive_clicks() {
    let mut composition = Composition::new();
    for i in 0..4 {
        composition.add_layer(solid(4, f64::from(i) * 10.0, 0.0));
    }
    let all = ids(&composition);

    composition.click(Some(all[0]), false);
    composition.click(Some(all[2]), true);
    composition.click(Some(all[3]), true);
    assert_eq!(composition.selection().ids(), &[all[0], all[2], all[3]]);

    // Additive click on a member removes exactly that member.
    assert!(composition.click(Some(all[2]), true));
    assert_eq!(composition.selection().ids(), &[all[0], all[3]]);

    // Additive click on nothing is a no-op.
    assert!(!composition.click(None, true));
    assert_eq!(composition.selection().len(), 2);

    // Exclusive click always leaves exactly the target.
    composition.click(Some(all[1]), false);
    assert_eq!(composition.selection().ids(), &[all[1]]);
    assert!(composition.layers()[1].is_selected());
    assert!(!composition.layers()[0].is_selected());
}

#[test]
fn test_group_scale_from_edge_keeps_opposite_edge() {
    let mut composition = Composition::new();
    composition.add_layer(solid(10, 0.0, 0.0));
    composition.add_layer(solid(10, 30.0, 20.0));
    let all = ids(&composition);
    composition.click(Some(all[0]), false);
    composition.click(Some(all[1]), true);

    let mut controller = TransformController::new(TransformConfig::default());
    // Right edge midpoint of the 40x30 selection bounds.
    let kind = controller.begin(&composition, Point::new(40.0, 15.0), 1.0);
    assert!(matches!(kind, Some(GestureKind::Scale(_))));
    assert_eq!(controller.state(), DragState::DraggingScale);

    controller.update(&mut composition, Point::new(60.0, 40.0));
    controller.end(&mut composition, Point::new(80.0, 40.0));

    let bounds = composition.selection_bounds().rect().expect("bounds");
    assert!((bounds.x - 0.0).abs() < 1e-9);
    assert!((bounds.width - 80.0).abs() < 1e-9);
    assert!((bounds.height - 30.0).abs() < 1e-9);

    let second = composition.get_layer(all[1]).expect("layer");
    assert_eq!(second.rect(), Rect::new(60.0, 20.0, 20.0, 10.0));
}

#[test]
fn test_scale_never_inverts() {
    let mut composition = Composition::new();
    composition.add_layer(solid(50, 10.0, 10.0));
    let id = ids(&composition)[0];
    composition.click(Some(id), false);

    let mut controller = TransformController::new(TransformConfig::default());
    controller.begin(&composition, Point::new(60.0, 60.0), 1.0);
    controller.end(&mut composition, Point::new(-500.0, -500.0));

    let layer = composition.get_layer(id).expect("layer");
    assert!((layer.display_width() - 5.0).abs() < 1e-9);
    assert!((layer.display_height() - 5.0).abs() < 1e-9);
    assert_eq!(layer.position(), Point::new(10.0, 10.0));
}
