// Collaborator cursor projection, culling and clamping

use screenplay_sync_wasm::layout::{FontMetrics, MonospaceLayout};
use screenplay_sync_wasm::sync::{ProjectorTiming, RemoteCursorProjector};
use screenplay_sync_wasm::{OverlayFrame, RemoteCursor, ScrollOffset};

const LINE_HEIGHT: f32 = 20.0;

fn projector() -> RemoteCursorProjector<MonospaceLayout> {
    let layout = MonospaceLayout::new(FontMetrics {
        char_width: 10.0,
        line_height: LINE_HEIGHT,
        padding_left: 0.0,
        padding_top: 0.0,
    });
    let mut projector = RemoteCursorProjector::new(layout, ProjectorTiming::default());
    projector.on_frame_changed(OverlayFrame { left: 0.0, top: 0.0, width: 800.0, height: 300.0 });
    projector.on_animation_frame();
    projector
}

/// Deliver a snapshot and run the debounced recompute to completion
fn settle(projector: &mut RemoteCursorProjector<MonospaceLayout>, content: &str, cursors: Vec<RemoteCursor>) {
    projector.update_snapshot(content, cursors, 0);
    assert!(projector.tick(100).frame_requested);
    assert!(projector.on_animation_frame());
}

#[test]
fn test_visibility_boundary_is_inclusive() {
    let mut projector = projector();
    // Row 20 sits at y = 400
    let content = "x\n".repeat(30);
    settle(&mut projector, &content, vec![RemoteCursor::new("bo", 2 * 20)]);

    // 400 - 50 = 350 = height + margin
    projector.on_scroll(ScrollOffset::new(50.0, 0.0), 1_000);
    let visible = projector.visible_cursors();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].y, 350.0);

    // 400 - 49 = 351
    projector.on_scroll(ScrollOffset::new(49.0, 0.0), 2_000);
    assert!(projector.visible_cursors().is_empty());
}

#[test]
fn test_cursors_above_viewport_are_culled() {
    let mut projector = projector();
    let content = "x\n".repeat(30);
    settle(
        &mut projector,
        &content,
        vec![RemoteCursor::new("amy", 0), RemoteCursor::new("bo", 2 * 25)],
    );

    projector.on_scroll(ScrollOffset::new(200.0, 0.0), 1_000);
    let ids: Vec<_> = projector.visible_cursors().into_iter().map(|c| c.user_id).collect();
    // amy at y = -200 is past the margin; bo at 500 - 200 = 300 is inside
    assert_eq!(ids, vec!["bo".to_string()]);
}

#[test]
fn test_offsets_beyond_synced_content_clamp() {
    let mut projector = projector();
    let cursor = RemoteCursor::new("bo", usize::MAX).with_selection(0, 1_000_000);
    settle(&mut projector, "ab\ncd", vec![cursor]);

    let visible = projector.visible_cursors();
    assert_eq!((visible[0].x, visible[0].y), (20.0, LINE_HEIGHT));
    assert_eq!(visible[0].selection_end.map(|p| p.y), Some(LINE_HEIGHT));
}

#[test]
fn test_geometry_reads_synced_content_not_local_edits() {
    let mut projector = projector();
    settle(&mut projector, "JOHN\nHello.", vec![RemoteCursor::new("bo", 7)]);
    let before = projector.visible_cursors();

    // Same synced snapshot re-delivered: key unchanged, nothing to do
    assert!(!projector.update_snapshot("JOHN\nHello.", vec![RemoteCursor::new("bo", 7)], 500));
    assert_eq!(projector.next_deadline(), None);
    assert_eq!(projector.visible_cursors(), before);
    assert_eq!((before[0].x, before[0].y), (20.0, LINE_HEIGHT));
}

#[test]
fn test_departed_collaborator_is_removed() {
    let mut projector = projector();
    settle(
        &mut projector,
        "text",
        vec![RemoteCursor::new("amy", 1), RemoteCursor::new("bo", 2)],
    );
    assert_eq!(projector.visible_cursors().len(), 2);

    projector.update_snapshot("text", vec![RemoteCursor::new("bo", 2)], 1_000);
    projector.tick(1_100);
    projector.on_animation_frame();
    let visible = projector.visible_cursors();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].user_id, "bo");
}
