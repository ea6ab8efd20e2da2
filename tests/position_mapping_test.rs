// Full ⇄ display offset mapping through structural markers

use screenplay_sync_wasm::text::{map_display_to_full, map_full_to_display, project, Projection};
use screenplay_sync_wasm::{Document, ProjectionError};

const SCRIPT: &str = "[[scene: a1]]\nINT. HOUSE - DAY\n\nJOHN\nHello.\n[[scene: b2]]\nEXT. STREET - NIGHT\n";

#[test]
fn test_markers_removed_from_display() {
    let display = project(SCRIPT);
    assert_eq!(display, "INT. HOUSE - DAY\n\nJOHN\nHello.\nEXT. STREET - NIGHT\n");
    assert!(display.chars().count() <= SCRIPT.chars().count());
}

#[test]
fn test_projecting_display_text_is_a_no_op() {
    let display = project(SCRIPT);
    assert_eq!(project(&display), display);
}

#[test]
fn test_round_trip_for_every_visible_offset() {
    let projection = Projection::build(SCRIPT);
    let display = projection.display().to_string();

    for offset in 0..=projection.full_len() {
        if projection.is_stripped(offset) {
            continue;
        }
        let there = map_full_to_display(&display, SCRIPT, offset);
        assert_eq!(map_display_to_full(&display, SCRIPT, there), offset, "offset {}", offset);
    }
}

#[test]
fn test_offset_inside_marker_lands_on_boundary() {
    let display = project(SCRIPT);
    // Inside the second marker line, whose display boundary is 30
    let marker_start = SCRIPT.find("[[scene: b2]]").unwrap();
    let inside = SCRIPT[..marker_start].chars().count() + 4;
    assert_eq!(map_full_to_display(&display, SCRIPT, inside), 30);
}

#[test]
fn test_out_of_range_offsets_clamp() {
    let display = project(SCRIPT);
    let len = display.chars().count();
    assert_eq!(map_full_to_display(&display, SCRIPT, 10_000), len);
    assert_eq!(map_display_to_full(&display, SCRIPT, 10_000), SCRIPT.chars().count());
}

#[test]
fn test_malformed_marker_is_reported_and_shown_as_is() {
    let full = "[[scene: open\nINT. HOUSE";
    assert_eq!(
        Projection::try_build(full),
        Err(ProjectionError::UnterminatedMarker { line: 0 })
    );
    assert_eq!(project(full), full);
}

#[test]
fn test_multibyte_text_counts_chars() {
    let full = "[[scene: é]]\nCAFÉ – NUIT\n";
    let projection = Projection::build(full);
    assert_eq!(projection.display(), "CAFÉ – NUIT\n");
    assert_eq!(projection.full_to_display(13 + 4), 4);
    assert_eq!(projection.display_to_full(4), 17);
}

#[test]
fn test_document_edit_keeps_both_markers() {
    let mut doc = Document::new(SCRIPT);
    let edited = doc.display_content().replace("Hello.", "Hello, Mary.");
    assert!(doc.apply_display_edit(&edited));

    assert_eq!(doc.markers().len(), 2);
    assert_eq!(doc.markers()[1].value, "b2");
    assert!(doc.full_content().contains("Hello, Mary.\n[[scene: b2]]\n"));
}

#[test]
fn test_typed_marker_line_is_not_duplicated() {
    let mut doc = Document::new("A\n");
    doc.apply_display_edit("A\n[[x: 1]]\n");
    doc.apply_display_edit("A\n[[x: 1]]\nB");
    doc.apply_display_edit("A\n[[x: 1]]\nBC");

    assert_eq!(doc.display_content(), "A\n[[x: 1]]\nBC");
    assert_eq!(doc.full_content().matches("[[x: 1]]").count(), 1);
}

#[test]
fn test_half_typed_marker_leaves_real_markers_hidden() {
    let mut doc = Document::new(SCRIPT);
    let mut display = doc.display_content().to_string();
    for typed in ["[[s", ":", " "] {
        display.push_str(typed);
        assert!(doc.apply_display_edit(&display));
        assert_eq!(doc.display_content(), display);
    }

    assert_eq!(doc.markers().len(), 2);
    assert!(doc.full_content().starts_with("[[scene: a1]]\n"));
    assert!(doc.full_content().ends_with("[[scene: b2]]\nEXT. STREET - NIGHT\n[[s: "));

    // A reload parses the malformed line as text and keeps both markers
    let reloaded = Projection::build(doc.full_content());
    assert_eq!(reloaded.display(), display);
    assert_eq!(reloaded.markers().len(), 2);
}

#[test]
fn test_join_across_marker_keeps_it_on_its_own_line() {
    let mut doc = Document::new(SCRIPT);
    // Backspace at the start of "EXT. STREET"
    let edited = doc.display_content().replace("Hello.\nEXT.", "Hello.EXT.");
    assert!(doc.apply_display_edit(&edited));

    assert_eq!(doc.display_content(), edited);
    assert_eq!(doc.markers().len(), 2);
    assert!(doc.full_content().contains("JOHN\n[[scene: b2]]\nHello.EXT. STREET"));
    assert_eq!(project(doc.full_content()), edited);
}
