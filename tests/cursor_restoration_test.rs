// Caret restoration across programmatic content swaps

use screenplay_sync_wasm::sync::{restore_offset, CursorPreserver, Restoration};
use screenplay_sync_wasm::CursorMode;

const QUIET: u64 = 500;

/// A preserver whose user last typed long ago, caret at `offset`
fn idle_at(offset: usize) -> CursorPreserver {
    let mut preserver = CursorPreserver::new(QUIET);
    preserver.on_selection_change(offset);
    preserver
}

#[test]
fn test_insertion_at_caret_leaves_it_in_place() {
    let previous = "INT. HOUSE\nJohn walks in.";
    let new = "INT. HOUSE - DAY\nJohn walks in.";

    let mut preserver = idle_at(10);
    assert_eq!(preserver.on_content_change(previous, new, 0), Restoration::Restored(10));
}

#[test]
fn test_insertion_before_caret_shifts_by_delta() {
    let previous = "Scene one.\nJohn enters.";
    let new = "Scene one, continued.\nJohn enters.";
    assert_eq!(previous.chars().count(), 23);

    let mut preserver = idle_at(23);
    assert_eq!(preserver.on_content_change(previous, new, 0), Restoration::Restored(34));
    assert_eq!(preserver.saved_offset(), 34);
}

#[test]
fn test_deletion_before_caret_shifts_back() {
    let previous = "JOHN (V.O.)\nHello.";
    let new = "JOHN\nHello.";
    // Caret after "Hel"
    assert_eq!(restore_offset(15, previous, new), 8);
}

#[test]
fn test_identical_content_does_not_restore() {
    let mut preserver = idle_at(4);
    let text = "FADE IN:";
    assert_eq!(preserver.on_content_change(text, text, 0), Restoration::Unchanged);
    assert_eq!(preserver.saved_offset(), 4);
}

#[test]
fn test_typing_window_skips_then_expires() {
    let mut preserver = CursorPreserver::new(QUIET);
    preserver.on_local_input(1_000, 5);

    assert_eq!(preserver.on_content_change("abcde", "abcdef", 1_100), Restoration::Skipped);
    assert_eq!(preserver.mode(), CursorMode::UserTyping);

    // Quiet period over: the same swap is now programmatic
    assert_eq!(
        preserver.on_content_change("abcdef", "XXabcdef", 1_600),
        Restoration::Restored(7)
    );
    assert_eq!(preserver.mode(), CursorMode::Idle);
}

#[test]
fn test_restored_offset_always_in_bounds() {
    let cases = [
        (0, "", "abc"),
        (3, "abc", ""),
        (100, "abc", "abcd"),
        (2, "hello", "he"),
        (4, "héllo wörld", "wörld"),
    ];
    for (saved, previous, new) in cases {
        let restored = restore_offset(saved, previous, new);
        assert!(restored <= new.chars().count(), "{:?}", (saved, previous, new));
    }
}
