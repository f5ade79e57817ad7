//! Integration tests for note header formatting helpers

use notebrief::format::{class_if, class_names, format_date, format_date_at};
use notebrief::types::Locale;

#[test]
fn backend_created_at_formats_in_both_locales() {
    let raw = "2026-03-07T09:04:00.000001";
    assert_eq!(format_date_at(raw, Locale::En, None), "Mar 7, 2026 09:04");
    assert_eq!(format_date_at(raw, Locale::Zh, None), "2026年3月7日 09:04");
}

#[test]
fn unparseable_dates_never_panic() {
    for raw in ["", "   ", "yesterday", "2026-02-30", "99999999999999999999"] {
        assert_eq!(format_date(raw, Locale::En), "");
    }
}

#[test]
fn header_toggle_classes_compose() {
    let chat_open = true;
    let sources_open = false;
    assert_eq!(
        class_names(["action-btn", class_if(chat_open, "active")]),
        "action-btn active"
    );
    assert_eq!(
        class_names(["action-btn", class_if(sources_open, "active")]),
        "action-btn"
    );
}
