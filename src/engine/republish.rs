//! Converts a recorded unavailability into claimable extra slots.
//!
//! The invalidated entries themselves stay on the books: the engine
//! publishes compensating slots for other teachers to claim and leaves the
//! stale placements to downstream review. The storage upsert keeps repeated
//! publication idempotent by natural key.

use crate::models::{ExtraSlotDraft, StaffUnavailability, TimetableEntry};

/// Entries invalidated by `window`: same staff, session and day, starting
/// inside the window's span.
pub fn affected_entries<'a>(
    window: &StaffUnavailability,
    entries: &'a [TimetableEntry],
) -> Vec<&'a TimetableEntry> {
    entries
        .iter()
        .filter(|e| {
            e.staff_id == window.staff_id
                && e.session_id == window.session_id
                && e.day == window.day
                && window.span().contains(e.period)
        })
        .collect()
}

/// One extra slot per invalidated entry, carrying the entry's slot, room,
/// course and provenance.
pub fn plan_republish(
    window: &StaffUnavailability,
    entries: &[TimetableEntry],
) -> Vec<ExtraSlotDraft> {
    affected_entries(window, entries)
        .into_iter()
        .map(|e| ExtraSlotDraft {
            session_id: e.session_id,
            course_id: e.course_id,
            day: e.day,
            period: e.period,
            duration: e.duration,
            room_id: e.room_id,
            created_from: Some(e.id),
        })
        .collect()
}
