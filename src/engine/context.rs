//! Read snapshot the validator and searches operate on.
//!
//! The caller assembles a [`ValidationContext`] from the repository for one
//! session; the engine itself never performs I/O. All entry slices are
//! expected to be scoped to the candidate's session already.

use chrono::NaiveDate;

use crate::models::{
    Day, EntryDraft, EntryId, ExtraClassAvailability, GroupScope, Room, RoomId, SlotSpan, StaffId,
    StaffUnavailability, Subject, SubjectId, TimetableEntry,
};

/// How a candidate placement is allowed to bend the weekly rules.
///
/// `ExtraSlotFill` placements target a published extra slot: the
/// one-per-day, section-or-course exclusivity, adjacency and quota rules do
/// not apply to them. Membership, ranges, unavailability, staff and room
/// exclusivity are enforced in both modes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlacementMode {
    Normal,
    ExtraSlotFill,
}

/// Per-session snapshot of everything a validation decision reads.
pub struct ValidationContext<'a> {
    pub subject: &'a Subject,
    pub entries: &'a [TimetableEntry],
    pub unavailability: &'a [StaffUnavailability],
    pub open_slots: &'a [ExtraClassAvailability],
    pub rooms: &'a [Room],
    /// Concrete date of the occurrence being checked, when known. Drives
    /// exception and expiry handling for unavailability windows.
    pub on_date: Option<NaiveDate>,
    /// How many alternative slots to attach to conflict rejections.
    pub suggestion_limit: usize,
}

impl<'a> ValidationContext<'a> {
    /// Placement mode for a candidate: `ExtraSlotFill` when an open extra
    /// slot matches its (day, start period, course).
    pub fn mode_for(&self, draft: &EntryDraft) -> PlacementMode {
        let matches_open_slot = self.open_slots.iter().any(|slot| {
            slot.is_open()
                && slot.session_id == draft.session_id
                && slot.day == draft.day
                && slot.period == draft.period
                && slot.course_id == draft.course_id
        });
        if matches_open_slot {
            PlacementMode::ExtraSlotFill
        } else {
            PlacementMode::Normal
        }
    }

    /// First unavailability window blocking `staff` over `span` on `day`.
    pub fn staff_unavailable(
        &self,
        staff: StaffId,
        day: Day,
        span: &SlotSpan,
    ) -> Option<&StaffUnavailability> {
        self.unavailability
            .iter()
            .find(|w| w.staff_id == staff && w.covers(day, span, self.on_date))
    }

    fn occupying(
        &self,
        day: Day,
        period: u8,
        exclude: Option<EntryId>,
    ) -> impl Iterator<Item = &TimetableEntry> {
        self.entries.iter().filter(move |e| {
            Some(e.id) != exclude && e.day == day && e.span().contains(period)
        })
    }

    pub fn staff_busy(&self, staff: StaffId, day: Day, period: u8, exclude: Option<EntryId>) -> bool {
        self.occupying(day, period, exclude)
            .any(|e| e.staff_id == staff)
    }

    pub fn room_busy(&self, room: RoomId, day: Day, period: u8, exclude: Option<EntryId>) -> bool {
        self.occupying(day, period, exclude)
            .any(|e| e.room_id == room)
    }

    pub fn scope_busy(
        &self,
        scope: GroupScope,
        day: Day,
        period: u8,
        exclude: Option<EntryId>,
    ) -> bool {
        self.occupying(day, period, exclude)
            .any(|e| e.scope() == scope)
    }

    /// Whether `subject` already meets for `scope` anywhere on `day`.
    pub fn subject_meets_on(
        &self,
        subject: SubjectId,
        scope: GroupScope,
        day: Day,
        exclude: Option<EntryId>,
    ) -> bool {
        self.entries.iter().any(|e| {
            Some(e.id) != exclude && e.day == day && e.subject_id == subject && e.scope() == scope
        })
    }

    /// Whether `subject` meets for `scope` in a span covering `period` on `day`.
    pub fn subject_at(
        &self,
        subject: SubjectId,
        scope: GroupScope,
        day: Day,
        period: u8,
        exclude: Option<EntryId>,
    ) -> bool {
        self.occupying(day, period, exclude)
            .any(|e| e.subject_id == subject && e.scope() == scope)
    }

    /// Weekly meeting count for (subject, scope).
    pub fn scope_count(
        &self,
        subject: SubjectId,
        scope: GroupScope,
        exclude: Option<EntryId>,
    ) -> usize {
        self.entries
            .iter()
            .filter(|e| Some(e.id) != exclude && e.subject_id == subject && e.scope() == scope)
            .count()
    }
}
