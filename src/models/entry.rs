//! Placement records and the extra-class records derived from them.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::catalog::{CourseId, RoomId, SectionId, SessionId, StaffId, SubjectId};
use super::slot::{Day, Slot, SlotSpan};

crate::define_id_type!(i64, EntryId);
crate::define_id_type!(i64, ExtraSlotId);
crate::define_id_type!(i64, RequestId);
crate::define_id_type!(i64, ExtraScheduleId);

/// Grouping key for the one-per-day, adjacency and quota rules: the section
/// a placement targets, or the whole course when unsectioned.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupScope {
    Section(SectionId),
    Course(CourseId),
}

/// A scheduled class meeting in the weekly grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: EntryId,
    pub session_id: SessionId,
    pub course_id: CourseId,
    pub section_id: Option<SectionId>,
    pub subject_id: SubjectId,
    pub staff_id: StaffId,
    pub room_id: RoomId,
    pub day: Day,
    pub period: u8,
    pub duration: u8,
    pub is_lab: bool,
}

impl TimetableEntry {
    pub fn span(&self) -> SlotSpan {
        SlotSpan::new(self.period, self.duration)
    }

    pub fn scope(&self) -> GroupScope {
        match self.section_id {
            Some(section) => GroupScope::Section(section),
            None => GroupScope::Course(self.course_id),
        }
    }

    pub fn slot(&self) -> Slot {
        Slot {
            day: self.day,
            period: self.period,
        }
    }
}

/// Field set for a placement that has not been committed yet.
///
/// `replaces` carries the id of an entry being re-validated in place; that
/// entry is excluded from conflict lookups and swapped out on commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDraft {
    pub session_id: SessionId,
    pub course_id: CourseId,
    pub section_id: Option<SectionId>,
    pub subject_id: SubjectId,
    pub staff_id: StaffId,
    pub room_id: RoomId,
    pub day: Day,
    pub period: u8,
    pub duration: u8,
    pub is_lab: bool,
    pub replaces: Option<EntryId>,
}

impl EntryDraft {
    pub fn span(&self) -> SlotSpan {
        SlotSpan::new(self.period, self.duration)
    }

    pub fn scope(&self) -> GroupScope {
        match self.section_id {
            Some(section) => GroupScope::Section(section),
            None => GroupScope::Course(self.course_id),
        }
    }

    pub fn into_entry(self, id: EntryId) -> TimetableEntry {
        TimetableEntry {
            id,
            session_id: self.session_id,
            course_id: self.course_id,
            section_id: self.section_id,
            subject_id: self.subject_id,
            staff_id: self.staff_id,
            room_id: self.room_id,
            day: self.day,
            period: self.period,
            duration: self.duration,
            is_lab: self.is_lab,
        }
    }
}

/// A claimable slot published when a scheduled teacher becomes unavailable.
///
/// Unique per (session, day, period, room) and per (session, day, period,
/// course); claimed at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraClassAvailability {
    pub id: ExtraSlotId,
    pub session_id: SessionId,
    pub course_id: CourseId,
    pub day: Day,
    pub period: u8,
    pub duration: u8,
    pub room_id: RoomId,
    /// Entry this slot was derived from, when known.
    pub created_from: Option<EntryId>,
    pub claimed_by: Option<StaffId>,
    pub subject_id: Option<SubjectId>,
}

impl ExtraClassAvailability {
    pub fn is_open(&self) -> bool {
        self.claimed_by.is_none()
    }

    pub fn span(&self) -> SlotSpan {
        SlotSpan::new(self.period, self.duration)
    }

    pub fn slot(&self) -> Slot {
        Slot {
            day: self.day,
            period: self.period,
        }
    }
}

/// Field set for an extra slot that has not been published yet. Publication
/// is an upsert keyed on (session, day, period, room) and (session, day,
/// period, course).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraSlotDraft {
    pub session_id: SessionId,
    pub course_id: CourseId,
    pub day: Day,
    pub period: u8,
    pub duration: u8,
    pub room_id: RoomId,
    pub created_from: Option<EntryId>,
}

impl ExtraSlotDraft {
    pub fn into_slot(self, id: ExtraSlotId) -> ExtraClassAvailability {
        ExtraClassAvailability {
            id,
            session_id: self.session_id,
            course_id: self.course_id,
            day: self.day,
            period: self.period,
            duration: self.duration,
            room_id: self.room_id,
            created_from: self.created_from,
            claimed_by: None,
            subject_id: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Requested,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Requested => "requested",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// An out-of-band extra meeting a teacher has asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraClassRequest {
    pub id: RequestId,
    pub staff_id: StaffId,
    pub subject_id: SubjectId,
    pub course_id: CourseId,
    pub session_id: SessionId,
    pub preferred_day: Option<Day>,
    pub preferred_period: Option<u8>,
    pub note: String,
    pub status: RequestStatus,
}

/// Field set for a request that has not been submitted yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDraft {
    pub staff_id: StaffId,
    pub subject_id: SubjectId,
    pub course_id: CourseId,
    pub session_id: SessionId,
    pub preferred_day: Option<Day>,
    pub preferred_period: Option<u8>,
    pub note: String,
}

impl RequestDraft {
    pub fn into_request(self, id: RequestId) -> ExtraClassRequest {
        ExtraClassRequest {
            id,
            staff_id: self.staff_id,
            subject_id: self.subject_id,
            course_id: self.course_id,
            session_id: self.session_id,
            preferred_day: self.preferred_day,
            preferred_period: self.preferred_period,
            note: self.note,
            status: RequestStatus::Requested,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraClassStatus {
    Pending,
    Approved,
    Scheduled,
    Rejected,
    Cancelled,
}

impl ExtraClassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtraClassStatus::Pending => "pending",
            ExtraClassStatus::Approved => "approved",
            ExtraClassStatus::Scheduled => "scheduled",
            ExtraClassStatus::Rejected => "rejected",
            ExtraClassStatus::Cancelled => "cancelled",
        }
    }
}

/// An approved-or-pending extra meeting pinned to a wall-clock time.
///
/// On transition to `Scheduled` the start time maps onto the weekly grid
/// through six one-hour buckets from 09:00 to 15:00.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraClassSchedule {
    pub id: ExtraScheduleId,
    pub staff_id: StaffId,
    pub subject_id: SubjectId,
    pub course_id: CourseId,
    pub session_id: SessionId,
    pub start_at: NaiveDateTime,
    pub duration_minutes: u32,
    pub room_id: Option<RoomId>,
    pub requires_approval: bool,
    pub status: ExtraClassStatus,
}

impl ExtraClassSchedule {
    /// Maps the wall-clock start to a grid cell. Times outside 09:00-15:00
    /// or on weekends do not map.
    pub fn grid_slot(&self) -> Option<Slot> {
        let day = Day::from_weekday(self.start_at.weekday())?;
        let hour = self.start_at.time().hour();
        if !(9..15).contains(&hour) {
            return None;
        }
        Some(Slot {
            day,
            period: (hour - 9 + 1) as u8,
        })
    }

    /// Grid periods this class occupies, one per started hour.
    pub fn grid_duration(&self) -> u8 {
        ((self.duration_minutes as f64 / 60.0).round() as u8).max(1)
    }
}

/// Field set for an extra class that has not been recorded yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraScheduleDraft {
    pub staff_id: StaffId,
    pub subject_id: SubjectId,
    pub course_id: CourseId,
    pub session_id: SessionId,
    pub start_at: NaiveDateTime,
    pub duration_minutes: u32,
    pub room_id: Option<RoomId>,
    pub requires_approval: bool,
}

impl ExtraScheduleDraft {
    pub fn into_schedule(self, id: ExtraScheduleId, status: ExtraClassStatus) -> ExtraClassSchedule {
        ExtraClassSchedule {
            id,
            staff_id: self.staff_id,
            subject_id: self.subject_id,
            course_id: self.course_id,
            session_id: self.session_id,
            start_at: self.start_at,
            duration_minutes: self.duration_minutes,
            room_id: self.room_id,
            requires_approval: self.requires_approval,
            status,
        }
    }
}
