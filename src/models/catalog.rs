//! Read-only reference data supplied by the surrounding application.
//!
//! Sessions, courses, sections, subjects, staff, rooms and unavailability
//! windows are created and edited elsewhere; the engine treats them as
//! immutable inputs to its scheduling decisions.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::slot::{Day, SlotSpan};

crate::define_id_type!(i64, SessionId);
crate::define_id_type!(i64, CourseId);
crate::define_id_type!(i64, SectionId);
crate::define_id_type!(i64, SemesterId);
crate::define_id_type!(i64, SubjectId);
crate::define_id_type!(i64, StaffId);
crate::define_id_type!(i64, StudentId);
crate::define_id_type!(i64, RoomId);
crate::define_id_type!(i64, UnavailabilityId);

/// An academic term. Placements are always scoped to one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A program of study. Owns zero or more sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
}

/// A named subdivision of a course ("A", "B", ...). Unique per (course, name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub course_id: CourseId,
    pub name: String,
}

/// Ordinal term number. Tags subjects; the validator never constrains on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Semester {
    pub id: SemesterId,
    pub number: u8,
    pub label: String,
}

/// How a subject's meetings are taught. Labs always occupy a two-period block.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    Lecture,
    Lab,
}

impl SubjectKind {
    pub fn is_lab(&self) -> bool {
        matches!(self, SubjectKind::Lab)
    }

    /// Periods a single meeting occupies.
    pub fn meeting_duration(&self) -> u8 {
        match self {
            SubjectKind::Lecture => 1,
            SubjectKind::Lab => 2,
        }
    }
}

/// A taught subject: one owning teacher, the courses and sections it is
/// offered to, and a weekly meeting quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub staff_id: StaffId,
    pub course_ids: HashSet<CourseId>,
    pub section_ids: HashSet<SectionId>,
    pub semester_id: Option<SemesterId>,
    /// Weekly meeting quota per section, or per course when unsectioned.
    /// Zero excludes the subject from auto-generation.
    pub credits: u32,
    pub kind: SubjectKind,
}

impl Subject {
    pub fn offered_in_course(&self, course: CourseId) -> bool {
        self.course_ids.contains(&course)
    }

    pub fn offered_to_section(&self, section: SectionId) -> bool {
        self.section_ids.contains(&section)
    }
}

/// A teacher. `course_id` is the course the teacher belongs to, used for
/// notification fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub course_id: Option<CourseId>,
}

/// Used only to fan notifications out to a course's students.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub course_id: CourseId,
    pub section_id: Option<SectionId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

/// A window during which a teacher cannot be scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUnavailability {
    pub id: UnavailabilityId,
    pub staff_id: StaffId,
    pub session_id: SessionId,
    pub day: Day,
    pub period: u8,
    pub duration: u8,
    pub reason: String,
    /// One-off date this window does not apply to.
    pub exception_date: Option<NaiveDate>,
    /// When false, the window stops applying after `repeat_until`.
    pub recurring_weekly: bool,
    pub repeat_until: Option<NaiveDate>,
}

/// Field set for an unavailability window that has not been recorded yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailabilityDraft {
    pub staff_id: StaffId,
    pub session_id: SessionId,
    pub day: Day,
    pub period: u8,
    pub duration: u8,
    pub reason: String,
    pub exception_date: Option<NaiveDate>,
    pub recurring_weekly: bool,
    pub repeat_until: Option<NaiveDate>,
}

impl UnavailabilityDraft {
    pub fn into_record(self, id: UnavailabilityId) -> StaffUnavailability {
        StaffUnavailability {
            id,
            staff_id: self.staff_id,
            session_id: self.session_id,
            day: self.day,
            period: self.period,
            duration: self.duration,
            reason: self.reason,
            exception_date: self.exception_date,
            recurring_weekly: self.recurring_weekly,
            repeat_until: self.repeat_until,
        }
    }
}

impl StaffUnavailability {
    pub fn span(&self) -> SlotSpan {
        SlotSpan::new(self.period, self.duration)
    }

    /// Whether this window blocks `span` on `day`.
    ///
    /// A weekly window applies to every occurrence. A dated check is excused
    /// when the date matches `exception_date`, or when the window is
    /// non-recurring and the date falls after `repeat_until`. Checks without
    /// a concrete date treat the window as in force.
    pub fn covers(&self, day: Day, span: &SlotSpan, on_date: Option<NaiveDate>) -> bool {
        if self.day != day || !self.span().overlaps(span) {
            return false;
        }
        if let Some(date) = on_date {
            if self.exception_date == Some(date) {
                return false;
            }
            if !self.recurring_weekly {
                if let Some(until) = self.repeat_until {
                    if date > until {
                        return false;
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> StaffUnavailability {
        StaffUnavailability {
            id: UnavailabilityId(1),
            staff_id: StaffId(1),
            session_id: SessionId(1),
            day: Day::Wed,
            period: 2,
            duration: 2,
            reason: "meeting".to_string(),
            exception_date: None,
            recurring_weekly: true,
            repeat_until: None,
        }
    }

    #[test]
    fn test_covers_overlapping_span() {
        let w = window();
        assert!(w.covers(Day::Wed, &SlotSpan::new(3, 1), None));
        assert!(w.covers(Day::Wed, &SlotSpan::new(1, 2), None));
        assert!(!w.covers(Day::Wed, &SlotSpan::new(4, 1), None));
        assert!(!w.covers(Day::Thu, &SlotSpan::new(2, 1), None));
    }

    #[test]
    fn test_exception_date_excuses_one_occurrence() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 2).unwrap();
        let mut w = window();
        w.exception_date = Some(date);
        assert!(!w.covers(Day::Wed, &SlotSpan::new(2, 1), Some(date)));
        let next_week = NaiveDate::from_ymd_opt(2024, 10, 9).unwrap();
        assert!(w.covers(Day::Wed, &SlotSpan::new(2, 1), Some(next_week)));
    }

    #[test]
    fn test_non_recurring_window_expires() {
        let until = NaiveDate::from_ymd_opt(2024, 10, 2).unwrap();
        let mut w = window();
        w.recurring_weekly = false;
        w.repeat_until = Some(until);
        assert!(w.covers(Day::Wed, &SlotSpan::new(2, 1), Some(until)));
        let later = NaiveDate::from_ymd_opt(2024, 10, 9).unwrap();
        assert!(!w.covers(Day::Wed, &SlotSpan::new(2, 1), Some(later)));
        // undated checks stay conservative
        assert!(w.covers(Day::Wed, &SlotSpan::new(2, 1), None));
    }

    #[test]
    fn test_subject_kind_duration() {
        assert_eq!(SubjectKind::Lecture.meeting_duration(), 1);
        assert_eq!(SubjectKind::Lab.meeting_duration(), 2);
        assert!(SubjectKind::Lab.is_lab());
    }
}
