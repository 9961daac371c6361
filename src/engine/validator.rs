//! Conflict validation for candidate placements.
//!
//! [`validate`] applies every invariant in a fixed order and rejects with
//! the first violated rule, so callers always see the same reason for the
//! same board state. The function is pure: persistence of an accepted
//! candidate is the caller's responsibility, inside one atomic commit.

use rand::rngs::StdRng;

use crate::models::{Day, EntryDraft, Slot, FIRST_PERIOD, PERIODS_PER_DAY};

use super::context::{PlacementMode, ValidationContext};
use super::suggest;

/// Why a candidate placement was refused.
///
/// The conflict-shaped variants carry alternative slots found by the
/// suggestion search and render them into the message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("subject '{subject}' is not offered in the selected course")]
    SubjectCourseMismatch { subject: String },

    #[error("subject '{subject}' is not offered to the selected section")]
    SubjectSectionMismatch { subject: String },

    #[error("selected staff is not assigned to subject '{subject}'")]
    StaffMismatch { subject: String },

    #[error("period must be between 1 and 6, got {period}")]
    BadPeriod { period: u8 },

    #[error("duration must be at least 1 period, got {duration}")]
    BadDuration { duration: u8 },

    #[error("lab classes must span exactly 2 periods, got {duration}")]
    LabDuration { duration: u8 },

    #[error("class starting at P{period} for {duration} period(s) runs past the end of the day")]
    SpanOverflow { period: u8, duration: u8 },

    #[error("staff is unavailable on {day} P{period}{}", format_suggestions(.suggestions))]
    Unavailable {
        day: Day,
        period: u8,
        suggestions: Vec<Slot>,
    },

    #[error("staff already teaches on {day} P{period}{}", format_suggestions(.suggestions))]
    StaffConflict {
        day: Day,
        period: u8,
        suggestions: Vec<Slot>,
    },

    #[error("room is already booked on {day} P{period}{}", format_suggestions(.suggestions))]
    RoomConflict {
        day: Day,
        period: u8,
        suggestions: Vec<Slot>,
    },

    #[error(
        "the section or course already has a class on {day} P{period}{}",
        format_suggestions(.suggestions)
    )]
    SectionConflict {
        day: Day,
        period: u8,
        suggestions: Vec<Slot>,
    },

    #[error("subject '{subject}' already meets on {day}")]
    OnePerDay { subject: String, day: Day },

    #[error("subject '{subject}' would meet in consecutive periods on {day}")]
    Adjacency { subject: String, day: Day },

    #[error(
        "weekly credits limit exceeded: {scheduled} scheduled + 1 > allowed {credits} for '{subject}'"
    )]
    QuotaExceeded {
        subject: String,
        scheduled: usize,
        credits: u32,
    },
}

fn format_suggestions(slots: &[Slot]) -> String {
    if slots.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
    format!(". Suggested alternatives: {}", rendered.join(", "))
}

impl Rejection {
    /// Stable machine tag for the rejection class.
    pub fn tag(&self) -> &'static str {
        match self {
            Rejection::SubjectCourseMismatch { .. } => "subject-course-mismatch",
            Rejection::SubjectSectionMismatch { .. } => "subject-section-mismatch",
            Rejection::StaffMismatch { .. } => "staff-mismatch",
            Rejection::BadPeriod { .. } => "bad-period",
            Rejection::BadDuration { .. } => "bad-duration",
            Rejection::LabDuration { .. } => "lab-duration",
            Rejection::SpanOverflow { .. } => "span-overflow",
            Rejection::Unavailable { .. } => "unavailable",
            Rejection::StaffConflict { .. } => "staff-conflict",
            Rejection::RoomConflict { .. } => "room-conflict",
            Rejection::SectionConflict { .. } => "section-conflict",
            Rejection::OnePerDay { .. } => "one-per-day",
            Rejection::Adjacency { .. } => "adjacency",
            Rejection::QuotaExceeded { .. } => "quota-exceeded",
        }
    }

    /// Alternative slots attached to conflict rejections, empty otherwise.
    pub fn suggestions(&self) -> &[Slot] {
        match self {
            Rejection::Unavailable { suggestions, .. }
            | Rejection::StaffConflict { suggestions, .. }
            | Rejection::RoomConflict { suggestions, .. }
            | Rejection::SectionConflict { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}

/// Validates a candidate placement against the session snapshot.
///
/// Check order, short-circuiting on the first failure: membership, ranges,
/// staff unavailability, then (outside extra-slot fills) one-per-day,
/// exclusivity across the span, adjacency and the weekly quota. Returns the
/// placement mode the candidate was accepted under.
pub fn validate(
    draft: &EntryDraft,
    ctx: &ValidationContext<'_>,
    rng: &mut StdRng,
) -> Result<PlacementMode, Rejection> {
    let subject = ctx.subject;

    // 1. membership
    if !subject.offered_in_course(draft.course_id) {
        return Err(Rejection::SubjectCourseMismatch {
            subject: subject.name.clone(),
        });
    }
    if let Some(section) = draft.section_id {
        if !subject.offered_to_section(section) {
            return Err(Rejection::SubjectSectionMismatch {
                subject: subject.name.clone(),
            });
        }
    }
    if subject.staff_id != draft.staff_id {
        return Err(Rejection::StaffMismatch {
            subject: subject.name.clone(),
        });
    }

    // 2. ranges
    if !(FIRST_PERIOD..=PERIODS_PER_DAY).contains(&draft.period) {
        return Err(Rejection::BadPeriod {
            period: draft.period,
        });
    }
    if draft.duration < 1 {
        return Err(Rejection::BadDuration {
            duration: draft.duration,
        });
    }
    if draft.is_lab && draft.duration != 2 {
        return Err(Rejection::LabDuration {
            duration: draft.duration,
        });
    }
    let span = draft.span();
    if !span.fits_in_day() {
        return Err(Rejection::SpanOverflow {
            period: draft.period,
            duration: draft.duration,
        });
    }

    // 3. staff unavailability over the whole span
    if ctx
        .staff_unavailable(draft.staff_id, draft.day, &span)
        .is_some()
    {
        return Err(Rejection::Unavailable {
            day: draft.day,
            period: draft.period,
            suggestions: suggest::suggest(draft, ctx, ctx.suggestion_limit, rng),
        });
    }

    // 4. does the candidate fill a published extra slot?
    let mode = ctx.mode_for(draft);
    let scope = draft.scope();

    // 5. one meeting per subject per day
    if mode == PlacementMode::Normal
        && ctx.subject_meets_on(draft.subject_id, scope, draft.day, draft.replaces)
    {
        return Err(Rejection::OnePerDay {
            subject: subject.name.clone(),
            day: draft.day,
        });
    }

    // 6. exclusivity across the span
    for period in span.periods() {
        if ctx.staff_busy(draft.staff_id, draft.day, period, draft.replaces) {
            return Err(Rejection::StaffConflict {
                day: draft.day,
                period,
                suggestions: suggest::suggest(draft, ctx, ctx.suggestion_limit, rng),
            });
        }
        if ctx.room_busy(draft.room_id, draft.day, period, draft.replaces) {
            return Err(Rejection::RoomConflict {
                day: draft.day,
                period,
                suggestions: suggest::suggest(draft, ctx, ctx.suggestion_limit, rng),
            });
        }
        if mode == PlacementMode::Normal
            && ctx.scope_busy(scope, draft.day, period, draft.replaces)
        {
            return Err(Rejection::SectionConflict {
                day: draft.day,
                period,
                suggestions: suggest::suggest(draft, ctx, ctx.suggestion_limit, rng),
            });
        }
    }

    // 7. no same-subject meeting in the adjacent periods
    if mode == PlacementMode::Normal {
        for period in span.adjacent_periods() {
            if ctx.subject_at(draft.subject_id, scope, draft.day, period, draft.replaces) {
                return Err(Rejection::Adjacency {
                    subject: subject.name.clone(),
                    day: draft.day,
                });
            }
        }
    }

    // 8. weekly quota
    if mode == PlacementMode::Normal && subject.credits > 0 {
        let scheduled = ctx.scope_count(draft.subject_id, scope, draft.replaces);
        if scheduled + 1 > subject.credits as usize {
            return Err(Rejection::QuotaExceeded {
                subject: subject.name.clone(),
                scheduled,
                credits: subject.credits,
            });
        }
    }

    Ok(mode)
}
