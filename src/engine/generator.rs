//! Greedy weekly schedule generation.
//!
//! Fills a session's week subject by subject until every weekly quota is
//! met or the grid is exhausted. The scan order over subjects, days, start
//! periods and rooms is shuffled with an explicitly-seeded RNG: repeated
//! runs spread load across the week instead of piling into Monday morning,
//! and a fixed seed reproduces a run exactly.
//!
//! Planning is pure. The caller commits each planned placement through the
//! storage layer's atomic insert and folds commit failures back into the
//! summary, so a crashed or raced run can simply be re-run: subjects
//! already at quota are skipped up front.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::models::{
    Course, CourseId, Day, EntryDraft, EntryId, ExtraClassAvailability, GroupScope, Room, Section,
    SectionId, Session, SlotSpan, StaffUnavailability, Subject, TimetableEntry, FIRST_PERIOD,
};

use super::context::ValidationContext;
use super::validator;

/// Outcome of one generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationSummary {
    pub created: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Catalog slice the generator plans against.
pub struct GeneratorInputs<'a> {
    pub session: &'a Session,
    pub subjects: &'a [Subject],
    pub courses: &'a [Course],
    pub sections: &'a [Section],
    pub rooms: &'a [Room],
    pub unavailability: &'a [StaffUnavailability],
    pub open_slots: &'a [ExtraClassAvailability],
    pub suggestion_limit: usize,
}

/// Placements the generator wants committed, plus the rejections it ran
/// into while planning.
#[derive(Debug, Default)]
pub struct GenerationPlan {
    pub placements: Vec<EntryDraft>,
    pub skipped: usize,
    pub errors: Vec<String>,
}

enum Attempt {
    Skip,
    Reject(validator::Rejection),
    Place(EntryDraft),
}

/// Plans a week of placements for every under-quota subject.
pub fn plan_week(
    inputs: &GeneratorInputs<'_>,
    existing: &[TimetableEntry],
    rng: &mut StdRng,
) -> GenerationPlan {
    let mut plan = GenerationPlan::default();
    let mut working: Vec<TimetableEntry> = existing.to_vec();
    // provisional ids for planned entries; real ids are assigned on commit
    let mut next_provisional = -1i64;

    let mut subjects: Vec<&Subject> = inputs
        .subjects
        .iter()
        .filter(|s| s.credits > 0)
        .collect();
    subjects.shuffle(rng);

    for subject in subjects {
        let duration = subject.kind.meeting_duration();

        // sort before shuffling so the seeded order does not depend on
        // hash-set iteration
        let mut courses: Vec<_> = subject.course_ids.iter().copied().collect();
        courses.sort();
        courses.shuffle(rng);

        for course_id in courses {
            let mut scopes: Vec<Option<SectionId>> = inputs
                .sections
                .iter()
                .filter(|sec| sec.course_id == course_id && subject.offered_to_section(sec.id))
                .map(|sec| Some(sec.id))
                .collect();
            if scopes.is_empty() {
                scopes.push(None);
            }

            for section_id in scopes {
                let scope = match section_id {
                    Some(section) => GroupScope::Section(section),
                    None => GroupScope::Course(course_id),
                };
                let placed = working
                    .iter()
                    .filter(|e| {
                        e.session_id == inputs.session.id
                            && e.subject_id == subject.id
                            && e.scope() == scope
                    })
                    .count();
                let mut remaining = (subject.credits as usize).saturating_sub(placed);
                if remaining == 0 {
                    continue;
                }

                let mut days = Day::ALL.to_vec();
                days.shuffle(rng);

                'days: for day in days {
                    if remaining == 0 {
                        break;
                    }
                    let mut starts: Vec<u8> =
                        (FIRST_PERIOD..=SlotSpan::max_start(duration)).collect();
                    starts.shuffle(rng);

                    for start in starts {
                        if remaining == 0 {
                            break 'days;
                        }
                        let attempt = try_slot(
                            inputs, subject, course_id, section_id, scope, day, start, duration,
                            &working, rng,
                        );
                        match attempt {
                            Attempt::Skip => plan.skipped += 1,
                            Attempt::Reject(rejection) => {
                                plan.skipped += 1;
                                plan.errors.push(format!(
                                    "{} {} on {} P{}: {}",
                                    subject.name,
                                    scope_label(inputs, course_id, section_id),
                                    day,
                                    start,
                                    rejection
                                ));
                            }
                            Attempt::Place(draft) => {
                                plan.placements.push(draft.clone());
                                working.push(draft.into_entry(EntryId(next_provisional)));
                                next_provisional -= 1;
                                remaining -= 1;
                                // one meeting per day for this subject
                                continue 'days;
                            }
                        }
                    }
                }
            }
        }
    }
    plan
}

#[allow(clippy::too_many_arguments)]
fn try_slot(
    inputs: &GeneratorInputs<'_>,
    subject: &Subject,
    course_id: CourseId,
    section_id: Option<SectionId>,
    scope: GroupScope,
    day: Day,
    start: u8,
    duration: u8,
    working: &[TimetableEntry],
    rng: &mut StdRng,
) -> Attempt {
    let span = SlotSpan::new(start, duration);
    let ctx = ValidationContext {
        subject,
        entries: working,
        unavailability: inputs.unavailability,
        open_slots: inputs.open_slots,
        rooms: inputs.rooms,
        on_date: None,
        suggestion_limit: inputs.suggestion_limit,
    };

    // cheap pre-checks before the full validation pass
    if span
        .periods()
        .any(|p| ctx.staff_busy(subject.staff_id, day, p, None))
    {
        return Attempt::Skip;
    }
    if span.periods().any(|p| ctx.scope_busy(scope, day, p, None)) {
        return Attempt::Skip;
    }
    if ctx.staff_unavailable(subject.staff_id, day, &span).is_some() {
        return Attempt::Skip;
    }

    let mut rooms: Vec<&Room> = inputs.rooms.iter().collect();
    rooms.shuffle(rng);
    let room = rooms
        .into_iter()
        .find(|room| !span.periods().any(|p| ctx.room_busy(room.id, day, p, None)));
    let Some(room) = room else {
        return Attempt::Skip;
    };

    let draft = EntryDraft {
        session_id: inputs.session.id,
        course_id,
        section_id,
        subject_id: subject.id,
        staff_id: subject.staff_id,
        room_id: room.id,
        day,
        period: start,
        duration,
        is_lab: subject.kind.is_lab(),
        replaces: None,
    };
    match validator::validate(&draft, &ctx, rng) {
        Ok(_) => Attempt::Place(draft),
        Err(rejection) => Attempt::Reject(rejection),
    }
}

fn scope_label(
    inputs: &GeneratorInputs<'_>,
    course_id: CourseId,
    section_id: Option<SectionId>,
) -> String {
    let course = inputs
        .courses
        .iter()
        .find(|c| c.id == course_id)
        .map(|c| c.name.as_str())
        .unwrap_or("?");
    match section_id {
        Some(id) => {
            let section = inputs
                .sections
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.name.as_str())
                .unwrap_or("?");
            format!("{course}/{section}")
        }
        None => course.to_string(),
    }
}
