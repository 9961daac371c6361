//! Alternative-slot search.
//!
//! A satisfiability scan over the week: it returns the first feasible
//! (day, period) cells for the candidate's staff and group, not the best
//! ones. Rooms are probed in shuffled order so availability never leans on
//! whichever room happens to sort first.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::models::{Day, EntryDraft, Room, Slot, SlotSpan, FIRST_PERIOD};

use super::context::ValidationContext;

/// Finds up to `limit` alternative slots for a refused candidate.
///
/// A slot qualifies when the staff is available and unbooked over the whole
/// span, the candidate's section-or-course group is free, the group has no
/// meeting of this subject that day or in an adjacent period, and at least
/// one room is free across the span. The candidate's own slot is skipped.
/// A candidate already at its weekly quota gets no suggestions: no cell in
/// the week could accept it.
pub fn suggest(
    draft: &EntryDraft,
    ctx: &ValidationContext<'_>,
    limit: usize,
    rng: &mut StdRng,
) -> Vec<Slot> {
    let mut found = Vec::new();
    if limit == 0 {
        return found;
    }

    let duration = draft.duration.max(1);
    let scope = draft.scope();

    if ctx.subject.credits > 0
        && ctx.scope_count(draft.subject_id, scope, draft.replaces) + 1
            > ctx.subject.credits as usize
    {
        return found;
    }

    let mut rooms: Vec<&Room> = ctx.rooms.iter().collect();
    rooms.shuffle(rng);

    for day in Day::ALL {
        for start in FIRST_PERIOD..=SlotSpan::max_start(duration) {
            if day == draft.day && start == draft.period {
                continue;
            }
            let span = SlotSpan::new(start, duration);
            if ctx.staff_unavailable(draft.staff_id, day, &span).is_some() {
                continue;
            }
            let busy = span.periods().any(|p| {
                ctx.staff_busy(draft.staff_id, day, p, draft.replaces)
                    || ctx.scope_busy(scope, day, p, draft.replaces)
            });
            if busy {
                continue;
            }
            if ctx.subject_meets_on(draft.subject_id, scope, day, draft.replaces) {
                continue;
            }
            let crowded = span.adjacent_periods().into_iter().any(|p| {
                ctx.subject_at(draft.subject_id, scope, day, p, draft.replaces)
            });
            if crowded {
                continue;
            }
            let room_free = rooms.iter().any(|room| {
                !span
                    .periods()
                    .any(|p| ctx.room_busy(room.id, day, p, draft.replaces))
            });
            if !room_free {
                continue;
            }

            found.push(Slot { day, period: start });
            if found.len() >= limit {
                return found;
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::validator;
    use crate::models::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn subject() -> Subject {
        Subject {
            id: SubjectId(1),
            name: "Algorithms".to_string(),
            staff_id: StaffId(1),
            course_ids: HashSet::from([CourseId(1)]),
            section_ids: HashSet::from([SectionId(1)]),
            semester_id: None,
            credits: 5,
            kind: SubjectKind::Lecture,
        }
    }

    fn rooms() -> Vec<Room> {
        vec![
            Room {
                id: RoomId(1),
                name: "R1".to_string(),
                capacity: 30,
            },
            Room {
                id: RoomId(2),
                name: "R2".to_string(),
                capacity: 40,
            },
        ]
    }

    fn draft(day: Day, period: u8) -> EntryDraft {
        EntryDraft {
            session_id: SessionId(1),
            course_id: CourseId(1),
            section_id: Some(SectionId(1)),
            subject_id: SubjectId(1),
            staff_id: StaffId(1),
            room_id: RoomId(1),
            day,
            period,
            duration: 1,
            is_lab: false,
            replaces: None,
        }
    }

    fn entry(id: i64, day: Day, period: u8, staff: i64, room: i64) -> TimetableEntry {
        TimetableEntry {
            id: EntryId(id),
            session_id: SessionId(1),
            course_id: CourseId(1),
            section_id: Some(SectionId(1)),
            subject_id: SubjectId(9),
            staff_id: StaffId(staff),
            room_id: RoomId(room),
            day,
            period,
            duration: 1,
            is_lab: false,
        }
    }

    #[test]
    fn test_skips_candidate_slot_and_respects_limit() {
        let subject = subject();
        let rooms = rooms();
        let ctx = ValidationContext {
            subject: &subject,
            entries: &[],
            unavailability: &[],
            open_slots: &[],
            rooms: &rooms,
            on_date: None,
            suggestion_limit: 5,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let slots = suggest(&draft(Day::Mon, 1), &ctx, 5, &mut rng);
        assert_eq!(slots.len(), 5);
        assert!(!slots.contains(&Slot {
            day: Day::Mon,
            period: 1
        }));
    }

    #[test]
    fn test_suggested_slots_pass_the_validator() {
        let subject = subject();
        let rooms = rooms();
        // Staff booked Mon P2, section busy Tue P1, staff unavailable Wed P1.
        let entries = vec![entry(1, Day::Mon, 2, 1, 2), entry(2, Day::Tue, 1, 7, 2)];
        let windows = vec![StaffUnavailability {
            id: UnavailabilityId(1),
            staff_id: StaffId(1),
            session_id: SessionId(1),
            day: Day::Wed,
            period: 1,
            duration: 1,
            reason: String::new(),
            exception_date: None,
            recurring_weekly: true,
            repeat_until: None,
        }];
        let ctx = ValidationContext {
            subject: &subject,
            entries: &entries,
            unavailability: &windows,
            open_slots: &[],
            rooms: &rooms,
            on_date: None,
            suggestion_limit: 5,
        };
        let mut rng = StdRng::seed_from_u64(3);
        let slots = suggest(&draft(Day::Mon, 1), &ctx, 10, &mut rng);
        assert!(!slots.is_empty());
        for slot in slots {
            assert_ne!(
                (slot.day, slot.period),
                (Day::Wed, 1),
                "unavailable cell must not be suggested"
            );
            let mut candidate = draft(slot.day, slot.period);
            // Room availability was already confirmed by the search; pick a
            // room that is free at the suggested cell.
            let free_room = rooms
                .iter()
                .find(|r| !ctx.room_busy(r.id, slot.day, slot.period, None))
                .expect("search guaranteed a free room");
            candidate.room_id = free_room.id;
            let mut vrng = StdRng::seed_from_u64(0);
            assert!(
                validator::validate(&candidate, &ctx, &mut vrng).is_ok(),
                "suggested {slot} failed validation"
            );
        }
    }

    #[test]
    fn test_empty_when_subject_is_at_quota() {
        let mut subject = subject();
        subject.credits = 3;
        let rooms = rooms();
        // three meetings already on the books for this subject and section
        let mut entries = Vec::new();
        for (i, day) in [Day::Mon, Day::Tue, Day::Wed].into_iter().enumerate() {
            let mut e = entry(i as i64 + 1, day, 1, 1, 1);
            e.subject_id = SubjectId(1);
            entries.push(e);
        }
        let ctx = ValidationContext {
            subject: &subject,
            entries: &entries,
            unavailability: &[],
            open_slots: &[],
            rooms: &rooms,
            on_date: None,
            suggestion_limit: 5,
        };
        let mut rng = StdRng::seed_from_u64(5);
        // a fourth placement can pass nowhere in the week
        assert!(suggest(&draft(Day::Thu, 1), &ctx, 5, &mut rng).is_empty());

        // re-validating one of the three into a new slot is still suggestible
        let mut replacement = draft(Day::Thu, 1);
        replacement.replaces = Some(EntryId(1));
        assert!(!suggest(&replacement, &ctx, 5, &mut rng).is_empty());
    }

    #[test]
    fn test_empty_when_week_is_saturated() {
        let subject = subject();
        let rooms = vec![rooms().remove(0)];
        // The candidate's staff teaches every period of the week.
        let mut entries = Vec::new();
        let mut id = 0;
        for day in Day::ALL {
            for period in 1..=6 {
                id += 1;
                entries.push(entry(id, day, period, 1, 1));
            }
        }
        let ctx = ValidationContext {
            subject: &subject,
            entries: &entries,
            unavailability: &[],
            open_slots: &[],
            rooms: &rooms,
            on_date: None,
            suggestion_limit: 5,
        };
        let mut rng = StdRng::seed_from_u64(9);
        assert!(suggest(&draft(Day::Mon, 1), &ctx, 5, &mut rng).is_empty());
    }
}
