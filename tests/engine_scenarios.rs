//! End-to-end scenarios for the conflict engine, run through the service
//! layer against the in-memory backend.

use std::sync::Arc;

use chrono::NaiveDate;
use timetable_engine::config::EngineConfig;
use timetable_engine::models::*;
use timetable_engine::service::SchedulingService;
use timetable_engine::store::{
    MemoryAuditLog, MemoryNotifier, MemoryRepository, TimetableRepository,
};
use timetable_engine::ScheduleError;

struct Campus {
    repo: MemoryRepository,
    audit: MemoryAuditLog,
    notifier: MemoryNotifier,
    service: SchedulingService<MemoryRepository>,
    session: Session,
    course: Course,
    sec_b: Section,
    sec_c: Section,
    t1: Staff,
    t2: Staff,
    room1: Room,
    room2: Room,
    algo: Subject,
    dbms: Subject,
}

fn campus() -> Campus {
    let repo = MemoryRepository::new();
    let session = repo.add_session(
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
    );
    let course = repo.add_course("CSE");
    let sec_b = repo.add_section(course.id, "B");
    let sec_c = repo.add_section(course.id, "C");
    let semester = repo.add_semester(5, "Semester 5");
    let t1 = repo.add_staff("A. Iyer", Some(course.id));
    let t2 = repo.add_staff("M. Chen", Some(course.id));
    let room1 = repo.add_room("R1", 30);
    let room2 = repo.add_room("R2", 30);
    let algo = repo.add_subject(
        "Algo",
        t1.id,
        3,
        SubjectKind::Lecture,
        &[course.id],
        &[sec_b.id, sec_c.id],
        Some(semester.id),
    );
    let dbms = repo.add_subject(
        "DBMS",
        t2.id,
        3,
        SubjectKind::Lecture,
        &[course.id],
        &[sec_b.id, sec_c.id],
        Some(semester.id),
    );

    let audit = MemoryAuditLog::new();
    let notifier = MemoryNotifier::new();
    let config = EngineConfig {
        suggestion_limit: 5,
        generator_seed: Some(1234),
    };
    let service = SchedulingService::new(
        Arc::new(repo.clone()),
        Arc::new(audit.clone()),
        Arc::new(notifier.clone()),
        config,
    );
    Campus {
        repo,
        audit,
        notifier,
        service,
        session,
        course,
        sec_b,
        sec_c,
        t1,
        t2,
        room1,
        room2,
        algo,
        dbms,
    }
}

fn draft(c: &Campus, subject: &Subject, section: &Section, room: &Room, day: Day, period: u8) -> EntryDraft {
    EntryDraft {
        session_id: c.session.id,
        course_id: c.course.id,
        section_id: Some(section.id),
        subject_id: subject.id,
        staff_id: subject.staff_id,
        room_id: room.id,
        day,
        period,
        duration: 1,
        is_lab: false,
        replaces: None,
    }
}

fn tag(err: &ScheduleError) -> &'static str {
    err.rejection().expect("expected a conflict rejection").tag()
}

#[tokio::test]
async fn test_weekly_quota_is_enforced_per_section() {
    let c = campus();
    for (day, period) in [(Day::Mon, 1), (Day::Tue, 2), (Day::Wed, 3)] {
        c.service
            .create_entry("hod", draft(&c, &c.algo, &c.sec_b, &c.room1, day, period))
            .await
            .unwrap();
    }

    let err = c
        .service
        .create_entry("hod", draft(&c, &c.algo, &c.sec_b, &c.room2, Day::Thu, 2))
        .await
        .unwrap_err();
    assert_eq!(tag(&err), "quota-exceeded");

    // the other section is its own quota scope
    c.service
        .create_entry("hod", draft(&c, &c.algo, &c.sec_c, &c.room2, Day::Thu, 2))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unavailability_rejects_with_alternatives() {
    let c = campus();
    c.service
        .record_unavailability(
            "staff",
            UnavailabilityDraft {
                staff_id: c.t1.id,
                session_id: c.session.id,
                day: Day::Wed,
                period: 1,
                duration: 1,
                reason: "Busy".to_string(),
                exception_date: None,
                recurring_weekly: true,
                repeat_until: None,
            },
        )
        .await
        .unwrap();

    let err = c
        .service
        .create_entry("hod", draft(&c, &c.algo, &c.sec_b, &c.room1, Day::Wed, 1))
        .await
        .unwrap_err();
    let rejection = err.rejection().unwrap();
    assert_eq!(rejection.tag(), "unavailable");
    assert!(!rejection.suggestions().is_empty());
    assert!(rejection
        .suggestions()
        .iter()
        .all(|s| (s.day, s.period) != (Day::Wed, 1)));
    assert!(rejection.to_string().contains("Suggested alternatives"));

    // colleagues in the course hear about the opening
    let staff_messages = c.notifier.staff_messages();
    assert!(staff_messages
        .iter()
        .any(|(staff, message)| *staff == c.t2.id && message.contains("Extra slot available")));
}

#[tokio::test]
async fn test_same_staff_cannot_teach_two_sections_at_once() {
    let c = campus();
    c.service
        .create_entry("hod", draft(&c, &c.algo, &c.sec_b, &c.room1, Day::Tue, 3))
        .await
        .unwrap();

    let err = c
        .service
        .create_entry("hod", draft(&c, &c.algo, &c.sec_c, &c.room2, Day::Tue, 3))
        .await
        .unwrap_err();
    assert_eq!(tag(&err), "staff-conflict");
}

#[tokio::test]
async fn test_section_and_room_exclusivity() {
    let c = campus();
    c.service
        .create_entry("hod", draft(&c, &c.algo, &c.sec_b, &c.room1, Day::Mon, 2))
        .await
        .unwrap();

    // same section, different teacher and room
    let err = c
        .service
        .create_entry("hod", draft(&c, &c.dbms, &c.sec_b, &c.room2, Day::Mon, 2))
        .await
        .unwrap_err();
    assert_eq!(tag(&err), "section-conflict");

    // same room, different section
    let err = c
        .service
        .create_entry("hod", draft(&c, &c.dbms, &c.sec_c, &c.room1, Day::Mon, 2))
        .await
        .unwrap_err();
    assert_eq!(tag(&err), "room-conflict");
}

#[tokio::test]
async fn test_one_meeting_per_subject_per_day() {
    let c = campus();
    c.service
        .create_entry("hod", draft(&c, &c.algo, &c.sec_b, &c.room1, Day::Mon, 1))
        .await
        .unwrap();

    let err = c
        .service
        .create_entry("hod", draft(&c, &c.algo, &c.sec_b, &c.room1, Day::Mon, 4))
        .await
        .unwrap_err();
    assert_eq!(tag(&err), "one-per-day");
}

#[tokio::test]
async fn test_generation_fills_quotas_then_creates_nothing_more() {
    let c = campus();
    let summary = c
        .service
        .generate_schedule("hod", c.session.id, Some(99))
        .await
        .unwrap();
    // 2 subjects x 2 sections x 3 credits
    assert_eq!(summary.created, 12);

    let entries = c.repo.list_entries(c.session.id).await.unwrap();
    for subject in [&c.algo, &c.dbms] {
        for section in [&c.sec_b, &c.sec_c] {
            let count = entries
                .iter()
                .filter(|e| e.subject_id == subject.id && e.section_id == Some(section.id))
                .count();
            assert_eq!(count, 3, "{} {}", subject.name, section.name);
        }
    }

    // accepted entries never overlap on staff, room, or section
    for a in &entries {
        for b in &entries {
            if a.id == b.id || a.day != b.day || !a.span().overlaps(&b.span()) {
                continue;
            }
            assert_ne!(a.staff_id, b.staff_id);
            assert_ne!(a.room_id, b.room_id);
            assert_ne!(a.scope(), b.scope());
        }
    }

    // a second run on the packed week is a no-op
    let again = c
        .service
        .generate_schedule("hod", c.session.id, Some(100))
        .await
        .unwrap();
    assert_eq!(again.created, 0);
}

#[tokio::test]
async fn test_generation_is_reproducible_with_a_seed() {
    let c1 = campus();
    let c2 = campus();
    c1.service
        .generate_schedule("hod", c1.session.id, Some(7))
        .await
        .unwrap();
    c2.service
        .generate_schedule("hod", c2.session.id, Some(7))
        .await
        .unwrap();

    assert_eq!(
        picture(&c1.repo, c1.session.id).await,
        picture(&c2.repo, c2.session.id).await
    );
}

async fn picture(
    repo: &MemoryRepository,
    session: SessionId,
) -> Vec<(i64, Option<i64>, Day, u8)> {
    repo.list_entries(session)
        .await
        .unwrap()
        .into_iter()
        .map(|e| (e.subject_id.0, e.section_id.map(|s| s.0), e.day, e.period))
        .collect()
}

#[tokio::test]
async fn test_erase_schedule_resets_the_session() {
    let c = campus();
    c.service
        .generate_schedule("hod", c.session.id, Some(3))
        .await
        .unwrap();
    assert!(c.repo.entry_count() > 0);

    let removed = c.service.erase_schedule("hod", c.session.id).await.unwrap();
    assert_eq!(removed, 12);
    assert_eq!(c.repo.entry_count(), 0);

    // generation after erase starts from scratch
    let summary = c
        .service
        .generate_schedule("hod", c.session.id, Some(4))
        .await
        .unwrap();
    assert_eq!(summary.created, 12);
}

#[tokio::test]
async fn test_rejections_are_audited_operations_only() {
    let c = campus();
    c.service
        .create_entry("hod", draft(&c, &c.algo, &c.sec_b, &c.room1, Day::Mon, 1))
        .await
        .unwrap();
    let records = c.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action.as_str(), "schedule");
    assert_eq!(records[0].actor, "hod");

    // a rejected placement commits nothing and audits nothing
    let _ = c
        .service
        .create_entry("hod", draft(&c, &c.algo, &c.sec_b, &c.room1, Day::Mon, 4))
        .await
        .unwrap_err();
    assert_eq!(c.audit.records().len(), 1);
    assert_eq!(c.repo.entry_count(), 1);
}

#[tokio::test]
async fn test_bad_input_is_rejected_before_conflicts() {
    let c = campus();
    let mut d = draft(&c, &c.algo, &c.sec_b, &c.room1, Day::Mon, 7);
    let err = c.service.create_entry("hod", d.clone()).await.unwrap_err();
    assert_eq!(tag(&err), "bad-period");

    d.period = 6;
    d.duration = 2;
    d.is_lab = true;
    let err = c.service.create_entry("hod", d).await.unwrap_err();
    assert_eq!(tag(&err), "span-overflow");

    let mut d = draft(&c, &c.algo, &c.sec_b, &c.room1, Day::Mon, 1);
    d.staff_id = c.t2.id;
    let err = c.service.create_entry("hod", d).await.unwrap_err();
    assert_eq!(tag(&err), "staff-mismatch");
}
