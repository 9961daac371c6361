//! Unavailability recording, extra-slot publication and claiming, and the
//! extra-class request/schedule workflows.

use crate::engine::{republish, validator, Rejection};
use crate::models::{
    slot_label, CourseId, EntryDraft, ExtraClassAvailability, ExtraClassRequest,
    ExtraClassSchedule, ExtraClassStatus, ExtraScheduleDraft, ExtraScheduleId, ExtraSlotId,
    RequestDraft, RequestId, RequestStatus, RoomId, Staff, StaffId, StaffUnavailability, Subject,
    SubjectId, TimetableEntry, UnavailabilityDraft,
};
use crate::store::repository::{AuditAction, FullRepository, RepositoryError};

use super::{ScheduleError, SchedulingService};

/// Result of recording an unavailability window.
#[derive(Debug, Clone)]
pub struct UnavailabilityOutcome {
    pub window: StaffUnavailability,
    /// Newly published extra slots (re-recording the same window is
    /// idempotent and publishes zero).
    pub published_slots: usize,
}

/// Result of recording or re-reviewing an extra class.
#[derive(Debug, Clone)]
pub struct ExtraScheduleOutcome {
    pub record: ExtraClassSchedule,
    /// Grid entry created for the class, when it materialized.
    pub entry: Option<TimetableEntry>,
    /// Why the weekly grid was not updated, when it was not.
    pub skipped_reason: Option<String>,
}

impl<R: FullRepository> SchedulingService<R> {
    /// Record a window a teacher cannot teach and publish compensating
    /// extra slots for every placement the window invalidates.
    ///
    /// The invalidated entries stay on the books: retracting them is a
    /// review decision, so the discrepancy is logged rather than silently
    /// auto-cancelled.
    pub async fn record_unavailability(
        &self,
        actor: &str,
        draft: UnavailabilityDraft,
    ) -> Result<UnavailabilityOutcome, ScheduleError> {
        let staff = self.repo.get_staff(draft.staff_id).await?;
        let window = self.repo.insert_unavailability(&draft).await?;
        let entries = self.repo.list_entries(window.session_id).await?;

        let slots = republish::plan_republish(&window, &entries);
        if !slots.is_empty() {
            log::warn!(
                "{} placement(s) remain scheduled inside {}'s unavailability on {} P{}; \
                 publishing extra slots instead of cancelling",
                slots.len(),
                staff.name,
                window.day,
                window.period
            );
        }
        let mut published = 0;
        for slot in &slots {
            let (_, created) = self.repo.upsert_slot(slot).await?;
            if created {
                published += 1;
            }
        }

        if let Some(course_id) = staff.course_id {
            if let Ok(course) = self.repo.get_course(course_id).await {
                let message = format!(
                    "Extra slot available: {} P{} for {}",
                    window.day, window.period, course.name
                );
                if let Ok(others) = self.repo.list_staff_in_course(course_id).await {
                    for other in others.iter().filter(|s| s.id != staff.id) {
                        self.notify_staff_best_effort(other.id, &message).await;
                    }
                }
            }
        }
        self.audit_best_effort(
            actor,
            AuditAction::Unavailable,
            format!(
                "{} unavailable {} P{} ({}p)",
                staff.name, window.day, window.period, window.duration
            ),
        )
        .await;
        Ok(UnavailabilityOutcome {
            window,
            published_slots: published,
        })
    }

    /// Open extra slots for a course, ordered by (day, period).
    pub async fn list_open_extra_slots(
        &self,
        course: CourseId,
    ) -> Result<Vec<ExtraClassAvailability>, ScheduleError> {
        Ok(self.repo.list_open_slots(course).await?)
    }

    /// Claim a published extra slot for a make-up class.
    ///
    /// The claiming teacher must own the subject and the subject must be
    /// offered in the slot's course. The candidate fills the slot, so the
    /// one-per-day, adjacency and quota rules are waived; exclusivity and
    /// unavailability are still checked against everyone else. The slot is
    /// consumed exactly once.
    pub async fn claim_extra_slot(
        &self,
        actor: &str,
        slot_id: ExtraSlotId,
        staff_id: StaffId,
        subject_id: SubjectId,
        room: Option<RoomId>,
    ) -> Result<TimetableEntry, ScheduleError> {
        let slot = self.repo.get_slot(slot_id).await?;
        if !slot.is_open() {
            return Err(ScheduleError::SlotUnavailable(slot_id));
        }
        let staff = self.repo.get_staff(staff_id).await?;
        let subject = self.repo.get_subject(subject_id).await?;
        if subject.staff_id != staff_id {
            return Err(Rejection::StaffMismatch {
                subject: subject.name.clone(),
            }
            .into());
        }
        if !subject.offered_in_course(slot.course_id) {
            return Err(Rejection::SubjectCourseMismatch {
                subject: subject.name.clone(),
            }
            .into());
        }
        let room_id = match room {
            Some(id) => self.repo.get_room(id).await?.id,
            None => slot.room_id,
        };

        let draft = EntryDraft {
            session_id: slot.session_id,
            course_id: slot.course_id,
            section_id: None,
            subject_id,
            staff_id,
            room_id,
            day: slot.day,
            period: slot.period,
            duration: slot.duration,
            is_lab: false,
            replaces: None,
        };
        let snapshot = self.snapshot(slot.session_id).await?;
        let ctx = snapshot.context(&subject, self.config.suggestion_limit);
        let mut rng = self.rng();
        validator::validate(&draft, &ctx, &mut rng)?;

        // the slot itself is the one-shot gate: claim before writing the
        // entry, release if the write loses a race
        self.repo
            .claim_slot(slot_id, staff_id, subject_id)
            .await
            .map_err(|err| match err {
                RepositoryError::ValidationError(_) => ScheduleError::SlotUnavailable(slot_id),
                other => ScheduleError::from(other),
            })?;
        let entry = match self.repo.insert_entry(&draft).await {
            Ok(entry) => entry,
            Err(err) => {
                if let Err(release_err) = self.repo.release_claim(slot_id).await {
                    log::warn!(
                        "could not release claim on {slot_id} after failed insert: {release_err}"
                    );
                }
                return Err(err.into());
            }
        };

        log::info!("{} claimed {} for {}", staff.name, slot_id, subject.name);
        let original = self.original_teacher(&slot).await;
        let mut message = format!(
            "Extra class claimed: {} by {} on {} ({})",
            subject.name,
            staff.name,
            slot.slot(),
            slot_label(slot.period)
        );
        match &original {
            Some(orig) => message.push_str(&format!(" due to unavailability of {}", orig.name)),
            None => message.push_str(" due to teacher unavailability"),
        }
        if let Ok(students) = self.repo.list_students_in_course(slot.course_id).await {
            for student in students {
                self.notify_student_best_effort(student.id, &message).await;
            }
        }
        if let Some(orig) = &original {
            self.notify_staff_best_effort(
                orig.id,
                &format!(
                    "Your unavailable slot {} has been claimed by {} for {}.",
                    slot.slot(),
                    staff.name,
                    subject.name
                ),
            )
            .await;
        }
        self.audit_best_effort(
            actor,
            AuditAction::Claim,
            format!("claimed extra slot {} for {}", slot.slot(), subject.name),
        )
        .await;
        Ok(entry)
    }

    /// Teacher whose absence published the slot, when the source entry is
    /// still on the books.
    async fn original_teacher(&self, slot: &ExtraClassAvailability) -> Option<Staff> {
        let entry_id = slot.created_from?;
        let entry = self.repo.get_entry(entry_id).await.ok()?;
        self.repo.get_staff(entry.staff_id).await.ok()
    }

    /// Staff-submitted request for an out-of-band extra meeting.
    pub async fn submit_extra_request(
        &self,
        actor: &str,
        draft: RequestDraft,
    ) -> Result<ExtraClassRequest, ScheduleError> {
        let staff = self.repo.get_staff(draft.staff_id).await?;
        let subject = self.repo.get_subject(draft.subject_id).await?;
        self.check_teaches(&subject, staff.id, draft.course_id)?;

        let request = self.repo.insert_request(&draft).await?;
        if let Ok(course) = self.repo.get_course(request.course_id).await {
            let preferred_day = request
                .preferred_day
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            let preferred_period = request
                .preferred_period
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            let message = format!(
                "Extra class requested: {} in {}. Preferred: {} P{}",
                subject.name, course.name, preferred_day, preferred_period
            );
            if let Ok(others) = self.repo.list_staff_in_course(request.course_id).await {
                for other in others.iter().filter(|s| s.id != staff.id) {
                    self.notify_staff_best_effort(other.id, &message).await;
                }
            }
        }
        self.audit_best_effort(
            actor,
            AuditAction::ExtraRequest,
            format!("extra class requested for {} by {}", subject.name, staff.name),
        )
        .await;
        Ok(request)
    }

    /// All submitted extra-class requests, for review.
    pub async fn list_extra_requests(&self) -> Result<Vec<ExtraClassRequest>, ScheduleError> {
        Ok(self.repo.list_requests().await?)
    }

    /// Approve or reject a pending extra-class request.
    pub async fn update_extra_request_status(
        &self,
        actor: &str,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<ExtraClassRequest, ScheduleError> {
        let request = self.repo.update_request_status(id, status).await?;
        if let Ok(subject) = self.repo.get_subject(request.subject_id).await {
            self.notify_staff_best_effort(
                request.staff_id,
                &format!(
                    "Your extra class request for {} is {}.",
                    subject.name,
                    status.as_str()
                ),
            )
            .await;
        }
        self.audit_best_effort(
            actor,
            AuditAction::ExtraStatus,
            format!("request {} marked {}", id, status.as_str()),
        )
        .await;
        Ok(request)
    }

    /// Record an extra class pinned to a wall-clock time.
    ///
    /// A record needing approval waits for review; one recorded as already
    /// approved goes straight onto the weekly grid when its start time maps
    /// into a period bucket and the placement validates.
    pub async fn schedule_extra_class(
        &self,
        actor: &str,
        draft: ExtraScheduleDraft,
    ) -> Result<ExtraScheduleOutcome, ScheduleError> {
        let staff = self.repo.get_staff(draft.staff_id).await?;
        let subject = self.repo.get_subject(draft.subject_id).await?;
        self.check_teaches(&subject, staff.id, draft.course_id)?;

        let status = if draft.requires_approval {
            ExtraClassStatus::Pending
        } else {
            ExtraClassStatus::Scheduled
        };
        let record = self.repo.insert_extra_schedule(&draft, status).await?;
        self.notify_staff_best_effort(
            record.staff_id,
            &format!(
                "Extra class request submitted: {} on {}",
                subject.name, record.start_at
            ),
        )
        .await;
        self.audit_best_effort(
            actor,
            AuditAction::ScheduleExtra,
            format!(
                "{} scheduled extra class {} on {}",
                staff.name, subject.name, record.start_at
            ),
        )
        .await;

        if record.status == ExtraClassStatus::Scheduled {
            let (entry, skipped_reason) = self.materialize_extra(&record, &subject).await?;
            return Ok(ExtraScheduleOutcome {
                record,
                entry,
                skipped_reason,
            });
        }
        Ok(ExtraScheduleOutcome {
            record,
            entry: None,
            skipped_reason: Some("awaiting approval".to_string()),
        })
    }

    /// Move an extra class through its review lifecycle. Marking it
    /// `Scheduled` also materializes a grid entry when the slot maps and
    /// the placement validates.
    pub async fn update_extra_class_status(
        &self,
        actor: &str,
        id: ExtraScheduleId,
        status: ExtraClassStatus,
    ) -> Result<ExtraScheduleOutcome, ScheduleError> {
        let record = self.repo.update_extra_schedule_status(id, status).await?;
        let subject = self.repo.get_subject(record.subject_id).await?;

        self.notify_staff_best_effort(
            record.staff_id,
            &format!(
                "Your extra class for {} on {} is {}.",
                subject.name,
                record.start_at,
                status.as_str()
            ),
        )
        .await;
        if matches!(status, ExtraClassStatus::Scheduled | ExtraClassStatus::Approved) {
            let message = format!(
                "Extra class {}: {} on {}",
                status.as_str(),
                subject.name,
                record.start_at
            );
            if let Ok(others) = self.repo.list_staff_in_course(record.course_id).await {
                for other in others.iter().filter(|s| s.id != record.staff_id) {
                    self.notify_staff_best_effort(other.id, &message).await;
                }
            }
        }
        if matches!(status, ExtraClassStatus::Scheduled | ExtraClassStatus::Cancelled) {
            let message = format!(
                "Extra class {}: {} on {}",
                status.as_str(),
                subject.name,
                record.start_at
            );
            if let Ok(students) = self.repo.list_students_in_course(record.course_id).await {
                for student in students {
                    self.notify_student_best_effort(student.id, &message).await;
                }
            }
        }
        self.audit_best_effort(
            actor,
            AuditAction::ExtraStatus,
            format!("{} {} by {}", status.as_str(), subject.name, record.staff_id),
        )
        .await;

        let (entry, skipped_reason) = if status == ExtraClassStatus::Scheduled {
            self.materialize_extra(&record, &subject).await?
        } else {
            (None, None)
        };
        Ok(ExtraScheduleOutcome {
            record,
            entry,
            skipped_reason,
        })
    }

    fn check_teaches(
        &self,
        subject: &Subject,
        staff: StaffId,
        course: CourseId,
    ) -> Result<(), ScheduleError> {
        if subject.staff_id != staff {
            return Err(Rejection::StaffMismatch {
                subject: subject.name.clone(),
            }
            .into());
        }
        if !subject.offered_in_course(course) {
            return Err(Rejection::SubjectCourseMismatch {
                subject: subject.name.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Best-effort mapping of an extra class onto the weekly grid. A start
    /// time outside the period buckets, a missing room, or a conflict is
    /// reported, never fatal: the record itself stays.
    async fn materialize_extra(
        &self,
        record: &ExtraClassSchedule,
        subject: &Subject,
    ) -> Result<(Option<TimetableEntry>, Option<String>), ScheduleError> {
        let Some(slot) = record.grid_slot() else {
            return Ok((
                None,
                Some("start time falls outside the 9:00-15:00 weekday grid".to_string()),
            ));
        };
        let Some(room_id) = record.room_id else {
            return Ok((None, Some("no room set".to_string())));
        };

        let draft = EntryDraft {
            session_id: record.session_id,
            course_id: record.course_id,
            section_id: None,
            subject_id: record.subject_id,
            staff_id: record.staff_id,
            room_id,
            day: slot.day,
            period: slot.period,
            duration: record.grid_duration(),
            is_lab: false,
            replaces: None,
        };
        let snapshot = self.snapshot(record.session_id).await?;
        let mut ctx = snapshot.context(subject, self.config.suggestion_limit);
        ctx.on_date = Some(record.start_at.date());
        let mut rng = self.rng();
        if let Err(rejection) = validator::validate(&draft, &ctx, &mut rng) {
            log::warn!("extra class {} not placed on the grid: {rejection}", record.id);
            return Ok((None, Some(rejection.to_string())));
        }
        match self.repo.insert_entry(&draft).await {
            Ok(entry) => Ok((Some(entry), None)),
            Err(RepositoryError::ConstraintViolation {
                constraint,
                day,
                period,
            }) => Ok((
                None,
                Some(format!(
                    "slot {day} P{period} lost to a concurrent writer ({constraint})"
                )),
            )),
            Err(other) => Err(other.into()),
        }
    }
}
