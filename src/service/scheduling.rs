//! Core timetable operations: manual placement, whole-week generation,
//! individual and bulk removal.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engine::generator::{plan_week, GenerationSummary, GeneratorInputs};
use crate::engine::validator;
use crate::models::{slot_label, EntryDraft, EntryId, SessionId, TimetableEntry};
use crate::store::repository::{AuditAction, FullRepository, RepositoryError};

use super::{ScheduleError, SchedulingService};

impl<R: FullRepository> SchedulingService<R> {
    /// Validate and commit a manual placement.
    pub async fn create_entry(
        &self,
        actor: &str,
        draft: EntryDraft,
    ) -> Result<TimetableEntry, ScheduleError> {
        let subject = self.repo.get_subject(draft.subject_id).await?;
        let snapshot = self.snapshot(draft.session_id).await?;
        let ctx = snapshot.context(&subject, self.config.suggestion_limit);
        let mut rng = self.rng();
        validator::validate(&draft, &ctx, &mut rng)?;

        let entry = self.repo.insert_entry(&draft).await?;
        log::info!(
            "scheduled {} on {} in session {}",
            subject.name,
            entry.slot(),
            entry.session_id
        );
        self.audit_best_effort(
            actor,
            AuditAction::Schedule,
            format!(
                "scheduled {} on {} ({})",
                subject.name,
                entry.slot(),
                slot_label(entry.period)
            ),
        )
        .await;
        Ok(entry)
    }

    /// Remove one placement.
    pub async fn delete_entry(&self, actor: &str, id: EntryId) -> Result<(), ScheduleError> {
        let entry = self.repo.get_entry(id).await?;
        self.repo.delete_entry(id).await?;
        self.audit_best_effort(
            actor,
            AuditAction::Cancel,
            format!("cancelled entry on {}", entry.slot()),
        )
        .await;
        Ok(())
    }

    /// Fill the week for every under-quota subject.
    ///
    /// Per-candidate rejections never abort the batch; they accumulate in
    /// the summary's `errors`. A placement that loses its slot to a
    /// concurrent writer between planning and commit is folded in the same
    /// way. Re-running on a fully packed session creates nothing.
    pub async fn generate_schedule(
        &self,
        actor: &str,
        session_id: SessionId,
        seed: Option<u64>,
    ) -> Result<GenerationSummary, ScheduleError> {
        let session = self.repo.get_session(session_id).await?;
        let subjects = self.repo.list_subjects().await?;
        let courses = self.repo.list_courses().await?;
        let sections = self.repo.list_sections().await?;
        let snapshot = self.snapshot(session_id).await?;

        let mut rng = match seed.or(self.config.generator_seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let inputs = GeneratorInputs {
            session: &session,
            subjects: &subjects,
            courses: &courses,
            sections: &sections,
            rooms: &snapshot.rooms,
            unavailability: &snapshot.unavailability,
            open_slots: &snapshot.open_slots,
            suggestion_limit: self.config.suggestion_limit,
        };
        let plan = plan_week(&inputs, &snapshot.entries, &mut rng);

        let mut summary = GenerationSummary {
            created: 0,
            skipped: plan.skipped,
            errors: plan.errors,
        };
        for draft in &plan.placements {
            match self.repo.insert_entry(draft).await {
                Ok(_) => summary.created += 1,
                Err(RepositoryError::ConstraintViolation {
                    constraint,
                    day,
                    period,
                }) => {
                    summary.skipped += 1;
                    summary.errors.push(format!(
                        "slot {day} P{period} lost to a concurrent writer ({constraint})"
                    ));
                }
                Err(other) => return Err(other.into()),
            }
        }

        log::info!(
            "generation for session {} created {} entries, skipped {}",
            session_id,
            summary.created,
            summary.skipped
        );
        let details = serde_json::to_string(&summary).unwrap_or_else(|_| {
            format!("created {} skipped {}", summary.created, summary.skipped)
        });
        self.audit_best_effort(actor, AuditAction::Generate, details).await;
        Ok(summary)
    }

    /// Bulk-erase a session's timetable. Returns the number removed.
    pub async fn erase_schedule(
        &self,
        actor: &str,
        session_id: SessionId,
    ) -> Result<usize, ScheduleError> {
        self.repo.get_session(session_id).await?;
        let removed = self.repo.erase_session(session_id).await?;
        log::info!("erased {removed} entries for session {session_id}");
        self.audit_best_effort(
            actor,
            AuditAction::Erase,
            format!("erased {removed} entries for session {session_id}"),
        )
        .await;
        Ok(removed)
    }
}
