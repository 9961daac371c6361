//! Service layer: the operations a surrounding application calls.
//!
//! Services orchestrate repository reads, run the conflict engine over a
//! session snapshot, commit accepted placements through the storage layer's
//! atomic boundary, and only then dispatch audit and notification messages.
//! Sink failures are logged and never undo a committed placement.
//!
//! Storage race losses (a unique key violated between the validation read
//! and the write) come back to callers as the matching conflict
//! [`Rejection`], so there is one conflict surface regardless of which
//! layer caught the clash.

pub mod extra;
pub mod scheduling;

pub use extra::{ExtraScheduleOutcome, UnavailabilityOutcome};

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::EngineConfig;
use crate::engine::{Rejection, ValidationContext};
use crate::models::{
    ExtraClassAvailability, ExtraSlotId, Room, SessionId, StaffId, StaffUnavailability, StudentId,
    Subject, TimetableEntry,
};
use crate::store::repository::{
    AuditAction, AuditRecord, AuditSink, FullRepository, NotificationSink, RepositoryError,
    UNIQ_ROOM_SLOT, UNIQ_STAFF_SLOT,
};

/// Error surface of the scheduling operations.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// The placement was refused by the conflict engine.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The extra slot has already been claimed.
    #[error("extra slot {0} is no longer open")]
    SlotUnavailable(ExtraSlotId),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl ScheduleError {
    /// The conflict rejection behind this error, if that is what it is.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ScheduleError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<RepositoryError> for ScheduleError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ConstraintViolation {
                constraint,
                day,
                period,
            } => {
                let rejection = match constraint {
                    UNIQ_STAFF_SLOT => Rejection::StaffConflict {
                        day,
                        period,
                        suggestions: Vec::new(),
                    },
                    UNIQ_ROOM_SLOT => Rejection::RoomConflict {
                        day,
                        period,
                        suggestions: Vec::new(),
                    },
                    _ => Rejection::SectionConflict {
                        day,
                        period,
                        suggestions: Vec::new(),
                    },
                };
                ScheduleError::Rejected(rejection)
            }
            other => ScheduleError::Repository(other),
        }
    }
}

/// Everything the engine reads about one session, fetched in one place.
pub(crate) struct SessionSnapshot {
    pub entries: Vec<TimetableEntry>,
    pub unavailability: Vec<StaffUnavailability>,
    pub open_slots: Vec<ExtraClassAvailability>,
    pub rooms: Vec<Room>,
}

impl SessionSnapshot {
    pub fn context<'a>(
        &'a self,
        subject: &'a Subject,
        suggestion_limit: usize,
    ) -> ValidationContext<'a> {
        ValidationContext {
            subject,
            entries: &self.entries,
            unavailability: &self.unavailability,
            open_slots: &self.open_slots,
            rooms: &self.rooms,
            on_date: None,
            suggestion_limit,
        }
    }
}

/// The scheduling operations bundle: repository, sinks and configuration.
pub struct SchedulingService<R> {
    repo: Arc<R>,
    audit: Arc<dyn AuditSink>,
    notifier: Arc<dyn NotificationSink>,
    config: EngineConfig,
}

impl<R: FullRepository> SchedulingService<R> {
    pub fn new(
        repo: Arc<R>,
        audit: Arc<dyn AuditSink>,
        notifier: Arc<dyn NotificationSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repo,
            audit,
            notifier,
            config,
        }
    }

    /// RNG for randomized search order: the configured seed when set,
    /// otherwise fresh entropy.
    pub(crate) fn rng(&self) -> StdRng {
        match self.config.generator_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub(crate) async fn snapshot(
        &self,
        session: SessionId,
    ) -> Result<SessionSnapshot, ScheduleError> {
        Ok(SessionSnapshot {
            entries: self.repo.list_entries(session).await?,
            unavailability: self.repo.list_unavailability(session).await?,
            open_slots: self.repo.list_open_slots_in_session(session).await?,
            rooms: self.repo.list_rooms().await?,
        })
    }

    pub(crate) async fn audit_best_effort(&self, actor: &str, action: AuditAction, details: String) {
        let record = AuditRecord {
            actor: actor.to_string(),
            action,
            details,
            at: Utc::now(),
        };
        if let Err(err) = self.audit.append(record).await {
            log::warn!("audit append failed after commit: {err}");
        }
    }

    pub(crate) async fn notify_staff_best_effort(&self, staff: StaffId, message: &str) {
        if let Err(err) = self.notifier.notify_staff(staff, message).await {
            log::warn!("staff notification failed: {err}");
        }
    }

    pub(crate) async fn notify_student_best_effort(&self, student: StudentId, message: &str) {
        if let Err(err) = self.notifier.notify_student(student, message).await {
            log::warn!("student notification failed: {err}");
        }
    }
}
