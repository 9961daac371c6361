//! Extra-class storage: published slots, requests, and ad-hoc schedules.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    CourseId, ExtraClassAvailability, ExtraClassRequest, ExtraClassSchedule, ExtraClassStatus,
    ExtraScheduleDraft, ExtraScheduleId, ExtraSlotDraft, ExtraSlotId, RequestDraft, RequestId,
    RequestStatus, SessionId, StaffId, SubjectId,
};

/// Repository trait for extra-class records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ExtraSlotRepository: Send + Sync {
    /// Publish an extra slot, idempotently.
    ///
    /// A slot already existing for (session, day, period, room) or
    /// (session, day, period, course) is returned unchanged. The boolean
    /// reports whether a new slot was created.
    async fn upsert_slot(
        &self,
        draft: &ExtraSlotDraft,
    ) -> RepositoryResult<(ExtraClassAvailability, bool)>;

    async fn get_slot(&self, id: ExtraSlotId) -> RepositoryResult<ExtraClassAvailability>;

    /// Open (unclaimed) slots for a course, ordered by (day, period).
    async fn list_open_slots(
        &self,
        course: CourseId,
    ) -> RepositoryResult<Vec<ExtraClassAvailability>>;

    /// Open (unclaimed) slots across a session.
    async fn list_open_slots_in_session(
        &self,
        session: SessionId,
    ) -> RepositoryResult<Vec<ExtraClassAvailability>>;

    /// One-shot claim: fails with a validation error unless the slot is
    /// still open. The check and the write happen atomically.
    async fn claim_slot(
        &self,
        id: ExtraSlotId,
        staff: StaffId,
        subject: SubjectId,
    ) -> RepositoryResult<ExtraClassAvailability>;

    /// Compensating rollback for a claim whose entry insert lost a race.
    async fn release_claim(&self, id: ExtraSlotId) -> RepositoryResult<()>;

    async fn insert_request(&self, draft: &RequestDraft) -> RepositoryResult<ExtraClassRequest>;

    async fn update_request_status(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> RepositoryResult<ExtraClassRequest>;

    async fn list_requests(&self) -> RepositoryResult<Vec<ExtraClassRequest>>;

    async fn insert_extra_schedule(
        &self,
        draft: &ExtraScheduleDraft,
        status: ExtraClassStatus,
    ) -> RepositoryResult<ExtraClassSchedule>;

    async fn get_extra_schedule(
        &self,
        id: ExtraScheduleId,
    ) -> RepositoryResult<ExtraClassSchedule>;

    async fn update_extra_schedule_status(
        &self,
        id: ExtraScheduleId,
        status: ExtraClassStatus,
    ) -> RepositoryResult<ExtraClassSchedule>;
}
