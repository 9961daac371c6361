//! Placement storage: timetable entries and unavailability windows.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    EntryDraft, EntryId, SessionId, StaffUnavailability, TimetableEntry, UnavailabilityDraft,
};

/// Storage uniqueness keys guarding the weekly grid. A violated key surfaces
/// as [`RepositoryError::ConstraintViolation`](super::RepositoryError) carrying
/// one of these names.
pub const UNIQ_STAFF_SLOT: &str = "uniq_staff_slot";
pub const UNIQ_ROOM_SLOT: &str = "uniq_room_slot";
pub const UNIQ_SECTION_SLOT: &str = "uniq_section_slot";
pub const UNIQ_COURSE_SLOT: &str = "uniq_course_slot";

/// Repository trait for committed placements.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TimetableRepository: Send + Sync {
    /// Persist an accepted placement.
    ///
    /// The uniqueness keys are re-checked atomically with the write; a
    /// violation means a concurrent writer took the slot after the caller's
    /// validation read. When the draft carries `replaces`, the replaced
    /// entry is swapped out in the same commit.
    async fn insert_entry(&self, draft: &EntryDraft) -> RepositoryResult<TimetableEntry>;

    async fn get_entry(&self, id: EntryId) -> RepositoryResult<TimetableEntry>;

    async fn delete_entry(&self, id: EntryId) -> RepositoryResult<()>;

    /// Bulk-erase a session's timetable. Returns the number removed.
    async fn erase_session(&self, session: SessionId) -> RepositoryResult<usize>;

    /// All entries of a session, ordered by (day, period).
    async fn list_entries(&self, session: SessionId) -> RepositoryResult<Vec<TimetableEntry>>;

    async fn insert_unavailability(
        &self,
        draft: &UnavailabilityDraft,
    ) -> RepositoryResult<StaffUnavailability>;

    async fn list_unavailability(
        &self,
        session: SessionId,
    ) -> RepositoryResult<Vec<StaffUnavailability>>;
}
