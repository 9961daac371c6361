//! Repository trait definitions for storage operations.
//!
//! Storage is split across focused traits so implementations stay testable
//! and callers only depend on what they touch:
//!
//! - [`error`]: error types for repository operations
//! - [`catalog`]: read-only reference data (sessions, subjects, rooms, ...)
//! - [`timetable`]: committed placements and unavailability windows
//! - [`extra`]: published extra slots, requests, ad-hoc schedules
//! - [`sinks`]: audit trail and notification fan-out
//!
//! A complete backend implements the three repository traits; the blanket
//! [`FullRepository`] bound covers functions that need all of them:
//!
//! ```ignore
//! async fn my_service<R: FullRepository>(repo: &R) -> RepositoryResult<()> {
//!     let entries = repo.list_entries(session_id).await?;
//!     let slots = repo.list_open_slots(course_id).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod extra;
pub mod sinks;
pub mod timetable;

pub use error::{RepositoryError, RepositoryResult};

pub use catalog::CatalogRepository;
pub use extra::ExtraSlotRepository;
pub use sinks::{AuditAction, AuditRecord, AuditSink, NotificationSink};
pub use timetable::{
    TimetableRepository, UNIQ_COURSE_SLOT, UNIQ_ROOM_SLOT, UNIQ_SECTION_SLOT, UNIQ_STAFF_SLOT,
};

/// Composite trait bound for a complete storage backend.
///
/// Automatically implemented for any type implementing the catalog,
/// timetable and extra-slot repository traits.
pub trait FullRepository: CatalogRepository + TimetableRepository + ExtraSlotRepository {}

impl<T> FullRepository for T where T: CatalogRepository + TimetableRepository + ExtraSlotRepository {}
