//! Read-only access to the reference data the engine schedules against.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    Course, CourseId, Room, RoomId, Section, Session, SessionId, Staff, StaffId, Student, Subject,
    SubjectId,
};

/// Repository trait for catalog reference data.
///
/// The engine never writes through this trait: sessions, courses, subjects,
/// staff and rooms are owned by the surrounding application.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn get_session(&self, id: SessionId) -> RepositoryResult<Session>;

    async fn get_course(&self, id: CourseId) -> RepositoryResult<Course>;

    async fn list_courses(&self) -> RepositoryResult<Vec<Course>>;

    /// All sections across courses.
    async fn list_sections(&self) -> RepositoryResult<Vec<Section>>;

    async fn get_subject(&self, id: SubjectId) -> RepositoryResult<Subject>;

    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>>;

    async fn get_staff(&self, id: StaffId) -> RepositoryResult<Staff>;

    /// Teachers attached to a course, for notification fan-out.
    async fn list_staff_in_course(&self, course: CourseId) -> RepositoryResult<Vec<Staff>>;

    /// Students enrolled in a course, for notification fan-out.
    async fn list_students_in_course(&self, course: CourseId) -> RepositoryResult<Vec<Student>>;

    async fn get_room(&self, id: RoomId) -> RepositoryResult<Room>;

    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>>;
}
