//! In-memory storage backend.
//!
//! Keeps everything under a single `RwLock`, which doubles as the commit
//! boundary: the uniqueness keys of the weekly grid are re-checked while
//! the write lock is held, so an accept decision and its write are never
//! observably separated. Suitable for tests and as the reference
//! implementation of the repository traits.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::*;
use crate::store::repository::*;

/// In-memory repository.
///
/// Cloning is cheap and clones share the same underlying data.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    data: Arc<RwLock<MemoryData>>,
}

#[derive(Default)]
struct MemoryData {
    sessions: HashMap<SessionId, Session>,
    courses: HashMap<CourseId, Course>,
    sections: HashMap<SectionId, Section>,
    semesters: HashMap<SemesterId, Semester>,
    subjects: HashMap<SubjectId, Subject>,
    staff: HashMap<StaffId, Staff>,
    students: HashMap<StudentId, Student>,
    rooms: HashMap<RoomId, Room>,

    entries: HashMap<EntryId, TimetableEntry>,
    unavailability: HashMap<UnavailabilityId, StaffUnavailability>,
    extra_slots: HashMap<ExtraSlotId, ExtraClassAvailability>,
    requests: HashMap<RequestId, ExtraClassRequest>,
    extra_schedules: HashMap<ExtraScheduleId, ExtraClassSchedule>,

    next_id: i64,
}

impl MemoryData {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Does an extra slot waive the section-or-course key for this draft?
    /// Evaluated under the same lock as the insert itself. A slot that is
    /// still open waives the key, and so does one the inserting writer just
    /// claimed for this staff and subject: the claim flow consumes the slot
    /// before committing its entry.
    fn open_slot_matches(&self, draft: &EntryDraft) -> bool {
        self.extra_slots.values().any(|slot| {
            slot.session_id == draft.session_id
                && slot.day == draft.day
                && slot.period == draft.period
                && slot.course_id == draft.course_id
                && (slot.is_open()
                    || (slot.claimed_by == Some(draft.staff_id)
                        && slot.subject_id == Some(draft.subject_id)))
        })
    }
}

impl MemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every record, including catalog data.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        *data = MemoryData::default();
    }

    /// Number of committed timetable entries across sessions.
    pub fn entry_count(&self) -> usize {
        self.data.read().unwrap().entries.len()
    }

    // ==================== Catalog seeding ====================
    //
    // The engine reads catalog data; these helpers exist so tests and local
    // setups can populate it.

    pub fn add_session(&self, start_date: NaiveDate, end_date: NaiveDate) -> Session {
        let mut data = self.data.write().unwrap();
        let session = Session {
            id: SessionId(data.next_id()),
            start_date,
            end_date,
        };
        data.sessions.insert(session.id, session.clone());
        session
    }

    pub fn add_course(&self, name: &str) -> Course {
        let mut data = self.data.write().unwrap();
        let course = Course {
            id: CourseId(data.next_id()),
            name: name.to_string(),
        };
        data.courses.insert(course.id, course.clone());
        course
    }

    pub fn add_section(&self, course: CourseId, name: &str) -> Section {
        let mut data = self.data.write().unwrap();
        let section = Section {
            id: SectionId(data.next_id()),
            course_id: course,
            name: name.to_string(),
        };
        data.sections.insert(section.id, section.clone());
        section
    }

    pub fn add_semester(&self, number: u8, label: &str) -> Semester {
        let mut data = self.data.write().unwrap();
        let semester = Semester {
            id: SemesterId(data.next_id()),
            number,
            label: label.to_string(),
        };
        data.semesters.insert(semester.id, semester.clone());
        semester
    }

    pub fn add_staff(&self, name: &str, course: Option<CourseId>) -> Staff {
        let mut data = self.data.write().unwrap();
        let staff = Staff {
            id: StaffId(data.next_id()),
            name: name.to_string(),
            course_id: course,
        };
        data.staff.insert(staff.id, staff.clone());
        staff
    }

    pub fn add_student(
        &self,
        name: &str,
        course: CourseId,
        section: Option<SectionId>,
    ) -> Student {
        let mut data = self.data.write().unwrap();
        let student = Student {
            id: StudentId(data.next_id()),
            name: name.to_string(),
            course_id: course,
            section_id: section,
        };
        data.students.insert(student.id, student.clone());
        student
    }

    pub fn add_room(&self, name: &str, capacity: u32) -> Room {
        let mut data = self.data.write().unwrap();
        let room = Room {
            id: RoomId(data.next_id()),
            name: name.to_string(),
            capacity,
        };
        data.rooms.insert(room.id, room.clone());
        room
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_subject(
        &self,
        name: &str,
        staff: StaffId,
        credits: u32,
        kind: SubjectKind,
        courses: &[CourseId],
        sections: &[SectionId],
        semester: Option<SemesterId>,
    ) -> Subject {
        let mut data = self.data.write().unwrap();
        let subject = Subject {
            id: SubjectId(data.next_id()),
            name: name.to_string(),
            staff_id: staff,
            course_ids: courses.iter().copied().collect(),
            section_ids: sections.iter().copied().collect(),
            semester_id: semester,
            credits,
            kind,
        };
        data.subjects.insert(subject.id, subject.clone());
        subject
    }
}

#[async_trait]
impl CatalogRepository for MemoryRepository {
    async fn get_session(&self, id: SessionId) -> RepositoryResult<Session> {
        self.data
            .read()
            .unwrap()
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))
    }

    async fn get_course(&self, id: CourseId) -> RepositoryResult<Course> {
        self.data
            .read()
            .unwrap()
            .courses
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))
    }

    async fn list_courses(&self) -> RepositoryResult<Vec<Course>> {
        let mut courses: Vec<_> = self.data.read().unwrap().courses.values().cloned().collect();
        courses.sort_by_key(|c| c.id);
        Ok(courses)
    }

    async fn list_sections(&self) -> RepositoryResult<Vec<Section>> {
        let mut sections: Vec<_> = self
            .data
            .read()
            .unwrap()
            .sections
            .values()
            .cloned()
            .collect();
        sections.sort_by_key(|s| s.id);
        Ok(sections)
    }

    async fn get_subject(&self, id: SubjectId) -> RepositoryResult<Subject> {
        self.data
            .read()
            .unwrap()
            .subjects
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))
    }

    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        let mut subjects: Vec<_> = self
            .data
            .read()
            .unwrap()
            .subjects
            .values()
            .cloned()
            .collect();
        subjects.sort_by_key(|s| s.id);
        Ok(subjects)
    }

    async fn get_staff(&self, id: StaffId) -> RepositoryResult<Staff> {
        self.data
            .read()
            .unwrap()
            .staff
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))
    }

    async fn list_staff_in_course(&self, course: CourseId) -> RepositoryResult<Vec<Staff>> {
        let mut staff: Vec<_> = self
            .data
            .read()
            .unwrap()
            .staff
            .values()
            .filter(|s| s.course_id == Some(course))
            .cloned()
            .collect();
        staff.sort_by_key(|s| s.id);
        Ok(staff)
    }

    async fn list_students_in_course(&self, course: CourseId) -> RepositoryResult<Vec<Student>> {
        let mut students: Vec<_> = self
            .data
            .read()
            .unwrap()
            .students
            .values()
            .filter(|s| s.course_id == course)
            .cloned()
            .collect();
        students.sort_by_key(|s| s.id);
        Ok(students)
    }

    async fn get_room(&self, id: RoomId) -> RepositoryResult<Room> {
        self.data
            .read()
            .unwrap()
            .rooms
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))
    }

    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        let mut rooms: Vec<_> = self.data.read().unwrap().rooms.values().cloned().collect();
        rooms.sort_by_key(|r| r.id);
        Ok(rooms)
    }
}

#[async_trait]
impl TimetableRepository for MemoryRepository {
    async fn insert_entry(&self, draft: &EntryDraft) -> RepositoryResult<TimetableEntry> {
        let mut data = self.data.write().unwrap();

        let span = draft.span();
        let scope_waived = data.open_slot_matches(draft);
        for existing in data.entries.values() {
            if Some(existing.id) == draft.replaces
                || existing.session_id != draft.session_id
                || existing.day != draft.day
                || !existing.span().overlaps(&span)
            {
                continue;
            }
            if existing.staff_id == draft.staff_id {
                return Err(RepositoryError::ConstraintViolation {
                    constraint: UNIQ_STAFF_SLOT,
                    day: draft.day,
                    period: draft.period,
                });
            }
            if existing.room_id == draft.room_id {
                return Err(RepositoryError::ConstraintViolation {
                    constraint: UNIQ_ROOM_SLOT,
                    day: draft.day,
                    period: draft.period,
                });
            }
            if !scope_waived && existing.scope() == draft.scope() {
                let constraint = if draft.section_id.is_some() {
                    UNIQ_SECTION_SLOT
                } else {
                    UNIQ_COURSE_SLOT
                };
                return Err(RepositoryError::ConstraintViolation {
                    constraint,
                    day: draft.day,
                    period: draft.period,
                });
            }
        }

        if let Some(old) = draft.replaces {
            data.entries.remove(&old);
        }
        let id = EntryId(data.next_id());
        let entry = draft.clone().into_entry(id);
        data.entries.insert(id, entry.clone());
        Ok(entry)
    }

    async fn get_entry(&self, id: EntryId) -> RepositoryResult<TimetableEntry> {
        self.data
            .read()
            .unwrap()
            .entries
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))
    }

    async fn delete_entry(&self, id: EntryId) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        data.entries
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))
    }

    async fn erase_session(&self, session: SessionId) -> RepositoryResult<usize> {
        let mut data = self.data.write().unwrap();
        let before = data.entries.len();
        data.entries.retain(|_, e| e.session_id != session);
        Ok(before - data.entries.len())
    }

    async fn list_entries(&self, session: SessionId) -> RepositoryResult<Vec<TimetableEntry>> {
        let mut entries: Vec<_> = self
            .data
            .read()
            .unwrap()
            .entries
            .values()
            .filter(|e| e.session_id == session)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.day, e.period, e.id));
        Ok(entries)
    }

    async fn insert_unavailability(
        &self,
        draft: &UnavailabilityDraft,
    ) -> RepositoryResult<StaffUnavailability> {
        let mut data = self.data.write().unwrap();
        let id = UnavailabilityId(data.next_id());
        let window = draft.clone().into_record(id);
        data.unavailability.insert(id, window.clone());
        Ok(window)
    }

    async fn list_unavailability(
        &self,
        session: SessionId,
    ) -> RepositoryResult<Vec<StaffUnavailability>> {
        let mut windows: Vec<_> = self
            .data
            .read()
            .unwrap()
            .unavailability
            .values()
            .filter(|w| w.session_id == session)
            .cloned()
            .collect();
        windows.sort_by_key(|w| w.id);
        Ok(windows)
    }
}

#[async_trait]
impl ExtraSlotRepository for MemoryRepository {
    async fn upsert_slot(
        &self,
        draft: &ExtraSlotDraft,
    ) -> RepositoryResult<(ExtraClassAvailability, bool)> {
        let mut data = self.data.write().unwrap();
        let existing = data.extra_slots.values().find(|slot| {
            slot.session_id == draft.session_id
                && slot.day == draft.day
                && slot.period == draft.period
                && (slot.room_id == draft.room_id || slot.course_id == draft.course_id)
        });
        if let Some(slot) = existing {
            return Ok((slot.clone(), false));
        }
        let id = ExtraSlotId(data.next_id());
        let slot = draft.clone().into_slot(id);
        data.extra_slots.insert(id, slot.clone());
        Ok((slot, true))
    }

    async fn get_slot(&self, id: ExtraSlotId) -> RepositoryResult<ExtraClassAvailability> {
        self.data
            .read()
            .unwrap()
            .extra_slots
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))
    }

    async fn list_open_slots(
        &self,
        course: CourseId,
    ) -> RepositoryResult<Vec<ExtraClassAvailability>> {
        let mut slots: Vec<_> = self
            .data
            .read()
            .unwrap()
            .extra_slots
            .values()
            .filter(|s| s.course_id == course && s.is_open())
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.day, s.period, s.id));
        Ok(slots)
    }

    async fn list_open_slots_in_session(
        &self,
        session: SessionId,
    ) -> RepositoryResult<Vec<ExtraClassAvailability>> {
        let mut slots: Vec<_> = self
            .data
            .read()
            .unwrap()
            .extra_slots
            .values()
            .filter(|s| s.session_id == session && s.is_open())
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.day, s.period, s.id));
        Ok(slots)
    }

    async fn claim_slot(
        &self,
        id: ExtraSlotId,
        staff: StaffId,
        subject: SubjectId,
    ) -> RepositoryResult<ExtraClassAvailability> {
        let mut data = self.data.write().unwrap();
        let slot = data
            .extra_slots
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))?;
        if !slot.is_open() {
            return Err(RepositoryError::ValidationError(format!(
                "extra slot {id} is already claimed"
            )));
        }
        slot.claimed_by = Some(staff);
        slot.subject_id = Some(subject);
        Ok(slot.clone())
    }

    async fn release_claim(&self, id: ExtraSlotId) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        let slot = data
            .extra_slots
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))?;
        slot.claimed_by = None;
        slot.subject_id = None;
        Ok(())
    }

    async fn insert_request(&self, draft: &RequestDraft) -> RepositoryResult<ExtraClassRequest> {
        let mut data = self.data.write().unwrap();
        let id = RequestId(data.next_id());
        let request = draft.clone().into_request(id);
        data.requests.insert(id, request.clone());
        Ok(request)
    }

    async fn update_request_status(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> RepositoryResult<ExtraClassRequest> {
        let mut data = self.data.write().unwrap();
        let request = data
            .requests
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))?;
        request.status = status;
        Ok(request.clone())
    }

    async fn list_requests(&self) -> RepositoryResult<Vec<ExtraClassRequest>> {
        let mut requests: Vec<_> = self
            .data
            .read()
            .unwrap()
            .requests
            .values()
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.id);
        Ok(requests)
    }

    async fn insert_extra_schedule(
        &self,
        draft: &ExtraScheduleDraft,
        status: ExtraClassStatus,
    ) -> RepositoryResult<ExtraClassSchedule> {
        let mut data = self.data.write().unwrap();
        let id = ExtraScheduleId(data.next_id());
        let schedule = draft.clone().into_schedule(id, status);
        data.extra_schedules.insert(id, schedule.clone());
        Ok(schedule)
    }

    async fn get_extra_schedule(
        &self,
        id: ExtraScheduleId,
    ) -> RepositoryResult<ExtraClassSchedule> {
        self.data
            .read()
            .unwrap()
            .extra_schedules
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))
    }

    async fn update_extra_schedule_status(
        &self,
        id: ExtraScheduleId,
        status: ExtraClassStatus,
    ) -> RepositoryResult<ExtraClassSchedule> {
        let mut data = self.data.write().unwrap();
        let schedule = data
            .extra_schedules
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("{id}")))?;
        schedule.status = status;
        Ok(schedule.clone())
    }
}

/// In-memory append-only audit trail, inspectable for tests.
#[derive(Clone, Default)]
pub struct MemoryAuditLog {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn append(&self, record: AuditRecord) -> RepositoryResult<()> {
        self.records.write().unwrap().push(record);
        Ok(())
    }
}

/// In-memory notification fan-out, inspectable for tests.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    staff_messages: Arc<RwLock<Vec<(StaffId, String)>>>,
    student_messages: Arc<RwLock<Vec<(StudentId, String)>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staff_messages(&self) -> Vec<(StaffId, String)> {
        self.staff_messages.read().unwrap().clone()
    }

    pub fn student_messages(&self) -> Vec<(StudentId, String)> {
        self.student_messages.read().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for MemoryNotifier {
    async fn notify_staff(&self, staff: StaffId, message: &str) -> RepositoryResult<()> {
        self.staff_messages
            .write()
            .unwrap()
            .push((staff, message.to_string()));
        Ok(())
    }

    async fn notify_student(&self, student: StudentId, message: &str) -> RepositoryResult<()> {
        self.student_messages
            .write()
            .unwrap()
            .push((student, message.to_string()));
        Ok(())
    }
}
