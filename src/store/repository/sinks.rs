//! Outbound sinks: the audit trail and the notification fan-out.
//!
//! Both are fire-and-forget from the engine's perspective. Services call
//! them strictly after a placement has committed, and a sink failure is
//! logged, never propagated back into the commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::RepositoryResult;
use crate::models::{StaffId, StudentId};

/// Action tag recorded with every audit entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum AuditAction {
    Schedule,
    Erase,
    Generate,
    Unavailable,
    ScheduleExtra,
    ExtraRequest,
    ExtraStatus,
    Claim,
    Cancel,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Schedule => "schedule",
            AuditAction::Erase => "erase",
            AuditAction::Generate => "generate",
            AuditAction::Unavailable => "unavailable",
            AuditAction::ScheduleExtra => "schedule_extra",
            AuditAction::ExtraRequest => "extra_request",
            AuditAction::ExtraStatus => "extra_schedule_status",
            AuditAction::Claim => "claim_extra",
            AuditAction::Cancel => "cancel",
        }
    }
}

/// One immutable line of the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub actor: String,
    pub action: AuditAction,
    pub details: String,
    pub at: DateTime<Utc>,
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one record. Implementations must never mutate or reorder
    /// previously appended records.
    async fn append(&self, record: AuditRecord) -> RepositoryResult<()>;
}

/// Delivers human-readable messages to staff and students. Message content
/// is free text, not a structured contract.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify_staff(&self, staff: StaffId, message: &str) -> RepositoryResult<()>;

    async fn notify_student(&self, student: StudentId, message: &str) -> RepositoryResult<()>;
}
