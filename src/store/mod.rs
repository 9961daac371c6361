//! Storage module for schedule data.
//!
//! Storage follows the repository pattern so backends can be swapped
//! without touching the engine or the service layer:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Service layer (service::*) - operations     │
//! └──────────────────┬───────────────────────────┘
//!                    │
//! ┌──────────────────▼───────────────────────────┐
//! │  Repository traits (repository::*)           │
//! │  Catalog / Timetable / ExtraSlot + sinks     │
//! └──────────────────┬───────────────────────────┘
//!                    │
//! ┌──────────────────▼───────────────────────────┐
//! │  MemoryRepository (in-memory reference)      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The in-memory backend re-checks the grid's uniqueness keys inside its
//! write lock, making it the last line of defense against two accepts
//! racing for the same slot.

pub mod memory;
pub mod repository;

pub use memory::{MemoryAuditLog, MemoryNotifier, MemoryRepository};
pub use repository::*;
