//! Timetable scheduling and conflict-resolution engine.
//!
//! Places weekly class meetings on a five-day, six-period grid so that no
//! teacher, room or student group is ever double-booked, weekly subject
//! quotas hold, and recorded teacher unavailability is honored. Around the
//! core checks sit a greedy whole-week generator, an alternative-slot
//! search used on conflict, and the extra-slot workflow that republishes an
//! unavailable teacher's meetings for colleagues to claim.
//!
//! # Modules
//!
//! - **`models`**: the weekly grid, catalog reference data, and placement
//!   records
//! - **`engine`**: pure decision logic (validator, suggestion search,
//!   generator, republisher)
//! - **`store`**: repository traits, sinks, and the in-memory reference
//!   backend
//! - **`service`**: the operations a surrounding application calls
//! - **`config`**: TOML-backed engine settings
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Surrounding application (CRUD, transport, auth)    │
//! └──────────────────────┬──────────────────────────────┘
//!                        │
//! ┌──────────────────────▼──────────────────────────────┐
//! │  service::SchedulingService - validate, commit,     │
//! │  then audit + notify (best-effort, post-commit)     │
//! └───────────┬──────────────────────────┬──────────────┘
//!             │                          │
//! ┌───────────▼──────────────┐  ┌────────▼──────────────┐
//! │  engine (pure checks and │  │  store (repositories, │
//! │  searches over snapshots)│  │  uniqueness keys)     │
//! └──────────────────────────┘  └───────────────────────┘
//! ```
//!
//! Conflicts are expected and frequent: every clash degrades to a typed
//! rejection carrying a machine tag and, where useful, alternative slots.
//! A scheduling conflict is never a panic.

pub mod config;
pub mod engine;
pub mod models;
pub mod service;
pub mod store;

pub use config::EngineConfig;
pub use engine::{PlacementMode, Rejection};
pub use service::{ScheduleError, SchedulingService};
pub use store::{MemoryAuditLog, MemoryNotifier, MemoryRepository};
