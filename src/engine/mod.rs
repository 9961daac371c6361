//! The conflict engine: pure decision logic over per-session snapshots.
//!
//! Nothing in this module performs I/O. Callers assemble a
//! [`ValidationContext`] from the repository, run the checks or searches,
//! and commit accepted placements through the storage layer's atomic
//! boundary.
//!
//! - [`validator`]: accepts or rejects one candidate placement
//! - [`suggest`]: alternative-slot search used on conflict
//! - [`generator`]: greedy whole-week generation
//! - [`republish`]: unavailability-driven extra-slot publication

pub mod context;
pub mod generator;
pub mod republish;
pub mod suggest;
pub mod validator;

pub use context::{PlacementMode, ValidationContext};
pub use generator::{GenerationPlan, GenerationSummary, GeneratorInputs};
pub use validator::Rejection;
