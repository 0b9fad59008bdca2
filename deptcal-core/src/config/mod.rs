//! Configuration types for deptcal.

mod engine;
mod global;

pub use engine::EngineConfig;
pub use global::{Collections, DeptCalConfig};
