//! Domain layer - governance aggregates and pure algorithms.
//!
//! - `foundation` - ids, timestamps, statuses, errors
//! - `exploration` - LightFace sessions and their node forest
//! - `clustering` - tag and content similarity strategies
//! - `synthesis` - DarkFace sessions and memory atoms
//! - `cycle` - phase sequencing and summaries

pub mod clustering;
pub mod cycle;
pub mod exploration;
pub mod foundation;
pub mod synthesis;
