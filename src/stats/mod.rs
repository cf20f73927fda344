//! The statistics engine.
//!
//! Every function here is a pure computation over an immutable catalog
//! snapshot. Nothing is cached between calls; callers recompute from the full
//! dataset whenever they need fresh numbers.

pub mod category;
pub mod consensus;
pub mod dates;
pub mod intervals;
pub mod members;
pub mod ranking;
