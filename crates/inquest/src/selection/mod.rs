//! Quota allocation and exact-count selection.

mod allocator;
mod enforcer;

pub use allocator::{AllocatorConfig, DiversityAllocator, Quota, RatioBand};
pub use enforcer::{CountEnforcer, Selection};
