//! Splits a roster into lunch groups that share at least one free weekday,
//! keeping members of the same department apart where possible.

pub mod action;
pub mod allocate;
pub mod cache;
pub mod config;
pub mod model;
pub mod report;
pub mod roster;

pub use action::{AllocationError, Index, Placement};
pub use allocate::{
    allocate_with_retries, allocate_with_retries_using, sort_by_constraint, Allocation, Allocator,
    KeepOrder, RandomShuffle, Shuffle,
};
pub use model::entity::{DaySet, Member, MemberRow};
pub use model::group::Group;
