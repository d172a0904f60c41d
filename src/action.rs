use thiserror::Error;

use crate::model::entity::Id;

pub type Index = usize;

/// One committed assignment, recorded in processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub member_id: Id,
    pub group_index: Index,
    pub pair_count_after: usize,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AllocationError {
    #[error("group size must be at least 1")]
    InvalidGroupSize,
    #[error("not enough members: {members} members cannot fill one group of {group_size}")]
    InsufficientMembers { members: usize, group_size: usize },
    #[error("{members} members exceed the capacity of {capacity} seats")]
    CapacityExceeded { members: usize, capacity: usize },
    #[error("no group can accept member {member_id} without losing every common day")]
    NoEligibleGroup { member_id: Id },
    /// Every prefiltered candidate refused the member. Indicates a bug.
    #[error("invariant violated: all {candidates} candidate groups refused member {member_id}")]
    CandidatesExhausted { member_id: Id, candidates: usize },
}
