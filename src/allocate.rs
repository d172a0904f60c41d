use rand::prelude::SliceRandom;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::action::{AllocationError, Index, Placement};
use crate::cache::RejectReason;
use crate::model::condition::{DepartmentCounter, GroupBounds};
use crate::model::entity::Member;
use crate::model::group::Group;

/// Source of the candidate permutation used to break ties between groups.
pub trait Shuffle {
    fn shuffle(&mut self, candidates: &mut [Index]);
}

impl<S: Shuffle + ?Sized> Shuffle for &mut S {
    fn shuffle(&mut self, candidates: &mut [Index]) {
        (**self).shuffle(candidates)
    }
}

pub struct RandomShuffle<R>(pub R);

impl RandomShuffle<SmallRng> {
    pub fn seeded(seed: u64) -> RandomShuffle<SmallRng> {
        RandomShuffle(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Shuffle for RandomShuffle<R> {
    fn shuffle(&mut self, candidates: &mut [Index]) {
        candidates.shuffle(&mut self.0);
    }
}

/// Leaves candidates in group creation order.
pub struct KeepOrder;

impl Shuffle for KeepOrder {
    fn shuffle(&mut self, _candidates: &mut [Index]) {}
}

/// Most constrained first: fewest available days, then least crowded departments.
pub fn ordering_key(counter: &DepartmentCounter, member: &Member) -> (usize, usize) {
    (member.available_days().len(), counter.crowding(member))
}

/// Stable sort into processing order; ties keep roster order.
pub fn sort_by_constraint(members: &mut [Member]) {
    let counter: DepartmentCounter = members.iter().collect();
    members.sort_by_cached_key(|member| ordering_key(&counter, member));
}

#[derive(Debug)]
pub struct Allocation {
    pub groups: Vec<Group>,
    pub placements: Vec<Placement>,
}

impl Allocation {
    pub fn total_pair_count(&self) -> usize {
        self.groups.iter().map(Group::same_department_pair_count).sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Allocator {
    group_size: usize,
}

impl Allocator {
    pub fn new(group_size: usize) -> Allocator {
        Allocator { group_size }
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    fn create_groups(&self, n_members: usize) -> Result<Vec<Group>, AllocationError> {
        if self.group_size == 0 {
            return Err(AllocationError::InvalidGroupSize);
        }
        let group_count = n_members / self.group_size;
        if group_count == 0 {
            return Err(AllocationError::InsufficientMembers {
                members: n_members,
                group_size: self.group_size,
            });
        }
        let bounds = GroupBounds::for_target(self.group_size);
        let capacity = group_count * bounds.max;
        if n_members > capacity {
            return Err(AllocationError::CapacityExceeded { members: n_members, capacity });
        }
        Ok((0..group_count).map(|_| Group::new(bounds)).collect())
    }

    pub fn allocate<S: Shuffle + ?Sized>(
        &self,
        mut members: Vec<Member>,
        shuffle: &mut S,
    ) -> Result<Allocation, AllocationError> {
        let mut groups = self.create_groups(members.len())?;
        sort_by_constraint(&mut members);

        let mut placements = Vec::with_capacity(members.len());
        for member in members {
            placements.push(place(&mut groups, member, shuffle)?);
        }

        let allocation = Allocation { groups, placements };
        info!(
            groups = allocation.groups.len(),
            members = allocation.placements.len(),
            same_department_pairs = allocation.total_pair_count(),
            "allocation complete"
        );
        Ok(allocation)
    }
}

fn candidate_groups(groups: &[Group], member: &Member) -> Vec<Index> {
    groups
        .iter()
        .enumerate()
        .filter(|(_, group)| !group.available_days_if_added(member).is_empty())
        .map(|(index, _)| index)
        .collect()
}

fn place<S: Shuffle + ?Sized>(
    groups: &mut [Group],
    member: Member,
    shuffle: &mut S,
) -> Result<Placement, AllocationError> {
    let mut candidates = candidate_groups(groups, &member);
    if candidates.is_empty() {
        return Err(AllocationError::NoEligibleGroup { member_id: member.id().to_owned() });
    }

    shuffle.shuffle(&mut candidates);
    // Groups below their minimum size come first, whatever the conflicts.
    candidates.sort_by_key(|&index| {
        let group = &groups[index];
        (group.is_at_or_above_min() as u8, group.pair_count_if_added(&member))
    });

    let n_candidates = candidates.len();
    let member_id = member.id().to_owned();
    let mut member = member;
    let mut day_conflict = false;
    for group_index in candidates {
        match groups[group_index].try_add(member) {
            Ok(()) => {
                let pair_count_after = groups[group_index].same_department_pair_count();
                debug!(member = %member_id, group = group_index, pair_count_after, "placed member");
                return Ok(Placement { member_id, group_index, pair_count_after });
            }
            Err(rejected) => {
                debug!(
                    member = %member_id,
                    group = group_index,
                    reason = ?rejected.reason,
                    "candidate refused member"
                );
                day_conflict |= rejected.reason == RejectReason::NoCommonDay;
                member = rejected.member;
            }
        }
    }
    if day_conflict {
        // The prefilter and try_add disagree on the shared-day check.
        return Err(AllocationError::CandidatesExhausted { member_id, candidates: n_candidates });
    }
    // Every group with a shared day is already at its maximum size.
    Err(AllocationError::NoEligibleGroup { member_id })
}

/// Re-runs the allocation with successive seeds while the roster is infeasible
/// for the drawn permutation. Returns the allocation and the seed that produced it.
pub fn allocate_with_retries(
    members: &[Member],
    group_size: usize,
    seed: u64,
    attempts: usize,
) -> Result<(Allocation, u64), AllocationError> {
    allocate_with_retries_using(members, group_size, seed, attempts, RandomShuffle::seeded)
}

/// Like [`allocate_with_retries`], with attempt `k` shuffling through
/// `make_shuffle(seed + k)`. Only `NoEligibleGroup` is retried.
pub fn allocate_with_retries_using<S, F>(
    members: &[Member],
    group_size: usize,
    seed: u64,
    attempts: usize,
    mut make_shuffle: F,
) -> Result<(Allocation, u64), AllocationError>
where
    S: Shuffle,
    F: FnMut(u64) -> S,
{
    let allocator = Allocator::new(group_size);
    let mut attempt: u64 = 0;
    loop {
        let attempt_seed = seed.wrapping_add(attempt);
        let mut shuffle = make_shuffle(attempt_seed);
        match allocator.allocate(members.to_vec(), &mut shuffle) {
            Ok(allocation) => return Ok((allocation, attempt_seed)),
            Err(err @ AllocationError::NoEligibleGroup { .. })
                if attempt + 1 < attempts as u64 =>
            {
                warn!(
                    seed = attempt_seed,
                    group_size = allocator.group_size(),
                    error = %err,
                    "allocation attempt failed, retrying"
                );
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
