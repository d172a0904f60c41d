use itertools::Itertools;

use crate::model::condition::GroupBounds;
use crate::model::entity::{DaySet, Member};
use crate::model::group::Group;

/// Derived metrics of a group, updated on every successful add.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCache {
    pub common_days: DaySet,
    pub pair_count: usize,
}

impl GroupCache {
    fn empty() -> GroupCache {
        GroupCache { common_days: DaySet::all(), pair_count: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Full,
    NoCommonDay,
}

/// A refused add hands the member back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub member: Member,
    pub reason: RejectReason,
}

impl Group {
    pub fn new(bounds: GroupBounds) -> Group {
        Group {
            min_size: bounds.min,
            max_size: bounds.max,
            members: Vec::new(),
            cache: GroupCache::empty(),
        }
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All five weekdays while the group is empty.
    pub fn common_available_days(&self) -> DaySet {
        self.cache.common_days
    }

    pub fn same_department_pair_count(&self) -> usize {
        self.cache.pair_count
    }

    pub fn same_department_pairs(&self) -> Vec<(&Member, &Member)> {
        self.members
            .iter()
            .tuple_combinations()
            .filter(|(a, b)| a.shares_department(b))
            .collect()
    }

    pub fn contact_handles(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.contact_handle()).collect()
    }

    pub fn available_days_if_added(&self, member: &Member) -> DaySet {
        self.cache.common_days.intersection(&member.available_days())
    }

    pub fn pair_count_if_added(&self, member: &Member) -> usize {
        self.cache.pair_count
            + self.members.iter().filter(|m| m.shares_department(member)).count()
    }

    pub fn is_at_or_above_min(&self) -> bool {
        self.members.len() >= self.min_size
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_size
    }

    /// The only mutation. Checks capacity and the shared-day constraint
    /// together so a committed group always keeps a common day.
    pub fn try_add(&mut self, member: Member) -> Result<(), Rejected> {
        if self.is_full() {
            return Err(Rejected { member, reason: RejectReason::Full });
        }
        let common_days = self.available_days_if_added(&member);
        if common_days.is_empty() {
            return Err(Rejected { member, reason: RejectReason::NoCommonDay });
        }
        self.cache = GroupCache {
            common_days,
            pair_count: self.pair_count_if_added(&member),
        };
        self.members.push(member);
        Ok(())
    }

    /// Metrics computed from the member list alone, ignoring the cache.
    pub fn recompute_cache(&self) -> GroupCache {
        let common_days = self
            .members
            .iter()
            .fold(DaySet::all(), |days, m| days.intersection(&m.available_days()));
        let pair_count = self
            .members
            .iter()
            .combinations(2)
            .filter(|pair| pair[0].shares_department(pair[1]))
            .count();
        GroupCache { common_days, pair_count }
    }
}
