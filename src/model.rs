pub mod entity {
    use std::collections::BTreeSet;
    use std::fmt;

    use chrono::{NaiveDate, Weekday};
    use thiserror::Error;

    pub type Id = String;
    pub type Department = String;

    /// The days a lunch can be held on, Monday first.
    pub const WEEKDAYS: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    const ALL_BITS: u8 = 0b1_1111;

    /// Set of weekdays (Monday to Friday) packed into one byte.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DaySet(u8);

    impl DaySet {
        pub const fn empty() -> DaySet {
            DaySet(0)
        }

        pub const fn all() -> DaySet {
            DaySet(ALL_BITS)
        }

        pub fn from_days<I: IntoIterator<Item = Weekday>>(days: I) -> DaySet {
            let mut set = DaySet::empty();
            for day in days {
                set.insert(day);
            }
            set
        }

        fn bit(day: Weekday) -> Option<u8> {
            match day {
                Weekday::Sat | Weekday::Sun => None,
                _ => Some(1 << day.num_days_from_monday()),
            }
        }

        /// Weekend days are not lunch days and are ignored.
        pub fn insert(&mut self, day: Weekday) {
            if let Some(bit) = Self::bit(day) {
                self.0 |= bit;
            }
        }

        pub fn contains(&self, day: Weekday) -> bool {
            Self::bit(day).map_or(false, |bit| self.0 & bit != 0)
        }

        pub fn intersection(&self, other: &DaySet) -> DaySet {
            DaySet(self.0 & other.0)
        }

        pub fn is_empty(&self) -> bool {
            self.0 == 0
        }

        pub fn len(&self) -> usize {
            self.0.count_ones() as usize
        }

        pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
            WEEKDAYS.into_iter().filter(move |day| self.contains(*day))
        }
    }

    impl fmt::Debug for DaySet {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_set().entries(self.iter()).finish()
        }
    }

    impl FromIterator<Weekday> for DaySet {
        fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
            DaySet::from_days(iter)
        }
    }

    /// One roster row before validation.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct MemberRow {
        pub id: Id,
        pub contact_handle: String,
        pub departments: String,
        pub joined_date: Option<NaiveDate>,
        pub every_weekday: bool,
        pub monday: bool,
        pub tuesday: bool,
        pub wednesday: bool,
        pub thursday: bool,
        pub friday: bool,
    }

    #[derive(Debug, Clone, Error, PartialEq)]
    pub enum MemberError {
        #[error("member {0} has no department")]
        NoDepartment(Id),
    }

    /// Immutable once built by [`Member::from_row`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct Member {
        id: Id,
        contact_handle: String,
        departments: BTreeSet<Department>,
        joined_date: Option<NaiveDate>,
        available_days: DaySet,
    }

    const DEPARTMENT_SEPARATORS: [char; 4] = [',', '|', '\n', '\r'];

    /// Splits a raw department cell into trimmed, non-empty names.
    pub fn split_departments(raw: &str) -> BTreeSet<Department> {
        raw.split(DEPARTMENT_SEPARATORS.as_slice())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect()
    }

    impl Member {
        pub fn from_row(row: MemberRow) -> Result<Member, MemberError> {
            let departments = split_departments(&row.departments);
            if departments.is_empty() {
                return Err(MemberError::NoDepartment(row.id));
            }
            let available_days = if row.every_weekday {
                DaySet::all()
            } else {
                let flags = [row.monday, row.tuesday, row.wednesday, row.thursday, row.friday];
                WEEKDAYS
                    .into_iter()
                    .zip(flags)
                    .filter_map(|(day, flag)| flag.then_some(day))
                    .collect()
            };
            Ok(Member {
                id: row.id,
                contact_handle: row.contact_handle,
                departments,
                joined_date: row.joined_date,
                available_days,
            })
        }

        pub fn id(&self) -> &str {
            &self.id
        }

        pub fn contact_handle(&self) -> &str {
            &self.contact_handle
        }

        /// Never empty.
        pub fn departments(&self) -> &BTreeSet<Department> {
            &self.departments
        }

        /// Carried from the roster; not used for grouping.
        pub fn joined_date(&self) -> Option<NaiveDate> {
            self.joined_date
        }

        pub fn available_days(&self) -> DaySet {
            self.available_days
        }

        pub fn shares_department(&self, other: &Member) -> bool {
            !self.departments.is_disjoint(&other.departments)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn row(departments: &str) -> MemberRow {
            MemberRow {
                id: "1".into(),
                contact_handle: "@alice".into(),
                departments: departments.into(),
                ..MemberRow::default()
            }
        }

        #[test]
        fn departments_split_on_every_separator() {
            let depts = split_departments(" Sales ,Dev|Ops\r\nHR\n\n");
            let expected: Vec<&str> = vec!["Dev", "HR", "Ops", "Sales"];
            assert_eq!(depts.iter().map(String::as_str).collect::<Vec<_>>(), expected);
        }

        #[test]
        fn blank_department_is_rejected() {
            let err = Member::from_row(row(" | \n")).unwrap_err();
            assert_eq!(err, MemberError::NoDepartment("1".into()));
        }

        #[test]
        fn every_weekday_overrides_day_flags() {
            let member = Member::from_row(MemberRow {
                every_weekday: true,
                tuesday: false,
                ..row("Dev")
            })
            .unwrap();
            assert_eq!(member.available_days(), DaySet::all());
            assert_eq!(member.id(), "1");
            assert_eq!(member.contact_handle(), "@alice");
            assert_eq!(member.joined_date(), None);
        }

        #[test]
        fn day_flags_select_days() {
            let member = Member::from_row(MemberRow {
                monday: true,
                thursday: true,
                ..row("Dev")
            })
            .unwrap();
            assert_eq!(
                member.available_days().iter().collect::<Vec<_>>(),
                vec![Weekday::Mon, Weekday::Thu]
            );
        }

        #[test]
        fn no_flags_means_no_days() {
            let member = Member::from_row(row("Dev")).unwrap();
            assert!(member.available_days().is_empty());
        }

        #[test]
        fn shared_department_detection() {
            let a = Member::from_row(row("Dev,Ops")).unwrap();
            let b = Member::from_row(row("Ops")).unwrap();
            let c = Member::from_row(row("Sales")).unwrap();
            assert!(a.shares_department(&b));
            assert!(b.shares_department(&a));
            assert!(!a.shares_department(&c));
        }

        #[test]
        fn day_set_ignores_weekend() {
            let mut set = DaySet::empty();
            set.insert(Weekday::Sat);
            set.insert(Weekday::Fri);
            assert_eq!(set.len(), 1);
            assert!(!set.contains(Weekday::Sun));
            assert_eq!(DaySet::all().len(), 5);
        }
    }
}

pub mod group {
    use super::entity::Member;
    use crate::cache::GroupCache;

    #[derive(Debug, Clone)]
    pub struct Group {
        pub(crate) min_size: usize,
        pub(crate) max_size: usize,
        pub(crate) members: Vec<Member>,
        pub(crate) cache: GroupCache,
    }
}

pub mod condition {
    use std::collections::HashMap;

    use super::entity::{Department, Member};

    /// Default number of members per lunch group.
    pub const DEFAULT_GROUP_SIZE: usize = 5;

    /// Size limits shared by every group of one run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GroupBounds {
        pub min: usize,
        pub max: usize,
    }

    impl GroupBounds {
        /// Groups hold the target size plus room for one leftover member.
        pub fn for_target(size: usize) -> GroupBounds {
            GroupBounds { min: size, max: size + 1 }
        }
    }

    /// Number of roster members in each department.
    #[derive(Debug, Clone, Default)]
    pub struct DepartmentCounter(HashMap<Department, usize>);

    impl DepartmentCounter {
        pub fn get(&self, department: &str) -> usize {
            self.0.get(department).copied().unwrap_or(0)
        }

        /// Sum over a member's departments of how crowded each one is.
        pub fn crowding(&self, member: &Member) -> usize {
            member.departments().iter().map(|d| self.get(d)).sum()
        }
    }

    impl<'a> FromIterator<&'a Member> for DepartmentCounter {
        fn from_iter<T: IntoIterator<Item = &'a Member>>(iter: T) -> Self {
            let mut counter = HashMap::new();
            for member in iter {
                for department in member.departments() {
                    *counter.entry(department.clone()).or_insert(0) += 1;
                }
            }
            DepartmentCounter(counter)
        }
    }
}
