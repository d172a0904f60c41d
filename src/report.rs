use chrono::Weekday;
use serde::Serialize;

use crate::model::group::Group;

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub index: usize,
    pub days: Vec<&'static str>,
    pub same_department_pairs: Vec<[String; 2]>,
    pub handles: Vec<String>,
}

impl GroupSummary {
    /// `index` is 1-based.
    pub fn new(index: usize, group: &Group) -> GroupSummary {
        GroupSummary {
            index,
            days: group.common_available_days().iter().map(day_name).collect(),
            same_department_pairs: group
                .same_department_pairs()
                .into_iter()
                .map(|(a, b)| [a.contact_handle().to_owned(), b.contact_handle().to_owned()])
                .collect(),
            handles: group.contact_handles().into_iter().map(str::to_owned).collect(),
        }
    }
}

pub fn summarize(groups: &[Group]) -> Vec<GroupSummary> {
    groups
        .iter()
        .enumerate()
        .map(|(i, group)| GroupSummary::new(i + 1, group))
        .collect()
}

pub fn render_text(groups: &[Group]) -> String {
    let mut out = String::new();
    for summary in summarize(groups) {
        out.push_str(&format!("====== Lunch group {} ======\n", summary.index));
        out.push_str(&summary.days.join("・"));
        out.push('\n');
        let pairs = summary.same_department_pairs.len();
        if pairs > 0 {
            let (noun, verb) = if pairs == 1 { ("pair", "shares") } else { ("pairs", "share") };
            out.push_str(&format!("* {pairs} {noun} in this group {verb} a department\n"));
        }
        out.push_str(&summary.handles.join(" "));
        out.push_str("\n\n");
    }
    out
}

pub fn render_json(groups: &[Group]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&summarize(groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::condition::GroupBounds;
    use crate::model::entity::{Member, MemberRow};

    fn member(id: &str, dept: &str) -> Member {
        Member::from_row(MemberRow {
            id: id.into(),
            contact_handle: format!("@{id}"),
            departments: dept.into(),
            monday: true,
            wednesday: true,
            ..MemberRow::default()
        })
        .unwrap()
    }

    fn group() -> Group {
        let mut group = Group::new(GroupBounds::for_target(2));
        for (id, dept) in [("a", "Dev"), ("b", "Dev"), ("c", "Ops")] {
            group.try_add(member(id, dept)).unwrap();
        }
        group
    }

    #[test]
    fn text_report_lists_days_conflicts_and_handles() {
        let text = render_text(&[group()]);
        assert_eq!(
            text,
            "====== Lunch group 1 ======\n\
             Monday・Wednesday\n\
             * 1 pair in this group shares a department\n\
             @a @b @c\n\n"
        );
    }

    #[test]
    fn text_report_pluralises_and_omits_empty_warning() {
        let mut crowded = Group::new(GroupBounds::for_target(3));
        let mut quiet = Group::new(GroupBounds::for_target(1));
        for (id, dept) in [("a", "Dev"), ("b", "Dev"), ("c", "Dev")] {
            crowded.try_add(member(id, dept)).unwrap();
        }
        quiet.try_add(member("d", "Ops")).unwrap();
        let text = render_text(&[crowded, quiet]);
        assert_eq!(
            text,
            "====== Lunch group 1 ======\n\
             Monday・Wednesday\n\
             * 3 pairs in this group share a department\n\
             @a @b @c\n\n\
             ====== Lunch group 2 ======\n\
             Monday・Wednesday\n\
             @d\n\n"
        );
    }

    #[test]
    fn json_report_has_pairs() {
        let json = render_json(&[group()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["index"], 1);
        assert_eq!(value[0]["same_department_pairs"][0][0], "@a");
        assert_eq!(value[0]["same_department_pairs"][0][1], "@b");
        assert_eq!(value[0]["handles"].as_array().map(Vec::len), Some(3));
    }
}
