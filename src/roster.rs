//! Reads the lunch roster from a CSV file with a header row:
//! `id,slack_id,department,joined_date,every_weekday,monday,...,friday`.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::model::entity::{Member, MemberError, MemberRow};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("cannot open roster {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed roster: {0}")]
    Csv(#[from] csv::Error),
    #[error("record {record}: invalid joined_date {value:?}")]
    Date { record: usize, value: String },
    #[error("record {record}: {source}")]
    Member {
        record: usize,
        #[source]
        source: MemberError,
    },
}

#[derive(Debug, Deserialize)]
struct RosterRecord {
    id: String,
    slack_id: String,
    department: String,
    #[serde(default)]
    joined_date: String,
    #[serde(default)]
    every_weekday: String,
    #[serde(default)]
    monday: String,
    #[serde(default)]
    tuesday: String,
    #[serde(default)]
    wednesday: String,
    #[serde(default)]
    thursday: String,
    #[serde(default)]
    friday: String,
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

fn flag(value: &str) -> bool {
    value.trim() == "1"
}

fn parse_date(value: &str) -> Option<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Some(None);
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(Some)
}

impl RosterRecord {
    fn into_row(self, record: usize) -> Result<MemberRow, RosterError> {
        let joined_date = parse_date(&self.joined_date).ok_or_else(|| RosterError::Date {
            record,
            value: self.joined_date.clone(),
        })?;
        Ok(MemberRow {
            id: self.id,
            contact_handle: self.slack_id,
            departments: self.department,
            joined_date,
            every_weekday: flag(&self.every_weekday),
            monday: flag(&self.monday),
            tuesday: flag(&self.tuesday),
            wednesday: flag(&self.wednesday),
            thursday: flag(&self.thursday),
            friday: flag(&self.friday),
        })
    }
}

/// Parses every record, keeping file order. Record numbers in errors are 1-based.
pub fn read_roster<R: io::Read>(reader: R) -> Result<Vec<Member>, RosterError> {
    let mut reader = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
    let mut members = Vec::new();
    for (index, result) in reader.deserialize::<RosterRecord>().enumerate() {
        let record = index + 1;
        let row = result?.into_row(record)?;
        let member =
            Member::from_row(row).map_err(|source| RosterError::Member { record, source })?;
        members.push(member);
    }
    debug!(members = members.len(), "roster parsed");
    Ok(members)
}

pub fn read_roster_file(path: &Path) -> Result<Vec<Member>, RosterError> {
    let file = File::open(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_roster(io::BufReader::new(file))
}
