//! CSV bridge - convert entries to and from CSV text
//!
//! The exchange format is a header row `date,weight,calories` followed by
//! one row per entry with ISO-8601 dates. Headers are matched without regard
//! to case or surrounding whitespace, so files written by older desktop
//! builds (`Date,Weight,Calories`) import unchanged.
//!
//! Imports are all-or-nothing: every row is checked, and if any is
//! malformed the whole file is rejected with one [`RowError`] per bad row.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use csv::StringRecord;
use serde::Serialize;

use crate::domain::{Entry, Error, Result, RowError, UserId};
use crate::ports::EntryRepository;
use crate::services::EntryService;

const DATE_FORMAT: &str = "%Y-%m-%d";
const HEADER: [&str; 3] = ["date", "weight", "calories"];

#[derive(Serialize)]
struct CsvRow {
    date: String,
    weight: f64,
    calories: u32,
}

/// Render entries as CSV, in the order given
pub fn export(entries: &[Entry]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    // Written by hand so an empty export still carries the header
    writer.write_record(HEADER)?;
    for entry in entries {
        writer.serialize(CsvRow {
            date: entry.date.format(DATE_FORMAT).to_string(),
            weight: entry.weight,
            calories: entry.calories,
        })?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::invalid_input(e.to_string()))
}

/// Parse CSV text into entries owned by `user_id`
///
/// Returns entries ordered by date; for duplicate dates the last row wins.
pub fn parse(csv_text: &str, user_id: UserId) -> Result<Vec<Entry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let columns = Columns::locate(reader.headers()?)?;

    let mut by_date: BTreeMap<NaiveDate, Entry> = BTreeMap::new();
    let mut errors = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                errors.push(RowError::new(line, e.to_string()));
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.iter().all(str::is_empty) {
            continue;
        }

        match columns.entry(&record, user_id) {
            Ok(entry) => {
                by_date.insert(entry.date, entry);
            }
            Err(reason) => errors.push(RowError::new(line, reason)),
        }
    }

    if !errors.is_empty() {
        return Err(Error::MalformedRow(errors));
    }

    Ok(by_date.into_values().collect())
}

/// Positions of the three required columns in a header row
struct Columns {
    date: usize,
    weight: usize,
    calories: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<&str> = HEADER.iter().copied().filter(|h| find(*h).is_none()).collect();
        match (find("date"), find("weight"), find("calories")) {
            (Some(date), Some(weight), Some(calories)) => Ok(Self {
                date,
                weight,
                calories,
            }),
            _ => Err(Error::MalformedRow(vec![RowError::new(
                1,
                format!("missing column(s): {}", missing.join(", ")),
            )])),
        }
    }

    fn entry(&self, record: &StringRecord, user_id: UserId) -> std::result::Result<Entry, String> {
        let field = |idx: usize, name: &str| match record.get(idx) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(format!("missing {}", name)),
        };

        let raw_date = field(self.date, "date")?;
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD)", raw_date))?;

        let raw_weight = field(self.weight, "weight")?;
        let weight: f64 = raw_weight
            .parse()
            .map_err(|_| format!("weight '{}' is not a number", raw_weight))?;

        let raw_calories = field(self.calories, "calories")?;
        let calories: i64 = raw_calories
            .parse()
            .map_err(|_| format!("calories '{}' is not a whole number", raw_calories))?;

        Entry::new(user_id, date, weight, calories).map_err(|e| match e {
            Error::InvalidInput(reason) => reason,
            other => other.to_string(),
        })
    }
}

/// Import and export against the entry store
pub struct TransferService {
    entries: EntryService,
}

impl TransferService {
    pub fn new(repository: Arc<dyn EntryRepository>) -> Self {
        Self {
            entries: EntryService::new(repository),
        }
    }

    /// Parse `csv_text` and upsert every row for `user_id`
    ///
    /// Nothing is written unless the whole file parses.
    pub fn import(&self, csv_text: &str, user_id: UserId) -> Result<Vec<Entry>> {
        let entries = parse(csv_text, user_id)?;
        self.entries.bulk_upsert(&entries)?;
        Ok(entries)
    }

    pub fn import_file(&self, path: &Path, user_id: UserId) -> Result<Vec<Entry>> {
        let text = std::fs::read_to_string(path)?;
        self.import(&text, user_id)
    }

    /// All of the user's entries as CSV, oldest first
    pub fn export(&self, user_id: UserId) -> Result<String> {
        export(&self.entries.all(user_id)?)
    }

    /// Write the user's entries to `data_MMDDYY.csv` inside `dir`
    pub fn export_file(&self, user_id: UserId, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(export_file_name(Local::now().date_naive()));
        std::fs::write(&path, self.export(user_id)?)?;
        Ok(path)
    }
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("data_{}.csv", today.format("%m%d%y"))
}
