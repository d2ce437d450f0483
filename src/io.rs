// Module for loading the fighter and event tables. It reads the csv files, checks field counts, and skips rows it cannot use.
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;

mod lenient {
    use serde::{Deserialize, Deserializer};

    /// Empty or non-numeric counters read as 0.
    pub fn count<'de, D>(d: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(d)?.unwrap_or_default();
        Ok(s.trim().parse().unwrap_or(0))
    }
}

const EVENT_DATE_FORMATS: [&str; 2] = ["%B %d, %Y", "%Y-%m-%d"];

/// One row of the fighters table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FighterRow {
    #[serde(rename = "First Name", alias = "FirstName", default)]
    pub first_name: String,
    #[serde(rename = "Last Name", alias = "LastName", default)]
    pub last_name: String,
    #[serde(rename = "Nickname", default)]
    pub nickname: String,
    #[serde(rename = "Height", default)]
    pub height: String,
    #[serde(rename = "Weight", default)]
    pub weight: String,
    #[serde(rename = "Reach", default)]
    pub reach: String,
    #[serde(rename = "Stance", default)]
    pub stance: String,
    #[serde(rename = "Wins", deserialize_with = "lenient::count", default)]
    pub wins: u32,
    #[serde(rename = "Losses", deserialize_with = "lenient::count", default)]
    pub losses: u32,
    #[serde(rename = "Draws", deserialize_with = "lenient::count", default)]
    pub draws: u32,
}

/// One completed bout. `winner` holds fighter1's name, `"Draw"` or `"Unknown"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FightRecord {
    #[serde(rename = "Event Name", alias = "EventName", default)]
    pub event_name: String,
    #[serde(rename = "Event Date", alias = "EventDate", default)]
    pub event_date: String,
    #[serde(rename = "Result", alias = "Winner", default)]
    pub winner: String,
    #[serde(rename = "Fighter1")]
    pub fighter1: String,
    #[serde(rename = "Fighter2")]
    pub fighter2: String,
    #[serde(rename = "KD", default)]
    pub knockdowns: String,
    #[serde(rename = "Strikes", default)]
    pub strikes: String,
    #[serde(rename = "TD", default)]
    pub takedowns: String,
    #[serde(rename = "Sub", default)]
    pub submissions: String,
    #[serde(rename = "Weight Class", alias = "WeightClass", default)]
    pub weight_class: String,
    #[serde(rename = "Method", default)]
    pub method: String,
    #[serde(rename = "Round", default)]
    pub round: String,
    #[serde(rename = "Time", default)]
    pub time: String,
}

impl FightRecord {
    /// True when the recorded winner is exactly one of the two fighters.
    pub fn is_decided(&self) -> bool {
        self.winner == self.fighter1 || self.winner == self.fighter2
    }

    pub fn event_date(&self) -> Option<NaiveDate> {
        let raw = self.event_date.trim();
        EVENT_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    }
}

pub fn load_fighters(path: impl AsRef<Path>) -> Result<Vec<FighterRow>> {
    load_rows(path.as_ref())
}

pub fn load_fights(path: impl AsRef<Path>) -> Result<Vec<FightRecord>> {
    load_rows(path.as_ref())
}

fn load_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .flexible(true)
        .has_headers(true)
        .from_reader(file);

    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();
    let expected_len = headers.len();

    let mut out = Vec::new();
    for result in rdr.records() {
        let raw: StringRecord = result.with_context(|| format!("reading {}", path.display()))?;
        let line = raw.position().map(|p| p.line()).unwrap_or(0);

        if raw.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        if raw.len() != expected_len {
            warn!(
                "{}: skipping line {}: expected {} fields, found {}",
                path.display(),
                line,
                expected_len,
                raw.len(),
            );
            continue;
        }

        match raw.deserialize::<T>(Some(&headers)) {
            Ok(rec) => out.push(rec),
            Err(e) => warn!("{}: skipping malformed record at line {}: {}", path.display(), line, e),
        }
    }

    info!("Loaded {} rows from {}", out.len(), path.display());
    Ok(out)
}
