// Fighter records with derived fields, and the immutable store every other module reads from.
use std::path::Path;

use anyhow::Result;

use crate::features::{bout_count, parse_height, parse_reach, parse_weight, win_rate, FighterStats};
use crate::io::{load_fighters, FighterRow};

/// A fighter as loaded, plus the fields derived once at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct FighterRecord {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub height: String,
    pub reach: String,
    pub weight: String,
    pub stance: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub full_name: String,
    pub search_text: String,
    pub total_fights: u64,
    /// Percentage, one decimal, ties rounded to even.
    pub win_rate: f64,
}

impl From<FighterRow> for FighterRecord {
    fn from(row: FighterRow) -> Self {
        let full_name = format!("{} {}", row.first_name, row.last_name).trim().to_string();
        let search_text = format!("{} {} {}", row.first_name, row.last_name, row.nickname)
            .to_lowercase()
            .trim()
            .to_string();
        let total_fights = bout_count(row.wins, row.losses, row.draws);
        let win_rate = if total_fights > 0 {
            (row.wins as f64 / total_fights as f64 * 100.0 * 10.0).round_ties_even() / 10.0
        } else {
            0.0
        };

        FighterRecord {
            first_name: row.first_name,
            last_name: row.last_name,
            nickname: row.nickname,
            height: row.height,
            reach: row.reach,
            weight: row.weight,
            stance: row.stance,
            wins: row.wins,
            losses: row.losses,
            draws: row.draws,
            full_name,
            search_text,
            total_fights,
            win_rate,
        }
    }
}

impl FighterRecord {
    /// Numeric view used by the feature extractor. Win rate is a 0-1 fraction here.
    pub fn stats(&self) -> FighterStats {
        FighterStats {
            height: parse_height(&self.height),
            reach: parse_reach(&self.reach),
            weight: parse_weight(&self.weight),
            wins: self.wins as f64,
            losses: self.losses as f64,
            total_fights: self.total_fights as f64,
            win_rate: win_rate(self.wins, self.losses, self.draws),
            stance: Some(self.stance.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Wins,
    WinRate,
    TotalFights,
}

/// Read-only fighter table, built once and shared by search, features and training.
#[derive(Debug, Clone, Default)]
pub struct FighterStore {
    fighters: Vec<FighterRecord>,
}

impl FighterStore {
    pub fn new(rows: impl IntoIterator<Item = FighterRow>) -> Self {
        Self {
            fighters: rows.into_iter().map(FighterRecord::from).collect(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_fighters(path)?))
    }

    pub fn fighters(&self) -> &[FighterRecord] {
        &self.fighters
    }

    pub fn len(&self) -> usize {
        self.fighters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fighters.is_empty()
    }

    /// All fighters whose full name equals `name`. Names are not unique.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FighterRecord> + 'a {
        self.fighters.iter().filter(move |f| f.full_name == name)
    }

    pub fn get_fighter_by_name(&self, name: &str) -> Option<&FighterRecord> {
        self.fighters.iter().find(|f| f.full_name == name)
    }

    pub fn top_fighters(&self, n: usize, by: RankBy, min_fights: u32) -> Vec<&FighterRecord> {
        let mut ranked: Vec<&FighterRecord> = match by {
            RankBy::WinRate => self
                .fighters
                .iter()
                .filter(|f| f.total_fights >= u64::from(min_fights))
                .collect(),
            _ => self.fighters.iter().collect(),
        };
        match by {
            RankBy::Wins => ranked.sort_by(|a, b| b.wins.cmp(&a.wins)),
            RankBy::TotalFights => ranked.sort_by(|a, b| b.total_fights.cmp(&a.total_fights)),
            RankBy::WinRate => ranked.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate)),
        }
        ranked.truncate(n);
        ranked
    }
}
