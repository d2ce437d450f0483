// Plain-English questions about fighters and events, routed by keyword to a fixed set of answers.
use std::fmt;

use anyhow::{Context, Result};
use log::debug;
use regex::Regex;

use crate::events::EventStats;
use crate::features::{bout_count, parse_reach};
use crate::fighters::{FighterRecord, FighterStore, RankBy};
use crate::io::FightRecord;

/// A question mentioning none of these is not about the data.
const SCOPE_KEYWORDS: [&str; 19] = [
    "fighter", "fight", "win", "loss", "record", "ufc", "event", "knockout", "submission", "weight",
    "height", "reach", "stance", "champion", "match", "bout", "round", "ko", "tko",
];

pub static EXAMPLE_QUESTIONS: [&str; 8] = [
    "Who has the most wins?",
    "Who has the highest win rate?",
    "What is [fighter name]'s record?",
    "Compare fighters [fighter1] vs [fighter2]",
    "Who has the longest reach?",
    "How many events have been held?",
    "What are the most common weight classes?",
    "List the top fighters",
];

const LIST_LEN: usize = 10;
/// Wins + losses needed to appear in the win-rate answer.
const MIN_RATED_BOUTS: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Answer<'a> {
    OutOfScope { suggestions: &'static [&'static str] },
    /// In scope, but no route matched.
    Help { suggestions: &'static [&'static str] },
    MostWins(Vec<&'a FighterRecord>),
    /// Wins / (wins + losses), best first.
    WinRates(Vec<(&'a FighterRecord, f64)>),
    Record(&'a FighterRecord),
    Comparison(&'a FighterRecord, &'a FighterRecord),
    LongestReach(Vec<&'a FighterRecord>),
    EventCount(usize),
    WeightClasses(Vec<(String, usize)>),
    TopFighters(Vec<&'a FighterRecord>),
}

pub struct QuestionAnswering<'a> {
    store: &'a FighterStore,
    stats: EventStats,
    /// "record of Jon Jones", "stats Jon Jones", "about Jon Jones"
    named_after: Regex,
    /// "Jon Jones's", "Jon Jones'"
    possessive: Regex,
    /// Two or more capitalised words in a row.
    name: Regex,
}

impl<'a> QuestionAnswering<'a> {
    pub fn new(store: &'a FighterStore, fights: &[FightRecord]) -> Result<Self> {
        Ok(Self {
            store,
            stats: EventStats::from_fights(fights),
            named_after: compile(r"(?:record|stats|about)\s+(?:of\s+)?([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)")?,
            possessive: compile(r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)(?:'s|s')")?,
            name: compile(r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+")?,
        })
    }

    pub fn is_in_scope(question: &str) -> bool {
        let lower = question.to_lowercase();
        SCOPE_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    /// Routes are tried in a fixed order. A record or comparison whose fighters
    /// can't be found falls through to the routes after it.
    pub fn answer(&self, question: &str) -> Answer<'a> {
        if !Self::is_in_scope(question) {
            return Answer::OutOfScope { suggestions: &EXAMPLE_QUESTIONS[..5] };
        }
        let lower = question.to_lowercase();
        let mentions = |phrases: &[&str]| phrases.iter().any(|p| lower.contains(p));

        if mentions(&["most wins", "highest wins"]) {
            return Answer::MostWins(self.store.top_fighters(LIST_LEN, RankBy::Wins, 0));
        }
        if mentions(&["win rate", "best record"]) {
            return Answer::WinRates(self.win_rates());
        }
        if mentions(&["record", "stats"]) {
            if let Some(f) = self.mentioned_fighter(question).and_then(|name| self.find_fighter(name)) {
                return Answer::Record(f);
            }
        }
        if mentions(&["compare", "vs", "versus"]) {
            let names: Vec<&str> = self.name.find_iter(question).map(|m| m.as_str()).take(2).collect();
            if let [a, b] = names.as_slice() {
                if let (Some(f1), Some(f2)) = (self.find_fighter(a), self.find_fighter(b)) {
                    return Answer::Comparison(f1, f2);
                }
            }
        }
        if mentions(&["longest reach", "biggest reach"]) {
            return Answer::LongestReach(self.longest_reach());
        }
        if mentions(&["how many events", "total events"]) {
            return Answer::EventCount(self.stats.events);
        }
        if mentions(&["weight class"]) {
            return Answer::WeightClasses(self.stats.weight_classes.iter().take(LIST_LEN).cloned().collect());
        }
        if mentions(&["top"]) && mentions(&["fighter"]) {
            return Answer::TopFighters(self.store.top_fighters(LIST_LEN, RankBy::Wins, 0));
        }
        debug!("no route for {:?}", question);
        Answer::Help { suggestions: &EXAMPLE_QUESTIONS }
    }

    fn mentioned_fighter<'q>(&self, question: &'q str) -> Option<&'q str> {
        self.named_after
            .captures(question)
            .or_else(|| self.possessive.captures(question))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// First fighter, in table order, whose full name contains `name` or is contained in it.
    pub fn find_fighter(&self, name: &str) -> Option<&'a FighterRecord> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        let store: &'a FighterStore = self.store;
        store.fighters().iter().find(|f| {
            let full = f.full_name.to_lowercase();
            !full.is_empty() && (full.contains(&wanted) || wanted.contains(&full))
        })
    }

    fn win_rates(&self) -> Vec<(&'a FighterRecord, f64)> {
        let store: &'a FighterStore = self.store;
        let mut rated: Vec<(&'a FighterRecord, f64)> = store
            .fighters()
            .iter()
            .filter_map(|f| {
                let bouts = bout_count(f.wins, f.losses, 0);
                (bouts >= MIN_RATED_BOUTS).then(|| (f, f.wins as f64 / bouts as f64))
            })
            .collect();
        rated.sort_by(|a, b| b.1.total_cmp(&a.1));
        rated.truncate(LIST_LEN);
        rated
    }

    fn longest_reach(&self) -> Vec<&'a FighterRecord> {
        let store: &'a FighterStore = self.store;
        let mut ranked: Vec<(&'a FighterRecord, f64)> =
            store.fighters().iter().map(|f| (f, parse_reach(&f.reach))).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.into_iter().take(LIST_LEN).map(|(f, _)| f).collect()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("compiling {}", pattern))
}

fn record_of(f: &FighterRecord) -> String {
    format!("{}-{}-{}", f.wins, f.losses, f.draws)
}

fn write_suggestions(out: &mut fmt::Formatter<'_>, header: &str, suggestions: &[&str]) -> fmt::Result {
    write!(out, "{}", header)?;
    for s in suggestions {
        write!(out, "\n  - {}", s)?;
    }
    Ok(())
}

fn write_by_wins(out: &mut fmt::Formatter<'_>, fighters: &[&FighterRecord]) -> fmt::Result {
    for (i, f) in fighters.iter().enumerate() {
        write!(out, "\n{:>3}. {:<30} {}", i + 1, f.full_name, record_of(f))?;
    }
    Ok(())
}

impl fmt::Display for Answer<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::OutOfScope { suggestions } => write_suggestions(
                out,
                "That question isn't about UFC fighters, fights or events. Try asking:",
                suggestions,
            ),
            Answer::Help { suggestions } => {
                write_suggestions(out, "I can answer questions about UFC fighters and events. Try asking:", suggestions)
            }
            Answer::MostWins(fighters) => {
                match fighters.first() {
                    Some(top) => write!(out, "{} has the most wins with {} victories.", top.full_name, top.wins)?,
                    None => write!(out, "No fighters loaded.")?,
                }
                write_by_wins(out, fighters)
            }
            Answer::WinRates(rated) => {
                write!(out, "Top fighters by win rate (minimum {} fights):", MIN_RATED_BOUTS)?;
                for (i, (f, rate)) in rated.iter().enumerate() {
                    write!(out, "\n{:>3}. {:<30} {:>3}-{:<3} {:>5.1}%", i + 1, f.full_name, f.wins, f.losses, rate * 100.0)?;
                }
                Ok(())
            }
            Answer::Record(f) => {
                write!(out, "{}'s record:", f.full_name)?;
                let rows = [
                    ("Nickname", f.nickname.clone()),
                    ("Record", record_of(f)),
                    ("Height", f.height.clone()),
                    ("Weight", f.weight.clone()),
                    ("Reach", f.reach.clone()),
                    ("Stance", f.stance.clone()),
                ];
                for (label, value) in rows {
                    write!(out, "\n  {:<10} {}", label, value)?;
                }
                Ok(())
            }
            Answer::Comparison(a, b) => {
                write!(out, "{:<10} {:<24} {:<24}", "", a.full_name, b.full_name)?;
                let rows = [
                    ("Record", record_of(a), record_of(b)),
                    ("Height", a.height.clone(), b.height.clone()),
                    ("Weight", a.weight.clone(), b.weight.clone()),
                    ("Reach", a.reach.clone(), b.reach.clone()),
                    ("Stance", a.stance.clone(), b.stance.clone()),
                ];
                for (label, left, right) in rows {
                    write!(out, "\n{:<10} {:<24} {:<24}", label, left, right)?;
                }
                Ok(())
            }
            Answer::LongestReach(fighters) => {
                write!(out, "Fighters with the longest reach:")?;
                for (i, f) in fighters.iter().enumerate() {
                    write!(out, "\n{:>3}. {:<30} {:>8} {:>8}", i + 1, f.full_name, f.reach, f.height)?;
                }
                Ok(())
            }
            Answer::EventCount(n) => write!(out, "Total UFC events recorded: {}", n),
            Answer::WeightClasses(counts) => {
                write!(out, "Most common weight classes:")?;
                for (class, count) in counts {
                    write!(out, "\n  {:<28} {:>6}", class, count)?;
                }
                Ok(())
            }
            Answer::TopFighters(fighters) => {
                write!(out, "Top {} fighters by total wins:", fighters.len())?;
                write_by_wins(out, fighters)
            }
        }
    }
}
