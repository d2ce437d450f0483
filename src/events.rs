// Totals over the events table: distinct events, bouts, and how often each weight class and finish method appears.
use std::collections::{HashMap, HashSet};

use crate::io::FightRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStats {
    /// Distinct non-blank event names.
    pub events: usize,
    pub fights: usize,
    pub weight_classes: Vec<(String, usize)>,
    pub methods: Vec<(String, usize)>,
}

impl EventStats {
    pub fn from_fights(fights: &[FightRecord]) -> Self {
        let events: HashSet<&str> = fights
            .iter()
            .map(|f| f.event_name.trim())
            .filter(|name| !name.is_empty())
            .collect();
        EventStats {
            events: events.len(),
            fights: fights.len(),
            weight_classes: frequencies(fights.iter().map(|f| f.weight_class.as_str())),
            methods: frequencies(fights.iter().map(|f| f.method.as_str())),
        }
    }
}

/// Count of each non-blank value, most frequent first. Equal counts keep first appearance.
pub fn frequencies<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for value in values.into_iter().map(str::trim).filter(|v| !v.is_empty()) {
        match slots.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slots.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fight(event: &str, weight_class: &str, method: &str) -> FightRecord {
        FightRecord {
            event_name: event.into(),
            weight_class: weight_class.into(),
            method: method.into(),
            ..FightRecord::default()
        }
    }

    #[test]
    fn counts_events_fights_and_categories() {
        let fights = vec![
            fight("UFC 300", "Lightweight", "KO/TKO"),
            fight("UFC 300", "Welterweight", "Decision - Unanimous"),
            fight("UFC 301", "Welterweight", "KO/TKO"),
            fight("UFC 301", "Welterweight", "Submission"),
            fight("", "", "KO/TKO"),
        ];
        let stats = EventStats::from_fights(&fights);
        assert_eq!(stats.events, 2);
        assert_eq!(stats.fights, 5);
        assert_eq!(
            stats.weight_classes,
            vec![("Welterweight".to_string(), 3), ("Lightweight".to_string(), 1)]
        );
        assert_eq!(stats.methods[0], ("KO/TKO".to_string(), 3));
    }

    #[test]
    fn ties_keep_first_appearance() {
        let got = frequencies(["Flyweight", " Bantamweight ", "Bantamweight", "Flyweight", "Heavyweight"]);
        assert_eq!(
            got,
            vec![
                ("Flyweight".to_string(), 2),
                ("Bantamweight".to_string(), 2),
                ("Heavyweight".to_string(), 1),
            ]
        );
        assert!(EventStats::from_fights(&[]).weight_classes.is_empty());
    }
}
