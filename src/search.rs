// Fighter name search: a fixed ladder of strategies where the first one with hits wins.
use std::collections::BTreeSet;

use log::debug;

use crate::fighters::{FighterRecord, FighterStore};
use crate::settings::SearchSettings;
use crate::similarity::{close_matches, ratio};

/// Search strategies in the order they run. Results are never blended across tiers.
///
/// 1. exact first/last/nickname
/// 2. substring of first/last/nickname
/// 3. fuzzy, best-of-four similarity >= 0.6, best first
/// 4. any query token of 3+ chars as a substring
/// 5. fuzzy again at 0.4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Exact,
    Partial,
    Fuzzy,
    Token,
    LooseFuzzy,
}

/// Lower-cased name fields of one fighter, computed once per store.
struct Names {
    first: String,
    last: String,
    nickname: String,
    full: String,
}

impl Names {
    fn of(f: &FighterRecord) -> Self {
        Self {
            first: f.first_name.to_lowercase(),
            last: f.last_name.to_lowercase(),
            nickname: f.nickname.to_lowercase(),
            full: f.full_name.to_lowercase(),
        }
    }

    fn any_equals(&self, q: &str) -> bool {
        self.first == q || self.last == q || self.nickname == q
    }

    fn any_contains(&self, q: &str) -> bool {
        self.first.contains(q) || self.last.contains(q) || self.nickname.contains(q)
    }

    fn best_ratio(&self, q: &str) -> f64 {
        [&self.first, &self.last, &self.nickname, &self.full]
            .into_iter()
            .map(|name| ratio(q, name))
            .fold(0.0, f64::max)
    }
}

pub struct FighterSearch<'a> {
    store: &'a FighterStore,
    names: Vec<Names>,
    settings: SearchSettings,
}

impl<'a> FighterSearch<'a> {
    pub fn new(store: &'a FighterStore) -> Self {
        Self::with_settings(store, SearchSettings::default())
    }

    pub fn with_settings(store: &'a FighterStore, settings: SearchSettings) -> Self {
        let names = store.fighters().iter().map(Names::of).collect();
        Self { store, names, settings }
    }

    pub fn search(&self, query: &str, max_results: usize) -> Vec<&'a FighterRecord> {
        self.search_tiered(query, max_results).1
    }

    /// Like [`search`](Self::search), also reporting which tier produced the hits.
    /// The tier is `None` only when nothing matched.
    pub fn search_tiered(&self, query: &str, max_results: usize) -> (Option<Tier>, Vec<&'a FighterRecord>) {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return (None, Vec::new());
        }

        let tiers = [Tier::Exact, Tier::Partial, Tier::Fuzzy, Tier::Token, Tier::LooseFuzzy];
        for tier in tiers {
            let mut hits = self.run_tier(tier, &q);
            if !hits.is_empty() {
                debug!("search {:?}: {} hits from {:?}", q, hits.len(), tier);
                hits.truncate(max_results);
                return (Some(tier), hits);
            }
        }
        (None, Vec::new())
    }

    fn run_tier(&self, tier: Tier, q: &str) -> Vec<&'a FighterRecord> {
        match tier {
            Tier::Exact => self.filter(|n| n.any_equals(q)),
            Tier::Partial => self.filter(|n| n.any_contains(q)),
            Tier::Fuzzy => self.fuzzy(q, self.settings.fuzzy_threshold),
            Tier::Token => {
                let tokens: Vec<&str> = q
                    .split_whitespace()
                    .filter(|t| t.chars().count() >= self.settings.min_token_len)
                    .collect();
                if tokens.is_empty() {
                    return Vec::new();
                }
                self.filter(|n| tokens.iter().any(|t| n.any_contains(t)))
            }
            Tier::LooseFuzzy => self.fuzzy(q, self.settings.loose_threshold),
        }
    }

    fn filter(&self, pred: impl Fn(&Names) -> bool) -> Vec<&'a FighterRecord> {
        let store: &'a FighterStore = self.store;
        store
            .fighters()
            .iter()
            .zip(&self.names)
            .filter(|(_, names)| pred(names))
            .map(|(f, _)| f)
            .collect()
    }

    fn fuzzy(&self, q: &str, threshold: f64) -> Vec<&'a FighterRecord> {
        let store: &'a FighterStore = self.store;
        let mut scored: Vec<(&'a FighterRecord, f64)> = store
            .fighters()
            .iter()
            .zip(&self.names)
            .map(|(f, names)| (f, names.best_ratio(q)))
            .filter(|(_, score)| *score >= threshold)
            .collect();
        // stable: equal scores keep table order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.into_iter().map(|(f, _)| f).collect()
    }

    /// Distinct names (first, last, nickname, full) close to `query`, best first.
    pub fn get_suggestions(&self, query: &str, n: usize) -> Vec<String> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Vec::new();
        }
        let pool: BTreeSet<&str> = self
            .names
            .iter()
            .flat_map(|n| [n.first.as_str(), n.last.as_str(), n.nickname.as_str(), n.full.as_str()])
            .filter(|s| !s.is_empty())
            .collect();
        close_matches(&q, pool, n, self.settings.suggestion_cutoff)
    }
}

/// Wraps case-insensitive occurrences of `query` in `**`.
pub fn highlight_match(text: &str, query: &str) -> String {
    if query.is_empty() || text.is_empty() {
        return text.to_string();
    }
    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 4);
    let mut i = 0;
    while i < chars.len() {
        if let Some(len) = match_len_at(&chars[i..], &needle) {
            out.push_str("**");
            out.extend(&chars[i..i + len]);
            out.push_str("**");
            i += len;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Number of `hay` chars whose lower-case form spells `needle`, if it does.
fn match_len_at(hay: &[char], needle: &[char]) -> Option<usize> {
    let mut pos = 0;
    for (used, c) in hay.iter().enumerate() {
        if pos == needle.len() {
            return Some(used);
        }
        for lc in c.to_lowercase() {
            if needle.get(pos) != Some(&lc) {
                return None;
            }
            pos += 1;
        }
    }
    (pos == needle.len()).then_some(hay.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::FighterRow;

    fn store(names: &[(&str, &str, &str)]) -> FighterStore {
        FighterStore::new(names.iter().map(|(first, last, nick)| FighterRow {
            first_name: first.to_string(),
            last_name: last.to_string(),
            nickname: nick.to_string(),
            ..FighterRow::default()
        }))
    }

    fn full_names(hits: &[&FighterRecord]) -> Vec<String> {
        hits.iter().map(|f| f.full_name.clone()).collect()
    }

    #[test]
    fn empty_queries_return_nothing() {
        let s = store(&[("Jon", "Jones", "Bones")]);
        let search = FighterSearch::new(&s);
        assert!(search.search("", 10).is_empty());
        assert!(search.search("   ", 10).is_empty());
        assert!(search.get_suggestions("  ", 5).is_empty());
    }

    #[test]
    fn exact_beats_partial() {
        let s = store(&[("Jon", "Jonesy", ""), ("Jon", "Jones", "Bones"), ("Anthony", "Smith", "Jones")]);
        let search = FighterSearch::new(&s);
        let (tier, hits) = search.search_tiered("JONES", 10);
        assert_eq!(tier, Some(Tier::Exact));
        assert_eq!(full_names(&hits), vec!["Jon Jones", "Anthony Smith"]);
    }

    #[test]
    fn partial_matches_substrings() {
        let s = store(&[("Jon", "Jones", "Bones"), ("Jose", "Aldo", "Junior"), ("Max", "Holloway", "Blessed")]);
        let search = FighterSearch::new(&s);
        let (tier, hits) = search.search_tiered("on", 10);
        assert_eq!(tier, Some(Tier::Partial));
        assert_eq!(full_names(&hits), vec!["Jon Jones"]);
    }

    #[test]
    fn fuzzy_orders_by_best_score() {
        let s = store(&[("Khabib", "Nurmagomedov", ""), ("Islam", "Makhachev", ""), ("Islem", "Makachev", "")]);
        let search = FighterSearch::new(&s);
        // a full name is not a substring of any single field
        let (tier, hits) = search.search_tiered("islam makhachev", 10);
        assert_eq!(tier, Some(Tier::Fuzzy));
        assert_eq!(full_names(&hits), vec!["Islam Makhachev", "Islem Makachev"]);

        let (tier, hits) = search.search_tiered("islam makhachv", 10);
        assert_eq!(tier, Some(Tier::Fuzzy));
        assert_eq!(full_names(&hits), vec!["Islam Makhachev", "Islem Makachev"]);
    }

    #[test]
    fn token_tier_needs_three_chars() {
        let s = store(&[("Jon", "Jones", "Bones"), ("Daniel", "Cormier", "DC")]);
        let search = FighterSearch::new(&s);
        // no single field contains the whole query; "cormier" token does
        let (tier, hits) = search.search_tiered("zzzzzzzzzzzzzzzzzzzz cormier", 10);
        assert_eq!(tier, Some(Tier::Token));
        assert_eq!(full_names(&hits), vec!["Daniel Cormier"]);

        assert!(search.run_tier(Tier::Token, "jo dc").is_empty());
    }

    #[test]
    fn loose_fuzzy_is_the_last_resort() {
        let s = store(&[("Jon", "Jones", "Bones"), ("Daniel", "Cormier", "DC")]);
        let search = FighterSearch::new(&s);

        // 0.53 against "cormier": below the fuzzy cut, and the token hits nothing
        let (tier, hits) = search.search_tiered("cormxxxx", 10);
        assert_eq!(tier, Some(Tier::LooseFuzzy));
        assert_eq!(full_names(&hits), vec!["Daniel Cormier"]);

        // only short tokens, so the token tier has nothing to try
        let (tier, hits) = search.search_tiered("jx nx", 10);
        assert_eq!(tier, Some(Tier::LooseFuzzy));
        assert_eq!(full_names(&hits), vec!["Jon Jones"]);

        // exactly 0.4 against "jones" still counts
        let (tier, hits) = search.search_tiered("jqqqs", 10);
        assert_eq!(tier, Some(Tier::LooseFuzzy));
        assert_eq!(full_names(&hits), vec!["Jon Jones"]);
    }

    #[test]
    fn results_are_truncated() {
        let s = store(&[("A", "Silva", ""), ("B", "Silva", ""), ("C", "Silva", "")]);
        let search = FighterSearch::new(&s);
        assert_eq!(full_names(&search.search("silva", 2)), vec!["A Silva", "B Silva"]);
    }

    #[test]
    fn suggestions_come_from_all_name_fields() {
        let s = store(&[("Conor", "McGregor", "Notorious"), ("Jon", "Jones", "Bones")]);
        let search = FighterSearch::new(&s);
        let got = search.get_suggestions("mcgreggor", 5);
        assert_eq!(got[0], "mcgregor");
        assert!(search.get_suggestions("jones", 5).contains(&"jon jones".to_string()));
    }

    #[test]
    fn highlights_case_insensitively() {
        assert_eq!(highlight_match("Jon Jones", "jon"), "**Jon** **Jon**es");
        assert_eq!(highlight_match("Jon Jones", ""), "Jon Jones");
        assert_eq!(highlight_match("", "jon"), "");
        assert_eq!(highlight_match("Jon", "jonathan"), "Jon");
    }
}
