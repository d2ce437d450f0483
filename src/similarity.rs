// Ratcliff/Obershelp string similarity, scored like the classic sequence matcher.
use std::collections::{HashMap, HashSet};

/// In a `b` this long, chars making up more than 1% of it never seed a match.
const AUTOJUNK_MIN_LEN: usize = 200;

struct Matcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> Matcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            let popular: HashSet<char> = b2j
                .iter()
                .filter(|(_, idx)| idx.len() > limit)
                .map(|(&c, _)| c)
                .collect();
            b2j.retain(|c, _| !popular.contains(c));
        }
        Self { a, b, b2j }
    }

    /// Longest matching block in a[alo..ahi] x b[blo..bhi]; earliest in `a`, then in `b`, on ties.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(js) = self.b2j.get(&self.a[i]) {
                for &j in js {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }

        // grow across characters dropped from the index
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }
        (besti, bestj, bestsize)
    }

    fn matched(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }
}

/// Similarity in [0, 1]; 1.0 for identical strings (including two empty ones).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let len = a.len() + b.len();
    if len == 0 {
        return 1.0;
    }
    2.0 * Matcher::new(&a, &b).matched() as f64 / len as f64
}

/// Up to `n` candidates scoring at least `cutoff` against `word`, best first.
/// Equal scores are ordered by candidate, descending.
pub fn close_matches<'a, I>(word: &str, candidates: I, n: usize, cutoff: f64) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    if n == 0 {
        return Vec::new();
    }
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|c| (ratio(c, word), c))
        .filter(|(score, _)| *score >= cutoff)
        .collect();
    scored.sort_by(|x, y| y.0.total_cmp(&x.0).then_with(|| y.1.cmp(x.1)));
    scored.into_iter().take(n).map(|(_, c)| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ratio_basics() {
        assert!(close(ratio("jones", "jones"), 1.0));
        assert!(close(ratio("", ""), 1.0));
        assert!(close(ratio("abc", ""), 0.0));
        assert!(close(ratio("abcd", "bcde"), 0.75));
        assert!(close(ratio("xyz", "jones"), 0.0));
    }

    #[test]
    fn ratio_counts_blocks_on_both_sides() {
        // "mcgreggor" vs "mcgregor": "mcgreg" + "or" = 8 matched chars
        assert!(close(ratio("mcgreggor", "mcgregor"), 16.0 / 17.0));
    }

    #[test]
    fn close_matches_orders_best_first_and_applies_cutoff() {
        let names = ["jon", "jones", "bones", "conor"];
        let got = close_matches("jones", names, 3, 0.6);
        assert_eq!(got, vec!["jones", "bones", "jon"]);
        assert_eq!(close_matches("jones", names, 1, 0.6), vec!["jones"]);
        assert!(close_matches("jones", names, 0, 0.0).is_empty());
        assert!(close_matches("qqqq", names, 5, 0.3).is_empty());
    }

    #[test]
    fn close_matches_breaks_ties_by_candidate_descending() {
        assert_eq!(close_matches("ab", ["ac", "ad"], 2, 0.3), vec!["ad", "ac"]);
    }
}
