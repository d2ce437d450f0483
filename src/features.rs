// Pair features for the fight outcome model: raw-string parsing, categorical encoding, and the 16-entry vector.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stand-in for a missing categorical value.
pub const UNKNOWN: &str = "Unknown";

/// Fallback code for a category never seen in training.
pub const UNSEEN_CODE: f64 = 0.0;

pub const NUM_FEATURES: usize = 16;

/// Column order of every feature vector. Bundles saved with another order are rejected.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "height_diff",
    "reach_diff",
    "weight_diff",
    "win_rate_diff",
    "experience_diff",
    "height_inches_f1",
    "reach_num_f1",
    "win_rate_f1",
    "total_fights_f1",
    "height_inches_f2",
    "reach_num_f2",
    "win_rate_f2",
    "total_fights_f2",
    "weight_class_encoded",
    "stance_f1_encoded",
    "stance_f2_encoded",
];

/// `5' 11"` -> 71. Placeholders and anything unparsable -> 0.
pub fn parse_height(raw: &str) -> f64 {
    if raw.contains("--") {
        return 0.0;
    }
    let cleaned = raw.replace('"', "").replace('\'', " ");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    match parts.as_slice() {
        [feet, inches] => match (feet.parse::<i64>(), inches.parse::<i64>()) {
            (Ok(f), Ok(i)) => (f * 12 + i) as f64,
            _ => 0.0,
        },
        _ => 0.0,
    }
}

/// `74.0"` -> 74.0
pub fn parse_reach(raw: &str) -> f64 {
    to_number(&raw.replace('"', "").replace("--", "0"))
}

/// `155 lbs.` -> 155.0
pub fn parse_weight(raw: &str) -> f64 {
    to_number(&raw.replace(" lbs.", "").replace("--", "0"))
}

fn to_number(s: &str) -> f64 {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Wins + losses + draws, widened so large counters cannot overflow.
pub fn bout_count(wins: u32, losses: u32, draws: u32) -> u64 {
    u64::from(wins) + u64::from(losses) + u64::from(draws)
}

/// Fraction of bouts won, 0 for a fighter with no bouts.
pub fn win_rate(wins: u32, losses: u32, draws: u32) -> f64 {
    let total = bout_count(wins, losses, draws);
    if total > 0 {
        wins as f64 / total as f64
    } else {
        0.0
    }
}

/// Numeric view of one fighter. `Default` is what an unmatched name joins to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FighterStats {
    pub height: f64,
    pub reach: f64,
    pub weight: f64,
    pub wins: f64,
    pub losses: f64,
    pub total_fights: f64,
    /// 0-1 fraction.
    pub win_rate: f64,
    pub stance: Option<String>,
}

impl FighterStats {
    fn stance_label(&self) -> &str {
        self.stance.as_deref().unwrap_or(UNKNOWN)
    }
}

/// Sorted distinct labels; a label's code is its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let set: BTreeSet<&str> = values.into_iter().collect();
        Self {
            classes: set.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn code(&self, value: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(value)).ok()
    }

    pub fn encode(&self, value: &str) -> f64 {
        self.code(value).map(|c| c as f64).unwrap_or(UNSEEN_CODE)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// One table per categorical column, fitted together at training time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoders {
    pub weight_class: LabelEncoder,
    pub stance_f1: LabelEncoder,
    pub stance_f2: LabelEncoder,
}

impl CategoricalEncoders {
    pub fn fit(pairs: &[FightPair]) -> Self {
        Self {
            weight_class: LabelEncoder::fit(pairs.iter().map(|p| weight_class_label(&p.weight_class))),
            stance_f1: LabelEncoder::fit(pairs.iter().map(|p| p.fighter1.stance_label())),
            stance_f2: LabelEncoder::fit(pairs.iter().map(|p| p.fighter2.stance_label())),
        }
    }
}

fn weight_class_label(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN
    } else {
        trimmed
    }
}

/// Two fighters and the division they met in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FightPair {
    pub fighter1: FighterStats,
    pub fighter2: FighterStats,
    pub weight_class: String,
}

impl FightPair {
    /// Same bout seen from the other corner.
    pub fn swapped(&self) -> Self {
        Self {
            fighter1: self.fighter2.clone(),
            fighter2: self.fighter1.clone(),
            weight_class: self.weight_class.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairFeatures(pub [f64; NUM_FEATURES]);

impl PairFeatures {
    pub fn values(&self) -> &[f64; NUM_FEATURES] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES.iter().position(|n| *n == name).map(|i| self.0[i])
    }

    pub fn diffs(&self) -> &[f64] {
        &self.0[0..5]
    }

    pub fn fighter1_block(&self) -> &[f64] {
        &self.0[5..9]
    }

    pub fn fighter2_block(&self) -> &[f64] {
        &self.0[9..13]
    }
}

pub fn extract_pair_features(
    f1: &FighterStats,
    f2: &FighterStats,
    weight_class: &str,
    encoders: &CategoricalEncoders,
) -> PairFeatures {
    let mut v = [
        f1.height - f2.height,
        f1.reach - f2.reach,
        f1.weight - f2.weight,
        f1.win_rate - f2.win_rate,
        f1.total_fights - f2.total_fights,
        f1.height,
        f1.reach,
        f1.win_rate,
        f1.total_fights,
        f2.height,
        f2.reach,
        f2.win_rate,
        f2.total_fights,
        encoders.weight_class.encode(weight_class_label(weight_class)),
        encoders.stance_f1.encode(f1.stance_label()),
        encoders.stance_f2.encode(f2.stance_label()),
    ];
    for x in v.iter_mut().filter(|x| !x.is_finite()) {
        *x = 0.0;
    }
    PairFeatures(v)
}
