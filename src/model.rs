// Fight outcome model: joins bouts to fighter records, fits a logistic regression and predicts win probabilities.
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use log::{info, warn};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::features::{
    extract_pair_features, CategoricalEncoders, FightPair, FighterStats, PairFeatures, FEATURE_NAMES,
    NUM_FEATURES,
};
use crate::fighters::FighterStore;
use crate::io::FightRecord;
use crate::metrics::{classification_report, ClassificationReport};
use crate::settings::TrainSettings;

/// Bumped whenever the bundle layout or the feature vector changes.
pub const BUNDLE_VERSION: u32 = 1;

#[derive(Debug)]
pub enum ModelError {
    NotTrained,
    InsufficientData,
    SingleClass,
    Fit(String),
    Io(io::Error),
    Format(serde_json::Error),
    VersionMismatch { found: u32, expected: u32 },
    FeatureLayoutMismatch,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::NotTrained => write!(f, "model is not trained"),
            ModelError::InsufficientData => {
                write!(f, "insufficient training data: no bout with a decided winner")
            }
            ModelError::SingleClass => write!(
                f,
                "every labeled bout has the same outcome; enable pair mirroring to train on both corners"
            ),
            ModelError::Fit(msg) => write!(f, "fitting failed: {}", msg),
            ModelError::Io(e) => write!(f, "model file: {}", e),
            ModelError::Format(e) => write!(f, "model bundle is malformed: {}", e),
            ModelError::VersionMismatch { found, expected } => {
                write!(f, "model bundle version {} is not supported (expected {})", found, expected)
            }
            ModelError::FeatureLayoutMismatch => {
                write!(f, "model bundle was trained on a different feature layout")
            }
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Io(e) => Some(e),
            ModelError::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ModelError {
    fn from(e: io::Error) -> Self {
        ModelError::Io(e)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Format(e)
    }
}

/// Fitted logistic regression. `probability` is P(fighter1 wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl LogisticModel {
    fn fit(x: &Array2<f64>, y: &Array1<usize>, max_iterations: u64) -> Result<Self, ModelError> {
        let dataset = Dataset::new(x.clone(), y.clone());
        let fitted = LogisticRegression::default()
            .max_iterations(max_iterations)
            .fit(&dataset)
            .map_err(|e| ModelError::Fit(e.to_string()))?;

        let mut model = LogisticModel {
            intercept: fitted.intercept(),
            weights: fitted.params().to_vec(),
        };

        // linfa picks its own positive class; flip so the logit favours label 1.
        let predicted = fitted.predict(x);
        let logits: Vec<f64> = x.rows().into_iter().map(|r| model.logit(&r.to_vec())).collect();
        let anchor = (0..logits.len()).max_by(|&a, &b| logits[a].abs().total_cmp(&logits[b].abs()));
        if let Some(i) = anchor {
            if (logits[i] >= 0.0) != (predicted[i] == 1) {
                model.intercept = -model.intercept;
                model.weights.iter_mut().for_each(|w| *w = -*w);
            }
        }
        Ok(model)
    }

    fn logit(&self, features: &[f64]) -> f64 {
        self.intercept + self.weights.iter().zip(features).map(|(w, x)| w * x).sum::<f64>()
    }

    pub fn probability(&self, features: &[f64]) -> f64 {
        1.0 / (1.0 + (-self.logit(features)).exp())
    }

    pub fn predict(&self, features: &[f64]) -> usize {
        usize::from(self.probability(features) > 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    Fighter1,
    Fighter2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub winner: Corner,
    /// Percent.
    pub fighter1_win_prob: f64,
    /// Percent.
    pub fighter2_win_prob: f64,
    /// Larger of the two probabilities, in percent.
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub accuracy: f64,
    pub report: ClassificationReport,
    /// Bouts with a decided winner; the rows the model learns from.
    pub labeled_rows: usize,
    /// Draws and unknown outcomes.
    pub excluded_rows: usize,
    /// Fighter names in labeled bouts with no record in the table.
    pub unmatched_fighters: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct Trained {
    classifier: LogisticModel,
    encoders: CategoricalEncoders,
    feature_names: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct ModelBundle {
    version: u32,
    trained: bool,
    feature_names: Vec<String>,
    encoders: CategoricalEncoders,
    classifier: LogisticModel,
}

/// `train` takes `&mut self` and `predict_fight` only reads, so a trained predictor can be shared for predictions.
#[derive(Debug, Clone, Default)]
pub struct FightPredictor {
    state: Option<Trained>,
}

impl FightPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let mut predictor = Self::new();
        predictor.load_model(path)?;
        Ok(predictor)
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// Fits a fresh model. Any previous model is replaced only if this succeeds.
    pub fn train(
        &mut self,
        fights: &[FightRecord],
        store: &FighterStore,
        settings: &TrainSettings,
    ) -> Result<TrainingReport, ModelError> {
        let mut unmatched = 0;
        let mut join = |name: &str| match store.get_fighter_by_name(name) {
            Some(f) => f.stats(),
            None => {
                unmatched += 1;
                FighterStats::default()
            }
        };

        let mut pairs = Vec::new();
        let mut labels = Vec::new();
        for fight in fights.iter().filter(|f| f.is_decided()) {
            pairs.push(FightPair {
                fighter1: join(&fight.fighter1),
                fighter2: join(&fight.fighter2),
                weight_class: fight.weight_class.clone(),
            });
            labels.push(usize::from(fight.winner == fight.fighter1));
        }

        let labeled_rows = pairs.len();
        let excluded_rows = fights.len() - labeled_rows;
        info!("{} labeled bouts, {} draws or unknown outcomes excluded", labeled_rows, excluded_rows);
        if unmatched > 0 {
            warn!("{} fighter names had no record; their stats are zero", unmatched);
        }
        if labeled_rows == 0 {
            return Err(ModelError::InsufficientData);
        }

        let (train_idx, test_idx) = split_indices(labeled_rows, settings.test_ratio, settings.seed);
        let (train_pairs, train_labels) = partition(&pairs, &labels, &train_idx, settings.mirror_pairs);
        let (test_pairs, test_labels) = partition(&pairs, &labels, &test_idx, settings.mirror_pairs);

        if train_labels.iter().all(|&l| l == train_labels[0]) {
            return Err(ModelError::SingleClass);
        }

        let mut seen = train_pairs.clone();
        seen.extend(test_pairs.iter().cloned());
        let encoders = CategoricalEncoders::fit(&seen);

        let x_train = to_matrix(&train_pairs, &encoders);
        let y_train = Array1::from(train_labels);
        let classifier = LogisticModel::fit(&x_train, &y_train, settings.max_iterations)?;

        let predicted: Vec<usize> = test_pairs
            .iter()
            .map(|p| classifier.predict(features_of(p, &encoders).values()))
            .collect();
        let report = classification_report(&test_labels, &predicted);
        info!(
            "trained on {} rows, held out {}, accuracy {:.3}",
            train_pairs.len(),
            test_pairs.len(),
            report.accuracy
        );

        self.state = Some(Trained {
            classifier,
            encoders,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        });

        Ok(TrainingReport {
            accuracy: report.accuracy,
            report,
            labeled_rows,
            excluded_rows,
            unmatched_fighters: unmatched,
            train_rows: train_pairs.len(),
            test_rows: test_pairs.len(),
        })
    }

    /// Both fighters' stances go through the fitted stance tables; unseen values encode as 0.
    pub fn predict_fight(
        &self,
        fighter1: &FighterStats,
        fighter2: &FighterStats,
        weight_class: &str,
    ) -> Result<Prediction, ModelError> {
        let trained = self.state.as_ref().ok_or(ModelError::NotTrained)?;
        let features = extract_pair_features(fighter1, fighter2, weight_class, &trained.encoders);
        let p1 = trained.classifier.probability(features.values());
        let p2 = 1.0 - p1;

        Ok(Prediction {
            winner: if p1 > p2 { Corner::Fighter1 } else { Corner::Fighter2 },
            fighter1_win_prob: p1 * 100.0,
            fighter2_win_prob: p2 * 100.0,
            confidence: p1.max(p2) * 100.0,
        })
    }

    /// Feature weights, largest magnitude first.
    pub fn feature_weights(&self) -> Option<Vec<(String, f64)>> {
        let trained = self.state.as_ref()?;
        let mut weights: Vec<(String, f64)> = trained
            .feature_names
            .iter()
            .cloned()
            .zip(trained.classifier.weights.iter().copied())
            .collect();
        weights.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        Some(weights)
    }

    pub fn save_model(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let trained = self.state.as_ref().ok_or(ModelError::NotTrained)?;
        let bundle = ModelBundle {
            version: BUNDLE_VERSION,
            trained: true,
            feature_names: trained.feature_names.clone(),
            encoders: trained.encoders.clone(),
            classifier: trained.classifier.clone(),
        };

        let path = path.as_ref();
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&bundle)?)?;
        fs::rename(&tmp, path)?;
        info!("saved model to {}", path.display());
        Ok(())
    }

    /// Replaces the current state only when the bundle is valid.
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let raw = fs::read(path.as_ref())?;
        let bundle: ModelBundle = serde_json::from_slice(&raw)?;

        if bundle.version != BUNDLE_VERSION {
            return Err(ModelError::VersionMismatch { found: bundle.version, expected: BUNDLE_VERSION });
        }
        if bundle.feature_names.len() != NUM_FEATURES
            || bundle.feature_names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b)
            || bundle.classifier.weights.len() != NUM_FEATURES
        {
            return Err(ModelError::FeatureLayoutMismatch);
        }

        self.state = bundle.trained.then(|| Trained {
            classifier: bundle.classifier,
            encoders: bundle.encoders,
            feature_names: bundle.feature_names,
        });
        Ok(())
    }
}

/// Shuffled (train, test) indices. The test share rounds up, but at least one row is kept for training.
fn split_indices(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(&mut StdRng::seed_from_u64(seed));
    let n_test = ((n as f64 * test_ratio).ceil() as usize).min(n.saturating_sub(1));
    let train = idx.split_off(n_test);
    (train, idx)
}

fn partition(
    pairs: &[FightPair],
    labels: &[usize],
    idx: &[usize],
    mirror: bool,
) -> (Vec<FightPair>, Vec<usize>) {
    let mut out_pairs = Vec::with_capacity(idx.len() * 2);
    let mut out_labels = Vec::with_capacity(idx.len() * 2);
    for &i in idx {
        out_pairs.push(pairs[i].clone());
        out_labels.push(labels[i]);
        if mirror {
            out_pairs.push(pairs[i].swapped());
            out_labels.push(1 - labels[i]);
        }
    }
    (out_pairs, out_labels)
}

fn features_of(pair: &FightPair, encoders: &CategoricalEncoders) -> PairFeatures {
    extract_pair_features(&pair.fighter1, &pair.fighter2, &pair.weight_class, encoders)
}

fn to_matrix(pairs: &[FightPair], encoders: &CategoricalEncoders) -> Array2<f64> {
    let mut x = Array2::<f64>::zeros((pairs.len(), NUM_FEATURES));
    for (i, pair) in pairs.iter().enumerate() {
        for (j, v) in features_of(pair, encoders).values().iter().enumerate() {
            x[(i, j)] = *v;
        }
    }
    x
}
