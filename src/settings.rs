// Defaults for search, training and data locations.

pub struct SearchSettings {
    pub fuzzy_threshold: f64,
    pub loose_threshold: f64,
    pub min_token_len: usize,
    pub suggestion_cutoff: f64,
    pub max_results: usize,
    pub suggestions: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.6,
            loose_threshold: 0.4,
            min_token_len: 3,
            suggestion_cutoff: 0.3,
            max_results: 10,
            suggestions: 5,
        }
    }
}

pub struct TrainSettings {
    pub test_ratio: f64,
    pub seed: u64,
    pub max_iterations: u64,
    /// Also train on every pair swapped with its label inverted.
    pub mirror_pairs: bool,
}

impl Default for TrainSettings {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
            max_iterations: 200,
            mirror_pairs: false,
        }
    }
}

pub struct DataSettings {
    pub fighters_csv: &'static str,
    pub events_csv: &'static str,
    pub model_path: &'static str,
    pub min_fights_for_win_rate: u32,
    pub default_weight_class: &'static str,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            fighters_csv: "ufc_fighters.csv",
            events_csv: "ufc_event_data.csv",
            model_path: "fight_model.json",
            min_fights_for_win_rate: 10,
            default_weight_class: "Lightweight",
        }
    }
}

#[derive(Default)]
pub struct AppConfig {
    pub search: SearchSettings,
    pub train: TrainSettings,
    pub data: DataSettings,
}
