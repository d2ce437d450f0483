// UFC fighter search and fight outcome prediction.
pub mod events;
pub mod features;
pub mod fighters;
pub mod io;
pub mod metrics;
pub mod model;
pub mod qa;
pub mod search;
pub mod settings;
pub mod similarity;

pub use events::EventStats;
pub use features::{extract_pair_features, FighterStats, PairFeatures, FEATURE_NAMES};
pub use fighters::{FighterRecord, FighterStore, RankBy};
pub use io::{load_fighters, load_fights, FightRecord, FighterRow};
pub use model::{Corner, FightPredictor, ModelError, Prediction, TrainingReport};
pub use qa::{Answer, QuestionAnswering};
pub use search::{highlight_match, FighterSearch, Tier};
pub use settings::AppConfig;
