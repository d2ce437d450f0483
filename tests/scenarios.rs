use std::fs;
use std::path::Path;

use tempfile::{tempdir, TempDir};

use ufc_stats::settings::TrainSettings;
use ufc_stats::{load_fights, Answer, FightPredictor, FighterSearch, FighterStore, QuestionAnswering, Tier};

const FIGHTERS_HEADER: &str = "First Name,Last Name,Nickname,Height,Weight,Reach,Stance,Wins,Losses,Draws\n";
const EVENTS_HEADER: &str =
    "Event Name,Event Date,Result,Fighter1,Fighter2,KD,Strikes,TD,Sub,Weight Class,Method,Round,Time\n";

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture should be writable");
    path
}

fn two_fighter_store(dir: &TempDir) -> FighterStore {
    let mut csv = String::from(FIGHTERS_HEADER);
    csv.push_str("Conor,McGregor,Notorious,\"5' 9\"\"\",155 lbs.,74.0\",Southpaw,22,6,0\n");
    csv.push_str("Jon,Jones,Bones,\"6' 4\"\"\",205 lbs.,84.5\",Orthodox,26,1,0\n");
    FighterStore::load(write(dir, "fighters.csv", &csv)).expect("fighters should load")
}

#[test]
fn typo_falls_through_to_fuzzy() {
    let dir = tempdir().unwrap();
    let store = two_fighter_store(&dir);
    let search = FighterSearch::new(&store);

    let (tier, hits) = search.search_tiered("Mcgreggor", 10);
    assert_eq!(tier, Some(Tier::Fuzzy));
    assert_eq!(hits[0].full_name, "Conor McGregor");
}

#[test]
fn nickname_is_an_exact_hit() {
    let dir = tempdir().unwrap();
    let store = two_fighter_store(&dir);
    let search = FighterSearch::new(&store);

    let (tier, hits) = search.search_tiered("Notorious", 10);
    assert_eq!(tier, Some(Tier::Exact));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].last_name, "McGregor");
    assert_eq!(hits[0].win_rate, 78.6);
}

#[test]
fn nonsense_exhausts_every_tier() {
    let dir = tempdir().unwrap();
    let store = two_fighter_store(&dir);
    let search = FighterSearch::new(&store);

    assert_eq!(search.search_tiered("xyzxyz", 10), (None, vec![]));
    assert!(search.get_suggestions("xyzxyz", 5).is_empty());
    assert!(search.search("   ", 10).is_empty());
}

/// 20 fighters, 100 bouts between them; every fifth bout is a draw or has no known winner.
fn training_fixture(dir: &TempDir) -> (FighterStore, std::path::PathBuf) {
    let mut fighters = String::from(FIGHTERS_HEADER);
    for i in 0..20 {
        let stance = if i % 3 == 0 { "Southpaw" } else { "Orthodox" };
        fighters.push_str(&format!(
            "Fighter{i},Number{i},,\"5' {}\"\"\",{} lbs.,{}.0\",{stance},{},{},0\n",
            6 + i % 6,
            135 + 5 * (i % 8),
            66 + i % 10,
            i,
            20 - i
        ));
    }
    let store = FighterStore::load(write(dir, "fighters.csv", &fighters)).unwrap();

    let mut events = String::from(EVENTS_HEADER);
    for k in 0..100 {
        let a = k % 20;
        let b = (k * 7 + 3) % 20;
        let b = if a == b { (b + 1) % 20 } else { b };
        let (f1, f2) = (format!("Fighter{a} Number{a}"), format!("Fighter{b} Number{b}"));
        let result = match k % 5 {
            0 if k % 10 == 0 => "Draw".to_string(),
            0 => "Unknown".to_string(),
            _ if a > b => f1.clone(),
            _ => f2.clone(),
        };
        events.push_str(&format!(
            "UFC {k},\"January 1, 2020\",{result},{f1},{f2},0-0,10-8,0-0,0-0,Lightweight,U-DEC,3,5:00\n"
        ));
    }
    (store, write(dir, "events.csv", &events))
}

#[test]
fn draws_and_unknowns_never_reach_training() {
    let dir = tempdir().unwrap();
    let (store, events) = training_fixture(&dir);
    let fights = load_fights(&events).unwrap();
    assert_eq!(fights.len(), 100);

    let mut predictor = FightPredictor::new();
    let report = predictor.train(&fights, &store, &TrainSettings::default()).unwrap();
    assert_eq!(report.labeled_rows, 80);
    assert_eq!(report.excluded_rows, 20);
    assert_eq!(report.unmatched_fighters, 0);
    assert_eq!(report.train_rows, 64);
    assert_eq!(report.test_rows, 16);
    assert!(predictor.is_trained());
}

#[test]
fn persisted_model_answers_the_same() {
    let dir = tempdir().unwrap();
    let (store, events) = training_fixture(&dir);
    let fights = load_fights(&events).unwrap();

    let mut predictor = FightPredictor::new();
    predictor.train(&fights, &store, &TrainSettings::default()).unwrap();
    let model_path = dir.path().join("model.json");
    predictor.save_model(&model_path).unwrap();
    assert!(Path::new(&model_path).exists());
    assert!(!dir.path().join("model.tmp").exists());

    let reloaded = FightPredictor::from_file(&model_path).unwrap();
    let strong = store.get_fighter_by_name("Fighter19 Number19").unwrap().stats();
    let weak = store.get_fighter_by_name("Fighter2 Number2").unwrap().stats();
    for weight_class in ["Lightweight", "Heavyweight"] {
        assert_eq!(
            predictor.predict_fight(&strong, &weak, weight_class).unwrap(),
            reloaded.predict_fight(&strong, &weak, weight_class).unwrap()
        );
    }
}

#[test]
fn questions_are_answered_from_both_tables() {
    let dir = tempdir().unwrap();
    let store = two_fighter_store(&dir);
    let mut csv = String::from(EVENTS_HEADER);
    csv.push_str("UFC 196,\"March 05, 2016\",Nate Diaz,Nate Diaz,Conor McGregor,0,0,0,1,Welterweight,SUB,2,4:12\n");
    csv.push_str("UFC 202,\"August 20, 2016\",Conor McGregor,Conor McGregor,Nate Diaz,0,0,0,0,Welterweight,Decision,5,5:00\n");
    csv.push_str("UFC 214,\"July 29, 2017\",Jon Jones,Jon Jones,Daniel Cormier,0,0,0,0,Light Heavyweight,KO/TKO,3,3:01\n");
    let fights = load_fights(write(&dir, "events.csv", &csv)).unwrap();
    let qa = QuestionAnswering::new(&store, &fights).unwrap();

    assert_eq!(qa.answer("How many events have been held?"), Answer::EventCount(3));
    let answer = qa.answer("What is Jon Jones's record?");
    assert!(matches!(answer, Answer::Record(f) if f.nickname == "Bones"));
    assert!(matches!(qa.answer("Is it raining?"), Answer::OutOfScope { .. }));
}
