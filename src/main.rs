// Command line front end: search fighters, rank them, train the fight model and query it.
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use plotters::prelude::*;

use ufc_stats::settings::TrainSettings;
use ufc_stats::{
    load_fights, highlight_match, AppConfig, Corner, EventStats, FightPredictor, FighterSearch, FighterStore,
    QuestionAnswering, RankBy,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "UFC fighter search and fight outcome predictions")]
struct Cli {
    /// Fighters table (csv)
    #[arg(long, global = true)]
    fighters: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Ranking {
    Wins,
    WinRate,
    Fights,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find fighters by name or nickname
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Suggest names close to a query
    Suggest {
        query: String,
        #[arg(short)]
        n: Option<usize>,
    },
    /// Rank fighters
    Top {
        #[arg(long, value_enum, default_value_t = Ranking::Wins)]
        by: Ranking,
        #[arg(short, default_value_t = 20)]
        n: usize,
    },
    /// Train the fight outcome model from the events table
    Train {
        #[arg(long)]
        events: Option<String>,
        /// Also learn from every bout with the corners swapped
        #[arg(long)]
        mirror: bool,
        #[arg(long)]
        out: Option<String>,
    },
    /// Predict a bout between two fighters (full names)
    Predict {
        fighter1: String,
        fighter2: String,
        #[arg(long)]
        weight_class: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Answer a question about fighters or events
    Ask {
        question: String,
        #[arg(long)]
        events: Option<String>,
    },
    /// Totals over the events table
    Events {
        #[arg(long)]
        events: Option<String>,
    },
    /// Print the trained feature weights, optionally as a chart
    Weights {
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        plot: Option<String>,
    },
}

/// Draws a horizontal bar chart of feature weights
/// input: feature names with their weights and the output path
/// output: none (writes a PNG)
fn plot_weights(results: &[(String, f64)], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
    let weights: Vec<f64> = results.iter().map(|(_, w)| *w).collect();
    let count = results.len();

    // X axis covers zero and every weight, with padding
    let min_x = weights.iter().cloned().fold(0.0, f64::min);
    let max_x = weights.iter().cloned().fold(0.0, f64::max);
    let pad = ((max_x - min_x) * 0.1).max(1e-6);
    let x_range = (min_x - pad)..(max_x + pad);

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Fight Model Weights", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(200)
        .build_cartesian_2d(x_range, 0..count)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .y_labels(count)
        .y_label_formatter(&|idx| names.get(*idx).map(|s| s.to_string()).unwrap_or_default())
        .x_desc("Weight")
        .y_desc("Feature")
        .draw()?;

    chart.draw_series(weights.iter().enumerate().map(|(i, &w)| {
        let start = 0.0_f64.min(w);
        let end = 0.0_f64.max(w);
        Rectangle::new([(start, i), (end, i + 1)], BLUE.mix(0.5).filled())
    }))?;

    root.present()?;
    Ok(())
}

fn main() {
    sensible_env_logger::init!();
    run(Cli::parse()).unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::default();
    let fighters_path = cli.fighters.as_deref().unwrap_or(config.data.fighters_csv);
    let store = FighterStore::load(fighters_path)?;

    match cli.command {
        Command::Search { query, limit } => {
            let search = FighterSearch::new(&store);
            let hits = search.search(&query, limit.unwrap_or(config.search.max_results));
            if hits.is_empty() {
                println!("No fighters found for {:?}.", query);
                let suggestions = search.get_suggestions(&query, config.search.suggestions);
                if !suggestions.is_empty() {
                    println!("Did you mean: {}", suggestions.join(", "));
                }
            }
            for f in hits {
                let nickname = if f.nickname.is_empty() { String::new() } else { format!(" \"{}\"", f.nickname) };
                println!(
                    "{}{}  {}-{}-{}  win rate {:.1}%",
                    highlight_match(&f.full_name, query.trim()),
                    nickname,
                    f.wins,
                    f.losses,
                    f.draws,
                    f.win_rate
                );
            }
        }
        Command::Suggest { query, n } => {
            let search = FighterSearch::new(&store);
            for name in search.get_suggestions(&query, n.unwrap_or(config.search.suggestions)) {
                println!("{}", name);
            }
        }
        Command::Top { by, n } => {
            let rank = match by {
                Ranking::Wins => RankBy::Wins,
                Ranking::WinRate => RankBy::WinRate,
                Ranking::Fights => RankBy::TotalFights,
            };
            for (i, f) in store.top_fighters(n, rank, config.data.min_fights_for_win_rate).iter().enumerate() {
                println!(
                    "{:>3}. {:<30} {:>3}-{}-{}  {:>5.1}%  ({} fights)",
                    i + 1,
                    f.full_name,
                    f.wins,
                    f.losses,
                    f.draws,
                    f.win_rate,
                    f.total_fights
                );
            }
        }
        Command::Train { events, mirror, out } => {
            let events_path = events.as_deref().unwrap_or(config.data.events_csv);
            let fights = load_fights(events_path)?;
            let settings = TrainSettings { mirror_pairs: mirror, ..config.train };
            let mut predictor = FightPredictor::new();
            let report = predictor.train(&fights, &store, &settings)?;
            println!(
                "Trained on {} bouts ({} excluded, {} unknown fighter names).",
                report.labeled_rows, report.excluded_rows, report.unmatched_fighters
            );
            println!("Held-out accuracy: {:.3}\n{}", report.accuracy, report.report);
            let out = out.as_deref().unwrap_or(config.data.model_path);
            predictor.save_model(out).with_context(|| format!("saving model to {}", out))?;
            println!("Wrote {}", out);
        }
        Command::Predict { fighter1, fighter2, weight_class, model } => {
            let model_path = model.as_deref().unwrap_or(config.data.model_path);
            let predictor = FightPredictor::from_file(model_path)
                .with_context(|| format!("loading model from {}", model_path))?;
            let Some(f1) = store.get_fighter_by_name(&fighter1) else {
                bail!("no fighter named {:?}", fighter1);
            };
            let Some(f2) = store.get_fighter_by_name(&fighter2) else {
                bail!("no fighter named {:?}", fighter2);
            };
            let weight_class = weight_class.as_deref().unwrap_or(config.data.default_weight_class);
            let p = predictor.predict_fight(&f1.stats(), &f2.stats(), weight_class)?;
            let winner = match p.winner {
                Corner::Fighter1 => &f1.full_name,
                Corner::Fighter2 => &f2.full_name,
            };
            println!("{:<30} {:>5.1}%", f1.full_name, p.fighter1_win_prob);
            println!("{:<30} {:>5.1}%", f2.full_name, p.fighter2_win_prob);
            println!("Predicted winner: {} ({:.1}% confidence)", winner, p.confidence);
        }
        Command::Ask { question, events } => {
            let fights = load_fights(events.as_deref().unwrap_or(config.data.events_csv))?;
            let qa = QuestionAnswering::new(&store, &fights)?;
            println!("{}", qa.answer(&question));
        }
        Command::Events { events } => {
            let fights = load_fights(events.as_deref().unwrap_or(config.data.events_csv))?;
            let stats = EventStats::from_fights(&fights);
            println!("Fighters: {}\nEvents:   {}\nFights:   {}", store.len(), stats.events, stats.fights);
            for (title, counts) in [("Weight classes", &stats.weight_classes), ("Methods", &stats.methods)] {
                println!("\n{}:", title);
                for (name, count) in counts {
                    println!("  {:<28} {:>6}", name, count);
                }
            }
        }
        Command::Weights { model, plot } => {
            let model_path = model.as_deref().unwrap_or(config.data.model_path);
            let predictor = FightPredictor::from_file(model_path)
                .with_context(|| format!("loading model from {}", model_path))?;
            let Some(weights) = predictor.feature_weights() else {
                bail!("{} holds an untrained model", model_path);
            };
            for (name, w) in &weights {
                println!("{:<30} {:>8.4}", name, w);
            }
            if let Some(path) = plot {
                plot_weights(&weights, &path).map_err(|e| anyhow::anyhow!("plotting {}: {}", path, e))?;
                println!("Wrote {}", path);
            }
        }
    }
    Ok(())
}
