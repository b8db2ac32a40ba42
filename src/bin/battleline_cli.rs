use battleline::ai::generate_combat_plan;
use battleline::config::SearchConfig;
use battleline::events::WorldEvent;
use battleline::model::{SessionStatus, TurnTransition};
use battleline::scenario::Scenario;
use battleline::scorecard;
use battleline::{reduce, rng};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "battleline_cli")]
#[command(about = "CLI tools for the battleline combat engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario's command script and print the event log
    Replay {
        /// Path to the scenario JSON file
        scenario: PathBuf,
        /// Output format: 'markdown' or 'json'
        #[arg(short, long, default_value = "markdown")]
        format: String,
        /// RNG seed for reproducible dice
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Parse a scenario file and report what it contains
    Validate {
        /// Path to the scenario JSON file
        scenario: PathBuf,
    },
    /// Run an AI-vs-AI exhibition bout until a side wins
    Bout {
        /// Path to the scenario JSON file
        scenario: PathBuf,
        /// RNG seed for reproducible dice
        #[arg(short, long)]
        seed: Option<u64>,
        /// Stop after this many rounds even without a winner
        #[arg(short, long, default_value_t = 20)]
        rounds: u32,
        /// Output format: 'markdown' or 'json'
        #[arg(short, long, default_value = "markdown")]
        format: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Replay { scenario, format, seed } => {
            let seed = apply_seed(seed);
            let scenario = load_scenario(&scenario)?;
            let (mut ctx, _session_id) = scenario.build()?;
            for cmd in &scenario.script {
                reduce(&mut ctx, cmd);
            }
            let events = ctx.events.drain();
            print_events(&events, &format, seed);
            print_errors(&ctx.events.drain_errors());
        }
        Commands::Validate { scenario } => {
            let scenario = load_scenario(&scenario)?;
            let (ctx, session_id) = scenario.build()?;
            let session = ctx.world.session(&session_id)?;
            println!(
                "ok: {} combatant(s) on a {} m battlefield at {}",
                session.combatants.len(),
                session.battlefield.length_m,
                session.location
            );
            println!("scripted commands: {}", scenario.script.len());
            println!("registered weapons: {}", scenario.weapons.len());
        }
        Commands::Bout { scenario, seed, rounds, format } => {
            let seed = apply_seed(seed);
            let scenario = load_scenario(&scenario)?;
            let (mut ctx, session_id) = scenario.build()?;
            let search = SearchConfig::default();

            'bout: loop {
                let session = ctx.world.session(&session_id)?;
                if session.status != SessionStatus::Running || session.clock.round > rounds {
                    break;
                }
                let Some(active) = session.clock.actor.clone() else {
                    break;
                };
                let trace = format!("bout:r{}:{}", session.clock.round, active);
                let plan = generate_combat_plan(&mut ctx, &session_id, &active, &search, &trace)?;
                for cmd in &plan {
                    reduce(&mut ctx, cmd);
                    // a plan can end the fight mid-sequence
                    if ctx.world.session(&session_id)?.status != SessionStatus::Running {
                        break 'bout;
                    }
                }
                match ctx.advance_turn(&session_id, &trace) {
                    Ok(TurnTransition::Continue { .. }) => {}
                    Ok(TurnTransition::Decided { winner }) => {
                        println!("winner: team {}", winner);
                        break;
                    }
                    Err(e) => {
                        eprintln!("bout ended: {}", e);
                        break;
                    }
                }
            }

            let events = ctx.events.drain();
            print_events(&events, &format, seed);
            print_scorecards(&events);
        }
    }
    Ok(())
}

fn apply_seed(seed: Option<u64>) -> u64 {
    let seed = seed.unwrap_or_else(|| uuid::Uuid::new_v4().as_u128() as u64);
    rng::seed_rng(seed);
    seed
}

fn load_scenario(path: &PathBuf) -> Result<Scenario, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    Ok(Scenario::from_json(&raw)?)
}

fn print_events(events: &[WorldEvent], format: &str, seed: u64) {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(events).unwrap_or_default());
        return;
    }
    println!("# Combat log (seed {})\n", seed);
    for event in events {
        println!("- `{}` **{}** {}", event.trace, event.kind(), event.actor);
    }
    println!();
}

fn print_errors(errors: &[battleline::events::ErrorRecord]) {
    for err in errors {
        eprintln!("error [{}] {}: {}", err.trace, err.code, err.message);
    }
}

fn print_scorecards(events: &[WorldEvent]) {
    let cards = scorecard::tally(events);
    let mut ids: Vec<_> = cards.keys().collect();
    ids.sort_by_key(|id| id.to_string());
    println!("## Scorecards\n");
    for id in ids {
        let c = &cards[id];
        println!(
            "- {}: {} dmg dealt, {} taken, {} kills, {:.0} m moved, {:.1} AP spent",
            id, c.damage_dealt, c.damage_taken, c.kills, c.distance_moved, c.ap_spent
        );
    }
}
