//! # 2048 CLI
//!
//! Terminal shell for the rule engine: interactive play with a saved game
//! file, or headless simulations with configurable policies.

mod store;
mod terminal;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;
use merge_2048_core::{
    Command, Direction, GameConfig, GameController, GameStore, MemoryStore, NullRender,
};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::store::JsonFileStore;
use crate::terminal::{InputAction, TerminalRender};

#[derive(Parser, Debug)]
#[command(name = "merge-2048")]
#[command(author, version, about = "Play 2048 in the terminal or run simulations")]
struct Args {
    /// Number of episodes to run in headless mode (interactive if omitted)
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Grid edge length
    #[arg(long)]
    size: Option<usize>,

    /// Tile value that wins the game
    #[arg(long)]
    win_value: Option<u32>,

    /// JSON file with a game config; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where interactive games are saved and resumed from
    #[arg(long, value_name = "FILE", default_value = "merge-2048-save.json")]
    state_file: PathBuf,

    /// Ignore any saved game and start fresh
    #[arg(long)]
    fresh: bool,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "random")]
    policy: Policy,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random valid moves
    Random,
    /// Cycle through directions: Left, Down, Right, Up
    Cycle,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.episodes.is_some() { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = load_config(&args)?;
    match args.episodes {
        Some(episodes) => run_headless(&args, config, episodes),
        None => run_interactive(&args, config),
    }
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(win_value) = args.win_value {
        config.win_value = win_value;
    }
    config.validate()?;
    Ok(config)
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// Run interactive mode where user plays with keyboard.
fn run_interactive(args: &Args, mut config: GameConfig) -> Result<()> {
    let mut store = JsonFileStore::new(&args.state_file);
    if args.fresh {
        store.clear_game_state();
    }
    // A resumed game keeps its own size, restarts included.
    if let Some(saved) = store.get_game_state() {
        config.size = saved.grid.size;
    }
    if config.validate().is_err() {
        config.size = GameConfig::default().size;
    }

    let mut game = GameController::new(
        config,
        make_rng(args.seed),
        Box::new(store),
        Box::new(TerminalRender::new(config.size, true)),
    )?;
    print_status(&game);

    // Set terminal to raw mode for single-key input
    terminal::enable_raw_mode();
    let result = interactive_loop(&mut game, &mut io::stdin());
    terminal::disable_raw_mode();
    result?;

    println!("\nGoodbye!");
    Ok(())
}

/// Feed keys from `input` to the game until quit or end of input.
fn interactive_loop(game: &mut GameController<SmallRng>, input: &mut impl Read) -> Result<()> {
    let mut buffer = [0u8; 3];

    loop {
        let bytes_read = input.read(&mut buffer).context("reading keyboard input")?;
        if bytes_read == 0 {
            return Ok(());
        }

        match terminal::parse_input(&buffer[..bytes_read]) {
            InputAction::Command(Command::Move(direction)) => {
                if game.is_terminated() {
                    continue;
                }
                let report = game.handle_move(direction)?;
                // Text output is drawn in one go, nothing to wait for.
                game.settle();
                print_status(game);
                if report.score_delta > 0 {
                    println!("  +{} points!", report.score_delta);
                }
            }
            InputAction::Command(command) => {
                game.dispatch(command)?;
                print_status(game);
            }
            InputAction::Quit => return Ok(()),
            InputAction::None => {}
        }
    }
}

fn print_status(game: &GameController<SmallRng>) {
    println!("Score: {}  Best: {}", game.score(), game.best_score());
    if game.is_over() {
        println!("\n  *** GAME OVER ***");
        println!("  Final Score: {}", game.score());
        println!("  Max Tile: {}", game.grid().max_value());
        println!("\n  Press R to restart or Q to quit");
    } else if game.is_won() && !game.keeps_playing() {
        println!("\n  *** YOU WIN! ***");
        println!("  Press K to keep playing, R to restart or Q to quit");
    }
}

/// Per-episode results from a headless run.
struct EpisodeResult {
    score: u32,
    max_tile: u32,
    steps: u32,
    won: bool,
}

/// Run headless simulation mode.
fn run_headless(args: &Args, config: GameConfig, episodes: u32) -> Result<()> {
    let base_seed = args.seed.unwrap_or_else(|| SmallRng::from_entropy().next_u64());
    // Use a separate RNG for action selection
    let mut action_rng = SmallRng::seed_from_u64(base_seed.wrapping_add(1000));
    let mut results = Vec::with_capacity(episodes as usize);

    for episode in 0..episodes {
        let episode_seed = base_seed.wrapping_add(episode as u64);
        let result = run_episode(args, config, episode_seed, &mut action_rng)?;
        if args.verbose {
            info!(
                "Episode {}: Score={}, MaxTile={}, Steps={}",
                episode + 1,
                result.score,
                result.max_tile,
                result.steps
            );
        }
        results.push(result);
    }

    print_summary(args, base_seed, &results);
    Ok(())
}

fn run_episode(
    args: &Args,
    config: GameConfig,
    seed: u64,
    action_rng: &mut SmallRng,
) -> Result<EpisodeResult> {
    let render: Box<dyn merge_2048_core::RenderHook> = if args.verbose {
        Box::new(TerminalRender::new(config.size, false))
    } else {
        Box::new(NullRender)
    };
    let mut game = GameController::new(
        config,
        SmallRng::seed_from_u64(seed),
        Box::new(MemoryStore::new()),
        render,
    )?;
    let mut steps = 0;
    let mut action_cycle = 0;

    while !game.is_over() && (args.max_steps == 0 || steps < args.max_steps) {
        let legal = game.legal_directions();
        let direction = match args.policy {
            Policy::Random => legal.choose(&mut *action_rng).copied(),
            Policy::Cycle => select_cycle_direction(&legal, &mut action_cycle),
        };
        let Some(direction) = direction else {
            break; // No valid moves
        };

        let report = game.handle_move(direction)?;
        game.settle();
        steps += 1;
        if report.just_won {
            game.keep_playing();
        }
    }

    Ok(EpisodeResult {
        score: game.score(),
        max_tile: game.grid().max_value(),
        steps,
        won: game.is_won(),
    })
}

/// Select direction in a cycle: Left, Down, Right, Up.
fn select_cycle_direction(legal: &[Direction], cycle: &mut usize) -> Option<Direction> {
    let order = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];
    // Try directions in cycle order, starting from current position
    for _ in 0..order.len() {
        let direction = order[*cycle % order.len()];
        *cycle += 1;
        if legal.contains(&direction) {
            return Some(direction);
        }
    }
    None
}

fn print_summary(args: &Args, seed: u64, results: &[EpisodeResult]) {
    if results.is_empty() {
        println!("=== Simulation Results ===");
        println!("episodes=0");
        return;
    }

    let mut scores: Vec<u32> = results.iter().map(|r| r.score).collect();
    scores.sort_unstable();
    let episodes = scores.len();
    let total: u64 = scores.iter().map(|&s| s as u64).sum();
    let avg_score = total as f64 / episodes as f64;
    let median_score = if episodes % 2 == 0 {
        (scores[episodes / 2 - 1] + scores[episodes / 2]) as f64 / 2.0
    } else {
        scores[episodes / 2] as f64
    };
    let max_tile_overall = results.iter().map(|r| r.max_tile).max().unwrap_or(0);
    let wins = results.iter().filter(|r| r.won).count();

    let mut tile_counts: BTreeMap<u32, u32> = BTreeMap::new();
    for result in results {
        *tile_counts.entry(result.max_tile).or_insert(0) += 1;
    }

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={}", episodes);
    println!("policy={:?}", args.policy);
    println!("seed={}", seed);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", scores[0]);
    println!("max_score={}", scores[episodes - 1]);
    println!("max_tile_overall={}", max_tile_overall);
    println!("wins={}", wins);
    let distribution: Vec<String> = tile_counts
        .iter()
        .map(|(tile, count)| format!("{}:{}", tile, count))
        .collect();
    println!("tile_distribution={}", distribution.join(","));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_skips_illegal() {
        let mut cycle = 0;
        let legal = [Direction::Right, Direction::Up];
        assert_eq!(
            select_cycle_direction(&legal, &mut cycle),
            Some(Direction::Right)
        );
        assert_eq!(
            select_cycle_direction(&legal, &mut cycle),
            Some(Direction::Up)
        );
        assert_eq!(select_cycle_direction(&[], &mut cycle), None);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["merge-2048", "-e", "3", "--size", "5", "-p", "cycle"]);
        assert_eq!(args.episodes, Some(3));
        let config = load_config(&args).unwrap();
        assert_eq!(config.size, 5);
        assert_eq!(config.win_value, 2048);
    }

    #[test]
    fn test_headless_episode_is_deterministic() {
        let args = Args::parse_from(["merge-2048", "-e", "1", "-m", "200"]);
        let config = GameConfig::default();
        let run = || {
            let mut action_rng = SmallRng::seed_from_u64(1);
            run_episode(&args, config, 7, &mut action_rng).unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.score, b.score);
        assert_eq!(a.steps, b.steps);
        assert!(a.steps <= 200);
    }

    #[test]
    fn test_interactive_loop_stops_at_end_of_input() {
        let mut game = GameController::new(
            GameConfig::default(),
            SmallRng::seed_from_u64(3),
            Box::new(MemoryStore::new()),
            Box::new(NullRender),
        )
        .unwrap();
        let before = game.state();
        let mut input: &[u8] = b"";
        interactive_loop(&mut game, &mut input).unwrap();
        assert_eq!(game.state(), before);

        // One key per read. Left then right changes any board with gaps.
        let mut input = (&b"a"[..]).chain(&b"d"[..]);
        interactive_loop(&mut game, &mut input).unwrap();
        assert!(game.grid().tiles().count() > 2);
    }
}
