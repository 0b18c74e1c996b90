//! Generals Agent - headless match runner
//!
//! Generates a seeded board, pits the agent against a random-walk opponent and
//! logs what the scheduler decided every turn.

use std::path::PathBuf;

use clap::Parser;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use generals_agent::board::{neighbors, points, Board, GridBoard};
use generals_agent::core::error::{AgentError, Result};
use generals_agent::core::types::{PlayerId, Point, TileProperties};
use generals_agent::core::{load_config, AgentConfig};
use generals_agent::debug::{format_sections, render_move, render_priority_map};
use generals_agent::knowledge::GeneralDistance;
use generals_agent::scheduler::Scheduler;

const ME: PlayerId = PlayerId(0);
const OPPONENT: PlayerId = PlayerId(1);
const LAND_INTERVAL: u32 = 25;

/// Run the agent against a random opponent on a generated board
#[derive(Parser, Debug)]
#[command(name = "generals-agent")]
#[command(about = "Run the agent for a number of turns on a seeded board")]
struct Args {
    /// Random seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 18)]
    width: usize,

    #[arg(long, default_value_t = 12)]
    height: usize,

    /// Number of turns to play
    #[arg(long, default_value_t = 100)]
    turns: u32,

    /// Neutral cities to scatter
    #[arg(long, default_value_t = 6)]
    cities: usize,

    /// Share of cells turned into mountains
    #[arg(long, default_value_t = 0.15)]
    mountains: f64,

    /// Agent config file; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print each turn report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Print the chosen move, the general distance map and debug sections
    #[arg(long, default_value_t = false)]
    overlay: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("generals_agent=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AgentConfig::default(),
    };

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut board = generate_board(&args, &mut rng)?;
    let mut scheduler = Scheduler::standard(&config);

    tracing::info!(
        "Starting {}x{} match, seed {}, {} turns",
        args.width,
        args.height,
        args.seed,
        args.turns
    );

    board.mark_all_changed();
    for _ in 0..args.turns {
        board.grow_armies(LAND_INTERVAL);
        let changes = board.take_changes();
        let report = scheduler.run_turn(&mut board, &changes);
        if args.json {
            println!("{}", serde_json::to_string(report)?);
        }
        let chosen_move = report.chosen_move;

        if args.overlay {
            if let Some(chosen) = chosen_move {
                println!("{}", render_move(&board, &chosen));
            }
            if let Some(general) = scheduler.knowledge().get::<GeneralDistance>() {
                println!("{}", render_priority_map(&board, general.map()));
            }
            println!("{}", format_sections(&scheduler.debug_sections()));
        }

        opponent_move(&mut board, &mut rng);
        if board.my_general_location().is_none() {
            tracing::warn!("General lost on turn {}", board.turn());
            break;
        }
    }

    let owned = points(&board)
        .filter_map(|point| board.tile_properties(point))
        .filter(|tile| tile.is_owned_by(ME))
        .count();
    tracing::info!("Finished on turn {} holding {} tiles", board.turn(), owned);
    Ok(())
}

/// Mountains, two generals in opposite corners and scattered neutral cities
fn generate_board(args: &Args, rng: &mut ChaCha8Rng) -> Result<GridBoard> {
    if args.width < 2 || args.height < 2 {
        return Err(AgentError::InvalidBoard(format!(
            "board must be at least 2x2 (got {}x{})",
            args.width, args.height
        )));
    }

    let mut board = GridBoard::new(args.width, args.height, ME);
    let home = Point::new(0, 0);
    let away = Point::new(args.height - 1, args.width - 1);

    let cells: Vec<Point> = points(&board).collect();
    let mut free = Vec::new();
    for point in cells {
        if point == home || point == away {
            continue;
        }
        if rng.gen_bool(args.mountains.clamp(0.0, 1.0)) {
            board.set_tile(point, TileProperties::mountain())?;
        } else {
            free.push(point);
        }
    }

    // Keep both generals reachable from their neighbors
    for general in [home, away] {
        let around: Vec<Point> = neighbors(&board, general).collect();
        for point in around {
            board.set_tile(point, TileProperties::empty())?;
            free.retain(|cell| *cell != point);
        }
    }

    free.shuffle(rng);
    for point in free.into_iter().take(args.cities) {
        let army = rng.gen_range(30..=45);
        board.set_tile(point, TileProperties::city(None, army))?;
    }

    board.set_tile(home, TileProperties::general(ME, 1))?;
    board.set_tile(away, TileProperties::general(OPPONENT, 1))?;
    Ok(board)
}

/// Opponent pushes a random stack of its own into a random neighbor
fn opponent_move(board: &mut GridBoard, rng: &mut ChaCha8Rng) {
    let sources: Vec<Point> = points(&*board)
        .filter(|point| {
            board
                .tile(*point)
                .is_some_and(|tile| tile.is_owned_by(OPPONENT) && tile.army >= 2)
        })
        .collect();
    let Some(&from) = sources.choose(rng) else {
        return;
    };
    let targets: Vec<Point> = neighbors(&*board, from)
        .filter(|point| {
            board
                .tile(*point)
                .is_some_and(|tile| !tile.terrain.is_obstacle())
        })
        .collect();
    if let Some(&to) = targets.choose(rng) {
        board.attack_as(OPPONENT, from, to);
    }
}
