mod human;
mod protocol;

use std::process;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use othello_core::disc::Disc;
use othello_core::mcts::MctsPlayer;
use othello_core::players::{Player, RandomPlayer, WithSolver};
use othello_core::puct::{PuctConfig, PuctPlayer, UniformEvaluator};

/// Tournament player process.
///
/// Speaks the line protocol on stdin/stdout: one `opp_x opp_y ms_left`
/// request per turn, one `x y` reply. All diagnostics go to stderr.
#[derive(Parser, Debug)]
struct Cli {
    /// Color to play, as passed by the tournament harness ("Black" or "White").
    color: String,

    /// Move selection engine.
    #[arg(long, value_enum, default_value = "mcts")]
    player: PlayerKind,

    /// Empty-square count at which the exact endgame solver takes over.
    #[arg(long)]
    solver_depth: Option<u32>,

    /// Milliseconds withheld from the base player for endgame solving.
    #[arg(long, default_value = "2000")]
    solver_reserve_ms: u64,

    /// Exploration constant for the tree searches.
    #[arg(long, default_value = "4.0")]
    explore_coeff: f64,

    /// PUCT simulations per turn when playing without a clock.
    #[arg(long, default_value = "400")]
    sims_per_turn: u32,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PlayerKind {
    Random,
    Mcts,
    Puct,
    Human,
}

fn build_player(cli: &Cli, color: Disc) -> (Box<dyn Player>, &'static str) {
    match cli.player {
        PlayerKind::Random => (Box::new(RandomPlayer::new(color)), "RandomPlayer"),
        PlayerKind::Mcts => (
            Box::new(MctsPlayer::with_options(color, cli.explore_coeff, 0)),
            "MctsPlayer",
        ),
        PlayerKind::Puct => {
            let config = PuctConfig {
                explore_coeff: cli.explore_coeff as f32,
                sims_per_turn: cli.sims_per_turn,
                ..Default::default()
            };
            (
                Box::new(PuctPlayer::with_config(color, UniformEvaluator, config)),
                "PuctPlayer",
            )
        }
        PlayerKind::Human => match human::HumanPlayer::new(color) {
            Ok(player) => (Box::new(player), "HumanPlayer"),
            Err(err) => {
                eprintln!("Failed to initialize input editor: {err}");
                process::exit(1);
            }
        },
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let color = match cli.color.to_ascii_lowercase().as_str() {
        "black" => Disc::Black,
        "white" => Disc::White,
        other => {
            eprintln!("Unknown color: {other} (expected Black or White)");
            process::exit(2);
        }
    };

    let (player, name) = build_player(&cli, color);
    let player = match cli.solver_depth {
        Some(depth) => {
            Box::new(WithSolver::new(player, depth, cli.solver_reserve_ms)) as Box<dyn Player>
        }
        None => player,
    };

    if let Err(err) = protocol::run_player(player, color, name) {
        error!("protocol failure: {err}");
        process::exit(1);
    }
}
