mod error;
mod external;
mod statistics;

use std::process;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use othello_core::disc::{Disc, GameOutcome};
use othello_core::game::{GameEnd, play_game};
use othello_core::mcts::MctsPlayer;
use othello_core::players::{Player, RandomPlayer, WithSolver};
use othello_core::puct::{PuctConfig, PuctPlayer, UniformEvaluator};

use crate::error::{MatchError, Result};
use crate::external::ExternalPlayer;
use crate::statistics::{MatchStatistics, MatchWinner};

/// Runs a head-to-head match between two engines, swapping colors each
/// game, and prints aggregate statistics.
#[derive(Parser, Debug)]
struct Cli {
    /// First engine (plays Black in odd-numbered games).
    #[arg(long, value_enum, default_value = "mcts")]
    engine1: EngineKind,

    /// Second engine.
    #[arg(long, value_enum, default_value = "random")]
    engine2: EngineKind,

    /// Command line for engine 1 when it is external.
    #[arg(long)]
    engine1_cmd: Option<String>,

    /// Command line for engine 2 when it is external.
    #[arg(long)]
    engine2_cmd: Option<String>,

    /// Number of games to play.
    #[arg(short, long, default_value = "100")]
    games: u32,

    /// Per-side time budget per game, in milliseconds.
    #[arg(long)]
    time_ms: Option<u64>,

    /// Empty-square threshold for the endgame solver hand-off (0 disables).
    #[arg(long, default_value = "0")]
    solver_depth: u32,

    /// Milliseconds reserved for endgame solving.
    #[arg(long, default_value = "2000")]
    solver_reserve_ms: u64,

    /// PUCT simulations per turn when playing without a clock.
    #[arg(long, default_value = "400")]
    sims_per_turn: u32,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EngineKind {
    Random,
    Mcts,
    Puct,
    External,
}

impl EngineKind {
    fn name(self) -> &'static str {
        match self {
            EngineKind::Random => "random",
            EngineKind::Mcts => "mcts",
            EngineKind::Puct => "puct",
            EngineKind::External => "external",
        }
    }
}

/// Builds a fresh player for one game. Search players carry state between
/// turns, so each game gets new instances.
fn build_player(
    kind: EngineKind,
    cmd: Option<&str>,
    color: Disc,
    cli: &Cli,
) -> Result<Box<dyn Player>> {
    let base: Box<dyn Player> = match kind {
        EngineKind::Random => Box::new(RandomPlayer::new(color)),
        EngineKind::Mcts => Box::new(MctsPlayer::new(color)),
        EngineKind::Puct => {
            let config = PuctConfig {
                sims_per_turn: cli.sims_per_turn,
                ..Default::default()
            };
            Box::new(PuctPlayer::with_config(color, UniformEvaluator, config))
        }
        EngineKind::External => {
            let cmd = cmd.ok_or_else(|| {
                MatchError::Config("an external engine needs a command line".to_string())
            })?;
            return Ok(Box::new(ExternalPlayer::spawn(cmd, color)?));
        }
    };

    if cli.solver_depth > 0 {
        Ok(Box::new(WithSolver::new(
            base,
            cli.solver_depth,
            cli.solver_reserve_ms,
        )))
    } else {
        Ok(base)
    }
}

fn run(cli: &Cli) -> Result<MatchStatistics> {
    let mut statistics = MatchStatistics::new();

    let bar = ProgressBar::new(cli.games as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan}] {pos}/{len} ({percent}%)")
            .expect("progress template is valid")
            .progress_chars("█▉▊▋▌▍▎▏ "),
    );

    for game in 0..cli.games {
        let engine1_is_black = game % 2 == 0;
        let (black_kind, black_cmd, white_kind, white_cmd) = if engine1_is_black {
            (cli.engine1, cli.engine1_cmd.as_deref(), cli.engine2, cli.engine2_cmd.as_deref())
        } else {
            (cli.engine2, cli.engine2_cmd.as_deref(), cli.engine1, cli.engine1_cmd.as_deref())
        };

        let mut black = build_player(black_kind, black_cmd, Disc::Black, cli)?;
        let mut white = build_player(white_kind, white_cmd, Disc::White, cli)?;

        let report = play_game(&mut black, &mut white, cli.time_ms);

        let winner = match report.outcome {
            GameOutcome::Draw => MatchWinner::Draw,
            GameOutcome::BlackWins if engine1_is_black => MatchWinner::Engine1,
            GameOutcome::WhiteWins if !engine1_is_black => MatchWinner::Engine1,
            _ => MatchWinner::Engine2,
        };

        let diff = report.board.black.count() as i32 - report.board.white.count() as i32;
        let engine1_diff = if engine1_is_black { diff } else { -diff };
        let forfeit = !matches!(report.end, GameEnd::DoublePass);
        let discs = report.board.black.count() + report.board.white.count();

        statistics.record(winner, engine1_diff, discs, forfeit);
        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(statistics)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(statistics) => {
            statistics.print_final(cli.engine1.name(), cli.engine2.name());
        }
        Err(err) => {
            eprintln!("Match failed: {err}");
            process::exit(1);
        }
    }
}
