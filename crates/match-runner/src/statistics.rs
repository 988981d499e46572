//! Aggregate match statistics and final reporting.

use colored::Colorize;

/// Which engine won a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchWinner {
    Engine1,
    Engine2,
    Draw,
}

/// Running totals over a match.
#[derive(Debug, Default)]
pub struct MatchStatistics {
    engine1_wins: u32,
    engine2_wins: u32,
    draws: u32,
    forfeits: u32,
    /// Sum of final disc differentials from engine 1's perspective.
    diff_sum: i64,
    /// Sum of discs on the board at the end of each game.
    disc_sum: u64,
    games: u32,
}

impl MatchStatistics {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records one finished game.
    pub fn record(&mut self, winner: MatchWinner, engine1_diff: i32, discs: u32, forfeit: bool) {
        match winner {
            MatchWinner::Engine1 => self.engine1_wins += 1,
            MatchWinner::Engine2 => self.engine2_wins += 1,
            MatchWinner::Draw => self.draws += 1,
        }
        if forfeit {
            self.forfeits += 1;
        }
        self.diff_sum += engine1_diff as i64;
        self.disc_sum += discs as u64;
        self.games += 1;
    }

    pub fn engine1_wins(&self) -> u32 {
        self.engine1_wins
    }

    pub fn engine2_wins(&self) -> u32 {
        self.engine2_wins
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    /// Prints the final results table.
    pub fn print_final(&self, engine1_name: &str, engine2_name: &str) {
        let games = self.games.max(1);
        let rate1 = 100.0 * self.engine1_wins as f64 / games as f64;
        let rate2 = 100.0 * self.engine2_wins as f64 / games as f64;

        println!();
        println!("{}", "Match results".bold());
        println!(
            "  {:<12} {:>4} wins ({rate1:5.1}%)",
            engine1_name.bright_green(),
            self.engine1_wins
        );
        println!(
            "  {:<12} {:>4} wins ({rate2:5.1}%)",
            engine2_name.bright_yellow(),
            self.engine2_wins
        );
        println!("  {:<12} {:>4}", "draws", self.draws);
        if self.forfeits > 0 {
            println!("  {:<12} {:>4}", "forfeits".red(), self.forfeits);
        }
        println!(
            "  mean disc differential ({}): {:+.2}",
            engine1_name,
            self.diff_sum as f64 / games as f64
        );
        println!(
            "  mean final discs per game: {:.2}",
            self.disc_sum as f64 / games as f64
        );
    }
}
