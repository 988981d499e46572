//! Interactive human player.
//!
//! Renders the position to stderr with legal-move markers and reads
//! algebraic squares (e.g. `d3`) through rustyline, retrying on invalid
//! or illegal input.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use othello_core::board::Board;
use othello_core::disc::Disc;
use othello_core::players::Player;
use othello_core::square::Square;
use othello_core::types::TimeBudget;

pub struct HumanPlayer {
    color: Disc,
    editor: DefaultEditor,
}

impl HumanPlayer {
    pub fn new(color: Disc) -> rustyline::Result<Self> {
        Ok(HumanPlayer {
            color,
            editor: DefaultEditor::new()?,
        })
    }

    fn render(&self, board: &Board) {
        let legal = board.find_moves(self.color);
        eprintln!("    a   b   c   d   e   f   g   h");

        for rank in 0..8 {
            let mut row = format!("{} ", rank + 1);
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                let cell = match board.get_disc_at(sq) {
                    Disc::Black => " X ".bright_green(),
                    Disc::White => " O ".bright_yellow(),
                    Disc::Empty if legal.contains(sq) => " · ".bright_cyan(),
                    Disc::Empty => " . ".black(),
                };
                row.push_str(&format!("{cell} "));
            }
            eprintln!("{row}");
        }

        let turn = match self.color {
            Disc::Black => "Black (X)".bright_green(),
            _ => "White (O)".bright_yellow(),
        };
        eprintln!("To move: {turn}");
    }
}

impl Player for HumanPlayer {
    fn color(&self) -> Disc {
        self.color
    }

    fn get_move(
        &mut self,
        board: &Board,
        _opponent_move: Option<Square>,
        _ms_left: TimeBudget,
    ) -> Option<Square> {
        self.render(board);

        let legal = board.find_moves(self.color);
        if legal.is_empty() {
            eprintln!("No legal moves: passing.");
            return None;
        }

        loop {
            let line = match self.editor.readline("Enter a move: ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return None,
                Err(err) => {
                    eprintln!("Input error: {err}");
                    return None;
                }
            };

            match line.trim().parse::<Square>() {
                Ok(sq) if legal.contains(sq) => return Some(sq),
                Ok(sq) => eprintln!("{}", format!("Illegal move: {sq}. Please try again.").red()),
                Err(err) => eprintln!("Invalid input ({err}). Please try again."),
            }
        }
    }
}
