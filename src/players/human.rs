//! Interactive player reading moves from a text stream

use std::io::{BufRead, Write};

use crate::{
    Error, Result,
    ports::Agent,
    tictactoe::GameState,
};

/// Human at a terminal (or any reader/writer pair).
///
/// A move is either a cell index `0-8` or a `row col` pair (`row,col` also
/// works) with rows and columns counted from 0. Unparsable or illegal input
/// is reported and asked for again; end of input fails with
/// [`Error::InputClosed`].
pub struct HumanPlayer<R: BufRead, W: Write> {
    name: String,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> HumanPlayer<R, W> {
    pub fn new(name: impl Into<String>, input: R, output: W) -> Self {
        Self {
            name: name.into(),
            input,
            output,
        }
    }

    fn write_io(&mut self, text: &str) -> Result<()> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|()| self.output.flush())
            .map_err(|source| Error::Io {
                operation: "write prompt".to_string(),
                source,
            })
    }
}

/// Parse `"4"`, `"1 1"` or `"1,1"` into a cell index.
///
/// Only the shape is checked; the index may still be occupied or out of range
/// for single-number input.
pub fn parse_move(input: &str) -> Option<usize> {
    let parts: Vec<&str> = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .collect();
    match parts.as_slice() {
        [index] => index.parse().ok(),
        [row, col] => {
            let row: usize = row.parse().ok()?;
            let col: usize = col.parse().ok()?;
            (row < 3 && col < 3).then_some(row * 3 + col)
        }
        _ => None,
    }
}

impl<R: BufRead, W: Write> Agent for HumanPlayer<R, W> {
    fn choose_move(&mut self, state: &GameState) -> Result<usize> {
        let legal = state.legal_moves();
        if legal.is_empty() {
            return Err(Error::NoValidMoves);
        }

        self.write_io(&format!("\n{}\n", state.board()))?;
        loop {
            self.write_io(&format!(
                "{} to move, valid cells {:?}. Enter your move (index or row col): ",
                state.to_move(),
                legal
            ))?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|source| Error::Io {
                    operation: "read move".to_string(),
                    source,
                })?;
            if read == 0 {
                return Err(Error::InputClosed);
            }

            match parse_move(&line) {
                Some(position) if legal.contains(&position) => return Ok(position),
                Some(position) => {
                    self.write_io(&format!("Cell {position} is not available. Try again.\n"))?;
                }
                None => self.write_io("Invalid move. Try again.\n")?,
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
