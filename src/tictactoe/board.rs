//! Board state representation and basic operations

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{lines::LineAnalyzer, symmetry::D4Transform};

/// Number of cells on the board
pub const BOARD_CELLS: usize = 9;

/// Number of distinct cell assignments (3^9), the bound of [`BoardState::to_index`]
pub const BOARD_INDEX_LIMIT: u32 = 19_683;

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | '-' | ' ' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }

    /// Base-3 digit used by the integer board encoding
    fn digit(self) -> u32 {
        match self {
            Cell::Empty => 0,
            Cell::X => 1,
            Cell::O => 2,
        }
    }

    fn from_digit(d: u32) -> Cell {
        match d {
            1 => Cell::X,
            2 => Cell::O,
            _ => Cell::Empty,
        }
    }

    pub fn to_player(self) -> Option<Player> {
        match self {
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
            Cell::Empty => None,
        }
    }
}

/// A player in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Cells plus whose turn it is.
///
/// X always opens, so `to_move` is fully determined by the piece counts; it is
/// stored anyway so that labels and fingerprints are self-describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [Cell; BOARD_CELLS],
    pub to_move: Player,
}

/// Count of each piece type on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PieceCount {
    x: usize,
    o: usize,
    empty: usize,
}

/// Cached result of canonicalization.
///
/// Holds the canonical state together with the transform that produced it so
/// that moves can be mapped in and out of canonical coordinates without
/// repeating the D4 search.
#[derive(Debug, Clone)]
pub struct CanonicalContext {
    /// The canonical board state
    pub state: BoardState,
    /// The transform that maps the original state to the canonical state
    pub transform: D4Transform,
    /// The string encoding of the canonical state
    pub encoding: String,
}

impl CanonicalContext {
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Map a move from original coordinates to canonical coordinates
    pub fn map_move_to_canonical(&self, original_move: usize) -> usize {
        self.transform.transform_position(original_move)
    }

    /// Map a move from canonical coordinates back to original coordinates
    pub fn map_canonical_to_original(&self, canonical_move: usize) -> usize {
        self.transform.inverse().transform_position(canonical_move)
    }
}

impl BoardState {
    /// Create a new empty board with X to move
    pub fn new() -> Self {
        BoardState {
            cells: [Cell::Empty; BOARD_CELLS],
            to_move: Player::X,
        }
    }

    /// Build a board from raw cells, inferring the player to move.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPieceCounts`] unless X has the same number
    /// of pieces as O or exactly one more, and
    /// [`crate::Error::InvalidConfiguration`] when the position cannot arise in
    /// play: both players own a line, or the owner of a line did not move last.
    pub fn from_cells(cells: [Cell; BOARD_CELLS]) -> Result<Self, crate::Error> {
        let count = Self::count_pieces(&cells);
        let to_move = Self::determine_turn_from_counts(&count)?;
        let board = BoardState { cells, to_move };

        let unreachable = |reason: &str| crate::Error::InvalidConfiguration {
            message: format!("board '{}' is unreachable: {reason}", board.encode()),
        };
        match (board.has_won(Player::X), board.has_won(Player::O)) {
            (true, true) => Err(unreachable("both players have winning lines")),
            (true, false) if to_move != Player::O => {
                Err(unreachable("X has a line but O moved last"))
            }
            (false, true) if to_move != Player::X => {
                Err(unreachable("O has a line but X moved last"))
            }
            _ => Ok(board),
        }
    }

    fn parse_cells(chars: &[char], context: &str) -> Result<[Cell; BOARD_CELLS], crate::Error> {
        if chars.len() != BOARD_CELLS {
            return Err(crate::Error::InvalidBoardLength {
                expected: BOARD_CELLS,
                got: chars.len(),
                context: context.to_string(),
            });
        }

        let mut cells = [Cell::Empty; BOARD_CELLS];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| crate::Error::InvalidCellCharacter {
                character: c,
                position: i,
                context: context.to_string(),
            })?;
        }

        Ok(cells)
    }

    fn count_pieces(cells: &[Cell; BOARD_CELLS]) -> PieceCount {
        let mut count = PieceCount {
            x: 0,
            o: 0,
            empty: 0,
        };
        for cell in cells {
            match cell {
                Cell::X => count.x += 1,
                Cell::O => count.o += 1,
                Cell::Empty => count.empty += 1,
            }
        }
        count
    }

    fn parse_player(player_str: &str, context: &str) -> Result<Player, crate::Error> {
        match player_str {
            "X" => Ok(Player::X),
            "O" => Ok(Player::O),
            _ => Err(crate::Error::InvalidPlayerString {
                player: player_str.to_string(),
                label: context.to_string(),
            }),
        }
    }

    fn determine_turn_from_counts(count: &PieceCount) -> Result<Player, crate::Error> {
        if count.x == count.o {
            Ok(Player::X)
        } else if count.x == count.o + 1 {
            Ok(Player::O)
        } else {
            Err(crate::Error::InvalidPieceCounts {
                x_count: count.x,
                o_count: count.o,
            })
        }
    }

    /// Create a board from a string representation.
    ///
    /// Whitespace (including newlines) is ignored, so both `"X...O...X"` and the
    /// three-row form `"X--\n-O-\n--X"` parse. An optional `_X`/`_O` suffix must
    /// agree with the piece counts.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The board part does not have exactly 9 non-whitespace characters
    /// - Any character is not a valid cell representation
    /// - The piece counts are invalid or the position is unreachable
    /// - A provided suffix disagrees with the piece counts
    pub fn from_string(s: &str) -> Result<Self, crate::Error> {
        let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let (board_part, suffix) = match cleaned.split_once('_') {
            Some((board, suffix)) => (board, Some(suffix)),
            None => (cleaned.as_str(), None),
        };
        let chars: Vec<char> = board_part.chars().collect();
        let board = Self::from_cells(Self::parse_cells(&chars, s)?)?;

        if let Some(suffix) = suffix {
            let specified = Self::parse_player(suffix, s)?;
            if specified != board.to_move {
                return Err(crate::Error::InvalidConfiguration {
                    message: format!(
                        "piece counts in '{s}' are inconsistent with {specified} to move"
                    ),
                });
            }
        }

        Ok(board)
    }

    /// Parse the strict label format `"XXXXXXXXX_P"` produced by [`encode`].
    ///
    /// Rejects the same unreachable positions as [`from_cells`](Self::from_cells).
    ///
    /// [`encode`]: Self::encode
    pub fn from_label(label: &str) -> Result<Self, crate::Error> {
        let Some((board, player)) = label.split_once('_') else {
            return Err(crate::Error::InvalidConfiguration {
                message: format!("label '{label}' is missing the '_P' player suffix"),
            });
        };

        let chars: Vec<char> = board.chars().collect();
        let cells = Self::parse_cells(&chars, label)?;
        let to_move = Self::parse_player(player, label)?;
        let state = Self::from_cells(cells)?;

        if state.to_move != to_move {
            return Err(crate::Error::InvalidConfiguration {
                message: format!("label '{label}' names {to_move} to move, counts say otherwise"),
            });
        }

        Ok(state)
    }

    /// Encode the cells as a base-3 integer (Empty=0, X=1, O=2; cell 0 is the
    /// most significant digit).
    pub fn to_index(&self) -> u32 {
        self.cells
            .iter()
            .fold(0, |acc, &cell| acc * 3 + cell.digit())
    }

    /// Inverse of [`to_index`](Self::to_index); the player to move is inferred.
    pub fn from_index(index: u32) -> Result<Self, crate::Error> {
        if index >= BOARD_INDEX_LIMIT {
            return Err(crate::Error::InvalidBoardIndex { index });
        }

        let mut cells = [Cell::Empty; BOARD_CELLS];
        let mut rest = index;
        for cell in cells.iter_mut().rev() {
            *cell = Cell::from_digit(rest % 3);
            rest /= 3;
        }
        Self::from_cells(cells)
    }

    /// Count the number of occupied cells on the board.
    pub fn occupied_count(&self) -> usize {
        let count = Self::count_pieces(&self.cells);
        count.x + count.o
    }

    /// Get cell at position (0-8)
    pub fn get(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos] == Cell::Empty
    }

    /// Get all empty positions in ascending order
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// Put the current player's piece on `pos` and pass the turn.
    ///
    /// Only bounds and occupancy are checked; terminal detection belongs to
    /// [`crate::tictactoe::rules::apply_move`].
    pub(crate) fn place(&self, pos: usize) -> Result<BoardState, crate::Error> {
        use crate::error::InvalidMoveReason;

        if pos >= BOARD_CELLS {
            return Err(crate::Error::invalid_move(pos, InvalidMoveReason::OutOfBounds));
        }
        if !self.is_empty(pos) {
            return Err(crate::Error::invalid_move(pos, InvalidMoveReason::Occupied));
        }

        let mut next = *self;
        next.cells[pos] = self.to_move.to_cell();
        next.to_move = self.to_move.opponent();
        Ok(next)
    }

    /// Check if a player has won
    pub fn has_won(&self, player: Player) -> bool {
        LineAnalyzer::has_won(&self.cells, player)
    }

    /// Get the winner if there is one
    pub fn winner(&self) -> Option<Player> {
        if self.has_won(Player::X) {
            Some(Player::X)
        } else if self.has_won(Player::O) {
            Some(Player::O)
        } else {
            None
        }
    }

    /// The player whose move produced this position, if any move was made
    pub fn last_mover(&self) -> Option<Player> {
        if self.occupied_count() == 0 {
            None
        } else {
            Some(self.to_move.opponent())
        }
    }

    /// Get a string representation for use as a key
    pub fn encode(&self) -> String {
        format!(
            "{}_{}",
            self.cells.iter().map(|&c| c.to_char()).collect::<String>(),
            self.to_move.to_char()
        )
    }

    fn find_canonical_form(&self) -> (BoardState, D4Transform, String) {
        let mut best_state = *self;
        let mut best_transform = D4Transform::identity();
        let mut best_encoding = self.encode();

        for transform in D4Transform::all() {
            let transformed = self.transform(&transform);
            let encoding = transformed.encode();
            if encoding < best_encoding {
                best_encoding = encoding;
                best_state = transformed;
                best_transform = transform;
            }
        }

        (best_state, best_transform, best_encoding)
    }

    /// Canonical (lexicographically smallest) form under D4 together with the
    /// transform that reaches it.
    ///
    /// ```
    /// use tictactoe_rl::tictactoe::BoardState;
    ///
    /// let state = BoardState::new();
    /// let ctx = state.canonical_context();
    /// let canonical_move = ctx.map_move_to_canonical(0);
    /// assert_eq!(ctx.map_canonical_to_original(canonical_move), 0);
    /// ```
    pub fn canonical_context(&self) -> CanonicalContext {
        let (state, transform, encoding) = self.find_canonical_form();

        CanonicalContext {
            state,
            transform,
            encoding,
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &cell) in self.cells.iter().enumerate() {
            write!(f, "{}", cell.to_char())?;
            if (i + 1).is_multiple_of(3) && i < 8 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board() {
        let board = BoardState::new();
        assert_eq!(board.to_move, Player::X);
        assert!(board.cells.iter().all(|&c| c == Cell::Empty));
        assert_eq!(board.last_mover(), None);
    }

    #[test]
    fn test_place() {
        let board = BoardState::new().place(4).unwrap();
        assert_eq!(board.cells[4], Cell::X);
        assert_eq!(board.to_move, Player::O);
        assert_eq!(board.last_mover(), Some(Player::X));

        let err = board.place(4).unwrap_err();
        assert!(err.to_string().contains("occupied"));

        let err = board.place(9).unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[test]
    fn test_from_string() {
        let board = BoardState::from_string("XOX......").unwrap();
        assert_eq!(board.cells[0], Cell::X);
        assert_eq!(board.cells[1], Cell::O);
        assert_eq!(board.cells[2], Cell::X);
        assert_eq!(board.to_move, Player::O);

        assert!(BoardState::from_string("XO").is_err());
        assert!(BoardState::from_string("XOZ......").is_err());
        assert!(BoardState::from_string("XX.......").is_err());
        assert!(matches!(
            BoardState::from_string("XO.......XXXX"),
            Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: 13,
                ..
            })
        ));
        assert!(BoardState::from_string("XO.......X").is_err());
    }

    #[test]
    fn test_unreachable_positions_are_rejected() {
        // both players own a line
        assert!(BoardState::from_string("XXXOOO...").is_err());
        // X won but O has already answered
        assert!(BoardState::from_string("XXXOO.O..").is_err());
        // O won but X has moved again
        assert!(BoardState::from_string("OOOXX.X.X").is_err());
        // XXXOOO... through the integer encoding
        assert!(BoardState::from_index(10_179).is_err());

        let won = BoardState::from_string("XXXOO....").unwrap();
        assert_eq!(won.winner(), Some(Player::X));
        let lost = BoardState::from_string("OOOXX.X..").unwrap();
        assert_eq!(lost.winner(), Some(Player::O));
    }

    #[test]
    fn test_from_string_three_rows() {
        let board = BoardState::from_string("X--\n-O-\n--X").unwrap();
        assert_eq!(board.cells[0], Cell::X);
        assert_eq!(board.cells[4], Cell::O);
        assert_eq!(board.cells[8], Cell::X);
        assert_eq!(board.to_move, Player::O);
    }

    #[test]
    fn test_from_string_rejects_inconsistent_suffix() {
        let err = BoardState::from_string("X........_X").unwrap_err();
        assert!(err.to_string().contains("inconsistent"), "got {err}");
        assert!(BoardState::from_string("X........_O").is_ok());
    }

    #[test]
    fn test_label_roundtrip() {
        let board = BoardState::from_string("XO.X.....").unwrap();
        assert_eq!(board.encode(), "XO.X....._O");
        assert_eq!(BoardState::from_label(&board.encode()).unwrap(), board);
    }

    #[test]
    fn test_from_label_rejects_bad_labels() {
        assert!(BoardState::from_label("XXXX....._X").is_err());
        assert!(BoardState::from_label("X........_X").is_err());
        assert!(BoardState::from_label("XXXOOO..._X").is_err());
        assert!(BoardState::from_label(".........").is_err());
        assert!(BoardState::from_label("........_X").is_err());
    }

    #[test]
    fn test_index_encoding() {
        // X at 0, O at 4, X at 8 -> digits 1 0 0 0 2 0 0 0 1
        let board = BoardState::from_string("X...O...X").unwrap();
        assert_eq!(board.to_index(), 3u32.pow(8) + 2 * 3u32.pow(4) + 1);
        assert_eq!(BoardState::from_index(board.to_index()).unwrap(), board);
        assert_eq!(BoardState::new().to_index(), 0);
        assert!(BoardState::from_index(BOARD_INDEX_LIMIT).is_err());
    }

    #[test]
    fn test_canonical_corners_merge() {
        let a = BoardState::new().place(0).unwrap().canonical_context();
        let b = BoardState::new().place(8).unwrap().canonical_context();
        assert_eq!(a.encoding, b.encoding);
    }

    #[test]
    fn test_display() {
        let board = BoardState::from_string("XOX.O.X..").unwrap();
        assert_eq!(format!("{board}"), "XOX\n.O.\nX..");
    }
}
