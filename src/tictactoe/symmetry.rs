//! D4 symmetry operations and state fingerprints

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::board::{BoardState, Cell};

/// D4 symmetry transformation (dihedral group of the square)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct D4Transform {
    /// Clockwise rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,
    /// Mirror across the vertical axis, applied before the rotation
    pub reflection: bool,
}

impl D4Transform {
    pub fn identity() -> Self {
        D4Transform {
            rotation: 0,
            reflection: false,
        }
    }

    /// All 8 elements of D4
    pub fn all() -> [D4Transform; 8] {
        let mut transforms = [D4Transform::identity(); 8];
        for (i, rotation) in [0, 90, 180, 270].into_iter().enumerate() {
            transforms[2 * i] = D4Transform {
                rotation,
                reflection: false,
            };
            transforms[2 * i + 1] = D4Transform {
                rotation,
                reflection: true,
            };
        }
        transforms
    }

    /// Apply transform to a position (0-8)
    pub fn transform_position(&self, pos: usize) -> usize {
        let (mut row, mut col) = (pos / 3, pos % 3);

        if self.reflection {
            col = 2 - col;
        }

        for _ in 0..(self.rotation / 90) {
            let new_row = col;
            let new_col = 2 - row;
            row = new_row;
            col = new_col;
        }

        row * 3 + col
    }

    /// Get the inverse transform
    pub fn inverse(&self) -> D4Transform {
        if self.reflection {
            // reflect-then-rotate is itself a reflection, hence an involution
            *self
        } else {
            D4Transform {
                rotation: (360 - self.rotation) % 360,
                reflection: false,
            }
        }
    }
}

impl BoardState {
    /// Apply a D4 transform to the board
    pub fn transform(&self, t: &D4Transform) -> Self {
        let mut cells = [Cell::Empty; 9];
        for (i, &cell) in self.cells.iter().enumerate() {
            cells[t.transform_position(i)] = cell;
        }
        BoardState {
            cells,
            to_move: self.to_move,
        }
    }

    /// Canonical form under D4 symmetry.
    ///
    /// Recomputes the search each call; use [`BoardState::canonical_context`]
    /// when the transform is needed as well.
    pub fn canonical(&self) -> Self {
        self.canonical_context().state
    }
}

/// How board states are turned into value-table keys.
///
/// Merging symmetric states shrinks the table roughly eightfold but is not
/// needed for correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryMode {
    /// Raw encoding; every orientation is a separate entry
    None,
    /// Lexicographically smallest encoding among the 8 D4 images
    #[default]
    D4,
}

impl SymmetryMode {
    /// Fingerprint of `state` under this mode
    pub fn fingerprint(self, state: &BoardState) -> String {
        match self {
            SymmetryMode::None => state.encode(),
            SymmetryMode::D4 => state.canonical_context().encoding,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymmetryMode::None => "none",
            SymmetryMode::D4 => "d4",
        }
    }
}

impl fmt::Display for SymmetryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymmetryMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" | "raw" => Ok(SymmetryMode::None),
            "d4" | "on" | "canonical" => Ok(SymmetryMode::D4),
            other => Err(crate::Error::InvalidConfiguration {
                message: format!("unknown symmetry mode '{other}' (expected 'd4' or 'none')"),
            }),
        }
    }
}
