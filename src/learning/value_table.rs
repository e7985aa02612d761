//! Tabular state-value store for the TD agent

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    tictactoe::{BoardState, GameState, GameStatus, Player, SymmetryMode},
};

/// Value assumed for any in-progress state that has never been updated
pub const DEFAULT_VALUE: f64 = 0.5;

/// Learned values of afterstates.
///
/// An entry holds the value of a position for the player who just moved into
/// it, in `[0, 1]`. Unseen positions read as [`DEFAULT_VALUE`]. Terminal
/// positions are never stored: their value is the fixed game reward.
///
/// Keys are fingerprints from the table's [`SymmetryMode`], so with
/// [`SymmetryMode::D4`] all eight orientations of a position share one entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueTable {
    symmetry: SymmetryMode,
    entries: HashMap<String, f64>,
}

impl ValueTable {
    pub fn new(symmetry: SymmetryMode) -> Self {
        Self {
            symmetry,
            entries: HashMap::new(),
        }
    }

    /// Build a table from stored `(fingerprint, value)` pairs.
    ///
    /// Every fingerprint must be a valid in-progress position label that is
    /// already in this mode's normal form, values must be finite and keys
    /// unique.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialization`] for the first bad entry; `line` is
    /// the 1-based entry number.
    pub fn from_entries<I>(symmetry: SymmetryMode, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut table = Self::new(symmetry);
        for (index, (fingerprint, value)) in entries.into_iter().enumerate() {
            table
                .check_entry(&fingerprint, value)
                .map_err(|message| Error::Deserialization {
                    line: index + 1,
                    message,
                })?;
            if table.entries.insert(fingerprint.clone(), value).is_some() {
                return Err(Error::Deserialization {
                    line: index + 1,
                    message: format!("duplicate fingerprint '{fingerprint}'"),
                });
            }
        }
        Ok(table)
    }

    /// Validate one stored entry, returning a description of the problem
    pub(crate) fn check_entry(&self, fingerprint: &str, value: f64) -> std::result::Result<(), String> {
        if !value.is_finite() {
            return Err(format!("value {value} for '{fingerprint}' is not finite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(format!("value {value} for '{fingerprint}' is outside [0, 1]"));
        }
        let board = BoardState::from_label(fingerprint)
            .map_err(|e| format!("invalid fingerprint '{fingerprint}': {e}"))?;
        if GameStatus::of(&board).is_terminal() {
            return Err(format!("terminal position '{fingerprint}' cannot be stored"));
        }
        if self.symmetry.fingerprint(&board) != fingerprint {
            return Err(format!(
                "fingerprint '{fingerprint}' is not in {} normal form",
                self.symmetry
            ));
        }
        Ok(())
    }

    pub fn symmetry(&self) -> SymmetryMode {
        self.symmetry
    }

    /// Key under which `board` is stored
    pub fn fingerprint(&self, board: &BoardState) -> String {
        self.symmetry.fingerprint(board)
    }

    /// Value of `state` as seen by `perspective`.
    ///
    /// Terminal states give 1 for a win, 0 for a loss and 0.5 for a draw.
    /// Stored values belong to the player who moved into the state; the other
    /// player sees the complement.
    pub fn value(&self, state: &GameState, perspective: Player) -> f64 {
        if let Some(reward) = state.status().reward_for(perspective) {
            return reward;
        }
        let stored = self.stored_value(state);
        if perspective == state.to_move().opponent() {
            stored
        } else {
            1.0 - stored
        }
    }

    /// Stored value for an in-progress state, or the default
    pub fn stored_value(&self, state: &GameState) -> f64 {
        self.entries
            .get(&self.fingerprint(state.board()))
            .copied()
            .unwrap_or(DEFAULT_VALUE)
    }

    /// Lookup by raw fingerprint
    pub fn get(&self, fingerprint: &str) -> Option<f64> {
        self.entries.get(fingerprint).copied()
    }

    /// Overwrite the stored value of an in-progress state.
    ///
    /// Terminal states are ignored so their reference values stay fixed.
    pub(crate) fn set(&mut self, state: &GameState, value: f64) {
        if state.is_terminal() {
            return;
        }
        let key = self.fingerprint(state.board());
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by fingerprint
    pub fn sorted_entries(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self
            .entries
            .iter()
            .map(|(key, &value)| (key.as_str(), value))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(label: &str) -> GameState {
        GameState::from_board(BoardState::from_label(label).unwrap())
    }

    #[test]
    fn test_unseen_state_reads_default() {
        let table = ValueTable::default();
        let after = GameState::new().apply(4).unwrap();
        assert_eq!(table.value(&after, Player::X), DEFAULT_VALUE);
        assert_eq!(table.value(&after, Player::O), DEFAULT_VALUE);
        assert!(table.is_empty());
    }

    #[test]
    fn test_terminal_values_are_fixed() {
        let mut table = ValueTable::default();
        let won = state("XXXOO...._O");
        table.set(&won, 0.2);
        assert!(table.is_empty());
        assert_eq!(table.value(&won, Player::X), 1.0);
        assert_eq!(table.value(&won, Player::O), 0.0);

        let drawn = state("XOXXOOOXX_O");
        assert_eq!(table.value(&drawn, Player::X), 0.5);
    }

    #[test]
    fn test_stored_value_belongs_to_last_mover() {
        let mut table = ValueTable::new(SymmetryMode::None);
        let after = GameState::new().apply(0).unwrap();
        table.set(&after, 0.8);
        assert_eq!(table.value(&after, Player::X), 0.8);
        assert!((table.value(&after, Player::O) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_d4_shares_entries_between_orientations() {
        let mut table = ValueTable::new(SymmetryMode::D4);
        let corner = GameState::new().apply(0).unwrap();
        let other_corner = GameState::new().apply(8).unwrap();
        table.set(&corner, 0.9);
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(&other_corner, Player::X), 0.9);

        let mut raw = ValueTable::new(SymmetryMode::None);
        raw.set(&corner, 0.9);
        assert_eq!(raw.value(&other_corner, Player::X), DEFAULT_VALUE);
    }

    #[test]
    fn test_from_entries_validates() {
        let ok = ValueTable::from_entries(
            SymmetryMode::None,
            vec![("X........_O".to_string(), 0.7)],
        )
        .unwrap();
        assert_eq!(ok.get("X........_O"), Some(0.7));

        let not_canonical = ValueTable::from_entries(
            SymmetryMode::D4,
            vec![("X........_O".to_string(), 0.7)],
        );
        assert!(not_canonical.is_err());

        let terminal =
            ValueTable::from_entries(SymmetryMode::None, vec![("XXXOO...._O".to_string(), 1.0)]);
        assert!(terminal.is_err());

        let nan =
            ValueTable::from_entries(SymmetryMode::None, vec![("X........_O".to_string(), f64::NAN)]);
        assert!(nan.is_err());

        let too_large =
            ValueTable::from_entries(SymmetryMode::None, vec![("X........_O".to_string(), 7.5)]);
        assert!(matches!(too_large, Err(Error::Deserialization { line: 1, .. })));

        let duplicate = ValueTable::from_entries(
            SymmetryMode::None,
            vec![
                ("X........_O".to_string(), 0.1),
                ("X........_O".to_string(), 0.2),
            ],
        );
        assert!(matches!(
            duplicate,
            Err(Error::Deserialization { line: 2, .. })
        ));
    }

    #[test]
    fn test_sorted_entries_are_ordered() {
        let mut table = ValueTable::new(SymmetryMode::None);
        for position in [8, 0, 4] {
            table.set(&GameState::new().apply(position).unwrap(), 0.6);
        }
        let keys: Vec<&str> = table.sorted_entries().iter().map(|(k, _)| *k).collect();
        let mut expected = keys.clone();
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(keys.len(), 3);
    }
}
