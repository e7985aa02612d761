//! Exploration schedules for epsilon-greedy move selection

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Exploration rate as a function of the episode number.
///
/// Parsed from the CLI forms `0.1`, `linear:START,END,EPISODES` and
/// `exp:START,DECAY,MIN`:
///
/// ```
/// use tictactoe_rl::learning::ExplorationSchedule;
///
/// let schedule: ExplorationSchedule = "linear:0.5,0.1,100".parse()?;
/// assert_eq!(schedule.rate(0), 0.5);
/// assert_eq!(schedule.rate(500), 0.1);
/// # Ok::<(), tictactoe_rl::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExplorationSchedule {
    /// Same rate for every episode
    Constant { rate: f64 },
    /// Straight line from `start` to `end` over `episodes`, then flat at `end`
    Linear {
        start: f64,
        end: f64,
        episodes: usize,
    },
    /// `max(min, start * decay^episode)`
    Exponential { start: f64, decay: f64, min: f64 },
}

impl ExplorationSchedule {
    pub fn constant(rate: f64) -> Self {
        ExplorationSchedule::Constant { rate }
    }

    /// Exploration rate for the 0-based `episode`, always within `[0, 1]`
    pub fn rate(&self, episode: usize) -> f64 {
        let rate = match *self {
            ExplorationSchedule::Constant { rate } => rate,
            ExplorationSchedule::Linear {
                start,
                end,
                episodes,
            } => {
                if episodes == 0 || episode >= episodes {
                    end
                } else {
                    let progress = episode as f64 / episodes as f64;
                    start + (end - start) * progress
                }
            }
            ExplorationSchedule::Exponential { start, decay, min } => {
                (start * decay.powf(episode as f64)).max(min)
            }
        };
        rate.clamp(0.0, 1.0)
    }

    /// Check that every rate lies in `[0, 1]` and any decay in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the offending parameter.
    pub fn validate(&self) -> Result<()> {
        match *self {
            ExplorationSchedule::Constant { rate } => check_rate("rate", rate),
            ExplorationSchedule::Linear { start, end, .. } => {
                check_rate("start", start)?;
                check_rate("end", end)
            }
            ExplorationSchedule::Exponential { start, decay, min } => {
                check_rate("start", start)?;
                check_rate("min", min)?;
                if !(decay > 0.0 && decay <= 1.0) {
                    return Err(Error::InvalidConfiguration {
                        message: format!("exploration decay must be in (0, 1], got {decay}"),
                    });
                }
                Ok(())
            }
        }
    }
}

fn check_rate(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("exploration {name} must be in [0, 1], got {value}"),
        })
    }
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        ExplorationSchedule::Exponential {
            start: 0.3,
            decay: 0.9995,
            min: 0.01,
        }
    }
}

impl fmt::Display for ExplorationSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorationSchedule::Constant { rate } => write!(f, "{rate}"),
            ExplorationSchedule::Linear {
                start,
                end,
                episodes,
            } => write!(f, "linear:{start},{end},{episodes}"),
            ExplorationSchedule::Exponential { start, decay, min } => {
                write!(f, "exp:{start},{decay},{min}")
            }
        }
    }
}

impl FromStr for ExplorationSchedule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = |detail: &str| Error::InvalidConfiguration {
            message: format!("invalid exploration schedule '{s}': {detail}"),
        };

        let (kind, params) = match s.split_once(':') {
            Some((kind, params)) => (kind.trim().to_ascii_lowercase(), params),
            None => ("constant".to_string(), s),
        };
        let fields: Vec<&str> = params.split(',').map(str::trim).collect();
        let number = |index: usize| -> Result<f64> {
            fields[index]
                .parse::<f64>()
                .map_err(|_| invalid(&format!("'{}' is not a number", fields[index])))
        };

        let schedule = match (kind.as_str(), fields.len()) {
            ("constant" | "const", 1) => ExplorationSchedule::Constant { rate: number(0)? },
            ("linear" | "lin", 3) => ExplorationSchedule::Linear {
                start: number(0)?,
                end: number(1)?,
                episodes: fields[2]
                    .parse::<usize>()
                    .map_err(|_| invalid(&format!("'{}' is not an episode count", fields[2])))?,
            },
            ("exp" | "exponential", 3) => ExplorationSchedule::Exponential {
                start: number(0)?,
                decay: number(1)?,
                min: number(2)?,
            },
            ("constant" | "const" | "linear" | "lin" | "exp" | "exponential", n) => {
                return Err(invalid(&format!("wrong number of parameters ({n})")));
            }
            (other, _) => return Err(invalid(&format!("unknown kind '{other}'"))),
        };

        schedule.validate()?;
        Ok(schedule)
    }
}
