use crate::error::{Error, Result};

/// Angular speeds in rad/s, slowest first. Each step doubles the previous one.
pub const DEFAULT_SPEED_LADDER: [f64; 7] = [1.0 / 16.0, 1.0 / 8.0, 0.25, 0.5, 1.0, 2.0, 4.0];

/// Index of 1 rad/s in [`DEFAULT_SPEED_LADDER`].
pub const DEFAULT_SPEED_INDEX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedChange {
    Faster,
    Slower,
}

/// A fixed ladder of speed magnitudes and the rung currently in use.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedLadder {
    steps: Vec<f64>,
    index: usize,
}

impl Default for SpeedLadder {
    fn default() -> Self {
        Self {
            steps: DEFAULT_SPEED_LADDER.to_vec(),
            index: DEFAULT_SPEED_INDEX,
        }
    }
}

impl SpeedLadder {
    pub fn new(steps: Vec<f64>, index: usize) -> Result<Self> {
        if steps.is_empty() {
            return Err(Error::InvalidTracerSettings(
                "speed ladder must not be empty".to_string(),
            ));
        }
        if steps.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(Error::InvalidTracerSettings(
                "speed ladder entries must be positive".to_string(),
            ));
        }
        if steps.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidTracerSettings(
                "speed ladder must be strictly ascending".to_string(),
            ));
        }
        if index >= steps.len() {
            return Err(Error::InvalidSpeedIndex {
                index,
                len: steps.len(),
            });
        }
        Ok(Self { steps, index })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Current speed magnitude in rad/s.
    pub fn speed(&self) -> f64 {
        self.steps[self.index]
    }

    /// Move one rung, staying on the ladder. Returns whether the rung changed.
    pub fn step(&mut self, change: SpeedChange) -> bool {
        let next = match change {
            SpeedChange::Faster => (self.index + 1).min(self.steps.len() - 1),
            SpeedChange::Slower => self.index.saturating_sub(1),
        };
        let changed = next != self.index;
        self.index = next;
        changed
    }
}
