use crate::error::ConfigError;

/// Settings for a [`crate::parade::Parade`].
///
/// ### Fields
/// - `cols`, `rows` - Size of the starting grid; the population is `cols * rows`.
/// - `first_seed_index` - Index of the first robot; every spawn takes the next one.
/// - `seed_prefix` - Prepended to the index to form the seed string.
/// - `advance_scale` - Scroll distance per unit of `speed * dt`.
/// - `retire_bound` - Scroll position past which a robot is replaced.
/// - `unit_scale` - On-screen scale of every robot.
/// - `endless` - Scroll and recycle robots instead of a static grid.
/// - `lane_margin`, `lane_span` - Horizontal lane placement in endless mode,
///   as fractions of the viewport width.
/// - `fixed_x0`, `fixed_span` - Horizontal placement of the static grid in
///   viewport units.
#[derive(Clone, Debug, PartialEq)]
pub struct ParadeConfig {
    pub cols: usize,
    pub rows: usize,
    pub first_seed_index: u64,
    pub seed_prefix: String,
    pub advance_scale: f32,
    pub retire_bound: f32,
    pub unit_scale: f32,
    pub endless: bool,
    pub lane_margin: f32,
    pub lane_span: f32,
    pub fixed_x0: f32,
    pub fixed_span: f32,
}

impl Default for ParadeConfig {
    fn default() -> Self {
        Self {
            cols: 3,
            rows: 3,
            first_seed_index: 6 * 9,
            seed_prefix: "robo".to_owned(),
            // Frame deltas are in milliseconds.
            advance_scale: 0.0001,
            retire_bound: 1.34,
            unit_scale: 0.6,
            endless: true,
            lane_margin: 0.1,
            lane_span: 0.8,
            fixed_x0: 150.0,
            fixed_span: 700.0,
        }
    }
}

impl ParadeConfig {
    /// Number of robots kept alive.
    pub fn population(&self) -> usize {
        self.cols * self.rows
    }

    /// Checks the settings a parade cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population() < 2 {
            return Err(ConfigError::GridTooSmall {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !(self.retire_bound > 0.0) {
            return Err(ConfigError::RetireBound(self.retire_bound));
        }
        if !(self.unit_scale > 0.0) {
            return Err(ConfigError::UnitScale(self.unit_scale));
        }
        if !self.advance_scale.is_finite() || self.advance_scale < 0.0 {
            return Err(ConfigError::AdvanceScale(self.advance_scale));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = ParadeConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.population(), 9);
    }

    #[test]
    fn rejects_single_slot_grid() {
        let cfg = ParadeConfig {
            cols: 1,
            rows: 1,
            ..ParadeConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::GridTooSmall { cols: 1, rows: 1 })
        );
    }

    #[test]
    fn rejects_non_positive_scales() {
        let mut cfg = ParadeConfig::default();
        cfg.unit_scale = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::UnitScale(0.0)));

        let mut cfg = ParadeConfig::default();
        cfg.retire_bound = f32::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::RetireBound(_))));

        let mut cfg = ParadeConfig::default();
        cfg.advance_scale = -1.0;
        assert_eq!(cfg.validate(), Err(ConfigError::AdvanceScale(-1.0)));
    }
}
