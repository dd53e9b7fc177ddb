use serde::{Deserialize, Serialize};

/// What a scenario reports about the final grid.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Raw encoded grid (0 empty, 1 majority, 2 minority).
    #[default]
    Grid,
    /// Total same-type patch count in place of the grid.
    Patches,
}

/// How labels that touch the torus seams are merged during patch analysis.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeamStitching {
    /// Merge a seam cell only with the cell directly across the seam in the same
    /// row (or column). Matches the established patch counts used by sweeps.
    #[default]
    RowAligned,
    /// Also merge diagonal neighbours across the seam, giving exact 8-connected
    /// component counts on the torus.
    Moore,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Deterministic seed for reproducible runs.
    pub seed: u64,
    /// Probability that a cell is occupied at seeding time.
    pub density: f64,
    /// Minimum number of same-type neighbours an agent needs to stay put.
    pub homophily: u32,
    /// Number of grid rows.
    pub height: usize,
    /// Number of grid columns.
    pub width: usize,
    /// Probability that a seeded agent belongs to the minority type.
    pub minority_fraction: f64,
    /// Tick budget for one run.
    pub max_steps: usize,
    pub output: OutputMode,
    pub seam_stitching: SeamStitching,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            density: 0.8,
            homophily: 3,
            height: 30,
            width: 30,
            minority_fraction: 0.5,
            max_steps: 100,
            output: OutputMode::Grid,
            seam_stitching: SeamStitching::RowAligned,
        }
    }
}

macro_rules! define_scenario_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum ScenarioConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for ScenarioConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_scenario_config_error! {
    InvalidDensity => "density must be finite and within [0,1]";
    InvalidMinorityFraction => "minority_fraction must be finite and within [0,1]";
    InvalidHeight => "height must be greater than 0";
    InvalidWidth => "width must be greater than 0";
    InvalidMaxSteps => "max_steps must be greater than 0";
    CellCountOverflow => "height * width overflows usize";
    TooManyCells { max: usize, actual: usize } => "grid cells ({actual}) exceed supported maximum ({max})";
    TooManySteps { max: usize, actual: usize } => "max_steps ({actual}) exceeds supported maximum ({max})";
}

impl std::error::Error for ScenarioConfigError {}

impl ScenarioConfig {
    pub const MAX_GRID_CELLS: usize = crate::constants::MAX_GRID_CELLS;

    pub const MAX_STEPS: usize = crate::constants::MAX_STEPS;

    pub fn validate(&self) -> Result<(), ScenarioConfigError> {
        self.validate_probabilities()?;
        self.validate_dimensions()?;
        self.validate_budget()?;
        Ok(())
    }

    /// Number of cells in the configured grid. Only meaningful after `validate`.
    pub fn cell_count(&self) -> usize {
        self.height * self.width
    }

    fn validate_probabilities(&self) -> Result<(), ScenarioConfigError> {
        if !is_probability(self.density) {
            return Err(ScenarioConfigError::InvalidDensity);
        }
        if !is_probability(self.minority_fraction) {
            return Err(ScenarioConfigError::InvalidMinorityFraction);
        }
        Ok(())
    }

    fn validate_dimensions(&self) -> Result<(), ScenarioConfigError> {
        if self.height == 0 {
            return Err(ScenarioConfigError::InvalidHeight);
        }
        if self.width == 0 {
            return Err(ScenarioConfigError::InvalidWidth);
        }
        let cells = self
            .height
            .checked_mul(self.width)
            .ok_or(ScenarioConfigError::CellCountOverflow)?;
        if cells > Self::MAX_GRID_CELLS {
            return Err(ScenarioConfigError::TooManyCells {
                max: Self::MAX_GRID_CELLS,
                actual: cells,
            });
        }
        Ok(())
    }

    fn validate_budget(&self) -> Result<(), ScenarioConfigError> {
        if self.max_steps == 0 {
            return Err(ScenarioConfigError::InvalidMaxSteps);
        }
        if self.max_steps > Self::MAX_STEPS {
            return Err(ScenarioConfigError::TooManySteps {
                max: Self::MAX_STEPS,
                actual: self.max_steps,
            });
        }
        Ok(())
    }
}

fn is_probability(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ScenarioConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "density": 0.5, "homophily": 4, "output": "patches" }"#;
        let cfg: ScenarioConfig = serde_json::from_str(json).expect("partial config should parse");
        assert_eq!(cfg.density, 0.5);
        assert_eq!(cfg.homophily, 4);
        assert_eq!(cfg.output, OutputMode::Patches);
        assert_eq!(cfg.height, 30);
        assert_eq!(cfg.seam_stitching, SeamStitching::RowAligned);
    }

    #[test]
    fn rejects_probabilities_outside_unit_interval() {
        for density in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let cfg = ScenarioConfig {
                density,
                ..ScenarioConfig::default()
            };
            assert_eq!(cfg.validate(), Err(ScenarioConfigError::InvalidDensity));
        }
        let cfg = ScenarioConfig {
            minority_fraction: 1.01,
            ..ScenarioConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ScenarioConfigError::InvalidMinorityFraction)
        );
    }

    #[test]
    fn accepts_probability_bounds() {
        let cfg = ScenarioConfig {
            density: 0.0,
            minority_fraction: 1.0,
            ..ScenarioConfig::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_dimensions_and_budget() {
        let zero_height = ScenarioConfig {
            height: 0,
            ..ScenarioConfig::default()
        };
        assert_eq!(zero_height.validate(), Err(ScenarioConfigError::InvalidHeight));
        let zero_width = ScenarioConfig {
            width: 0,
            ..ScenarioConfig::default()
        };
        assert_eq!(zero_width.validate(), Err(ScenarioConfigError::InvalidWidth));
        let zero_steps = ScenarioConfig {
            max_steps: 0,
            ..ScenarioConfig::default()
        };
        assert_eq!(zero_steps.validate(), Err(ScenarioConfigError::InvalidMaxSteps));
    }

    #[test]
    fn rejects_oversized_grids() {
        let overflow = ScenarioConfig {
            height: usize::MAX,
            width: 2,
            ..ScenarioConfig::default()
        };
        assert_eq!(overflow.validate(), Err(ScenarioConfigError::CellCountOverflow));
        let huge = ScenarioConfig {
            height: 4096,
            width: 4096,
            ..ScenarioConfig::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(ScenarioConfigError::TooManyCells { .. })
        ));
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = ScenarioConfigError::TooManySteps {
            max: 10,
            actual: 20,
        };
        assert_eq!(
            err.to_string(),
            "max_steps (20) exceeds supported maximum (10)"
        );
    }
}
