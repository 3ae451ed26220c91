//! Sample composition: up to four phases with volume fractions.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use xe_core::numeric::{Tolerances, ensure_in_range, nearly_equal};

/// Number of phase slots the planner offers.
pub const MAX_PHASES: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseFraction {
    pub phase: String,
    pub fraction: f64,
}

impl PhaseFraction {
    pub fn new(phase: impl Into<String>, fraction: f64) -> Self {
        Self {
            phase: phase.into(),
            fraction,
        }
    }
}

/// Volume fractions of the selected phases.
///
/// The remainder `1 - sum` is porosity, assumed not to attenuate. A sum above 1
/// is allowed and reported through [`Composition::is_overflowing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    slots: Vec<PhaseFraction>,
}

impl Composition {
    /// Validate every slot: at most [`MAX_PHASES`], non-empty names, fractions in `[0, 1]`.
    pub fn new(slots: Vec<PhaseFraction>) -> ModelResult<Self> {
        if slots.len() > MAX_PHASES {
            return Err(ModelError::out_of_range(
                "phase count",
                slots.len() as f64,
                "at most four phases",
            ));
        }
        for slot in &slots {
            if slot.phase.trim().is_empty() {
                return Err(ModelError::UnknownPhase {
                    phase: slot.phase.clone(),
                });
            }
            ensure_in_range(slot.fraction, 0.0, 1.0, "volume fraction")?;
        }
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[PhaseFraction] {
        &self.slots
    }

    pub fn fraction_sum(&self) -> f64 {
        self.slots.iter().map(|s| s.fraction).sum()
    }

    /// `1 - sum of fractions`; negative when overflowing.
    pub fn porosity(&self) -> f64 {
        1.0 - self.fraction_sum()
    }

    /// Porosity in whole percent, truncated toward zero.
    pub fn porosity_percent(&self) -> i64 {
        (self.porosity() * 100.0).trunc() as i64
    }

    pub fn is_overflowing(&self) -> bool {
        let sum = self.fraction_sum();
        sum > 1.0 && !nearly_equal(sum, 1.0, Tolerances::default())
    }
}
