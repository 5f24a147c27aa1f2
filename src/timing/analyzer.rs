//! Operation effect analysis.
//!
//! The timing engine needs to know how many instances an operation takes to
//! achieve an effect and how much security each operation adds. Those answers
//! depend on the target and on game state outside this crate, so they come in
//! through the [`OperationAnalyzer`] boundary.

use crate::core::NodeFacts;

/// Security removed by one weaken instance.
pub const WEAKEN_SECURITY_PER_INSTANCE: f64 = 0.05;
/// Security added by one hack instance.
pub const HACK_SECURITY_PER_INSTANCE: f64 = 0.002;
/// Security added by one grow instance.
pub const GROW_SECURITY_PER_INSTANCE: f64 = 0.004;

/// Answers "how many instances" and "how much security" for a target.
pub trait OperationAnalyzer: Send + Sync {
    /// Fractional hack instances needed to extract `amount` from `target`.
    fn hack_instances(&self, target: &dyn NodeFacts, amount: f64) -> f64;
    /// Security increase caused by `instances` hack instances.
    fn hack_security_increase(&self, instances: u32) -> f64;
    /// Fractional grow instances needed to multiply the target's money by `factor`.
    fn grow_instances(&self, target: &dyn NodeFacts, factor: f64) -> f64;
    /// Security increase caused by `instances` grow instances.
    fn grow_security_increase(&self, instances: u32) -> f64;
}

/// Closed-form analyzer with fixed per-instance effects.
///
/// Each hack instance steals a fixed fraction of current money; each grow
/// instance multiplies money by a fixed factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulaAnalyzer {
    /// Fraction of current money one hack instance extracts.
    pub hack_fraction_per_instance: f64,
    /// Money multiplier applied by one grow instance.
    pub growth_per_instance: f64,
    /// Security added per hack instance.
    pub hack_security_per_instance: f64,
    /// Security added per grow instance.
    pub grow_security_per_instance: f64,
}

impl Default for FormulaAnalyzer {
    fn default() -> Self {
        Self {
            hack_fraction_per_instance: 0.002,
            growth_per_instance: 1.0025,
            hack_security_per_instance: HACK_SECURITY_PER_INSTANCE,
            grow_security_per_instance: GROW_SECURITY_PER_INSTANCE,
        }
    }
}

impl OperationAnalyzer for FormulaAnalyzer {
    fn hack_instances(&self, target: &dyn NodeFacts, amount: f64) -> f64 {
        let per_instance = target.current_money() * self.hack_fraction_per_instance;
        if per_instance <= 0.0 || amount <= 0.0 {
            return 0.0;
        }
        amount / per_instance
    }

    fn hack_security_increase(&self, instances: u32) -> f64 {
        f64::from(instances) * self.hack_security_per_instance
    }

    fn grow_instances(&self, _target: &dyn NodeFacts, factor: f64) -> f64 {
        if factor <= 1.0 || self.growth_per_instance <= 1.0 {
            return 0.0;
        }
        factor.ln() / self.growth_per_instance.ln()
    }

    fn grow_security_increase(&self, instances: u32) -> f64 {
        f64::from(instances) * self.grow_security_per_instance
    }
}

/// Round a fractional instance count down, saturating at the `u32` range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn floor_instances(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.floor().min(f64::from(u32::MAX)) as u32
}

/// Round a fractional instance count up, saturating at the `u32` range.
///
/// Any positive value needs at least one instance. Quotients within a relative
/// epsilon of an integer, such as `0.1 / 0.05`, snap to it instead of rounding
/// up to the next one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ceil_instances(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let nearest = value.round();
    let rounded = if (value - nearest).abs() <= 1e-9 * nearest.max(1.0) {
        nearest
    } else {
        value.ceil()
    };
    rounded.clamp(1.0, f64::from(u32::MAX)) as u32
}
