//! Per-level arc costs.
//!
//! Level `i` costs `2 * i` times the base construction cost to build and
//! reduces travel cost linearly: level 0 keeps the base user cost, and each
//! additional level removes 3/25 of it. Explicit per-level overrides on the arc
//! take precedence over both formulas.

use crate::Arc;

/// Construction cost of giving `arc` infrastructure `level`.
pub fn construction_cost(arc: &Arc, level: usize) -> f64 {
    match arc.construction_cost_overrides.get(&level) {
        Some(cost) => *cost,
        None => 2.0 * level as f64 * arc.construction_cost,
    }
}

/// Travel cost over `arc` once it has infrastructure `level`.
pub fn user_cost(arc: &Arc, level: usize) -> f64 {
    match arc.user_cost_overrides.get(&level) {
        Some(cost) => *cost,
        None => arc.user_cost * user_cost_factor(level),
    }
}

/// Fraction of the base user cost remaining at `level` (1.0 at level 0).
pub fn user_cost_factor(level: usize) -> f64 {
    (28.0 - 3.0 * (level as f64 + 1.0)) / 25.0
}

/// Construction cost of moving `arc` from `level` to `level + 1`.
pub fn upgrade_delta(arc: &Arc, level: usize) -> f64 {
    construction_cost(arc, level + 1) - construction_cost(arc, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_formulas() {
        let arc = Arc::new("a", "b", 10.0, 5.0);
        assert_eq!(construction_cost(&arc, 0), 0.0);
        assert_eq!(construction_cost(&arc, 2), 40.0);
        assert_eq!(user_cost(&arc, 0), 5.0);
        assert!((user_cost(&arc, 1) - 4.4).abs() < 1e-12);
        assert!((user_cost(&arc, 2) - 3.8).abs() < 1e-12);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let arc = Arc::new("a", "b", 10.0, 5.0)
            .with_construction_cost_override(1, 7.0)
            .with_user_cost_override(1, 1.0);
        assert_eq!(construction_cost(&arc, 1), 7.0);
        assert_eq!(user_cost(&arc, 1), 1.0);
        assert_eq!(construction_cost(&arc, 2), 40.0);
        assert_eq!(upgrade_delta(&arc, 1), 33.0);
    }

    #[test]
    fn test_factor_at_level_zero_is_identity() {
        assert_eq!(user_cost_factor(0), 1.0);
        assert!((user_cost_factor(2) - 0.76).abs() < 1e-12);
    }
}
