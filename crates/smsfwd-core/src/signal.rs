//! LTE signal quality derived from RSRP.
//!
//! This module maps a raw Reference Signal Received Power measurement (dBm)
//! to a bounded percentage and a coarse category for display.
//!
//! # Example
//!
//! ```
//! use smsfwd_core::{SignalLevel, evaluate};
//!
//! let quality = evaluate(Some(-95.0));
//! assert_eq!(quality.percentage, 47);
//! assert_eq!(quality.level, SignalLevel::Fair);
//!
//! let missing = evaluate(None);
//! assert_eq!(missing.percentage, 0);
//! assert_eq!(missing.level, SignalLevel::NotAvailable);
//! ```

use core::fmt;

use serde::Serialize;

/// Weakest RSRP on the percentage scale (maps to 0%).
pub const RSRP_MIN_DBM: f64 = -140.0;
/// Strongest RSRP on the percentage scale (maps to 100%).
pub const RSRP_MAX_DBM: f64 = -44.0;

/// Lower bound (inclusive) for [`SignalLevel::Excellent`].
pub const EXCELLENT_MIN_DBM: f64 = -80.0;
/// Lower bound (inclusive) for [`SignalLevel::Good`].
pub const GOOD_MIN_DBM: f64 = -90.0;
/// Lower bound (inclusive) for [`SignalLevel::Fair`].
pub const FAIR_MIN_DBM: f64 = -100.0;
/// Lower bound (inclusive) for [`SignalLevel::Poor`].
pub const POOR_MIN_DBM: f64 = -110.0;

/// Signal category based on RSRP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SignalLevel {
    /// -80 dBm or better.
    Excellent,
    /// -90 to -80 dBm.
    Good,
    /// -100 to -90 dBm.
    Fair,
    /// -110 to -100 dBm.
    Poor,
    /// Below -110 dBm.
    VeryPoor,
    /// No RSRP reported.
    NotAvailable,
}

impl SignalLevel {
    /// Categorize a raw RSRP value in dBm.
    ///
    /// Thresholds are checked from the strongest down; the first match wins.
    pub fn from_rsrp(rsrp: f64) -> Self {
        match rsrp {
            r if r.is_nan() => SignalLevel::NotAvailable,
            r if r >= EXCELLENT_MIN_DBM => SignalLevel::Excellent,
            r if r >= GOOD_MIN_DBM => SignalLevel::Good,
            r if r >= FAIR_MIN_DBM => SignalLevel::Fair,
            r if r >= POOR_MIN_DBM => SignalLevel::Poor,
            _ => SignalLevel::VeryPoor,
        }
    }

    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SignalLevel::Excellent => "Excellent",
            SignalLevel::Good => "Good",
            SignalLevel::Fair => "Fair",
            SignalLevel::Poor => "Poor",
            SignalLevel::VeryPoor => "Very Poor",
            SignalLevel::NotAvailable => "N/A",
        }
    }

    /// Whether SMS delivery can be expected to work at this level.
    pub fn is_usable(&self) -> bool {
        matches!(
            self,
            SignalLevel::Excellent | SignalLevel::Good | SignalLevel::Fair | SignalLevel::Poor
        )
    }
}

impl fmt::Display for SignalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Percentage and category derived from one RSRP reading.
///
/// Never stored; recompute it from the latest device status on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalQuality {
    /// Linear position of the RSRP on the -140..-44 dBm scale, 0-100.
    pub percentage: u8,
    /// Signal category.
    pub level: SignalLevel,
}

impl SignalQuality {
    /// Quality reported when no RSRP is available.
    pub const NOT_AVAILABLE: Self = Self {
        percentage: 0,
        level: SignalLevel::NotAvailable,
    };
}

/// Rescale an RSRP value to 0-100, rounding to the nearest integer.
///
/// Values outside -140..-44 dBm are clamped rather than overflowing.
pub fn rsrp_percentage(rsrp: f64) -> u8 {
    if rsrp.is_nan() {
        return 0;
    }
    let span = RSRP_MAX_DBM - RSRP_MIN_DBM;
    let percentage = (((rsrp - RSRP_MIN_DBM) / span) * 100.0).round();
    // clamp first so the cast never saturates on infinities
    percentage.clamp(0.0, 100.0) as u8
}

/// Derive signal quality from an optional RSRP reading.
///
/// Absent (or NaN) RSRP always yields 0% and [`SignalLevel::NotAvailable`].
pub fn evaluate(rsrp: Option<f64>) -> SignalQuality {
    match rsrp {
        Some(value) if !value.is_nan() => SignalQuality {
            percentage: rsrp_percentage(value),
            level: SignalLevel::from_rsrp(value),
        },
        _ => SignalQuality::NOT_AVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_absent_rsrp() {
        let q = evaluate(None);
        assert_eq!(q.percentage, 0);
        assert_eq!(q.level, SignalLevel::NotAvailable);
    }

    #[test]
    fn test_nan_is_not_available() {
        assert_eq!(evaluate(Some(f64::NAN)), SignalQuality::NOT_AVAILABLE);
    }

    #[test]
    fn test_scale_endpoints() {
        assert_eq!(evaluate(Some(-140.0)).percentage, 0);
        assert_eq!(evaluate(Some(-44.0)).percentage, 100);
    }

    #[test]
    fn test_fair_example() {
        // (-95 + 140) / 96 * 100 = 46.875
        let q = evaluate(Some(-95.0));
        assert_eq!(q.percentage, 47);
        assert_eq!(q.level, SignalLevel::Fair);
    }

    #[test]
    fn test_boundary_levels() {
        assert_eq!(evaluate(Some(-80.0)).level, SignalLevel::Excellent);
        assert_eq!(evaluate(Some(-80.0001)).level, SignalLevel::Good);
        assert_eq!(evaluate(Some(-90.0)).level, SignalLevel::Good);
        assert_eq!(evaluate(Some(-90.5)).level, SignalLevel::Fair);
        assert_eq!(evaluate(Some(-100.0)).level, SignalLevel::Fair);
        assert_eq!(evaluate(Some(-100.1)).level, SignalLevel::Poor);
        assert_eq!(evaluate(Some(-110.0)).level, SignalLevel::Poor);
        assert_eq!(evaluate(Some(-110.1)).level, SignalLevel::VeryPoor);
    }

    #[test]
    fn test_out_of_domain_is_clamped() {
        let low = evaluate(Some(-200.0));
        assert_eq!(low.percentage, 0);
        assert_eq!(low.level, SignalLevel::VeryPoor);

        let high = evaluate(Some(0.0));
        assert_eq!(high.percentage, 100);
        assert_eq!(high.level, SignalLevel::Excellent);
    }

    #[test]
    fn test_infinities() {
        assert_eq!(evaluate(Some(f64::INFINITY)).percentage, 100);
        assert_eq!(evaluate(Some(f64::NEG_INFINITY)).percentage, 0);
        assert_eq!(
            evaluate(Some(f64::NEG_INFINITY)).level,
            SignalLevel::VeryPoor
        );
    }

    #[test]
    fn test_rounding() {
        assert_eq!(rsrp_percentage(-92.0), 50);
        // 43 / 96 * 100 = 44.79
        assert_eq!(rsrp_percentage(-97.0), 45);
        // 1 / 96 * 100 = 1.04
        assert_eq!(rsrp_percentage(-139.0), 1);
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(SignalLevel::VeryPoor.to_string(), "Very Poor");
        assert_eq!(SignalLevel::NotAvailable.label(), "N/A");
        assert!(SignalLevel::Poor.is_usable());
        assert!(!SignalLevel::VeryPoor.is_usable());
        assert!(!SignalLevel::NotAvailable.is_usable());
    }

    #[test]
    fn test_quality_serialization() {
        let json = serde_json::to_string(&evaluate(Some(-95.0))).unwrap();
        assert_eq!(json, r#"{"percentage":47,"level":"Fair"}"#);
    }

    proptest! {
        #[test]
        fn prop_percentage_in_range(rsrp in -140.0f64..=-44.0) {
            let q = evaluate(Some(rsrp));
            prop_assert!(q.percentage <= 100);
            prop_assert_ne!(q.level, SignalLevel::NotAvailable);
        }

        #[test]
        fn prop_percentage_monotonic(a in -140.0f64..=-44.0, b in -140.0f64..=-44.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(evaluate(Some(lo)).percentage <= evaluate(Some(hi)).percentage);
        }

        #[test]
        fn prop_any_finite_value_is_bounded(rsrp in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            prop_assert!(evaluate(Some(rsrp)).percentage <= 100);
        }
    }
}
