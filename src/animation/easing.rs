//! Easing curves mapping normalized time to eased progress

use serde::{Deserialize, Serialize};

/// Overshoot used by the back curves
pub const BACK_OVERSHOOT: f32 = 1.70158;

/// Pure map from `t` in `[0, 1]` to eased progress
///
/// The back curves leave `[0, 1]` on the way (overshoot) but still start at 0
/// and end at exactly 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    BackIn(f32),
    BackOut(f32),
}

impl Easing {
    pub const fn back_in() -> Self {
        Easing::BackIn(BACK_OVERSHOOT)
    }

    pub const fn back_out() -> Self {
        Easing::BackOut(BACK_OVERSHOOT)
    }

    pub fn apply(self, t: f32) -> f32 {
        // pin the endpoints; (s + 1) - s is not exactly 1 in f32
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::BackIn(s) => t * t * ((s + 1.0) * t - s),
            Easing::BackOut(s) => {
                let u = t - 1.0;
                u * u * ((s + 1.0) * u + s) + 1.0
            }
        }
    }

    /// Looks a curve up by its conventional name; unknown names are linear
    pub fn from_name(name: &str) -> Self {
        match name {
            "linear" => Easing::Linear,
            "easeInQuad" => Easing::QuadIn,
            "easeOutQuad" => Easing::QuadOut,
            "easeInOutQuad" => Easing::QuadInOut,
            "easeInBack" => Easing::back_in(),
            "easeOutBack" => Easing::back_out(),
            other => {
                log::debug!("Unknown easing '{}', using linear", other);
                Easing::Linear
            }
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::QuadOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 6] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::back_in(),
        Easing::back_out(),
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{:?} at 0", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_back_out_overshoots_then_settles() {
        let peak = (1..100)
            .map(|i| Easing::back_out().apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_back_in_dips_below_zero() {
        assert!(Easing::back_in().apply(0.2) < 0.0);
    }

    #[test]
    fn test_quad_in_out_is_symmetric() {
        let a = Easing::QuadInOut.apply(0.25);
        let b = Easing::QuadInOut.apply(0.75);
        assert!((a + b - 1.0).abs() < 1e-6);
        assert_eq!(Easing::QuadInOut.apply(0.5), 0.5);
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Easing::from_name("easeOutBack"), Easing::back_out());
        assert_eq!(Easing::from_name("easeInQuad"), Easing::QuadIn);
        assert_eq!(Easing::from_name("bouncy"), Easing::Linear);
    }
}
