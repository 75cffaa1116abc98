//! Easing curves for storyboard transitions.
//!
//! Easing functions map a linear progress value (0.0 to 1.0) to a transformed
//! value. Veneer only needs two curves: plain linear motion (used by
//! speed-driven transitions) and the accelerate-decelerate profile used by
//! every visual-state transition.

/// Available easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    /// Linear interpolation (no easing).
    #[default]
    Linear,
    /// Constant acceleration, constant velocity, then constant deceleration.
    ///
    /// `acceleration` and `deceleration` are the fractions of the duration
    /// spent speeding up and slowing down. Their sum must not exceed 1.0.
    AccelerateDecelerate {
        /// Fraction of the duration spent accelerating.
        acceleration: f64,
        /// Fraction of the duration spent decelerating.
        deceleration: f64,
    },
}

impl Easing {
    /// Check that the curve parameters describe a valid velocity profile.
    pub fn is_valid(&self) -> bool {
        match *self {
            Easing::Linear => true,
            Easing::AccelerateDecelerate {
                acceleration,
                deceleration,
            } => {
                (0.0..=1.0).contains(&acceleration)
                    && (0.0..=1.0).contains(&deceleration)
                    && acceleration + deceleration <= 1.0
            }
        }
    }
}

/// Apply an easing curve to a progress value.
///
/// # Example
///
/// ```
/// use veneer_core::animation::{ease, Easing};
///
/// assert_eq!(ease(Easing::Linear, 0.5), 0.5);
///
/// let curve = Easing::AccelerateDecelerate { acceleration: 0.5, deceleration: 0.5 };
/// assert!(ease(curve, 0.25) < 0.25);
/// assert!((ease(curve, 0.5) - 0.5).abs() < 1e-9);
/// ```
#[inline]
pub fn ease(easing: Easing, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);

    match easing {
        Easing::Linear => t,
        Easing::AccelerateDecelerate {
            acceleration,
            deceleration,
        } => accelerate_decelerate(t, acceleration, deceleration),
    }
}

/// Interpolate between two values using an easing curve.
#[inline]
pub fn lerp_eased(easing: Easing, start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * ease(easing, t)
}

// Trapezoidal velocity profile with unit area. Peak velocity is
// 2 / (2 - a - d).
fn accelerate_decelerate(t: f64, a: f64, d: f64) -> f64 {
    let v = 2.0 / (2.0 - a - d);

    if t < a {
        0.5 * v * t * t / a
    } else if t <= 1.0 - d {
        0.5 * v * a + v * (t - a)
    } else {
        let r = 1.0 - t;
        1.0 - 0.5 * v * r * r / d
    }
}
