//! Fixed-speed transition applied when the label and placeholder swap.
//!
//! Presentation-only: hosts that animate read the transition off the frame,
//! hosts that don't can ignore it. The control's logic never depends on it.

/// Easing curves for the label/placeholder cross-fade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Apply the easing function to a linear fraction in `[0, 1]`.
    pub fn transform(&self, fraction: f32) -> f32 {
        match self {
            Easing::Linear => fraction,
            Easing::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, fraction),
            Easing::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, fraction),
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, fraction),
        }
    }
}

// Parametric approximation; good enough for a short opacity fade.
fn cubic_bezier(_x1: f32, y1: f32, _x2: f32, y2: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    3.0 * mt2 * t * y1 + 3.0 * mt * t2 * y2 + t3
}

/// Duration and easing of the cross-fade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub duration_millis: u64,
    pub easing: Easing,
}

impl Transition {
    pub fn tween(duration_millis: u64, easing: Easing) -> Self {
        Self {
            duration_millis,
            easing,
        }
    }

    pub fn linear(duration_millis: u64) -> Self {
        Self::tween(duration_millis, Easing::Linear)
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::tween(200, Easing::EaseInOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints_are_exact() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert!((easing.transform(0.0) - 0.0).abs() < f32::EPSILON);
            assert!((easing.transform(1.0) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn default_is_a_fixed_speed_fade() {
        let transition = Transition::default();
        assert_eq!(transition.duration_millis, 200);
        assert_eq!(transition.easing, Easing::EaseInOut);
    }
}
