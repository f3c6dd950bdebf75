//! Height remap curves applied to normalized samples before scaling.

use serde::{Deserialize, Serialize};

/// A mapping from a normalized height to a (usually) normalized height.
pub trait HeightCurve {
    fn evaluate(&self, t: f32) -> f32;
}

impl<F> HeightCurve for F
where
    F: Fn(f32) -> f32,
{
    fn evaluate(&self, t: f32) -> f32 {
        self(t)
    }
}

/// `f(t) = t`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Identity;

impl HeightCurve for Identity {
    fn evaluate(&self, t: f32) -> f32 {
        t
    }
}

/// One control point of a [`KeyframeCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    /// Slope arriving at this key.
    #[serde(default)]
    pub in_tangent: f32,
    /// Slope leaving this key.
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }

    /// Key with the same slope on both sides.
    pub fn smooth(time: f32, value: f32, tangent: f32) -> Self {
        Self::new(time, value, tangent, tangent)
    }
}

/// Cubic Hermite spline through keyframes.
///
/// Outside the first/last key the curve holds the end values. An empty curve
/// behaves as the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct KeyframeCurve {
    keys: Vec<Keyframe>,
}

impl From<Vec<Keyframe>> for KeyframeCurve {
    fn from(keys: Vec<Keyframe>) -> Self {
        Self::new(keys)
    }
}

impl From<KeyframeCurve> for Vec<Keyframe> {
    fn from(curve: KeyframeCurve) -> Self {
        curve.keys
    }
}

impl KeyframeCurve {
    pub fn new(mut keys: Vec<Keyframe>) -> Self {
        keys.retain(|k| k.time.is_finite() && k.value.is_finite());
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Straight line from (0, 0) to (1, 1).
    pub fn linear() -> Self {
        Self::new(vec![Keyframe::smooth(0.0, 0.0, 1.0), Keyframe::smooth(1.0, 1.0, 1.0)])
    }

    /// Flat at both ends, steepest in the middle.
    pub fn ease_in_out() -> Self {
        Self::new(vec![Keyframe::smooth(0.0, 0.0, 0.0), Keyframe::smooth(1.0, 1.0, 0.0)])
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }
}

impl HeightCurve for KeyframeCurve {
    fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return t,
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; the guards above keep it in 1..len.
        let hi = self.keys.partition_point(|k| k.time <= t);
        let k0 = &self.keys[hi - 1];
        let k1 = &self.keys[hi];

        let dt = k1.time - k0.time;
        if dt <= f32::EPSILON {
            return k1.value;
        }
        let s = (t - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
    }
}

/// Curve selection as stored in configuration files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CurveAsset {
    #[default]
    Identity,
    Keyframes(KeyframeCurve),
}

impl HeightCurve for CurveAsset {
    fn evaluate(&self, t: f32) -> f32 {
        match self {
            CurveAsset::Identity => t,
            CurveAsset::Keyframes(curve) => curve.evaluate(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn linear_keyframes_match_identity() {
        let curve = KeyframeCurve::linear();
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            assert!(close(curve.evaluate(t), t), "t = {}", t);
        }
    }

    #[test]
    fn ease_in_out_is_smoothstep() {
        let curve = KeyframeCurve::ease_in_out();
        for t in [0.1_f32, 0.25, 0.5, 0.8] {
            let smoothstep = t * t * (3.0 - 2.0 * t);
            assert!(close(curve.evaluate(t), smoothstep));
        }
    }

    #[test]
    fn holds_end_values_outside_keys() {
        let curve = KeyframeCurve::new(vec![
            Keyframe::smooth(0.8, 0.9, 0.0),
            Keyframe::smooth(0.2, 0.1, 0.0),
        ]);
        assert_eq!(curve.keys()[0].time, 0.2);
        assert_eq!(curve.evaluate(0.0), 0.1);
        assert_eq!(curve.evaluate(1.0), 0.9);
    }

    #[test]
    fn passes_through_interior_keys() {
        let curve = KeyframeCurve::new(vec![
            Keyframe::smooth(0.0, 0.0, 0.0),
            Keyframe::smooth(0.4, 0.05, 0.3),
            Keyframe::smooth(1.0, 1.0, 2.0),
        ]);
        assert!(close(curve.evaluate(0.4), 0.05));
    }

    #[test]
    fn closures_and_empty_curves() {
        let square = |t: f32| t * t;
        assert_eq!(square.evaluate(0.5), 0.25);
        assert_eq!(KeyframeCurve::new(Vec::new()).evaluate(0.3), 0.3);
        assert_eq!(CurveAsset::Identity.evaluate(0.7), 0.7);
    }
}
