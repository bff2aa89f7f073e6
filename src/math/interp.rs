use glam::Vec2;

use super::transform::{wrap_angle, Pose};

/// Pair of values to blend between, `beg` at `t = 0` and `end` at `t = 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpRange<T> {
	pub beg: T,
	pub end: T,
}

impl<T> InterpRange<T> {
	#[inline]
	pub fn new(beg: T, end: T) -> Self {
		Self { beg, end }
	}
}

#[inline]
pub fn lerp_f32(t: f32, range: InterpRange<f32>) -> f32 {
	range.beg + (range.end - range.beg) * t
}

#[inline]
pub fn lerp_vec2(t: f32, range: InterpRange<Vec2>) -> Vec2 {
	range.beg.lerp(range.end, t)
}

/// Interpolates between two angles along the shorter turn.
///
/// A half-turn difference is ambiguous; it resolves to the negative direction.
#[inline]
pub fn lerp_angle(t: f32, range: InterpRange<f32>) -> f32 {
	range.beg + wrap_angle(range.end - range.beg) * t
}

impl InterpRange<Pose> {
	/// Blended pose at `t`, clamped to `[0, 1]`. The endpoints are returned untouched.
	pub fn at(&self, t: f32) -> Pose {
		if t <= 0. {
			return self.beg;
		}
		if t >= 1. {
			return self.end;
		}

		Pose {
			rotation: lerp_angle(t, InterpRange::new(self.beg.rotation, self.end.rotation)),
			scale: lerp_f32(t, InterpRange::new(self.beg.scale, self.end.scale)),
			transform: lerp_vec2(t, InterpRange::new(self.beg.transform, self.end.transform)),
		}
	}
}
