use std::f32::consts::{PI, TAU};

use glam::{vec2, Vec2};

/// Absolute placement of a node after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
	/// Accumulated rotation, radians
	pub rotation: f32,
	/// Inherited scale factor
	pub scale: f32,
	/// World position
	pub transform: Vec2,
}

impl Default for Pose {
	fn default() -> Self {
		Self {
			rotation: 0.,
			scale: 1.,
			transform: Vec2::ZERO,
		}
	}
}

impl Pose {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_rotation(mut self, rotation: f32) -> Self {
		self.rotation = rotation;
		self
	}

	pub fn with_scale(mut self, scale: f32) -> Self {
		self.scale = scale;
		self
	}

	pub fn with_transform(mut self, transform: Vec2) -> Self {
		self.transform = transform;
		self
	}

	/// Rotation in degrees, for display and render records.
	pub fn direction(&self) -> f32 {
		rad_to_deg(self.rotation)
	}
}

/// Offset vector of length `mag` pointing along `angle`.
#[inline]
pub fn polar(angle: f32, mag: f32) -> Vec2 {
	rotate(vec2(mag, 0.), angle)
}

/// Rotates `v` counter-clockwise by `angle` radians.
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
	Vec2::from_angle(angle).rotate(v)
}

#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
	deg.to_radians()
}

#[inline]
pub fn rad_to_deg(rad: f32) -> f32 {
	rad.to_degrees()
}

/// Wraps an angle into `[-PI, PI)`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
	(angle + PI).rem_euclid(TAU) - PI
}
