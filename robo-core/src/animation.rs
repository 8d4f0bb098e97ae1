//! Closed-form periodic motion applied to a node's rest pose.
//!
//! Each animated node carries an [`Animation`] with parameters fixed at
//! generation time. The tick pass calls [`Animation::pose`] with the node's
//! rest pose and the frame time (milliseconds) to get the new local
//! transform. Time stays `f64` through the phase computation so long
//! sessions keep sub-millisecond resolution.
//!
//! Legs use a telescoping scheme: the upper leg scales by `s`, the lower leg
//! by `sl / s` and the foot by `1 / sl`, so the product along the chain is
//! exactly one and the foot keeps its size while the segments flex.

use glam::{Affine2, Vec2};
use std::f32::consts::PI;
use std::f64::consts::TAU;

/// Vertical flex amplitude of the upper leg.
pub const UPPER_FLEX: f32 = 0.15;
/// Vertical flex amplitude of the lower leg.
pub const LOWER_FLEX: f32 = 0.05;

/// Head bob parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bob {
    /// Radians per millisecond.
    pub rate: f32,
    pub amplitude: f32,
    pub phase: f32,
}

/// Walk cycle parameters shared by one leg chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gait {
    /// Radians per millisecond.
    pub rate: f32,
    pub phase: f32,
}

impl Gait {
    /// The same cycle offset by half a period, for the opposite leg.
    pub fn opposite(self) -> Self {
        Self {
            rate: self.rate,
            phase: self.phase + PI,
        }
    }

    /// Duration of one full cycle in milliseconds.
    pub fn period(&self) -> f64 {
        TAU / f64::from(self.rate)
    }

    #[inline]
    fn wave(&self, t: f64) -> f32 {
        wave(t, self.rate, self.phase)
    }

    /// Vertical scale of the upper leg at time `t`.
    pub fn upper_scale(&self, t: f64) -> f32 {
        1.0 - UPPER_FLEX + self.wave(t) * UPPER_FLEX
    }

    /// The lower leg's own flex term at time `t`.
    pub fn lower_flex(&self, t: f64) -> f32 {
        1.0 - LOWER_FLEX + self.wave(t) * LOWER_FLEX
    }

    /// Vertical scale of the lower leg, compensating the upper leg.
    pub fn lower_scale(&self, t: f64) -> f32 {
        self.lower_flex(t) / self.upper_scale(t)
    }

    /// Vertical scale of the foot, compensating the lower leg's flex.
    pub fn foot_scale(&self, t: f64) -> f32 {
        1.0 / self.lower_flex(t)
    }
}

/// `sin(t * rate + phase)` with the product taken in `f64`.
#[inline]
fn wave(t: f64, rate: f32, phase: f32) -> f32 {
    (t * f64::from(rate) + f64::from(phase)).sin() as f32
}

/// Per-node animation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Animation {
    #[default]
    None,
    HeadBob(Bob),
    UpperLeg(Gait),
    LowerLeg(Gait),
    Foot(Gait),
}

impl Animation {
    pub fn is_animated(&self) -> bool {
        !matches!(self, Animation::None)
    }

    /// Computes the animated local transform from the rest pose.
    ///
    /// Returns `None` for [`Animation::None`], leaving the node untouched.
    pub fn pose(&self, base: &Affine2, t: f64) -> Option<Affine2> {
        let delta = match self {
            Animation::None => return None,
            Animation::HeadBob(bob) => {
                let dy = wave(t, bob.rate, bob.phase) * bob.amplitude;
                Affine2::from_translation(Vec2::new(0.0, dy))
            }
            Animation::UpperLeg(g) => Affine2::from_scale(Vec2::new(1.0, g.upper_scale(t))),
            Animation::LowerLeg(g) => Affine2::from_scale(Vec2::new(1.0, g.lower_scale(t))),
            Animation::Foot(g) => Affine2::from_scale(Vec2::new(1.0, g.foot_scale(t))),
        };
        Some(*base * delta)
    }
}
