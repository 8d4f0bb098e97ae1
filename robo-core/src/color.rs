//! Linear RGBA colors used by geometry and weapon mounts.

/// RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Body plating shared by every structural part.
    pub const HULL: Self = Self::rgba(0.3, 0.3, 0.3, 1.0);
    pub const LARGE_LASER: Self = Self::rgba(1.0, 0.0, 0.5, 1.0);
    pub const MEDIUM_LASER: Self = Self::rgba(0.0, 1.0, 0.5, 1.0);
    pub const SMALL_LASER: Self = Self::rgba(0.8, 1.0, 0.5, 1.0);
    pub const GRID_LAUNCHER: Self = Self::rgba(1.0, 0.5, 0.0, 1.0);

    /// Converts HSV to an opaque RGB color.
    ///
    /// ### Parameters
    /// - `hue` - Hue in degrees, `[0, 360)`; `360` wraps to `0`.
    /// - `s` - Saturation in `[0, 1]`.
    /// - `v` - Value in `[0, 1]`.
    pub fn from_hsv(hue: f32, s: f32, v: f32) -> Self {
        if s == 0.0 {
            return Self::rgba(v, v, v, 1.0);
        }
        let mut h = hue / 60.0;
        if h >= 6.0 {
            h -= 6.0;
        }
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::rgba(r, g, b, 1.0)
    }

    /// Linear blend towards `other`; `t = 0` is `self`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}
