//! Weapon kinds and the per-part placement rules.

use crate::{color::Color, error::WeaponError};
use glam::Vec2;

/// Exclusive upper bound of a weapon type draw.
pub const WEAPON_DRAW_RANGE: u32 = 5;

/// Skip mask that forbids the grid launcher.
pub const SKIP_GRID: u32 = 1 << (WeaponKind::GridLauncher as u32 - 1);

const Z_LASER: f32 = 171.0;
const Z_GRID: f32 = 300.0;
const MOUNT_SPREAD: f32 = 0.95;
const GRID_COLUMNS: u32 = 2;

/// The kinds of weapon a part can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum WeaponKind {
    LargeLaser = 1,
    MediumLaser = 2,
    SmallLasers = 3,
    GridLauncher = 4,
}

impl WeaponKind {
    /// Maps a drawn type index to a kind; `0` and unknown values are `None`.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            1 => Some(Self::LargeLaser),
            2 => Some(Self::MediumLaser),
            3 => Some(Self::SmallLasers),
            4 => Some(Self::GridLauncher),
            _ => None,
        }
    }
}

/// A single weapon disc attached to a node.
///
/// `pos` is in the owning node's local space; the world position is derived
/// during the draw pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponMount {
    pub kind: WeaponKind,
    pub pos: Vec2,
    pub z: f32,
    pub radius: f32,
    pub spread: f32,
    pub color: Color,
}

/// Parent part dimensions a weapon is sized against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hardpoint {
    /// Width of the part.
    pub w: f32,
    /// Height of the part.
    pub h: f32,
    /// Vertical center of the weapon group in local space.
    pub yoffs: f32,
    /// Row spacing factor for grid launchers, `[0, 1]`.
    pub lrm_y_shrink: f32,
    /// Bit `k` forbids weapon type `k + 1`.
    pub skip_mask: u32,
}

/// Tries to place one weapon of type `index` onto `mounts`.
///
/// The random `value` in `[0, 1)` sizes the weapon within its kind.
///
/// ### Returns
/// The number of mounts appended on success. On failure `mounts` is left
/// untouched.
pub fn add_weapon(
    mounts: &mut Vec<WeaponMount>,
    index: u32,
    value: f32,
    hp: &Hardpoint,
) -> Result<usize, WeaponError> {
    if index == 0 {
        return Err(WeaponError::Empty);
    }
    let bit = 1u32.checked_shl(index - 1).unwrap_or(0);
    if hp.skip_mask & bit != 0 {
        return Err(WeaponError::Masked(index));
    }
    let kind = WeaponKind::from_index(index).ok_or(WeaponError::Unhandled(index))?;

    let before = mounts.len();
    let mount = |x: f32, y: f32, z: f32, radius: f32, color: Color| WeaponMount {
        kind,
        pos: Vec2::new(x, y),
        z,
        radius,
        spread: MOUNT_SPREAD,
        color,
    };
    match kind {
        WeaponKind::LargeLaser => {
            let r = (7.0 + value * 4.0).min(hp.w * 0.18);
            mounts.push(mount(0.0, hp.yoffs, Z_LASER, r, Color::LARGE_LASER));
        }
        WeaponKind::MediumLaser => {
            let r = 4.0 + value * 3.0;
            mounts.push(mount(0.0, hp.yoffs, Z_LASER, r, Color::MEDIUM_LASER));
        }
        WeaponKind::SmallLasers => {
            let s = hp.w / 6.0;
            mounts.push(mount(-s, hp.yoffs, Z_LASER, 3.0, Color::SMALL_LASER));
            mounts.push(mount(s, hp.yoffs, Z_LASER, 3.0, Color::SMALL_LASER));
        }
        WeaponKind::GridLauncher => {
            let rows = if hp.lrm_y_shrink <= 0.5 {
                1 + (value * 2.0).floor() as u32
            } else {
                2 + (value * 2.0).floor() as u32
            };
            let sx = hp.w / 3.0 / GRID_COLUMNS as f32;
            let mut sy = hp.h / 3.0 / rows as f32;
            let x0 = -sx * (GRID_COLUMNS - 1) as f32;
            let y0 = sy * (rows - 1) as f32;
            sy *= hp.lrm_y_shrink;
            for i in 0..GRID_COLUMNS {
                for j in 0..rows {
                    let x = x0 + i as f32 * sx * 2.0;
                    let y = y0 - sy * j as f32 * 2.0 + hp.yoffs;
                    mounts.push(mount(x, y, Z_GRID, 3.0, Color::GRID_LAUNCHER));
                }
            }
        }
    }
    Ok(mounts.len() - before)
}
