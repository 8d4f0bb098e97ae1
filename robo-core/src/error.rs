//! Error types for the recoverable paths of the core.
//!
//! Generation itself cannot fail; the only expected failures are weapon
//! placement attempts (resolved by retry) and invalid parade settings.

use thiserror::Error;

/// Why a single weapon placement attempt did not add any mount.
///
/// These are expected outcomes: callers retry with a freshly drawn type
/// or simply leave the part unarmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WeaponError {
    /// Type `0` was drawn, which never places anything.
    #[error("no weapon drawn")]
    Empty,
    /// The drawn type is disallowed by the caller's skip mask.
    #[error("weapon type {0} is masked out for this part")]
    Masked(u32),
    /// The drawn value does not name a weapon kind.
    #[error("unhandled weapon type {0}")]
    Unhandled(u32),
}

/// Invalid [`crate::config::ParadeConfig`] settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("parade grid must hold at least two units, got {cols}x{rows}")]
    GridTooSmall { cols: usize, rows: usize },
    #[error("retire bound must be positive, got {0}")]
    RetireBound(f32),
    #[error("unit scale must be positive, got {0}")]
    UnitScale(f32),
    #[error("advance scale must be finite and non-negative, got {0}")]
    AdvanceScale(f32),
}
