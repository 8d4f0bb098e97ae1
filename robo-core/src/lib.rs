//! Core 2-D procedural robot generation, animation and parade library.
//!
//! Main components:
//! - [`rng`] — deterministic random stream keyed by a seed string.
//! - [`generator`] — builds a robot figure from a seed.
//! - [`figure`] — node arena, tick pass and draw pass.
//! - [`animation`] — head bob and telescoping walk cycle.
//! - [`geometry`] — triangle-fan builders for body parts.
//! - [`weapon`] — weapon kinds and placement rules.
//! - [`render`] — mesh and draw-command contract with the renderer.
//! - [`parade`] — fixed-size population that scrolls and recycles robots.
//! - [`config`] — parade settings.
//! - [`color`] — colors and HSV conversion.
//! - [`error`] — error types.
//! - [`types`] — shared type aliases and IDs.

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod figure;
pub mod generator;
pub mod geometry;
pub mod parade;
pub mod render;
pub mod rng;
pub mod types;
pub mod weapon;
