//! Procedural robot generation.
//!
//! [`generate`] turns a seed string into a [`Robot`]: a [`Figure`] with
//! pelvis, torso, head, eyes, shoulders, legs, feet and optional arms, plus
//! weapon mounts and walk/bob animation.
//!
//! Every decision consumes draws from one [`SeedRng`] and the stages always
//! run in the same order: pelvis, torso, head, eyes, shoulders, legs, feet,
//! arms, gait, lane hints. Reordering any draw changes every robot that
//! follows it, even for an unchanged seed.
//!
//! Coordinates use screen orientation: `+y` points down, so "up" offsets are
//! negative.

use crate::{
    animation::{Animation, Bob, Gait},
    color::Color,
    figure::Figure,
    geometry::{fan_from_border, mirror, segmented_rect, shift},
    rng::SeedRng,
    types::{NodeId, ROOT},
    weapon::{Hardpoint, SKIP_GRID, WEAPON_DRAW_RANGE, WeaponMount, add_weapon},
};
use glam::{Affine2, Vec2};
use std::f32::consts::{PI, TAU};

const Z_TORSO: f32 = 100.0;
const Z_PELVIS: f32 = 105.0;
const Z_HEAD: f32 = 110.0;
const Z_LIMB: f32 = 120.0;
const Z_ARM: f32 = 150.0;
const Z_SHOULDER: f32 = 170.0;

/// Chance for optional parts (pelvis, arms, lower arm, lower leg).
const PART_CHANCE: f32 = 0.75;
/// Retries for arm weapons after the first draw fails.
const ARM_WEAPON_RETRIES: u32 = 5;

/// Shoulder plate outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShoulderShape {
    None,
    Square,
    Pentagon,
    Hexagon,
}

/// Foot outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootKind {
    /// Wide, possibly pointed trapezoid resting directly on the shin.
    Trapezoid,
    /// Narrower block hanging slightly below the shin.
    Block,
}

/// Structural choices made while generating, for logging and inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct Traits {
    pub has_pelvis: bool,
    pub torso_segments: usize,
    pub head_segments: usize,
    pub shoulder: ShoulderShape,
    pub has_arms: bool,
    pub has_lower_arm: bool,
    pub has_lower_leg: bool,
    pub foot: FootKind,
    /// Every weapon type drawn, in draw order, including failed attempts.
    pub weapon_draws: Vec<u32>,
}

/// Ids of the named parts of a generated figure. Pairs are `[left, right]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parts {
    pub pelvis: NodeId,
    pub torso: NodeId,
    pub head: NodeId,
    pub eyes: [NodeId; 2],
    pub shoulders: [NodeId; 2],
    pub lower_arms: Option<[NodeId; 2]>,
    pub upper_legs: [NodeId; 2],
    pub lower_legs: [NodeId; 2],
    pub feet: [NodeId; 2],
}

/// A freshly generated robot.
///
/// ### Fields
/// - `figure` - Node arena, root at [`ROOT`].
/// - `parts` - Ids of the named parts.
/// - `traits` - Structural choices, including weapon draws.
/// - `gait` - Walk cycle of the left leg; the right leg runs in antiphase.
/// - `speed` - Forward speed derived from the walk rate, `[0.25, 0.55)`.
/// - `start_ypos` - Suggested initial scroll position, `[0, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Robot {
    pub figure: Figure,
    pub parts: Parts,
    pub traits: Traits,
    pub gait: Gait,
    pub speed: f32,
    pub start_ypos: f32,
}

/// Generates the robot for `seed`.
///
/// Identical seeds always produce identical robots, down to the bit
/// patterns of every float.
pub fn generate(seed: &str) -> Robot {
    let mut g = Generator {
        rng: SeedRng::new(seed),
        figure: Figure::new(),
        weapon_draws: Vec::with_capacity(8),
    };

    let pelvis = g.pelvis();
    let torso = g.torso(&pelvis);
    let head = g.head(torso.node);
    let eyes = g.eyes(&head);
    let shoulders = g.shoulders(&torso);
    let legs = g.legs(&pelvis, &torso);
    let feet = g.feet(&legs);
    let arms = g.arms(&shoulders);
    let gait = g.gait(&legs, feet.nodes);

    // Legacy speed draw; the value is replaced by the walk-rate mapping but
    // the draw stays to keep the stream stable.
    let _ = g.rng.range(0.5, 1.0);
    let speed = speed_for_walk_rate(gait.rate);
    let start_ypos = g.rng.range(0.0, 1.0);

    let traits = Traits {
        has_pelvis: pelvis.width.is_some(),
        torso_segments: torso.widths.len() - 1,
        head_segments: head.segments,
        shoulder: shoulders.shape,
        has_arms: shoulders.has_arms,
        has_lower_arm: arms.is_some(),
        has_lower_leg: legs.has_lower,
        foot: feet.kind,
        weapon_draws: g.weapon_draws,
    };
    log::trace!("generated {seed}: {traits:?}");

    Robot {
        figure: g.figure,
        parts: Parts {
            pelvis: pelvis.node,
            torso: torso.node,
            head: head.node,
            eyes,
            shoulders: shoulders.nodes,
            lower_arms: arms,
            upper_legs: legs.upper,
            lower_legs: legs.lower,
            feet: feet.nodes,
        },
        traits,
        gait,
        speed,
        start_ypos,
    }
}

/// Maps a walk rate in `[0.001, 0.005)` onto a forward speed.
pub fn speed_for_walk_rate(walk_rate: f32) -> f32 {
    0.25 + (walk_rate - 0.001) / 0.004 * (0.65 - 0.25)
}

struct Generator {
    rng: SeedRng,
    figure: Figure,
    weapon_draws: Vec<u32>,
}

struct Pelvis {
    node: NodeId,
    /// Negative when there is no pelvis, lifting the torso.
    height: f32,
    width: Option<f32>,
}

struct Torso {
    node: NodeId,
    widths: Vec<f32>,
}

struct Head {
    node: NodeId,
    segments: usize,
    min_width: f32,
}

struct Shoulders {
    nodes: [NodeId; 2],
    shape: ShoulderShape,
    has_arms: bool,
    arm_width: f32,
}

struct Legs {
    upper: [NodeId; 2],
    lower: [NodeId; 2],
    has_lower: bool,
    lower_len: f32,
    width: f32,
}

struct Feet {
    nodes: [NodeId; 2],
    kind: FootKind,
}

#[inline]
fn translate(x: f32, y: f32) -> Affine2 {
    Affine2::from_translation(Vec2::new(x, y))
}

impl Generator {
    /// `base + below(spread)` as a float.
    #[inline]
    fn int(&mut self, base: u32, spread: u32) -> f32 {
        (base + self.rng.below(spread)) as f32
    }

    #[inline]
    fn chance(&mut self, p: f32) -> bool {
        self.rng.float01() < p
    }

    fn pelvis(&mut self) -> Pelvis {
        let node = self.figure.add_child(ROOT, Affine2::IDENTITY);
        if !self.chance(PART_CHANCE) {
            let height = -self.int(30, 20);
            return Pelvis {
                node,
                height,
                width: None,
            };
        }

        let top = self.int(50, 50);
        let mut bottom = top;
        if self.chance(0.5) {
            bottom = self.rng.range(0.75 * top, top);
        }
        let height = self.int(30, 20);
        let geom = segmented_rect(
            &[top, bottom],
            &[-height / 2.0, height / 2.0],
            Color::HULL,
            Z_PELVIS,
        );
        self.figure.node_mut(node).geometry.push(geom);
        Pelvis {
            node,
            height,
            width: Some(top),
        }
    }

    fn torso(&mut self, pelvis: &Pelvis) -> Torso {
        let segments = 1 + self.rng.below(2) as usize;
        let offs = self.int(10, 20);
        let mut widths = Vec::with_capacity(segments + 1);
        let mut heights: Vec<f32> = Vec::with_capacity(segments + 1);
        for ii in 0..=segments {
            widths.push(self.int(100, 100));
            let h = if ii == 0 {
                -offs
            } else {
                heights[ii - 1] + self.int(100, 50)
            };
            heights.push(h);
        }

        let top = heights[segments];
        let node = self
            .figure
            .add_child(pelvis.node, translate(0.0, -top - pelvis.height / 2.0));
        let geom = segmented_rect(&widths, &heights, Color::HULL, Z_TORSO);
        self.figure.node_mut(node).geometry.push(geom);
        Torso { node, widths }
    }

    fn head(&mut self, torso: NodeId) -> Head {
        let segments = 1 + self.rng.below(2) as usize;
        let mut widths = vec![0.0; segments + 1];
        widths[0] = self.int(30, 30);
        widths[segments] = self.int(30, 20);
        let max_width = widths[0].max(widths[segments]);
        let min_width = widths[0].min(widths[segments]);
        for w in widths.iter_mut().take(segments).skip(1) {
            *w = max_width + self.rng.below(15) as f32;
        }

        let mut heights = vec![0.0];
        for ii in 1..=segments {
            let h = heights[ii - 1] + self.int(30, 20);
            heights.push(h);
        }
        let size = heights[segments];
        // Origin sits in the middle of the top segment.
        let origin = heights[1] / 2.0;
        shift(&mut heights, -origin);

        let jitter = self.rng.below_f32(size - origin);
        let node = self.figure.add_child(torso, translate(0.0, -jitter));
        let bob = Bob {
            rate: self.rng.range(0.0001, 0.001),
            amplitude: self.rng.range(3.0, 10.0),
            phase: self.rng.range(0.0, TAU),
        };
        self.figure.animate(node, Animation::HeadBob(bob));
        let geom = segmented_rect(&widths, &heights, Color::HULL, Z_HEAD);
        self.figure.node_mut(node).geometry.push(geom);

        if segments > 1 {
            let index = self.weapon_type();
            let value = self.weapon_value();
            let last = heights[segments];
            let prev = heights[segments - 1];
            let hp = Hardpoint {
                w: min_width,
                h: last - prev,
                yoffs: (last + prev) / 2.0,
                lrm_y_shrink: 0.5,
                skip_mask: 0,
            };
            if let Err(e) = add_weapon(&mut self.figure.node_mut(node).mounts, index, value, &hp) {
                log::trace!("head weapon skipped: {e}");
            }
        }

        Head {
            node,
            segments,
            min_width,
        }
    }

    fn eyes(&mut self, head: &Head) -> [NodeId; 2] {
        let max_eye = head.min_width / 2.0;
        let eye_w = self.rng.range(max_eye * 0.75, max_eye);
        let half_w = eye_w / 2.0;
        let half_h = self.rng.range(eye_w / 3.0, eye_w) / 2.0;
        let mut verts = vec![
            Vec2::new(half_w, -half_h),
            Vec2::new(-half_w, -half_h),
            Vec2::new(self.rng.range(-half_w, half_w), half_h),
        ];
        if self.chance(0.5) {
            verts.push(Vec2::new(self.rng.range(-half_w, half_w), half_h));
            // Keep the top edge running right to left.
            if verts[3].x < verts[2].x {
                let t = verts[3].x;
                verts[3].x = verts[2].x;
                verts[2].x = t;
            }
        }
        let shade = self.rng.range(0.90, 0.98);
        let color = Color::from_hsv(self.rng.range(0.0, 360.0), 1.0, 1.0);
        let rot = self.rng.range(-15.0 / 180.0 * PI, 40.0 / 180.0 * PI);
        let max_sep = max_eye - eye_w;
        let sep = self.rng.range(max_sep * 0.3, max_sep * 0.7) + half_w;

        let first = self.figure.add_child(
            head.node,
            translate(-sep, 0.0) * Affine2::from_angle(rot),
        );
        let eye = fan_from_border(&verts, shade, color, Z_LIMB);
        self.figure.node_mut(first).geometry.push(eye);

        let second = self.figure.add_child(
            head.node,
            translate(sep, 0.0) * Affine2::from_angle(-rot),
        );
        mirror(&mut verts);
        let eye = fan_from_border(&verts, shade, color, Z_LIMB);
        self.figure.node_mut(second).geometry.push(eye);

        [first, second]
    }

    fn shoulders(&mut self, torso: &Torso) -> Shoulders {
        let has_arms = self.chance(PART_CHANCE);
        let arm_width = self.int(25, 20);
        let offs = torso.widths[0] / 2.0 + arm_width / 2.0 + self.int(5, 10);
        let sw = arm_width + self.int(20, 30) + if has_arms { 0.0 } else { 20.0 };
        let sh = self.rng.range(sw, sw * 1.5);

        let left = self.figure.add_child(torso.node, translate(offs, 0.0));
        let right = self.figure.add_child(torso.node, translate(-offs, 0.0));

        let mut lrm_y_shrink = 1.0;
        let (shape, outline) = self.shoulder_outline(sw, sh, &mut lrm_y_shrink);
        if let Some(mut verts) = outline {
            let plate = fan_from_border(&verts, 0.5, Color::HULL, Z_SHOULDER);
            self.figure.node_mut(right).geometry.push(plate);

            // Rarely the far shoulder gets its own outline.
            if self.rng.below(9) == 0
                && let (_, Some(other)) = self.shoulder_outline(sw, sh, &mut lrm_y_shrink)
            {
                verts = other;
            }
            mirror(&mut verts);
            let plate = fan_from_border(&verts, 0.5, Color::HULL, Z_SHOULDER);
            self.figure.node_mut(left).geometry.push(plate);

            let hp = Hardpoint {
                w: sw,
                h: sh,
                yoffs: 0.0,
                lrm_y_shrink,
                skip_mask: 0,
            };
            self.weapon_pair(left, right, &hp, 0);
        }

        Shoulders {
            nodes: [left, right],
            shape,
            has_arms,
            arm_width,
        }
    }

    /// Draws one shoulder outline. Corner cuts lower `lrm_y_shrink` so grid
    /// launchers stay inside the plate.
    fn shoulder_outline(
        &mut self,
        sw: f32,
        sh: f32,
        lrm_y_shrink: &mut f32,
    ) -> (ShoulderShape, Option<Vec<Vec2>>) {
        let (hw, hh) = (sw / 2.0, sh / 2.0);
        match self.rng.below(4) {
            0 => (ShoulderShape::None, None),
            1 => (
                ShoulderShape::Square,
                Some(vec![
                    Vec2::new(hw, -hh),
                    Vec2::new(-hw, -hh),
                    Vec2::new(-hw, hh),
                    Vec2::new(hw, hh),
                ]),
            ),
            2 => {
                let cut_h = self.rng.range(0.0, sw);
                let cut_v = self.rng.range(0.0, sh);
                *lrm_y_shrink = lrm_y_shrink.min(1.0 - (cut_h / sw - 0.5).max(0.0));
                (
                    ShoulderShape::Pentagon,
                    Some(vec![
                        Vec2::new(hw, -hh),
                        Vec2::new(-hw + cut_h, -hh),
                        Vec2::new(-hw, -hh + cut_v),
                        Vec2::new(-hw, hh),
                        Vec2::new(hw, hh),
                    ]),
                )
            }
            _ => {
                let cut_h1 = self.rng.range(0.0, sw);
                let cut_h2 = self.rng.range(0.0, sw);
                let cut_v = self.rng.range(0.0, sh * 0.4);
                *lrm_y_shrink = lrm_y_shrink.min(1.0 - (cut_h1 / sw - 0.5).max(0.0));
                (
                    ShoulderShape::Hexagon,
                    Some(vec![
                        Vec2::new(hw, -hh),
                        Vec2::new(-hw + cut_h1, -hh),
                        Vec2::new(-hw, -hh + cut_v),
                        Vec2::new(-hw, hh - cut_v),
                        Vec2::new(-hw + cut_h2, hh),
                        Vec2::new(hw, hh),
                    ]),
                )
            }
        }
    }

    fn legs(&mut self, pelvis: &Pelvis, torso: &Torso) -> Legs {
        let upper_len = self.int(60, 40);
        let width = self.int(30, 30);
        let mut offs = self.rng.below(10) as f32 + width / 2.0;
        let axle_radius = self.int(10, 6);
        let mut voffs = (pelvis.height.abs() / 2.0).min(axle_radius);
        match pelvis.width {
            Some(w) => offs += w / 2.0,
            None => {
                voffs += 30.0;
                offs += torso.widths[torso.widths.len() - 1] / 2.0;
            }
        }

        let right = self.figure.add_child(pelvis.node, translate(-offs, -voffs));
        let left = self.figure.add_child(pelvis.node, translate(offs, -voffs));
        let upper = [left, right];
        for id in upper {
            let geom = segmented_rect(&[width, width], &[0.0, upper_len], Color::HULL, Z_LIMB);
            self.figure.node_mut(id).geometry.push(geom);
        }

        let knee = translate(0.0, upper_len + 10.0);
        let lower = upper.map(|id| self.figure.add_child(id, knee));

        let has_lower = self.chance(PART_CHANCE);
        let mut lower_len = -10.0;
        if has_lower {
            lower_len = self.int(60, 40);
            let shrink = self.rng.range(0.75, 1.0);
            for id in lower {
                let geom = segmented_rect(
                    &[width, width * shrink],
                    &[0.0, lower_len],
                    Color::HULL,
                    Z_LIMB,
                );
                self.figure.node_mut(id).geometry.push(geom);
            }
        }

        Legs {
            upper,
            lower,
            has_lower,
            lower_len,
            width,
        }
    }

    fn feet(&mut self, legs: &Legs) -> Feet {
        let kind = if self.rng.below(2) == 0 {
            FootKind::Trapezoid
        } else {
            FootKind::Block
        };
        let height = self.int(30, 20);
        let (top, bottom, offs) = match kind {
            FootKind::Trapezoid => {
                let top = self.rng.below(70) as f32;
                let bottom = self.rng.range(legs.width.max(top), 120.0);
                (top, bottom, -10.0)
            }
            FootKind::Block => {
                let top = self.rng.range(50.0, 70.0);
                let bottom = self.rng.range(legs.width.max(top), 70.0);
                (top, bottom, self.int(2, 5))
            }
        };

        let ankle = translate(0.0, legs.lower_len + offs);
        let nodes = legs.lower.map(|id| self.figure.add_child(id, ankle));
        for id in nodes {
            let geom = segmented_rect(&[top, bottom], &[0.0, height], Color::HULL, Z_LIMB);
            self.figure.node_mut(id).geometry.push(geom);
        }
        Feet { nodes, kind }
    }

    /// Adds arms under the shoulder mounts. Returns the lower-arm ids when
    /// a lower segment was grown.
    fn arms(&mut self, shoulders: &Shoulders) -> Option<[NodeId; 2]> {
        if !shoulders.has_arms {
            return None;
        }
        let w = shoulders.arm_width;
        let upper_len = self.int(60, 40);
        for id in shoulders.nodes {
            let geom = segmented_rect(&[w, w], &[0.0, upper_len], Color::HULL, Z_ARM);
            self.figure.node_mut(id).geometry.push(geom);
        }

        let [left, right] = shoulders.nodes;
        if !self.chance(PART_CHANCE) {
            // No forearm: the upper arm carries the weapons instead.
            let hp = Hardpoint {
                w,
                h: upper_len,
                yoffs: upper_len / 2.0,
                lrm_y_shrink: 1.0,
                skip_mask: SKIP_GRID,
            };
            self.weapon_pair(left, right, &hp, ARM_WEAPON_RETRIES);
            return None;
        }

        let lower_len = self.rng.range(20.0, upper_len);
        let elbow = translate(0.0, upper_len + 5.0);
        let lower = shoulders.nodes.map(|id| self.figure.add_child(id, elbow));
        for id in lower {
            let geom = segmented_rect(&[w, w], &[0.0, lower_len], Color::HULL, Z_ARM);
            self.figure.node_mut(id).geometry.push(geom);
        }
        let hp = Hardpoint {
            w,
            h: lower_len,
            yoffs: lower_len / 2.0,
            lrm_y_shrink: 1.0,
            skip_mask: SKIP_GRID,
        };
        self.weapon_pair(lower[0], lower[1], &hp, ARM_WEAPON_RETRIES);
        Some(lower)
    }

    /// Draws the walk cycle and attaches it to both leg chains.
    fn gait(&mut self, legs: &Legs, feet: [NodeId; 2]) -> Gait {
        let gait = Gait {
            rate: self.rng.range(0.001, 0.004),
            phase: self.rng.range(0.0, TAU),
        };
        for (side, g) in [gait, gait.opposite()].into_iter().enumerate() {
            self.figure.animate(legs.upper[side], Animation::UpperLeg(g));
            self.figure.animate(legs.lower[side], Animation::LowerLeg(g));
            self.figure.animate(feet[side], Animation::Foot(g));
        }
        gait
    }

    /// Arms a pair of mirrored parts; see [`arm_pair`].
    fn weapon_pair(&mut self, first: NodeId, second: NodeId, hp: &Hardpoint, retries: u32) {
        let [a, b] = arm_pair(self, hp, retries);
        self.figure.node_mut(first).mounts.extend(a);
        self.figure.node_mut(second).mounts.extend(b);
    }
}

/// Draws consumed while arming a pair of parts, in stream order.
trait PairDraws {
    /// Weapon type in `[0, WEAPON_DRAW_RANGE)`.
    fn weapon_type(&mut self) -> u32;
    /// Size value in `[0, 1)`.
    fn weapon_value(&mut self) -> f32;
    /// How the second part is armed, in `[0, 5)`.
    fn pairing(&mut self) -> u32;
}

impl PairDraws for Generator {
    fn weapon_type(&mut self) -> u32 {
        let index = self.rng.below(WEAPON_DRAW_RANGE);
        self.weapon_draws.push(index);
        index
    }

    fn weapon_value(&mut self) -> f32 {
        self.rng.float01()
    }

    fn pairing(&mut self) -> u32 {
        self.rng.below(5)
    }
}

/// Places weapons on a pair of mirrored parts.
///
/// The first part redraws its type up to `retries` times until a placement
/// succeeds, keeping the first size value; once the budget is spent it stays
/// empty. The second part then copies type and value (3 in 5), gets a single
/// independent attempt (1 in 5), or stays empty.
///
/// ### Returns
/// The mounts for `[first, second]`.
fn arm_pair(draws: &mut impl PairDraws, hp: &Hardpoint, mut retries: u32) -> [Vec<WeaponMount>; 2] {
    let mut first = Vec::new();
    let mut index = draws.weapon_type();
    let value = draws.weapon_value();
    loop {
        match add_weapon(&mut first, index, value, hp) {
            Ok(_) => break,
            Err(e) if retries > 0 => {
                log::trace!("weapon rejected ({e}), {retries} retries left");
                index = draws.weapon_type();
                retries -= 1;
            }
            Err(e) => {
                log::trace!("first part left unarmed: {e}");
                break;
            }
        }
    }

    let mut second = Vec::new();
    let (index, value) = match draws.pairing() {
        0..=2 => (index, value),
        3 => (draws.weapon_type(), draws.weapon_value()),
        _ => return [first, second],
    };
    if let Err(e) = add_weapon(&mut second, index, value, hp) {
        log::trace!("second part left unarmed: {e}");
    }
    [first, second]
}
