use glam::{Affine2, Vec2};
use robo_core::{
    animation::{LOWER_FLEX, UPPER_FLEX},
    figure::Figure,
    generator::{FootKind, Robot, ShoulderShape, Traits, generate},
    types::{NodeId, ROOT},
    weapon::WeaponKind,
};
use std::collections::HashSet;

const SEEDS: [&str; 6] = ["robo54", "robo55", "robo60", "unit-1", "unit-2", "x"];
const TIMES: [f64; 4] = [0.0, 16.7, 1234.5, 98_765.0];

/// Recomputes a node's world transform straight from the root path.
fn reference_world(f: &Figure, id: NodeId, root: Affine2) -> Affine2 {
    match f.node(id).parent {
        Some(p) => reference_world(f, p, root) * f.node(id).local,
        None => root * f.node(id).local,
    }
}

fn close(a: Affine2, b: Affine2, eps: f32) -> bool {
    a.matrix2.x_axis.abs_diff_eq(b.matrix2.x_axis, eps)
        && a.matrix2.y_axis.abs_diff_eq(b.matrix2.y_axis, eps)
        && a.translation.abs_diff_eq(b.translation, eps)
}

#[test]
fn generation_is_deterministic() {
    for seed in SEEDS {
        let a = generate(seed);
        let b = generate(seed);
        assert_eq!(a.traits, b.traits, "{seed}");
        assert_eq!(a.figure.nodes.len(), b.figure.nodes.len());
        for (na, nb) in a.figure.nodes.iter().zip(&b.figure.nodes) {
            assert_eq!(na.local, nb.local);
            assert_eq!(na.children, nb.children);
            assert_eq!(na.mounts, nb.mounts);
            for (ga, gb) in na.geometry.iter().zip(&nb.geometry) {
                assert_eq!(ga.color, gb.color);
                assert_eq!(ga.h.to_bits(), gb.h.to_bits());
                for (va, vb) in ga.fan.verts.iter().zip(&gb.fan.verts) {
                    assert_eq!(va.pos.x.to_bits(), vb.pos.x.to_bits());
                    assert_eq!(va.pos.y.to_bits(), vb.pos.y.to_bits());
                }
            }
        }
        assert_eq!(a.speed.to_bits(), b.speed.to_bits());
    }
}

/// Torso boundary widths and heights, read back from the left rim of the
/// torso fan.
fn torso_profile(r: &Robot) -> (Vec<f32>, Vec<f32>) {
    let fan = &r.figure.node(r.parts.torso).geometry[0].fan;
    fan.verts[1..=r.traits.torso_segments + 1]
        .iter()
        .map(|v| (-2.0 * v.pos.x, v.pos.y))
        .unzip()
}

#[test]
fn robo54_matches_recorded_build() {
    let r = generate("robo54");
    assert_eq!(
        r.traits,
        Traits {
            has_pelvis: true,
            torso_segments: 1,
            head_segments: 1,
            shoulder: ShoulderShape::None,
            has_arms: true,
            has_lower_arm: true,
            has_lower_leg: true,
            foot: FootKind::Trapezoid,
            weapon_draws: vec![3, 2],
        }
    );
    assert_eq!(torso_profile(&r), (vec![183.0, 188.0], vec![-12.0, 90.0]));

    // Small lasers on the first forearm, the second redrew a medium laser.
    let lower = r.parts.lower_arms.expect("robo54 grows forearms");
    let kinds = |id: NodeId| -> Vec<WeaponKind> {
        r.figure.node(id).mounts.iter().map(|m| m.kind).collect()
    };
    assert_eq!(kinds(lower[0]), vec![WeaponKind::SmallLasers; 2]);
    assert_eq!(kinds(lower[1]), vec![WeaponKind::MediumLaser]);
}

#[test]
fn unit_1_matches_recorded_build() {
    let r = generate("unit-1");
    assert_eq!(
        r.traits,
        Traits {
            has_pelvis: true,
            torso_segments: 1,
            head_segments: 1,
            shoulder: ShoulderShape::None,
            has_arms: true,
            has_lower_arm: false,
            has_lower_leg: true,
            foot: FootKind::Block,
            // Grid launcher masked on the upper arm, then an empty draw.
            weapon_draws: vec![4, 0, 2],
        }
    );
    assert_eq!(torso_profile(&r), (vec![180.0, 177.0], vec![-11.0, 124.0]));
    let first = r.figure.node(r.parts.shoulders[0]);
    assert_eq!(first.mounts.len(), 1);
    assert_eq!(first.mounts[0].kind, WeaponKind::MediumLaser);
}

#[test]
fn robo7_matches_recorded_build() {
    let r = generate("robo7");
    assert_eq!(
        r.traits,
        Traits {
            has_pelvis: false,
            torso_segments: 1,
            head_segments: 2,
            shoulder: ShoulderShape::Pentagon,
            has_arms: true,
            has_lower_arm: true,
            has_lower_leg: true,
            foot: FootKind::Block,
            weapon_draws: vec![2, 3, 2, 4, 3],
        }
    );
    assert_eq!(torso_profile(&r), (vec![182.0, 170.0], vec![-14.0, 112.0]));
}

#[test]
fn every_node_is_reached_exactly_once() {
    for seed in SEEDS {
        let r = generate(seed);
        let f = &r.figure;
        let order: Vec<NodeId> = f.preorder().collect();
        let unique: HashSet<NodeId> = order.iter().copied().collect();
        assert_eq!(order.len(), f.nodes.len(), "{seed}");
        assert_eq!(unique.len(), f.nodes.len(), "{seed}");
        assert_eq!(order[0], ROOT);

        let mut owners = vec![0usize; f.nodes.len()];
        for node in &f.nodes {
            for &c in &node.children {
                owners[c] += 1;
            }
        }
        assert_eq!(owners[ROOT], 0);
        assert!(owners[1..].iter().all(|&n| n == 1), "{seed}");
        for (id, node) in f.nodes.iter().enumerate().skip(1) {
            let parent = node.parent.expect("non-root node without parent");
            assert!(f.node(parent).children.contains(&id));
        }
    }
}

#[test]
fn world_transforms_match_root_path() {
    let root = Affine2::from_translation(Vec2::new(400.0, 250.0))
        * Affine2::from_scale(Vec2::splat(0.6));
    for seed in SEEDS {
        let mut r = generate(seed);
        for t in TIMES {
            r.figure.tick(root, t);
            for id in 0..r.figure.nodes.len() {
                let expected = reference_world(&r.figure, id, root);
                assert!(
                    close(r.figure.node(id).world, expected, 1e-3),
                    "{seed} t={t} node {id}"
                );
            }
        }
    }
}

#[test]
fn foot_position_repeats_every_gait_period() {
    for seed in SEEDS {
        let mut r = generate(seed);
        let period = r.gait.period();
        for t in [0.0, 250.0, 777.0] {
            r.figure.tick(Affine2::IDENTITY, t);
            let before = r.parts.feet.map(|id| r.figure.node(id).world.translation.y);
            r.figure.tick(Affine2::IDENTITY, t + period);
            let after = r.parts.feet.map(|id| r.figure.node(id).world.translation.y);
            for side in 0..2 {
                assert!(
                    (before[side] - after[side]).abs() < 1e-2,
                    "{seed} t={t}: {} vs {}",
                    before[side],
                    after[side]
                );
            }
        }
    }
}

#[test]
fn foot_scale_is_compensated() {
    for seed in SEEDS {
        let mut r = generate(seed);
        for i in 0..50u32 {
            let t = f64::from(i) * 97.0;
            r.figure.tick(Affine2::IDENTITY, t);
            for id in r.parts.feet {
                let sy = r.figure.node(id).world.matrix2.y_axis.y;
                assert!((sy - 1.0).abs() < 1e-4, "{seed} t={t}: foot scale {sy}");
            }
        }
    }
}

#[test]
fn foot_stays_near_rest_pose() {
    for seed in SEEDS {
        let mut r = generate(seed);
        // Rest pose: every leg node at its base transform.
        let mut rest = r.figure.clone();
        for node in &mut rest.nodes {
            if let Some(base) = node.base {
                node.local = base;
            }
            node.animation = Default::default();
        }
        rest.tick(Affine2::IDENTITY, 0.0);

        for i in 0..40u32 {
            let t = f64::from(i) * 131.0;
            r.figure.tick(Affine2::IDENTITY, t);
            for side in 0..2 {
                let gait = if side == 0 { r.gait } else { r.gait.opposite() };
                let knee = r.figure.node(r.parts.lower_legs[side]).local.translation.y;
                let ankle = r.figure.node(r.parts.feet[side]).local.translation.y;
                let id = r.parts.feet[side];
                let dy = r.figure.node(id).world.translation.y - rest.node(id).world.translation.y;

                // The knee moves with the upper-leg flex and the ankle with
                // the shin flex; the foot itself is never stretched.
                let expected =
                    (gait.upper_scale(t) - 1.0) * knee + (gait.lower_flex(t) - 1.0) * ankle;
                assert!((dy - expected).abs() < 1e-2, "{seed} t={t}: {dy} vs {expected}");

                let bound = 2.0 * UPPER_FLEX * knee.abs() + 2.0 * LOWER_FLEX * ankle.abs();
                assert!(dy.abs() <= bound + 1e-3, "{seed} t={t}: {dy} > {bound}");
            }
        }
    }
}
