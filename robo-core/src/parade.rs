//! Population manager: a fixed number of robots marching down the screen.
//!
//! The typical frame looks like:
//! 1. [`Parade::advance`] — scroll every robot; robots past the retire
//!    bound are released and replaced in the same slot.
//! 2. Tick pass — animate each figure and measure its lowest point.
//! 3. Draw pass — anchor the figure so its lowest point sits on its lane
//!    position and queue its draw commands.
//!
//! [`Parade::tick`] runs all three.

use crate::{
    config::ParadeConfig,
    error::ConfigError,
    generator::{Robot, generate},
    render::{DrawQueue, MeshBackend},
};
use glam::{Affine2, Vec2};
use log::debug;

/// Screen rectangle the parade is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x0: f32,
    pub y0: f32,
    pub w: f32,
    pub h: f32,
}

impl Viewport {
    pub fn new(x0: f32, y0: f32, w: f32, h: f32) -> Self {
        Self { x0, y0, w, h }
    }
}

/// One live robot and its lane state.
///
/// ### Fields
/// - `index` - Spawn index the seed was built from.
/// - `seed` - Seed string passed to the generator.
/// - `robot` - Generated figure and its traits.
/// - `xpos` - Lane slot in `[0, 1]`, fixed for the unit's lifetime.
/// - `ypos` - Scroll position; the unit is replaced once it passes the
///   retire bound.
/// - `speed` - Scroll speed.
/// - `anchor` - Screen transform used for the last draw.
#[derive(Debug, Clone)]
pub struct Unit {
    pub index: u64,
    pub seed: String,
    pub robot: Robot,
    pub xpos: f32,
    pub ypos: f32,
    pub speed: f32,
    pub anchor: Affine2,
}

impl Unit {
    /// Releases every mesh of the figure. Safe to call more than once.
    pub fn release(&mut self, backend: &mut impl MeshBackend) {
        self.robot.figure.release(backend);
    }
}

/// The live population and the spawn counter.
#[derive(Debug)]
pub struct Parade {
    cfg: ParadeConfig,
    units: Vec<Unit>,
    next_index: u64,
}

impl Parade {
    /// Builds the starting grid.
    ///
    /// ### Returns
    /// An error if `cfg` fails [`ParadeConfig::validate`].
    pub fn new(cfg: ParadeConfig, backend: &mut impl MeshBackend) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let mut parade = Self {
            next_index: cfg.first_seed_index,
            cfg,
            units: Vec::new(),
        };
        parade.populate(backend);
        Ok(parade)
    }

    pub fn config(&self) -> &ParadeConfig {
        &self.cfg
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Index the next spawned robot will use.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    pub fn endless(&self) -> bool {
        self.cfg.endless
    }

    /// Releases every robot and builds a fresh grid with new seeds.
    pub fn reset(&mut self, backend: &mut impl MeshBackend) {
        self.clear(backend);
        self.populate(backend);
    }

    /// Switches between the scrolling and the static layout and rebuilds.
    pub fn set_endless(&mut self, endless: bool, backend: &mut impl MeshBackend) {
        self.cfg.endless = endless;
        self.reset(backend);
    }

    /// Replaces the settings and rebuilds the grid.
    ///
    /// A changed `first_seed_index` restarts the spawn counter there;
    /// otherwise numbering continues. On error the current settings and
    /// population are kept.
    pub fn set_config(
        &mut self,
        cfg: ParadeConfig,
        backend: &mut impl MeshBackend,
    ) -> Result<(), ConfigError> {
        cfg.validate()?;
        if cfg.first_seed_index != self.cfg.first_seed_index {
            self.next_index = cfg.first_seed_index;
        }
        self.cfg = cfg;
        self.reset(backend);
        Ok(())
    }

    /// Releases and removes every robot.
    pub fn clear(&mut self, backend: &mut impl MeshBackend) {
        for unit in &mut self.units {
            unit.release(backend);
        }
        self.units.clear();
    }

    /// Scrolls every robot and recycles the ones past the retire bound.
    ///
    /// Does nothing outside endless mode. A retired robot is replaced in
    /// the same slot before this returns, so the population never shrinks.
    ///
    /// ### Parameters
    /// - `dt` - Frame delta.
    /// - `backend` - Receives disposals of retired meshes and uploads of
    ///   new ones.
    ///
    /// ### Returns
    /// The number of robots replaced.
    pub fn advance(&mut self, dt: f32, backend: &mut impl MeshBackend) -> usize {
        if !self.cfg.endless {
            return 0;
        }
        let mut retired = 0;
        for slot in 0..self.units.len() {
            let (xpos, done) = {
                let unit = &mut self.units[slot];
                unit.ypos += unit.speed * dt * self.cfg.advance_scale;
                (unit.xpos, unit.ypos > self.cfg.retire_bound)
            };
            if !done {
                continue;
            }
            let fresh = self.spawn(xpos, 0.0, backend);
            let mut old = std::mem::replace(&mut self.units[slot], fresh);
            old.release(backend);
            debug!("retired {} from lane {xpos:.3}", old.seed);
            retired += 1;
        }
        retired
    }

    /// Runs a whole frame: advance, tick pass and draw pass.
    ///
    /// ### Parameters
    /// - `dt` - Frame delta in milliseconds.
    /// - `now` - Frame timestamp in milliseconds, drives all animation.
    /// - `viewport` - Screen rectangle to lay the lanes out in.
    /// - `backend` - Mesh collaborator for spawns and retirements.
    /// - `queue` - Receives this frame's draw commands.
    pub fn tick(
        &mut self,
        dt: f32,
        now: f64,
        viewport: &Viewport,
        backend: &mut impl MeshBackend,
        queue: &mut DrawQueue,
    ) {
        self.advance(dt, backend);
        let scale = self.cfg.unit_scale;
        for unit in &mut self.units {
            let mut max_y = unit.robot.figure.tick(Affine2::IDENTITY, now);
            if !max_y.is_finite() {
                max_y = 0.0;
            }
            let lane = self.cfg.lane_position(unit.xpos, unit.ypos, viewport);
            unit.anchor = Affine2::from_translation(Vec2::new(lane.x, lane.y - max_y * scale))
                * Affine2::from_scale(Vec2::splat(scale));
            unit.robot.figure.draw(unit.anchor, lane.y, queue);
        }
    }

    /// Fills the grid column by column, bottom row first.
    fn populate(&mut self, backend: &mut impl MeshBackend) {
        let slots = self.cfg.population();
        self.units.reserve(slots);
        let mut idx = 0;
        for _ in 0..self.cfg.cols {
            for row in (0..self.cfg.rows).rev() {
                let xpos = idx as f32 / (slots - 1) as f32;
                idx += 1;
                let mut unit = self.spawn(xpos, 0.0, backend);
                unit.ypos = if self.cfg.endless {
                    unit.robot.start_ypos
                } else {
                    (row + 1) as f32 / self.cfg.rows as f32
                };
                self.units.push(unit);
            }
        }
        debug!(
            "populated {} robots, next seed index {}",
            self.units.len(),
            self.next_index
        );
    }

    fn spawn(&mut self, xpos: f32, ypos: f32, backend: &mut impl MeshBackend) -> Unit {
        let index = self.next_index;
        self.next_index += 1;
        let seed = format!("{}{}", self.cfg.seed_prefix, index);
        let mut robot = generate(&seed);
        robot.figure.upload(backend);
        debug!("spawned {seed} in lane {xpos:.3}");
        Unit {
            index,
            speed: robot.speed,
            seed,
            robot,
            xpos,
            ypos,
            anchor: Affine2::IDENTITY,
        }
    }
}

impl ParadeConfig {
    /// Screen position of a lane slot: `x` from the slot, `y` from the
    /// scroll position.
    pub fn lane_position(&self, xpos: f32, ypos: f32, viewport: &Viewport) -> Vec2 {
        let x = if self.endless {
            viewport.x0 + (self.lane_margin + self.lane_span * xpos) * viewport.w
        } else {
            self.fixed_x0 + self.fixed_span * xpos
        };
        Vec2::new(x, viewport.y0 + ypos * viewport.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CountingBackend;

    const VIEW: Viewport = Viewport {
        x0: 0.0,
        y0: 0.0,
        w: 1000.0,
        h: 1000.0,
    };

    fn geometry_count(p: &Parade) -> usize {
        p.units()
            .iter()
            .flat_map(|u| &u.robot.figure.nodes)
            .map(|n| n.geometry.len())
            .sum()
    }

    #[test]
    fn new_builds_full_grid() {
        let mut backend = CountingBackend::new();
        let p = Parade::new(ParadeConfig::default(), &mut backend).unwrap();
        assert_eq!(p.len(), 9);
        assert_eq!(p.next_index(), 54 + 9);
        assert_eq!(p.units()[0].seed, "robo54");
        let indices: Vec<u64> = p.units().iter().map(|u| u.index).collect();
        assert_eq!(indices, (54..63).collect::<Vec<_>>());
        assert_eq!(p.units()[0].xpos, 0.0);
        assert_eq!(p.units()[8].xpos, 1.0);
        assert_eq!(backend.live(), geometry_count(&p));
    }

    #[test]
    fn static_grid_uses_row_positions() {
        let mut backend = CountingBackend::new();
        let cfg = ParadeConfig {
            endless: false,
            ..ParadeConfig::default()
        };
        let mut p = Parade::new(cfg, &mut backend).unwrap();
        let ys: Vec<f32> = p.units().iter().take(3).map(|u| u.ypos).collect();
        assert_eq!(ys, vec![1.0, 2.0 / 3.0, 1.0 / 3.0]);

        // Static grids never scroll.
        assert_eq!(p.advance(1.0e9, &mut backend), 0);
        assert_eq!(p.units()[0].ypos, 1.0);
    }

    #[test]
    fn advance_moves_by_speed_dt_and_scale() {
        let mut backend = CountingBackend::new();
        let cfg = ParadeConfig {
            advance_scale: 1.0,
            ..ParadeConfig::default()
        };
        let mut p = Parade::new(cfg, &mut backend).unwrap();
        let unit = &mut p.units_mut()[0];
        unit.xpos = 0.0;
        unit.ypos = 0.0;
        unit.speed = 0.5;

        p.advance(0.1, &mut backend);
        assert!((p.units()[0].ypos - 0.05).abs() < 1e-6);
    }

    #[test]
    fn crossing_units_are_replaced_in_place() {
        let mut backend = CountingBackend::new();
        let mut p = Parade::new(ParadeConfig::default(), &mut backend).unwrap();
        let old_seed = p.units()[4].seed.clone();
        let xpos = p.units()[4].xpos;
        p.units_mut()[4].ypos = 1.339_99;
        p.units_mut()[4].speed = 1.0;

        let retired = p.advance(10.0, &mut backend);
        assert!(retired >= 1);
        assert_eq!(p.len(), 9);
        let fresh = &p.units()[4];
        assert_ne!(fresh.seed, old_seed);
        assert_eq!(fresh.xpos, xpos);
        assert_eq!(fresh.ypos, 0.0);
        assert_eq!(backend.live(), geometry_count(&p));
    }

    #[test]
    fn population_is_constant_over_many_frames() {
        let mut backend = CountingBackend::new();
        let mut p = Parade::new(ParadeConfig::default(), &mut backend).unwrap();
        let mut queue = DrawQueue::new();
        let mut now = 0.0;
        let mut total_retired = 0;
        for _ in 0..400 {
            now += 250.0;
            total_retired += p.advance(250.0, &mut backend);
            assert_eq!(p.len(), 9);
            p.tick(0.0, now, &VIEW, &mut backend, &mut queue);
            queue.clear();
        }
        assert!(total_retired > 0);
        assert_eq!(p.next_index(), 54 + 9 + total_retired as u64);
        assert_eq!(backend.live(), geometry_count(&p));
    }

    #[test]
    fn tick_anchors_lowest_point_on_lane() {
        let mut backend = CountingBackend::new();
        let mut p = Parade::new(ParadeConfig::default(), &mut backend).unwrap();
        let mut queue = DrawQueue::new();
        p.tick(0.0, 1234.0, &VIEW, &mut backend, &mut queue);
        assert!(!queue.is_empty());

        for unit in p.units() {
            let max_y = unit.robot.figure.node(crate::types::ROOT).extent;
            let lane = p.config().lane_position(unit.xpos, unit.ypos, &VIEW);
            let lowest = unit.anchor.transform_point2(Vec2::new(0.0, max_y));
            assert!((lowest.y - lane.y).abs() < 1e-2, "{}", unit.seed);
            assert!((lowest.x - lane.x).abs() < 1e-3);
        }
    }

    #[test]
    fn reset_releases_and_reseeds() {
        let mut backend = CountingBackend::new();
        let mut p = Parade::new(ParadeConfig::default(), &mut backend).unwrap();
        let first = p.units()[0].seed.clone();
        p.reset(&mut backend);
        assert_eq!(p.len(), 9);
        assert_ne!(p.units()[0].seed, first);
        assert_eq!(backend.live(), geometry_count(&p));

        p.clear(&mut backend);
        assert!(p.is_empty());
        assert_eq!(backend.live(), 0);
    }

    #[test]
    fn set_config_rejects_invalid_settings() {
        let mut backend = CountingBackend::new();
        let mut p = Parade::new(ParadeConfig::default(), &mut backend).unwrap();
        let bad = ParadeConfig {
            unit_scale: -1.0,
            ..ParadeConfig::default()
        };
        assert!(p.set_config(bad, &mut backend).is_err());
        assert_eq!(p.config(), &ParadeConfig::default());
        assert_eq!(p.len(), 9);

        p.set_endless(false, &mut backend);
        assert!(!p.endless());
        assert_eq!(p.len(), 9);
    }

    #[test]
    fn set_config_restarts_numbering_at_new_first_index() {
        let mut backend = CountingBackend::new();
        let mut p = Parade::new(ParadeConfig::default(), &mut backend).unwrap();
        let cfg = ParadeConfig {
            first_seed_index: 1000,
            ..ParadeConfig::default()
        };
        p.set_config(cfg.clone(), &mut backend).unwrap();
        assert_eq!(p.units()[0].seed, "robo1000");
        assert_eq!(p.units()[0].index, 1000);
        assert_eq!(p.next_index(), 1009);
        assert_eq!(backend.live(), geometry_count(&p));

        // Same first index: numbering carries on.
        p.set_config(cfg, &mut backend).unwrap();
        assert_eq!(p.units()[0].seed, "robo1009");
        assert_eq!(p.next_index(), 1018);
    }
}
