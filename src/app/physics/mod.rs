mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use forces::{accumulate_charge, accumulate_collisions};
use quadtree::QuadNode;

const LINK_DISTANCE: f32 = 100.0;
const LINK_STRENGTH: f32 = 0.3;
const CHARGE_STRENGTH: f32 = -5.0;
const CENTER_STRENGTH: f32 = 0.1;
const COLLIDE_RADIUS: f32 = 30.0;
const COLLIDE_STRENGTH: f32 = 0.2;
const VELOCITY_DECAY: f32 = 0.4;
const ALPHA_DECAY: f32 = 0.05;
const ALPHA_MIN: f32 = 0.001;
const BARNES_HUT_THETA: f32 = 0.9;

/// Alpha target applied while a node drag is in progress so the layout
/// stays responsive; must be restored to 0 when the drag ends.
pub const DRAG_ALPHA_TARGET: f32 = 0.1;

/// Mutable per-node simulation state, addressed by the same index as the
/// immutable node metadata. `fx`/`fy`, when set, lock the position against
/// the integrator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhysicsBody {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
}

impl PhysicsBody {
    pub fn at(position: Vec2) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Vec2 {
        vec2(self.x, self.y)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() && self.fy.is_some()
    }

    pub fn pin_at(&mut self, position: Vec2) {
        self.fx = Some(position.x);
        self.fy = Some(position.y);
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }
}

/// Force-directed layout over one rebuilt node/edge set: link springs,
/// Barnes-Hut many-body charge, centering toward the viewport midpoint, and
/// collision separation, integrated with velocity decay and a decaying
/// alpha. One instance ticks at a time; `stop()` is final and must be
/// called before a replacement instance starts.
pub struct Simulation {
    bodies: Vec<PhysicsBody>,
    links: Vec<(usize, usize)>,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    stopped: bool,
    scratch_positions: Vec<Vec2>,
    scratch_kicks: Vec<Vec2>,
}

impl Simulation {
    pub fn start(bodies: Vec<PhysicsBody>, links: Vec<(usize, usize)>, width: f32, height: f32) -> Self {
        let body_count = bodies.len();
        let links = links
            .into_iter()
            .filter(|&(a, b)| a < body_count && b < body_count && a != b)
            .collect();

        Self {
            bodies,
            links,
            center: vec2(width * 0.5, height * 0.5),
            alpha: 1.0,
            alpha_target: 0.0,
            stopped: false,
            scratch_positions: Vec::new(),
            scratch_kicks: Vec::new(),
        }
    }

    pub fn bodies(&self) -> &[PhysicsBody] {
        &self.bodies
    }

    pub fn body_mut(&mut self, index: usize) -> Option<&mut PhysicsBody> {
        self.bodies.get_mut(index)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Permanently stops this instance. A stopped simulation never mutates
    /// its bodies again, so a stale handle cannot corrupt a newer render
    /// pass.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Integrates one step. Returns false when stopped or settled; a false
    /// return guarantees no body changed.
    pub fn tick(&mut self) -> bool {
        if self.stopped || self.bodies.is_empty() {
            return false;
        }
        if self.alpha < ALPHA_MIN && self.alpha_target < ALPHA_MIN {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;

        self.scratch_positions.clear();
        self.scratch_positions
            .extend(self.bodies.iter().map(PhysicsBody::position));
        let positions = &self.scratch_positions;

        // Link springs toward the rest distance, split evenly across both
        // endpoints.
        for &(a, b) in &self.links {
            let delta = positions[b] - positions[a];
            let distance = delta.length().max(0.01);
            let stretch = (distance - LINK_DISTANCE) / distance * LINK_STRENGTH * self.alpha;
            let correction = delta * (stretch * 0.5);
            self.bodies[a].vx += correction.x;
            self.bodies[a].vy += correction.y;
            self.bodies[b].vx -= correction.x;
            self.bodies[b].vy -= correction.y;
        }

        if let Some(tree) = QuadNode::build(positions) {
            let charge = CHARGE_STRENGTH * self.alpha;
            for index in 0..self.bodies.len() {
                let mut kick = Vec2::ZERO;
                accumulate_charge(&tree, index, positions, charge, BARNES_HUT_THETA, &mut kick);
                self.bodies[index].vx += kick.x;
                self.bodies[index].vy += kick.y;
            }

            self.scratch_kicks.clear();
            self.scratch_kicks.resize(self.bodies.len(), Vec2::ZERO);
            accumulate_collisions(
                &tree,
                positions,
                COLLIDE_RADIUS,
                COLLIDE_STRENGTH,
                &mut self.scratch_kicks,
            );
            for (body, kick) in self.bodies.iter_mut().zip(&self.scratch_kicks) {
                body.vx += kick.x;
                body.vy += kick.y;
            }
        }

        // Centering shifts every position so the centroid eases toward the
        // viewport midpoint; pinned bodies snap back during integration.
        let mut centroid = Vec2::ZERO;
        for body in &self.bodies {
            centroid += body.position();
        }
        centroid /= self.bodies.len() as f32;
        let shift = (centroid - self.center) * CENTER_STRENGTH;

        for body in &mut self.bodies {
            if let (Some(fx), Some(fy)) = (body.fx, body.fy) {
                body.x = fx;
                body.y = fy;
                body.vx = 0.0;
                body.vy = 0.0;
                continue;
            }

            body.x -= shift.x;
            body.y -= shift.y;
            body.vx *= 1.0 - VELOCITY_DECAY;
            body.vy *= 1.0 - VELOCITY_DECAY;
            body.x += body.vx;
            body.y += body.vy;
        }

        true
    }
}
