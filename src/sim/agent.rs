//! Navigation/combat state machine for AI-controlled entities
//!
//! Three states drive an agent: `Seek` works waypoints from the external
//! path-finder, `Chase` walks straight at a visible target, `Stall` holds
//! position and fires once the target is close. Transitions hang entirely
//! off two queries: body-to-point visibility against the wall list and
//! straight-line distance to the target.
//!
//! The caller guarantees `destination` points at a live target each tick;
//! the state machine never checks target liveness itself.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyKind};
use super::collision::body_sees_point;
use super::grid::{Pathfinder, TileGrid};
use crate::consts::TILE_SIZE;
use crate::tuning::Tuning;
use crate::{Facing, direction_to};

/// Behavior state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    /// No tracked sightline; follow path-finder waypoints toward the target
    Seek,
    /// Target visible; walk straight at it
    Chase,
    /// Target visible and close; stop and fire
    Stall,
}

/// What one decision step produced, for the physics and audio layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentStep {
    /// Displacement applied to the body this tick (resolver input)
    pub delta: Vec2,
    /// Aim angle of a shot released this tick
    pub fire: Option<f32>,
    /// Sprite orientation bucket for the renderer
    pub facing: Facing,
    /// Movement edges for the audio collaborator
    pub started_moving: bool,
    pub stopped_moving: bool,
}

/// An AI-controlled entity: a body plus the navigation/combat fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
    pub body: Body,
    pub speed: f32,
    pub health: i32,
    pub state: AgentState,
    /// Ultimate target position, refreshed by the caller every tick
    pub destination: Vec2,
    /// Current local waypoint
    pub step_dest: Vec2,
    /// Cooldown before the next path-finder call, seconds
    pub delta_find: f32,
    /// Cooldown before the next shot, seconds
    pub shoot_delay: f32,
    /// Current aim angle
    pub shooting_alpha: f32,
    /// Whether the agent moved last tick (for start/stop edges)
    pub moving: bool,
}

impl Agent {
    pub fn new(id: u32, position: Vec2, tuning: &Tuning) -> Self {
        let mut body = Body::new(BodyKind::Enemy, position, Vec2::splat(TILE_SIZE));
        // Narrower, slightly shorter box than the sprite so agents slip
        // through single-tile doorways
        body.collision_box.x = TILE_SIZE / 2.0 + 2.0;
        body.collision_box.y -= 2.0;
        body.update_mesh();

        Self {
            id,
            body,
            speed: tuning.enemy_speed,
            health: tuning.enemy_health,
            state: AgentState::Seek,
            destination: position,
            step_dest: position,
            delta_find: 0.0,
            shoot_delay: 0.0,
            shooting_alpha: 0.0,
            moving: false,
        }
    }

    /// Point the agent at its target for this tick.
    pub fn set_destination(&mut self, destination: Vec2) {
        self.destination = destination;
    }

    /// Run one decision step: pick a movement target per the current
    /// state, apply the displacement, handle transitions, tick cooldowns.
    ///
    /// Visibility and distance read the state as of the start of the call
    /// (the mesh is only refreshed at the end), so all agents in a tick
    /// observe the same snapshot.
    pub fn drive(
        &mut self,
        dt: f32,
        obstacles: &[Body],
        grid: &TileGrid,
        pathfinder: &impl Pathfinder,
        tuning: &Tuning,
    ) -> AgentStep {
        let mut step = AgentStep::default();

        match self.state {
            AgentState::Seek => self.seek(dt, &mut step, obstacles, grid, pathfinder, tuning),
            AgentState::Chase => self.chase(dt, &mut step, obstacles, tuning),
            AgentState::Stall => self.stall(&mut step, obstacles, tuning),
        }

        if step.delta != Vec2::ZERO && !self.moving {
            self.moving = true;
            step.started_moving = true;
        }
        if step.delta == Vec2::ZERO && self.moving {
            self.moving = false;
            step.stopped_moving = true;
        }

        self.body.update_mesh();

        if self.shoot_delay > 0.0 {
            self.shoot_delay -= dt;
        }
        if self.delta_find > 0.0 {
            self.delta_find -= dt;
        }

        step
    }

    fn seek(
        &mut self,
        dt: f32,
        step: &mut AgentStep,
        obstacles: &[Body],
        grid: &TileGrid,
        pathfinder: &impl Pathfinder,
        tuning: &Tuning,
    ) {
        // Close to the waypoint, or overdue: ask the path-finder again
        let near_waypoint = (self.body.position.x - self.step_dest.x).abs()
            < tuning.waypoint_tolerance
            && (self.body.position.y - self.step_dest.y).abs() < tuning.waypoint_tolerance;
        if near_waypoint || self.delta_find <= 0.0 {
            self.delta_find = tuning.repath_interval;
            self.repath(grid, pathfinder);
        }

        let a = self.face_toward(self.step_dest);
        step.facing = Facing::from_angle(a);
        self.shooting_alpha = a;

        if self.step_dest != self.body.position {
            let path = self.speed * dt;
            step.delta = Vec2::new(path * a.cos(), -path * a.sin());
            self.body.position += step.delta;
        }

        if body_sees_point(&self.body, self.destination, obstacles) {
            log::debug!("agent {} spotted target, chasing", self.id);
            self.state = AgentState::Chase;
        }
    }

    fn chase(&mut self, dt: f32, step: &mut AgentStep, obstacles: &[Body], tuning: &Tuning) {
        self.step_dest = self.destination;

        let a = self.face_toward(self.step_dest);
        step.facing = Facing::from_angle(a);
        self.shooting_alpha = a;
        self.try_fire(step, tuning);

        if self.step_dest != self.body.position {
            let path = self.speed * dt;
            step.delta = Vec2::new(path * a.cos(), -path * a.sin());
            self.body.position += step.delta;
        }

        if !body_sees_point(&self.body, self.destination, obstacles) {
            log::debug!("agent {} lost sight of target, seeking", self.id);
            self.step_dest = self.body.position;
            self.state = AgentState::Seek;
        }
        if self.body.position.distance(self.destination) < self.body.size.x * tuning.stall_range_boxes
        {
            self.state = AgentState::Stall;
        }
    }

    fn stall(&mut self, step: &mut AgentStep, obstacles: &[Body], tuning: &Tuning) {
        self.step_dest = self.destination;

        // Target walked away or broke line of sight: back to seeking
        if self.body.position.distance(self.destination) > TILE_SIZE * tuning.break_range_tiles
            || !body_sees_point(&self.body, self.destination, obstacles)
        {
            self.step_dest = self.body.position;
            self.state = AgentState::Seek;
        }

        let a = self.face_toward(self.step_dest);
        step.facing = Facing::from_angle(a);
        self.shooting_alpha = a;
        self.try_fire(step, tuning);
    }

    /// Aim angle toward a point, holding the previous aim when the point
    /// coincides with the agent (zero-length path is a valid steady state).
    fn face_toward(&self, target: Vec2) -> f32 {
        if target == self.body.position {
            self.shooting_alpha
        } else {
            direction_to(self.body.position, target)
        }
    }

    fn try_fire(&mut self, step: &mut AgentStep, tuning: &Tuning) {
        if self.shoot_delay <= 0.0 {
            self.shoot_delay = tuning.shoot_delay;
            step.fire = Some(self.shooting_alpha);
        }
    }

    fn repath(&mut self, grid: &TileGrid, pathfinder: &impl Pathfinder) {
        // Bias the start cell slightly up so a bottom-edge anchor doesn't
        // round into the row below
        let start = grid.cell_of(Vec2::new(self.body.position.x, self.body.position.y - 0.05));
        let goal = grid.cell_of(self.destination);
        let path = pathfinder.find_path(start, goal, grid);

        match path.first() {
            Some(&first) => self.step_dest = grid.waypoint_of(first),
            None => self.step_dest = self.body.position,
        }
    }
}
