//! The locally controlled player and its remotely controlled opponents.

use crate::entity::{Renderable, Updateable};
use crate::surface::{is_on_screen, Color, DrawSurface, Stroke};
use shared::{
    ClientInputStateUpdate, Point, PLAYER_ACCELERATION, PLAYER_MAX_VELOCITY, PLAYER_RADIUS,
};

pub const PLAYER_STARTING_HEALTH: f32 = 100.0;

const LOCAL_FILL: Color = Color::rgb(0, 128, 0);
const LOCAL_STROKE: Color = Color::rgb(0, 51, 0);
const OPPONENT_FILL: Color = Color::rgb(204, 34, 0);
const OPPONENT_STROKE: Color = Color::rgb(51, 0, 0);
const OUTLINE_WIDTH: f32 = 5.0;

/// The avatar controlled by the user. Its motion is predicted locally and
/// snapped to the server's position whenever an update arrives.
#[derive(Debug, Clone)]
pub struct ClientPlayer {
    position: Point,
    velocity: Point,
    /// Aim direction in radians.
    angle: f32,
    move_up: bool,
    move_down: bool,
    move_left: bool,
    move_right: bool,
    shooting: bool,
    username: String,
    acceleration: f32,
    max_velocity: f32,
    score: i64,
    health: f32,
}

impl ClientPlayer {
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_physics(username, PLAYER_ACCELERATION, PLAYER_MAX_VELOCITY)
    }

    pub fn with_physics(username: impl Into<String>, acceleration: f32, max_velocity: f32) -> Self {
        Self {
            position: Point::default(),
            velocity: Point::default(),
            angle: 0.0,
            move_up: false,
            move_down: false,
            move_left: false,
            move_right: false,
            shooting: false,
            username: username.into(),
            acceleration,
            max_velocity,
            score: 0,
            health: PLAYER_STARTING_HEALTH,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Server reconciliation: the authoritative position always wins.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position.set(x, y);
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    pub fn set_velocity(&mut self, x: f32, y: f32) {
        self.velocity.set(x, y);
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    pub fn set_move_up(&mut self, up: bool) {
        self.move_up = up;
    }

    pub fn set_move_down(&mut self, down: bool) {
        self.move_down = down;
    }

    pub fn set_move_left(&mut self, left: bool) {
        self.move_left = left;
    }

    pub fn set_move_right(&mut self, right: bool) {
        self.move_right = right;
    }

    pub fn moving_up(&self) -> bool {
        self.move_up
    }

    pub fn moving_down(&self) -> bool {
        self.move_down
    }

    pub fn moving_left(&self) -> bool {
        self.move_left
    }

    pub fn moving_right(&self) -> bool {
        self.move_right
    }

    pub fn is_shooting(&self) -> bool {
        self.shooting
    }

    pub fn set_shooting(&mut self, shooting: bool) {
        self.shooting = shooting;
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn set_score(&mut self, score: i64) {
        self.score = score;
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn set_health(&mut self, health: f32) {
        self.health = health;
    }

    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    /// Snapshot of the intent flags for the periodic server report.
    pub fn input_state(&self, auth_string: &str) -> ClientInputStateUpdate {
        ClientInputStateUpdate {
            moving_up: self.move_up,
            moving_down: self.move_down,
            moving_left: self.move_left,
            moving_right: self.move_right,
            angle: self.angle,
            shooting: self.shooting,
            username: self.username.clone(),
            auth_string: auth_string.to_string(),
        }
    }

    fn update_velocity(&mut self, frac_second: f32) {
        let step = self.acceleration * frac_second;
        // Screen y grows downwards, so "down" is the positive direction.
        self.velocity.x = axis_velocity(self.velocity.x, self.move_right, self.move_left, step);
        self.velocity.y = axis_velocity(self.velocity.y, self.move_down, self.move_up, step);
    }

    fn cap_velocity(&mut self) {
        self.velocity.x = self.velocity.x.clamp(-self.max_velocity, self.max_velocity);
        self.velocity.y = self.velocity.y.clamp(-self.max_velocity, self.max_velocity);
    }

    fn update_position(&mut self, frac_second: f32) {
        self.position.add_x(self.velocity.x * frac_second);
        self.position.add_y(self.velocity.y * frac_second);
    }

    fn handle_border_collision(&mut self) {
        // World border containment is left to the server.
    }
}

/// Accelerates toward the requested direction, or decays toward zero without
/// crossing it when there is no intent on this axis.
fn axis_velocity(velocity: f32, positive: bool, negative: bool, step: f32) -> f32 {
    if positive {
        velocity + step
    } else if negative {
        velocity - step
    } else if velocity > 0.0 {
        (velocity - step).max(0.0)
    } else if velocity < 0.0 {
        (velocity + step).min(0.0)
    } else {
        0.0
    }
}

impl Updateable for ClientPlayer {
    fn update(&mut self, elapsed_ms: f32) {
        let frac_second = elapsed_ms.max(0.0) / 1000.0;

        self.update_velocity(frac_second);
        self.cap_velocity();
        self.update_position(frac_second);
        self.handle_border_collision();
    }
}

impl Renderable for ClientPlayer {
    fn draw(&self, surface: &mut dyn DrawSurface, _screen_origin: Point) {
        // The camera follows the local player, so it always sits at the center.
        let center = surface.center();
        surface.circle(
            center,
            PLAYER_RADIUS,
            LOCAL_FILL,
            Some(Stroke {
                color: LOCAL_STROKE,
                width: OUTLINE_WIDTH,
            }),
        );
    }
}

/// Another player in the arena. Only moved by server updates.
#[derive(Debug, Clone)]
pub struct OpponentPlayer {
    username: String,
    position: Point,
}

impl OpponentPlayer {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            position: Point::default(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position.set(x, y);
    }
}

impl Updateable for OpponentPlayer {
    fn update(&mut self, _elapsed_ms: f32) {}
}

impl Renderable for OpponentPlayer {
    fn draw(&self, surface: &mut dyn DrawSurface, screen_origin: Point) {
        let screen_position = self.position - screen_origin;
        if !is_on_screen(surface, screen_position, PLAYER_RADIUS) {
            return;
        }

        surface.circle(
            screen_position,
            PLAYER_RADIUS,
            OPPONENT_FILL,
            Some(Stroke {
                color: OPPONENT_STROKE,
                width: OUTLINE_WIDTH,
            }),
        );
    }
}
