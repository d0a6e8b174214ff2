use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

pub mod protocol;

pub use protocol::{
    BulletInfo, BulletState, ClientInputStateUpdate, ClientMessage, InitialPlayerList,
    InitialServerJoinState, NpcInfo, PlayerHealthMessage, PlayerListChange, PointsUpdate,
    ProtocolError, ServerMessage, ServerPlayerUpdate, ServerUsernameRequestStatus,
    UsernameChangeRequest,
};

// Keep these in line with the server's world settings.
pub const WORLD_WIDTH: f32 = 4000.0;
pub const WORLD_HEIGHT: f32 = 4000.0;

pub const PLAYER_ACCELERATION: f32 = 20.0;
pub const PLAYER_MAX_VELOCITY: f32 = 50.0;
pub const PLAYER_RADIUS: f32 = 32.0;

pub const BULLET_RADIUS: f32 = 6.0;

pub const NPC_MAX_VELOCITY: f32 = PLAYER_MAX_VELOCITY / 3.0;

/// WebSocket-style normal closure code used when the client ends a session.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Mutable 2D vector shared by every entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn add_x(&mut self, dx: f32) {
        self.x += dx;
    }

    pub fn add_y(&mut self, dy: f32) {
        self.y += dy;
    }

    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_point_axis_mutation() {
        let mut point = Point::new(1.0, 2.0);
        point.add_x(3.5);
        point.add_y(-4.0);
        assert_approx_eq!(point.x, 4.5);
        assert_approx_eq!(point.y, -2.0);

        point.set_x(10.0);
        point.set_y(20.0);
        assert_eq!(point, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(100.0, 50.0);
        let b = Point::new(40.0, 80.0);
        assert_eq!(a - b, Point::new(60.0, -30.0));
        assert_eq!(a + b, Point::new(140.0, 130.0));
    }

    #[test]
    fn test_npc_speed_is_a_third_of_player_speed() {
        assert_approx_eq!(NPC_MAX_VELOCITY * 3.0, PLAYER_MAX_VELOCITY);
    }
}
