//! Server spawned NPCs. The infected NPC animates on its own; its base motion
//! only runs when lag compensation is switched on.

use crate::entity::{Renderable, Updateable};
use crate::surface::{is_on_screen, Color, DrawSurface, Stroke};
use shared::{Point, NPC_MAX_VELOCITY};
use std::f32::consts::PI;

const INFECTED_RPM: f32 = 4.0;
/// Radians per millisecond.
const INFECTED_ANGLE_DELTA: f32 = (2.0 * PI * INFECTED_RPM) / (60.0 * 1000.0);
pub const INFECTED_RADIUS: f32 = 16.0;
pub const INFECTED_MAX_BULGE: f32 = 6.0;
const BULGE_MS_PER_UNIT: f32 = 50.0;

const INFECTED_FILL: Color = Color::rgb(186, 255, 0);
const INFECTED_STROKE: Color = Color::rgb(111, 171, 0);

/// Shared NPC motion: integrate the last known velocity.
#[derive(Debug, Clone)]
pub struct Npc {
    id: u64,
    position: Point,
    velocity: Point,
    max_velocity: f32,
}

impl Npc {
    pub fn new(id: u64, position: Point, velocity: Point) -> Self {
        Self {
            id,
            position,
            velocity,
            max_velocity: NPC_MAX_VELOCITY,
        }
    }

    fn update(&mut self, elapsed_ms: f32) {
        let frac_second = elapsed_ms.max(0.0) / 1000.0;
        self.velocity.x = self.velocity.x.clamp(-self.max_velocity, self.max_velocity);
        self.velocity.y = self.velocity.y.clamp(-self.max_velocity, self.max_velocity);
        self.position.add_x(self.velocity.x * frac_second);
        self.position.add_y(self.velocity.y * frac_second);
    }
}

#[derive(Debug, Clone)]
pub struct InfectedNpc {
    npc: Npc,
    angle: f32,
    extra_width: f32,
    width_expand: bool,
    lag_compensation: bool,
}

impl InfectedNpc {
    pub fn new(id: u64, position: Point, velocity: Point, lag_compensation: bool) -> Self {
        Self {
            npc: Npc::new(id, position, velocity),
            angle: 0.0,
            extra_width: 0.0,
            width_expand: true,
            lag_compensation,
        }
    }

    pub fn id(&self) -> u64 {
        self.npc.id
    }

    pub fn position(&self) -> Point {
        self.npc.position
    }

    pub fn velocity(&self) -> Point {
        self.npc.velocity
    }

    /// Server correction of the NPC's motion.
    pub fn correct(&mut self, position: Point, velocity: Point) {
        self.npc.position = position;
        self.npc.velocity = velocity;
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn extra_width(&self) -> f32 {
        self.extra_width
    }
}

impl Updateable for InfectedNpc {
    fn update(&mut self, elapsed_ms: f32) {
        let elapsed_ms = elapsed_ms.max(0.0);
        self.angle = (self.angle + INFECTED_ANGLE_DELTA * elapsed_ms) % (2.0 * PI);

        let bulge = elapsed_ms / BULGE_MS_PER_UNIT;
        if self.width_expand {
            self.extra_width += bulge;
            if self.extra_width > INFECTED_MAX_BULGE {
                self.width_expand = false;
                self.extra_width = INFECTED_MAX_BULGE;
            }
        } else {
            self.extra_width -= bulge;
            if self.extra_width < -INFECTED_MAX_BULGE {
                self.width_expand = true;
                self.extra_width = -INFECTED_MAX_BULGE;
            }
        }

        if self.lag_compensation {
            self.npc.update(elapsed_ms);
        }
    }
}

impl Renderable for InfectedNpc {
    fn draw(&self, surface: &mut dyn DrawSurface, screen_origin: Point) {
        let screen_position = self.npc.position - screen_origin;
        if !is_on_screen(surface, screen_position, INFECTED_RADIUS) {
            return;
        }

        surface.ellipse(
            screen_position,
            INFECTED_RADIUS + self.extra_width,
            INFECTED_RADIUS - self.extra_width,
            self.angle,
            INFECTED_FILL,
            Some(Stroke {
                color: INFECTED_STROKE,
                width: 5.0,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_spins_at_four_rpm() {
        let mut npc = InfectedNpc::new(1, Point::default(), Point::default(), false);
        // A quarter of a revolution takes 3.75 seconds at 4 rpm.
        npc.update(3750.0);
        assert_approx_eq!(npc.angle(), PI / 2.0, 1e-4);
    }

    #[test]
    fn test_bulge_bounces_between_limits() {
        let mut npc = InfectedNpc::new(1, Point::default(), Point::default(), false);

        npc.update(400.0);
        assert_approx_eq!(npc.extra_width(), INFECTED_MAX_BULGE);

        npc.update(100.0);
        assert_approx_eq!(npc.extra_width(), INFECTED_MAX_BULGE - 2.0);

        npc.update(1000.0);
        assert_approx_eq!(npc.extra_width(), -INFECTED_MAX_BULGE);

        npc.update(50.0);
        assert_approx_eq!(npc.extra_width(), -INFECTED_MAX_BULGE + 1.0);
    }

    #[test]
    fn test_base_motion_gated_by_lag_compensation() {
        let velocity = Point::new(10.0, -5.0);
        let mut still = InfectedNpc::new(1, Point::default(), velocity, false);
        let mut moving = InfectedNpc::new(2, Point::default(), velocity, true);

        still.update(1000.0);
        moving.update(1000.0);

        assert_eq!(still.position(), Point::default());
        assert_approx_eq!(moving.position().x, 10.0);
        assert_approx_eq!(moving.position().y, -5.0);
    }

    #[test]
    fn test_base_motion_capped() {
        let mut npc = InfectedNpc::new(1, Point::default(), Point::new(1000.0, 0.0), true);
        npc.update(1000.0);
        assert_approx_eq!(npc.position().x, NPC_MAX_VELOCITY);
    }

    #[test]
    fn test_server_correction() {
        let mut npc = InfectedNpc::new(1, Point::default(), Point::default(), true);
        npc.correct(Point::new(7.0, 8.0), Point::new(1.0, 0.0));
        assert_eq!(npc.position(), Point::new(7.0, 8.0));
        assert_eq!(npc.velocity(), Point::new(1.0, 0.0));
    }

    #[test]
    fn test_draws_ellipse_when_visible() {
        let npc = InfectedNpc::new(1, Point::new(50.0, 50.0), Point::default(), false);
        let mut surface = RecordingSurface::new(100.0, 100.0);

        npc.draw(&mut surface, Point::default());
        assert!(matches!(
            surface.commands()[0],
            DrawCommand::Ellipse { .. }
        ));

        surface.take_commands();
        npc.draw(&mut surface, Point::new(500.0, 500.0));
        assert!(surface.commands().is_empty());
    }
}
