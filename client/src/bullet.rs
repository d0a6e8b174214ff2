use crate::entity::{EntityId, Renderable, Updateable};
use crate::surface::{is_on_screen, Color, DrawSurface};
use shared::{Point, BULLET_RADIUS};

pub const DEFAULT_BULLET_FILL: Color = Color::rgb(255, 221, 0);
pub const OPPONENT_BULLET_FILL: Color = Color::rgb(255, 84, 60);

/// A projectile whose whole lifecycle is driven by the server.
#[derive(Debug, Clone)]
pub struct Bullet {
    id: u64,
    owner: EntityId,
    position: Point,
    velocity: Point,
    fill: Color,
}

impl Bullet {
    pub fn new(owner: EntityId, id: u64, position: Point, velocity: Point) -> Self {
        Self {
            id,
            owner,
            position,
            velocity,
            fill: DEFAULT_BULLET_FILL,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position.set(x, y);
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn set_fill(&mut self, fill: Color) {
        self.fill = fill;
    }
}

impl Updateable for Bullet {
    fn update(&mut self, _elapsed_ms: f32) {}
}

impl Renderable for Bullet {
    fn draw(&self, surface: &mut dyn DrawSurface, screen_origin: Point) {
        let screen_position = self.position - screen_origin;
        if !is_on_screen(surface, screen_position, BULLET_RADIUS) {
            return;
        }
        surface.circle(screen_position, BULLET_RADIUS, self.fill, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    #[test]
    fn test_bullet_only_moves_on_request() {
        let mut bullet = Bullet::new(0, 9, Point::new(10.0, 10.0), Point::new(300.0, 0.0));
        bullet.update(1000.0);
        assert_eq!(bullet.position(), Point::new(10.0, 10.0));

        bullet.set_position(40.0, 12.0);
        assert_eq!(bullet.position(), Point::new(40.0, 12.0));
    }

    #[test]
    fn test_bullet_draws_with_fill() {
        let mut bullet = Bullet::new(0, 9, Point::new(110.0, 60.0), Point::default());
        bullet.set_fill(OPPONENT_BULLET_FILL);
        let mut surface = RecordingSurface::new(200.0, 200.0);

        bullet.draw(&mut surface, Point::new(100.0, 50.0));

        assert_eq!(
            surface.commands(),
            &[DrawCommand::Circle {
                center: Point::new(10.0, 10.0),
                radius: BULLET_RADIUS,
                fill: OPPONENT_BULLET_FILL,
                stroke: None,
            }]
        );
    }

    #[test]
    fn test_bullet_culled_off_screen() {
        let bullet = Bullet::new(0, 9, Point::new(-100.0, 0.0), Point::default());
        let mut surface = RecordingSurface::new(200.0, 200.0);

        bullet.draw(&mut surface, Point::new(0.0, 0.0));

        assert!(surface.commands().is_empty());
    }
}
