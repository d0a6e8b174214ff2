use crate::entity::{Renderable, Updateable};
use crate::surface::{Color, DrawSurface, Stroke};
use shared::Point;

const VOID: Color = Color::rgb(26, 26, 26);
const FLOOR: Color = Color::rgb(240, 240, 240);
const GRID: Stroke = Stroke {
    color: Color::rgb(210, 210, 210),
    width: 1.0,
};
const BORDER: Stroke = Stroke {
    color: Color::rgb(68, 68, 68),
    width: 4.0,
};
pub const GRID_SPACING: f32 = 100.0;

/// The static world: everything outside the bounds is void, the floor inside
/// carries a grid so that motion is visible.
#[derive(Debug, Clone)]
pub struct GameBackground {
    world_width: f32,
    world_height: f32,
}

impl GameBackground {
    pub fn new(world_width: f32, world_height: f32) -> Self {
        Self {
            world_width,
            world_height,
        }
    }
}

/// World coordinates of the grid lines on one axis that fall inside both the
/// world and the visible window `[view_start, view_end]`.
fn grid_lines(world_extent: f32, view_start: f32, view_end: f32) -> impl Iterator<Item = f32> {
    let start = (view_start.max(0.0) / GRID_SPACING).ceil() * GRID_SPACING;
    let end = view_end.min(world_extent);
    let count = if end >= start {
        ((end - start) / GRID_SPACING).floor() as usize + 1
    } else {
        0
    };
    (0..count).map(move |i| start + i as f32 * GRID_SPACING)
}

impl Updateable for GameBackground {
    fn update(&mut self, _elapsed_ms: f32) {}
}

impl Renderable for GameBackground {
    fn draw(&self, surface: &mut dyn DrawSurface, screen_origin: Point) {
        let width = surface.width();
        let height = surface.height();

        surface.clear(VOID);

        let world_top_left = Point::default() - screen_origin;
        surface.rect(world_top_left, self.world_width, self.world_height, FLOOR);

        let top = world_top_left.y.max(0.0);
        let bottom = (world_top_left.y + self.world_height).min(height);
        for x in grid_lines(self.world_width, screen_origin.x, screen_origin.x + width) {
            let screen_x = x - screen_origin.x;
            surface.line(Point::new(screen_x, top), Point::new(screen_x, bottom), GRID);
        }

        let left = world_top_left.x.max(0.0);
        let right = (world_top_left.x + self.world_width).min(width);
        for y in grid_lines(self.world_height, screen_origin.y, screen_origin.y + height) {
            let screen_y = y - screen_origin.y;
            surface.line(Point::new(left, screen_y), Point::new(right, screen_y), GRID);
        }

        surface.rect_outline(world_top_left, self.world_width, self.world_height, BORDER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    #[test]
    fn test_grid_lines_clipped_to_view_and_world() {
        let lines: Vec<f32> = grid_lines(1000.0, -250.0, 250.0).collect();
        assert_eq!(lines, vec![0.0, 100.0, 200.0]);

        let lines: Vec<f32> = grid_lines(1000.0, 850.0, 1400.0).collect();
        assert_eq!(lines, vec![900.0, 1000.0]);

        assert_eq!(grid_lines(1000.0, 1100.0, 1500.0).count(), 0);
    }

    #[test]
    fn test_background_paints_void_first() {
        let background = GameBackground::new(4000.0, 4000.0);
        let mut surface = RecordingSurface::new(800.0, 600.0);

        background.draw(&mut surface, Point::new(-400.0, -300.0));

        let commands = surface.commands();
        assert_eq!(commands[0], DrawCommand::Clear(VOID));
        assert_eq!(
            commands[1],
            DrawCommand::Rect {
                top_left: Point::new(400.0, 300.0),
                width: 4000.0,
                height: 4000.0,
                fill: FLOOR,
            }
        );
        assert!(matches!(
            commands.last(),
            Some(DrawCommand::RectOutline { .. })
        ));
    }
}
