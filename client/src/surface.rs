//! Draw surface abstraction used by every renderable entity.
//!
//! Coordinates passed to a surface are always surface-relative; entities
//! subtract the current screen origin before drawing.

use shared::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

pub trait DrawSurface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn center(&self) -> Point {
        Point::new(self.width() / 2.0, self.height() / 2.0)
    }

    fn clear(&mut self, color: Color);
    fn circle(&mut self, center: Point, radius: f32, fill: Color, stroke: Option<Stroke>);
    /// `rotation` is in radians.
    fn ellipse(
        &mut self,
        center: Point,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        fill: Color,
        stroke: Option<Stroke>,
    );
    fn rect(&mut self, top_left: Point, width: f32, height: f32, fill: Color);
    fn rect_outline(&mut self, top_left: Point, width: f32, height: f32, stroke: Stroke);
    fn line(&mut self, from: Point, to: Point, stroke: Stroke);
}

/// A single call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Circle {
        center: Point,
        radius: f32,
        fill: Color,
        stroke: Option<Stroke>,
    },
    Ellipse {
        center: Point,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        fill: Color,
        stroke: Option<Stroke>,
    },
    Rect {
        top_left: Point,
        width: f32,
        height: f32,
        fill: Color,
    },
    RectOutline {
        top_left: Point,
        width: f32,
        height: f32,
        stroke: Stroke,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
}

/// Headless surface that records draw calls instead of rasterizing them.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl DrawSurface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn circle(&mut self, center: Point, radius: f32, fill: Color, stroke: Option<Stroke>) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        });
    }

    fn ellipse(
        &mut self,
        center: Point,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        fill: Color,
        stroke: Option<Stroke>,
    ) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            radius_x,
            radius_y,
            rotation,
            fill,
            stroke,
        });
    }

    fn rect(&mut self, top_left: Point, width: f32, height: f32, fill: Color) {
        self.commands.push(DrawCommand::Rect {
            top_left,
            width,
            height,
            fill,
        });
    }

    fn rect_outline(&mut self, top_left: Point, width: f32, height: f32, stroke: Stroke) {
        self.commands.push(DrawCommand::RectOutline {
            top_left,
            width,
            height,
            stroke,
        });
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }
}

/// Surface backed by the macroquad window. Only usable from inside the
/// macroquad event loop.
pub struct MacroquadSurface;

fn mq_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::from_rgba(color.r, color.g, color.b, color.a)
}

impl DrawSurface for MacroquadSurface {
    fn width(&self) -> f32 {
        macroquad::window::screen_width()
    }

    fn height(&self) -> f32 {
        macroquad::window::screen_height()
    }

    fn clear(&mut self, color: Color) {
        macroquad::window::clear_background(mq_color(color));
    }

    fn circle(&mut self, center: Point, radius: f32, fill: Color, stroke: Option<Stroke>) {
        macroquad::shapes::draw_circle(center.x, center.y, radius, mq_color(fill));
        if let Some(stroke) = stroke {
            macroquad::shapes::draw_circle_lines(
                center.x,
                center.y,
                radius,
                stroke.width,
                mq_color(stroke.color),
            );
        }
    }

    fn ellipse(
        &mut self,
        center: Point,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        fill: Color,
        stroke: Option<Stroke>,
    ) {
        let degrees = rotation.to_degrees();
        macroquad::shapes::draw_ellipse(
            center.x,
            center.y,
            radius_x,
            radius_y,
            degrees,
            mq_color(fill),
        );
        if let Some(stroke) = stroke {
            macroquad::shapes::draw_ellipse_lines(
                center.x,
                center.y,
                radius_x,
                radius_y,
                degrees,
                stroke.width,
                mq_color(stroke.color),
            );
        }
    }

    fn rect(&mut self, top_left: Point, width: f32, height: f32, fill: Color) {
        macroquad::shapes::draw_rectangle(top_left.x, top_left.y, width, height, mq_color(fill));
    }

    fn rect_outline(&mut self, top_left: Point, width: f32, height: f32, stroke: Stroke) {
        macroquad::shapes::draw_rectangle_lines(
            top_left.x,
            top_left.y,
            width,
            height,
            stroke.width,
            mq_color(stroke.color),
        );
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        macroquad::shapes::draw_line(
            from.x,
            from.y,
            to.x,
            to.y,
            stroke.width,
            mq_color(stroke.color),
        );
    }
}

/// Returns whether a circle of `radius` at surface-relative `screen_position`
/// overlaps the visible surface.
pub fn is_on_screen(surface: &dyn DrawSurface, screen_position: Point, radius: f32) -> bool {
    screen_position.x >= -radius
        && screen_position.y >= -radius
        && screen_position.x <= surface.width() + radius
        && screen_position.y <= surface.height() + radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_surface_records_in_order() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        surface.clear(Color::rgb(0, 0, 0));
        surface.circle(Point::new(1.0, 2.0), 3.0, Color::rgb(1, 2, 3), None);

        assert_eq!(surface.center(), Point::new(400.0, 300.0));
        assert_eq!(surface.commands().len(), 2);
        assert_eq!(surface.commands()[0], DrawCommand::Clear(Color::rgb(0, 0, 0)));

        let taken = surface.take_commands();
        assert_eq!(taken.len(), 2);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_on_screen_includes_radius_margin() {
        let surface = RecordingSurface::new(100.0, 100.0);
        assert!(is_on_screen(&surface, Point::new(50.0, 50.0), 10.0));
        assert!(is_on_screen(&surface, Point::new(-10.0, 50.0), 10.0));
        assert!(is_on_screen(&surface, Point::new(110.0, 110.0), 10.0));
        assert!(!is_on_screen(&surface, Point::new(-10.1, 50.0), 10.0));
        assert!(!is_on_screen(&surface, Point::new(50.0, 111.0), 10.0));
    }
}
