use crate::entity::EntityId;
use crate::scene::Scene;
use crate::surface::DrawSurface;
use shared::Point;

/// Draws renderables in the order they were added. Paint order is the caller's
/// responsibility: the background has to be added first.
#[derive(Debug, Default)]
pub struct Renderer {
    renderables: Vec<EntityId>,
    screen_origin: Point,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_renderable(&mut self, id: EntityId) {
        self.renderables.push(id);
    }

    pub fn remove_renderable(&mut self, id: EntityId) {
        self.renderables.retain(|renderable| *renderable != id);
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.renderables.contains(&id)
    }

    pub fn renderables(&self) -> &[EntityId] {
        &self.renderables
    }

    pub fn screen_origin(&self) -> Point {
        self.screen_origin
    }

    pub fn update_screen_origin(&mut self, origin: Point) {
        self.screen_origin = origin;
    }

    pub fn draw(&self, scene: &Scene, surface: &mut dyn DrawSurface) {
        for id in &self.renderables {
            if let Some(entity) = scene.get(*id) {
                entity
                    .as_renderable()
                    .draw(surface, self.screen_origin);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::GameBackground;
    use crate::entity::Entity;
    use crate::player::{ClientPlayer, OpponentPlayer};
    use crate::surface::{DrawCommand, RecordingSurface};

    fn scene_with_entities() -> (Scene, EntityId, EntityId, EntityId) {
        let mut scene = Scene::new();
        let background = scene.insert(None, Entity::Background(GameBackground::new(4000.0, 4000.0)));
        let player = scene.insert(None, Entity::LocalPlayer(ClientPlayer::new("alice")));
        let mut bob = OpponentPlayer::new("bob");
        bob.set_position(100.0, 100.0);
        let opponent = scene.insert(None, Entity::Opponent(bob));
        (scene, background, player, opponent)
    }

    #[test]
    fn test_draws_in_insertion_order() {
        let (scene, background, player, opponent) = scene_with_entities();
        let mut renderer = Renderer::new();
        renderer.add_renderable(background);
        renderer.add_renderable(opponent);
        renderer.add_renderable(player);

        let mut surface = RecordingSurface::new(800.0, 600.0);
        renderer.draw(&scene, &mut surface);

        let commands = surface.commands();
        assert!(matches!(commands.first(), Some(DrawCommand::Clear(_))));
        // Local player is drawn last, at the center.
        match commands.last() {
            Some(DrawCommand::Circle { center, .. }) => {
                assert_eq!(*center, Point::new(400.0, 300.0))
            }
            other => panic!("Unexpected draw command: {:?}", other),
        }
    }

    #[test]
    fn test_draw_is_idempotent() {
        let (scene, background, player, opponent) = scene_with_entities();
        let mut renderer = Renderer::new();
        renderer.add_renderable(background);
        renderer.add_renderable(player);
        renderer.add_renderable(opponent);
        renderer.update_screen_origin(Point::new(-300.0, -200.0));

        let mut surface = RecordingSurface::new(800.0, 600.0);
        renderer.draw(&scene, &mut surface);
        let first = surface.take_commands();
        renderer.draw(&scene, &mut surface);
        let second = surface.take_commands();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_remove_by_identity() {
        let (scene, background, player, opponent) = scene_with_entities();
        let mut renderer = Renderer::new();
        renderer.add_renderable(background);
        renderer.add_renderable(player);
        renderer.add_renderable(opponent);

        renderer.remove_renderable(opponent);
        renderer.remove_renderable(opponent);

        assert_eq!(renderer.renderables(), &[background, player]);
        assert!(!renderer.contains(opponent));

        let mut surface = RecordingSurface::new(800.0, 600.0);
        renderer.update_screen_origin(Point::new(-300.0, -200.0));
        renderer.draw(&scene, &mut surface);
        let circles = surface
            .commands()
            .iter()
            .filter(|command| matches!(command, DrawCommand::Circle { .. }))
            .count();
        assert_eq!(circles, 1);
    }
}
