//! Entity capabilities and the closed set of entity kinds living in the scene.

use crate::background::GameBackground;
use crate::bullet::Bullet;
use crate::npc::InfectedNpc;
use crate::player::{ClientPlayer, OpponentPlayer};
use crate::surface::DrawSurface;
use shared::Point;

/// Index of an entity inside the [`Scene`](crate::scene::Scene) arena.
pub type EntityId = usize;

pub trait Renderable {
    fn draw(&self, surface: &mut dyn DrawSurface, screen_origin: Point);
}

pub trait Updateable {
    fn update(&mut self, elapsed_ms: f32);
}

pub enum Entity {
    Background(GameBackground),
    LocalPlayer(ClientPlayer),
    Opponent(OpponentPlayer),
    Npc(InfectedNpc),
    Bullet(Bullet),
}

impl Entity {
    pub fn as_renderable(&self) -> &dyn Renderable {
        match self {
            Entity::Background(background) => background,
            Entity::LocalPlayer(player) => player,
            Entity::Opponent(opponent) => opponent,
            Entity::Npc(npc) => npc,
            Entity::Bullet(bullet) => bullet,
        }
    }

    pub fn as_updateable_mut(&mut self) -> &mut dyn Updateable {
        match self {
            Entity::Background(background) => background,
            Entity::LocalPlayer(player) => player,
            Entity::Opponent(opponent) => opponent,
            Entity::Npc(npc) => npc,
            Entity::Bullet(bullet) => bullet,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            Entity::Background(_) => None,
            Entity::LocalPlayer(player) => Some(player.position()),
            Entity::Opponent(opponent) => Some(opponent.position()),
            Entity::Npc(npc) => Some(npc.position()),
            Entity::Bullet(bullet) => Some(bullet.position()),
        }
    }

    /// Username of player entities.
    pub fn username(&self) -> Option<&str> {
        match self {
            Entity::LocalPlayer(player) => Some(player.username()),
            Entity::Opponent(opponent) => Some(opponent.username()),
            _ => None,
        }
    }
}
