//! The game client: owns the scene, drives frames and applies server messages.

use crate::background::GameBackground;
use crate::bullet::{Bullet, OPPONENT_BULLET_FILL};
use crate::config::ClientConfig;
use crate::entity::{Entity, EntityId};
use crate::input::{InputEvent, KEY_A, KEY_D, KEY_S, KEY_W, MOUSE_LEFT};
use crate::network::Transport;
use crate::npc::InfectedNpc;
use crate::player::{ClientPlayer, OpponentPlayer};
use crate::rendering::Renderer;
use crate::scene::Scene;
use crate::surface::DrawSurface;
use log::{debug, info, warn};
use shared::{
    BulletInfo, BulletState, ClientMessage, InitialPlayerList, InitialServerJoinState, NpcInfo,
    PlayerHealthMessage, PlayerListChange, Point, PointsUpdate, ServerMessage,
    ServerPlayerUpdate, ServerUsernameRequestStatus, UsernameChangeRequest, NORMAL_CLOSURE,
};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientState {
    Initializing,
    Running,
    /// Terminal. `reason` is the message handed to the reset callback.
    Disconnected {
        reason: String,
    },
}

/// Result of resolving a username against the live player set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerRef {
    Local,
    Opponent(EntityId),
}

type ResetHandler = Box<dyn FnMut(&str) + Send>;

pub struct GameClient<T: Transport> {
    config: ClientConfig,
    state: ClientState,
    transport: T,

    scene: Scene,
    renderer: Renderer,
    player: EntityId,
    opponents: Vec<EntityId>,
    bullets: HashMap<u64, EntityId>,
    npcs: HashMap<u64, EntityId>,

    auth_token: String,
    num_frames: u64,
    surface_size: Point,
    on_reset: ResetHandler,
}

impl<T: Transport> GameClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let mut scene = Scene::new();
        let mut renderer = Renderer::new();

        // Paint order follows insertion order, so the background goes first.
        let background = scene.insert(
            None,
            Entity::Background(GameBackground::new(config.world_width, config.world_height)),
        );
        let player = scene.insert(
            None,
            Entity::LocalPlayer(ClientPlayer::with_physics(
                config.username.clone().unwrap_or_default(),
                config.acceleration,
                config.max_velocity,
            )),
        );
        renderer.add_renderable(background);
        renderer.add_renderable(player);

        let surface_size = Point::new(config.surface_width, config.surface_height);

        Self {
            config,
            state: ClientState::Initializing,
            transport,
            scene,
            renderer,
            player,
            opponents: Vec::new(),
            bullets: HashMap::new(),
            npcs: HashMap::new(),
            auth_token: String::new(),
            num_frames: 0,
            surface_size,
            on_reset: Box::new(|message| info!("Session reset: {}", message)),
        }
    }

    /// Called once the session ends, with a message meant for the user.
    pub fn set_reset_handler(&mut self, handler: impl FnMut(&str) + Send + 'static) {
        self.on_reset = Box::new(handler);
    }

    pub fn start(&mut self) {
        if self.state == ClientState::Initializing {
            info!("Game client running");
            self.state = ClientState::Running;
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClientState::Running
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self.state, ClientState::Disconnected { .. })
    }

    pub fn frame_count(&self) -> u64 {
        self.num_frames
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn player_id(&self) -> EntityId {
        self.player
    }

    pub fn local_player(&self) -> &ClientPlayer {
        match self.scene.get(self.player) {
            Some(Entity::LocalPlayer(player)) => player,
            _ => unreachable!("local player is never removed from the scene"),
        }
    }

    pub fn local_player_mut(&mut self) -> &mut ClientPlayer {
        match self.scene.get_mut(self.player) {
            Some(Entity::LocalPlayer(player)) => player,
            _ => unreachable!("local player is never removed from the scene"),
        }
    }

    /// Entities directly contained in the client: the local player and the
    /// opponents.
    pub fn child_entities(&self) -> Vec<EntityId> {
        std::iter::once(self.player)
            .chain(self.opponents.iter().copied())
            .collect()
    }

    pub fn opponents(&self) -> impl Iterator<Item = &OpponentPlayer> {
        self.opponents
            .iter()
            .filter_map(|id| match self.scene.get(*id) {
                Some(Entity::Opponent(opponent)) => Some(opponent),
                _ => None,
            })
    }

    pub fn opponent(&self, username: &str) -> Option<&OpponentPlayer> {
        self.opponents().find(|opponent| opponent.username() == username)
    }

    pub fn bullet(&self, bullet_id: u64) -> Option<(EntityId, &Bullet)> {
        let id = *self.bullets.get(&bullet_id)?;
        match self.scene.get(id) {
            Some(Entity::Bullet(bullet)) => Some((id, bullet)),
            _ => None,
        }
    }

    pub fn npc(&self, npc_id: u64) -> Option<&InfectedNpc> {
        match self.scene.get(*self.npcs.get(&npc_id)?) {
            Some(Entity::Npc(npc)) => Some(npc),
            _ => None,
        }
    }

    pub fn player_by_username(&self, username: &str) -> Option<PlayerRef> {
        if self.local_player().username() == username {
            return Some(PlayerRef::Local);
        }
        self.opponents
            .iter()
            .copied()
            .find(|id| self.scene.get(*id).and_then(Entity::username) == Some(username))
            .map(PlayerRef::Opponent)
    }

    fn player_entity(&self, player: PlayerRef) -> EntityId {
        match player {
            PlayerRef::Local => self.player,
            PlayerRef::Opponent(id) => id,
        }
    }

    /// Runs one frame: update, draw, and the periodic input report.
    pub fn frame(&mut self, elapsed_ms: f32, surface: &mut dyn DrawSurface) {
        if !self.is_running() {
            return;
        }

        self.surface_size = Point::new(surface.width(), surface.height());
        self.update(elapsed_ms);
        self.draw(surface);

        if self.num_frames % self.config.input_send_interval.max(1) == 0 {
            self.send_input_state();
        }
        self.num_frames += 1;
    }

    /// Repaints the last frame without advancing the simulation.
    pub fn redraw(&self, surface: &mut dyn DrawSurface) {
        self.renderer.draw(&self.scene, surface);
    }

    fn update(&mut self, elapsed_ms: f32) {
        self.scene.update_all(elapsed_ms);
    }

    fn draw(&mut self, surface: &mut dyn DrawSurface) {
        let origin = self.local_player().position() - surface.center();
        self.renderer.update_screen_origin(origin);
        self.renderer.draw(&self.scene, surface);
    }

    fn send_input_state(&mut self) {
        let state = self.local_player().input_state(&self.auth_token);
        self.send(ClientMessage::InputState(state));
    }

    pub fn request_username_change(&mut self, new_username: &str) {
        let request = UsernameChangeRequest {
            old_username: self.local_player().username().to_string(),
            new_username: new_username.to_string(),
            authentication_string: self.auth_token.clone(),
        };
        info!("Requesting username {}", new_username);
        self.send(ClientMessage::UsernameChange(request));
    }

    fn send(&mut self, message: ClientMessage) {
        if self.is_disconnected() {
            return;
        }

        let text = match message.encode() {
            Ok(text) => text,
            Err(e) => {
                warn!("Dropping outbound {}: {}", message.tag(), e);
                return;
            }
        };

        if let Err(e) = self.transport.send(text) {
            self.handle_transport_error(&e.to_string());
        }
    }

    /// Maps a raw host input event onto the local player. Returns whether the
    /// event was recognized, in which case the host's default handling should
    /// be suppressed.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        if self.is_disconnected() {
            return false;
        }

        let surface_center = Point::new(self.surface_size.x / 2.0, self.surface_size.y / 2.0);
        let player = self.local_player_mut();
        match event {
            InputEvent::KeyDown(code) | InputEvent::KeyUp(code) => {
                let down = matches!(event, InputEvent::KeyDown(_));
                match code {
                    KEY_W => player.set_move_up(down),
                    KEY_S => player.set_move_down(down),
                    KEY_A => player.set_move_left(down),
                    KEY_D => player.set_move_right(down),
                    _ => return false,
                }
                true
            }
            InputEvent::MouseDown(MOUSE_LEFT) => {
                player.set_shooting(true);
                true
            }
            InputEvent::MouseUp(MOUSE_LEFT) => {
                player.set_shooting(false);
                true
            }
            InputEvent::MouseDown(_) | InputEvent::MouseUp(_) => false,
            InputEvent::MouseMove { x, y } => {
                let delta_x = x - surface_center.x;
                let delta_y = y - surface_center.y;
                player.set_angle(delta_y.atan2(delta_x));
                true
            }
        }
    }

    /// Entry point for one inbound text frame. Frames that cannot be decoded
    /// are ignored.
    pub fn handle_server_text(&mut self, text: &str) {
        match ServerMessage::decode(text) {
            Ok(message) => self.handle_server_message(message),
            Err(e) => debug!("Ignoring server message: {}", e),
        }
    }

    pub fn handle_server_message(&mut self, message: ServerMessage) {
        if self.is_disconnected() {
            return;
        }

        match message {
            ServerMessage::PlayerUpdates(updates) => self.apply_player_updates(&updates),
            ServerMessage::BulletInfos(infos) => self.apply_bullet_infos(&infos),
            ServerMessage::NpcInfos(infos) => self.apply_npc_infos(&infos),
            ServerMessage::PlayerListChange(change) => self.apply_player_list_change(&change),
            ServerMessage::PointsUpdate(points) => self.apply_points_update(&points),
            ServerMessage::PlayerHealth(health) => self.apply_player_health(&health),
            ServerMessage::InitialPlayerList(list) => self.apply_initial_player_list(&list),
            ServerMessage::InitialServerJoinState(join) => self.apply_join_state(&join),
            ServerMessage::UsernameRequestStatus(status) => self.apply_username_status(&status),
        }
    }

    pub fn handle_transport_error(&mut self, message: &str) {
        warn!("Connection error: {}", message);
        self.disconnect("Connection error", &format!("Connection error: {}", message));
    }

    pub fn handle_server_timeout(&mut self) {
        warn!("No message from the server within the timeout");
        self.disconnect("Server timed out", "Server timed out.");
    }

    /// Enters the terminal state. Only the first call has any effect.
    pub fn disconnect(&mut self, close_reason: &str, message: &str) {
        if self.is_disconnected() {
            return;
        }

        info!("Disconnecting: {}", message);
        self.state = ClientState::Disconnected {
            reason: message.to_string(),
        };
        self.transport.close(NORMAL_CLOSURE, close_reason);
        (self.on_reset)(message);
    }

    fn apply_player_updates(&mut self, updates: &[ServerPlayerUpdate]) {
        for update in updates {
            let Some(player) = self.player_by_username(&update.player_name) else {
                debug!("Position update for unknown player {}", update.player_name);
                continue;
            };

            let position = update.position();
            let id = self.player_entity(player);
            match self.scene.get_mut(id) {
                Some(Entity::LocalPlayer(local)) => local.set_position(position.x, position.y),
                Some(Entity::Opponent(opponent)) => opponent.set_position(position.x, position.y),
                _ => {}
            }
        }
    }

    fn apply_bullet_infos(&mut self, infos: &[BulletInfo]) {
        for info in infos {
            match info.state() {
                Some(BulletState::Created) => self.create_bullet(info),
                Some(BulletState::Updated) => {
                    let (Some(id), Some(position)) =
                        (self.bullets.get(&info.bullet_id).copied(), info.position())
                    else {
                        debug!("Update for unknown bullet {}", info.bullet_id);
                        continue;
                    };
                    if let Some(Entity::Bullet(bullet)) = self.scene.get_mut(id) {
                        bullet.set_position(position.x, position.y);
                    }
                }
                Some(BulletState::Destroyed) => {
                    if let Some(id) = self.bullets.get(&info.bullet_id).copied() {
                        self.remove_entity(id);
                    }
                }
                None => debug!("Bullet {} has unknown state {}", info.bullet_id, info.state),
            }
        }
    }

    fn create_bullet(&mut self, info: &BulletInfo) {
        if self.bullets.contains_key(&info.bullet_id) {
            return;
        }

        let owner_name = info.owner.as_deref().unwrap_or_default();
        let Some(owner) = self.player_by_username(owner_name) else {
            debug!(
                "Dropping bullet {} from unknown owner {}",
                info.bullet_id, owner_name
            );
            return;
        };
        let Some(position) = info.position() else {
            return;
        };

        let owner_id = self.player_entity(owner);
        let mut bullet = Bullet::new(owner_id, info.bullet_id, position, info.velocity());
        if owner != PlayerRef::Local {
            bullet.set_fill(OPPONENT_BULLET_FILL);
        }

        let id = self.scene.insert(Some(owner_id), Entity::Bullet(bullet));
        self.renderer.add_renderable(id);
        self.bullets.insert(info.bullet_id, id);
    }

    fn apply_npc_infos(&mut self, infos: &[NpcInfo]) {
        for info in infos {
            match (info.state(), self.npcs.get(&info.npc_id).copied()) {
                (Some(BulletState::Created), None) => {
                    let Some(position) = info.position() else {
                        continue;
                    };
                    let npc = InfectedNpc::new(
                        info.npc_id,
                        position,
                        info.velocity(),
                        self.config.lag_compensation,
                    );
                    let id = self.scene.insert(None, Entity::Npc(npc));
                    self.renderer.add_renderable(id);
                    self.npcs.insert(info.npc_id, id);
                }
                (Some(BulletState::Created | BulletState::Updated), Some(id)) => {
                    if let (Some(Entity::Npc(npc)), Some(position)) =
                        (self.scene.get_mut(id), info.position())
                    {
                        let velocity = info.velocity_or(npc.velocity());
                        npc.correct(position, velocity);
                    }
                }
                (Some(BulletState::Destroyed), Some(id)) => self.remove_entity(id),
                _ => debug!("Ignoring record for npc {}", info.npc_id),
            }
        }
    }

    fn apply_player_list_change(&mut self, change: &PlayerListChange) {
        if change.joined {
            self.add_opponent(&change.username, Point::default());
            return;
        }

        match self.player_by_username(&change.username) {
            Some(PlayerRef::Local) => self.disconnect("Disconnected", "Disconnected from server."),
            Some(PlayerRef::Opponent(id)) => {
                info!("{} left the game", change.username);
                self.remove_entity(id);
            }
            None => debug!("Unknown player {} left", change.username),
        }
    }

    fn add_opponent(&mut self, username: &str, position: Point) {
        if self.player_by_username(username).is_some() {
            debug!("Player {} is already known", username);
            return;
        }

        info!("{} joined the game", username);
        let mut opponent = OpponentPlayer::new(username);
        opponent.set_position(position.x, position.y);
        let id = self.scene.insert(None, Entity::Opponent(opponent));
        self.renderer.add_renderable(id);
        self.opponents.push(id);
    }

    /// Removes an entity and everything it contains from the scene, the
    /// renderer and the lookup tables.
    fn remove_entity(&mut self, id: EntityId) {
        if id == self.player {
            return;
        }

        let removed = self.scene.remove(id);
        for removed_id in &removed {
            self.renderer.remove_renderable(*removed_id);
        }
        self.opponents.retain(|opponent| !removed.contains(opponent));
        self.bullets.retain(|_, bullet| !removed.contains(bullet));
        self.npcs.retain(|_, npc| !removed.contains(npc));
    }

    fn apply_points_update(&mut self, points: &PointsUpdate) {
        if self.local_player().username() == points.username {
            self.local_player_mut().set_score(points.num_points);
        }
    }

    fn apply_player_health(&mut self, health: &PlayerHealthMessage) {
        if self.local_player().username() != health.username {
            return;
        }

        self.local_player_mut().set_health(health.health);
        if health.health < 1.0 {
            let message = format!(
                "Killed by {}. You had {} points.",
                health.affected_by,
                self.local_player().score()
            );
            self.disconnect("Player died.", &message);
        }
    }

    fn apply_initial_player_list(&mut self, list: &InitialPlayerList) {
        for player in &list.players {
            self.add_opponent(&player.player_name, player.position());
        }
    }

    fn apply_join_state(&mut self, join: &InitialServerJoinState) {
        info!("Joined as {}", join.initial_username);
        self.auth_token = join.authentication_string.clone();

        let location = join.location();
        let player = self.local_player_mut();
        player.set_username(join.initial_username.clone());
        player.set_position(location.x, location.y);

        if let Some(wanted) = self.config.username.clone() {
            if !wanted.is_empty() && wanted != join.initial_username {
                self.request_username_change(&wanted);
            }
        }
    }

    fn apply_username_status(&mut self, status: &ServerUsernameRequestStatus) {
        if status.succeeded() {
            info!("Username is now {}", status.message);
            self.local_player_mut().set_username(status.message.clone());
        } else {
            warn!("Username change refused: {}", status.message);
        }
    }
}
