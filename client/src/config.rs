use rand::Rng;
use shared::{PLAYER_ACCELERATION, PLAYER_MAX_VELOCITY, WORLD_HEIGHT, WORLD_WIDTH};
use std::time::Duration;

/// Runtime settings for one client session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Username to request once the server has assigned a temporary one.
    pub username: Option<String>,
    pub world_width: f32,
    pub world_height: f32,
    pub acceleration: f32,
    pub max_velocity: f32,
    /// Target duration of one frame. The loop waits out whatever the frame's
    /// work left of it.
    pub frame_budget: Duration,
    /// The input state is reported every this many frames.
    pub input_send_interval: u64,
    /// Run the local NPC motion between server corrections.
    pub lag_compensation: bool,
    /// End the session when the server stays silent this long.
    pub server_timeout: Option<Duration>,
    /// Surface size used for aiming until the first frame is drawn.
    pub surface_width: f32,
    pub surface_height: f32,
}

impl ClientConfig {
    pub fn frames_per_second(fps: u32) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
    }
}

/// A throwaway name for sessions started without `--username`.
pub fn guest_username(rng: &mut impl Rng) -> String {
    format!("guest{:04}", rng.gen_range(0..10_000))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: None,
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            acceleration: PLAYER_ACCELERATION,
            max_velocity: PLAYER_MAX_VELOCITY,
            frame_budget: Self::frames_per_second(30),
            input_send_interval: 4,
            lag_compensation: false,
            server_timeout: Some(Duration::from_secs(10)),
            surface_width: 800.0,
            surface_height: 600.0,
        }
    }
}
