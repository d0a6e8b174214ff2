//! Scripted input for headless sessions (soak testing a server without a
//! window).

use crate::input::{InputEvent, KEY_A, KEY_D, KEY_S, KEY_W, MOUSE_LEFT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const KEYS: [u32; 4] = [KEY_W, KEY_A, KEY_S, KEY_D];
const KEY_TOGGLE_CHANCE: f32 = 0.02;
const SHOOT_TOGGLE_CHANCE: f32 = 0.01;
const AIM_CHANCE: f32 = 0.05;

#[derive(Debug, Clone)]
pub enum Bot {
    /// Randomly toggles movement keys, shooting and aim.
    Random {
        rng: StdRng,
        held: [bool; 4],
        shooting: bool,
        surface: (f32, f32),
    },
    /// Walks left and right, switching every `period` ticks.
    LeftRight {
        period: u32,
        ticks_left: u32,
        right: bool,
        started: bool,
    },
}

impl Bot {
    pub fn random(surface_width: f32, surface_height: f32) -> Self {
        Self::random_with_rng(StdRng::from_entropy(), surface_width, surface_height)
    }

    pub fn random_with_rng(rng: StdRng, surface_width: f32, surface_height: f32) -> Self {
        Bot::Random {
            rng,
            held: [false; 4],
            shooting: false,
            surface: (surface_width, surface_height),
        }
    }

    pub fn left_right(period: u32) -> Self {
        Bot::LeftRight {
            period: period.max(1),
            ticks_left: period.max(1),
            right: true,
            started: false,
        }
    }

    /// Input events for one bot tick.
    pub fn next_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        match self {
            Bot::Random {
                rng,
                held,
                shooting,
                surface,
            } => {
                for (code, down) in KEYS.iter().zip(held.iter_mut()) {
                    if rng.gen::<f32>() < KEY_TOGGLE_CHANCE {
                        *down = !*down;
                        events.push(if *down {
                            InputEvent::KeyDown(*code)
                        } else {
                            InputEvent::KeyUp(*code)
                        });
                    }
                }

                if rng.gen::<f32>() < SHOOT_TOGGLE_CHANCE {
                    *shooting = !*shooting;
                    events.push(if *shooting {
                        InputEvent::MouseDown(MOUSE_LEFT)
                    } else {
                        InputEvent::MouseUp(MOUSE_LEFT)
                    });
                }

                if rng.gen::<f32>() < AIM_CHANCE {
                    events.push(InputEvent::MouseMove {
                        x: rng.gen_range(0.0..=surface.0),
                        y: rng.gen_range(0.0..=surface.1),
                    });
                }
            }
            Bot::LeftRight {
                period,
                ticks_left,
                right,
                started,
            } => {
                if !*started {
                    *started = true;
                    events.push(InputEvent::KeyDown(KEY_D));
                    return events;
                }

                *ticks_left -= 1;
                if *ticks_left == 0 {
                    *ticks_left = *period;
                    let (release, press) = if *right { (KEY_D, KEY_A) } else { (KEY_A, KEY_D) };
                    *right = !*right;
                    events.push(InputEvent::KeyUp(release));
                    events.push(InputEvent::KeyDown(press));
                }
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_right_alternates() {
        let mut bot = Bot::left_right(2);

        assert_eq!(bot.next_events(), vec![InputEvent::KeyDown(KEY_D)]);
        assert!(bot.next_events().is_empty());
        assert_eq!(
            bot.next_events(),
            vec![InputEvent::KeyUp(KEY_D), InputEvent::KeyDown(KEY_A)]
        );
        assert!(bot.next_events().is_empty());
        assert_eq!(
            bot.next_events(),
            vec![InputEvent::KeyUp(KEY_A), InputEvent::KeyDown(KEY_D)]
        );
    }

    #[test]
    fn test_random_bot_keeps_key_events_consistent() {
        let mut bot = Bot::random_with_rng(StdRng::seed_from_u64(7), 800.0, 600.0);
        let mut held = [false; 4];

        for _ in 0..2000 {
            for event in bot.next_events() {
                match event {
                    InputEvent::KeyDown(code) | InputEvent::KeyUp(code) => {
                        let index = KEYS.iter().position(|k| *k == code).unwrap();
                        let down = matches!(event, InputEvent::KeyDown(_));
                        // Every event flips the key's state.
                        assert_ne!(held[index], down);
                        held[index] = down;
                    }
                    InputEvent::MouseMove { x, y } => {
                        assert!((0.0..=800.0).contains(&x));
                        assert!((0.0..=600.0).contains(&y));
                    }
                    InputEvent::MouseDown(_) | InputEvent::MouseUp(_) => {}
                }
            }
        }
    }
}
