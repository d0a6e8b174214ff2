//! # Arena Client Library
//!
//! Client side of the multiplayer arena game: entities, the scene they live in,
//! rendering, input capture, the server connection and the frame loop that ties
//! them together.
//!
//! ## Architecture Overview
//!
//! ### Client-Side Prediction
//! The local player integrates its own movement every frame from the keys held
//! down, so movement responds immediately instead of waiting for a round trip.
//!
//! ### Server Reconciliation
//! The server is authoritative. Position updates overwrite predicted positions
//! directly, and bullets, NPCs and opponents are created and destroyed only in
//! response to server messages.
//!
//! ### Lag Compensation
//! NPCs can optionally keep moving along their last known velocity between
//! server corrections.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! [`game::GameClient`] owns the scene and the renderer, applies server
//! messages, maps input onto the local player and reports the input state.
//!
//! ### Scene and Entities (`scene`, `entity`, `player`, `bullet`, `npc`, `background`)
//! Entities live in a slab-backed tree. Bullets are children of the player that
//! fired them, so removing a player removes its bullets as well.
//!
//! ### Rendering Module (`rendering`, `surface`)
//! The renderer draws an ordered list of entities onto a [`surface::DrawSurface`],
//! either a macroquad window or a recording surface for tests and headless runs.
//!
//! ### Network Module (`network`)
//! Newline-delimited text frames over TCP, bridged to the game through
//! unbounded channels.
//!
//! ### Runner Module (`runner`)
//! The tokio frame loop: frame budget, input, server frames, stall detection and
//! shutdown.
//!
//! ## Usage Example
//!
//! ```no_run
//! use client::config::ClientConfig;
//! use client::game::GameClient;
//! use client::runner::FrameLoop;
//! use client::surface::RecordingSurface;
//!
//! # async fn session() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let (transport, inbound) = client::network::connect("127.0.0.1:8080").await?;
//! let (_input_tx, input_rx) = tokio::sync::mpsc::unbounded_channel();
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let budget = config.frame_budget;
//! let timeout = config.server_timeout;
//! let game = GameClient::new(config, transport);
//! let outcome = FrameLoop::new(
//!     game,
//!     RecordingSurface::new(800.0, 600.0),
//!     inbound,
//!     input_rx,
//!     shutdown_rx,
//!     budget,
//!     timeout,
//! )
//! .run()
//! .await;
//! println!("{:?}", outcome.end);
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod bot;
pub mod bullet;
pub mod config;
pub mod entity;
pub mod game;
pub mod input;
pub mod network;
pub mod npc;
pub mod player;
pub mod rendering;
pub mod runner;
pub mod scene;
pub mod surface;
