use clap::{Parser, ValueEnum};
use client::bot::Bot;
use client::config::{guest_username, ClientConfig};
use client::game::{ClientState, GameClient};
use client::input::InputManager;
use client::network::{self, ChannelTransport, Inbound};
use client::runner::{apply_inbound, FrameLoop, FrameScheduler, ServerWatchdog, SessionEnd};
use client::surface::{MacroquadSurface, RecordingSurface};
use log::{error, info};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Username to request after joining (a guest name is generated otherwise)
    #[arg(short = 'u', long)]
    username: Option<String>,

    /// Window width
    #[arg(short = 'w', long, default_value = "800")]
    width: u32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "600")]
    height: u32,

    /// Target frames per second
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Report the input state every this many frames
    #[arg(long, default_value = "4")]
    send_interval: u64,

    /// Keep NPCs moving between server updates
    #[arg(long)]
    lag_compensation: bool,

    /// Seconds without a server message before giving up (0 disables)
    #[arg(long, default_value = "10")]
    server_timeout: u64,

    /// Run without a window, driven by an input bot
    #[arg(long)]
    headless: bool,

    /// Input bot used in headless mode
    #[arg(long, value_enum, default_value_t = BotKind::Random)]
    bot: BotKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BotKind {
    /// Random movement, aim and shooting
    Random,
    /// Walk left and right, switching once a second
    LeftRight,
}

impl BotKind {
    fn build(self, config: &ClientConfig) -> Bot {
        match self {
            BotKind::Random => Bot::random(config.surface_width, config.surface_height),
            BotKind::LeftRight => {
                let frames_per_second = (1.0 / config.frame_budget.as_secs_f64()).round() as u32;
                Bot::left_right(frames_per_second)
            }
        }
    }
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        let username = self
            .username
            .clone()
            .unwrap_or_else(|| guest_username(&mut rand::thread_rng()));

        ClientConfig {
            username: Some(username),
            frame_budget: ClientConfig::frames_per_second(self.fps),
            input_send_interval: self.send_interval.max(1),
            lag_compensation: self.lag_compensation,
            server_timeout: Some(Duration::from_secs(self.server_timeout)),
            surface_width: self.width as f32,
            surface_height: self.height as f32,
            ..ClientConfig::default()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let config = args.client_config();

    // The window runs its own executor on the main thread; the socket tasks
    // live on a separate tokio runtime and talk to it through channels.
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    let (transport, inbound) = rt.block_on(network::connect(&args.server))?;
    info!("Controls: WASD to move, mouse to aim, left click to shoot");

    if args.headless {
        rt.block_on(run_headless(config, args.bot, transport, inbound));
        return Ok(());
    }

    let window = macroquad::window::Conf {
        window_title: "Arena".to_string(),
        window_width: args.width as i32,
        window_height: args.height as i32,
        ..Default::default()
    };
    macroquad::Window::from_config(window, run_window(config, transport, inbound));

    drop(rt);
    Ok(())
}

async fn run_headless(
    config: ClientConfig,
    bot_kind: BotKind,
    transport: ChannelTransport,
    inbound: mpsc::UnboundedReceiver<Inbound>,
) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (input_tx, input_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("CTRL+C received, shutting down"),
            Err(e) => error!("Failed to listen for CTRL+C: {}", e),
        }
        let _ = shutdown_tx.send(true);
    });

    let mut bot = bot_kind.build(&config);
    let bot_period = config.frame_budget;
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(bot_period);
        loop {
            ticks.tick().await;
            for event in bot.next_events() {
                if input_tx.send(event).is_err() {
                    return;
                }
            }
        }
    });

    let budget = config.frame_budget;
    let timeout = config.server_timeout;
    let surface = RecordingSurface::new(config.surface_width, config.surface_height);
    let game = GameClient::new(config, transport);

    let outcome = FrameLoop::new(game, surface, inbound, input_rx, shutdown_rx, budget, timeout)
        .run()
        .await;

    match outcome.end {
        SessionEnd::Disconnected { reason } => info!("Session ended: {}", reason),
        SessionEnd::Shutdown => info!("Session stopped"),
    }
}

async fn run_window(
    config: ClientConfig,
    transport: ChannelTransport,
    mut inbound: mpsc::UnboundedReceiver<Inbound>,
) {
    use macroquad::color::{BLACK, WHITE};
    use macroquad::text::draw_text;
    use macroquad::window::{clear_background, next_frame};

    let mut scheduler = FrameScheduler::new(config.frame_budget);
    let mut watchdog = ServerWatchdog::new(config.server_timeout, Instant::now());
    let mut game = GameClient::new(config, transport);
    let mut input = InputManager::new();
    let mut surface = MacroquadSurface;
    let mut next_game_frame = Instant::now();

    game.start();

    loop {
        loop {
            match inbound.try_recv() {
                Ok(event) => apply_inbound(&mut game, &mut watchdog, Some(event)),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    apply_inbound(&mut game, &mut watchdog, None);
                    break;
                }
            }
        }

        for event in input.poll() {
            game.handle_input(event);
        }

        let now = Instant::now();
        if watchdog.expired(now) {
            game.handle_server_timeout();
        }
        if game.is_disconnected() {
            break;
        }

        // The window presents at its own rate; game frames follow the budget.
        if now >= next_game_frame {
            let elapsed_ms = scheduler.begin_frame(now);
            game.frame(elapsed_ms, &mut surface);
            next_game_frame = Instant::now() + scheduler.remaining_budget(now.elapsed());
        } else {
            game.redraw(&mut surface);
        }

        next_frame().await;
    }

    let reason = match game.state() {
        ClientState::Disconnected { reason } => reason.clone(),
        _ => String::new(),
    };

    loop {
        clear_background(BLACK);
        draw_text(&reason, 20.0, 40.0, 30.0, WHITE);
        next_frame().await;
    }
}
