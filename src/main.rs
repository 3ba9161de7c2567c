use std::{
    env,
    error::Error,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use engine::display::capture::CaptureLink;
use engine::game::{Game, Scene};
use engine::input::Keypad;
use engine::render::{SCREEN_HEIGHT, SCREEN_WIDTH};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use ui::{app::App, game_thread::DEFAULT_FPS};

const USAGE: &str = "usage: shading-effect [--log-file] [--fps <n>] [--headless <frames>]";

/// Window zoom over the panel resolution.
const WINDOW_SCALE: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    log_file: bool,
    fps: u32,
    headless: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            log_file: false,
            fps: DEFAULT_FPS,
            headless: None,
        }
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--log-file" => options.log_file = true,
            "--fps" => {
                let value = args.next().ok_or("--fps needs a value")?;
                options.fps = match value.parse() {
                    Ok(0) | Err(_) => return Err(format!("invalid frame rate: {value}")),
                    Ok(fps) => fps,
                };
            }
            "--headless" => {
                let value = args.next().ok_or("--headless needs a frame count")?;
                let frames = value
                    .parse()
                    .map_err(|_| format!("invalid frame count: {value}"))?;
                options.headless = Some(frames);
            }
            other => return Err(format!("unknown argument: {other}\n{USAGE}")),
        }
    }

    Ok(options)
}

/// Installs the global subscriber. The returned guard flushes the log file
/// when dropped, so it must live until the end of `main`.
fn init_logging(log_file: bool) -> Result<Option<WorkerGuard>, Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if !log_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|error| -> Box<dyn Error> { error })?;
        return Ok(None);
    }

    let started = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let file_name = format!("shading-effect-{started}.log");
    let directory = env::temp_dir();
    let appender = tracing_appender::rolling::never(&directory, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|error| -> Box<dyn Error> { error })?;

    println!("logging to {}", directory.join(file_name).display());
    Ok(Some(guard))
}

/// Renders `frames` frames in memory and prints the checksum of the last one.
#[allow(clippy::cast_precision_loss)]
fn run_headless(frames: u64) -> Result<(), Box<dyn Error>> {
    let scene = Scene::new();
    let mut game = Game::new(&scene, CaptureLink::new());
    let keypad = Keypad::new();
    let mut render_time = Duration::ZERO;

    for _ in 0..frames {
        render_time += game.tick(&keypad)?.render_time;
    }

    let checksum = game.renderer().link().framebuffer().checksum();
    println!("frames: {frames}");
    println!("checksum: {checksum:016x}");
    if frames > 0 {
        let average = render_time.as_secs_f64() * 1000.0 / frames as f64;
        println!("average render time: {average:.3} ms");
    }

    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn main() -> Result<(), Box<dyn Error>> {
    let options = parse_args(env::args().skip(1))?;
    let _guard = init_logging(options.log_file)?;

    tracing::info!("shading-effect v{}", env!("CARGO_PKG_VERSION"));

    if let Some(frames) = options.headless {
        return run_headless(frames);
    }

    let app = App::new(options.fps)?;

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([
                SCREEN_WIDTH as f32 * WINDOW_SCALE,
                SCREEN_HEIGHT as f32 * WINDOW_SCALE,
            ])
            .with_title("Shading Effect"),
        ..Default::default()
    };

    eframe::run_native(
        "Shading Effect",
        native_options,
        Box::new(|_| Ok(Box::new(app))),
    )?;

    Ok(())
}
