//! # Game Thread
//!
//! Runs the frame loop on a dedicated thread at a fixed frame rate, so the
//! preview window never waits for the panel. The UI talks to it over
//! lock-free SPSC channels.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────┐              ┌─────────────────────────────┐
//! │      Game Thread        │              │        UI Thread            │
//! │                         │   Commands   │                             │
//! │  ┌─────────────────┐    │ ◄─────────── │    ┌─────────────────────┐  │
//! │  │ Scene + Game    │    │   (SPSC)     │    │     GameHandle      │  │
//! │  │ (owned here)    │    │              │    │                     │  │
//! │  └────────┬────────┘    │   Events     │    │  - send commands    │  │
//! │           │             │ ───────────► │    │  - poll events      │  │
//! │           ▼             │   (SPSC)     │    └─────────────────────┘  │
//! │  loop {                 │              │                             │
//! │    process commands     │              │                             │
//! │    if running and due:  │              │                             │
//! │      game.tick()        │              │                             │
//! │      send stats         │              │                             │
//! │  }                      │              │                             │
//! └───────────┬─────────────┘              └─────────────────────────────┘
//!             │ PanelLink
//!             ▼
//!       Panel Thread ──► Arc<Mutex<Framebuffer>> ──► PanelDisplay
//! ```

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use engine::display::TransferError;
use engine::display::panel::PanelLink;
use engine::game::{FrameReport, Game, Scene};
pub use engine::input::Button;
use engine::input::Keypad;
use engine::render::framebuffer::Framebuffer;

/// Frame rate of the handheld the effect targets.
pub const DEFAULT_FPS: u32 = 25;

/// Channel buffer sizes
const COMMAND_BUFFER_SIZE: usize = 64;
const EVENT_BUFFER_SIZE: usize = 64;

/// Longest nap while waiting for the next frame, so commands stay responsive.
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// Commands sent from the UI thread to the game thread.
#[derive(Debug, Clone, Copy)]
pub enum GameCommand {
    /// Run frames continuously.
    Run,
    /// Stop after the current frame.
    Pause,
    /// Run N frames then pause.
    Step(u32),
    /// Set button state (pressed or released).
    SetKey { button: Button, pressed: bool },
    /// Stop the game thread.
    Shutdown,
}

/// Events sent from the game thread to the UI thread.
#[derive(Debug, Clone, Copy)]
pub enum GameEvent {
    Frame(FrameStats),
    Paused,
    /// The panel failed; the thread has exited.
    Stopped(TransferError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub report: FrameReport,
    /// Time between the start of this frame and the previous one.
    pub frame_time: Duration,
}

/// What the UI knows about the game thread.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub last_frame: Option<FrameStats>,
    pub is_running: bool,
    /// Buttons as last sent to the game thread.
    pub keypad: Keypad,
    pub error: Option<TransferError>,
}

struct GameThread {
    cmd_rx: rtrb::Consumer<GameCommand>,
    event_tx: rtrb::Producer<GameEvent>,
    keypad: Keypad,
    running: bool,
    steps_remaining: u32,
    frame_interval: Duration,
}

impl GameThread {
    fn run(mut self, link: PanelLink) {
        let scene = Scene::new();
        let mut game = Game::new(&scene, link);
        let mut next_frame = Instant::now();
        let mut last_frame: Option<Instant> = None;

        loop {
            if self.process_commands() {
                tracing::debug!("game thread shutting down after {} frames", game.frame());
                return;
            }

            if !self.running && self.steps_remaining == 0 {
                last_frame = None;
                thread::sleep(IDLE_SLEEP);
                continue;
            }

            let now = Instant::now();
            if now < next_frame {
                thread::sleep((next_frame - now).min(IDLE_SLEEP));
                continue;
            }
            next_frame = now + self.frame_interval;

            match game.tick(&self.keypad) {
                Ok(report) => {
                    let frame_time = last_frame.map_or(Duration::ZERO, |last| now - last);
                    last_frame = Some(now);
                    self.send_event(GameEvent::Frame(FrameStats { report, frame_time }));
                }
                Err(error) => {
                    self.send_event(GameEvent::Stopped(error));
                    return;
                }
            }

            if self.steps_remaining > 0 {
                self.steps_remaining -= 1;
                if self.steps_remaining == 0 {
                    self.send_event(GameEvent::Paused);
                }
            }
        }
    }

    /// Process all pending commands. Returns true if should shutdown.
    fn process_commands(&mut self) -> bool {
        while let Ok(cmd) = self.cmd_rx.pop() {
            match cmd {
                GameCommand::Run => {
                    self.running = true;
                    self.steps_remaining = 0;
                }
                GameCommand::Pause => {
                    self.running = false;
                    self.steps_remaining = 0;
                    self.send_event(GameEvent::Paused);
                }
                GameCommand::Step(count) => {
                    self.running = false;
                    self.steps_remaining = count;
                }
                GameCommand::SetKey { button, pressed } => {
                    self.keypad.set_button(button, pressed);
                }
                GameCommand::Shutdown => return true,
            }
        }

        self.cmd_rx.is_abandoned()
    }

    /// Send an event to the UI (non-blocking, drops if full).
    fn send_event(&mut self, event: GameEvent) {
        let _ = self.event_tx.push(event);
    }
}

/// Handle for the UI thread to communicate with the game thread.
pub struct GameHandle {
    cmd_tx: rtrb::Producer<GameCommand>,
    event_rx: rtrb::Consumer<GameEvent>,
    thread_handle: Option<JoinHandle<()>>,

    /// Latest state reported by the game thread.
    pub state: GameState,
}

impl GameHandle {
    /// Starts the panel and the game thread, running at `fps` frames per
    /// second into `framebuffer`.
    ///
    /// # Errors
    /// Fails if one of the two threads cannot be spawned.
    pub fn spawn(framebuffer: Arc<Mutex<Framebuffer>>, fps: u32) -> std::io::Result<Self> {
        let link = PanelLink::spawn(framebuffer)?;

        let (cmd_tx, cmd_rx) = rtrb::RingBuffer::new(COMMAND_BUFFER_SIZE);
        let (event_tx, event_rx) = rtrb::RingBuffer::new(EVENT_BUFFER_SIZE);

        let game = GameThread {
            cmd_rx,
            event_tx,
            keypad: Keypad::new(),
            running: true,
            steps_remaining: 0,
            frame_interval: Duration::from_secs(1) / fps.max(1),
        };

        let thread_handle = thread::Builder::new()
            .name("game".into())
            .spawn(move || game.run(link))?;

        tracing::info!("game thread started at {fps} fps");

        Ok(Self {
            cmd_tx,
            event_rx,
            thread_handle: Some(thread_handle),
            state: GameState {
                is_running: true,
                ..GameState::default()
            },
        })
    }

    /// Send a command to the game thread.
    pub fn send(&mut self, cmd: GameCommand) {
        match cmd {
            GameCommand::SetKey { button, pressed } => {
                self.state.keypad.set_button(button, pressed);
            }
            GameCommand::Run => self.state.is_running = true,
            GameCommand::Pause | GameCommand::Step(_) => self.state.is_running = false,
            GameCommand::Shutdown => {}
        }
        let _ = self.cmd_tx.push(cmd);
    }

    /// Poll for events and update cached state.
    pub fn poll(&mut self) {
        while let Ok(event) = self.event_rx.pop() {
            match event {
                GameEvent::Frame(stats) => {
                    self.state.last_frame = Some(stats);
                }
                GameEvent::Paused => {
                    self.state.is_running = false;
                }
                GameEvent::Stopped(error) => {
                    tracing::error!("game stopped: {error}");
                    self.state.is_running = false;
                    self.state.error = Some(error);
                }
            }
        }
    }
}

impl Drop for GameHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.push(GameCommand::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::render::ball::SPRITE;
    use engine::render::tiling::Offset;
    use pretty_assertions::assert_eq;

    /// Polls until `done` holds or a couple of seconds went by.
    fn poll_until(handle: &mut GameHandle, done: impl Fn(&GameState) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            handle.poll();
            if done(&handle.state) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn frames_reach_the_shared_framebuffer() {
        let framebuffer = Arc::new(Mutex::new(Framebuffer::new()));
        let mut handle = GameHandle::spawn(Arc::clone(&framebuffer), 100).unwrap();

        assert!(poll_until(&mut handle, |state| state.last_frame.is_some()));

        assert_eq!(framebuffer.lock().unwrap()[(80, 64)], SPRITE[8 + 8 * 16]);
    }

    #[test]
    fn step_runs_the_requested_frames_then_pauses() {
        let framebuffer = Arc::new(Mutex::new(Framebuffer::new()));
        let mut handle = GameHandle::spawn(framebuffer, 100).unwrap();
        handle.send(GameCommand::Pause);
        handle.poll();

        handle.send(GameCommand::SetKey {
            button: Button::Right,
            pressed: true,
        });
        handle.send(GameCommand::Step(1));
        assert!(poll_until(&mut handle, |state| {
            state
                .last_frame
                .is_some_and(|stats| stats.report.offset.x > 0)
        }));

        assert!(!handle.state.is_running);
        assert!(handle.state.keypad.is_pressed(Button::Right));
        let stats = handle.state.last_frame.unwrap();
        assert_eq!(stats.report.offset.y, 0);
        assert!(stats.report.offset != Offset::default());
    }

    #[test]
    fn dropping_the_handle_stops_the_threads() {
        let framebuffer = Arc::new(Mutex::new(Framebuffer::new()));
        let handle = GameHandle::spawn(Arc::clone(&framebuffer), 100).unwrap();

        drop(handle);

        assert_eq!(Arc::strong_count(&framebuffer), 1);
    }
}
