use std::time::{Duration, Instant};

use crate::display::{DisplayLink, TransferError};
use crate::input::Keypad;
use crate::render::ball::Ball;
use crate::render::renderer::Renderer;
use crate::render::tiling::{Offset, Tiling};
use crate::scroller::Scroller;

/// The entities of the demo. They outlive the [`Game`] that draws them.
#[derive(Debug, Default)]
pub struct Scene {
    pub tiling: Tiling,
    pub ball: Ball,
}

impl Scene {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tiling: Tiling::new(),
            ball: Ball::new(),
        }
    }
}

/// What a frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frames completed so far, this one included.
    pub frame: u64,
    pub offset: Offset,
    pub velocity: (f32, f32),
    /// Time spent rendering and transferring.
    pub render_time: Duration,
}

/// Frame loop: input, motion, rendering.
pub struct Game<'a, L: DisplayLink> {
    scene: &'a Scene,
    renderer: Renderer<'a, L>,
    scroller: Scroller,
    frame: u64,
}

impl<'a, L: DisplayLink> Game<'a, L> {
    /// Builds the renderer on top of `link`, background first, ball on top.
    pub fn new(scene: &'a Scene, link: L) -> Self {
        let mut renderer = Renderer::new(link);
        renderer.subscribe(&scene.tiling);
        renderer.subscribe(&scene.ball);

        tracing::info!("scene ready");

        Self {
            scene,
            renderer,
            scroller: Scroller::new(),
            frame: 0,
        }
    }

    /// Runs one frame with the buttons held in `keypad`.
    ///
    /// # Errors
    /// A [`TransferError`] means the panel is unusable; the caller should stop.
    pub fn tick(&mut self, keypad: &Keypad) -> Result<FrameReport, TransferError> {
        self.scroller.apply(keypad);
        self.scroller.tick();

        let offset = self.scroller.offset();
        self.scene.tiling.set_offset(offset);

        let started = Instant::now();
        if let Err(error) = self.renderer.draw() {
            tracing::error!("frame {} aborted: {error}", self.frame + 1);
            return Err(error);
        }
        let render_time = started.elapsed();

        self.frame += 1;

        Ok(FrameReport {
            frame: self.frame,
            offset,
            velocity: self.scroller.velocity(),
            render_time,
        })
    }

    #[must_use]
    pub const fn renderer(&self) -> &Renderer<'a, L> {
        &self.renderer
    }

    pub const fn renderer_mut(&mut self) -> &mut Renderer<'a, L> {
        &mut self.renderer
    }

    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Region;
    use crate::display::capture::CaptureLink;
    use crate::input::Button;
    use crate::render::ball::SPRITE;
    use crate::render::{SLICE_COUNT, SliceBuffer};
    use pretty_assertions::assert_eq;

    struct DeadLink;

    impl DisplayLink for DeadLink {
        fn begin_transfer(
            &mut self,
            _region: Region,
            _buffer: Box<SliceBuffer>,
        ) -> Result<(), TransferError> {
            Err(TransferError::Disconnected)
        }

        fn await_transfer(&mut self) -> Result<Box<SliceBuffer>, TransferError> {
            Err(TransferError::BufferLost)
        }
    }

    #[test]
    fn scene_is_subscribed() {
        let scene = Scene::new();
        let game = Game::new(&scene, CaptureLink::new());

        assert!(game.renderer().has_subscribed(&scene.tiling));
        assert!(game.renderer().has_subscribed(&scene.ball));
    }

    #[test]
    fn idle_frame_shows_the_ball_over_the_halo() {
        let scene = Scene::new();
        let mut game = Game::new(&scene, CaptureLink::new());

        let report = game.tick(&Keypad::new()).unwrap();

        assert_eq!(report.frame, 1);
        assert_eq!(report.offset, Offset::default());
        let framebuffer = game.renderer().link().framebuffer();
        assert_eq!(framebuffer[(80, 64)], SPRITE[8 + 8 * 16]);
        assert_eq!(game.renderer().link().transfers(), SLICE_COUNT);
    }

    #[test]
    fn held_button_scrolls_the_tiles() {
        let scene = Scene::new();
        let mut game = Game::new(&scene, CaptureLink::new());
        let mut keypad = Keypad::new();
        keypad.set_button(Button::Right, true);

        let first = game.tick(&keypad).unwrap();
        let second = game.tick(&keypad).unwrap();

        assert_eq!(first.offset, Offset::new(1, 0));
        assert!(second.offset.x > first.offset.x);
        assert_eq!(scene.tiling.offset(), second.offset);
        assert_eq!(game.frame(), 2);
    }

    #[test]
    fn ball_never_moves() {
        let scene = Scene::new();
        let mut game = Game::new(&scene, CaptureLink::new());
        let mut keypad = Keypad::new();
        keypad.set_button(Button::Down, true);

        for _ in 0..5 {
            game.tick(&keypad).unwrap();
        }

        let framebuffer = game.renderer().link().framebuffer();
        for row in 0..16 {
            for col in 0..16 {
                let sprite = SPRITE[col + row * 16];
                if sprite != crate::render::ball::TRANSPARENT_COLOR {
                    assert_eq!(framebuffer[(72 + col, 56 + row)], sprite);
                }
            }
        }
    }

    #[test]
    fn dead_link_stops_the_frame() {
        let scene = Scene::new();
        let mut game = Game::new(&scene, DeadLink);

        assert_eq!(game.tick(&Keypad::new()), Err(TransferError::Disconnected));
        assert_eq!(game.frame(), 0);
    }
}
