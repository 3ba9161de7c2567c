use std::time::Instant;

use super::observer_list::ObserverList;
use super::renderable::Renderable;
use super::{SCREEN_WIDTH, SLICE_COUNT, SLICE_HEIGHT, SliceBuffer, new_slice_buffer};
use crate::display::{DisplayLink, Region, TransferError};

/// Draws the subscribed entities slice by slice, overlapping the computation
/// of a slice with the transfer of the previous one.
///
/// The two slice buffers are owned here. While a buffer is being transferred
/// it belongs to the link, and its slot stays empty until the transfer is
/// awaited.
pub struct Renderer<'a, L: DisplayLink> {
    listeners: ObserverList<'a>,
    buffers: [Option<Box<SliceBuffer>>; 2],
    /// Slot of the buffer currently owned by the link.
    pending: Option<usize>,
    link: L,
}

impl<'a, L: DisplayLink> Renderer<'a, L> {
    pub fn new(link: L) -> Self {
        Self {
            listeners: ObserverList::new(),
            buffers: [Some(new_slice_buffer()), Some(new_slice_buffer())],
            pending: None,
            link,
        }
    }

    /// Appends `renderable` to the compositing order.
    pub fn subscribe(&mut self, renderable: &'a dyn Renderable) {
        self.listeners.subscribe(renderable);
        tracing::debug!("subscribed renderable, {} in scene", self.listeners.len());
    }

    /// Removes `renderable`; does nothing if it was never subscribed.
    pub fn unsubscribe(&mut self, renderable: &dyn Renderable) {
        if self.listeners.unsubscribe(renderable) {
            tracing::debug!("unsubscribed renderable, {} in scene", self.listeners.len());
        }
    }

    #[must_use]
    pub fn has_subscribed(&self, renderable: &dyn Renderable) -> bool {
        self.listeners.has_subscribed(renderable)
    }

    /// Renders and transfers one frame.
    ///
    /// Returns once the last slice has reached the panel.
    ///
    /// # Errors
    /// Any [`TransferError`] raised by the link aborts the frame.
    pub fn draw(&mut self) -> Result<(), TransferError> {
        let started = Instant::now();

        for slice in 0..SLICE_COUNT {
            let slot = slice % 2;
            let slice_y = slice * SLICE_HEIGHT;

            let mut buffer = self.buffers[slot]
                .take()
                .ok_or(TransferError::BufferLost)?;

            self.listeners
                .draw(slice_y, SLICE_HEIGHT, buffer.as_mut_slice());

            if slice != 0 {
                self.wait_for_previous_draw()?;
            }

            self.link.begin_transfer(
                Region::new(0, slice_y, SCREEN_WIDTH, SLICE_HEIGHT),
                buffer,
            )?;
            self.pending = Some(slot);
        }

        self.wait_for_previous_draw()?;

        tracing::trace!("frame drawn in {:?}", started.elapsed());
        Ok(())
    }

    /// Blocks until the buffer in flight is back in its slot.
    fn wait_for_previous_draw(&mut self) -> Result<(), TransferError> {
        if let Some(slot) = self.pending.take() {
            self.buffers[slot] = Some(self.link.await_transfer()?);
        }
        Ok(())
    }

    pub const fn link(&self) -> &L {
        &self.link
    }

    pub const fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}
