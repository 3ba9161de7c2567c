use super::{DisplayLink, Region, TransferError, check_region};
use crate::render::SliceBuffer;
use crate::render::framebuffer::Framebuffer;

/// What happened on a [`CaptureLink`], in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A transfer began; `buffer` is the address of the slice buffer.
    Begin { region: Region, buffer: usize },
    /// The transfer of the buffer at this address was awaited.
    Await { buffer: usize },
}

/// Synchronous in-memory link.
///
/// Every transfer completes as soon as it begins: the slice is copied into a
/// [`Framebuffer`] and the buffer is parked until it is awaited. Each call is
/// recorded so the order in which the renderer drives the link can be
/// checked afterwards.
#[derive(Debug, Default)]
pub struct CaptureLink {
    framebuffer: Framebuffer,
    in_flight: Option<Box<SliceBuffer>>,
    events: Vec<LinkEvent>,
    transfers: usize,
}

impl CaptureLink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    #[must_use]
    pub fn events(&self) -> &[LinkEvent] {
        &self.events
    }

    /// Forgets the recorded events, keeps the framebuffer.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Number of transfers completed since creation.
    #[must_use]
    pub const fn transfers(&self) -> usize {
        self.transfers
    }
}

fn address(buffer: &SliceBuffer) -> usize {
    std::ptr::from_ref(buffer).addr()
}

impl DisplayLink for CaptureLink {
    fn begin_transfer(
        &mut self,
        region: Region,
        buffer: Box<SliceBuffer>,
    ) -> Result<(), TransferError> {
        if self.in_flight.is_some() {
            return Err(TransferError::Busy);
        }
        check_region(region)?;

        self.framebuffer.blit(region, buffer.as_slice())?;
        self.events.push(LinkEvent::Begin {
            region,
            buffer: address(&buffer),
        });
        self.in_flight = Some(buffer);

        Ok(())
    }

    fn await_transfer(&mut self) -> Result<Box<SliceBuffer>, TransferError> {
        let buffer = self.in_flight.take().ok_or(TransferError::BufferLost)?;

        self.events.push(LinkEvent::Await {
            buffer: address(&buffer),
        });
        self.transfers += 1;

        Ok(buffer)
    }
}
