//! # Simulated SPI Panel
//!
//! A panel driven over SPI, running on its own thread. Slice buffers travel
//! to the panel thread and back over two lock-free SPSC rings, the way a DMA
//! channel takes a buffer and releases it when the transfer completes.
//!
//! ```text
//! ┌──────────────────────┐   Requests (SPSC)   ┌──────────────────────────┐
//! │     PanelLink        │ ──────────────────► │      Panel Thread        │
//! │                      │                     │                          │
//! │  begin_transfer()    │                     │  sleep(bus time)         │
//! │  await_transfer()    │   Buffers (SPSC)    │  blit into framebuffer   │
//! │                      │ ◄────────────────── │  hand the buffer back    │
//! └──────────────────────┘                     └────────────┬─────────────┘
//!                                                           │
//!                                              Arc<Mutex<Framebuffer>>
//!                                                           │
//!                                                           ▼
//!                                                        Preview
//! ```
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{DisplayLink, Region, TransferError, check_region};
use crate::render::SliceBuffer;
use crate::render::framebuffer::Framebuffer;

/// SPI clock of the panel bus.
pub const DEFAULT_SPI_CLOCK_HZ: u64 = 24_000_000;

/// Bits on the bus per pixel.
const BITS_PER_PIXEL: u64 = 16;

/// One transfer in flight plus the shutdown request.
const REQUEST_BUFFER_SIZE: usize = 2;
const RETURN_BUFFER_SIZE: usize = 1;

enum PanelRequest {
    Transfer {
        region: Region,
        buffer: Box<SliceBuffer>,
    },
    Shutdown,
}

/// Time the bus needs to shift out `pixels` at `clock_hz`.
#[must_use]
pub fn bus_time(pixels: usize, clock_hz: u64) -> Duration {
    let bits = pixels as u64 * BITS_PER_PIXEL;
    Duration::from_nanos(bits.saturating_mul(1_000_000_000) / clock_hz.max(1))
}

struct PanelThread {
    requests: rtrb::Consumer<PanelRequest>,
    returns: rtrb::Producer<Box<SliceBuffer>>,
    framebuffer: Arc<Mutex<Framebuffer>>,
    clock_hz: u64,
}

impl PanelThread {
    fn run(mut self) {
        loop {
            match self.requests.pop() {
                Ok(PanelRequest::Transfer { region, buffer }) => {
                    if !self.transfer(region, buffer) {
                        tracing::warn!("panel link dropped before the transfer was awaited");
                        return;
                    }
                }
                Ok(PanelRequest::Shutdown) => return,
                Err(_) if self.requests.is_abandoned() => return,
                Err(_) => thread::sleep(Duration::from_micros(50)),
            }
        }
    }

    /// Pushes the buffer through the bus. Returns false when nobody is left
    /// to take the buffer back.
    fn transfer(&mut self, region: Region, buffer: Box<SliceBuffer>) -> bool {
        thread::sleep(bus_time(region.len(), self.clock_hz));

        match self.framebuffer.lock() {
            Ok(mut framebuffer) => {
                if let Err(error) = framebuffer.blit(region, buffer.as_slice()) {
                    tracing::warn!("panel rejected transfer: {error}");
                }
            }
            Err(_) => tracing::error!("panel framebuffer poisoned"),
        }

        if self.returns.is_abandoned() {
            return false;
        }
        self.returns.push(buffer).is_ok()
    }
}

/// Link to a [`PanelThread`] drawing into a shared [`Framebuffer`].
pub struct PanelLink {
    requests: rtrb::Producer<PanelRequest>,
    returns: rtrb::Consumer<Box<SliceBuffer>>,
    in_flight: bool,
    thread_handle: Option<JoinHandle<()>>,
}

impl PanelLink {
    /// Starts a panel clocked at [`DEFAULT_SPI_CLOCK_HZ`].
    ///
    /// # Errors
    /// Fails if the panel thread cannot be spawned.
    pub fn spawn(framebuffer: Arc<Mutex<Framebuffer>>) -> std::io::Result<Self> {
        Self::with_clock(framebuffer, DEFAULT_SPI_CLOCK_HZ)
    }

    /// Starts a panel whose bus runs at `clock_hz`.
    ///
    /// # Errors
    /// Fails if the panel thread cannot be spawned.
    pub fn with_clock(
        framebuffer: Arc<Mutex<Framebuffer>>,
        clock_hz: u64,
    ) -> std::io::Result<Self> {
        let (requests, request_rx) = rtrb::RingBuffer::new(REQUEST_BUFFER_SIZE);
        let (return_tx, returns) = rtrb::RingBuffer::new(RETURN_BUFFER_SIZE);

        let panel = PanelThread {
            requests: request_rx,
            returns: return_tx,
            framebuffer,
            clock_hz,
        };

        let thread_handle = thread::Builder::new()
            .name("panel".into())
            .spawn(move || panel.run())?;

        tracing::debug!("panel thread started, bus at {clock_hz} Hz");

        Ok(Self {
            requests,
            returns,
            in_flight: false,
            thread_handle: Some(thread_handle),
        })
    }
}

impl DisplayLink for PanelLink {
    fn begin_transfer(
        &mut self,
        region: Region,
        buffer: Box<SliceBuffer>,
    ) -> Result<(), TransferError> {
        if self.in_flight {
            return Err(TransferError::Busy);
        }
        check_region(region)?;

        if self.requests.is_abandoned() {
            return Err(TransferError::Disconnected);
        }

        self.requests
            .push(PanelRequest::Transfer { region, buffer })
            .map_err(|_| TransferError::Busy)?;
        self.in_flight = true;

        Ok(())
    }

    fn await_transfer(&mut self) -> Result<Box<SliceBuffer>, TransferError> {
        if !self.in_flight {
            return Err(TransferError::BufferLost);
        }

        loop {
            match self.returns.pop() {
                Ok(buffer) => {
                    self.in_flight = false;
                    return Ok(buffer);
                }
                Err(_) if self.returns.is_abandoned() => {
                    tracing::error!("panel thread went away with a buffer in flight");
                    return Err(TransferError::Disconnected);
                }
                Err(_) => thread::yield_now(),
            }
        }
    }
}

impl Drop for PanelLink {
    fn drop(&mut self) {
        let _ = self.requests.push(PanelRequest::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}
