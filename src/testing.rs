//! Testing utilities and mock implementations
//!
//! Mock collaborators for exercising the transmit engine on the host without
//! hardware. Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::collections::HashMap;
use std::format;
use std::string::String;
use std::sync::{Mutex, Once};
use std::vec::Vec;

use crate::driver::{TxHooks, TxQueue, XnetWake};
use crate::hal::{DmaChannel, PacketBuffer, TxBufferManager, TxMeta};

// =============================================================================
// Mock DMA Channel
// =============================================================================

/// One recorded channel register operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanOp {
    Start(u8),
    Stop(u8),
    SetBase(u8, u64),
    Goto(u8, u64),
}

/// Channel that records every operation in order
#[derive(Debug, Default)]
pub struct MockChannel {
    ops: Mutex<Vec<ChanOp>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// All operations so far
    pub fn ops(&self) -> Vec<ChanOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Doorbell addresses so far
    pub fn gotos(&self) -> Vec<u64> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                ChanOp::Goto(_, addr) => Some(addr),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded operations
    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    fn record(&self, op: ChanOp) {
        self.ops.lock().unwrap().push(op);
    }
}

impl DmaChannel for MockChannel {
    fn start(&self, chan: u8) {
        self.record(ChanOp::Start(chan));
    }

    fn stop(&self, chan: u8) {
        self.record(ChanOp::Stop(chan));
    }

    fn set_base(&self, chan: u8, addr: u64) {
        self.record(ChanOp::SetBase(chan, addr));
    }

    fn goto(&self, chan: u8, addr: u64) {
        self.record(ChanOp::Goto(chan, addr));
    }
}

// =============================================================================
// Mock Buffer Manager
// =============================================================================

/// Packet handed to [`MockBuffers`]; `dma` doubles as a unique tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPacket {
    pub dma: u64,
    pub len: usize,
    pub adjusted: bool,
    pub meta: TxMeta,
}

impl MockPacket {
    pub fn with_meta(mut self, meta: TxMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_adjusted(mut self, adjusted: bool) -> Self {
        self.adjusted = adjusted;
        self
    }
}

/// Buffer manager tracking which slot holds which packet
#[derive(Debug, Default)]
pub struct MockBuffers {
    fail: AtomicBool,
    staged: Mutex<HashMap<(u8, usize), u64>>,
    freed: Mutex<Vec<(u8, usize)>>,
}

impl MockBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a packet at DMA address `dma`
    pub fn packet(dma: u64, len: usize) -> MockPacket {
        MockPacket {
            dma,
            len,
            adjusted: false,
            meta: TxMeta::default(),
        }
    }

    /// Make `tx_buf_get` fail
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Slots currently holding a buffer
    pub fn staged(&self) -> Vec<((u8, usize), u64)> {
        self.staged
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect()
    }

    /// Slots released so far, in order
    pub fn freed(&self) -> Vec<(u8, usize)> {
        self.freed.lock().unwrap().clone()
    }
}

impl TxBufferManager for MockBuffers {
    type Packet = MockPacket;

    fn tx_buf_get(&self, queue: u8, slot: usize, raw: &MockPacket) -> Option<PacketBuffer> {
        if self.fail.load(Ordering::SeqCst) {
            return None;
        }
        self.staged.lock().unwrap().insert((queue, slot), raw.dma);
        Some(
            PacketBuffer::new(raw.len)
                .with_adjusted(raw.adjusted)
                .with_meta(raw.meta),
        )
    }

    fn tx_buf_dma(&self, queue: u8, slot: usize) -> u64 {
        self.staged
            .lock()
            .unwrap()
            .get(&(queue, slot))
            .copied()
            .unwrap_or(0)
    }

    fn tx_buf_free(&self, queue: u8, slot: usize) {
        self.staged.lock().unwrap().remove(&(queue, slot));
        self.freed.lock().unwrap().push((queue, slot));
    }
}

// =============================================================================
// Mock Hooks
// =============================================================================

/// Hooks counting every call
#[derive(Debug, Default)]
pub struct MockHooks {
    suspends: AtomicUsize,
    resumes: AtomicUsize,
    wakes: AtomicUsize,
}

impl MockHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suspends(&self) -> usize {
        self.suspends.load(Ordering::SeqCst)
    }

    pub fn resumes(&self) -> usize {
        self.resumes.load(Ordering::SeqCst)
    }

    pub fn wakes(&self) -> usize {
        self.wakes.load(Ordering::SeqCst)
    }
}

impl TxHooks for MockHooks {
    fn tx_suspend(&self, _queue: u8) {
        self.suspends.fetch_add(1, Ordering::SeqCst);
    }

    fn tx_resume(&self, _queue: u8) {
        self.resumes.fetch_add(1, Ordering::SeqCst);
    }
}

impl XnetWake for MockHooks {
    fn xnet_wake(&self) {
        self.wakes.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification and yields the thread instead of
/// waiting, so spinning producers let the gate holder run.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: Cell<u64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        self.total_ns.get()
    }

    /// Total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + ns as u64);
        std::thread::yield_now();
    }
}

// =============================================================================
// Log Capture
// =============================================================================

/// Global logger keeping every message for inspection
pub struct CaptureLogger {
    lines: Mutex<Vec<String>>,
}

static LOGGER: CaptureLogger = CaptureLogger {
    lines: Mutex::new(Vec::new()),
};
static LOGGER_INIT: Once = Once::new();

impl CaptureLogger {
    /// Install the capture logger (once per test binary)
    pub fn install() -> &'static CaptureLogger {
        LOGGER_INIT.call_once(|| {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Trace);
            }
        });
        &LOGGER
    }

    /// Check if any captured message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }
}

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let line = format!("{} {}", record.level(), record.args());
        self.lines.lock().unwrap().push(line);
    }

    fn flush(&self) {}
}

// =============================================================================
// Hardware Completion
// =============================================================================

/// Complete the `n` oldest pending descriptors the way the DMA engine does,
/// reporting their full byte count as transferred.
pub fn complete_pending<B: TxBufferManager, const N: usize>(q: &TxQueue<'_, B, N>, n: usize) {
    let curr = q.curr();
    let mut idx = q.dirt();
    for _ in 0..n {
        if idx == curr {
            break;
        }
        let desc = q.descriptor(idx);
        desc.mark_done(desc.len(), false);
        idx = (idx + 1) % N;
    }
}
