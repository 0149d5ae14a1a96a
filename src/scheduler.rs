//! Evaluate/drive scheduler.
//!
//! Two futures share one [`Gate`]. Evaluate runs the control engine once
//! per tick and publishes the complete state vector; Drive waits on the
//! gate, packs the vector into a bitmap and writes it to the output port.
//! A third future periodically dumps the live config to the log.
//!
//! ```text
//!  ┌────────────────────────────────────────────────────────────┐
//!  │  Scheduler thread (App core)                               │
//!  │  ┌──────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                        │  │
//!  │  │                                                      │  │
//!  │  │  ┌────────────┐   publish   ┌────────┐   take        │  │
//!  │  │  │ Evaluate   │ ──────────▶ │  Gate  │ ──────────▶   │  │
//!  │  │  │ tick ⏱     │             │ 1 slot │   Drive       │  │
//!  │  │  └────────────┘             └────────┘   (wake)      │  │
//!  │  │  ┌────────────┐                                      │  │
//!  │  │  │ Report ⏱   │  config dump to log                  │  │
//!  │  │  └────────────┘                                      │  │
//!  │  └──────────────────────────────────────────────────────┘  │
//!  └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate holds at most one vector. Publishing overwrites an unconsumed
//! one, so Drive always sees the latest complete pass and never a mix of
//! two. A failed write leaves the gate empty and the phase `Faulted`; the
//! next tick's fresh vector is what gets retried.

use core::sync::atomic::{AtomicU8, AtomicU16, Ordering};
use core::time::Duration;
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{info, warn};

use crate::app::context::RoomContext;
use crate::app::ports::{ClockPort, OutputError, OutputPort, StoragePort};
use crate::config::SystemConfig;
use crate::control::{ControlEngine, OutputStates};
use crate::drivers::task_pin::{self, Core};
use crate::drivers::watchdog::Watchdog;

// ═══════════════════════════════════════════════════════════════
//  Gate
// ═══════════════════════════════════════════════════════════════

/// Handoff phase between the two stages.
///
/// ```text
///   Idle ──publish──▶ Evaluated ──take──▶ Driving ──ok──▶ Idle
///                         ▲                  │
///                         └──publish── Faulted ◀──err──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Idle = 0,
    Evaluated = 1,
    Driving = 2,
    Faulted = 3,
}

impl Phase {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Evaluated,
            2 => Self::Driving,
            3 => Self::Faulted,
            _ => Self::Idle,
        }
    }
}

/// Bit 8 marks a valid bitmap in the low byte.
const DRIVEN_VALID: u16 = 0x100;

/// Single-slot handoff from Evaluate to Drive.
pub struct Gate {
    slot: Signal<CriticalSectionRawMutex, OutputStates>,
    phase: AtomicU8,
    last_driven: AtomicU16,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate {
    pub const fn new() -> Self {
        Self {
            slot: Signal::new(),
            phase: AtomicU8::new(Phase::Idle as u8),
            last_driven: AtomicU16::new(0),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Bitmap of the last successful write, `None` before the first.
    pub fn last_driven(&self) -> Option<u8> {
        let raw = self.last_driven.load(Ordering::Acquire);
        (raw & DRIVEN_VALID != 0).then_some(raw as u8)
    }

    /// Whether a published vector is waiting for Drive.
    pub fn is_pending(&self) -> bool {
        self.slot.signaled()
    }

    /// Hand a complete pass to Drive, replacing any unconsumed one.
    pub fn publish(&self, states: OutputStates) {
        self.slot.signal(states);
        self.phase.store(Phase::Evaluated as u8, Ordering::Release);
    }

    /// Wait for the next published pass.
    pub async fn take(&self) -> OutputStates {
        let states = self.slot.wait().await;
        self.phase.store(Phase::Driving as u8, Ordering::Release);
        states
    }

    /// Non-blocking [`take`](Self::take).
    pub fn try_take(&self) -> Option<OutputStates> {
        let states = self.slot.try_take()?;
        self.phase.store(Phase::Driving as u8, Ordering::Release);
        Some(states)
    }

    fn acknowledge(&self, bitmap: u8) {
        self.last_driven
            .store(DRIVEN_VALID | u16::from(bitmap), Ordering::Release);
        self.settle(Phase::Idle);
    }

    fn fault(&self) {
        self.settle(Phase::Faulted);
    }

    /// Leave `Driving`, unless a newer pass was published meanwhile.
    fn settle(&self, next: Phase) {
        let _ = self.phase.compare_exchange(
            Phase::Driving as u8,
            next as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

// ═══════════════════════════════════════════════════════════════
//  Stages
// ═══════════════════════════════════════════════════════════════

/// Evaluate stage: engine plus the inputs it reads.
pub struct Evaluator<S, C> {
    ctx: Arc<RoomContext<S>>,
    clock: C,
    engine: ControlEngine,
}

impl<S: StoragePort, C: ClockPort> Evaluator<S, C> {
    pub fn new(ctx: Arc<RoomContext<S>>, clock: C) -> Self {
        Self {
            ctx,
            clock,
            engine: ControlEngine::new(),
        }
    }

    pub fn engine(&self) -> &ControlEngine {
        &self.engine
    }

    /// Run one full pass and publish it.
    pub fn tick(&mut self, gate: &Gate) -> OutputStates {
        let ctod = self.clock.seconds_of_day();
        let states = self.engine.evaluate(&self.ctx, ctod);
        gate.publish(states);
        states
    }
}

/// Drive stage: owns the output port.
pub struct Driver<O> {
    output: O,
    failing: bool,
}

impl<O: OutputPort> Driver<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            failing: false,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Write one taken vector and settle the gate phase.
    pub fn drive(&mut self, gate: &Gate, states: OutputStates) -> Result<(), OutputError> {
        let bitmap = states.bitmap();
        match self.output.write(bitmap) {
            Ok(()) => {
                if self.failing {
                    info!("Drive: output write recovered ({:#010b})", bitmap);
                    self.failing = false;
                }
                gate.acknowledge(bitmap);
                Ok(())
            }
            Err(e) => {
                if !self.failing {
                    warn!("Drive: output write failed: {} (retrying next tick)", e);
                    self.failing = true;
                }
                gate.fault();
                Err(e)
            }
        }
    }

    /// Drive whatever is waiting in the gate. `None` if nothing was.
    pub fn drive_pending(&mut self, gate: &Gate) -> Option<Result<(), OutputError>> {
        let states = gate.try_take()?;
        Some(self.drive(gate, states))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Async loops
// ═══════════════════════════════════════════════════════════════

async fn evaluate_loop<S: StoragePort, C: ClockPort>(
    mut evaluator: Evaluator<S, C>,
    gate: Arc<Gate>,
    watchdog: Watchdog,
    tick: Duration,
) {
    loop {
        watchdog.feed();
        evaluator.tick(&gate);
        async_io_mini::Timer::after(tick).await;
    }
}

async fn drive_loop<O: OutputPort>(mut driver: Driver<O>, gate: Arc<Gate>) {
    loop {
        let states = gate.take().await;
        // Failures are logged inside and retried with the next pass.
        let _ = driver.drive(&gate, states);
    }
}

async fn report_loop<S: StoragePort>(ctx: Arc<RoomContext<S>>, every: Duration) {
    loop {
        async_io_mini::Timer::after(every).await;
        info!("Config: {}", ctx.config.dump_json());
    }
}

/// Loop periods taken from [`SystemConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub tick: Duration,
    /// `None` disables the periodic config dump.
    pub report: Option<Duration>,
}

impl From<&SystemConfig> for Timing {
    fn from(cfg: &SystemConfig) -> Self {
        Self {
            tick: Duration::from_millis(u64::from(cfg.tick_interval_ms)),
            report: (cfg.config_report_interval_secs > 0)
                .then(|| Duration::from_secs(u64::from(cfg.config_report_interval_secs))),
        }
    }
}

fn run_scheduler<S, C, O>(
    ctx: Arc<RoomContext<S>>,
    clock: C,
    output: O,
    gate: Arc<Gate>,
    timing: Timing,
) where
    S: StoragePort,
    C: ClockPort,
    O: OutputPort,
{
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    let watchdog = Watchdog::subscribe(Watchdog::timeout_for(timing.tick));

    executor
        .spawn(evaluate_loop(
            Evaluator::new(Arc::clone(&ctx), clock),
            Arc::clone(&gate),
            watchdog,
            timing.tick,
        ))
        .detach();
    executor.spawn(drive_loop(Driver::new(output), gate)).detach();
    if let Some(every) = timing.report {
        executor.spawn(report_loop(ctx, every)).detach();
    }

    info!(
        "Scheduler started (tick {} ms, config report {:?})",
        timing.tick.as_millis(),
        timing.report
    );

    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

/// Spawn the scheduler on its own thread, pinned to the App core.
pub fn spawn<S, C, O>(
    ctx: Arc<RoomContext<S>>,
    clock: C,
    output: O,
    gate: Arc<Gate>,
    timing: Timing,
) -> std::io::Result<std::thread::JoinHandle<()>>
where
    S: StoragePort + Send + 'static,
    C: ClockPort + Send + 'static,
    O: OutputPort + Send + 'static,
{
    task_pin::spawn_on_core(Core::App, 5, 8, "roomctl-sched\0", move || {
        run_scheduler(ctx, clock, output, gate, timing);
    })
}
