//! Metronome - Tick Scheduler Firmware
//!
//! Main firmware binary for RP2040 boards. A hardware tick drives a
//! cooperative scheduler; periodic tasks (status LEDs, statistics) run to
//! completion from the main loop.
//!
//! Execution contexts:
//! - `SWI_IRQ_1` runs an interrupt executor hosting the tick task, which
//!   feeds [`SCHEDULER`] from interrupt context.
//! - Thread mode runs the dispatch loop and nothing else.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::InterruptExecutor;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use {defmt_rtt as _, panic_probe as _};

use metronome_core::config::SchedulerConfig;
use metronome_core::scheduler::Scheduler;
use metronome_hal_rp2040::{TickSource, TickTimer};

mod board;
mod leds;
mod tasks;

/// Embedded board configuration (compiled into firmware)
/// Edit board.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../board.toml");

/// The scheduler shared by the tick interrupt and the main loop
pub static SCHEDULER: Scheduler = Scheduler::new(SchedulerConfig::DEFAULT);

/// Executor for the tick task
static EXECUTOR_TICK: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_TICK.on_interrupt()
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Metronome firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = board::load_config(EMBEDDED_CONFIG);

    SCHEDULER.init_with(config.scheduler);
    info!(
        "Scheduler initialized: {} slots, {} ms tick ({} policy)",
        SCHEDULER.capacity(),
        SCHEDULER.tick_ms(),
        config.scheduler.miss_policy
    );

    // Status LEDs: pins are fixed per board, behavior comes from config
    let bank = board::led_bank(board::LedPins::take(p), &config);
    leds::install(bank);
    match leds::attach() {
        Some(Ok(handle)) => info!("LED task scheduled every {} ms (slot {})", config.led_task_ms, handle.index()),
        Some(Err(e)) => warn!("Failed to schedule LED task: {}", e),
        None => warn!("No LED bank installed, LED task not scheduled"),
    }

    if let Err(e) = tasks::stats::attach() {
        warn!("Failed to schedule stats task: {}", e);
    }

    // Tick source on the interrupt executor
    let (timer, mut tick) = TickTimer::new(SCHEDULER.tick_ms());
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_TICK.start(interrupt::SWI_IRQ_1);
    spawner.spawn(tasks::tick_task(timer)).unwrap();

    SCHEDULER.start();
    tick.start();
    info!("Scheduler started at {} Hz", tick.frequency_hz());

    loop {
        SCHEDULER.execute_ready();

        // Sleep until the next interrupt unless work arrived meanwhile
        cortex_m::interrupt::free(|_| {
            if !SCHEDULER.is_pending() {
                cortex_m::asm::wfi();
            }
        });
    }
}
