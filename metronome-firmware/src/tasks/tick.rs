//! Tick task
//!
//! Runs on the `SWI_IRQ_1` interrupt executor, so every call into the
//! scheduler from here is made from interrupt context.

use defmt::*;
use metronome_hal_rp2040::TickTimer;

use crate::SCHEDULER;

/// Tick task - delivers timer ticks to the scheduler
#[embassy_executor::task]
pub async fn tick_task(mut timer: TickTimer) {
    info!("Tick task started");

    loop {
        let elapsed = timer.next().await;
        if elapsed > 1 {
            trace!("Tick overrun: {} ticks", elapsed);
        }

        SCHEDULER.on_ticks(elapsed);
    }
}
