//! Status LEDs
//!
//! The LED bank lives in a critical-section mutex so the scheduler callback,
//! a plain `fn()`, can reach it.

use core::cell::RefCell;

use critical_section::Mutex;
use metronome_core::scheduler::{ScheduleError, TaskHandle};

use crate::board::BoardLeds;
use crate::SCHEDULER;

static LEDS: Mutex<RefCell<Option<BoardLeds>>> = Mutex::new(RefCell::new(None));

/// Hand the bank over to the LED task
pub fn install(bank: BoardLeds) {
    critical_section::with(|cs| {
        LEDS.borrow_ref_mut(cs).replace(bank);
    });
}

/// Run `f` on the installed bank
pub fn with_leds<R>(f: impl FnOnce(&mut BoardLeds) -> R) -> Option<R> {
    critical_section::with(|cs| LEDS.borrow_ref_mut(cs).as_mut().map(f))
}

/// Scheduler callback: advance blinking LEDs
pub fn leds_task() {
    with_leds(BoardLeds::service);
}

/// Register [`leds_task`] with the scheduler
///
/// `None` if no bank has been installed.
pub fn attach() -> Option<Result<TaskHandle, ScheduleError>> {
    with_leds(|bank| bank.attach(&SCHEDULER, leds_task))
}
