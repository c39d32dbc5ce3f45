//! LED bank serviced by a periodic scheduler task

use metronome_core::config::{LedConfig, LedMode};
use metronome_core::scheduler::{ScheduleError, Scheduler, TaskFn, TaskHandle};
use metronome_hal::OutputPin;

use super::output::{Led, LedState};

/// A fixed set of LEDs sharing one service task
///
/// LEDs are addressed by index in wiring order. Out-of-range indices are
/// ignored, matching how status calls are sprinkled through application
/// code without error handling.
pub struct LedBank<P, const N: usize> {
    leds: [Led<P>; N],
    /// Period of the service task in milliseconds
    task_ms: u32,
    /// Registration with the scheduler, if attached
    task: Option<(TaskFn, TaskHandle)>,
}

impl<P: OutputPin, const N: usize> LedBank<P, N> {
    /// Create a bank; every LED starts off
    pub fn new(leds: [Led<P>; N], task_ms: u32) -> Self {
        Self {
            leds,
            task_ms: task_ms.max(1),
            task: None,
        }
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn task_ms(&self) -> u32 {
        self.task_ms
    }

    pub fn led(&self, index: usize) -> Option<&Led<P>> {
        self.leds.get(index)
    }

    pub fn state(&self, index: usize) -> Option<LedState> {
        self.leds.get(index).map(Led::state)
    }

    pub fn on(&mut self, index: usize) {
        if let Some(led) = self.leds.get_mut(index) {
            led.on();
        }
    }

    pub fn off(&mut self, index: usize) {
        if let Some(led) = self.leds.get_mut(index) {
            led.off();
        }
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(led) = self.leds.get_mut(index) {
            led.toggle();
        }
    }

    /// Blink with `blink_ms` between toggles
    ///
    /// Clamped to at least one service period, then rounded down to whole
    /// service periods.
    pub fn blink(&mut self, index: usize, blink_ms: u16) {
        let ticks = self.blink_ticks(blink_ms);
        if let Some(led) = self.leds.get_mut(index) {
            led.blink(ticks);
        }
    }

    pub fn test_start(&mut self, index: usize) {
        if let Some(led) = self.leds.get_mut(index) {
            led.test_start();
        }
    }

    pub fn test_end(&mut self, index: usize) {
        if let Some(led) = self.leds.get_mut(index) {
            led.test_end();
        }
    }

    pub fn all_on(&mut self) {
        self.leds.iter_mut().for_each(Led::on);
    }

    pub fn all_off(&mut self) {
        self.leds.iter_mut().for_each(Led::off);
    }

    /// Apply polarity and power-on state from board config
    pub fn apply(&mut self, index: usize, config: &LedConfig) {
        let ticks = self.blink_ticks(config.blink_ms);
        let Some(led) = self.leds.get_mut(index) else {
            return;
        };

        led.set_inverted(config.inverted);
        match config.mode {
            LedMode::Off => led.off(),
            LedMode::On => led.on(),
            LedMode::Blink => led.blink(ticks),
        }
    }

    /// Service task body: advance every blinking LED by one period
    pub fn service(&mut self) {
        self.leds.iter_mut().for_each(Led::service);
    }

    /// Register the service task with `scheduler`
    ///
    /// `callback` must end up calling [`LedBank::service`] on this bank.
    /// Attaching an already attached bank replaces the registration.
    pub fn attach<const M: usize>(
        &mut self,
        scheduler: &Scheduler<M>,
        callback: TaskFn,
    ) -> Result<TaskHandle, ScheduleError> {
        self.detach(scheduler);
        let handle = scheduler.schedule(callback, self.task_ms)?;
        self.task = Some((callback, handle));
        Ok(handle)
    }

    /// Unregister the service task
    ///
    /// Returns false if the bank was not attached or the registration was
    /// already gone (e.g. after `unschedule_all`). LEDs keep their current
    /// pin levels.
    pub fn detach<const M: usize>(&mut self, scheduler: &Scheduler<M>) -> bool {
        self.task
            .take()
            .is_some_and(|(callback, handle)| scheduler.unschedule(callback, handle).is_ok())
    }

    /// Handle of the service task, if attached
    pub fn task_handle(&self) -> Option<TaskHandle> {
        self.task.map(|(_, handle)| handle)
    }

    fn blink_ticks(&self, blink_ms: u16) -> u16 {
        let ticks = u32::from(blink_ms).max(self.task_ms) / self.task_ms;
        u16::try_from(ticks).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::super::output::tests::MockPin;
    use super::*;
    use metronome_core::config::SchedulerConfig;

    fn bank() -> LedBank<MockPin, 3> {
        let leds = [
            Led::new(MockPin::new(), false),
            Led::new(MockPin::new(), true),
            Led::new(MockPin::new(), true),
        ];
        LedBank::new(leds, 100)
    }

    fn lit(bank: &LedBank<MockPin, 3>) -> [bool; 3] {
        [0, 1, 2].map(|i| bank.led(i).map(Led::is_lit).unwrap_or(false))
    }

    #[test]
    fn test_new_bank_is_dark() {
        let bank = bank();
        assert_eq!(lit(&bank), [false; 3]);
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.task_handle(), None);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut bank = bank();
        bank.on(3);
        bank.blink(7, 200);
        bank.toggle(usize::MAX);
        bank.test_start(3);
        assert_eq!(lit(&bank), [false; 3]);
        assert_eq!(bank.state(3), None);
    }

    #[test]
    fn test_all_on_off() {
        let mut bank = bank();
        bank.all_on();
        assert_eq!(lit(&bank), [true; 3]);
        bank.all_off();
        assert_eq!(lit(&bank), [false; 3]);
    }

    #[test]
    fn test_blink_period_rounding() {
        let mut bank = bank();

        bank.blink(0, 200);
        assert_eq!(bank.led(0).map(Led::blink_ticks), Some(2));

        // Below one service period clamps up
        bank.blink(1, 30);
        assert_eq!(bank.led(1).map(Led::blink_ticks), Some(1));

        // Rounds down
        bank.blink(2, 250);
        assert_eq!(bank.led(2).map(Led::blink_ticks), Some(2));
    }

    #[test]
    fn test_service_drives_blink_rates() {
        let mut bank = bank();
        bank.blink(0, 200);
        bank.blink(1, 500);
        bank.on(2);

        let mut toggles = [0u32; 3];
        let mut prev = lit(&bank);
        for _ in 0..10 {
            bank.service();
            let now = lit(&bank);
            for i in 0..3 {
                if now[i] != prev[i] {
                    toggles[i] += 1;
                }
            }
            prev = now;
        }

        // 1 s of service: 200 ms LED toggles 5 times, 500 ms LED twice
        assert_eq!(toggles, [5, 2, 0]);
    }

    #[test]
    fn test_apply_config() {
        let mut bank = bank();
        let config = LedConfig {
            inverted: false,
            mode: LedMode::Blink,
            blink_ms: 1000,
            ..LedConfig::default()
        };

        bank.apply(1, &config);
        let led = bank.led(1).unwrap();
        assert!(!led.is_inverted());
        assert_eq!(led.state(), LedState::Blink);
        assert_eq!(led.blink_ticks(), 10);
        assert!(led.is_lit());

        let steady = LedConfig {
            inverted: true,
            mode: LedMode::On,
            ..LedConfig::default()
        };
        bank.apply(0, &steady);
        assert!(bank.led(0).unwrap().is_inverted());
        assert_eq!(bank.state(0), Some(LedState::On));
        assert!(bank.led(0).unwrap().is_lit());
    }

    #[test]
    fn test_attach_detach() {
        fn leds_task() {}

        let scheduler = Scheduler::<4>::new(SchedulerConfig::new(25));
        scheduler.init();

        let mut bank = bank();
        let handle = bank.attach(&scheduler, leds_task).unwrap();
        assert_eq!(scheduler.interval_ticks(handle), Some(4));
        assert_eq!(bank.task_handle(), Some(handle));

        // Re-attach replaces the registration
        let again = bank.attach(&scheduler, leds_task).unwrap();
        assert_eq!(scheduler.occupied(), 1);
        assert_ne!(again, handle);
        assert!(!scheduler.is_scheduled(handle));

        assert!(bank.detach(&scheduler));
        assert_eq!(scheduler.occupied(), 0);
        assert_eq!(bank.task_handle(), None);
        assert!(!bank.detach(&scheduler));

        // Detach after unschedule_all is harmless
        bank.attach(&scheduler, leds_task).unwrap();
        scheduler.unschedule_all();
        assert!(!bank.detach(&scheduler));
    }

    #[test]
    fn test_attach_full_scheduler() {
        fn leds_task() {}
        fn filler() {}

        let scheduler = Scheduler::<1>::new(SchedulerConfig::new(25));
        scheduler.init();
        scheduler.schedule(filler, 100).unwrap();

        let mut bank = bank();
        assert_eq!(bank.attach(&scheduler, leds_task), Err(ScheduleError::Full));
        assert_eq!(bank.task_handle(), None);
    }
}
