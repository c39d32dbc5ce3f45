//! Fixed-capacity task table
//!
//! An arena of task slots indexed by position. Slots are found by linear
//! scan so registration time is bounded and never allocates.

use core::fmt;

use crate::config::MissPolicy;

/// Task callback: no arguments, no return value, runs to completion
pub type TaskFn = fn();

/// Registration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// No free slot left in the table
    Full,
    /// Handle out of range, or its slot is free
    NotFound,
    /// Slot is bound to a different callback or registration
    Mismatch,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::Full => write!(f, "task table full"),
            ScheduleError::NotFound => write!(f, "no task at handle"),
            ScheduleError::Mismatch => write!(f, "handle bound to another task"),
        }
    }
}

/// Caller-visible reference to a scheduled task
///
/// Carries the slot index and the slot's generation at registration time.
/// A slot's generation changes every time it is freed, so a handle kept
/// after `unschedule` can never address the slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskHandle {
    index: u16,
    generation: u16,
}

impl TaskHandle {
    pub(crate) const fn new(index: u16, generation: u16) -> Self {
        Self { index, generation }
    }

    /// Slot index in the task table
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Slot generation this handle was issued for
    pub const fn generation(self) -> u16 {
        self.generation
    }

    /// Pack into a `u32` (generation in the high half)
    pub const fn into_raw(self) -> u32 {
        ((self.generation as u32) << 16) | self.index as u32
    }

    /// Rebuild a handle from [`TaskHandle::into_raw`] output
    ///
    /// Any value is accepted; a bogus one is rejected by the scheduler with
    /// `NotFound` or `Mismatch`.
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            index: raw as u16,
            generation: (raw >> 16) as u16,
        }
    }
}

/// One scheduled unit of periodic work
#[derive(Debug, Clone, Copy)]
pub(crate) struct TaskSlot {
    /// `None` iff the slot is free
    pub callback: Option<TaskFn>,
    pub active: bool,
    pub due: bool,
    pub interval_ticks: u32,
    pub next_deadline_tick: u32,
    pub generation: u16,
}

impl TaskSlot {
    pub const FREE: Self = Self {
        callback: None,
        active: false,
        due: false,
        interval_ticks: 0,
        next_deadline_tick: 0,
        generation: 0,
    };

    pub fn is_free(&self) -> bool {
        self.callback.is_none()
    }

    /// Set interval and deadline, counting from `now`
    fn retime(&mut self, interval_ticks: u32, now: u32) {
        debug_assert!(interval_ticks >= 1);
        self.due = false;
        self.interval_ticks = interval_ticks;
        self.next_deadline_tick = now.wrapping_add(interval_ticks);
        self.active = true;
    }

    /// Return to the free state, invalidating outstanding handles
    fn release(&mut self) {
        let generation = if self.is_free() {
            self.generation
        } else {
            self.generation.wrapping_add(1)
        };
        *self = Self {
            generation,
            ..Self::FREE
        };
    }
}

/// Outcome of one deadline sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Sweep {
    /// Slots newly marked due
    pub due: u32,
    /// Activations dropped or coalesced
    pub missed: u32,
}

pub(crate) struct TaskTable<const N: usize> {
    slots: [TaskSlot; N],
}

/// Largest table a 16-bit handle index can address
pub const MAX_SLOTS: usize = u16::MAX as usize + 1;

impl<const N: usize> TaskTable<N> {
    pub const fn new() -> Self {
        const { assert!(N <= MAX_SLOTS, "task table larger than a handle can address") };
        Self {
            slots: [TaskSlot::FREE; N],
        }
    }

    /// Occupy the first free slot
    pub fn insert(
        &mut self,
        callback: TaskFn,
        interval_ticks: u32,
        now: u32,
    ) -> Result<TaskHandle, ScheduleError> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_free())
            .ok_or(ScheduleError::Full)?;

        let index = u16::try_from(index).map_err(|_| ScheduleError::Full)?;
        slot.callback = Some(callback);
        slot.retime(interval_ticks, now);

        Ok(TaskHandle::new(index, slot.generation))
    }

    /// Validate a handle against the callback the caller believes it owns
    fn lookup(&mut self, callback: TaskFn, handle: TaskHandle) -> Result<&mut TaskSlot, ScheduleError> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .ok_or(ScheduleError::NotFound)?;

        let stored = slot.callback.ok_or(ScheduleError::NotFound)?;
        if !core::ptr::fn_addr_eq(stored, callback) || slot.generation != handle.generation() {
            return Err(ScheduleError::Mismatch);
        }

        Ok(slot)
    }

    pub fn retime(
        &mut self,
        callback: TaskFn,
        handle: TaskHandle,
        interval_ticks: u32,
        now: u32,
    ) -> Result<TaskHandle, ScheduleError> {
        self.lookup(callback, handle)?.retime(interval_ticks, now);
        Ok(handle)
    }

    pub fn remove(&mut self, callback: TaskFn, handle: TaskHandle) -> Result<TaskHandle, ScheduleError> {
        self.lookup(callback, handle)?.release();
        Ok(handle)
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.release();
        }
    }

    /// Slot for a handle, if the handle is still current
    pub fn get(&self, handle: TaskHandle) -> Option<&TaskSlot> {
        self.slots
            .get(handle.index())
            .filter(|slot| !slot.is_free() && slot.generation == handle.generation())
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_free()).count()
    }

    /// Mark slots whose deadline fell in the window `(now - elapsed, now]`
    ///
    /// With `elapsed == 1` this is the plain equality test against `now`.
    /// Deadlines that were jumped over are resolved by `policy`, then moved
    /// forward by whole intervals to the first activation after `now`.
    pub fn sweep(&mut self, now: u32, elapsed: u32, policy: MissPolicy) -> Sweep {
        let window_start = now.wrapping_sub(elapsed);
        let mut sweep = Sweep::default();

        for slot in self.slots.iter_mut() {
            if slot.is_free() || !slot.active {
                continue;
            }

            // 1..=elapsed when the deadline lies inside the window
            let offset = slot.next_deadline_tick.wrapping_sub(window_start);
            if offset == 0 || offset > elapsed {
                continue;
            }

            let interval = slot.interval_ticks;
            let behind = elapsed - offset;
            let passed = behind / interval + 1;
            let on_time = behind % interval == 0;
            let fire = on_time || policy == MissPolicy::CatchUp;

            slot.next_deadline_tick = slot
                .next_deadline_tick
                .wrapping_add(passed.wrapping_mul(interval));

            if fire {
                slot.due = true;
                sweep.due += 1;
            }
            sweep.missed = sweep.missed.saturating_add(passed - u32::from(fire));
        }

        sweep
    }

    /// Callback to run for a due slot, with the generation it belongs to
    pub fn ready(&self, index: usize) -> Option<(TaskFn, u16)> {
        let slot = self.slots.get(index)?;
        if !slot.due {
            return None;
        }
        slot.callback.map(|callback| (callback, slot.generation))
    }

    /// Clear `due` after a callback ran, unless the slot changed hands
    pub fn complete(&mut self, index: usize, generation: u16) {
        if let Some(slot) = self.slots.get_mut(index) {
            if !slot.is_free() && slot.generation == generation {
                slot.due = false;
            }
        }
    }
}
