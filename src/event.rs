//! Event plumbing between the loops.
//!
//! All notifications are payload-less; consumers re-read the
//! [`Store`](crate::store::Store) for current values. The decision engine
//! waits on a binary check gate, the actuation loop on a bounded queue of
//! [`ControlEvent`]s, and the display coordinator on an [`EventGroup`] of
//! accumulated display bits.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

/// Apply request for one actuator; the actuation loop reads the level to
/// drive from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Heater,
    Cooler,
    Pump,
}

/// One bit per display concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DisplayEvent {
    ShowMain,
    ShowConfig,
    HumidityData,
    TemperatureData,
    TemperatureThreshold,
    HumidityThreshold,
    Actuators,
    AdvanceCursor,
}

impl DisplayEvent {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Accumulated display bits, taken as one batch by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplaySet(u8);

impl DisplaySet {
    pub const EMPTY: Self = Self(0);

    pub fn insert(&mut self, event: DisplayEvent) {
        self.0 |= event.bit();
    }

    pub fn contains(self, event: DisplayEvent) -> bool {
        self.0 & event.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Level-latched event bits with a wake-up.
///
/// Any number of raisers OR bits in before the waiter runs; the waiter
/// observes the union and the bits are cleared in the same critical section.
/// A raise between the take and the next wait is not lost: the signal stays
/// latched and the waiter loops until it takes a non-empty set.
pub struct EventGroup {
    bits: Mutex<CriticalSectionRawMutex, Cell<u8>>,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl EventGroup {
    pub const fn new() -> Self {
        Self {
            bits: Mutex::new(Cell::new(0)),
            wake: Signal::new(),
        }
    }

    pub fn raise(&self, event: DisplayEvent) {
        self.bits.lock(|b| b.set(b.get() | event.bit()));
        self.wake.signal(());
    }

    pub fn raise_all(&self, set: DisplaySet) {
        if set.is_empty() {
            return;
        }
        self.bits.lock(|b| b.set(b.get() | set.0));
        self.wake.signal(());
    }

    /// Take whatever is pending right now, clearing it.
    pub fn take(&self) -> DisplaySet {
        DisplaySet(self.bits.lock(|b| b.replace(0)))
    }

    /// Wait until at least one bit is raised, then take the whole batch.
    pub async fn wait(&self) -> DisplaySet {
        loop {
            let set = self.take();
            if !set.is_empty() {
                return set;
            }
            self.wake.wait().await;
        }
    }
}

impl Default for EventGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth of the control-apply queue. Each decision emits three events; the
/// queue holds two full decisions before the engine has to wait.
pub const CONTROL_QUEUE_DEPTH: usize = 8;

/// All inter-task notification primitives, owned by the process root next to
/// the store.
pub struct EventBus {
    /// Binary gate: "a reading or threshold changed, re-run the decision".
    pub check: Signal<CriticalSectionRawMutex, ()>,
    /// Apply requests for the actuation loop.
    pub control: Channel<CriticalSectionRawMutex, ControlEvent, CONTROL_QUEUE_DEPTH>,
    /// Display bits for the coordinator.
    pub display: EventGroup,
}

impl EventBus {
    pub const fn new() -> Self {
        Self {
            check: Signal::new(),
            control: Channel::new(),
            display: EventGroup::new(),
        }
    }

    pub fn request_check(&self) {
        self.check.signal(());
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
