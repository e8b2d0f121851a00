//! Shared state store: the single source of truth for readings, thresholds,
//! actuator state and the active screen.
//!
//! Each logical group sits behind its own blocking mutex so that a writer in
//! one task and a reader in another never observe a half-written value. The
//! store is `const`-constructible; the process root owns it as a `static` and
//! lends `&'static Store` to every loop.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Latest sensor readings, already unit-converted by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub temperature: u8,
    pub humidity: u8,
}

/// User-configured thresholds the decision rule compares readings against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub temperature: u8,
    pub humidity: u8,
}

/// Intended on/off state for the three actuators.
///
/// Heater and cooler are never both set; the decision rule derives them from
/// a single three-way comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorState {
    pub heater: bool,
    pub cooler: bool,
    pub pump: bool,
}

/// Which screen is active, and therefore how incoming bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Main,
    Config,
}

pub const DEFAULT_READING: Reading = Reading {
    temperature: 20,
    humidity: 30,
};

pub const DEFAULT_THRESHOLD: Threshold = Threshold {
    temperature: 20,
    humidity: 30,
};

type Guarded<T> = Mutex<CriticalSectionRawMutex, Cell<T>>;

/// In-memory system state, guarded per logical group.
pub struct Store {
    reading: Guarded<Reading>,
    threshold: Guarded<Threshold>,
    motors: Guarded<MotorState>,
    mode: Guarded<UiMode>,
}

impl Store {
    pub const fn new() -> Self {
        Self {
            reading: Mutex::new(Cell::new(DEFAULT_READING)),
            threshold: Mutex::new(Cell::new(DEFAULT_THRESHOLD)),
            motors: Mutex::new(Cell::new(MotorState {
                heater: false,
                cooler: false,
                pump: false,
            })),
            mode: Mutex::new(Cell::new(UiMode::Main)),
        }
    }

    pub fn reading(&self) -> Reading {
        self.reading.lock(|c| c.get())
    }

    pub fn set_reading(&self, reading: Reading) {
        self.reading.lock(|c| c.set(reading));
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold.lock(|c| c.get())
    }

    pub fn set_temperature_threshold(&self, value: u8) {
        self.threshold.lock(|c| {
            let mut t = c.get();
            t.temperature = value;
            c.set(t);
        });
    }

    pub fn set_humidity_threshold(&self, value: u8) {
        self.threshold.lock(|c| {
            let mut t = c.get();
            t.humidity = value;
            c.set(t);
        });
    }

    pub fn motors(&self) -> MotorState {
        self.motors.lock(|c| c.get())
    }

    pub fn set_motors(&self, motors: MotorState) {
        self.motors.lock(|c| c.set(motors));
    }

    pub fn mode(&self) -> UiMode {
        self.mode.lock(|c| c.get())
    }

    pub fn set_mode(&self, mode: UiMode) {
        self.mode.lock(|c| c.set(mode));
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_defaults() {
        let store = Store::new();
        assert_eq!(store.reading(), DEFAULT_READING);
        assert_eq!(store.threshold(), DEFAULT_THRESHOLD);
        assert_eq!(store.motors(), MotorState::default());
        assert_eq!(store.mode(), UiMode::Main);
    }

    #[test]
    fn threshold_fields_update_independently() {
        let store = Store::new();
        store.set_temperature_threshold(42);
        assert_eq!(store.threshold().temperature, 42);
        assert_eq!(store.threshold().humidity, DEFAULT_THRESHOLD.humidity);

        store.set_humidity_threshold(7);
        assert_eq!(store.threshold().temperature, 42);
        assert_eq!(store.threshold().humidity, 7);
    }

    #[test]
    fn groups_are_independent() {
        let store = Store::new();
        store.set_mode(UiMode::Config);
        store.set_reading(Reading {
            temperature: 99,
            humidity: 1,
        });
        assert_eq!(store.mode(), UiMode::Config);
        assert_eq!(store.threshold(), DEFAULT_THRESHOLD);
        assert_eq!(store.reading().temperature, 99);
    }
}
