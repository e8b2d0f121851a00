//! Terminal input state machine.
//!
//! Bytes arrive one at a time from the serial side. On the main screen only
//! 'C' matters and opens the configuration screen. In configuration mode the
//! machine walks two entry fields, temperature threshold then humidity
//! threshold:
//!
//! - digits accumulate into a 3-character buffer, extras silently dropped;
//! - 'O' confirms the field; an empty or zero buffer confirms nothing;
//! - 'N' skips the field without touching the threshold;
//! - 'C' cancels the whole entry and returns to the main screen;
//! - anything else is ignored.
//!
//! The transition logic is a plain function of (mode, state, byte) returning
//! the side effects to perform; the loop at the bottom feeds it from the
//! byte stream and commits the effects.

use embassy_time::{Duration, Timer};
use heapless::String;

use crate::event::{DisplayEvent, DisplaySet, EventBus};
use crate::ports::ByteStream;
use crate::store::{Store, UiMode};

pub const POLL: Duration = Duration::from_millis(50);
/// Pause after a humidity threshold commits, before input polling resumes.
pub const CONFIRM_PAUSE: Duration = Duration::from_millis(500);

pub const KEY_CONFIRM: u8 = b'O';
pub const KEY_SKIP: u8 = b'N';
/// Opens configuration from the main screen, cancels it from inside.
pub const KEY_CONFIG: u8 = b'C';

const MAX_DIGITS: usize = 3;

/// Which threshold field is currently being entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Temperature,
    Humidity,
}

/// Bounded digit accumulator for one field entry.
#[derive(Debug, Default)]
pub struct InputBuffer(String<MAX_DIGITS>);

impl InputBuffer {
    pub const fn new() -> Self {
        Self(String::new())
    }

    /// Appends a digit while there is room; extra digits are dropped.
    pub fn push_digit(&mut self, byte: u8) {
        if self.0.len() < MAX_DIGITS {
            let _ = self.0.push(byte as char);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Parsed value; an empty buffer reads as zero.
    pub fn value(&self) -> u16 {
        self.0.parse().unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.value() == 0
    }
}

/// Side effects of one consumed byte, to be committed by [`apply`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Effects {
    pub mode: Option<UiMode>,
    pub temperature_threshold: Option<u8>,
    pub humidity_threshold: Option<u8>,
    /// Arm the decision-engine check gate.
    pub check: bool,
    pub display: DisplaySet,
    /// Suspend input polling for [`CONFIRM_PAUSE`].
    pub pause: bool,
}

/// The state machine proper: current field crossed with the store's UI mode.
pub struct Terminal {
    field: Field,
    buffer: InputBuffer,
}

impl Terminal {
    pub const fn new() -> Self {
        Self {
            field: Field::Temperature,
            buffer: InputBuffer::new(),
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Consume one byte under the given mode and report what should happen.
    pub fn feed(&mut self, mode: UiMode, byte: u8) -> Effects {
        let mut effects = Effects::default();
        match mode {
            UiMode::Main => {
                if byte == KEY_CONFIG && self.field == Field::Temperature {
                    self.buffer.clear();
                    effects.mode = Some(UiMode::Config);
                    effects.display.insert(DisplayEvent::ShowConfig);
                }
            }
            UiMode::Config => match byte {
                b'0'..=b'9' => self.buffer.push_digit(byte),
                KEY_CONFIRM => self.confirm(&mut effects),
                KEY_SKIP => self.skip(&mut effects),
                KEY_CONFIG => self.cancel(&mut effects),
                _ => {}
            },
        }
        effects
    }

    fn confirm(&mut self, effects: &mut Effects) {
        match self.field {
            Field::Temperature => {
                if !self.buffer.is_zero() {
                    // Values above 255 wrap; three digits cap the damage.
                    effects.temperature_threshold = Some(self.buffer.value() as u8);
                    effects.check = true;
                    effects.display.insert(DisplayEvent::TemperatureThreshold);
                }
                self.buffer.clear();
                self.field = Field::Humidity;
                effects.display.insert(DisplayEvent::AdvanceCursor);
            }
            Field::Humidity => {
                if !self.buffer.is_zero() {
                    effects.humidity_threshold = Some(self.buffer.value() as u8);
                    effects.check = true;
                    effects.display.insert(DisplayEvent::HumidityThreshold);
                    effects.pause = true;
                }
                self.buffer.clear();
                self.field = Field::Temperature;
                effects.mode = Some(UiMode::Main);
                effects.display.insert(DisplayEvent::ShowMain);
            }
        }
    }

    fn skip(&mut self, effects: &mut Effects) {
        self.buffer.clear();
        match self.field {
            Field::Temperature => {
                self.field = Field::Humidity;
                effects.display.insert(DisplayEvent::AdvanceCursor);
            }
            Field::Humidity => {
                self.field = Field::Temperature;
                effects.mode = Some(UiMode::Main);
                effects.display.insert(DisplayEvent::ShowMain);
            }
        }
    }

    fn cancel(&mut self, effects: &mut Effects) {
        self.buffer.clear();
        self.field = Field::Temperature;
        effects.mode = Some(UiMode::Main);
        effects.display.insert(DisplayEvent::ShowMain);
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

/// Commit the effects of one byte: thresholds and mode first, so the
/// coordinator and engine see consistent state when the notifications land.
pub fn apply(store: &Store, bus: &EventBus, effects: &Effects) {
    if let Some(value) = effects.temperature_threshold {
        store.set_temperature_threshold(value);
    }
    if let Some(value) = effects.humidity_threshold {
        store.set_humidity_threshold(value);
    }
    if let Some(mode) = effects.mode {
        store.set_mode(mode);
    }
    if effects.check {
        bus.request_check();
    }
    bus.display.raise_all(effects.display);
}

pub async fn terminal_loop(store: &Store, bus: &EventBus, mut stream: impl ByteStream) -> ! {
    let mut terminal = Terminal::new();
    loop {
        if let Some(byte) = stream.try_read_byte() {
            let effects = terminal.feed(store.mode(), byte);
            let pause = effects.pause;
            apply(store, bus, &effects);
            if pause {
                Timer::after(CONFIRM_PAUSE).await;
            }
        }
        Timer::after(POLL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_THRESHOLD;

    /// Feed a byte and commit its effects against the given store/bus,
    /// the way the loop does.
    fn feed_applied(
        terminal: &mut Terminal,
        store: &Store,
        bus: &EventBus,
        byte: u8,
    ) -> Effects {
        let effects = terminal.feed(store.mode(), byte);
        apply(store, bus, &effects);
        effects
    }

    #[test]
    fn config_key_opens_configuration() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        let effects = feed_applied(&mut terminal, &store, &bus, b'C');

        assert_eq!(store.mode(), UiMode::Config);
        assert!(effects.display.contains(DisplayEvent::ShowConfig));
        assert_eq!(terminal.field(), Field::Temperature);
    }

    #[test]
    fn digits_on_main_screen_are_ignored() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        let effects = feed_applied(&mut terminal, &store, &bus, b'7');

        assert_eq!(effects, Effects::default());
        assert_eq!(store.mode(), UiMode::Main);
    }

    #[test]
    fn digits_then_confirm_commit_the_temperature_threshold() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        feed_applied(&mut terminal, &store, &bus, b'2');
        feed_applied(&mut terminal, &store, &bus, b'5');
        let effects = feed_applied(&mut terminal, &store, &bus, b'O');

        assert_eq!(store.threshold().temperature, 25);
        assert_eq!(terminal.field(), Field::Humidity);
        assert!(effects.check);
        assert!(effects.display.contains(DisplayEvent::TemperatureThreshold));
        assert!(effects.display.contains(DisplayEvent::AdvanceCursor));
        assert!(bus.check.try_take().is_some());
    }

    #[test]
    fn confirm_without_digits_advances_but_commits_nothing() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        let effects = feed_applied(&mut terminal, &store, &bus, b'O');

        assert_eq!(store.threshold(), DEFAULT_THRESHOLD);
        assert_eq!(terminal.field(), Field::Humidity);
        assert!(!effects.check);
        assert!(effects.display.contains(DisplayEvent::AdvanceCursor));
        assert!(!effects.display.contains(DisplayEvent::TemperatureThreshold));
    }

    #[test]
    fn typed_zero_is_discarded_like_an_empty_field() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        feed_applied(&mut terminal, &store, &bus, b'0');
        feed_applied(&mut terminal, &store, &bus, b'O');

        assert_eq!(store.threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn extra_digits_are_truncated_to_three() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        for byte in [b'1', b'2', b'3', b'4', b'5'] {
            feed_applied(&mut terminal, &store, &bus, byte);
        }
        feed_applied(&mut terminal, &store, &bus, b'O');

        // "123" committed; 123 fits in a u8 unchanged.
        assert_eq!(store.threshold().temperature, 123);
    }

    #[test]
    fn humidity_confirm_returns_to_main_and_pauses() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        feed_applied(&mut terminal, &store, &bus, b'N'); // skip temperature
        feed_applied(&mut terminal, &store, &bus, b'4');
        feed_applied(&mut terminal, &store, &bus, b'0');
        let effects = feed_applied(&mut terminal, &store, &bus, b'O');

        assert_eq!(store.threshold().humidity, 40);
        assert_eq!(store.threshold().temperature, DEFAULT_THRESHOLD.temperature);
        assert_eq!(store.mode(), UiMode::Main);
        assert_eq!(terminal.field(), Field::Temperature);
        assert!(effects.pause);
        assert!(effects.display.contains(DisplayEvent::HumidityThreshold));
        assert!(effects.display.contains(DisplayEvent::ShowMain));
    }

    #[test]
    fn empty_humidity_confirm_returns_to_main_without_pause() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        feed_applied(&mut terminal, &store, &bus, b'N');
        let effects = feed_applied(&mut terminal, &store, &bus, b'O');

        assert_eq!(store.threshold(), DEFAULT_THRESHOLD);
        assert_eq!(store.mode(), UiMode::Main);
        assert!(!effects.pause);
        assert!(effects.display.contains(DisplayEvent::ShowMain));
    }

    #[test]
    fn cancel_discards_the_buffer_and_returns_to_main() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        feed_applied(&mut terminal, &store, &bus, b'9');
        feed_applied(&mut terminal, &store, &bus, b'9');
        let effects = feed_applied(&mut terminal, &store, &bus, b'C');

        assert_eq!(store.mode(), UiMode::Main);
        assert_eq!(store.threshold(), DEFAULT_THRESHOLD);
        assert_eq!(terminal.field(), Field::Temperature);
        assert!(effects.display.contains(DisplayEvent::ShowMain));

        // A fresh entry starts from an empty buffer.
        feed_applied(&mut terminal, &store, &bus, b'C');
        feed_applied(&mut terminal, &store, &bus, b'O');
        assert_eq!(store.threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn cancel_in_humidity_entry_returns_to_main() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        feed_applied(&mut terminal, &store, &bus, b'N');
        assert_eq!(terminal.field(), Field::Humidity);

        let effects = feed_applied(&mut terminal, &store, &bus, b'C');
        assert_eq!(store.mode(), UiMode::Main);
        assert_eq!(terminal.field(), Field::Temperature);
        assert!(effects.display.contains(DisplayEvent::ShowMain));
    }

    #[test]
    fn skip_in_humidity_entry_changes_no_threshold() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        feed_applied(&mut terminal, &store, &bus, b'N');
        feed_applied(&mut terminal, &store, &bus, b'8');
        let effects = feed_applied(&mut terminal, &store, &bus, b'N');

        assert_eq!(store.threshold(), DEFAULT_THRESHOLD);
        assert_eq!(store.mode(), UiMode::Main);
        assert!(effects.display.contains(DisplayEvent::ShowMain));
        assert!(!effects.check);
    }

    #[test]
    fn unknown_bytes_are_ignored_in_config() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        let effects = feed_applied(&mut terminal, &store, &bus, b'x');

        assert_eq!(effects, Effects::default());
        assert_eq!(store.mode(), UiMode::Config);
        assert_eq!(terminal.field(), Field::Temperature);
    }

    #[test]
    fn oversized_value_wraps_into_a_byte() {
        let store = Store::new();
        let bus = EventBus::new();
        let mut terminal = Terminal::new();

        feed_applied(&mut terminal, &store, &bus, b'C');
        for byte in [b'3', b'0', b'0'] {
            feed_applied(&mut terminal, &store, &bus, byte);
        }
        feed_applied(&mut terminal, &store, &bus, b'O');

        assert_eq!(store.threshold().temperature, 300u16 as u8);
    }
}
