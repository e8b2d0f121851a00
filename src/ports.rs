//! Collaborator contracts the core drives hardware through.
//!
//! Every port is synchronous and fail-silent: a sensor that is not ready or
//! an empty byte stream reports `None` and the caller tries again next cycle.
//! Adapters over real peripherals live in the firmware binary; tests use
//! recording mocks.

/// The three binary outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    Heater,
    Cooler,
    Pump,
}

/// Cursor appearance at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    Off,
    On,
    Blink,
}

/// Temperature/humidity source, values already unit-converted.
pub trait SensorSource {
    /// `None` when the sensor is not ready; silently skipped.
    fn read_temperature(&mut self) -> Option<u8>;
    fn read_humidity(&mut self) -> Option<u8>;
}

/// Fixed-layout character display. Calls are ordered; text written after a
/// `move_cursor` starts at that cell.
pub trait DisplaySink {
    fn clear(&mut self);
    fn write_text(&mut self, text: &str);
    fn move_cursor(&mut self, row: u8, col: u8);
    fn set_cursor_mode(&mut self, mode: CursorMode);
}

/// Terminal byte transport.
pub trait ByteStream {
    /// Non-blocking; `None` means no byte arrived, which is not an error.
    fn try_read_byte(&mut self) -> Option<u8>;
    /// Used once at startup for the banner.
    fn write_line(&mut self, text: &str);
}

/// The three physical output lines.
pub trait ActuatorBank {
    fn set_output(&mut self, actuator: Actuator, on: bool);
}
