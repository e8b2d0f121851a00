//! Display coordinator: turns batches of display bits into screen writes.
//!
//! The layout is a fixed 20x4 character grid:
//!
//! ```text
//! T = 20 C    H = 30 %        TempThreshold: 20  C
//! TT= 20 C    TH= 30 %
//! H: OFF  C: OFF P: OFF       HumiThreshold: 30  %
//!   Configuration: C          OK:O Next:N Cancel:C
//! ```
//!
//! Every bit is rendered only if the originating screen is still active;
//! bits raised just before a mode switch are dropped.

use core::fmt::Write as _;

use heapless::String;

use crate::event::{DisplayEvent, DisplaySet, EventBus};
use crate::ports::{CursorMode, DisplaySink};
use crate::store::{MotorState, Store, UiMode};

pub const MAIN_LINE_1: &str = "T =    C    H =    %";
pub const MAIN_LINE_2: &str = "TT=    C    TH=    %";
pub const MAIN_LINE_3: &str = "H:      C:     P:   ";
pub const MAIN_LINE_4: &str = "  Configuration: C  ";

pub const CONFIG_LINE_1: &str = "TempThreshold:     C";
pub const CONFIG_LINE_2: &str = "HumiThreshold:     %";
pub const CONFIG_LINE_4: &str = "OK:O Next:N Cancel:C";

pub const TEMP_COL: u8 = 4;
pub const HUMI_COL: u8 = 16;
pub const HEATER_COL: u8 = 2;
pub const COOLER_COL: u8 = 10;
pub const PUMP_COL: u8 = 17;
pub const CONFIG_COL: u8 = 14;

const MOTOR_ROW: u8 = 2;
const CONFIG_TEMP_ROW: u8 = 0;
const CONFIG_HUMI_ROW: u8 = 2;

/// Render one batch of display bits against the current store state.
pub fn render(sink: &mut impl DisplaySink, store: &Store, set: DisplaySet) {
    let mode = store.mode();

    if set.contains(DisplayEvent::ShowMain) && mode == UiMode::Main {
        draw_main(sink, store);
    }

    if set.contains(DisplayEvent::ShowConfig) && mode == UiMode::Config {
        draw_config(sink);
    }

    if set.contains(DisplayEvent::TemperatureThreshold) && mode == UiMode::Config {
        sink.move_cursor(CONFIG_TEMP_ROW, CONFIG_COL);
        sink.set_cursor_mode(CursorMode::Off);
        number_field(sink, CONFIG_TEMP_ROW, CONFIG_COL, store.threshold().temperature);
    }

    if set.contains(DisplayEvent::HumidityThreshold) && mode == UiMode::Config {
        sink.move_cursor(CONFIG_HUMI_ROW, CONFIG_COL);
        sink.set_cursor_mode(CursorMode::Off);
        number_field(sink, CONFIG_HUMI_ROW, CONFIG_COL, store.threshold().humidity);
    }

    if set.contains(DisplayEvent::AdvanceCursor) && mode == UiMode::Config {
        sink.move_cursor(CONFIG_HUMI_ROW, CONFIG_COL);
        sink.set_cursor_mode(CursorMode::Blink);
    }

    if set.contains(DisplayEvent::TemperatureData) && mode == UiMode::Main {
        number_field(sink, 0, TEMP_COL, store.reading().temperature);
    }

    if set.contains(DisplayEvent::HumidityData) && mode == UiMode::Main {
        number_field(sink, 0, HUMI_COL, store.reading().humidity);
    }

    if set.contains(DisplayEvent::Actuators) && mode == UiMode::Main {
        draw_motors(sink, store.motors());
    }
}

fn draw_main(sink: &mut impl DisplaySink, store: &Store) {
    let reading = store.reading();
    let threshold = store.threshold();

    sink.clear();
    sink.set_cursor_mode(CursorMode::Off);

    sink.move_cursor(0, 0);
    sink.write_text(MAIN_LINE_1);
    number_field(sink, 0, TEMP_COL, reading.temperature);
    number_field(sink, 0, HUMI_COL, reading.humidity);

    sink.move_cursor(1, 0);
    sink.write_text(MAIN_LINE_2);
    number_field(sink, 1, TEMP_COL, threshold.temperature);
    number_field(sink, 1, HUMI_COL, threshold.humidity);

    sink.move_cursor(2, 0);
    sink.write_text(MAIN_LINE_3);
    draw_motors(sink, store.motors());

    sink.move_cursor(3, 0);
    sink.write_text(MAIN_LINE_4);
}

/// The config template shows blank entry fields; values appear only once a
/// field is confirmed.
fn draw_config(sink: &mut impl DisplaySink) {
    sink.clear();

    sink.move_cursor(CONFIG_TEMP_ROW, 0);
    sink.write_text(CONFIG_LINE_1);

    sink.move_cursor(CONFIG_HUMI_ROW, 0);
    sink.write_text(CONFIG_LINE_2);

    sink.move_cursor(3, 0);
    sink.write_text(CONFIG_LINE_4);

    // Entry starts at the temperature field.
    sink.move_cursor(CONFIG_TEMP_ROW, CONFIG_COL);
    sink.set_cursor_mode(CursorMode::Blink);
}

fn draw_motors(sink: &mut impl DisplaySink, motors: MotorState) {
    on_off_field(sink, PUMP_COL, motors.pump);
    on_off_field(sink, HEATER_COL, motors.heater);
    on_off_field(sink, COOLER_COL, motors.cooler);
}

/// Blank the 3-character cell, then write the value, so a shorter value
/// leaves no stale digits behind.
fn number_field(sink: &mut impl DisplaySink, row: u8, col: u8, value: u8) {
    sink.move_cursor(row, col);
    sink.write_text("   ");
    sink.move_cursor(row, col);

    let mut text: String<3> = String::new();
    let _ = write!(text, "{}", value);
    sink.write_text(&text);
}

fn on_off_field(sink: &mut impl DisplaySink, col: u8, on: bool) {
    sink.move_cursor(MOTOR_ROW, col);
    sink.write_text("   ");
    sink.move_cursor(MOTOR_ROW, col);
    sink.write_text(if on { "ON" } else { "OFF" });
}

/// Wait for display bits and render each batch.
pub async fn display_loop(store: &Store, bus: &EventBus, mut sink: impl DisplaySink) -> ! {
    loop {
        let set = bus.display.wait().await;
        render(&mut sink, store, set);
    }
}
