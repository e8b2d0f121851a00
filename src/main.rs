//! STM32F103 greenhouse controller firmware.
//!
//! ```
//!      Display -> STM32        Terminal -> STM32
//! (black)  GND -> GND       (yellow) RXD -> PA10
//! (red)    +5V -> VCC       (green)  TXD -> PA9
//! (yellow) SDA -> PB7
//! (green)  SCL -> PB6
//! ```
//!
//! Sensors: LM35-style analog probes on PA0 (temperature) and PA1
//! (humidity). Actuators: heater PB13, cooler PB14, pump PB12.

#![no_std]
#![no_main]

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_stm32::adc::Adc;
use embassy_stm32::gpio::{Level, Output, Pin, Speed};
use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Blocking;
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{BufferedUart, BufferedUartRx};
use embassy_stm32::{bind_interrupts, peripherals, usart};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::pipe::Pipe;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_io_async::{Read, Write};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use smart_greenhouse::ports::{
    Actuator, ActuatorBank, ByteStream, CursorMode, DisplaySink, SensorSource,
};
use smart_greenhouse::{actuation, decision, display, sensing, terminal};
use smart_greenhouse::{EventBus, Store};

bind_interrupts!(struct Irqs {
    USART1 => usart::BufferedInterruptHandler<peripherals::USART1>;
});

const USART_BAUD: u32 = 9600;

static STORE: Store = Store::new();
static BUS: EventBus = EventBus::new();

static RX_PIPE: Pipe<ThreadModeRawMutex, 16> = Pipe::new();
static TX_PIPE: Pipe<ThreadModeRawMutex, 32> = Pipe::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("greenhouse controller starting");
    let p = embassy_stm32::init(Default::default());

    let i2c = I2c::new_blocking(p.I2C1, p.PB6, p.PB7, Hertz::khz(400), Default::default());
    let interface = I2CDisplayInterface::new(i2c);
    let mut oled = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    oled.init().unwrap();
    let sink = OledSink::new(oled);

    let sensors = AdcSensors {
        adc: Adc::new(p.ADC1),
        temperature: p.PA0,
        humidity: p.PA1,
    };

    let bank = RelayBank {
        heater: Output::new(p.PB13.degrade(), Level::Low, Speed::Low),
        cooler: Output::new(p.PB14.degrade(), Level::Low, Speed::Low),
        pump: Output::new(p.PB12.degrade(), Level::Low, Speed::Low),
    };

    let mut stream = PipeStream;
    stream.write_line(smart_greenhouse::BANNER);

    unwrap!(spawner.spawn(uart_task((p.USART1, p.PA10, p.PA9), spawner)));
    unwrap!(spawner.spawn(display_task(sink)));
    unwrap!(spawner.spawn(sensing_task(sensors)));
    unwrap!(spawner.spawn(terminal_task(stream)));
    unwrap!(spawner.spawn(decision_task()));
    unwrap!(spawner.spawn(actuation_task(bank)));
    info!("all tasks running");
}

#[embassy_executor::task]
async fn sensing_task(sensors: AdcSensors) {
    sensing::sensing_loop(&STORE, &BUS, sensors).await
}

#[embassy_executor::task]
async fn decision_task() {
    decision::decision_loop(&STORE, &BUS).await
}

#[embassy_executor::task]
async fn actuation_task(bank: RelayBank) {
    actuation::actuation_loop(&STORE, &BUS, bank).await
}

#[embassy_executor::task]
async fn terminal_task(stream: PipeStream) {
    terminal::terminal_loop(&STORE, &BUS, stream).await
}

#[embassy_executor::task]
async fn display_task(sink: OledSink) {
    display::display_loop(&STORE, &BUS, sink).await
}

// ---------------------------------------------------------------------------
// Serial transport: buffered USART split into pipe-fed halves.
// ---------------------------------------------------------------------------

type UartPins = (peripherals::USART1, peripherals::PA10, peripherals::PA9);

#[embassy_executor::task]
async fn uart_task(p: UartPins, spawner: Spawner) {
    static TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
    let tx_buf = &mut TX_BUF.init([0; 16])[..];
    static RX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
    let rx_buf = &mut RX_BUF.init([0; 16])[..];

    let mut config = embassy_stm32::usart::Config::default();
    config.baudrate = USART_BAUD;

    let uart = BufferedUart::new(
        p.0,  // UART peripheral
        Irqs, // interrupts
        p.1,  // RX pin
        p.2,  // TX pin
        tx_buf, rx_buf, config,
    )
    .expect("Create UART");

    let (mut tx, rx) = uart.split();
    unwrap!(spawner.spawn(uart_reader(rx)));

    loop {
        let mut buf = [0u8; 16];
        let len = TX_PIPE.read(&mut buf).await;
        let _ = tx.write_all(&buf[..len]).await;
    }
}

#[embassy_executor::task]
async fn uart_reader(mut rx: BufferedUartRx<'static>) {
    info!("terminal input ready");
    loop {
        let mut byte = [0u8; 1];
        if rx.read(&mut byte).await.is_ok() {
            // A full pipe drops the byte; the terminal polls faster than
            // anyone types.
            let _ = RX_PIPE.try_write(&byte);
        }
    }
}

/// Byte-stream port over the UART pipes.
struct PipeStream;

impl ByteStream for PipeStream {
    fn try_read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match RX_PIPE.try_read(&mut byte) {
            Ok(n) if n > 0 => Some(byte[0]),
            _ => None,
        }
    }

    fn write_line(&mut self, text: &str) {
        let _ = TX_PIPE.try_write(text.as_bytes());
    }
}

// ---------------------------------------------------------------------------
// Sensor source: two analog channels on ADC1.
// ---------------------------------------------------------------------------

struct AdcSensors {
    adc: Adc<'static, peripherals::ADC1>,
    temperature: peripherals::PA0,
    humidity: peripherals::PA1,
}

/// Linear probe scale: 12-bit count at 3.3 V, 10 mV per unit.
fn scale(raw: u16) -> u8 {
    ((raw as u32 * 330) / 4096).min(255) as u8
}

impl SensorSource for AdcSensors {
    fn read_temperature(&mut self) -> Option<u8> {
        let raw = self.adc.blocking_read(&mut self.temperature);
        Some(scale(raw))
    }

    fn read_humidity(&mut self) -> Option<u8> {
        let raw = self.adc.blocking_read(&mut self.humidity);
        Some(scale(raw))
    }
}

// ---------------------------------------------------------------------------
// Actuator bank: three GPIO lines.
// ---------------------------------------------------------------------------

struct RelayBank {
    heater: Output<'static>,
    cooler: Output<'static>,
    pump: Output<'static>,
}

impl ActuatorBank for RelayBank {
    fn set_output(&mut self, actuator: Actuator, on: bool) {
        info!("actuator {} -> {}", actuator as u8, on);
        let line = match actuator {
            Actuator::Heater => &mut self.heater,
            Actuator::Cooler => &mut self.cooler,
            Actuator::Pump => &mut self.pump,
        };
        if on {
            line.set_high();
        } else {
            line.set_low();
        }
    }
}

// ---------------------------------------------------------------------------
// Display sink: 20x4 character grid on a 128x64 OLED.
// ---------------------------------------------------------------------------

type Oled = Ssd1306<
    I2CInterface<I2c<'static, Blocking>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

const CHAR_W: i32 = 6;
const CHAR_H: i32 = 10;

struct OledSink {
    oled: Oled,
    row: u8,
    col: u8,
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    // Background fill so rewrites overwrite stale characters.
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .background_color(BinaryColor::Off)
        .build()
}

impl OledSink {
    fn new(oled: Oled) -> Self {
        Self {
            oled,
            row: 0,
            col: 0,
        }
    }

    fn draw_at_cursor(&mut self, text: &str) {
        let origin = Point::new(self.col as i32 * CHAR_W, self.row as i32 * CHAR_H);
        let _ = Text::with_baseline(text, origin, text_style(), Baseline::Top).draw(&mut self.oled);
        let _ = self.oled.flush();
    }
}

impl DisplaySink for OledSink {
    fn clear(&mut self) {
        self.oled.clear_buffer();
        let _ = self.oled.flush();
        self.row = 0;
        self.col = 0;
    }

    fn write_text(&mut self, text: &str) {
        self.draw_at_cursor(text);
        self.col = self.col.saturating_add(text.len() as u8);
    }

    fn move_cursor(&mut self, row: u8, col: u8) {
        self.row = row;
        self.col = col;
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) {
        // No hardware cursor on the OLED; an underscore marks the cell and
        // the next field rewrite erases it.
        match mode {
            CursorMode::On | CursorMode::Blink => self.draw_at_cursor("_"),
            CursorMode::Off => {}
        }
    }
}
