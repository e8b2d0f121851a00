//! Sensing loop: polls both sensor channels and publishes changed readings.

use embassy_time::{Duration, Timer};

use crate::event::{DisplayEvent, EventBus};
use crate::ports::SensorSource;
use crate::store::Store;

pub const SENSOR_POLL: Duration = Duration::from_millis(500);

/// One poll of both channels. Unchanged values are a no-op; a changed value
/// updates the store, arms the check gate and flags the field for redraw.
pub fn poll_once(store: &Store, bus: &EventBus, sensors: &mut impl SensorSource) {
    if let Some(value) = sensors.read_temperature() {
        let mut reading = store.reading();
        if reading.temperature != value {
            reading.temperature = value;
            store.set_reading(reading);
            bus.request_check();
            bus.display.raise(DisplayEvent::TemperatureData);
        }
    }

    if let Some(value) = sensors.read_humidity() {
        let mut reading = store.reading();
        if reading.humidity != value {
            reading.humidity = value;
            store.set_reading(reading);
            bus.request_check();
            bus.display.raise(DisplayEvent::HumidityData);
        }
    }
}

pub async fn sensing_loop(store: &Store, bus: &EventBus, mut sensors: impl SensorSource) -> ! {
    loop {
        poll_once(store, bus, &mut sensors);
        Timer::after(SENSOR_POLL).await;
    }
}
