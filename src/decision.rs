//! Decision engine: recomputes actuator intents whenever a reading or
//! threshold changes.

use embassy_time::{Duration, Timer};

use crate::event::{ControlEvent, DisplayEvent, EventBus};
use crate::store::{MotorState, Reading, Store, Threshold};

/// How long each apply window rests before the next one is queued.
pub const SETTLE: Duration = Duration::from_millis(10);

/// The decision rule. Pure; recomputing from the same inputs yields the
/// same intents, so collapsed check signals lose nothing.
pub fn evaluate(reading: Reading, threshold: Threshold) -> MotorState {
    use core::cmp::Ordering;

    let (cooler, heater) = match reading.temperature.cmp(&threshold.temperature) {
        Ordering::Greater => (true, false),
        Ordering::Less => (false, true),
        Ordering::Equal => (false, false),
    };

    let pump = reading.humidity < threshold.humidity;

    MotorState {
        heater,
        cooler,
        pump,
    }
}

/// Wait on the check gate, recompute intents, and hand them to the actuation
/// loop in two windows: heater+cooler together, then the pump. The split
/// keeps the temperature pair and the pump from being driven down the same
/// apply window.
pub async fn decision_loop(store: &Store, bus: &EventBus) -> ! {
    // First paint of the main screen happens once the coordinator is up.
    bus.display.raise(DisplayEvent::ShowMain);

    loop {
        bus.check.wait().await;

        let motors = evaluate(store.reading(), store.threshold());
        store.set_motors(motors);

        bus.control.send(ControlEvent::Heater).await;
        bus.control.send(ControlEvent::Cooler).await;
        Timer::after(SETTLE).await;

        bus.control.send(ControlEvent::Pump).await;
        Timer::after(SETTLE).await;

        bus.display.raise(DisplayEvent::Actuators);
    }
}
