//! Actuation loop: drives the physical output lines from the stored intents.

use embassy_time::{Duration, Timer};

use crate::event::{ControlEvent, EventBus};
use crate::ports::{Actuator, ActuatorBank};
use crate::store::Store;

pub const HOLDOFF: Duration = Duration::from_millis(5);

/// Drive one output line to the level currently stored for it.
pub fn apply_event(store: &Store, bank: &mut impl ActuatorBank, event: ControlEvent) {
    let motors = store.motors();
    match event {
        ControlEvent::Heater => bank.set_output(Actuator::Heater, motors.heater),
        ControlEvent::Cooler => bank.set_output(Actuator::Cooler, motors.cooler),
        ControlEvent::Pump => bank.set_output(Actuator::Pump, motors.pump),
    }
}

/// Block until an apply request arrives, service the whole pending batch,
/// then rest briefly before waiting again.
pub async fn actuation_loop(store: &Store, bus: &EventBus, mut bank: impl ActuatorBank) -> ! {
    loop {
        let mut next = Some(bus.control.receive().await);
        while let Some(event) = next {
            apply_event(store, &mut bank, event);
            next = bus.control.try_receive().ok();
        }
        Timer::after(HOLDOFF).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MotorState;

    #[derive(Default)]
    struct FakeBank {
        writes: Vec<(Actuator, bool)>,
    }

    impl ActuatorBank for FakeBank {
        fn set_output(&mut self, actuator: Actuator, on: bool) {
            self.writes.push((actuator, on));
        }
    }

    #[test]
    fn writes_the_stored_level_for_the_named_actuator() {
        let store = Store::new();
        store.set_motors(MotorState {
            heater: true,
            cooler: false,
            pump: true,
        });
        let mut bank = FakeBank::default();

        apply_event(&store, &mut bank, ControlEvent::Heater);
        apply_event(&store, &mut bank, ControlEvent::Cooler);
        apply_event(&store, &mut bank, ControlEvent::Pump);

        assert_eq!(
            bank.writes,
            vec![
                (Actuator::Heater, true),
                (Actuator::Cooler, false),
                (Actuator::Pump, true),
            ]
        );
    }

    #[test]
    fn rereads_intents_per_event() {
        let store = Store::new();
        let mut bank = FakeBank::default();

        store.set_motors(MotorState {
            pump: true,
            ..MotorState::default()
        });
        apply_event(&store, &mut bank, ControlEvent::Pump);

        store.set_motors(MotorState::default());
        apply_event(&store, &mut bank, ControlEvent::Pump);

        assert_eq!(
            bank.writes,
            vec![(Actuator::Pump, true), (Actuator::Pump, false)]
        );
    }
}
