/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, warn};
use std::collections::HashMap;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Command, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Sent to the plant and now in flight.
    Sent,
    /// Identical command already in flight; nothing new was sent.
    InFlight,
    /// A different command is unacknowledged for this car; refused.
    Conflict,
}

/**
 * Converts dispatch decisions into outbound commands with exactly one
 * outstanding command per car.
 *
 * A second, conflicting command for a car is refused until the first one
 * is acknowledged. Acknowledgements ride on the plant's own confirmation
 * events: an arrival at the commanded floor acks `MoveTo`, door
 * confirmations ack `OpenDoor`/`CloseDoor`, and a fault clears the slot.
 *
 * Resend timing is never owned here. The plant adapter decides when an
 * unacknowledged command has waited long enough and calls `resend`,
 * which re-emits the identical (idempotent) command.
 */
pub struct CommandEmitter {
    command_tx: cbc::Sender<Command>,
    in_flight: HashMap<u8, Command>,
}

impl CommandEmitter {
    pub fn new(command_tx: cbc::Sender<Command>) -> CommandEmitter {
        CommandEmitter {
            command_tx,
            in_flight: HashMap::new(),
        }
    }

    pub fn submit(&mut self, command: Command) -> SubmitOutcome {
        let car_id = command.car_id();
        match self.in_flight.get(&car_id) {
            Some(outstanding) if *outstanding == command => SubmitOutcome::InFlight,
            Some(outstanding) => {
                debug!(
                    "car {}: holding {:?} while {:?} is unacknowledged",
                    car_id, command, outstanding
                );
                SubmitOutcome::Conflict
            }
            None => {
                self.send(&command);
                self.in_flight.insert(car_id, command);
                SubmitOutcome::Sent
            }
        }
    }

    /// Clear in-flight slots confirmed by a plant event.
    pub fn observe(&mut self, event: &Event) {
        match *event {
            Event::CarArrived { car_id, floor } => {
                if let Some(Command::MoveTo { floor: target, .. }) = self.in_flight.get(&car_id) {
                    // Arrivals at intermediate floors do not complete the move.
                    if *target == floor {
                        self.in_flight.remove(&car_id);
                    }
                }
            }
            Event::DoorOpened { car_id } => {
                if matches!(self.in_flight.get(&car_id), Some(Command::OpenDoor { .. })) {
                    self.in_flight.remove(&car_id);
                }
            }
            Event::DoorClosed { car_id } => {
                if matches!(self.in_flight.get(&car_id), Some(Command::CloseDoor { .. })) {
                    self.in_flight.remove(&car_id);
                }
            }
            Event::CarFault { car_id } => {
                self.in_flight.remove(&car_id);
            }
            _ => {}
        }
    }

    /// Re-emit the car's unacknowledged command, if any. Called by the
    /// adapter after its own timeout window, never by the core.
    pub fn resend(&mut self, car_id: u8) -> Option<Command> {
        let command = self.in_flight.get(&car_id).cloned()?;
        self.send(&command);
        Some(command)
    }

    pub fn in_flight(&self, car_id: u8) -> Option<&Command> {
        self.in_flight.get(&car_id)
    }

    fn send(&self, command: &Command) {
        // Transport failures are the adapter's problem; the decision loop
        // must not stall on them.
        if let Err(e) = self.command_tx.send(command.clone()) {
            warn!("command channel closed, dropping {:?}: {}", command, e);
        }
    }
}
