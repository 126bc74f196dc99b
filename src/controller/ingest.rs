/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::debug;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::BuildingConfig;
use crate::scheduler::{CancelOutcome, Scheduler};
use crate::shared::{Behaviour, CallStatus, DispatchError, Event};

/**
 * Validates inbound plant events and applies the legal ones to the
 * scheduler. Every check happens before any mutation, so a rejected
 * event leaves the aggregate untouched and the caller just logs it.
 *
 * The dispatch trigger is the caller's job: the controller applies one
 * event, runs the engine, and only then drains the next event, which is
 * what makes "mutation + dispatch" one logical step.
 */
pub struct EventIngestor {
    n_floors: u8,
}

impl EventIngestor {
    pub fn new(building: &BuildingConfig) -> EventIngestor {
        EventIngestor {
            n_floors: building.n_floors,
        }
    }

    pub fn apply(
        &self,
        scheduler: &mut Scheduler,
        event: &Event,
        tick: u64,
    ) -> Result<(), DispatchError> {
        match *event {
            Event::CallCreated { floor, direction } => {
                self.check_floor(floor)?;
                let call_id = scheduler.registry.register(floor, direction, tick)?;
                debug!("call {} created: floor {} {:?}", call_id, floor, direction);
                Ok(())
            }

            Event::CallCancelled { call_id } => {
                match scheduler.registry.cancel(call_id)? {
                    CancelOutcome::NoOp => {}
                    CancelOutcome::Cancelled {
                        floor,
                        assigned_car: Some(car_id),
                        ..
                    } => {
                        // Drop the stop unless the floor still serves
                        // another assigned call or a boarded destination.
                        let still_needed = scheduler.registry.has_assigned_at(car_id, floor)
                            || scheduler
                                .car(car_id)
                                .map(|c| c.destinations.contains(&floor))
                                .unwrap_or(false);
                        if !still_needed {
                            scheduler.car_mut(car_id)?.remove_stop(floor);
                        }
                    }
                    CancelOutcome::Cancelled { .. } => {}
                }
                Ok(())
            }

            Event::CarArrived { car_id, floor } => {
                self.check_floor(floor)?;
                let car = scheduler.car_mut(car_id)?;
                if !car.behaviour.is_moving() {
                    return Err(DispatchError::IllegalEvent {
                        car_id,
                        state: car.behaviour,
                        reason: format!("arrival at floor {} while not moving", floor),
                    });
                }
                car.floor = floor;
                Ok(())
            }

            Event::DoorOpened { car_id } => {
                let car = scheduler.car_mut(car_id)?;
                if car.behaviour != Behaviour::DoorOpening {
                    return Err(DispatchError::IllegalEvent {
                        car_id,
                        state: car.behaviour,
                        reason: "door opened without an open in progress".into(),
                    });
                }
                car.transition(Behaviour::DoorOpen)?;
                let floor = car.floor;
                car.remove_stop(floor);
                car.destinations.retain(|&d| d != floor);
                self.service_calls_at(scheduler, car_id, floor);
                // An opposed call skipped mid-sweep keeps its stop for
                // the return sweep.
                if scheduler.registry.has_assigned_at(car_id, floor) {
                    scheduler.car_mut(car_id)?.add_stop(floor);
                }
                Ok(())
            }

            Event::DoorClosed { car_id } => {
                let car = scheduler.car_mut(car_id)?;
                if car.behaviour != Behaviour::DoorClosing {
                    return Err(DispatchError::IllegalEvent {
                        car_id,
                        state: car.behaviour,
                        reason: "door closed without a close in progress".into(),
                    });
                }
                car.transition(Behaviour::Idle)?;
                if car.stop_queue.is_empty() && car.destinations.is_empty() {
                    car.heading = None;
                }
                Ok(())
            }

            Event::CarFault { car_id } => {
                let car = scheduler.car(car_id)?;
                if car.is_offline() {
                    // Repeated fault reports are harmless.
                    return Ok(());
                }
                for call_id in scheduler.registry.assigned_to(car_id) {
                    if let Err(e) = scheduler.registry.unassign(call_id) {
                        debug!("could not hand back call {}: {}", call_id, e);
                    }
                }
                scheduler.car_mut(car_id)?.go_offline();
                Ok(())
            }

            Event::PassengerBoarded {
                car_id,
                destination,
            } => {
                self.check_floor(destination)?;
                let car = scheduler.car_mut(car_id)?;
                // Boarding happens while the doors are physically open; in
                // core time that spans DoorOpen and the close request.
                if !matches!(car.behaviour, Behaviour::DoorOpen | Behaviour::DoorClosing) {
                    return Err(DispatchError::IllegalEvent {
                        car_id,
                        state: car.behaviour,
                        reason: "boarding with doors closed".into(),
                    });
                }
                if car.is_full() {
                    return Err(DispatchError::IllegalEvent {
                        car_id,
                        state: car.behaviour,
                        reason: "boarding at full capacity".into(),
                    });
                }
                car.load += 1;
                car.destinations.push(destination);
                car.add_stop(destination);
                Ok(())
            }

            Event::PassengerAlighted { car_id } => {
                let car = scheduler.car_mut(car_id)?;
                // Alighting, like boarding, only happens through open doors.
                if !matches!(car.behaviour, Behaviour::DoorOpen | Behaviour::DoorClosing) {
                    return Err(DispatchError::IllegalEvent {
                        car_id,
                        state: car.behaviour,
                        reason: "alighting with doors closed".into(),
                    });
                }
                if car.load == 0 {
                    return Err(DispatchError::IllegalEvent {
                        car_id,
                        state: car.behaviour,
                        reason: "alighting from an empty car".into(),
                    });
                }
                car.load -= 1;
                Ok(())
            }
        }
    }

    /// A call is serviced when its car opens the doors at the origin
    /// floor and the call's direction matches the car's committed sweep,
    /// or the car is at its reversal point (nothing further ahead, so the
    /// return sweep starts here).
    fn service_calls_at(&self, scheduler: &mut Scheduler, car_id: u8, floor: u8) {
        let (heading, at_reversal) = match scheduler.car(car_id) {
            Ok(car) => (car.heading, car.at_reversal_point()),
            Err(_) => return,
        };
        let serviceable: Vec<u64> = scheduler
            .registry
            .calls()
            .filter(|c| {
                c.status == CallStatus::Assigned
                    && c.assigned_car == Some(car_id)
                    && c.floor == floor
                    && (heading.is_none() || heading == Some(c.direction) || at_reversal)
            })
            .map(|c| c.id)
            .collect();
        for call_id in serviceable {
            if let Err(e) = scheduler.registry.mark_serviced(call_id) {
                debug!("could not service call {}: {}", call_id, e);
            }
        }
    }

    fn check_floor(&self, floor: u8) -> Result<(), DispatchError> {
        if floor >= self.n_floors {
            return Err(DispatchError::InvalidFloor {
                floor,
                n_floors: self.n_floors,
            });
        }
        Ok(())
    }
}
