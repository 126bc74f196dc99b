/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::DispatchConfig;
use crate::scheduler::{Car, Scheduler};
use crate::shared::{Behaviour, Command, Direction};

/**
 * The scheduling core. Runs after every applied event and does two
 * things, in order:
 *
 * 1. Assigns every PENDING call to the car with the lowest estimated
 *    cost (`assign_pending`). Assignment mutates the call status and the
 *    winning car's stop queue.
 * 2. Derives each car's next action from a LOOK scan over its stop queue
 *    (`motion_actions`). This part mutates nothing; the returned commands
 *    are handed to the emitter, and confirmed state changes come back in
 *    as plant events.
 *
 * Cost model: a car already sweeping towards the call in a compatible
 * direction pays only the stops it must make on the way. Any other car
 * (idle, moving away, or opposed) pays the full travel distance plus a
 * configurable reversal penalty. Cars that are offline or at capacity
 * are excluded entirely. Ties break on the lowest car id so runs are
 * reproducible.
 */
pub struct DispatchEngine {
    reversal_penalty: u32,
}

impl DispatchEngine {
    pub fn new(config: &DispatchConfig) -> DispatchEngine {
        DispatchEngine {
            reversal_penalty: config.reversal_penalty,
        }
    }

    /// Estimated cost for `car` to service a call, or `None` if the car
    /// is not eligible.
    pub fn cost(&self, car: &Car, floor: u8, direction: Direction) -> Option<u32> {
        if car.is_offline() || car.is_full() {
            return None;
        }
        let along_the_way = match car.heading {
            Some(h) => h == direction && Self::is_ahead_or_at(car.floor, floor, h),
            None => false,
        };
        if along_the_way {
            Some(car.stops_between(floor))
        } else {
            Some(car.distance_to(floor) + self.reversal_penalty)
        }
    }

    fn is_ahead_or_at(current: u8, floor: u8, direction: Direction) -> bool {
        match direction {
            Direction::Up => floor >= current,
            Direction::Down => floor <= current,
        }
    }

    /// Assign every pending call to its cheapest eligible car, oldest
    /// call first. Calls with no eligible car stay PENDING and are
    /// retried on the next trigger.
    pub fn assign_pending(&self, scheduler: &mut Scheduler) {
        let pending: Vec<(u64, u8, Direction)> = scheduler
            .registry
            .pending_calls()
            .map(|c| (c.id, c.floor, c.direction))
            .collect();

        for (call_id, floor, direction) in pending {
            let best = scheduler
                .cars
                .iter()
                .filter_map(|car| self.cost(car, floor, direction).map(|cost| (cost, car.id)))
                .min();

            match best {
                Some((cost, car_id)) => {
                    if let Err(e) = scheduler.registry.mark_assigned(call_id, car_id) {
                        debug!("skipping assignment of call {}: {}", call_id, e);
                        continue;
                    }
                    if let Ok(car) = scheduler.car_mut(car_id) {
                        car.add_stop(floor);
                    }
                    info!(
                        "call {} (floor {} {:?}) assigned to car {} at cost {}",
                        call_id, floor, direction, car_id, cost
                    );
                }
                None => {
                    debug!(
                        "no eligible car for call {} (floor {} {:?}), retrying later",
                        call_id, floor, direction
                    );
                }
            }
        }
    }

    /// One action per car that needs one. Read-only: the controller
    /// pushes these through the emitter and applies the implied state
    /// changes only for commands that actually go out.
    pub fn motion_actions(&self, scheduler: &Scheduler) -> Vec<Command> {
        let mut actions = Vec::new();
        for car in &scheduler.cars {
            match car.behaviour {
                Behaviour::Idle | Behaviour::MovingUp | Behaviour::MovingDown => {
                    if car.stop_queue.contains(&car.floor) && Self::should_open_here(car) {
                        actions.push(Command::OpenDoor { car_id: car.id });
                    } else if let Some(target) = Self::next_target(car) {
                        actions.push(Command::MoveTo {
                            car_id: car.id,
                            floor: target,
                        });
                    }
                }
                Behaviour::DoorOpen => {
                    // Dwell timing belongs to the plant adapter; the core
                    // just asks for the close and waits for confirmation.
                    actions.push(Command::CloseDoor { car_id: car.id });
                }
                Behaviour::DoorOpening | Behaviour::DoorClosing | Behaviour::Offline => {}
            }
        }
        actions
    }

    /// A stop at the current floor is served now if the car just arrived
    /// (it is still in a moving state), has no commitment, or sits at its
    /// reversal point. A parked car mid-sweep leaves an opposed stop at
    /// its own floor for the return sweep instead of reopening the doors
    /// it just closed.
    fn should_open_here(car: &Car) -> bool {
        car.behaviour.is_moving() || car.heading.is_none() || car.at_reversal_point()
    }

    /// LOOK scan: continue to the nearest stop ahead in the committed
    /// direction; if none remain ahead, reverse; if none remain at all,
    /// stay put. An uncommitted car heads for its nearest stop.
    fn next_target(car: &Car) -> Option<u8> {
        if car.stop_queue.is_empty() {
            return None;
        }
        match car.heading {
            Some(d) => car
                .next_stop_ahead(d)
                .or_else(|| car.next_stop_ahead(d.opposite())),
            None => car
                .stop_queue
                .iter()
                .copied()
                .min_by_key(|&f| (car.distance_to(f), f)),
        }
    }
}
