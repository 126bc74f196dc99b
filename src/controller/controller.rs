/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, error, warn};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::Config;
use crate::controller::ingest::EventIngestor;
use crate::dispatch::DispatchEngine;
use crate::emitter::{CommandEmitter, SubmitOutcome};
use crate::scheduler::Scheduler;
use crate::shared::{Behaviour, Command, Direction, Event};
use crate::telemetry::SnapshotRequest;

/**
 * The decision loop. Owns the scheduler aggregate and is the only
 * thread that ever mutates it.
 *
 * Events are drained FIFO from one ordered channel and applied one at a
 * time; each application is followed by a dispatch pass and command
 * emission before the next event is touched, so the engine never sees a
 * half-updated aggregate. Snapshot requests are served between events
 * from the same select loop, which is what makes snapshots consistent
 * without any locking.
 *
 * # Channels
 * - `event_rx`:            Inbound plant/call events, arrival order.
 * - `snapshot_request_rx`: Telemetry pulls; each carries its reply sender.
 * - `terminate_rx`:        Clean shutdown (used by tests).
 */
pub struct Controller {
    scheduler: Scheduler,
    ingestor: EventIngestor,
    engine: DispatchEngine,
    emitter: CommandEmitter,
    tick: u64,

    event_rx: cbc::Receiver<Event>,
    snapshot_request_rx: cbc::Receiver<SnapshotRequest>,
    terminate_rx: cbc::Receiver<()>,
}

impl Controller {
    pub fn new(
        config: &Config,
        event_rx: cbc::Receiver<Event>,
        command_tx: cbc::Sender<Command>,
        snapshot_request_rx: cbc::Receiver<SnapshotRequest>,
        terminate_rx: cbc::Receiver<()>,
    ) -> Controller {
        Controller {
            scheduler: Scheduler::new(&config.building),
            ingestor: EventIngestor::new(&config.building),
            engine: DispatchEngine::new(&config.dispatch),
            emitter: CommandEmitter::new(command_tx),
            tick: 0,
            event_rx,
            snapshot_request_rx,
            terminate_rx,
        }
    }

    pub fn run(mut self) {
        loop {
            cbc::select! {
                recv(self.event_rx) -> event => {
                    match event {
                        Ok(event) => self.handle_event(event),
                        Err(_) => {
                            // Event source gone: nothing left to schedule.
                            debug!("event channel closed, controller stopping");
                            return;
                        }
                    }
                }
                recv(self.snapshot_request_rx) -> request => {
                    if let Ok(reply_tx) = request {
                        let _ = reply_tx.send(self.scheduler.snapshot(self.tick));
                    }
                }
                recv(self.terminate_rx) -> _ => {
                    debug!("controller terminated");
                    return;
                }
            }
        }
    }

    /// Apply one event atomically: validate, mutate, dispatch, emit.
    /// Rejected events are logged and mutate nothing.
    fn handle_event(&mut self, event: Event) {
        self.tick += 1;
        match self.ingestor.apply(&mut self.scheduler, &event, self.tick) {
            Ok(()) => {
                self.emitter.observe(&event);
                self.run_dispatch();
            }
            Err(e) => warn!("rejected event {:?}: {}", event, e),
        }
    }

    fn run_dispatch(&mut self) {
        self.settle_idle_cars();
        self.engine.assign_pending(&mut self.scheduler);
        for command in self.engine.motion_actions(&self.scheduler) {
            if self.emitter.submit(command.clone()) == SubmitOutcome::Sent {
                self.apply_command(&command);
            }
        }
    }

    /// A moving car whose last stop was cancelled mid-flight coasts to
    /// its commanded floor; once that move is acknowledged and nothing
    /// remains in the queue, it parks.
    fn settle_idle_cars(&mut self) {
        for car in &mut self.scheduler.cars {
            let move_done = self.emitter.in_flight(car.id).is_none();
            if car.behaviour.is_moving() && car.stop_queue.is_empty() && move_done {
                if let Err(e) = car.transition(Behaviour::Idle) {
                    error!("car {} failed to park: {}", car.id, e);
                }
                if car.destinations.is_empty() {
                    car.heading = None;
                }
            }
        }
    }

    /// Bookkeeping for a command that actually went out: the car commits
    /// to the motion or door phase the command implies. Arrival and door
    /// confirmations then come back as plant events.
    fn apply_command(&mut self, command: &Command) {
        let result = match *command {
            Command::MoveTo { car_id, floor } => self.scheduler.car_mut(car_id).and_then(|car| {
                let heading = if floor > car.floor {
                    Direction::Up
                } else {
                    Direction::Down
                };
                car.heading = Some(heading);
                let behaviour = match heading {
                    Direction::Up => Behaviour::MovingUp,
                    Direction::Down => Behaviour::MovingDown,
                };
                car.transition(behaviour)
            }),
            Command::OpenDoor { car_id } => self
                .scheduler
                .car_mut(car_id)
                .and_then(|car| car.transition(Behaviour::DoorOpening)),
            Command::CloseDoor { car_id } => self
                .scheduler
                .car_mut(car_id)
                .and_then(|car| car.transition(Behaviour::DoorClosing)),
        };
        if let Err(e) = result {
            // Engine and table disagree; a bug, but never fatal.
            error!("command {:?} left car state unchanged: {}", command, e);
        }
    }
}
