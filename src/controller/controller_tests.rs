/*
 * Integration-style tests for the controller decision loop: events in,
 * commands out, snapshots on the side.
 *
 * The unit tests follow the Arrange, Act, Assert pattern.
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod controller_tests {
    use crate::config::{BuildingConfig, Config, DispatchConfig};
    use crate::controller::Controller;
    use crate::shared::Behaviour;
    use crate::shared::CallStatus;
    use crate::shared::Command;
    use crate::shared::Direction::Up;
    use crate::shared::Event;
    use crate::telemetry::{SnapshotRequest, TelemetryPublisher};
    use crossbeam_channel::unbounded;
    use std::thread::spawn;
    use std::time::Duration;

    fn setup_controller() -> (
        Controller,
        crossbeam_channel::Sender<Event>,
        crossbeam_channel::Receiver<Command>,
        TelemetryPublisher,
        crossbeam_channel::Sender<()>,
    ) {
        // Arrange mock channels
        let (event_tx, event_rx) = unbounded::<Event>();
        let (command_tx, command_rx) = unbounded::<Command>();
        let (snapshot_request_tx, snapshot_request_rx) = unbounded::<SnapshotRequest>();
        let (terminate_tx, terminate_rx) = unbounded::<()>();

        // Default configuration: one car resting at floor 5.
        let config = Config {
            building: BuildingConfig {
                n_floors: 10,
                n_cars: 1,
                capacity: 8,
            },
            dispatch: DispatchConfig { reversal_penalty: 3 },
        };

        (
            Controller::new(
                &config,
                event_rx,
                command_tx,
                snapshot_request_rx,
                terminate_rx,
            ),
            event_tx,
            command_rx,
            TelemetryPublisher::new(snapshot_request_tx),
            terminate_tx,
        )
    }

    fn expect_command(command_rx: &crossbeam_channel::Receiver<Command>, expected: Command) {
        match command_rx.recv_timeout(Duration::from_secs(3)) {
            Ok(command) => assert_eq!(command, expected),
            Err(e) => panic!("timed out waiting for {:?}: {:?}", expected, e),
        }
    }

    #[test]
    fn test_call_to_service_round_trip() {
        // Purpose: drive one call and one rider through the whole loop
        // and check every emitted command and the final state.

        // Arrange
        let (controller, event_tx, command_rx, telemetry, terminate_tx) = setup_controller();
        let controller_thread = spawn(move || controller.run());

        // Act: hall call up from floor 8.
        event_tx
            .send(Event::CallCreated {
                floor: 8,
                direction: Up,
            })
            .unwrap();
        expect_command(&command_rx, Command::MoveTo { car_id: 0, floor: 8 });

        // The assignment is visible in the snapshot.
        let snapshot = telemetry.snapshot().expect("controller gone");
        assert_eq!(snapshot.cars[0].behaviour, Behaviour::MovingUp);
        assert_eq!(snapshot.cars[0].queue, vec![8]);
        assert_eq!(snapshot.calls[0].status, CallStatus::Assigned);
        assert_eq!(snapshot.calls[0].assigned_car, Some(0));

        // Arrival at the origin floor opens the doors.
        event_tx
            .send(Event::CarArrived { car_id: 0, floor: 8 })
            .unwrap();
        expect_command(&command_rx, Command::OpenDoor { car_id: 0 });

        // Door confirmation services the call and requests the close.
        event_tx.send(Event::DoorOpened { car_id: 0 }).unwrap();
        expect_command(&command_rx, Command::CloseDoor { car_id: 0 });

        // The rider boards for floor 2 while the doors are still open.
        event_tx
            .send(Event::PassengerBoarded {
                car_id: 0,
                destination: 2,
            })
            .unwrap();
        event_tx.send(Event::DoorClosed { car_id: 0 }).unwrap();
        expect_command(&command_rx, Command::MoveTo { car_id: 0, floor: 2 });

        // Deliver the rider.
        event_tx
            .send(Event::CarArrived { car_id: 0, floor: 2 })
            .unwrap();
        expect_command(&command_rx, Command::OpenDoor { car_id: 0 });
        event_tx.send(Event::DoorOpened { car_id: 0 }).unwrap();
        expect_command(&command_rx, Command::CloseDoor { car_id: 0 });
        event_tx
            .send(Event::PassengerAlighted { car_id: 0 })
            .unwrap();
        event_tx.send(Event::DoorClosed { car_id: 0 }).unwrap();

        // Assert: back to rest, everything settled.
        let snapshot = telemetry.snapshot().expect("controller gone");
        assert_eq!(snapshot.cars[0].behaviour, Behaviour::Idle);
        assert_eq!(snapshot.cars[0].floor, 2);
        assert_eq!(snapshot.cars[0].load, 0);
        assert!(snapshot.cars[0].queue.is_empty());
        assert_eq!(snapshot.calls[0].status, CallStatus::Serviced);
        assert!(command_rx.try_recv().is_err());

        // Cleanup
        terminate_tx.send(()).unwrap();
        controller_thread.join().unwrap();
    }

    #[test]
    fn test_rejected_event_does_not_stop_the_loop() {
        // Arrange
        let (controller, event_tx, command_rx, telemetry, terminate_tx) = setup_controller();
        let controller_thread = spawn(move || controller.run());

        // Act: an out-of-range call, then a valid one.
        event_tx
            .send(Event::CallCreated {
                floor: 15,
                direction: Up,
            })
            .unwrap();
        event_tx
            .send(Event::CallCreated {
                floor: 8,
                direction: Up,
            })
            .unwrap();

        // Assert: the invalid event left no trace, the valid one flowed.
        expect_command(&command_rx, Command::MoveTo { car_id: 0, floor: 8 });
        let snapshot = telemetry.snapshot().expect("controller gone");
        assert_eq!(snapshot.calls.len(), 1);
        assert_eq!(snapshot.calls[0].floor, 8);

        // Cleanup
        terminate_tx.send(()).unwrap();
        controller_thread.join().unwrap();
    }

    #[test]
    fn test_snapshot_of_quiet_system() {
        // Arrange
        let (controller, _event_tx, _command_rx, telemetry, terminate_tx) = setup_controller();
        let controller_thread = spawn(move || controller.run());

        // Act
        let snapshot = telemetry.snapshot().expect("controller gone");

        // Assert: one idle car at its home floor, no calls.
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.cars.len(), 1);
        assert_eq!(snapshot.cars[0].floor, 5);
        assert_eq!(snapshot.cars[0].behaviour, Behaviour::Idle);
        assert!(snapshot.calls.is_empty());

        // And it serializes for the visualization sink.
        let json = telemetry.snapshot_json().expect("controller gone");
        assert!(json.contains("\"doorState\":\"closed\""));
        assert!(json.contains("\"behaviour\":\"idle\""));

        // Cleanup
        terminate_tx.send(()).unwrap();
        controller_thread.join().unwrap();
    }

    #[test]
    fn test_fault_moves_call_to_surviving_car() {
        // Purpose: Scenario C through the loop; needs two cars.

        // Arrange
        let (event_tx, event_rx) = unbounded::<Event>();
        let (command_tx, command_rx) = unbounded::<Command>();
        let (snapshot_request_tx, snapshot_request_rx) = unbounded::<SnapshotRequest>();
        let (terminate_tx, terminate_rx) = unbounded::<()>();
        let config = Config {
            building: BuildingConfig {
                n_floors: 10,
                n_cars: 2,
                capacity: 8,
            },
            dispatch: DispatchConfig { reversal_penalty: 3 },
        };
        let telemetry = TelemetryPublisher::new(snapshot_request_tx);
        let controller = Controller::new(
            &config,
            event_rx,
            command_tx,
            snapshot_request_rx,
            terminate_rx,
        );
        let controller_thread = spawn(move || controller.run());

        // Act: cars rest at 2 and 7; a call at 8 goes to car 1.
        event_tx
            .send(Event::CallCreated {
                floor: 8,
                direction: Up,
            })
            .unwrap();
        expect_command(&command_rx, Command::MoveTo { car_id: 1, floor: 8 });

        // Car 1 dies; the call must land on car 0 in the same cycle.
        event_tx.send(Event::CarFault { car_id: 1 }).unwrap();
        expect_command(&command_rx, Command::MoveTo { car_id: 0, floor: 8 });

        // Assert
        let snapshot = telemetry.snapshot().expect("controller gone");
        assert_eq!(snapshot.cars[1].behaviour, Behaviour::Offline);
        assert_eq!(snapshot.calls[0].status, CallStatus::Assigned);
        assert_eq!(snapshot.calls[0].assigned_car, Some(0));

        // Cleanup
        terminate_tx.send(()).unwrap();
        controller_thread.join().unwrap();
    }
}
