/*
 * Unit tests for the command emitter.
 *
 * The unit tests follow the Arrange, Act, Assert pattern.
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod emitter_tests {
    use crate::emitter::{CommandEmitter, SubmitOutcome};
    use crate::shared::Command;
    use crate::shared::Event;
    use crossbeam_channel::unbounded;

    fn setup_emitter() -> (CommandEmitter, crossbeam_channel::Receiver<Command>) {
        let (command_tx, command_rx) = unbounded::<Command>();
        (CommandEmitter::new(command_tx), command_rx)
    }

    #[test]
    fn test_first_command_is_sent() {
        // Arrange
        let (mut emitter, command_rx) = setup_emitter();
        let command = Command::MoveTo { car_id: 0, floor: 5 };

        // Act
        let outcome = emitter.submit(command.clone());

        // Assert
        assert_eq!(outcome, SubmitOutcome::Sent);
        assert_eq!(command_rx.try_recv(), Ok(command.clone()));
        assert_eq!(emitter.in_flight(0), Some(&command));
    }

    #[test]
    fn test_identical_resubmit_does_not_duplicate() {
        // Arrange
        let (mut emitter, command_rx) = setup_emitter();
        let command = Command::MoveTo { car_id: 0, floor: 5 };
        emitter.submit(command.clone());
        command_rx.try_recv().unwrap();

        // Act
        let outcome = emitter.submit(command);

        // Assert: already outstanding, nothing new on the wire.
        assert_eq!(outcome, SubmitOutcome::InFlight);
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn test_conflicting_command_is_refused() {
        // Arrange
        let (mut emitter, command_rx) = setup_emitter();
        let first = Command::MoveTo { car_id: 0, floor: 5 };
        emitter.submit(first.clone());
        command_rx.try_recv().unwrap();

        // Act: a different command for the same car.
        let outcome = emitter.submit(Command::OpenDoor { car_id: 0 });

        // Assert: refused, the original stays in flight.
        assert_eq!(outcome, SubmitOutcome::Conflict);
        assert!(command_rx.try_recv().is_err());
        assert_eq!(emitter.in_flight(0), Some(&first));
    }

    #[test]
    fn test_cars_have_independent_slots() {
        let (mut emitter, _command_rx) = setup_emitter();
        emitter.submit(Command::MoveTo { car_id: 0, floor: 5 });

        let outcome = emitter.submit(Command::MoveTo { car_id: 1, floor: 2 });

        assert_eq!(outcome, SubmitOutcome::Sent);
    }

    #[test]
    fn test_arrival_at_target_acknowledges_move() {
        // Arrange
        let (mut emitter, command_rx) = setup_emitter();
        emitter.submit(Command::MoveTo { car_id: 0, floor: 5 });
        command_rx.try_recv().unwrap();

        // Act: passing floor 3 is not the commanded floor.
        emitter.observe(&Event::CarArrived { car_id: 0, floor: 3 });
        assert!(emitter.in_flight(0).is_some());

        emitter.observe(&Event::CarArrived { car_id: 0, floor: 5 });

        // Assert: acknowledged, the slot is free again.
        assert!(emitter.in_flight(0).is_none());
        assert_eq!(
            emitter.submit(Command::OpenDoor { car_id: 0 }),
            SubmitOutcome::Sent
        );
    }

    #[test]
    fn test_door_confirmations_acknowledge_door_commands() {
        let (mut emitter, command_rx) = setup_emitter();
        emitter.submit(Command::OpenDoor { car_id: 0 });
        command_rx.try_recv().unwrap();

        emitter.observe(&Event::DoorOpened { car_id: 0 });
        assert!(emitter.in_flight(0).is_none());

        emitter.submit(Command::CloseDoor { car_id: 0 });
        emitter.observe(&Event::DoorClosed { car_id: 0 });
        assert!(emitter.in_flight(0).is_none());
    }

    #[test]
    fn test_fault_clears_the_slot() {
        let (mut emitter, _command_rx) = setup_emitter();
        emitter.submit(Command::MoveTo { car_id: 0, floor: 5 });

        emitter.observe(&Event::CarFault { car_id: 0 });

        assert!(emitter.in_flight(0).is_none());
    }

    #[test]
    fn test_resend_reemits_the_identical_command() {
        // Arrange
        let (mut emitter, command_rx) = setup_emitter();
        let command = Command::MoveTo { car_id: 0, floor: 5 };
        emitter.submit(command.clone());
        command_rx.try_recv().unwrap();

        // Act: the adapter decided its timeout window expired.
        let resent = emitter.resend(0);

        // Assert: same command, still exactly one in flight.
        assert_eq!(resent, Some(command.clone()));
        assert_eq!(command_rx.try_recv(), Ok(command.clone()));
        assert_eq!(emitter.in_flight(0), Some(&command));

        // Nothing to resend once acknowledged.
        emitter.observe(&Event::CarArrived { car_id: 0, floor: 5 });
        assert_eq!(emitter.resend(0), None);
    }
}
