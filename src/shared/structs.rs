/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;

/***************************************/
/*       Public data structures        */
/***************************************/

/// Travel direction of a hall call, and the committed scan direction of a car.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match *self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Per-car state machine states. `Offline` is absorbing; every other
/// state cycles for the lifetime of the car.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Behaviour {
    Idle,
    MovingUp,
    MovingDown,
    DoorOpening,
    DoorOpen,
    DoorClosing,
    Offline,
}

impl Behaviour {
    /// Static transition table. Valid next-states are enumerated here and
    /// checked on every transition attempt.
    pub fn can_transition(self, to: Behaviour) -> bool {
        if to == Behaviour::Offline {
            // A fault may hit the car in any state.
            return self != Behaviour::Offline;
        }
        match self {
            Behaviour::Idle => matches!(
                to,
                Behaviour::MovingUp | Behaviour::MovingDown | Behaviour::DoorOpening
            ),
            // Reversal at a stopless floor skips the door cycle.
            Behaviour::MovingUp => {
                matches!(to, Behaviour::DoorOpening | Behaviour::MovingDown | Behaviour::Idle)
            }
            Behaviour::MovingDown => {
                matches!(to, Behaviour::DoorOpening | Behaviour::MovingUp | Behaviour::Idle)
            }
            Behaviour::DoorOpening => matches!(to, Behaviour::DoorOpen),
            Behaviour::DoorOpen => matches!(to, Behaviour::DoorClosing),
            Behaviour::DoorClosing => {
                matches!(to, Behaviour::Idle | Behaviour::MovingUp | Behaviour::MovingDown)
            }
            Behaviour::Offline => false,
        }
    }

    pub fn is_moving(self) -> bool {
        matches!(self, Behaviour::MovingUp | Behaviour::MovingDown)
    }

    pub fn door_state(self) -> DoorState {
        match self {
            Behaviour::DoorOpening => DoorState::Opening,
            Behaviour::DoorOpen => DoorState::Open,
            Behaviour::DoorClosing => DoorState::Closing,
            _ => DoorState::Closed,
        }
    }
}

/// Door position as reported in telemetry snapshots.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    Open,
    Closed,
    Opening,
    Closing,
}

/// Lifecycle of a hall call.
///
/// `Pending -> Assigned -> Serviced`, with `Cancelled` reachable from
/// `Pending` and `Assigned`. `assigned_car` is `Some` iff the status is
/// `Assigned` or `Serviced`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Pending,
    Assigned,
    Serviced,
    Cancelled,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Call {
    pub id: u64,
    pub floor: u8,
    pub direction: Direction,
    #[serde(rename = "createdAt")]
    pub created_at: u64,
    pub status: CallStatus,
    #[serde(rename = "assignedCar")]
    pub assigned_car: Option<u8>,
}

/// Inbound events from the plant/simulation adapter. The wire encoding is
/// the adapter's concern; this is the core-facing message set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    CallCreated { floor: u8, direction: Direction },
    CallCancelled { call_id: u64 },
    CarArrived { car_id: u8, floor: u8 },
    DoorOpened { car_id: u8 },
    DoorClosed { car_id: u8 },
    CarFault { car_id: u8 },
    PassengerBoarded { car_id: u8, destination: u8 },
    PassengerAlighted { car_id: u8 },
}

/// Outbound commands to the plant. Idempotent: resending an
/// unacknowledged command is always safe.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    MoveTo { car_id: u8, floor: u8 },
    OpenDoor { car_id: u8 },
    CloseDoor { car_id: u8 },
}

impl Command {
    pub fn car_id(&self) -> u8 {
        match *self {
            Command::MoveTo { car_id, .. } => car_id,
            Command::OpenDoor { car_id } => car_id,
            Command::CloseDoor { car_id } => car_id,
        }
    }
}

/***************************************/
/*          Telemetry export           */
/***************************************/

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarSnapshot {
    pub id: u8,
    pub floor: u8,
    pub direction: Option<Direction>,
    #[serde(rename = "doorState")]
    pub door_state: DoorState,
    pub behaviour: Behaviour,
    /// Committed stops in planned service order.
    pub queue: Vec<u8>,
    pub load: u8,
    pub capacity: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CallSnapshot {
    pub id: u64,
    pub floor: u8,
    pub direction: Direction,
    pub status: CallStatus,
    #[serde(rename = "assignedCar")]
    pub assigned_car: Option<u8>,
}

/// Immutable point-in-time copy of the whole scheduler state. Produced on
/// demand between event applications, never mutated after construction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SchedulerSnapshot {
    pub tick: u64,
    pub cars: Vec<CarSnapshot>,
    pub calls: Vec<CallSnapshot>,
}
