/***************************************/
/*        3rd party libraries          */
/***************************************/
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::structs::{Behaviour, CallStatus, Direction};

/// Everything that can go wrong while ingesting an event or mutating the
/// scheduler. None of these are fatal: a rejected event fails to mutate
/// state, gets logged, and the loop moves on to the next event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("floor {floor} outside building (0..{n_floors})")]
    InvalidFloor { floor: u8, n_floors: u8 },

    #[error("call already open at floor {floor} going {direction:?}")]
    DuplicateCall { floor: u8, direction: Direction },

    #[error("unknown call id {0}")]
    UnknownCall(u64),

    #[error("unknown car id {0}")]
    UnknownCar(u8),

    #[error("event illegal for car {car_id} in state {state:?}: {reason}")]
    IllegalEvent {
        car_id: u8,
        state: Behaviour,
        reason: String,
    },

    #[error("call {call_id} cannot transition {from:?} -> {to:?}")]
    InvalidTransition {
        call_id: u64,
        from: CallStatus,
        to: CallStatus,
    },
}
