/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::collections::BTreeSet;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Behaviour, Direction, DispatchError};

/**
 * One elevator car as seen by the dispatch core.
 *
 * The struct is data-only: it holds the last confirmed telemetry (floor,
 * behaviour) plus the commitments the dispatcher has made on its behalf
 * (stop queue, boarded destinations). All mutation goes through the event
 * ingestor (confirmed telemetry) or the dispatch engine (stops), never
 * through local prediction.
 *
 * # Fields
 * - `id`:           Car id, equal to its index in the scheduler.
 * - `floor`:        Last confirmed floor from the plant.
 * - `behaviour`:    Current state machine state.
 * - `heading`:      Committed scan direction; survives the door cycle and
 *                   is cleared only when the car has nothing left to do.
 * - `stop_queue`:   Committed stops. A set: floors are unique, and the
 *                   service order is derived from the LOOK scan, not from
 *                   insertion order.
 * - `destinations`: Floors committed by boarded riders, used to decide
 *                   whether a stop may be pruned on call cancellation.
 * - `load`:         Riders currently on board. Invariant: `load <= capacity`.
 */
#[derive(Debug, Clone)]
pub struct Car {
    pub id: u8,
    pub floor: u8,
    pub behaviour: Behaviour,
    pub heading: Option<Direction>,
    pub stop_queue: BTreeSet<u8>,
    pub destinations: Vec<u8>,
    pub load: u8,
    pub capacity: u8,
}

impl Car {
    pub fn new(id: u8, home_floor: u8, capacity: u8) -> Car {
        Car {
            id,
            floor: home_floor,
            behaviour: Behaviour::Idle,
            heading: None,
            stop_queue: BTreeSet::new(),
            destinations: Vec::new(),
            load: 0,
            capacity,
        }
    }

    /// Attempt a state change, checked against the static transition
    /// table. Self-transitions are no-ops.
    pub fn transition(&mut self, to: Behaviour) -> Result<(), DispatchError> {
        if self.behaviour == to {
            return Ok(());
        }
        if !self.behaviour.can_transition(to) {
            return Err(DispatchError::IllegalEvent {
                car_id: self.id,
                state: self.behaviour,
                reason: format!("transition to {:?}", to),
            });
        }
        self.behaviour = to;
        Ok(())
    }

    pub fn is_offline(&self) -> bool {
        self.behaviour == Behaviour::Offline
    }

    pub fn is_full(&self) -> bool {
        self.load >= self.capacity
    }

    pub fn add_stop(&mut self, floor: u8) {
        self.stop_queue.insert(floor);
    }

    pub fn remove_stop(&mut self, floor: u8) {
        self.stop_queue.remove(&floor);
    }

    /// Mark the car faulted: absorbing state, commitments dropped. The
    /// caller hands the car's unserviced calls back to the dispatcher.
    pub fn go_offline(&mut self) {
        self.behaviour = Behaviour::Offline;
        self.heading = None;
        self.stop_queue.clear();
        self.destinations.clear();
    }

    /// Stops strictly beyond the current floor in the given direction,
    /// nearest first.
    pub fn stops_ahead(&self, direction: Direction) -> Vec<u8> {
        match direction {
            Direction::Up => self.stop_queue.range(self.floor + 1..).copied().collect(),
            Direction::Down => self.stop_queue.range(..self.floor).rev().copied().collect(),
        }
    }

    /// Nearest stop beyond the current floor in the given direction.
    pub fn next_stop_ahead(&self, direction: Direction) -> Option<u8> {
        self.stops_ahead(direction).first().copied()
    }

    /// Number of committed stops strictly between the current floor and
    /// `floor`. This is the "intermediate stops" term of the cost model.
    pub fn stops_between(&self, floor: u8) -> u32 {
        let (lo, hi) = if floor > self.floor {
            (self.floor, floor)
        } else {
            (floor, self.floor)
        };
        if hi - lo <= 1 {
            return 0;
        }
        self.stop_queue.range(lo + 1..hi).count() as u32
    }

    pub fn distance_to(&self, floor: u8) -> u32 {
        (self.floor as i32 - floor as i32).unsigned_abs()
    }

    /// True once no stop remains beyond the current floor in the committed
    /// direction. At this point the scan reverses, so calls in either
    /// direction may be serviced here.
    pub fn at_reversal_point(&self) -> bool {
        match self.heading {
            Some(d) => self.next_stop_ahead(d).is_none(),
            None => true,
        }
    }

    /// Committed stops in planned LOOK service order: floors ahead in the
    /// committed direction nearest first, then the remainder for the
    /// return sweep.
    pub fn queue_in_service_order(&self) -> Vec<u8> {
        match self.heading {
            Some(d) => {
                let mut order = self.stops_ahead(d);
                order.extend(self.stops_ahead(d.opposite()));
                if self.stop_queue.contains(&self.floor) {
                    order.insert(0, self.floor);
                }
                order
            }
            None => self.stop_queue.iter().copied().collect(),
        }
    }
}
