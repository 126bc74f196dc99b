/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::collections::BTreeMap;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Call, CallStatus, Direction, DispatchError};

/// What `cancel` actually did, so the caller can prune the assigned
/// car's stop queue when needed.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    /// Already serviced or already cancelled: nothing to undo.
    NoOp,
    Cancelled {
        floor: u8,
        direction: Direction,
        assigned_car: Option<u8>,
    },
}

/// Settled (serviced or cancelled) calls kept around before the oldest
/// are dropped. The window exists so that a late cancel for a recently
/// serviced call is still the documented no-op rather than an unknown id.
const SETTLED_RETENTION: usize = 64;

/**
 * Registry of all hall calls, pending and settled.
 *
 * Call ids are allocated from a monotonically increasing counter, so id
 * order is creation order and iteration over the backing `BTreeMap` is
 * oldest-first by construction. Creation timestamps are the controller's
 * event tick, not wall clock, which keeps runs reproducible.
 *
 * Open calls are kept forever; settled ones only up to
 * `SETTLED_RETENTION`, so the map stays bounded on a long-running
 * controller.
 */
#[derive(Debug, Clone, Default)]
pub struct CallRegistry {
    calls: BTreeMap<u64, Call>,
    next_id: u64,
}

impl CallRegistry {
    pub fn new() -> CallRegistry {
        CallRegistry::default()
    }

    /// Register a hall call. A second press of the same button while the
    /// first call is still unserviced is a duplicate.
    pub fn register(
        &mut self,
        floor: u8,
        direction: Direction,
        now: u64,
    ) -> Result<u64, DispatchError> {
        let open = self.calls.values().any(|c| {
            c.floor == floor
                && c.direction == direction
                && matches!(c.status, CallStatus::Pending | CallStatus::Assigned)
        });
        if open {
            return Err(DispatchError::DuplicateCall { floor, direction });
        }
        let id = self.next_id;
        self.next_id += 1;
        self.calls.insert(
            id,
            Call {
                id,
                floor,
                direction,
                created_at: now,
                status: CallStatus::Pending,
                assigned_car: None,
            },
        );
        Ok(id)
    }

    /// Cancel a call. No-op if already serviced or cancelled; unknown ids
    /// are an error.
    pub fn cancel(&mut self, call_id: u64) -> Result<CancelOutcome, DispatchError> {
        let call = self
            .calls
            .get_mut(&call_id)
            .ok_or(DispatchError::UnknownCall(call_id))?;
        match call.status {
            CallStatus::Serviced | CallStatus::Cancelled => Ok(CancelOutcome::NoOp),
            CallStatus::Pending | CallStatus::Assigned => {
                let assigned_car = call.assigned_car.take();
                call.status = CallStatus::Cancelled;
                let outcome = CancelOutcome::Cancelled {
                    floor: call.floor,
                    direction: call.direction,
                    assigned_car,
                };
                self.prune_settled();
                Ok(outcome)
            }
        }
    }

    /// Restartable iterator over PENDING calls, oldest first.
    pub fn pending_calls(&self) -> impl Iterator<Item = &Call> + '_ {
        self.calls
            .values()
            .filter(|c| c.status == CallStatus::Pending)
    }

    pub fn mark_assigned(&mut self, call_id: u64, car_id: u8) -> Result<(), DispatchError> {
        let call = self
            .calls
            .get_mut(&call_id)
            .ok_or(DispatchError::UnknownCall(call_id))?;
        if call.status != CallStatus::Pending {
            return Err(DispatchError::InvalidTransition {
                call_id,
                from: call.status,
                to: CallStatus::Assigned,
            });
        }
        call.status = CallStatus::Assigned;
        call.assigned_car = Some(car_id);
        Ok(())
    }

    pub fn mark_serviced(&mut self, call_id: u64) -> Result<(), DispatchError> {
        let call = self
            .calls
            .get_mut(&call_id)
            .ok_or(DispatchError::UnknownCall(call_id))?;
        if call.status != CallStatus::Assigned {
            return Err(DispatchError::InvalidTransition {
                call_id,
                from: call.status,
                to: CallStatus::Serviced,
            });
        }
        call.status = CallStatus::Serviced;
        self.prune_settled();
        Ok(())
    }

    /// Drop the oldest settled calls beyond the retention window.
    fn prune_settled(&mut self) {
        let settled: Vec<u64> = self
            .calls
            .values()
            .filter(|c| matches!(c.status, CallStatus::Serviced | CallStatus::Cancelled))
            .map(|c| c.id)
            .collect();
        for id in settled
            .iter()
            .take(settled.len().saturating_sub(SETTLED_RETENTION))
        {
            self.calls.remove(id);
        }
    }

    /// Hand an assigned call back to the pending pool (car fault path).
    /// Creation order is preserved, so reassignment replays oldest first.
    pub fn unassign(&mut self, call_id: u64) -> Result<(), DispatchError> {
        let call = self
            .calls
            .get_mut(&call_id)
            .ok_or(DispatchError::UnknownCall(call_id))?;
        if call.status != CallStatus::Assigned {
            return Err(DispatchError::InvalidTransition {
                call_id,
                from: call.status,
                to: CallStatus::Pending,
            });
        }
        call.status = CallStatus::Pending;
        call.assigned_car = None;
        Ok(())
    }

    /// Calls currently ASSIGNED to a car, in creation order.
    pub fn assigned_to(&self, car_id: u8) -> Vec<u64> {
        self.calls
            .values()
            .filter(|c| c.status == CallStatus::Assigned && c.assigned_car == Some(car_id))
            .map(|c| c.id)
            .collect()
    }

    /// True if the car still owes a visit to `floor` for some other
    /// assigned call.
    pub fn has_assigned_at(&self, car_id: u8, floor: u8) -> bool {
        self.calls.values().any(|c| {
            c.status == CallStatus::Assigned && c.assigned_car == Some(car_id) && c.floor == floor
        })
    }

    pub fn get(&self, call_id: u64) -> Option<&Call> {
        self.calls.get(&call_id)
    }

    pub fn calls(&self) -> impl Iterator<Item = &Call> + '_ {
        self.calls.values()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
