/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::BuildingConfig;
use crate::scheduler::car::Car;
use crate::scheduler::registry::CallRegistry;
use crate::shared::{CallSnapshot, CarSnapshot, DispatchError, SchedulerSnapshot};

/**
 * The owned scheduler aggregate: all car state machines plus the call
 * registry. Passed by mutable reference into the event ingestor and the
 * dispatch engine, never ambient or global, so every mutation is
 * auditable and the whole thing is testable in isolation.
 */
pub struct Scheduler {
    pub building: BuildingConfig,
    pub cars: Vec<Car>,
    pub registry: CallRegistry,
}

impl Scheduler {
    pub fn new(building: &BuildingConfig) -> Scheduler {
        let cars = (0..building.n_cars)
            .map(|id| Car::new(id, building.home_floor(id), building.capacity))
            .collect();
        Scheduler {
            building: building.clone(),
            cars,
            registry: CallRegistry::new(),
        }
    }

    pub fn car(&self, car_id: u8) -> Result<&Car, DispatchError> {
        self.cars
            .get(car_id as usize)
            .ok_or(DispatchError::UnknownCar(car_id))
    }

    pub fn car_mut(&mut self, car_id: u8) -> Result<&mut Car, DispatchError> {
        self.cars
            .get_mut(car_id as usize)
            .ok_or(DispatchError::UnknownCar(car_id))
    }

    /// Point-in-time copy of every car and call. Only ever built between
    /// event applications, so it reflects a single instant.
    pub fn snapshot(&self, tick: u64) -> SchedulerSnapshot {
        let cars = self
            .cars
            .iter()
            .map(|car| CarSnapshot {
                id: car.id,
                floor: car.floor,
                direction: car.heading,
                door_state: car.behaviour.door_state(),
                behaviour: car.behaviour,
                queue: car.queue_in_service_order(),
                load: car.load,
                capacity: car.capacity,
            })
            .collect();
        let calls = self
            .registry
            .calls()
            .map(|call| CallSnapshot {
                id: call.id,
                floor: call.floor,
                direction: call.direction,
                status: call.status,
                assigned_car: call.assigned_car,
            })
            .collect();
        SchedulerSnapshot { tick, cars, calls }
    }
}
