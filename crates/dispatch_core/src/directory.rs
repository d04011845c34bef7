//! Id directory: external driver/rider ids → world entities.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource};

use crate::ecs::{DriverId, RiderId};

#[derive(Debug, Default, Resource)]
pub struct Directory {
    drivers: HashMap<DriverId, Entity>,
    riders: HashMap<RiderId, Entity>,
}

impl Directory {
    pub fn driver(&self, id: &DriverId) -> Option<Entity> {
        self.drivers.get(id).copied()
    }

    pub fn rider(&self, id: &RiderId) -> Option<Entity> {
        self.riders.get(id).copied()
    }

    pub fn insert_driver(&mut self, id: DriverId, entity: Entity) {
        self.drivers.insert(id, entity);
    }

    pub fn insert_rider(&mut self, id: RiderId, entity: Entity) {
        self.riders.insert(id, entity);
    }

    pub fn remove_driver(&mut self, id: &DriverId) -> Option<Entity> {
        self.drivers.remove(id)
    }

    pub fn remove_rider(&mut self, id: &RiderId) -> Option<Entity> {
        self.riders.remove(id)
    }

    pub fn drivers(&self) -> impl Iterator<Item = (&DriverId, Entity)> + '_ {
        self.drivers.iter().map(|(id, entity)| (id, *entity))
    }

    pub fn riders(&self) -> impl Iterator<Item = (&RiderId, Entity)> + '_ {
        self.riders.iter().map(|(id, entity)| (id, *entity))
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn rider_count(&self) -> usize {
        self.riders.len()
    }
}
