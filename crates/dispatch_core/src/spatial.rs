//! Spatial index: grid cell → driver entities currently located there.
//!
//! Buckets preserve insertion order; the nearest-driver search relies on that
//! order to break ties between drivers sharing a cell (oldest arrival first).
//! A reverse entity → cell map keeps the index honest: a driver is indexed
//! under exactly one cell, and removals name the cell they expect.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource};
use thiserror::Error;

use crate::grid::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("driver {driver:?} is not indexed at {cell}")]
    NotIndexed { driver: Entity, cell: Cell },
}

#[derive(Debug, Resource, Default)]
pub struct SpatialIndex {
    /// Map from cell to driver entities in that cell, oldest first
    drivers_by_cell: HashMap<Cell, Vec<Entity>>,
    /// Reverse mapping: driver entity → current cell
    driver_entity_to_cell: HashMap<Entity, Cell>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a driver to the cell's bucket.
    pub fn insert(&mut self, entity: Entity, cell: Cell) {
        debug_assert!(
            !self.driver_entity_to_cell.contains_key(&entity),
            "driver must be removed before it is inserted again"
        );
        self.drivers_by_cell.entry(cell).or_default().push(entity);
        self.driver_entity_to_cell.insert(entity, cell);
    }

    /// Remove a driver from the cell's bucket, dropping the bucket once it is empty.
    pub fn remove(&mut self, entity: Entity, cell: Cell) -> Result<(), IndexError> {
        let not_indexed = IndexError::NotIndexed {
            driver: entity,
            cell,
        };
        if self.driver_entity_to_cell.get(&entity) != Some(&cell) {
            return Err(not_indexed);
        }
        let Some(entities) = self.drivers_by_cell.get_mut(&cell) else {
            return Err(not_indexed);
        };
        let Some(slot) = entities.iter().position(|&e| e == entity) else {
            return Err(not_indexed);
        };
        entities.remove(slot);
        if entities.is_empty() {
            self.drivers_by_cell.remove(&cell);
        }
        self.driver_entity_to_cell.remove(&entity);
        Ok(())
    }

    /// Move a driver between cells. The driver always lands at the back of the
    /// destination bucket, even when `from == to`.
    pub fn relocate(&mut self, entity: Entity, from: Cell, to: Cell) -> Result<(), IndexError> {
        self.remove(entity, from)?;
        self.insert(entity, to);
        Ok(())
    }

    /// Drivers at a cell in insertion order.
    pub fn drivers_at(&self, cell: Cell) -> &[Entity] {
        self.drivers_by_cell
            .get(&cell)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn cell_of(&self, entity: Entity) -> Option<Cell> {
        self.driver_entity_to_cell.get(&entity).copied()
    }

    /// Number of indexed drivers.
    pub fn len(&self) -> usize {
        self.driver_entity_to_cell.len()
    }

    pub fn is_empty(&self) -> bool {
        self.driver_entity_to_cell.is_empty()
    }

    /// Number of cells holding at least one driver.
    pub fn occupied_cells(&self) -> usize {
        self.drivers_by_cell.len()
    }

    pub fn clear(&mut self) {
        self.drivers_by_cell.clear();
        self.driver_entity_to_cell.clear();
    }
}
