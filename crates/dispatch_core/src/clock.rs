use bevy_ecs::prelude::Resource;

/// Logical simulation time: the number of completed `advance` calls.
#[derive(Debug, Default, Resource)]
pub struct TickClock {
    now: u64,
}

impl TickClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Start the next tick and return its number.
    pub fn advance(&mut self) -> u64 {
        self.now += 1;
        self.now
    }
}
