use dispatch_core::ecs::{DriverId, RiderId};
use dispatch_core::DispatchWorld;

/// Builder for reproducible test worlds: drivers register in the order given,
/// so tie-break expectations follow builder order.
#[derive(Debug, Default)]
pub struct TestWorldBuilder {
    drivers: Vec<(String, i64, i64, bool)>,
    riders: Vec<(String, i64, i64)>,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_driver(mut self, id: &str, x: i64, y: i64) -> Self {
        self.drivers.push((id.to_string(), x, y, true));
        self
    }

    /// A registered driver that starts offline.
    pub fn with_offline_driver(mut self, id: &str, x: i64, y: i64) -> Self {
        self.drivers.push((id.to_string(), x, y, false));
        self
    }

    pub fn with_rider(mut self, id: &str, x: i64, y: i64) -> Self {
        self.riders.push((id.to_string(), x, y));
        self
    }

    pub fn build(self) -> DispatchWorld {
        let mut world = DispatchWorld::new();
        for (id, x, y, online) in self.drivers {
            world
                .register_driver(id.as_str(), x, y)
                .expect("test driver should register");
            if !online {
                world
                    .set_driver_offline(&DriverId::from(id))
                    .expect("test driver should go offline");
            }
        }
        for (id, x, y) in self.riders {
            world
                .register_rider(id, x, y)
                .expect("test rider should register");
        }
        world
    }
}

pub fn driver(id: &str) -> DriverId {
    DriverId::from(id)
}

pub fn rider(id: &str) -> RiderId {
    RiderId::from(id)
}
