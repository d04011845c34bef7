pub mod algorithm;
pub mod bfs;
pub mod types;

use bevy_ecs::prelude::Resource;

pub use algorithm::DriverSearch;
pub use bfs::BfsDriverSearch;
pub use types::SearchHit;

/// Resource wrapper for the driver search trait object.
#[derive(Resource)]
pub struct DriverSearchResource(pub Box<dyn DriverSearch>);

impl DriverSearchResource {
    pub fn new(search: Box<dyn DriverSearch>) -> Self {
        Self(search)
    }
}

impl Default for DriverSearchResource {
    fn default() -> Self {
        Self::new(Box::new(BfsDriverSearch))
    }
}

impl std::ops::Deref for DriverSearchResource {
    type Target = dyn DriverSearch;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
