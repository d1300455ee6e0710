pub mod flywheel;
pub mod plant;
pub mod sled;

pub use flywheel::FlywheelConfig;
pub use plant::PlantModel;
pub use sled::SledConfig;
