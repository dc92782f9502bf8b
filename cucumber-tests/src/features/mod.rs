pub mod world;

pub use world::GateWorld;
