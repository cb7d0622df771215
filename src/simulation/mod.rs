pub mod states;
pub mod params;
pub mod engine;
pub mod error;
pub mod partition;
pub mod initializer;
pub mod forces;
pub mod integrator;
pub mod worker;
pub mod coordinator;
pub mod scenario;
