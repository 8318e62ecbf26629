pub mod generator;
pub mod router;

pub use generator::run_generator;
pub use router::route;
