pub mod ledger;
pub mod machine;

pub use ledger::Ledger;
pub use machine::{run_occupancy, CreditPolicy, OccupancyMachine};
