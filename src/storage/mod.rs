pub mod aggregator;
pub mod history;
pub mod pipeline;

pub use aggregator::BUFFER_SIZE;
pub use history::MAX_DATA_LENGTH;
pub use pipeline::Pipeline;
