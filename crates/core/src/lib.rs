pub mod dataset;
pub mod evaluation;
pub mod intent;
pub mod pipeline;
pub mod report;
pub mod shared;
