pub mod analyze;
pub mod compare;
pub mod estimate;
