pub mod creation;
pub mod modification;
pub mod query;
pub mod shaping;
pub mod transform;
