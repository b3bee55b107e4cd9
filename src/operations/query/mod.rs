mod bounding_box;
mod selection_center;

pub use bounding_box::{Aabb, BoundingBox};
pub use selection_center::SelectionCenter;
