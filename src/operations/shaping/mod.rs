mod extrude;

pub use extrude::{ExtrudeFace, ExtrudeSelection};
