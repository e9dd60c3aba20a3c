pub mod distance;
pub mod surface;
