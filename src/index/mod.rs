pub mod grid;
pub mod spatial_index;
