pub mod data_quality;
pub mod lat_lon;
pub mod position;
pub mod station;
