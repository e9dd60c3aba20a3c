pub mod error;
pub mod station_list;
pub mod station_loader;
