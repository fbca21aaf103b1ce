pub mod aoi;

pub use aoi::Aoi;
