pub mod catalog;
pub mod cli;
pub mod config;
pub mod filter;
pub mod geofile;
pub mod spatial;
