pub mod client;
pub mod error;
pub mod features;
pub mod products;
pub mod retry;
pub mod table;
pub mod tiles;
pub mod transport;

pub use client::VectorClient;
pub use error::CatalogError;
pub use features::FeatureQuery;
pub use products::{NewProduct, Product, ProductUpdate};
pub use table::{Table, TableFeatures};
pub use tiles::{TileLayer, TileOptions};
pub use transport::{HttpTransport, Transport};
