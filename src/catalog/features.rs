use serde::Serialize;
use serde_json::{json, Value};

use super::{
    client::{api_path, check_id, VectorClient},
    error::CatalogError,
    transport::{ApiRequest, Method, Transport},
};
use crate::{filter::Expression, spatial::Aoi};

/// Filters of a feature query. Both are optional and are sent as `null` when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureQuery {
    pub filter: Option<Expression>,
    pub aoi: Option<Aoi>,
}

fn features_path(product_id: &str, rest: &[&str]) -> Result<String, CatalogError> {
    check_id("product id", product_id)?;
    let mut segments = vec!["products", product_id, "features"];
    segments.extend_from_slice(rest);
    api_path(&segments)
}

fn feature_path(product_id: &str, feature_id: &str) -> Result<String, CatalogError> {
    check_id("feature id", feature_id)?;
    features_path(product_id, &[feature_id])
}

/// Feature operations work on JSON as sent and received: the collections and features are not
/// converted to `geojson` types on the way, which would rewrite their numbers and members.
impl<T: Transport> VectorClient<T> {
    /// Add the features of a collection to a product. The collection is sent as given; the
    /// returned collection holds the added features with their service-assigned `uuid`s.
    pub fn add_features<F: Serialize + ?Sized>(
        &self,
        product_id: &str,
        feature_collection: &F,
    ) -> Result<Value, CatalogError> {
        let feature_collection = serde_json::to_value(feature_collection)?;
        log::info!(
            "Adding {} features to {}",
            feature_collection["features"].as_array().map_or(0, Vec::len),
            product_id
        );
        let request = ApiRequest::new(Method::Post, features_path(product_id, &[])?)
            .with_body(json!({ "feature_collection": feature_collection }));
        self.send_json("add feature", request)
    }

    /// Run a query, returning the FeatureCollection as answered by the service.
    pub fn query_features(
        &self,
        product_id: &str,
        query: &FeatureQuery,
    ) -> Result<Value, CatalogError> {
        if let Some(aoi) = &query.aoi {
            log::debug!("Querying {} within {:?}", product_id, aoi.extent());
        }
        let request = ApiRequest::new(Method::Post, features_path(product_id, &["query"])?)
            .with_body(serde_json::to_value(query)?);
        self.send_json("query feature", request)
    }

    pub fn get_feature(&self, product_id: &str, feature_id: &str) -> Result<Value, CatalogError> {
        let request = ApiRequest::new(Method::Get, feature_path(product_id, feature_id)?);
        self.send_json("get feature", request)
    }

    /// Replace a feature, returning the stored feature.
    pub fn update_feature<F: Serialize + ?Sized>(
        &self,
        product_id: &str,
        feature_id: &str,
        feature: &F,
    ) -> Result<Value, CatalogError> {
        let request = ApiRequest::new(Method::Put, feature_path(product_id, feature_id)?)
            .with_body(json!({ "feature": serde_json::to_value(feature)? }));
        self.send_json("update feature", request)
    }

    pub fn delete_feature(&self, product_id: &str, feature_id: &str) -> Result<(), CatalogError> {
        let request = ApiRequest::new(Method::Delete, feature_path(product_id, feature_id)?);
        log::info!("Deleting feature {} from {}", feature_id, product_id);
        self.send("delete feature", request).map(|_| ())
    }
}
