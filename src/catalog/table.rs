use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{
    error::CatalogError,
    features::FeatureQuery,
    products::{NewProduct, Product, ProductUpdate},
    tiles::{TileLayer, TileOptions},
    transport::Transport,
    VectorClient,
};
use crate::geofile::feature::feature_uuid;

/// Features returned by a table, e.g. from a query or after adding them.
///
/// Holds the JSON answered by the service next to its typed form, so that the JSON can be handed
/// on without being rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFeatures {
    value: Value,
    feature_collection: geojson::FeatureCollection,
}

impl TableFeatures {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let feature_collection = serde_json::from_value(value.clone())?;
        Ok(Self {
            value,
            feature_collection,
        })
    }

    pub fn features(&self) -> &[geojson::Feature] {
        &self.feature_collection.features
    }

    pub fn len(&self) -> usize {
        self.feature_collection.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_collection.features.is_empty()
    }

    /// Keep the features matching `predicate`. This runs on features already fetched; prefer
    /// filtering in the query where possible.
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&geojson::Feature) -> bool,
    {
        let keep: Vec<bool> = self.features().iter().map(|feature| predicate(feature)).collect();
        let keep_next = |index: &mut usize| {
            let kept = keep.get(*index).copied().unwrap_or(false);
            *index += 1;
            kept
        };

        let mut feature_collection = self.feature_collection.clone();
        let mut index = 0;
        feature_collection.features.retain(|_| keep_next(&mut index));

        let mut value = self.value.clone();
        if let Some(features) = value.get_mut("features").and_then(Value::as_array_mut) {
            let mut index = 0;
            features.retain(|_| keep_next(&mut index));
        }
        Self {
            value,
            feature_collection,
        }
    }

    /// Look up a feature by its service-assigned uuid.
    pub fn get_feature(&self, feature_id: &str) -> Result<&geojson::Feature, CatalogError> {
        self.features()
            .iter()
            .find(|feature| feature_uuid(feature) == Some(feature_id))
            .ok_or_else(|| CatalogError::FeatureNotFound {
                feature_id: feature_id.to_string(),
            })
    }

    pub fn uuids(&self) -> Vec<&str> {
        self.features().iter().filter_map(feature_uuid).collect()
    }

    /// The FeatureCollection JSON as answered by the service.
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

fn decode_error(action: &str) -> impl FnOnce(serde_json::Error) -> CatalogError + '_ {
    move |source| CatalogError::Decode {
        action: action.to_string(),
        source,
    }
}

fn decoded<R: DeserializeOwned>(action: &str, value: Value) -> Result<R, CatalogError> {
    serde_json::from_value(value).map_err(decode_error(action))
}

fn table_features(action: &str, value: Value) -> Result<TableFeatures, CatalogError> {
    TableFeatures::from_value(value).map_err(decode_error(action))
}

/// A product of the catalog together with the client used to reach it.
pub struct Table<'c, T: Transport> {
    client: &'c VectorClient<T>,
    parameters: Product,
}

impl<'c, T: Transport> Table<'c, T> {
    pub fn create(client: &'c VectorClient<T>, product: &NewProduct) -> Result<Self, CatalogError> {
        let parameters = client.create_product(product)?;
        Ok(Self { client, parameters })
    }

    pub fn get(client: &'c VectorClient<T>, product_id: &str) -> Result<Self, CatalogError> {
        let parameters = client.get_product(product_id)?;
        Ok(Self { client, parameters })
    }

    pub fn list(client: &'c VectorClient<T>, tags: &[String]) -> Result<Vec<Self>, CatalogError> {
        Ok(client
            .list_products(tags)?
            .into_iter()
            .map(|parameters| Self { client, parameters })
            .collect())
    }

    pub fn id(&self) -> &str {
        &self.parameters.id
    }

    pub fn name(&self) -> &str {
        &self.parameters.name
    }

    pub fn parameters(&self) -> &Product {
        &self.parameters
    }

    /// Apply `update` and refresh the parameters with the service's answer.
    pub fn update(&mut self, update: &ProductUpdate) -> Result<(), CatalogError> {
        self.parameters = self.client.update_product(&self.parameters.id, update)?;
        Ok(())
    }

    /// Add a FeatureCollection, given either as JSON or as `geojson` types.
    pub fn add<F: Serialize + ?Sized>(
        &self,
        feature_collection: &F,
    ) -> Result<TableFeatures, CatalogError> {
        table_features("add feature", self.client.add_features(self.id(), feature_collection)?)
    }

    pub fn query(&self, query: &FeatureQuery) -> Result<TableFeatures, CatalogError> {
        table_features("query feature", self.client.query_features(self.id(), query)?)
    }

    pub fn get_feature(&self, feature_id: &str) -> Result<geojson::Feature, CatalogError> {
        decoded("get feature", self.client.get_feature(self.id(), feature_id)?)
    }

    pub fn update_feature(
        &self,
        feature_id: &str,
        feature: &geojson::Feature,
    ) -> Result<geojson::Feature, CatalogError> {
        decoded(
            "update feature",
            self.client.update_feature(self.id(), feature_id, feature)?,
        )
    }

    pub fn delete_feature(&self, feature_id: &str) -> Result<(), CatalogError> {
        self.client.delete_feature(self.id(), feature_id)
    }

    /// Vector tile layer of this table, for display on a map.
    pub fn tile_layer(&self, name: &str, options: &TileOptions) -> Result<TileLayer, CatalogError> {
        self.client.tile_layer(self.id(), name, options)
    }

    /// Delete the product. The table cannot be used afterwards.
    pub fn delete(self) -> Result<(), CatalogError> {
        self.client.delete_product(self.id())
    }
}
