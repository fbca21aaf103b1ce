use serde::Serialize;
use serde_json::{json, Value};

use super::{
    client::{api_path, check_id, VectorClient},
    error::CatalogError,
    transport::Transport,
};
use crate::filter::Expression;

#[derive(Debug, Clone, Default)]
pub struct TileOptions {
    pub property_filter: Option<Expression>,
    /// Properties to include in the tiles, e.g. for styling.
    pub include_properties: Option<Vec<String>>,
    pub styles: Option<Value>,
}

/// Description of a vector tile layer that any XYZ-capable map client can display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub styles: Value,
}

impl<T: Transport> VectorClient<T> {
    /// Build the tile layer of a product. Nothing is sent to the service; the tiles are
    /// requested by the map client using `url`, a template with `{z}/{x}/{y}` placeholders.
    pub fn tile_layer(
        &self,
        product_id: &str,
        name: &str,
        options: &TileOptions,
    ) -> Result<TileLayer, CatalogError> {
        check_id("product id", product_id)?;
        let tiles_path = api_path(&["products", product_id, "tiles"])?;
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(
                "property_filter",
                &serde_json::to_string(&options.property_filter)?,
            )
            .append_pair(
                "include_properties",
                &serde_json::to_string(&options.include_properties)?,
            )
            .finish();
        Ok(TileLayer {
            name: name.to_string(),
            url: format!(
                "{}{}/{{z}}/{{x}}/{{y}}?{}",
                self.api_host(),
                tiles_path,
                query
            ),
            styles: options.styles.clone().unwrap_or_else(|| json!({})),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::TileOptions;
    use crate::catalog::{transport::testing::RecordingTransport, VectorClient};
    use crate::config::ClientConfig;
    use crate::filter::Property;

    fn client() -> VectorClient<RecordingTransport> {
        let config = ClientConfig {
            api_host: "https://vector.example.com".to_string(),
            ..ClientConfig::default()
        };
        VectorClient::new(RecordingTransport::new(), &config)
    }

    #[test]
    fn test_tile_layer_without_options() {
        let client = client();
        let layer = client
            .tile_layer("acme:roads", "Roads", &TileOptions::default())
            .unwrap();
        assert_eq!(
            "https://vector.example.com/products/acme:roads/tiles/{z}/{x}/{y}?property_filter=null&include_properties=null",
            layer.url
        );
        assert_eq!(json!({}), layer.styles);
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn test_tile_layer_encodes_product_id() {
        let layer = client()
            .tile_layer("acme:roads #2", "Roads", &TileOptions::default())
            .unwrap();
        assert!(layer
            .url
            .starts_with("https://vector.example.com/products/acme:roads%20%232/tiles/{z}/{x}/{y}?"));
    }

    #[test]
    fn test_tile_layer_encodes_filter_and_properties() {
        let options = TileOptions {
            property_filter: Some(Property::new("kind").eq("road")),
            include_properties: Some(vec!["kind".to_string(), "lanes".to_string()]),
            styles: Some(json!({"color": "red"})),
        };
        let layer = client().tile_layer("acme:roads", "Roads", &options).unwrap();
        assert!(layer.url.ends_with(
            "?property_filter=%7B%22eq%22%3A%7B%22kind%22%3A%22road%22%7D%7D&include_properties=%5B%22kind%22%2C%22lanes%22%5D"
        ));
        assert_eq!(json!({"color": "red"}), layer.styles);
    }
}
