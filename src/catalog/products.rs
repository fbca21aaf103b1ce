use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{
    client::{api_path, check_id, VectorClient},
    error::CatalogError,
    transport::{ApiRequest, Method, Transport},
};

/// A table of features as described by the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub readers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub writers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub owners: Vec<String>,
    /// Any further fields returned by the service, kept for display.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request body for creating a product. Absent fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewProduct {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owners: Option<Vec<String>>,
}

/// Request body for updating a product. Only the fields that are set are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owners: Option<Vec<String>>,
}

/// Tags are sent comma separated when listing, so they cannot contain commas themselves.
pub fn check_tags(tags: &[String]) -> Result<(), CatalogError> {
    match tags.iter().find(|tag| tag.contains(',')) {
        Some(tag) => Err(CatalogError::InvalidRequest(format!(
            "tags cannot contain \",\" (got {tag:?})"
        ))),
        None => Ok(()),
    }
}

fn product_path(product_id: &str) -> Result<String, CatalogError> {
    check_id("product id", product_id)?;
    api_path(&["products", product_id])
}

impl<T: Transport> VectorClient<T> {
    pub fn create_product(&self, product: &NewProduct) -> Result<Product, CatalogError> {
        check_id("product id", &product.id)?;
        check_tags(product.tags.as_deref().unwrap_or_default())?;
        log::info!("Creating product {}", product.id);
        let request =
            ApiRequest::new(Method::Post, "/products/").with_body(serde_json::to_value(product)?);
        self.send_json("create product", request)
    }

    /// List the products readable by the caller, optionally only those carrying all `tags`.
    pub fn list_products(&self, tags: &[String]) -> Result<Vec<Product>, CatalogError> {
        check_tags(tags)?;
        let mut request = ApiRequest::new(Method::Get, "/products/");
        if !tags.is_empty() {
            request = request.with_query("tags", tags.join(","));
        }
        self.send_json("list products", request)
    }

    pub fn get_product(&self, product_id: &str) -> Result<Product, CatalogError> {
        let request = ApiRequest::new(Method::Get, product_path(product_id)?);
        self.send_json("get product", request)
    }

    pub fn update_product(
        &self,
        product_id: &str,
        update: &ProductUpdate,
    ) -> Result<Product, CatalogError> {
        check_tags(update.tags.as_deref().unwrap_or_default())?;
        let request = ApiRequest::new(Method::Patch, product_path(product_id)?)
            .with_body(serde_json::to_value(update)?);
        self.send_json("update product", request)
    }

    pub fn delete_product(&self, product_id: &str) -> Result<(), CatalogError> {
        let request = ApiRequest::new(Method::Delete, product_path(product_id)?);
        log::info!("Deleting product {}", product_id);
        self.send("delete product", request).map(|_| ())
    }
}
