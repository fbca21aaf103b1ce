use std::{fs::read_to_string, path::Path};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::catalog::NewProduct;

/// Table definition read by `create-table`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TableDefinition {
    pub product_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub readers: Option<Vec<String>>,
    pub writers: Option<Vec<String>>,
    pub owners: Option<Vec<String>>,
}

impl TableDefinition {
    pub fn from_file(filepath: &Path) -> anyhow::Result<Self> {
        if !filepath.exists() {
            return Err(anyhow!("Table definition {:?} not found", filepath));
        }
        let contents = read_to_string(filepath)?;
        contents
            .parse()
            .with_context(|| format!("Invalid table definition {:?}", filepath))
    }

    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name.unwrap_or_else(|| self.product_id.clone()),
            id: self.product_id,
            description: self.description,
            tags: self.tags,
            readers: self.readers,
            writers: self.writers,
            owners: self.owners,
        }
    }
}

impl std::str::FromStr for TableDefinition {
    type Err = anyhow::Error;

    fn from_str(contents: &str) -> anyhow::Result<Self> {
        let definition: TableDefinition = toml::from_str(contents)?;
        if definition.product_id.trim().is_empty() {
            return Err(anyhow!("'product_id' must not be empty"));
        }
        Ok(definition)
    }
}
