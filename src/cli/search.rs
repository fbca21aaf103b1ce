use std::{fs::read_to_string, path::Path};

use anyhow::{anyhow, Context};
use serde_json::Value;

use crate::{catalog::FeatureQuery, filter::parse_expression, spatial::Aoi};

/// Parse search JSON, an object with optional `aoi` and `filter` keys.
pub fn parse_search(contents: &str) -> anyhow::Result<FeatureQuery> {
    let value: Value =
        serde_json::from_str(contents).map_err(|err| anyhow!("JSON error in search:\n{}", err))?;
    let mut object = match value {
        Value::Object(object) => object,
        other => return Err(anyhow!("Search must be a JSON object, got {}", other)),
    };

    let aoi = match object.remove("aoi") {
        None | Some(Value::Null) => None,
        Some(aoi) => Some(Aoi::from_json_value(aoi).context("Invalid 'aoi' in search")?),
    };
    let filter = match object.remove("filter") {
        None | Some(Value::Null) => None,
        Some(filter) => Some(parse_expression(&filter)?),
    };
    if let Some(key) = object.keys().next() {
        return Err(anyhow!("Unknown key {:?} in search", key));
    }
    Ok(FeatureQuery { filter, aoi })
}

/// Resolve the search of `list-features`. Inline JSON takes precedence over the file; with
/// neither, all features are matched.
pub fn load_search(
    search_json_file: Option<&Path>,
    search_json: Option<&str>,
) -> anyhow::Result<FeatureQuery> {
    if let Some(search_json) = search_json {
        return parse_search(search_json);
    }
    match search_json_file {
        Some(filepath) => {
            if !filepath.exists() {
                return Err(anyhow!("Search file {:?} not found", filepath));
            }
            let contents = read_to_string(filepath)?;
            parse_search(&contents).with_context(|| format!("Reading search file {:?}", filepath))
        }
        None => Ok(FeatureQuery::default()),
    }
}
