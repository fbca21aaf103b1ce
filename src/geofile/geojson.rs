use std::{fs, path::Path};

use anyhow::{anyhow, Context};
use geo::BoundingRect;
use serde_json::Value;

use super::feature::feature_geometry;

pub fn read_feature_collection(filepath: &Path) -> anyhow::Result<Value> {
    if !filepath.exists() {
        return Err(anyhow!("GeoJSON file {:?} not found", filepath));
    }
    let contents = fs::read_to_string(filepath)?;
    let feature_collection = parse_feature_collection(&contents)?;
    log::info!(
        "Read {} features from {:?}",
        feature_count(&feature_collection),
        filepath
    );
    Ok(feature_collection)
}

/// Parse a FeatureCollection to be ingested. It must hold at least one feature, and every
/// feature must have a well-formed geometry.
///
/// The JSON is returned as read. The `geojson` types are only used for validation, since
/// converting back from them rewrites numbers and members.
pub fn parse_feature_collection(contents: &str) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|err| anyhow!("JSON error in input GeoJSON:\n{}", err))?;
    if feature_count(&value) == 0 {
        return Err(anyhow!(
            "Missing field 'features'. Input data set must be a FeatureCollection."
        ));
    }

    let feature_collection = match serde_json::from_value::<geojson::GeoJson>(value.clone())
        .map_err(|err| anyhow!("Invalid GeoJSON: {}", err))?
    {
        geojson::GeoJson::FeatureCollection(feature_collection) => feature_collection,
        _ => return Err(anyhow!("Input data set must be a FeatureCollection.")),
    };

    let mut extent: Option<geo::Rect> = None;
    for (index, feature) in feature_collection.features.iter().enumerate() {
        let geometry =
            feature_geometry(feature).with_context(|| format!("Feature at index {}", index))?;
        if let Some(rect) = geometry.bounding_rect() {
            extent = Some(match extent {
                Some(extent) => merge_rects(extent, rect),
                None => rect,
            });
        }
    }
    log::debug!("Feature collection extent: {:?}", extent);
    Ok(value)
}

/// Number of entries in the `features` array, 0 when there is none.
pub fn feature_count(feature_collection: &Value) -> usize {
    feature_collection
        .get("features")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

fn merge_rects(a: geo::Rect, b: geo::Rect) -> geo::Rect {
    geo::Rect::new(
        geo::Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        geo::Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

pub fn write_feature_collection(feature_collection: &Value, output_filepath: &Path) -> anyhow::Result<()> {
    let contents = serde_json::to_string_pretty(feature_collection)?;
    fs::write(output_filepath, contents)
        .with_context(|| format!("Could not write features to {:?}", output_filepath))?;
    log::info!(
        "Wrote {} features to {:?}",
        feature_count(feature_collection),
        output_filepath
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use serde_json::json;
    use testdir::testdir;

    use super::{
        feature_count, parse_feature_collection, read_feature_collection, write_feature_collection,
    };

    fn roads() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 0.0]]},
                    "properties": {"kind": "road", "lanes": 2}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [5.0, 5.0]},
                    "properties": {"kind": "junction"}
                }
            ]
        })
    }

    #[test]
    fn test_parse_feature_collection() {
        let feature_collection = parse_feature_collection(&roads().to_string()).unwrap();
        assert_eq!(2, feature_count(&feature_collection));
        assert_eq!(
            json!("junction"),
            feature_collection["features"][1]["properties"]["kind"]
        );
    }

    #[test]
    fn test_parsed_json_is_kept_as_written() {
        let input = json!({
            "type": "FeatureCollection",
            "bbox": [10, 20, 11, 21],
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [10, 20]}},
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [11, 21]},
                    "properties": {"kind": "tree"},
                    "source": "survey"
                }
            ]
        });
        assert_eq!(input, parse_feature_collection(&input.to_string()).unwrap());
    }

    #[rstest]
    #[case("{\"type\": ", "JSON error in input GeoJSON")]
    #[case("{\"type\": \"FeatureCollection\", \"features\": []}", "Missing field 'features'")]
    #[case("{\"type\": \"Point\", \"coordinates\": [0, 0]}", "Missing field 'features'")]
    #[case(
        "{\"type\": \"FeatureCollection\", \"features\": [{\"type\": \"Feature\", \"geometry\": null, \"properties\": {}}]}",
        "Feature at index 0"
    )]
    fn test_parse_feature_collection_errors(#[case] contents: &str, #[case] expected: &str) {
        let err = parse_feature_collection(contents).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_write_read_round_trip() {
        let test_dir = testdir!();
        let filepath = test_dir.join("roads.geojson");
        let feature_collection = parse_feature_collection(&roads().to_string()).unwrap();

        write_feature_collection(&feature_collection, &filepath).unwrap();
        assert_eq!(feature_collection, read_feature_collection(&filepath).unwrap());
    }

    #[test]
    fn test_read_missing_file() {
        let test_dir = testdir!();
        fs::create_dir_all(&test_dir).unwrap();
        assert!(read_feature_collection(&test_dir.join("missing.geojson")).is_err());
    }
}
