use anyhow::{anyhow, Context};
use geo::BoundingRect;
use geojson::GeoJson;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Area of interest used as a spatial filter by the catalog service.
///
/// Always holds a single GeoJSON geometry. When built from a Feature, the Feature's geometry is
/// used. The geometry is checked locally by converting it to a `geo` geometry and computing its
/// extent, so that malformed or empty AOIs never reach the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Aoi {
    geometry: geojson::Geometry,
    extent: geo::Rect,
}

impl Aoi {
    pub fn from_geometry(geometry: geojson::Geometry) -> anyhow::Result<Self> {
        let geo_geometry: geo::Geometry = geometry
            .value
            .clone()
            .try_into()
            .map_err(|err| anyhow!("AOI is not a valid geometry: {}", err))?;
        let extent = geo_geometry
            .bounding_rect()
            .ok_or_else(|| anyhow!("AOI geometry is empty"))?;
        Ok(Self { geometry, extent })
    }

    /// Build an AOI from a JSON value holding a GeoJSON Geometry or Feature, or a string
    /// containing one.
    pub fn from_json_value(value: Value) -> anyhow::Result<Self> {
        let value = match value {
            Value::String(contents) => {
                serde_json::from_str(&contents).context("JSON error in AOI string")?
            }
            value => value,
        };
        let geojson: GeoJson = serde_json::from_value(value).context("AOI is not valid GeoJSON")?;
        match geojson {
            GeoJson::Geometry(geometry) => Self::from_geometry(geometry),
            GeoJson::Feature(feature) => match feature.geometry {
                Some(geometry) => Self::from_geometry(geometry),
                None => Err(anyhow!("AOI feature has no geometry")),
            },
            GeoJson::FeatureCollection(_) => Err(anyhow!(
                "AOI must be a GeoJSON Geometry or Feature, not a FeatureCollection"
            )),
        }
    }

    pub fn geometry(&self) -> &geojson::Geometry {
        &self.geometry
    }

    /// Bounding box of the AOI in its own coordinates.
    pub fn extent(&self) -> geo::Rect {
        self.extent
    }
}

impl Serialize for Aoi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.geometry.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rstest::rstest;
    use serde_json::{json, Value};

    use super::Aoi;

    fn square() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[10.0, 45.0], [11.5, 45.0], [11.5, 46.25], [10.0, 46.25], [10.0, 45.0]]]
        })
    }

    #[test]
    fn test_polygon_extent() {
        let aoi = Aoi::from_json_value(square()).unwrap();
        let extent = aoi.extent();
        assert_abs_diff_eq!(10.0, extent.min().x);
        assert_abs_diff_eq!(45.0, extent.min().y);
        assert_abs_diff_eq!(11.5, extent.max().x);
        assert_abs_diff_eq!(46.25, extent.max().y);
    }

    #[test]
    fn test_feature_and_string_forms_are_unwrapped() {
        let expected = Aoi::from_json_value(square()).unwrap();
        let feature = json!({"type": "Feature", "geometry": square(), "properties": {}});
        assert_eq!(expected, Aoi::from_json_value(feature).unwrap());
        assert_eq!(
            expected,
            Aoi::from_json_value(Value::String(square().to_string())).unwrap()
        );
    }

    #[test]
    fn test_serializes_to_geometry() {
        let aoi = Aoi::from_json_value(json!({"type": "Point", "coordinates": [1.0, 2.0]})).unwrap();
        assert_eq!(
            json!({"type": "Point", "coordinates": [1.0, 2.0]}),
            serde_json::to_value(&aoi).unwrap()
        );
    }

    #[rstest]
    #[case(json!({"type": "FeatureCollection", "features": []}))]
    #[case(json!({"type": "Feature", "geometry": null, "properties": {}}))]
    #[case(json!({"type": "Polygon", "coordinates": "nope"}))]
    #[case(json!({"type": "MultiPoint", "coordinates": []}))]
    #[case(json!({"kind": "Polygon"}))]
    #[case(json!("{not json"))]
    #[case(json!(42))]
    fn test_invalid_aoi(#[case] value: Value) {
        assert!(Aoi::from_json_value(value).is_err());
    }
}
