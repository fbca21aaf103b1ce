use anyhow::anyhow;

/// Service-assigned identifier of a feature. The service returns it as a `uuid` member; a
/// string `id` is used when there is none.
pub fn feature_uuid(feature: &geojson::Feature) -> Option<&str> {
    let uuid = feature
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("uuid"))
        .and_then(|uuid| uuid.as_str());
    match (uuid, &feature.id) {
        (Some(uuid), _) => Some(uuid),
        (None, Some(geojson::feature::Id::String(id))) => Some(id.as_str()),
        _ => None,
    }
}

/// Convert the geometry of a feature, failing if it is missing or malformed.
pub fn feature_geometry(feature: &geojson::Feature) -> anyhow::Result<geo::Geometry> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| anyhow!("feature has no geometry"))?;
    geometry
        .value
        .clone()
        .try_into()
        .map_err(|err| anyhow!("invalid geometry, {}", err))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{json, Value};

    use super::{feature_geometry, feature_uuid};

    fn feature(value: Value) -> geojson::Feature {
        serde_json::from_value(value).unwrap()
    }

    #[rstest]
    #[case(json!({"type": "Feature", "uuid": "abc", "id": "other", "geometry": null, "properties": {}}), Some("abc"))]
    #[case(json!({"type": "Feature", "id": "other", "geometry": null, "properties": {}}), Some("other"))]
    #[case(json!({"type": "Feature", "id": 7, "geometry": null, "properties": {}}), None)]
    #[case(json!({"type": "Feature", "geometry": null, "properties": {}}), None)]
    fn test_feature_uuid(#[case] value: Value, #[case] expected: Option<&str>) {
        assert_eq!(expected, feature_uuid(&feature(value)));
    }

    #[test]
    fn test_feature_geometry() {
        let line = feature(json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]},
            "properties": {"name": "a"}
        }));
        assert!(matches!(
            feature_geometry(&line).unwrap(),
            geo::Geometry::LineString(_)
        ));

        let empty = feature(json!({"type": "Feature", "geometry": null, "properties": {}}));
        assert!(feature_geometry(&empty).is_err());
    }
}
