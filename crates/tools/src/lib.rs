//! Command implementations behind `globe-tess`. Each returns the JSON
//! document the binary prints.

use crs::{CrsConfig, CrsRegistry};
use formats::FeatureCollection;
use serde_json::{Value, json};
use tessellation::{TessellationConfig, Tessellator};
use tiling::{GeoTiling, HealpixTiling, TilingScheme};
use tracing::info;

pub fn locate(scheme: &str, level: u32, lon: f64, lat: f64) -> Result<Value, String> {
    match scheme {
        "quad" => {
            let index = GeoTiling::world().locate(lon, lat, level);
            Ok(index_report(&GeoTiling::world(), index))
        }
        "healpix" => {
            if level > tiling::healpix::MAX_ORDER as u32 {
                return Err(format!("healpix level must be <= {}", tiling::healpix::MAX_ORDER));
            }
            let index = HealpixTiling::new().locate(lon, lat, level);
            Ok(index_report(&HealpixTiling::new(), index))
        }
        other => Err(format!("unknown scheme: {other}")),
    }
}

fn index_report<S>(scheme: &S, index: S::Index) -> Value
where
    S: TilingScheme,
    S::Index: serde::Serialize,
{
    let b = scheme.bound(index);
    json!({
        "index": index,
        "level": scheme.level(index),
        "bound": [b.west, b.south, b.east, b.north],
    })
}

pub fn overlap(geojson: &str, scheme: &str) -> Result<Value, String> {
    let fc = FeatureCollection::from_geojson_str(geojson).map_err(|e| format!("geojson: {e}"))?;
    let roots = |geometry: &formats::Geometry| match scheme {
        "quad" => Ok(json!(GeoTiling::world().overlapped_level_zero_indices(geometry))),
        "healpix" => Ok(json!(HealpixTiling::new().overlapped_level_zero_indices(geometry))),
        other => Err(format!("unknown scheme: {other}")),
    };
    let mut out = Vec::with_capacity(fc.features.len());
    for feature in &fc.features {
        out.push(json!({
            "id": feature.id,
            "roots": roots(&feature.geometry)?,
        }));
    }
    Ok(Value::Array(out))
}

/// Tessellate every feature into `crs_name`. `crs_config` is an optional
/// JSON CRS definition registered before lookup.
pub fn tessellate(
    geojson: &str,
    crs_name: &str,
    crs_config: Option<&str>,
    config: TessellationConfig,
) -> Result<Value, String> {
    let mut registry = CrsRegistry::with_defaults();
    if let Some(text) = crs_config {
        let cfg = CrsConfig::from_json_str(text).map_err(|e| e.to_string())?;
        let crs = registry.build(&cfg).map_err(|e| e.to_string())?;
        info!(name = crs.name(), "registered crs");
        registry.register(crs);
    }
    let tessellator =
        Tessellator::from_registry(&registry, crs_name, config).map_err(|e| e.to_string())?;
    let fc = FeatureCollection::from_geojson_str(geojson).map_err(|e| format!("geojson: {e}"))?;

    let mut out = Vec::with_capacity(fc.features.len());
    for feature in &fc.features {
        let tess = tessellator
            .tessellate_in(&feature.geometry, &registry)
            .map_err(|e| e.to_string())?;
        out.push(json!({
            "id": feature.id,
            "type": feature.geometry.type_name(),
            "origin": [tess.origin.x, tess.origin.y, tess.origin.z],
            "vertices": tess.vertex_count(),
            "lines": tess.line_indices.len() / 2,
            "triangles": tess.triangle_indices.len() / 3,
            "diagnostics": tess.diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
        }));
    }
    info!(features = out.len(), crs = crs_name, "tessellated");
    Ok(json!({ "crs": crs_name, "features": out }))
}

#[cfg(test)]
mod tests {
    use super::{locate, overlap, tessellate};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tessellation::TessellationConfig;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "square", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
            {"type": "Feature", "id": "crossing", "properties": {},
             "geometry": {"type": "LineString", "coordinates": [[-100,10],[100,-10]]}}
        ]
    }"#;

    #[test]
    fn locate_quad_reports_index_and_bound() {
        let report = locate("quad", 2, 10.0, 10.0).expect("locate");
        assert_eq!(report["index"], json!({"level": 2, "x": 8, "y": 4}));
        assert_eq!(report["bound"], json!([0.0, 0.0, 22.5, 22.5]));
    }

    #[test]
    fn locate_rejects_unknown_scheme_and_deep_healpix() {
        assert!(locate("hex", 1, 0.0, 0.0).is_err());
        assert!(locate("healpix", 40, 0.0, 0.0).is_err());
        assert!(locate("healpix", 3, 0.0, 0.0).is_ok());
    }

    #[test]
    fn overlap_lists_roots_per_feature() {
        let report = overlap(SAMPLE, "quad").expect("overlap");
        assert_eq!(report[0]["roots"], json!([{"level": 0, "x": 2, "y": 1}]));
        assert_eq!(report[1]["roots"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn tessellate_counts_primitives() {
        let report =
            tessellate(SAMPLE, "Equatorial", None, TessellationConfig::default()).expect("tessellate");
        let square = &report["features"][0];
        assert_eq!(square["id"], json!("square"));
        assert!(square["triangles"].as_u64().is_some_and(|n| n >= 2));
        assert_eq!(square["diagnostics"], json!([]));
        assert!(report["features"][1]["lines"].as_u64().is_some_and(|n| n >= 1));
    }

    #[test]
    fn tessellate_unknown_crs_is_an_error() {
        assert!(tessellate(SAMPLE, "EPSG:1", None, TessellationConfig::default()).is_err());
    }
}
