use foundation::GeoBound;
use foundation::math::GeoPoint;
use serde_json::{Map, Value};

/// Coordinate payload of a caller geometry, tagged by GeoJSON type.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    Polygon(Vec<Vec<GeoPoint>>),
    MultiPolygon(Vec<Vec<Vec<GeoPoint>>>),
}

/// GeoJSON-shaped geometry owned by the caller.
///
/// `crs` carries the declared coordinate system name; `None` means the
/// active CRS of the consuming context.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub kind: GeometryKind,
    pub crs: Option<String>,
}

impl Geometry {
    pub fn new(kind: GeometryKind) -> Self {
        Self { kind, crs: None }
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn point(lon: f64, lat: f64) -> Self {
        Self::new(GeometryKind::Point(GeoPoint::new(lon, lat)))
    }

    pub fn line_string(points: &[(f64, f64)]) -> Self {
        Self::new(GeometryKind::LineString(to_points(points)))
    }

    pub fn polygon(rings: &[&[(f64, f64)]]) -> Self {
        Self::new(GeometryKind::Polygon(
            rings.iter().map(|r| to_points(r)).collect(),
        ))
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            GeometryKind::Point(_) => "Point",
            GeometryKind::MultiPoint(_) => "MultiPoint",
            GeometryKind::LineString(_) => "LineString",
            GeometryKind::MultiLineString(_) => "MultiLineString",
            GeometryKind::Polygon(_) => "Polygon",
            GeometryKind::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Every coordinate of the geometry, in document order.
    pub fn flat_coordinates(&self) -> Vec<GeoPoint> {
        match &self.kind {
            GeometryKind::Point(p) => vec![*p],
            GeometryKind::MultiPoint(ps) | GeometryKind::LineString(ps) => ps.clone(),
            GeometryKind::MultiLineString(lines) | GeometryKind::Polygon(lines) => {
                lines.iter().flatten().copied().collect()
            }
            GeometryKind::MultiPolygon(polys) => {
                polys.iter().flatten().flatten().copied().collect()
            }
        }
    }

    pub fn bound(&self) -> Option<GeoBound> {
        GeoBound::from_points(self.flat_coordinates().iter())
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload)?;
        parse_geometry(&value, None).map_err(GeoJsonError::InvalidGeometry)
    }

    pub fn to_geojson_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(
            "type".to_string(),
            Value::String(self.type_name().to_string()),
        );
        let coords = match &self.kind {
            GeometryKind::Point(p) => point_coords(p),
            GeometryKind::MultiPoint(ps) | GeometryKind::LineString(ps) => points_coords(ps),
            GeometryKind::MultiLineString(lines) | GeometryKind::Polygon(lines) => {
                Value::Array(lines.iter().map(|l| points_coords(l)).collect())
            }
            GeometryKind::MultiPolygon(polys) => Value::Array(
                polys
                    .iter()
                    .map(|poly| Value::Array(poly.iter().map(|r| points_coords(r)).collect()))
                    .collect(),
            ),
        };
        obj.insert("coordinates".to_string(), coords);
        if let Some(name) = &self.crs {
            obj.insert("crs".to_string(), crs_value(name));
        }
        Value::Object(obj)
    }
}

fn to_points(points: &[(f64, f64)]) -> Vec<GeoPoint> {
    points
        .iter()
        .map(|&(lon, lat)| GeoPoint::new(lon, lat))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, thiserror::Error)]
pub enum GeoJsonError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl FeatureCollection {
    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value
            .as_object()
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(GeoJsonError::NotAFeatureCollection);
        }

        // A collection-level CRS applies to every feature that does not declare its own.
        let collection_crs = parse_crs_name(obj);

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let invalid = |reason: String| GeoJsonError::InvalidFeature { index, reason };

            let feat_obj = feat_val
                .as_object()
                .ok_or_else(|| invalid("feature must be an object".to_string()))?;

            let feat_type = feat_obj
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or_else(|| invalid("feature missing type".to_string()))?;
            if feat_type != "Feature" {
                return Err(invalid(format!("unexpected feature type: {feat_type}")));
            }

            let id = match feat_obj.get("id") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };

            let properties = feat_obj
                .get("properties")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();

            let geometry_val = feat_obj
                .get("geometry")
                .ok_or_else(|| invalid("feature missing geometry".to_string()))?;
            let default_crs = parse_crs_name(feat_obj).or_else(|| collection_crs.clone());
            let geometry = parse_geometry(geometry_val, default_crs).map_err(invalid)?;

            features.push(Feature {
                id,
                properties,
                geometry,
            });
        }

        Ok(Self { features })
    }

    /// Semantic round-trip exporter: emits a GeoJSON FeatureCollection.
    /// (Property ordering may differ from the original input.)
    pub fn to_geojson_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );

        let mut features: Vec<Value> = Vec::with_capacity(self.features.len());
        for feat in &self.features {
            let mut fobj = Map::new();
            fobj.insert("type".to_string(), Value::String("Feature".to_string()));
            if let Some(id) = &feat.id {
                fobj.insert("id".to_string(), Value::String(id.clone()));
            }
            fobj.insert(
                "properties".to_string(),
                Value::Object(feat.properties.clone()),
            );
            fobj.insert("geometry".to_string(), feat.geometry.to_geojson_value());
            features.push(Value::Object(fobj));
        }

        root.insert("features".to_string(), Value::Array(features));
        Value::Object(root)
    }

    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_geojson_value())
    }
}

fn crs_value(name: &str) -> Value {
    let mut props = Map::new();
    props.insert("name".to_string(), Value::String(name.to_string()));
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::String("name".to_string()));
    obj.insert("properties".to_string(), Value::Object(props));
    Value::Object(obj)
}

/// Reads `{"crs": {"type": "name", "properties": {"name": ...}}}`.
fn parse_crs_name(obj: &Map<String, Value>) -> Option<String> {
    obj.get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
        .map(str::to_string)
}

fn point_coords(p: &GeoPoint) -> Value {
    let mut coords = vec![Value::from(p.lon), Value::from(p.lat)];
    if p.alt != 0.0 {
        coords.push(Value::from(p.alt));
    }
    Value::Array(coords)
}

fn points_coords(ps: &[GeoPoint]) -> Value {
    Value::Array(ps.iter().map(point_coords).collect())
}

fn parse_geometry(value: &Value, default_crs: Option<String>) -> Result<Geometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    let kind = match ty {
        "Point" => GeometryKind::Point(parse_point(coords)?),
        "MultiPoint" => GeometryKind::MultiPoint(parse_points(coords)?),
        "LineString" => GeometryKind::LineString(parse_points(coords)?),
        "MultiLineString" => GeometryKind::MultiLineString(parse_lines(coords)?),
        "Polygon" => GeometryKind::Polygon(parse_lines(coords)?),
        "MultiPolygon" => GeometryKind::MultiPolygon(parse_multi_polygon(coords)?),
        other => return Err(format!("unsupported geometry type: {other}")),
    };

    Ok(Geometry {
        kind,
        crs: parse_crs_name(obj).or(default_crs),
    })
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    let alt = match arr.get(2) {
        Some(v) => v.as_f64().ok_or("altitude must be a number".to_string())?,
        None => 0.0,
    };
    if !lon.is_finite() || !lat.is_finite() {
        return Err("position must be finite".to_string());
    }
    Ok(GeoPoint::with_alt(lon, lat, alt))
}

fn parse_points(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    arr.iter().map(parse_point).collect()
}

fn parse_lines(coords: &Value) -> Result<Vec<Vec<GeoPoint>>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array of rings or lines".to_string())?;
    arr.iter().map(parse_points).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Vec<GeoPoint>>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_lines).collect()
}
