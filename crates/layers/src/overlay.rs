//! Property shapefiles shown over satellite imagery.
//!
//! The backend returns one record per uploaded shapefile, with the GeoJSON
//! itself embedded as a string. Each record becomes one overlay whose
//! features are styled and given a popup independently.

use foundation::GeoBounds;
use formats::html::escape;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::symbology::{PathStyle, shapefile_style};
use crate::vector::{feature_values, geometry_bounds, value_to_text};

/// Feature attribute marking a registered property parcel.
pub const PROPERTY_ATTRIBUTE: &str = "MATRICULA";
pub const MISSING_VALUE: &str = "Não informado";

/// Popup rows, in display order.
pub const ATTRIBUTE_LABELS: [(&str, &str); 11] = [
    ("PLANTIO", "Plantio"),
    ("EXECUCAO", "Execução"),
    ("DATAPLANTI", "Data do Plantio"),
    ("TALHAO", "Talhão"),
    ("CNPJ_CPF", "CNPJ/CPF"),
    ("AREA", "Área"),
    ("MUNICIPIO", "Municipio"),
    ("PROPRIETAR", "Proprietário"),
    ("MATRICULA", "Matricula"),
    ("CARTORIO", "Cartório"),
    ("IDENTIFICA", "Identificação"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayError {
    Records(String),
    Geojson { record_id: u64, message: String },
}

impl std::fmt::Display for OverlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayError::Records(msg) => write!(f, "invalid shapefile list: {msg}"),
            OverlayError::Geojson { record_id, message } => {
                write!(f, "shapefile {record_id} has invalid geojson: {message}")
            }
        }
    }
}

impl std::error::Error for OverlayError {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShapefileRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub supplier_name: Option<String>,
    pub geojson: String,
}

pub fn parse_records(body: &Value) -> Result<Vec<ShapefileRecord>, OverlayError> {
    Vec::<ShapefileRecord>::deserialize(body).map_err(|e| OverlayError::Records(e.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFeature {
    pub properties: Map<String, Value>,
    pub bounds: Option<GeoBounds>,
    pub style: PathStyle,
    pub popup_html: String,
}

impl OverlayFeature {
    pub fn is_property(&self) -> bool {
        self.properties
            .get(PROPERTY_ATTRIBUTE)
            .is_some_and(is_present)
    }

    pub fn attribute_text(&self, key: &str) -> Option<String> {
        self.properties
            .get(key)
            .filter(|v| is_present(v))
            .and_then(value_to_text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapefileOverlay {
    pub record_id: u64,
    pub name: String,
    pub supplier_name: Option<String>,
    /// FeatureCollection in the same order as `features`.
    pub collection: Value,
    pub features: Vec<OverlayFeature>,
}

impl ShapefileOverlay {
    pub fn from_record(record: &ShapefileRecord) -> Result<Self, OverlayError> {
        let parsed: Value =
            serde_json::from_str(&record.geojson).map_err(|e| OverlayError::Geojson {
                record_id: record.id,
                message: e.to_string(),
            })?;
        let collection = normalize(parsed);

        let features = feature_values(&collection)
            .into_iter()
            .map(|feature| {
                let properties = feature
                    .get("properties")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                let is_property = properties.get(PROPERTY_ATTRIBUTE).is_some_and(is_present);
                OverlayFeature {
                    bounds: feature.get("geometry").and_then(geometry_bounds),
                    style: shapefile_style(record.id, is_property),
                    popup_html: popup_html(record, &properties),
                    properties,
                }
            })
            .collect();

        Ok(Self {
            record_id: record.id,
            name: record.name.clone(),
            supplier_name: record.supplier_name.clone(),
            collection,
            features,
        })
    }

    pub fn styles(&self) -> Vec<PathStyle> {
        self.features.iter().map(|f| f.style.clone()).collect()
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        self.features
            .iter()
            .filter_map(|f| f.bounds)
            .reduce(|a, b| a.union(&b))
    }
}

/// Wraps a bare Feature or geometry into a FeatureCollection.
fn normalize(geojson: Value) -> Value {
    match geojson.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => geojson,
        Some("Feature") => serde_json::json!({
            "type": "FeatureCollection",
            "features": [geojson],
        }),
        Some(_) => serde_json::json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "properties": {}, "geometry": geojson}],
        }),
        None => serde_json::json!({"type": "FeatureCollection", "features": []}),
    }
}

// Empty strings, zero, false and null are not shown.
fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn popup_html(record: &ShapefileRecord, properties: &Map<String, Value>) -> String {
    let supplier = record
        .supplier_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(MISSING_VALUE);

    let rows: String = ATTRIBUTE_LABELS
        .iter()
        .filter_map(|(key, label)| {
            let value = properties.get(*key).filter(|v| is_present(v))?;
            let text = value_to_text(value).unwrap_or_else(|| value.to_string());
            Some(format!(
                r#"<div class="flex gap-4 justify-between w-full popup-row"><strong>{label}:</strong> {}</div>"#,
                escape(&text)
            ))
        })
        .collect();

    format!(
        r#"<div class="text-nowrap shapefile-popup-content"><div class="text-center popup-title">{} ({})</div><div class="flex gap-4 justify-between w-full popup-row"><strong>Fornecedor:</strong> {}</div>{rows}</div>"#,
        escape(&record.name),
        record.id,
        escape(supplier),
    )
}
