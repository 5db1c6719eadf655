use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub name: String,
    pub abbr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
}

/// Compliance record attached to a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub filepath: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub validity: Option<NaiveDate>,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Averages over the most recent charcoal deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharcoalStats {
    pub period: String,
    pub average_moisture: f64,
    pub average_fines: f64,
    pub average_density: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub corporate_name: String,
    pub city: City,
    pub state: State,
    #[serde(default)]
    pub cpf_cnpj: String,
    #[serde(default)]
    pub material_type: String,
    #[serde(default)]
    pub distance_in_meters: Option<f64>,
    /// 0–100 score. The backend sends it as a number, a numeric string or null.
    #[serde(default, deserialize_with = "lenient_number")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub charcoal_recent_stats: Option<CharcoalStats>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

// Accepts `YYYY-MM-DD` and datetime strings that start with one.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let head = raw.get(..10).unwrap_or(&raw);
    Ok(NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}
