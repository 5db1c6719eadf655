//! Command implementations behind the `supplier-map` binary.

use catalog::{SupplierIndex, all_state_codes};
use chrono::NaiveDate;
use formats::{CardConfig, SupplierCard};
use serde_json::{Map, Value};
use streaming::{
    BoundaryCache, DEFAULT_PRELOAD_WINDOW, Fetch, FetchError, LocalBoxFuture, RegionKey,
    SourceConfig, preload,
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Index { suppliers_url: String },
    Preload { base_url: String },
    Card { suppliers_url: String, city_key: String },
}

pub fn usage(exe: &str) -> String {
    format!(
        "Usage:\n  {exe} index <suppliers-url>\n  {exe} preload <static-base-url>\n  {exe} card <suppliers-url> <city-key>\n\nNotes:\n- City keys look like `31-Sete Lagoas` (IBGE state code, dash, municipality name).\n- Set RUST_LOG=info to see per-request logs.\n"
    )
}

/// Parses the arguments after the executable name.
pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let (cmd, rest) = args.split_first().ok_or("missing command")?;
    match (cmd.as_str(), rest) {
        ("index", [url]) => Ok(Command::Index {
            suppliers_url: url.clone(),
        }),
        ("preload", [base]) => Ok(Command::Preload {
            base_url: base.clone(),
        }),
        ("card", [url, key]) => Ok(Command::Card {
            suppliers_url: url.clone(),
            city_key: key.clone(),
        }),
        ("index" | "preload" | "card", _) => Err(format!("wrong number of arguments for `{cmd}`")),
        _ => Err(format!("unknown command: {cmd}")),
    }
}

/// `reqwest`-backed fetcher for native runs.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl Fetch for ReqwestFetch {
    fn get_json<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Value, FetchError>> {
        Box::pin(async move {
            debug!("GET {url}");
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            resp.json::<Value>().await.map_err(|e| FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
        })
    }
}

async fn load_index<F: Fetch>(fetch: &F, suppliers_url: &str) -> Result<SupplierIndex, String> {
    let body = fetch
        .get_json(suppliers_url)
        .await
        .map_err(|e| e.to_string())?;
    SupplierIndex::from_json(body).map_err(|e| e.to_string())
}

/// City keys with their supplier counts, as pretty JSON.
pub async fn index<F: Fetch>(fetch: &F, suppliers_url: &str) -> Result<String, String> {
    let index = load_index(fetch, suppliers_url).await?;
    let counts: Map<String, Value> = index
        .iter()
        .map(|(key, suppliers)| (key.as_str().to_string(), Value::from(suppliers.len())))
        .collect();
    serde_json::to_string_pretty(&counts).map_err(|e| e.to_string())
}

pub async fn preload_states<F: Fetch>(fetch: F, base_url: &str) -> Result<String, String> {
    let cache = BoundaryCache::new(fetch, SourceConfig::with_base(base_url));
    let keys = all_state_codes().map(RegionKey::Cities).collect();
    let report = preload(&cache, keys, DEFAULT_PRELOAD_WINDOW).await;
    let mut out = format!("loaded {}, failed {}", report.loaded, report.failed.len());
    if !report.failed.is_empty() {
        out.push_str(&format!(": {}", report.failed.join(", ")));
    }
    Ok(out)
}

pub async fn cards<F: Fetch>(
    fetch: &F,
    suppliers_url: &str,
    city_key: &str,
    today: NaiveDate,
) -> Result<String, String> {
    let index = load_index(fetch, suppliers_url).await?;
    let suppliers = index
        .suppliers(city_key)
        .ok_or_else(|| format!("no suppliers for {city_key:?}"))?;
    let config = CardConfig::default();
    let html: Vec<String> = suppliers
        .iter()
        .map(|s| SupplierCard::render(s, &config, today).html)
        .collect();
    Ok(html.join("\n"))
}
