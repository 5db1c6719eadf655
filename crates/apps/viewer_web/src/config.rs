use scene::MapConfig;
use tracing::warn;
use web_sys::Document;

pub const CONFIG_ELEMENT_ID: &str = "app-config";

/// Reads `<script id="app-config" type="application/json">`.
///
/// A missing element yields the defaults. An unparsable blob is logged and
/// also yields the defaults.
pub fn load(document: &Document) -> MapConfig {
    let Some(text) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return MapConfig::default();
    };
    parse(&text)
}

pub fn parse(text: &str) -> MapConfig {
    if text.trim().is_empty() {
        return MapConfig::default();
    }
    match serde_json::from_str(text) {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring invalid #{CONFIG_ELEMENT_ID}: {e}");
            MapConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use scene::MapConfig;

    #[test]
    fn blank_or_broken_config_falls_back() {
        assert_eq!(parse("  "), MapConfig::default());
        assert_eq!(parse("{oops"), MapConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = parse(r#"{"cards": {"static_files_base_url": "https://files.example/docs"}}"#);
        assert_eq!(cfg.cards.static_files_base_url, "https://files.example/docs");
        assert_eq!(cfg.min_zoom, 4.0);
    }
}
