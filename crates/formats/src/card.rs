use catalog::{CHARCOAL, Document, Supplier};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::html::escape;
use crate::number::{distance_km, round_fixed, trim_number};
use crate::palette::{material_color, rating_color};
use crate::taxid::format_tax_id;
use crate::validity::ValidityStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Prefix for document file links.
    pub static_files_base_url: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            static_files_base_url: "/documents".to_string(),
        }
    }
}

/// One rendered supplier card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierCard {
    pub supplier_id: u64,
    pub border_color: &'static str,
    pub rating_color: &'static str,
    pub html: String,
}

impl SupplierCard {
    pub fn render(supplier: &Supplier, config: &CardConfig, today: NaiveDate) -> Self {
        let border_color = material_color(&supplier.material_type);
        let rating_color = rating_color(supplier.rating);
        let rating = supplier
            .rating
            .map(trim_number)
            .unwrap_or_else(|| "-".to_string());

        let mut document_rows = String::new();
        for document in &supplier.documents {
            document_rows.push_str(&document_row(document, config, today));
        }

        let html = format!(
            r#"<div class="p-3 w-full text-slate-200">
    <div class="supplier-card bg-dark-200 bg-opacity-60 shadow-lg px-4 py-4 border-t-[3px] rounded-md w-full" style="border-color: {border_color};">
        <div class="flex justify-between w-full text-md overflow-hidden">
            <div class="flex flex-col gap-1 text-nowrap overflow-hidden">
                <p class="mb-3 w-full font-medium text-ellipsis text-white overflow-hidden">{name}</p>
                <div class="flex items-center pt-4 text-sm gap-4"><i class="ph-map-pin ph-fill"></i><span class="font-medium">{city} - {abbr}</span></div>
                <div class="flex items-center text-sm gap-4"><i class="ph-fill ph-identification-card"></i><span class="font-medium">{tax_id}</span></div>
                <div class="flex items-center pb-4 text-sm gap-4"><i class="ph-fill ph-package"></i><span class="font-medium">{material}</span></div>
            </div>
            <div class="flex justify-end gap-2 ml-5 w-fit max-w-fit">
                <div class="supplier-distance flex items-center gap-2 bg-black bg-opacity-20 px-3 py-1 rounded-md w-fit h-fit"><i class="ph-fill ph-path text-xl"></i><span class="font-medium text-nowrap">{distance}</span></div>
                <div class="supplier-rating flex items-center gap-2 bg-black bg-opacity-20 px-3 py-1 rounded-md w-fit h-fit" style="color: {rating_color};"><i class="ph-fill ph-star text-xl"></i><span class="font-medium">{rating}</span></div>
            </div>
        </div>
        {stats}
        <div class="mt-5 w-full">
            <div class="bg-black bg-opacity-20 shadow-sm rounded-md overflow-hidden">
                <table class="w-full"><tbody>{document_rows}</tbody></table>
            </div>
        </div>
    </div>
</div>"#,
            name = escape(&supplier.corporate_name),
            city = escape(&supplier.city.name),
            abbr = escape(&supplier.state.abbr),
            tax_id = escape(&format_tax_id(&supplier.cpf_cnpj)),
            material = escape(&supplier.material_type),
            distance = distance_km(supplier.distance_in_meters),
            rating = escape(&rating),
            stats = charcoal_stats(supplier),
        );

        SupplierCard {
            supplier_id: supplier.id,
            border_color,
            rating_color,
            html,
        }
    }
}

fn charcoal_stats(supplier: &Supplier) -> String {
    let Some(stats) = &supplier.charcoal_recent_stats else {
        return String::new();
    };
    if supplier.material_type != CHARCOAL {
        return String::new();
    }

    format!(
        r#"<div class="charcoal-stats mt-5 w-full bg-black bg-opacity-20 shadow-sm rounded-md overflow-hidden">
    <div class="px-4 w-full font-semibold text-[0.6rem] text-slate-500 flex justify-between items-center py-2">
        <p>QUALIDADE RECENTE DO CARVÃO - MÉDIA DAS ULTIMAS {count} ENTREGAS</p>
        <p>{period}</p>
    </div>
    <div class="w-full grid grid-cols-3 grid-rows-1 text-sm">
        <div class="px-4 border-slate-800 font-medium border-r flex justify-between items-center py-3"><span class="text-slate-400">DENSIDADE</span><span>{density}</span></div>
        <div class="px-4 border-slate-800 font-medium border-r flex justify-between items-center py-3"><span class="text-slate-400">UMIDADE</span><span>{moisture}</span></div>
        <div class="px-4 flex justify-between font-medium items-center py-3"><span class="text-slate-400">FINOS</span><span>{fines}</span></div>
    </div>
</div>"#,
        count = stats.count,
        period = escape(&stats.period),
        density = round_fixed(stats.average_density, 2),
        moisture = round_fixed(stats.average_moisture, 2),
        fines = round_fixed(stats.average_fines, 2),
    )
}

fn document_row(document: &Document, config: &CardConfig, today: NaiveDate) -> String {
    let status = ValidityStatus::of(document, today);
    let name = match &document.filepath {
        Some(path) if !path.is_empty() => format!(
            r#"<a href="{base}/{path}" class="hover:text-slate-300" target="_blank" rel="noopener noreferrer">{name}</a>"#,
            base = escape(config.static_files_base_url.trim_end_matches('/')),
            path = escape(path.trim_start_matches('/')),
            name = escape(&document.name),
        ),
        _ => escape(&document.name),
    };

    format!(
        r#"<tr class="border-slate-800 border-b">
    <td class="px-4 py-3"><div class="flex items-center text-slate-400 gap-2"><i class="ph-fill ph-file-text"></i><span class="font-medium text-sm">{label}</span></div></td>
    <td class="text-right px-4 py-3"><span class="font-medium text-sm">{name}</span></td>
    <td class="text-right px-4 py-3 w-fit"><span class="font-medium {color} text-sm">{status}</span></td>
</tr>"#,
        label = escape(&document.kind.to_uppercase()),
        color = status.color_class(),
        status = status.label(),
    )
}

#[cfg(test)]
mod tests {
    use catalog::Supplier;
    use chrono::NaiveDate;
    use serde_json::json;

    use super::{CardConfig, SupplierCard, charcoal_stats};
    use crate::palette::{BAD_RATING_COLOR, GOOD_RATING_COLOR, GREEN_COLOR};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn supplier(extra: serde_json::Value) -> Supplier {
        let mut base = json!({
            "id": 1,
            "corporate_name": "Carvoaria <Boa Vista>",
            "cpf_cnpj": "12345678000190",
            "material_type": "Carvão Vegetal",
            "rating": 85,
            "state": {"abbr": "MG"},
            "city": {"name": "Sete Lagoas"},
            "distance_in_meters": 12345.0,
            "documents": []
        });
        if let (Some(b), Some(e)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in e {
                b.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn renders_core_fields() {
        let card = SupplierCard::render(&supplier(json!({})), &CardConfig::default(), today());
        assert_eq!(card.border_color, GREEN_COLOR);
        assert_eq!(card.rating_color, GOOD_RATING_COLOR);
        assert!(card.html.contains("Carvoaria &lt;Boa Vista&gt;"));
        assert!(card.html.contains("12.345.678/0001-90"));
        assert!(card.html.contains("Sete Lagoas - MG"));
        assert!(card.html.contains("12.3 km"));
        assert!(card.html.contains(">85<"));
    }

    #[test]
    fn unknown_distance_and_rating_use_placeholders() {
        let s = supplier(json!({"distance_in_meters": null, "rating": null}));
        let card = SupplierCard::render(&s, &CardConfig::default(), today());
        assert_eq!(card.rating_color, BAD_RATING_COLOR);
        assert!(card.html.contains(">-<"));
    }

    #[test]
    fn document_rows_link_files_and_show_status() {
        let s = supplier(json!({"documents": [
            {"name": "LO 12", "type": "Licença Ambiental", "filepath": "docs/lo.pdf", "validity": "2026-10-29"},
            {"name": "CAR", "type": "car"}
        ]}));
        let card = SupplierCard::render(&s, &CardConfig::default(), today());
        assert!(card.html.contains(r#"href="/documents/docs/lo.pdf""#));
        assert!(card.html.contains("LICENÇA AMBIENTAL"));
        assert!(card.html.contains("VENCE EM 10 DIAS"));
        assert!(card.html.contains("AUSENTE"));
    }

    #[test]
    fn charcoal_stats_only_for_charcoal_suppliers() {
        let stats = json!({"charcoal_recent_stats": {
            "period": "01/09/2026 - 30/09/2026", "average_moisture": 4.5,
            "average_fines": 10.256, "average_density": 230.0, "count": 12
        }});
        let card = SupplierCard::render(&supplier(stats.clone()), &CardConfig::default(), today());
        assert!(card.html.contains("ULTIMAS 12 ENTREGAS"));
        assert!(card.html.contains("10.26"));

        let mut ore = stats;
        ore["material_type"] = json!("Minério de Ferro");
        let card = SupplierCard::render(&supplier(ore), &CardConfig::default(), today());
        assert!(!card.html.contains("charcoal-stats"));
    }

    #[test]
    fn charcoal_stats_block_carries_every_average() {
        let stats = json!({"charcoal_recent_stats": {
            "period": "01/09/2026 - 30/09/2026", "average_moisture": 4.5,
            "average_fines": 10.256, "average_density": 230.0, "count": 3
        }});
        let block = charcoal_stats(&supplier(stats));
        assert!(block.starts_with(r#"<div class="charcoal-stats"#));
        assert!(block.ends_with("</div>"));
        assert!(block.contains("<p>01/09/2026 - 30/09/2026</p>"));
        assert!(block.contains("<span>230.00</span>"));
        assert!(block.contains("<span>4.50</span>"));
        assert!(block.contains("<span>10.26</span>"));
    }
}
