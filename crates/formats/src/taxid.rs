/// Shown when a CPF/CNPJ has neither 11 nor 14 characters.
pub const INVALID_TAX_ID: &str = "CNPJ/CPF INVÁLIDO";

/// Formats a CPF (`XXX.XXX.XXX-XX`) or CNPJ (`XX.XXX.XXX/XXXX-XX`).
///
/// Length is counted in characters; any other length yields [`INVALID_TAX_ID`].
pub fn format_tax_id(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let part = |from: usize, to: usize| chars[from..to].iter().collect::<String>();

    match chars.len() {
        11 => format!(
            "{}.{}.{}-{}",
            part(0, 3),
            part(3, 6),
            part(6, 9),
            part(9, 11)
        ),
        14 => format!(
            "{}.{}.{}/{}-{}",
            part(0, 2),
            part(2, 5),
            part(5, 8),
            part(8, 12),
            part(12, 14)
        ),
        _ => INVALID_TAX_ID.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{INVALID_TAX_ID, format_tax_id};

    #[test]
    fn formats_person_ids() {
        assert_eq!(format_tax_id("12345678901"), "123.456.789-01");
    }

    #[test]
    fn formats_entity_ids() {
        assert_eq!(format_tax_id("12345678000190"), "12.345.678/0001-90");
    }

    #[test]
    fn every_other_length_is_invalid() {
        for len in (0..20).filter(|l| *l != 11 && *l != 14) {
            assert_eq!(format_tax_id(&"9".repeat(len)), INVALID_TAX_ID, "len {len}");
        }
    }
}
