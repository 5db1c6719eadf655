/// IBGE numeric codes by state abbreviation, in the order states are preloaded.
pub const STATE_CODES: [(&str, u8); 27] = [
    ("RO", 11),
    ("AC", 12),
    ("AM", 13),
    ("RR", 14),
    ("PA", 15),
    ("AP", 16),
    ("TO", 17),
    ("MA", 21),
    ("PI", 22),
    ("CE", 23),
    ("RN", 24),
    ("PB", 25),
    ("PE", 26),
    ("AL", 27),
    ("SE", 28),
    ("BA", 29),
    ("MG", 31),
    ("ES", 32),
    ("RJ", 33),
    ("SP", 35),
    ("PR", 41),
    ("SC", 42),
    ("RS", 43),
    ("MS", 50),
    ("MT", 51),
    ("GO", 52),
    ("DF", 53),
];

pub fn state_code(abbr: &str) -> Option<u8> {
    STATE_CODES
        .iter()
        .find(|(a, _)| a.eq_ignore_ascii_case(abbr))
        .map(|(_, code)| *code)
}

pub fn state_abbr(code: u8) -> Option<&'static str> {
    STATE_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(abbr, _)| *abbr)
}

pub fn all_state_codes() -> impl Iterator<Item = u8> {
    STATE_CODES.iter().map(|(_, code)| *code)
}
