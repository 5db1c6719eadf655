/// Shortest decimal rendering: `12.0` prints as `12`, `12.5` as `12.5`.
pub fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Fixed number of decimals, half away from zero.
pub fn round_fixed(value: f64, digits: u32) -> String {
    let factor = 10f64.powi(digits as i32);
    let rounded = (value * factor).round() / factor;
    format!("{rounded:.prec$}", prec = digits as usize)
}

/// `"12.3 km"` from meters, or `"-"` when the distance is unknown.
pub fn distance_km(meters: Option<f64>) -> String {
    match meters {
        Some(m) => format!("{} km", trim_number((m / 100.0).round() / 10.0)),
        None => "-".to_string(),
    }
}
