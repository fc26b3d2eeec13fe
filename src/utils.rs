use chrono::NaiveDateTime;

/// Parse a float that may use comma as decimal separator
pub fn parse_locale_float(s: &str) -> Result<f64, std::num::ParseFloatError> {
    s.trim().replace(',', ".").parse::<f64>()
}

/// Logger marker levels are whole numbers; fractional readings are truncated
/// toward zero. Unreadable cells become NaN, which never produces an edge.
pub fn parse_marker(s: &str) -> f64 {
    parse_locale_float(s).map(f64::trunc).unwrap_or(f64::NAN)
}

/// Unreadable CO2 cells become 0.0.
pub fn parse_co2(s: &str) -> f64 {
    parse_locale_float(s).unwrap_or(0.0)
}

/// Pass-through channels (PAR, temperature, H2O). Unreadable cells become NaN
/// and are written back out as empty cells.
pub fn parse_channel(s: &str) -> f64 {
    parse_locale_float(s).unwrap_or(f64::NAN)
}

/// Tries each format in order and returns the first match.
pub fn parse_timestamp(value: &str, formats: &[String]) -> Option<NaiveDateTime> {
    let value = value.trim();
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Formats a float for the output table; non-finite values become empty cells.
pub fn format_float(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}
