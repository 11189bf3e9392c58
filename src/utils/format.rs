//! Number formatting for the importance report

/// Format with `precision` significant digits the way .NET's `G<n>` does.
///
/// Fixed notation is used while the decimal exponent is above -5 and below
/// `precision`; otherwise scientific notation with a signed, two-digit minimum
/// exponent (`1.234E-05`). Trailing zeros are dropped in both forms.
pub fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let precision = precision.max(1);
    // Round once in scientific form; the exponent decides the notation
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent <= -5 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}E{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

/// `G4`: four significant digits
pub fn format_g4(value: f64) -> String {
    format_general(value, 4)
}

/// Model weight with two decimals, or `-` when the slot has no single weight
pub fn format_weight(weight: Option<f64>) -> String {
    match weight {
        Some(w) => format!("{:.2}", w),
        None => "-".to_string(),
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
