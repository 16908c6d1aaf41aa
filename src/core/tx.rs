use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Naive formats accepted for the `timestamp` column, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Formats carrying a numeric offset without a colon (`+0500`).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Date-only formats, read as midnight. Slash dates are month first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a timestamp into naive wall-clock time.
///
/// Offsets are dropped rather than converted, so the hour is the one written
/// in the source. A bare date is midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.naive_local());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a transfer amount. Must be finite and non-negative.
pub fn parse_amount(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("not a number ({e})"))?;
    if !value.is_finite() {
        return Err("not a finite number".into());
    }
    if value < 0.0 {
        return Err("must be non-negative".into());
    }
    Ok(value)
}

/// Parse a wallet age in whole days. Integral floats such as `10.0` are
/// accepted since float-typed exports write whole numbers that way.
pub fn parse_wallet_age(raw: &str) -> Result<u32, String> {
    let raw = raw.trim();
    if let Ok(days) = raw.parse::<u32>() {
        return Ok(days);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => {
            Ok(v as u32)
        }
        _ => Err("not a non-negative integer".into()),
    }
}
