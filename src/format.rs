//! Human-readable formatting helpers.

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const KILO: f64 = 1024.0;
const UNITS: [&str; 6] = ["bytes", "KB", "MB", "GB", "TB", "PB"];

/// Render a byte count as a size string, e.g. `"16.00 GB"`.
///
/// Values under one kilobyte print without decimals (`"512 bytes"`).
pub fn file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 bytes".to_string();
    }

    let decimals = if (bytes as f64) < KILO { 0 } else { 2 };

    let mut value = bytes as f64;
    let mut unit = 0;
    while unit < UNITS.len() - 1 && value / KILO >= 1.0 {
        value /= KILO;
        unit += 1;
    }

    format!("{} {}", number_format(value, decimals), UNITS[unit])
}

/// Render a timestamp as RFC 1123 in GMT, e.g. `Thu, 01 Jan 1970 00:00:00 GMT`.
pub fn rfc1123(at: OffsetDateTime) -> Result<String, time::error::Format> {
    at.to_offset(UtcOffset::UTC).format(format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    ))
}

/// Fixed-point rendering with `,` thousands separators.
fn number_format(value: f64, decimals: usize) -> String {
    let fixed = format!("{value:.decimals$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(fixed.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit as char);
    }

    match frac_part {
        Some(frac) => format!("{grouped}.{frac}"),
        None => grouped,
    }
}
