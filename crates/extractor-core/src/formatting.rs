/// Render `value` with `decimals` fractional digits and a `,` between each
/// group of three integer digits, as shown in the console summary table.
///
/// ```
/// use extractor_core::formatting::format_number;
///
/// assert_eq!(format_number(61_250.0, 0), "61,250");
/// assert_eq!(format_number(0.008_333, 4), "0.0083");
/// assert_eq!(format_number(-54_000.3, 1), "-54,000.3");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    // A value that rounds to zero prints without a sign.
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    out.push_str(&group_digits(integer));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Event count with `,` separators.
///
/// ```
/// use extractor_core::formatting::format_count;
///
/// assert_eq!(format_count(120), "120");
/// assert_eq!(format_count(4_000_000), "4,000,000");
/// ```
pub fn format_count(value: u64) -> String {
    group_digits(&value.to_string())
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
