//! Utility functions and helpers

use std::sync::atomic::{AtomicU64, Ordering};

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Format an expense amount for display.
///
/// Whole amounts print without decimals, everything else with two.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format_number(amount as i64)
    } else {
        let fixed = format!("{:.2}", amount);
        match fixed.split_once('.') {
            Some((whole, frac)) => format!("{}.{}", format_number(whole), frac),
            None => fixed,
        }
    }
}

/// Escape text for safe interpolation into HTML element content or
/// quoted attribute values.
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a short local identifier: `{prefix}-` followed by 7 base-36 chars.
///
/// Not globally unique; callers must check against their own collection.
pub fn generate_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let count = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    // splitmix64 finalizer
    let mut x = nanos ^ count.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;

    let mut suffix = String::with_capacity(7);
    for _ in 0..7 {
        suffix.push(BASE36[(x % 36) as usize] as char);
        x /= 36;
    }
    format!("{}-{}", prefix, suffix)
}
