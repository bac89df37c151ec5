use once_cell::sync::Lazy;
use regex::{Captures, NoExpand, Regex};

pub const DEFAULT_TEMPLATE: &str = "%l %p";
pub const MAX_SEGMENT_CHARS: usize = 15;
const ELLIPSIS: &str = "...";

static LABEL_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)%l").unwrap());
// `%v`, `%v.` and `%v.<n>` all render through the K compaction.
static VALUE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)%v\.?\d*").unwrap());
static PERCENT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)%p\.?(\d*)").unwrap());

/// Compact a value with a `K` suffix once it reaches a thousand.
///
/// `999 -> "999"`, `1000 -> "1K"`, `1234 -> "1.23K"`.
pub fn format_to_k(value: f64) -> String {
    if value < 1000.0 {
        return format!("{value}");
    }
    let precision = if value % 1000.0 == 0.0 { 0 } else { 2 };
    format!("{}K", to_fixed(value / 1000.0, precision))
}

pub fn format_percent(percent: f64, precision: usize) -> String {
    format!("{}%", to_fixed(percent * 100.0, precision))
}

/// Fixed-point formatting that rounds exact ties away from zero
/// (`1.125 -> "1.13"`), unlike `{:.2}` which rounds them to even.
pub fn to_fixed(value: f64, precision: usize) -> String {
    let factor = 10f64.powi(precision.min(i32::MAX as usize) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= 1e21 {
        return format!("{value:.precision$}");
    }
    format!("{:.*}", precision, scaled.round() / factor)
}

/// Replace the `%l`, `%v` and `%p` markers (case-insensitive).
///
/// `%p.<n>` renders the share with `n` decimals; a bare `%p` uses
/// `percent_precision`.
pub fn substitute(
    template: &str,
    label: &str,
    value: f64,
    percent: f64,
    percent_precision: usize,
) -> String {
    let text = LABEL_MARKER.replace_all(template, NoExpand(label));
    let formatted_value = format_to_k(value);
    let text = VALUE_MARKER.replace_all(&text, NoExpand(&formatted_value));
    PERCENT_MARKER
        .replace_all(&text, |caps: &Captures| {
            let precision = caps
                .get(1)
                .map(|m| m.as_str())
                .filter(|digits| !digits.is_empty())
                .and_then(|digits| digits.parse::<usize>().ok())
                .unwrap_or(percent_precision)
                .min(100);
            format_percent(percent, precision)
        })
        .into_owned()
}

/// Shorten the text after the first `-` (or the whole text when there is
/// none) to [`MAX_SEGMENT_CHARS`] characters plus an ellipsis. The part up
/// to and including the dash is kept verbatim and joined with one space.
pub fn truncate_text(text: &str) -> String {
    match text.find('-') {
        Some(dash) => {
            let (before, after) = text.split_at(dash + 1);
            format!("{before} {}", shorten(after.trim()))
        }
        None => shorten(text),
    }
}

fn shorten(text: &str) -> String {
    if text.chars().count() > MAX_SEGMENT_CHARS {
        let head: String = text.chars().take(MAX_SEGMENT_CHARS).collect();
        format!("{head}{ELLIPSIS}")
    } else {
        text.to_string()
    }
}

/// Non-empty runs between line breaks, trimmed.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split(['\r', '\n'])
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.trim().to_string())
        .collect()
}
