//! Shorthand expansion and opaque-value wrapping for single declarations.

use super::scanner::split_value_components;

/// Functions whose values must pass through the target tool uninterpreted.
const OPAQUE_MARKERS: &[&str] = &["var(--", "calc(", "clamp(", "min(", "max("];

const RAW_OPEN: &str = "@raw<|";
const RAW_CLOSE: &str = "|>";

pub fn is_opaque_value(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    OPAQUE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Wraps a value in the raw-value marker.
pub fn wrap_raw(value: &str) -> String {
    format!("{RAW_OPEN}{value}{RAW_CLOSE}")
}

/// Renders one declaration as flat `property: value;` text, expanding known
/// shorthands. Opaque values are wrapped whole and never expanded.
pub fn expand_declaration(property: &str, value: &str) -> String {
    if is_opaque_value(value) {
        return format_decl(property, &wrap_raw(value));
    }
    let expanded = match property {
        "margin" | "padding" => expand_box(property, value),
        "border-radius" => expand_radius(value),
        "gap" => expand_gap(value),
        "background" => expand_background(value),
        _ => None,
    };
    expanded.unwrap_or_else(|| format_decl(property, value))
}

fn format_decl(property: &str, value: &str) -> String {
    format!("{property}: {value};")
}

fn join_decls(pairs: &[(String, &str)]) -> String {
    pairs
        .iter()
        .map(|(property, value)| format_decl(property, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits off a trailing `!important` so it can be reattached to every longhand.
fn split_priority(value: &str) -> (&str, &str) {
    let trimmed = value.trim_end();
    let lower = trimmed.to_ascii_lowercase();
    if lower.ends_with("!important") {
        let cut = trimmed.len() - "!important".len();
        (trimmed[..cut].trim_end(), " !important")
    } else {
        (trimmed, "")
    }
}

fn expand_box(property: &str, value: &str) -> Option<String> {
    let (value, priority) = split_priority(value);
    let parts = split_value_components(value);
    let [top, right, bottom, left] = match parts.as_slice() {
        [all] => [*all; 4],
        [vertical, horizontal] => [*vertical, *horizontal, *vertical, *horizontal],
        [top, horizontal, bottom] => [*top, *horizontal, *bottom, *horizontal],
        [top, right, bottom, left] => [*top, *right, *bottom, *left],
        _ => return None,
    };
    let with_priority = |v: &str| format!("{v}{priority}");
    let values = [
        with_priority(top),
        with_priority(right),
        with_priority(bottom),
        with_priority(left),
    ];
    let pairs: Vec<(String, &str)> = ["top", "right", "bottom", "left"]
        .iter()
        .zip(values.iter())
        .map(|(side, v)| (format!("{property}-{side}"), v.as_str()))
        .collect();
    Some(join_decls(&pairs))
}

fn expand_radius(value: &str) -> Option<String> {
    // Elliptical radii keep the shorthand.
    if value.contains('/') {
        return None;
    }
    let (value, priority) = split_priority(value);
    let parts = split_value_components(value);
    let [top_left, top_right, bottom_right, bottom_left] = match parts.as_slice() {
        [all] => [*all; 4],
        [first, second] => [*first, *second, *first, *second],
        [first, second, third] => [*first, *second, *third, *second],
        [tl, tr, br, bl] => [*tl, *tr, *br, *bl],
        _ => return None,
    };
    let values = [top_left, top_right, bottom_right, bottom_left].map(|v| format!("{v}{priority}"));
    let corners = [
        "border-top-left-radius",
        "border-top-right-radius",
        "border-bottom-right-radius",
        "border-bottom-left-radius",
    ];
    let pairs: Vec<(String, &str)> = corners
        .iter()
        .zip(values.iter())
        .map(|(corner, v)| (corner.to_string(), v.as_str()))
        .collect();
    Some(join_decls(&pairs))
}

fn expand_gap(value: &str) -> Option<String> {
    let (value, priority) = split_priority(value);
    let parts = split_value_components(value);
    let (column, row) = match parts.as_slice() {
        [single] => (*single, *single),
        [column, row] => (*column, *row),
        _ => return None,
    };
    Some(format!(
        "grid-column-gap: {column}{priority}; grid-row-gap: {row}{priority};"
    ))
}

fn expand_background(value: &str) -> Option<String> {
    let (color, _) = split_priority(value);
    looks_like_color(color).then(|| format_decl("background-color", value))
}

fn looks_like_color(value: &str) -> bool {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if lower.starts_with("rgb(") || lower.starts_with("rgba(") {
        return lower.ends_with(')');
    }
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}
