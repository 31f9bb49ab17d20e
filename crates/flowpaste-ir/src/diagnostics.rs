use std::{collections::HashSet, sync::OnceLock};

/// Environment variable holding comma-separated diagnostics categories.
pub const DIAGNOSTICS_ENV: &str = "FLOWPASTE_DIAGNOSTICS";

fn parse_diagnostics_env() -> &'static HashSet<String> {
    static SET: OnceLock<HashSet<String>> = OnceLock::new();
    SET.get_or_init(|| {
        let raw = std::env::var(DIAGNOSTICS_ENV).unwrap_or_default();
        parse_categories(&raw)
    })
}

fn parse_categories(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whether verbose diagnostics are enabled for `category` (`css`, `html`) or `all`.
pub fn diagnostics_enabled(category: &str) -> bool {
    let set = parse_diagnostics_env();
    set.contains("all") || set.contains(&category.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::parse_categories;

    #[test]
    fn categories_are_trimmed_and_lowercased() {
        let set = parse_categories(" CSS, html ,,");
        assert!(set.contains("css"));
        assert!(set.contains("html"));
        assert_eq!(set.len(), 2);
    }
}
