/// Collapse whitespace and cap an HTTP error body for log and error text.
pub(crate) fn compact_error_body(body: &str) -> String {
    let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() > 180 {
        format!("{}...", normalized.chars().take(180).collect::<String>())
    } else {
        normalized
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_error_body_truncates() {
        let long = "x ".repeat(200);
        let out = compact_error_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 183);
    }

    #[test]
    fn compact_error_body_collapses_whitespace() {
        assert_eq!(compact_error_body("  a\n\tb   c "), "a b c");
    }
}
