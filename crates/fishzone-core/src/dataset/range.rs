/// Parse a juvenile length range of the form `"min-max"` (centimetres).
///
/// Exactly two numeric parts separated by a single `-` are required. Any
/// other shape yields `(None, None)`; the bounds are never half-populated.
///   "10-20"    → (Some(10.0), Some(20.0))
///   "abc"      → (None, None)
///   "10-20-30" → (None, None)
pub fn parse_juvenile_range(text: Option<&str>) -> (Option<f64>, Option<f64>) {
    let Some(text) = text else {
        return (None, None);
    };
    let parts: Vec<&str> = text.split('-').collect();
    if parts.len() != 2 {
        return (None, None);
    }
    match (parts[0].trim().parse::<f64>(), parts[1].trim().parse::<f64>()) {
        (Ok(min), Ok(max)) if min.is_finite() && max.is_finite() => (Some(min), Some(max)),
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_part_range() {
        assert_eq!(parse_juvenile_range(Some("10-20")), (Some(10.0), Some(20.0)));
        assert_eq!(parse_juvenile_range(Some("4.5 - 12")), (Some(4.5), Some(12.0)));
    }

    #[test]
    fn malformed_ranges_are_both_none() {
        assert_eq!(parse_juvenile_range(Some("abc")), (None, None));
        assert_eq!(parse_juvenile_range(None), (None, None));
        assert_eq!(parse_juvenile_range(Some("10-20-30")), (None, None));
        assert_eq!(parse_juvenile_range(Some("10-")), (None, None));
        assert_eq!(parse_juvenile_range(Some("10-x")), (None, None));
        assert_eq!(parse_juvenile_range(Some("15")), (None, None));
    }
}
