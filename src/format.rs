/// Render a quantity as a plain decimal numeral.
///
/// Whole numbers have no decimal point; anything else is rounded to two
/// decimals with trailing zeros removed (2.50 -> "2.5", 2.333 -> "2.33").
pub fn format_quantity(quantity: f64) -> String {
    if !quantity.is_finite() {
        return quantity.to_string();
    }

    if quantity.fract() == 0.0 {
        return normalize_zero(format!("{}", quantity));
    }

    let rounded = format!("{:.2}", quantity);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    normalize_zero(trimmed.to_string())
}

/// Render the scaling factor the way the results header shows it, e.g. "1.50x"
pub fn format_multiplier(multiplier: f64) -> String {
    format!("{:.2}x", multiplier)
}

// "-0" can come out of negative zero or of small negatives rounding away
fn normalize_zero(rendered: String) -> String {
    if rendered == "-0" {
        "0".to_string()
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_have_no_decimal_point() {
        assert_eq!(format_quantity(750.0), "750");
        assert_eq!(format_quantity(0.0), "0");
        assert_eq!(format_quantity(-0.0), "0");
        assert_eq!(format_quantity(1_000_000.0), "1000000");
    }

    #[test]
    fn test_decimals_are_rounded_and_trimmed() {
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(2.333), "2.33");
        assert_eq!(format_quantity(66.666_666), "66.67");
        assert_eq!(format_quantity(2.999), "3");
        assert_eq!(format_quantity(0.001), "0");
        assert_eq!(format_quantity(-0.001), "0");
        assert_eq!(format_quantity(0.1 + 0.2), "0.3");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let samples = [
            0.0, 0.004, 0.005, 0.1, 1.0 / 3.0, 2.0 / 3.0, 2.335, 12.5, 66.666, 99.999, 750.0,
            1234.5678,
        ];
        for x in samples {
            let once = format_quantity(x);
            let reparsed: f64 = once.parse().unwrap();
            assert_eq!(format_quantity(reparsed), once, "not idempotent for {}", x);
        }
    }

    #[test]
    fn test_no_grouping_separators() {
        let rendered = format_quantity(1234567.891);
        assert_eq!(rendered, "1234567.89");
        assert!(!rendered.contains(','));
    }

    #[test]
    fn test_format_multiplier() {
        assert_eq!(format_multiplier(1.5), "1.50x");
        assert_eq!(format_multiplier(1.0 / 3.0), "0.33x");
    }
}
