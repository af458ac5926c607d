//! Turns free-text ingredient lines such as "1 1/2 cups milk" or "500g flour"
//! into name, quantity and unit.

use super::RawIngredient;
use crate::model::Unit;

/// Parse one ingredient line.
///
/// Lines without a leading amount ("salt to taste") come back with quantity 0
/// so they are imported but left out of scaling until the user fills them in.
/// Words that are not a known unit stay part of the name and the unit
/// defaults to "unit".
pub fn parse_line(line: &str) -> RawIngredient {
    let line = line.trim();
    let (quantity, rest) = match parse_quantity(line) {
        Some((quantity, rest)) => (quantity, rest),
        None => return RawIngredient::new(line, 0.0, Unit::Piece.label()),
    };

    let (unit, rest) = parse_unit(rest);
    let name = clean_name(rest);
    let name = if name.is_empty() { line.to_string() } else { name };

    RawIngredient::new(name, quantity, unit.label())
}

fn vulgar_fraction(c: char) -> Option<f64> {
    let value = match c {
        '½' => 0.5,
        '⅓' => 1.0 / 3.0,
        '⅔' => 2.0 / 3.0,
        '¼' => 0.25,
        '¾' => 0.75,
        '⅕' => 0.2,
        '⅛' => 0.125,
        '⅜' => 0.375,
        '⅝' => 0.625,
        '⅞' => 0.875,
        _ => return None,
    };
    Some(value)
}

// Leading run of digits and separators, e.g. "500", "1.5", "1,5", "1/2"
fn split_number(text: &str) -> Option<(&str, &str)> {
    let end = text
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | ',' | '/')))
        .map_or(text.len(), |(i, _)| i);
    if end == 0 || !text[..end].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some((&text[..end], &text[end..]))
}

fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim_end_matches(['.', ',']);
    if let Some((numerator, denominator)) = token.split_once('/') {
        let numerator: f64 = numerator.parse().ok()?;
        let denominator: f64 = denominator.parse().ok()?;
        if denominator == 0.0 {
            return None;
        }
        return Some(numerator / denominator);
    }
    normalize_separators(token).parse().ok()
}

// "1,000" and "1,000.5" use commas for grouping, "1,5" and "1.000,5" use a
// decimal comma. With both separators present the last one is the decimal.
fn normalize_separators(token: &str) -> String {
    let last_comma = token.rfind(',');
    let last_dot = token.rfind('.');
    match (last_comma, last_dot) {
        (None, _) => token.to_string(),
        (Some(comma), Some(dot)) if dot > comma => token.replace(',', ""),
        (Some(comma), Some(_)) => {
            let (whole, fraction) = token.split_at(comma);
            format!("{}.{}", whole.replace('.', ""), &fraction[1..])
        }
        (Some(_), None) => {
            let mut groups = token.split(',');
            let lead = groups.next().unwrap_or_default();
            let grouped = !lead.is_empty()
                && lead.len() <= 3
                && groups.all(|group| group.len() == 3);
            if grouped {
                token.replace(',', "")
            } else {
                token.replacen(',', ".", 1)
            }
        }
    }
}

fn parse_quantity(text: &str) -> Option<(f64, &str)> {
    let mut chars = text.chars();
    if let Some(value) = chars.next().and_then(vulgar_fraction) {
        return Some((value, chars.as_str()));
    }

    let (token, mut rest) = split_number(text)?;
    let mut quantity = parse_number(token)?;

    // "1½"
    let mut chars = rest.chars();
    if let Some(value) = chars.next().and_then(vulgar_fraction) {
        return Some((quantity + value, chars.as_str()));
    }

    if !token.contains('/') {
        // Mixed numbers: "1 1/2", "1 ½"
        let after_space = rest.trim_start();
        if after_space.len() < rest.len() {
            let mut chars = after_space.chars();
            if let Some(value) = chars.next().and_then(vulgar_fraction) {
                return Some((quantity + value, chars.as_str()));
            }
            if let Some((fraction, remainder)) = split_number(after_space) {
                if fraction.contains('/') {
                    if let Some(value) = parse_number(fraction) {
                        quantity += value;
                        rest = remainder;
                    }
                }
            }
        }
    }

    // Ranges such as "2-3 eggs" keep the lower bound
    let trimmed = rest.trim_start();
    if let Some(upper) = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('–'))
    {
        if let Some((_, remainder)) = split_number(upper.trim_start()) {
            rest = remainder;
        }
    }

    Some((quantity, rest))
}

fn parse_unit(text: &str) -> (Unit, &str) {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map_or(trimmed.len(), |(i, _)| i);
    let word = trimmed[..end].trim_end_matches([',', ')']);

    match word.parse::<Unit>() {
        Ok(unit) => (unit, &trimmed[end..]),
        Err(_) => (Unit::Piece, trimmed),
    }
}

fn clean_name(text: &str) -> String {
    let name = text.trim().trim_start_matches([',', '-']).trim();
    let name = name.strip_prefix("of ").unwrap_or(name);
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(line: &str) -> (String, f64, String) {
        let raw = parse_line(line);
        (raw.name.unwrap(), raw.quantity.unwrap(), raw.unit.unwrap())
    }

    #[test]
    fn test_number_unit_name() {
        assert_eq!(parsed("500 g flour"), ("flour".to_string(), 500.0, "g".to_string()));
        assert_eq!(
            parsed("250 ml whole milk"),
            ("whole milk".to_string(), 250.0, "ml".to_string())
        );
    }

    #[test]
    fn test_attached_unit() {
        assert_eq!(parsed("500g flour"), ("flour".to_string(), 500.0, "g".to_string()));
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parsed("1,5 kg potatoes"), ("potatoes".to_string(), 1.5, "kg".to_string()));
        assert_eq!(parsed("1.000,5 g rice"), ("rice".to_string(), 1000.5, "g".to_string()));
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(parsed("1,000 g flour"), ("flour".to_string(), 1000.0, "g".to_string()));
        assert_eq!(parsed("1,250.5 ml water"), ("water".to_string(), 1250.5, "ml".to_string()));
        assert_eq!(parse_number("2,000,000"), Some(2_000_000.0));
        assert_eq!(parse_number("12,75"), Some(12.75));
    }

    #[test]
    fn test_fractions() {
        assert_eq!(parsed("1/2 cup sugar"), ("sugar".to_string(), 0.5, "cup".to_string()));
        assert_eq!(
            parsed("1 1/2 cups of milk"),
            ("milk".to_string(), 1.5, "cup".to_string())
        );
        assert_eq!(parsed("½ tsp salt"), ("salt".to_string(), 0.5, "tsp".to_string()));
        assert_eq!(parsed("1½ tbsp oil"), ("oil".to_string(), 1.5, "tbsp".to_string()));
        assert_eq!(parsed("2 ¼ cups flour"), ("flour".to_string(), 2.25, "cup".to_string()));
    }

    #[test]
    fn test_count_without_unit() {
        assert_eq!(parsed("3 eggs"), ("eggs".to_string(), 3.0, "unit".to_string()));
        assert_eq!(
            parsed("2 large onions, diced"),
            ("large onions, diced".to_string(), 2.0, "unit".to_string())
        );
    }

    #[test]
    fn test_range_keeps_lower_bound() {
        assert_eq!(parsed("2-3 cloves garlic"), ("garlic".to_string(), 2.0, "clove".to_string()));
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(
            parsed("Salt to taste"),
            ("Salt to taste".to_string(), 0.0, "unit".to_string())
        );
    }

    #[test]
    fn test_amount_only() {
        assert_eq!(parsed("2 cups"), ("2 cups".to_string(), 2.0, "cup".to_string()));
    }
}
