use serde::Serialize;

/// A cell value: a number when the text is entirely numeric, else the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Surrounding whitespace is dropped for both numbers and text. Literals
    /// that overflow `f64` stay text so no figure turns into JSON `null`.
    pub fn coerce(text: &str) -> Self {
        let trimmed = text.trim();
        if is_numeric(trimmed) {
            if let Ok(number) = trimmed.parse::<f64>() {
                if number.is_finite() {
                    return CellValue::Number(number);
                }
            }
        }
        CellValue::Text(trimmed.to_string())
    }
}

/// Decimal literal with optional sign, fraction and exponent. Rejects
/// `inf`, `NaN`, hex and anything with trailing garbage.
fn is_numeric(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }

    if digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case::decimal("1234.50", 1234.5)]
    #[case::integer("125000", 125000.0)]
    #[case::negative("-42.25", -42.25)]
    #[case::leading_dot(".5", 0.5)]
    #[case::trailing_dot("7.", 7.0)]
    #[case::exponent("1.5E3", 1500.0)]
    #[case::padded(" 12 ", 12.0)]
    fn coerces_numbers(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(CellValue::coerce(text), CellValue::Number(expected));
    }

    #[rstest]
    #[case::word("Bikes")]
    #[case::empty("")]
    #[case::mixed("12abc")]
    #[case::infinity("inf")]
    #[case::nan("NaN")]
    #[case::hex("0x1A")]
    #[case::bare_sign("-")]
    #[case::dangling_exponent("1e")]
    #[case::thousands("1,234")]
    #[case::percent("12.5%")]
    #[case::overflow("1e400")]
    #[case::negative_overflow("-1e400")]
    fn keeps_non_numeric_text(#[case] text: &str) {
        assert_eq!(CellValue::coerce(text), CellValue::Text(text.to_string()));
    }

    #[test]
    fn text_is_trimmed_like_numbers() {
        assert_eq!(CellValue::coerce(" Bikes \n"), CellValue::Text("Bikes".to_string()));
        assert_eq!(CellValue::coerce("  "), CellValue::Text(String::new()));
    }

    #[test]
    fn overflowing_numbers_survive_serialization() {
        let json = serde_json::to_string(&CellValue::coerce("1e400")).unwrap();
        assert_eq!(json, r#""1e400""#);
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![
            CellValue::Number(125000.75),
            CellValue::Text("Bikes".to_string()),
        ])
        .unwrap();
        assert_eq!(json, r#"[125000.75,"Bikes"]"#);
    }
}
