/// Cell markers ISTAT tables use for "no figure available".
pub const MISSING_MARKERS: &[&str] = &["..", "...", "-", "x", "n.d."];

/// Parse a numeric cell. Blank cells and missing markers are `None`;
/// anything else that is not a number is `Err` with the trimmed text.
///
/// A single comma is accepted as the decimal separator when no dot is present.
pub fn parse_value(raw: &str) -> Result<Option<f64>, String> {
    let text = raw.trim();
    if text.is_empty() || MISSING_MARKERS.iter().any(|m| text.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }
    if let Ok(value) = text.parse::<f64>() {
        return if value.is_finite() {
            Ok(Some(value))
        } else {
            Err(text.to_string())
        };
    }
    if !text.contains('.') && text.matches(',').count() == 1
        && let Ok(value) = text.replace(',', ".").parse::<f64>()
        && value.is_finite()
    {
        return Ok(Some(value));
    }
    Err(text.to_string())
}

pub(crate) fn parse_year(raw: &str) -> Option<i32> {
    let text = raw.trim();
    text.parse::<i32>().ok().or_else(|| {
        // Spreadsheets export years as "2021.0".
        text.parse::<f64>()
            .ok()
            .filter(|year| year.fract() == 0.0 && year.abs() < 10_000.0)
            .map(|year| year as i32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_and_blanks_are_missing() {
        for raw in ["", "  ", "..", "...", "-", "x", "X", "n.d.", "N.D."] {
            assert_eq!(parse_value(raw), Ok(None), "{raw:?}");
        }
    }

    #[test]
    fn numbers_parse() {
        assert_eq!(parse_value(" 12.5 "), Ok(Some(12.5)));
        assert_eq!(parse_value("-3"), Ok(Some(-3.0)));
        assert_eq!(parse_value("12,5"), Ok(Some(12.5)));
    }

    #[test]
    fn text_is_rejected() {
        assert_eq!(parse_value("abc"), Err("abc".to_string()));
        assert!(parse_value("1.234,5").is_err());
        assert!(parse_value("NaN").is_err());
    }

    #[test]
    fn years_accept_float_exports() {
        assert_eq!(parse_year("2021"), Some(2021));
        assert_eq!(parse_year("2021.0"), Some(2021));
        assert_eq!(parse_year("2021.5"), None);
        assert_eq!(parse_year("anno"), None);
    }
}
