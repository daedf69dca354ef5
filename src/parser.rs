//! Line parser for the ratings CSV export.
//!
//! Each line is `title,rater,rating`. Values may be double-quoted to protect
//! embedded commas; no header row is expected.

use thiserror::Error;

/// A single normalized rating row.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRecord {
    pub title: String,
    pub rater: String,
    pub rating: f64,
}

/// Why a row was rejected. Both variants carry the raw line for logging.
#[derive(Debug, Error, PartialEq)]
pub enum RowParseError {
    #[error("expected 3 fields, found {found}: {line:?}")]
    FieldCount { line: String, found: usize },

    #[error("rating {value:?} is not a number: {line:?}")]
    InvalidRating { line: String, value: String },
}

impl RowParseError {
    /// The raw input line that failed to parse.
    pub fn line(&self) -> &str {
        match self {
            RowParseError::FieldCount { line, .. } => line,
            RowParseError::InvalidRating { line, .. } => line,
        }
    }
}

/// Splits a line on commas that are followed by an even number of `"`
/// characters. Quotes are kept in the returned fields.
pub fn split_fields(line: &str) -> Vec<&str> {
    let total_quotes = line.bytes().filter(|&b| b == b'"').count();

    let mut fields = Vec::new();
    let mut start = 0;
    let mut quotes_seen = 0;

    for (i, b) in line.bytes().enumerate() {
        match b {
            b'"' => quotes_seen += 1,
            b',' if (total_quotes - quotes_seen) % 2 == 0 => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);

    fields
}

/// Parses one raw line into a [`RatingRecord`].
///
/// Title and rater are trimmed, unquoted and lowercased so they can be used
/// as identity keys.
///
/// # Errors
///
/// Returns [`RowParseError::FieldCount`] unless the line has exactly three
/// fields, and [`RowParseError::InvalidRating`] if the rating is not a finite
/// number. The rating's range is not checked.
pub fn parse_line(line: &str) -> Result<RatingRecord, RowParseError> {
    let fields = split_fields(line);

    let [title, rater, rating] = fields.as_slice() else {
        return Err(RowParseError::FieldCount {
            line: line.to_string(),
            found: fields.len(),
        });
    };

    let rating_text = unquote(rating.trim());
    let rating = match rating_text.parse::<f64>() {
        Ok(r) if r.is_finite() => r,
        _ => {
            return Err(RowParseError::InvalidRating {
                line: line.to_string(),
                value: rating_text,
            });
        }
    };

    Ok(RatingRecord {
        title: normalize_key(title),
        rater: normalize_key(rater),
        rating,
    })
}

/// Trims, unquotes and lowercases a title or rater field.
pub fn normalize_key(field: &str) -> String {
    unquote(field.trim()).trim().to_lowercase()
}

// Strips one enclosing pair of double quotes and unescapes `""`.
fn unquote(field: &str) -> String {
    match field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple_line() {
        assert_eq!(
            split_fields("apple,banana,cherry"),
            vec!["apple", "banana", "cherry"]
        );
    }

    #[test]
    fn test_split_ignores_commas_within_quotes() {
        assert_eq!(
            split_fields(r#"apple,"banana, split",cherry"#),
            vec!["apple", r#""banana, split""#, "cherry"]
        );
    }

    #[test]
    fn test_split_empty_fields() {
        assert_eq!(split_fields("apple,,cherry"), vec!["apple", "", "cherry"]);
    }

    #[test]
    fn test_split_line_with_only_quotes() {
        assert_eq!(split_fields(r#""","""#), vec![r#""""#, r#""""#]);
    }

    #[test]
    fn test_split_empty_line_is_one_field() {
        assert_eq!(split_fields(""), vec![""]);
    }

    #[test]
    fn test_parse_normalizes_keys() {
        let a = parse_line("Dune, Alice, 5").unwrap();
        let b = parse_line(" dune ,ALICE, 5").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.title, "dune");
        assert_eq!(a.rater, "alice");
        assert_eq!(a.rating, 5.0);
    }

    #[test]
    fn test_parse_quoted_title() {
        let record = parse_line(r#""Dune, Messiah",bob,4.5"#).unwrap();
        assert_eq!(record.title, "dune, messiah");
        assert_eq!(record.rating, 4.5);
    }

    #[test]
    fn test_parse_wrong_field_count() {
        let err = parse_line("dune,alice").unwrap_err();
        assert_eq!(
            err,
            RowParseError::FieldCount {
                line: "dune,alice".to_string(),
                found: 2
            }
        );

        let err = parse_line("dune,alice,5,extra").unwrap_err();
        assert!(matches!(err, RowParseError::FieldCount { found: 4, .. }));
        assert_eq!(err.line(), "dune,alice,5,extra");
    }

    #[test]
    fn test_parse_rejects_non_numeric_rating() {
        let err = parse_line("dune,alice,great").unwrap_err();
        assert!(matches!(err, RowParseError::InvalidRating { ref value, .. } if value == "great"));

        assert!(parse_line("dune,alice,NaN").is_err());
        assert!(parse_line("dune,alice,").is_err());
    }

    #[test]
    fn test_parse_does_not_validate_range() {
        let record = parse_line("dune,alice,11").unwrap();
        assert_eq!(record.rating, 11.0);
    }
}
