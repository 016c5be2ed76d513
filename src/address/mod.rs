pub mod tagger;

use crate::error::{AddressParseError, SchemaError, TaggerError};
use crate::schema::{Field, Row};

pub use tagger::{AddressLabel, HeuristicTagger};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub text: String,
    pub label: AddressLabel,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, label: AddressLabel) -> Self {
        TaggedToken {
            text: text.into(),
            label,
        }
    }
}

/// Free text in, `(substring, label)` pairs out.
pub trait AddressTagger: Send + Sync {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError>;
}

/// District office address as a single line. Empty lines still contribute
/// their separator.
pub fn join_address_lines(row: &Row) -> Result<String, SchemaError> {
    let street = row.get(Field::DistrictAddress1)?;
    let line_2 = row.get(Field::DistrictAddress2)?;
    let line_3 = row.get(Field::DistrictAddress3)?;
    Ok(format!("{street} {line_2} {line_3}"))
}

pub fn extract_postal_code(
    tagger: &dyn AddressTagger,
    address: &str,
) -> Result<Option<String>, AddressParseError> {
    let tokens = tagger.tag(address).map_err(|source| AddressParseError {
        address: address.to_string(),
        source,
    })?;
    Ok(first_with_label(&tokens, AddressLabel::ZipCode))
}

fn first_with_label(tokens: &[TaggedToken], label: AddressLabel) -> Option<String> {
    tokens
        .iter()
        .find(|t| t.label == label)
        .map(|t| tagger::clean_token(&t.text).to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tests::jane_doe;

    struct FailingTagger;

    impl AddressTagger for FailingTagger {
        fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError> {
            Err(TaggerError::TooManyTokens {
                count: text.len(),
                limit: 0,
            })
        }
    }

    struct FixedTagger(Vec<TaggedToken>);

    impl AddressTagger for FixedTagger {
        fn tag(&self, _text: &str) -> Result<Vec<TaggedToken>, TaggerError> {
            Ok(self.0.clone())
        }
    }

    fn with_lines(a: &str, b: &str, c: &str) -> Row {
        let mut fields: Vec<String> = (0..Field::COUNT).map(|_| String::new()).collect();
        fields[Field::DistrictAddress1.index()] = a.to_string();
        fields[Field::DistrictAddress2.index()] = b.to_string();
        fields[Field::DistrictAddress3.index()] = c.to_string();
        Row::new(1, fields)
    }

    #[test]
    fn joins_three_lines_with_single_spaces() {
        assert_eq!(
            join_address_lines(&jane_doe()).unwrap(),
            "123 Main St Suite 4 Springfield, NY 12345"
        );
        assert_eq!(
            join_address_lines(&with_lines("123 Main St", "", "Springfield, NY 12345")).unwrap(),
            "123 Main St  Springfield, NY 12345"
        );
        assert_eq!(join_address_lines(&with_lines("", "", "")).unwrap(), "  ");
    }

    #[test]
    fn join_distinguishes_moved_lines() {
        let a = join_address_lines(&with_lines("1 A St", "", "X, NY 10001")).unwrap();
        let b = join_address_lines(&with_lines("1 A St", "X, NY 10001", "")).unwrap();
        let c = join_address_lines(&with_lines("1 A St", "", "X, NY 10001")).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn join_fails_on_short_row() {
        let row = Row::from_strs(3, &["NY", "Jane", "Doe", "Jane", "D", "1 Main St"]);
        assert!(matches!(
            join_address_lines(&row),
            Err(SchemaError::RowTooShort {
                field: Field::DistrictAddress2,
                ..
            })
        ));
    }

    #[test]
    fn extracts_zip_with_default_tagger() {
        let tagger = HeuristicTagger::default();
        let text = join_address_lines(&jane_doe()).unwrap();
        assert_eq!(
            extract_postal_code(&tagger, &text).unwrap().as_deref(),
            Some("12345")
        );
        assert_eq!(extract_postal_code(&tagger, "Hart Senate Office Building").unwrap(), None);
        assert_eq!(extract_postal_code(&tagger, "").unwrap(), None);
    }

    #[test]
    fn tagger_failure_is_distinct_from_no_code() {
        let err = extract_postal_code(&FailingTagger, "123 Main St").unwrap_err();
        assert_eq!(err.address, "123 Main St");
        assert!(matches!(err.source, TaggerError::TooManyTokens { .. }));
    }

    #[test]
    fn selects_first_zip_label_only() {
        let tagger = FixedTagger(vec![
            TaggedToken::new("Springfield,", AddressLabel::PlaceName),
            TaggedToken::new("12345,", AddressLabel::ZipCode),
            TaggedToken::new("99999", AddressLabel::ZipCode),
        ]);
        assert_eq!(
            extract_postal_code(&tagger, "ignored").unwrap().as_deref(),
            Some("12345")
        );
    }
}
