use std::fmt;

use crate::error::SchemaError;

/// Columns of the roster CSV, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    State,
    Full,
    LastName,
    FirstName,
    Party,
    DistrictAddress1,
    DistrictAddress2,
    DistrictAddress3,
    DistrictTel,
    DcOfficeAddress,
    DcTel,
    Email,
    Website,
    Class,
    BioguideId,
    Photo,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::State,
        Field::Full,
        Field::LastName,
        Field::FirstName,
        Field::Party,
        Field::DistrictAddress1,
        Field::DistrictAddress2,
        Field::DistrictAddress3,
        Field::DistrictTel,
        Field::DcOfficeAddress,
        Field::DcTel,
        Field::Email,
        Field::Website,
        Field::Class,
        Field::BioguideId,
        Field::Photo,
    ];

    pub const COUNT: usize = Field::ALL.len();

    pub const fn index(self) -> usize {
        match self {
            Field::State => 0,
            Field::Full => 1,
            Field::LastName => 2,
            Field::FirstName => 3,
            Field::Party => 4,
            Field::DistrictAddress1 => 5,
            Field::DistrictAddress2 => 6,
            Field::DistrictAddress3 => 7,
            Field::DistrictTel => 8,
            Field::DcOfficeAddress => 9,
            Field::DcTel => 10,
            Field::Email => 11,
            Field::Website => 12,
            Field::Class => 13,
            Field::BioguideId => 14,
            Field::Photo => 15,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Field::State => "state",
            Field::Full => "full",
            Field::LastName => "last_name",
            Field::FirstName => "first_name",
            Field::Party => "party",
            Field::DistrictAddress1 => "district_address_1",
            Field::DistrictAddress2 => "district_address_2",
            Field::DistrictAddress3 => "district_address_3",
            Field::DistrictTel => "district_tel",
            Field::DcOfficeAddress => "dc_office_address",
            Field::DcTel => "dc_tel",
            Field::Email => "email",
            Field::Website => "website",
            Field::Class => "class",
            Field::BioguideId => "bioguide_id",
            Field::Photo => "photo",
        }
    }

    pub fn from_name(name: &str) -> Result<Field, SchemaError> {
        Field::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One roster record as read from the source, plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    line: usize,
    fields: Vec<String>,
}

impl Row {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Row { line, fields }
    }

    pub fn from_strs(line: usize, fields: &[&str]) -> Self {
        Row::new(line, fields.iter().map(|f| f.to_string()).collect())
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: Field) -> Result<&str, SchemaError> {
        let index = field.index();
        self.fields
            .get(index)
            .map(String::as_str)
            .ok_or(SchemaError::RowTooShort {
                line: self.line,
                field,
                index,
                len: self.fields.len(),
            })
    }

    pub fn get_named(&self, name: &str) -> Result<&str, SchemaError> {
        self.get(Field::from_name(name)?)
    }

    /// Fails unless the row covers the whole schema.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.get(Field::ALL[Field::COUNT - 1]).map(|_| ())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn jane_doe() -> Row {
        Row::from_strs(
            2,
            &[
                "NY",
                "Jane Q. Doe",
                "Doe",
                "Jane",
                "D",
                "123 Main St",
                "Suite 4",
                "Springfield, NY 12345",
                "555-1234",
                "...",
                "555-5678",
                "jane@example.gov",
                "http://jane.senate.gov",
                "I",
                "D000123",
                "photo.jpg",
            ],
        )
    }

    #[test]
    fn indices_follow_declaration_order() {
        for (pos, field) in Field::ALL.iter().enumerate() {
            assert_eq!(field.index(), pos);
        }
    }

    #[test]
    fn lookup_by_field_and_name() {
        let row = jane_doe();
        assert_eq!(row.get(Field::FirstName).unwrap(), "Jane");
        assert_eq!(row.get(Field::DistrictTel).unwrap(), "555-1234");
        assert_eq!(row.get_named("bioguide_id").unwrap(), "D000123");
        assert_eq!(Field::from_name("photo").unwrap(), Field::Photo);
    }

    #[test]
    fn unknown_name_is_a_schema_error() {
        let err = jane_doe().get_named("middle_name").unwrap_err();
        assert_eq!(err, SchemaError::UnknownField("middle_name".into()));
    }

    #[test]
    fn short_row_reports_missing_field() {
        let row = Row::from_strs(7, &["NY", "Jane Q. Doe", "Doe"]);
        assert_eq!(row.get(Field::LastName).unwrap(), "Doe");
        match row.get(Field::Party) {
            Err(SchemaError::RowTooShort {
                line,
                field,
                index,
                len,
            }) => {
                assert_eq!(line, 7);
                assert_eq!(field, Field::Party);
                assert_eq!(index, 4);
                assert_eq!(len, 3);
            }
            other => panic!("expected RowTooShort, got {other:?}"),
        }
        assert!(row.validate().is_err());
        assert!(jane_doe().validate().is_ok());
    }
}
