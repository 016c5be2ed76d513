use tracing::debug;
use uuid::Uuid;

use crate::address::join_address_lines;
use crate::contact::ContactChannel;
use crate::error::RecordBuildError;
use crate::party::Party;
use crate::schema::{Field, Row};
use crate::vcard::ContactRecord;

pub fn build_record(row: &Row) -> Result<ContactRecord, RecordBuildError> {
    let street = join_address_lines(row)?;
    build_record_with_street(row, street)
}

/// Same as [`build_record`] for callers that already joined the address lines.
pub fn build_record_with_street(
    row: &Row,
    street: String,
) -> Result<ContactRecord, RecordBuildError> {
    row.validate()?;
    let first = row.get(Field::FirstName)?;
    let last = row.get(Field::LastName)?;
    let channel = ContactChannel::classify(row.get(Field::Email)?);
    let phone = row.get(Field::DistrictTel)?;
    let party = Party::from_code(row.get(Field::Party)?).map_err(|source| {
        RecordBuildError::UnknownParty {
            line: row.line(),
            source,
        }
    })?;
    let website = row.get(Field::Website)?;

    debug!(
        line = row.line(),
        name = %format!("{first} {last}"),
        email = channel.is_email(),
        party = party.code(),
        "built contact"
    );

    Ok(ContactRecord::new(
        last.to_string(),
        first.to_string(),
        channel,
        phone.to_string(),
        party,
        website.to_string(),
        street,
        Uuid::new_v4(),
    ))
}
