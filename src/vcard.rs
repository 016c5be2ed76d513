use uuid::Uuid;

use crate::contact::ContactChannel;
use crate::party::Party;

pub const PHONE_LABEL: &str = "District Office";
pub const WEBSITE_LABEL: &str = "Website";
pub const ADDRESS_LABEL: &str = "District Office Address";

const FOLD_WIDTH: usize = 75;

/// One official's contact card. Built by [`crate::builder::build_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    family: String,
    given: String,
    channel: ContactChannel,
    phone: String,
    party: Party,
    website: String,
    street: String,
    uid: Uuid,
}

impl ContactRecord {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        family: String,
        given: String,
        channel: ContactChannel,
        phone: String,
        party: Party,
        website: String,
        street: String,
        uid: Uuid,
    ) -> Self {
        ContactRecord {
            family,
            given,
            channel,
            phone,
            party,
            website,
            street,
            uid,
        }
    }

    pub fn family_name(&self) -> &str {
        &self.family
    }

    pub fn given_name(&self) -> &str {
        &self.given
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.given, self.family)
    }

    pub fn channel(&self) -> &ContactChannel {
        &self.channel
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn note(&self) -> &'static str {
        self.party.display_name()
    }

    pub fn website(&self) -> &str {
        &self.website
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn uid(&self) -> String {
        format!("urn:uuid:{}", self.uid)
    }

    /// Everything but the UID matches.
    pub fn same_contact(&self, other: &ContactRecord) -> bool {
        self.family == other.family
            && self.given == other.given
            && self.channel == other.channel
            && self.phone == other.phone
            && self.party == other.party
            && self.website == other.website
            && self.street == other.street
    }

    /// vCard 3.0 text, CRLF terminated, properties in name order.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, "BEGIN:VCARD");
        push_line(&mut out, "VERSION:3.0");

        let adr = ["", "", self.street.as_str(), "", "", "", ""]
            .iter()
            .map(|c| escape_text(c))
            .collect::<Vec<_>>()
            .join(";");
        push_property(&mut out, "ADR", Some(ADDRESS_LABEL), &adr);

        if let ContactChannel::Email(addr) = &self.channel {
            push_property(&mut out, "EMAIL", Some(self.channel.type_label()), addr);
        }

        push_property(&mut out, "FN", None, &escape_text(&self.full_name()));

        let n = format!(
            "{};{};;;",
            escape_text(&self.family),
            escape_text(&self.given)
        );
        push_property(&mut out, "N", None, &n);
        push_property(&mut out, "NOTE", None, &escape_text(self.note()));
        push_property(&mut out, "TEL", Some(PHONE_LABEL), &self.phone);
        push_property(&mut out, "UID", None, &self.uid());

        if let ContactChannel::Url(url) = &self.channel {
            push_property(&mut out, "URL", Some(self.channel.type_label()), url);
        }
        push_property(&mut out, "URL", Some(WEBSITE_LABEL), &self.website);

        push_line(&mut out, "END:VCARD");
        out
    }
}

fn push_property(out: &mut String, name: &str, type_param: Option<&str>, value: &str) {
    let line = match type_param {
        Some(t) => format!("{name};TYPE={}:{value}", quote_param(t)),
        None => format!("{name}:{value}"),
    };
    push_line(out, &line);
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold(line));
    out.push_str("\r\n");
}

fn quote_param(value: &str) -> String {
    if value.contains([',', ';', ':']) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Splits a content line into 75-octet chunks on char boundaries.
fn fold(line: &str) -> String {
    if line.len() <= FOLD_WIDTH {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / FOLD_WIDTH * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > FOLD_WIDTH {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}
