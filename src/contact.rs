use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").unwrap());

/// Syntactic email check. Accepts some bogus TLDs and rejects some legal
/// addresses (quoted local parts, IP literals, non-ASCII mailboxes).
pub fn is_email(text: &str) -> bool {
    EMAIL_RE.is_match(text)
}

/// The roster's "email" column holds either an address or a contact-form URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactChannel {
    Email(String),
    Url(String),
}

impl ContactChannel {
    pub fn classify(value: &str) -> ContactChannel {
        if is_email(value) {
            ContactChannel::Email(value.to_string())
        } else {
            ContactChannel::Url(value.to_string())
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ContactChannel::Email(v) | ContactChannel::Url(v) => v,
        }
    }

    /// vCard TYPE parameter for this channel.
    pub fn type_label(&self) -> &'static str {
        match self {
            ContactChannel::Email(_) => "INTERNET",
            ContactChannel::Url(_) => "Contact",
        }
    }

    pub fn is_email(&self) -> bool {
        matches!(self, ContactChannel::Email(_))
    }
}
