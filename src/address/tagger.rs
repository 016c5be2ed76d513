use itertools::Itertools;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use super::{AddressTagger, TaggedToken};
use crate::error::TaggerError;

static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+[A-Z]?|\d+-\d+|\d+/\d+)$").unwrap());

pub const DEFAULT_MAX_TOKENS: usize = 64;

const DIRECTIONALS: &[&str] = &[
    "N", "S", "E", "W", "NE", "NW", "SE", "SW", "NORTH", "SOUTH", "EAST", "WEST", "NORTHEAST",
    "NORTHWEST", "SOUTHEAST", "SOUTHWEST",
];

const STREET_TYPES: &[&str] = &[
    "ST", "STREET", "AVE", "AV", "AVENUE", "BLVD", "BOULEVARD", "RD", "ROAD", "DR", "DRIVE", "LN",
    "LANE", "CT", "COURT", "PL", "PLACE", "PKWY", "PARKWAY", "HWY", "HIGHWAY", "WAY", "TER",
    "TERRACE", "CIR", "CIRCLE", "SQ", "SQUARE", "PLZ", "PLAZA", "TRL", "TRAIL", "PIKE", "ROW",
    "LOOP", "ALY", "ALLEY", "CTR", "CENTER", "MALL", "EXPY", "EXPRESSWAY", "FWY", "FREEWAY",
];

const OCCUPANCY_TYPES: &[&str] = &[
    "SUITE", "STE", "ROOM", "RM", "APT", "APARTMENT", "UNIT", "FLOOR", "FL", "BLDG", "#",
];

const STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "PR", "GU", "VI", "AS", "MP",
];

const STATE_NAMES: &[&str] = &[
    "ALABAMA",
    "ALASKA",
    "ARIZONA",
    "ARKANSAS",
    "CALIFORNIA",
    "COLORADO",
    "CONNECTICUT",
    "DELAWARE",
    "FLORIDA",
    "GEORGIA",
    "HAWAII",
    "IDAHO",
    "ILLINOIS",
    "INDIANA",
    "IOWA",
    "KANSAS",
    "KENTUCKY",
    "LOUISIANA",
    "MAINE",
    "MARYLAND",
    "MASSACHUSETTS",
    "MICHIGAN",
    "MINNESOTA",
    "MISSISSIPPI",
    "MISSOURI",
    "MONTANA",
    "NEBRASKA",
    "NEVADA",
    "NEW HAMPSHIRE",
    "NEW JERSEY",
    "NEW MEXICO",
    "NEW YORK",
    "NORTH CAROLINA",
    "NORTH DAKOTA",
    "OHIO",
    "OKLAHOMA",
    "OREGON",
    "PENNSYLVANIA",
    "RHODE ISLAND",
    "SOUTH CAROLINA",
    "SOUTH DAKOTA",
    "TENNESSEE",
    "TEXAS",
    "UTAH",
    "VERMONT",
    "VIRGINIA",
    "WASHINGTON",
    "WEST VIRGINIA",
    "WISCONSIN",
    "WYOMING",
    "DISTRICT OF COLUMBIA",
    "PUERTO RICO",
];

const COUNTRY_TOKENS: &[&str] = &["USA", "US"];

/// Component labels, named the way usaddress names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressLabel {
    AddressNumber,
    StreetNamePreDirectional,
    StreetName,
    StreetNamePostType,
    StreetNamePostDirectional,
    OccupancyType,
    OccupancyIdentifier,
    UspsBoxType,
    UspsBoxId,
    BuildingName,
    PlaceName,
    StateName,
    ZipCode,
    CountryName,
    NotAddress,
}

impl AddressLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressLabel::AddressNumber => "AddressNumber",
            AddressLabel::StreetNamePreDirectional => "StreetNamePreDirectional",
            AddressLabel::StreetName => "StreetName",
            AddressLabel::StreetNamePostType => "StreetNamePostType",
            AddressLabel::StreetNamePostDirectional => "StreetNamePostDirectional",
            AddressLabel::OccupancyType => "OccupancyType",
            AddressLabel::OccupancyIdentifier => "OccupancyIdentifier",
            AddressLabel::UspsBoxType => "USPSBoxType",
            AddressLabel::UspsBoxId => "USPSBoxID",
            AddressLabel::BuildingName => "BuildingName",
            AddressLabel::PlaceName => "PlaceName",
            AddressLabel::StateName => "StateName",
            AddressLabel::ZipCode => "ZipCode",
            AddressLabel::CountryName => "CountryName",
            AddressLabel::NotAddress => "NotAddress",
        }
    }
}

impl fmt::Display for AddressLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strips the separators a token can carry from the surrounding text.
pub(crate) fn clean_token(token: &str) -> &str {
    token
        .trim_matches(|c: char| c == ',' || c == ';')
        .trim_end_matches('.')
}

fn key(token: &str) -> String {
    clean_token(token).replace('.', "").to_ascii_uppercase()
}

fn ends_with_comma(token: &str) -> bool {
    token.trim_end_matches('.').ends_with([',', ';'])
}

fn is_zip(key: &str) -> bool {
    ZIP_RE.is_match(key)
}

fn is_address_number(key: &str) -> bool {
    NUMBER_RE.is_match(key)
}

fn is_directional(key: &str) -> bool {
    DIRECTIONALS.contains(&key)
}

fn is_street_type(key: &str) -> bool {
    STREET_TYPES.contains(&key)
}

fn is_occupancy(key: &str) -> bool {
    OCCUPANCY_TYPES.contains(&key)
}

/// Rule-based US address segmenter. Reads the ZIP and state from the tail,
/// then the street from the head; whatever sits between is building or city.
#[derive(Debug, Clone)]
pub struct HeuristicTagger {
    max_tokens: usize,
}

impl Default for HeuristicTagger {
    fn default() -> Self {
        HeuristicTagger {
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl HeuristicTagger {
    pub fn with_max_tokens(max_tokens: usize) -> Self {
        HeuristicTagger { max_tokens }
    }
}

impl AddressTagger for HeuristicTagger {
    fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError> {
        if let Some(c) = text
            .chars()
            .find(|c| c.is_control() && !c.is_whitespace())
        {
            return Err(TaggerError::ControlCharacter(c));
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() > self.max_tokens {
            return Err(TaggerError::TooManyTokens {
                count: tokens.len(),
                limit: self.max_tokens,
            });
        }

        let mut pass = Segmenter::new(&tokens);
        pass.run();
        Ok(pass.finish())
    }
}

struct Segmenter<'a> {
    tokens: &'a [&'a str],
    keys: Vec<String>,
    labels: Vec<Option<AddressLabel>>,
}

impl<'a> Segmenter<'a> {
    fn new(tokens: &'a [&'a str]) -> Self {
        Segmenter {
            tokens,
            keys: tokens.iter().map(|t| key(t)).collect(),
            labels: vec![None; tokens.len()],
        }
    }

    fn run(&mut self) {
        if self.tokens.is_empty() {
            return;
        }
        let body_end = self.tag_tail();
        self.tag_head(body_end);
    }

    fn finish(self) -> Vec<TaggedToken> {
        self.tokens
            .iter()
            .zip(self.labels)
            .map(|(t, l)| TaggedToken::new(*t, l.unwrap_or(AddressLabel::NotAddress)))
            .collect()
    }

    fn set(&mut self, range: std::ops::Range<usize>, label: AddressLabel) {
        for i in range {
            self.labels[i] = Some(label);
        }
    }

    /// Country, ZIP and state. Returns the exclusive end of the street/city part.
    fn tag_tail(&mut self) -> usize {
        let mut end = self.tokens.len();
        while end > 1 && COUNTRY_TOKENS.contains(&self.keys[end - 1].as_str()) {
            end -= 1;
            self.labels[end] = Some(AddressLabel::CountryName);
        }

        let zip_at = if end >= 2 && is_zip(&self.keys[end - 1]) {
            Some(end - 1)
        } else {
            (1..end)
                .rev()
                .find(|&i| is_zip(&self.keys[i]) && self.state_ending_at(i - 1).is_some())
        };

        match zip_at {
            Some(z) => {
                self.labels[z] = Some(AddressLabel::ZipCode);
                for i in z + 1..end {
                    self.labels[i] = Some(AddressLabel::NotAddress);
                }
                match self.state_ending_at(z - 1) {
                    Some(start) => {
                        self.set(start..z, AddressLabel::StateName);
                        start
                    }
                    None => z,
                }
            }
            None => {
                // Without a ZIP only trust a state that follows a comma.
                match self.state_ending_at(end - 1) {
                    Some(start) if start > 0 && ends_with_comma(self.tokens[start - 1]) => {
                        self.set(start..end, AddressLabel::StateName);
                        start
                    }
                    _ => end,
                }
            }
        }
    }

    fn state_ending_at(&self, last: usize) -> Option<usize> {
        (1..=3).rev().find_map(|len| {
            let start = (last + 1).checked_sub(len)?;
            let words = self.keys[start..=last].iter().join(" ");
            let known = STATE_NAMES.contains(&words.as_str())
                || (len == 1 && STATE_CODES.contains(&words.as_str()));
            known.then_some(start)
        })
    }

    fn tag_head(&mut self, body_end: usize) {
        let mut i = 0;
        let mut has_street = false;

        if let Some(len) = self.po_box_len(body_end) {
            self.set(0..len, AddressLabel::UspsBoxType);
            i = len;
            if i < body_end {
                self.labels[i] = Some(AddressLabel::UspsBoxId);
                i += 1;
            }
            has_street = true;
        } else if body_end > 1 && is_address_number(&self.keys[0]) {
            self.labels[0] = Some(AddressLabel::AddressNumber);
            i = self.tag_street(1, body_end);
            has_street = true;
        }

        self.tag_remainder(i, body_end, has_street);
    }

    fn po_box_len(&self, body_end: usize) -> Option<usize> {
        let at = |i: usize| self.keys.get(i).filter(|_| i < body_end).map(String::as_str);
        match (at(0), at(1), at(2)) {
            (Some("POST"), Some("OFFICE"), Some("BOX")) => Some(3),
            (Some("PO"), Some("BOX"), _) => Some(2),
            (Some("POBOX" | "POB" | "BOX"), _, _) => Some(1),
            _ => None,
        }
    }

    /// Street after the address number. Returns the index after the street.
    fn tag_street(&mut self, mut i: usize, body_end: usize) -> usize {
        if i + 1 < body_end && is_directional(&self.keys[i]) && !is_street_type(&self.keys[i + 1]) {
            self.labels[i] = Some(AddressLabel::StreetNamePreDirectional);
            i += 1;
        }

        let name_start = i;
        let mut typed = false;
        let mut closed = false;
        while i < body_end {
            let k = self.keys[i].as_str();
            if i > name_start && is_street_type(k) {
                self.labels[i] = Some(AddressLabel::StreetNamePostType);
                closed = ends_with_comma(self.tokens[i]);
                i += 1;
                typed = true;
                break;
            }
            if i > name_start && is_occupancy(k) {
                break;
            }
            self.labels[i] = Some(AddressLabel::StreetName);
            closed = ends_with_comma(self.tokens[i]);
            i += 1;
            if closed {
                break;
            }
        }

        if typed && !closed && i < body_end && is_directional(&self.keys[i]) {
            self.labels[i] = Some(AddressLabel::StreetNamePostDirectional);
            i += 1;
        }

        // An untyped street that ran into the state swallowed the city.
        if !typed && !closed && i == body_end && i - name_start > 1 {
            self.labels[i - 1] = Some(AddressLabel::PlaceName);
        }
        i
    }

    fn tag_occupancy(&mut self, mut i: usize, end: usize) -> usize {
        while i < end {
            let k = self.keys[i].as_str();
            if k.len() > 1 && k.starts_with('#') {
                self.labels[i] = Some(AddressLabel::OccupancyIdentifier);
                i += 1;
            } else if is_occupancy(k) {
                self.labels[i] = Some(AddressLabel::OccupancyType);
                i += 1;
                if i < end {
                    self.labels[i] = Some(AddressLabel::OccupancyIdentifier);
                    i += 1;
                }
            } else {
                break;
            }
        }
        i
    }

    fn tag_remainder(&mut self, start: usize, end: usize, has_street: bool) {
        let mut i = self.tag_occupancy(start, end);
        if i >= end {
            return;
        }
        if self.labels[i..end].iter().all(Option::is_some) {
            return;
        }

        let last_comma = (i..end - 1).rev().find(|&k| ends_with_comma(self.tokens[k]));
        let place_start = match last_comma {
            Some(k) => k + 1,
            None if has_street => i,
            None => end - 1,
        };

        while i < place_start {
            let next = self.tag_occupancy(i, place_start);
            if next > i {
                i = next;
                continue;
            }
            if self.labels[i].is_none() {
                self.labels[i] = Some(AddressLabel::BuildingName);
            }
            i += 1;
        }
        for k in place_start..end {
            if self.labels[k].is_none() {
                self.labels[k] = Some(AddressLabel::PlaceName);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(text: &str) -> Vec<(String, &'static str)> {
        HeuristicTagger::default()
            .tag(text)
            .unwrap()
            .into_iter()
            .map(|t| (t.text, t.label.as_str()))
            .collect()
    }

    fn label_of(text: &str, token: &str) -> Option<&'static str> {
        labels(text)
            .into_iter()
            .find(|(t, _)| t == token)
            .map(|(_, l)| l)
    }

    #[test]
    fn segments_street_suite_city_state_zip() {
        let got = labels("123 Main St Suite 4 Springfield, NY 12345");
        let expected = [
            ("123", "AddressNumber"),
            ("Main", "StreetName"),
            ("St", "StreetNamePostType"),
            ("Suite", "OccupancyType"),
            ("4", "OccupancyIdentifier"),
            ("Springfield,", "PlaceName"),
            ("NY", "StateName"),
            ("12345", "ZipCode"),
        ];
        assert_eq!(got.len(), expected.len());
        for ((t, l), (et, el)) in got.iter().zip(expected) {
            assert_eq!((t.as_str(), *l), (et, el));
        }
    }

    #[test]
    fn handles_directionals_and_zip_plus_four() {
        let text = "400 N Capitol St NW Suite 300 Washington, DC 20001-1234";
        assert_eq!(label_of(text, "N"), Some("StreetNamePreDirectional"));
        assert_eq!(label_of(text, "Capitol"), Some("StreetName"));
        assert_eq!(label_of(text, "NW"), Some("StreetNamePostDirectional"));
        assert_eq!(label_of(text, "Washington,"), Some("PlaceName"));
        assert_eq!(label_of(text, "DC"), Some("StateName"));
        assert_eq!(label_of(text, "20001-1234"), Some("ZipCode"));
    }

    #[test]
    fn tolerates_extra_whitespace_and_missing_line() {
        let text = "  123 Main St    Springfield,   NY   12345 ";
        assert_eq!(label_of(text, "12345"), Some("ZipCode"));
        assert_eq!(label_of(text, "Springfield,"), Some("PlaceName"));
    }

    #[test]
    fn full_state_names_and_trailing_country() {
        let text = "200 Oak Ave Charleston, West Virginia 25301 USA";
        assert_eq!(label_of(text, "West"), Some("StateName"));
        assert_eq!(label_of(text, "Virginia"), Some("StateName"));
        assert_eq!(label_of(text, "25301"), Some("ZipCode"));
        assert_eq!(label_of(text, "USA"), Some("CountryName"));
    }

    #[test]
    fn po_box_and_building_without_number() {
        let text = "PO Box 100 Anytown, TX 75001";
        assert_eq!(label_of(text, "PO"), Some("USPSBoxType"));
        assert_eq!(label_of(text, "100"), Some("USPSBoxID"));
        assert_eq!(label_of(text, "75001"), Some("ZipCode"));

        let text = "Room 316 Hart Senate Office Building, Washington, DC 20510";
        assert_eq!(label_of(text, "Room"), Some("OccupancyType"));
        assert_eq!(label_of(text, "316"), Some("OccupancyIdentifier"));
        assert_eq!(label_of(text, "Hart"), Some("BuildingName"));
        assert_eq!(label_of(text, "Washington,"), Some("PlaceName"));
        assert_eq!(label_of(text, "20510"), Some("ZipCode"));
    }

    #[test]
    fn leading_number_is_never_the_zip() {
        assert_eq!(label_of("12345 Main St", "12345"), Some("AddressNumber"));
        assert!(labels("12345").iter().all(|(_, l)| *l != "ZipCode"));
    }

    #[test]
    fn zip_followed_by_noise_needs_a_state() {
        let text = "1 Elm St Dover, DE 19901 (Main Office)";
        assert_eq!(label_of(text, "19901"), Some("ZipCode"));
        assert_eq!(label_of(text, "Office)"), Some("NotAddress"));

        let text = "1 Elm St Unit 19901 Main";
        assert!(labels(text).iter().all(|(_, l)| *l != "ZipCode"));
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(labels("").is_empty());
        assert!(labels("   ").is_empty());
    }

    #[test]
    fn rejects_control_characters_and_long_input() {
        let err = HeuristicTagger::default().tag("123 Main\u{7} St").unwrap_err();
        assert_eq!(err, TaggerError::ControlCharacter('\u{7}'));

        let err = HeuristicTagger::with_max_tokens(3).tag("1 2 3 4").unwrap_err();
        assert_eq!(err, TaggerError::TooManyTokens { count: 4, limit: 3 });
    }
}
