use std::fmt;
use std::str::FromStr;

use crate::error::PartyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    Republican,
    Democrat,
    Independent,
}

impl Party {
    pub fn from_code(code: &str) -> Result<Party, PartyError> {
        match code {
            "R" => Ok(Party::Republican),
            "D" => Ok(Party::Democrat),
            "I" => Ok(Party::Independent),
            other => Err(PartyError(other.to_string())),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Party::Republican => "R",
            Party::Democrat => "D",
            Party::Independent => "I",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Party::Republican => "Republican",
            Party::Democrat => "Democrat",
            Party::Independent => "Independent",
        }
    }
}

impl FromStr for Party {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Party::from_code(s)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_display_names() {
        assert_eq!(Party::from_code("R").unwrap().display_name(), "Republican");
        assert_eq!(Party::from_code("D").unwrap().display_name(), "Democrat");
        assert_eq!(Party::from_code("I").unwrap().display_name(), "Independent");
        assert_eq!("D".parse::<Party>().unwrap().code(), "D");
    }

    #[test]
    fn other_codes_are_rejected() {
        for code in ["", "r", "G", "Democrat", " D"] {
            assert_eq!(Party::from_code(code), Err(PartyError(code.to_string())));
        }
    }
}
