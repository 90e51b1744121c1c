use std::fmt;

use crate::errors::AutomationError;

/// A Danish CPR number as entered by the operator: six digits, an optional
/// hyphen, four digits. The entered form drives the patient search and the
/// result-list match; the hyphen-stripped form names the patient tab and the
/// archive lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpr(String);

impl Cpr {
    pub fn new(input: &str) -> Result<Self, AutomationError> {
        let trimmed = input.trim();
        let digits: Vec<char> = trimmed.chars().filter(|c| *c != '-').collect();
        let well_formed = digits.len() == 10
            && digits.iter().all(|c| c.is_ascii_digit())
            && match trimmed.find('-') {
                Some(position) => position == 6 && trimmed.matches('-').count() == 1,
                None => true,
            };
        if !well_formed {
            return Err(AutomationError::InvalidArgument(format!(
                "not a valid CPR number: '{input}'"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The identifier exactly as entered, hyphen included if one was typed.
    pub fn as_entered(&self) -> &str {
        &self.0
    }

    /// The ten digits with any hyphen stripped.
    pub fn digits(&self) -> String {
        self.0.replace('-', "")
    }
}

impl fmt::Display for Cpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hyphenated_form() {
        let cpr = Cpr::new("010101-0101").unwrap();
        assert_eq!(cpr.as_entered(), "010101-0101");
        assert_eq!(cpr.digits(), "0101010101");
    }

    #[test]
    fn accepts_plain_ten_digits() {
        let cpr = Cpr::new("0101010101").unwrap();
        assert_eq!(cpr.as_entered(), "0101010101");
        assert_eq!(cpr.digits(), "0101010101");
    }

    #[test]
    fn rejects_empty_short_and_misplaced_hyphen() {
        for bad in ["", "01010", "0101010-101", "01010a0101", "010101--101"] {
            let err = Cpr::new(bad).unwrap_err();
            assert!(matches!(err, AutomationError::InvalidArgument(_)), "{bad}");
        }
    }
}
