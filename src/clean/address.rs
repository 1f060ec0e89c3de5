//! Purchase address parsing.
//!
//! Addresses are expected as `"<street>, <city>, <state> <zip>, <country>"`.

use crate::error::AddressError;

/// The parts of a purchase address used downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address<'a> {
    pub city: &'a str,
    pub state: &'a str,
}

impl<'a> Address<'a> {
    /// Parse a free-text address.
    pub fn parse(raw: &'a str) -> Result<Self, AddressError> {
        let segments: Vec<&str> = raw.split(',').collect();
        if segments.len() < 3 {
            return Err(AddressError::TooFewSegments(segments.len()));
        }

        let city = segments[1].trim();
        if city.is_empty() {
            return Err(AddressError::MissingCity);
        }

        let state = segments[2]
            .split_whitespace()
            .next()
            .ok_or(AddressError::MissingState)?;

        Ok(Self { city, state })
    }

    /// Label used for city grouping, e.g. `"Dallas (TX)"`.
    pub fn city_label(&self) -> String {
        format!("{} ({})", self.city, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_address() {
        let address = Address::parse("917 1st St, Dallas, TX 75001, USA").unwrap();
        assert_eq!(address, Address { city: "Dallas", state: "TX" });
        assert_eq!(address.city_label(), "Dallas (TX)");

        // Zip and country are optional
        let short = Address::parse("917 1st St, Dallas, TX").unwrap();
        assert_eq!(short.city_label(), "Dallas (TX)");
    }

    #[test]
    fn test_same_city_name_in_different_states() {
        let oregon = Address::parse("1 A St, Portland, OR 97035, USA").unwrap();
        let maine = Address::parse("2 B St, Portland, ME 04101, USA").unwrap();
        assert_ne!(oregon.city_label(), maine.city_label());
    }

    #[test]
    fn test_multi_word_city() {
        let address = Address::parse("669 Spruce St, Los Angeles, CA 90001, USA").unwrap();
        assert_eq!(address.city_label(), "Los Angeles (CA)");
    }

    #[test]
    fn test_malformed_addresses() {
        assert_eq!(
            Address::parse("no commas here"),
            Err(AddressError::TooFewSegments(1))
        );
        assert_eq!(
            Address::parse("1 Main St, , TX 75001, USA"),
            Err(AddressError::MissingCity)
        );
        assert_eq!(
            Address::parse("1 Main St, Dallas,   , USA"),
            Err(AddressError::MissingState)
        );
    }
}
