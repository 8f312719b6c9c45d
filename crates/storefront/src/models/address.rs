//! Customer address book.

use serde::{Deserialize, Serialize};

use ebookstore_core::{AddressId, County, UserId};

/// A saved address belonging to one user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub name: String,
    pub address: String,
    pub town: String,
    pub county: County,
}

/// Submitted address form.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressForm {
    pub name: String,
    pub address: String,
    pub town: String,
    pub county: String,
}

impl From<&Address> for AddressForm {
    fn from(address: &Address) -> Self {
        Self {
            name: address.name.clone(),
            address: address.address.clone(),
            town: address.town.clone(),
            county: address.county.code().to_string(),
        }
    }
}

/// A validated address ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInput {
    pub name: String,
    pub address: String,
    pub town: String,
    pub county: County,
}

/// Maximum field lengths, matching the table definition.
const NAME_MAX: usize = 35;
const ADDRESS_MAX: usize = 60;
const TOWN_MAX: usize = 35;

impl AddressForm {
    /// Trim and validate the form.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid field.
    pub fn validate(&self) -> Result<AddressInput, Vec<String>> {
        let mut errors = Vec::new();

        let name = required(&self.name, "Name", NAME_MAX, &mut errors);
        let address = required(&self.address, "Address", ADDRESS_MAX, &mut errors);
        let town = required(&self.town, "Town", TOWN_MAX, &mut errors);
        let county = match County::from_code(&self.county) {
            Ok(county) => Some(county),
            Err(_) => {
                errors.push("Select a county".to_string());
                None
            }
        };

        match county {
            Some(county) if errors.is_empty() => Ok(AddressInput {
                name,
                address,
                town,
                county,
            }),
            _ => Err(errors),
        }
    }
}

fn required(value: &str, label: &str, max: usize, errors: &mut Vec<String>) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.push(format!("{label} is required"));
    } else if value.chars().count() > max {
        errors.push(format!("{label} must be at most {max} characters"));
    }
    value.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, county: &str) -> AddressForm {
        AddressForm {
            name: name.to_string(),
            address: "Moi Avenue 12".to_string(),
            town: "Nairobi".to_string(),
            county: county.to_string(),
        }
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let input = form("  Achieng Otieno ", "nrb").validate().unwrap();
        assert_eq!(input.name, "Achieng Otieno");
        assert_eq!(input.county, County::Nairobi);
    }

    #[test]
    fn test_unknown_county_rejected() {
        let errors = form("Achieng", "xyz").validate().unwrap_err();
        assert_eq!(errors, vec!["Select a county".to_string()]);
    }

    #[test]
    fn test_errors_are_collected() {
        let errors = form("", "").validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_name_length_limit() {
        let errors = form(&"a".repeat(36), "ksm").validate().unwrap_err();
        assert_eq!(errors, vec!["Name must be at most 35 characters".to_string()]);
    }
}
