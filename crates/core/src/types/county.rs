//! Counties the store ships to.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned for an unrecognised county code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown county code: {0}")]
pub struct CountyError(String);

/// A shipping county, stored by its three-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum County {
    Kisumu,
    Nairobi,
    Mombasa,
    Nakuru,
    Migori,
}

impl County {
    /// Every supported county, in display order.
    pub const ALL: [Self; 5] = [
        Self::Kisumu,
        Self::Nairobi,
        Self::Mombasa,
        Self::Nakuru,
        Self::Migori,
    ];

    /// Three-letter storage code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Kisumu => "ksm",
            Self::Nairobi => "nrb",
            Self::Mombasa => "mbm",
            Self::Nakuru => "nkr",
            Self::Migori => "mig",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Kisumu => "Kisumu",
            Self::Nairobi => "Nairobi",
            Self::Mombasa => "Mombasa",
            Self::Nakuru => "Nakuru",
            Self::Migori => "Migori",
        }
    }

    /// Look a county up by its code.
    ///
    /// # Errors
    ///
    /// Returns [`CountyError`] if `code` is not one of the five known codes.
    pub fn from_code(code: &str) -> Result<Self, CountyError> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| CountyError(code.to_owned()))
    }
}

impl fmt::Display for County {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for County {
    type Err = CountyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl TryFrom<String> for County {
    type Error = CountyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_code(&value)
    }
}

impl From<County> for String {
    fn from(county: County) -> Self {
        county.code().to_owned()
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for County {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for County {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::from_code(s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for County {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(County::from_code("nrb"), Ok(County::Nairobi));
        assert_eq!(County::from_code(" MBM "), Ok(County::Mombasa));
        assert!(County::from_code("xyz").is_err());
    }

    #[test]
    fn test_every_code_roundtrips() {
        for county in County::ALL {
            assert_eq!(County::from_code(county.code()), Ok(county));
        }
    }

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&County::Kisumu).unwrap();
        assert_eq!(json, "\"ksm\"");
        assert_eq!(County::Kisumu.to_string(), "Kisumu");
    }
}
