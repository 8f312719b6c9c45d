//! Status enums for baskets, orders and order lines, plus staff groups.
//!
//! Statuses are stored as `SMALLINT` and serialized as their integer code,
//! which is also what the REST API exposes.

use serde::{Deserialize, Serialize};

/// Error returned when an integer or string does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownStatus {
    kind: &'static str,
    value: String,
}

impl UnknownStatus {
    fn new(kind: &'static str, value: impl ToString) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Implements the integer conversions shared by every status enum.
macro_rules! status_codes {
    ($name:ident, $kind:literal, { $($variant:ident = $code:literal => $label:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in code order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Integer code stored in the database.
            #[must_use]
            pub const fn code(self) -> i16 {
                self as i16
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl TryFrom<i16> for $name {
            type Error = UnknownStatus;

            fn try_from(code: i16) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(UnknownStatus::new($kind, code)),
                }
            }
        }

        impl From<$name> for i16 {
            fn from(status: $name) -> Self {
                status.code()
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let code = s
                    .trim()
                    .parse::<i16>()
                    .map_err(|_| UnknownStatus::new($kind, s))?;
                Self::try_from(code)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

/// Basket lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum BasketStatus {
    #[default]
    Open = 0,
    Submitted = 1,
}

status_codes!(BasketStatus, "basket status", {
    Open = 0 => "Open",
    Submitted = 1 => "Submitted",
});

/// Order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum OrderStatus {
    #[default]
    New = 1,
    Paid = 2,
    Done = 3,
}

status_codes!(OrderStatus, "order status", {
    New = 1 => "New",
    Paid = 2 => "Paid",
    Done = 3 => "Done",
});

/// Per-unit fulfillment status of an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum OrderLineStatus {
    #[default]
    New = 1,
    Processing = 2,
    Sent = 3,
    Cancelled = 4,
}

status_codes!(OrderLineStatus, "order line status", {
    New = 1 => "New",
    Processing = 2 => "Processing",
    Sent = 3 => "Sent",
    Cancelled = 4 => "Cancelled",
});

/// Permission groups that staff accounts can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffGroup {
    /// Customer service and central office staff.
    Employees,
    /// Warehouse staff who ship paid orders.
    Dispatchers,
}

impl StaffGroup {
    /// Group name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employees => "Employees",
            Self::Dispatchers => "Dispatchers",
        }
    }
}

impl std::fmt::Display for StaffGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StaffGroup {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employees" | "employee" => Ok(Self::Employees),
            "dispatchers" | "dispatcher" => Ok(Self::Dispatchers),
            _ => Err(UnknownStatus::new("staff group", s)),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for StaffGroup {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for StaffGroup {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for StaffGroup {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_storage() {
        assert_eq!(BasketStatus::Open.code(), 0);
        assert_eq!(BasketStatus::Submitted.code(), 1);
        assert_eq!(OrderStatus::Paid.code(), 2);
        assert_eq!(OrderLineStatus::Cancelled.code(), 4);
    }

    #[test]
    fn test_try_from_unknown_code() {
        assert_eq!(OrderStatus::try_from(3), Ok(OrderStatus::Done));
        assert!(OrderStatus::try_from(0).is_err());
        assert!(OrderLineStatus::try_from(5).is_err());
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&OrderLineStatus::Sent).unwrap();
        assert_eq!(json, "3");
        let parsed: OrderStatus = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, OrderStatus::Paid);
        assert!(serde_json::from_str::<OrderStatus>("9").is_err());
    }

    #[test]
    fn test_from_str_reads_codes() {
        assert_eq!("2".parse::<OrderLineStatus>(), Ok(OrderLineStatus::Processing));
        assert!("sent".parse::<OrderLineStatus>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(OrderStatus::New.to_string(), "New");
        assert_eq!(OrderLineStatus::ALL.len(), 4);
    }

    #[test]
    fn test_staff_group_parse() {
        assert_eq!("Employees".parse::<StaffGroup>(), Ok(StaffGroup::Employees));
        assert_eq!("dispatcher".parse::<StaffGroup>(), Ok(StaffGroup::Dispatchers));
        assert!("owners".parse::<StaffGroup>().is_err());
    }
}
