//! The three back-office sites and what each one may see and change.

use ebookstore_core::OrderStatus;
use ebookstore_storefront::models::User;

/// A back-office site, selected by the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    /// `/owners/`: active superusers.
    Owners,
    /// `/central-office/`: employees.
    CentralOffice,
    /// `/dispatch/`: dispatchers.
    Dispatch,
}

/// Book fields a site may change. Unlisted fields are shown read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BookFields {
    pub name: bool,
    pub slug: bool,
    pub description: bool,
    pub price: bool,
    pub active: bool,
    pub in_stock: bool,
}

impl Site {
    pub const ALL: [Self; 3] = [Self::Owners, Self::CentralOffice, Self::Dispatch];

    /// Parse a path segment such as `central-office`.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|site| site.segment() == segment)
    }

    /// Site of a request path, from its first segment.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        path.trim_start_matches('/')
            .split('/')
            .next()
            .and_then(Self::from_segment)
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Owners => "owners",
            Self::CentralOffice => "central-office",
            Self::Dispatch => "dispatch",
        }
    }

    /// URL prefix, e.g. `/dispatch/`.
    #[must_use]
    pub fn prefix(self) -> String {
        format!("/{}/", self.segment())
    }

    /// Page header text.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Owners => "BookTime owners administration",
            Self::CentralOffice => "BookTime central office administration",
            Self::Dispatch => "BookTime central dispatch administration",
        }
    }

    /// CSS class carrying the site's header and caption colours.
    #[must_use]
    pub const fn theme(self) -> &'static str {
        match self {
            Self::Owners => "site-owners",
            Self::CentralOffice => "site-central-office",
            Self::Dispatch => "site-dispatch",
        }
    }

    /// Whether `user` may enter this site.
    #[must_use]
    pub fn admits(self, user: &User) -> bool {
        match self {
            Self::Owners => user.is_owner(),
            Self::CentralOffice => user.is_employee(),
            Self::Dispatch => user.is_dispatcher(),
        }
    }

    /// Sites `user` may enter, in display order.
    #[must_use]
    pub fn available_to(user: &User) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|site| site.admits(user))
            .collect()
    }

    /// The only order status this site sees, if it is restricted.
    #[must_use]
    pub const fn order_scope(self) -> Option<OrderStatus> {
        match self {
            Self::Dispatch => Some(OrderStatus::Paid),
            Self::Owners | Self::CentralOffice => None,
        }
    }

    /// Whether order statuses can be changed here.
    #[must_use]
    pub const fn edits_order_status(self) -> bool {
        !matches!(self, Self::Dispatch)
    }

    /// Whether order pages show the billing snapshot and the customer.
    #[must_use]
    pub const fn shows_billing(self) -> bool {
        !matches!(self, Self::Dispatch)
    }

    #[must_use]
    pub const fn book_fields(self) -> BookFields {
        match self {
            Self::Owners => BookFields {
                name: true,
                slug: true,
                description: true,
                price: true,
                active: true,
                in_stock: true,
            },
            Self::CentralOffice => BookFields {
                name: false,
                slug: false,
                description: true,
                price: true,
                active: true,
                in_stock: true,
            },
            Self::Dispatch => BookFields {
                name: false,
                slug: false,
                description: false,
                price: false,
                active: false,
                in_stock: true,
            },
        }
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.segment())
    }
}
