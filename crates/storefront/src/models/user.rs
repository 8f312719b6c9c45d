//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use ebookstore_core::{Email, StaffGroup, UserId};

/// A bookstore account (customer or staff).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email address.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Inactive accounts cannot sign in and hold no staff role.
    pub is_active: bool,
    /// May sign in to the back office.
    pub is_staff: bool,
    /// Holds every permission.
    pub is_superuser: bool,
    /// Staff groups the user belongs to.
    pub groups: Vec<StaffGroup>,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Whether the user belongs to `group`.
    #[must_use]
    pub fn in_group(&self, group: StaffGroup) -> bool {
        self.groups.contains(&group)
    }

    /// Customer service and central office staff.
    ///
    /// Superusers count as employees; other staff need the `Employees` group.
    #[must_use]
    pub fn is_employee(&self) -> bool {
        self.is_active
            && (self.is_superuser || (self.is_staff && self.in_group(StaffGroup::Employees)))
    }

    /// Warehouse staff allowed to dispatch paid orders.
    #[must_use]
    pub fn is_dispatcher(&self) -> bool {
        self.is_active
            && (self.is_superuser || (self.is_staff && self.in_group(StaffGroup::Dispatchers)))
    }

    /// Active superuser (shop owner).
    #[must_use]
    pub const fn is_owner(&self) -> bool {
        self.is_active && self.is_superuser
    }

    /// "First Last", trimmed. Empty when neither name is set.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Name shown to other people: the full name, or the email when unnamed.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = self.full_name();
        if name.is_empty() {
            self.email.to_string()
        } else {
            name
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn user(is_staff: bool, is_superuser: bool, groups: Vec<StaffGroup>) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("staff@ebookstore.co.ke").unwrap(),
            first_name: "Wanjiru".to_string(),
            last_name: "Kamau".to_string(),
            is_active: true,
            is_staff,
            is_superuser,
            groups,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_customer_has_no_staff_role() {
        let customer = user(false, false, vec![]);
        assert!(!customer.is_employee());
        assert!(!customer.is_dispatcher());
        assert!(!customer.is_owner());
    }

    #[test]
    fn test_group_without_staff_flag_is_not_employee() {
        let u = user(false, false, vec![StaffGroup::Employees]);
        assert!(!u.is_employee());
    }

    #[test]
    fn test_staff_in_group() {
        let u = user(true, false, vec![StaffGroup::Employees]);
        assert!(u.is_employee());
        assert!(!u.is_dispatcher());

        let d = user(true, false, vec![StaffGroup::Dispatchers]);
        assert!(d.is_dispatcher());
        assert!(!d.is_employee());
    }

    #[test]
    fn test_superuser_has_every_role() {
        let owner = user(false, true, vec![]);
        assert!(owner.is_employee());
        assert!(owner.is_dispatcher());
        assert!(owner.is_owner());
    }

    #[test]
    fn test_inactive_superuser_has_no_role() {
        let mut owner = user(true, true, vec![StaffGroup::Employees]);
        owner.is_active = false;
        assert!(!owner.is_employee());
        assert!(!owner.is_owner());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut u = user(false, false, vec![]);
        assert_eq!(u.full_name(), "Wanjiru Kamau");
        u.first_name.clear();
        u.last_name.clear();
        assert_eq!(u.full_name(), "");
        assert_eq!(u.display_name(), "staff@ebookstore.co.ke");
    }
}
