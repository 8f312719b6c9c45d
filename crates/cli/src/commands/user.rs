//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # A customer
//! ebookstore-cli user create -e wanjiku@example.com -p 'correct horse'
//!
//! # A dispatcher
//! ebookstore-cli user create -e otieno@example.com -p 'correct horse' --staff --group dispatchers
//!
//! # A shop owner
//! ebookstore-cli user create -e owner@example.com -p 'correct horse' --superuser
//! ```

use thiserror::Error;

use ebookstore_core::{Email, StaffGroup};
use ebookstore_storefront::db::RepositoryError;
use ebookstore_storefront::db::UserRepository;
use ebookstore_storefront::db::users::NewUser;
use ebookstore_storefront::services::auth::{AuthError, hash_password, validate_password};

use super::{ConnectError, connect};

/// Errors that can occur while creating a user.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("invalid group: {0}. Valid groups: employees, dispatchers")]
    InvalidGroup(String),

    #[error("user already exists with email: {0}")]
    UserExists(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Input for `user create`.
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub staff: bool,
    pub superuser: bool,
    pub groups: Vec<String>,
}

/// Parse `--group` values, dropping duplicates.
///
/// # Errors
///
/// Returns `UserError::InvalidGroup` for an unknown group name.
pub fn parse_groups(raw: &[String]) -> Result<Vec<StaffGroup>, UserError> {
    let mut groups = Vec::with_capacity(raw.len());
    for name in raw {
        let group = name
            .parse::<StaffGroup>()
            .map_err(|_| UserError::InvalidGroup(name.clone()))?;
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    Ok(groups)
}

/// Create a user.
///
/// Group members are always marked as staff so they can sign in to the
/// back office.
///
/// # Errors
///
/// Returns an error if the input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create(input: CreateUser) -> Result<(), UserError> {
    let email = Email::parse(&input.email).map_err(|e| UserError::InvalidEmail(e.to_string()))?;
    let groups = parse_groups(&input.groups)?;
    validate_password(&input.password)?;
    let password_hash = hash_password(&input.password)?;

    let pool = connect().await?;

    let new = NewUser {
        email: &email,
        password_hash: &password_hash,
        first_name: input.first_name.trim(),
        last_name: input.last_name.trim(),
        is_staff: input.staff || input.superuser || !groups.is_empty(),
        is_superuser: input.superuser,
        groups: &groups,
    };

    let user = UserRepository::new(&pool)
        .create(&new)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(email.to_string()),
            other => UserError::Repository(other),
        })?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        staff = user.is_staff,
        superuser = user.is_superuser,
        groups = ?user.groups,
        "User created"
    );

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn groups_accept_either_spelling_once() {
        let raw = vec![
            "dispatchers".to_string(),
            "Employee".to_string(),
            "dispatcher".to_string(),
        ];
        assert_eq!(
            parse_groups(&raw).unwrap(),
            vec![StaffGroup::Dispatchers, StaffGroup::Employees]
        );
    }

    #[test]
    fn unknown_group_is_rejected() {
        let raw = vec!["cooks".to_string()];
        assert!(matches!(
            parse_groups(&raw),
            Err(UserError::InvalidGroup(name)) if name == "cooks"
        ));
    }
}
