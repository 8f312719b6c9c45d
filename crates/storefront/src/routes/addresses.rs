//! Address book route handlers. Every handler requires a signed-in user and
//! only ever touches that user's addresses; anything else is a 404.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use ebookstore_core::{AddressId, County};

use crate::db::AddressRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Address, AddressForm, CurrentUser};
use crate::state::AppState;

const ADDRESS_LIST: &str = "/address/";

// =============================================================================
// Templates
// =============================================================================

/// Address list template.
#[derive(Template, WebTemplate)]
#[template(path = "addresses/list.html")]
pub struct AddressListTemplate {
    pub user: Option<CurrentUser>,
    pub addresses: Vec<Address>,
}

/// Create/update form template.
#[derive(Template, WebTemplate)]
#[template(path = "addresses/form.html")]
pub struct AddressFormTemplate {
    pub user: Option<CurrentUser>,
    pub title: &'static str,
    pub action: String,
    pub form: AddressForm,
    pub counties: &'static [County],
    pub errors: Vec<String>,
}

/// Delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "addresses/confirm_delete.html")]
pub struct AddressDeleteTemplate {
    pub user: Option<CurrentUser>,
    pub address: Address,
}

impl AddressFormTemplate {
    fn new(user: CurrentUser, id: Option<AddressId>, form: AddressForm, errors: Vec<String>) -> Self {
        let (title, action) = match id {
            Some(id) => ("Edit address", format!("/address/{id}/")),
            None => ("New address", "/address/create/".to_string()),
        };
        Self {
            user: Some(user),
            title,
            action,
            form,
            counties: &County::ALL,
            errors,
        }
    }
}

fn empty_form() -> AddressForm {
    AddressForm {
        name: String::new(),
        address: String::new(),
        town: String::new(),
        county: String::new(),
    }
}

fn not_found(id: AddressId) -> AppError {
    AppError::NotFound(format!("address {id}"))
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /address/
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AddressListTemplate> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(AddressListTemplate {
        user: Some(user),
        addresses,
    })
}

/// GET /address/create/
pub async fn create_page(RequireAuth(user): RequireAuth) -> AddressFormTemplate {
    AddressFormTemplate::new(user, None, empty_form(), Vec::new())
}

/// POST /address/create/
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(AddressFormTemplate::new(user, None, form, errors).into_response());
        }
    };

    let address = AddressRepository::new(state.pool())
        .create(user.id, &input)
        .await?;
    tracing::info!(address_id = %address.id, "address created");

    Ok(Redirect::to(ADDRESS_LIST).into_response())
}

/// GET /address/{id}/
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<AddressFormTemplate> {
    let id = AddressId::new(id);
    let address = AddressRepository::new(state.pool())
        .get(user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(AddressFormTemplate::new(
        user,
        Some(id),
        AddressForm::from(&address),
        Vec::new(),
    ))
}

/// POST /address/{id}/
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let id = AddressId::new(id);
    let addresses = AddressRepository::new(state.pool());
    if addresses.get(user.id, id).await?.is_none() {
        return Err(not_found(id));
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(AddressFormTemplate::new(user, Some(id), form, errors).into_response());
        }
    };

    addresses.update(user.id, id, &input).await?;
    Ok(Redirect::to(ADDRESS_LIST).into_response())
}

/// GET /address/{id}/delete/
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<AddressDeleteTemplate> {
    let id = AddressId::new(id);
    let address = AddressRepository::new(state.pool())
        .get(user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(AddressDeleteTemplate {
        user: Some(user),
        address,
    })
}

/// POST /address/{id}/delete/
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    AddressRepository::new(state.pool())
        .delete(user.id, AddressId::new(id))
        .await?;
    tracing::info!(address_id = id, "address deleted");

    Ok(Redirect::to(ADDRESS_LIST))
}
