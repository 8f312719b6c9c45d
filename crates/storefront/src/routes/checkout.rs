//! Checkout: address selection and order confirmation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ebookstore_core::AddressId;

use crate::db::AddressRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Address, AddressSnapshot, CurrentUser};
use crate::services::basket::BasketService;
use crate::state::AppState;

/// Address selection form data.
#[derive(Debug, Deserialize)]
pub struct AddressSelectForm {
    pub billing_address: i32,
    pub shipping_address: i32,
}

/// Address selection template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/address_select.html")]
pub struct AddressSelectTemplate {
    pub user: Option<CurrentUser>,
    pub addresses: Vec<Address>,
    pub errors: Vec<String>,
}

/// Order placed template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/order_done.html")]
pub struct OrderDoneTemplate {
    pub user: Option<CurrentUser>,
}

/// Choose billing and shipping addresses for the basket.
///
/// GET /order/address_select/
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn address_select_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let basket = BasketService::new(state.pool(), &session)
        .current_contents()
        .await?;
    if basket.is_none_or(|b| b.is_empty()) {
        return Ok(Redirect::to("/basket/").into_response());
    }

    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(AddressSelectTemplate {
        user: Some(user),
        addresses,
        errors: Vec::new(),
    }
    .into_response())
}

/// Turn the basket into an order.
///
/// POST /order/address_select/
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn address_select(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressSelectForm>,
) -> Result<Response> {
    let service = BasketService::new(state.pool(), &session);
    let Some(contents) = service.current_contents().await? else {
        return Ok(Redirect::to("/basket/").into_response());
    };
    if contents.is_empty() {
        return Ok(Redirect::to("/basket/").into_response());
    }

    let addresses = AddressRepository::new(state.pool());
    let billing = addresses
        .get(user.id, AddressId::new(form.billing_address))
        .await?;
    let shipping = addresses
        .get(user.id, AddressId::new(form.shipping_address))
        .await?;

    let (Some(billing), Some(shipping)) = (billing, shipping) else {
        return Ok(AddressSelectTemplate {
            addresses: addresses.list_for_user(user.id).await?,
            user: Some(user),
            errors: vec![
                "Select a billing and a shipping address from your address book.".to_string(),
            ],
        }
        .into_response());
    };

    service
        .create_order(
            &contents,
            &AddressSnapshot::from(&billing),
            &AddressSnapshot::from(&shipping),
        )
        .await?;

    Ok(Redirect::to("/order/done/").into_response())
}

/// Confirmation shown after checkout.
///
/// GET /order/done/
pub async fn order_done(OptionalAuth(user): OptionalAuth) -> OrderDoneTemplate {
    OrderDoneTemplate { user }
}
