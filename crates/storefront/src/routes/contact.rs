//! Contact form route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::services::contact::{ContactForm, MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH};

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact_us.html")]
pub struct ContactTemplate {
    pub user: Option<CurrentUser>,
    pub form: ContactForm,
    pub errors: Vec<String>,
    pub max_name: usize,
    pub max_message: usize,
}

impl ContactTemplate {
    fn new(user: Option<CurrentUser>, form: ContactForm, errors: Vec<String>) -> Self {
        Self {
            user,
            form,
            errors,
            max_name: MAX_NAME_LENGTH,
            max_message: MAX_MESSAGE_LENGTH,
        }
    }
}

/// GET /contact-us/
pub async fn contact_page(OptionalAuth(user): OptionalAuth) -> ContactTemplate {
    ContactTemplate::new(user, ContactForm::default(), Vec::new())
}

/// POST /contact-us/
#[instrument(skip_all)]
pub async fn contact(OptionalAuth(user): OptionalAuth, Form(form): Form<ContactForm>) -> Response {
    match form.validate() {
        Ok(message) => {
            message.deliver();
            Redirect::to("/").into_response()
        }
        Err(errors) => ContactTemplate::new(user, form, errors).into_response(),
    }
}
