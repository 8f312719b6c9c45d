//! Contact form handling.
//!
//! Submissions are written to the log for customer service to pick up.

use serde::Deserialize;

/// Longest accepted sender name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Longest accepted message body.
pub const MAX_MESSAGE_LENGTH: usize = 600;

/// Raw contact form fields.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

/// A validated contact message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub message: String,
}

impl ContactForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns every problem found, in field order.
    pub fn validate(&self) -> Result<ContactMessage, Vec<String>> {
        let name = self.name.trim();
        let message = self.message.trim();
        let mut errors = Vec::new();

        if name.is_empty() {
            errors.push("Name is required".to_string());
        } else if name.chars().count() > MAX_NAME_LENGTH {
            errors.push(format!("Name must be at most {MAX_NAME_LENGTH} characters"));
        }

        if message.is_empty() {
            errors.push("Message is required".to_string());
        } else if message.chars().count() > MAX_MESSAGE_LENGTH {
            errors.push(format!(
                "Message must be at most {MAX_MESSAGE_LENGTH} characters"
            ));
        }

        if errors.is_empty() {
            Ok(ContactMessage {
                name: name.to_string(),
                message: message.to_string(),
            })
        } else {
            Err(errors)
        }
    }
}

impl ContactMessage {
    /// Body as delivered to customer service.
    #[must_use]
    pub fn body(&self) -> String {
        format!("From {}\n{}", self.name, self.message)
    }

    /// Hand the message to customer service.
    pub fn deliver(&self) {
        tracing::info!(
            target: "customer_service",
            subject = "Site message",
            body = %self.body(),
            "contact form submitted"
        );
    }
}
