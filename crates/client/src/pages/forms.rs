//! Form input and its validation.
//!
//! Forms hold raw text as typed. `validate` turns them into request payloads
//! or a [`ValidationError`] whose message is shown as-is.

use secrecy::SecretString;
use thiserror::Error;

use everything_store_core::{AddressKind, Email, Price};

use crate::api::{AddressInput, Credentials, NewProduct, SignupRequest};

/// Image used when a new product is created without one.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400?text=No+Image";

/// Shortest accepted signup password.
const MIN_PASSWORD_LENGTH: usize = 6;

const REQUIRED_FIELDS: &str = "Please fill in all required fields";

/// Form input rejected before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn parse_email(value: &str) -> Result<Email, ValidationError> {
    Email::parse(value).map_err(|_| ValidationError::new("Please enter a valid email address"))
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns error if either field is blank or the email is malformed.
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        if is_blank(&self.email) || self.password.is_empty() {
            return Err(ValidationError::new("Please enter your email and password"));
        }
        Ok(Credentials {
            email: parse_email(&self.email)?,
            password: SecretString::from(self.password.clone()),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// # Errors
    ///
    /// Returns error if a field is blank, the passwords differ or are too
    /// short, or the email is malformed.
    pub fn validate(&self) -> Result<SignupRequest, ValidationError> {
        let required = [&self.first_name, &self.last_name, &self.phone, &self.email];
        if required.iter().any(|value| is_blank(value)) || self.password.is_empty() {
            return Err(ValidationError::new(REQUIRED_FIELDS));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::new("Passwords do not match"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::new(
                "Password must be at least 6 characters",
            ));
        }

        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        Ok(SignupRequest {
            username: format!("{first_name} {last_name}"),
            first_name,
            last_name,
            phone: self.phone.trim().to_string(),
            email: parse_email(&self.email)?,
            password: SecretString::from(self.password.clone()),
        })
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    /// Optional; blank uses [`PLACEHOLDER_IMAGE`].
    pub image: String,
}

impl ProductForm {
    /// # Errors
    ///
    /// Returns error if name, description or price is blank, or the price is
    /// not a positive amount.
    pub fn validate(&self) -> Result<NewProduct, ValidationError> {
        if is_blank(&self.name) || is_blank(&self.description) || is_blank(&self.price) {
            return Err(ValidationError::new(REQUIRED_FIELDS));
        }
        let price = Price::parse_positive(&self.price)
            .map_err(|_| ValidationError::new("Please enter a valid price"))?;

        let image = if is_blank(&self.image) {
            PLACEHOLDER_IMAGE.to_string()
        } else {
            self.image.trim().to_string()
        };

        Ok(NewProduct {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            image,
        })
    }
}

// =============================================================================
// Addresses
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct AddressForm {
    pub kind: AddressKind,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl AddressForm {
    /// # Errors
    ///
    /// Returns "<Field> is required" for the first blank field.
    pub fn validate(&self) -> Result<AddressInput, ValidationError> {
        let fields = [
            ("Street", &self.street),
            ("City", &self.city),
            ("State", &self.state),
            ("ZipCode", &self.zip_code),
            ("Country", &self.country),
        ];
        if let Some((label, _)) = fields.iter().find(|(_, value)| is_blank(value)) {
            return Err(ValidationError::new(format!("{label} is required")));
        }

        Ok(AddressInput {
            kind: self.kind,
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            country: self.country.trim().to_string(),
        })
    }
}
