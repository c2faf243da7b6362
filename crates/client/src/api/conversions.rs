//! Backend wire records and their conversion into client types.
//!
//! The backend is not consistent about field names: the product list uses
//! `_id`/`product_name`, search results use `Product_ID`, older handlers use
//! `id`/`name`. Keys that can appear together in one object are read into
//! separate optional fields and coalesced here, never with serde aliases
//! (an object carrying both `_id` and `user_id` would otherwise fail with a
//! duplicate-field error).

use serde::Deserialize;
use tracing::warn;

use everything_store_core::{
    AddressId, AddressKind, CartItemId, Email, Price, ProductId, SessionToken, UserId,
};

use super::ApiError;
use super::types::{Acknowledgement, Address, CartItem, LoginSession, Product, User};

/// Pick the first present, non-blank value.
fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "Token")]
    token_upper: Option<String>,
}

/// Login responses either return the user object directly or wrap it as
/// `{"user": {...}, "token": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LoginRecord {
    Wrapped {
        user: UserRecord,
        #[serde(default)]
        token: Option<String>,
    },
    Flat(UserRecord),
}

impl UserRecord {
    fn into_user(self) -> Result<User, ApiError> {
        let id = first_present([self.user_id, self.object_id, self.id])
            .ok_or_else(|| ApiError::Decode("user is missing an id".to_string()))?;
        let email = self
            .email
            .ok_or_else(|| ApiError::Decode("user is missing an email".to_string()))?;
        let email = Email::parse(&email)
            .map_err(|e| ApiError::Decode(format!("user email is invalid: {e}")))?;

        let full_name = match (self.first_name, self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}").trim().to_string()),
            (first, last) => first.or(last),
        };
        let username = first_present([self.username, self.user_name, full_name])
            .unwrap_or_else(|| email.local_part().to_string());

        Ok(User {
            id: UserId::new(id),
            username,
            email,
        })
    }
}

/// Convert a login response body into a session.
pub fn convert_login(record: LoginRecord) -> Result<LoginSession, ApiError> {
    let (user, outer_token) = match record {
        LoginRecord::Wrapped { user, token } => (user, token),
        LoginRecord::Flat(user) => (user, None),
    };
    let token = first_present([outer_token, user.token.clone(), user.token_upper.clone()])
        .map(SessionToken::new);

    Ok(LoginSession {
        user: user.into_user()?,
        token,
    })
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default, rename = "Product_ID")]
    product_id_upper: Option<String>,
    #[serde(default)]
    product_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default, rename = "Product_Name")]
    product_name_upper: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<Price>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    image: Option<String>,
}

impl ProductRecord {
    fn into_product(self) -> Result<Product, ApiError> {
        let id = first_present([
            self.id,
            self.object_id,
            self.product_id_upper,
            self.product_id,
        ])
        .ok_or_else(|| ApiError::Decode("product is missing an id".to_string()))?;

        let name = first_present([self.name, self.product_name, self.product_name_upper])
            .unwrap_or_default();

        let price = self.price.unwrap_or_else(|| {
            warn!(product_id = %id, "Product has no price, showing 0");
            Price::ZERO
        });

        Ok(Product {
            id: ProductId::new(id),
            name,
            description: self.description.unwrap_or_default(),
            price,
            image: self.image.unwrap_or_default(),
            rating: self.rating.map(rating_out_of_five),
        })
    }
}

/// Round a backend rating onto the 0..=5 scale.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rating_out_of_five(rating: f64) -> u8 {
    rating.clamp(0.0, 5.0).round() as u8
}

/// Convert a single product body.
pub fn convert_product(record: ProductRecord) -> Result<Product, ApiError> {
    record.into_product()
}

/// Convert a product list body.
///
/// `null` (an empty collection on the backend) converts to an empty list.
pub fn convert_products(records: Option<Vec<ProductRecord>>) -> Result<Vec<Product>, ApiError> {
    records
        .unwrap_or_default()
        .into_iter()
        .map(ProductRecord::into_product)
        .collect()
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CartItemRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default, rename = "productId")]
    product_id: Option<String>,
    #[serde(default, rename = "product_id")]
    product_id_snake: Option<String>,
    product: ProductRecord,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

impl CartItemRecord {
    fn into_cart_item(self) -> Result<Option<CartItem>, ApiError> {
        let product = self.product.into_product()?;

        if self.quantity == 0 {
            warn!(product_id = %product.id, "Dropping cart line with zero quantity");
            return Ok(None);
        }

        let product_id = first_present([self.product_id, self.product_id_snake])
            .map_or_else(|| product.id.clone(), ProductId::new);
        let id = first_present([self.id, self.object_id])
            .map_or_else(|| CartItemId::new(product_id.as_str()), CartItemId::new);

        Ok(Some(CartItem {
            id,
            product_id,
            product,
            quantity: self.quantity,
        }))
    }
}

/// Convert a cart body into line items.
///
/// Lines with quantity 0 are dropped; every returned line has quantity >= 1.
pub fn convert_cart(records: Option<Vec<CartItemRecord>>) -> Result<Vec<CartItem>, ApiError> {
    let mut items = Vec::new();
    for record in records.unwrap_or_default() {
        if let Some(item) = record.into_cart_item()? {
            items.push(item);
        }
    }
    Ok(items)
}

// =============================================================================
// Addresses
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddressRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    address_id: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    street_name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    city_name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default, rename = "zipCode")]
    zip_code: Option<String>,
    #[serde(default, rename = "zip_code")]
    zip_code_snake: Option<String>,
    #[serde(default)]
    pin_code: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl AddressRecord {
    fn into_address(self) -> Result<Address, ApiError> {
        let id = first_present([self.id, self.address_id, self.object_id])
            .ok_or_else(|| ApiError::Decode("address is missing an id".to_string()))?;

        let kind = match self.kind {
            Some(kind) => kind
                .parse::<AddressKind>()
                .map_err(|e| ApiError::Decode(e.to_string()))?,
            None => {
                warn!(address_id = %id, "Address has no type, treating as home");
                AddressKind::Home
            }
        };

        Ok(Address {
            id: AddressId::new(id),
            kind,
            street: first_present([self.street, self.street_name]).unwrap_or_default(),
            city: first_present([self.city, self.city_name]).unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            zip_code: first_present([self.zip_code, self.zip_code_snake, self.pin_code])
                .unwrap_or_default(),
            country: self.country.unwrap_or_default(),
        })
    }
}

/// Convert an address list body.
pub fn convert_addresses(records: Option<Vec<AddressRecord>>) -> Result<Vec<Address>, ApiError> {
    records
        .unwrap_or_default()
        .into_iter()
        .map(AddressRecord::into_address)
        .collect()
}

// =============================================================================
// Acknowledgements
// =============================================================================

/// Reduce a write endpoint's body to an [`Acknowledgement`].
///
/// Accepts an empty body, a bare JSON string, or an object with `message`
/// (or `status`) and optional `token`.
pub fn convert_acknowledgement(body: &str) -> Result<Acknowledgement, ApiError> {
    if body.trim().is_empty() {
        return Ok(Acknowledgement::default());
    }

    let value: serde_json::Value = serde_json::from_str(body)?;
    let text = |key: &str| {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    };

    Ok(match &value {
        serde_json::Value::String(message) => Acknowledgement {
            message: Some(message.clone()),
            token: None,
        },
        serde_json::Value::Object(_) => Acknowledgement {
            message: first_present([text("message"), text("status")]),
            token: first_present([text("token"), text("Token")]).map(SessionToken::new),
        },
        _ => Acknowledgement::default(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn products(json: &str) -> Vec<Product> {
        convert_products(serde_json::from_str(json).unwrap()).unwrap()
    }

    #[test]
    fn test_list_and_search_shapes_convert_identically() {
        let list = products(
            r#"[{"_id":"p1","product_name":"Widget","description":"Blue","price":9.99,"image":"w.png"}]"#,
        );
        let search = products(
            r#"[{"Product_ID":"p1","product_name":"Widget","description":"Blue","price":9.99,"rating":4,"image":"w.png"}]"#,
        );

        assert_eq!(list.len(), 1);
        assert_eq!(search.len(), 1);
        let (a, b) = (&list[0], &search[0]);
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert_eq!(a.description, "Blue");
        assert_eq!(b.description, "Blue");
        assert_eq!(a.price, b.price);
        assert_eq!(b.rating, Some(4));
    }

    #[test]
    fn test_product_client_shape() {
        let list = products(r#"[{"id":"p2","name":"Gadget","price":12,"image":""}]"#);
        assert_eq!(list[0].id.as_str(), "p2");
        assert_eq!(list[0].name, "Gadget");
        assert_eq!(list[0].description, "");
        assert_eq!(list[0].price, Price::from_cents(1200));
    }

    #[test]
    fn test_product_without_id_is_rejected() {
        let result = convert_products(serde_json::from_str(r#"[{"name":"x","price":1}]"#).unwrap());
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_null_list_is_empty() {
        assert!(products("null").is_empty());
        assert!(convert_cart(None).unwrap().is_empty());
    }

    #[test]
    fn test_cart_line_falls_back_to_product_id() {
        let records = serde_json::from_str(
            r#"[{"product":{"_id":"p1","product_name":"Widget","price":9.99},"quantity":2}]"#,
        )
        .unwrap();
        let items = convert_cart(records).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id.as_str(), "p1");
        assert_eq!(items[0].id.as_str(), "p1");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].line_total(), Price::from_cents(1998));
    }

    #[test]
    fn test_cart_drops_zero_quantity_lines() {
        let records = serde_json::from_str(
            r#"[
                {"id":"c1","productId":"p1","product":{"id":"p1","name":"A","price":1},"quantity":0},
                {"id":"c2","productId":"p2","product":{"id":"p2","name":"B","price":2},"quantity":1}
            ]"#,
        )
        .unwrap();
        let items = convert_cart(records).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "c2");
    }

    #[test]
    fn test_login_flat_and_wrapped() {
        let flat: LoginRecord = serde_json::from_str(
            r#"{"_id":"u1","user_id":"u1","first_name":"Ada","last_name":"Lovelace","email":"ada@example.com","token":"t-1"}"#,
        )
        .unwrap();
        let session = convert_login(flat).unwrap();
        assert_eq!(session.user.id.as_str(), "u1");
        assert_eq!(session.user.username, "Ada Lovelace");
        assert_eq!(session.token.unwrap().expose(), "t-1");

        let wrapped: LoginRecord = serde_json::from_str(
            r#"{"user":{"id":"u2","username":"grace","email":"grace@example.com"},"token":"t-2"}"#,
        )
        .unwrap();
        let session = convert_login(wrapped).unwrap();
        assert_eq!(session.user.username, "grace");
        assert_eq!(session.token.unwrap().expose(), "t-2");
    }

    #[test]
    fn test_login_without_token() {
        let record: LoginRecord =
            serde_json::from_str(r#"{"id":"u3","email":"linus@example.com"}"#).unwrap();
        let session = convert_login(record).unwrap();
        assert_eq!(session.user.username, "linus");
        assert!(session.token.is_none());
    }

    #[test]
    fn test_addresses() {
        let records = serde_json::from_str(
            r#"[
                {"id":"a1","type":"work","street":"1 Main St","city":"Springfield","state":"IL","zipCode":"62701","country":"US"},
                {"address_id":"a2","street_name":"2 Elm","city_name":"Shelbyville","state":"IL","pin_code":"62565","country":"US"}
            ]"#,
        )
        .unwrap();
        let addresses = convert_addresses(records).unwrap();

        assert_eq!(addresses[0].kind, AddressKind::Work);
        assert_eq!(addresses[0].zip_code, "62701");
        assert_eq!(addresses[1].id.as_str(), "a2");
        assert_eq!(addresses[1].kind, AddressKind::Home);
        assert_eq!(addresses[1].street, "2 Elm");
        assert_eq!(addresses[1].zip_code, "62565");
    }

    #[test]
    fn test_acknowledgement_shapes() {
        assert_eq!(convert_acknowledgement("").unwrap(), Acknowledgement::default());

        let ack = convert_acknowledgement(r#""Successfully Placed the order""#).unwrap();
        assert_eq!(ack.message.as_deref(), Some("Successfully Placed the order"));

        let ack = convert_acknowledgement(r#"{"message":"created","token":"abc"}"#).unwrap();
        assert_eq!(ack.message.as_deref(), Some("created"));
        assert_eq!(ack.token.unwrap().expose(), "abc");

        assert!(convert_acknowledgement("<html>").is_err());
    }
}
