//! Catalog pages: listing, detail, search and product creation.

use askama::Template;
use tracing::instrument;

use everything_store_core::ProductId;

use super::forms::ProductForm;
use super::views::ProductCard;
use super::{Navigation, Page};
use crate::state::AppState;

/// Product listing template.
#[derive(Debug, Template)]
#[template(path = "products.txt")]
pub struct ProductsView {
    pub products: Vec<ProductCard>,
    pub error: Option<String>,
}

/// Product detail template.
#[derive(Debug, Template)]
#[template(path = "product_detail.txt")]
pub struct ProductDetailView {
    pub product: Option<ProductCard>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Search results template.
#[derive(Debug, Template)]
#[template(path = "search.txt")]
pub struct SearchView {
    pub query: String,
    pub products: Vec<ProductCard>,
    /// No query was entered, so no search ran.
    pub prompt: bool,
    pub error: Option<String>,
}

/// Add-product form template.
#[derive(Debug, Template)]
#[template(path = "add_product.txt")]
pub struct AddProductView {
    pub name: String,
    pub error: Option<String>,
}

/// List every product.
#[instrument(skip(state))]
pub async fn products_page(state: &AppState) -> ProductsView {
    match state.api().get_all_products().await {
        Ok(products) => ProductsView {
            products: products.iter().map(ProductCard::from).collect(),
            error: None,
        },
        Err(e) => ProductsView {
            products: Vec::new(),
            error: Some(e.to_string()),
        },
    }
}

/// Show one product.
#[instrument(skip(state, id), fields(product_id = %id))]
pub async fn product_detail_page(state: &AppState, id: &ProductId) -> ProductDetailView {
    match state.api().get_product(id).await {
        Ok(product) => ProductDetailView {
            product: Some(ProductCard::from(&product)),
            notice: None,
            error: None,
        },
        Err(e) => ProductDetailView {
            product: None,
            notice: None,
            error: Some(e.to_string()),
        },
    }
}

/// Add `quantity` of the shown product to the cart. Anonymous users are sent
/// to the login page.
#[instrument(skip(state, id), fields(product_id = %id))]
pub async fn add_to_cart(
    state: &AppState,
    id: &ProductId,
    quantity: u32,
) -> Page<ProductDetailView> {
    if !state.auth().is_authenticated() {
        return Page::redirect_with(Navigation::Login, "Please log in to add items to your cart.");
    }

    let mut view = product_detail_page(state, id).await;
    if view.product.is_none() {
        return Page::Render(view);
    }

    match state.cart().add_item(id, quantity).await {
        Ok(ack) => view.notice = Some(ack.message_or("Added to cart").to_string()),
        Err(e) => view.error = Some(e.to_string()),
    }
    Page::Render(view)
}

/// Search by name. A blank query shows the prompt without searching.
#[instrument(skip(state))]
pub async fn search_page(state: &AppState, query: &str) -> SearchView {
    let query = query.trim().to_string();
    if query.is_empty() {
        return SearchView {
            query,
            products: Vec::new(),
            prompt: true,
            error: None,
        };
    }

    match state.api().search_products(&query).await {
        Ok(products) => SearchView {
            query,
            products: products.iter().map(ProductCard::from).collect(),
            prompt: false,
            error: None,
        },
        Err(e) => SearchView {
            query,
            products: Vec::new(),
            prompt: false,
            error: Some(e.to_string()),
        },
    }
}

/// Create a product. Requires a login; success goes to the listing.
#[instrument(skip(state, form))]
pub async fn add_product(state: &AppState, form: &ProductForm) -> Page<AddProductView> {
    if !state.auth().is_authenticated() {
        return Page::redirect(Navigation::Login);
    }

    let failed = |error: String| {
        Page::Render(AddProductView {
            name: form.name.trim().to_string(),
            error: Some(error),
        })
    };

    let product = match form.validate() {
        Ok(product) => product,
        Err(e) => return failed(e.to_string()),
    };

    match state.api().add_product(&product).await {
        Ok(ack) => Page::redirect_with(
            Navigation::Products,
            ack.message_or("Product added successfully"),
        ),
        Err(e) => failed(e.to_string()),
    }
}
