//! Shop Router
//!
//! Catalog, cart, checkout, uploads and payments. Catalog reads, uploads and
//! payments are public; everything else needs a bearer token.

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod payments;
pub mod products;
pub mod uploads;

use crate::core::auth::middleware::mw_require_auth;
use crate::core::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/products", get(products::list_products))
        .route("/products/categories/list", get(products::list_categories))
        .route("/products/{id}", get(products::get_product))
        .route("/upload/single", post(uploads::upload_single))
        .route("/upload/multiple", post(uploads::upload_multiple))
        .route("/payments/card", post(payments::pay_with_card))
        .route("/payments/pix", post(payments::pay_with_pix));

    let protected = Router::new()
        // Catalog writes
        .route("/products", post(products::create_product))
        .route(
            "/products/{id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/products/{id}/images", post(products::upload_product_images))
        // Cart
        .route("/cart", get(cart::get_cart))
        .route("/cart/add", post(cart::add_to_cart))
        .route(
            "/cart/items/{product_id}",
            put(cart::update_cart_item).delete(cart::remove_cart_item),
        )
        .route("/cart/clear", delete(cart::clear_cart))
        // Orders
        .route("/orders", post(orders::create_order))
        .route("/orders/my-orders", get(orders::list_my_orders))
        .route("/orders/stats/summary", get(orders::order_stats))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/cancel", post(orders::cancel_order))
        .route("/orders/{id}/status", put(orders::update_order_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), mw_require_auth));

    public.merge(protected)
}
