use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Extension, Router,
};

use mart_http::auth::require_auth;
use mart_http::{Authorizer, TokenVerifier};

use crate::api::rest::{handlers, openapi};
use crate::domain::cart_service::CartService;
use crate::domain::coupon_service::CouponService;

/// Mount the commerce routes on `router`.
///
/// Cart routes and coupon administration sit behind `require_auth`; coupon
/// lookups and the OpenAPI document are public.
pub fn register_routes(
    router: Router,
    cart: Arc<CartService>,
    coupons: Arc<CouponService>,
    verifier: Arc<dyn TokenVerifier>,
    authorizer: Arc<dyn Authorizer>,
) -> Router {
    let auth = from_fn_with_state(verifier, require_auth);

    router
        .route("/openapi.json", get(openapi::openapi_json))
        // Cart
        .route(
            "/cart",
            get(handlers::view_cart)
                .put(handlers::update_item)
                .route_layer(auth.clone()),
        )
        .route(
            "/cart/add",
            post(handlers::add_item).route_layer(auth.clone()),
        )
        .route(
            "/cart/remove/{item_id}",
            delete(handlers::remove_item).route_layer(auth.clone()),
        )
        .route(
            "/cart/apply-coupon",
            post(handlers::apply_coupon).route_layer(auth.clone()),
        )
        // Coupons
        .route(
            "/coupons",
            get(handlers::list_coupons)
                .merge(post(handlers::create_coupon).route_layer(auth.clone())),
        )
        .route(
            "/coupons/{coupon}",
            get(handlers::get_coupon).merge(delete(handlers::delete_coupon).route_layer(auth)),
        )
        .layer(Extension(cart))
        .layer(Extension(coupons))
        .layer(Extension(authorizer))
}
