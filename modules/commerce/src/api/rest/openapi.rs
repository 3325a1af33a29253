use axum::response::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use mart_http::Problem;

use crate::api::rest::{dto, handlers};

#[derive(OpenApi)]
#[openapi(
    info(title = "Mart commerce API", description = "Cart and coupon endpoints"),
    paths(
        handlers::add_item,
        handlers::update_item,
        handlers::remove_item,
        handlers::view_cart,
        handlers::apply_coupon,
        handlers::create_coupon,
        handlers::list_coupons,
        handlers::get_coupon,
        handlers::delete_coupon,
    ),
    components(schemas(
        dto::ProductDto,
        dto::CartItemDto,
        dto::CartDto,
        dto::AddItemReq,
        dto::UpdateItemReq,
        dto::ApplyCouponReq,
        dto::AppliedCouponDto,
        dto::CouponDto,
        dto::CreateCouponReq,
        Problem,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "cart", description = "Per-user shopping cart"),
        (name = "coupons", description = "Percentage discount coupons")
    )
)]
pub struct CommerceOpenApi;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(CommerceOpenApi::openapi())
}
