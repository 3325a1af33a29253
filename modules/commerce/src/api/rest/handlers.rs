use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};
use uuid::Uuid;

use mart_http::{Authorizer, Capability, Problem, ProblemResponse, SecurityCtx};

use crate::api::rest::dto::{
    AddItemReq, AppliedCouponDto, ApplyCouponReq, CartDto, CouponDto, CreateCouponReq,
    UpdateItemReq,
};
use crate::api::rest::error::{map_domain_error, map_json_rejection, map_path_rejection};
use crate::domain::cart_service::CartService;
use crate::domain::coupon_service::CouponService;

/// Add a product to the caller's cart, creating the cart on first use
#[utoipa::path(
    post,
    path = "/cart/add",
    tag = "cart",
    request_body = AddItemReq,
    responses(
        (status = 200, description = "Updated cart", body = CartDto),
        (status = 400, description = "Bad Request", body = Problem),
        (status = 401, description = "Unauthorized", body = Problem),
        (status = 404, description = "Product not found", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    security(("bearer" = []))
)]
pub async fn add_item(
    uri: Uri,
    Extension(svc): Extension<Arc<CartService>>,
    Extension(authz): Extension<Arc<dyn Authorizer>>,
    ctx: SecurityCtx,
    payload: Result<Json<AddItemReq>, JsonRejection>,
) -> Result<Json<CartDto>, ProblemResponse> {
    authz.require(&ctx, Capability::ManageCart, uri.path())?;
    let Json(req) = payload.map_err(|e| map_json_rejection(&e, uri.path()))?;
    info!(
        "Adding {} x {} to cart of {}",
        req.quantity,
        req.product_id,
        ctx.user_id()
    );

    match svc
        .add_item(ctx.user_id(), req.product_id, req.quantity)
        .await
    {
        Ok(cart) => Ok(Json(CartDto::from(cart))),
        Err(e) => {
            error!("Failed to add item to cart: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Set the absolute quantity of an existing cart line
#[utoipa::path(
    put,
    path = "/cart",
    tag = "cart",
    request_body = UpdateItemReq,
    responses(
        (status = 200, description = "Updated cart", body = CartDto),
        (status = 400, description = "Bad Request", body = Problem),
        (status = 401, description = "Unauthorized", body = Problem),
        (status = 404, description = "Cart or line not found", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    security(("bearer" = []))
)]
pub async fn update_item(
    uri: Uri,
    Extension(svc): Extension<Arc<CartService>>,
    Extension(authz): Extension<Arc<dyn Authorizer>>,
    ctx: SecurityCtx,
    payload: Result<Json<UpdateItemReq>, JsonRejection>,
) -> Result<Json<CartDto>, ProblemResponse> {
    authz.require(&ctx, Capability::ManageCart, uri.path())?;
    let Json(req) = payload.map_err(|e| map_json_rejection(&e, uri.path()))?;
    info!("Setting quantity of {} to {}", req.product_id, req.quantity);

    match svc
        .update_item(ctx.user_id(), req.product_id, req.quantity)
        .await
    {
        Ok(cart) => Ok(Json(CartDto::from(cart))),
        Err(e) => {
            error!("Failed to update cart item: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Remove a cart line by its id
#[utoipa::path(
    delete,
    path = "/cart/remove/{item_id}",
    tag = "cart",
    params(("item_id" = Uuid, Path, description = "Cart line id")),
    responses(
        (status = 204, description = "Line removed"),
        (status = 400, description = "Bad Request", body = Problem),
        (status = 401, description = "Unauthorized", body = Problem),
        (status = 404, description = "Line not found", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    security(("bearer" = []))
)]
pub async fn remove_item(
    uri: Uri,
    Extension(svc): Extension<Arc<CartService>>,
    Extension(authz): Extension<Arc<dyn Authorizer>>,
    ctx: SecurityCtx,
    item_id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ProblemResponse> {
    authz.require(&ctx, Capability::ManageCart, uri.path())?;
    let Path(item_id) = item_id.map_err(|e| map_path_rejection(&e, uri.path()))?;
    info!("Removing cart item: {}", item_id);

    match svc.remove_item(item_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to remove cart item {}: {}", item_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// The caller's cart with product details
#[utoipa::path(
    get,
    path = "/cart",
    tag = "cart",
    responses(
        (status = 200, description = "Cart", body = CartDto),
        (status = 401, description = "Unauthorized", body = Problem),
        (status = 404, description = "No cart yet", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    security(("bearer" = []))
)]
pub async fn view_cart(
    uri: Uri,
    Extension(svc): Extension<Arc<CartService>>,
    Extension(authz): Extension<Arc<dyn Authorizer>>,
    ctx: SecurityCtx,
) -> Result<Json<CartDto>, ProblemResponse> {
    authz.require(&ctx, Capability::ManageCart, uri.path())?;

    match svc.view_cart(ctx.user_id()).await {
        Ok(cart) => Ok(Json(CartDto::from(cart))),
        Err(e) => {
            error!("Failed to load cart: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Check a coupon against a cart total without consuming it
#[utoipa::path(
    post,
    path = "/cart/apply-coupon",
    tag = "cart",
    request_body = ApplyCouponReq,
    responses(
        (status = 200, description = "Discounted total", body = AppliedCouponDto),
        (status = 400, description = "Coupon rejected or bad input", body = Problem),
        (status = 401, description = "Unauthorized", body = Problem),
        (status = 404, description = "Coupon not found", body = Problem)
    ),
    security(("bearer" = []))
)]
pub async fn apply_coupon(
    uri: Uri,
    Extension(svc): Extension<Arc<CouponService>>,
    Extension(authz): Extension<Arc<dyn Authorizer>>,
    ctx: SecurityCtx,
    payload: Result<Json<ApplyCouponReq>, JsonRejection>,
) -> Result<Json<AppliedCouponDto>, ProblemResponse> {
    authz.require(&ctx, Capability::ManageCart, uri.path())?;
    let Json(req) = payload.map_err(|e| map_json_rejection(&e, uri.path()))?;
    info!(
        "Applying coupon '{}' to {} for {}",
        req.code,
        req.cart_total,
        ctx.user_id()
    );

    match svc.apply(&req.code, req.cart_total).await {
        Ok(applied) => Ok(Json(AppliedCouponDto::from(applied))),
        Err(e) => {
            info!("Coupon '{}' not applied: {}", req.code, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a coupon (admin)
#[utoipa::path(
    post,
    path = "/coupons",
    tag = "coupons",
    request_body = CreateCouponReq,
    responses(
        (status = 201, description = "Created coupon", body = CouponDto),
        (status = 400, description = "Bad Request", body = Problem),
        (status = 401, description = "Unauthorized", body = Problem),
        (status = 403, description = "Forbidden", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    security(("bearer" = []))
)]
pub async fn create_coupon(
    uri: Uri,
    Extension(svc): Extension<Arc<CouponService>>,
    Extension(authz): Extension<Arc<dyn Authorizer>>,
    ctx: SecurityCtx,
    payload: Result<Json<CreateCouponReq>, JsonRejection>,
) -> Result<(StatusCode, Json<CouponDto>), ProblemResponse> {
    authz.require(&ctx, Capability::ManageCoupons, uri.path())?;
    let Json(req) = payload.map_err(|e| map_json_rejection(&e, uri.path()))?;
    info!("Creating coupon: {:?}", req);

    match svc.create(req.into()).await {
        Ok(coupon) => Ok((StatusCode::CREATED, Json(CouponDto::from(coupon)))),
        Err(e) => {
            error!("Failed to create coupon: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List all coupons
#[utoipa::path(
    get,
    path = "/coupons",
    tag = "coupons",
    responses(
        (status = 200, description = "All coupons", body = [CouponDto]),
        (status = 500, description = "Internal Server Error", body = Problem)
    )
)]
pub async fn list_coupons(
    uri: Uri,
    Extension(svc): Extension<Arc<CouponService>>,
) -> Result<Json<Vec<CouponDto>>, ProblemResponse> {
    match svc.list().await {
        Ok(coupons) => Ok(Json(coupons.into_iter().map(CouponDto::from).collect())),
        Err(e) => {
            error!("Failed to list coupons: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a coupon by its code
#[utoipa::path(
    get,
    path = "/coupons/{coupon}",
    tag = "coupons",
    params(("coupon" = String, Path, description = "Coupon code")),
    responses(
        (status = 200, description = "Coupon found", body = CouponDto),
        (status = 404, description = "Not Found", body = Problem)
    )
)]
pub async fn get_coupon(
    uri: Uri,
    Extension(svc): Extension<Arc<CouponService>>,
    Path(code): Path<String>,
) -> Result<Json<CouponDto>, ProblemResponse> {
    info!("Getting coupon: {}", code);

    match svc.get(&code).await {
        Ok(coupon) => Ok(Json(CouponDto::from(coupon))),
        Err(e) => {
            error!("Failed to get coupon '{}': {}", code, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a coupon by id (admin)
#[utoipa::path(
    delete,
    path = "/coupons/{coupon}",
    tag = "coupons",
    params(("coupon" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 204, description = "Coupon deleted"),
        (status = 400, description = "Bad Request", body = Problem),
        (status = 401, description = "Unauthorized", body = Problem),
        (status = 403, description = "Forbidden", body = Problem),
        (status = 404, description = "Not Found", body = Problem),
        (status = 500, description = "Internal Server Error", body = Problem)
    ),
    security(("bearer" = []))
)]
pub async fn delete_coupon(
    uri: Uri,
    Extension(svc): Extension<Arc<CouponService>>,
    Extension(authz): Extension<Arc<dyn Authorizer>>,
    ctx: SecurityCtx,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ProblemResponse> {
    authz.require(&ctx, Capability::ManageCoupons, uri.path())?;
    let Path(id) = id.map_err(|e| map_path_rejection(&e, uri.path()))?;
    info!("Deleting coupon: {}", id);

    match svc.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete coupon {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
