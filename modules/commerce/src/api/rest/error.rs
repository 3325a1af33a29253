use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use mart_http::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.mart.example/{}", code))
        .with_code(code)
        .with_instance(instance);

    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "COMMERCE_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::InvalidQuantity { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "CART_INVALID_QUANTITY",
            "Invalid quantity",
            e.to_string(),
            instance,
        ),
        DomainError::DuplicateCouponCode { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "COUPON_CODE_TAKEN",
            "Coupon code already exists",
            e.to_string(),
            instance,
        ),
        DomainError::ProductNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "PRODUCT_NOT_FOUND",
            "Product not found",
            e.to_string(),
            instance,
        ),
        DomainError::CartNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "CART_NOT_FOUND",
            "Cart not found",
            e.to_string(),
            instance,
        ),
        DomainError::CartItemNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "CART_ITEM_NOT_FOUND",
            "Cart item not found",
            e.to_string(),
            instance,
        ),
        DomainError::CouponNotFound { .. } | DomainError::CouponIdNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "COUPON_NOT_FOUND",
            "Coupon not found",
            e.to_string(),
            instance,
        ),
        DomainError::CouponExpired { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "COUPON_EXPIRED",
            "Coupon expired",
            e.to_string(),
            instance,
        ),
        DomainError::CouponUsageExceeded { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "COUPON_USAGE_EXCEEDED",
            "Usage limit exceeded",
            e.to_string(),
            instance,
        ),
        DomainError::BelowMinimum { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "COUPON_BELOW_MINIMUM",
            "Cart value does not meet minimum",
            e.to_string(),
            instance,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}

/// Malformed or mistyped JSON body.
pub fn map_json_rejection(rejection: &JsonRejection, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "COMMERCE_BAD_PAYLOAD",
        "Invalid input",
        rejection.body_text(),
        instance,
    )
}

pub fn map_path_rejection(rejection: &PathRejection, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "COMMERCE_BAD_PATH",
        "Invalid path parameter",
        rejection.body_text(),
        instance,
    )
}
