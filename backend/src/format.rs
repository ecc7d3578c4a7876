//! Pure entity-to-response formatters. Deterministic given an entity and
//! the request's base URL; no side effects.

use crate::error::{ApiError, ApiResult};
use shared::{Business, BusinessResponse, Review, ReviewResponse};

pub fn business_url(base: &str, id: i64) -> String {
    format!("{}/businesses/{}", base, id)
}

pub fn review_url(base: &str, id: i64) -> String {
    format!("{}/reviews/{}", base, id)
}

/// Client-facing business shape: zip_code coerced from its stored text to
/// an integer, plus a `self` hyperlink.
pub fn business_response(business: &Business, base: &str) -> ApiResult<BusinessResponse> {
    let zip_code = business.zip_code.parse::<i64>().map_err(|_| {
        ApiError::Internal(format!(
            "Stored zip_code {:?} for business {} is not numeric",
            business.zip_code, business.id
        ))
    })?;

    Ok(BusinessResponse {
        id: business.id,
        owner_id: business.owner_id,
        name: business.name.clone(),
        street_address: business.street_address.clone(),
        city: business.city.clone(),
        state: business.state.clone(),
        zip_code,
        self_url: business_url(base, business.id),
    })
}

/// Client-facing review shape: the raw business_id becomes a `business`
/// hyperlink next to `self`.
pub fn review_response(review: &Review, base: &str) -> ReviewResponse {
    ReviewResponse {
        id: review.id,
        user_id: review.user_id,
        business: business_url(base, review.business_id),
        stars: review.stars,
        review_text: review.review_text.clone(),
        self_url: review_url(base, review.id),
    }
}
