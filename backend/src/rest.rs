use std::collections::HashMap;

use axum::{
    extract::{Host, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::domain::{BusinessService, ReviewService};
use crate::error::{ApiError, ApiResult};
use crate::format;
use shared::{
    BusinessPage, BusinessRequest, BusinessResponse, CreateReviewRequest, ReviewResponse,
    UpdateReviewRequest, MISSING_ATTRIBUTES,
};

/// Default page size for GET /businesses.
const DEFAULT_LIMIT: i64 = 3;

pub const PAGE_PARAMS_MESSAGE: &str = "The limit and offset query parameters must be integers";

/// Application state shared across handlers via axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub businesses: BusinessService,
    pub reviews: ReviewService,
}

impl AppState {
    pub fn new(businesses: BusinessService, reviews: ReviewService) -> Self {
        Self {
            businesses,
            reviews,
        }
    }
}

/// Absolute URL prefix for hyperlink fields, derived from the request host.
fn base_url(host: &str) -> String {
    format!("http://{}", host)
}

/// Path ids arrive as text and are parsed here so that a non-integer id
/// yields a 400 with the standard error envelope.
fn parse_id(raw: &str, name: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("The {} in the URL must be an integer", name)))
}

fn parse_page_param(params: &HashMap<String, String>, name: &str, default: i64) -> ApiResult<i64> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::Validation(PAGE_PARAMS_MESSAGE.to_string())),
    }
}

/// Axum handler for GET /
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "available_routes": {
            "POST /businesses": "Create a new business",
            "GET /businesses": "List all businesses",
            "GET /businesses/{business_id}": "Get a business by ID",
            "PUT /businesses/{business_id}": "Update a business by ID",
            "DELETE /businesses/{business_id}": "Delete a business and its reviews",
            "GET /owners/{owner_id}/businesses": "List all businesses for an owner",
            "POST /reviews": "Create a new review",
            "GET /reviews/{review_id}": "Get a review by ID",
            "PUT /reviews/{review_id}": "Update a review by ID",
            "DELETE /reviews/{review_id}": "Delete a review by ID",
            "GET /users/{user_id}/reviews": "List all reviews made by a user"
        }
    }))
}

/// Axum handler for POST /businesses
pub async fn create_business(
    State(state): State<AppState>,
    Host(host): Host,
    body: Option<Json<BusinessRequest>>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /businesses");

    let Some(Json(request)) = body else {
        return Err(ApiError::Validation(MISSING_ATTRIBUTES.to_string()));
    };
    let new = request
        .validate()
        .map_err(|msg| ApiError::Validation(msg.to_string()))?;

    let business = state.businesses.create(new).await?;
    let response = format::business_response(&business, &base_url(&host))?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Axum handler for GET /businesses/{business_id}
pub async fn get_business(
    State(state): State<AppState>,
    Host(host): Host,
    Path(business_id): Path<String>,
) -> ApiResult<Json<BusinessResponse>> {
    info!("GET /businesses/{}", business_id);

    let id = parse_id(&business_id, "business_id")?;
    let business = state.businesses.get(id).await?;

    Ok(Json(format::business_response(&business, &base_url(&host))?))
}

/// Axum handler for GET /businesses?limit&offset
pub async fn list_businesses(
    State(state): State<AppState>,
    Host(host): Host,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<BusinessPage>> {
    info!("GET /businesses - params: {:?}", params);

    let limit = parse_page_param(&params, "limit", DEFAULT_LIMIT)?;
    let offset = parse_page_param(&params, "offset", 0)?;

    let (page, total) = state.businesses.list(limit, offset).await?;

    let base = base_url(&host);
    let entries = page
        .iter()
        .map(|business| format::business_response(business, &base))
        .collect::<ApiResult<Vec<_>>>()?;

    // Advertise the next page only while rows remain past this one.
    let next = (offset + limit < total).then(|| {
        format!(
            "{}/businesses?limit={}&offset={}",
            base,
            limit,
            offset + limit
        )
    });

    Ok(Json(BusinessPage { entries, next }))
}

/// Axum handler for PUT /businesses/{business_id}
pub async fn update_business(
    State(state): State<AppState>,
    Host(host): Host,
    Path(business_id): Path<String>,
    body: Option<Json<BusinessRequest>>,
) -> ApiResult<Json<BusinessResponse>> {
    info!("PUT /businesses/{}", business_id);

    let id = parse_id(&business_id, "business_id")?;
    let Some(Json(request)) = body else {
        return Err(ApiError::Validation(MISSING_ATTRIBUTES.to_string()));
    };
    let fields = request
        .validate()
        .map_err(|msg| ApiError::Validation(msg.to_string()))?;

    let business = state.businesses.update(id, fields).await?;

    Ok(Json(format::business_response(&business, &base_url(&host))?))
}

/// Axum handler for DELETE /businesses/{business_id}
pub async fn delete_business(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
) -> ApiResult<StatusCode> {
    info!("DELETE /businesses/{}", business_id);

    let id = parse_id(&business_id, "business_id")?;
    state.businesses.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Axum handler for GET /owners/{owner_id}/businesses
///
/// Returns a bare array, no envelope and no pagination.
pub async fn list_owner_businesses(
    State(state): State<AppState>,
    Host(host): Host,
    Path(owner_id): Path<String>,
) -> ApiResult<Json<Vec<BusinessResponse>>> {
    info!("GET /owners/{}/businesses", owner_id);

    let owner_id = parse_id(&owner_id, "owner_id")?;
    let businesses = state.businesses.for_owner(owner_id).await?;

    let base = base_url(&host);
    let responses = businesses
        .iter()
        .map(|business| format::business_response(business, &base))
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(responses))
}

/// Axum handler for POST /reviews
pub async fn create_review(
    State(state): State<AppState>,
    Host(host): Host,
    body: Option<Json<CreateReviewRequest>>,
) -> ApiResult<impl IntoResponse> {
    info!("POST /reviews");

    let Some(Json(request)) = body else {
        return Err(ApiError::Validation(MISSING_ATTRIBUTES.to_string()));
    };
    let new = request
        .validate()
        .map_err(|msg| ApiError::Validation(msg.to_string()))?;

    let review = state.reviews.create(new).await?;
    let response = format::review_response(&review, &base_url(&host));

    Ok((StatusCode::CREATED, Json(response)))
}

/// Axum handler for GET /reviews/{review_id}
///
/// A non-integer id is a 400, not a 200 with an error body.
pub async fn get_review(
    State(state): State<AppState>,
    Host(host): Host,
    Path(review_id): Path<String>,
) -> ApiResult<Json<ReviewResponse>> {
    info!("GET /reviews/{}", review_id);

    let id = parse_id(&review_id, "review_id")?;
    let review = state.reviews.get(id).await?;

    Ok(Json(format::review_response(&review, &base_url(&host))))
}

/// Axum handler for PUT /reviews/{review_id}
pub async fn update_review(
    State(state): State<AppState>,
    Host(host): Host,
    Path(review_id): Path<String>,
    body: Option<Json<UpdateReviewRequest>>,
) -> ApiResult<Json<ReviewResponse>> {
    info!("PUT /reviews/{}", review_id);

    let id = parse_id(&review_id, "review_id")?;
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let review = state.reviews.update(id, request).await?;

    Ok(Json(format::review_response(&review, &base_url(&host))))
}

/// Axum handler for DELETE /reviews/{review_id}
pub async fn delete_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> ApiResult<StatusCode> {
    info!("DELETE /reviews/{}", review_id);

    let id = parse_id(&review_id, "review_id")?;
    state.reviews.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Axum handler for GET /users/{user_id}/reviews
///
/// Returns a bare array, no envelope and no pagination.
pub async fn list_user_reviews(
    State(state): State<AppState>,
    Host(host): Host,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<ReviewResponse>>> {
    info!("GET /users/{}/reviews", user_id);

    let user_id = parse_id(&user_id, "user_id")?;
    let reviews = state.reviews.for_user(user_id).await?;

    let base = base_url(&host);
    let responses = reviews
        .iter()
        .map(|review| format::review_response(review, &base))
        .collect();

    Ok(Json(responses))
}
