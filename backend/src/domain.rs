use crate::db::DbConnection;
use crate::error::{ApiError, ApiResult};
use shared::{Business, NewBusiness, NewReview, Review, UpdateReviewRequest};

pub const NO_SUCH_BUSINESS: &str = "No business with this business_id exists";
pub const NO_SUCH_REVIEW: &str = "No review with this review_id exists";
pub const DUPLICATE_REVIEW: &str = "You have already submitted a review for this business. You can update your previous review, or delete it and submit a new one";
pub const REVIEW_UPDATE_FIELDS: &str =
    "The request body must include at least one of stars or review_text";

/// Business rules around the business table.
#[derive(Clone)]
pub struct BusinessService {
    db: DbConnection,
}

impl BusinessService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert then re-read, so the response reflects the canonical stored
    /// values and the generated id.
    pub async fn create(&self, new: NewBusiness) -> ApiResult<Business> {
        let id = self.db.insert_business(&new).await?;
        self.db
            .get_business(id)
            .await?
            .ok_or_else(|| ApiError::Internal("Failed to fetch created business".to_string()))
    }

    pub async fn get(&self, id: i64) -> ApiResult<Business> {
        self.db
            .get_business(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(NO_SUCH_BUSINESS.to_string()))
    }

    /// One page plus the total row count the pagination links are computed
    /// from.
    pub async fn list(&self, limit: i64, offset: i64) -> ApiResult<(Vec<Business>, i64)> {
        let page = self.db.list_businesses(limit, offset).await?;
        let total = self.db.count_businesses().await?;
        Ok((page, total))
    }

    /// Full replace. All six fields are already validated by the caller.
    pub async fn update(&self, id: i64, fields: NewBusiness) -> ApiResult<Business> {
        if self.db.get_business(id).await?.is_none() {
            return Err(ApiError::NotFound(NO_SUCH_BUSINESS.to_string()));
        }

        self.db.update_business(id, &fields).await?;
        self.db
            .get_business(id)
            .await?
            .ok_or_else(|| ApiError::Internal("Failed to fetch updated business".to_string()))
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        if self.db.get_business(id).await?.is_none() {
            return Err(ApiError::NotFound(NO_SUCH_BUSINESS.to_string()));
        }

        self.db.delete_business(id).await?;
        Ok(())
    }

    pub async fn for_owner(&self, owner_id: i64) -> ApiResult<Vec<Business>> {
        Ok(self.db.businesses_for_owner(owner_id).await?)
    }
}

/// Business rules around the review table.
#[derive(Clone)]
pub struct ReviewService {
    db: DbConnection,
}

impl ReviewService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// The parent business must exist, and the user must not have reviewed
    /// it already. Checked in that order, so a missing business reports 404
    /// rather than 409.
    pub async fn create(&self, new: NewReview) -> ApiResult<Review> {
        if self.db.get_business(new.business_id).await?.is_none() {
            return Err(ApiError::NotFound(NO_SUCH_BUSINESS.to_string()));
        }

        if self
            .db
            .find_review_by_user_and_business(new.user_id, new.business_id)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict(DUPLICATE_REVIEW.to_string()));
        }

        let id = self.db.insert_review(&new).await?;
        self.db
            .get_review(id)
            .await?
            .ok_or_else(|| ApiError::Internal("Failed to fetch created review".to_string()))
    }

    pub async fn get(&self, id: i64) -> ApiResult<Review> {
        self.db
            .get_review(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(NO_SUCH_REVIEW.to_string()))
    }

    /// Partial update: at least one of stars or review_text must be
    /// supplied; the absent field keeps its stored value.
    pub async fn update(&self, id: i64, request: UpdateReviewRequest) -> ApiResult<Review> {
        if request.is_empty() {
            return Err(ApiError::Validation(REVIEW_UPDATE_FIELDS.to_string()));
        }

        if self.db.get_review(id).await?.is_none() {
            return Err(ApiError::NotFound(NO_SUCH_REVIEW.to_string()));
        }

        self.db
            .update_review(id, request.stars, request.review_text.as_deref())
            .await?;
        self.db
            .get_review(id)
            .await?
            .ok_or_else(|| ApiError::Internal("Failed to fetch updated review".to_string()))
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        if self.db.get_review(id).await?.is_none() {
            return Err(ApiError::NotFound(NO_SUCH_REVIEW.to_string()));
        }

        self.db.delete_review(id).await?;
        Ok(())
    }

    pub async fn for_user(&self, user_id: i64) -> ApiResult<Vec<Review>> {
        Ok(self.db.reviews_for_user(user_id).await?)
    }
}
