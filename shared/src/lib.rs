use serde::{Deserialize, Serialize};

/// Stable message returned whenever a request body is missing required fields.
pub const MISSING_ATTRIBUTES: &str =
    "The request body is missing at least one of the required attributes";

/// A stored business row.
#[derive(Debug, Clone, PartialEq)]
pub struct Business {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    /// Stored as text; coerced to an integer in client responses.
    pub zip_code: String,
}

/// A stored review row.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub stars: i64,
    pub review_text: Option<String>,
}

/// Business field values before an id has been assigned.
#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub owner_id: i64,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Review field values before an id has been assigned.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: i64,
    pub business_id: i64,
    pub stars: i64,
    pub review_text: Option<String>,
}

/// Request body for POST /businesses and PUT /businesses/{id}.
///
/// Every field is optional at the serde level so that presence can be
/// checked explicitly and reported with a stable message instead of a
/// framework deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessRequest {
    pub owner_id: Option<i64>,
    pub name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<i64>,
}

impl BusinessRequest {
    /// Checks that all six required fields are present.
    pub fn validate(self) -> Result<NewBusiness, &'static str> {
        match (
            self.owner_id,
            self.name,
            self.street_address,
            self.city,
            self.state,
            self.zip_code,
        ) {
            (Some(owner_id), Some(name), Some(street_address), Some(city), Some(state), Some(zip_code)) => {
                Ok(NewBusiness {
                    owner_id,
                    name,
                    street_address,
                    city,
                    state,
                    zip_code: zip_code.to_string(),
                })
            }
            _ => Err(MISSING_ATTRIBUTES),
        }
    }
}

/// Request body for POST /reviews. review_text is genuinely optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateReviewRequest {
    pub user_id: Option<i64>,
    pub business_id: Option<i64>,
    pub stars: Option<i64>,
    pub review_text: Option<String>,
}

impl CreateReviewRequest {
    /// Checks that user_id, business_id and stars are present.
    pub fn validate(self) -> Result<NewReview, &'static str> {
        match (self.user_id, self.business_id, self.stars) {
            (Some(user_id), Some(business_id), Some(stars)) => Ok(NewReview {
                user_id,
                business_id,
                stars,
                review_text: self.review_text,
            }),
            _ => Err(MISSING_ATTRIBUTES),
        }
    }
}

/// Request body for PUT /reviews/{id}. Partial update: fields left out of
/// the body keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub stars: Option<i64>,
    pub review_text: Option<String>,
}

impl UpdateReviewRequest {
    pub fn is_empty(&self) -> bool {
        self.stars.is_none() && self.review_text.is_none()
    }
}

/// Client-facing business shape, hyperlink fields included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessResponse {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: i64,
    #[serde(rename = "self")]
    pub self_url: String,
}

/// Client-facing review shape. The parent business appears as an absolute
/// URL rather than a bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub user_id: i64,
    pub business: String,
    pub stars: i64,
    pub review_text: Option<String>,
    #[serde(rename = "self")]
    pub self_url: String,
}

/// Paged envelope for GET /businesses. `next` is omitted from the JSON
/// entirely on the last page, not serialized as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessPage {
    pub entries: Vec<BusinessResponse>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_business_request() -> BusinessRequest {
        BusinessRequest {
            owner_id: Some(7),
            name: Some("Corner Cafe".to_string()),
            street_address: Some("100 Main St".to_string()),
            city: Some("Salem".to_string()),
            state: Some("OR".to_string()),
            zip_code: Some(97301),
        }
    }

    #[test]
    fn business_request_with_all_fields_validates() {
        let new = full_business_request().validate().expect("should validate");
        assert_eq!(new.owner_id, 7);
        assert_eq!(new.name, "Corner Cafe");
        assert_eq!(new.zip_code, "97301");
    }

    #[test]
    fn business_request_missing_any_field_is_rejected() {
        let mut missing_name = full_business_request();
        missing_name.name = None;
        assert_eq!(missing_name.validate().unwrap_err(), MISSING_ATTRIBUTES);

        let mut missing_zip = full_business_request();
        missing_zip.zip_code = None;
        assert_eq!(missing_zip.validate().unwrap_err(), MISSING_ATTRIBUTES);
    }

    #[test]
    fn review_request_requires_core_fields_only() {
        let without_text = CreateReviewRequest {
            user_id: Some(1),
            business_id: Some(2),
            stars: Some(5),
            review_text: None,
        };
        let new = without_text.validate().expect("review_text is optional");
        assert_eq!(new.review_text, None);

        let missing_stars = CreateReviewRequest {
            user_id: Some(1),
            business_id: Some(2),
            stars: None,
            review_text: Some("Great".to_string()),
        };
        assert_eq!(missing_stars.validate().unwrap_err(), MISSING_ATTRIBUTES);
    }

    #[test]
    fn update_review_request_empty_detection() {
        assert!(UpdateReviewRequest::default().is_empty());
        assert!(!UpdateReviewRequest {
            stars: Some(3),
            review_text: None,
        }
        .is_empty());
        assert!(!UpdateReviewRequest {
            stars: None,
            review_text: Some("ok".to_string()),
        }
        .is_empty());
    }

    #[test]
    fn business_response_serializes_self_field() {
        let response = BusinessResponse {
            id: 1,
            owner_id: 7,
            name: "Corner Cafe".to_string(),
            street_address: "100 Main St".to_string(),
            city: "Salem".to_string(),
            state: "OR".to_string(),
            zip_code: 97301,
            self_url: "http://localhost:8080/businesses/1".to_string(),
        };
        let json = serde_json::to_value(&response).expect("serializes");
        assert_eq!(json["self"], "http://localhost:8080/businesses/1");
        assert_eq!(json["zip_code"], 97301);
    }

    #[test]
    fn business_page_omits_next_on_last_page() {
        let page = BusinessPage {
            entries: vec![],
            next: None,
        };
        let json = serde_json::to_value(&page).expect("serializes");
        assert!(json.get("next").is_none());
        assert!(json["entries"].as_array().expect("entries array").is_empty());
    }
}
