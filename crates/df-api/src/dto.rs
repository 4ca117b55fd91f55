//! Request payloads, one per operation, each validated before any
//! service or ledger code runs. Field names are camelCase on the wire.

use serde::Deserialize;

use df_core::error::{AppError, Result};
use df_core::models::{CommunityRule, VoteValue};
use df_core::traits::QuestionSort;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<()> {
        let username = self.username.trim();
        if username.len() < 3 || username.len() > 30 {
            return Err(AppError::ValidationError("username must be 3-30 characters".into()));
        }
        if !self.email.contains('@') {
            return Err(AppError::ValidationError("a valid email is required".into()));
        }
        if self.password.len() < 6 {
            return Err(AppError::ValidationError("password must be at least 6 characters".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<()> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(AppError::ValidationError("email and password are required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(bio) = &self.bio {
            if bio.len() > 500 {
                return Err(AppError::ValidationError("bio must be less than 500 characters".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

impl CreateQuestionRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::ValidationError("title is required".into()));
        }
        if self.title.len() > 200 {
            return Err(AppError::ValidationError("title must be at most 200 characters".into()));
        }
        if self.body.trim().is_empty() {
            return Err(AppError::ValidationError("body is required".into()));
        }
        if self.tags.iter().filter(|t| !t.trim().is_empty()).count() == 0 {
            return Err(AppError::ValidationError("at least one tag is required".into()));
        }
        Ok(())
    }
}

/// The persisted vote-value domain is {1, -1}; anything else is rejected
/// here, before the ledger ever sees it.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub value: i64,
}

impl VoteRequest {
    pub fn vote_value(&self) -> Result<VoteValue> {
        VoteValue::try_from(self.value)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnswerRequest {
    pub body: String,
}

impl CreateAnswerRequest {
    pub fn validate(&self) -> Result<()> {
        if self.body.trim().is_empty() {
            return Err(AppError::ValidationError("answer body is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub body: String,
}

impl CreateCommentRequest {
    pub fn validate(&self) -> Result<()> {
        let body = self.body.trim();
        if body.is_empty() {
            return Err(AppError::ValidationError("comment body is required".into()));
        }
        if body.len() > 1000 {
            return Err(AppError::ValidationError("comment must be at most 1000 characters".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl From<RuleRequest> for CommunityRule {
    fn from(r: RuleRequest) -> Self {
        CommunityRule { title: r.title, description: r.description }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityRequest {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: Vec<RuleRequest>,
}

impl CreateCommunityRequest {
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim().to_lowercase();
        if name.len() < 2 || name.len() > 30 {
            return Err(AppError::ValidationError("community name must be 2-30 characters".into()));
        }
        if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
            return Err(AppError::ValidationError(
                "community name can only contain lowercase letters and numbers".into(),
            ));
        }
        let display_name = self.display_name.trim();
        if display_name.is_empty() || display_name.len() > 50 {
            return Err(AppError::ValidationError("display name must be 1-50 characters".into()));
        }
        if self.description.len() > 500 {
            return Err(AppError::ValidationError("description must be at most 500 characters".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommunityRequest {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub rules: Option<Vec<RuleRequest>>,
    pub is_public: Option<bool>,
}

impl UpdateCommunityRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(display_name) = &self.display_name {
            let display_name = display_name.trim();
            if display_name.is_empty() || display_name.len() > 50 {
                return Err(AppError::ValidationError("display name must be 1-50 characters".into()));
            }
        }
        if let Some(description) = &self.description {
            if description.len() > 500 {
                return Err(AppError::ValidationError("description must be at most 500 characters".into()));
            }
        }
        Ok(())
    }
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// Ceiling for client-supplied page numbers. Keeps `(page - 1) * limit`
/// far away from i64 overflow no matter what the query string says.
const MAX_PAGE: i64 = 1_000_000;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct QuestionListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub sort: Option<String>,
    pub search: Option<String>,
    pub tag: Option<String>,
}

impl QuestionListParams {
    pub fn page(&self) -> i64 {
        self.page.clamp(1, MAX_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    pub fn sort_order(&self) -> QuestionSort {
        match self.sort.as_deref() {
            Some("createdAt") | Some("oldest") => QuestionSort::Oldest,
            Some("views") | Some("-views") => QuestionSort::MostViewed,
            _ => QuestionSort::Newest,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub search: Option<String>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.clamp(1, MAX_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_request_rejects_out_of_domain_values() {
        assert!(VoteRequest { value: 1 }.vote_value().is_ok());
        assert!(VoteRequest { value: -1 }.vote_value().is_ok());
        assert!(VoteRequest { value: 0 }.vote_value().is_err());
        assert!(VoteRequest { value: 5 }.vote_value().is_err());
    }

    #[test]
    fn community_name_charset_is_enforced() {
        let mut req = CreateCommunityRequest {
            name: "rust2024".into(),
            display_name: "Rust".into(),
            description: String::new(),
            rules: Vec::new(),
        };
        assert!(req.validate().is_ok());
        req.name = "has space".into();
        assert!(req.validate().is_err());
        req.name = "a".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn page_and_limit_clamp_to_sane_bounds() {
        let params = PageParams { page: i64::MAX, limit: i64::MAX, search: None };
        assert_eq!(params.page(), MAX_PAGE);
        assert_eq!(params.limit(), MAX_LIMIT);
        assert!(params.page().checked_mul(params.limit()).is_some());

        let params = PageParams { page: -3, limit: 0, search: None };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 1);

        let params = QuestionListParams {
            page: i64::MAX,
            limit: 500,
            sort: None,
            search: None,
            tag: None,
        };
        assert_eq!(params.page(), MAX_PAGE);
        assert_eq!(params.limit(), MAX_LIMIT);
    }

    #[test]
    fn question_requires_a_nonempty_tag() {
        let req = CreateQuestionRequest {
            title: "t".into(),
            body: "b".into(),
            tags: vec!["  ".into()],
        };
        assert!(req.validate().is_err());
    }
}
