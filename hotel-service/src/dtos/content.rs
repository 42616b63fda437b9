//! FAQ, blog and contact payloads.

use super::Pagination;
use crate::models::{slugify, CreateContact, CreateFaq, UpdateFaq};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFaqRequest {
    #[validate(length(min = 1, message = "Question is required"))]
    pub question: String,
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
    #[serde(default)]
    pub position: i32,
}

impl From<CreateFaqRequest> for CreateFaq {
    fn from(req: CreateFaqRequest) -> Self {
        Self {
            question: req.question,
            answer: req.answer,
            position: req.position,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFaqRequest {
    #[validate(length(min = 1))]
    pub question: Option<String>,
    #[validate(length(min = 1))]
    pub answer: Option<String>,
    pub position: Option<i32>,
}

impl From<UpdateFaqRequest> for UpdateFaq {
    fn from(req: UpdateFaqRequest) -> Self {
        Self {
            question: req.question,
            answer: req.answer,
            position: req.position,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBlogRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    /// Derived from the title when omitted.
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl CreateBlogRequest {
    /// Normalized slug, or `None` when neither slug nor title yields one.
    pub fn resolved_slug(&self) -> Option<String> {
        let slug = slugify(self.slug.as_deref().unwrap_or(&self.title));
        (!slug.is_empty()).then_some(slug)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBlogRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct BlogListParams {
    /// Include drafts (root only).
    #[serde(default)]
    pub all: bool,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<i64>,
}

impl BlogListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
}

impl From<CreateContactRequest> for CreateContact {
    fn from(req: CreateContactRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            subject: req.subject,
            message: req.message,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ContactListParams {
    #[serde(default)]
    pub unread: bool,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<i64>,
}

impl ContactListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}
