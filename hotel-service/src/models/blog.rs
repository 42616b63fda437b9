//! Blog post model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Blog {
    pub blog_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateBlog {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBlog {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub published: Option<bool>,
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to one `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Summer  Offers: 20% off!! "), "summer-offers-20-off");
        assert_eq!(slugify("Spa & Wellness"), "spa-wellness");
        assert_eq!(slugify("---"), "");
    }
}
