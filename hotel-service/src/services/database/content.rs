//! Public site content: FAQs, blog posts and contact messages.

use super::Database;
use crate::models::{Blog, Contact, CreateBlog, CreateContact, CreateFaq, Faq, UpdateBlog, UpdateFaq};
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

const FAQ_COLUMNS: &str = "faq_id, question, answer, position, created_utc";
const BLOG_COLUMNS: &str =
    "blog_id, title, slug, content, image_url, published, created_utc, updated_utc";
const CONTACT_COLUMNS: &str = "contact_id, name, email, subject, message, read, created_utc";

impl Database {
    #[instrument(skip(self, input))]
    pub async fn create_faq(&self, input: &CreateFaq) -> Result<Faq, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_faq"])
            .start_timer();

        let faq = sqlx::query_as::<_, Faq>(&format!(
            r#"
            INSERT INTO faqs (faq_id, question, answer, position)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            FAQ_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.question)
        .bind(&input.answer)
        .bind(input.position)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to create faq", e))?;

        timer.observe_duration();

        info!(faq_id = %faq.faq_id, "FAQ created");

        Ok(faq)
    }

    #[instrument(skip(self))]
    pub async fn list_faqs(&self, limit: i64, offset: i64) -> Result<Vec<Faq>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_faqs"])
            .start_timer();

        let faqs = sqlx::query_as::<_, Faq>(&format!(
            "SELECT {} FROM faqs ORDER BY position, created_utc LIMIT $1 OFFSET $2",
            FAQ_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list faqs: {}", e)))?;

        timer.observe_duration();

        Ok(faqs)
    }

    #[instrument(skip(self, input), fields(faq_id = %faq_id))]
    pub async fn update_faq(&self, faq_id: Uuid, input: &UpdateFaq) -> Result<Option<Faq>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_faq"])
            .start_timer();

        let faq = sqlx::query_as::<_, Faq>(&format!(
            r#"
            UPDATE faqs
            SET question = COALESCE($2, question),
                answer = COALESCE($3, answer),
                position = COALESCE($4, position)
            WHERE faq_id = $1
            RETURNING {}
            "#,
            FAQ_COLUMNS
        ))
        .bind(faq_id)
        .bind(&input.question)
        .bind(&input.answer)
        .bind(input.position)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to update faq", e))?;

        timer.observe_duration();

        Ok(faq)
    }

    #[instrument(skip(self), fields(faq_id = %faq_id))]
    pub async fn delete_faq(&self, faq_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_faq"])
            .start_timer();

        let result = sqlx::query("DELETE FROM faqs WHERE faq_id = $1")
            .bind(faq_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to delete faq", e))?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create_blog(&self, input: &CreateBlog) -> Result<Blog, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_blog"])
            .start_timer();

        let blog = sqlx::query_as::<_, Blog>(&format!(
            r#"
            INSERT INTO blogs (blog_id, title, slug, content, image_url, published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            BLOG_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(&input.image_url)
        .bind(input.published)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to create blog", e))?;

        timer.observe_duration();

        info!(blog_id = %blog.blog_id, slug = %blog.slug, "Blog post created");

        Ok(blog)
    }

    /// Get a blog post by slug; unpublished posts only when `include_drafts`.
    #[instrument(skip(self))]
    pub async fn get_blog_by_slug(
        &self,
        slug: &str,
        include_drafts: bool,
    ) -> Result<Option<Blog>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_blog_by_slug"])
            .start_timer();

        let blog = sqlx::query_as::<_, Blog>(&format!(
            "SELECT {} FROM blogs WHERE slug = $1 AND ($2 OR published)",
            BLOG_COLUMNS
        ))
        .bind(slug)
        .bind(include_drafts)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get blog: {}", e)))?;

        timer.observe_duration();

        Ok(blog)
    }

    /// List blog posts, newest first.
    #[instrument(skip(self))]
    pub async fn list_blogs(
        &self,
        include_drafts: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Blog>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_blogs"])
            .start_timer();

        let blogs = sqlx::query_as::<_, Blog>(&format!(
            r#"
            SELECT {}
            FROM blogs
            WHERE ($1 OR published)
            ORDER BY created_utc DESC, blog_id
            LIMIT $2 OFFSET $3
            "#,
            BLOG_COLUMNS
        ))
        .bind(include_drafts)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list blogs: {}", e)))?;

        timer.observe_duration();

        Ok(blogs)
    }

    #[instrument(skip(self, input), fields(blog_id = %blog_id))]
    pub async fn update_blog(
        &self,
        blog_id: Uuid,
        input: &UpdateBlog,
    ) -> Result<Option<Blog>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_blog"])
            .start_timer();

        let blog = sqlx::query_as::<_, Blog>(&format!(
            r#"
            UPDATE blogs
            SET title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                content = COALESCE($4, content),
                image_url = COALESCE($5, image_url),
                published = COALESCE($6, published),
                updated_utc = NOW()
            WHERE blog_id = $1
            RETURNING {}
            "#,
            BLOG_COLUMNS
        ))
        .bind(blog_id)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(&input.image_url)
        .bind(input.published)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to update blog", e))?;

        timer.observe_duration();

        if blog.is_some() {
            info!(blog_id = %blog_id, "Blog post updated");
        }

        Ok(blog)
    }

    #[instrument(skip(self), fields(blog_id = %blog_id))]
    pub async fn delete_blog(&self, blog_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_blog"])
            .start_timer();

        let result = sqlx::query("DELETE FROM blogs WHERE blog_id = $1")
            .bind(blog_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to delete blog", e))?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    /// Store a contact form submission.
    #[instrument(skip(self, input))]
    pub async fn create_contact(&self, input: &CreateContact) -> Result<Contact, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_contact"])
            .start_timer();

        let contact = sqlx::query_as::<_, Contact>(&format!(
            r#"
            INSERT INTO contacts (contact_id, name, email, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.subject)
        .bind(&input.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to store contact message", e))?;

        timer.observe_duration();

        info!(contact_id = %contact.contact_id, "Contact message received");

        Ok(contact)
    }

    /// List contact messages, newest first.
    #[instrument(skip(self))]
    pub async fn list_contacts(
        &self,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contact>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_contacts"])
            .start_timer();

        let contacts = sqlx::query_as::<_, Contact>(&format!(
            r#"
            SELECT {}
            FROM contacts
            WHERE ($1 = FALSE OR read = FALSE)
            ORDER BY created_utc DESC, contact_id
            LIMIT $2 OFFSET $3
            "#,
            CONTACT_COLUMNS
        ))
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list contacts: {}", e)))?;

        timer.observe_duration();

        Ok(contacts)
    }

    #[instrument(skip(self), fields(contact_id = %contact_id))]
    pub async fn mark_contact_read(&self, contact_id: Uuid) -> Result<Option<Contact>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["mark_contact_read"])
            .start_timer();

        let contact = sqlx::query_as::<_, Contact>(&format!(
            "UPDATE contacts SET read = TRUE WHERE contact_id = $1 RETURNING {}",
            CONTACT_COLUMNS
        ))
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to mark contact read", e))?;

        timer.observe_duration();

        Ok(contact)
    }

    #[instrument(skip(self), fields(contact_id = %contact_id))]
    pub async fn delete_contact(&self, contact_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_contact"])
            .start_timer();

        let result = sqlx::query("DELETE FROM contacts WHERE contact_id = $1")
            .bind(contact_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to delete contact", e))?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }
}
