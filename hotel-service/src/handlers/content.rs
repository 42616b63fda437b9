//! FAQs, blog posts and the contact form.

use crate::dtos::{
    BlogListParams, ContactListParams, CreateBlogRequest, CreateContactRequest, CreateFaqRequest,
    ListResponse, PageParams, UpdateBlogRequest, UpdateFaqRequest,
};
use crate::middleware::{MaybeUser, RootUser};
use crate::models::{slugify, Blog, Contact, CreateBlog, Faq, UpdateBlog};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

pub async fn list_faqs(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<ListResponse<Faq>>, AppError> {
    params.validate()?;
    let page = params.pagination();

    let faqs = state.db.list_faqs(page.limit(), page.offset()).await?;

    Ok(Json(ListResponse::new(faqs, page)))
}

pub async fn create_faq(
    State(state): State<AppState>,
    _root: RootUser,
    Json(payload): Json<CreateFaqRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let faq = state.db.create_faq(&payload.into()).await?;

    Ok((StatusCode::CREATED, Json(faq)))
}

pub async fn update_faq(
    State(state): State<AppState>,
    _root: RootUser,
    Path(faq_id): Path<Uuid>,
    Json(payload): Json<UpdateFaqRequest>,
) -> Result<Json<Faq>, AppError> {
    payload.validate()?;

    state
        .db
        .update_faq(faq_id, &payload.into())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("FAQ {} not found", faq_id)))
}

pub async fn delete_faq(
    State(state): State<AppState>,
    _root: RootUser,
    Path(faq_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.db.delete_faq(faq_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("FAQ {} not found", faq_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Published posts; root sees drafts too with `?all=true`.
pub async fn list_blogs(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(params): Query<BlogListParams>,
) -> Result<Json<ListResponse<Blog>>, AppError> {
    params.validate()?;
    let page = params.pagination();
    let include_drafts = params.all && user.is_root();

    let blogs = state
        .db
        .list_blogs(include_drafts, page.limit(), page.offset())
        .await?;

    Ok(Json(ListResponse::new(blogs, page)))
}

pub async fn get_blog(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<Blog>, AppError> {
    state
        .db
        .get_blog_by_slug(&slug, user.is_root())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Blog post '{}' not found", slug)))
}

pub async fn create_blog(
    State(state): State<AppState>,
    _root: RootUser,
    Json(payload): Json<CreateBlogRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let slug = payload.resolved_slug().ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("Cannot derive a slug from the given title"))
    })?;
    let input = CreateBlog {
        title: payload.title,
        slug,
        content: payload.content,
        image_url: payload.image_url,
        published: payload.published,
    };
    let blog = state.db.create_blog(&input).await?;

    Ok((StatusCode::CREATED, Json(blog)))
}

pub async fn update_blog(
    State(state): State<AppState>,
    _root: RootUser,
    Path(blog_id): Path<Uuid>,
    Json(payload): Json<UpdateBlogRequest>,
) -> Result<Json<Blog>, AppError> {
    payload.validate()?;

    let slug = match payload.slug.as_deref().map(slugify) {
        Some(slug) if slug.is_empty() => {
            return Err(AppError::BadRequest(anyhow::anyhow!("Slug must contain letters or digits")));
        }
        other => other,
    };
    let input = UpdateBlog {
        title: payload.title,
        slug,
        content: payload.content,
        image_url: payload.image_url,
        published: payload.published,
    };

    state
        .db
        .update_blog(blog_id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Blog post {} not found", blog_id)))
}

pub async fn delete_blog(
    State(state): State<AppState>,
    _root: RootUser,
    Path(blog_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.db.delete_blog(blog_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Blog post {} not found", blog_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Public contact form.
pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let contact = state.db.create_contact(&payload.into()).await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    _root: RootUser,
    Query(params): Query<ContactListParams>,
) -> Result<Json<ListResponse<Contact>>, AppError> {
    params.validate()?;
    let page = params.pagination();

    let contacts = state
        .db
        .list_contacts(params.unread, page.limit(), page.offset())
        .await?;

    Ok(Json(ListResponse::new(contacts, page)))
}

pub async fn mark_contact_read(
    State(state): State<AppState>,
    _root: RootUser,
    Path(contact_id): Path<Uuid>,
) -> Result<Json<Contact>, AppError> {
    state
        .db
        .mark_contact_read(contact_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Contact {} not found", contact_id)))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    _root: RootUser,
    Path(contact_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.db.delete_contact(contact_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Contact {} not found", contact_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
