//! HTTP request handlers for the recipe book API
//!
//! Handlers are thin: each one unpacks its typed input, makes its data
//! access call (plus a file write for uploads) and returns JSON. Failures
//! go through [`ApiError`], which maps them to 400/404/500.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Multipart, Path, Query, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Json,
};

use crate::database::AppState;
use crate::error::{ApiError, ApiResult};
use crate::model::{
    Feedback, FeedbackRequest, LoginRequest, NewRecipe, ProfilePicResponse, Recipe, RecipeDetail,
    TopParams, User, UserProfile,
};
use crate::upload::{read_form, FilePart};

/// Multipart field carrying a profile picture
pub const PROFILE_PIC_FIELD: &str = "profilePic";

/// Multipart field carrying a recipe image
pub const RECIPE_IMAGE_FIELD: &str = "image";

/// Liveness probe
///
/// `GET /api/ping` answers with the literal text `pong`.
pub async fn ping() -> &'static str {
    "pong"
}

/// Name-only login
///
/// `POST /api/login` with `{ "username": "...", "email": "..." }`. Returns the
/// user registered with that exact pair, creating it on first use.
///
/// - **200 OK** - user object
/// - **400 Bad Request** - `username required`, also for bodies that are not
///   a JSON object with string fields
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    // An unreadable body carries no usable username
    let Json(payload) = payload.map_err(|_| ApiError::BadRequest("username required"))?;

    let user = state
        .store
        .find_or_create_user(payload.username.as_deref(), payload.email.as_deref())?;
    Ok(Json(user))
}

/// `GET /api/user/{id}` - profile page data: the user and their recipes
pub async fn get_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.store.get_user_with_recipes(&id)?))
}

/// Replaces a user's profile picture
///
/// `POST /api/user/{id}/upload` with a multipart `profilePic` file.
///
/// - **200 OK** - `{ "message": "Profile updated", "profilePic": "/uploads/..." }`
/// - **404 Not Found** - unknown user (checked before the file is written)
/// - **400 Bad Request** - no file in the request
pub async fn upload_profile_pic(
    Path(id): Path<String>,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ProfilePicResponse>> {
    state.store.find_user(&id)?;

    let form = read_form(multipart, PROFILE_PIC_FIELD).await?;
    let file = form.file.ok_or(ApiError::BadRequest("No file uploaded"))?;
    let profile_pic = state.uploads.save(&file).await?;
    state.store.set_profile_picture(&id, &profile_pic)?;

    Ok(Json(ProfilePicResponse {
        message: "Profile updated".to_string(),
        profile_pic,
    }))
}

/// Body of `POST /api/recipes`
///
/// Browsers submit `multipart/form-data` with an optional `image` file; API
/// clients may send the same fields as JSON instead.
#[derive(Debug)]
pub struct RecipeForm {
    pub fields: NewRecipe,
    pub image: Option<FilePart>,
}

impl<S> FromRequest<S> for RecipeForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(fields) = Json::<NewRecipe>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self {
                fields,
                image: None,
            });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let form = read_form(multipart, RECIPE_IMAGE_FIELD)
            .await
            .map_err(IntoResponse::into_response)?;

        let mut fields = NewRecipe::default();
        for (name, value) in form.fields {
            fields.set_field(&name, value);
        }

        Ok(Self {
            fields,
            image: form.file,
        })
    }
}

/// Submits a recipe
///
/// An uploaded `image` file wins over an `imageUrl` field. The name is
/// checked before anything is written to disk.
///
/// - **200 OK** - the stored recipe, `views` = 0
/// - **400 Bad Request** - `name required`
pub async fn create_recipe(
    State(state): State<AppState>,
    form: RecipeForm,
) -> ApiResult<Json<Recipe>> {
    let RecipeForm { mut fields, image } = form;
    fields.validate()?;

    if let Some(file) = image {
        fields.image_url = Some(state.uploads.save(&file).await?);
    }

    Ok(Json(state.store.create_recipe(fields)?))
}

/// `GET /api/recipes/top?limit=N` - most viewed recipes, 6 unless told otherwise
pub async fn top_recipes(
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> ApiResult<Json<Vec<Recipe>>> {
    Ok(Json(state.store.list_top_recipes(params.limit())?))
}

/// `GET /api/recipes` - every recipe, newest first
pub async fn list_recipes(State(state): State<AppState>) -> ApiResult<Json<Vec<Recipe>>> {
    Ok(Json(state.store.list_all_recipes()?))
}

/// Recipe detail page data
///
/// `GET /api/recipes/{id}` counts as a view: the response carries the
/// incremented counter together with the recipe's feedback, newest first.
///
/// - **404 Not Found** - unknown recipe
pub async fn get_recipe(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<RecipeDetail>> {
    let recipe = state.store.get_recipe_and_increment_views(&id)?;
    let feedbacks = state.store.list_feedback_for_recipe(&id)?;
    Ok(Json(RecipeDetail { recipe, feedbacks }))
}

/// Leaves a comment on a recipe
///
/// `POST /api/recipes/{id}/feedback` with `{ "user": "...", "comment": "..." }`.
/// A missing `user` is recorded as `Guest`.
///
/// - **400 Bad Request** - `Comment required`, also for unreadable bodies
pub async fn create_feedback(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<Json<Feedback>> {
    let Json(payload) = payload.map_err(|_| ApiError::BadRequest("Comment required"))?;

    let feedback = state.store.create_feedback(
        &id,
        payload.user.as_deref(),
        payload.comment.as_deref(),
    )?;
    Ok(Json(feedback))
}
