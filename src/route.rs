//! Route definitions for the recipe book
//!
//! JSON API under `/api`, uploaded files under `/uploads`, and everything
//! else from the public directory.

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::database::AppState;
use crate::handler::{
    create_feedback, create_recipe, get_recipe, get_user, list_recipes, login, ping, top_recipes,
    upload_profile_pic,
};

/// Creates the application router
///
/// # Route Definitions
///
/// - `GET  /api/ping` - liveness probe
/// - `POST /api/login` - find or create a user by (username, email)
/// - `GET  /api/user/{id}` - user plus their recipes
/// - `POST /api/user/{id}/upload` - multipart profile picture
/// - `GET  /api/recipes` / `POST /api/recipes` - list all / submit
/// - `GET  /api/recipes/top` - most viewed
/// - `GET  /api/recipes/{id}` - detail with feedback, counts a view
/// - `POST /api/recipes/{id}/feedback` - leave a comment
/// - `GET  /uploads/*` - uploaded files
/// - anything else - static files from `public_dir`
///
/// # Example Usage
///
/// ```no_run
/// # use std::sync::Arc;
/// # use recipebook::database::{init_db, AppState};
/// # use recipebook::route::create_app;
/// # use recipebook::store::RecipeStore;
/// # use recipebook::upload::UploadStore;
/// # let db = init_db("recipes.db").unwrap();
/// let state = AppState {
///     store: RecipeStore::new(Arc::new(db)),
///     uploads: UploadStore::new("public/uploads"),
/// };
/// let app = create_app(state, "public");
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());

    let api_routes = Router::new()
        .route("/ping", get(ping))
        .route("/login", post(login))
        .route("/user/{id}", get(get_user))
        .route("/user/{id}/upload", post(upload_profile_pic))
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/top", get(top_recipes))
        .route("/recipes/{id}", get(get_recipe))
        .route("/recipes/{id}/feedback", post(create_feedback));

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", uploads)
        .fallback_service(ServeDir::new(public_dir.as_ref()))
        // uploads are accepted at any size
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
