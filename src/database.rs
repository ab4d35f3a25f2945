//! Database initialization and table definitions
//!
//! The embedded redb file plays the role of the document store. Each
//! collection is a table of JSON documents keyed by id; secondary index
//! tables make the per-user and per-recipe listings range scans instead of
//! full table walks.

use redb::{Database, TableDefinition};

use crate::store::RecipeStore;
use crate::upload::UploadStore;

/// Users collection
///
/// Key: user id. Value: JSON-serialized `User`.
pub const TABLE_USERS: TableDefinition<&str, &str> = TableDefinition::new("users_v1");

/// Recipes collection
///
/// Key: recipe id. Value: JSON-serialized `Recipe`.
pub const TABLE_RECIPES: TableDefinition<&str, &str> = TableDefinition::new("recipes_v1");

/// Feedback collection
///
/// Key: feedback id. Value: JSON-serialized `Feedback`.
pub const TABLE_FEEDBACK: TableDefinition<&str, &str> = TableDefinition::new("feedback_v1");

/// Login lookup index
///
/// Key: JSON array `[username, email]` (email is `null` when absent).
/// Value: id of the first user created with that pair.
pub const TABLE_USER_LOGINS: TableDefinition<&str, &str> = TableDefinition::new("user_logins_v1");

/// Recipes-by-author index
///
/// Key: `"{user_id}:{created_at_micros:020}:{recipe_id}"`. Value: recipe id.
///
/// Only the id is stored since recipe documents change when their view
/// counter moves.
pub const TABLE_RECIPES_BY_USER: TableDefinition<&str, &str> =
    TableDefinition::new("recipes_by_user_v1");

/// Feedback-by-recipe index
///
/// Key: `"{recipe_id}:{created_at_micros:020}:{feedback_id}"`.
/// Value: JSON-serialized `Feedback` (feedback is immutable, so the copy
/// never goes stale).
pub const TABLE_FEEDBACK_BY_RECIPE: TableDefinition<&str, &str> =
    TableDefinition::new("feedback_by_recipe_v1");

/// Application state shared across all request handlers
///
/// Both members are cheap to clone; the database itself sits behind an
/// `Arc` inside [`RecipeStore`].
#[derive(Clone)]
pub struct AppState {
    /// Data access handle
    pub store: RecipeStore,

    /// Where uploaded files are written
    pub uploads: UploadStore,
}

/// Creates or opens the database file and makes sure every table exists
///
/// # Example
///
/// ```no_run
/// # use recipebook::database::init_db;
/// let db = init_db("recipes.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_USERS)?;
        write_txn.open_table(TABLE_RECIPES)?;
        write_txn.open_table(TABLE_FEEDBACK)?;
        write_txn.open_table(TABLE_USER_LOGINS)?;
        write_txn.open_table(TABLE_RECIPES_BY_USER)?;
        write_txn.open_table(TABLE_FEEDBACK_BY_RECIPE)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Builds an index key that sorts by owner, then creation time
pub(crate) fn index_key(owner_id: &str, created_micros: i64, doc_id: &str) -> String {
    format!("{owner_id}:{created_micros:020}:{doc_id}")
}

/// Half-open key range covering every index entry of `owner_id`
///
/// `;` is the byte right after `:`, so the range stops exactly at the end of
/// the owner's prefix.
pub(crate) fn index_range(owner_id: &str) -> (String, String) {
    (format!("{owner_id}:"), format!("{owner_id};"))
}
