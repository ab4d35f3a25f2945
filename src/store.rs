//! Data access layer
//!
//! [`RecipeStore`] is the only code that touches the database. Every method
//! runs inside a single redb transaction; redb allows one writer at a time,
//! which is what makes the view counter increment atomic.

use std::sync::Arc;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, Table};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::database::{
    index_key, index_range, TABLE_FEEDBACK, TABLE_FEEDBACK_BY_RECIPE, TABLE_RECIPES,
    TABLE_RECIPES_BY_USER, TABLE_USERS, TABLE_USER_LOGINS,
};
use crate::error::StoreError;
use crate::model::{
    is_object_id, new_object_id, non_empty, Feedback, NewRecipe, Recipe, User, UserProfile,
};

/// Author name used when a recipe is submitted without one
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Commenter name used when feedback is submitted without one
pub const GUEST_COMMENTER: &str = "Guest";

type DocTable<'txn> = Table<'txn, &'static str, &'static str>;

/// Typed access to users, recipes and feedback
///
/// Holds the database handle injected at startup; clone it freely.
#[derive(Clone)]
pub struct RecipeStore {
    db: Arc<Database>,
}

impl RecipeStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Returns the user registered with exactly this (username, email) pair,
    /// creating one if there is none
    pub fn find_or_create_user(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, StoreError> {
        let username =
            non_empty(username).ok_or(StoreError::Validation("username required"))?;
        let login_key = serde_json::to_string(&(username, email))?;

        // Lookup and insert share one write transaction
        let write_txn = self.db.begin_write()?;
        let user = {
            let mut logins = write_txn.open_table(TABLE_USER_LOGINS)?;
            let mut users = write_txn.open_table(TABLE_USERS)?;

            // Resolve the (username, email) pair to a user id, then the id to a document
            let known_id = logins
                .get(login_key.as_str())?
                .map(|guard| guard.value().to_string());
            let existing = match known_id {
                Some(id) => users
                    .get(id.as_str())?
                    .map(|guard| decode::<User>(guard.value()))
                    .transpose()?,
                None => None,
            };

            match existing {
                Some(user) => user,
                None => {
                    let now = Utc::now();
                    let user = User {
                        id: new_object_id(),
                        username: username.to_string(),
                        email: email.map(str::to_string),
                        profile_pic: None,
                        created_at: now,
                        updated_at: now,
                    };
                    // Store the document and register the pair for the next login
                    put_doc(&mut users, &user.id, &user)?;
                    logins.insert(login_key.as_str(), user.id.as_str())?;
                    debug!(user_id = %user.id, username = %user.username, "created user");
                    user
                }
            }
        };
        write_txn.commit()?;

        Ok(user)
    }

    /// Looks up a single user
    pub fn find_user(&self, user_id: &str) -> Result<User, StoreError> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(TABLE_USERS)?;
        let user = users
            .get(user_id)?
            .map(|guard| decode::<User>(guard.value()))
            .transpose()?;
        user.ok_or(StoreError::NotFound("User"))
    }

    /// Returns a user and every recipe that references them, newest first
    pub fn get_user_with_recipes(&self, user_id: &str) -> Result<UserProfile, StoreError> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(TABLE_USERS)?;
        let user = users
            .get(user_id)?
            .map(|guard| decode::<User>(guard.value()))
            .transpose()?
            .ok_or(StoreError::NotFound("User"))?;

        // The author index holds recipe ids only; documents are read from the
        // recipes table so the view counts are current
        let index = read_txn.open_table(TABLE_RECIPES_BY_USER)?;
        let recipes_table = read_txn.open_table(TABLE_RECIPES)?;
        let (start, end) = index_range(&user.id);

        let mut recipes = Vec::new();
        for entry in index.range(start.as_str()..end.as_str())?.rev() {
            let (_, recipe_id) = entry?;
            if let Some(guard) = recipes_table.get(recipe_id.value())? {
                recipes.push(decode::<Recipe>(guard.value())?);
            }
        }

        Ok(UserProfile { user, recipes })
    }

    /// Points the user's `profilePic` at `path` and returns the updated user
    pub fn set_profile_picture(&self, user_id: &str, path: &str) -> Result<User, StoreError> {
        let write_txn = self.db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(TABLE_USERS)?;
            let mut user = users
                .get(user_id)?
                .map(|guard| decode::<User>(guard.value()))
                .transpose()?
                .ok_or(StoreError::NotFound("User"))?;

            user.profile_pic = Some(path.to_string());
            user.updated_at = Utc::now();
            put_doc(&mut users, &user.id, &user)?;
            user
        };
        write_txn.commit()?;

        debug!(user_id, path, "updated profile picture");
        Ok(user)
    }

    /// Stores a new recipe with zero views
    pub fn create_recipe(&self, fields: NewRecipe) -> Result<Recipe, StoreError> {
        let recipe = build_recipe(fields)?;
        self.write_recipes(std::slice::from_ref(&recipe))?;
        Ok(recipe)
    }

    /// Stores several recipes in one transaction
    ///
    /// Fails without writing anything if any entry lacks a name.
    pub fn insert_recipes(&self, batch: Vec<NewRecipe>) -> Result<Vec<Recipe>, StoreError> {
        let recipes = batch
            .into_iter()
            .map(build_recipe)
            .collect::<Result<Vec<_>, _>>()?;
        self.write_recipes(&recipes)?;
        Ok(recipes)
    }

    /// Number of stored recipes
    pub fn count_recipes(&self) -> Result<u64, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_RECIPES)?;
        Ok(table.len()?)
    }

    /// All recipes, newest first
    pub fn list_all_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        let mut recipes = self.load_recipes()?;
        recipes.sort_by(newest_first);
        Ok(recipes)
    }

    /// The `limit` most viewed recipes, most views first
    pub fn list_top_recipes(&self, limit: usize) -> Result<Vec<Recipe>, StoreError> {
        let mut recipes = self.load_recipes()?;
        recipes.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| newest_first(a, b)));
        recipes.truncate(limit);
        Ok(recipes)
    }

    /// Bumps the view counter and returns the recipe as stored afterwards
    pub fn get_recipe_and_increment_views(&self, recipe_id: &str) -> Result<Recipe, StoreError> {
        let write_txn = self.db.begin_write()?;
        let recipe = {
            let mut table = write_txn.open_table(TABLE_RECIPES)?;
            let mut recipe = table
                .get(recipe_id)?
                .map(|guard| decode::<Recipe>(guard.value()))
                .transpose()?
                .ok_or(StoreError::NotFound("Recipe"))?;

            // Read, bump and write back inside the same write transaction
            recipe.views = recipe.views.saturating_add(1);
            put_doc(&mut table, &recipe.id, &recipe)?;
            recipe
        };
        write_txn.commit()?;

        Ok(recipe)
    }

    /// Feedback left on a recipe, newest first
    pub fn list_feedback_for_recipe(&self, recipe_id: &str) -> Result<Vec<Feedback>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(TABLE_FEEDBACK_BY_RECIPE)?;
        let (start, end) = index_range(recipe_id);

        // Reverse range scan gives newest first. Path ids are not checked, so
        // an id like "<recipe>:x" lands inside <recipe>'s key range; keep only
        // exact matches.
        let mut feedback = Vec::new();
        for entry in index.range(start.as_str()..end.as_str())?.rev() {
            let (_, value) = entry?;
            let item = decode::<Feedback>(value.value())?;
            if item.recipe_id == recipe_id {
                feedback.push(item);
            }
        }

        Ok(feedback)
    }

    /// Stores a comment against `recipe_id`
    ///
    /// The recipe is not looked up; the reference is weak.
    pub fn create_feedback(
        &self,
        recipe_id: &str,
        user: Option<&str>,
        comment: Option<&str>,
    ) -> Result<Feedback, StoreError> {
        let comment = non_empty(comment).ok_or(StoreError::Validation("Comment required"))?;

        let feedback = Feedback {
            id: new_object_id(),
            recipe_id: recipe_id.to_string(),
            user: non_empty(user).unwrap_or(GUEST_COMMENTER).to_string(),
            comment: comment.to_string(),
            created_at: Utc::now(),
        };
        let key = index_key(
            &feedback.recipe_id,
            feedback.created_at.timestamp_micros(),
            &feedback.id,
        );
        let json = serde_json::to_string(&feedback)?;

        // Write the document and its index copy together
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_FEEDBACK)?;
            table.insert(feedback.id.as_str(), json.as_str())?;

            let mut index = write_txn.open_table(TABLE_FEEDBACK_BY_RECIPE)?;
            index.insert(key.as_str(), json.as_str())?;
        }
        write_txn.commit()?;

        debug!(feedback_id = %feedback.id, recipe_id, "stored feedback");
        Ok(feedback)
    }

    fn load_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_RECIPES)?;

        let recipes = table
            .iter()?
            .map(|entry| {
                let (_, value) = entry?;
                decode::<Recipe>(value.value())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(recipes)
    }

    fn write_recipes(&self, recipes: &[Recipe]) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_RECIPES)?;
            let mut by_user = write_txn.open_table(TABLE_RECIPES_BY_USER)?;
            for recipe in recipes {
                put_doc(&mut table, &recipe.id, recipe)?;

                // Only recipes with an author id go into the author index
                if let Some(user_id) = &recipe.user_id {
                    let key = index_key(user_id, recipe.created_at.timestamp_micros(), &recipe.id);
                    by_user.insert(key.as_str(), recipe.id.as_str())?;
                }
            }
        }
        write_txn.commit()?;

        debug!(count = recipes.len(), "stored recipes");
        Ok(())
    }
}

fn build_recipe(fields: NewRecipe) -> Result<Recipe, StoreError> {
    fields.validate()?;

    let text = |value: Option<String>| value.unwrap_or_default();
    Ok(Recipe {
        id: new_object_id(),
        name: text(fields.name),
        user: fields
            .user
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
        user_id: fields.user_id.filter(|id| is_object_id(id)),
        category: text(fields.category),
        image: text(fields.image_url),
        description: text(fields.description),
        ingredients: text(fields.ingredients),
        steps: text(fields.steps),
        views: 0,
        created_at: Utc::now(),
    })
}

fn newest_first(a: &Recipe, b: &Recipe) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_str(raw)?)
}

fn put_doc<T: Serialize>(table: &mut DocTable<'_>, id: &str, doc: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string(doc)?;
    table.insert(id, json.as_str())?;
    Ok(())
}
