//! Data access layer and seeding tests
//!
//! These call `RecipeStore` directly, without going through HTTP.

use std::sync::Arc;

use recipebook::database::init_db;
use recipebook::error::StoreError;
use recipebook::model::NewRecipe;
use recipebook::seed::{demo_recipe_count, seed_demo};
use recipebook::store::RecipeStore;
use tempfile::TempDir;

fn setup_store() -> (RecipeStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("store.db");
    let db = init_db(db_path.to_str().unwrap()).expect("Failed to initialize test database");
    (RecipeStore::new(Arc::new(db)), dir)
}

fn named(name: &str) -> NewRecipe {
    NewRecipe {
        name: Some(name.to_string()),
        ..NewRecipe::default()
    }
}

#[test]
fn test_find_or_create_user_matches_exact_pair() {
    let (store, _dir) = setup_store();

    let a = store.find_or_create_user(Some("sam"), Some("sam@example.com")).unwrap();
    let b = store.find_or_create_user(Some("sam"), Some("sam@example.com")).unwrap();
    let no_email = store.find_or_create_user(Some("sam"), None).unwrap();
    let no_email_again = store.find_or_create_user(Some("sam"), None).unwrap();

    assert_eq!(a.id, b.id);
    assert_ne!(a.id, no_email.id);
    assert_eq!(no_email.id, no_email_again.id);
    assert_eq!(no_email.email, None);
}

#[test]
fn test_find_or_create_user_requires_username() {
    let (store, _dir) = setup_store();

    assert!(matches!(
        store.find_or_create_user(None, Some("x@example.com")),
        Err(StoreError::Validation("username required"))
    ));
    assert!(matches!(
        store.find_or_create_user(Some(""), None),
        Err(StoreError::Validation(_))
    ));
}

#[test]
fn test_missing_user() {
    let (store, _dir) = setup_store();

    assert!(matches!(
        store.find_user("missing"),
        Err(StoreError::NotFound("User"))
    ));
    assert!(matches!(
        store.get_user_with_recipes("missing"),
        Err(StoreError::NotFound("User"))
    ));
    assert!(matches!(
        store.set_profile_picture("missing", "/uploads/x.png"),
        Err(StoreError::NotFound("User"))
    ));
}

#[test]
fn test_set_profile_picture_touches_only_target() {
    let (store, _dir) = setup_store();

    let target = store.find_or_create_user(Some("ana"), None).unwrap();
    let other = store.find_or_create_user(Some("ben"), None).unwrap();

    let updated = store
        .set_profile_picture(&target.id, "/uploads/1-abcdef.png")
        .unwrap();

    assert_eq!(updated.profile_pic.as_deref(), Some("/uploads/1-abcdef.png"));
    assert!(updated.updated_at >= target.updated_at);
    assert_eq!(store.find_user(&other.id).unwrap(), other);

    // the pair lookup still resolves to the updated record
    let again = store.find_or_create_user(Some("ana"), None).unwrap();
    assert_eq!(again.profile_pic.as_deref(), Some("/uploads/1-abcdef.png"));
}

#[test]
fn test_create_recipe_defaults() {
    let (store, _dir) = setup_store();

    let recipe = store.create_recipe(named("Plain Rice")).unwrap();

    assert_eq!(recipe.views, 0);
    assert_eq!(recipe.user, "Anonymous");
    assert_eq!(recipe.user_id, None);
    assert_eq!(recipe.category, "");
    assert_eq!(recipe.image, "");
    assert_eq!(store.count_recipes().unwrap(), 1);
}

#[test]
fn test_create_recipe_requires_name() {
    let (store, _dir) = setup_store();

    let result = store.create_recipe(NewRecipe {
        category: Some("Dessert".into()),
        ..NewRecipe::default()
    });

    assert!(matches!(result, Err(StoreError::Validation("name required"))));
    assert_eq!(store.count_recipes().unwrap(), 0);
}

#[test]
fn test_user_recipes_use_weak_reference() {
    let (store, _dir) = setup_store();

    let user = store.find_or_create_user(Some("kim"), None).unwrap();
    let mine = store
        .create_recipe(NewRecipe {
            user_id: Some(user.id.clone()),
            ..named("Kimchi")
        })
        .unwrap();
    store
        .create_recipe(NewRecipe {
            user_id: Some("garbage".into()),
            ..named("Orphan")
        })
        .unwrap();

    let profile = store.get_user_with_recipes(&user.id).unwrap();
    assert_eq!(profile.user.id, user.id);
    assert_eq!(profile.recipes.len(), 1);
    assert_eq!(profile.recipes[0].id, mine.id);
}

#[test]
fn test_top_recipes_orders_by_views() {
    let (store, _dir) = setup_store();

    for (name, views) in [("a", 5), ("b", 1), ("c", 9), ("d", 3)] {
        let recipe = store.create_recipe(named(name)).unwrap();
        for _ in 0..views {
            store.get_recipe_and_increment_views(&recipe.id).unwrap();
        }
    }

    let top: Vec<u64> = store
        .list_top_recipes(3)
        .unwrap()
        .iter()
        .map(|r| r.views)
        .collect();
    assert_eq!(top, [9, 5, 3]);
}

#[test]
fn test_views_increment_by_one_per_read() {
    let (store, _dir) = setup_store();

    let recipe = store.create_recipe(named("Brownies")).unwrap();
    for expected in 1..=10 {
        let read = store.get_recipe_and_increment_views(&recipe.id).unwrap();
        assert_eq!(read.views, expected);
    }

    assert!(matches!(
        store.get_recipe_and_increment_views("missing"),
        Err(StoreError::NotFound("Recipe"))
    ));
}

#[test]
fn test_feedback_is_scoped_to_recipe() {
    let (store, _dir) = setup_store();

    let soup = store.create_recipe(named("Soup")).unwrap();
    let salad = store.create_recipe(named("Salad")).unwrap();

    store.create_feedback(&soup.id, Some("Ann"), Some("Too salty")).unwrap();
    store.create_feedback(&salad.id, None, Some("Crunchy")).unwrap();
    store.create_feedback(&soup.id, None, Some("Perfect now")).unwrap();

    let soup_feedback = store.list_feedback_for_recipe(&soup.id).unwrap();
    let comments: Vec<&str> = soup_feedback.iter().map(|f| f.comment.as_str()).collect();
    assert_eq!(comments, ["Perfect now", "Too salty"]);
    assert_eq!(soup_feedback[0].user, "Guest");
    assert_eq!(soup_feedback[1].user, "Ann");

    assert_eq!(store.list_feedback_for_recipe(&salad.id).unwrap().len(), 1);
}

#[test]
fn test_feedback_for_lookalike_id_stays_separate() {
    let (store, _dir) = setup_store();
    let soup = store.create_recipe(named("Soup")).unwrap();

    // Shares soup's index key prefix
    let lookalike = format!("{}:junk", soup.id);
    store.create_feedback(&lookalike, None, Some("spam")).unwrap();
    store.create_feedback(&soup.id, Some("Ann"), Some("Lovely")).unwrap();

    let soup_feedback = store.list_feedback_for_recipe(&soup.id).unwrap();
    assert_eq!(soup_feedback.len(), 1);
    assert_eq!(soup_feedback[0].comment, "Lovely");
    assert!(soup_feedback.iter().all(|f| f.recipe_id == soup.id));

    let stray = store.list_feedback_for_recipe(&lookalike).unwrap();
    assert_eq!(stray.len(), 1);
    assert_eq!(stray[0].comment, "spam");
}

#[test]
fn test_empty_comment_is_rejected() {
    let (store, _dir) = setup_store();
    let recipe = store.create_recipe(named("Pie")).unwrap();

    for comment in [None, Some("")] {
        assert!(matches!(
            store.create_feedback(&recipe.id, Some("Ann"), comment),
            Err(StoreError::Validation("Comment required"))
        ));
    }
    assert!(store.list_feedback_for_recipe(&recipe.id).unwrap().is_empty());
}

#[test]
fn test_seed_runs_only_on_empty_store() {
    let (store, _dir) = setup_store();

    assert_eq!(seed_demo(&store).unwrap(), demo_recipe_count());
    assert_eq!(store.count_recipes().unwrap(), demo_recipe_count() as u64);

    assert_eq!(seed_demo(&store).unwrap(), 0);
    assert_eq!(store.count_recipes().unwrap(), demo_recipe_count() as u64);

    let recipes = store.list_all_recipes().unwrap();
    assert!(recipes.iter().all(|r| r.views == 0 && r.user_id.is_none()));
    assert!(recipes.iter().any(|r| r.name == "Tiramisu Dessert"));
}

#[test]
fn test_seed_skipped_after_explicit_creation() {
    let (store, _dir) = setup_store();

    store.create_recipe(named("First real recipe")).unwrap();

    assert_eq!(seed_demo(&store).unwrap(), 0);
    assert_eq!(store.count_recipes().unwrap(), 1);
}

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("persist.db");
    let path = db_path.to_str().unwrap();

    let id = {
        let store = RecipeStore::new(Arc::new(init_db(path).unwrap()));
        store.create_recipe(named("Persistent Pasta")).unwrap().id
    };

    let store = RecipeStore::new(Arc::new(init_db(path).unwrap()));
    let reread = store.get_recipe_and_increment_views(&id).unwrap();
    assert_eq!(reread.name, "Persistent Pasta");
    assert_eq!(reread.views, 1);
    assert_eq!(seed_demo(&store).unwrap(), 0);
}
