//! Demo data inserted on first start
//!
//! Keeps the home page from being empty on a fresh database. Runs once
//! before the listener binds and does nothing as soon as any recipe exists.

use tracing::info;

use crate::error::StoreError;
use crate::model::NewRecipe;
use crate::store::RecipeStore;

struct DemoRecipe {
    name: &'static str,
    user: &'static str,
    category: &'static str,
    image: &'static str,
    description: &'static str,
    ingredients: &'static str,
}

const DEMO_RECIPES: &[DemoRecipe] = &[
    DemoRecipe {
        name: "Tiramisu Dessert",
        user: "Admin",
        category: "Dessert",
        image: "https://images.unsplash.com/photo-1662230791691-b77f85c5b43a?q=80&w=687&auto=format&fit=crop&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8fA%3D%3D",
        description: "Creamy layered tiramisu.",
        ingredients: "Coffee, Mascarpone, Cream, Cocoa",
    },
    DemoRecipe {
        name: "Paneer Butter Masala",
        user: "HomeCook",
        category: "Veg",
        image: "https://images.unsplash.com/photo-1701579231378-3726490a407b?w=600&auto=format&fit=crop&q=60&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxzZWFyY2h8Mnx8cGFuZWVyJTIwYnV0dGVyJTIwbWFzYWxhfGVufDB8fDB8fHww",
        description: "Creamy rich paneer curry.",
        ingredients: "Paneer, Butter, Tomato gravy",
    },
    DemoRecipe {
        name: "Mango Smoothie",
        user: "Summer",
        category: "Beverage",
        image: "https://images.unsplash.com/photo-1623065422902-30a2d299bbe4?w=600&auto=format&fit=crop&q=60&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxzZWFyY2h8M3x8bWFuZ28lMjBzbW9vdGhpZXxlbnwwfHwwfHx8MA%3D%3D",
        description: "Refreshing chilled mango drink.",
        ingredients: "Mango, Milk, Ice",
    },
    DemoRecipe {
        name: "Veg Palav",
        user: "Sindhu",
        category: "Main Course",
        image: "https://media.istockphoto.com/id/2212836819/photo/indian-veg-biryani-veg-pulav-indian-vegetable-pulav-biriyani-vegetable-biriyani-served-in-a.jpg?s=1024x1024&w=is&k=20&c=csRuG2qb6UYNd7NQEDAe_T2xZw7hgRkHa2OQIsoE0aM=",
        description: "South Indian style spicy palav.",
        ingredients: "Rice, Vegetables, Spices",
    },
    DemoRecipe {
        name: "Eggless Strawberry Shortcake",
        user: "Sindhu",
        category: "Dessert",
        image: "https://media.istockphoto.com/id/1298962313/photo/strawberry-cake-slice-with-strawberry-cream-cheese-frosting.jpg?s=1024x1024&w=is&k=20&c=FA208DxAX0LdHFYvc99ZhwuZw7ThjQPt0ZiUH6IpFjI=",
        description: "Soft sponge with strawberry & cream.",
        ingredients: "Flour, Cream, Strawberries",
    },
    DemoRecipe {
        name: "Brown Butter Brownies",
        user: "Chef A",
        category: "Dessert",
        image: "https://images.unsplash.com/photo-1631642034885-4f4ef938f32a?w=600&auto=format&fit=crop&q=60&ixlib=rb-4.1.0&ixid=M3wxMjA3fDB8MHxzZWFyY2h8Mnx8YnJvd24lMjBidXR0ZXIlMjBjb29raWVzfGVufDB8fDB8fHww",
        description: "Rich dark chocolate brownies.",
        ingredients: "Cocoa, Butter, Sugar",
    },
];

/// Number of recipes in the demo set
pub fn demo_recipe_count() -> usize {
    DEMO_RECIPES.len()
}

/// Inserts the demo recipes if the recipe collection is empty
///
/// Returns how many recipes were inserted: the full demo set on an empty
/// store, zero otherwise.
pub fn seed_demo(store: &RecipeStore) -> Result<usize, StoreError> {
    if store.count_recipes()? > 0 {
        return Ok(0);
    }

    info!("Seeding demo recipes...");
    let batch = DEMO_RECIPES
        .iter()
        .map(|demo| NewRecipe {
            name: Some(demo.name.to_string()),
            user: Some(demo.user.to_string()),
            category: Some(demo.category.to_string()),
            image_url: Some(demo.image.to_string()),
            description: Some(demo.description.to_string()),
            ingredients: Some(demo.ingredients.to_string()),
            ..NewRecipe::default()
        })
        .collect();

    let inserted = store.insert_recipes(batch)?.len();
    info!(inserted, "Demo recipes inserted");
    Ok(inserted)
}
