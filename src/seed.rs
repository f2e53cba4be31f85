use anyhow::Context;
use tracing::{debug, info};

use crate::auth::password::hash_password;
use crate::auth::repo_types::User;
use crate::products::repo_types::{Category, Product};
use crate::state::AppState;

const CATEGORY_NAMES: [&str; 6] = [
    "Electronics",
    "Fashion & Clothing",
    "Books & Media",
    "Furniture & Interior",
    "Sports & Leisure",
    "Other",
];

/// Seeds categories, demo users and sample products on first startup.
/// Skipped entirely once categories exist.
pub async fn run(state: &AppState) -> anyhow::Result<()> {
    if Category::count(&state.db).await? > 0 {
        debug!("seed skipped, categories already present");
        return Ok(());
    }

    info!("seeding initial data");

    let mut categories = Vec::with_capacity(CATEGORY_NAMES.len());
    for name in CATEGORY_NAMES {
        categories.push(Category::insert(&state.db, name).await?);
    }

    let user1 = seed_user(state, "testuser1", "test123!", "test1@example.com").await?;
    let user2 = seed_user(state, "testuser2", "test123!", "test2@example.com").await?;
    let admin = seed_user(state, "admin", "admin123!", "admin@example.com").await?;

    let electronics = &categories[0];
    let fashion = &categories[1];
    let books = &categories[2];

    seed_product(state, "iPhone 14 Pro", "Barely used, like new", 850_000, "Gangnam, Seoul", electronics, &user1).await?;
    seed_product(state, "MacBook Air M2", "Six months of use", 1_200_000, "Seocho, Seoul", electronics, &user2).await?;
    seed_product(state, "Nike sneakers", "Size 270", 120_000, "Hongdae, Seoul", fashion, &user1).await?;
    seed_product(state, "Java textbook", "Programming study book", 35_000, "Daehak-ro, Seoul", books, &admin).await?;

    info!("initial data seeded");
    Ok(())
}

async fn seed_user(
    state: &AppState,
    username: &str,
    password: &str,
    email: &str,
) -> anyhow::Result<User> {
    let hash = hash_password(password)?;
    User::create(&state.db, username, &hash, email)
        .await
        .with_context(|| format!("seed user {username}"))
}

async fn seed_product(
    state: &AppState,
    title: &str,
    description: &str,
    price: i32,
    location: &str,
    category: &Category,
    seller: &User,
) -> anyhow::Result<()> {
    Product::insert(
        &state.db,
        title,
        description,
        price,
        location,
        None,
        category.id,
        seller.id,
    )
    .await
    .with_context(|| format!("seed product {title}"))?;
    Ok(())
}
