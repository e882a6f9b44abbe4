use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_storefront_api::{config::AppConfig, db::create_pool};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let seller_id = ensure_seller(&pool, "seller@example.com", "seller123").await?;
    let user_id = ensure_user(&pool, "user@example.com", "user123").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Seller ID: {seller_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_seller(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_account(pool, "Store Seller", email, password, "seller").await
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_account(pool, "Test Shopper", email, password, "user").await
}

async fn ensure_account(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If the account already exists, fetch its id.
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured account {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    struct Seed {
        name: &'static str,
        description: &'static [&'static str],
        price: Decimal,
        offer_price: Decimal,
        category: &'static str,
    }

    let products = [
        Seed {
            name: "Organic Potatoes 1kg",
            description: &["Farm fresh", "Rich in fibre"],
            price: dec!(2.50),
            offer_price: dec!(2.00),
            category: "Vegetables",
        },
        Seed {
            name: "Red Apples 1kg",
            description: &["Crisp and sweet", "Handpicked"],
            price: dec!(4.00),
            offer_price: dec!(3.50),
            category: "Fruits",
        },
        Seed {
            name: "Whole Wheat Bread",
            description: &["Baked daily", "No preservatives"],
            price: dec!(3.00),
            offer_price: dec!(2.75),
            category: "Bakery",
        },
        Seed {
            name: "Full Cream Milk 1L",
            description: &["Pasteurized", "Locally sourced"],
            price: dec!(1.80),
            offer_price: dec!(1.60),
            category: "Dairy",
        },
    ];

    for product in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, offer_price, image, category)
            VALUES ($1, $2, $3, $4, $5, '[]'::jsonb, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(serde_json::json!(product.description))
        .bind(product.price)
        .bind(product.offer_price)
        .bind(product.category)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
