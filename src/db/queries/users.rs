use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> sqlx::Result<User> {
    sqlx::query_as("SELECT id, username FROM users WHERE id = ?1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_users(pool: &SqlitePool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as("SELECT id, username FROM users ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn create_user(pool: &SqlitePool, username: &str) -> anyhow::Result<i64> {
    let id = sqlx::query("INSERT INTO users (username) VALUES (?1)")
        .bind(username)
        .execute(pool)
        .await?
        .last_insert_rowid();
    Ok(id)
}

pub async fn import_users(pool: &SqlitePool, users: Vec<User>) -> anyhow::Result<()> {
    for user in users {
        sqlx::query("INSERT OR REPLACE INTO users (id, username) VALUES (?1, ?2)")
            .bind(user.id)
            .bind(&user.username)
            .execute(pool)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn create_and_fetch_user() {
        let pool = test_pool().await;
        let id = create_user(&pool, "alice").await.unwrap();
        let user = get_user(&pool, id).await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn import_keeps_explicit_ids() {
        let pool = test_pool().await;
        import_users(
            &pool,
            vec![User {
                id: 42,
                username: "bob".to_owned(),
            }],
        )
        .await
        .unwrap();
        assert_eq!(get_user(&pool, 42).await.unwrap().username, "bob");
    }
}
