use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub author_id: i64,
}

/// Listing/show projection with the author's username joined in.
#[derive(Debug, Clone, FromRow)]
pub struct QuizWithAuthor {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub author_id: i64,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QuizFilter {
    pub search: Option<String>,
    pub author_id: Option<i64>,
}

/// Collapse whitespace runs in the search text into `%` wildcards, so
/// "capital of" matches any question containing "capital" then "of".
pub fn search_pattern(search: &str) -> String {
    format!("%{}%", search.split_whitespace().join("%"))
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &QuizFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(search) = filter.search.as_deref() {
        if !search.trim().is_empty() {
            qb.push(" AND quizzes.question LIKE ");
            qb.push_bind(search_pattern(search));
        }
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND quizzes.author_id = ");
        qb.push_bind(author_id);
    }
}

pub async fn count_quizzes(pool: &SqlitePool, filter: &QuizFilter) -> sqlx::Result<i64> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM quizzes");
    push_filter(&mut qb, filter);
    qb.build_query_scalar().fetch_one(pool).await
}

pub async fn get_quizzes_page(
    pool: &SqlitePool,
    filter: &QuizFilter,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<QuizWithAuthor>> {
    let mut qb = QueryBuilder::new(
        "SELECT quizzes.id, quizzes.question, quizzes.answer, quizzes.author_id, \
         users.username AS author \
         FROM quizzes LEFT JOIN users ON quizzes.author_id = users.id",
    );
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY quizzes.id LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);
    qb.build_query_as().fetch_all(pool).await
}

pub async fn get_quizzes(pool: &SqlitePool) -> sqlx::Result<Vec<Quiz>> {
    sqlx::query_as("SELECT id, question, answer, author_id FROM quizzes ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn get_quiz(pool: &SqlitePool, id: i64) -> sqlx::Result<Quiz> {
    sqlx::query_as("SELECT id, question, answer, author_id FROM quizzes WHERE id = ?1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_quiz_with_author(pool: &SqlitePool, id: i64) -> sqlx::Result<QuizWithAuthor> {
    sqlx::query_as(
        "SELECT quizzes.id, quizzes.question, quizzes.answer, quizzes.author_id, \
         users.username AS author \
         FROM quizzes LEFT JOIN users ON quizzes.author_id = users.id \
         WHERE quizzes.id = ?1",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn create_quiz(
    pool: &SqlitePool,
    question: &str,
    answer: &str,
    author_id: i64,
) -> anyhow::Result<i64> {
    let id = sqlx::query("INSERT INTO quizzes (question, answer, author_id) VALUES (?1, ?2, ?3)")
        .bind(question)
        .bind(answer)
        .bind(author_id)
        .execute(pool)
        .await?
        .last_insert_rowid();
    Ok(id)
}

/// Only question and answer are mutable; the author is fixed at creation.
pub async fn update_quiz(
    pool: &SqlitePool,
    id: i64,
    question: &str,
    answer: &str,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE quizzes SET question = ?1, answer = ?2 WHERE id = ?3")
        .bind(question)
        .bind(answer)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_quiz(pool: &SqlitePool, id: i64) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM quizzes WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn import_quizzes(pool: &SqlitePool, quizzes: Vec<Quiz>) -> anyhow::Result<()> {
    for quiz in quizzes {
        sqlx::query(
            "INSERT OR REPLACE INTO quizzes (id, question, answer, author_id) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(quiz.id)
        .bind(&quiz.question)
        .bind(&quiz.answer)
        .bind(quiz.author_id)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Field-level checks mirroring the store's non-empty constraints; each
/// message is surfaced to the user as its own form error.
pub fn validate(question: &str, answer: &str) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if question.trim().is_empty() {
        errors.push("Question must not be empty.".to_owned());
    }
    if answer.trim().is_empty() {
        errors.push("Answer must not be empty.".to_owned());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
