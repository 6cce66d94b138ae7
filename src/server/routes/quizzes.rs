use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db::{
        queries::quizzes::{self, QuizFilter},
        queries::users,
        Quiz, QuizWithAuthor,
    },
    play,
    server::{
        app::AppState,
        deserializers::{default_pageno, deserialize_pageno},
        flash::{self, Flash, FlashKind},
        pagination::Paginate,
    },
    telemetry::ANSWER_CNTR,
};

use super::{ApiResponse, AppError, SESSION_USER_ID_KEY};

#[derive(Deserialize)]
struct IndexQuery {
    search: Option<String>,
    #[serde(default = "default_pageno", deserialize_with = "deserialize_pageno")]
    pageno: u32,
}

#[derive(Deserialize)]
struct QuizForm {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
}

#[derive(Deserialize)]
struct AnswerQuery {
    #[serde(default)]
    answer: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "quizzes/index.html", escape = "none")]
struct QuizzesIndexPage {
    title: String,
    quizzes: Vec<QuizWithAuthor>,
    search: String,
    // listing base path, so search/paging keep the user scope
    base: String,
    paginate: Paginate,
    flashes: Vec<Flash>,
}

#[derive(Template, WebTemplate)]
#[template(path = "quizzes/show.html", escape = "none")]
struct QuizShowPage {
    quiz: QuizWithAuthor,
    flashes: Vec<Flash>,
}

#[derive(Template, WebTemplate)]
#[template(path = "quizzes/new.html", escape = "none")]
struct QuizNewPage {
    question: String,
    answer: String,
    flashes: Vec<Flash>,
}

#[derive(Template, WebTemplate)]
#[template(path = "quizzes/edit.html", escape = "none")]
struct QuizEditPage {
    quiz_id: i64,
    question: String,
    answer: String,
    flashes: Vec<Flash>,
}

#[derive(Template, WebTemplate)]
#[template(path = "quizzes/play.html", escape = "none")]
struct QuizPlayPage {
    quiz: Quiz,
    answer: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "quizzes/result.html", escape = "none")]
struct QuizResultPage {
    quiz: Quiz,
    result: bool,
    answer: String,
}

async fn index(
    State(pool): State<SqlitePool>,
    session: Session,
    Query(query): Query<IndexQuery>,
) -> ApiResponse<QuizzesIndexPage> {
    render_index(&pool, &session, query, None).await
}

async fn user_index(
    State(pool): State<SqlitePool>,
    session: Session,
    Path(user_id): Path<i64>,
    Query(query): Query<IndexQuery>,
) -> ApiResponse<QuizzesIndexPage> {
    render_index(&pool, &session, query, Some(user_id)).await
}

async fn render_index(
    pool: &SqlitePool,
    session: &Session,
    query: IndexQuery,
    user_id: Option<i64>,
) -> ApiResponse<QuizzesIndexPage> {
    let (title, base) = match user_id {
        Some(id) => {
            let user = users::get_user(pool, id).await?;
            (
                format!("Questions of {}", user.username),
                format!("/users/{id}/quizzes"),
            )
        }
        None => ("Questions".to_owned(), "/quizzes".to_owned()),
    };
    let filter = QuizFilter {
        search: query.search.clone(),
        author_id: user_id,
    };
    let count = quizzes::count_quizzes(pool, &filter).await?;
    let paginate = Paginate::new(count, query.pageno);
    let page = quizzes::get_quizzes_page(pool, &filter, paginate.limit(), paginate.offset()).await?;
    Ok(QuizzesIndexPage {
        title,
        quizzes: page,
        search: query.search.unwrap_or_default(),
        base,
        paginate,
        flashes: flash::take(session).await?,
    })
}

async fn show(
    State(pool): State<SqlitePool>,
    session: Session,
    Path(id): Path<i64>,
) -> ApiResponse<QuizShowPage> {
    let quiz = quizzes::get_quiz_with_author(&pool, id).await?;
    Ok(QuizShowPage {
        quiz,
        flashes: flash::take(&session).await?,
    })
}

async fn new_form(session: Session) -> ApiResponse<QuizNewPage> {
    Ok(QuizNewPage {
        question: String::new(),
        answer: String::new(),
        flashes: flash::take(&session).await?,
    })
}

async fn create(
    State(pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<QuizForm>,
) -> ApiResponse<Response> {
    if let Err(errors) = quizzes::validate(&form.question, &form.answer) {
        flash_form_errors(&session, errors).await?;
        return Ok(QuizNewPage {
            question: form.question,
            answer: form.answer,
            flashes: flash::take(&session).await?,
        }
        .into_response());
    }

    let author_id = session
        .get::<i64>(SESSION_USER_ID_KEY)
        .await?
        .unwrap_or(0);
    match quizzes::create_quiz(&pool, &form.question, &form.answer, author_id).await {
        Ok(id) => {
            flash::push(&session, FlashKind::Success, "Quiz created successfully.").await?;
            Ok(Redirect::to(&format!("/quizzes/{id}")).into_response())
        }
        Err(error) => {
            flash::push(&session, FlashKind::Error, "Error creating a new Quiz.").await?;
            Err(AppError::Internal(error))
        }
    }
}

async fn edit_form(
    State(pool): State<SqlitePool>,
    session: Session,
    Path(id): Path<i64>,
) -> ApiResponse<QuizEditPage> {
    let quiz = quizzes::get_quiz(&pool, id).await?;
    Ok(QuizEditPage {
        quiz_id: quiz.id,
        question: quiz.question,
        answer: quiz.answer,
        flashes: flash::take(&session).await?,
    })
}

async fn update(
    State(pool): State<SqlitePool>,
    session: Session,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Form(form): Form<QuizForm>,
) -> ApiResponse<Response> {
    quizzes::get_quiz(&pool, id).await?;
    if let Err(errors) = quizzes::validate(&form.question, &form.answer) {
        flash_form_errors(&session, errors).await?;
        return Ok(QuizEditPage {
            quiz_id: id,
            question: form.question,
            answer: form.answer,
            flashes: flash::take(&session).await?,
        }
        .into_response());
    }

    match quizzes::update_quiz(&pool, id, &form.question, &form.answer).await {
        Ok(()) => {
            flash::push(&session, FlashKind::Success, "Quiz edited successfully.").await?;
            Ok(client_redirect(&headers, &format!("/quizzes/{id}")))
        }
        Err(error) => {
            flash::push(&session, FlashKind::Error, "Error editing the Quiz.").await?;
            Err(AppError::Internal(error))
        }
    }
}

async fn destroy(
    State(pool): State<SqlitePool>,
    session: Session,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResponse<Response> {
    quizzes::get_quiz(&pool, id).await?;
    match quizzes::delete_quiz(&pool, id).await {
        Ok(()) => {
            flash::push(&session, FlashKind::Success, "Quiz deleted successfully.").await?;
            let back = headers
                .get(header::REFERER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("/quizzes");
            Ok(client_redirect(&headers, back))
        }
        Err(error) => {
            flash::push(&session, FlashKind::Error, "Error deleting the Quiz.").await?;
            Err(AppError::Internal(error))
        }
    }
}

async fn play(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Query(AnswerQuery { answer }): Query<AnswerQuery>,
) -> ApiResponse<QuizPlayPage> {
    let quiz = quizzes::get_quiz(&pool, id).await?;
    Ok(QuizPlayPage { quiz, answer })
}

async fn check(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Query(AnswerQuery { answer }): Query<AnswerQuery>,
) -> ApiResponse<QuizResultPage> {
    let quiz = quizzes::get_quiz(&pool, id).await?;
    let result = play::answers_match(&answer, &quiz.answer);
    ANSWER_CNTR
        .with_label_values(&["single", if result { "correct" } else { "wrong" }])
        .inc();
    Ok(QuizResultPage {
        quiz,
        result,
        answer,
    })
}

// htmx submits via XHR and ignores Location redirects; it navigates on an
// HX-Redirect header instead, so browsers get a 303 and htmx gets the header.
fn client_redirect(headers: &HeaderMap, to: &str) -> Response {
    if headers.contains_key("HX-Request") {
        let mut out = HeaderMap::new();
        out.insert("HX-Redirect", to.parse().unwrap());
        out.into_response()
    } else {
        Redirect::to(to).into_response()
    }
}

async fn flash_form_errors(session: &Session, errors: Vec<String>) -> ApiResponse<()> {
    flash::push(session, FlashKind::Error, "There are errors in the form:").await?;
    for message in errors {
        flash::push(session, FlashKind::Error, message).await?;
    }
    Ok(())
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", get(index).post(create))
        .route("/quizzes/new", get(new_form))
        .route("/quizzes/{id}", get(show).put(update).delete(destroy))
        .route("/quizzes/{id}/edit", get(edit_form))
        .route("/quizzes/{id}/play", get(play))
        .route("/quizzes/{id}/check", get(check))
        .route("/users/{user_id}/quizzes", get(user_index))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn user_scoped_listing_keeps_the_scope_in_links() {
        let page = QuizzesIndexPage {
            title: "Questions of alice".to_owned(),
            quizzes: vec![],
            search: "capital".to_owned(),
            base: "/users/7/quizzes".to_owned(),
            paginate: Paginate::new(25, 2),
            flashes: vec![],
        };
        let html = page.render().unwrap();
        assert!(html.contains(r#"action="/users/7/quizzes""#));
        assert!(html.contains("/users/7/quizzes?search=capital&pageno=3"));
        assert!(!html.contains(r#"href="/quizzes?"#));
    }

    #[test]
    fn global_listing_links_stay_on_quizzes() {
        let page = QuizzesIndexPage {
            title: "Questions".to_owned(),
            quizzes: vec![],
            search: String::new(),
            base: "/quizzes".to_owned(),
            paginate: Paginate::new(25, 1),
            flashes: vec![],
        };
        let html = page.render().unwrap();
        assert!(html.contains(r#"action="/quizzes""#));
        assert!(html.contains("/quizzes?search=&pageno=2"));
    }

    #[test]
    fn htmx_requests_get_an_hx_redirect_header() {
        let mut headers = HeaderMap::new();
        headers.insert("HX-Request", "true".parse().unwrap());
        let response = client_redirect(&headers, "/quizzes/3");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("HX-Redirect").unwrap(),
            "/quizzes/3"
        );
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[test]
    fn plain_requests_get_a_see_other_redirect() {
        let response = client_redirect(&HeaderMap::new(), "/quizzes");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/quizzes"
        );
    }
}
