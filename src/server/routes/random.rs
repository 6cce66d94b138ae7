use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db::{queries::quizzes, Quiz},
    play::{self, CheckOutcome, DrawOutcome, RandomPlay},
    server::app::AppState,
    telemetry::ANSWER_CNTR,
};

use super::ApiResponse;

// The session keys the round lives under; both removed when it ends.
const SESSION_POOL_KEY: &str = "quizzes";
const SESSION_SCORE_KEY: &str = "score";

#[derive(Deserialize)]
struct AnswerQuery {
    #[serde(default)]
    answer: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "quizzes/random_play.html", escape = "none")]
struct RandomPlayPage {
    quiz: Quiz,
    score: u32,
}

#[derive(Template, WebTemplate)]
#[template(path = "quizzes/random_result.html", escape = "none")]
struct RandomResultPage {
    quiz: Quiz,
    answer: String,
    result: bool,
    score: u32,
}

#[derive(Template, WebTemplate)]
#[template(path = "quizzes/random_nomore.html", escape = "none")]
struct RandomNomorePage {
    score: u32,
}

async fn load_round(session: &Session) -> Result<Option<RandomPlay>, tower_sessions::session::Error> {
    let Some(pool) = session.get::<Vec<Quiz>>(SESSION_POOL_KEY).await? else {
        return Ok(None);
    };
    let score = session.get::<u32>(SESSION_SCORE_KEY).await?.unwrap_or(0);
    Ok(Some(RandomPlay { pool, score }))
}

async fn save_round(
    session: &Session,
    state: &RandomPlay,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(SESSION_POOL_KEY, &state.pool).await?;
    session.insert(SESSION_SCORE_KEY, state.score).await
}

async fn end_round(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Vec<Quiz>>(SESSION_POOL_KEY).await?;
    session.remove::<u32>(SESSION_SCORE_KEY).await?;
    Ok(())
}

/// GET /quizzes/randomplay: draw the next unseen quiz for this session,
/// lazily starting a round over the full quiz set.
async fn random_play(State(pool): State<SqlitePool>, session: Session) -> ApiResponse<Response> {
    let state = match load_round(&session).await? {
        Some(state) => state,
        None => RandomPlay::new(quizzes::get_quizzes(&pool).await?),
    };

    let outcome = play::draw(state, &mut rand::thread_rng());
    match outcome {
        DrawOutcome::Exhausted { final_score } => {
            end_round(&session).await?;
            Ok(RandomNomorePage { score: final_score }.into_response())
        }
        DrawOutcome::Question { quiz, state } => {
            save_round(&session, &state).await?;
            Ok(RandomPlayPage {
                quiz,
                score: state.score,
            }
            .into_response())
        }
    }
}

/// GET /quizzes/randomcheck/{id}: score the answer for the drawn quiz.
/// A wrong answer ends the round on the spot, with the score as it stood.
async fn random_check(
    State(pool): State<SqlitePool>,
    session: Session,
    Path(id): Path<i64>,
    Query(AnswerQuery { answer }): Query<AnswerQuery>,
) -> ApiResponse<Response> {
    let Some(state) = load_round(&session).await? else {
        // Stale link or double submit: no round is active, start over.
        return Ok(Redirect::to("/quizzes/randomplay").into_response());
    };
    let quiz = quizzes::get_quiz(&pool, id).await?;

    match play::check(state, &quiz.answer, &answer) {
        CheckOutcome::Continue(state) => {
            ANSWER_CNTR.with_label_values(&["random", "correct"]).inc();
            session.insert(SESSION_SCORE_KEY, state.score).await?;
            Ok(RandomResultPage {
                quiz,
                answer,
                result: true,
                score: state.score,
            }
            .into_response())
        }
        CheckOutcome::Completed { final_score } => {
            ANSWER_CNTR.with_label_values(&["random", "correct"]).inc();
            end_round(&session).await?;
            Ok(RandomNomorePage { score: final_score }.into_response())
        }
        CheckOutcome::Failed { final_score } => {
            ANSWER_CNTR.with_label_values(&["random", "wrong"]).inc();
            end_round(&session).await?;
            Ok(RandomResultPage {
                quiz,
                answer,
                result: false,
                score: final_score,
            }
            .into_response())
        }
    }
}

pub fn random_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes/randomplay", get(random_play))
        .route("/quizzes/randomcheck/{id}", get(random_check))
        .with_state(state)
}
