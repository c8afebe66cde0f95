//! Route configuration.
//!
//! The whole API hangs under `/api/v1`. Admin routers carry the
//! `authenticate` then `require_admin` layers; list and detail reads stay
//! public, except video lesson detail which is admin like the rest of its
//! management surface.

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};

use scifun_persistence::index::SearchIndex;
use scifun_persistence::store::DocumentStore;

use crate::auth::{authenticate, require_admin};
use crate::handlers;
use crate::state::AppState;

/// Creates the full `/api/v1` route tree.
pub fn create_routes<S, I>(state: AppState<S, I>) -> Router
where
    S: DocumentStore + 'static,
    I: SearchIndex + 'static,
{
    let admin = |router: Router<AppState<S, I>>| {
        router
            .route_layer(from_fn(require_admin))
            .route_layer(from_fn_with_state(state.clone(), authenticate::<S, I>))
    };

    let user = Router::new()
        .route("/login", post(handlers::user::login::<S, I>))
        .merge(admin(
            Router::new()
                .route("/get-user-list", get(handlers::user::get_user_list::<S, I>))
                .route("/create-user", post(handlers::user::create_user::<S, I>))
                .route(
                    "/delete-user/{_id}",
                    delete(handlers::user::delete_user::<S, I>),
                )
                .route("/get-user/{_id}", get(handlers::user::get_user::<S, I>)),
        ));

    let subject = Router::new()
        .route(
            "/get-subjects",
            get(handlers::subject::get_subjects::<S, I>),
        )
        .route(
            "/get-subjectById/{_id}",
            get(handlers::subject::get_subject_by_id::<S, I>),
        )
        .merge(admin(
            Router::new()
                .route(
                    "/create-subject",
                    post(handlers::subject::create_subject::<S, I>),
                )
                .route(
                    "/update-subject/{_id}",
                    put(handlers::subject::update_subject::<S, I>),
                )
                .route(
                    "/delete-subject/{_id}",
                    delete(handlers::subject::delete_subject::<S, I>),
                ),
        ));

    let topic = Router::new()
        .route("/get-topics", get(handlers::topic::get_topics::<S, I>))
        .route(
            "/get-topicById/{_id}",
            get(handlers::topic::get_topic_by_id::<S, I>),
        )
        .merge(admin(
            Router::new()
                .route("/create-topic", post(handlers::topic::create_topic::<S, I>))
                .route(
                    "/update-topic/{_id}",
                    put(handlers::topic::update_topic::<S, I>),
                )
                .route(
                    "/delete-topic/{_id}",
                    delete(handlers::topic::delete_topic::<S, I>),
                ),
        ));

    let quiz = Router::new()
        .route("/get-quizzes", get(handlers::quiz::get_quizzes::<S, I>))
        .route(
            "/get-quizById/{_id}",
            get(handlers::quiz::get_quiz_by_id::<S, I>),
        )
        .merge(admin(
            Router::new()
                .route("/create-quiz", post(handlers::quiz::create_quiz::<S, I>))
                .route(
                    "/update-quiz/{_id}",
                    put(handlers::quiz::update_quiz::<S, I>),
                )
                .route(
                    "/delete-quiz/{_id}",
                    delete(handlers::quiz::delete_quiz::<S, I>),
                ),
        ));

    let question = Router::new()
        .route(
            "/get-questions",
            get(handlers::question::get_questions::<S, I>),
        )
        .route(
            "/get-questionById/{_id}",
            get(handlers::question::get_question_by_id::<S, I>),
        )
        .merge(admin(
            Router::new()
                .route(
                    "/create-question",
                    post(handlers::question::create_question::<S, I>),
                )
                .route(
                    "/update-question/{_id}",
                    put(handlers::question::update_question::<S, I>),
                )
                .route(
                    "/delete-question/{_id}",
                    delete(handlers::question::delete_question::<S, I>),
                ),
        ));

    let video_lesson = Router::new()
        .route(
            "/list",
            get(handlers::video_lesson::get_video_lessons::<S, I>),
        )
        .merge(admin(
            Router::new()
                .route(
                    "/create",
                    post(handlers::video_lesson::create_video_lesson::<S, I>),
                )
                .route(
                    "/update/{_id}",
                    put(handlers::video_lesson::update_video_lesson::<S, I>),
                )
                .route(
                    "/delete/{_id}",
                    delete(handlers::video_lesson::delete_video_lesson::<S, I>),
                )
                .route(
                    "/detail/{_id}",
                    get(handlers::video_lesson::get_video_lesson_by_id::<S, I>),
                ),
        ));

    // Route name kept as-is for client compatibility.
    let submission = Router::new().route("/get-all", get(handlers::result::get_results::<S, I>));

    let api = Router::new()
        .nest("/user", user)
        .nest("/subject", subject)
        .nest("/topic", topic)
        .nest("/quiz", quiz)
        .nest("/question", question)
        .nest("/video-lesson", video_lesson)
        .nest("/submisstion", submission);

    Router::new().nest("/api/v1", api).with_state(state)
}
