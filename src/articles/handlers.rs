use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{info, instrument};

use crate::{
    articles::{
        dto::{ArticleForm, SearchQuery},
        repo_types::Article,
    },
    auth::{
        extractors::{CurrentUser, RequireUser},
        repo_types::User,
    },
    error::{AppError, AppResult},
    state::AppState,
    views,
};

const HOME_TITLE: &str = "Home";

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_articles))
        .route("/search", get(search_articles))
        .route("/articles/:id", get(get_article))
        .route("/users/:id/articles", get(user_articles))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/articles/new", get(new_article_form).post(create_article))
        .route("/articles/:id/edit", get(edit_article_form).post(update_article))
}

#[instrument(skip(state, user))]
pub async fn list_articles(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Html<String>> {
    let articles = Article::list_all(&state.db).await?;
    Ok(Html(views::article_list(HOME_TITLE, "Articles", &articles, user.as_ref())))
}

#[instrument(skip(state, user))]
pub async fn search_articles(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let articles = Article::search(&state.db, &q.q).await?;
    let heading = if q.q.is_empty() {
        "Articles".to_string()
    } else {
        format!("Search: {}", q.q)
    };
    Ok(Html(views::article_list(HOME_TITLE, &heading, &articles, user.as_ref())))
}

#[instrument(skip(state, user))]
pub async fn get_article(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Html<String>> {
    let article = Article::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("article"))?;
    let owner = User::find_by_id(&state.db, article.user_id).await?;
    Ok(Html(views::article_page(&article, owner.as_ref(), user.as_ref())))
}

#[instrument(skip(state, user))]
pub async fn user_articles(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Html<String>> {
    let owner = User::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    let articles = Article::list_by_owner(&state.db, owner.id).await?;
    let heading = format!("Articles by {}", owner.username);
    Ok(Html(views::article_list(&heading, &heading, &articles, user.as_ref())))
}

pub async fn new_article_form(RequireUser(user): RequireUser) -> Html<String> {
    Html(views::article_form(
        "New article",
        "/articles/new",
        "Create",
        &ArticleForm::default(),
        &[],
        Some(&user),
    ))
}

#[instrument(skip(state, user, form), fields(user_id = user.id))]
pub async fn create_article(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<ArticleForm>,
) -> AppResult<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = views::article_form(
                "New article",
                "/articles/new",
                "Create",
                &form,
                &errors,
                Some(&user),
            );
            return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
        }
    };

    let article = Article::create(
        &state.db,
        &input.title,
        input.body.as_deref(),
        input.is_verified,
        user.id,
    )
    .await?;

    info!(article_id = article.id, "article created");
    Ok(Redirect::to(&format!("/articles/{}", article.id)).into_response())
}

pub async fn edit_article_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> AppResult<Html<String>> {
    let article = Article::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("article"))?;
    Ok(Html(views::article_form(
        "Edit article",
        &format!("/articles/{id}/edit"),
        "Save",
        &ArticleForm::from_article(&article),
        &[],
        Some(&user),
    )))
}

/// Any logged-in user may edit any article; ownership is not checked here.
#[instrument(skip(state, user, form), fields(user_id = user.id))]
pub async fn update_article(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Form(form): Form<ArticleForm>,
) -> AppResult<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            if Article::get(&state.db, id).await?.is_none() {
                return Err(AppError::NotFound("article"));
            }
            let page = views::article_form(
                "Edit article",
                &format!("/articles/{id}/edit"),
                "Save",
                &form,
                &errors,
                Some(&user),
            );
            return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
        }
    };

    let article = Article::update(
        &state.db,
        id,
        &input.title,
        input.body.as_deref(),
        input.is_verified,
    )
    .await?
    .ok_or(AppError::NotFound("article"))?;

    info!(article_id = article.id, owner_id = article.user_id, "article updated");
    Ok(Redirect::to(&format!("/articles/{}", article.id)).into_response())
}
