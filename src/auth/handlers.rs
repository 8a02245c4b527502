use axum::{
    extract::{FromRef, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginForm, NextQuery, RegistrationForm},
        extractors::RequireUser,
        services,
        session::SessionKeys,
    },
    error::AppResult,
    state::AppState,
    views,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/registration", get(registration_form).post(register))
        .route("/logout", get(logout))
}

pub async fn login_form(Query(q): Query<NextQuery>) -> Html<String> {
    Html(views::login_page("", q.next.as_deref(), &[]))
}

#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let user = services::authenticate(&state.db, form.username.trim(), &form.password)
        .await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.issue(&user)?;
    let cookie = keys.login_cookie(&token)?;

    let target = views::safe_next(form.next.as_deref());
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(target)).into_response())
}

pub async fn registration_form() -> Html<String> {
    Html(views::registration_page(&RegistrationForm::default(), &[]))
}

#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> AppResult<Response> {
    let new_user = match form.validate() {
        Ok(u) => u,
        Err(errors) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Html(views::registration_page(&form, &errors)),
            )
                .into_response())
        }
    };

    services::register(&state.db, state.config.password_scheme, &new_user).await?;
    Ok(Redirect::to("/login").into_response())
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn logout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> impl IntoResponse {
    let keys = SessionKeys::from_ref(&state);
    info!("user logged out");
    ([(header::SET_COOKIE, keys.logout_cookie())], Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_app;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn session_cookie(res: &Response) -> String {
        let set = res
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie")
            .to_str()
            .unwrap();
        set.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn register_login_logout_flow() {
        let app = build_app(AppState::fake().await);

        let res = app
            .clone()
            .oneshot(post_form(
                "/registration",
                "username=alice&email=alice%40example.com&password=password1",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/login");

        let res = app
            .clone()
            .oneshot(post_form(
                "/login",
                "username=alice&password=password1&next=%2Farticles%2Fnew",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/articles/new");
        let cookie = session_cookie(&res);
        assert!(cookie.starts_with("session="));

        let res = app
            .clone()
            .oneshot(
                Request::get("/logout")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(session_cookie(&res), "session=");
    }

    #[tokio::test]
    async fn bad_login_is_client_error() {
        let state = AppState::fake().await;
        let app = build_app(state);
        let res = app
            .oneshot(post_form("/login", "username=ghost&password=password1"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn login_ignores_offsite_next() {
        let state = AppState::fake().await;
        let app = build_app(state);
        app.clone()
            .oneshot(post_form("/registration", "username=bob&password=password1"))
            .await
            .unwrap();
        let res = app
            .oneshot(post_form(
                "/login",
                "username=bob&password=password1&next=https%3A%2F%2Fevil.example",
            ))
            .await
            .unwrap();
        assert_eq!(res.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn duplicate_registration_is_client_error() {
        let state = AppState::fake().await;
        let app = build_app(state);
        let first = app
            .clone()
            .oneshot(post_form("/registration", "username=alice&password=password1"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::SEE_OTHER);
        let second = app
            .oneshot(post_form("/registration", "username=alice&password=password2"))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_registration_rerenders_form() {
        let state = AppState::fake().await;
        let app = build_app(state);
        let res = app
            .oneshot(post_form("/registration", "username=&password=x"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Username is required"));
    }

    #[tokio::test]
    async fn logout_requires_session() {
        let state = AppState::fake().await;
        let app = build_app(state);
        let res = app
            .oneshot(Request::get("/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/login?next=%2Flogout");
    }
}
