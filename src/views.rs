//! Server-rendered HTML pages.

use std::fmt::Write;

use axum::http::StatusCode;

use crate::{
    articles::{dto::ArticleForm, repo_types::Article},
    auth::{dto::RegistrationForm, repo_types::User},
};

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keeps redirect targets on this site.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") && !n.contains('\\') => n,
        _ => "/",
    }
}

pub fn login_url(next: Option<&str>) -> String {
    match safe_next(next) {
        "/" => "/login".to_string(),
        n => format!("/login?next={}", urlencoding::encode(n)),
    }
}

fn layout(title: &str, user: Option<&User>, content: &str) -> String {
    let nav = match user {
        Some(u) => format!(
            r#"<span>Signed in as <a href="/users/{}/articles">{}</a></span>
      <a href="/articles/new">New article</a>
      <a href="/logout">Log out</a>"#,
            u.id,
            escape(&u.username)
        ),
        None => r#"<a href="/login">Log in</a>
      <a href="/registration">Register</a>"#
            .to_string(),
    };
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
</head>
<body>
  <nav>
    <a href="/">Home</a>
    <form action="/search" method="get">
      <input name="q" placeholder="Search"><button>Search</button>
    </form>
    {nav}
  </nav>
  <main>
{content}
  </main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"errors\">");
    for e in errors {
        let _ = write!(out, "<li>{}</li>", escape(e));
    }
    out.push_str("</ul>");
    out
}

pub fn article_list(
    title: &str,
    heading: &str,
    articles: &[Article],
    user: Option<&User>,
) -> String {
    let mut content = format!("<h1>{}</h1>\n", escape(heading));
    if articles.is_empty() {
        content.push_str("<p>No articles.</p>");
    } else {
        content.push_str("<ul class=\"articles\">");
        for a in articles {
            let badge = if a.is_verified { " <small>verified</small>" } else { "" };
            let _ = write!(
                content,
                r#"<li><a href="/articles/{}">{}</a>{badge}</li>"#,
                a.id,
                escape(&a.title)
            );
        }
        content.push_str("</ul>");
    }
    layout(title, user, &content)
}

pub fn article_page(article: &Article, owner: Option<&User>, user: Option<&User>) -> String {
    let author = owner
        .map(|o| escape(&o.username))
        .unwrap_or_else(|| "unknown".into());
    let body = article.body.as_deref().map(escape).unwrap_or_default();
    let edit = if user.is_some() {
        format!(r#"<p><a href="/articles/{}/edit">Edit</a></p>"#, article.id)
    } else {
        String::new()
    };
    let content = format!(
        r#"<article>
  <h1>{title}</h1>
  <p class="meta">by <a href="/users/{owner_id}/articles">{author}</a>{verified}</p>
  <div class="body">{body}</div>
</article>
{edit}"#,
        title = escape(&article.title),
        owner_id = article.user_id,
        verified = if article.is_verified { " · verified" } else { "" },
    );
    layout(&article.title, user, &content)
}

pub fn article_form(
    heading: &str,
    action: &str,
    submit: &str,
    form: &ArticleForm,
    errors: &[String],
    user: Option<&User>,
) -> String {
    let checked = if form.checked() { " checked" } else { "" };
    let content = format!(
        r#"<h1>{heading}</h1>
{errors}
<form action="{action}" method="post">
  <label>Title <input name="title" value="{title}" required></label>
  <label>Body <textarea name="body">{body}</textarea></label>
  <label><input type="checkbox" name="is_verified" value="y"{checked}> Is verified</label>
  <button type="submit">{submit}</button>
</form>"#,
        heading = escape(heading),
        errors = error_list(errors),
        action = escape(action),
        title = escape(&form.title),
        body = escape(&form.body),
        submit = escape(submit),
    );
    layout(heading, user, &content)
}

pub fn login_page(username: &str, next: Option<&str>, errors: &[String]) -> String {
    let content = format!(
        r#"<h1>Log in</h1>
{errors}
<form action="/login" method="post">
  <input type="hidden" name="next" value="{next}">
  <label>Username <input name="username" value="{username}" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Log in</button>
</form>
<p>No account? <a href="/registration">Register</a></p>"#,
        errors = error_list(errors),
        next = escape(safe_next(next)),
        username = escape(username),
    );
    layout("Log in", None, &content)
}

pub fn registration_page(form: &RegistrationForm, errors: &[String]) -> String {
    let content = format!(
        r#"<h1>Register</h1>
{errors}
<form action="/registration" method="post">
  <label>Username <input name="username" value="{username}" required></label>
  <label>Email <input type="email" name="email" value="{email}"></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Register</button>
</form>"#,
        errors = error_list(errors),
        username = escape(&form.username),
        email = escape(&form.email),
    );
    layout("Register", None, &content)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let content = format!(
        "<h1>{} {}</h1>\n<p>{}</p>",
        status.as_u16(),
        escape(status.canonical_reason().unwrap_or("Error")),
        escape(message)
    );
    layout(status.canonical_reason().unwrap_or("Error"), None, &content)
}
