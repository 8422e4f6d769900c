//! Page templates, compiled into the binary.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::error::AppError;
use crate::schemas::AppState;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("authentication/login.html", include_str!("../templates/authentication/login.html")),
    ("authentication/register.html", include_str!("../templates/authentication/register.html")),
    ("account/api_key.html", include_str!("../templates/account/api_key.html")),
    ("dashboard/dashboard.html", include_str!("../templates/dashboard/dashboard.html")),
    ("dashboard/search_results.html", include_str!("../templates/dashboard/search_results.html")),
];

/// Upstream links are only rendered when they are plain web URLs.
pub fn is_web_url(value: Option<&str>) -> bool {
    value.is_some_and(|url| {
        let url = url.trim_start().to_ascii_lowercase();
        url.starts_with("https://") || url.starts_with("http://")
    })
}

pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_test("web_url", is_web_url);
    for &(name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(env)
}

pub fn render<S: Serialize>(state: &AppState, name: &str, context: S) -> Result<Html<String>, AppError> {
    let template = state.templates.get_template(name)?;
    Ok(Html(template.render(context)?))
}
