//! Settings form pages

use crate::error::ApiError;
use crate::extractors::Actor;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Html,
    Form,
};
use dbsettings_core::form::escape_html;
use dbsettings_core::{parse_posted, SettingsForm};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let mut body = String::from("<h1>Settings</h1>\n<ul>\n");
    for form in state.forms.iter() {
        body.push_str(&format!(
            "<li><a href=\"/settings/{}\">{}</a></li>\n",
            escape_html(&form.id),
            escape_html(form.title())
        ));
    }
    body.push_str("</ul>\n");
    Html(page("Settings", &body))
}

pub async fn show(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let object = state.forms.get(&id)?;
    let mut store = state.open_store(actor).await?;
    let form = SettingsForm::build(object, &mut store).await?;

    Ok(Html(page(object.title(), &form.render())))
}

pub async fn submit(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Html<String>, ApiError> {
    let object = state.forms.get(&id)?;
    let mut store = state.open_store(actor).await?;
    let mut form = SettingsForm::build(object, &mut store).await?;

    let posted = parse_posted(&pairs);
    form.submit(&posted, &mut store).await?;

    Ok(Html(page(object.title(), &form.render())))
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}
