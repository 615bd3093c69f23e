use axum::{
    extract::{Query, State},
    response::Html,
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

use crate::agents::{parse_reply, ReplyParts};
use crate::config::Enrichment;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    #[serde(default)]
    pub pr_url: String,
    #[serde(default)]
    pub reviewer: String,
}

/// GET /feedback: renders the rating form. The PR URL and reviewer ride
/// along as hidden fields so the POST can carry them through. No side
/// effects.
pub async fn feedback_form(
    State(_state): State<Arc<AppState>>,
    Query(query): Query<FormQuery>,
) -> Result<Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("pr_url", &query.pr_url);
    ctx.insert("reviewer", &query.reviewer);
    render_template("feedback_form.html", ctx)
}

#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub pr_url: String,
    #[serde(default)]
    pub reviewer: String,
}

/// POST /feedback: validates the rating, optionally enriches the feedback,
/// appends one row to the store, renders the thank-you page.
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FeedbackForm>,
) -> Result<Html<String>, AppError> {
    let rating = parse_rating(&form.rating)?;

    let mut ctx = Context::new();
    ctx.insert("feedback", &form.feedback);
    // Empty strings are falsy in tera; the template skips the enrichment
    // blocks unless a mode below overwrites these.
    ctx.insert("summary", "");
    ctx.insert("image_url", "");

    let mut row = vec![
        form.pr_url.clone(),
        form.reviewer.clone(),
        rating.to_string(),
        form.feedback.clone(),
    ];

    match state.config.enrichment {
        Enrichment::None => {}
        mode => {
            let raw = state.enricher.summarize(&form.feedback).await?;
            let parts = match parse_reply(&raw) {
                Ok(parts) => parts,
                Err(e) => {
                    tracing::warn!("Unparseable enrichment reply ({e}); reusing raw feedback");
                    ReplyParts::from_feedback(&form.feedback)
                }
            };

            row.push(parts.summary.clone());
            row.push(parts.image_prompt.clone());
            ctx.insert("summary", &parts.summary);

            if mode == Enrichment::SummarizeAndImage {
                let image_url = state.enricher.generate_image(&parts.image_prompt).await?;
                row.push(image_url.clone());
                ctx.insert("image_url", &image_url);
            }
        }
    }

    state.rows.append_row(&row).await?;

    render_template("thank_you.html", ctx)
}

fn parse_rating(raw: &str) -> Result<u8, AppError> {
    let value: u8 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::BadRating(format!("expected an integer from 1 to 5, got {raw:?}")))?;

    if !(1..=5).contains(&value) {
        return Err(AppError::BadRating(format!(
            "rating must be between 1 and 5, got {value}"
        )));
    }

    Ok(value)
}

fn render_template(name: &str, ctx: Context) -> Result<Html<String>, AppError> {
    let tera = crate::templates::get_tera();
    Ok(Html(tera.render(name, &ctx)?))
}
