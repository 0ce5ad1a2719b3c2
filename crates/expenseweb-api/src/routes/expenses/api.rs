//! Expense API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_status: Session phase, mode and status line (JSON)
//! - api_expenses: Filtered expense list (JSON)
//! - api_expense_detail: Single expense (JSON)
//! - api_reload: Fresh load (JSON)
//! - htmx_expenses_list: Card list (HTML fragment)
//! - htmx_expense_new_form / htmx_expense_edit_form: Modal form (HTML fragment)
//! - htmx_expense_cancel: Close the modal
//! - htmx_expense_submit: Create or update (HTMX)
//! - htmx_expense_delete: Delete with confirmation (HTMX)

use crate::render::{category_select, delete_confirmation, expense_form, notice, oob};
use crate::routes::parse_form_body;
use crate::{ApiError, AppState};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use expenseweb_core::{
    Confirmation, ExpenseFilter, ExpenseForm, MutationReport, Outcome, Session,
};
use serde_json::json;
use std::collections::HashMap;

/// Event the card list listens for to refresh itself with the current filters
pub const CHANGED_EVENT: &str = "expenses-changed";

/// Session state (JSON API)
pub async fn api_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let session = state.session.read().await;
    Json(json!({
        "session": session.snapshot(),
        "base_url": state.source.base_url(),
    }))
}

/// Filtered expenses (JSON API)
pub async fn api_expenses(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let session = state.session.read().await;
    let filter = ExpenseFilter::from_params(&params);
    let visible = session.visible(&filter);
    Json(json!({
        "items": visible,
        "visible": visible.len(),
        "total": session.len(),
    }))
}

/// Single expense (JSON API)
pub async fn api_expense_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let session = state.session.read().await;
    match session.get(&id) {
        Ok(expense) => Json(expense.clone()).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, Json(e.to_details())).into_response(),
    }
}

/// Fresh load: probe, pick a mode, rebuild the collection (JSON API)
pub async fn api_reload(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut session = state.session.write().await;
    let mode = session.load(state.source.as_ref()).await;
    Json(json!({
        "success": true,
        "mode": mode.to_string(),
        "demo_reason": mode.demo_reason(),
        "status": session.status(),
        "total": session.len(),
        "last_error": session.last_error().map(|e| e.to_details()),
    }))
}

/// HTMX: Card list for the current filters, plus a refreshed category select
pub async fn htmx_expenses_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let session = state.session.read().await;
    let filter = ExpenseFilter::from_params(&params);
    let categories = session.categories(&state.config.ui.categories);

    Html(format!(
        "{}{}",
        session.render(&state.renderer(), &filter),
        category_select(&categories, &filter.category, true)
    ))
}

/// HTMX: Empty add form
pub async fn htmx_expense_new_form(State(state): State<AppState>) -> Html<String> {
    let mut session = state.session.write().await;
    session.open_add();
    let categories = session.categories(&state.config.ui.categories);
    Html(expense_form(None, &categories))
}

/// HTMX: Edit form prefilled from the record
pub async fn htmx_expense_edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let mut session = state.session.write().await;
    let expense = session.open_edit(&id)?.clone();
    let categories = session.categories(&state.config.ui.categories);
    Ok(Html(expense_form(Some(&expense), &categories)))
}

/// HTMX: Close the form
pub async fn htmx_expense_cancel(State(state): State<AppState>) -> Html<String> {
    state.session.write().await.cancel_edit();
    Html(String::new())
}

/// HTMX: Save the form - updates the record being edited, otherwise creates
pub async fn htmx_expense_submit(State(state): State<AppState>, body: String) -> Response {
    let params = parse_form_body(&body);
    let draft = ExpenseForm::from_params(&params).into_draft(Utc::now());

    let mut session = state.session.write().await;
    let report = session.submit(state.source.as_ref(), draft).await;
    mutation_response(&state, &session, &report)
}

/// HTMX: Delete a record
///
/// Without `confirmed=true` nothing is deleted and a confirmation dialog is
/// returned instead. The flag is read from the query string or from an
/// urlencoded body, where htmx 1.x puts `hx-vals` of a DELETE.
pub async fn htmx_expense_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let form = parse_form_body(&body);
    let confirmed = params
        .get("confirmed")
        .or_else(|| form.get("confirmed"))
        .map(|v| v == "true")
        .unwrap_or(false);

    let mut session = state.session.write().await;
    let report = session
        .delete(state.source.as_ref(), &id, Confirmation::from_flag(confirmed))
        .await;

    match report.outcome {
        Outcome::Cancelled => match session.get(&id) {
            Ok(expense) => Html(delete_confirmation(expense)).into_response(),
            Err(e) => ApiError::from(e).into_response(),
        },
        _ => mutation_response(&state, &session, &report),
    }
}

/// Empties the modal and swaps status line and notice out of band. Asks
/// the card list to refresh when the collection changed.
fn mutation_response(state: &AppState, session: &Session, report: &MutationReport) -> Response {
    let renderer = state.renderer();
    let mut body = String::new();
    body.push_str(&oob("status-line", &session.render_status(&renderer)));
    body.push_str(&oob("notice", &notice(report.notice().as_deref())));

    let mut response = Html(body).into_response();
    if report.applied() {
        response
            .headers_mut()
            .insert("hx-trigger", HeaderValue::from_static(CHANGED_EVENT));
    }
    response
}
