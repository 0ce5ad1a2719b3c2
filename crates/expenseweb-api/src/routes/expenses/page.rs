//! Expense page rendering - Full page endpoint

use crate::render::filter_bar;
use crate::routes::expenses::api::CHANGED_EVENT;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use expenseweb_core::ExpenseFilter;
use expenseweb_utils::escape_html;
use std::collections::HashMap;

/// Expense page. Every full page load is a fresh load against the API.
pub async fn page_expenses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let mut session = state.session.write().await;
    session.load(state.source.as_ref()).await;

    let renderer = state.renderer();
    let filter = ExpenseFilter::from_params(&params);
    let categories = session.categories(&state.config.ui.categories);

    let inner_content = format!(
        r#"<div class='max-w-3xl mx-auto p-6'>
        <div class='flex items-center justify-between mb-2'>
            <h1 class='text-2xl font-bold'>{title}</h1>
            <div class='flex gap-2'>
                <a href='/' class='px-4 py-2 bg-gray-100 text-gray-700 rounded-lg hover:bg-gray-200'>Reload</a>
                <button hx-get='/expenses/new' hx-target='#modal' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Add Expense</button>
            </div>
        </div>
        <div id='status-line' class='text-sm text-gray-600 mb-4'>{status}</div>
        {filters}
        <div id='notice' class='mb-4'></div>
        <div id='cards' hx-get='/expenses/list' hx-trigger='{event} from:body' hx-include='#filters'>{cards}</div>
        <div id='modal'></div>
    </div>"#,
        title = escape_html(&state.config.ui.title),
        status = session.render_status(&renderer),
        filters = filter_bar(&categories, &filter),
        event = CHANGED_EVENT,
        cards = session.render(&renderer, &filter),
    );

    if crate::is_htmx_request(&headers) {
        Html(inner_content)
    } else {
        Html(crate::base_html(&state.config.ui.title, &inner_content))
    }
}
