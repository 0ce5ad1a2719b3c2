//! Expense routes - card list, add/edit form, delete
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{
    api_expense_detail,
    api_expenses,
    api_reload,
    api_status,
    htmx_expense_cancel,
    htmx_expense_delete,
    htmx_expense_edit_form,
    htmx_expense_new_form,
    htmx_expense_submit,
    htmx_expenses_list,
};

pub use page::page_expenses;
