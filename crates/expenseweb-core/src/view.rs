//! Render capability

use crate::filter::ExpenseFilter;
use crate::models::Expense;
use crate::session::{Mode, Session};

/// Turns session state into output (HTML fragments, text, ...)
pub trait ExpenseRenderer {
    type Output;

    /// Render the visible subset. `total` is the size of the unfiltered
    /// collection, so the renderer can tell "empty" from "filtered out".
    fn render_list(&self, visible: &[&Expense], total: usize) -> Self::Output;

    /// Render the status line
    fn render_status(&self, status: &str, mode: Option<Mode>) -> Self::Output;
}

impl Session {
    /// Filter the collection and hand it to the renderer
    pub fn render<R: ExpenseRenderer>(&self, renderer: &R, filter: &ExpenseFilter) -> R::Output {
        let visible = self.visible(filter);
        renderer.render_list(&visible, self.len())
    }

    pub fn render_status<R: ExpenseRenderer>(&self, renderer: &R) -> R::Output {
        renderer.render_status(self.status(), self.mode())
    }
}
