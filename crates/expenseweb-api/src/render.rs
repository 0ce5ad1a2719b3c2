//! HTML fragments for the expense page
//!
//! Everything interpolated into markup goes through `escape_html`; ids in
//! URLs are percent-encoded first.

use expenseweb_config::UiConfig;
use expenseweb_core::time::{datetime_local_value, display_timestamp};
use expenseweb_core::{Expense, ExpenseFilter, ExpenseRenderer, Mode};
use expenseweb_utils::{escape_html, format_amount};

/// Card list and status line renderer
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    currency_symbol: String,
}

impl HtmlRenderer {
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            currency_symbol: ui.currency_symbol.clone(),
        }
    }

    /// One expense card
    pub fn render_card(&self, expense: &Expense) -> String {
        let category = if expense.category.is_empty() {
            "-".to_string()
        } else {
            escape_html(&expense.category)
        };

        let controls = if expense.has_id() {
            // the browser already asked via hx-confirm
            format!(
                r#"<div class='flex gap-2'>
            <button hx-get='{url}/edit' hx-target='#modal' class='px-3 py-1 text-sm border rounded-lg hover:bg-gray-50'>Edit</button>
            <button hx-delete='{url}?confirmed=true' hx-confirm='Delete this expense?' hx-target='#modal' class='px-3 py-1 text-sm text-red-600 border border-red-200 rounded-lg hover:bg-red-50'>Delete</button>
        </div>"#,
                url = item_url(&expense.expense_id)
            )
        } else {
            String::new()
        };

        format!(
            r#"<div class='expense-card bg-white rounded-xl shadow-sm p-4 flex justify-between items-start'>
        <div>
            <div class='flex items-center gap-3'>
                <span class='px-2 py-0.5 text-xs rounded bg-indigo-50 text-indigo-700'>{}</span>
                <span class='font-bold'>{}{}</span>
            </div>
            <p class='text-gray-700 mt-1'>{}</p>
            <p class='text-xs text-gray-400 mt-1'>{}</p>
        </div>
        {}
    </div>"#,
            category,
            escape_html(&self.currency_symbol),
            format_amount(expense.amount),
            escape_html(&expense.notes),
            escape_html(&display_timestamp(&expense.date)),
            controls
        )
    }
}

impl ExpenseRenderer for HtmlRenderer {
    type Output = String;

    fn render_list(&self, visible: &[&Expense], total: usize) -> String {
        if visible.is_empty() {
            let message = if total == 0 {
                "No expenses found"
            } else {
                "No expenses found (filtered)"
            };
            return format!(
                "<div class='text-center py-12 text-gray-500'><p>{}</p></div>",
                message
            );
        }

        let mut html = String::from("<div class='space-y-3'>");
        for expense in visible {
            html.push_str(&self.render_card(expense));
        }
        html.push_str("</div>");
        html
    }

    fn render_status(&self, status: &str, mode: Option<Mode>) -> String {
        let (label, class) = match mode {
            Some(Mode::Real) => ("API", "bg-green-100 text-green-700"),
            Some(Mode::Demo(_)) => ("Demo", "bg-yellow-100 text-yellow-700"),
            None => ("…", "bg-gray-100 text-gray-600"),
        };
        format!(
            "<span class='px-2 py-0.5 text-xs rounded {}'>{}</span> <span>{}</span>",
            class,
            label,
            escape_html(status)
        )
    }
}

// ==================== Page pieces ====================

/// Escaped URL of a single record's routes, `/expenses/item/{encoded id}`
pub fn item_url(id: &str) -> String {
    escape_html(&format!("/expenses/item/{}", urlencoding::encode(id)))
}

/// Out-of-band replacement for an element with the given id
pub fn oob(id: &str, content: &str) -> String {
    format!("<div id='{}' hx-swap-oob='true'>{}</div>", id, content)
}

/// Notice banner content; empty for no notice
pub fn notice(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(
            "<div class='bg-indigo-50 border border-indigo-200 text-indigo-800 rounded-lg px-4 py-2'>{}</div>",
            escape_html(message)
        ),
        None => String::new(),
    }
}

/// `<option>`s for the category filter; `selected` keeps the current pick
pub fn category_options(categories: &[String], selected: &str) -> String {
    let mut html = String::from("<option value=''>All categories</option>");
    for category in categories {
        let marker = if category == selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option value='{0}'{1}>{0}</option>",
            escape_html(category),
            marker
        ));
    }
    html
}

/// Category select of the filter bar
pub fn category_select(categories: &[String], selected: &str, oob_swap: bool) -> String {
    format!(
        "<select id='category-filter' name='category'{} class='px-3 py-2 border rounded-lg'>{}</select>",
        if oob_swap { " hx-swap-oob='true'" } else { "" },
        category_options(categories, selected)
    )
}

/// Filter bar; any change reloads the card list
pub fn filter_bar(categories: &[String], filter: &ExpenseFilter) -> String {
    format!(
        r#"<form id='filters' hx-get='/expenses/list' hx-target='#cards' hx-trigger='input changed delay:300ms, change' class='flex flex-wrap gap-2 mb-4'>
        <input type='search' name='q' value='{}' placeholder='Search notes or category' class='px-3 py-2 border rounded-lg w-64'>
        {}
        <input type='date' name='from' value='{}' class='px-3 py-2 border rounded-lg'>
        <input type='date' name='to' value='{}' class='px-3 py-2 border rounded-lg'>
    </form>"#,
        escape_html(&filter.query),
        category_select(categories, &filter.category, false),
        filter.from.map(|d| d.to_string()).unwrap_or_default(),
        filter.to.map(|d| d.to_string()).unwrap_or_default()
    )
}

/// Add/edit modal; `expense` is `None` when adding
pub fn expense_form(expense: Option<&Expense>, categories: &[String]) -> String {
    let title = if expense.is_some() { "Edit Expense" } else { "Add Expense" };
    let amount = expense
        .filter(|e| e.amount != 0.0)
        .map(|e| e.amount.to_string())
        .unwrap_or_default();
    let category = expense.map(|e| escape_html(&e.category)).unwrap_or_default();
    let notes = expense.map(|e| escape_html(&e.notes)).unwrap_or_default();
    let date = expense
        .map(|e| datetime_local_value(&e.date))
        .unwrap_or_default();

    let options: String = categories
        .iter()
        .map(|c| format!("<option value='{}'>", escape_html(c)))
        .collect();

    format!(
        r#"<div class='fixed inset-0 bg-black bg-opacity-30 flex items-center justify-center z-50'>
    <div class='bg-white rounded-xl shadow-lg p-6 w-full max-w-md'>
        <h3 class='text-lg font-semibold mb-4'>{title}</h3>
        <form hx-post='/expenses/submit' hx-target='#modal' class='space-y-4'>
            <div>
                <label class='block text-sm font-medium text-gray-700 mb-1'>Amount</label>
                <input type='number' step='0.01' name='amount' value='{amount}' class='w-full px-3 py-2 border rounded-lg'>
            </div>
            <div>
                <label class='block text-sm font-medium text-gray-700 mb-1'>Category</label>
                <input type='text' name='category' value='{category}' list='category-choices' class='w-full px-3 py-2 border rounded-lg'>
                <datalist id='category-choices'>{options}</datalist>
            </div>
            <div>
                <label class='block text-sm font-medium text-gray-700 mb-1'>Notes</label>
                <textarea name='notes' rows='3' class='w-full px-3 py-2 border rounded-lg'>{notes}</textarea>
            </div>
            <div>
                <label class='block text-sm font-medium text-gray-700 mb-1'>Date</label>
                <input type='datetime-local' name='date' value='{date}' class='w-full px-3 py-2 border rounded-lg'>
            </div>
            <div class='flex gap-2 justify-end'>
                <button type='button' hx-post='/expenses/cancel' hx-target='#modal' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancel</button>
                <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Save</button>
            </div>
        </form>
    </div>
</div>"#,
        title = title,
        amount = amount,
        category = category,
        options = options,
        notes = notes,
        date = escape_html(&date),
    )
}

/// Shown when a delete arrives without confirmation
pub fn delete_confirmation(expense: &Expense) -> String {
    format!(
        r#"<div class='fixed inset-0 bg-black bg-opacity-30 flex items-center justify-center z-50'>
    <div class='bg-white rounded-xl shadow-lg p-6 w-full max-w-sm'>
        <p class='mb-2 font-medium'>Delete this expense?</p>
        <p class='text-sm text-gray-600 mb-4'>{} {}</p>
        <div class='flex gap-2 justify-end'>
            <button hx-post='/expenses/cancel' hx-target='#modal' class='px-4 py-2 border rounded-lg'>Cancel</button>
            <button hx-delete='{}?confirmed=true' hx-target='#modal' class='px-4 py-2 bg-red-600 text-white rounded-lg'>Delete</button>
        </div>
    </div>
</div>"#,
        escape_html(&expense.category),
        escape_html(&expense.notes),
        item_url(&expense.expense_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use expenseweb_core::{DemoReason, ExpenseDraft};

    fn renderer() -> HtmlRenderer {
        HtmlRenderer::new(&UiConfig::default())
    }

    fn expense(id: &str, category: &str, notes: &str, date: &str) -> Expense {
        Expense::from_draft(
            id.to_string(),
            &ExpenseDraft {
                amount: 1500.0,
                category: category.to_string(),
                notes: notes.to_string(),
                date: date.to_string(),
            },
        )
    }

    #[test]
    fn test_card_contents() {
        let card = renderer().render_card(&expense("demo-1", "Food", "Lunch", "2025-01-05T12:00:00Z"));
        assert!(card.contains("Food"));
        assert!(card.contains("₹1,500"));
        assert!(card.contains("Lunch"));
        assert!(card.contains("2025-01-05 12:00 UTC"));
        assert!(card.contains("hx-get='/expenses/item/demo-1/edit'"));
        assert!(card.contains("hx-delete='/expenses/item/demo-1?confirmed=true'"));
        assert!(!card.contains("hx-vals"));
    }

    #[test]
    fn test_card_escapes_and_encodes() {
        let card = renderer().render_card(&expense(
            "a b'<x>",
            "<script>",
            "Tom & \"Jerry\"",
            "someday",
        ));
        assert!(card.contains("&lt;script&gt;"));
        assert!(card.contains("Tom &amp; &quot;Jerry&quot;"));
        assert!(card.contains("/expenses/item/a%20b%27%3Cx%3E/edit"));
        assert!(card.contains("someday"));
        assert!(!card.contains("<script>"));
    }

    #[test]
    fn test_card_escapes_script_in_notes() {
        let card = renderer().render_card(&expense(
            "demo-1",
            "Food",
            "<script>alert('x')</script>",
            "2025-01-05T12:00:00Z",
        ));
        assert!(card.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!card.contains("<script>"));
    }

    #[test]
    fn test_confirmation_targets_item_route() {
        let dialog = delete_confirmation(&expense("list", "Food", "x", ""));
        assert!(dialog.contains("hx-delete='/expenses/item/list?confirmed=true'"));
    }

    #[test]
    fn test_card_without_id_has_no_controls() {
        let card = renderer().render_card(&expense("", "", "orphan", ""));
        assert!(!card.contains("hx-delete"));
        assert!(card.contains(">-</span>"));
    }

    #[test]
    fn test_empty_states() {
        assert!(renderer().render_list(&[], 0).contains("No expenses found</p>"));
        assert!(renderer().render_list(&[], 3).contains("No expenses found (filtered)"));
    }

    #[test]
    fn test_status_badge() {
        let html = renderer().render_status(
            "API not reachable, switching to demo mode",
            Some(Mode::Demo(DemoReason::Unreachable)),
        );
        assert!(html.contains(">Demo<"));
        assert!(html.contains("API not reachable"));
    }

    #[test]
    fn test_form_prefill() {
        let record = expense("demo-2", "Travel", "Taxi", "2025-01-10T15:30:00Z");
        let form = expense_form(Some(&record), &["Food".to_string()]);
        assert!(form.contains("Edit Expense"));
        assert!(form.contains("value='1500'"));
        assert!(form.contains("value='Travel'"));
        assert!(form.contains(">Taxi</textarea>"));
        assert!(form.contains("value='2025-01-10T15:30'"));

        let blank = expense_form(None, &[]);
        assert!(blank.contains("Add Expense"));
        assert!(blank.contains("name='amount' value=''"));
    }

    #[test]
    fn test_category_options_selected() {
        let html = category_options(&["Food".to_string(), "Travel".to_string()], "Travel");
        assert!(html.contains("<option value='Travel' selected>Travel</option>"));
        assert!(html.contains("<option value='Food'>Food</option>"));
    }
}
