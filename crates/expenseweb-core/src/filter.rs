//! Filtering of the local collection
//!
//! Every filter change re-evaluates against the full collection; the
//! output keeps collection order.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::Expense;
use crate::time;

/// The four independent list criteria, combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Case-insensitive substring of notes or category
    pub query: String,
    /// Exact category
    pub category: String,
    /// Inclusive lower bound on the record's UTC date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the record's UTC date
    pub to: Option<NaiveDate>,
}

impl ExpenseFilter {
    /// Read `q`, `category`, `from` and `to`. Unparseable dates are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            query: params.get("q").cloned().unwrap_or_default(),
            category: params.get("category").cloned().unwrap_or_default(),
            from: params.get("from").and_then(|s| time::parse_filter_date(s)),
            to: params.get("to").and_then(|s| time::parse_filter_date(s)),
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn with_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Whether any criterion is set
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || !self.category.is_empty() || self.from.is_some() || self.to.is_some()
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        if !self.category.is_empty() && expense.category != self.category {
            return false;
        }

        if !self.query.is_empty() {
            let query = self.query.to_lowercase();
            if !expense.notes.to_lowercase().contains(&query)
                && !expense.category.to_lowercase().contains(&query)
            {
                return false;
            }
        }

        if self.from.is_some() || self.to.is_some() {
            // records without a usable date are never excluded here
            if let Some(day) = expense.timestamp().map(|ts| ts.date_naive()) {
                if self.from.map_or(false, |from| day < from) {
                    return false;
                }
                if self.to.map_or(false, |to| day > to) {
                    return false;
                }
            }
        }

        true
    }

    /// Visible subset in collection order
    pub fn apply<'a>(&self, expenses: &'a [Expense]) -> Vec<&'a Expense> {
        expenses.iter().filter(|e| self.matches(e)).collect()
    }
}
