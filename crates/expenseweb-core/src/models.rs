//! Core data models: expense records, drafts and the list payload

use chrono::{DateTime, Utc};
use expenseweb_config::SampleExpense;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::time;

/// One expense record as exchanged with the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Identifier used to address edit/delete; may be empty for foreign records
    #[serde(default, deserialize_with = "lenient_string")]
    pub expense_id: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
    /// Raw timestamp text, parsed on demand
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    /// Fields the API sends that this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Expense {
    /// Build a record from a draft under the given id
    pub fn from_draft(expense_id: String, draft: &ExpenseDraft) -> Self {
        Self {
            expense_id,
            amount: draft.amount,
            category: draft.category.clone(),
            notes: draft.notes.clone(),
            date: draft.date.clone(),
            extra: Map::new(),
        }
    }

    /// Whether the record can be addressed by edit/delete
    pub fn has_id(&self) -> bool {
        !self.expense_id.trim().is_empty()
    }

    /// Parsed timestamp, `None` when missing or unparseable
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        time::parse_timestamp(&self.date)
    }

    /// Merge the draft's fields into this record, keeping id and extras
    pub fn apply_draft(&mut self, draft: &ExpenseDraft) {
        self.amount = draft.amount;
        self.category = draft.category.clone();
        self.notes = draft.notes.clone();
        self.date = draft.date.clone();
    }
}

impl From<&SampleExpense> for Expense {
    fn from(sample: &SampleExpense) -> Self {
        Self {
            expense_id: sample.expense_id.clone(),
            amount: sample.amount,
            category: sample.category.clone(),
            notes: sample.notes.clone(),
            date: sample.date.clone(),
            extra: Map::new(),
        }
    }
}

/// Expense fields without identifier, as sent on create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub amount: f64,
    pub category: String,
    pub notes: String,
    pub date: String,
}

/// Raw values of the add/edit form
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub date: String,
}

impl ExpenseForm {
    /// Pick the form fields out of a submitted parameter map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let field = |name: &str| params.get(name).cloned().unwrap_or_default();
        Self {
            amount: field("amount"),
            category: field("category"),
            notes: field("notes"),
            date: field("date"),
        }
    }

    /// Normalize into a draft. Unparseable amounts become 0 and a missing
    /// date becomes `now`.
    pub fn into_draft(self, now: DateTime<Utc>) -> ExpenseDraft {
        let amount = self
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .unwrap_or(0.0);
        ExpenseDraft {
            amount,
            category: self.category,
            notes: self.notes,
            date: time::form_date_to_iso(&self.date, now),
        }
    }
}

/// Decode a list response: a bare array of records, or an object whose
/// `items` field is one. Anything else is rejected.
pub fn parse_list_payload(payload: Value) -> CoreResult<Vec<Expense>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("items") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CoreError::InvalidPayload {
                    message: "object without an `items` array".to_string(),
                })
            }
        },
        other => {
            return Err(CoreError::InvalidPayload {
                message: format!("expected an array, got {}", json_kind(&other)),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(CoreError::InvalidPayload {
                    message: format!("item {} is {}, not an object", index, json_kind(&item)),
                });
            }
            serde_json::from_value(item).map_err(|e| CoreError::InvalidPayload {
                message: format!("item {}: {}", index, e),
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if amount.is_finite() { amount } else { 0.0 })
}
