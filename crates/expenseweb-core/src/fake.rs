//! Scripted in-memory `ExpenseSource` for tests
//!
//! Behaves like a small CRUD collection and records every call so tests
//! can assert on the exact request sequence.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

use crate::error::SourceError;
use crate::models::{Expense, ExpenseDraft};
use crate::source::ExpenseSource;

const FAKE_BASE_URL: &str = "http://fake.test";

/// A call received by the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Probe,
    List,
    Create(ExpenseDraft),
    Update(String, ExpenseDraft),
    Delete(String),
}

#[derive(Debug, Default)]
struct FakeState {
    records: Vec<Expense>,
    calls: Vec<Call>,
    next_id: usize,
    probe_error: Option<SourceError>,
    list_payload: Option<Value>,
    list_error: Option<SourceError>,
    failing_mutations: bool,
}

#[derive(Debug)]
pub struct FakeSource {
    base_url: Option<String>,
    state: Mutex<FakeState>,
}

impl FakeSource {
    /// Reachable API holding `records`
    pub fn online(records: Vec<Expense>) -> Self {
        Self {
            base_url: Some(FAKE_BASE_URL.to_string()),
            state: Mutex::new(FakeState {
                records,
                ..FakeState::default()
            }),
        }
    }

    /// API whose probe fails with a network error
    pub fn offline() -> Self {
        let source = Self::online(Vec::new());
        source.lock().probe_error = Some(SourceError::Network {
            message: "connection refused".to_string(),
        });
        source
    }

    /// No usable base URL configured
    pub fn invalid_base() -> Self {
        Self {
            base_url: None,
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Answer list calls with a fixed payload instead of the records
    pub fn with_list_payload(self, payload: Value) -> Self {
        self.lock().list_payload = Some(payload);
        self
    }

    pub fn with_list_error(self, error: SourceError) -> Self {
        self.lock().list_error = Some(error);
        self
    }

    /// Reject every create, update and delete with a 500
    pub fn failing_mutations(self) -> Self {
        self.lock().failing_mutations = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Records currently held on the "server"
    pub fn records(&self) -> Vec<Expense> {
        self.lock().records.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_reachable(&self, state: &FakeState) -> Result<(), SourceError> {
        if self.base_url.is_none() {
            return Err(SourceError::InvalidBaseUrl);
        }
        match &state.probe_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn check_mutation(&self, state: &FakeState) -> Result<(), SourceError> {
        self.check_reachable(state)?;
        if state.failing_mutations {
            return Err(server_error());
        }
        Ok(())
    }
}

fn server_error() -> SourceError {
    SourceError::Status {
        status: 500,
        reason: "Internal Server Error".to_string(),
        body: "{\"error\":\"scripted failure\"}".to_string(),
    }
}

fn not_found(id: &str) -> SourceError {
    SourceError::Status {
        status: 404,
        reason: "Not Found".to_string(),
        body: format!("{{\"error\":\"Expense {} not found\"}}", id),
    }
}

fn to_json(expense: &Expense) -> Result<Value, SourceError> {
    serde_json::to_value(expense).map_err(|e| SourceError::Decode {
        message: e.to_string(),
    })
}

#[async_trait]
impl ExpenseSource for FakeSource {
    fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    async fn probe(&self) -> Result<(), SourceError> {
        let mut state = self.lock();
        state.calls.push(Call::Probe);
        self.check_reachable(&state)
    }

    async fn list(&self) -> Result<Value, SourceError> {
        let mut state = self.lock();
        state.calls.push(Call::List);
        self.check_reachable(&state)?;
        if let Some(error) = &state.list_error {
            return Err(error.clone());
        }
        if let Some(payload) = &state.list_payload {
            return Ok(payload.clone());
        }
        serde_json::to_value(&state.records).map_err(|e| SourceError::Decode {
            message: e.to_string(),
        })
    }

    async fn create(&self, draft: &ExpenseDraft) -> Result<Value, SourceError> {
        let mut state = self.lock();
        state.calls.push(Call::Create(draft.clone()));
        self.check_mutation(&state)?;

        state.next_id += 1;
        let expense = Expense::from_draft(format!("srv-{}", state.next_id), draft);
        let body = to_json(&expense)?;
        state.records.push(expense);
        Ok(body)
    }

    async fn update(&self, id: &str, draft: &ExpenseDraft) -> Result<Value, SourceError> {
        let mut state = self.lock();
        state.calls.push(Call::Update(id.to_string(), draft.clone()));
        self.check_mutation(&state)?;

        match state.records.iter_mut().find(|e| e.expense_id == id) {
            Some(expense) => {
                expense.apply_draft(draft);
                to_json(expense)
            }
            None => Err(not_found(id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), SourceError> {
        let mut state = self.lock();
        state.calls.push(Call::Delete(id.to_string()));
        self.check_mutation(&state)?;

        let before = state.records.len();
        state.records.retain(|e| e.expense_id != id);
        if state.records.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
