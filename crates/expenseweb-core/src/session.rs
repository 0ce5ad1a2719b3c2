//! Client session: mode resolution, the in-memory collection and CRUD
//!
//! A `Session` owns everything the page shows. Operations take the data
//! source as an argument and never fail: every remote error degrades to a
//! local fallback and is reported through the status line and a notice.

use expenseweb_config::Config;
use serde::Serialize;

use crate::error::{CoreError, CoreResult, ErrorDetails, SourceError};
use crate::filter::ExpenseFilter;
use crate::models::{parse_list_payload, Expense, ExpenseDraft};
use crate::source::{expense_path, ExpenseSource, COLLECTION_PATH};

const LOG_TARGET: &str = "expenseweb::session";

// ==================== Mode ====================

/// Why the session runs on local data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoReason {
    /// `api.use_demo_mode` is set
    Forced,
    /// Base URL missing or not http(s)
    InvalidBaseUrl,
    /// Probe failed
    Unreachable,
    /// List payload had the wrong shape
    MalformedPayload,
    /// List call failed after a good probe
    LoadFailed,
    /// A create/update/delete call failed
    MutationFailed,
}

impl std::fmt::Display for DemoReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemoReason::Forced => write!(f, "forced"),
            DemoReason::InvalidBaseUrl => write!(f, "invalid_base_url"),
            DemoReason::Unreachable => write!(f, "unreachable"),
            DemoReason::MalformedPayload => write!(f, "malformed_payload"),
            DemoReason::LoadFailed => write!(f, "load_failed"),
            DemoReason::MutationFailed => write!(f, "mutation_failed"),
        }
    }
}

/// Where mutations go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Real,
    Demo(DemoReason),
}

impl Mode {
    pub fn is_demo(&self) -> bool {
        matches!(self, Mode::Demo(_))
    }

    pub fn demo_reason(&self) -> Option<DemoReason> {
        match self {
            Mode::Real => None,
            Mode::Demo(reason) => Some(*reason),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Real => write!(f, "real"),
            Mode::Demo(_) => write!(f, "demo"),
        }
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Probing,
    Active(Mode),
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Uninitialized => write!(f, "uninitialized"),
            SessionPhase::Probing => write!(f, "probing"),
            SessionPhase::Active(_) => write!(f, "active"),
        }
    }
}

// ==================== Mutation reports ====================

/// Mutating user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    /// HTTP method used against the API
    pub fn method(&self) -> &'static str {
        match self {
            Action::Create => "POST",
            Action::Update => "PUT",
            Action::Delete => "DELETE",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            Action::Create => "Added",
            Action::Update => "Updated",
            Action::Delete => "Deleted",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "Create"),
            Action::Update => write!(f, "Update"),
            Action::Delete => write!(f, "Delete"),
        }
    }
}

/// What happened to a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// API accepted it and the collection was reloaded
    Remote,
    /// Applied to the local collection in demo mode
    Local,
    /// API call failed; session switched to demo and applied it locally
    Fallback { error: SourceError },
    /// No record with that id
    NotFound,
    /// Delete was not confirmed
    Cancelled,
}

/// User confirmation for destructive actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn from_flag(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Result of a create, update or delete
#[derive(Debug, Clone, PartialEq)]
pub struct MutationReport {
    pub action: Action,
    pub outcome: Outcome,
    /// Target id; for creates, the local id when one was assigned
    pub expense_id: Option<String>,
}

impl MutationReport {
    fn new(action: Action, outcome: Outcome, expense_id: Option<String>) -> Self {
        Self {
            action,
            outcome,
            expense_id,
        }
    }

    /// Message shown to the user, if any
    pub fn notice(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Remote => Some(format!("{} (API)", self.action.past_tense())),
            Outcome::Local => Some(format!("{} (demo)", self.action.past_tense())),
            Outcome::Fallback { .. } => Some(format!("{} failed: switching to demo", self.action)),
            Outcome::NotFound => Some("Expense not found".to_string()),
            Outcome::Cancelled => None,
        }
    }

    /// Whether the collection changed
    pub fn applied(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::Remote | Outcome::Local | Outcome::Fallback { .. }
        )
    }
}

/// Serializable view of the session for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: String,
    pub mode: Option<String>,
    pub demo_reason: Option<DemoReason>,
    pub status: String,
    pub total: usize,
    pub editing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ErrorDetails>,
}

// ==================== Session ====================

/// Per-process client state
#[derive(Debug, Clone)]
pub struct Session {
    phase: SessionPhase,
    expenses: Vec<Expense>,
    fallback: Vec<Expense>,
    force_demo: bool,
    status: String,
    editing: Option<String>,
    last_error: Option<CoreError>,
}

impl Session {
    /// Create a session with the configured fallback dataset and demo flag
    pub fn new(config: &Config) -> Self {
        let fallback = config.demo_data.iter().map(Expense::from).collect();
        Self::with_fallback(fallback, config.api.use_demo_mode)
    }

    pub fn with_fallback(fallback: Vec<Expense>, force_demo: bool) -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            expenses: Vec::new(),
            fallback,
            force_demo,
            status: String::new(),
            editing: None,
            last_error: None,
        }
    }

    // ---------- queries ----------

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Active mode, `None` before the first load completes
    pub fn mode(&self) -> Option<Mode> {
        match self.phase {
            SessionPhase::Active(mode) => Some(mode),
            _ => None,
        }
    }

    pub fn is_real(&self) -> bool {
        self.phase == SessionPhase::Active(Mode::Real)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Failure that put the session in demo mode, cleared by a fresh load
    pub fn last_error(&self) -> Option<&CoreError> {
        self.last_error.as_ref()
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.expenses.iter().any(|e| e.expense_id == id)
    }

    pub fn get(&self, id: &str) -> CoreResult<&Expense> {
        self.expenses
            .iter()
            .find(|e| e.expense_id == id)
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })
    }

    /// Records passing the filter, in collection order
    pub fn visible(&self, filter: &ExpenseFilter) -> Vec<&Expense> {
        filter.apply(&self.expenses)
    }

    /// Configured categories followed by any others found in the collection
    pub fn categories(&self, configured: &[String]) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        let found = self.expenses.iter().map(|e| &e.category);
        for category in configured.iter().chain(found) {
            if !category.is_empty() && !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        categories
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// The record open in the form, if it still exists
    pub fn editing_expense(&self) -> Option<&Expense> {
        self.editing.as_deref().and_then(|id| self.get(id).ok())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mode = self.mode();
        SessionSnapshot {
            phase: self.phase.to_string(),
            mode: mode.map(|m| m.to_string()),
            demo_reason: mode.and_then(|m| m.demo_reason()),
            status: self.status.clone(),
            total: self.expenses.len(),
            editing: self.editing.clone(),
            last_error: self.last_error.as_ref().map(CoreError::to_details),
        }
    }

    // ---------- load ----------

    /// Fresh load: resolve the mode and rebuild the collection
    pub async fn load(&mut self, source: &dyn ExpenseSource) -> Mode {
        self.phase = SessionPhase::Probing;
        self.last_error = None;

        if self.force_demo {
            self.set_status("Demo mode (forced)");
            return self.use_fallback(DemoReason::Forced);
        }

        if source.base_url().is_none() {
            self.last_error = Some(SourceError::InvalidBaseUrl.into());
            self.set_status("API base is invalid, using demo mode");
            return self.use_fallback(DemoReason::InvalidBaseUrl);
        }

        let url = source.url_for(COLLECTION_PATH);
        self.set_status(&format!("Checking API: {}", url));

        match source.probe().await {
            Ok(()) => {
                self.enter_real();
                self.set_status("Connected to API (real mode)");
            }
            Err(SourceError::InvalidBaseUrl) => {
                self.last_error = Some(SourceError::InvalidBaseUrl.into());
                self.set_status("API base is invalid, using demo mode");
                return self.use_fallback(DemoReason::InvalidBaseUrl);
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Probe of {} failed: {}", url, e);
                self.last_error = Some(e.into());
                self.set_status("API not reachable, switching to demo mode");
                return self.use_fallback(DemoReason::Unreachable);
            }
        }

        let listed = match source.list().await {
            Ok(payload) => parse_list_payload(payload),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Listing {} failed: {}", url, e);
                self.last_error = Some(e.into());
                self.set_status("Error loading API data; switched to demo");
                return self.use_fallback(DemoReason::LoadFailed);
            }
        };

        match listed {
            Ok(expenses) => {
                self.expenses = expenses;
                self.forget_stale_editing();
                self.set_status("Loaded expenses (API)");
                Mode::Real
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "{}", e);
                self.last_error = Some(e);
                self.set_status("Unexpected payload; switched to demo");
                self.use_fallback(DemoReason::MalformedPayload)
            }
        }
    }

    // ---------- mutations ----------

    /// Add a record
    pub async fn create(&mut self, source: &dyn ExpenseSource, draft: ExpenseDraft) -> MutationReport {
        let action = Action::Create;
        if !self.is_real() {
            let id = self.insert_local(&draft);
            return MutationReport::new(action, Outcome::Local, Some(id));
        }

        self.announce_call(source, action, COLLECTION_PATH);
        match source.create(&draft).await {
            Ok(_) => {
                self.load(source).await;
                MutationReport::new(action, Outcome::Remote, None)
            }
            Err(error) => {
                self.fail_over(action, &error);
                let id = self.insert_local(&draft);
                MutationReport::new(action, Outcome::Fallback { error }, Some(id))
            }
        }
    }

    /// Replace the fields of an existing record
    pub async fn update(
        &mut self,
        source: &dyn ExpenseSource,
        id: &str,
        draft: ExpenseDraft,
    ) -> MutationReport {
        let action = Action::Update;
        let target = Some(id.to_string());
        if !self.contains(id) {
            return MutationReport::new(action, Outcome::NotFound, target);
        }

        if !self.is_real() {
            self.merge_local(id, &draft);
            return MutationReport::new(action, Outcome::Local, target);
        }

        self.announce_call(source, action, &expense_path(id));
        match source.update(id, &draft).await {
            Ok(_) => {
                self.load(source).await;
                MutationReport::new(action, Outcome::Remote, target)
            }
            Err(error) => {
                self.fail_over(action, &error);
                self.merge_local(id, &draft);
                MutationReport::new(action, Outcome::Fallback { error }, target)
            }
        }
    }

    /// Remove a record after confirmation
    pub async fn delete(
        &mut self,
        source: &dyn ExpenseSource,
        id: &str,
        confirmation: Confirmation,
    ) -> MutationReport {
        let action = Action::Delete;
        let target = Some(id.to_string());
        if confirmation == Confirmation::Declined {
            return MutationReport::new(action, Outcome::Cancelled, target);
        }
        if !self.contains(id) {
            return MutationReport::new(action, Outcome::NotFound, target);
        }

        if !self.is_real() {
            self.remove_local(id);
            return MutationReport::new(action, Outcome::Local, target);
        }

        self.announce_call(source, action, &expense_path(id));
        match source.delete(id).await {
            Ok(()) => {
                self.load(source).await;
                MutationReport::new(action, Outcome::Remote, target)
            }
            Err(error) => {
                self.fail_over(action, &error);
                self.remove_local(id);
                MutationReport::new(action, Outcome::Fallback { error }, target)
            }
        }
    }

    // ---------- editing target ----------

    /// Open the form for a new record
    pub fn open_add(&mut self) {
        self.editing = None;
    }

    /// Open the form on an existing record
    pub fn open_edit(&mut self, id: &str) -> CoreResult<&Expense> {
        if !self.contains(id) {
            return Err(CoreError::NotFound { id: id.to_string() });
        }
        self.editing = Some(id.to_string());
        self.get(id)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Save the form: update the record being edited, or create one
    pub async fn submit(&mut self, source: &dyn ExpenseSource, draft: ExpenseDraft) -> MutationReport {
        match self.editing.take() {
            Some(id) => self.update(source, &id, draft).await,
            None => self.create(source, draft).await,
        }
    }

    // ---------- internals ----------

    fn set_status(&mut self, status: &str) {
        log::info!(target: LOG_TARGET, "{}", status);
        self.status = status.to_string();
    }

    fn announce_call(&mut self, source: &dyn ExpenseSource, action: Action, path: &str) {
        let url = source.url_for(path);
        log::debug!(target: LOG_TARGET, "{} {}", action.method(), url);
        self.status = format!("Calling {} {}", action.method(), url);
    }

    fn fail_over(&mut self, action: Action, error: &SourceError) {
        log::warn!(target: LOG_TARGET, "{} failed: {}", action, error);
        self.last_error = Some(error.clone().into());
        self.enter_demo(DemoReason::MutationFailed);
        self.set_status(&format!("{} failed; switched to demo", action));
    }

    fn enter_demo(&mut self, reason: DemoReason) -> Mode {
        if let SessionPhase::Active(Mode::Demo(current)) = self.phase {
            return Mode::Demo(current);
        }
        let mode = Mode::Demo(reason);
        log::info!(target: LOG_TARGET, "Entering demo mode ({})", reason);
        self.phase = SessionPhase::Active(mode);
        mode
    }

    fn enter_real(&mut self) {
        if self.phase == SessionPhase::Probing {
            self.phase = SessionPhase::Active(Mode::Real);
        }
    }

    fn use_fallback(&mut self, reason: DemoReason) -> Mode {
        self.expenses = self.fallback.clone();
        self.forget_stale_editing();
        self.enter_demo(reason)
    }

    fn forget_stale_editing(&mut self) {
        if let Some(id) = self.editing.as_deref() {
            if !self.contains(id) {
                self.editing = None;
            }
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = expenseweb_utils::generate_id("demo");
            if !self.contains(&id) {
                return id;
            }
        }
    }

    fn insert_local(&mut self, draft: &ExpenseDraft) -> String {
        let id = self.fresh_id();
        self.expenses.insert(0, Expense::from_draft(id.clone(), draft));
        id
    }

    fn merge_local(&mut self, id: &str, draft: &ExpenseDraft) -> bool {
        match self.expenses.iter_mut().find(|e| e.expense_id == id) {
            Some(expense) => {
                expense.apply_draft(draft);
                true
            }
            None => false,
        }
    }

    fn remove_local(&mut self, id: &str) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.expense_id != id);
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        self.expenses.len() != before
    }
}
