//! Core expense client logic
//!
//! Holds the client session (collection, mode, editing target) and the
//! operations the UI drives: load with mode resolution, create, update,
//! delete and filtering. Network access and rendering sit behind the
//! `ExpenseSource` and `ExpenseRenderer` traits.

pub mod error;
pub mod fake;
pub mod filter;
pub mod models;
pub mod session;
pub mod source;
pub mod time;
pub mod view;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, SourceError};
pub use filter::ExpenseFilter;
pub use models::{parse_list_payload, Expense, ExpenseDraft, ExpenseForm};
pub use session::{
    Action, Confirmation, DemoReason, Mode, MutationReport, Outcome, Session, SessionPhase,
    SessionSnapshot,
};
pub use source::{expense_path, ExpenseSource, SourceRef, COLLECTION_PATH};
pub use view::ExpenseRenderer;
