//! Insight core: pure per-category job-state machine and view-model helpers.
mod category;
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use category::{Category, UnknownCategory};
pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, BackendStatus, JobId, JobOutcome, JobPhase};
pub use update::update;
pub use view_model::{AppViewModel, CategoryRowView};
