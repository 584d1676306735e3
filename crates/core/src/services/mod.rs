//! Business logic services.

pub mod cursor_map;
pub mod form;
pub mod list;
pub mod list_state;
pub mod notifications;

#[cfg(test)]
pub(crate) mod testing;

pub use cursor_map::{CursorMap, CursorState};
pub use form::{DEFAULT_COUNTRY, FormController, PatientFormInput};
pub use list::{NavigationOutcome, PatientListService};
pub use list_state::{ListState, ListView, PAGE_SIZE_OPTIONS, total_pages};
pub use notifications::ChannelNotifier;
