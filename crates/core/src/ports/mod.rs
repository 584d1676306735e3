mod gateway;
mod notifier;
mod pagination;
mod repository;

pub use gateway::*;
pub use notifier::*;
pub use pagination::*;
pub use repository::*;
