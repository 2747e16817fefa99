mod bearer_context;
mod bearer_map;
mod config;
mod context_store;
mod identifiers;
mod pdn_connection;
mod pending_procedures;
mod proxy_transactions;
mod session_context;
mod sgw_state;
mod snapshot;
mod store_error;
mod teid_allocator;
mod temporary_procedures;

pub use bearer_context::*;
pub use bearer_map::*;
pub use config::*;
pub use context_store::*;
pub use identifiers::*;
pub use pdn_connection::*;
pub use pending_procedures::*;
pub use proxy_transactions::*;
pub use session_context::*;
pub use sgw_state::*;
pub use snapshot::*;
pub use store_error::*;
pub use teid_allocator::*;
pub use temporary_procedures::*;
