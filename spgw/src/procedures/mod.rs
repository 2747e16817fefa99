mod handler_api;
mod procedure;
mod s8_procedures;
mod session_procedure;
mod spgw_procedures;

use crate::data::SessionSnapshot;

pub use handler_api::HandlerApi;
pub use procedure::Procedure;
pub use s8_procedures::{S8Message, S8MessageHandler};
pub use session_procedure::*;
pub use spgw_procedures::{SpgwMessage, SpgwMessageHandler};

/// What an actor holds, as reported to a status query.
#[derive(Debug, Clone)]
pub struct StateSummary {
    pub sessions: Vec<SessionSnapshot>,
    pub temporary_procedures: usize,
}
