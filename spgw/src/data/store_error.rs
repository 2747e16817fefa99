use super::{Ebi, Teid};
use thiserror::Error;

/// Contract violations of the context store, bearer map and pending procedure ledger.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("TEID {0:#010x} already in use")]
    DuplicateTeid(Teid),

    #[error("EBI {0} already in use")]
    DuplicateEbi(Ebi),

    #[error("EBI {0} out of range")]
    InvalidEbi(Ebi),

    #[error("No context for TEID {0:#010x}")]
    ContextNotFound(Teid),
}
