mod data;
mod local;
mod messages;
mod procedures;
mod protocols;
mod spgw;

pub use data::{
    BearerSnapshot, Config, Ebi, Imsi, PendingProcedureSnapshot, SessionSnapshot, SessionState,
    Teid, load_config_file,
};
pub use local::{IpPool, LocalServices, MemoryStateStore};
pub use messages::*;
pub use procedures::HandlerApi;
pub use spgw::Spgw;
