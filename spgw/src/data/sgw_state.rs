use super::{ContextStore, ProxyTransactions, Teid, TeidAllocator, TemporaryProcedureMap};
use std::ops::RangeInclusive;

/// Everything an actor owns.
#[derive(Debug)]
pub struct SgwState {
    pub store: ContextStore,
    pub teids: TeidAllocator,
    // These two are only used by the roaming actor.
    pub temporary: TemporaryProcedureMap,
    pub proxy_transactions: ProxyTransactions,
    sequence_number: u32,
}

impl SgwState {
    pub fn new(user_plane_teids: RangeInclusive<Teid>) -> Self {
        SgwState {
            store: ContextStore::new(),
            teids: TeidAllocator::new(user_plane_teids),
            temporary: TemporaryProcedureMap::new(),
            proxy_transactions: ProxyTransactions::new(),
            sequence_number: 0,
        }
    }

    pub fn new_control_plane_teid(&self) -> Teid {
        self.teids
            .new_control_plane_teid(|teid| self.store.contains(teid))
    }

    pub fn new_user_plane_teid(&mut self) -> Teid {
        self.teids.new_user_plane_teid()
    }

    /// GTPv2 sequence numbers are 24 bits.
    pub fn next_sequence_number(&mut self) -> u32 {
        self.sequence_number = (self.sequence_number + 1) & 0x00FF_FFFF;
        self.sequence_number
    }
}
