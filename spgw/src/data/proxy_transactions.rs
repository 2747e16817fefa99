use super::{Ebi, Imsi, Teid};
use std::collections::HashMap;

/// What the roaming proxy needs echoed on the answer to one of its bearer
/// requests.  Kept apart from the bearers so that the answer can still be sent
/// after the bearer or its session has gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTransaction {
    pub imsi: Imsi,
    pub pgw_s8_cp_teid: Option<Teid>,
    pub sequence_number: u32,
    pub pgw_cp_address: String,
    // Named by the proxy but not found here.
    pub rejected: Vec<Ebi>,
}

/// Outstanding proxy bearer procedures.  Create Bearer is keyed by the
/// provisional SGW S1-U TEID, Delete Bearer by the session's S11 TEID.
#[derive(Debug, Default)]
pub struct ProxyTransactions {
    create_bearer: HashMap<Teid, ProxyTransaction>,
    delete_bearer: HashMap<Teid, ProxyTransaction>,
}

impl ProxyTransactions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn park_create_bearer(&mut self, sgw_s1u_teid: Teid, transaction: ProxyTransaction) {
        self.create_bearer.insert(sgw_s1u_teid, transaction);
    }

    pub fn take_create_bearer(&mut self, sgw_s1u_teid: Teid) -> Option<ProxyTransaction> {
        self.create_bearer.remove(&sgw_s1u_teid)
    }

    /// Returns the transaction this one displaced, if any.
    pub fn park_delete_bearer(
        &mut self,
        sgw_s11_teid: Teid,
        transaction: ProxyTransaction,
    ) -> Option<ProxyTransaction> {
        self.delete_bearer.insert(sgw_s11_teid, transaction)
    }

    pub fn take_delete_bearer(&mut self, sgw_s11_teid: Teid) -> Option<ProxyTransaction> {
        self.delete_bearer.remove(&sgw_s11_teid)
    }

    /// Any Delete Bearer transaction of the subscriber.  Used when the MME
    /// answers on a TEID that no longer identifies a session.
    pub fn take_any_delete_bearer(&mut self, imsi: &Imsi) -> Option<ProxyTransaction> {
        let teid = self
            .delete_bearer
            .iter()
            .find(|(_, t)| &t.imsi == imsi)
            .map(|(teid, _)| *teid)?;
        self.delete_bearer.remove(&teid)
    }

    pub fn len(&self) -> usize {
        self.create_bearer.len() + self.delete_bearer.len()
    }
}
