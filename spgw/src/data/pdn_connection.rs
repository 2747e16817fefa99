use super::{BearerContext, BearerMap, Ebi, PendingProcedureLedger, Teid};

pub const NO_APN: &str = "NO APN";

#[derive(Debug, Clone, PartialEq)]
pub struct PdnConnection {
    pub apn_in_use: String,
    pub default_bearer: Ebi,
    // PGW control plane TEID, learnt from the roaming proxy.
    pub pgw_s5s8_cp_teid: Option<Teid>,
    pub bearers: BearerMap,
    pub pending: PendingProcedureLedger,
}

impl PdnConnection {
    pub fn new(apn: &str, default_bearer: Ebi) -> Self {
        PdnConnection {
            apn_in_use: if apn.is_empty() {
                NO_APN.to_string()
            } else {
                apn.to_string()
            },
            default_bearer,
            pgw_s5s8_cp_teid: None,
            bearers: BearerMap::new(),
            pending: PendingProcedureLedger::new(),
        }
    }

    pub fn default_bearer(&self) -> Option<&BearerContext> {
        self.bearers.get(self.default_bearer)
    }

    pub fn default_bearer_mut(&mut self) -> Option<&mut BearerContext> {
        self.bearers.get_mut(self.default_bearer)
    }

    pub fn is_default(&self, ebi: Ebi) -> bool {
        self.default_bearer == ebi
    }
}
