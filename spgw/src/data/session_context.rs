use super::{Imsi, PdnConnection, Teid};
use crate::messages::{CreateSessionRequest, Fteid, InterfaceType};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Requested,
    IpPending,
    PolicyPending,
    Established,
    Deleting,
}

/// One PDN connection of a subscriber, as seen from the S11 side.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub sgw_s11_teid: Teid,
    pub imsi: Imsi,
    pub mme_s11_teid: Teid,
    pub mme_ip: Option<IpAddr>,
    pub trxn: u64,
    pub state: SessionState,
    pub ue_suspended_for_ps_handover: bool,
    pub create_session_request: Option<CreateSessionRequest>,
    pub pdn: PdnConnection,
}

impl SessionContext {
    pub fn new(sgw_s11_teid: Teid, request: &CreateSessionRequest, pdn: PdnConnection) -> Self {
        SessionContext {
            sgw_s11_teid,
            imsi: request.imsi,
            mme_s11_teid: request.sender_fteid_for_cp.teid,
            mme_ip: Some(request.peer_ip),
            trxn: request.trxn,
            state: SessionState::Requested,
            ue_suspended_for_ps_handover: false,
            create_session_request: Some(request.clone()),
            pdn,
        }
    }

    pub fn sgw_s11_fteid(&self, ip: IpAddr) -> Fteid {
        Fteid::new(InterfaceType::S11S4SgwGtpC, self.sgw_s11_teid, ip)
    }

    /// Key under which the session is persisted.
    pub fn snapshot_key(&self) -> String {
        format!("{}:{}", self.imsi, self.sgw_s11_teid)
    }
}
