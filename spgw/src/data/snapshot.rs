//! snapshot - serializable form of a session, used for write-through persistence

use super::*;
use crate::messages::{BearerQos, CreateSessionRequest, Fteid, Paa, TrafficFlowTemplate};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub sgw_s11_teid: Teid,
    pub imsi: Imsi,
    pub mme_s11_teid: Teid,
    pub mme_ip: Option<IpAddr>,
    pub trxn: u64,
    pub state: SessionState,
    pub ue_suspended_for_ps_handover: bool,
    pub create_session_request: Option<CreateSessionRequest>,
    pub apn_in_use: String,
    pub default_bearer: Ebi,
    pub pgw_s5s8_cp_teid: Option<Teid>,
    pub bearers: Vec<BearerSnapshot>,
    pub pending: Vec<PendingProcedureSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearerSnapshot {
    pub ebi: Ebi,
    pub sgw_s1u_teid: Teid,
    pub sgw_s1u_ip: IpAddr,
    pub enb: Option<Fteid>,
    pub sgw_s5s8_up: Option<Fteid>,
    pub pgw_s5s8_up: Option<Fteid>,
    pub qos: BearerQos,
    pub tft: TrafficFlowTemplate,
    pub paa: Option<Paa>,
    pub policy_rule_name: Option<String>,
    pub sgw_sequence_number: u32,
    pub pgw_cp_address: Option<String>,
    pub sdf_ids: Vec<u32>,
}

/// Provisional bearers of a network initiated create bearer procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingProcedureSnapshot {
    pub bearers: Vec<BearerSnapshot>,
}

impl From<&BearerContext> for BearerSnapshot {
    fn from(b: &BearerContext) -> Self {
        BearerSnapshot {
            ebi: b.ebi,
            sgw_s1u_teid: b.sgw_s1u_teid,
            sgw_s1u_ip: b.sgw_s1u_ip,
            enb: b.enb.clone(),
            sgw_s5s8_up: b.sgw_s5s8_up.clone(),
            pgw_s5s8_up: b.pgw_s5s8_up.clone(),
            qos: b.qos.clone(),
            tft: b.tft.clone(),
            paa: b.paa.clone(),
            policy_rule_name: b.policy_rule_name.clone(),
            sgw_sequence_number: b.sgw_sequence_number,
            pgw_cp_address: b.pgw_cp_address.clone(),
            sdf_ids: b.sdf_ids.clone(),
        }
    }
}

impl From<BearerSnapshot> for BearerContext {
    fn from(b: BearerSnapshot) -> Self {
        BearerContext {
            ebi: b.ebi,
            sgw_s1u_teid: b.sgw_s1u_teid,
            sgw_s1u_ip: b.sgw_s1u_ip,
            enb: b.enb,
            sgw_s5s8_up: b.sgw_s5s8_up,
            pgw_s5s8_up: b.pgw_s5s8_up,
            qos: b.qos,
            tft: b.tft,
            paa: b.paa,
            policy_rule_name: b.policy_rule_name,
            sgw_sequence_number: b.sgw_sequence_number,
            pgw_cp_address: b.pgw_cp_address,
            sdf_ids: b.sdf_ids,
        }
    }
}

impl From<&SessionContext> for SessionSnapshot {
    fn from(c: &SessionContext) -> Self {
        SessionSnapshot {
            sgw_s11_teid: c.sgw_s11_teid,
            imsi: c.imsi,
            mme_s11_teid: c.mme_s11_teid,
            mme_ip: c.mme_ip,
            trxn: c.trxn,
            state: c.state,
            ue_suspended_for_ps_handover: c.ue_suspended_for_ps_handover,
            create_session_request: c.create_session_request.clone(),
            apn_in_use: c.pdn.apn_in_use.clone(),
            default_bearer: c.pdn.default_bearer,
            pgw_s5s8_cp_teid: c.pdn.pgw_s5s8_cp_teid,
            bearers: c.pdn.bearers.iter().map(BearerSnapshot::from).collect(),
            pending: c
                .pdn
                .pending
                .procedures()
                .iter()
                .map(|p| PendingProcedureSnapshot {
                    bearers: p.bearers.iter().map(BearerSnapshot::from).collect(),
                })
                .collect(),
        }
    }
}

impl SessionSnapshot {
    /// Rebuild the live context.  Fails if the snapshot breaks a store invariant.
    pub fn into_context(self) -> Result<SessionContext> {
        let mut bearers = BearerMap::new();
        for b in self.bearers {
            bearers.insert(b.into())?;
        }
        let mut pending = PendingProcedureLedger::new();
        for b in self.pending.into_iter().flat_map(|p| p.bearers.into_iter()) {
            pending.push_create_bearer(b.into())?;
        }
        Ok(SessionContext {
            sgw_s11_teid: self.sgw_s11_teid,
            imsi: self.imsi,
            mme_s11_teid: self.mme_s11_teid,
            mme_ip: self.mme_ip,
            trxn: self.trxn,
            state: self.state,
            ue_suspended_for_ps_handover: self.ue_suspended_for_ps_handover,
            create_session_request: self.create_session_request,
            pdn: PdnConnection {
                apn_in_use: self.apn_in_use,
                default_bearer: self.default_bearer,
                pgw_s5s8_cp_teid: self.pgw_s5s8_cp_teid,
                bearers,
                pending,
            },
        })
    }
}
