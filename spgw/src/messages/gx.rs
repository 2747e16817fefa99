//! gx - records exchanged with the policy and charging enforcement function

use super::*;
use crate::data::{Ebi, Imsi, Teid};
use serde::{Deserialize, Serialize};

/// Network initiated dedicated bearer activation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivateBearerRequest {
    pub imsi: Imsi,
    pub lbi: Ebi,
    pub policy_rule_name: String,
    pub ul_tft: TrafficFlowTemplate,
    pub dl_tft: TrafficFlowTemplate,
    pub qos: BearerQos,
}

/// Network initiated bearer deactivation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeactivateBearerRequest {
    pub imsi: Imsi,
    pub lbi: Ebi,
    pub ebis: Vec<Ebi>,
}

/// Requests received from the policy function.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyMessage {
    ActivateBearerRequest(ActivateBearerRequest),
    DeactivateBearerRequest(DeactivateBearerRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcefSessionParams {
    pub imsi: Imsi,
    pub msisdn: Option<String>,
    pub mei: Option<String>,
    pub serving_network: ServingNetwork,
    pub apn: String,
    pub pdn_type: PdnType,
    pub ue_address: UeAddress,
    pub apn_ambr: BitRate,
    pub default_bearer_qos: BearerQos,
    pub charging_characteristics: Option<u16>,
    pub rat_type: RatType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcStatus {
    Ok,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgiStatus {
    Ok,
    ContextNotFound,
    AllDynamicAddressesOccupied,
    ServiceNotSupported,
    FailedToProcessPco,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcefCreateSessionResult {
    pub rpc_status: RpcStatus,
    pub sgi_status: SgiStatus,
}

impl PcefCreateSessionResult {
    pub fn accepted() -> Self {
        PcefCreateSessionResult {
            rpc_status: RpcStatus::Ok,
            sgi_status: SgiStatus::Ok,
        }
    }

    /// The cause to answer the MME with.
    pub fn cause(&self) -> Cause {
        if self.rpc_status == RpcStatus::Failed {
            return Cause::ServiceDenied;
        }
        match self.sgi_status {
            SgiStatus::Ok => Cause::RequestAccepted,
            SgiStatus::ContextNotFound => Cause::ContextNotFound,
            SgiStatus::AllDynamicAddressesOccupied => Cause::AllDynamicAddressesAreOccupied,
            SgiStatus::ServiceNotSupported => Cause::ServiceNotSupported,
            SgiStatus::FailedToProcessPco | SgiStatus::Failed => Cause::RequestRejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingOutcome {
    Bound {
        ebi: Ebi,
        sgw_teid: Teid,
        enb_teid: Teid,
    },
    Rejected(Cause),
}

/// Outcome of a dedicated bearer activation, reported to the policy function.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyBinding {
    pub imsi: Imsi,
    pub default_ebi: Ebi,
    pub policy_rule_name: Option<String>,
    pub outcome: BindingOutcome,
}

/// Outcome of a bearer deactivation, reported to the policy function.
#[derive(Debug, Clone, PartialEq)]
pub struct BearerDeactivationReport {
    pub imsi: Imsi,
    pub lbi: Ebi,
    pub ebis: Vec<Ebi>,
    pub cause: Cause,
}
