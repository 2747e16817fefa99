//! s11 - pre-decoded GTPv2-C records exchanged with the MME

use super::*;
use crate::data::{Ebi, Imsi, Teid};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    // Zero for the first session of a UE.
    pub teid: Teid,
    pub imsi: Imsi,
    pub msisdn: Option<String>,
    pub mei: Option<String>,
    pub serving_network: ServingNetwork,
    pub rat_type: RatType,
    pub sender_fteid_for_cp: Fteid,
    pub apn: String,
    pub pdn_type: PdnType,
    pub paa: Option<Paa>,
    pub ambr: BitRate,
    pub pco: Option<Pco>,
    pub charging_characteristics: Option<u16>,
    pub bearer_contexts_to_be_created: Vec<BearerContextToBeCreated>,
    pub trxn: u64,
    pub peer_ip: IpAddr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearerContextToBeCreated {
    pub ebi: Ebi,
    pub bearer_level_qos: BearerQos,
    pub tft: Option<TrafficFlowTemplate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSessionResponse {
    pub teid: Teid,
    pub cause: Cause,
    pub s11_sgw_fteid: Option<Fteid>,
    pub paa: Option<Paa>,
    pub ambr: Option<BitRate>,
    pub pco: Option<Pco>,
    pub bearer_contexts_created: Vec<BearerContextCreated>,
    pub bearer_contexts_marked_for_removal: Vec<BearerCause>,
    pub trxn: u64,
    pub peer_ip: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BearerContextCreated {
    pub ebi: Ebi,
    pub cause: Cause,
    pub s1u_sgw_fteid: Fteid,
    pub bearer_level_qos: Option<BearerQos>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifyBearerRequest {
    pub teid: Teid,
    // The MME's own S11 TEID, used to address a failure response.
    pub mme_teid: Teid,
    pub trxn: u64,
    pub bearer_contexts_to_be_modified: Vec<BearerContextToBeModified>,
    pub bearer_contexts_to_be_removed: Vec<Ebi>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BearerContextToBeModified {
    pub ebi: Ebi,
    pub s1u_enb_fteid: Fteid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifyBearerResponse {
    pub teid: Teid,
    pub cause: Cause,
    pub bearer_contexts_modified: Vec<BearerContextModified>,
    pub bearer_contexts_marked_for_removal: Vec<BearerCause>,
    pub bearer_contexts_not_found: Vec<BearerCause>,
    pub trxn: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BearerContextModified {
    pub ebi: Ebi,
    pub cause: Cause,
    pub s1u_sgw_fteid: Fteid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSessionRequest {
    pub teid: Teid,
    pub lbi: Ebi,
    pub sender_fteid_for_cp: Option<Fteid>,
    pub indication_flags: IndicationFlags,
    pub trxn: u64,
    pub peer_ip: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSessionResponse {
    pub teid: Teid,
    pub cause: Cause,
    pub lbi: Ebi,
    pub trxn: u64,
    pub peer_ip: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseAccessBearersRequest {
    pub teid: Teid,
    pub imsi: Imsi,
    pub mme_teid: Teid,
    pub trxn: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseAccessBearersResponse {
    pub teid: Teid,
    pub cause: Cause,
    pub trxn: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuspendNotification {
    pub teid: Teid,
    pub lbi: Ebi,
    pub trxn: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuspendAcknowledge {
    pub teid: Teid,
    pub cause: Cause,
    pub trxn: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteBearerCommand {
    pub teid: Teid,
    pub mme_teid: Teid,
    pub ebis: Vec<Ebi>,
    pub trxn: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteBearerFailureIndication {
    pub teid: Teid,
    pub cause: Cause,
    pub bearer_contexts: Vec<BearerCause>,
    pub trxn: u64,
}

/// Network initiated dedicated bearer activation, sent to the MME.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBearerRequest {
    pub teid: Teid,
    pub sgw_s11_teid: Teid,
    pub lbi: Ebi,
    pub sequence_number: u32,
    pub s1u_sgw_fteid: Fteid,
    pub tft: TrafficFlowTemplate,
    pub bearer_level_qos: BearerQos,
    pub pco: Option<Pco>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateBearerResponse {
    pub teid: Teid,
    pub imsi: Imsi,
    pub cause: Cause,
    pub bearer_contexts: Vec<BearerContextActivated>,
    pub trxn: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BearerContextActivated {
    // Zero when the UE rejected the bearer.
    pub ebi: Ebi,
    pub cause: Cause,
    pub s1u_enb_fteid: Option<Fteid>,
    // Echoes the provisional TEID from the request; the correlation key.
    pub s1u_sgw_fteid: Fteid,
}

/// Network initiated bearer deactivation, sent to the MME.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteBearerRequest {
    pub teid: Teid,
    pub sgw_s11_teid: Teid,
    pub lbi: Option<Ebi>,
    pub ebis: Vec<Ebi>,
    pub delete_default_bearer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteBearerResponse {
    pub teid: Teid,
    pub imsi: Imsi,
    pub cause: Cause,
    pub lbi: Option<Ebi>,
    pub delete_default_bearer: bool,
    pub bearer_contexts: Vec<BearerCause>,
    pub mme_initiated_local_deact: bool,
}

/// Messages received from the MME.
#[derive(Debug, Clone, PartialEq)]
pub enum S11Inbound {
    CreateSessionRequest(CreateSessionRequest),
    ModifyBearerRequest(ModifyBearerRequest),
    DeleteSessionRequest(DeleteSessionRequest),
    ReleaseAccessBearersRequest(ReleaseAccessBearersRequest),
    SuspendNotification(SuspendNotification),
    DeleteBearerCommand(DeleteBearerCommand),
    CreateBearerResponse(CreateBearerResponse),
    DeleteBearerResponse(DeleteBearerResponse),
}

/// Messages sent to the MME.
#[derive(Debug, Clone, PartialEq)]
pub enum S11Outbound {
    CreateSessionResponse(CreateSessionResponse),
    ModifyBearerResponse(ModifyBearerResponse),
    DeleteSessionResponse(DeleteSessionResponse),
    ReleaseAccessBearersResponse(ReleaseAccessBearersResponse),
    SuspendAcknowledge(SuspendAcknowledge),
    DeleteBearerFailureIndication(DeleteBearerFailureIndication),
    CreateBearerRequest(CreateBearerRequest),
    DeleteBearerRequest(DeleteBearerRequest),
}

impl S11Outbound {
    pub fn name(&self) -> &'static str {
        match self {
            S11Outbound::CreateSessionResponse(_) => "CreateSessionResponse",
            S11Outbound::ModifyBearerResponse(_) => "ModifyBearerResponse",
            S11Outbound::DeleteSessionResponse(_) => "DeleteSessionResponse",
            S11Outbound::ReleaseAccessBearersResponse(_) => "ReleaseAccessBearersResponse",
            S11Outbound::SuspendAcknowledge(_) => "SuspendAcknowledge",
            S11Outbound::DeleteBearerFailureIndication(_) => "DeleteBearerFailureIndication",
            S11Outbound::CreateBearerRequest(_) => "CreateBearerRequest",
            S11Outbound::DeleteBearerRequest(_) => "DeleteBearerRequest",
        }
    }
}
