//! s8 - records exchanged with the roaming proxy that fronts the home PGW

use super::*;
use crate::data::{Ebi, Imsi, Teid};

#[derive(Debug, Clone, PartialEq)]
pub struct S8CreateSessionRequest {
    // Temporary procedure id; echoed on the response.
    pub correlation_id: u32,
    pub imsi: Imsi,
    pub msisdn: Option<String>,
    pub mei: Option<String>,
    pub serving_network: ServingNetwork,
    pub apn: String,
    pub pdn_type: PdnType,
    pub paa: Option<Paa>,
    pub ambr: BitRate,
    pub charging_characteristics: Option<u16>,
    pub indication_flags: IndicationFlags,
    pub pco: Option<Pco>,
    pub bearer_context: S8BearerContextToBeCreated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8BearerContextToBeCreated {
    pub ebi: Ebi,
    pub sgw_s8_up_fteid: Fteid,
    pub qos: BearerQos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8CreateSessionResponse {
    pub correlation_id: u32,
    // The control plane TEID the proxy assigned to this session.
    pub context_teid: Teid,
    pub cause: Cause,
    pub pgw_s8_cp_fteid: Option<Fteid>,
    pub paa: Option<Paa>,
    pub pco: Option<Pco>,
    pub bearer_context: S8BearerContextCreated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8BearerContextCreated {
    pub ebi: Ebi,
    pub cause: Cause,
    pub pgw_s8_up_fteid: Option<Fteid>,
    // Absent when the PGW kept the requested QoS.
    pub qos: Option<BearerQos>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8DeleteSessionRequest {
    pub imsi: Imsi,
    pub context_teid: Teid,
    pub pgw_s8_cp_teid: Option<Teid>,
    pub lbi: Ebi,
    pub indication_flags: IndicationFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8DeleteSessionResponse {
    pub context_teid: Teid,
    pub cause: Cause,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8CreateBearerRequest {
    pub context_teid: Teid,
    pub lbi: Ebi,
    pub sequence_number: u32,
    // Opaque routing string; returned unchanged on the response.
    pub pgw_cp_address: String,
    pub bearer_context: S8BearerContextToBeActivated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8BearerContextToBeActivated {
    pub tft: TrafficFlowTemplate,
    pub qos: BearerQos,
    pub pgw_s8_up_fteid: Fteid,
    pub pco: Option<Pco>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8CreateBearerResponse {
    pub pgw_s8_cp_teid: Option<Teid>,
    pub sequence_number: u32,
    pub pgw_cp_address: String,
    // Absent when the session is unknown.
    pub imsi: Option<Imsi>,
    pub cause: Cause,
    pub bearer_context: Option<S8BearerContextActivated>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8BearerContextActivated {
    pub ebi: Ebi,
    pub cause: Cause,
    pub sgw_s8_up_fteid: Fteid,
    pub pgw_s8_up_fteid: Option<Fteid>,
    pub qos: BearerQos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8DeleteBearerRequest {
    pub context_teid: Teid,
    pub sequence_number: u32,
    pub pgw_cp_address: String,
    pub ebis: Vec<Ebi>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct S8DeleteBearerResponse {
    pub pgw_s8_cp_teid: Option<Teid>,
    pub sequence_number: u32,
    pub pgw_cp_address: String,
    // Absent when the session is unknown.
    pub imsi: Option<Imsi>,
    pub cause: Cause,
    pub bearer_contexts: Vec<BearerCause>,
}

/// Messages sent to the roaming proxy.
#[derive(Debug, Clone, PartialEq)]
pub enum S8Outbound {
    CreateSessionRequest(S8CreateSessionRequest),
    DeleteSessionRequest(S8DeleteSessionRequest),
    CreateBearerResponse(S8CreateBearerResponse),
    DeleteBearerResponse(S8DeleteBearerResponse),
}

impl S8Outbound {
    pub fn name(&self) -> &'static str {
        match self {
            S8Outbound::CreateSessionRequest(_) => "S8 CreateSessionRequest",
            S8Outbound::DeleteSessionRequest(_) => "S8 DeleteSessionRequest",
            S8Outbound::CreateBearerResponse(_) => "S8 CreateBearerResponse",
            S8Outbound::DeleteBearerResponse(_) => "S8 DeleteBearerResponse",
        }
    }
}

/// Messages received from the roaming proxy.
#[derive(Debug, Clone, PartialEq)]
pub enum S8Inbound {
    CreateSessionResponse(S8CreateSessionResponse),
    DeleteSessionResponse(S8DeleteSessionResponse),
    CreateBearerRequest(S8CreateBearerRequest),
    DeleteBearerRequest(S8DeleteBearerRequest),
}
