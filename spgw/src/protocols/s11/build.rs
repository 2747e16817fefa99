//! build - construction of S11 messages sent to the MME
use crate::data::{BearerContext, Ebi, SessionContext, Teid};
use crate::messages::*;
use anyhow::{Result, anyhow};
use std::net::IpAddr;

pub fn create_session_response_accept(
    context: &SessionContext,
    s11_ip: IpAddr,
    ambr: BitRate,
    pco: Option<Pco>,
) -> Result<CreateSessionResponse> {
    let default_bearer = context
        .pdn
        .default_bearer()
        .ok_or_else(|| anyhow!("No default bearer {}", context.pdn.default_bearer))?;
    let paa = default_bearer
        .paa
        .clone()
        .ok_or_else(|| anyhow!("Default bearer has no address"))?;
    Ok(CreateSessionResponse {
        teid: context.mme_s11_teid,
        cause: Cause::RequestAccepted,
        s11_sgw_fteid: Some(context.sgw_s11_fteid(s11_ip)),
        paa: Some(paa),
        ambr: Some(ambr),
        pco,
        bearer_contexts_created: vec![BearerContextCreated {
            ebi: default_bearer.ebi,
            cause: Cause::RequestAccepted,
            s1u_sgw_fteid: default_bearer.sgw_s1u_fteid(),
            bearer_level_qos: Some(default_bearer.qos.clone()),
        }],
        bearer_contexts_marked_for_removal: vec![],
        trxn: context.trxn,
        peer_ip: context.mme_ip,
    })
}

/// A failed Create Session Response, listing the default bearer (if known) as
/// marked for removal.
pub fn create_session_response_failure(
    mme_teid: Teid,
    cause: Cause,
    default_ebi: Option<Ebi>,
    trxn: u64,
    peer_ip: Option<IpAddr>,
) -> CreateSessionResponse {
    CreateSessionResponse {
        teid: mme_teid,
        cause,
        s11_sgw_fteid: None,
        paa: None,
        ambr: None,
        pco: None,
        bearer_contexts_created: vec![],
        bearer_contexts_marked_for_removal: default_ebi
            .map(|ebi| vec![BearerCause::new(ebi, cause)])
            .unwrap_or_default(),
        trxn,
        peer_ip,
    }
}

pub fn create_session_response_failure_for(
    context: &SessionContext,
    cause: Cause,
) -> CreateSessionResponse {
    create_session_response_failure(
        context.mme_s11_teid,
        cause,
        Some(context.pdn.default_bearer),
        context.trxn,
        context.mme_ip,
    )
}

/// Answer a Modify Bearer Request whose session is unknown.
pub fn modify_bearer_response_context_not_found(r: &ModifyBearerRequest) -> ModifyBearerResponse {
    ModifyBearerResponse {
        teid: r.mme_teid,
        cause: Cause::ContextNotFound,
        bearer_contexts_modified: vec![],
        bearer_contexts_marked_for_removal: r
            .bearer_contexts_to_be_modified
            .iter()
            .map(|b| b.ebi)
            .chain(r.bearer_contexts_to_be_removed.iter().copied())
            .map(|ebi| BearerCause::new(ebi, Cause::ContextNotFound))
            .collect(),
        bearer_contexts_not_found: vec![],
        trxn: r.trxn,
    }
}

pub fn delete_session_response(
    teid: Teid,
    cause: Cause,
    lbi: Ebi,
    trxn: u64,
    peer_ip: Option<IpAddr>,
) -> DeleteSessionResponse {
    DeleteSessionResponse {
        teid,
        cause,
        lbi,
        trxn,
        peer_ip,
    }
}

pub fn release_access_bearers_response(
    teid: Teid,
    cause: Cause,
    trxn: u64,
) -> ReleaseAccessBearersResponse {
    ReleaseAccessBearersResponse { teid, cause, trxn }
}

pub fn suspend_acknowledge(teid: Teid, cause: Cause, trxn: u64) -> SuspendAcknowledge {
    SuspendAcknowledge { teid, cause, trxn }
}

pub fn delete_bearer_failure_indication(
    r: &DeleteBearerCommand,
    cause: Cause,
) -> DeleteBearerFailureIndication {
    DeleteBearerFailureIndication {
        teid: r.mme_teid,
        cause,
        bearer_contexts: r
            .ebis
            .iter()
            .map(|ebi| BearerCause::new(*ebi, cause))
            .collect(),
        trxn: r.trxn,
    }
}

/// Ask the MME to set up a provisional dedicated bearer.
pub fn create_bearer_request(
    context: &SessionContext,
    bearer: &BearerContext,
    ul_tft: TrafficFlowTemplate,
    pco: Option<Pco>,
) -> CreateBearerRequest {
    CreateBearerRequest {
        teid: context.mme_s11_teid,
        sgw_s11_teid: context.sgw_s11_teid,
        lbi: context.pdn.default_bearer,
        sequence_number: bearer.sgw_sequence_number,
        s1u_sgw_fteid: bearer.sgw_s1u_fteid(),
        tft: ul_tft,
        bearer_level_qos: bearer.qos.clone(),
        pco,
    }
}

pub fn delete_bearer_request(
    context: &SessionContext,
    ebis: Vec<Ebi>,
    delete_default_bearer: bool,
) -> DeleteBearerRequest {
    let default_ebi = context.pdn.default_bearer;
    if delete_default_bearer {
        DeleteBearerRequest {
            teid: context.mme_s11_teid,
            sgw_s11_teid: context.sgw_s11_teid,
            lbi: Some(default_ebi),
            ebis: vec![],
            delete_default_bearer,
        }
    } else {
        DeleteBearerRequest {
            teid: context.mme_s11_teid,
            sgw_s11_teid: context.sgw_s11_teid,
            lbi: None,
            ebis,
            delete_default_bearer,
        }
    }
}
