//! create_session - MME asks for a PDN connection with its default bearer

use super::SpgwMessage;
use crate::HandlerApi;
use crate::data::*;
use crate::messages::*;
use crate::procedures::SessionProcedure;
use crate::protocols::{pco::process_pco_request, s11::build};
use anyhow::{Result, anyhow, bail};
use async_channel::Sender;
use derive_deref::{Deref, DerefMut};
use slog::{Logger, debug, info, warn};

#[derive(Deref, DerefMut)]
pub struct CreateSessionProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> CreateSessionProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        CreateSessionProcedure(inner)
    }

    pub async fn run(&mut self, r: CreateSessionRequest, sender: &Sender<SpgwMessage>) -> Result<()> {
        self.log_message(">> CreateSessionRequest");
        if let Err(cause) = self.check_request(&r) {
            self.send_s11(create_session_rejection(&r, cause)).await;
            bail!("Create Session Request rejected with cause {cause:?}");
        }

        let teid = match self.create_context(&r) {
            Ok(teid) => teid,
            Err(e) => {
                self.send_s11(create_session_rejection(&r, Cause::SystemFailure))
                    .await;
                return Err(e);
            }
        };
        info!(
            self.logger,
            "Created session {teid:#010x} for IMSI {} APN {}", r.imsi, r.apn
        );
        self.write_snapshot(teid).await;

        // Address allocation completes asynchronously and re-enters as a message.
        let request = IpAllocationRequest {
            imsi: r.imsi,
            apn: r.apn.clone(),
            pdn_type: r.pdn_type,
            requested: r.paa.clone(),
        };
        let api = self.api.clone();
        let sender = sender.clone();
        let logger = self.logger.clone();
        async_std::task::spawn(async move {
            let result = api.allocate_ue_address(request.clone(), &logger).await;
            let _ = sender
                .send(SpgwMessage::IpAllocationComplete {
                    teid,
                    request,
                    result,
                })
                .await;
        });
        Ok(())
    }

    fn check_request(&self, r: &CreateSessionRequest) -> Result<(), Cause> {
        check_create_session(r, self.config().relaxed_rat_check, self.logger)?;
        if r.pdn_type.has_ipv6() && !self.config().ipv6_enabled {
            warn!(self.logger, "PDN type {:?} not served", r.pdn_type);
            return Err(Cause::ServiceNotSupported);
        }
        Ok(())
    }

    fn create_context(&mut self, r: &CreateSessionRequest) -> Result<Teid> {
        let requested = r
            .bearer_contexts_to_be_created
            .first()
            .ok_or_else(|| anyhow!("No default bearer"))?;
        let s1u_ip = self.config().s1u_ip;
        let teid = self.state.new_control_plane_teid();
        let s1u_teid = self.state.new_user_plane_teid();

        let mut bearer = BearerContext::new(
            requested.ebi,
            s1u_teid,
            s1u_ip,
            requested.bearer_level_qos.clone(),
        );
        bearer.tft = requested.tft.clone().unwrap_or_default();
        let mut pdn = PdnConnection::new(&r.apn, requested.ebi);
        pdn.bearers.insert(bearer)?;

        let mut context = SessionContext::new(teid, r, pdn);
        context.state = SessionState::IpPending;
        self.state.store.create(context)?;
        Ok(teid)
    }

    pub async fn ip_allocation_complete(
        &mut self,
        teid: Teid,
        request: IpAllocationRequest,
        result: IpAllocationResult,
        sender: &Sender<SpgwMessage>,
    ) -> Result<()> {
        let logger = self.logger;
        let config = self.config();
        let Some(context) = self.state.store.get_mut(teid) else {
            info!(logger, "IP allocation complete for unknown session {teid:#010x}");
            if let IpAllocationResult::Allocated(paa) = result {
                self.release_address(&request.imsi, &request.apn, &paa).await;
            }
            return Ok(());
        };

        let paa = match result {
            IpAllocationResult::Allocated(paa) => paa,
            IpAllocationResult::Failed(failure) => {
                let response = build::create_session_response_failure_for(context, failure.cause());
                let held = context.pdn.default_bearer().and_then(|b| b.paa.clone());
                if let Some(paa) = held {
                    self.release_address(&request.imsi, &request.apn, &paa).await;
                }
                self.remove_session(teid).await;
                self.send_s11(S11Outbound::CreateSessionResponse(response))
                    .await;
                bail!("IP allocation failed - {failure:?}");
            }
        };

        debug!(logger, "Allocated {:?}", paa);
        let Some(default_bearer) = context.pdn.default_bearer_mut() else {
            let response = build::create_session_response_failure_for(context, Cause::SystemFailure);
            self.release_address(&request.imsi, &request.apn, &paa).await;
            self.remove_session(teid).await;
            self.send_s11(S11Outbound::CreateSessionResponse(response))
                .await;
            bail!("Session {teid:#010x} lost its default bearer");
        };
        default_bearer.paa = Some(paa.clone());
        let qos = default_bearer.qos.clone();
        context.state = SessionState::PolicyPending;
        let saved = context
            .create_session_request
            .as_ref()
            .ok_or_else(|| anyhow!("Create Session Request not saved"))?;
        let params = PcefSessionParams {
            imsi: saved.imsi,
            msisdn: saved.msisdn.clone(),
            mei: saved.mei.clone(),
            serving_network: saved.serving_network.clone(),
            apn: saved.apn.clone(),
            pdn_type: saved.pdn_type,
            ue_address: paa.ue_address(),
            apn_ambr: BitRate {
                uplink: config.apn_ambr_ul,
                downlink: config.apn_ambr_dl,
            },
            default_bearer_qos: qos,
            charging_characteristics: saved.charging_characteristics,
            rat_type: saved.rat_type,
        };
        self.write_snapshot(teid).await;

        let api = self.api.clone();
        let sender = sender.clone();
        let logger = logger.clone();
        async_std::task::spawn(async move {
            let result = api.pcef_create_session(params, &logger).await;
            let _ = sender
                .send(SpgwMessage::PcefCreateSessionComplete {
                    teid,
                    request,
                    paa,
                    result,
                })
                .await;
        });
        Ok(())
    }

    pub async fn pcef_create_session_complete(
        &mut self,
        teid: Teid,
        request: IpAllocationRequest,
        paa: Paa,
        result: PcefCreateSessionResult,
    ) -> Result<()> {
        let logger = self.logger;
        let config = self.config();
        let Some(context) = self.state.store.get_mut(teid) else {
            info!(logger, "PCEF response for unknown session {teid:#010x}");
            self.release_address(&request.imsi, &request.apn, &paa).await;
            return Ok(());
        };

        let mut cause = result.cause();
        let mut pco = None;
        if cause.is_accepted() {
            let pco_request = context
                .create_session_request
                .as_ref()
                .and_then(|r| r.pco.clone())
                .unwrap_or_default();
            match process_pco_request(&pco_request, config) {
                Ok(response) if response.options.is_empty() => {}
                Ok(response) => pco = Some(response),
                Err(e) => {
                    warn!(logger, "Failed to process PCO - {e}");
                    cause = Cause::RequestRejected;
                }
            }
        }

        let accept = if cause.is_accepted() {
            context.state = SessionState::Established;
            let ambr = BitRate {
                uplink: config.apn_ambr_ul,
                downlink: config.apn_ambr_dl,
            };
            build::create_session_response_accept(context, config.s11_ip, ambr, pco)
                .inspect_err(|e| warn!(logger, "Failed to build response - {e}"))
                .ok()
        } else {
            None
        };

        match accept {
            Some(response) => {
                self.write_snapshot(teid).await;
                self.send_s11(S11Outbound::CreateSessionResponse(response))
                    .await;
                info!(logger, "Session {teid:#010x} established");
                Ok(())
            }
            None => {
                let cause = if cause.is_accepted() {
                    Cause::SystemFailure
                } else {
                    cause
                };
                let response = build::create_session_response_failure_for(context, cause);
                self.release_address(&request.imsi, &request.apn, &paa).await;
                self.remove_session(teid).await;
                self.send_s11(S11Outbound::CreateSessionResponse(response))
                    .await;
                bail!("PCEF create session failed with {:?}", result)
            }
        }
    }
}

/// Checks common to every Create Session Request, made before any state exists.
pub fn check_create_session(
    r: &CreateSessionRequest,
    relaxed_rat_check: bool,
    logger: &Logger,
) -> Result<(), Cause> {
    if r.rat_type != RatType::Eutran {
        if relaxed_rat_check {
            warn!(logger, "Unexpected RAT type {:?}", r.rat_type);
        } else {
            warn!(logger, "Rejecting RAT type {:?}", r.rat_type);
            return Err(Cause::RequestRejected);
        }
    }

    let fteid = &r.sender_fteid_for_cp;
    if fteid.teid == 0 && fteid.interface_type != InterfaceType::S11MmeGtpC {
        warn!(
            logger,
            "Bad sender F-TEID interface type {:?}", fteid.interface_type
        );
        return Err(Cause::RequestRejected);
    }

    match r.bearer_contexts_to_be_created.first() {
        Some(b) if is_valid_ebi(b.ebi) => Ok(()),
        Some(b) => {
            warn!(logger, "Invalid default bearer EBI {}", b.ebi);
            Err(Cause::RequestRejected)
        }
        None => {
            warn!(logger, "No bearer context to be created");
            Err(Cause::RequestRejected)
        }
    }
}

/// Reject a Create Session Request before any state exists.
pub fn create_session_rejection(r: &CreateSessionRequest, cause: Cause) -> S11Outbound {
    S11Outbound::CreateSessionResponse(build::create_session_response_failure(
        r.sender_fteid_for_cp.teid,
        cause,
        r.bearer_contexts_to_be_created.first().map(|b| b.ebi),
        r.trxn,
        Some(r.peer_ip),
    ))
}
