//! create_session - PDN connection anchored on a PGW behind the roaming proxy

use crate::HandlerApi;
use crate::data::*;
use crate::messages::*;
use crate::procedures::SessionProcedure;
use crate::procedures::spgw_procedures::{check_create_session, create_session_rejection};
use crate::protocols::s11::build;
use anyhow::{Result, anyhow, bail};
use derive_deref::{Deref, DerefMut};
use slog::{info, warn};

/// Roaming session establishment.  The session has no S11 TEID until the remote
/// PGW answers, so it waits in the temporary procedure map under a correlation id.
#[derive(Deref, DerefMut)]
pub struct S8CreateSessionProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> S8CreateSessionProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        S8CreateSessionProcedure(inner)
    }

    pub async fn run(&mut self, r: CreateSessionRequest) -> Result<()> {
        self.log_message(">> CreateSessionRequest");
        if let Err(cause) = check_create_session(&r, false, self.logger) {
            self.send_s11(create_session_rejection(&r, cause)).await;
            bail!("Create Session Request rejected with cause {cause:?}");
        }
        let requested = r
            .bearer_contexts_to_be_created
            .first()
            .ok_or_else(|| anyhow!("No default bearer"))?;

        let config = self.config();
        let s1u_teid = self.state.new_user_plane_teid();
        let s5s8_teid = self.state.new_user_plane_teid();
        let sgw_s8_up_fteid = Fteid::new(InterfaceType::S5S8SgwGtpU, s5s8_teid, config.s5s8_up_ip);

        let mut bearer = BearerContext::new(
            requested.ebi,
            s1u_teid,
            config.s1u_ip,
            requested.bearer_level_qos.clone(),
        );
        bearer.tft = requested.tft.clone().unwrap_or_default();
        bearer.sgw_s5s8_up = Some(sgw_s8_up_fteid.clone());
        let mut pdn = PdnConnection::new(&r.apn, requested.ebi);
        if let Err(e) = pdn.bearers.insert(bearer) {
            self.send_s11(create_session_rejection(&r, Cause::SystemFailure))
                .await;
            bail!("Failed to create default bearer - {e}");
        }
        let mut context = SessionContext::new(0, &r, pdn);
        context.state = SessionState::PolicyPending;
        let correlation_id = self.state.temporary.insert_new(context);

        let request = S8CreateSessionRequest {
            correlation_id,
            imsi: r.imsi,
            msisdn: r.msisdn.clone(),
            mei: r.mei.clone(),
            serving_network: r.serving_network.clone(),
            apn: r.apn.clone(),
            pdn_type: r.pdn_type,
            paa: r.paa.clone(),
            ambr: r.ambr,
            charging_characteristics: r.charging_characteristics,
            indication_flags: IndicationFlags::default(),
            pco: r.pco.clone(),
            bearer_context: S8BearerContextToBeCreated {
                ebi: requested.ebi,
                sgw_s8_up_fteid,
                qos: requested.bearer_level_qos.clone(),
            },
        };
        if let Err(e) = self.send_s8(S8Outbound::CreateSessionRequest(request)).await {
            self.state.temporary.take(correlation_id);
            self.send_s11(create_session_rejection(&r, Cause::SystemFailure))
                .await;
            bail!("Failed to reach roaming proxy - {e}");
        }
        info!(
            self.logger,
            "Roaming session for IMSI {} waiting on correlation id {correlation_id:#010x}", r.imsi
        );
        Ok(())
    }

    pub async fn create_session_response(&mut self, r: S8CreateSessionResponse) -> Result<()> {
        self.log_message(">> S8 CreateSessionResponse");
        let Some(record) = self.state.temporary.take(r.correlation_id) else {
            info!(
                self.logger,
                "No procedure with correlation id {:#010x}", r.correlation_id
            );
            return Ok(());
        };
        let mut context = record.context;

        if !r.cause.is_accepted() {
            self.send_s11(S11Outbound::CreateSessionResponse(
                build::create_session_response_failure_for(&context, r.cause),
            ))
            .await;
            bail!("Roaming PGW rejected session with {:?}", r.cause);
        }

        let failure = if r.bearer_context.ebi != context.pdn.default_bearer {
            warn!(
                self.logger,
                "PGW answered for bearer {} rather than default bearer {}",
                r.bearer_context.ebi,
                context.pdn.default_bearer
            );
            Some(Cause::ContextNotFound)
        } else if r.context_teid == 0 || self.state.store.contains(r.context_teid) {
            warn!(self.logger, "Unusable context TEID {:#010x}", r.context_teid);
            Some(Cause::SystemFailure)
        } else {
            None
        };

        let response = match failure {
            None => {
                context.sgw_s11_teid = r.context_teid;
                context.pdn.pgw_s5s8_cp_teid = r.pgw_s8_cp_fteid.as_ref().map(|f| f.teid);
                if let Some(bearer) = context.pdn.default_bearer_mut() {
                    bearer.paa = r.paa.clone();
                    bearer.pgw_s5s8_up = r.bearer_context.pgw_s8_up_fteid.clone();
                    if let Some(qos) = &r.bearer_context.qos {
                        bearer.qos = qos.clone();
                    }
                }
                context.state = SessionState::Established;
                let ambr = context
                    .create_session_request
                    .as_ref()
                    .map(|c| c.ambr)
                    .unwrap_or_default();
                build::create_session_response_accept(&context, self.config().s11_ip, ambr, r.pco.clone())
                    .map_err(|e| {
                        warn!(self.logger, "Failed to build response - {e}");
                        Cause::SystemFailure
                    })
            }
            Some(cause) => Err(cause),
        };

        let response = match response {
            Ok(response) => response,
            Err(cause) => {
                let result = self
                    .send_s8(S8Outbound::DeleteSessionRequest(S8DeleteSessionRequest {
                        imsi: context.imsi,
                        context_teid: r.context_teid,
                        pgw_s8_cp_teid: r.pgw_s8_cp_fteid.as_ref().map(|f| f.teid),
                        lbi: context.pdn.default_bearer,
                        indication_flags: IndicationFlags::default(),
                    }))
                    .await;
                self.best_effort(result, "Delete session on roaming PGW");
                self.send_s11(S11Outbound::CreateSessionResponse(
                    build::create_session_response_failure_for(&context, cause),
                ))
                .await;
                bail!("Roaming session setup failed with {cause:?}");
            }
        };

        let teid = r.context_teid;
        self.state.store.create(context)?;
        self.write_snapshot(teid).await;
        self.send_s11(S11Outbound::CreateSessionResponse(response))
            .await;
        info!(self.logger, "Roaming session {teid:#010x} established");
        Ok(())
    }
}
