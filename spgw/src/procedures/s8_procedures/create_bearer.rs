//! create_bearer - dedicated bearer requested by the roaming PGW

use crate::HandlerApi;
use crate::data::*;
use crate::messages::*;
use crate::procedures::SessionProcedure;
use crate::procedures::spgw_procedures::{commit_bearer, find_pending_bearer};
use anyhow::{Result, anyhow, bail};
use derive_deref::{Deref, DerefMut};
use slog::warn;

/// Dedicated bearer activation requested by the roaming PGW.  The proxy's
/// sequence number and PGW address are parked as a proxy transaction and
/// handed back unchanged in the answer, even if the session has gone by then.
#[derive(Deref, DerefMut)]
pub struct S8CreateBearerProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> S8CreateBearerProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        S8CreateBearerProcedure(inner)
    }

    pub async fn run(&mut self, r: S8CreateBearerRequest) -> Result<()> {
        self.log_message(">> S8 CreateBearerRequest");
        let Some(context) = self.state.store.get(r.context_teid) else {
            self.answer_proxy(&r, None, None, Cause::ContextNotFound)
                .await;
            bail!("S8 Create Bearer Request for unknown session {:#010x}", r.context_teid);
        };
        let imsi = context.imsi;
        let pgw_s8_cp_teid = context.pdn.pgw_s5s8_cp_teid;
        if r.lbi != context.pdn.default_bearer {
            let default_ebi = context.pdn.default_bearer;
            self.answer_proxy(&r, Some(imsi), pgw_s8_cp_teid, Cause::RequestRejected)
                .await;
            bail!("LBI {} does not match default bearer {default_ebi}", r.lbi);
        }
        let paa = context.pdn.default_bearer().and_then(|b| b.paa.clone());

        let config = self.config();
        let s1u_teid = self.state.new_user_plane_teid();
        let s5s8_teid = self.state.new_user_plane_teid();
        let activation = &r.bearer_context;
        let mut bearer = BearerContext::new(0, s1u_teid, config.s1u_ip, activation.qos.clone());
        bearer.paa = paa;
        bearer.tft = activation.tft.clone();
        bearer.pgw_s5s8_up = Some(activation.pgw_s8_up_fteid.clone());
        bearer.sgw_s5s8_up = Some(Fteid::new(
            InterfaceType::S5S8SgwGtpU,
            s5s8_teid,
            config.s5s8_up_ip,
        ));
        bearer.sgw_sequence_number = r.sequence_number;
        bearer.pgw_cp_address = Some(r.pgw_cp_address.clone());

        self.state.proxy_transactions.park_create_bearer(
            s1u_teid,
            ProxyTransaction {
                imsi,
                pgw_s8_cp_teid,
                sequence_number: r.sequence_number,
                pgw_cp_address: r.pgw_cp_address.clone(),
                rejected: vec![],
            },
        );
        if let Err(e) = self
            .begin_create_bearer(
                r.context_teid,
                bearer,
                activation.tft.clone(),
                activation.pco.clone(),
            )
            .await
        {
            self.state.proxy_transactions.take_create_bearer(s1u_teid);
            self.answer_proxy(&r, Some(imsi), pgw_s8_cp_teid, Cause::SystemFailure)
                .await;
            return Err(e);
        }
        Ok(())
    }

    pub async fn create_bearer_response(&mut self, r: CreateBearerResponse) -> Result<()> {
        self.log_message(">> CreateBearerResponse");
        let logger = self.logger;
        let Some(activated) = r.bearer_contexts.first() else {
            bail!("Create Bearer Response without bearer context");
        };
        let sgw_teid = activated.s1u_sgw_fteid.teid;
        let transaction = self.state.proxy_transactions.take_create_bearer(sgw_teid);
        let Some(teid) = find_pending_bearer(&self.state.store, r.teid, &r.imsi, sgw_teid) else {
            // The session or the provisional bearer went while the MME was deciding.
            if let Some(transaction) = transaction {
                self.answer_late(transaction, Cause::ContextNotFound).await;
            }
            bail!("No provisional bearer with S1-U TEID {sgw_teid:#010x}");
        };
        let context = self
            .state
            .store
            .get_mut(teid)
            .ok_or_else(|| anyhow!("Session {teid:#010x} vanished"))?;
        let provisional = context
            .pdn
            .pending
            .take_by_sgw_teid(sgw_teid)
            .ok_or_else(|| anyhow!("Provisional bearer {sgw_teid:#010x} vanished"))?;
        let (sequence_number, pgw_cp_address) = match transaction {
            Some(transaction) => (transaction.sequence_number, transaction.pgw_cp_address),
            None => (
                provisional.sgw_sequence_number,
                provisional.pgw_cp_address.clone().unwrap_or_default(),
            ),
        };
        let sgw_s8_up_fteid = provisional.sgw_s5s8_up.clone();
        let pgw_s8_up_fteid = provisional.pgw_s5s8_up.clone();
        let qos = provisional.qos.clone();

        let (cause, ebi, ops) = match commit_bearer(context, provisional, activated, r.cause, logger) {
            Ok((bearer, ops)) => (Cause::RequestAccepted, bearer.ebi, ops),
            Err(cause) => (cause, activated.ebi, vec![]),
        };
        let response = S8CreateBearerResponse {
            pgw_s8_cp_teid: context.pdn.pgw_s5s8_cp_teid,
            sequence_number,
            pgw_cp_address,
            imsi: Some(context.imsi),
            cause,
            bearer_context: sgw_s8_up_fteid.map(|sgw_s8_up_fteid| S8BearerContextActivated {
                ebi,
                cause,
                sgw_s8_up_fteid,
                pgw_s8_up_fteid,
                qos,
            }),
        };

        self.apply(ops).await;
        self.write_snapshot(teid).await;
        let result = self.send_s8(S8Outbound::CreateBearerResponse(response)).await;
        self.best_effort(result, "Answer roaming proxy");
        Ok(())
    }

    async fn answer_late(&self, transaction: ProxyTransaction, cause: Cause) {
        warn!(
            self.logger,
            "Answering S8 Create Bearer {} with {:?}", transaction.sequence_number, cause
        );
        let response = S8CreateBearerResponse {
            pgw_s8_cp_teid: transaction.pgw_s8_cp_teid,
            sequence_number: transaction.sequence_number,
            pgw_cp_address: transaction.pgw_cp_address,
            imsi: Some(transaction.imsi),
            cause,
            bearer_context: None,
        };
        let result = self.send_s8(S8Outbound::CreateBearerResponse(response)).await;
        self.best_effort(result, "Answer roaming proxy");
    }

    async fn answer_proxy(
        &self,
        r: &S8CreateBearerRequest,
        imsi: Option<Imsi>,
        pgw_s8_cp_teid: Option<Teid>,
        cause: Cause,
    ) {
        warn!(self.logger, "Rejecting S8 Create Bearer Request with {:?}", cause);
        let response = S8CreateBearerResponse {
            pgw_s8_cp_teid,
            sequence_number: r.sequence_number,
            pgw_cp_address: r.pgw_cp_address.clone(),
            imsi,
            cause,
            bearer_context: None,
        };
        let result = self.send_s8(S8Outbound::CreateBearerResponse(response)).await;
        self.best_effort(result, "Answer roaming proxy");
    }
}
