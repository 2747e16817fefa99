//! delete_bearer - bearer removal requested by the roaming PGW

use crate::HandlerApi;
use crate::data::*;
use crate::messages::*;
use crate::procedures::spgw_procedures::{bearers_to_delete, remove_dedicated_bearers};
use crate::procedures::{SessionProcedure, Teardown};
use crate::protocols::s11::build;
use anyhow::{Result, bail};
use derive_deref::{Deref, DerefMut};
use slog::{info, warn};

#[derive(Deref, DerefMut)]
pub struct S8DeleteBearerProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> S8DeleteBearerProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        S8DeleteBearerProcedure(inner)
    }

    pub async fn run(&mut self, r: S8DeleteBearerRequest) -> Result<()> {
        self.log_message(">> S8 DeleteBearerRequest");
        let Some(context) = self.state.store.get(r.context_teid) else {
            self.reject(&r, None, None, Cause::ContextNotFound).await;
            bail!("S8 Delete Bearer Request for unknown session {:#010x}", r.context_teid);
        };
        let imsi = context.imsi;
        let pgw_s8_cp_teid = context.pdn.pgw_s5s8_cp_teid;
        let targets = bearers_to_delete(context, &r.ebis, self.logger);
        if targets.ebis.is_empty() {
            self.reject(&r, Some(imsi), pgw_s8_cp_teid, Cause::RequestRejected)
                .await;
            bail!("None of bearers {:?} found", r.ebis);
        }
        let request = build::delete_bearer_request(context, targets.ebis, targets.delete_default);

        let transaction = ProxyTransaction {
            imsi,
            pgw_s8_cp_teid,
            sequence_number: r.sequence_number,
            pgw_cp_address: r.pgw_cp_address.clone(),
            rejected: targets.missing,
        };
        if let Some(displaced) = self
            .state
            .proxy_transactions
            .park_delete_bearer(r.context_teid, transaction)
        {
            warn!(
                self.logger,
                "Delete Bearer {} superseded before the MME answered", displaced.sequence_number
            );
            self.answer_proxy(displaced, Cause::RequestRejected, vec![])
                .await;
        }
        self.send_s11(S11Outbound::DeleteBearerRequest(request))
            .await;
        Ok(())
    }

    pub async fn delete_bearer_response(&mut self, r: DeleteBearerResponse) -> Result<()> {
        self.log_message(">> DeleteBearerResponse");
        let logger = self.logger;
        if !self.state.store.contains(r.teid) {
            // The session went while the MME was deciding.
            let transaction = match self.state.proxy_transactions.take_delete_bearer(r.teid) {
                Some(transaction) => Some(transaction),
                None => self.state.proxy_transactions.take_any_delete_bearer(&r.imsi),
            };
            if let Some(transaction) = transaction {
                let bearer_contexts = r
                    .bearer_contexts
                    .iter()
                    .map(|b| BearerCause::new(b.ebi, Cause::ContextNotFound))
                    .collect();
                self.answer_proxy(transaction, Cause::ContextNotFound, bearer_contexts)
                    .await;
            }
            bail!("Delete Bearer Response for unknown session {:#010x}", r.teid);
        }
        let Some(transaction) = self.state.proxy_transactions.take_delete_bearer(r.teid) else {
            bail!("No roaming Delete Bearer outstanding on {:#010x}", r.teid);
        };
        let Some(context) = self.state.store.get_mut(r.teid) else {
            bail!("Session {:#010x} vanished", r.teid);
        };

        let bearer_contexts = if r.delete_default_bearer {
            let ebis = context.pdn.bearers.ebis();
            self.teardown_session(r.teid, Teardown::ROAMING).await;
            info!(logger, "Roaming session {:#010x} gone", r.teid);
            ebis.into_iter()
                .map(|ebi| BearerCause::new(ebi, r.cause))
                .collect()
        } else {
            let requested: Vec<Ebi> = r.bearer_contexts.iter().map(|b| b.ebi).collect();
            let (_, ops) = remove_dedicated_bearers(context, &requested, logger);
            self.apply(ops).await;
            self.write_snapshot(r.teid).await;
            r.bearer_contexts.clone()
        };
        self.answer_proxy(transaction, r.cause, bearer_contexts)
            .await;
        Ok(())
    }

    /// Answer the proxy, rejecting individually the bearers it named that were
    /// never found.
    async fn answer_proxy(
        &self,
        transaction: ProxyTransaction,
        cause: Cause,
        mut bearer_contexts: Vec<BearerCause>,
    ) {
        bearer_contexts.extend(
            transaction
                .rejected
                .iter()
                .map(|ebi| BearerCause::new(*ebi, Cause::RequestRejected)),
        );
        let response = S8DeleteBearerResponse {
            pgw_s8_cp_teid: transaction.pgw_s8_cp_teid,
            sequence_number: transaction.sequence_number,
            pgw_cp_address: transaction.pgw_cp_address,
            imsi: Some(transaction.imsi),
            cause,
            bearer_contexts,
        };
        let result = self.send_s8(S8Outbound::DeleteBearerResponse(response)).await;
        self.best_effort(result, "Answer roaming proxy");
    }

    async fn reject(
        &self,
        r: &S8DeleteBearerRequest,
        imsi: Option<Imsi>,
        pgw_s8_cp_teid: Option<Teid>,
        cause: Cause,
    ) {
        warn!(self.logger, "Rejecting S8 Delete Bearer Request with {:?}", cause);
        let response = S8DeleteBearerResponse {
            pgw_s8_cp_teid,
            sequence_number: r.sequence_number,
            pgw_cp_address: r.pgw_cp_address.clone(),
            imsi,
            cause,
            bearer_contexts: r
                .ebis
                .iter()
                .map(|ebi| BearerCause::new(*ebi, cause))
                .collect(),
        };
        let result = self.send_s8(S8Outbound::DeleteBearerResponse(response)).await;
        self.best_effort(result, "Answer roaming proxy");
    }
}
