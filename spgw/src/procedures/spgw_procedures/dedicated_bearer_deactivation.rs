//! dedicated_bearer_deactivation - PCEF asks for bearers to be removed

use crate::HandlerApi;
use crate::data::*;
use crate::messages::*;
use crate::procedures::{SessionProcedure, Teardown, UserPlaneOp, bearer_teardown_ops};
use crate::protocols::s11::build;
use anyhow::{Result, bail};
use derive_deref::{Deref, DerefMut};
use slog::{Logger, info, warn};

#[derive(Deref, DerefMut)]
pub struct DedicatedBearerDeactivationProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> DedicatedBearerDeactivationProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        DedicatedBearerDeactivationProcedure(inner)
    }

    pub async fn run(&mut self, r: DeactivateBearerRequest) -> Result<()> {
        self.log_message(">> DeactivateBearerRequest");
        let Some(context) = self
            .state
            .store
            .find_by_imsi_and_lbi(&r.imsi, r.lbi)
            .and_then(|teid| self.state.store.get(teid))
        else {
            self.report_deactivation(r.imsi, r.lbi, r.ebis, Cause::ContextNotFound)
                .await;
            bail!("No session of IMSI {} with default bearer {}", r.imsi, r.lbi);
        };

        let targets = bearers_to_delete(context, &r.ebis, self.logger);
        if targets.ebis.is_empty() {
            self.report_deactivation(r.imsi, r.lbi, r.ebis.clone(), Cause::RequestRejected)
                .await;
            bail!("None of bearers {:?} found", r.ebis);
        }
        let request = build::delete_bearer_request(context, targets.ebis, targets.delete_default);
        self.send_s11(S11Outbound::DeleteBearerRequest(request))
            .await;
        if !targets.missing.is_empty() {
            self.report_deactivation(r.imsi, r.lbi, targets.missing, Cause::RequestRejected)
                .await;
        }
        Ok(())
    }

    pub async fn delete_bearer_response(&mut self, r: DeleteBearerResponse) -> Result<()> {
        self.log_message(">> DeleteBearerResponse");
        let logger = self.logger;
        let requested: Vec<Ebi> = r.bearer_contexts.iter().map(|b| b.ebi).collect();
        let Some(context) = self.state.store.get_mut(r.teid) else {
            self.report_deactivation(
                r.imsi,
                r.lbi.unwrap_or(0),
                requested,
                Cause::ContextNotFound,
            )
            .await;
            bail!("Delete Bearer Response for unknown session {:#010x}", r.teid);
        };
        let imsi = context.imsi;
        let lbi = context.pdn.default_bearer;

        let ebis = if r.delete_default_bearer {
            let ebis = context.pdn.bearers.ebis();
            self.teardown_session(
                r.teid,
                Teardown {
                    end_policy_session: false,
                    release_address: true,
                },
            )
            .await;
            info!(self.logger, "Default bearer {lbi} deleted, session {:#010x} gone", r.teid);
            ebis
        } else {
            let (ebis, ops) = remove_dedicated_bearers(context, &requested, logger);
            self.apply(ops).await;
            self.write_snapshot(r.teid).await;
            ebis
        };

        if r.mme_initiated_local_deact {
            info!(self.logger, "MME local deactivation of {:?}", ebis);
        } else {
            self.report_deactivation(imsi, lbi, ebis, r.cause).await;
        }
        Ok(())
    }

    async fn report_deactivation(&self, imsi: Imsi, lbi: Ebi, ebis: Vec<Ebi>, cause: Cause) {
        let report = BearerDeactivationReport {
            imsi,
            lbi,
            ebis,
            cause,
        };
        info!(self.logger, "Bearer deactivation {:?}", report);
        let result = self
            .api
            .pcef_report_bearer_deactivation(report, self.logger)
            .await;
        self.best_effort(result, "Report bearer deactivation");
    }
}

/// How a deactivation request lands on a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearersToDelete {
    pub ebis: Vec<Ebi>,
    // The default bearer was named, so the whole PDN connection goes.
    pub delete_default: bool,
    pub missing: Vec<Ebi>,
}

/// Split the requested EBIs into those to delete and those not found.  Naming
/// the default bearer anywhere in the list deletes the PDN connection.
pub fn bearers_to_delete(context: &SessionContext, requested: &[Ebi], logger: &Logger) -> BearersToDelete {
    let default_ebi = context.pdn.default_bearer;
    let (found, missing): (Vec<Ebi>, Vec<Ebi>) = requested
        .iter()
        .copied()
        .partition(|ebi| context.pdn.bearers.contains(*ebi));
    if !missing.is_empty() {
        warn!(logger, "Bearers {:?} not found", missing);
    }
    if requested.contains(&default_ebi) {
        if requested.len() > 1 {
            info!(logger, "Default bearer {default_ebi} named in {:?}, deleting PDN connection", requested);
        }
        return BearersToDelete {
            ebis: vec![default_ebi],
            delete_default: true,
            missing,
        };
    }
    BearersToDelete {
        ebis: found,
        delete_default: false,
        missing,
    }
}

/// Remove acknowledged dedicated bearers, returning their EBIs and the tunnels to
/// delete.  The default bearer is never removed here.
pub fn remove_dedicated_bearers(
    context: &mut SessionContext,
    requested: &[Ebi],
    logger: &Logger,
) -> (Vec<Ebi>, Vec<UserPlaneOp>) {
    let imsi = context.imsi;
    let mut removed = vec![];
    let mut ops = vec![];
    for ebi in requested {
        if context.pdn.is_default(*ebi) {
            warn!(logger, "Ignoring default bearer {ebi} in dedicated bearer removal");
            continue;
        }
        match context.pdn.bearers.remove(*ebi) {
            Some(bearer) => {
                ops.extend(bearer_teardown_ops(imsi, &bearer, false));
                removed.push(*ebi);
            }
            None => warn!(logger, "Bearer {ebi} already gone"),
        }
    }
    (removed, ops)
}
