//! dedicated_bearer_activation - PCEF asks for a dedicated bearer, committed once the MME answers

use crate::HandlerApi;
use crate::data::*;
use crate::messages::*;
use crate::procedures::{SessionProcedure, UserPlaneOp};
use crate::protocols::s11::build;
use anyhow::{Result, anyhow, bail};
use derive_deref::{Deref, DerefMut};
use slog::{Logger, info, warn};

/// Network initiated dedicated bearer activation.  The provisional bearer waits
/// in the pending procedure ledger until the MME answers the Create Bearer
/// Request, and is then committed to the bearer map or discarded.
#[derive(Deref, DerefMut)]
pub struct DedicatedBearerActivationProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> DedicatedBearerActivationProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        DedicatedBearerActivationProcedure(inner)
    }

    pub async fn run(&mut self, r: ActivateBearerRequest) -> Result<()> {
        self.log_message(">> ActivateBearerRequest");
        let Some(teid) = self.state.store.find_by_imsi_and_lbi(&r.imsi, r.lbi) else {
            self.report_binding(
                r.imsi,
                r.lbi,
                Some(r.policy_rule_name),
                BindingOutcome::Rejected(Cause::RequestRejected),
            )
            .await;
            bail!("No session of IMSI {} with default bearer {}", r.imsi, r.lbi);
        };

        let s1u_ip = self.config().s1u_ip;
        let s1u_teid = self.state.new_user_plane_teid();
        let sequence_number = self.state.next_sequence_number();
        let paa = self
            .state
            .store
            .get(teid)
            .and_then(|c| c.pdn.default_bearer())
            .and_then(|b| b.paa.clone());

        let mut bearer = BearerContext::new(0, s1u_teid, s1u_ip, r.qos.clone());
        bearer.paa = paa;
        bearer.tft = r.dl_tft.clone();
        bearer.policy_rule_name = Some(r.policy_rule_name.clone());
        bearer.sgw_sequence_number = sequence_number;

        if let Err(e) = self.begin_create_bearer(teid, bearer, r.ul_tft, None).await {
            self.report_binding(
                r.imsi,
                r.lbi,
                Some(r.policy_rule_name),
                BindingOutcome::Rejected(Cause::RequestRejected),
            )
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
        let Some(teid) = find_pending_bearer(&self.state.store, r.teid, &r.imsi, sgw_teid) else {
            self.report_binding(r.imsi, 0, None, BindingOutcome::Rejected(Cause::ContextNotFound))
                .await;
            bail!("No provisional bearer with S1-U TEID {sgw_teid:#010x}");
        };
        let context = self
            .state
            .store
            .get_mut(teid)
            .ok_or_else(|| anyhow!("Session {teid:#010x} vanished"))?;
        let imsi = context.imsi;
        let default_ebi = context.pdn.default_bearer;
        let provisional = context
            .pdn
            .pending
            .take_by_sgw_teid(sgw_teid)
            .ok_or_else(|| anyhow!("Provisional bearer {sgw_teid:#010x} vanished"))?;
        let rule = provisional.policy_rule_name.clone();

        let outcome = match commit_bearer(context, provisional, activated, r.cause, logger) {
            Ok((bearer, ops)) => {
                self.apply(ops).await;
                BindingOutcome::Bound {
                    ebi: bearer.ebi,
                    sgw_teid,
                    enb_teid: bearer.enb.as_ref().map(|f| f.teid).unwrap_or(0),
                }
            }
            Err(cause) => BindingOutcome::Rejected(cause),
        };
        self.write_snapshot(teid).await;
        self.report_binding(imsi, default_ebi, rule, outcome).await;
        Ok(())
    }

    async fn report_binding(
        &self,
        imsi: Imsi,
        default_ebi: Ebi,
        policy_rule_name: Option<String>,
        outcome: BindingOutcome,
    ) {
        let binding = PolicyBinding {
            imsi,
            default_ebi,
            policy_rule_name,
            outcome,
        };
        info!(self.logger, "Policy binding {:?}", binding);
        let result = self.api.pcef_send_policy_binding(binding, self.logger).await;
        self.best_effort(result, "Send policy binding");
    }
}

impl<A: HandlerApi> SessionProcedure<'_, A> {
    /// Park a provisional bearer in the ledger and ask the MME to create it.
    /// The ledger entry is rolled back if the request cannot be sent.
    pub async fn begin_create_bearer(
        &mut self,
        teid: Teid,
        bearer: BearerContext,
        ul_tft: TrafficFlowTemplate,
        pco: Option<Pco>,
    ) -> Result<()> {
        let context = self
            .state
            .store
            .get_mut(teid)
            .ok_or_else(|| anyhow!("Session {teid:#010x} not found"))?;
        let sgw_teid = bearer.sgw_s1u_teid;
        let request = build::create_bearer_request(context, &bearer, ul_tft, pco);
        context.pdn.pending.push_create_bearer(bearer)?;

        self.log_message("<< CreateBearerRequest");
        let result = self
            .api
            .send_to_mme(S11Outbound::CreateBearerRequest(request), self.logger)
            .await;
        if let Err(e) = result {
            if let Some(context) = self.state.store.get_mut(teid) {
                context.pdn.pending.take_by_sgw_teid(sgw_teid);
            }
            bail!("Failed to send Create Bearer Request - {e}");
        }
        self.write_snapshot(teid).await;
        Ok(())
    }
}

/// The session holding the provisional bearer with the given SGW S1-U TEID.  The
/// MME normally answers on our S11 TEID; otherwise every session of the
/// subscriber is searched.
pub fn find_pending_bearer(store: &ContextStore, teid: Teid, imsi: &Imsi, sgw_teid: Teid) -> Option<Teid> {
    let holds = |teid: &Teid| {
        store
            .get(*teid)
            .is_some_and(|c| c.pdn.pending.find_by_sgw_teid(sgw_teid).is_some())
    };
    if holds(&teid) {
        return Some(teid);
    }
    store.teids_for_imsi(imsi).into_iter().find(holds)
}

/// Move an answered provisional bearer into the bearer map.  Returns the
/// committed bearer and the tunnels to install, or the cause of the rejection.
pub fn commit_bearer(
    context: &mut SessionContext,
    mut bearer: BearerContext,
    activated: &BearerContextActivated,
    cause: Cause,
    logger: &Logger,
) -> Result<(BearerContext, Vec<UserPlaneOp>), Cause> {
    if !cause.is_accepted() {
        info!(logger, "Create Bearer rejected by MME with {:?}", cause);
        return Err(cause);
    }
    if !activated.cause.is_accepted() {
        info!(logger, "Bearer rejected by MME with {:?}", activated.cause);
        return Err(activated.cause);
    }
    if !is_valid_ebi(activated.ebi) {
        warn!(logger, "MME assigned invalid EBI {}", activated.ebi);
        return Err(Cause::RequestRejected);
    }

    bearer.ebi = activated.ebi;
    bearer.enb = activated.s1u_enb_fteid.clone();
    let ops = if bearer.enb.is_some() {
        bearer
            .tunnels(context.imsi, false)
            .into_iter()
            .map(UserPlaneOp::AddTunnel)
            .collect()
    } else {
        vec![]
    };
    if let Err(e) = context.pdn.bearers.insert(bearer.clone()) {
        warn!(logger, "Failed to commit bearer - {e}");
        return Err(Cause::RequestRejected);
    }
    info!(logger, "Committed dedicated bearer {}", bearer.ebi);
    Ok((bearer, ops))
}
