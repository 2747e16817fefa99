use super::{HandlerApi, Procedure};
use crate::Config;
use crate::data::*;
use crate::messages::*;
use anyhow::Result;
use slog::{Logger, debug};

/// A data plane change, collected while the session is borrowed and applied after.
#[derive(Debug, Clone, PartialEq)]
pub enum UserPlaneOp {
    AddTunnel(Tunnel),
    DelTunnel(Tunnel),
    EndMarker(Tunnel),
    ForwardData(Tunnel),
    DiscardData(Tunnel),
    AddPagingRule(Imsi, UeAddress),
    DeletePagingRule(Imsi, UeAddress),
}

/// Which external resources a teardown gives back besides the tunnels.
#[derive(Debug, Clone, Copy)]
pub struct Teardown {
    pub end_policy_session: bool,
    pub release_address: bool,
}

impl Teardown {
    pub const LOCAL_PGW: Teardown = Teardown {
        end_policy_session: true,
        release_address: true,
    };
    pub const ROAMING: Teardown = Teardown {
        end_policy_session: false,
        release_address: false,
    };
}

pub struct SessionProcedure<'a, A: HandlerApi> {
    base: Procedure<'a, A>,
    pub state: &'a mut SgwState,
}

impl<'a, A: HandlerApi> std::ops::Deref for SessionProcedure<'a, A> {
    type Target = Procedure<'a, A>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a, A: HandlerApi> SessionProcedure<'a, A> {
    pub fn new(api: &'a A, state: &'a mut SgwState, logger: &'a Logger) -> Self {
        SessionProcedure {
            base: Procedure::new(api, logger),
            state,
        }
    }

    pub fn config(&self) -> &'a Config {
        self.base.api.config()
    }

    pub async fn send_s11(&self, message: S11Outbound) {
        self.log_message(&format!("<< {}", message.name()));
        let result = self.api.send_to_mme(message, self.logger).await;
        self.best_effort(result, "Send to MME");
    }

    pub async fn send_s8(&self, message: S8Outbound) -> Result<()> {
        self.log_message(&format!("<< {}", message.name()));
        self.api.send_to_proxy(message, self.logger).await
    }

    pub async fn apply(&self, ops: Vec<UserPlaneOp>) {
        for op in ops {
            debug!(self.logger, "Data plane {:?}", op);
            let (result, what) = match &op {
                UserPlaneOp::AddTunnel(t) => (self.api.add_tunnel(t, self.logger).await, "Add tunnel"),
                UserPlaneOp::DelTunnel(t) => (self.api.del_tunnel(t, self.logger).await, "Delete tunnel"),
                UserPlaneOp::EndMarker(t) => (
                    self.api.send_end_marker(t, self.logger).await,
                    "End marker",
                ),
                UserPlaneOp::ForwardData(t) => (
                    self.api.forward_data_on_tunnel(t, self.logger).await,
                    "Forward data on tunnel",
                ),
                UserPlaneOp::DiscardData(t) => (
                    self.api.discard_data_on_tunnel(t, self.logger).await,
                    "Discard data on tunnel",
                ),
                UserPlaneOp::AddPagingRule(imsi, ue) => (
                    self.api.add_paging_rule(imsi, *ue, self.logger).await,
                    "Add paging rule",
                ),
                UserPlaneOp::DeletePagingRule(imsi, ue) => (
                    self.api.delete_paging_rule(imsi, *ue, self.logger).await,
                    "Delete paging rule",
                ),
            };
            self.best_effort(result, what);
        }
    }

    pub async fn write_snapshot(&self, teid: Teid) {
        let Some(context) = self.state.store.get(teid) else {
            return;
        };
        let key = context.snapshot_key();
        let result = self
            .api
            .put_snapshot(&key, SessionSnapshot::from(context), self.logger)
            .await;
        self.best_effort(result, "Snapshot write");
    }

    pub async fn release_address(&self, imsi: &Imsi, apn: &str, paa: &Paa) {
        let result = self
            .api
            .release_ue_address(imsi, apn, paa, self.logger)
            .await;
        self.best_effort(result, "Address release");
    }

    /// Drop a session that never got as far as the data plane.
    pub async fn remove_session(&mut self, teid: Teid) -> Option<SessionContext> {
        let imsi = self.state.store.get(teid)?.imsi;
        let removed = self.state.store.remove(teid, &imsi)?;
        let result = self
            .api
            .delete_snapshot(&removed.snapshot_key(), self.logger)
            .await;
        self.best_effort(result, "Snapshot delete");
        Some(removed)
    }

    /// Remove a session: external resources first, then the local state.
    pub async fn teardown_session(
        &mut self,
        teid: Teid,
        teardown: Teardown,
    ) -> Option<SessionContext> {
        let context = self.state.store.get_mut(teid)?;
        context.state = SessionState::Deleting;
        let imsi = context.imsi;
        let apn = context.pdn.apn_in_use.clone();
        let key = context.snapshot_key();
        let paa = context.pdn.default_bearer().and_then(|b| b.paa.clone());
        let ops = teardown_ops(context);

        if teardown.end_policy_session {
            let result = self.api.pcef_end_session(&imsi, &apn, self.logger).await;
            self.best_effort(result, "PCEF end session");
        }
        self.apply(ops).await;
        if teardown.release_address {
            if let Some(paa) = paa {
                self.release_address(&imsi, &apn, &paa).await;
            }
        }

        let removed = self.state.store.remove(teid, &imsi);
        let result = self.api.delete_snapshot(&key, self.logger).await;
        self.best_effort(result, "Snapshot delete");
        removed
    }
}

/// Data plane changes that remove every installed bearer of a session, dedicated
/// bearers before the default bearer.
pub fn teardown_ops(context: &SessionContext) -> Vec<UserPlaneOp> {
    let imsi = context.imsi;
    let pdn = &context.pdn;
    let mut ops = vec![];
    for bearer in pdn.bearers.iter().filter(|b| !pdn.is_default(b.ebi)) {
        if bearer.enb.is_some() {
            ops.extend(bearer.tunnels(imsi, false).into_iter().map(UserPlaneOp::DelTunnel));
        }
    }
    if let Some(bearer) = pdn.default_bearer() {
        if bearer.enb.is_some() {
            ops.extend(bearer.tunnels(imsi, true).into_iter().map(UserPlaneOp::DelTunnel));
        }
        ops.push(UserPlaneOp::DeletePagingRule(imsi, bearer.ue_address()));
        if context.ue_suspended_for_ps_handover {
            ops.extend(bearer.tunnels(imsi, true).into_iter().map(UserPlaneOp::ForwardData));
        }
    }
    ops
}

/// Data plane changes that remove the tunnels of one bearer.
pub fn bearer_teardown_ops(imsi: Imsi, bearer: &BearerContext, is_default: bool) -> Vec<UserPlaneOp> {
    if bearer.enb.is_none() {
        return vec![];
    }
    bearer
        .tunnels(imsi, is_default)
        .into_iter()
        .map(UserPlaneOp::DelTunnel)
        .collect()
}
