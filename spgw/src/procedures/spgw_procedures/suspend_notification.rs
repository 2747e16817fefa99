use crate::HandlerApi;
use crate::messages::*;
use crate::procedures::{SessionProcedure, UserPlaneOp};
use crate::protocols::s11::build;
use anyhow::{Result, bail};
use derive_deref::{Deref, DerefMut};
use slog::info;

#[derive(Deref, DerefMut)]
pub struct SuspendNotificationProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> SuspendNotificationProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        SuspendNotificationProcedure(inner)
    }

    pub async fn run(&mut self, r: SuspendNotification) -> Result<()> {
        self.log_message(">> SuspendNotification");
        let Some(context) = self.state.store.get_mut(r.teid) else {
            self.send_s11(S11Outbound::SuspendAcknowledge(build::suspend_acknowledge(
                0,
                Cause::ContextNotFound,
                r.trxn,
            )))
            .await;
            bail!("Suspend Notification for unknown session {:#010x}", r.teid);
        };
        context.ue_suspended_for_ps_handover = true;
        let imsi = context.imsi;
        let mme_teid = context.mme_s11_teid;
        let ops = context
            .pdn
            .default_bearer()
            .map(|b| b.tunnels(imsi, true))
            .unwrap_or_default()
            .into_iter()
            .map(UserPlaneOp::DiscardData)
            .collect();
        info!(self.logger, "Session {:#010x} suspended", r.teid);

        self.apply(ops).await;
        self.write_snapshot(r.teid).await;
        self.send_s11(S11Outbound::SuspendAcknowledge(build::suspend_acknowledge(
            mme_teid,
            Cause::RequestAccepted,
            r.trxn,
        )))
        .await;
        Ok(())
    }
}
