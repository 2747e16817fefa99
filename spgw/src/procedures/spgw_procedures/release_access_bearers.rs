//! release_access_bearers - UE goes idle, eNB tunnels dropped

use crate::HandlerApi;
use crate::messages::*;
use crate::procedures::{SessionProcedure, UserPlaneOp};
use crate::protocols::s11::build;
use anyhow::{Result, bail};
use derive_deref::{Deref, DerefMut};
use slog::debug;

/// Moves every session of a subscriber to idle: the eNB side of each bearer is
/// forgotten and downlink data triggers paging instead.
#[derive(Deref, DerefMut)]
pub struct ReleaseAccessBearersProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> ReleaseAccessBearersProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        ReleaseAccessBearersProcedure(inner)
    }

    pub async fn run(&mut self, r: ReleaseAccessBearersRequest) -> Result<()> {
        self.log_message(">> ReleaseAccessBearersRequest");
        let mut teids = self.state.store.teids_for_imsi(&r.imsi);
        if teids.is_empty() && self.state.store.contains(r.teid) {
            teids.push(r.teid);
        }
        if teids.is_empty() {
            self.send_s11(S11Outbound::ReleaseAccessBearersResponse(
                build::release_access_bearers_response(r.mme_teid, Cause::ContextNotFound, r.trxn),
            ))
            .await;
            bail!("Release Access Bearers Request for unknown IMSI {}", r.imsi);
        }

        let mut ops = vec![];
        for teid in &teids {
            let Some(context) = self.state.store.get_mut(*teid) else {
                continue;
            };
            let imsi = context.imsi;
            let default_ebi = context.pdn.default_bearer;
            for bearer in context.pdn.bearers.iter_mut() {
                if bearer.enb.is_some() {
                    ops.extend(
                        bearer
                            .tunnels(imsi, bearer.ebi == default_ebi)
                            .into_iter()
                            .map(UserPlaneOp::DelTunnel),
                    );
                }
                bearer.release_enb();
            }
            if let Some(bearer) = context.pdn.default_bearer() {
                ops.push(UserPlaneOp::AddPagingRule(imsi, bearer.ue_address()));
            }
        }
        debug!(self.logger, "Releasing access bearers of {} sessions", teids.len());

        self.apply(ops).await;
        for teid in teids {
            self.write_snapshot(teid).await;
        }
        self.send_s11(S11Outbound::ReleaseAccessBearersResponse(
            build::release_access_bearers_response(r.mme_teid, Cause::RequestAccepted, r.trxn),
        ))
        .await;
        Ok(())
    }
}
