//! modify_bearer - MME supplies or changes the eNB side of bearers

use crate::HandlerApi;
use crate::messages::*;
use crate::procedures::{SessionProcedure, UserPlaneOp, bearer_teardown_ops};
use crate::protocols::s11::build;
use anyhow::{Result, bail};
use derive_deref::{Deref, DerefMut};
use slog::{info, warn};

#[derive(Deref, DerefMut)]
pub struct ModifyBearerProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> ModifyBearerProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        ModifyBearerProcedure(inner)
    }

    pub async fn run(&mut self, r: ModifyBearerRequest) -> Result<()> {
        self.log_message(">> ModifyBearerRequest");
        let logger = self.logger;
        let Some(context) = self.state.store.get_mut(r.teid) else {
            self.send_s11(S11Outbound::ModifyBearerResponse(
                build::modify_bearer_response_context_not_found(&r),
            ))
            .await;
            bail!("Modify Bearer Request for unknown session {:#010x}", r.teid);
        };
        context.trxn = r.trxn;
        let imsi = context.imsi;
        let suspended = context.ue_suspended_for_ps_handover;

        let mut ops = vec![];
        let mut modified = vec![];
        let mut marked_for_removal = vec![];
        let mut not_found = vec![];

        for b in &r.bearer_contexts_to_be_modified {
            let is_default = context.pdn.is_default(b.ebi);
            let Some(bearer) = context.pdn.bearers.get_mut(b.ebi) else {
                warn!(logger, "Bearer {} not found", b.ebi);
                not_found.push(BearerCause::new(b.ebi, Cause::ContextNotFound));
                continue;
            };

            if let Some(old) = &bearer.enb {
                let moved = !old.same_address(&b.s1u_enb_fteid);
                if moved || old.teid != b.s1u_enb_fteid.teid {
                    for tunnel in bearer.tunnels(imsi, is_default) {
                        if moved {
                            ops.push(UserPlaneOp::EndMarker(tunnel.clone()));
                        }
                        ops.push(UserPlaneOp::DelTunnel(tunnel));
                    }
                }
            }

            bearer.enb = Some(b.s1u_enb_fteid.clone());
            bearer.add_default_sdf();
            for tunnel in bearer.tunnels(imsi, is_default) {
                ops.push(if suspended {
                    UserPlaneOp::ForwardData(tunnel)
                } else {
                    UserPlaneOp::AddTunnel(tunnel)
                });
            }
            modified.push(BearerContextModified {
                ebi: b.ebi,
                cause: Cause::RequestAccepted,
                s1u_sgw_fteid: bearer.sgw_s1u_fteid(),
            });
        }

        for ebi in &r.bearer_contexts_to_be_removed {
            if context.pdn.is_default(*ebi) {
                warn!(logger, "Refusing to remove default bearer {ebi}");
                not_found.push(BearerCause::new(*ebi, Cause::RequestRejected));
                continue;
            }
            match context.pdn.bearers.remove(*ebi) {
                Some(bearer) => {
                    ops.extend(bearer_teardown_ops(imsi, &bearer, false));
                    marked_for_removal.push(BearerCause::new(*ebi, Cause::RequestAccepted));
                }
                None => not_found.push(BearerCause::new(*ebi, Cause::ContextNotFound)),
            }
        }

        if suspended && !modified.is_empty() {
            info!(logger, "Resuming session {:#010x} after handover", r.teid);
            context.ue_suspended_for_ps_handover = false;
        }

        let cause = if modified.is_empty() && marked_for_removal.is_empty() && !not_found.is_empty()
        {
            Cause::ContextNotFound
        } else {
            Cause::RequestAccepted
        };
        let response = ModifyBearerResponse {
            teid: context.mme_s11_teid,
            cause,
            bearer_contexts_modified: modified,
            bearer_contexts_marked_for_removal: marked_for_removal,
            bearer_contexts_not_found: not_found,
            trxn: r.trxn,
        };

        self.apply(ops).await;
        self.write_snapshot(r.teid).await;
        self.send_s11(S11Outbound::ModifyBearerResponse(response))
            .await;
        Ok(())
    }
}
