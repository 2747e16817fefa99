use crate::HandlerApi;
use crate::data::*;
use crate::messages::*;
use crate::procedures::spgw_procedures::{
    check_delete_session, delete_session_not_found, rejection_teid,
};
use crate::procedures::{SessionProcedure, Teardown};
use crate::protocols::s11::build;
use anyhow::{Result, bail};
use derive_deref::{Deref, DerefMut};
use slog::{info, warn};

#[derive(Deref, DerefMut)]
pub struct S8DeleteSessionProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> S8DeleteSessionProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        S8DeleteSessionProcedure(inner)
    }

    pub async fn run(&mut self, r: DeleteSessionRequest) -> Result<()> {
        self.log_message(">> DeleteSessionRequest");
        let logger = self.logger;
        let Some(context) = self.state.store.get_mut(r.teid) else {
            self.send_s11(S11Outbound::DeleteSessionResponse(
                delete_session_not_found(&r),
            ))
            .await;
            bail!("Delete Session Request for unknown session {:#010x}", r.teid);
        };
        let mme_teid = context.mme_s11_teid;
        let mme_ip = context.mme_ip;

        if let Err(cause) = check_delete_session(context, &r, logger) {
            self.send_s11(S11Outbound::DeleteSessionResponse(
                build::delete_session_response(
                    rejection_teid(&r, mme_teid, cause),
                    cause,
                    r.lbi,
                    r.trxn,
                    mme_ip,
                ),
            ))
            .await;
            bail!("Delete Session Request rejected with cause {cause:?}");
        }

        context.state = SessionState::Deleting;
        context.trxn = r.trxn;
        let request = S8DeleteSessionRequest {
            imsi: context.imsi,
            context_teid: r.teid,
            pgw_s8_cp_teid: context.pdn.pgw_s5s8_cp_teid,
            lbi: r.lbi,
            indication_flags: r.indication_flags,
        };
        if let Err(e) = self.send_s8(S8Outbound::DeleteSessionRequest(request)).await {
            // Without a proxy the PGW side cannot be reached; release locally.
            warn!(logger, "Failed to reach roaming proxy - {e}");
            self.teardown_session(r.teid, Teardown::ROAMING).await;
            self.send_s11(S11Outbound::DeleteSessionResponse(
                build::delete_session_response(
                    mme_teid,
                    Cause::RequestAccepted,
                    r.lbi,
                    r.trxn,
                    mme_ip,
                ),
            ))
            .await;
            return Ok(());
        }
        self.write_snapshot(r.teid).await;
        Ok(())
    }

    pub async fn delete_session_response(&mut self, r: S8DeleteSessionResponse) -> Result<()> {
        self.log_message(">> S8 DeleteSessionResponse");
        let Some(context) = self.state.store.get(r.context_teid) else {
            bail!("S8 Delete Session Response for unknown session {:#010x}", r.context_teid);
        };
        let response = build::delete_session_response(
            context.mme_s11_teid,
            r.cause,
            context.pdn.default_bearer,
            context.trxn,
            context.mme_ip,
        );
        self.teardown_session(r.context_teid, Teardown::ROAMING)
            .await;
        info!(self.logger, "Deleted roaming session {:#010x}", r.context_teid);
        self.send_s11(S11Outbound::DeleteSessionResponse(response))
            .await;
        Ok(())
    }
}
