//! delete_session - MME removes a PDN connection

use crate::HandlerApi;
use crate::data::*;
use crate::messages::*;
use crate::procedures::{SessionProcedure, Teardown};
use crate::protocols::s11::build;
use anyhow::{Result, bail};
use derive_deref::{Deref, DerefMut};
use slog::{Logger, info, warn};

#[derive(Deref, DerefMut)]
pub struct DeleteSessionProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> DeleteSessionProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        DeleteSessionProcedure(inner)
    }

    pub async fn run(&mut self, r: DeleteSessionRequest) -> Result<()> {
        self.log_message(">> DeleteSessionRequest");
        let Some(context) = self.state.store.get(r.teid) else {
            self.send_s11(S11Outbound::DeleteSessionResponse(
                delete_session_not_found(&r),
            ))
            .await;
            bail!("Delete Session Request for unknown session {:#010x}", r.teid);
        };
        let mme_teid = context.mme_s11_teid;
        let mme_ip = context.mme_ip;

        if let Err(cause) = check_delete_session(context, &r, self.logger) {
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

        self.teardown_session(r.teid, Teardown::LOCAL_PGW).await;
        info!(self.logger, "Deleted session {:#010x}", r.teid);
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
        Ok(())
    }
}

/// Validate a Delete Session Request against the session it names.
pub fn check_delete_session(
    context: &SessionContext,
    r: &DeleteSessionRequest,
    logger: &Logger,
) -> Result<(), Cause> {
    if r.indication_flags.oi {
        info!(logger, "Operation indication set");
    }
    if let Some(sender) = r.sender_fteid_for_cp.as_ref().filter(|f| f.has_address()) {
        if sender.teid != context.mme_s11_teid {
            warn!(
                logger,
                "Sender TEID {:#010x} does not match MME TEID {:#010x}",
                sender.teid,
                context.mme_s11_teid
            );
            return Err(Cause::InvalidPeer);
        }
    }
    if r.lbi != context.pdn.default_bearer {
        warn!(
            logger,
            "LBI {} does not match default bearer {}", r.lbi, context.pdn.default_bearer
        );
        return Err(Cause::RequestRejected);
    }
    Ok(())
}

/// An unrecognised peer is answered on the TEID it gave us.
pub fn rejection_teid(r: &DeleteSessionRequest, mme_teid: Teid, cause: Cause) -> Teid {
    match (cause, &r.sender_fteid_for_cp) {
        (Cause::InvalidPeer, Some(sender)) => sender.teid,
        _ => mme_teid,
    }
}

pub fn delete_session_not_found(r: &DeleteSessionRequest) -> DeleteSessionResponse {
    build::delete_session_response(
        r.sender_fteid_for_cp.as_ref().map(|f| f.teid).unwrap_or(0),
        Cause::ContextNotFound,
        r.lbi,
        r.trxn,
        r.peer_ip,
    )
}
