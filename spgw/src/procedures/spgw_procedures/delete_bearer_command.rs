use crate::HandlerApi;
use crate::messages::*;
use crate::procedures::SessionProcedure;
use crate::protocols::s11::build;
use anyhow::{Result, bail};
use derive_deref::{Deref, DerefMut};

/// MME-initiated bearer removal.  The PCEF is asked to delete the bearers and
/// answers with an ordinary deactivation request.
#[derive(Deref, DerefMut)]
pub struct DeleteBearerCommandProcedure<'a, A: HandlerApi>(SessionProcedure<'a, A>);

impl<'a, A: HandlerApi> DeleteBearerCommandProcedure<'a, A> {
    pub fn new(inner: SessionProcedure<'a, A>) -> Self {
        DeleteBearerCommandProcedure(inner)
    }

    pub async fn run(&mut self, r: DeleteBearerCommand) -> Result<()> {
        self.log_message(">> DeleteBearerCommand");
        let Some(context) = self.state.store.get(r.teid) else {
            self.send_s11(S11Outbound::DeleteBearerFailureIndication(
                build::delete_bearer_failure_indication(&r, Cause::ContextNotFound),
            ))
            .await;
            bail!("Delete Bearer Command for unknown session {:#010x}", r.teid);
        };
        let imsi = context.imsi;
        let lbi = context.pdn.default_bearer;
        let result = self
            .api
            .pcef_delete_dedicated_bearer(&imsi, lbi, &r.ebis, self.logger)
            .await;
        if let Err(e) = result {
            self.send_s11(S11Outbound::DeleteBearerFailureIndication(
                build::delete_bearer_failure_indication(&r, Cause::SystemFailure),
            ))
            .await;
            bail!("PCEF delete dedicated bearer failed - {e}");
        }
        Ok(())
    }
}
