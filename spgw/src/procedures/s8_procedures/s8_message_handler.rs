//! s8_message_handler - task owning the roaming sessions

use super::*;
use crate::HandlerApi;
use crate::data::{ROAMING_USER_PLANE_TEIDS, SessionSnapshot, SgwState};
use crate::messages::*;
use crate::procedures::spgw_procedures::{
    ModifyBearerProcedure, ReleaseAccessBearersProcedure, SuspendNotificationProcedure,
};
use crate::procedures::{SessionProcedure, StateSummary};
use crate::protocols::s11::build;
use anyhow::{Result, bail};
use async_channel::{Receiver, Sender};
use async_std::prelude::*;
use async_std::task::JoinHandle;
use slog::{Logger, info, o, warn};
use stop_token::StopToken;
use stop_token::prelude::*;

/// Input to the roaming actor.
#[derive(Debug)]
pub enum S8Message {
    S11(S11Inbound),
    Proxy(S8Inbound),
    Status(Sender<StateSummary>),
}

/// Owns the sessions whose PGW is reached through the roaming proxy.
pub struct S8MessageHandler<A: HandlerApi> {
    receiver: Receiver<S8Message>,
    api: A,
    state: SgwState,
    logger: Logger,
}

impl<A: HandlerApi> S8MessageHandler<A> {
    pub fn spawn(api: A, stop_token: StopToken, logger: Logger) -> (Sender<S8Message>, JoinHandle<()>) {
        let (sender, receiver) = async_channel::unbounded();
        let handler = S8MessageHandler {
            receiver,
            api,
            state: SgwState::new(ROAMING_USER_PLANE_TEIDS),
            logger,
        };
        let task = async_std::task::spawn(handler.run(stop_token));
        (sender, task)
    }

    async fn run(mut self, stop_token: StopToken) {
        let receiver = self.receiver.clone();
        let mut messages = std::pin::pin!(receiver.timeout_at(stop_token));
        while let Some(Ok(message)) = messages.next().await {
            if let Err(e) = self.handle(message).await {
                warn!(self.logger, "Roaming procedure failed - {e}");
            }
        }
        info!(
            self.logger,
            "S8 message handler exiting with {} sessions, {} pending creates and {} unanswered proxy requests",
            self.state.store.len(),
            self.state.temporary.len(),
            self.state.proxy_transactions.len()
        );
    }

    async fn handle(&mut self, message: S8Message) -> Result<()> {
        let message = match message {
            S8Message::Status(reply) => {
                let _ = reply
                    .send(StateSummary {
                        sessions: self.state.store.iter().map(SessionSnapshot::from).collect(),
                        temporary_procedures: self.state.temporary.len(),
                    })
                    .await;
                return Ok(());
            }
            message => message,
        };
        let logger = match &message {
            S8Message::S11(S11Inbound::CreateSessionRequest(r)) => {
                self.logger.new(o!("imsi" => r.imsi.to_string()))
            }
            _ => self.logger.clone(),
        };
        let procedure = SessionProcedure::new(&self.api, &mut self.state, &logger);
        match message {
            S8Message::S11(S11Inbound::CreateSessionRequest(r)) => {
                S8CreateSessionProcedure::new(procedure).run(r).await
            }
            S8Message::Proxy(S8Inbound::CreateSessionResponse(r)) => {
                S8CreateSessionProcedure::new(procedure)
                    .create_session_response(r)
                    .await
            }
            S8Message::S11(S11Inbound::ModifyBearerRequest(r)) => {
                ModifyBearerProcedure::new(procedure).run(r).await
            }
            S8Message::S11(S11Inbound::ReleaseAccessBearersRequest(r)) => {
                ReleaseAccessBearersProcedure::new(procedure).run(r).await
            }
            S8Message::S11(S11Inbound::SuspendNotification(r)) => {
                SuspendNotificationProcedure::new(procedure).run(r).await
            }
            S8Message::S11(S11Inbound::DeleteSessionRequest(r)) => {
                S8DeleteSessionProcedure::new(procedure).run(r).await
            }
            S8Message::Proxy(S8Inbound::DeleteSessionResponse(r)) => {
                S8DeleteSessionProcedure::new(procedure)
                    .delete_session_response(r)
                    .await
            }
            S8Message::Proxy(S8Inbound::CreateBearerRequest(r)) => {
                S8CreateBearerProcedure::new(procedure).run(r).await
            }
            S8Message::S11(S11Inbound::CreateBearerResponse(r)) => {
                S8CreateBearerProcedure::new(procedure)
                    .create_bearer_response(r)
                    .await
            }
            S8Message::Proxy(S8Inbound::DeleteBearerRequest(r)) => {
                S8DeleteBearerProcedure::new(procedure).run(r).await
            }
            S8Message::S11(S11Inbound::DeleteBearerResponse(r)) => {
                S8DeleteBearerProcedure::new(procedure)
                    .delete_bearer_response(r)
                    .await
            }
            S8Message::S11(S11Inbound::DeleteBearerCommand(r)) => {
                // Bearer removal on a roaming PDN connection is driven by the PGW.
                procedure
                    .send_s11(S11Outbound::DeleteBearerFailureIndication(
                        build::delete_bearer_failure_indication(&r, Cause::ServiceNotSupported),
                    ))
                    .await;
                bail!("Delete Bearer Command not supported for roaming sessions")
            }
            S8Message::Status(_) => Ok(()),
        }
    }
}
