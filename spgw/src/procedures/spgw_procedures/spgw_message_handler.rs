//! spgw_message_handler - task owning the sessions anchored on this gateway

use super::*;
use crate::HandlerApi;
use crate::data::{SPGW_USER_PLANE_TEIDS, SessionSnapshot, SgwState, Teid};
use crate::messages::*;
use crate::procedures::{SessionProcedure, StateSummary};
use anyhow::Result;
use async_channel::{Receiver, Sender};
use async_std::prelude::*;
use async_std::task::JoinHandle;
use slog::{Logger, info, o, warn};
use stop_token::StopToken;
use stop_token::prelude::*;

/// Input to the SPGW actor.
#[derive(Debug)]
pub enum SpgwMessage {
    S11(S11Inbound),
    Policy(PolicyMessage),
    IpAllocationComplete {
        teid: Teid,
        request: IpAllocationRequest,
        result: IpAllocationResult,
    },
    PcefCreateSessionComplete {
        teid: Teid,
        request: IpAllocationRequest,
        paa: Paa,
        result: PcefCreateSessionResult,
    },
    Status(Sender<StateSummary>),
}

/// Owns the sessions of locally terminated PDN connections and runs the session
/// and dedicated bearer procedures on them, one message at a time.
pub struct SpgwMessageHandler<A: HandlerApi> {
    receiver: Receiver<SpgwMessage>,
    sender: Sender<SpgwMessage>,
    api: A,
    state: SgwState,
    logger: Logger,
}

impl<A: HandlerApi> SpgwMessageHandler<A> {
    pub fn spawn(api: A, stop_token: StopToken, logger: Logger) -> (Sender<SpgwMessage>, JoinHandle<()>) {
        let (sender, receiver) = async_channel::unbounded();
        let handler = SpgwMessageHandler {
            receiver,
            sender: sender.clone(),
            api,
            state: SgwState::new(SPGW_USER_PLANE_TEIDS),
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
                warn!(self.logger, "Procedure failed - {e}");
            }
        }
        info!(
            self.logger,
            "SPGW message handler exiting with {} sessions",
            self.state.store.len()
        );
    }

    async fn handle(&mut self, message: SpgwMessage) -> Result<()> {
        let message = match message {
            SpgwMessage::Status(reply) => {
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
            SpgwMessage::S11(S11Inbound::CreateSessionRequest(r)) => {
                self.logger.new(o!("imsi" => r.imsi.to_string()))
            }
            SpgwMessage::Policy(PolicyMessage::ActivateBearerRequest(r)) => {
                self.logger.new(o!("imsi" => r.imsi.to_string()))
            }
            SpgwMessage::Policy(PolicyMessage::DeactivateBearerRequest(r)) => {
                self.logger.new(o!("imsi" => r.imsi.to_string()))
            }
            _ => self.logger.clone(),
        };
        let procedure = SessionProcedure::new(&self.api, &mut self.state, &logger);
        match message {
            SpgwMessage::S11(S11Inbound::CreateSessionRequest(r)) => {
                CreateSessionProcedure::new(procedure)
                    .run(r, &self.sender)
                    .await
            }
            SpgwMessage::IpAllocationComplete {
                teid,
                request,
                result,
            } => {
                CreateSessionProcedure::new(procedure)
                    .ip_allocation_complete(teid, request, result, &self.sender)
                    .await
            }
            SpgwMessage::PcefCreateSessionComplete {
                teid,
                request,
                paa,
                result,
            } => {
                CreateSessionProcedure::new(procedure)
                    .pcef_create_session_complete(teid, request, paa, result)
                    .await
            }
            SpgwMessage::S11(S11Inbound::ModifyBearerRequest(r)) => {
                ModifyBearerProcedure::new(procedure).run(r).await
            }
            SpgwMessage::S11(S11Inbound::DeleteSessionRequest(r)) => {
                DeleteSessionProcedure::new(procedure).run(r).await
            }
            SpgwMessage::S11(S11Inbound::ReleaseAccessBearersRequest(r)) => {
                ReleaseAccessBearersProcedure::new(procedure).run(r).await
            }
            SpgwMessage::S11(S11Inbound::SuspendNotification(r)) => {
                SuspendNotificationProcedure::new(procedure).run(r).await
            }
            SpgwMessage::S11(S11Inbound::DeleteBearerCommand(r)) => {
                DeleteBearerCommandProcedure::new(procedure).run(r).await
            }
            SpgwMessage::Policy(PolicyMessage::ActivateBearerRequest(r)) => {
                DedicatedBearerActivationProcedure::new(procedure)
                    .run(r)
                    .await
            }
            SpgwMessage::S11(S11Inbound::CreateBearerResponse(r)) => {
                DedicatedBearerActivationProcedure::new(procedure)
                    .create_bearer_response(r)
                    .await
            }
            SpgwMessage::Policy(PolicyMessage::DeactivateBearerRequest(r)) => {
                DedicatedBearerDeactivationProcedure::new(procedure)
                    .run(r)
                    .await
            }
            SpgwMessage::S11(S11Inbound::DeleteBearerResponse(r)) => {
                DedicatedBearerDeactivationProcedure::new(procedure)
                    .delete_bearer_response(r)
                    .await
            }
            SpgwMessage::Status(_) => Ok(()),
        }
    }
}
