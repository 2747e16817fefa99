use crate::data::{SessionSnapshot, Teid};
use crate::messages::{PolicyMessage, S8Inbound, S11Inbound};
use crate::procedures::{
    S8Message, S8MessageHandler, SpgwMessage, SpgwMessageHandler, StateSummary,
};
use crate::HandlerApi;
use anyhow::Result;
use async_channel::Sender;
use async_std::sync::Mutex;
use async_std::task::JoinHandle;
use slog::{Logger, info, o};
use std::sync::Arc;
use stop_token::StopSource;

/// Handle on a running gateway: the SPGW actor serving locally terminated PDN
/// connections and the roaming actor serving PDN connections whose PGW is
/// reached through the roaming proxy.
#[derive(Clone)]
pub struct Spgw {
    logger: Logger,
    spgw_sender: Sender<SpgwMessage>,
    s8_sender: Sender<S8Message>,
    stop_source: Arc<Mutex<Option<StopSource>>>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Spgw {
    pub fn start<A: HandlerApi>(api: A, logger: Logger) -> Self {
        let stop_source = StopSource::new();
        let (spgw_sender, spgw_task) = SpgwMessageHandler::spawn(
            api.clone(),
            stop_source.token(),
            logger.new(o!("actor" => "spgw")),
        );
        let (s8_sender, s8_task) =
            S8MessageHandler::spawn(api, stop_source.token(), logger.new(o!("actor" => "s8")));
        info!(logger, "Started");
        Spgw {
            logger,
            spgw_sender,
            s8_sender,
            stop_source: Arc::new(Mutex::new(Some(stop_source))),
            tasks: Arc::new(Mutex::new(vec![spgw_task, s8_task])),
        }
    }

    /// Pass an S11 message for a locally terminated PDN connection.
    pub async fn dispatch_s11(&self, message: S11Inbound) -> Result<()> {
        self.spgw_sender.send(SpgwMessage::S11(message)).await?;
        Ok(())
    }

    /// Pass an S11 message for a PDN connection anchored on a roaming PGW.
    pub async fn dispatch_s11_roaming(&self, message: S11Inbound) -> Result<()> {
        self.s8_sender.send(S8Message::S11(message)).await?;
        Ok(())
    }

    pub async fn dispatch_policy(&self, message: PolicyMessage) -> Result<()> {
        self.spgw_sender.send(SpgwMessage::Policy(message)).await?;
        Ok(())
    }

    pub async fn dispatch_s8(&self, message: S8Inbound) -> Result<()> {
        self.s8_sender.send(S8Message::Proxy(message)).await?;
        Ok(())
    }

    pub async fn sessions(&self) -> Result<Vec<SessionSnapshot>> {
        Ok(self.spgw_status().await?.sessions)
    }

    pub async fn session(&self, teid: Teid) -> Result<Option<SessionSnapshot>> {
        Ok(self
            .sessions()
            .await?
            .into_iter()
            .find(|s| s.sgw_s11_teid == teid))
    }

    pub async fn roaming_sessions(&self) -> Result<Vec<SessionSnapshot>> {
        Ok(self.s8_status().await?.sessions)
    }

    /// Roaming sessions still waiting for the proxy to assign a TEID.
    pub async fn roaming_temporary_procedures(&self) -> Result<usize> {
        Ok(self.s8_status().await?.temporary_procedures)
    }

    async fn spgw_status(&self) -> Result<StateSummary> {
        let (sender, receiver) = async_channel::bounded(1);
        self.spgw_sender.send(SpgwMessage::Status(sender)).await?;
        Ok(receiver.recv().await?)
    }

    async fn s8_status(&self) -> Result<StateSummary> {
        let (sender, receiver) = async_channel::bounded(1);
        self.s8_sender.send(S8Message::Status(sender)).await?;
        Ok(receiver.recv().await?)
    }

    pub async fn graceful_shutdown(self) {
        info!(&self.logger, "Shutting down");
        // Dropping the stop source ends both message loops.
        self.stop_source.lock().await.take();
        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        for task in tasks {
            task.await;
        }
    }
}
