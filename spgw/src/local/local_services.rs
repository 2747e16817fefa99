use super::{IpPool, MemoryStateStore};
use crate::data::{Ebi, Imsi, SessionSnapshot};
use crate::messages::*;
use crate::{Config, HandlerApi};
use anyhow::{Result, bail};
use async_trait::async_trait;
use slog::{Logger, debug, info};

/// Collaborators for standalone operation: a local UE address pool, an
/// in-memory snapshot store, a PCEF that accepts everything, and a data plane
/// and MME transport that only log.
#[derive(Clone)]
pub struct LocalServices {
    config: Config,
    ip_pool: IpPool,
    state_store: MemoryStateStore,
}

impl LocalServices {
    pub fn new(config: Config) -> Result<Self> {
        let ip_pool = IpPool::new(config.ue_subnet, config.ue_subnet_prefix_len)?;
        Ok(LocalServices {
            config,
            ip_pool,
            state_store: MemoryStateStore::new(),
        })
    }

    pub fn state_store(&self) -> &MemoryStateStore {
        &self.state_store
    }
}

#[async_trait]
impl HandlerApi for LocalServices {
    fn config(&self) -> &Config {
        &self.config
    }

    async fn send_to_mme(&self, message: S11Outbound, logger: &Logger) -> Result<()> {
        debug!(logger, "S11 transport: {:?}", message);
        Ok(())
    }

    async fn allocate_ue_address(
        &self,
        request: IpAllocationRequest,
        logger: &Logger,
    ) -> IpAllocationResult {
        let result = self.ip_pool.allocate(&request).await;
        info!(logger, "Address allocation for IMSI {}: {:?}", request.imsi, result);
        result
    }

    async fn release_ue_address(
        &self,
        imsi: &Imsi,
        apn: &str,
        paa: &Paa,
        logger: &Logger,
    ) -> Result<()> {
        if let Some(addr) = paa.ipv4 {
            if self.ip_pool.release(addr).await {
                info!(logger, "Released {addr} of IMSI {imsi} APN {apn}");
            } else {
                debug!(logger, "{addr} was not allocated");
            }
        }
        Ok(())
    }

    async fn pcef_create_session(
        &self,
        params: PcefSessionParams,
        logger: &Logger,
    ) -> PcefCreateSessionResult {
        info!(
            logger,
            "PCEF session for IMSI {} APN {} accepted", params.imsi, params.apn
        );
        PcefCreateSessionResult::accepted()
    }

    async fn pcef_end_session(&self, imsi: &Imsi, apn: &str, logger: &Logger) -> Result<()> {
        info!(logger, "PCEF session for IMSI {imsi} APN {apn} ended");
        Ok(())
    }

    async fn pcef_send_policy_binding(&self, binding: PolicyBinding, logger: &Logger) -> Result<()> {
        info!(logger, "Policy binding {:?}", binding);
        Ok(())
    }

    async fn pcef_delete_dedicated_bearer(
        &self,
        imsi: &Imsi,
        lbi: Ebi,
        ebis: &[Ebi],
        logger: &Logger,
    ) -> Result<()> {
        info!(logger, "PCEF asked to delete bearers {ebis:?} of IMSI {imsi} LBI {lbi}");
        Ok(())
    }

    async fn pcef_report_bearer_deactivation(
        &self,
        report: BearerDeactivationReport,
        logger: &Logger,
    ) -> Result<()> {
        info!(logger, "Bearer deactivation {:?}", report);
        Ok(())
    }

    async fn add_tunnel(&self, tunnel: &Tunnel, logger: &Logger) -> Result<()> {
        debug!(logger, "Add tunnel {:?}", tunnel);
        Ok(())
    }

    async fn del_tunnel(&self, tunnel: &Tunnel, logger: &Logger) -> Result<()> {
        debug!(logger, "Delete tunnel {:?}", tunnel);
        Ok(())
    }

    async fn send_end_marker(&self, tunnel: &Tunnel, logger: &Logger) -> Result<()> {
        debug!(logger, "End marker on {:?}", tunnel);
        Ok(())
    }

    async fn add_paging_rule(&self, imsi: &Imsi, ue: UeAddress, logger: &Logger) -> Result<()> {
        debug!(logger, "Add paging rule for IMSI {imsi} {:?}", ue);
        Ok(())
    }

    async fn delete_paging_rule(&self, imsi: &Imsi, ue: UeAddress, logger: &Logger) -> Result<()> {
        debug!(logger, "Delete paging rule for IMSI {imsi} {:?}", ue);
        Ok(())
    }

    async fn discard_data_on_tunnel(&self, tunnel: &Tunnel, logger: &Logger) -> Result<()> {
        debug!(logger, "Discard data on {:?}", tunnel);
        Ok(())
    }

    async fn forward_data_on_tunnel(&self, tunnel: &Tunnel, logger: &Logger) -> Result<()> {
        debug!(logger, "Forward data on {:?}", tunnel);
        Ok(())
    }

    async fn send_to_proxy(&self, message: S8Outbound, _logger: &Logger) -> Result<()> {
        bail!("No roaming proxy configured for {}", message.name());
    }

    async fn put_snapshot(&self, key: &str, snapshot: SessionSnapshot, _logger: &Logger) -> Result<()> {
        self.state_store.put(key, snapshot);
        Ok(())
    }

    async fn delete_snapshot(&self, key: &str, logger: &Logger) -> Result<()> {
        if !self.state_store.delete(key) {
            debug!(logger, "No snapshot under {key}");
        }
        Ok(())
    }
}
