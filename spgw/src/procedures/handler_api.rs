use crate::data::{Ebi, Imsi, SessionSnapshot};
use crate::messages::*;
use crate::Config;
use anyhow::Result;
use async_trait::async_trait;
use slog::Logger;

/// Trait representing the collection of services needed by the gateway handlers.
#[async_trait]
pub trait HandlerApi: Send + Sync + Clone + 'static {
    fn config(&self) -> &Config;

    // MME facing transport.
    async fn send_to_mme(&self, message: S11Outbound, logger: &Logger) -> Result<()>;

    // IP address allocation.  Release is idempotent.
    async fn allocate_ue_address(
        &self,
        request: IpAllocationRequest,
        logger: &Logger,
    ) -> IpAllocationResult;
    async fn release_ue_address(
        &self,
        imsi: &Imsi,
        apn: &str,
        paa: &Paa,
        logger: &Logger,
    ) -> Result<()>;

    // Policy and charging enforcement.
    async fn pcef_create_session(
        &self,
        params: PcefSessionParams,
        logger: &Logger,
    ) -> PcefCreateSessionResult;
    async fn pcef_end_session(&self, imsi: &Imsi, apn: &str, logger: &Logger) -> Result<()>;
    async fn pcef_send_policy_binding(&self, binding: PolicyBinding, logger: &Logger)
    -> Result<()>;
    async fn pcef_delete_dedicated_bearer(
        &self,
        imsi: &Imsi,
        lbi: Ebi,
        ebis: &[Ebi],
        logger: &Logger,
    ) -> Result<()>;
    async fn pcef_report_bearer_deactivation(
        &self,
        report: BearerDeactivationReport,
        logger: &Logger,
    ) -> Result<()>;

    // Data plane programming.  All best effort.
    async fn add_tunnel(&self, tunnel: &Tunnel, logger: &Logger) -> Result<()>;
    async fn del_tunnel(&self, tunnel: &Tunnel, logger: &Logger) -> Result<()>;
    async fn send_end_marker(&self, tunnel: &Tunnel, logger: &Logger) -> Result<()>;
    async fn add_paging_rule(&self, imsi: &Imsi, ue: UeAddress, logger: &Logger) -> Result<()>;
    async fn delete_paging_rule(&self, imsi: &Imsi, ue: UeAddress, logger: &Logger)
    -> Result<()>;
    async fn discard_data_on_tunnel(&self, tunnel: &Tunnel, logger: &Logger) -> Result<()>;
    async fn forward_data_on_tunnel(&self, tunnel: &Tunnel, logger: &Logger) -> Result<()>;

    // Roaming proxy.
    async fn send_to_proxy(&self, message: S8Outbound, logger: &Logger) -> Result<()>;

    // Write-through persistence.
    async fn put_snapshot(&self, key: &str, snapshot: SessionSnapshot, logger: &Logger)
    -> Result<()>;
    async fn delete_snapshot(&self, key: &str, logger: &Logger) -> Result<()>;
}
