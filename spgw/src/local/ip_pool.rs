use crate::messages::{IpAllocationFailure, IpAllocationRequest, IpAllocationResult, Paa, PdnType};
use anyhow::{Result, ensure};
use async_std::sync::Mutex;
use index_pool::IndexPool;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Hands out host addresses of an IPv4 subnet.  Host 0 is never allocated and
/// neither is the broadcast address.
#[derive(Clone)]
pub struct IpPool {
    index_pool: Arc<Mutex<IndexPool>>,
    subnet: u32,
    hosts: usize,
}

impl IpPool {
    pub fn new(subnet: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        ensure!(
            (8..=30).contains(&prefix_len),
            "UE subnet prefix length {prefix_len} out of range 8-30"
        );
        let subnet = u32::from(subnet);
        let host_mask = u32::MAX >> prefix_len;
        ensure!(
            subnet & host_mask == 0,
            "UE subnet {} has host bits set",
            Ipv4Addr::from(subnet)
        );

        let mut index_pool = IndexPool::new();
        // Take the 0 slot, so that the first UE gets an IP address ending in .1.
        let _ = index_pool.request_id(0);
        Ok(IpPool {
            index_pool: Arc::new(Mutex::new(index_pool)),
            subnet,
            hosts: host_mask as usize,
        })
    }

    pub async fn allocate(&self, request: &IpAllocationRequest) -> IpAllocationResult {
        if request.pdn_type != PdnType::Ipv4 {
            return IpAllocationResult::Failed(IpAllocationFailure::PdnTypeNotSupported);
        }
        let mut pool = self.index_pool.lock().await;

        // Honour a statically requested address if it is ours and free.
        if let Some(requested) = request.requested.as_ref().and_then(|paa| paa.ipv4) {
            if let Some(idx) = self.index_of(requested) {
                if pool.request_id(idx).is_ok() {
                    return IpAllocationResult::Allocated(Paa::ipv4(requested));
                }
            }
        }

        let idx = pool.new_id();
        if idx >= self.hosts {
            let _ = pool.return_id(idx);
            return IpAllocationResult::Failed(IpAllocationFailure::PoolExhausted);
        }
        IpAllocationResult::Allocated(Paa::ipv4(self.address_of(idx)))
    }

    /// Give an address back.  Returns false if it was not allocated.
    pub async fn release(&self, addr: Ipv4Addr) -> bool {
        let Some(idx) = self.index_of(addr) else {
            return false;
        };
        self.index_pool.lock().await.return_id(idx).is_ok()
    }

    fn index_of(&self, addr: Ipv4Addr) -> Option<usize> {
        let idx = u32::from(addr).checked_sub(self.subnet)? as usize;
        (idx > 0 && idx < self.hosts).then_some(idx)
    }

    fn address_of(&self, idx: usize) -> Ipv4Addr {
        Ipv4Addr::from(self.subnet + idx as u32)
    }
}
