use super::{Cause, Paa, PdnType};
use crate::data::Imsi;

#[derive(Debug, Clone, PartialEq)]
pub struct IpAllocationRequest {
    pub imsi: Imsi,
    pub apn: String,
    pub pdn_type: PdnType,
    // Static address requested by the UE, if any.
    pub requested: Option<Paa>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpAllocationFailure {
    PoolExhausted,
    PdnTypeNotSupported,
    SystemFailure,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IpAllocationResult {
    Allocated(Paa),
    Failed(IpAllocationFailure),
}

impl IpAllocationFailure {
    pub fn cause(self) -> Cause {
        match self {
            IpAllocationFailure::PoolExhausted => Cause::AllDynamicAddressesAreOccupied,
            IpAllocationFailure::PdnTypeNotSupported => Cause::ServiceNotSupported,
            IpAllocationFailure::SystemFailure => Cause::SystemFailure,
        }
    }
}
