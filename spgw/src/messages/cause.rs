use serde::{Deserialize, Serialize};

/// GTPv2-C cause values (TS29.274, 8.4) used by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cause {
    RequestAccepted = 16,
    ContextNotFound = 64,
    ServiceNotSupported = 68,
    SystemFailure = 72,
    AllDynamicAddressesAreOccupied = 84,
    ServiceDenied = 89,
    RequestRejected = 94,
    InvalidPeer = 109,
}

impl Cause {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn is_accepted(self) -> bool {
        self == Cause::RequestAccepted
    }
}
