//! ies - information elements shared by the S11, S8, Gx and Sgi records

use super::Cause;
use crate::data::{Ebi, Teid};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterfaceType {
    S1uEnbGtpU,
    S1uSgwGtpU,
    S5S8SgwGtpU,
    S5S8PgwGtpU,
    S5S8SgwGtpC,
    S5S8PgwGtpC,
    S11MmeGtpC,
    S11S4SgwGtpC,
}

/// Fully qualified TEID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fteid {
    pub interface_type: InterfaceType,
    pub teid: Teid,
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
}

impl Fteid {
    pub fn new(interface_type: InterfaceType, teid: Teid, ip: IpAddr) -> Self {
        let (ipv4, ipv6) = match ip {
            IpAddr::V4(v4) => (Some(v4), None),
            IpAddr::V6(v6) => (None, Some(v6)),
        };
        Fteid {
            interface_type,
            teid,
            ipv4,
            ipv6,
        }
    }

    pub fn has_address(&self) -> bool {
        self.ipv4.is_some() || self.ipv6.is_some()
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ipv4
            .map(IpAddr::V4)
            .or_else(|| self.ipv6.map(IpAddr::V6))
    }

    pub fn same_address(&self, other: &Fteid) -> bool {
        self.ipv4 == other.ipv4 && self.ipv6 == other.ipv6
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdnType {
    Ipv4,
    Ipv6,
    Ipv4v6,
}

impl PdnType {
    pub fn has_ipv4(self) -> bool {
        matches!(self, PdnType::Ipv4 | PdnType::Ipv4v6)
    }

    pub fn has_ipv6(self) -> bool {
        matches!(self, PdnType::Ipv6 | PdnType::Ipv4v6)
    }
}

/// PDN address allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paa {
    pub pdn_type: PdnType,
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
    pub ipv6_prefix_len: u8,
}

impl Paa {
    pub fn ipv4(addr: Ipv4Addr) -> Self {
        Paa {
            pdn_type: PdnType::Ipv4,
            ipv4: Some(addr),
            ipv6: None,
            ipv6_prefix_len: 0,
        }
    }

    pub fn ue_address(&self) -> UeAddress {
        UeAddress {
            ipv4: self.ipv4,
            ipv6: if self.pdn_type.has_ipv6() {
                self.ipv6
            } else {
                None
            },
        }
    }
}

/// The UE side of a tunnel, as used by paging rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UeAddress {
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
}

impl UeAddress {
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatType {
    Utran,
    Geran,
    Wlan,
    Eutran,
    EutranNbIot,
    Nr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BitRate {
    pub uplink: u64,
    pub downlink: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BearerQos {
    pub qci: u8,
    pub priority_level: u8,
    pub pre_emption_capability: bool,
    pub pre_emption_vulnerability: bool,
    pub mbr: BitRate,
    pub gbr: BitRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterDirection {
    PreRel7,
    Downlink,
    Uplink,
    Bidirectional,
}

/// One TFT packet filter.  The filter components are carried opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketFilter {
    pub identifier: u8,
    pub direction: FilterDirection,
    pub precedence: u8,
    #[serde(with = "hex")]
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrafficFlowTemplate {
    pub packet_filters: Vec<PacketFilter>,
}

impl TrafficFlowTemplate {
    pub fn is_empty(&self) -> bool {
        self.packet_filters.is_empty()
    }
}

/// Protocol configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pco {
    pub options: Vec<PcoOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcoOption {
    pub id: u16,
    #[serde(with = "hex")]
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServingNetwork {
    pub mcc: String,
    pub mnc: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndicationFlags {
    // Operation indication: forward the request to the PGW.
    pub oi: bool,
    // Scope indication.
    pub si: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerCause {
    pub ebi: Ebi,
    pub cause: Cause,
}

impl BearerCause {
    pub fn new(ebi: Ebi, cause: Cause) -> Self {
        BearerCause { ebi, cause }
    }
}
