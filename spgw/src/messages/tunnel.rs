use super::PacketFilter;
use crate::data::{Ebi, Imsi, Teid};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// One GTP-U forwarding rule as handed to the data plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Tunnel {
    pub imsi: Imsi,
    pub ebi: Ebi,
    pub ue_ipv4: Option<Ipv4Addr>,
    pub ue_ipv6: Option<Ipv6Addr>,
    pub enb_ip: Option<IpAddr>,
    pub enb_teid: Teid,
    pub sgw_s1u_teid: Teid,
    pub s8: Option<S8Leg>,
    pub flow: Option<PacketFilter>,
    pub precedence: u32,
}

/// The PGW facing half of a roaming tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S8Leg {
    pub pgw_ip: Option<IpAddr>,
    pub pgw_teid: Teid,
    pub sgw_s8u_teid: Teid,
}
