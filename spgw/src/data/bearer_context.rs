use super::{Ebi, Imsi, Teid};
use crate::messages::{
    BearerQos, Fteid, InterfaceType, PacketFilter, Paa, S8Leg, TrafficFlowTemplate, Tunnel,
    UeAddress,
};
use std::net::IpAddr;

// Precedence of the catch-all rule installed for a default bearer.
pub const DEFAULT_PRECEDENCE: u32 = 65_535;

// Service data flow of the default non-GBR bearer.
pub const DEFAULT_NON_GBR_SDF_ID: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct BearerContext {
    // Zero while the bearer is still provisional.
    pub ebi: Ebi,
    pub sgw_s1u_teid: Teid,
    pub sgw_s1u_ip: IpAddr,
    // Absent while the UE is idle.
    pub enb: Option<Fteid>,
    pub sgw_s5s8_up: Option<Fteid>,
    pub pgw_s5s8_up: Option<Fteid>,
    pub qos: BearerQos,
    pub tft: TrafficFlowTemplate,
    pub paa: Option<Paa>,
    pub policy_rule_name: Option<String>,
    pub sgw_sequence_number: u32,
    pub pgw_cp_address: Option<String>,
    pub sdf_ids: Vec<u32>,
}

impl BearerContext {
    pub fn new(ebi: Ebi, sgw_s1u_teid: Teid, sgw_s1u_ip: IpAddr, qos: BearerQos) -> Self {
        BearerContext {
            ebi,
            sgw_s1u_teid,
            sgw_s1u_ip,
            enb: None,
            sgw_s5s8_up: None,
            pgw_s5s8_up: None,
            qos,
            tft: TrafficFlowTemplate::default(),
            paa: None,
            policy_rule_name: None,
            sgw_sequence_number: 0,
            pgw_cp_address: None,
            sdf_ids: Vec::new(),
        }
    }

    pub fn sgw_s1u_fteid(&self) -> Fteid {
        Fteid::new(
            InterfaceType::S1uSgwGtpU,
            self.sgw_s1u_teid,
            self.sgw_s1u_ip,
        )
    }

    pub fn ue_address(&self) -> UeAddress {
        self.paa
            .as_ref()
            .map(Paa::ue_address)
            .unwrap_or_default()
    }

    /// Forget the eNB side of the bearer, keeping the core network side.
    pub fn release_enb(&mut self) {
        self.enb = None;
    }

    pub fn add_default_sdf(&mut self) {
        if !self.sdf_ids.contains(&DEFAULT_NON_GBR_SDF_ID) {
            self.sdf_ids.push(DEFAULT_NON_GBR_SDF_ID);
        }
    }

    /// The forwarding rules of this bearer.  A default bearer, or a bearer without
    /// packet filters, has a single catch-all rule; a dedicated bearer has one rule
    /// per downlink packet filter.
    pub fn tunnels(&self, imsi: Imsi, is_default: bool) -> Vec<Tunnel> {
        if is_default || self.tft.is_empty() {
            vec![self.tunnel(imsi, None, DEFAULT_PRECEDENCE)]
        } else {
            self.tft
                .packet_filters
                .iter()
                .map(|f| self.tunnel(imsi, Some(f.clone()), f.precedence as u32))
                .collect()
        }
    }

    fn tunnel(&self, imsi: Imsi, flow: Option<PacketFilter>, precedence: u32) -> Tunnel {
        let ue = self.ue_address();
        let s8 = match (&self.sgw_s5s8_up, &self.pgw_s5s8_up) {
            (Some(sgw), Some(pgw)) => Some(S8Leg {
                pgw_ip: pgw.ip(),
                pgw_teid: pgw.teid,
                sgw_s8u_teid: sgw.teid,
            }),
            _ => None,
        };
        Tunnel {
            imsi,
            ebi: self.ebi,
            ue_ipv4: ue.ipv4,
            ue_ipv6: ue.ipv6,
            enb_ip: self.enb.as_ref().and_then(Fteid::ip),
            enb_teid: self.enb.as_ref().map(|f| f.teid).unwrap_or(0),
            sgw_s1u_teid: self.sgw_s1u_teid,
            s8,
            flow,
            precedence,
        }
    }
}
