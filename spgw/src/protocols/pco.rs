//! pco - answer the protocol configuration options of a Create Session Request
use crate::Config;
use crate::messages::{Pco, PcoOption};
use anyhow::{Result, bail, ensure};
use std::net::Ipv4Addr;

// TS24.008, 10.5.6.3
pub const PCO_PI_IPCP: u16 = 0x8021;
pub const PCO_CI_P_CSCF_IPV6_ADDRESS: u16 = 0x0001;
pub const PCO_CI_DNS_SERVER_IPV6_ADDRESS: u16 = 0x0003;
pub const PCO_CI_IP_ADDRESS_ALLOCATION_VIA_NAS_SIGNALLING: u16 = 0x000a;
pub const PCO_CI_P_CSCF_IPV4_ADDRESS: u16 = 0x000c;
pub const PCO_CI_DNS_SERVER_IPV4_ADDRESS: u16 = 0x000d;
pub const PCO_CI_IPV4_LINK_MTU: u16 = 0x0010;

// RFC1332 / RFC1877
const IPCP_CODE_CONFIGURE_REQUEST: u8 = 1;
const IPCP_CODE_CONFIGURE_ACK: u8 = 2;
const IPCP_CODE_CONFIGURE_NACK: u8 = 3;
const IPCP_OPTION_PRIMARY_DNS: u8 = 0x81;
const IPCP_OPTION_SECONDARY_DNS: u8 = 0x83;
const IPCP_HEADER_LEN: usize = 4;
const IPCP_DNS_OPTION_LEN: usize = 6;

pub fn process_pco_request(request: &Pco, config: &Config) -> Result<Pco> {
    let mut response = Pco::default();
    let mut dns_sent = false;
    let mut mtu_sent = false;

    for option in request.options.iter() {
        match option.id {
            PCO_PI_IPCP => {
                if let Some(ipcp) = process_ipcp(&option.contents, config)? {
                    response.options.push(ipcp);
                }
            }
            PCO_CI_DNS_SERVER_IPV4_ADDRESS => {
                response.options.push(dns_server_ipv4(config.dns_primary));
                dns_sent = true;
            }
            PCO_CI_DNS_SERVER_IPV6_ADDRESS => {
                if let Some(dns) = config.dns_ipv6 {
                    response.options.push(PcoOption {
                        id: PCO_CI_DNS_SERVER_IPV6_ADDRESS,
                        contents: dns.octets().to_vec(),
                    });
                }
            }
            PCO_CI_IPV4_LINK_MTU => {
                response.options.push(link_mtu(config.mtu));
                mtu_sent = true;
            }
            PCO_CI_P_CSCF_IPV4_ADDRESS => {
                if let Some(pcscf) = config.pcscf {
                    response.options.push(PcoOption {
                        id: PCO_CI_P_CSCF_IPV4_ADDRESS,
                        contents: pcscf.octets().to_vec(),
                    });
                }
            }
            PCO_CI_P_CSCF_IPV6_ADDRESS => {
                if let Some(pcscf) = config.pcscf_ipv6 {
                    response.options.push(PcoOption {
                        id: PCO_CI_P_CSCF_IPV6_ADDRESS,
                        contents: pcscf.octets().to_vec(),
                    });
                }
            }
            // The address is always delivered in the PAA.
            PCO_CI_IP_ADDRESS_ALLOCATION_VIA_NAS_SIGNALLING => {}
            _ => {}
        }
    }

    if config.force_push_pco {
        if !dns_sent {
            response.options.push(dns_server_ipv4(config.dns_primary));
        }
        if !mtu_sent {
            response.options.push(link_mtu(config.mtu));
        }
    }

    Ok(response)
}

fn dns_server_ipv4(dns: Ipv4Addr) -> PcoOption {
    PcoOption {
        id: PCO_CI_DNS_SERVER_IPV4_ADDRESS,
        contents: dns.octets().to_vec(),
    }
}

fn link_mtu(mtu: u16) -> PcoOption {
    PcoOption {
        id: PCO_CI_IPV4_LINK_MTU,
        contents: mtu.to_be_bytes().to_vec(),
    }
}

// Answer an IPCP Configure-Request with the configured DNS servers.  The answer is
// an Ack if the UE already asked for exactly those servers, otherwise a Nak.
fn process_ipcp(contents: &[u8], config: &Config) -> Result<Option<PcoOption>> {
    ensure!(
        contents.len() >= IPCP_HEADER_LEN,
        "IPCP container too short: {} bytes",
        contents.len()
    );
    let code = contents[0];
    let identifier = contents[1];
    let length = u16::from_be_bytes([contents[2], contents[3]]) as usize;
    ensure!(
        length >= IPCP_HEADER_LEN && length <= contents.len(),
        "IPCP length {length} inconsistent with container of {} bytes",
        contents.len()
    );
    if code != IPCP_CODE_CONFIGURE_REQUEST {
        return Ok(None);
    }

    let mut requested_primary = None;
    let mut requested_secondary = None;
    let mut options = &contents[IPCP_HEADER_LEN..length];
    while !options.is_empty() {
        ensure!(options.len() >= 2, "Truncated IPCP option");
        let (option_type, option_len) = (options[0], options[1] as usize);
        if option_len < 2 || option_len > options.len() {
            bail!("IPCP option {option_type:#04x} has bad length {option_len}");
        }
        if option_len == IPCP_DNS_OPTION_LEN {
            let addr = Ipv4Addr::new(options[2], options[3], options[4], options[5]);
            match option_type {
                IPCP_OPTION_PRIMARY_DNS => requested_primary = Some(addr),
                IPCP_OPTION_SECONDARY_DNS => requested_secondary = Some(addr),
                _ => {}
            }
        }
        options = &options[option_len..];
    }

    let code = if requested_primary == Some(config.dns_primary)
        && requested_secondary == Some(config.dns_secondary)
    {
        IPCP_CODE_CONFIGURE_ACK
    } else {
        IPCP_CODE_CONFIGURE_NACK
    };

    let total_len = (IPCP_HEADER_LEN + 2 * IPCP_DNS_OPTION_LEN) as u16;
    let mut response = vec![code, identifier];
    response.extend_from_slice(&total_len.to_be_bytes());
    response.extend_from_slice(&[IPCP_OPTION_PRIMARY_DNS, IPCP_DNS_OPTION_LEN as u8]);
    response.extend_from_slice(&config.dns_primary.octets());
    response.extend_from_slice(&[IPCP_OPTION_SECONDARY_DNS, IPCP_DNS_OPTION_LEN as u8]);
    response.extend_from_slice(&config.dns_secondary.octets());

    Ok(Some(PcoOption {
        id: PCO_PI_IPCP,
        contents: response,
    }))
}
