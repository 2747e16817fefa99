use anyhow::Result;
use serde::Deserialize;
use slog::{Logger, error, info};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    // Local S11 control plane address, signaled in the SGW S11 F-TEID.
    pub s11_ip: IpAddr,

    // Local S1-U address, signaled in the SGW S1-U F-TEIDs.
    pub s1u_ip: IpAddr,

    // Local S5/S8 user plane address, used towards a roaming PGW.
    pub s5s8_up_ip: IpAddr,

    // UE subnet served by the local IP pool.
    pub ue_subnet: Ipv4Addr,
    pub ue_subnet_prefix_len: u8,

    // APN-AMBR granted on accept, in bit/s.
    pub apn_ambr_dl: u64,
    pub apn_ambr_ul: u64,

    // Values offered in PCO responses.
    pub dns_primary: Ipv4Addr,
    pub dns_secondary: Ipv4Addr,
    pub dns_ipv6: Option<Ipv6Addr>,
    pub pcscf: Option<Ipv4Addr>,
    pub pcscf_ipv6: Option<Ipv6Addr>,
    pub mtu: u16,

    // Send DNS and MTU in the PCO response even when the UE did not ask.
    pub force_push_pco: bool,

    // Whether IPv6 and IPv4v6 PDN types are served.
    pub ipv6_enabled: bool,

    // Accept a non-EUTRAN RAT type with a warning rather than rejecting.
    pub relaxed_rat_check: bool,
}

impl Default for Config {
    fn default() -> Self {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        Config {
            s11_ip: localhost,
            s1u_ip: localhost,
            s5s8_up_ip: localhost,
            ue_subnet: Ipv4Addr::new(10, 255, 0, 0),
            ue_subnet_prefix_len: 24,
            apn_ambr_dl: 100_000_000,
            apn_ambr_ul: 40_000_000,
            dns_primary: Ipv4Addr::new(8, 8, 8, 8),
            dns_secondary: Ipv4Addr::new(8, 8, 4, 4),
            dns_ipv6: None,
            pcscf: None,
            pcscf_ipv6: None,
            mtu: 1400,
            force_push_pco: false,
            ipv6_enabled: false,
            relaxed_rat_check: true,
        }
    }
}

/// Load the gateway config from a TOML file.  Absent fields take their defaults.
pub fn load_config_file(filename: &str, logger: &Logger) -> Result<Config> {
    let path = std::env::current_dir()?;
    let contents = fs::read_to_string(filename).inspect_err(|e| {
        error!(
            logger,
            "Failed to load config file {filename} (current directory {}) with error code {e}",
            path.display()
        )
    })?;
    let config: Config = toml::from_str(&contents)?;
    info!(logger, "Loaded config from {filename}");
    Ok(config)
}
