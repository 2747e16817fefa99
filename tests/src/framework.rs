use super::MockNetwork;
use anyhow::Result;
use slog::{Drain, Logger, o};
use spgw::*;
use std::net::{IpAddr, Ipv4Addr};

pub const ENB_IP: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 2);
pub const OTHER_ENB_IP: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 4);
pub const PGW_IP: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 5);

pub async fn init() -> Result<(Spgw, MockNetwork, Logger)> {
    let logger = init_logging();
    let network = MockNetwork::new(test_config(), &logger);
    let spgw = Spgw::start(network.clone(), logger.new(o!("spgw" => 1)));
    Ok((spgw, network, logger))
}

pub fn test_config() -> Config {
    Config {
        s11_ip: "127.0.0.1".parse().unwrap(),
        s1u_ip: "127.0.0.1".parse().unwrap(),
        s5s8_up_ip: "127.0.0.1".parse().unwrap(),
        ue_subnet: Ipv4Addr::new(10, 255, 0, 0),
        relaxed_rat_check: false,
        ..Config::default()
    }
}

fn init_logging() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build();
    let drain = std::sync::Mutex::new(drain).fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}

/// A downlink filter matching traffic from one server port.
pub fn tft(identifier: u8, precedence: u8) -> TrafficFlowTemplate {
    TrafficFlowTemplate {
        packet_filters: vec![PacketFilter {
            identifier,
            direction: FilterDirection::Downlink,
            precedence,
            contents: vec![0x50, 0x1f, 0x90],
        }],
    }
}

pub fn gbr_qos() -> BearerQos {
    BearerQos {
        qci: 1,
        priority_level: 2,
        pre_emption_capability: true,
        pre_emption_vulnerability: false,
        mbr: BitRate {
            uplink: 128_000,
            downlink: 128_000,
        },
        gbr: BitRate {
            uplink: 64_000,
            downlink: 64_000,
        },
    }
}

pub fn activate_bearer_request(imsi: Imsi, lbi: Ebi, rule: &str) -> PolicyMessage {
    PolicyMessage::ActivateBearerRequest(ActivateBearerRequest {
        imsi,
        lbi,
        policy_rule_name: rule.to_string(),
        ul_tft: tft(1, 10),
        dl_tft: tft(1, 10),
        qos: gbr_qos(),
    })
}

pub fn deactivate_bearer_request(imsi: Imsi, lbi: Ebi, ebis: Vec<Ebi>) -> PolicyMessage {
    PolicyMessage::DeactivateBearerRequest(DeactivateBearerRequest { imsi, lbi, ebis })
}

pub fn pgw_fteid(interface_type: InterfaceType, teid: Teid) -> Fteid {
    Fteid::new(interface_type, teid, IpAddr::V4(PGW_IP))
}

pub const PGW_CP_TEID: Teid = 0x8000;
pub const PGW_UP_TEID: Teid = 0x8001;

/// The proxy's acceptance of a roaming Create Session Request.
pub fn s8_create_session_accept(
    r: &S8CreateSessionRequest,
    context_teid: Teid,
    ue_ip: Ipv4Addr,
) -> S8Inbound {
    S8Inbound::CreateSessionResponse(S8CreateSessionResponse {
        correlation_id: r.correlation_id,
        context_teid,
        cause: Cause::RequestAccepted,
        pgw_s8_cp_fteid: Some(pgw_fteid(InterfaceType::S5S8PgwGtpC, PGW_CP_TEID)),
        paa: Some(Paa::ipv4(ue_ip)),
        pco: None,
        bearer_context: S8BearerContextCreated {
            ebi: r.bearer_context.ebi,
            cause: Cause::RequestAccepted,
            pgw_s8_up_fteid: Some(pgw_fteid(InterfaceType::S5S8PgwGtpU, PGW_UP_TEID)),
            qos: None,
        },
    })
}

pub fn s8_create_bearer_request(context_teid: Teid, lbi: Ebi, sequence_number: u32) -> S8Inbound {
    S8Inbound::CreateBearerRequest(S8CreateBearerRequest {
        context_teid,
        lbi,
        sequence_number,
        pgw_cp_address: "pgw-1.example".to_string(),
        bearer_context: S8BearerContextToBeActivated {
            tft: tft(2, 20),
            qos: gbr_qos(),
            pgw_s8_up_fteid: pgw_fteid(InterfaceType::S5S8PgwGtpU, PGW_UP_TEID + 1),
            pco: None,
        },
    })
}

pub fn s8_delete_bearer_request(context_teid: Teid, ebis: Vec<Ebi>, sequence_number: u32) -> S8Inbound {
    S8Inbound::DeleteBearerRequest(S8DeleteBearerRequest {
        context_teid,
        sequence_number,
        pgw_cp_address: "pgw-2.example".to_string(),
        ebis,
    })
}
