use spgw::*;
use spgw_tests::{DataPlaneEvent, MockMme, MockNetwork, PolicyEvent, framework::*};
use std::net::Ipv4Addr;

const UE_IP: Ipv4Addr = Ipv4Addr::new(10, 99, 0, 7);

async fn establish<'a>(
    mme: &mut MockMme<'a>,
    spgw: &Spgw,
    network: &MockNetwork,
    context_teid: Teid,
) -> anyhow::Result<CreateSessionResponse> {
    let r = mme.create_session_request();
    mme.send_create_session_request(r).await?;
    let s8 = network.receive_s8_create_session_request().await?;
    spgw.dispatch_s8(s8_create_session_accept(&s8, context_teid, UE_IP))
        .await?;
    mme.handle_create_session_accept().await
}

#[async_std::test]
async fn roaming_create_session() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = MockMme::new_roaming("999990000000001", 0x100, &spgw, &network, &logger)?;

    // Request is forwarded to the proxy, the session parked meanwhile
    let r = mme.create_session_request();
    mme.send_create_session_request(r.clone()).await?;
    let s8 = network.receive_s8_create_session_request().await?;
    assert_eq!(s8.imsi, mme.imsi);
    assert_eq!(s8.apn, "internet");
    assert_eq!(s8.ambr, r.ambr);
    assert_eq!(s8.bearer_context.ebi, 5);
    assert_eq!(
        s8.bearer_context.sgw_s8_up_fteid.interface_type,
        InterfaceType::S5S8SgwGtpU
    );
    assert_ne!(s8.correlation_id, 0);
    assert_eq!(spgw.roaming_temporary_procedures().await?, 1);
    assert!(spgw.roaming_sessions().await?.is_empty());

    // Proxy accepts; the session takes the proxy's TEID
    spgw.dispatch_s8(s8_create_session_accept(&s8, 0x7000, UE_IP))
        .await?;
    let response = mme.handle_create_session_accept().await?;
    assert_eq!(mme.sgw_teid, 0x7000);
    assert_eq!(mme.ue_ipv4, Some(UE_IP));
    assert_eq!(response.ambr, Some(r.ambr));
    assert_eq!(spgw.roaming_temporary_procedures().await?, 0);

    // Held by the roaming actor only, with no local address or policy session
    let sessions = spgw.roaming_sessions().await?;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].pgw_s5s8_cp_teid, Some(PGW_CP_TEID));
    assert_eq!(
        sessions[0].bearers[0].pgw_s5s8_up.as_ref().map(|f| f.teid),
        Some(PGW_UP_TEID)
    );
    assert!(spgw.sessions().await?.is_empty());
    assert_eq!(network.allocated_addresses(), 0);
    assert!(network.policy_events().is_empty());
    assert_eq!(network.snapshot(0x7000), Some(sessions[0].clone()));
    Ok(())
}

#[async_std::test]
async fn roaming_tunnel_has_s8_leg() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = MockMme::new_roaming("999990000000001", 0x100, &spgw, &network, &logger)?;
    establish(&mut mme, &spgw, &network, 0x7000).await?;

    let response = mme.perform_modify_bearer(ENB_IP, 0x5000).await?;
    assert_eq!(response.cause, Cause::RequestAccepted);
    let events = network.data_plane_events();
    let [DataPlaneEvent::AddTunnel(tunnel)] = events.as_slice() else {
        panic!("Expected one AddTunnel, got {:?}", events);
    };
    let leg = tunnel.s8.expect("S8 leg");
    assert_eq!(leg.pgw_teid, PGW_UP_TEID);
    assert_eq!(leg.pgw_ip, Some(PGW_IP.into()));
    assert_eq!(tunnel.ue_ipv4, Some(UE_IP));
    Ok(())
}

#[async_std::test]
async fn roaming_delete_session() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = MockMme::new_roaming("999990000000001", 0x100, &spgw, &network, &logger)?;
    establish(&mut mme, &spgw, &network, 0x7000).await?;
    mme.perform_modify_bearer(ENB_IP, 0x5000).await?;
    network.data_plane_events();

    // The MME is answered once the PGW side is gone
    mme.send_delete_session_request().await?;
    let s8 = network.receive_s8_delete_session_request().await?;
    assert_eq!(s8.context_teid, 0x7000);
    assert_eq!(s8.pgw_s8_cp_teid, Some(PGW_CP_TEID));
    assert_eq!(s8.lbi, 5);
    network.expect_no_mme_message().await?;
    let session = spgw.roaming_sessions().await?;
    assert_eq!(session[0].state, SessionState::Deleting);

    spgw.dispatch_s8(S8Inbound::DeleteSessionResponse(S8DeleteSessionResponse {
        context_teid: 0x7000,
        cause: Cause::RequestAccepted,
    }))
    .await?;
    let response = network.receive_delete_session_response().await?;
    assert_eq!(response.cause, Cause::RequestAccepted);
    assert_eq!(response.teid, 0x100);

    assert!(spgw.roaming_sessions().await?.is_empty());
    assert_eq!(network.snapshot_count(), 0);
    assert!(network.address_releases().is_empty());
    assert!(
        !network
            .policy_events()
            .iter()
            .any(|e| matches!(e, PolicyEvent::EndSession(..)))
    );
    assert!(
        network
            .data_plane_events()
            .iter()
            .any(|e| matches!(e, DataPlaneEvent::DelTunnel(t) if t.enb_teid == 0x5000))
    );
    Ok(())
}

#[async_std::test]
async fn roaming_delete_without_proxy() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = MockMme::new_roaming("999990000000001", 0x100, &spgw, &network, &logger)?;
    establish(&mut mme, &spgw, &network, 0x7000).await?;

    // Local release when the proxy cannot be reached
    network.fail_proxy_sends(true);
    let response = mme.perform_delete_session().await?;
    assert_eq!(response.cause, Cause::RequestAccepted);
    assert!(spgw.roaming_sessions().await?.is_empty());
    Ok(())
}

#[async_std::test]
async fn roaming_pgw_rejects() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = MockMme::new_roaming("999990000000001", 0x100, &spgw, &network, &logger)?;

    let r = mme.create_session_request();
    mme.send_create_session_request(r).await?;
    let s8 = network.receive_s8_create_session_request().await?;
    let S8Inbound::CreateSessionResponse(mut rejection) = s8_create_session_accept(&s8, 0, UE_IP)
    else {
        unreachable!()
    };
    rejection.cause = Cause::ServiceDenied;
    spgw.dispatch_s8(S8Inbound::CreateSessionResponse(rejection))
        .await?;

    let response = network.receive_create_session_response().await?;
    assert_eq!(response.cause, Cause::ServiceDenied);
    assert_eq!(response.teid, 0x100);
    assert!(spgw.roaming_sessions().await?.is_empty());
    assert_eq!(spgw.roaming_temporary_procedures().await?, 0);
    Ok(())
}

#[async_std::test]
async fn roaming_context_teid_in_use() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme_1 = MockMme::new_roaming("999990000000001", 0x100, &spgw, &network, &logger)?;
    let mut mme_2 = MockMme::new_roaming("999990000000002", 0x200, &spgw, &network, &logger)?;
    establish(&mut mme_1, &spgw, &network, 0x7000).await?;

    // The proxy hands out the same TEID twice
    let r = mme_2.create_session_request();
    mme_2.send_create_session_request(r).await?;
    let s8 = network.receive_s8_create_session_request().await?;
    spgw.dispatch_s8(s8_create_session_accept(&s8, 0x7000, UE_IP))
        .await?;

    // The PGW side is cleaned up and the MME told
    let cleanup = network.receive_s8_delete_session_request().await?;
    assert_eq!(cleanup.imsi, mme_2.imsi);
    let response = network.receive_create_session_response().await?;
    assert_eq!(response.cause, Cause::SystemFailure);
    assert_eq!(response.teid, 0x200);

    let sessions = spgw.roaming_sessions().await?;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].imsi, mme_1.imsi);
    Ok(())
}

#[async_std::test]
async fn roaming_proxy_unreachable() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    network.fail_proxy_sends(true);
    let mut mme = MockMme::new_roaming("999990000000001", 0x100, &spgw, &network, &logger)?;

    let r = mme.create_session_request();
    mme.send_create_session_request(r).await?;
    let response = network.receive_create_session_response().await?;
    assert_eq!(response.cause, Cause::SystemFailure);
    assert_eq!(spgw.roaming_temporary_procedures().await?, 0);
    Ok(())
}

#[async_std::test]
async fn unknown_correlation_id_is_ignored() -> anyhow::Result<()> {
    let (spgw, network, _logger) = init().await?;
    let s8 = S8CreateSessionRequest {
        correlation_id: 0x1234,
        imsi: "999990000000001".parse()?,
        msisdn: None,
        mei: None,
        serving_network: ServingNetwork::default(),
        apn: "internet".to_string(),
        pdn_type: PdnType::Ipv4,
        paa: None,
        ambr: BitRate::default(),
        charging_characteristics: None,
        indication_flags: IndicationFlags::default(),
        pco: None,
        bearer_context: S8BearerContextToBeCreated {
            ebi: 5,
            sgw_s8_up_fteid: pgw_fteid(InterfaceType::S5S8SgwGtpU, 1),
            qos: gbr_qos(),
        },
    };
    spgw.dispatch_s8(s8_create_session_accept(&s8, 0x7000, UE_IP))
        .await?;
    network.expect_no_mme_message().await?;
    assert!(spgw.roaming_sessions().await?.is_empty());
    Ok(())
}
