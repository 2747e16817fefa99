use spgw::*;
use spgw_tests::{DataPlaneEvent, MockMme, MockNetwork, build_s11, framework::*};
use std::net::Ipv4Addr;

const CONTEXT_TEID: Teid = 0x7000;

async fn roaming_attached<'a>(
    spgw: &'a Spgw,
    network: &'a MockNetwork,
    logger: &slog::Logger,
) -> anyhow::Result<MockMme<'a>> {
    let mut mme = MockMme::new_roaming("999990000000001", 0x100, spgw, network, logger)?;
    let r = mme.create_session_request();
    mme.send_create_session_request(r).await?;
    let s8 = network.receive_s8_create_session_request().await?;
    spgw.dispatch_s8(s8_create_session_accept(&s8, CONTEXT_TEID, Ipv4Addr::new(10, 99, 0, 7)))
        .await?;
    mme.handle_create_session_accept().await?;
    mme.perform_modify_bearer(ENB_IP, 0x5000).await?;
    network.data_plane_events();
    Ok(mme)
}

#[async_std::test]
async fn roaming_dedicated_bearer() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = roaming_attached(&spgw, &network, &logger).await?;

    // Home PGW asks for a bearer; the MME accepts it as EBI 6
    spgw.dispatch_s8(s8_create_bearer_request(CONTEXT_TEID, 5, 77))
        .await?;
    let request = mme
        .handle_create_bearer_request(6, Some(build_s11::enb_fteid(ENB_IP, 0x5100)))
        .await?;
    assert_eq!(request.tft, tft(2, 20));
    assert_eq!(request.sgw_s11_teid, CONTEXT_TEID);

    // Proxy gets its sequence number and address back
    let response = network.receive_s8_create_bearer_response().await?;
    assert_eq!(response.cause, Cause::RequestAccepted);
    assert_eq!(response.sequence_number, 77);
    assert_eq!(response.pgw_cp_address, "pgw-1.example");
    assert_eq!(response.pgw_s8_cp_teid, Some(PGW_CP_TEID));
    assert_eq!(response.imsi, Some(mme.imsi));
    let bearer = response.bearer_context.expect("bearer context");
    assert_eq!(bearer.ebi, 6);
    assert_eq!(bearer.sgw_s8_up_fteid.interface_type, InterfaceType::S5S8SgwGtpU);
    assert_eq!(bearer.pgw_s8_up_fteid.map(|f| f.teid), Some(PGW_UP_TEID + 1));

    // Tunnel runs eNB to home PGW
    let events = network.data_plane_events();
    let [DataPlaneEvent::AddTunnel(tunnel)] = events.as_slice() else {
        panic!("Expected one AddTunnel, got {:?}", events);
    };
    assert_eq!(tunnel.enb_teid, 0x5100);
    assert_eq!(tunnel.s8.map(|leg| leg.pgw_teid), Some(PGW_UP_TEID + 1));
    assert_eq!(tunnel.s8.map(|leg| leg.sgw_s8u_teid), Some(bearer.sgw_s8_up_fteid.teid));

    let session = spgw.roaming_sessions().await?;
    assert_eq!(session[0].bearers.len(), 2);
    assert!(session[0].pending.is_empty());
    Ok(())
}

#[async_std::test]
async fn roaming_bearer_rejected_by_ue() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = roaming_attached(&spgw, &network, &logger).await?;

    spgw.dispatch_s8(s8_create_bearer_request(CONTEXT_TEID, 5, 78))
        .await?;
    mme.answer_create_bearer_request(0, None, Cause::RequestRejected)
        .await?;
    let response = network.receive_s8_create_bearer_response().await?;
    assert_eq!(response.cause, Cause::RequestRejected);
    assert_eq!(response.sequence_number, 78);

    let session = spgw.roaming_sessions().await?;
    assert_eq!(session[0].bearers.len(), 1);
    assert!(session[0].pending.is_empty());
    Ok(())
}

#[async_std::test]
async fn roaming_create_bearer_for_bad_session() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mme = roaming_attached(&spgw, &network, &logger).await?;

    // Unknown session
    spgw.dispatch_s8(s8_create_bearer_request(0x7777, 5, 79))
        .await?;
    let response = network.receive_s8_create_bearer_response().await?;
    assert_eq!(response.cause, Cause::ContextNotFound);
    assert_eq!(response.sequence_number, 79);
    assert_eq!(response.imsi, None);
    assert!(response.bearer_context.is_none());

    // Wrong linked bearer
    spgw.dispatch_s8(s8_create_bearer_request(CONTEXT_TEID, 6, 80))
        .await?;
    let response = network.receive_s8_create_bearer_response().await?;
    assert_eq!(response.cause, Cause::RequestRejected);
    assert_eq!(response.imsi, Some(mme.imsi));
    network.expect_no_mme_message().await?;
    Ok(())
}

#[async_std::test]
async fn roaming_delete_bearer() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = roaming_attached(&spgw, &network, &logger).await?;
    spgw.dispatch_s8(s8_create_bearer_request(CONTEXT_TEID, 5, 77))
        .await?;
    mme.handle_create_bearer_request(6, Some(build_s11::enb_fteid(ENB_IP, 0x5100)))
        .await?;
    network.receive_s8_create_bearer_response().await?;
    network.data_plane_events();

    // Home PGW removes bearer 6
    spgw.dispatch_s8(s8_delete_bearer_request(CONTEXT_TEID, vec![6], 88))
        .await?;
    let request = mme.handle_delete_bearer_request().await?;
    assert_eq!(request.ebis, vec![6]);

    let response = network.receive_s8_delete_bearer_response().await?;
    assert_eq!(response.sequence_number, 88);
    assert_eq!(response.pgw_cp_address, "pgw-2.example");
    assert_eq!(
        response.bearer_contexts,
        vec![BearerCause::new(6, Cause::RequestAccepted)]
    );
    assert!(matches!(
        network.data_plane_events().as_slice(),
        [DataPlaneEvent::DelTunnel(t)] if t.ebi == 6
    ));
    assert_eq!(spgw.roaming_sessions().await?[0].bearers.len(), 1);
    Ok(())
}

#[async_std::test]
async fn roaming_delete_default_bearer() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = roaming_attached(&spgw, &network, &logger).await?;

    spgw.dispatch_s8(s8_delete_bearer_request(CONTEXT_TEID, vec![5], 89))
        .await?;
    let request = mme.handle_delete_bearer_request().await?;
    assert!(request.delete_default_bearer);

    let response = network.receive_s8_delete_bearer_response().await?;
    assert_eq!(response.sequence_number, 89);
    assert_eq!(response.cause, Cause::RequestAccepted);
    assert!(spgw.roaming_sessions().await?.is_empty());
    assert_eq!(network.snapshot_count(), 0);
    Ok(())
}

#[async_std::test]
async fn roaming_delete_unknown_bearers() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let _mme = roaming_attached(&spgw, &network, &logger).await?;

    spgw.dispatch_s8(s8_delete_bearer_request(CONTEXT_TEID, vec![9], 90))
        .await?;
    let response = network.receive_s8_delete_bearer_response().await?;
    assert_eq!(response.cause, Cause::RequestRejected);
    assert_eq!(
        response.bearer_contexts,
        vec![BearerCause::new(9, Cause::RequestRejected)]
    );
    network.expect_no_mme_message().await?;
    Ok(())
}

#[async_std::test]
async fn roaming_delete_bearer_command_not_supported() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = roaming_attached(&spgw, &network, &logger).await?;

    mme.send_delete_bearer_command(vec![6]).await?;
    let indication = network.receive_delete_bearer_failure_indication().await?;
    assert_eq!(indication.cause, Cause::ServiceNotSupported);
    assert_eq!(indication.teid, 0x100);
    Ok(())
}

async fn with_dedicated_bearer(mme: &mut MockMme<'_>, spgw: &Spgw, network: &MockNetwork) -> anyhow::Result<()> {
    spgw.dispatch_s8(s8_create_bearer_request(CONTEXT_TEID, 5, 77))
        .await?;
    mme.handle_create_bearer_request(6, Some(build_s11::enb_fteid(ENB_IP, 0x5100)))
        .await?;
    network.receive_s8_create_bearer_response().await?;
    network.data_plane_events();
    Ok(())
}

#[async_std::test]
async fn roaming_delete_bearer_naming_unknown_bearer() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = roaming_attached(&spgw, &network, &logger).await?;
    with_dedicated_bearer(&mut mme, &spgw, &network).await?;

    spgw.dispatch_s8(s8_delete_bearer_request(CONTEXT_TEID, vec![6, 9], 91))
        .await?;
    let request = mme.handle_delete_bearer_request().await?;
    assert_eq!(request.ebis, vec![6]);

    let response = network.receive_s8_delete_bearer_response().await?;
    assert_eq!(response.cause, Cause::RequestAccepted);
    assert_eq!(response.sequence_number, 91);
    assert_eq!(
        response.bearer_contexts,
        vec![
            BearerCause::new(6, Cause::RequestAccepted),
            BearerCause::new(9, Cause::RequestRejected)
        ]
    );
    assert_eq!(spgw.roaming_sessions().await?[0].bearers.len(), 1);
    Ok(())
}

#[async_std::test]
async fn roaming_delete_bearer_answered_on_unknown_teid() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = roaming_attached(&spgw, &network, &logger).await?;
    with_dedicated_bearer(&mut mme, &spgw, &network).await?;

    spgw.dispatch_s8(s8_delete_bearer_request(CONTEXT_TEID, vec![6], 92))
        .await?;
    let request = network.receive_delete_bearer_request().await?;

    // MME answers on a TEID this gateway never handed out
    let mut response = build_s11::delete_bearer_response(&request, mme.imsi);
    response.teid = CONTEXT_TEID + 1;
    mme.send(S11Inbound::DeleteBearerResponse(response)).await?;

    // The proxy still gets its answer, with its own correlation data
    let response = network.receive_s8_delete_bearer_response().await?;
    assert_eq!(response.cause, Cause::ContextNotFound);
    assert_eq!(response.sequence_number, 92);
    assert_eq!(response.pgw_cp_address, "pgw-2.example");
    assert_eq!(response.imsi, Some(mme.imsi));
    assert_eq!(
        response.bearer_contexts,
        vec![BearerCause::new(6, Cause::ContextNotFound)]
    );
    Ok(())
}

#[async_std::test]
async fn roaming_create_bearer_answered_after_session_gone() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = roaming_attached(&spgw, &network, &logger).await?;

    spgw.dispatch_s8(s8_create_bearer_request(CONTEXT_TEID, 5, 93))
        .await?;
    let request = network.receive_create_bearer_request().await?;

    // Session released locally before the MME gets round to answering
    network.fail_proxy_sends(true);
    mme.perform_delete_session().await?;
    network.fail_proxy_sends(false);
    assert!(spgw.roaming_sessions().await?.is_empty());

    let response = build_s11::create_bearer_response(
        &request,
        mme.imsi,
        6,
        Some(build_s11::enb_fteid(ENB_IP, 0x5100)),
        Cause::RequestAccepted,
    );
    mme.send(S11Inbound::CreateBearerResponse(response)).await?;

    let response = network.receive_s8_create_bearer_response().await?;
    assert_eq!(response.cause, Cause::ContextNotFound);
    assert_eq!(response.sequence_number, 93);
    assert_eq!(response.pgw_cp_address, "pgw-1.example");
    assert!(response.bearer_context.is_none());
    Ok(())
}
