use spgw::*;
use spgw_tests::{DataPlaneEvent, MockMme, MockNetwork, PolicyEvent, build_s11, framework::*};

async fn attached<'a>(
    spgw: &'a Spgw,
    network: &'a MockNetwork,
    logger: &slog::Logger,
) -> anyhow::Result<MockMme<'a>> {
    let mut mme = MockMme::new("001010000000001", 0x100, spgw, network, logger)?;
    mme.perform_create_session().await?;
    mme.perform_modify_bearer(ENB_IP, 0x5000).await?;
    network.data_plane_events();
    network.policy_events();
    Ok(mme)
}

#[async_std::test]
async fn dedicated_bearer_activation() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = attached(&spgw, &network, &logger).await?;

    // PCEF asks for a voice bearer
    spgw.dispatch_policy(activate_bearer_request(mme.imsi, 5, "voice"))
        .await?;
    let enb = build_s11::enb_fteid(ENB_IP, 0x5100);
    let request = mme.handle_create_bearer_request(6, Some(enb)).await?;
    assert_eq!(request.lbi, 5);
    assert_eq!(request.sgw_s11_teid, mme.sgw_teid);
    assert_eq!(request.bearer_level_qos, gbr_qos());
    assert_eq!(request.tft, tft(1, 10));

    // PCEF learns the binding
    let binding = network.receive_policy_binding().await?;
    assert_eq!(binding.imsi, mme.imsi);
    assert_eq!(binding.default_ebi, 5);
    assert_eq!(binding.policy_rule_name.as_deref(), Some("voice"));
    assert_eq!(
        binding.outcome,
        BindingOutcome::Bound {
            ebi: 6,
            sgw_teid: request.s1u_sgw_fteid.teid,
            enb_teid: 0x5100,
        }
    );

    // One tunnel per downlink filter
    let events = network.data_plane_events();
    let [DataPlaneEvent::AddTunnel(tunnel)] = events.as_slice() else {
        panic!("Expected one AddTunnel, got {:?}", events);
    };
    assert_eq!(tunnel.ebi, 6);
    assert_eq!(tunnel.precedence, 10);
    assert!(tunnel.flow.is_some());
    assert_eq!(tunnel.ue_ipv4, mme.ue_ipv4);

    // Committed, and the ledger is empty again
    let session = spgw.session(mme.sgw_teid).await?.expect("session");
    assert_eq!(session.bearers.len(), 2);
    assert!(session.pending.is_empty());
    assert_eq!(network.snapshot(mme.sgw_teid), Some(session));
    Ok(())
}

#[async_std::test]
async fn provisional_bearer_is_persisted() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mme = attached(&spgw, &network, &logger).await?;

    spgw.dispatch_policy(activate_bearer_request(mme.imsi, 5, "voice"))
        .await?;
    let request = network.receive_create_bearer_request().await?;

    // Waiting in the ledger, not yet in the bearer map
    let session = spgw.session(mme.sgw_teid).await?.expect("session");
    assert_eq!(session.bearers.len(), 1);
    assert_eq!(session.pending.len(), 1);
    assert_eq!(session.pending[0].bearers[0].ebi, 0);
    assert_eq!(
        session.pending[0].bearers[0].sgw_s1u_teid,
        request.s1u_sgw_fteid.teid
    );
    assert_eq!(network.snapshot(mme.sgw_teid), Some(session));
    Ok(())
}

#[async_std::test]
async fn ue_rejects_dedicated_bearer() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = attached(&spgw, &network, &logger).await?;

    spgw.dispatch_policy(activate_bearer_request(mme.imsi, 5, "video"))
        .await?;
    mme.answer_create_bearer_request(0, None, Cause::RequestRejected)
        .await?;
    let binding = network.receive_policy_binding().await?;
    assert_eq!(binding.outcome, BindingOutcome::Rejected(Cause::RequestRejected));

    let session = spgw.session(mme.sgw_teid).await?.expect("session");
    assert_eq!(session.bearers.len(), 1);
    assert!(session.pending.is_empty());
    assert!(network.data_plane_events().is_empty());
    Ok(())
}

#[async_std::test]
async fn mme_assigns_invalid_ebi() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = attached(&spgw, &network, &logger).await?;

    spgw.dispatch_policy(activate_bearer_request(mme.imsi, 5, "video"))
        .await?;
    mme.handle_create_bearer_request(16, Some(build_s11::enb_fteid(ENB_IP, 0x5100)))
        .await?;
    let binding = network.receive_policy_binding().await?;
    assert_eq!(binding.outcome, BindingOutcome::Rejected(Cause::RequestRejected));
    let session = spgw.session(mme.sgw_teid).await?.expect("session");
    assert_eq!(session.bearers.len(), 1);
    assert!(session.pending.is_empty());
    Ok(())
}

#[async_std::test]
async fn activation_for_unknown_session() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mme = attached(&spgw, &network, &logger).await?;

    // No PDN connection has default bearer 7
    spgw.dispatch_policy(activate_bearer_request(mme.imsi, 7, "voice"))
        .await?;
    let binding = network.receive_policy_binding().await?;
    assert_eq!(binding.default_ebi, 7);
    assert_eq!(binding.outcome, BindingOutcome::Rejected(Cause::RequestRejected));
    network.expect_no_mme_message().await?;
    Ok(())
}

#[async_std::test]
async fn activation_with_unreachable_mme_rolls_back() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mme = attached(&spgw, &network, &logger).await?;
    network.fail_mme_sends(true);

    spgw.dispatch_policy(activate_bearer_request(mme.imsi, 5, "voice"))
        .await?;
    let binding = network.receive_policy_binding().await?;
    assert_eq!(binding.outcome, BindingOutcome::Rejected(Cause::RequestRejected));
    let session = spgw.session(mme.sgw_teid).await?.expect("session");
    assert!(session.pending.is_empty());
    Ok(())
}

#[async_std::test]
async fn stray_create_bearer_response() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mme = attached(&spgw, &network, &logger).await?;

    // Answer a request that was never made
    let request = CreateBearerRequest {
        teid: mme.mme_teid,
        sgw_s11_teid: mme.sgw_teid,
        lbi: 5,
        sequence_number: 99,
        s1u_sgw_fteid: build_s11::enb_fteid(ENB_IP, 0xdead),
        tft: tft(1, 10),
        bearer_level_qos: gbr_qos(),
        pco: None,
    };
    let response = build_s11::create_bearer_response(
        &request,
        mme.imsi,
        6,
        None,
        Cause::RequestAccepted,
    );
    mme.send(S11Inbound::CreateBearerResponse(response)).await?;
    let binding = network.receive_policy_binding().await?;
    assert_eq!(binding.outcome, BindingOutcome::Rejected(Cause::ContextNotFound));
    assert_eq!(spgw.session(mme.sgw_teid).await?.expect("session").bearers.len(), 1);
    Ok(())
}

#[async_std::test]
async fn dedicated_bearer_deactivation() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = attached(&spgw, &network, &logger).await?;
    spgw.dispatch_policy(activate_bearer_request(mme.imsi, 5, "voice"))
        .await?;
    mme.handle_create_bearer_request(6, Some(build_s11::enb_fteid(ENB_IP, 0x5100)))
        .await?;
    network.receive_policy_binding().await?;
    network.data_plane_events();

    // PCEF removes bearer 6, naming a bearer that does not exist alongside it
    spgw.dispatch_policy(deactivate_bearer_request(mme.imsi, 5, vec![6, 9]))
        .await?;
    let request = mme.handle_delete_bearer_request().await?;
    assert_eq!(request.ebis, vec![6]);
    assert!(!request.delete_default_bearer);

    // The missing bearer is rejected on its own, the found one goes ahead
    let report = network.receive_deactivation_report().await?;
    assert_eq!(report.ebis, vec![9]);
    assert_eq!(report.cause, Cause::RequestRejected);

    let report = network.receive_deactivation_report().await?;
    assert_eq!(report.ebis, vec![6]);
    assert_eq!(report.lbi, 5);
    assert_eq!(report.cause, Cause::RequestAccepted);
    assert!(matches!(
        network.data_plane_events().as_slice(),
        [DataPlaneEvent::DelTunnel(t)] if t.ebi == 6
    ));

    let session = spgw.session(mme.sgw_teid).await?.expect("session");
    assert_eq!(session.bearers.len(), 1);
    assert_eq!(session.bearers[0].ebi, 5);
    Ok(())
}

#[async_std::test]
async fn deactivating_default_bearer_ends_session() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = attached(&spgw, &network, &logger).await?;

    spgw.dispatch_policy(deactivate_bearer_request(mme.imsi, 5, vec![5]))
        .await?;
    let request = mme.handle_delete_bearer_request().await?;
    assert!(request.delete_default_bearer);
    assert_eq!(request.lbi, Some(5));

    let report = network.receive_deactivation_report().await?;
    assert_eq!(report.ebis, vec![5]);
    assert!(spgw.sessions().await?.is_empty());
    assert_eq!(network.allocated_addresses(), 0);
    assert_eq!(network.snapshot_count(), 0);

    // The PCEF started this, so its session is not ended from here
    assert!(
        !network
            .policy_events()
            .iter()
            .any(|e| matches!(e, PolicyEvent::EndSession(..)))
    );
    Ok(())
}

#[async_std::test]
async fn deactivating_default_bearer_takes_dedicated_bearers_with_it() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = attached(&spgw, &network, &logger).await?;
    spgw.dispatch_policy(activate_bearer_request(mme.imsi, 5, "voice"))
        .await?;
    mme.handle_create_bearer_request(6, Some(build_s11::enb_fteid(ENB_IP, 0x5100)))
        .await?;
    network.receive_policy_binding().await?;
    network.data_plane_events();

    // Dedicated bearer named first; the default bearer still takes the session down
    spgw.dispatch_policy(deactivate_bearer_request(mme.imsi, 5, vec![6, 5]))
        .await?;
    let request = mme.handle_delete_bearer_request().await?;
    assert!(request.delete_default_bearer);

    let report = network.receive_deactivation_report().await?;
    assert_eq!(report.ebis, vec![5, 6]);
    assert_eq!(report.cause, Cause::RequestAccepted);
    assert!(spgw.sessions().await?.is_empty());
    assert_eq!(network.snapshot_count(), 0);

    let events = network.data_plane_events();
    for ebi in [5, 6] {
        assert!(
            events
                .iter()
                .any(|e| matches!(e, DataPlaneEvent::DelTunnel(t) if t.ebi == ebi)),
            "No tunnel deleted for bearer {ebi}: {:?}",
            events
        );
    }
    Ok(())
}

#[async_std::test]
async fn deactivating_unknown_bearers() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mme = attached(&spgw, &network, &logger).await?;

    spgw.dispatch_policy(deactivate_bearer_request(mme.imsi, 5, vec![9, 10]))
        .await?;
    let report = network.receive_deactivation_report().await?;
    assert_eq!(report.cause, Cause::RequestRejected);
    assert_eq!(report.ebis, vec![9, 10]);
    network.expect_no_mme_message().await?;

    spgw.dispatch_policy(deactivate_bearer_request(mme.imsi, 7, vec![9]))
        .await?;
    let report = network.receive_deactivation_report().await?;
    assert_eq!(report.cause, Cause::ContextNotFound);
    Ok(())
}

#[async_std::test]
async fn delete_bearer_command() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = attached(&spgw, &network, &logger).await?;

    // The MME asks; the PCEF is told
    mme.send_delete_bearer_command(vec![6]).await?;
    let event = network.receive_policy_event().await?;
    assert_eq!(event, PolicyEvent::DeleteDedicatedBearer(mme.imsi, 5, vec![6]));

    // Unknown session
    mme.sgw_teid = 0x1234;
    mme.send_delete_bearer_command(vec![6]).await?;
    let indication = network.receive_delete_bearer_failure_indication().await?;
    assert_eq!(indication.cause, Cause::ContextNotFound);
    assert_eq!(indication.teid, 0x100);
    assert_eq!(
        indication.bearer_contexts,
        vec![BearerCause::new(6, Cause::ContextNotFound)]
    );
    Ok(())
}
