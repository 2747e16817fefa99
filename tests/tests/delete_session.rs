use spgw::*;
use spgw_tests::{DataPlaneEvent, MockMme, PolicyEvent, build_s11, framework::*};

#[async_std::test]
async fn delete_session() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = MockMme::new("001010000000001", 0x100, &spgw, &network, &logger)?;
    mme.perform_create_session().await?;
    mme.perform_modify_bearer(ENB_IP, 0x5000).await?;
    network.data_plane_events();
    network.policy_events();

    let response = mme.perform_delete_session().await?;
    assert_eq!(response.cause, Cause::RequestAccepted);
    assert_eq!(response.teid, 0x100);
    assert_eq!(response.lbi, mme.default_ebi);

    // Every external resource was given back
    assert_eq!(network.allocated_addresses(), 0);
    assert!(matches!(
        network.policy_events().as_slice(),
        [PolicyEvent::EndSession(_, apn)] if apn == "internet"
    ));
    let events = network.data_plane_events();
    assert!(matches!(
        events.as_slice(),
        [DataPlaneEvent::DelTunnel(t), DataPlaneEvent::DeletePagingRule(..)] if t.enb_teid == 0x5000
    ));

    // And the session is gone
    assert!(spgw.sessions().await?.is_empty());
    assert_eq!(network.snapshot_count(), 0);

    // A repeat is answered with context not found
    let response = mme.perform_delete_session().await?;
    assert_eq!(response.cause, Cause::ContextNotFound);
    assert_eq!(response.teid, 0x100);
    Ok(())
}

#[async_std::test]
async fn delete_session_from_wrong_peer() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = MockMme::new("001010000000001", 0x100, &spgw, &network, &logger)?;
    mme.perform_create_session().await?;

    // Another MME names our session
    let r = build_s11::delete_session_request(mme.sgw_teid, 0x999, mme.default_ebi, 50);
    mme.send(S11Inbound::DeleteSessionRequest(r)).await?;
    let response = network.receive_delete_session_response().await?;
    assert_eq!(response.cause, Cause::InvalidPeer);
    assert_eq!(response.teid, 0x999);
    assert!(spgw.session(mme.sgw_teid).await?.is_some());
    Ok(())
}

#[async_std::test]
async fn delete_session_with_wrong_lbi() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = MockMme::new("001010000000001", 0x100, &spgw, &network, &logger)?;
    mme.perform_create_session().await?;

    let r = build_s11::delete_session_request(mme.sgw_teid, 0x100, 7, 50);
    mme.send(S11Inbound::DeleteSessionRequest(r)).await?;
    let response = network.receive_delete_session_response().await?;
    assert_eq!(response.cause, Cause::RequestRejected);
    assert_eq!(response.teid, 0x100);
    assert!(spgw.session(mme.sgw_teid).await?.is_some());
    assert_eq!(network.allocated_addresses(), 1);
    Ok(())
}

#[async_std::test]
async fn delete_idle_session() -> anyhow::Result<()> {
    let (spgw, network, logger) = init().await?;
    let mut mme = MockMme::new("001010000000001", 0x100, &spgw, &network, &logger)?;
    mme.perform_create_session().await?;
    network.data_plane_events();

    // No eNB tunnel was ever installed, so only the paging rule goes
    let response = mme.perform_delete_session().await?;
    assert_eq!(response.cause, Cause::RequestAccepted);
    assert!(matches!(
        network.data_plane_events().as_slice(),
        [DataPlaneEvent::DeletePagingRule(..)]
    ));
    assert!(spgw.sessions().await?.is_empty());
    Ok(())
}
