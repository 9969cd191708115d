use std::sync::Arc;

use auth_session::{
    AUTH_SESSION_COOKIE_NAME, AUTH_STATE_COOKIE_NAME, AuthSessionStore, AuthenticationStateCookie,
    RequestContext, add_tab, create_authentication_session, finalize_successful_tab,
    get_current_authentication_session, get_current_root_session, remove_expired_sessions,
    remove_tab,
};
use tokio::sync::Barrier;

use crate::common::{Cluster, MockBrowser, remote_client, test_realm};

/// Two tabs log in, one finishes, the other is told to finish and the root
/// session expires after the grace window.
///
/// Flow: create root → open two tabs → finish tab A → tab B still resolvable
/// → state cookie issued → sweep after grace → nothing resolvable
#[tokio::test]
async fn test_sibling_tab_completes_within_grace_window() {
    let cluster = Cluster::new();
    let node = cluster.node(None);
    let realm = test_realm();
    let mut browser = MockBrowser::new();

    // Step 1: first request creates the root session and sets the cookie
    let mut jar = browser.jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    let root = create_authentication_session(&node.services, &mut ctx, true)
        .await
        .unwrap();
    browser.receive(&jar);
    assert!(browser.cookie(&AUTH_SESSION_COOKIE_NAME).is_some());

    // Step 2: two tabs start logging in to the same client
    let tab_a = add_tab(&node.services, &realm, &root, "account")
        .await
        .unwrap()
        .unwrap();
    let tab_b = add_tab(&node.services, &realm, &root, "account")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(tab_a.tab_id, tab_b.tab_id);

    // Step 3: tab A finishes authentication
    let mut jar = browser.jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    let current = get_current_authentication_session(&node.services, &mut ctx, "account", &tab_a.tab_id)
        .await
        .unwrap()
        .unwrap();
    finalize_successful_tab(&node.services, &mut ctx, &current)
        .await
        .unwrap();
    assert!(!ctx.is_detached_auth_session());
    browser.receive(&jar);

    // Step 4: the state cookie tells tab B how long it has
    let state_cookie = browser.cookie(&AUTH_STATE_COOKIE_NAME).unwrap();
    let codec = auth_session::TokenCodec::new(b"integration-secret");
    let state: AuthenticationStateCookie =
        codec.decode(&state_cookie, node.services.now()).unwrap();
    assert_eq!(state.remaining_time, realm.access_code_lifespan);

    // Step 5: tab B is still there, tab A is not
    let mut jar = browser.jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    let b = get_current_authentication_session(&node.services, &mut ctx, "account", &tab_b.tab_id)
        .await
        .unwrap();
    assert_eq!(b, Some(tab_b.clone()));
    let a = get_current_authentication_session(&node.services, &mut ctx, "account", &tab_a.tab_id)
        .await
        .unwrap();
    assert!(a.is_none());

    // Step 6: within the grace window the sweep leaves the root alone
    node.clock.advance(realm.access_code_lifespan - 1);
    assert_eq!(remove_expired_sessions(&node.services, &realm).await.unwrap(), 0);

    // Step 7: once it passes, the root is swept and the cookie resolves to nothing
    node.clock.advance(1);
    assert_eq!(remove_expired_sessions(&node.services, &realm).await.unwrap(), 1);
    let mut jar = browser.jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    assert!(
        get_current_root_session(&node.services, &mut ctx)
            .await
            .unwrap()
            .is_none()
    );
}

/// The last tab to finish takes the root session with it.
#[tokio::test]
async fn test_last_tab_removes_root_and_detaches() {
    let cluster = Cluster::new();
    let node = cluster.node(None);
    let realm = test_realm();
    let mut browser = MockBrowser::new();

    let mut jar = browser.jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    let root = create_authentication_session(&node.services, &mut ctx, true)
        .await
        .unwrap();
    browser.receive(&jar);
    let tab = add_tab(&node.services, &realm, &root, "account")
        .await
        .unwrap()
        .unwrap();

    let mut jar = browser.jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    finalize_successful_tab(&node.services, &mut ctx, &tab)
        .await
        .unwrap();
    assert!(ctx.is_detached_auth_session());
    browser.receive(&jar);

    assert!(browser.cookie(&AUTH_STATE_COOKIE_NAME).is_none());
    let mut jar = browser.jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    assert!(
        get_current_root_session(&node.services, &mut ctx)
            .await
            .unwrap()
            .is_none()
    );
}

/// Many tabs finishing at the same moment remove the root exactly once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tab_completion_removes_root_once() {
    let cluster = Cluster::new();
    let node = Arc::new(cluster.node(None));
    let realm = Arc::new(test_realm());

    let mut jar = MockBrowser::new().jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    let root = create_authentication_session(&node.services, &mut ctx, false)
        .await
        .unwrap();

    let mut tabs = Vec::new();
    for _ in 0..8 {
        tabs.push(
            add_tab(&node.services, &realm, &root, "account")
                .await
                .unwrap()
                .unwrap(),
        );
    }

    let barrier = Arc::new(Barrier::new(tabs.len()));
    let mut handles = Vec::new();
    for tab in tabs {
        let node = node.clone();
        let realm = realm.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            let mut jar = MockBrowser::new().jar();
            let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar);
            barrier.wait().await;
            remove_tab(&node.services, &mut ctx, &tab).await.unwrap()
        }));
    }

    let mut roots_removed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            roots_removed += 1;
        }
    }

    assert_eq!(roots_removed, 1);
    assert!(
        node.services
            .store()
            .get_root_session(&realm, &root.id)
            .await
            .unwrap()
            .is_none()
    );
}
