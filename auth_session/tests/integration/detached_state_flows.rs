use auth_session::{
    DetachedMessage, RequestContext, STATE_CHECKER_COOKIE_NAME, STATE_CHECKER_PARAM,
    SessionError, generate_and_set_state_checker_cookie, verify_state_checker_parameter,
};

use crate::common::{Cluster, MockBrowser, remote_client, test_realm};

/// An error page is shown, the user switches locale through a link on the
/// page, then refreshes the page. Both requests pass the state check; an
/// edited URL does not.
#[tokio::test]
async fn test_detached_page_refresh_and_link() {
    let cluster = Cluster::new();
    let node = cluster.node(None);
    let realm = test_realm();
    let mut browser = MockBrowser::new();

    // Step 1: the page is first rendered from a URL already carrying "X"
    let mut jar = browser.jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar)
        .with_query_param(STATE_CHECKER_PARAM, "X");
    let rendered = generate_and_set_state_checker_cookie(
        &node.services,
        &mut ctx,
        DetachedMessage::new("expiredActionMessage", "warning")
            .status(400)
            .client_id("account"),
    )
    .unwrap();
    browser.receive(&jar);
    assert!(browser.cookie(&STATE_CHECKER_COOKIE_NAME).is_some());

    // Step 2: following the page's own link carries the rendered state
    let mut jar = browser.jar();
    let ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    let via_link = verify_state_checker_parameter(
        &node.services,
        &ctx,
        Some(rendered.rendered_url_state.as_str()),
    )
    .unwrap();
    assert_eq!(via_link.message_key, "expiredActionMessage");
    assert_eq!(via_link.status, Some(400));

    // Step 3: refreshing the original URL carries "X"
    let refreshed = verify_state_checker_parameter(&node.services, &ctx, Some("X")).unwrap();
    assert_eq!(refreshed, rendered);

    // Step 4: a hand-edited URL fails
    let tampered = verify_state_checker_parameter(&node.services, &ctx, Some("Z"));
    assert!(matches!(tampered, Err(SessionError::StateVerification(_))));
}

/// A re-render replaces the cookie, so the previous rendered state stops
/// verifying unless it is the URL state of the new render.
#[tokio::test]
async fn test_rerender_rotates_rendered_state() {
    let cluster = Cluster::new();
    let node = cluster.node(None);
    let realm = test_realm();
    let mut browser = MockBrowser::new();

    let mut jar = browser.jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    let first = generate_and_set_state_checker_cookie(
        &node.services,
        &mut ctx,
        DetachedMessage::new("errorMessage", "error"),
    )
    .unwrap();
    browser.receive(&jar);

    // The locale link is followed and the page rendered again from it
    let mut jar = browser.jar();
    let mut ctx = RequestContext::new(&realm, remote_client(), &mut jar)
        .with_query_param(STATE_CHECKER_PARAM, first.rendered_url_state.clone());
    verify_state_checker_parameter(
        &node.services,
        &ctx,
        Some(first.rendered_url_state.as_str()),
    )
    .unwrap();
    let second = generate_and_set_state_checker_cookie(
        &node.services,
        &mut ctx,
        DetachedMessage::new("errorMessage", "error"),
    )
    .unwrap();
    browser.receive(&jar);
    assert_ne!(first.rendered_url_state, second.rendered_url_state);

    let mut jar = browser.jar();
    let ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    assert!(
        verify_state_checker_parameter(
            &node.services,
            &ctx,
            Some(first.rendered_url_state.as_str())
        )
        .is_ok()
    );
    assert!(
        verify_state_checker_parameter(
            &node.services,
            &ctx,
            Some(second.rendered_url_state.as_str())
        )
        .is_ok()
    );
    assert!(verify_state_checker_parameter(&node.services, &ctx, Some("X")).is_err());
}

#[tokio::test]
async fn test_verify_without_cookie_fails() {
    let cluster = Cluster::new();
    let node = cluster.node(None);
    let realm = test_realm();

    let mut jar = MockBrowser::new().jar();
    let ctx = RequestContext::new(&realm, remote_client(), &mut jar);
    let result = verify_state_checker_parameter(&node.services, &ctx, Some("X"));

    match result {
        Err(SessionError::StateVerification(msg)) => {
            assert_eq!(msg, "State checker cookie is empty")
        }
        other => panic!("Expected StateVerification, got {other:?}"),
    }
}
