use std::time::Duration;

use std::sync::Arc;

use futures::future::join_all;
use gateway::{ApiRequest, Gateway, GatewayError, Notification, Notifier, StatusCode};
use integration_tests::{MockApi, RecordingNavigator, TestCampus, gateway_for, unreachable_gateway};
use serde_json::json;

const SESSION_LOST: &str = "Some error occurred. Please login again.";

async fn wait_for_refresh(gateway: &Gateway) {
    for _ in 0..100 {
        if gateway.is_refreshing().await {
            return;
        }

        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    unreachable!("refresh never started");
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_replayed() {
    let campus = TestCampus::with_token(MockApi::new(), "T0").await;

    let response = campus.gateway().send(ApiRequest::get("/courses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    insta::assert_debug_snapshot!(campus.api.authorizations_to("/courses"), @r#"
    [
        Some(
            "Bearer T0",
        ),
        Some(
            "Bearer T1",
        ),
    ]
    "#);

    assert_eq!(campus.api.refresh_bodies(), vec![json!({ "token": "T0" })]);
    assert_eq!(campus.token().await.as_deref(), Some("T1"));
    assert!(campus.notifier.notifications().is_empty());
    assert!(!campus.gateway().is_refreshing().await);
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let api = MockApi::new().with_refresh_delay(Duration::from_millis(200));
    let campus = TestCampus::with_token(api, "T0").await;

    let requests = (0..8).map(|i| {
        let path = if i % 2 == 0 { "/courses" } else { "/users/me" };
        campus.gateway().send(ApiRequest::get(path))
    });

    let results = join_all(requests).await;

    assert!(results.iter().all(|result| result.is_ok()));
    assert_eq!(campus.api.refresh_calls(), 1);
    assert_eq!(campus.token().await.as_deref(), Some("T1"));

    let replays = campus
        .api
        .requests()
        .into_iter()
        .filter(|request| request.authorization.as_deref() == Some("Bearer T1"))
        .count();

    assert_eq!(replays, 8);
}

#[tokio::test]
async fn request_sent_during_refresh_waits_for_it() {
    let api = MockApi::new().with_refresh_delay(Duration::from_millis(300));
    let campus = TestCampus::with_token(api, "T0").await;

    let gateway = campus.gateway().clone();
    let first = tokio::spawn(async move { gateway.send(ApiRequest::get("/courses")).await });

    wait_for_refresh(campus.gateway()).await;

    let second = campus.gateway().send(ApiRequest::get("/users/me")).await.unwrap();
    let first = first.await.unwrap().unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(campus.api.refresh_calls(), 1);

    insta::assert_debug_snapshot!(campus.api.authorizations_to("/users/me"), @r#"
    [
        Some(
            "Bearer T0",
        ),
        Some(
            "Bearer T1",
        ),
    ]
    "#);
}

#[tokio::test]
async fn parked_request_gets_its_own_replay_error() {
    let api = MockApi::new().with_refresh_delay(Duration::from_millis(300));
    let campus = TestCampus::with_token(api, "T0").await;

    let gateway = campus.gateway().clone();
    let leader = tokio::spawn(async move { gateway.send(ApiRequest::get("/courses")).await });

    wait_for_refresh(campus.gateway()).await;

    let request = ApiRequest::get("/status/403").query("message", "Not an instructor");
    let error = campus.gateway().send(request).await.unwrap_err();
    let leader = leader.await.unwrap().unwrap();

    assert_eq!(leader.status(), StatusCode::OK);
    assert_eq!(error.status(), Some(StatusCode::FORBIDDEN));
    assert!(!error.is_session_terminated());
    assert_eq!(campus.api.refresh_calls(), 1);

    assert_eq!(
        campus.api.authorizations_to("/status/403"),
        vec![Some("Bearer T0".to_string()), Some("Bearer T1".to_string())]
    );

    assert_eq!(
        campus.notifier.errors(),
        vec!["You don't have permission to perform this action.".to_string()]
    );
}

#[tokio::test]
async fn aborted_leader_does_not_strand_parked_requests() {
    let api = MockApi::new().with_refresh_delay(Duration::from_millis(300));
    let campus = TestCampus::with_token(api, "T0").await;

    let gateway = campus.gateway().clone();
    let leader = tokio::spawn(async move { gateway.send(ApiRequest::get("/courses")).await });

    wait_for_refresh(campus.gateway()).await;

    let gateway = campus.gateway().clone();
    let parked = tokio::spawn(async move { gateway.send(ApiRequest::get("/users/me")).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    leader.abort();

    let parked = parked.await.unwrap().unwrap();

    assert_eq!(parked.status(), StatusCode::OK);
    assert!(!campus.gateway().is_refreshing().await);
    assert_eq!(campus.api.refresh_calls(), 1);
    assert_eq!(campus.token().await.as_deref(), Some("T1"));
    assert_eq!(campus.api.authorizations_to("/users/me").last(), Some(&Some("Bearer T1".to_string())));
}

struct PanickingNotifier;

impl Notifier for PanickingNotifier {
    #[allow(clippy::panic)]
    fn notify(&self, notification: Notification) {
        panic!("notifier failed while showing '{notification}'");
    }
}

#[tokio::test]
async fn panicking_refresh_rejects_every_waiting_caller() {
    let api = MockApi::new()
        .with_refresh_delay(Duration::from_millis(200))
        .with_failing_refresh(StatusCode::UNAUTHORIZED)
        .spawn()
        .await
        .unwrap();

    let navigator = Arc::new(RecordingNavigator::default());
    let gateway = gateway_for(&api, Arc::new(PanickingNotifier), navigator.clone());

    let leader = {
        let gateway = gateway.clone();
        tokio::spawn(async move { gateway.send(ApiRequest::get("/courses")).await })
    };

    wait_for_refresh(&gateway).await;

    let parked = gateway.send(ApiRequest::get("/users/me")).await.unwrap_err();
    let leader = leader.await.unwrap().unwrap_err();

    assert!(matches!(parked, GatewayError::RefreshAborted), "{parked}");
    assert!(matches!(leader, GatewayError::RefreshAborted), "{leader}");
    assert!(!gateway.is_refreshing().await);
    assert_eq!(api.refresh_calls(), 1);
    assert!(navigator.targets().is_empty());
}

#[tokio::test]
async fn failed_refresh_ends_the_session_once() {
    let api = MockApi::new()
        .with_refresh_delay(Duration::from_millis(100))
        .with_failing_refresh(StatusCode::UNAUTHORIZED);

    let campus = TestCampus::with_token(api, "T0").await;

    let requests = (0..4).map(|_| campus.gateway().send(ApiRequest::get("/courses")));
    let results = join_all(requests).await;

    for result in &results {
        let error = result.as_ref().unwrap_err();
        assert!(error.is_session_terminated(), "{error}");
        assert_eq!(error.status(), Some(StatusCode::UNAUTHORIZED));
    }

    assert_eq!(campus.api.refresh_calls(), 1);
    assert_eq!(campus.token().await, None);
    assert_eq!(campus.notifier.errors(), vec![SESSION_LOST.to_string()]);
    assert_eq!(campus.navigator.targets(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn refresh_server_error_ends_the_session() {
    let api = MockApi::new().with_failing_refresh(StatusCode::INTERNAL_SERVER_ERROR);
    let campus = TestCampus::with_token(api, "T0").await;

    let error = campus.gateway().send(ApiRequest::get("/users/me")).await.unwrap_err();

    insta::assert_snapshot!(error, @"Session refresh failed: Request to '/auth/refresh-token' failed with status 500 Internal Server Error");

    assert_eq!(campus.token().await, None);
    assert_eq!(campus.notifier.errors(), vec![SESSION_LOST.to_string()]);
    assert_eq!(campus.navigator.targets(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn session_can_refresh_again_after_a_refresh() {
    let campus = TestCampus::with_token(MockApi::new(), "T0").await;

    campus.gateway().send(ApiRequest::get("/courses")).await.unwrap();
    campus.api.revoke("T1");
    campus.gateway().send(ApiRequest::get("/courses")).await.unwrap();

    assert_eq!(campus.api.refresh_calls(), 2);
    assert_eq!(campus.token().await.as_deref(), Some("T2"));
    assert_eq!(
        campus.api.refresh_bodies(),
        vec![json!({ "token": "T0" }), json!({ "token": "T1" })]
    );
}

#[tokio::test]
async fn replayed_request_is_not_refreshed_twice() {
    let campus = TestCampus::with_token(MockApi::new(), "T0").await;

    let error = campus
        .gateway()
        .send(ApiRequest::get("/always-unauthorized"))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        GatewayError::Status {
            status: StatusCode::UNAUTHORIZED,
            ..
        }
    ));

    assert_eq!(campus.api.refresh_calls(), 1);
    assert_eq!(campus.api.requests_to("/always-unauthorized").len(), 2);
    assert_eq!(campus.token().await.as_deref(), Some("T1"));
    assert!(campus.notifier.notifications().is_empty());
    assert!(campus.navigator.targets().is_empty());
}

#[tokio::test]
async fn identical_requests_carry_identical_headers() {
    let campus = TestCampus::with_token(MockApi::new().accepting("T0"), "T0").await;

    campus.gateway().send(ApiRequest::get("/courses")).await.unwrap();
    campus.gateway().send(ApiRequest::get("/courses")).await.unwrap();

    assert_eq!(
        campus.api.authorizations_to("/courses"),
        vec![Some("Bearer T0".to_string()), Some("Bearer T0".to_string())]
    );

    assert_eq!(campus.api.refresh_calls(), 0);
}

#[tokio::test]
async fn login_and_refresh_calls_carry_no_credential() {
    let campus = TestCampus::with_token(MockApi::new(), "T0").await;

    let request = ApiRequest::post("/auth/login")
        .json(&json!({ "userName": "ann", "password": "wrong" }))
        .unwrap();

    campus.gateway().send(request).await.unwrap_err();
    campus.gateway().send(ApiRequest::get("/courses")).await.unwrap();

    assert_eq!(campus.api.authorizations_to("/auth/login"), vec![None]);
    assert_eq!(campus.api.authorizations_to("/auth/refresh-token"), vec![None]);
}

#[tokio::test]
async fn logged_out_request_refreshes_with_empty_token() {
    let campus = TestCampus::start(MockApi::new()).await;

    let response = campus.gateway().send(ApiRequest::get("/courses")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(campus.api.authorizations_to("/courses"), vec![None, Some("Bearer T1".to_string())]);
    assert_eq!(campus.api.refresh_bodies(), vec![json!({ "token": "" })]);
}

#[tokio::test]
async fn multipart_request_is_replayed_after_refresh() {
    let campus = TestCampus::with_token(MockApi::new(), "T0").await;

    let form = gateway::FormData::new()
        .text("Title", "Linear Algebra")
        .file("CoverBanner", gateway::FileUpload::new("banner.png", vec![1u8; 32]));

    let response = campus
        .gateway()
        .send(ApiRequest::post("/courses/create").form(form))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(campus.api.refresh_calls(), 1);

    let forms = campus.api.forms();
    assert_eq!(forms.len(), 1);

    insta::assert_debug_snapshot!(forms[0].fields, @r#"
    [
        (
            "Title",
            "Linear Algebra",
        ),
        (
            "CoverBanner",
            "<banner.png: 32 bytes>",
        ),
    ]
    "#);
}

#[tokio::test]
async fn transport_error_does_not_refresh() {
    let (gateway, notifier) = unreachable_gateway().await;

    let error = gateway.send(ApiRequest::get("/courses")).await.unwrap_err();

    assert!(matches!(error, GatewayError::Transport(_)));
    assert_eq!(error.status(), None);
    assert!(!gateway.is_refreshing().await);
    assert!(notifier.notifications().is_empty());
}
