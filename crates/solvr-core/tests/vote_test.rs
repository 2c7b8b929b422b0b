#![allow(clippy::unwrap_used)]
// Optimistic vote controller against a mocked Solvr API.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solvr_core::store::TOKEN_KEY;
use solvr_core::{
    ClientConfig, KeyValueStore, MemoryNavigator, MemoryStore, SessionController, VoteController,
    VoteDirection, VoteOutcome, VoteSeed, VoteState,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// A mounted session that has not been initialized yet.
async fn mount_session(logged_in: bool) -> (MockServer, SessionController) {
    let server = MockServer::start().await;
    let config = ClientConfig {
        api_url: Url::parse(&server.uri()).unwrap(),
        ..ClientConfig::default()
    };
    let store = Arc::new(MemoryStore::new());
    let session = SessionController::mount(
        config.build_client().unwrap(),
        store.clone(),
        Arc::new(MemoryNavigator::new("/posts/p1")),
    );

    if logged_in {
        store.set(TOKEN_KEY, "tok-1").unwrap();
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "id": "u1", "display_name": "Ada" }
            })))
            .mount(&server)
            .await;
    }
    (server, session)
}

async fn setup(logged_in: bool) -> (MockServer, SessionController) {
    let (server, session) = mount_session(logged_in).await;
    session.initialize().await;
    assert_eq!(session.current().is_authenticated(), logged_in);
    (server, session)
}

fn controller(session: &SessionController, score: i64, seed: VoteSeed) -> VoteController {
    VoteController::new(session.api().clone(), session, "p1", score, seed)
}

fn vote_ok(score: i64, user_vote: Option<&str>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "vote_score": score, "upvotes": score, "downvotes": 0, "user_vote": user_vote }
    }))
}

fn error(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": { "code": code, "message": message }
    }))
}

async fn mount_vote(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/posts/p1/vote"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn state(score: i64, direction: Option<VoteDirection>) -> VoteState {
    VoteState {
        score,
        direction,
        is_voting: false,
        error: None,
    }
}

// ── Seeding ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_known_seeds_never_fetch() {
    let (server, session) = setup(true).await;
    Mock::given(method("GET"))
        .and(path("/v1/posts/p1/my-vote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "vote": "up" } })))
        .expect(0)
        .mount(&server)
        .await;

    let seeds = [
        VoteSeed::Known(None),
        VoteSeed::Known(Some(VoteDirection::Up)),
        VoteSeed::Known(Some(VoteDirection::Down)),
    ];
    let controllers: Vec<_> = (0..20)
        .map(|i| controller(&session, i, seeds[usize::try_from(i).unwrap() % seeds.len()]))
        .collect();
    for c in &controllers {
        c.seeded().await;
    }

    assert_eq!(controllers[0].current(), state(0, None));
    assert_eq!(controllers[1].current(), state(1, Some(VoteDirection::Up)));
    assert_eq!(controllers[2].current(), state(2, Some(VoteDirection::Down)));
}

#[tokio::test]
async fn test_unknown_seed_while_anonymous_does_not_fetch() {
    let (server, session) = setup(false).await;
    Mock::given(method("GET"))
        .and(path("/v1/posts/p1/my-vote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "vote": "up" } })))
        .expect(0)
        .mount(&server)
        .await;

    let c = controller(&session, 5, VoteSeed::Unknown);
    c.seeded().await;

    assert_eq!(c.current(), state(5, None));
}

#[tokio::test]
async fn test_unknown_seed_waits_for_session_to_load() {
    let (server, session) = mount_session(true).await;
    Mock::given(method("GET"))
        .and(path("/v1/posts/p1/my-vote"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "vote": "down" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Controls render before the stored token has been checked.
    let c = controller(&session, 7, VoteSeed::Unknown);
    assert!(session.current().is_loading());
    session.initialize().await;
    c.seeded().await;

    assert!(session.current().is_authenticated());
    assert_eq!(c.current(), state(7, Some(VoteDirection::Down)));
}

#[tokio::test]
async fn test_unknown_seed_before_anonymous_load_does_not_fetch() {
    let (server, session) = mount_session(false).await;
    Mock::given(method("GET"))
        .and(path("/v1/posts/p1/my-vote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "vote": "up" } })))
        .expect(0)
        .mount(&server)
        .await;

    let c = controller(&session, 7, VoteSeed::Unknown);
    session.initialize().await;
    c.seeded().await;

    assert_eq!(c.current(), state(7, None));
}

#[tokio::test]
async fn test_unknown_seed_fetches_existing_vote() {
    let (server, session) = setup(true).await;
    Mock::given(method("GET"))
        .and(path("/v1/posts/p1/my-vote"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "vote": "down" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let c = controller(&session, 3, VoteSeed::Unknown);
    c.seeded().await;

    assert_eq!(c.current(), state(3, Some(VoteDirection::Down)));
}

#[tokio::test]
async fn test_failed_seed_fetch_means_not_voted() {
    let (server, session) = setup(true).await;
    Mock::given(method("GET"))
        .and(path("/v1/posts/p1/my-vote"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let c = controller(&session, 3, VoteSeed::Unknown);
    c.seeded().await;

    assert_eq!(c.current(), state(3, None));
}

#[tokio::test]
async fn test_late_seed_does_not_override_a_vote() {
    let (server, session) = setup(true).await;
    Mock::given(method("GET"))
        .and(path("/v1/posts/p1/my-vote"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "vote": "down" } }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    mount_vote(&server, vote_ok(11, Some("up"))).await;

    let c = controller(&session, 10, VoteSeed::Unknown);
    assert_eq!(c.upvote().await, VoteOutcome::Applied);
    c.seeded().await;

    assert_eq!(c.current(), state(11, Some(VoteDirection::Up)));
}

#[tokio::test]
async fn test_dropping_controller_cancels_seed_fetch() {
    let (server, session) = setup(true).await;
    Mock::given(method("GET"))
        .and(path("/v1/posts/p1/my-vote"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "vote": "up" } }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let c = controller(&session, 1, VoteSeed::Unknown);
    let rx = c.subscribe();
    drop(c);
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(rx.has_changed().is_err(), "sender dropped with controller");
}

// ── Voting ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upvote_is_optimistic_then_confirmed() {
    let (server, session) = setup(true).await;
    Mock::given(method("POST"))
        .and(path("/v1/posts/p1/vote"))
        .and(body_json(json!({ "direction": "up" })))
        .respond_with(vote_ok(25, Some("up")).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;

    let c = controller(&session, 24, VoteSeed::Known(None));
    let mut rx = c.subscribe();

    let (outcome, optimistic) = tokio::join!(c.upvote(), async {
        rx.changed().await.unwrap();
        rx.borrow_and_update().clone()
    });

    assert_eq!(
        optimistic,
        VoteState {
            score: 25,
            direction: Some(VoteDirection::Up),
            is_voting: true,
            error: None,
        }
    );
    assert_eq!(outcome, VoteOutcome::Applied);
    assert_eq!(c.current(), state(25, Some(VoteDirection::Up)));
}

#[tokio::test]
async fn test_server_tally_is_authoritative() {
    let (server, session) = setup(true).await;
    mount_vote(&server, vote_ok(30, Some("down"))).await;

    let c = controller(&session, 24, VoteSeed::Known(Some(VoteDirection::Up)));
    assert_eq!(c.downvote().await, VoteOutcome::Applied);

    assert_eq!(c.current(), state(30, Some(VoteDirection::Down)));
}

#[tokio::test]
async fn test_unauthorized_vote_rolls_back() {
    let (server, session) = setup(false).await;
    mount_vote(
        &server,
        error(401, "UNAUTHORIZED", "authentication required").set_delay(Duration::from_millis(50)),
    )
    .await;

    let c = controller(&session, 24, VoteSeed::Known(None));
    let mut rx = c.subscribe();

    let (outcome, optimistic) = tokio::join!(c.upvote(), async {
        rx.changed().await.unwrap();
        rx.borrow_and_update().clone()
    });

    assert_eq!(optimistic.score, 25);
    assert_eq!(
        outcome,
        VoteOutcome::RolledBack {
            message: "Login required to vote".into()
        }
    );
    assert_eq!(
        c.current(),
        VoteState {
            score: 24,
            direction: None,
            is_voting: false,
            error: Some("Login required to vote".into()),
        }
    );
    // The anonymous user on a post page also gets the login prompt.
    assert!(session.auth_modal().visible);
}

#[tokio::test]
async fn test_rollback_restores_previous_direction() {
    let (server, session) = setup(true).await;
    mount_vote(&server, error(409, "DUPLICATE_VOTE", "already voted")).await;

    let c = controller(&session, 7, VoteSeed::Known(Some(VoteDirection::Down)));
    let outcome = c.upvote().await;

    assert_eq!(
        outcome,
        VoteOutcome::RolledBack {
            message: "You have already voted on this post".into()
        }
    );
    let current = c.current();
    assert_eq!((current.score, current.direction), (7, Some(VoteDirection::Down)));
}

#[tokio::test]
async fn test_forbidden_vote_surfaces_server_message() {
    let (server, session) = setup(true).await;
    mount_vote(&server, error(403, "FORBIDDEN", "cannot vote on your own content")).await;

    let c = controller(&session, 1, VoteSeed::Known(None));

    assert_eq!(
        c.upvote().await,
        VoteOutcome::RolledBack {
            message: "cannot vote on your own content".into()
        }
    );
}

#[tokio::test]
async fn test_unclassified_failure_uses_generic_message() {
    let (server, session) = setup(true).await;
    mount_vote(&server, ResponseTemplate::new(500)).await;

    let c = controller(&session, 1, VoteSeed::Known(None));
    c.upvote().await;

    assert_eq!(c.current().error.as_deref(), Some("Failed to vote"));
    assert!(!c.current().is_voting);
}

#[tokio::test]
async fn test_second_vote_while_in_flight_is_ignored() {
    let (server, session) = setup(true).await;
    Mock::given(method("POST"))
        .and(path("/v1/posts/p1/vote"))
        .respond_with(vote_ok(25, Some("up")).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;

    let c = controller(&session, 24, VoteSeed::Known(None));
    let (first, second) = tokio::join!(c.upvote(), c.upvote());

    assert_eq!(first, VoteOutcome::Applied);
    assert_eq!(second, VoteOutcome::Ignored);
    assert_eq!(c.current(), state(25, Some(VoteDirection::Up)));
}

#[tokio::test]
async fn test_error_clears_on_next_vote() {
    let (server, session) = setup(true).await;
    Mock::given(method("POST"))
        .and(path("/v1/posts/p1/vote"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_vote(&server, vote_ok(2, Some("up"))).await;

    let c = controller(&session, 1, VoteSeed::Known(None));
    c.upvote().await;
    assert!(c.current().error.is_some());

    c.upvote().await;
    assert_eq!(c.current(), state(2, Some(VoteDirection::Up)));
}

#[tokio::test]
async fn test_cancelled_vote_releases_flag() {
    let (server, session) = setup(true).await;
    mount_vote(&server, vote_ok(2, Some("up")).set_delay(Duration::from_secs(5))).await;

    let c = controller(&session, 1, VoteSeed::Known(None));
    let timed_out = tokio::time::timeout(Duration::from_millis(50), c.upvote()).await;

    assert!(timed_out.is_err());
    assert!(!c.current().is_voting);
}

#[tokio::test]
async fn test_optimistic_update_precedes_first_await() {
    let (server, session) = setup(true).await;
    mount_vote(&server, vote_ok(25, Some("up")).set_delay(Duration::from_secs(5))).await;

    let c = controller(&session, 24, VoteSeed::Known(None));
    let mut vote = tokio_test::task::spawn(c.upvote());
    tokio_test::assert_pending!(vote.poll());

    assert_eq!(
        c.current(),
        VoteState {
            score: 25,
            direction: Some(VoteDirection::Up),
            is_voting: true,
            error: None,
        }
    );
    assert_eq!(c.downvote().await, VoteOutcome::Ignored);

    drop(vote);
    assert!(!c.current().is_voting);
}

#[tokio::test]
async fn test_proxy_error_page_gives_generic_message() {
    let (server, session) = setup(true).await;
    mount_vote(
        &server,
        ResponseTemplate::new(502)
            .insert_header("content-type", "text/html")
            .set_body_string("<html><body><h1>502 Bad Gateway</h1></body></html>"),
    )
    .await;

    let c = controller(&session, 24, VoteSeed::Known(None));
    let outcome = c.upvote().await;

    assert_eq!(
        outcome,
        VoteOutcome::RolledBack {
            message: "Failed to vote".into()
        }
    );
    assert_eq!(c.current().score, 24);
    assert_eq!(c.current().error.as_deref(), Some("Failed to vote"));
}
