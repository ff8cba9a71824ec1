use super::*;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::executor::block_on;

use crate::net::transport::TransportError;
use crate::net::types::User;

/// Future that returns `Pending` once before resolving, so joined requests
/// interleave at the transport boundary.
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[derive(Clone)]
enum Reply {
    Status(u16, &'static str),
    Delayed(u16, &'static str),
    Unreachable,
}

/// Replays scripted responses: one queue for the refresh endpoint, one for
/// everything else.
#[derive(Default)]
struct ScriptedTransport {
    refresh_replies: RefCell<VecDeque<Reply>>,
    replies: RefCell<VecDeque<Reply>>,
    sent: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Reply>, refresh_replies: Vec<Reply>) -> Rc<Self> {
        Rc::new(Self {
            refresh_replies: RefCell::new(refresh_replies.into()),
            replies: RefCell::new(replies.into()),
            sent: RefCell::new(Vec::new()),
        })
    }

    fn refresh_calls(&self) -> usize {
        self.sent.borrow().iter().filter(|r| r.url.ends_with("/token/refresh/")).count()
    }

    fn business_calls(&self) -> Vec<HttpRequest> {
        self.sent
            .borrow()
            .iter()
            .filter(|r| !r.url.ends_with("/token/refresh/"))
            .cloned()
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>> {
        let queue = if request.url.ends_with("/token/refresh/") { &self.refresh_replies } else { &self.replies };
        let reply = queue.borrow_mut().pop_front().unwrap_or(Reply::Status(599, ""));
        self.sent.borrow_mut().push(request);
        async move {
            match reply {
                Reply::Status(status, body) => Ok(HttpResponse { status, body: body.to_owned() }),
                Reply::Delayed(status, body) => {
                    YieldOnce { yielded: false }.await;
                    Ok(HttpResponse { status, body: body.to_owned() })
                }
                Reply::Unreachable => Err(TransportError::Unreachable("connection refused".to_owned())),
            }
        }
        .boxed_local()
    }
}

struct RecordingBrowser {
    path: RefCell<String>,
    redirects: RefCell<Vec<String>>,
    notices: RefCell<Vec<Notice>>,
}

impl RecordingBrowser {
    fn at(path: &str) -> Rc<Self> {
        Rc::new(Self {
            path: RefCell::new(path.to_owned()),
            redirects: RefCell::new(Vec::new()),
            notices: RefCell::new(Vec::new()),
        })
    }
}

impl Browser for RecordingBrowser {
    fn location_path(&self) -> String {
        self.path.borrow().clone()
    }

    fn hard_redirect(&self, path: &str) {
        self.redirects.borrow_mut().push(path.to_owned());
    }

    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

struct Harness {
    client: ApiClient,
    transport: Rc<ScriptedTransport>,
    browser: Rc<RecordingBrowser>,
    session: Rc<SessionStore>,
}

fn harness(path: &str, replies: Vec<Reply>, refresh_replies: Vec<Reply>) -> Harness {
    let transport = ScriptedTransport::new(replies, refresh_replies);
    let browser = RecordingBrowser::at(path);
    let session = Rc::new(SessionStore::in_memory());
    let client = ApiClient::new(
        PortalConfig::with_base_url("https://api.test"),
        transport.clone(),
        Rc::clone(&session),
        browser.clone(),
    );
    Harness { client, transport, browser, session }
}

fn signed_in(h: &Harness) {
    h.session
        .save("acc-1", Some("ref-1"), Some(&User::new("u1", "owner@acme.test")))
        .unwrap();
}

const REFRESHED: &str = r#"{"access":"acc-2"}"#;

// =============================================================
// Headers + plain outcomes
// =============================================================

#[test]
fn stored_token_is_sent_as_bearer() {
    let h = harness("/client/profile", vec![Reply::Status(200, "{}")], vec![]);
    signed_in(&h);

    block_on(h.client.send(ApiRequest::get("/clients/me/"))).unwrap();

    let sent = h.transport.business_calls();
    assert_eq!(sent[0].url, "https://api.test/clients/me/");
    assert_eq!(sent[0].header("authorization"), Some("Bearer acc-1"));
}

#[test]
fn anonymous_request_has_no_authorization_header() {
    let h = harness("/auth/login", vec![Reply::Status(200, "{}")], vec![]);
    block_on(h.client.send(ApiRequest::get("/status/"))).unwrap();
    assert_eq!(h.transport.business_calls()[0].header("Authorization"), None);
}

#[test]
fn post_body_is_json_encoded() {
    let h = harness("/auth/register", vec![Reply::Status(201, "{}")], vec![]);
    let request = ApiRequest::post("/auth/client/register/", &serde_json::json!({"email": "a@b.com"})).unwrap();

    block_on(h.client.send(request)).unwrap();

    let sent = &h.transport.business_calls()[0];
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.body.as_deref(), Some(r#"{"email":"a@b.com"}"#));
    assert_eq!(sent.header("Content-Type"), Some("application/json"));
}

#[test]
fn client_error_is_returned_with_body() {
    let h = harness("/client/profile", vec![Reply::Status(400, r#"{"detail":"bad"}"#)], vec![]);
    let err = block_on(h.client.send(ApiRequest::get("/x/"))).unwrap_err();
    assert_eq!(err, ApiError::Status { status: 400, body: r#"{"detail":"bad"}"#.to_owned() });
    assert!(h.browser.notices.borrow().is_empty());
}

#[test]
fn server_error_posts_notice_and_is_not_retried() {
    let h = harness("/client/profile", vec![Reply::Status(503, "")], vec![]);
    signed_in(&h);

    let err = block_on(h.client.send(ApiRequest::get("/x/"))).unwrap_err();

    assert_eq!(err, ApiError::Server { status: 503 });
    assert_eq!(h.transport.business_calls().len(), 1);
    assert_eq!(h.browser.notices.borrow()[0], Notice::error(SERVER_ERROR_MESSAGE));
}

#[test]
fn unreachable_server_posts_notice() {
    let h = harness("/client/profile", vec![Reply::Unreachable], vec![]);
    let err = block_on(h.client.send(ApiRequest::get("/x/"))).unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(h.browser.notices.borrow()[0], Notice::error(UNREACHABLE_MESSAGE));
}

#[test]
fn send_json_reports_decode_errors() {
    let h = harness("/client/profile", vec![Reply::Status(200, "not json")], vec![]);
    let result = block_on(h.client.send_json::<serde_json::Value>(ApiRequest::get("/x/")));
    assert!(matches!(result, Err(ApiError::Decode(_))));
}

// =============================================================
// 401 recovery
// =============================================================

#[test]
fn expired_token_is_refreshed_and_request_replayed() {
    let h = harness(
        "/client/profile",
        vec![Reply::Status(401, ""), Reply::Status(200, r#"{"ok":true}"#)],
        vec![Reply::Status(200, REFRESHED)],
    );
    signed_in(&h);

    let response = block_on(h.client.send(ApiRequest::get("/clients/me/"))).unwrap();

    assert_eq!(response.body, r#"{"ok":true}"#);
    assert_eq!(h.transport.refresh_calls(), 1);
    let sent = h.transport.business_calls();
    assert_eq!(sent[1].header("Authorization"), Some("Bearer acc-2"));
    assert_eq!(h.session.authorization_header().as_deref(), Some("Bearer acc-2"));
}

#[test]
fn refresh_request_carries_stored_refresh_token() {
    let h = harness(
        "/client/profile",
        vec![Reply::Status(401, ""), Reply::Status(200, "{}")],
        vec![Reply::Status(200, REFRESHED)],
    );
    signed_in(&h);

    block_on(h.client.send(ApiRequest::get("/x/"))).unwrap();

    let sent = h.transport.sent.borrow();
    let refresh = sent.iter().find(|r| r.url.ends_with("/token/refresh/")).unwrap();
    assert_eq!(refresh.method, Method::Post);
    assert_eq!(refresh.body.as_deref(), Some(r#"{"refresh":"ref-1"}"#));
}

#[test]
fn replayed_request_is_not_refreshed_again() {
    let h = harness(
        "/client/profile",
        vec![Reply::Status(401, ""), Reply::Status(401, "")],
        vec![Reply::Status(200, REFRESHED), Reply::Status(200, REFRESHED)],
    );
    signed_in(&h);

    let err = block_on(h.client.send(ApiRequest::get("/x/"))).unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(h.transport.refresh_calls(), 1);
    assert_eq!(h.transport.business_calls().len(), 2);
    assert!(h.browser.redirects.borrow().is_empty());
}

#[test]
fn public_endpoint_401_never_refreshes() {
    let h = harness(
        "/auth/login",
        vec![Reply::Status(401, r#"{"detail":"No active account"}"#)],
        vec![Reply::Status(200, REFRESHED)],
    );
    signed_in(&h);

    let err = block_on(h.client.send(ApiRequest::post("/client/login/", &serde_json::json!({})).unwrap()))
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(h.transport.refresh_calls(), 0);
    assert!(h.session.is_authenticated());
    assert!(h.browser.redirects.borrow().is_empty());
}

#[test]
fn failed_refresh_clears_session_and_redirects_to_login() {
    let h = harness("/client/source", vec![Reply::Status(401, "")], vec![Reply::Status(401, "")]);
    signed_in(&h);

    let err = block_on(h.client.send(ApiRequest::get("/x/"))).unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!h.session.is_authenticated());
    assert_eq!(h.browser.redirects.borrow().as_slice(), [LOGIN_PATH.to_owned()]);
}

#[test]
fn missing_refresh_token_counts_as_failed_refresh() {
    let h = harness("/admin/index", vec![Reply::Status(401, "")], vec![]);
    h.session.save("acc-1", None, Some(&User::new("u1", "a@b.com"))).unwrap();

    block_on(h.client.send(ApiRequest::get("/x/"))).unwrap_err();

    assert_eq!(h.transport.refresh_calls(), 0);
    assert!(!h.session.is_authenticated());
    assert_eq!(h.browser.redirects.borrow().len(), 1);
}

#[test]
fn no_redirect_when_already_on_auth_pages() {
    let h = harness("/auth/register", vec![Reply::Status(401, "")], vec![Reply::Unreachable]);
    signed_in(&h);

    block_on(h.client.send(ApiRequest::get("/x/"))).unwrap_err();

    assert!(!h.session.is_authenticated());
    assert!(h.browser.redirects.borrow().is_empty());
}

#[test]
fn malformed_refresh_response_is_a_failure() {
    let h = harness("/client/profile", vec![Reply::Status(401, "")], vec![Reply::Status(200, r#"{"nope":1}"#)]);
    signed_in(&h);

    block_on(h.client.send(ApiRequest::get("/x/"))).unwrap_err();

    assert!(!h.session.is_authenticated());
    assert_eq!(h.transport.business_calls().len(), 1);
}

#[test]
fn concurrent_unauthorized_requests_share_one_refresh() {
    let h = harness(
        "/client/profile",
        vec![
            Reply::Status(401, ""),
            Reply::Status(401, ""),
            Reply::Status(200, r#"{"n":1}"#),
            Reply::Status(200, r#"{"n":2}"#),
        ],
        vec![Reply::Delayed(200, REFRESHED), Reply::Status(200, REFRESHED)],
    );
    signed_in(&h);

    let first = h.client.send(ApiRequest::get("/a/"));
    let second = h.client.send(ApiRequest::get("/b/"));
    let (first, second) = block_on(futures::future::join(first, second));

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(h.transport.refresh_calls(), 1);
    for replay in &h.transport.business_calls()[2..] {
        assert_eq!(replay.header("Authorization"), Some("Bearer acc-2"));
    }
}

#[test]
fn sequential_refreshes_each_run_once() {
    let h = harness("/client/profile", vec![], vec![Reply::Status(200, REFRESHED), Reply::Status(200, r#"{"access":"acc-3"}"#)]);
    signed_in(&h);

    assert_eq!(block_on(h.client.refresh_access_token()).unwrap(), "acc-2");
    assert_eq!(block_on(h.client.refresh_access_token()).unwrap(), "acc-3");
    assert_eq!(h.transport.refresh_calls(), 2);
}

// =============================================================
// Refresh racing a logout
// =============================================================

#[test]
fn refresh_landing_after_logout_does_not_revive_session() {
    let h = harness("/auth/login", vec![], vec![Reply::Delayed(200, REFRESHED)]);
    signed_in(&h);

    let refresh = h.client.refresh_access_token();
    let logout = async { h.session.clear() };
    let (outcome, ()) = block_on(futures::future::join(refresh, logout));

    assert_eq!(outcome, Err(RefreshError::SessionEnded));
    assert_eq!(h.session.authorization_header(), None);
    assert!(!h.session.is_authenticated());
}

#[test]
fn request_waiting_on_refresh_is_not_replayed_after_logout() {
    let h = harness(
        "/auth/login",
        vec![Reply::Status(401, ""), Reply::Status(200, "{}")],
        vec![Reply::Delayed(200, REFRESHED)],
    );
    signed_in(&h);

    let request = h.client.send(ApiRequest::get("/x/"));
    let logout = async { h.session.clear() };
    let (result, ()) = block_on(futures::future::join(request, logout));

    assert_eq!(result.unwrap_err().status(), Some(401));
    assert_eq!(h.transport.business_calls().len(), 1);
    assert_eq!(h.session.authorization_header(), None);
    assert!(h.browser.redirects.borrow().is_empty());
}
