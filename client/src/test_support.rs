//! Scripted transport and recording browser shared by network and auth tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::config::PortalConfig;
use crate::net::http::ApiClient;
use crate::net::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::state::session::SessionStore;
use crate::util::browser::{Browser, Notice};

/// Answers requests in order; an exhausted script answers 599.
#[derive(Default)]
pub struct StubTransport {
    replies: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    pub sent: RefCell<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn reply(&self, status: u16, body: &str) {
        self.replies
            .borrow_mut()
            .push_back(Ok(HttpResponse { status, body: body.to_owned() }));
    }

    pub fn fail(&self) {
        self.replies
            .borrow_mut()
            .push_back(Err(TransportError::Unreachable("connection refused".to_owned())));
    }

    pub fn last(&self) -> HttpRequest {
        self.sent.borrow().last().cloned().expect("no request sent")
    }
}

impl Transport for StubTransport {
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, TransportError>> {
        self.sent.borrow_mut().push(request);
        let reply = self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(HttpResponse { status: 599, body: String::new() }));
        async move { reply }.boxed_local()
    }
}

#[derive(Default)]
pub struct StubBrowser {
    pub path: RefCell<String>,
    pub redirects: RefCell<Vec<String>>,
    pub notices: RefCell<Vec<Notice>>,
}

impl Browser for StubBrowser {
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

pub struct Stubs {
    pub client: ApiClient,
    pub transport: Rc<StubTransport>,
    pub browser: Rc<StubBrowser>,
    pub session: Rc<SessionStore>,
}

pub fn stubs() -> Stubs {
    let transport = Rc::new(StubTransport::default());
    let browser = Rc::new(StubBrowser::default());
    *browser.path.borrow_mut() = "/auth/login".to_owned();
    let session = Rc::new(SessionStore::in_memory());
    let client = ApiClient::new(
        PortalConfig::with_base_url("https://api.test"),
        transport.clone(),
        Rc::clone(&session),
        browser.clone(),
    );
    Stubs { client, transport, browser, session }
}
