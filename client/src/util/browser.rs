//! Page-level side effects the network layer is allowed to trigger.
//!
//! SYSTEM CONTEXT
//! ==============
//! The HTTP client must read the current location, force a hard navigation to
//! the login page on unrecoverable auth failure, and surface transient error
//! notices. Those effects go through `Browser` so the client stays testable
//! outside a window.

use std::rc::Rc;

/// Severity of a user-facing notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message shown on the error channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }
}

/// Page environment seen by the HTTP client.
pub trait Browser {
    /// Current path (without origin).
    fn location_path(&self) -> String;

    /// Full page navigation, dropping client-side state.
    fn hard_redirect(&self, path: &str);

    fn notify(&self, notice: Notice);
}

type NoticeSink = Rc<dyn Fn(Notice)>;

/// `window.location` backed environment.
#[derive(Clone, Default)]
pub struct WindowBrowser {
    sink: Option<NoticeSink>,
}

impl WindowBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route notices to `sink` in addition to the console.
    #[must_use]
    pub fn with_notice_sink(mut self, sink: impl Fn(Notice) + 'static) -> Self {
        self.sink = Some(Rc::new(sink));
        self
    }
}

impl Browser for WindowBrowser {
    fn location_path(&self) -> String {
        #[cfg(feature = "hydrate")]
        {
            web_sys::window()
                .and_then(|w| w.location().pathname().ok())
                .unwrap_or_else(|| "/".to_owned())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            "/".to_owned()
        }
    }

    fn hard_redirect(&self, path: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(path);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            leptos::logging::log!("redirect requested outside a browser: {path}");
        }
    }

    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => leptos::logging::warn!("{}", notice.message),
            NoticeLevel::Info => leptos::logging::log!("{}", notice.message),
        }
        if let Some(sink) = &self.sink {
            sink(notice);
        }
    }
}
