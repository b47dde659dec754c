//! Scripted transport for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use reqwest::Url;
use tokio::sync::oneshot;

use crate::action::{Action, ActionError, ActionInvoker};
use crate::transport::{Transport, TransportResponse};

pub(crate) type Reply = Result<TransportResponse, ActionError>;

enum Scripted {
    Now(Reply),
    Deferred(oneshot::Receiver<Reply>),
}

/// Answers requests from a queue, in order, and records every URL.
#[derive(Default)]
pub(crate) struct MockTransport {
    replies: RefCell<VecDeque<Scripted>>,
    requests: RefCell<Vec<Url>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply_ok(&self, body: &str) {
        self.reply_status(200, body);
    }

    pub(crate) fn reply_status(&self, status: u16, body: &str) {
        self.replies
            .borrow_mut()
            .push_back(Scripted::Now(Ok(TransportResponse {
                status,
                body: body.to_string(),
            })));
    }

    pub(crate) fn reply_transport_error(&self, message: &str) {
        self.replies
            .borrow_mut()
            .push_back(Scripted::Now(Err(ActionError::Transport(message.to_string()))));
    }

    /// Queue a reply that is only delivered once the sender fires.
    pub(crate) fn reply_deferred(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.borrow_mut().push_back(Scripted::Deferred(rx));
        tx
    }

    pub(crate) fn requests(&self) -> Vec<Url> {
        self.requests.borrow().clone()
    }

    pub(crate) fn requests_for(&self, action: Action) -> Vec<Url> {
        let path = action.path();
        self.requests
            .borrow()
            .iter()
            .filter(|url| url.path() == path)
            .cloned()
            .collect()
    }
}

impl Transport for MockTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, ActionError> {
        self.requests.borrow_mut().push(url.clone());
        let next = self.replies.borrow_mut().pop_front();
        match next {
            Some(Scripted::Now(reply)) => reply,
            Some(Scripted::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ActionError::Transport("reply dropped".into()))),
            None => panic!("unexpected request: {url}"),
        }
    }
}

pub(crate) fn ok(body: &str) -> Reply {
    status(200, body)
}

pub(crate) fn status(status: u16, body: &str) -> Reply {
    Ok(TransportResponse {
        status,
        body: body.to_string(),
    })
}

pub(crate) fn invoker() -> ActionInvoker<MockTransport> {
    ActionInvoker::new(
        Url::parse("http://repo.example:8090").unwrap(),
        MockTransport::new(),
    )
}

/// Decoded value of a query parameter
pub(crate) fn param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
