//! Bridge between the link-flow orchestrator and whatever front end hosts
//! the bank-link widget.
//!
//! The orchestrator awaits [`LinkSdkPort::open_link`]; the front end pulls
//! [`LinkRequest`]s off the receiver returned by [`ChannelLinkSdk::new`]
//! and completes each one with the widget's outcome.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use fw_core::link::LinkToken;
use fw_core::ports::{LinkOutcome, LinkSdkPort};

/// A pending request to open the link widget.
#[derive(Debug)]
pub struct LinkRequest {
    token: LinkToken,
    reply: oneshot::Sender<LinkOutcome>,
}

impl LinkRequest {
    pub fn token(&self) -> &LinkToken {
        &self.token
    }

    /// Report the widget's outcome back to the waiting flow.
    ///
    /// Dropping the request without completing it reads as an exit.
    pub fn complete(self, outcome: LinkOutcome) {
        if self.reply.send(outcome).is_err() {
            tracing::debug!("Link flow stopped waiting before the widget finished");
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelLinkSdk {
    requests: mpsc::Sender<LinkRequest>,
}

impl ChannelLinkSdk {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<LinkRequest>) {
        let (requests, receiver) = mpsc::channel(buffer.max(1));
        (Self { requests }, receiver)
    }
}

#[async_trait]
impl LinkSdkPort for ChannelLinkSdk {
    async fn open_link(&self, token: LinkToken) -> LinkOutcome {
        let (reply, outcome) = oneshot::channel();
        if self
            .requests
            .send(LinkRequest { token, reply })
            .await
            .is_err()
        {
            tracing::warn!("No front end is listening for link requests");
            return LinkOutcome::Error {
                message: "Bank linking is not available right now".to_string(),
            };
        }

        match outcome.await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::debug!("Link request dropped without an outcome");
                LinkOutcome::Exit
            }
        }
    }
}
