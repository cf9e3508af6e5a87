//! Single-assignment result channel between a loader and its callers.
//!
//! A [ResultSink] is consumed by [ResultSink::settle], so each request
//! can be settled at most once. If a sink is dropped without being
//! settled, its [DeferredHandle] resolves to an error instead of
//! waiting forever.

use crate::*;
use tokio::sync::oneshot;

type Settlement = LoaderResult<AccountValue>;

/// The loader side of one pending lookup.
#[derive(Debug)]
pub struct ResultSink(oneshot::Sender<Settlement>);

impl ResultSink {
    /// Settle the lookup. If the caller already dropped its handle the
    /// result is discarded.
    pub fn settle(self, result: Settlement) {
        let _ = self.0.send(result);
    }
}

/// The caller side of one pending lookup. Await it for the result.
#[derive(Debug)]
pub struct DeferredHandle {
    receiver: oneshot::Receiver<Settlement>,
    taken: bool,
}

/// Construct a linked sink and handle.
pub fn deferred() -> (ResultSink, DeferredHandle) {
    let (s, receiver) = oneshot::channel();
    (
        ResultSink(s),
        DeferredHandle {
            receiver,
            taken: false,
        },
    )
}

fn unsettled() -> LoaderError {
    LoaderError::other("result sink dropped before settlement")
}

fn already_taken() -> LoaderError {
    LoaderError::other("result already taken from this handle")
}

impl DeferredHandle {
    /// A handle that is already settled.
    pub fn settled(result: Settlement) -> Self {
        let (sink, handle) = deferred();
        sink.settle(result);
        handle
    }

    /// Take the result without waiting, if it is available.
    ///
    /// The result can be taken once. Later calls return `None`.
    pub fn try_result(&mut self) -> Option<Settlement> {
        if self.taken {
            return None;
        }
        let out = match self.receiver.try_recv() {
            Ok(r) => r,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(unsettled()),
        };
        self.taken = true;
        Some(out)
    }
}

impl std::future::Future for DeferredHandle {
    type Output = Settlement;

    fn poll(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        if self.taken {
            return std::task::Poll::Ready(Err(already_taken()));
        }
        let out = std::task::ready!(std::pin::Pin::new(&mut self.receiver)
            .poll(cx))
        .unwrap_or_else(|_| Err(unsettled()));
        self.taken = true;
        std::task::Poll::Ready(out)
    }
}
