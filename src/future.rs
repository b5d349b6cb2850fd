//! Bridge from callback-based execution to `async`/`.await`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use docql_core::{Document, DocqlError, DocqlResult, ResultCallback};

/// Resolves with whatever the paired callback receives.
pub struct CallbackFuture {
    rx: oneshot::Receiver<DocqlResult<Vec<Document>>>,
}

impl Future for CallbackFuture {
    type Output = DocqlResult<Vec<Document>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(DocqlError::StoreError(
                    "Callback dropped without a result".to_string(),
                ))
            })
        })
    }
}

/// Create a [`ResultCallback`] and the future that completes when it is called.
///
/// ```rust,no_run
/// # async fn example(store: docql::MemoryStore) -> docql::DocqlResult<()> {
/// let (callback, results) = docql::callback_future();
/// docql::query_async("select * from God", &store, callback, &docql::IdentityResolver)?;
/// let docs = results.await?;
/// # Ok(())
/// # }
/// ```
pub fn callback_future() -> (ResultCallback, CallbackFuture) {
    let (tx, rx) = oneshot::channel();
    let callback: ResultCallback = Box::new(move |result| {
        // receiver gone means nobody is waiting any more
        let _ = tx.send(result);
    });
    (callback, CallbackFuture { rx })
}
