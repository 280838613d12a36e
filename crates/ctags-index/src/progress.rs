//! Work-done progress (`$/progress`) around long index operations.

use std::{
    panic::AssertUnwindSafe,
    sync::atomic::{AtomicU64, Ordering},
};

use futures::FutureExt;
use tower_lsp::{Client, lsp_types::*};
use tracing::{debug, warn};

static NEXT_PROGRESS_ID: AtomicU64 = AtomicU64::new(1);
const PROGRESS_TITLE_PREFIX: &str = "ctags-index:";

/// An open progress session. Dropping it without [`end`](Self::end) still
/// closes the session on the client.
pub struct ProgressToken {
    client: Option<Client>,
    token: Option<NumberOrString>,
}

impl ProgressToken {
    /// Ask the client for a token, then send `Begin`.
    ///
    /// The create request is spawned rather than awaited, so a client that
    /// never answers does not stall the caller.
    pub async fn begin(
        client: &Client,
        title: &str,
        message: Option<String>,
    ) -> Self {
        let id = NEXT_PROGRESS_ID.fetch_add(1, Ordering::Relaxed);
        let token = NumberOrString::String(format!("ctagsIndex/{title}/{id}"));
        let display_title = prefixed_title(title);

        let create_client = client.clone();
        let create_token = token.clone();
        tokio::spawn(async move {
            let result = AssertUnwindSafe(create_client.send_request::<request::WorkDoneProgressCreate>(
                WorkDoneProgressCreateParams {
                    token: create_token,
                },
            ))
            .catch_unwind()
            .await;
            match result {
                Ok(Ok(())) => {},
                Ok(Err(error)) => debug!("[progress] create refused: {error}"),
                Err(_) => warn!("[progress] create panicked (client gone?)"),
            }
        });

        let begin = WorkDoneProgress::Begin(WorkDoneProgressBegin {
            title: display_title.clone(),
            cancellable: Some(false),
            message,
            percentage: None,
        });
        if !send(client, token.clone(), begin).await {
            return Self {
                client: None,
                token: None,
            };
        }

        debug!("[progress] begin: {display_title}");
        Self {
            client: Some(client.clone()),
            token: Some(token),
        }
    }

    pub async fn end(
        mut self,
        message: Option<String>,
    ) {
        let (Some(client), Some(token)) = (self.client.take(), self.token.take()) else {
            return;
        };
        debug!("[progress] end: {token:?}");
        send(
            &client,
            token,
            WorkDoneProgress::End(WorkDoneProgressEnd {
                message,
            }),
        )
        .await;
    }
}

impl Drop for ProgressToken {
    fn drop(&mut self) {
        if let (Some(client), Some(token)) = (self.client.take(), self.token.take()) {
            debug!("[progress] dropped: {token:?}");
            tokio::spawn(async move {
                send(
                    &client,
                    token,
                    WorkDoneProgress::End(WorkDoneProgressEnd {
                        message: Some("Cancelled".to_string()),
                    }),
                )
                .await;
            });
        }
    }
}

/// Returns `false` if sending panicked (client disconnected).
async fn send(
    client: &Client,
    token: NumberOrString,
    value: WorkDoneProgress,
) -> bool {
    let sent = AssertUnwindSafe(client.send_notification::<notification::Progress>(ProgressParams {
        token,
        value: ProgressParamsValue::WorkDone(value),
    }))
    .catch_unwind()
    .await;
    if sent.is_err() {
        warn!("[progress] notification panicked (client gone?)");
    }
    sent.is_ok()
}

pub(crate) fn prefixed_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.starts_with(PROGRESS_TITLE_PREFIX) {
        return trimmed.to_owned();
    }
    format!("{PROGRESS_TITLE_PREFIX} {trimmed}")
}

#[cfg(test)]
#[path = "../tests/src/progress_tests.rs"]
mod tests;
