use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use rmcp::schemars::{self, JsonSchema};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

use crate::chain::{BindingRegistry, DexChain};
use crate::service::amounts;
use crate::session::SessionManager;

/// Settle window between the last input change and the quote read.
pub const QUOTE_DEBOUNCE: Duration = Duration::from_millis(500);

/// One edit of the swap form: input amount plus the two-token path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteInput {
    pub amount_in: String,
    pub token_in: Address,
    pub token_out: Address,
}

/// A non-binding estimate of swap output, recomputed per input change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Quote {
    pub amount_in: String,
    pub path: Vec<String>,
    /// Human-decimal amounts along the path; empty when the read failed.
    pub amounts_out: Vec<String>,
    pub issued_at: i64,
}

/// Debounced quote recomputation.
///
/// Rapid successive inputs collapse to the most recent one; after the settle
/// window the router is read and the result published. Each issued read
/// carries a monotonically increasing sequence number and is applied only if
/// it is still the latest issued, so a slow stale response can never
/// overwrite the quote for a newer input.
pub struct QuoteFeed {
    inputs: mpsc::UnboundedSender<Option<QuoteInput>>,
    latest: watch::Receiver<Option<Quote>>,
    worker: JoinHandle<()>,
}

impl QuoteFeed {
    pub fn new(session: Arc<SessionManager>, registry: Arc<BindingRegistry>) -> Self {
        let (inputs, input_rx) = mpsc::unbounded_channel();
        let (latest_tx, latest) = watch::channel(None);
        let worker = tokio::spawn(run_feed(input_rx, latest_tx, session, registry));

        Self {
            inputs,
            latest,
            worker,
        }
    }

    /// Schedules a quote for `input`, superseding any pending input.
    pub fn submit(&self, input: QuoteInput) {
        let _ = self.inputs.send(Some(input));
    }

    /// Drops any pending input and clears the published quote.
    pub fn clear(&self) {
        let _ = self.inputs.send(None);
    }

    pub fn latest(&self) -> Option<Quote> {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Quote>> {
        self.latest.clone()
    }
}

impl Drop for QuoteFeed {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_feed(
    mut inputs: mpsc::UnboundedReceiver<Option<QuoteInput>>,
    latest: watch::Sender<Option<Quote>>,
    session: Arc<SessionManager>,
    registry: Arc<BindingRegistry>,
) {
    let mut pending: Option<QuoteInput> = None;
    let mut issued: u64 = 0;
    let mut in_flight: JoinSet<(u64, Quote)> = JoinSet::new();

    let debounce = tokio::time::sleep(QUOTE_DEBOUNCE);
    tokio::pin!(debounce);

    loop {
        tokio::select! {
            message = inputs.recv() => match message {
                None => break,
                Some(None) => {
                    pending = None;
                    // Invalidate reads still in flight for the cleared input.
                    issued += 1;
                    latest.send_replace(None);
                }
                Some(Some(input)) => {
                    pending = Some(input);
                    debounce
                        .as_mut()
                        .reset(tokio::time::Instant::now() + QUOTE_DEBOUNCE);
                }
            },
            () = &mut debounce, if pending.is_some() => {
                if let Some(input) = pending.take() {
                    issued += 1;
                    let seq = issued;
                    let chain = registry.bindings(&session.current()).ok();
                    in_flight.spawn(async move {
                        (seq, fetch_quote(chain, input).await)
                    });
                }
            },
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Ok((seq, quote)) = joined
                    && seq == issued
                {
                    latest.send_replace(Some(quote));
                }
            },
        }
    }
}

async fn fetch_quote(chain: Option<Arc<dyn DexChain>>, input: QuoteInput) -> Quote {
    let path = vec![input.token_in, input.token_out];
    let amounts_out = quote_amounts(chain, &input.amount_in, &path).await;

    Quote {
        amount_in: input.amount_in,
        path: path.iter().map(ToString::to_string).collect(),
        amounts_out,
        issued_at: chrono::Utc::now().timestamp(),
    }
}

/// Router quote with the read-side failure contract: any failure (no
/// bindings, bad amount, RPC or contract error) yields an empty sequence,
/// never an error.
pub(crate) async fn quote_amounts(
    chain: Option<Arc<dyn DexChain>>,
    amount_in: &str,
    path: &[Address],
) -> Vec<String> {
    let Some(chain) = chain else {
        return Vec::new();
    };

    let amount_in = match amounts::parse_units(amount_in) {
        Ok(amount) => amount,
        Err(e) => {
            tracing::debug!("quote skipped: {e}");
            return Vec::new();
        }
    };

    match chain.amounts_out(amount_in, path.to_vec()).await {
        Ok(amounts) => amounts.into_iter().map(amounts::format_units).collect(),
        Err(e) => {
            tracing::debug!("quote failed: {e}");
            Vec::new()
        }
    }
}
