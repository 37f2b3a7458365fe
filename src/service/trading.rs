use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::ProviderBuilder;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{Json, ServerHandler, tool, tool_handler, tool_router};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::chain::{AlloyChainFactory, BindingRegistry, ChainFactory};
use crate::config::Config;
use crate::service::amounts;
use crate::service::error::ServiceError;
use crate::service::notify::Notifier;
use crate::service::orchestrator::{OperationKind, OperationState, OperationTracker, TxOrchestrator, TxStatus};
use crate::service::pairs::PairQueryService;
use crate::service::quote::{self, QuoteFeed, QuoteInput};
use crate::service::types::{
    AddLiquidityRequest, CreatePairRequest, CreateTokenRequest, DescribePairRequest,
    DescribePairResponse, LatestNotificationResponse, LatestQuoteResponse, ListPairsResponse,
    PairDetailsListResponse, QuoteRequest, QuoteResponse, SessionStatusResponse,
    SwapTokensRequest, UpdateQuoteInputResponse,
};
use crate::session::{LocalWalletProvider, SessionManager, WalletProvider};

/// Shared state behind every tool connection: the session, its contract
/// bindings, and the pipelines operating over them. One per process.
pub struct DexCore {
    pub session: Arc<SessionManager>,
    pub registry: Arc<BindingRegistry>,
    pub notifier: Notifier,
    pub tracker: OperationTracker,
    pub orchestrator: TxOrchestrator,
    pub pairs: PairQueryService,
    pub quotes: QuoteFeed,
}

impl DexCore {
    pub fn new(config: &Config) -> Self {
        let notifier = Notifier::new();
        let wallet = build_wallet(config);

        let factory: Arc<dyn ChainFactory> =
            Arc::new(AlloyChainFactory::new(&config.rpc.url, wallet.clone()));
        let registry = Arc::new(BindingRegistry::new(&config.contracts, factory));

        let session = SessionManager::new(wallet, notifier.clone());
        let tracker = OperationTracker::new();

        let orchestrator = TxOrchestrator::new(
            session.clone(),
            registry.clone(),
            notifier.clone(),
            tracker.clone(),
        );
        let pairs = PairQueryService::new(
            session.clone(),
            registry.clone(),
            notifier.clone(),
            tracker.clone(),
        );
        let quotes = QuoteFeed::new(session.clone(), registry.clone());

        Self {
            session,
            registry,
            notifier,
            tracker,
            orchestrator,
            pairs,
            quotes,
        }
    }
}

fn build_wallet(config: &Config) -> Option<Arc<dyn WalletProvider>> {
    let key = config.wallet.private_key.trim();
    if key.is_empty() || key.starts_with("${") {
        tracing::info!("no private key provided, wallet connection unavailable");
        return None;
    }

    let url = match config.rpc.url.parse() {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("invalid RPC URL: {e}. Wallet connection unavailable.");
            return None;
        }
    };

    let provider = ProviderBuilder::new().connect_http(url);
    match LocalWalletProvider::new(Arc::new(provider), key) {
        Ok(wallet) => {
            tracing::info!("wallet initialized with address: {}", wallet.address());
            Some(Arc::new(wallet))
        }
        Err(e) => {
            tracing::warn!("failed to initialize wallet: {e}. Wallet connection unavailable.");
            None
        }
    }
}

pub struct DexTradingService {
    tool_router: ToolRouter<Self>,
    core: Arc<DexCore>,
}

// MCP Tool Layer
#[tool_router]
impl DexTradingService {
    pub fn new(core: Arc<DexCore>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            core,
        }
    }

    #[instrument(skip(self))]
    #[tool(description = "Connect the configured wallet and open a session")]
    pub async fn connect_wallet(&self) -> Json<SessionStatusResponse> {
        Json(self.core.session.connect().await.into())
    }

    #[instrument(skip(self))]
    #[tool(description = "Disconnect the wallet session")]
    pub async fn disconnect_wallet(&self) -> Json<SessionStatusResponse> {
        Json(self.core.session.disconnect().into())
    }

    #[instrument(skip(self))]
    #[tool(description = "Current wallet session state")]
    pub async fn session_status(&self) -> Json<SessionStatusResponse> {
        Json(self.core.session.current().into())
    }

    #[instrument(skip(self))]
    #[tool(description = "Create a new token through the token factory")]
    pub async fn create_token(
        &self,
        Parameters(req): Parameters<CreateTokenRequest>,
    ) -> Json<TxStatus> {
        Json(self.create_token_impl(req).await)
    }

    #[instrument(skip(self))]
    #[tool(description = "Create a trading pair for two tokens")]
    pub async fn create_pair(
        &self,
        Parameters(req): Parameters<CreatePairRequest>,
    ) -> Json<TxStatus> {
        Json(self.create_pair_impl(req).await)
    }

    #[instrument(skip(self))]
    #[tool(description = "Deposit liquidity for a token pair through the router")]
    pub async fn add_liquidity(
        &self,
        Parameters(req): Parameters<AddLiquidityRequest>,
    ) -> Json<TxStatus> {
        Json(self.add_liquidity_impl(req).await)
    }

    #[instrument(skip(self))]
    #[tool(description = "Swap an exact amount of one token for another")]
    pub async fn swap_tokens(
        &self,
        Parameters(req): Parameters<SwapTokensRequest>,
    ) -> Json<TxStatus> {
        Json(self.swap_tokens_impl(req).await)
    }

    #[instrument(skip(self))]
    #[tool(description = "Read-only swap quote from the router")]
    pub async fn quote_swap(&self, Parameters(req): Parameters<QuoteRequest>) -> Json<QuoteResponse> {
        Json(self.quote_swap_impl(req).await)
    }

    #[instrument(skip(self))]
    #[tool(
        description = "Feed a swap-form edit into the debounced quote stream; read the result with latest_quote"
    )]
    pub async fn update_quote_input(
        &self,
        Parameters(req): Parameters<QuoteRequest>,
    ) -> Json<UpdateQuoteInputResponse> {
        Json(self.update_quote_input_impl(req))
    }

    #[instrument(skip(self))]
    #[tool(description = "Most recent debounced quote, if any")]
    pub async fn latest_quote(&self) -> Json<LatestQuoteResponse> {
        Json(LatestQuoteResponse {
            quote: self.core.quotes.latest(),
        })
    }

    #[instrument(skip(self))]
    #[tool(description = "All trading pair addresses in creation order")]
    pub async fn list_pairs(&self) -> Json<ListPairsResponse> {
        let pairs = self.core.pairs.list_pairs().await;
        Json(ListPairsResponse {
            pairs: pairs.iter().map(ToString::to_string).collect(),
        })
    }

    #[instrument(skip(self))]
    #[tool(description = "Constituent tokens of one trading pair")]
    pub async fn describe_pair(
        &self,
        Parameters(req): Parameters<DescribePairRequest>,
    ) -> Json<DescribePairResponse> {
        Json(self.describe_pair_impl(req).await)
    }

    #[instrument(skip(self))]
    #[tool(description = "Re-enumerate all pairs and resolve their tokens")]
    pub async fn refresh_pairs(&self) -> Json<PairDetailsListResponse> {
        Json(PairDetailsListResponse {
            pairs: self.core.pairs.refresh_pairs().await,
        })
    }

    #[instrument(skip(self))]
    #[tool(description = "Most recently published pair details aggregate")]
    pub async fn latest_pair_details(&self) -> Json<PairDetailsListResponse> {
        Json(PairDetailsListResponse {
            pairs: self.core.pairs.latest_details(),
        })
    }

    #[instrument(skip(self))]
    #[tool(description = "State of the one reported operation (idle, pending, succeeded, failed)")]
    pub async fn operation_status(&self) -> Json<OperationState> {
        Json(self.core.tracker.current())
    }

    #[instrument(skip(self))]
    #[tool(description = "Most recent user-visible notification")]
    pub async fn latest_notification(&self) -> Json<LatestNotificationResponse> {
        Json(LatestNotificationResponse {
            notification: self.core.notifier.latest(),
        })
    }
}

// Business Logic - Core implementation
impl DexTradingService {
    async fn create_token_impl(&self, req: CreateTokenRequest) -> TxStatus {
        let summary = format!("{} ({}) has been created successfully", req.name, req.symbol);

        self.core
            .orchestrator
            .run(OperationKind::CreateToken, summary, move |chain| async move {
                let total_supply = amounts::parse_units(&req.total_supply)?;
                Ok(chain
                    .create_token(&req.name, &req.symbol, total_supply)
                    .await?)
            })
            .await
    }

    async fn create_pair_impl(&self, req: CreatePairRequest) -> TxStatus {
        let summary = "Trading pair has been created successfully".to_string();

        self.core
            .orchestrator
            .run(OperationKind::CreatePair, summary, move |chain| async move {
                let token_a = parse_address(&req.token_a)?;
                let token_b = parse_address(&req.token_b)?;
                Ok(chain.create_pair(token_a, token_b).await?)
            })
            .await
    }

    async fn add_liquidity_impl(&self, req: AddLiquidityRequest) -> TxStatus {
        let summary = "Liquidity has been added to the pool".to_string();

        self.core
            .orchestrator
            .run(OperationKind::AddLiquidity, summary, move |chain| async move {
                let token_a = parse_address(&req.token_a)?;
                let token_b = parse_address(&req.token_b)?;
                let amount_a = amounts::parse_units(&req.amount_a)?;
                let amount_b = amounts::parse_units(&req.amount_b)?;
                Ok(chain
                    .add_liquidity(token_a, token_b, amount_a, amount_b)
                    .await?)
            })
            .await
    }

    async fn swap_tokens_impl(&self, req: SwapTokensRequest) -> TxStatus {
        let summary = "Tokens have been swapped successfully".to_string();
        let session = self.core.session.current();

        self.core
            .orchestrator
            .run(OperationKind::Swap, summary, move |chain| async move {
                // No same-token check: a token_in == token_out path goes to
                // the router untouched and fails there if it must.
                let token_in = parse_address(&req.token_in)?;
                let token_out = parse_address(&req.token_out)?;
                let to = session.account.ok_or(ServiceError::NotConnected)?;

                let amount_in = amounts::parse_units(&req.amount_in)?;
                let slippage = Decimal::from_str(req.slippage_tolerance.trim()).map_err(|e| {
                    ServiceError::InvalidAmount(format!("slippage {:?}: {e}", req.slippage_tolerance))
                })?;

                let path = vec![token_in, token_out];
                let quoted = chain.amounts_out(amount_in, path.clone()).await?;
                let expected = quoted.last().copied().ok_or_else(|| {
                    ServiceError::QuoteUnavailable("router returned no amounts".to_string())
                })?;

                let amount_out_min = amounts::min_output_after_slippage(expected, slippage);
                Ok(chain
                    .swap_exact_tokens(amount_in, amount_out_min, path, to)
                    .await?)
            })
            .await
    }

    async fn quote_swap_impl(&self, req: QuoteRequest) -> QuoteResponse {
        let path = match (parse_address(&req.token_in), parse_address(&req.token_out)) {
            (Ok(token_in), Ok(token_out)) => vec![token_in, token_out],
            _ => {
                return QuoteResponse {
                    amount_in: req.amount_in,
                    path: vec![req.token_in, req.token_out],
                    amounts_out: Vec::new(),
                };
            }
        };

        let chain = self
            .core
            .registry
            .bindings(&self.core.session.current())
            .ok();
        let amounts_out = quote::quote_amounts(chain, &req.amount_in, &path).await;

        QuoteResponse {
            amount_in: req.amount_in,
            path: path.iter().map(ToString::to_string).collect(),
            amounts_out,
        }
    }

    fn update_quote_input_impl(&self, req: QuoteRequest) -> UpdateQuoteInputResponse {
        // Presence checks only; an incomplete form clears the quote.
        let (token_in, token_out) = match (parse_address(&req.token_in), parse_address(&req.token_out)) {
            (Ok(token_in), Ok(token_out)) => (token_in, token_out),
            _ => {
                self.core.quotes.clear();
                return UpdateQuoteInputResponse { scheduled: false };
            }
        };

        if req.amount_in.trim().is_empty() {
            self.core.quotes.clear();
            return UpdateQuoteInputResponse { scheduled: false };
        }

        self.core.quotes.submit(QuoteInput {
            amount_in: req.amount_in,
            token_in,
            token_out,
        });
        UpdateQuoteInputResponse { scheduled: true }
    }

    async fn describe_pair_impl(&self, req: DescribePairRequest) -> DescribePairResponse {
        let Ok(address) = parse_address(&req.pair_address) else {
            return DescribePairResponse { pair: None };
        };

        DescribePairResponse {
            pair: self.core.pairs.describe_pair(address).await,
        }
    }
}

fn parse_address(value: &str) -> Result<Address, ServiceError> {
    let trimmed = value.trim();
    Address::from_str(trimmed).map_err(|e| ServiceError::InvalidAddress(format!("{trimmed:?}: {e}")))
}

#[tool_handler]
impl ServerHandler for DexTradingService {}
