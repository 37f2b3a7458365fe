use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::service::notify::Notification;
use crate::service::pairs::PairDetails;
use crate::service::quote::Quote;
use crate::session::Session;

fn default_slippage() -> String {
    "0.3".to_string()
}

#[derive(Debug, JsonSchema, Serialize, Deserialize)]
pub struct CreateTokenRequest {
    /// Token name, e.g. "My Token"
    pub name: String,
    /// Token symbol, e.g. "MTK"
    pub symbol: String,
    /// Total supply as a human decimal amount, e.g. "1000000"
    pub total_supply: String,
}

#[derive(Debug, JsonSchema, Serialize, Deserialize)]
pub struct CreatePairRequest {
    /// First token contract address
    pub token_a: String,
    /// Second token contract address
    pub token_b: String,
}

#[derive(Debug, JsonSchema, Serialize, Deserialize)]
pub struct AddLiquidityRequest {
    /// First token contract address
    pub token_a: String,
    /// Second token contract address
    pub token_b: String,
    /// Deposit amount of token A, human decimal
    pub amount_a: String,
    /// Deposit amount of token B, human decimal
    pub amount_b: String,
}

#[derive(Debug, JsonSchema, Serialize, Deserialize)]
pub struct SwapTokensRequest {
    /// Token contract address to sell
    pub token_in: String,
    /// Token contract address to buy
    pub token_out: String,
    /// Exact input amount, human decimal
    pub amount_in: String,
    /// Slippage tolerance as a percentage, e.g. "0.3"
    #[serde(default = "default_slippage")]
    pub slippage_tolerance: String,
}

#[derive(Debug, JsonSchema, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Input amount, human decimal
    pub amount_in: String,
    /// Token contract address to sell
    pub token_in: String,
    /// Token contract address to buy
    pub token_out: String,
}

#[derive(Debug, JsonSchema, Serialize, Deserialize)]
pub struct DescribePairRequest {
    /// Pair contract address
    pub pair_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, JsonSchema, Serialize)]
pub struct SessionStatusResponse {
    pub is_connected: bool,
    /// Connected account address, if any
    pub account: Option<String>,
    /// Chain id of the connected network, if any
    pub chain_id: Option<u64>,
}

impl From<Session> for SessionStatusResponse {
    fn from(session: Session) -> Self {
        Self {
            is_connected: session.is_connected,
            account: session.account.map(|account| account.to_string()),
            chain_id: session.chain_id,
        }
    }
}

#[derive(Debug, JsonSchema, Serialize)]
pub struct QuoteResponse {
    pub amount_in: String,
    pub path: Vec<String>,
    /// Amounts along the path, human decimal; empty when no quote exists
    pub amounts_out: Vec<String>,
}

#[derive(Debug, JsonSchema, Serialize)]
pub struct UpdateQuoteInputResponse {
    /// Whether a quote read was scheduled for the input
    pub scheduled: bool,
}

#[derive(Debug, JsonSchema, Serialize)]
pub struct LatestQuoteResponse {
    pub quote: Option<Quote>,
}

#[derive(Debug, JsonSchema, Serialize)]
pub struct ListPairsResponse {
    /// Pair addresses in on-chain creation order
    pub pairs: Vec<String>,
}

#[derive(Debug, JsonSchema, Serialize)]
pub struct DescribePairResponse {
    pub pair: Option<PairDetails>,
}

#[derive(Debug, JsonSchema, Serialize)]
pub struct PairDetailsListResponse {
    pub pairs: Vec<PairDetails>,
}

#[derive(Debug, JsonSchema, Serialize)]
pub struct LatestNotificationResponse {
    pub notification: Option<Notification>,
}
