//! REST API for the blockchain demo
//!
//! Each client opens a session and drives its own ledger: queue transactions,
//! mine, and read back the chain. A stateless hashing endpoint sits beside the
//! session routes.

use axum::{
    extract::{Path, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use crate::blockchain::{Block, Blockchain};
use crate::cli::{check_amount, check_hash_text};
use crate::config::{Config, MiningConfig};
use crate::crypto::hash_text;
use crate::error::ChainError;
use crate::miner::mine_pending;
use crate::session::SessionStore;
use crate::transaction::Transaction;

pub const PENDING_FULL_MESSAGE: &str = "Pending transactions full. Mine a new block to add more.";

/// Shared state handed to every handler
pub struct AppState {
    pub sessions: SessionStore,
    pub mining: MiningConfig,
    api_stats: RwLock<ApiStats>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            sessions: SessionStore::new(config.server.max_sessions),
            mining: config.mining.clone(),
            api_stats: RwLock::new(ApiStats::new()),
        }
    }

    pub async fn get_stats(&self) -> ApiStatsResponse {
        let stats = self.api_stats.read().await;
        ApiStatsResponse {
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            failed_requests: stats.failed_requests,
            sessions_created: stats.sessions_created,
            transactions_submitted: stats.transactions_submitted,
            blocks_mined: stats.blocks_mined,
            open_sessions: self.sessions.len().await,
            uptime_seconds: stats.start_time.elapsed().as_secs(),
        }
    }
}

/// API statistics and monitoring
#[derive(Debug)]
struct ApiStats {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    sessions_created: u64,
    transactions_submitted: u64,
    blocks_mined: u64,
    start_time: Instant,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            sessions_created: 0,
            transactions_submitted: 0,
            blocks_mined: 0,
            start_time: Instant::now(),
        }
    }

    fn record_request(&mut self, success: bool) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Chain(ChainError),
    InvalidInput(String),
    PendingFull,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Chain(err) => {
                let status = match err {
                    ChainError::SessionNotFound(_) => StatusCode::NOT_FOUND,
                    ChainError::SessionLimitReached(_) => StatusCode::SERVICE_UNAVAILABLE,
                    ChainError::NothingToMine => StatusCode::CONFLICT,
                    ChainError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PendingFull => (StatusCode::CONFLICT, PENDING_FULL_MESSAGE.to_string()),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::Chain(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
}

/// A block as rendered to clients: its fields plus its own hash.
#[derive(Serialize)]
pub struct BlockView {
    #[serde(flatten)]
    pub block: Block,
    pub hash: String,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        BlockView {
            hash: Blockchain::hash(block),
            block: block.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub blocks: Vec<BlockView>,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub count: usize,
    pub capacity: usize,
    pub transactions: Vec<Transaction>,
}

#[derive(Deserialize)]
pub struct SubmitTransactionRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

#[derive(Serialize)]
pub struct SubmitTransactionResponse {
    pub position: usize,
    pub message: String,
}

#[derive(Serialize)]
pub struct MinedBlockResponse {
    pub block: BlockView,
    pub message: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct HashRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct HashResponse {
    pub input: String,
    pub sha256: String,
}

#[derive(Serialize)]
pub struct ApiStatsResponse {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub sessions_created: u64,
    pub transactions_submitted: u64,
    pub blocks_mined: u64,
    pub open_sessions: usize,
    pub uptime_seconds: u64,
}

// ============================================================================
// Middleware
// ============================================================================

async fn stats_middleware(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let success = response.status().is_success();
    state.api_stats.write().await.record_request(success);

    response
}

/// Logs method, path, status and duration of every request.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints
pub fn build_api_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::DELETE,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    let api_routes = Router::new()
        // Session endpoints
        .route("/sessions", post(create_session))
        .route("/sessions/:id", axum::routing::delete(delete_session))
        .route("/sessions/:id/chain", get(get_chain))
        .route("/sessions/:id/pending", get(get_pending))
        .route("/sessions/:id/transactions", post(submit_transaction))
        .route("/sessions/:id/mine", post(mine_block))
        .route("/sessions/:id/verify", get(verify_chain))
        // Hashing utility
        .route("/hash", post(hash_handler))
        // System endpoints
        .route("/health", get(health_check))
        .route("/stats", get(get_api_stats))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), stats_middleware))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

/// Bind `addr` and serve the API until the process is stopped.
pub async fn run_api_server(
    state: Arc<AppState>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_api_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "sessions": state.sessions.len().await,
        "max_sessions": state.sessions.max_sessions(),
    }))
}

async fn get_api_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.get_stats().await)
}

async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session_id = state.sessions.create().await?;
    state.api_stats.write().await.sessions_created += 1;

    Ok((StatusCode::CREATED, Json(SessionResponse { session_id })))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_chain(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ChainResponse>, ApiError> {
    let response = state
        .sessions
        .with_ledger(&id, |chain| ChainResponse {
            length: chain.len(),
            blocks: chain.chain().iter().map(BlockView::from).collect(),
        })
        .await?;
    Ok(Json(response))
}

async fn get_pending(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PendingResponse>, ApiError> {
    let response = state
        .sessions
        .with_ledger(&id, |chain| PendingResponse {
            count: chain.pending().len(),
            capacity: chain.pending_capacity(),
            transactions: chain.pending().to_vec(),
        })
        .await?;
    Ok(Json(response))
}

async fn submit_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SubmitTransactionRequest>,
) -> Result<(StatusCode, Json<SubmitTransactionResponse>), ApiError> {
    check_amount(req.amount)?;

    let position = state
        .sessions
        .with_ledger_mut(&id, |chain| {
            chain.submit_transaction(req.sender, req.recipient, req.amount)
        })
        .await?
        .ok_or(ApiError::PendingFull)?;

    state.api_stats.write().await.transactions_submitted += 1;

    Ok((
        StatusCode::CREATED,
        Json(SubmitTransactionResponse {
            position,
            message: "Transaction added to pending transactions!".to_string(),
        }),
    ))
}

async fn mine_block(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MinedBlockResponse>), ApiError> {
    let range = state.mining.proof_range();
    let block = state
        .sessions
        .with_ledger_mut(&id, |chain| {
            mine_pending(chain, &mut rand::thread_rng(), range)
        })
        .await??;

    state.api_stats.write().await.blocks_mined += 1;

    Ok((
        StatusCode::CREATED,
        Json(MinedBlockResponse {
            block: BlockView::from(&block),
            message: "New block mined and added to the blockchain!".to_string(),
        }),
    ))
}

async fn verify_chain(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let result = state
        .sessions
        .with_ledger(&id, |chain| chain.verify_links())
        .await?;

    Ok(Json(VerifyResponse {
        valid: result.is_ok(),
        error: result.err().map(|e| e.to_string()),
    }))
}

async fn hash_handler(Json(req): Json<HashRequest>) -> Result<Json<HashResponse>, ApiError> {
    check_hash_text(&req.text).map_err(ApiError::InvalidInput)?;

    Ok(Json(HashResponse {
        sha256: hash_text(&req.text),
        input: req.text,
    }))
}
