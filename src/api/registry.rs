// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registry endpoints: balance, ETH address lookup and registration.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::{
    error::ApiError,
    models::{AccountQuery, ApiResponse, RegisterRequest},
    state::AppState,
};

const SUCCESS: &str = "Request succeeded";

fn account_query(
    query: Result<Query<AccountQuery>, QueryRejection>,
) -> Result<AccountQuery, ApiError> {
    query
        .map(|Query(query)| query)
        .map_err(|e| ApiError::bad_request(format!("Malformed query: {}", e.body_text())))
}

/// Get the snapshotted token balance of an account.
///
/// An unknown account that exists on chain is registered with a zero balance.
#[utoipa::path(
    get,
    path = "/balance",
    tag = "Registry",
    params(AccountQuery),
    responses(
        (status = 200, description = "Balance in minor units; `code` 400 for a missing or unknown account, 503 when the chain is unavailable", body = ApiResponse<i64>)
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    query: Result<Query<AccountQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<i64>>, ApiError> {
    let query = account_query(query)?;
    let account = query.account()?;
    let balance = state.registry.get_balance(account).await?;
    Ok(Json(ApiResponse::ok(balance, SUCCESS)))
}

/// Get the ETH address registered for an account (empty if none).
#[utoipa::path(
    get,
    path = "/ethaddr",
    tag = "Registry",
    params(AccountQuery),
    responses(
        (status = 200, description = "Registered address; `code` 400 for a missing or unknown account", body = ApiResponse<String>)
    )
)]
pub async fn get_eth_address(
    State(state): State<AppState>,
    query: Result<Query<AccountQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let query = account_query(query)?;
    let account = query.account()?;
    let eth_address = state.registry.get_eth_address(account).await?;
    Ok(Json(ApiResponse::ok(eth_address, SUCCESS)))
}

/// Register an ERC-20 payout address for an account.
///
/// `sig` must be a `SIG_K1_` signature by the account's active key over
/// `account=<account>&ethaddr=<ethaddr>`. The body is decoded as JSON
/// whatever its `Content-Type`.
#[utoipa::path(
    post,
    path = "/reg",
    tag = "Registry",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration outcome; `code` 400 for a malformed request or unknown account, 401 when the signature does not verify", body = ApiResponse<i64>)
    )
)]
pub async fn register_eth_address(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<i64>>, ApiError> {
    let request: RegisterRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("Malformed request body"))?;
    request.validate()?;

    state
        .registry
        .register(&request.account, &request.ethaddr, &request.sig)
        .await?;

    Ok(Json(ApiResponse::ok(0, "ERC-20 address registered")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use super::*;
    use crate::blockchain::client::testing::FakeChain;
    use crate::blockchain::signature::testing::{public_key_string, sign, signing_key};
    use crate::registry::registration_message;
    use crate::storage::{InMemoryStore, RegistryRecord, RegistryStore};

    fn state_with(records: Vec<RegistryRecord>, chain: FakeChain) -> (AppState, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::with_records(records));
        (AppState::new(store.clone(), Arc::new(chain)), store)
    }

    fn query(account: &str) -> Result<Query<AccountQuery>, QueryRejection> {
        Ok(Query(AccountQuery {
            account: Some(account.to_string()),
        }))
    }

    fn body(request: serde_json::Value) -> Bytes {
        Bytes::from(request.to_string())
    }

    #[tokio::test]
    async fn balance_returns_envelope() {
        let (state, _) = state_with(vec![RegistryRecord::new("alice", "K", 123_400)], FakeChain::default());

        let Json(response) = get_balance(State(state), query("alice")).await.unwrap();

        assert_eq!(response, ApiResponse::ok(123_400, SUCCESS));
    }

    #[tokio::test]
    async fn balance_of_ghost_is_rejected() {
        let (state, _) = state_with(vec![], FakeChain::default());

        let err = get_balance(State(state), query("ghost")).await.unwrap_err();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Account does not exist");
    }

    #[tokio::test]
    async fn balance_requires_account() {
        let (state, _) = state_with(vec![], FakeChain::default());

        let err = get_balance(State(state), Ok(Query(AccountQuery::default())))
            .await
            .unwrap_err();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn eth_address_of_unlinked_account_is_empty() {
        let (state, _) = state_with(vec![RegistryRecord::new("alice", "K", 1)], FakeChain::default());

        let Json(response) = get_eth_address(State(state), query("alice")).await.unwrap();

        assert_eq!(response.data, "");
        assert_eq!(response.code, 0);
    }

    #[tokio::test]
    async fn register_links_address() {
        let key = signing_key(0x21);
        let (state, store) = state_with(
            vec![RegistryRecord::new("alice", public_key_string(&key), 1)],
            FakeChain::default(),
        );
        let request = serde_json::json!({
            "account": "alice",
            "ethaddr": "0xABC",
            "sig": sign(&key, registration_message("alice", "0xABC").as_bytes()),
        });

        let Json(response) = register_eth_address(State(state), body(request))
            .await
            .unwrap();

        assert_eq!(response.code, 0);
        assert_eq!(store.find("alice").await.unwrap().eth_address, "0xABC");
    }

    #[tokio::test]
    async fn register_with_bad_signature_is_unauthorized() {
        let owner = signing_key(0x22);
        let other = signing_key(0x23);
        let (state, store) = state_with(
            vec![RegistryRecord::new("alice", public_key_string(&owner), 1)],
            FakeChain::default(),
        );
        let request = serde_json::json!({
            "account": "alice",
            "ethaddr": "0xABC",
            "sig": sign(&other, registration_message("alice", "0xABC").as_bytes()),
        });

        let err = register_eth_address(State(state), body(request))
            .await
            .unwrap_err();

        assert_eq!(err.code, StatusCode::UNAUTHORIZED);
        assert_eq!(store.find("alice").await.unwrap().eth_address, "");
    }

    #[tokio::test]
    async fn register_rejects_blank_fields() {
        let (state, _) = state_with(vec![], FakeChain::default());
        let request = serde_json::json!({"account": "alice", "ethaddr": "  ", "sig": "SIG_K1_x"});

        let err = register_eth_address(State(state), body(request))
            .await
            .unwrap_err();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
    }
}
