// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures of the registry HTTP API. Every response,
//! success or failure, uses the same envelope:
//!
//! ```json
//! {"code": 0, "data": 123400, "msg": "Request succeeded"}
//! ```
//!
//! `code` is `0` on success and an HTTP-style status code otherwise; the
//! response itself is always `200 OK`. `data` is the balance, the ETH
//! address, or `0` when there is nothing to return.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::registry::RegistryError;

/// Response envelope shared by all registry endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ApiResponse<T> {
    /// `0` on success, HTTP-style status code on failure
    pub code: u16,
    /// Endpoint payload
    pub data: T,
    /// Human-readable outcome
    pub msg: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, msg: impl Into<String>) -> Self {
        Self {
            code: 0,
            data,
            msg: msg.into(),
        }
    }
}

/// Query string of `/balance` and `/ethaddr`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccountQuery {
    /// Chain account name
    pub account: Option<String>,
}

impl AccountQuery {
    /// The account name, rejected when missing or blank.
    pub fn account(&self) -> Result<&str, RegistryError> {
        non_blank(self.account.as_deref(), "Account must not be empty")
    }
}

/// Body of `POST /reg`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Chain account name
    #[serde(default)]
    pub account: String,
    /// ERC-20 payout address
    #[serde(default)]
    pub ethaddr: String,
    /// `SIG_K1_` signature over `account=<account>&ethaddr=<ethaddr>`
    #[serde(default)]
    pub sig: String,
}

impl RegisterRequest {
    /// Reject blank fields before any lookup happens.
    ///
    /// Values are passed on untrimmed: the signature covers the exact bytes.
    pub fn validate(&self) -> Result<(), RegistryError> {
        non_blank(Some(&self.account), "Account must not be empty")?;
        non_blank(Some(&self.ethaddr), "ERC-20 address must not be empty")?;
        non_blank(Some(&self.sig), "Signature must not be empty")?;
        Ok(())
    }
}

fn non_blank<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, RegistryError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RegistryError::Validation(message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_wire_shape() {
        let json = serde_json::to_string(&ApiResponse::ok(5_i64, "ok")).unwrap();
        assert_eq!(json, r#"{"code":0,"data":5,"msg":"ok"}"#);

        let json = serde_json::to_string(&ApiResponse::ok("0xABC".to_string(), "ok")).unwrap();
        assert_eq!(json, r#"{"code":0,"data":"0xABC","msg":"ok"}"#);
    }

    #[test]
    fn account_query_rejects_blank() {
        assert!(AccountQuery { account: None }.account().is_err());
        assert!(AccountQuery { account: Some("   ".into()) }.account().is_err());
        assert_eq!(
            AccountQuery { account: Some("alice".into()) }.account().unwrap(),
            "alice"
        );
    }

    #[test]
    fn register_request_requires_every_field() {
        let full = RegisterRequest {
            account: "alice".into(),
            ethaddr: "0xABC".into(),
            sig: "SIG_K1_x".into(),
        };
        assert!(full.validate().is_ok());

        for blanked in 0..3 {
            let mut request = full.clone();
            match blanked {
                0 => request.account = " ".into(),
                1 => request.ethaddr = String::new(),
                _ => request.sig = "\t".into(),
            }
            assert!(matches!(
                request.validate(),
                Err(RegistryError::Validation(_))
            ));
        }
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let request: RegisterRequest = serde_json::from_str(r#"{"account":"alice"}"#).unwrap();
        assert_eq!(request.ethaddr, "");
        assert!(request.validate().is_err());
    }
}
