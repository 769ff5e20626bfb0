use std::fmt::{self, Display};

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Consensus result codes returned by message handlers.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub enum Code {
    Ok,
    InternalError,
    Unauthorized,
    UnknownRequest,
    InvalidVault,
    EmptyChain,
    BadVersion,
    InvalidMessage,
    InsufficientFunds,
    SwapFailSlip,
}

impl Code {
    /// The numeric form surfaced through the consensus engine; zero is
    /// success, everything else rejection.
    pub fn value(&self) -> u32 {
        match self {
            Code::Ok => 0,
            Code::InternalError => 1,
            Code::Unauthorized => 2,
            Code::UnknownRequest => 3,
            Code::InvalidVault => 4,
            Code::EmptyChain => 5,
            Code::BadVersion => 6,
            Code::InvalidMessage => 7,
            Code::InsufficientFunds => 8,
            Code::SwapFailSlip => 9,
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A handler rejection: carries the result code surfaced to the consensus
/// engine and a human-readable reason, which also rides along in refund
/// memos.
///
/// Handler errors are non-fatal to the block. Anything else propagating out
/// of a handler is an infrastructure failure and aborts the commit.
#[derive(Clone, Debug, Error)]
#[error("{code}: {reason}")]
pub struct HandlerError {
    pub code: Code,
    pub reason: String,
}

impl HandlerError {
    pub fn new(code: Code, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(Code::InternalError, reason)
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::new(Code::Unauthorized, reason)
    }

    pub fn unknown_request(reason: impl Into<String>) -> Self {
        Self::new(Code::UnknownRequest, reason)
    }

    pub fn invalid_vault(reason: impl Into<String>) -> Self {
        Self::new(Code::InvalidVault, reason)
    }

    pub fn invalid_message(reason: impl Into<String>) -> Self {
        Self::new(Code::InvalidMessage, reason)
    }

    pub fn insufficient_funds(reason: impl Into<String>) -> Self {
        Self::new(Code::InsufficientFunds, reason)
    }
}
