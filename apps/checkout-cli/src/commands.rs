//! # Cart Commands
//!
//! Runs one cart command and turns the result into the response envelope.
//!
//! ```text
//! ┌───────────────┐     ┌─────────────────┐     ┌──────────────────────────────┐
//! │  CartCommand  │────►│ CheckoutService │────►│ Reply                        │
//! │               │     │                 │     │  status: 200 / 201 / 4xx / 5xx│
//! │  Mutate(..)   │     │  run(mutation)  │     │  {"result": bool,            │
//! │  Display      │     │  display_cart() │     │   "message": text | cart}    │
//! └───────────────┘     └─────────────────┘     └──────────────────────────────┘
//! ```

use std::process::ExitCode;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use checkout_db::{CheckoutService, Mutation, ServiceError};

/// A command the CLI hands to the service.
#[derive(Debug, Clone)]
pub enum CartCommand {
    Mutate(Mutation),
    Display,
}

impl CartCommand {
    pub fn name(&self) -> &'static str {
        match self {
            CartCommand::Mutate(mutation) => mutation.name(),
            CartCommand::Display => "display_cart",
        }
    }
}

/// Response body printed on stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub result: bool,
    pub message: Value,
}

/// Envelope plus the status it would carry over HTTP.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub envelope: Envelope,
}

impl Reply {
    fn ok(status: u16, message: Value) -> Self {
        Reply {
            status,
            envelope: Envelope {
                result: true,
                message,
            },
        }
    }

    fn failed(err: &ServiceError) -> Self {
        Reply {
            status: err.status_code(),
            envelope: Envelope {
                result: false,
                message: Value::String(err.public_message()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.envelope.result
    }

    /// 0 on success, 2 for rejected requests, 3 for missing records,
    /// 1 for everything else.
    pub fn exit_status(&self) -> u8 {
        match self.status {
            200 | 201 => 0,
            400 => 2,
            404 => 3,
            _ => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.envelope)
            .unwrap_or_else(|_| r#"{"result": false, "message": "internal server error"}"#.to_string())
    }
}

/// Runs a command against the service.
pub async fn execute(service: &CheckoutService, command: CartCommand) -> Reply {
    let operation = command.name();

    let reply = match command {
        CartCommand::Mutate(mutation) => match service.run(mutation).await {
            Ok(outcome) => Reply::ok(
                outcome.status_code(),
                Value::String(outcome.message().to_string()),
            ),
            Err(err) => Reply::failed(&err),
        },
        CartCommand::Display => match service.display_cart().await {
            Ok(snapshot) => match serde_json::to_value(&snapshot) {
                Ok(body) => Reply::ok(200, body),
                Err(err) => Reply::failed(&ServiceError::Db(checkout_db::DbError::Internal(
                    err.to_string(),
                ))),
            },
            Err(err) => Reply::failed(&err),
        },
    };

    if reply.is_success() {
        info!(operation, status = reply.status, "Command succeeded");
    } else {
        warn!(operation, status = reply.status, "Command failed");
    }

    reply
}
