// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Event decoding from pre-extracted log batches.

use alloy_primitives::{Address, U256};
use serde::Deserialize;

use crate::Error;

/// A raw event record as extracted from the chain:
/// `{ "event": <name>, "blockNumber": <n>, "returnValues": { ... } }`.
///
/// Amount fields are accepted either as decimal strings (the usual extractor
/// output) or as plain integers.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub event: String,
    #[serde(rename = "blockNumber")]
    pub block_number: u64,
    #[serde(rename = "returnValues", default)]
    pub return_values: serde_json::Value,
}

/// A decoded event, one case per recognized event kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    /// An issuer completed an attestation for an account.
    AttestationCompleted { account: Address, issuer: Address },
    /// An account designated a separate wallet to receive its credit.
    WalletAddressSet { account: Address, wallet: Address },
    /// A token transfer. The zero address as sender mints, as receiver burns.
    Transfer { from: Address, to: Address, value: U256 },
}

/// A decoded event together with the block it occurred in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedEvent {
    pub block_number: u64,
    pub event: ChainEvent,
}

impl RawEvent {
    /// Decode into a typed event. Unknown event names and malformed payloads
    /// are rejected here, at the boundary, never deep inside replay logic.
    pub fn decode(&self) -> Result<OrderedEvent, Error> {
        let event = match self.event.as_str() {
            "AttestationCompleted" => ChainEvent::AttestationCompleted {
                account: self.address_field("account")?,
                issuer: self.address_field("issuer")?,
            },
            "AccountWalletAddressSet" => ChainEvent::WalletAddressSet {
                account: self.address_field("account")?,
                wallet: self.address_field("walletAddress")?,
            },
            "Transfer" => ChainEvent::Transfer {
                from: self.address_field("from")?,
                to: self.address_field("to")?,
                value: self.amount_field("value")?,
            },
            other => {
                return Err(Error::UnknownEvent {
                    name: other.to_string(),
                    block: self.block_number,
                })
            }
        };
        Ok(OrderedEvent { block_number: self.block_number, event })
    }

    fn field(&self, name: &str) -> Result<&serde_json::Value, Error> {
        self.return_values
            .get(name)
            .ok_or_else(|| self.malformed(format!("missing field `{name}`")))
    }

    fn address_field(&self, name: &str) -> Result<Address, Error> {
        let value = self.field(name)?;
        let text = value
            .as_str()
            .ok_or_else(|| self.malformed(format!("field `{name}` is not a string")))?;
        text.parse::<Address>().map_err(|e| self.malformed(format!("field `{name}`: {e}")))
    }

    fn amount_field(&self, name: &str) -> Result<U256, Error> {
        match self.field(name)? {
            serde_json::Value::String(text) => text
                .parse::<U256>()
                .map_err(|e| self.malformed(format!("field `{name}`: {e}"))),
            serde_json::Value::Number(num) => num
                .as_u64()
                .map(U256::from)
                .ok_or_else(|| self.malformed(format!("field `{name}` is not a valid amount"))),
            _ => Err(self.malformed(format!("field `{name}` is not an amount"))),
        }
    }

    fn malformed(&self, reason: String) -> Error {
        Error::MalformedEvent { event: self.event.clone(), block: self.block_number, reason }
    }
}

/// Decode a batch of raw events, preserving order. Fails on the first
/// unknown or malformed event.
pub fn decode_events(raw: &[RawEvent]) -> Result<Vec<OrderedEvent>, Error> {
    raw.iter().map(RawEvent::decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(event: &str, block: u64, values: serde_json::Value) -> RawEvent {
        RawEvent { event: event.to_string(), block_number: block, return_values: values }
    }

    #[test]
    fn decodes_transfer_with_string_amount() {
        let event = raw(
            "Transfer",
            12,
            json!({
                "from": "0x0000000000000000000000000000000000000000",
                "to": "0x1111111111111111111111111111111111111111",
                "value": "100"
            }),
        );
        let decoded = event.decode().unwrap();
        assert_eq!(decoded.block_number, 12);
        assert_eq!(
            decoded.event,
            ChainEvent::Transfer {
                from: Address::ZERO,
                to: Address::repeat_byte(0x11),
                value: U256::from(100),
            }
        );
    }

    #[test]
    fn decodes_transfer_with_integer_amount() {
        let event = raw(
            "Transfer",
            5,
            json!({
                "from": "0x1111111111111111111111111111111111111111",
                "to": "0x2222222222222222222222222222222222222222",
                "value": 40
            }),
        );
        let ChainEvent::Transfer { value, .. } = event.decode().unwrap().event else {
            panic!("expected transfer");
        };
        assert_eq!(value, U256::from(40));
    }

    #[test]
    fn unknown_event_type_is_fatal() {
        let event = raw("Approval", 9, json!({}));
        let err = event.decode().unwrap_err();
        assert!(matches!(err, Error::UnknownEvent { ref name, block: 9 } if name == "Approval"));
    }

    #[test]
    fn missing_field_is_malformed() {
        let event = raw(
            "AttestationCompleted",
            3,
            json!({ "account": "0x1111111111111111111111111111111111111111" }),
        );
        let err = event.decode().unwrap_err();
        assert!(matches!(err, Error::MalformedEvent { block: 3, .. }));
    }

    #[test]
    fn decode_events_stops_at_first_unknown() {
        let batch = vec![
            raw(
                "AttestationCompleted",
                1,
                json!({
                    "account": "0x1111111111111111111111111111111111111111",
                    "issuer": "0x2222222222222222222222222222222222222222"
                }),
            ),
            raw("Burn", 2, json!({})),
        ];
        assert!(matches!(decode_events(&batch), Err(Error::UnknownEvent { .. })));
    }
}
