//! JSON adapter for transactions
//!
//! Reads untyped `serde_json::Value` objects into `Transaction`,
//! `Output` and `SignedTransaction`. Every violation is collected with the
//! path of its field (`outputs[1].amount`) instead of stopping at the first.

use std::fmt;

use serde_json::{json, Map, Value};

use crate::config::is_reserved_network_byte;
use crate::core::{Address, AddressType, Coin, Output, SignedTransaction, Transaction};
use crate::crypto::{PublicKey, Signature};
use crate::entities::constants::MAX_OUTPUTS_COUNT;
use crate::entities::Sha256Hash;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// All field errors found in one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// First error reported for `path`
    pub fn get(&self, path: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.path == path)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid object: ")?;
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Field reader
// =============================================================================

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

#[derive(Default)]
struct FieldReader {
    errors: Vec<FieldError>,
}

impl FieldReader {
    fn fail(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => {
                let errors = ValidationErrors(self.errors);
                log::warn!("{}", errors);
                Err(errors)
            }
        }
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        let object = value.as_object();
        if object.is_none() {
            self.fail(path, "not an object");
        }
        object
    }

    fn required<'v>(&mut self, object: &'v Map<String, Value>, key: &str, path: &str) -> Option<&'v Value> {
        match object.get(key) {
            None | Some(Value::Null) => {
                self.fail(join(path, key), "is required");
                None
            }
            Some(value) => Some(value),
        }
    }

    fn string<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v str> {
        let text = value.as_str();
        if text.is_none() {
            self.fail(path, "not a string");
        }
        text
    }

    fn address(&mut self, value: &Value, path: &str) -> Option<Address> {
        let text = self.string(value, path)?;
        Address::parse(text)
            .map_err(|e| self.fail(path, format!("invalid address: {}", e)))
            .ok()
    }

    /// Decimal string, or a JSON integer
    fn amount(&mut self, value: &Value, path: &str) -> Option<Coin> {
        let parsed = match value {
            Value::String(text) => text.parse::<Coin>(),
            Value::Number(number) => match number.as_i64() {
                Some(units) => Coin::new(units).map_err(|e| e.to_string()),
                None => Err(format!("not an integer in 0..={}", i64::MAX)),
            },
            _ => Err("not a string".to_string()),
        };
        parsed.map_err(|message| self.fail(path, message)).ok()
    }

    fn hex(&mut self, value: &Value, path: &str) -> Option<Vec<u8>> {
        let text = self.string(value, path)?;
        hex::decode(text.trim())
            .map_err(|e| self.fail(path, format!("not a hexadecimal string: {}", e)))
            .ok()
    }

    fn integer(&mut self, value: &Value, path: &str, min: i64, max: i64) -> Option<i64> {
        let Some(number) = value.as_i64() else {
            self.fail(path, "not an integer");
            return None;
        };
        if number < min || number > max {
            self.fail(path, format!("does not fit in {}..={}", min, max));
            return None;
        }
        Some(number)
    }

    fn output(&mut self, value: &Value, path: &str) -> Option<Output> {
        let object = self.object(value, path)?;
        let address = self
            .required(object, "address", path)
            .and_then(|v| self.address(v, &join(path, "address")));
        let amount = self
            .required(object, "amount", path)
            .and_then(|v| self.amount(v, &join(path, "amount")));
        Some(Output::new(address?, amount?))
    }

    fn outputs(&mut self, value: &Value, path: &str) -> Option<Vec<Output>> {
        let Some(items) = value.as_array() else {
            self.fail(path, "not an array");
            return None;
        };
        if items.len() > MAX_OUTPUTS_COUNT {
            self.fail(path, format!("more than {} outputs", MAX_OUTPUTS_COUNT));
        }

        let outputs: Vec<Option<Output>> = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.output(item, &format!("{}[{}]", path, i)))
            .collect();
        outputs.into_iter().collect()
    }

    fn transaction(&mut self, value: &Value, path: &str) -> Option<Transaction> {
        let object = self.object(value, path)?;

        let source_address = self
            .required(object, "sourceAddress", path)
            .and_then(|v| self.address(v, &join(path, "sourceAddress")));
        let source_amount = self
            .required(object, "sourceAmount", path)
            .and_then(|v| self.amount(v, &join(path, "sourceAmount")));
        let outputs = self
            .required(object, "outputs", path)
            .and_then(|v| self.outputs(v, &join(path, "outputs")));

        let data = self.optional(object, "data", path, Self::hex);
        let transaction_fee = self.optional(object, "transactionFee", path, Self::amount);
        let tx_id = self.optional(object, "txId", path, |reader, v, p| {
            let bytes = reader.hex(v, p)?;
            Sha256Hash::from_slice(&bytes)
                .map_err(|e| reader.fail(p, e.to_string()))
                .ok()
        });
        let tx_type = self.optional(object, "type", path, |reader, v, p| {
            let byte = reader.integer(v, p, 0, 255)? as u8;
            AddressType::from_byte(byte).or_else(|| {
                reader.fail(p, format!("unknown address type {}", byte));
                None
            })
        });
        let network_byte = self.optional(object, "networkByte", path, |reader, v, p| {
            let byte = reader.integer(v, p, 0, 255)? as u8;
            if is_reserved_network_byte(byte) {
                reader.fail(p, format!("{} is a transaction type byte", byte));
                return None;
            }
            Some(byte)
        });

        Some(Transaction {
            tx_type: tx_type?,
            source_address: source_address?,
            source_amount: source_amount?,
            outputs: outputs?,
            transaction_fee: transaction_fee?,
            data: data?,
            tx_id: tx_id?,
            network_byte: network_byte?,
        })
    }

    /// `Some(None)` when absent or null, `None` when present but invalid
    fn optional<T>(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        path: &str,
        read: impl FnOnce(&mut Self, &Value, &str) -> Option<T>,
    ) -> Option<Option<T>> {
        match object.get(key) {
            None | Some(Value::Null) => Some(None),
            Some(value) => read(self, value, &join(path, key)).map(Some),
        }
    }

    fn signed_transaction(&mut self, value: &Value) -> Option<SignedTransaction> {
        let object = self.object(value, "")?;

        let signature = self.required(object, "signature", "").and_then(|v| {
            let text = self.string(v, "signature")?;
            Signature::from_hex(text)
                .map_err(|e| self.fail("signature", e.to_string()))
                .ok()
        });
        let public_key = self.required(object, "publicKey", "").and_then(|v| {
            let text = self.string(v, "publicKey")?;
            PublicKey::from_hex(text)
                .map_err(|e| self.fail("publicKey", e.to_string()))
                .ok()
        });
        let signature_index = self
            .required(object, "signatureIndex", "")
            .and_then(|v| self.integer(v, "signatureIndex", 0, i64::MAX));
        let transaction = self
            .required(object, "transaction", "")
            .and_then(|v| self.transaction(v, "transaction"));

        Some(SignedTransaction {
            signature: signature?,
            public_key: public_key?,
            signature_index: signature_index?,
            transaction: transaction?,
        })
    }
}

// =============================================================================
// Parsing
// =============================================================================

pub fn parse_transaction(value: &Value) -> Result<Transaction, ValidationErrors> {
    let mut reader = FieldReader::default();
    let tx = reader.transaction(value, "");
    reader.finish(tx)
}

pub fn parse_outputs(value: &Value) -> Result<Vec<Output>, ValidationErrors> {
    let mut reader = FieldReader::default();
    let outputs = reader.outputs(value, "");
    reader.finish(outputs)
}

pub fn parse_signed_transaction(value: &Value) -> Result<SignedTransaction, ValidationErrors> {
    let mut reader = FieldReader::default();
    let signed = reader.signed_transaction(value);
    reader.finish(signed)
}

// =============================================================================
// Serialization
// =============================================================================

pub fn output_to_json(output: &Output) -> Value {
    json!({
        "address": output.address.as_str(),
        "amount": output.amount.to_string(),
    })
}

pub fn transaction_to_json(tx: &Transaction) -> Value {
    let mut object = Map::new();
    object.insert("sourceAddress".into(), json!(tx.source_address.as_str()));
    object.insert("sourceAmount".into(), json!(tx.source_amount.to_string()));
    object.insert(
        "outputs".into(),
        Value::Array(tx.outputs.iter().map(output_to_json).collect()),
    );
    if let Some(data) = &tx.data {
        object.insert("data".into(), json!(hex::encode_upper(data)));
    }
    if let Some(fee) = tx.transaction_fee {
        object.insert("transactionFee".into(), json!(fee.to_string()));
    }
    if let Some(id) = &tx.tx_id {
        object.insert("txId".into(), json!(id.to_hex()));
    }
    if let Some(tx_type) = tx.tx_type {
        object.insert("type".into(), json!(tx_type.to_byte()));
    }
    if let Some(network_byte) = tx.network_byte {
        object.insert("networkByte".into(), json!(network_byte));
    }
    Value::Object(object)
}

pub fn signed_transaction_to_json(signed: &SignedTransaction) -> Value {
    json!({
        "signature": signed.signature.to_hex(),
        "publicKey": signed.public_key.to_hex(),
        "signatureIndex": signed.signature_index,
        "transaction": transaction_to_json(&signed.transaction),
    })
}
