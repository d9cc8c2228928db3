use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::RankingError;

/// Normal transaction as listed by an explorer `txlist` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub is_error: Option<String>,
}

/// ERC-20 transfer as listed by an explorer `tokentx` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub contract_address: Option<String>,
}

/// ERC-721 transfer as listed by an explorer `tokennfttx` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftTransfer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub contract_address: Option<String>,
    #[serde(rename = "tokenID", default, deserialize_with = "lenient_string")]
    pub token_id: Option<String>,
}

impl Transaction {
    pub fn new(to: &str, value: &str, is_error: &str) -> Self {
        Self {
            to: Some(to.to_string()),
            value: Some(value.to_string()),
            is_error: Some(is_error.to_string()),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.is_error.as_deref() == Some("0")
    }

    /// Lower-cased destination, if any.
    pub fn destination(&self) -> Option<String> {
        non_empty(&self.to).map(str::to_lowercase)
    }
}

impl TokenTransfer {
    pub fn new(contract_address: &str) -> Self {
        Self {
            contract_address: Some(contract_address.to_string()),
        }
    }

    pub fn token_key(&self) -> Option<String> {
        non_empty(&self.contract_address).map(str::to_lowercase)
    }
}

impl NftTransfer {
    pub fn new(contract_address: &str, token_id: &str) -> Self {
        Self {
            contract_address: Some(contract_address.to_string()),
            token_id: Some(token_id.to_string()),
        }
    }

    /// `"{contract}-{tokenID}"` with the contract lower-cased.
    pub fn nft_key(&self) -> Option<String> {
        match (non_empty(&self.contract_address), non_empty(&self.token_id)) {
            (Some(contract), Some(token_id)) => {
                Some(format!("{}-{}", contract.to_lowercase(), token_id))
            }
            _ => None,
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// The three untyped payloads fetched for one wallet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawActivity {
    pub transactions: Value,
    pub token_transfers: Value,
    pub nft_transfers: Value,
}

/// Typed activity lists, ready for the ranking engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activity {
    pub transactions: Vec<Transaction>,
    pub token_transfers: Vec<TokenTransfer>,
    pub nft_transfers: Vec<NftTransfer>,
}

impl RawActivity {
    pub fn new(transactions: Value, token_transfers: Value, nft_transfers: Value) -> Self {
        Self {
            transactions: extract_result(transactions),
            token_transfers: extract_result(token_transfers),
            nft_transfers: extract_result(nft_transfers),
        }
    }

    pub fn decode(&self) -> Result<Activity, RankingError> {
        Ok(Activity {
            transactions: decode_list("transactions", &self.transactions)?,
            token_transfers: decode_list("token transfers", &self.token_transfers)?,
            nft_transfers: decode_list("nft transfers", &self.nft_transfers)?,
        })
    }
}

/// Unwraps an explorer envelope (`{"status", "message", "result"}`) if present.
pub fn extract_result(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("result") => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decodes a JSON list of records. Anything that is not an array decodes to
/// an empty list; an element that is not an object is rejected.
pub fn decode_list<T: DeserializeOwned>(
    list: &'static str,
    value: &Value,
) -> Result<Vec<T>, RankingError> {
    let Some(items) = value.as_array() else {
        return Ok(Vec::new());
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(RankingError::MalformedRecord { list, index });
            }
            T::deserialize(item).map_err(|_| RankingError::MalformedRecord { list, index })
        })
        .collect()
}

// Explorers are inconsistent about types: accept strings, numbers and bools,
// and treat null or "" as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(number_string(&n)),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

// Integers past u64 arrive as f64 and would print in exponent form.
fn number_string(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_u64() && !n.is_i64() && f.is_finite() && f.fract() == 0.0 => {
            format!("{:.0}", f)
        }
        _ => n.to_string(),
    }
}
