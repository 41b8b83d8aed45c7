//! On-chain identity types and their decoding from chain storage values.
//!
//! Identity metadata is owned by the chain. Everything here is a read-only,
//! point-in-time copy of what `Identity.IdentityOf` and `Identity.SuperOf`
//! reported.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ChainQueryError;

// ─── Address ─────────────────────────────────────────────────────────────────

/// An opaque chain account identifier (an SS58 string).
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
  pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Decode a storage key. Keys arrive either as a bare string or as a
  /// single-element array holding one.
  pub fn from_key(key: &Value) -> Result<Self, ChainQueryError> {
    match key {
      Value::String(s) => Ok(Self::new(s.as_str())),
      Value::Array(parts) => match parts.as_slice() {
        [Value::String(s)] => Ok(Self::new(s.as_str())),
        _ => Err(ChainQueryError::decode("storage key", key.to_string())),
      },
      other => Err(ChainQueryError::decode("storage key", other.to_string())),
    }
  }
}

impl fmt::Display for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Address {
  fn from(raw: &str) -> Self { Self::new(raw) }
}

// ─── Field data ──────────────────────────────────────────────────────────────

/// The value of one identity field, tagged with its encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldData {
  /// The field is registered but empty.
  None,
  /// A literal string.
  Raw(String),
  /// A hashed encoding (`BlakeTwo256`, `Sha256`, `Keccak256`, `ShaThree256`).
  Hashed { kind: String, digest: String },
  /// Anything else the chain reports, kept verbatim so record comparison
  /// still sees it.
  Other(Value),
}

impl FieldData {
  /// Decode a chain field value such as `{"Raw": "Alice"}` or `"None"`.
  pub fn from_chain(value: &Value) -> Self {
    match value {
      Value::Null => Self::None,
      Value::String(s) if s == "None" => Self::None,
      Value::Object(map) if map.len() == 1 => {
        let Some((kind, inner)) = map.iter().next() else {
          return Self::Other(value.clone());
        };
        match (kind.as_str(), inner) {
          ("Raw", Value::String(s)) => Self::Raw(s.clone()),
          ("None", Value::Null) => Self::None,
          (_, Value::String(digest)) => Self::Hashed {
            kind:   kind.clone(),
            digest: digest.clone(),
          },
          _ => Self::Other(value.clone()),
        }
      }
      _ => Self::Other(value.clone()),
    }
  }

  pub fn as_raw(&self) -> Option<&str> {
    match self {
      Self::Raw(s) => Some(s),
      _ => None,
    }
  }
}

// ─── Identity record ─────────────────────────────────────────────────────────

/// A single named field of an identity registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityField {
  pub name: String,
  pub data: FieldData,
}

/// The self-declared metadata an account registered on-chain. Field order is
/// the order the chain reported them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
  pub fields: Vec<IdentityField>,
}

impl IdentityRecord {
  /// Decode an `IdentityOf` storage value.
  ///
  /// Accepts the registration object directly (`{"info": {...}, ...}`) and
  /// the newer `[registration, username]` tuple shape.
  pub fn from_chain(value: &Value) -> Result<Self, ChainQueryError> {
    let registration = match value {
      Value::Array(parts) => parts
        .first()
        .ok_or_else(|| ChainQueryError::decode("identity", "empty tuple"))?,
      other => other,
    };

    let info = registration
      .get("info")
      .and_then(Value::as_object)
      .ok_or_else(|| {
        ChainQueryError::decode("identity", "missing `info` object")
      })?;

    let fields = info
      .iter()
      .map(|(name, data)| IdentityField {
        name: name.clone(),
        data: FieldData::from_chain(data),
      })
      .collect();

    Ok(Self { fields })
  }

  /// Build the human-readable label from the `display` and `twitter` raw
  /// fields, in field order. Returns `None` when no field qualifies.
  pub fn label(&self) -> Option<String> {
    let mut label = String::new();
    for field in &self.fields {
      let Some(value) = field.data.as_raw() else {
        continue;
      };
      match field.name.as_str() {
        "display" => {
          label.push_str(value);
          label.push(' ');
        }
        "twitter" => {
          label.push_str("/ ");
          label.push_str(value);
        }
        _ => {}
      }
    }
    (!label.is_empty()).then_some(label)
  }

  /// The record as a JSON value, for snapshot comparison.
  pub fn to_value(&self) -> Result<Value, serde_json::Error> {
    serde_json::to_value(self)
  }
}

// ─── Super link ──────────────────────────────────────────────────────────────

/// "This sub-account's identity is recorded under `parent`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperLink {
  pub parent:   Address,
  /// The sub-account's name within the parent identity.
  pub sub_name: FieldData,
}

impl SuperLink {
  /// Decode a `SuperOf` storage value: `[parent, name]`.
  pub fn from_chain(value: &Value) -> Result<Self, ChainQueryError> {
    let malformed = || ChainQueryError::decode("super link", value.to_string());
    let parts = value.as_array().ok_or_else(malformed)?;
    let parent = parts
      .first()
      .and_then(Value::as_str)
      .ok_or_else(malformed)?;
    let sub_name = parts
      .get(1)
      .map(FieldData::from_chain)
      .unwrap_or(FieldData::None);
    Ok(Self { parent: Address::new(parent), sub_name })
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// A point-in-time copy of the whole identity registry, indexed by address.
///
/// Fetched once per polling cycle and shared across every resolution in that
/// cycle.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
  records:     HashMap<Address, IdentityRecord>,
  undecodable: Vec<ChainQueryError>,
}

impl IdentityRegistry {
  /// Build the index from raw `(key, value)` storage-map entries.
  ///
  /// An entry that does not decode is left out of the index and kept in
  /// [`Self::undecodable`]; its address then reads as unregistered. Every
  /// other entry is unaffected.
  pub fn from_entries(entries: Vec<(Value, Value)>) -> Self {
    let mut registry = Self {
      records:     HashMap::with_capacity(entries.len()),
      undecodable: Vec::new(),
    };
    for (key, value) in entries {
      let decoded = Address::from_key(&key)
        .and_then(|address| Ok((address, IdentityRecord::from_chain(&value)?)));
      match decoded {
        Ok((address, record)) => {
          registry.records.insert(address, record);
        }
        Err(e) => registry.undecodable.push(e),
      }
    }
    registry
  }

  /// Entries skipped by [`Self::from_entries`].
  pub fn undecodable(&self) -> &[ChainQueryError] { &self.undecodable }

  pub fn get(&self, address: &Address) -> Option<&IdentityRecord> {
    self.records.get(address)
  }

  pub fn insert(&mut self, address: Address, record: IdentityRecord) {
    self.records.insert(address, record);
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

// ─── Resolved identity ───────────────────────────────────────────────────────

/// A display label for an address. Never empty: falls back to the address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity(String);

impl ResolvedIdentity {
  /// Label from `record`, or `address` itself when nothing qualifies.
  pub fn from_record(
    address: &Address,
    record: Option<&IdentityRecord>,
  ) -> Self {
    Self(
      record
        .and_then(IdentityRecord::label)
        .unwrap_or_else(|| address.to_string()),
    )
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for ResolvedIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
