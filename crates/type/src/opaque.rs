// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An externally defined cell value the engine carries without ever looking
/// inside. Implementors own their wire representation; `kind` names the
/// decoder to use when a stored table is loaded again.
pub trait Opaque: fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> &'static str;

    fn encode(&self) -> Vec<u8>;

    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to an opaque value. Structural table operations copy the
/// handle, never the value, so cells that referred to the same object keep
/// doing so across filters, joins and copies.
#[derive(Clone)]
pub struct OpaqueCell(Arc<dyn Opaque>);

impl OpaqueCell {
    pub fn new(value: impl Opaque) -> Self {
        OpaqueCell(Arc::new(value))
    }

    pub fn kind(&self) -> &'static str {
        self.0.kind()
    }

    pub fn encode(&self) -> Vec<u8> {
        self.0.encode()
    }

    pub fn downcast_ref<T: Opaque>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Stable within one process, used for identity comparison and display.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for OpaqueCell {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for OpaqueCell {}

impl Hash for OpaqueCell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Debug for OpaqueCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueCell({:?})", self.0)
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum OpaqueError {
    #[error("no decoder registered for opaque kind '{kind}'")]
    UnknownKind { kind: String },

    #[error("malformed payload for opaque kind '{kind}': {detail}")]
    Malformed { kind: String, detail: String },
}

impl OpaqueError {
    pub fn malformed(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        OpaqueError::Malformed { kind: kind.into(), detail: detail.into() }
    }
}

type DecodeFn = fn(&[u8]) -> Result<OpaqueCell, OpaqueError>;

/// Maps opaque kinds to their decoders. The host application constructs one
/// registry for the opaque types it knows about and passes it by reference
/// wherever tables are loaded.
#[derive(Default)]
pub struct OpaqueRegistry {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl OpaqueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: &'static str, decode: DecodeFn) -> &mut Self {
        self.decoders.insert(kind, decode);
        self
    }

    pub fn decode(&self, kind: &str, payload: &[u8]) -> Result<OpaqueCell, OpaqueError> {
        let decode = self
            .decoders
            .get(kind)
            .ok_or_else(|| OpaqueError::UnknownKind { kind: kind.to_string() })?;
        decode(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Payload(Vec<u8>);

    impl Opaque for Payload {
        fn kind(&self) -> &'static str {
            "payload"
        }

        fn encode(&self) -> Vec<u8> {
            self.0.clone()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn decode_payload(bytes: &[u8]) -> Result<OpaqueCell, OpaqueError> {
        Ok(OpaqueCell::new(Payload(bytes.to_vec())))
    }

    #[test]
    fn test_identity_equality() {
        let a = OpaqueCell::new(Payload(vec![1, 2]));
        let b = a.clone();
        let c = OpaqueCell::new(Payload(vec![1, 2]));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_downcast() {
        let cell = OpaqueCell::new(Payload(vec![7]));
        assert_eq!(cell.downcast_ref::<Payload>(), Some(&Payload(vec![7])));
    }

    #[test]
    fn test_registry_round_trip() {
        let mut registry = OpaqueRegistry::new();
        registry.register("payload", decode_payload);

        let cell = OpaqueCell::new(Payload(vec![1, 2, 3]));
        let decoded = registry.decode(cell.kind(), &cell.encode()).unwrap();
        assert_eq!(decoded.downcast_ref::<Payload>(), Some(&Payload(vec![1, 2, 3])));
    }

    #[test]
    fn test_registry_unknown_kind() {
        let registry = OpaqueRegistry::new();
        assert_eq!(
            registry.decode("mystery", &[]),
            Err(OpaqueError::UnknownKind { kind: "mystery".to_string() })
        );
    }
}
