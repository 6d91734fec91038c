//! Explicit id-based associations between a job and the shared entities it uses.
//!
//! A [`Reference`] always knows the foreign key it points at. Whether the
//! target is loaded depends on the persistence collaborator that built the
//! job; using an unresolved reference fails with `ReferenceIntegrity`.

use std::fmt;
use std::sync::Arc;

use crate::error::{EntityKind, SluiceError};
use crate::feature_set::FeatureSet;
use crate::source::Source;
use crate::store::Store;

/// Entity with a stable identity a job can point at.
pub trait Identified {
    const KIND: EntityKind;

    fn key(&self) -> String;
}

/// Projection of an entity into its wire message.
pub trait ToWire {
    type Message;
    type Error;

    fn to_wire(&self) -> Result<Self::Message, Self::Error>;
}

/// Looks up shared entities by identity when a stored job is rehydrated.
pub trait ReferenceResolver {
    fn source(&self, id: &str) -> Option<Arc<Source>>;
    fn store(&self, name: &str) -> Option<Arc<Store>>;
    fn feature_set(&self, id: &str) -> Option<Arc<FeatureSet>>;
}

pub struct Reference<T> {
    id: String,
    target: Option<Arc<T>>,
}

impl<T: Identified> Reference<T> {
    pub fn resolved(target: Arc<T>) -> Self {
        Self {
            id: target.key(),
            target: Some(target),
        }
    }

    /// A foreign key whose target could not be loaded.
    pub fn dangling(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target: None,
        }
    }

    /// Build from a key and an optional lookup result.
    pub fn from_lookup(id: impl Into<String>, target: Option<Arc<T>>) -> Self {
        match target {
            Some(t) => Self::resolved(t),
            None => Self::dangling(id),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }

    pub fn get(&self) -> Result<&T, SluiceError> {
        self.target
            .as_deref()
            .ok_or_else(|| SluiceError::missing(T::KIND, &self.id))
    }
}

impl<T> Clone for Reference<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            target: self.target.clone(),
        }
    }
}

impl<T> PartialEq for Reference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Reference<T> {}

impl<T> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("id", &self.id)
            .field("resolved", &self.target.is_some())
            .finish()
    }
}
