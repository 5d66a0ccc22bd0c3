//! Document identifiers

use std::fmt;

use serde::Serialize;

const DEFAULT_SCOPE: &str = "_default";
const DEFAULT_COLLECTION: &str = "_default";

/// Fully qualified document location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentId {
    bucket: String,
    scope: String,
    collection: String,
    key: String,
}

impl DocumentId {
    pub fn new(
        bucket: impl Into<String>,
        scope: impl Into<String>,
        collection: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            scope: scope.into(),
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Document in the default scope and collection of `bucket`
    pub fn in_default_collection(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(bucket, DEFAULT_SCOPE, DEFAULT_COLLECTION, key)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.bucket, self.scope, self.collection, self.key)
    }
}
