//! Generic JSON document entity.

use serde_json::Value;

use crate::entity::{Entity, EntityDescriptor};
use crate::error::FetchResult;
use crate::fetch::Signals;

/// An entity that keeps the raw payload it was last synced with.
///
/// Useful wherever no typed model exists, e.g. the fetch proxy.
#[derive(Debug)]
pub struct Document {
    descriptor: EntityDescriptor,
    data: Option<Value>,
    signals: Signals,
}

impl Document {
    pub fn new(descriptor: EntityDescriptor) -> Self {
        Self {
            descriptor,
            data: None,
            signals: Signals::new(),
        }
    }

    /// The last applied payload, if the document has synced yet.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<Value> {
        self.data
    }

    pub fn signals_mut(&mut self) -> &mut Signals {
        &mut self.signals
    }
}

impl Entity for Document {
    fn descriptor(&self) -> EntityDescriptor {
        self.descriptor.clone()
    }

    fn apply(&mut self, payload: &Value) -> FetchResult<()> {
        self.data = Some(payload.clone());
        Ok(())
    }

    fn signals(&self) -> &Signals {
        &self.signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_applies_payload() {
        let mut doc = Document::new(EntityDescriptor::collection("/items"));
        assert!(doc.data().is_none());

        doc.apply(&json!([{"id": 1}])).unwrap();

        assert_eq!(doc.data(), Some(&json!([{"id": 1}])));
        assert_eq!(doc.into_data(), Some(json!([{"id": 1}])));
    }
}
