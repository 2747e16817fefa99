use super::SessionContext;
use std::collections::HashMap;

/// A session waiting for the roaming proxy to assign it a TEID.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporaryProcedureRecord {
    pub correlation_id: u32,
    pub context: SessionContext,
}

#[derive(Debug, Default)]
pub struct TemporaryProcedureMap {
    records: HashMap<u32, SessionContext>,
}

impl TemporaryProcedureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a context under a fresh random correlation id and return the id.
    pub fn insert_new(&mut self, context: SessionContext) -> u32 {
        let mut id = rand::random::<u32>();
        while id == 0 || self.records.contains_key(&id) {
            id = rand::random::<u32>();
        }
        self.records.insert(id, context);
        id
    }

    pub fn take(&mut self, correlation_id: u32) -> Option<TemporaryProcedureRecord> {
        self.records
            .remove(&correlation_id)
            .map(|context| TemporaryProcedureRecord {
                correlation_id,
                context,
            })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
