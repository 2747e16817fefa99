use super::{Ebi, Imsi, SessionContext, StoreError, Teid};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Session contexts keyed by SGW S11 TEID, plus an index of the TEIDs owned by each IMSI.
#[derive(Debug, Default)]
pub struct ContextStore {
    contexts: HashMap<Teid, SessionContext>,
    imsi_index: HashMap<Imsi, Vec<Teid>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a context under its own `sgw_s11_teid`.  A TEID already in use is an
    /// error and the caller must pick another.
    pub fn create(&mut self, context: SessionContext) -> Result<&mut SessionContext, StoreError> {
        let teid = context.sgw_s11_teid;
        let imsi = context.imsi;
        match self.contexts.entry(teid) {
            Entry::Occupied(_) => Err(StoreError::DuplicateTeid(teid)),
            Entry::Vacant(v) => {
                let teids = self.imsi_index.entry(imsi).or_default();
                if !teids.contains(&teid) {
                    teids.push(teid);
                }
                Ok(v.insert(context))
            }
        }
    }

    pub fn get(&self, teid: Teid) -> Option<&SessionContext> {
        self.contexts.get(&teid)
    }

    pub fn get_mut(&mut self, teid: Teid) -> Option<&mut SessionContext> {
        self.contexts.get_mut(&teid)
    }

    pub fn contains(&self, teid: Teid) -> bool {
        self.contexts.contains_key(&teid)
    }

    pub fn remove(&mut self, teid: Teid, imsi: &Imsi) -> Option<SessionContext> {
        if let Some(teids) = self.imsi_index.get_mut(imsi) {
            teids.retain(|t| *t != teid);
            if teids.is_empty() {
                self.imsi_index.remove(imsi);
            }
        }
        self.contexts.remove(&teid)
    }

    pub fn teids_for_imsi(&self, imsi: &Imsi) -> Vec<Teid> {
        self.imsi_index.get(imsi).cloned().unwrap_or_default()
    }

    /// The session of `imsi` whose default bearer is `lbi`.
    pub fn find_by_imsi_and_lbi(&self, imsi: &Imsi, lbi: Ebi) -> Option<Teid> {
        self.imsi_index.get(imsi)?.iter().copied().find(|teid| {
            self.contexts
                .get(teid)
                .is_some_and(|c| c.pdn.default_bearer == lbi)
        })
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionContext> {
        self.contexts.values()
    }
}
