use super::{BearerContext, StoreError, Teid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    NetworkInitiatedCreateBearer,
}

/// An in-flight network initiated procedure and the provisional bearers it created.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingProcedure {
    pub kind: ProcedureKind,
    pub bearers: Vec<BearerContext>,
}

/// Provisional bearers of a PDN connection, keyed by their SGW S1-U TEID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingProcedureLedger {
    procedures: Vec<PendingProcedure>,
}

impl PendingProcedureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a provisional bearer of a network initiated create bearer procedure.
    pub fn push_create_bearer(&mut self, bearer: BearerContext) -> Result<(), StoreError> {
        let teid = bearer.sgw_s1u_teid;
        if self.find_by_sgw_teid(teid).is_some() {
            return Err(StoreError::DuplicateTeid(teid));
        }
        match self
            .procedures
            .iter_mut()
            .find(|p| p.kind == ProcedureKind::NetworkInitiatedCreateBearer)
        {
            Some(procedure) => procedure.bearers.push(bearer),
            None => self.procedures.push(PendingProcedure {
                kind: ProcedureKind::NetworkInitiatedCreateBearer,
                bearers: vec![bearer],
            }),
        }
        Ok(())
    }

    pub fn find_by_sgw_teid(&self, teid: Teid) -> Option<&BearerContext> {
        self.bearers().find(|b| b.sgw_s1u_teid == teid)
    }

    /// Remove a provisional bearer.  The procedure entry goes once its last
    /// bearer is resolved.
    pub fn take_by_sgw_teid(&mut self, teid: Teid) -> Option<BearerContext> {
        let (p_idx, b_idx) = self.procedures.iter().enumerate().find_map(|(p_idx, p)| {
            p.bearers
                .iter()
                .position(|b| b.sgw_s1u_teid == teid)
                .map(|b_idx| (p_idx, b_idx))
        })?;
        let bearer = self.procedures[p_idx].bearers.remove(b_idx);
        if self.procedures[p_idx].bearers.is_empty() {
            self.procedures.remove(p_idx);
        }
        Some(bearer)
    }

    pub fn remove_by_sgw_teid(&mut self, teid: Teid) -> bool {
        self.take_by_sgw_teid(teid).is_some()
    }

    pub fn bearers(&self) -> impl Iterator<Item = &BearerContext> {
        self.procedures.iter().flat_map(|p| p.bearers.iter())
    }

    pub fn procedures(&self) -> &[PendingProcedure] {
        &self.procedures
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Number of provisional bearers.
    pub fn len(&self) -> usize {
        self.bearers().count()
    }

    pub fn clear(&mut self) -> Vec<BearerContext> {
        self.procedures
            .drain(..)
            .flat_map(|p| p.bearers.into_iter())
            .collect()
    }
}
