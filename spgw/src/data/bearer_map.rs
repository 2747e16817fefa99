use super::{BEARERS_PER_UE, BearerContext, Ebi, FIRST_EBI, StoreError, is_valid_ebi};

/// The bearers of one PDN connection, one slot per EBI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BearerMap {
    slots: [Option<BearerContext>; BEARERS_PER_UE],
}

fn slot(ebi: Ebi) -> Option<usize> {
    is_valid_ebi(ebi).then(|| (ebi - FIRST_EBI) as usize)
}

impl BearerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bearer under its own EBI.  An occupied slot is never overwritten.
    pub fn insert(&mut self, bearer: BearerContext) -> Result<(), StoreError> {
        let ebi = bearer.ebi;
        let idx = slot(ebi).ok_or(StoreError::InvalidEbi(ebi))?;
        let entry = &mut self.slots[idx];
        if entry.is_some() {
            return Err(StoreError::DuplicateEbi(ebi));
        }
        *entry = Some(bearer);
        Ok(())
    }

    pub fn get(&self, ebi: Ebi) -> Option<&BearerContext> {
        slot(ebi).and_then(|idx| self.slots[idx].as_ref())
    }

    pub fn get_mut(&mut self, ebi: Ebi) -> Option<&mut BearerContext> {
        slot(ebi).and_then(|idx| self.slots[idx].as_mut())
    }

    pub fn contains(&self, ebi: Ebi) -> bool {
        self.get(ebi).is_some()
    }

    /// Replace an existing bearer.  Fails if the slot is empty.
    pub fn update(&mut self, bearer: BearerContext) -> Result<BearerContext, StoreError> {
        let ebi = bearer.ebi;
        let idx = slot(ebi).ok_or(StoreError::InvalidEbi(ebi))?;
        match &mut self.slots[idx] {
            Some(existing) => Ok(std::mem::replace(existing, bearer)),
            None => Err(StoreError::InvalidEbi(ebi)),
        }
    }

    pub fn remove(&mut self, ebi: Ebi) -> Option<BearerContext> {
        slot(ebi).and_then(|idx| self.slots[idx].take())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BearerContext> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BearerContext> {
        self.slots.iter_mut().flatten()
    }

    pub fn ebis(&self) -> Vec<Ebi> {
        self.iter().map(|b| b.ebi).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty the map, yielding every bearer in EBI order.
    pub fn take_all(&mut self) -> Vec<BearerContext> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}
