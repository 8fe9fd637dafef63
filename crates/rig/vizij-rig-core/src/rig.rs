//! Rig: ordered set of bound constraints evaluated once per frame.

use hashbrown::HashMap;
use log::{debug, warn};

use crate::config::Config;
use crate::constraints::{ConstraintData, ConstraintJob};
use crate::data::RigData;
use crate::error::RigError;
use crate::handle::{NodeId, PoseStream, TransformResolver};

/// One bound constraint and its current weight.
#[derive(Clone, Debug)]
pub struct RigSlot {
    pub id: String,
    pub weight: f32,
    pub job: ConstraintJob,
}

#[derive(Clone, Debug, Default)]
pub struct Rig {
    cfg: Config,
    slots: Vec<RigSlot>,
    /// Node -> index of the slot that writes it.
    writers: HashMap<NodeId, usize>,
}

impl Rig {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            slots: Vec::new(),
            writers: HashMap::new(),
        }
    }

    /// Validate and bind every entry of `data`, in order.
    pub fn from_data<R: TransformResolver + ?Sized>(
        data: &RigData,
        resolver: &mut R,
    ) -> Result<Self, RigError> {
        let mut rig = Self::new(data.settings.clone());
        for entry in &data.constraints {
            rig.add_constraint(&entry.id, &entry.constraint, entry.weight, resolver)?;
        }
        debug!(
            "rig {:?}: bound {} constraint(s)",
            data.name.as_deref().unwrap_or("<unnamed>"),
            rig.len()
        );
        Ok(rig)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Validate, bind and append a constraint. Nothing is added on error.
    pub fn add_constraint<R: TransformResolver + ?Sized>(
        &mut self,
        id: &str,
        data: &ConstraintData,
        weight: f32,
        resolver: &mut R,
    ) -> Result<(), RigError> {
        if self.slot_index(id).is_some() {
            warn!("rig: constraint id '{id}' already registered");
            return Err(RigError::DuplicateConstraint(id.to_string()));
        }
        let job = data.bind(resolver).map_err(|e| {
            warn!("rig: rejecting {} '{id}': {e}", data.kind());
            e
        })?;
        self.push_job(id, job, weight)
    }

    /// Append an already bound job.
    pub fn push_job(&mut self, id: &str, job: ConstraintJob, weight: f32) -> Result<(), RigError> {
        if self.slot_index(id).is_some() {
            return Err(RigError::DuplicateConstraint(id.to_string()));
        }
        let targets = job.write_targets();
        if !self.cfg.allow_shared_write_targets {
            if let Some((node, first)) = targets
                .iter()
                .find_map(|n| self.writers.get(n).map(|&i| (*n, i)))
            {
                let err = RigError::ConflictingWriter {
                    node,
                    first: self.slots[first].id.clone(),
                    second: id.to_string(),
                };
                warn!("rig: {err}");
                return Err(err);
            }
        }

        let index = self.slots.len();
        for node in targets {
            self.writers.entry(node).or_insert(index);
        }
        debug!("rig: bound {} '{id}' (weight {weight})", job.kind());
        self.slots.push(RigSlot {
            id: id.to_string(),
            weight,
            job,
        });
        Ok(())
    }

    /// Tear down and remove one constraint.
    pub fn remove(&mut self, id: &str) -> Result<(), RigError> {
        let index = self
            .slot_index(id)
            .ok_or_else(|| RigError::UnknownConstraint(id.to_string()))?;
        let slot = self.slots.remove(index);
        debug!("rig: teardown {} '{}'", slot.job.kind(), slot.id);
        slot.job.teardown();
        self.rebuild_writers();
        Ok(())
    }

    pub fn set_weight(&mut self, id: &str, weight: f32) -> Result<(), RigError> {
        let index = self
            .slot_index(id)
            .ok_or_else(|| RigError::UnknownConstraint(id.to_string()))?;
        self.slots[index].weight = weight;
        Ok(())
    }

    pub fn weight(&self, id: &str) -> Option<f32> {
        self.slot_index(id).map(|i| self.slots[i].weight)
    }

    pub fn job(&self, id: &str) -> Option<&ConstraintJob> {
        self.slot_index(id).map(|i| &self.slots[i].job)
    }

    /// Constraint ids in evaluation order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.id.as_str())
    }

    pub fn slots(&self) -> &[RigSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Evaluate every constraint once, in order.
    pub fn evaluate<S: PoseStream + ?Sized>(&self, stream: &mut S) {
        for slot in &self.slots {
            slot.job
                .evaluate(stream, self.cfg.effective_weight(slot.weight));
        }
    }

    /// Tear down every constraint in order.
    pub fn teardown(self) {
        for slot in self.slots {
            debug!("rig: teardown {} '{}'", slot.job.kind(), slot.id);
            slot.job.teardown();
        }
    }

    fn slot_index(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }

    fn rebuild_writers(&mut self) {
        self.writers.clear();
        for (index, slot) in self.slots.iter().enumerate() {
            for node in slot.job.write_targets() {
                self.writers.entry(node).or_insert(index);
            }
        }
    }
}
