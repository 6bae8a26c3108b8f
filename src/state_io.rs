//! Save/load Variable storage (the only persisted state the core defines,
//! per §6: "purely the Variable float arrays, row-major, shape as
//! declared") to/from JSON files.

use crate::context::ExecutionContext;
use crate::operation::{OperationId, OperationKind};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable snapshot of one Variable's persistent storage.
#[derive(Serialize, Deserialize)]
pub struct VariableState {
    pub name: Option<String>,
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl ExecutionContext {
    /// Snapshot every registered Variable's storage, in registration order.
    pub fn state_dict(&self) -> Vec<VariableState> {
        self.variable_ids()
            .map(|id| {
                let (name, shape, data) = self.variable_snapshot(id);
                VariableState { name, shape, data }
            })
            .collect()
    }

    /// Overwrite each registered Variable's storage from a snapshot
    /// produced by [`ExecutionContext::state_dict`], in order. Topology and
    /// per-variable shape mismatches are a programmer error (the graph must
    /// match the one the snapshot was taken from) and panic rather than
    /// silently truncate or pad: a variable-count mismatch panics here
    /// before any variable is touched, and a per-variable length mismatch
    /// panics inside `Variable::restore`.
    pub fn load_state_dict(&mut self, states: &[VariableState]) {
        assert_eq!(
            states.len(),
            self.layer_count(),
            "state dict has {} variables, graph has {}",
            states.len(),
            self.layer_count()
        );
        for (id, state) in self.variable_ids().zip(states) {
            self.restore_variable(id, state);
        }
    }

    fn variable_ids(&self) -> impl Iterator<Item = OperationId> + '_ {
        (0..self.layer_count()).map(|layer| self.root_id(layer))
    }
}

/// Save a context's Variable state to a JSON file.
pub fn save_state_dict(path: impl AsRef<Path>, states: &[VariableState]) -> std::io::Result<()> {
    let f = File::create(path)?;
    let w = BufWriter::new(f);
    serde_json::to_writer(w, states).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Load Variable state previously written by [`save_state_dict`].
pub fn load_state_dict(path: impl AsRef<Path>) -> std::io::Result<Vec<VariableState>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::SGD;
    use crate::shape::Shape;

    #[test]
    fn round_trips_through_state_dict() {
        let mut ctx = ExecutionContext::new(None);
        ctx.variable(Some("w"), vec![1.0, 2.0], Shape::new(vec![2]), Box::new(SGD::new(0.1)))
            .unwrap();
        let saved = ctx.state_dict();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].data, vec![1.0, 2.0]);
        assert_eq!(saved[0].name.as_deref(), Some("w"));

        let mut restored = ExecutionContext::new(None);
        restored
            .variable(Some("w"), vec![0.0, 0.0], Shape::new(vec![2]), Box::new(SGD::new(0.1)))
            .unwrap();
        restored.load_state_dict(&saved);
        assert_eq!(restored.variable_data(0), &[1.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "state dict has 2 variables, graph has 1")]
    fn load_state_dict_panics_on_variable_count_mismatch() {
        let mut ctx = ExecutionContext::new(None);
        ctx.variable(Some("w"), vec![1.0, 2.0], Shape::new(vec![2]), Box::new(SGD::new(0.1)))
            .unwrap();
        let mismatched = vec![
            VariableState { name: Some("w".to_string()), shape: vec![2], data: vec![1.0, 2.0] },
            VariableState { name: Some("b".to_string()), shape: vec![1], data: vec![0.0] },
        ];
        ctx.load_state_dict(&mismatched);
    }
}
