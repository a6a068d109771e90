use crate::tree::NodeId;

/// One structural change under a single target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

/// Records delivered together to observers, one batch per [`crate::Page::mutate`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationBatch {
    pub records: Vec<MutationRecord>,
}

impl MutationBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn added_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.records.iter().flat_map(|record| record.added.iter().copied())
    }
}
