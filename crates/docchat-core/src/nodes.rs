//! Position bookkeeping over node lists: annotation, scope filtering and
//! topic grouping.

use serde_json::Value;

use crate::types::{Node, FILE_NAME_KEY, FILE_PATH_KEY, POSITION_KEY};

/// Assign `position`, synthetic `file_name`/`file_path`, and hide `file_path`
/// from LLM-facing renders. Positions are `0..n` in slice order.
///
/// The synthetic names replace whatever provenance the reader recorded.
pub fn annotate_nodes(nodes: &mut [Node]) {
    for (i, node) in nodes.iter_mut().enumerate() {
        node.metadata.insert(POSITION_KEY.into(), Value::from(i as i64));
        node.metadata.insert(FILE_NAME_KEY.into(), Value::String(format!("file_{}.txt", i)));
        node.metadata.insert(FILE_PATH_KEY.into(), Value::String(format!("/path/to/file_{}.txt", i)));
        node.excluded_llm_metadata_keys = vec![FILE_PATH_KEY.to_string()];
    }
}

/// Nodes at or before `position`, in their original order. Nodes without an
/// integer position never pass.
pub fn filter_nodes<'a, I>(nodes: I, position: i64) -> Vec<Node>
where
    I: IntoIterator<Item = &'a Node>,
{
    nodes
        .into_iter()
        .filter(|n| n.position().is_some_and(|p| p <= position))
        .cloned()
        .collect()
}

/// Nodes partitioned by topic, topics in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicGroups {
    groups: Vec<(String, Vec<Node>)>,
}

impl TopicGroups {
    pub fn get(&self, topic: &str) -> Option<&[Node]> {
        self.groups.iter().find(|(t, _)| t == topic).map(|(_, nodes)| nodes.as_slice())
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(t, _)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Node])> {
        self.groups.iter().map(|(t, nodes)| (t.as_str(), nodes.as_slice()))
    }

    pub fn len(&self) -> usize { self.groups.len() }

    pub fn is_empty(&self) -> bool { self.groups.is_empty() }
}

pub fn group_nodes<'a, I>(nodes: I) -> TopicGroups
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut groups: Vec<(String, Vec<Node>)> = Vec::new();
    for node in nodes {
        let topic = node.topic();
        match groups.iter_mut().find(|(t, _)| t == topic) {
            Some((_, members)) => members.push(node.clone()),
            None => groups.push((topic.to_string(), vec![node.clone()])),
        }
    }
    TopicGroups { groups }
}
