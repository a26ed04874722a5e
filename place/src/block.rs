use std::collections::{btree_map, BTreeMap};

use crate::xml::{Document, ElementIndex};
use crate::Error;

/// `instance` of an input pad primitive in a packed netlist.
pub const INPUT_PAD: &str = "inpad[0]";
/// `instance` of an output pad primitive in a packed netlist.
pub const OUTPUT_PAD: &str = "outpad[0]";

// Unused primitives keep their instance but are named "open".
const OPEN: &str = "open";

/// Returns the ancestor of `index` (or `index` itself) whose parent is the root, i.e. the top-level cluster the
/// placer addresses. The root itself has no cluster.
pub fn root_cluster(document: &Document, index: ElementIndex) -> Option<ElementIndex> {
    let mut current = index;
    loop {
        let parent = document[current].parent()?;
        if document[parent].parent().is_none() {
            return Some(current);
        }
        current = parent;
    }
}

/// Elements searched for pads: everything below each child of each top-level cluster.
pub(crate) fn cluster_subtrees(document: &Document) -> impl Iterator<Item = ElementIndex> + '_ {
    let root = document.root();
    document
        .children_named(root, "block")
        .flat_map(move |cluster| document.children_named(cluster, "block"))
        .flat_map(move |child| document.descendants(child))
}

/// Maps pad net names to the names of the clusters they were packed into.
#[derive(Debug, Clone, Default)]
pub struct BlockResolver {
    net_to_block: BTreeMap<String, String>,
}

impl BlockResolver {
    pub fn new(document: &Document) -> Result<BlockResolver, Error> {
        let mut net_to_block = BTreeMap::new();
        for index in cluster_subtrees(document) {
            let element = &document[index];
            if element.name != "block" {
                continue;
            }
            if !matches!(element.attr("instance"), Some(INPUT_PAD | OUTPUT_PAD)) {
                continue;
            }
            let Some(name) = element.attr("name") else {
                return Err(Error::MalformedHierarchy(format!(
                    "{} block without a name",
                    element.attr("instance").unwrap_or_default()
                )));
            };
            if name == OPEN {
                continue;
            }
            let cluster_name = root_cluster(document, index).and_then(|cluster| document[cluster].attr("name"));
            let Some(cluster_name) = cluster_name else {
                return Err(Error::MalformedHierarchy(format!("pad '{}' has no named top-level block", name)));
            };
            log::debug!("pad '{}' ({}) is in block '{}'", name, element.attr("instance").unwrap_or_default(), cluster_name);
            net_to_block.insert(name.to_owned(), cluster_name.to_owned());
        }
        Ok(BlockResolver { net_to_block })
    }

    pub fn parse(source: &str) -> Result<BlockResolver, Error> {
        BlockResolver::new(&Document::parse(source)?)
    }

    pub fn block(&self, net: &str) -> Option<&str> {
        self.net_to_block.get(net).map(|block| block.as_str())
    }

    pub fn iter(&self) -> btree_map::Iter<String, String> {
        self.net_to_block.iter()
    }

    pub fn len(&self) -> usize {
        self.net_to_block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.net_to_block.is_empty()
    }
}
