//! The in-memory directory tree reconstructed from the descriptor
//! table, and the slash-path resolver over it.

use crate::types::{Descriptor, Marker, MAP_LUMP_COUNT};

pub(crate) type NodeId = usize;

/// Arena index of the root directory.
pub(crate) const ROOT: NodeId = 0;

/// A single node of the directory tree.
///
/// Directories mirror the marker descriptor that opened them, lumps
/// mirror their own descriptor. `desc_index` is the index of that
/// descriptor and is repaired whenever a mutation splices new entries
/// into the table. The root is synthetic: it mirrors no descriptor and
/// keeps index 0 by convention.
pub(crate) struct Node {
    pub name: String,
    pub is_dir: bool,
    pub offset: u32,
    pub length: u32,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub desc_index: usize,
}

/// The directory tree, arena-backed.
///
/// The arena owns every node; parents and children refer to each other
/// by index only, so index repair after a descriptor splice is a
/// linear sweep.
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Rebuilds the tree from the flat descriptor sequence.
    ///
    /// Walks the descriptors in order with a stack of open directories:
    /// map markers claim the ten following descriptors, `_START`
    /// markers open a namespace until the next unmatched `_END`. The
    /// stack need not be balanced at the end of input; a surplus pop
    /// never removes the root.
    pub fn rebuild(descriptors: &[Descriptor]) -> Self {
        let mut tree = Self {
            nodes: vec![Node {
                name: "/".to_owned(),
                is_dir: true,
                offset: 0,
                length: 0,
                parent: None,
                children: Vec::new(),
                desc_index: 0,
            }],
        };

        let mut stack = vec![ROOT];
        let mut map_countdown = 0;

        for (i, desc) in descriptors.iter().enumerate() {
            let name = desc.name().into_owned();
            let top = stack.last().copied().unwrap_or(ROOT);

            match Marker::classify(&name) {
                Marker::Map => {
                    let id = tree.append(top, name.clone(), true, desc, i);
                    stack.push(id);
                    map_countdown = MAP_LUMP_COUNT;
                }
                Marker::NamespaceStart(prefix) => {
                    let dir_name = prefix.to_owned();
                    let id = tree.append(top, dir_name, true, desc, i);
                    stack.push(id);
                }
                Marker::NamespaceEnd => {
                    // The popped directory's name is not checked
                    // against the marker.
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                Marker::Lump => {
                    tree.append(top, name.clone(), false, desc, i);
                    if map_countdown > 0 {
                        map_countdown -= 1;
                        if map_countdown == 0 && stack.len() > 1 {
                            stack.pop();
                        }
                    }
                }
            }
        }

        tree
    }

    // Appends a node during reconstruction. Children end up in
    // ascending descriptor order because the walk is in order.
    fn append(
        &mut self,
        parent: NodeId,
        name: String,
        is_dir: bool,
        desc: &Descriptor,
        desc_index: usize,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            name,
            is_dir,
            offset: desc.offset,
            length: desc.length,
            parent: Some(parent),
            children: Vec::new(),
            desc_index,
        });
        self.nodes[parent].children.push(id);

        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Looks up an immediate child of `dir` by exact name.
    pub fn child_by_name(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[dir]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].name == name)
    }

    /// Resolves an absolute slash-delimited path to a node.
    ///
    /// Empty components from doubled slashes are skipped; anything not
    /// starting with `/` fails.
    pub fn resolve(&self, path: &str) -> Option<NodeId> {
        if !path.starts_with('/') {
            return None;
        }

        let mut cur = ROOT;
        for part in path.split('/') {
            if part.is_empty() {
                continue;
            }
            cur = self.child_by_name(cur, part)?;
        }

        Some(cur)
    }

    /// Adds 2 (or 1) to every stored descriptor index at or behind a
    /// splice point. The root's conventional index 0 is left alone; it
    /// mirrors no descriptor.
    pub fn shift_indices(&mut self, from: usize, by: usize) {
        for node in &mut self.nodes[1..] {
            if node.desc_index >= from {
                node.desc_index += by;
            }
        }
    }

    /// Creates a new zero-offset, zero-length node and hooks it into
    /// `parent`'s children at the position that keeps them sorted by
    /// descriptor index.
    pub fn add_child(&mut self, parent: NodeId, name: String, is_dir: bool, desc_index: usize) {
        let id = self.nodes.len();
        self.nodes.push(Node {
            name,
            is_dir,
            offset: 0,
            length: 0,
            parent: Some(parent),
            children: Vec::new(),
            desc_index,
        });

        let children = &self.nodes[parent].children;
        let pos = children
            .iter()
            .position(|&c| self.nodes[c].desc_index >= desc_index)
            .unwrap_or(children.len());
        self.nodes[parent].children.insert(pos, id);
    }

    /// The full slash path of a node, assembled through the parent
    /// chain.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut cur = id;
        while cur != ROOT {
            let node = self.node(cur);
            parts.push(node.name.as_str());
            cur = node.parent.unwrap_or(ROOT);
        }
        parts.reverse();

        format!("/{}", parts.join("/"))
    }

    /// Depth-first `(full path, node)` enumeration of every lump, in
    /// descriptor order.
    pub fn lump_paths(&self) -> Vec<(String, NodeId)> {
        let mut out = Vec::new();
        let mut stack = vec![ROOT];

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if !node.is_dir {
                out.push((self.path_of(id), id));
                continue;
            }
            stack.extend(node.children.iter().rev().copied());
        }

        out
    }
}

/// Strips trailing slashes from a path, keeping a lone `/` intact.
pub(crate) fn normalize(path: &str) -> &str {
    let mut s = path;
    while s.len() > 1 && s.ends_with('/') {
        s = &s[..s.len() - 1];
    }

    s
}
