//! In-place growth of a loaded archive: directory creation, empty
//! lump creation, and one-shot lump writes.
//!
//! Every operation here edits the descriptor vector and the byte
//! image in lockstep and repairs the descriptor indices stored in the
//! tree, so that the flat table and the reconstructed view never
//! disagree. Nothing ever shrinks.

use crate::{
    tree::{normalize, NodeId, ROOT},
    types::{is_map_marker, Descriptor, DESCRIPTOR_SIZE},
    Archive,
};

// "/a/b" -> ("/a", "b"); "/b" -> ("/", "b"). The input is normalized
// and neither empty nor "/".
fn split_parent(path: &str) -> Option<(&str, &str)> {
    let slash = path.rfind('/')?;
    let parent = if slash == 0 { "/" } else { &path[..slash] };

    Some((parent, &path[slash + 1..]))
}

impl Archive {
    /// Creates a namespace directory at `path`.
    ///
    /// A new `<name>_START`/`<name>_END` marker pair is spliced into
    /// the descriptor table: at the end for a root parent, directly
    /// before the parent's own `_END` otherwise. The name must be one
    /// or two bytes so both marker names fit the 8-byte field.
    ///
    /// Silently does nothing when the path, the name, or the parent is
    /// unsuitable (map-marker parents cannot take children); callers
    /// re-query to observe the outcome.
    pub fn create_directory(&mut self, path: &str) {
        let path = normalize(path);
        if path.is_empty() || path == "/" {
            return;
        }
        let Some((parent_path, name)) = split_parent(path) else {
            return;
        };
        if name.is_empty() || name.len() > 2 {
            return;
        }
        let Some(parent) = self.mutable_parent(parent_path, name) else {
            return;
        };
        let Some(insert_pos) = self.insert_position(parent) else {
            return;
        };

        // Two-byte names make these fit exactly.
        let Some(start) = Descriptor::empty(&format!("{name}_START")) else {
            return;
        };
        let Some(end) = Descriptor::empty(&format!("{name}_END")) else {
            return;
        };

        // Descriptor vector and header mirror first.
        self.descriptors.insert(insert_pos, end);
        self.descriptors.insert(insert_pos, start);
        self.header.count += 2;

        // Repair stored indices, then hook the new node into the tree.
        self.tree.shift_indices(insert_pos, 2);
        self.tree
            .add_child(parent, name.to_owned(), true, insert_pos);

        // Mirror into the image: 32 raw bytes inside the descriptor
        // table, then the new count in header bytes 4..8. The
        // descriptor offset does not move; the payload region did not
        // grow.
        let mut raw = [0; 2 * DESCRIPTOR_SIZE];
        raw[..DESCRIPTOR_SIZE].copy_from_slice(&start.to_bytes());
        raw[DESCRIPTOR_SIZE..].copy_from_slice(&end.to_bytes());
        self.image.splice(
            self.header.offset as usize + insert_pos * DESCRIPTOR_SIZE,
            &raw,
        );
        self.image.write_at(4, &self.header.count.to_le_bytes());
    }

    /// Creates an empty lump at `path`.
    ///
    /// The new descriptor carries zero offset and zero length until
    /// [`Archive::write_at`] fills it. Names are up to 8 bytes and may
    /// not themselves look like a map marker.
    ///
    /// Silently does nothing when the path, the name, or the parent is
    /// unsuitable; callers re-query to observe the outcome.
    pub fn create_file(&mut self, path: &str) {
        let path = normalize(path);
        if path.is_empty() || path == "/" {
            return;
        }
        let Some((parent_path, name)) = split_parent(path) else {
            return;
        };
        if name.is_empty() || name.len() > 8 || is_map_marker(name) {
            return;
        }
        let Some(parent) = self.mutable_parent(parent_path, name) else {
            return;
        };
        let Some(insert_pos) = self.insert_position(parent) else {
            return;
        };
        let Some(desc) = Descriptor::empty(name) else {
            return;
        };

        self.descriptors.insert(insert_pos, desc);
        self.header.count += 1;

        self.tree.shift_indices(insert_pos, 1);
        self.tree
            .add_child(parent, name.to_owned(), false, insert_pos);

        self.image.splice(
            self.header.offset as usize + insert_pos * DESCRIPTOR_SIZE,
            &desc.to_bytes(),
        );
        self.image.write_at(4, &self.header.count.to_le_bytes());
    }

    /// Writes `data` into the empty lump at `path`, placing it at
    /// byte offset `offset` within the lump.
    ///
    /// The payload (zero-filled up to `offset`) is spliced between the
    /// existing payload region and the descriptor table, and the
    /// descriptor table offset advances past it. Writing is one-shot
    /// per lump: the target must still have length zero.
    ///
    /// Returns the number of bytes written, or -1 when `data` is
    /// empty, `path` does not resolve to a lump, the lump is not
    /// empty, or the resulting size does not fit a descriptor.
    pub fn write_at(&mut self, path: &str, data: &[u8], offset: usize) -> i64 {
        if data.is_empty() {
            return -1;
        }
        let path = normalize(path);
        if path.is_empty() {
            return -1;
        }
        let Some(id) = self.tree.resolve(path) else {
            return -1;
        };

        let node = self.tree.node(id);
        if node.is_dir || node.length != 0 {
            return -1;
        }
        let index = node.desc_index;

        let Some(total) = offset.checked_add(data.len()) else {
            return -1;
        };
        let Ok(lump_size) = u32::try_from(total) else {
            return -1;
        };
        let Some(new_table_offset) = self.header.offset.checked_add(lump_size) else {
            return -1;
        };

        let mut lump = vec![0; total];
        lump[offset..].copy_from_slice(data);

        // The payload lands where the descriptor table used to begin;
        // the table shifts back by the lump size.
        let placed_at = self.header.offset;
        self.image.splice(placed_at as usize, &lump);
        self.header.offset = new_table_offset;
        self.image.write_at(8, &self.header.offset.to_le_bytes());

        // Point the descriptor at the new payload and mirror it into
        // the (just-shifted) table region.
        let desc = &mut self.descriptors[index];
        desc.offset = placed_at;
        desc.length = lump_size;
        let desc = *desc;
        self.image.write_at(
            self.header.offset as usize + index * DESCRIPTOR_SIZE,
            &desc.to_bytes(),
        );

        let node = self.tree.node_mut(id);
        node.offset = desc.offset;
        node.length = desc.length;

        data.len() as i64
    }

    // Resolves the parent directory for a mutation: it must exist, be
    // a directory, not be a map-marker directory, and not already have
    // a child called `name`.
    fn mutable_parent(&self, parent_path: &str, name: &str) -> Option<NodeId> {
        let parent = self.tree.resolve(normalize(parent_path))?;
        let node = self.tree.node(parent);
        if !node.is_dir || is_map_marker(&node.name) {
            return None;
        }
        if self.tree.child_by_name(parent, name).is_some() {
            return None;
        }

        Some(parent)
    }

    // Descriptor-table insertion point for a new child of `parent`:
    // the end of the table for root, directly before the parent's own
    // `_END` marker otherwise. A namespace whose `_END` went missing
    // takes no children.
    fn insert_position(&self, parent: NodeId) -> Option<usize> {
        if parent == ROOT {
            return Some(self.descriptors.len());
        }

        let node = self.tree.node(parent);
        let end_tag = format!("{}_END", node.name);
        (node.desc_index + 1..self.descriptors.len())
            .find(|&i| self.descriptors[i].name() == end_tag)
    }
}
