use std::fmt;
use std::marker::PhantomData;

use bytes::BytesMut;

use crate::{BoxHeader, BoxKind, CatalogBox, Mp4Box, Mp4BoxError};

/// Index of a box inside a [`BoxTree`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BoxId(usize);

/// A [`BoxId`] that remembers which type of box it points at.
pub struct BoxHandle<T> {
    id: BoxId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BoxHandle<T> {
    pub fn id(&self) -> BoxId {
        self.id
    }
}

impl<T> Clone for BoxHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BoxHandle<T> {}

impl<T> fmt::Debug for BoxHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoxHandle").field(&self.id).finish()
    }
}

struct BoxNode {
    header: BoxHeader,
    kind: BoxKind,
    parent: Option<BoxId>,
    children: Vec<BoxId>,
}

impl BoxNode {
    fn new(kind: BoxKind) -> Self {
        BoxNode {
            header: BoxHeader::for_payload(kind.name(), kind.full_box_header(), kind.content_size()),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A tree of boxes stored in one arena.
///
/// Every box's size is kept equal to its header, its own fields and the sizes
/// of all its children. Sizes are updated when a child is attached or a box is
/// modified, never when the tree is written. Parent links are only followed to
/// carry those size changes upwards.
pub struct BoxTree {
    nodes: Vec<BoxNode>,
}

impl BoxTree {
    pub fn new<B: Into<BoxKind>>(root: B) -> Self {
        BoxTree {
            nodes: vec![BoxNode::new(root.into())],
        }
    }

    pub fn root(&self) -> BoxId {
        BoxId(0)
    }

    /// Total size of the tree, which is the size of its root box.
    pub fn size(&self) -> u64 {
        self.nodes[0].header.size()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: BoxId) -> Result<&BoxNode, Mp4BoxError> {
        self.nodes.get(id.0).ok_or(Mp4BoxError::UnknownBox(id))
    }

    pub fn header(&self, id: BoxId) -> Result<&BoxHeader, Mp4BoxError> {
        Ok(&self.node(id)?.header)
    }

    pub fn box_size(&self, id: BoxId) -> Result<u64, Mp4BoxError> {
        Ok(self.node(id)?.header.size())
    }

    pub fn kind(&self, id: BoxId) -> Result<&BoxKind, Mp4BoxError> {
        Ok(&self.node(id)?.kind)
    }

    pub fn parent(&self, id: BoxId) -> Result<Option<BoxId>, Mp4BoxError> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: BoxId) -> Result<&[BoxId], Mp4BoxError> {
        Ok(&self.node(id)?.children)
    }

    /// Moves `child` and all of its boxes into this tree as the last child of
    /// `parent`, then grows `parent` and each of its ancestors by the size of
    /// `child`. Returns the id the root of `child` has in this tree.
    pub fn add_child(&mut self, parent: BoxId, child: BoxTree) -> Result<BoxId, Mp4BoxError> {
        self.node(parent)?;

        let offset = self.nodes.len();
        let child_size = child.size();

        self.nodes.extend(child.nodes.into_iter().map(|mut node| {
            node.parent = Some(node.parent.map_or(parent, |p| BoxId(p.0 + offset)));
            for id in node.children.iter_mut() {
                id.0 += offset;
            }
            node
        }));

        let id = BoxId(offset);
        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.push(id);
        parent_node.kind.child_added();

        self.propagate(Some(parent), 0, child_size);

        Ok(id)
    }

    /// Attaches a single box as the last child of `parent`.
    pub fn push<B: Into<BoxKind>>(&mut self, parent: BoxId, child: B) -> Result<BoxId, Mp4BoxError> {
        self.add_child(parent, BoxTree::new(child))
    }

    /// Like [`push`](Self::push), but returns a typed handle for later access.
    pub fn push_handle<B: CatalogBox>(
        &mut self,
        parent: BoxId,
        child: B,
    ) -> Result<BoxHandle<B>, Mp4BoxError> {
        let id = self.push(parent, child)?;

        Ok(BoxHandle {
            id,
            _marker: PhantomData,
        })
    }

    pub fn get<T: CatalogBox>(&self, handle: BoxHandle<T>) -> Result<&T, Mp4BoxError> {
        let kind = &self.node(handle.id)?.kind;

        T::from_kind(kind).ok_or_else(|| Mp4BoxError::BoxKindMismatch {
            expected: <T as Mp4Box>::NAME,
            found: kind.name(),
        })
    }

    /// Runs `f` on the box behind `handle`. If that changes the size of the
    /// box's fields, the box and all of its ancestors are resized.
    pub fn modify<T: CatalogBox, R>(
        &mut self,
        handle: BoxHandle<T>,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, Mp4BoxError> {
        let node = self
            .nodes
            .get_mut(handle.id.0)
            .ok_or(Mp4BoxError::UnknownBox(handle.id))?;

        let found = node.kind.name();
        let content_before = node.kind.content_size();

        let boks = T::from_kind_mut(&mut node.kind).ok_or(Mp4BoxError::BoxKindMismatch {
            expected: <T as Mp4Box>::NAME,
            found,
        })?;
        let result = f(boks);

        node.header.set_full_box_header(node.kind.full_box_header());

        let content_after = node.kind.content_size();
        if content_after != content_before {
            let size_before = node.header.size();
            node.header
                .set_payload_size(node.header.payload_size() - content_before + content_after);
            let size_after = node.header.size();
            let parent = node.parent;

            self.propagate(parent, size_before, size_after);
        }

        Ok(result)
    }

    /// Replaces a child of size `old` by one of size `new` in every box from
    /// `parent` up to the root.
    fn propagate(&mut self, mut parent: Option<BoxId>, mut old: u64, mut new: u64) {
        while let Some(id) = parent {
            let node = &mut self.nodes[id.0];

            let size_before = node.header.size();
            node.header
                .set_payload_size(node.header.payload_size() - old + new);

            old = size_before;
            new = node.header.size();
            parent = node.parent;
        }
    }

    pub fn write(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        self.write_box(self.root(), writer)
    }

    fn write_box(&self, id: BoxId, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        let node = self.node(id)?;
        let start = writer.len();

        node.header.write(writer);
        node.kind.write_box_contents(writer)?;

        for &child in &node.children {
            self.write_box(child, writer)?;
        }

        debug_assert_eq!(
            (writer.len() - start) as u64,
            node.header.size(),
            "size of '{}' is out of date",
            node.header.name()
        );

        Ok(())
    }
}
