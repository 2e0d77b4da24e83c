//! The lossless syntax tree.
//!
//! Nodes live in an arena owned by [`SyntaxTree`] and are addressed by
//! [`NodeId`]: each node stores its parent id and an ordered list of child
//! ids, which keeps parent links cycle-free and child mutation O(1) while
//! the tree is being grown. A node always has a start token; its end token
//! is stamped exactly once, when the node is syntactically closed, and span
//! queries are only meaningful after that.
//!
//! Sibling spans never overlap (the builder appends strictly left to
//! right), so position lookups can descend greedily without backtracking.

use crate::token::{Token, TokenKind};

// ── NodeId ────────────────────────────────────────────────────────────────

/// Index of a node in its [`SyntaxTree`] arena.
///
/// Ids are only valid for the tree that handed them out; indexing a
/// different tree with them is caller misuse and may panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Node kinds ────────────────────────────────────────────────────────────

/// Discriminant-only view of [`NodeKind`], for kind-filtered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Root,
    Element,
    EmptyElement,
    StartTag,
    EndTag,
    Attribute,
    Pi,
}

/// The closed set of grammatical constructs, each carrying the token slots
/// its grammar requires. A slot is `None` until the matching token arrives;
/// a node is complete once every required slot is filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root; spans the entire token range.
    Root,
    /// `<name ...> ... </name>`; owns a start tag child and, once matched,
    /// an end tag child.
    Element,
    /// `<name .../>`; owns only a start tag child.
    EmptyElement,
    /// `<name attr='v' ...`. Attributes hang off this node as children.
    StartTag { name: Option<Token> },
    /// `</name>`.
    EndTag { name: Option<Token> },
    /// `name='value'`. The name token doubles as the node's start token.
    Attribute {
        assign: Option<Token>,
        quote_open: Option<Token>,
        value: Option<Token>,
        quote_close: Option<Token>,
    },
    /// `<?target attr='v'?>`. Attributes hang off this node as children.
    Pi { target: Option<Token> },
}

impl NodeKind {
    pub fn syntax_kind(&self) -> SyntaxKind {
        match self {
            NodeKind::Root => SyntaxKind::Root,
            NodeKind::Element => SyntaxKind::Element,
            NodeKind::EmptyElement => SyntaxKind::EmptyElement,
            NodeKind::StartTag { .. } => SyntaxKind::StartTag,
            NodeKind::EndTag { .. } => SyntaxKind::EndTag,
            NodeKind::Attribute { .. } => SyntaxKind::Attribute,
            NodeKind::Pi { .. } => SyntaxKind::Pi,
        }
    }
}

// ── NodeData ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    start: Token,
    end: Option<Token>,
}

impl NodeData {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn syntax_kind(&self) -> SyntaxKind {
        self.kind.syntax_kind()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn start_token(&self) -> Token {
        self.start
    }

    pub fn end_token(&self) -> Option<Token> {
        self.end
    }

    /// Whether the node has been syntactically closed.
    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// True iff the node is closed and `pos` falls inside its span.
    pub fn contains(&self, pos: usize) -> bool {
        match self.end {
            Some(end) => self.start.start <= pos && pos < end.end(),
            None => false,
        }
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }
}

// ── SyntaxTree ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// A tree holding just the root node, which spans from `root_start`.
    pub(crate) fn new(root_start: Token) -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                start: root_start,
                end: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root always exists.
        false
    }

    // ── construction (builder only) ───────────────────────────────────────

    /// A new unattached node.
    pub(crate) fn push(&mut self, kind: NodeKind, start: Token) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData { kind, parent: None, children: Vec::new(), start, end: None });
        id
    }

    /// Make `child` the last child of `parent`. The child must be detached;
    /// a node never has two parents.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.index()].parent.is_none(), "node already attached");
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Undo [`Self::attach`].
    pub(crate) fn detach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].children.retain(|&c| c != child);
        self.nodes[child.index()].parent = None;
    }

    /// Stamp the node's end token. The first close wins; a closed node never
    /// reopens.
    pub(crate) fn set_end(&mut self, id: NodeId, end: Token) {
        let node = &mut self.nodes[id.index()];
        if node.end.is_none() {
            node.end = Some(end);
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    // ── queries ───────────────────────────────────────────────────────────

    /// The deepest node whose span contains `pos`, or `None` when even the
    /// root does not contain it.
    pub fn node_at(&self, pos: usize) -> Option<NodeId> {
        if !self.node(self.root()).contains(pos) {
            return None;
        }
        let mut cur = self.root();
        while let Some(child) = self.child_containing(cur, pos) {
            cur = child;
        }
        Some(cur)
    }

    /// The deepest node of the requested kind along the containment path to
    /// `pos`, or `None` when no node of that kind lies on the path.
    pub fn node_at_of(&self, pos: usize, kind: SyntaxKind) -> Option<NodeId> {
        if !self.node(self.root()).contains(pos) {
            return None;
        }
        let mut cur = self.root();
        let mut hit = (self.node(cur).syntax_kind() == kind).then_some(cur);
        while let Some(child) = self.child_containing(cur, pos) {
            cur = child;
            if self.node(cur).syntax_kind() == kind {
                hit = Some(cur);
            }
        }
        hit
    }

    /// Among `parent`'s children, the one containing `pos`. Children are in
    /// document order with non-overlapping spans, so a binary search on the
    /// start offsets finds the only candidate.
    fn child_containing(&self, parent: NodeId, pos: usize) -> Option<NodeId> {
        let children = self.children(parent);
        let i = children.partition_point(|&c| self.node(c).start.start <= pos);
        let candidate = *children.get(i.checked_sub(1)?)?;
        self.node(candidate).contains(pos).then_some(candidate)
    }

    /// Walk parent links up to the root.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(parent) = self.node(cur).parent() {
            cur = parent;
        }
        cur
    }

    /// True iff every grammatically required token slot of the node is
    /// filled (recursing into the tags an element owns).
    pub fn is_complete(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Root => node.end.is_some(),
            NodeKind::Element => {
                node.end.is_some()
                    && self.start_tag_of(id).is_some_and(|t| self.is_complete(t))
                    && self.end_tag_of(id).is_some_and(|t| self.is_complete(t))
            }
            NodeKind::EmptyElement => {
                node.end.is_some() && self.start_tag_of(id).is_some_and(|t| self.is_complete(t))
            }
            // A force-closed tag ends on whatever token preceded the
            // anomaly, so completeness also demands a real close delimiter.
            NodeKind::StartTag { name } => {
                name.is_some()
                    && matches!(
                        node.end.map(|t| t.kind),
                        Some(TokenKind::TagClose | TokenKind::EmptyClose)
                    )
            }
            NodeKind::EndTag { name } => {
                name.is_some() && node.end.map(|t| t.kind) == Some(TokenKind::TagClose)
            }
            // An empty value (`x=''`) has no value token yet is complete.
            NodeKind::Attribute { assign, quote_open, quote_close, .. } => {
                assign.is_some() && quote_open.is_some() && quote_close.is_some() && node.end.is_some()
            }
            NodeKind::Pi { target } => {
                target.is_some() && node.end.map(|t| t.kind) == Some(TokenKind::PiClose)
            }
        }
    }

    // ── structure accessors ───────────────────────────────────────────────

    /// The start tag child of an element or empty element.
    pub fn start_tag_of(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.node(c).syntax_kind() == SyntaxKind::StartTag)
    }

    /// The end tag child of an element, once matched.
    pub fn end_tag_of(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.node(c).syntax_kind() == SyntaxKind::EndTag)
    }

    /// The attribute children of a start tag or processing instruction; for
    /// an element, the attributes of its start tag.
    pub fn attributes_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let owner = match self.node(id).syntax_kind() {
            SyntaxKind::Element | SyntaxKind::EmptyElement => self.start_tag_of(id),
            SyntaxKind::StartTag | SyntaxKind::Pi => Some(id),
            _ => None,
        };
        owner
            .into_iter()
            .flat_map(move |o| self.children(o).iter().copied())
            .filter(move |&c| self.node(c).syntax_kind() == SyntaxKind::Attribute)
    }

    /// The name token of a tag, element, attribute, or processing
    /// instruction target.
    pub fn name_token(&self, id: NodeId) -> Option<Token> {
        match self.node(id).kind() {
            NodeKind::StartTag { name } | NodeKind::EndTag { name } => *name,
            NodeKind::Pi { target } => *target,
            NodeKind::Element | NodeKind::EmptyElement => {
                self.start_tag_of(id).and_then(|t| self.name_token(t))
            }
            NodeKind::Attribute { .. } => Some(self.node(id).start_token()),
            NodeKind::Root => None,
        }
    }
}
