//! One parsed IML source: text, tokens, tree, diagnostics, and the
//! position queries an editor leans on.
//!
//! A [`Document`] is built once, synchronously, and is immutable afterward,
//! so concurrent readers need no locking. There is no incremental update:
//! re-parsing after an edit means constructing a new `Document` (debouncing
//! that is the caller's business). The token query is a binary search over
//! the ordered token array and the node query walks one root-to-leaf path,
//! which keeps both cheap enough to run on every cursor move.

use crate::diagnostic::Diagnostic;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::syntax::{NodeId, NodeKind, SyntaxKind, SyntaxTree};
use crate::token::Token;

// ── Document ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Document {
    text: String,
    tokens: Vec<Token>,
    tree: SyntaxTree,
    diagnostics: Vec<Diagnostic>,
}

impl Document {
    /// Scan and parse `text`. Total: any string yields a document, with
    /// anomalies surfacing in [`Self::diagnostics`] rather than an error.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let tokens = Lexer::new(&text).tokenize();
        let (tree, diagnostics) = Parser::new(&text, &tokens).process();
        Self { text, tokens, tree, diagnostics }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_well_formed(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The token's text, borrowed from the document.
    pub fn token_text(&self, token: Token) -> &str {
        token.text(&self.text)
    }

    // ── position queries ──────────────────────────────────────────────────

    /// The token at or immediately before `pos`, by binary search on start
    /// offsets. `None` for an empty token stream and for `pos == 0`, where
    /// nothing precedes the cursor.
    pub fn token_at(&self, pos: usize) -> Option<Token> {
        if self.tokens.is_empty() || pos == 0 {
            return None;
        }
        let i = self.tokens.partition_point(|t| t.start <= pos);
        // tokens[0] starts at 0, so i >= 1 here.
        self.tokens.get(i - 1).copied()
    }

    /// The deepest node containing `pos`; `None` when even the root's span
    /// does not contain it.
    pub fn node_at(&self, pos: usize) -> Option<NodeId> {
        self.tree.node_at(pos)
    }

    /// Kind-filtered form of [`Self::node_at`].
    pub fn node_at_of(&self, pos: usize, kind: SyntaxKind) -> Option<NodeId> {
        self.tree.node_at_of(pos, kind)
    }

    // ── consumer accessors ────────────────────────────────────────────────

    /// The name of a tag, element, attribute, or processing-instruction
    /// target, as written in the source.
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.tree.name_token(id).map(|t| self.token_text(t))
    }

    /// The attribute of `id` (an element, tag, or processing instruction)
    /// with the given name.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.tree
            .attributes_of(id)
            .find(|&a| self.tree.name_token(a).is_some_and(|t| self.token_text(t) == name))
    }

    /// The text of the named attribute's value. An attribute whose quotes
    /// closed around nothing reads as `""`; one still missing its value
    /// entirely reads as `None`.
    pub fn attribute_value(&self, id: NodeId, name: &str) -> Option<&str> {
        let attr = self.attribute(id, name)?;
        match self.tree.node(attr).kind() {
            NodeKind::Attribute { value: Some(v), .. } => Some(self.token_text(*v)),
            NodeKind::Attribute { quote_close: Some(_), value: None, .. } => Some(""),
            _ => None,
        }
    }
}

// ── entry point ───────────────────────────────────────────────────────────

/// Parse an IML source string into a [`Document`].
pub fn parse(text: impl Into<String>) -> Document {
    Document::parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn token_query_finds_the_covering_token() {
        let doc = Document::parse("<a b='c'/>");
        // 0:`<` 1:`a` 2:` ` 3:`b` 4:`=` 5:`'` 6:`c` 7:`'` 8:`/>`
        assert_eq!(doc.token_at(0), None);
        assert_eq!(doc.token_at(1).map(|t| t.kind), Some(TokenKind::ElementName));
        assert_eq!(doc.token_at(6).map(|t| t.kind), Some(TokenKind::Value));
        assert_eq!(doc.token_at(9).map(|t| t.kind), Some(TokenKind::EmptyClose));
        // Past the end: the last token.
        assert_eq!(doc.token_at(100).map(|t| t.kind), Some(TokenKind::EmptyClose));
    }

    #[test]
    fn token_query_is_monotonic() {
        let doc = Document::parse("<Panel Pad='4'><Label Text='hi'/></Panel>");
        let mut last_start = 0;
        for pos in 1..doc.text().len() + 4 {
            let tok = doc.token_at(pos).unwrap();
            assert!(tok.start >= last_start, "pos {pos}");
            last_start = tok.start;
        }
    }

    #[test]
    fn node_query_descends_to_the_deepest_node() {
        let doc = Document::parse("<a b='c'/>");
        let attr = doc.node_at(6).unwrap();
        assert_eq!(doc.tree().node(attr).syntax_kind(), SyntaxKind::Attribute);
        assert_eq!(doc.node_at_of(6, SyntaxKind::Attribute), Some(attr));
        // The start tag lies on the same path; a plain Element does not.
        assert!(doc.node_at_of(6, SyntaxKind::StartTag).is_some());
        assert_eq!(doc.node_at_of(6, SyntaxKind::Element), None);
        // Outside the root span.
        assert_eq!(doc.node_at(10), None);
    }

    #[test]
    fn name_position_resolves_to_the_start_tag() {
        let doc = Document::parse("<Widget Width='50'/>");
        let tag = doc.node_at_of(3, SyntaxKind::StartTag).unwrap();
        assert_eq!(doc.node_name(tag), Some("Widget"));
    }

    #[test]
    fn empty_document_answers_without_panicking() {
        let doc = Document::parse("");
        assert!(doc.tokens().is_empty());
        assert_eq!(doc.token_at(0), None);
        assert_eq!(doc.token_at(5), None);
        assert_eq!(doc.node_at(0), None);
        assert_eq!(doc.node_at_of(0, SyntaxKind::Element), None);
        assert!(doc.is_well_formed());
    }

    #[test]
    fn attribute_lookup_by_name() {
        let doc = Document::parse("<Button Label='OK' Pad=''/>");
        let button = doc.tree().children(doc.tree().root())[0];
        assert_eq!(doc.node_name(button), Some("Button"));
        assert_eq!(doc.attribute_value(button, "Label"), Some("OK"));
        assert_eq!(doc.attribute_value(button, "Pad"), Some(""));
        assert_eq!(doc.attribute_value(button, "Missing"), None);
    }

    #[test]
    fn text_is_read_back_zero_copy() {
        let doc = Document::parse("<a>body</a>");
        let content = doc.tokens().iter().find(|t| t.kind == TokenKind::Content).copied().unwrap();
        assert_eq!(doc.token_text(content), "body");
    }
}
