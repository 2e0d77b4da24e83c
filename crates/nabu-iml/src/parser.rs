//! Single-pass tree builder.
//!
//! The parser consumes the token stream left to right and grows the arena
//! as it goes. There is no separate parser-state variable: each token is
//! dispatched on the kind of the node currently being built, which keeps
//! the automaton's states identical to the tree shapes they produce. The
//! grammar allows this because attributes cannot contain elements and
//! elements cannot appear inside attributes, so the reachable set of
//! "current node kinds" stays small and the dispatch exhaustive.
//!
//! Malformed input never aborts the pass. An unexpected token is recorded
//! as a [`Diagnostic`], the open node is force-closed with the previous
//! good token as its end, and parsing resumes one level up, so even a
//! mid-edit or truncated document yields a fully spanned tree.

use crate::diagnostic::Diagnostic;
use crate::syntax::{NodeId, NodeKind, SyntaxKind, SyntaxTree};
use crate::token::{Token, TokenKind};

// ── Step ──────────────────────────────────────────────────────────────────

/// Outcome of feeding one token to the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Token consumed normally.
    Continue,
    /// Token consumed as a diagnostic; recovery may have closed a node.
    Recovered,
    /// Token stream exhausted.
    Done,
}

// ── Parser ────────────────────────────────────────────────────────────────

pub struct Parser<'a> {
    src: &'a str,
    tokens: &'a [Token],
    idx: usize,
    tree: SyntaxTree,
    current: NodeId,
    /// Last token consumed without a diagnostic; force-closed nodes end here.
    prev: Token,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, tokens: &'a [Token]) -> Self {
        let root_start = tokens.first().copied().unwrap_or(Token::EMPTY);
        let tree = SyntaxTree::new(root_start);
        let current = tree.root();
        Self { src, tokens, idx: 0, tree, current, prev: Token::EMPTY, diagnostics: Vec::new() }
    }

    /// Consume the whole token stream and return the spanned tree together
    /// with the diagnostics collected along the way.
    pub fn process(mut self) -> (SyntaxTree, Vec<Diagnostic>) {
        while self.step() != Step::Done {}
        self.finish();
        (self.tree, self.diagnostics)
    }

    /// Feed the next structural token to the automaton.
    fn step(&mut self) -> Step {
        loop {
            let Some(&tok) = self.tokens.get(self.idx) else {
                return Step::Done;
            };
            self.idx += 1;
            if tok.kind.is_trivia() {
                continue;
            }
            let step = match self.tree.node(self.current).syntax_kind() {
                SyntaxKind::Root => self.on_root(tok),
                SyntaxKind::StartTag => self.on_start_tag(tok),
                SyntaxKind::Element | SyntaxKind::EmptyElement => self.on_element(tok),
                SyntaxKind::Attribute => self.on_attribute(tok),
                SyntaxKind::EndTag => self.on_end_tag(tok),
                SyntaxKind::Pi => self.on_pi(tok),
            };
            if step == Step::Continue {
                self.prev = tok;
            }
            return step;
        }
    }

    // ── per-kind dispatch ─────────────────────────────────────────────────

    fn on_root(&mut self, tok: Token) -> Step {
        match tok.kind {
            TokenKind::TagOpen => {
                self.open(NodeKind::StartTag { name: None }, tok);
                Step::Continue
            }
            TokenKind::PiOpen => {
                self.open(NodeKind::Pi { target: None }, tok);
                Step::Continue
            }
            // Only new top-level elements and processing instructions are
            // valid here; the diagnostic changes no state.
            _ => {
                self.report(format!("expected an element or processing instruction, found {:?}", tok.kind), tok);
                Step::Recovered
            }
        }
    }

    fn on_start_tag(&mut self, tok: Token) -> Step {
        let tag = self.current;
        match tok.kind {
            TokenKind::ElementName => {
                if let NodeKind::StartTag { name: name @ None } = self.tree.node_mut(tag).kind_mut() {
                    *name = Some(tok);
                    Step::Continue
                } else {
                    self.recover(format!("unexpected {:?} in start tag", tok.kind), tok)
                }
            }
            TokenKind::AttributeName => {
                self.open(
                    NodeKind::Attribute { assign: None, quote_open: None, value: None, quote_close: None },
                    tok,
                );
                Step::Continue
            }
            TokenKind::TagClose => {
                // Promote the tag into a full element and descend into it.
                self.tree.set_end(tag, tok);
                let parent = self.parent_of(tag);
                self.tree.detach(parent, tag);
                let element = self.tree.push(NodeKind::Element, self.tree.node(tag).start_token());
                self.tree.attach(parent, element);
                self.tree.attach(element, tag);
                self.current = element;
                Step::Continue
            }
            TokenKind::EmptyClose => {
                // A self-closing element is complete on the spot: wrap the
                // tag and ascend without descending.
                self.tree.set_end(tag, tok);
                let parent = self.parent_of(tag);
                self.tree.detach(parent, tag);
                let element = self.tree.push(NodeKind::EmptyElement, self.tree.node(tag).start_token());
                self.tree.set_end(element, tok);
                self.tree.attach(parent, element);
                self.tree.attach(element, tag);
                self.current = parent;
                Step::Continue
            }
            _ => self.recover(format!("unexpected {:?} in start tag", tok.kind), tok),
        }
    }

    fn on_element(&mut self, tok: Token) -> Step {
        match tok.kind {
            TokenKind::TagOpen => {
                self.open(NodeKind::StartTag { name: None }, tok);
                Step::Continue
            }
            TokenKind::EndTagOpen => {
                self.open(NodeKind::EndTag { name: None }, tok);
                Step::Continue
            }
            // Text between tags carries no structure of its own.
            TokenKind::Content => Step::Continue,
            _ => self.recover(format!("unexpected {:?} in element content", tok.kind), tok),
        }
    }

    fn on_attribute(&mut self, tok: Token) -> Step {
        let attr = self.current;
        match tok.kind {
            TokenKind::Assign => {
                let duplicate = matches!(
                    self.tree.node(attr).kind(),
                    NodeKind::Attribute { assign: Some(_), .. }
                );
                if duplicate {
                    // Flagged but tolerated; the attribute stays open.
                    self.report("duplicate '=' in attribute", tok);
                } else if let NodeKind::Attribute { assign, .. } = self.tree.node_mut(attr).kind_mut() {
                    *assign = Some(tok);
                }
                Step::Continue
            }
            TokenKind::QuoteOpen => {
                if let NodeKind::Attribute { quote_open: slot @ None, .. } =
                    self.tree.node_mut(attr).kind_mut()
                {
                    *slot = Some(tok);
                    Step::Continue
                } else {
                    self.recover(format!("unexpected {:?} in attribute", tok.kind), tok)
                }
            }
            TokenKind::Value => {
                if let NodeKind::Attribute { value: slot @ None, .. } = self.tree.node_mut(attr).kind_mut() {
                    *slot = Some(tok);
                    Step::Continue
                } else {
                    self.recover(format!("unexpected {:?} in attribute", tok.kind), tok)
                }
            }
            TokenKind::QuoteClose => {
                if let NodeKind::Attribute { quote_close: slot @ None, .. } =
                    self.tree.node_mut(attr).kind_mut()
                {
                    *slot = Some(tok);
                }
                // The close quote completes the attribute; ascend to the
                // owning tag or processing instruction.
                self.tree.set_end(attr, tok);
                self.current = self.parent_of(attr);
                Step::Continue
            }
            _ => self.recover(format!("unexpected {:?} in attribute", tok.kind), tok),
        }
    }

    fn on_end_tag(&mut self, tok: Token) -> Step {
        let end_tag = self.current;
        match tok.kind {
            // The name is recorded as written; whether it matches the start
            // tag is a semantic question the tree consumer answers.
            TokenKind::ElementName => {
                if let NodeKind::EndTag { name: name @ None } = self.tree.node_mut(end_tag).kind_mut() {
                    *name = Some(tok);
                    Step::Continue
                } else {
                    self.recover(format!("unexpected {:?} in end tag", tok.kind), tok)
                }
            }
            TokenKind::TagClose => {
                // Completes the end tag and its owning element; ascend two
                // levels.
                self.tree.set_end(end_tag, tok);
                let element = self.parent_of(end_tag);
                self.tree.set_end(element, tok);
                self.current = self.parent_of(element);
                Step::Continue
            }
            _ => self.recover(format!("unexpected {:?} in end tag", tok.kind), tok),
        }
    }

    fn on_pi(&mut self, tok: Token) -> Step {
        let pi = self.current;
        match tok.kind {
            TokenKind::PiTarget => {
                if let NodeKind::Pi { target: target @ None } = self.tree.node_mut(pi).kind_mut() {
                    *target = Some(tok);
                    Step::Continue
                } else {
                    self.recover(format!("unexpected {:?} in processing instruction", tok.kind), tok)
                }
            }
            TokenKind::AttributeName => {
                self.open(
                    NodeKind::Attribute { assign: None, quote_open: None, value: None, quote_close: None },
                    tok,
                );
                Step::Continue
            }
            TokenKind::PiClose => {
                self.tree.set_end(pi, tok);
                self.current = self.parent_of(pi);
                Step::Continue
            }
            _ => self.recover(format!("unexpected {:?} in processing instruction", tok.kind), tok),
        }
    }

    // ── recovery & close-out ──────────────────────────────────────────────

    fn open(&mut self, kind: NodeKind, start: Token) {
        let id = self.tree.push(kind, start);
        self.tree.attach(self.current, id);
        self.current = id;
    }

    fn parent_of(&self, id: NodeId) -> NodeId {
        self.tree.node(id).parent().unwrap_or(self.tree.root())
    }

    fn report(&mut self, message: impl Into<String>, tok: Token) {
        let message = message.into();
        log::debug!("diagnostic at {}..{}: {message}", tok.start, tok.end());
        self.diagnostics.push(Diagnostic::new(message, tok));
    }

    /// Record the diagnostic, force-close the open node with the previous
    /// good token as its end, and resume one structural level up.
    fn recover(&mut self, message: impl Into<String>, tok: Token) -> Step {
        self.report(message, tok);
        self.tree.set_end(self.current, self.prev);
        self.current = self.parent_of(self.current);
        Step::Recovered
    }

    /// End of input: close every still-open node on the ascent chain with
    /// the last token seen, and blame unterminated constructs.
    fn finish(&mut self) {
        let last = self.tokens.last().copied().unwrap_or(Token::EMPTY);
        let mut cur = Some(self.current);
        while let Some(id) = cur {
            self.tree.set_end(id, last);
            cur = self.tree.node(id).parent();
        }
        // An unterminated comment or attribute value necessarily swallowed
        // the rest of the input, so only the final token can be one. A
        // terminated value is always followed by its close-quote token.
        match last.kind {
            TokenKind::Comment if !comment_is_terminated(last.text(self.src)) => {
                self.report("unterminated comment", last);
            }
            TokenKind::Value | TokenKind::QuoteOpen => {
                self.report("unterminated attribute value", last);
            }
            _ => {}
        }
    }
}

fn comment_is_terminated(text: &str) -> bool {
    text.len() >= 7 && text.ends_with("-->")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> (SyntaxTree, Vec<Diagnostic>) {
        let tokens = Lexer::new(src).tokenize();
        Parser::new(src, &tokens).process()
    }

    fn kinds_of(tree: &SyntaxTree, ids: &[NodeId]) -> Vec<SyntaxKind> {
        ids.iter().map(|&id| tree.node(id).syntax_kind()).collect()
    }

    #[test]
    fn self_closing_element_with_attribute() {
        let (tree, diags) = parse("<Widget Width='50'/>");
        assert!(diags.is_empty(), "{diags:?}");
        let root = tree.root();
        assert_eq!(kinds_of(&tree, tree.children(root)), vec![SyntaxKind::EmptyElement]);
        let element = tree.children(root)[0];
        assert!(tree.is_complete(element));
        let attrs: Vec<NodeId> = tree.attributes_of(element).collect();
        assert_eq!(attrs.len(), 1);
        assert!(tree.is_complete(attrs[0]));
        assert!(tree.is_complete(root));
    }

    #[test]
    fn matched_tags_build_one_element() {
        let (tree, diags) = parse("<Label Text=\"Hi\"></Label>");
        assert!(diags.is_empty());
        let element = tree.children(tree.root())[0];
        assert_eq!(tree.node(element).syntax_kind(), SyntaxKind::Element);
        assert_eq!(
            kinds_of(&tree, tree.children(element)),
            vec![SyntaxKind::StartTag, SyntaxKind::EndTag]
        );
        assert!(tree.is_complete(element));
    }

    #[test]
    fn end_tag_name_is_not_matched_against_start_tag() {
        // The mismatch is structural nonsense but parses clean; the name is
        // recorded for the consumer to judge.
        let (tree, diags) = parse("<Label></Button>");
        assert!(diags.is_empty());
        let element = tree.children(tree.root())[0];
        assert!(tree.is_complete(element));
    }

    #[test]
    fn stray_end_tag_closes_the_innermost_element() {
        let (tree, diags) = parse("<A><B></A>");
        assert!(diags.is_empty());
        let root = tree.root();
        let outer = tree.children(root)[0];
        assert_eq!(tree.node(outer).syntax_kind(), SyntaxKind::Element);
        assert_eq!(
            kinds_of(&tree, tree.children(outer)),
            vec![SyntaxKind::StartTag, SyntaxKind::Element]
        );
        let inner = tree.children(outer)[1];
        // `</A>` closed B; A was closed synthetically at end of input.
        assert!(tree.is_complete(inner));
        assert!(!tree.is_complete(outer));
        assert!(tree.node(outer).is_closed());
    }

    #[test]
    fn nesting_builds_nested_elements() {
        let (tree, diags) = parse("<a><b></b><c/></a>");
        assert!(diags.is_empty());
        let outer = tree.children(tree.root())[0];
        assert_eq!(
            kinds_of(&tree, tree.children(outer)),
            vec![
                SyntaxKind::StartTag,
                SyntaxKind::Element,
                SyntaxKind::EmptyElement,
                SyntaxKind::EndTag
            ]
        );
        assert!(tree.is_complete(outer));
    }

    #[test]
    fn processing_instruction_with_attributes() {
        let (tree, diags) = parse("<?xml version='1.0'?><Root/>");
        assert!(diags.is_empty());
        let root = tree.root();
        assert_eq!(
            kinds_of(&tree, tree.children(root)),
            vec![SyntaxKind::Pi, SyntaxKind::EmptyElement]
        );
        let pi = tree.children(root)[0];
        assert!(tree.is_complete(pi));
        assert_eq!(tree.attributes_of(pi).count(), 1);
    }

    fn all_complete(tree: &SyntaxTree, id: NodeId) -> bool {
        tree.is_complete(id) && tree.children(id).iter().all(|&c| all_complete(tree, c))
    }

    #[test]
    fn well_formed_documents_are_complete_throughout() {
        for src in [
            "<Widget Width='50'/>",
            "<Label Text=\"Hi\"></Label>",
            "<?xml version='1.0'?>\n<Panel Pad='4'>\n  <Label Text='hi'/>\n</Panel>",
            "<a><b></b><c/></a>",
            "",
        ] {
            let (tree, diags) = parse(src);
            assert!(diags.is_empty(), "{src:?}");
            assert!(all_complete(&tree, tree.root()), "{src:?}");
        }
    }

    #[test]
    fn unterminated_comment_reports_exactly_once() {
        let (tree, diags) = parse("<!-- unterminated");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "unterminated comment");
        assert!(tree.node(tree.root()).is_closed());
    }

    #[test]
    fn terminated_comment_is_silent() {
        let (_, diags) = parse("<!-- fine --><a/>");
        assert!(diags.is_empty());
    }

    #[test]
    fn unterminated_value_reports_exactly_once() {
        let (tree, diags) = parse("<a x='50");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "unterminated attribute value");
        assert!(tree.node(tree.root()).is_closed());
    }

    #[test]
    fn bare_open_quote_counts_as_unterminated() {
        let (_, diags) = parse("<a x='");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "unterminated attribute value");
    }

    #[test]
    fn truncation_closes_silently() {
        let (tree, diags) = parse("<A><B>");
        assert!(diags.is_empty());
        let outer = tree.children(tree.root())[0];
        let inner = tree.children(outer)[1];
        assert!(tree.node(outer).is_closed() && tree.node(inner).is_closed());
        assert!(!tree.is_complete(outer) && !tree.is_complete(inner));
    }

    #[test]
    fn every_truncated_prefix_terminates_with_a_closed_root() {
        let src = "<?xml version='1.0'?>\n<Panel Pad='4'>\n  <Label Text='hi'/>\n</Panel>";
        for (end, _) in src.char_indices() {
            let prefix = &src[..end];
            let (tree, diags) = parse(prefix);
            assert!(tree.node(tree.root()).is_closed(), "prefix {prefix:?}");
            assert!(diags.len() <= 2, "prefix {prefix:?}: {diags:?}");
        }
    }

    #[test]
    fn duplicate_assign_is_tolerated() {
        let (tree, diags) = parse("<A X==''/>");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "duplicate '=' in attribute");
        let element = tree.children(tree.root())[0];
        let attrs: Vec<NodeId> = tree.attributes_of(element).collect();
        assert_eq!(attrs.len(), 1);
        assert!(tree.is_complete(attrs[0]));
    }

    #[test]
    fn stray_token_in_start_tag_force_closes_it() {
        let (tree, diags) = parse("<A =/>");
        // The `=` recovers the tag, then the dangling `/>` is flagged at the
        // root, where it changes nothing.
        assert_eq!(diags.len(), 2);
        let root = tree.root();
        assert_eq!(kinds_of(&tree, tree.children(root)), vec![SyntaxKind::StartTag]);
        let tag = tree.children(root)[0];
        assert!(tree.node(tag).is_closed());
        assert!(!tree.is_complete(tag));
    }

    #[test]
    fn content_at_document_level_is_flagged() {
        let (_, diags) = parse("junk");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn orphan_end_tag_changes_nothing_at_the_root() {
        let (tree, diags) = parse("</Orphan>");
        assert_eq!(diags.len(), 3); // `</`, the name, and `>` in turn
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn empty_input_yields_a_zero_span_root() {
        let (tree, diags) = parse("");
        assert!(diags.is_empty());
        let root = tree.root();
        assert!(tree.node(root).is_closed());
        assert!(!tree.node(root).contains(0));
        assert_eq!(tree.node_at(0), None);
    }
}
