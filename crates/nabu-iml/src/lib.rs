//! Tokenizer, lossless syntax tree, and position queries for the **Nabu
//! Interface Markup Language** (`.iml`).
//!
//! This crate is the markup front end shared by the engine and by editor
//! tooling, so it stays deliberately light: its only dependency is the
//! `log` facade. It is built for sources that are *being typed*: scanning
//! and parsing are total (no input can make them fail), malformed regions
//! become diagnostics anchored to exact token spans, and the resulting
//! tree always spans the whole document, truncated or not.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`token`] | `Token`, `TokenKind`, `TokenGroup` |
//! | [`lexer`] | `Lexer`, the mode-machine scanner |
//! | [`syntax`] | `SyntaxTree`, `NodeId`, `NodeKind`, `SyntaxKind` |
//! | [`parser`] | `Parser`, the tree-building automaton |
//! | [`diagnostic`] | `Diagnostic` |
//! | [`document`] | `Document`, the facade with the position queries |
//!
//! # Quick start
//!
//! ```rust
//! use nabu_iml::{Document, SyntaxKind};
//!
//! let doc = Document::parse("<Button Label='OK'/>");
//! assert!(doc.is_well_formed());
//!
//! let button = doc.node_at_of(3, SyntaxKind::EmptyElement).unwrap();
//! assert_eq!(doc.node_name(button), Some("Button"));
//! assert_eq!(doc.attribute_value(button, "Label"), Some("OK"));
//! ```

pub mod diagnostic;
pub mod document;
pub mod lexer;
pub mod parser;
pub mod syntax;
pub mod token;

pub use diagnostic::Diagnostic;
pub use document::{parse, Document};
pub use lexer::Lexer;
pub use parser::Parser;
pub use syntax::{NodeData, NodeId, NodeKind, SyntaxKind, SyntaxTree};
pub use token::{Token, TokenGroup, TokenKind};

#[cfg(test)]
mod parse_tests {
    use super::*;

    fn ok(src: &str) {
        let doc = Document::parse(src);
        assert!(doc.is_well_formed(), "{src:?}: {:?}", doc.diagnostics());
    }

    fn bad(src: &str, count: usize) {
        assert_eq!(Document::parse(src).diagnostics().len(), count, "{src:?}");
    }

    #[test] fn empty_element() { ok("<Container></Container>"); }
    #[test] fn self_closing() { ok("<Container/>"); }
    #[test] fn attributes_single_and_double_quoted() {
        ok(r#"<Label Text="Hi" Color='red'/>"#);
    }
    #[test] fn nested_widgets() {
        ok("<Column Gap='10'><Row Gap='8'><Container Bg='black'/></Row></Column>");
    }
    #[test] fn text_content() { ok("<Text>hello world</Text>"); }
    #[test] fn pretty_printed_document() {
        ok("<Stack>\r\n\t<Row Gap='8'>\n\t\t<Text Value='hi'/>\n\t</Row>\n</Stack>\n");
    }
    #[test] fn comments_anywhere() {
        ok("<!-- header --><Root><!-- body --><Leaf/></Root><!-- tail -->");
    }
    #[test] fn xml_prolog() { ok("<?xml version='1.0'?>\n<Root/>"); }
    #[test] fn pi_with_attributes() { ok("<?pragma cache='on'?><Root/>"); }
    #[test] fn several_top_level_elements() { ok("<A/><B/><C></C>"); }
    #[test] fn empty_attribute_value() { ok("<Input Placeholder=''/>"); }
    #[test] fn entities_pass_through_verbatim() { ok("<Text>a &lt; b</Text>"); }
    #[test] fn mismatched_end_tag_name_is_structural_only() { ok("<Label></Button>"); }
    #[test] fn empty_source() { ok(""); }
    #[test] fn whitespace_only_source() { ok(" \t\r\n "); }

    #[test] fn bad_top_level_text() { bad("junk", 1); }
    #[test] fn bad_unterminated_comment() { bad("<!-- oops", 1); }
    #[test] fn bad_unterminated_value() { bad("<Widget Width='50", 1); }
    #[test] fn bad_orphan_end_tag() { bad("</Orphan>", 3); }
    #[test] fn bad_stray_assign() { bad("<A =/>", 2); }
}
