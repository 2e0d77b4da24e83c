//! Single-pass scanner for IML source text.
//!
//! The scanner accepts any string, including malformed or half-typed markup,
//! and never fails: unrecognized input becomes [`TokenKind::Unknown`] tokens
//! and a missing expected name simply appends no name token. Every byte of
//! the input ends up inside exactly one token, so concatenating the token
//! texts reproduces the source; the tree builder and the position queries
//! both rely on that.

use crate::token::{Token, TokenKind};

// ── Mode ──────────────────────────────────────────────────────────────────

/// Coarse lexical mode. Nesting depth is tracked separately in an explicit
/// counter, because depth is unbounded while lexical decisions only depend
/// on these few states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Top of the document, before any markup.
    Init,
    /// Inside the leading `<?xml ...?>` declaration.
    Prolog,
    /// Inside a `<?target ...?>` processing instruction.
    Pi,
    /// Inside `<!NAME ...>` at document level.
    Dtd,
    /// Inside a `<!NAME ...>` nested within DTD syntax.
    DtdObject,
    /// Document level, between top-level constructs.
    Xml,
    /// Inside `<name ...`.
    StartTag,
    /// Between tags of an open element.
    Content,
    /// Inside `</name ...`.
    EndTag,
}

// ── Lexer ─────────────────────────────────────────────────────────────────

pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    mode: Mode,
    /// Open-element depth. Zero vs. positive decides whether closing a tag
    /// drops back to [`Mode::Xml`] or [`Mode::Content`].
    depth: usize,
    /// The next name read in a tag is the element name, not an attribute.
    name_pending: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0, mode: Mode::Init, depth: 0, name_pending: false }
    }

    /// Scan the whole source into an ordered, gap-free token stream.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(self.src.len() / 8 + 1);
        while self.pos < self.src.len() {
            let before = self.pos;
            self.scan(&mut tokens);
            debug_assert!(self.pos > before, "scanner failed to advance at {before}");
        }
        tokens
    }

    // ── cursor ────────────────────────────────────────────────────────────

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn push_from(&self, out: &mut Vec<Token>, kind: TokenKind, start: usize) {
        out.push(Token::new(kind, start, self.pos - start));
    }

    // ── dispatch ──────────────────────────────────────────────────────────

    fn scan(&mut self, out: &mut Vec<Token>) {
        match self.mode {
            Mode::Init | Mode::Xml | Mode::Content => self.scan_document(out),
            Mode::StartTag => self.scan_start_tag(out),
            Mode::EndTag => self.scan_end_tag(out),
            Mode::Prolog | Mode::Pi => self.scan_pi(out),
            Mode::Dtd | Mode::DtdObject => self.scan_dtd(out),
        }
    }

    /// Mode to return to after a tag closes, decided by depth alone.
    fn after_close(&self) -> Mode {
        if self.depth > 0 { Mode::Content } else { Mode::Xml }
    }

    // ── document level & element content ──────────────────────────────────

    fn scan_document(&mut self, out: &mut Vec<Token>) {
        if self.lex_trivia(out) {
            return;
        }
        if self.peek() == Some('<') {
            self.lex_angle(out);
            return;
        }
        // Free text, verbatim up to the next `<`.
        let start = self.pos;
        match self.rest().find('<') {
            Some(i) => self.pos += i,
            None => self.pos = self.src.len(),
        }
        self.push_from(out, TokenKind::Content, start);
        if self.mode == Mode::Init {
            self.mode = Mode::Xml;
        }
    }

    /// Disambiguate `<` with one-or-two-character lookahead.
    fn lex_angle(&mut self, out: &mut Vec<Token>) {
        let start = self.pos;
        let rest = self.rest();
        if rest.starts_with("<?") {
            self.pos += 2;
            self.push_from(out, TokenKind::PiOpen, start);
            self.mode = if self.mode == Mode::Init { Mode::Prolog } else { Mode::Pi };
            self.lex_name(out, TokenKind::PiTarget);
        } else if rest.starts_with("<!--") {
            // Body runs through the literal closer; if it never appears the
            // comment token is left open to the end of the input.
            match rest[4..].find("-->") {
                Some(i) => self.pos += 4 + i + 3,
                None => self.pos = self.src.len(),
            }
            self.push_from(out, TokenKind::Comment, start);
        } else if rest.starts_with("<!") {
            self.pos += 2;
            self.push_from(out, TokenKind::DtdOpen, start);
            self.lex_name(out, TokenKind::Keyword);
            self.mode = Mode::Dtd;
        } else if rest.starts_with("</") {
            self.pos += 2;
            self.push_from(out, TokenKind::EndTagOpen, start);
            self.mode = Mode::EndTag;
            self.name_pending = true;
        } else {
            self.pos += 1;
            self.push_from(out, TokenKind::TagOpen, start);
            self.mode = Mode::StartTag;
            self.name_pending = true;
        }
    }

    // ── start tag ─────────────────────────────────────────────────────────

    fn scan_start_tag(&mut self, out: &mut Vec<Token>) {
        if self.lex_trivia(out) {
            return;
        }
        let start = self.pos;
        match self.peek() {
            Some('>') => {
                self.pos += 1;
                self.push_from(out, TokenKind::TagClose, start);
                self.depth += 1;
                self.mode = Mode::Content;
            }
            Some('/') if self.rest().starts_with("/>") => {
                self.pos += 2;
                self.push_from(out, TokenKind::EmptyClose, start);
                self.mode = self.after_close();
            }
            Some('=') => {
                self.pos += 1;
                self.push_from(out, TokenKind::Assign, start);
            }
            Some('\'') | Some('"') => self.lex_quoted(out),
            Some(c) if is_name_start(c) => {
                let kind = if self.name_pending {
                    self.name_pending = false;
                    TokenKind::ElementName
                } else {
                    TokenKind::AttributeName
                };
                self.lex_name(out, kind);
            }
            _ => self.lex_unknown(out),
        }
    }

    // ── end tag ───────────────────────────────────────────────────────────

    fn scan_end_tag(&mut self, out: &mut Vec<Token>) {
        if self.lex_trivia(out) {
            return;
        }
        let start = self.pos;
        match self.peek() {
            Some('>') => {
                self.pos += 1;
                self.push_from(out, TokenKind::TagClose, start);
                self.depth = self.depth.saturating_sub(1);
                self.mode = self.after_close();
            }
            Some(c) if is_name_start(c) => {
                self.name_pending = false;
                self.lex_name(out, TokenKind::ElementName);
            }
            _ => self.lex_unknown(out),
        }
    }

    // ── processing instruction ────────────────────────────────────────────

    fn scan_pi(&mut self, out: &mut Vec<Token>) {
        if self.lex_trivia(out) {
            return;
        }
        let start = self.pos;
        match self.peek() {
            Some('?') if self.rest().starts_with("?>") => {
                self.pos += 2;
                self.push_from(out, TokenKind::PiClose, start);
                self.mode = self.after_close();
            }
            Some('=') => {
                self.pos += 1;
                self.push_from(out, TokenKind::Assign, start);
            }
            Some('\'') | Some('"') => self.lex_quoted(out),
            Some(c) if is_name_start(c) => self.lex_name(out, TokenKind::AttributeName),
            _ => self.lex_unknown(out),
        }
    }

    // ── DTD syntax ────────────────────────────────────────────────────────

    fn scan_dtd(&mut self, out: &mut Vec<Token>) {
        if self.lex_trivia(out) {
            return;
        }
        let start = self.pos;
        let rest = self.rest();
        if rest.starts_with("<!--") {
            match rest[4..].find("-->") {
                Some(i) => self.pos += 4 + i + 3,
                None => self.pos = self.src.len(),
            }
            self.push_from(out, TokenKind::Comment, start);
            return;
        }
        if rest.starts_with("<!") {
            self.pos += 2;
            self.push_from(out, TokenKind::DtdOpen, start);
            self.lex_name(out, TokenKind::Keyword);
            self.mode = Mode::DtdObject;
            return;
        }
        match self.peek() {
            Some('>') => {
                self.pos += 1;
                self.push_from(out, TokenKind::TagClose, start);
                self.mode = if self.mode == Mode::DtdObject { Mode::Dtd } else { self.after_close() };
            }
            Some('\'') | Some('"') => self.lex_quoted(out),
            Some(c) if is_name_start(c) => self.lex_name(out, TokenKind::Keyword),
            _ => self.lex_unknown(out),
        }
    }

    // ── shared lexemes ────────────────────────────────────────────────────

    /// One whitespace run or line break, if the cursor sits on one.
    ///
    /// Space runs and tab runs stay distinct kinds so exact columns remain
    /// reconstructible; every line-break form is one token no matter how
    /// many bytes it spans.
    fn lex_trivia(&mut self, out: &mut Vec<Token>) -> bool {
        let start = self.pos;
        match self.peek() {
            Some(' ') => {
                while self.peek() == Some(' ') {
                    self.pos += 1;
                }
                self.push_from(out, TokenKind::Space, start);
                true
            }
            Some('\t') => {
                while self.peek() == Some('\t') {
                    self.pos += 1;
                }
                self.push_from(out, TokenKind::Tab, start);
                true
            }
            Some('\r') => {
                self.pos += 1;
                if self.peek() == Some('\n') {
                    self.pos += 1;
                }
                self.push_from(out, TokenKind::LineBreak, start);
                true
            }
            Some('\n') | Some('\u{0085}') | Some('\u{2028}') => {
                self.bump();
                self.push_from(out, TokenKind::LineBreak, start);
                true
            }
            _ => false,
        }
    }

    /// A name token of the given kind; emits nothing when no name follows,
    /// leaving the gap for the tree builder to see.
    fn lex_name(&mut self, out: &mut Vec<Token>, kind: TokenKind) {
        if !matches!(self.peek(), Some(c) if is_name_start(c)) {
            return;
        }
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_continue(c)) {
            self.bump();
        }
        self.push_from(out, kind, start);
    }

    /// `'...'` or `"..."`. The body up to the matching quote is one value
    /// token; if the quote never reappears the value runs to the end of the
    /// input and no close token follows.
    fn lex_quoted(&mut self, out: &mut Vec<Token>) {
        let start = self.pos;
        let quote = match self.bump() {
            Some(c) => c,
            None => return,
        };
        self.push_from(out, TokenKind::QuoteOpen, start);
        let body = self.pos;
        match self.rest().find(quote) {
            Some(0) => {
                self.bump();
                self.push_from(out, TokenKind::QuoteClose, body);
            }
            Some(i) => {
                self.pos += i;
                self.push_from(out, TokenKind::Value, body);
                let close = self.pos;
                self.bump();
                self.push_from(out, TokenKind::QuoteClose, close);
            }
            None => {
                self.pos = self.src.len();
                if self.pos > body {
                    self.push_from(out, TokenKind::Value, body);
                }
            }
        }
    }

    /// A run of characters nothing else recognizes. Always consumes at least
    /// one character, so the scanner cannot stall.
    fn lex_unknown(&mut self, out: &mut Vec<Token>) {
        let start = self.pos;
        self.bump();
        while matches!(self.peek(), Some(c) if !is_unknown_stop(c)) {
            self.bump();
        }
        self.push_from(out, TokenKind::Unknown, start);
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn is_unknown_stop(c: char) -> bool {
    c.is_whitespace() || is_name_start(c) || matches!(c, '\'' | '"' | '=' | '>' | '/' | '<' | '?')
}
