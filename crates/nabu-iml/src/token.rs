//! Tokens: tagged spans of IML source text.
//!
//! A token never carries its own text. It is a `start`/`len` window into the
//! source string it was scanned from, so a full token stream costs one flat
//! allocation and the text of any token can be read back lazily.

// ── TokenGroup ────────────────────────────────────────────────────────────

const GROUP_TRIVIA: u16 = 1 << 8;
const GROUP_NAME: u16 = 1 << 9;
const GROUP_PUNCTUATION: u16 = 1 << 10;
const GROUP_OPERATOR: u16 = 1 << 11;
const GROUP_KEYWORD: u16 = 1 << 12;
const GROUP_ATTRIBUTE_VALUE: u16 = 1 << 13;
const GROUP_CONTENT: u16 = 1 << 14;
const GROUP_UNKNOWN: u16 = 1 << 15;

/// Coarse token category, one bit per group.
///
/// Every [`TokenKind`] carries exactly one group bit in the high byte of its
/// discriminant, so "is this trivia?"-style checks are a single mask test and
/// never need to enumerate concrete kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TokenGroup {
    /// Whitespace, line breaks, and comments: no syntactic weight.
    Trivia = GROUP_TRIVIA,
    /// Element, attribute, and processing-instruction target names.
    Name = GROUP_NAME,
    /// Structural delimiters: `<`, `>`, `/>`, `</`, `<?`, `?>`, `<!`.
    Punctuation = GROUP_PUNCTUATION,
    /// The `=` between an attribute name and its value.
    Operator = GROUP_OPERATOR,
    /// DTD object names (`DOCTYPE`, `ELEMENT`, ...).
    Keyword = GROUP_KEYWORD,
    /// Attribute value bodies and their quote delimiters.
    AttributeValue = GROUP_ATTRIBUTE_VALUE,
    /// Free text between tags.
    Content = GROUP_CONTENT,
    /// Anything the scanner could not classify.
    Unknown = GROUP_UNKNOWN,
}

// ── TokenKind ─────────────────────────────────────────────────────────────

/// Concrete token kind. The high byte of the discriminant is the group bit,
/// the low byte an ordinal within the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TokenKind {
    // Trivia
    /// A run of one or more spaces.
    Space = GROUP_TRIVIA,
    /// A run of one or more tabs.
    Tab = GROUP_TRIVIA | 1,
    /// One line break: CR, LF, CRLF, NEL, or LS, always a single token.
    LineBreak = GROUP_TRIVIA | 2,
    /// `<!-- ... -->`, including both delimiters; unterminated comments run
    /// to the end of the source.
    Comment = GROUP_TRIVIA | 3,

    // Names
    ElementName = GROUP_NAME,
    AttributeName = GROUP_NAME | 1,
    /// The target name right after `<?`.
    PiTarget = GROUP_NAME | 2,

    // Punctuation
    /// `<`
    TagOpen = GROUP_PUNCTUATION,
    /// `>`
    TagClose = GROUP_PUNCTUATION | 1,
    /// `/>`
    EmptyClose = GROUP_PUNCTUATION | 2,
    /// `</`
    EndTagOpen = GROUP_PUNCTUATION | 3,
    /// `<?`
    PiOpen = GROUP_PUNCTUATION | 4,
    /// `?>`
    PiClose = GROUP_PUNCTUATION | 5,
    /// `<!`
    DtdOpen = GROUP_PUNCTUATION | 6,

    // Operator
    /// `=`
    Assign = GROUP_OPERATOR,

    // Keywords
    /// A bare name inside DTD syntax.
    Keyword = GROUP_KEYWORD,

    // Attribute values
    /// The opening `'` or `"` of an attribute value.
    QuoteOpen = GROUP_ATTRIBUTE_VALUE,
    /// The value body between the quotes.
    Value = GROUP_ATTRIBUTE_VALUE | 1,
    /// The closing quote, matching whichever character opened the value.
    QuoteClose = GROUP_ATTRIBUTE_VALUE | 2,

    // Content
    /// Free text between tags, read verbatim up to the next `<`.
    Content = GROUP_CONTENT,

    // Unrecognized
    Unknown = GROUP_UNKNOWN,
}

impl TokenKind {
    /// The group this kind belongs to.
    pub fn group(self) -> TokenGroup {
        use TokenKind::*;
        match self {
            Space | Tab | LineBreak | Comment => TokenGroup::Trivia,
            ElementName | AttributeName | PiTarget => TokenGroup::Name,
            TagOpen | TagClose | EmptyClose | EndTagOpen | PiOpen | PiClose | DtdOpen => {
                TokenGroup::Punctuation
            }
            Assign => TokenGroup::Operator,
            Keyword => TokenGroup::Keyword,
            QuoteOpen | Value | QuoteClose => TokenGroup::AttributeValue,
            Content => TokenGroup::Content,
            Unknown => TokenGroup::Unknown,
        }
    }

    /// Group membership as a mask test on the discriminant.
    pub fn in_group(self, group: TokenGroup) -> bool {
        self as u16 & group as u16 != 0
    }

    pub fn is_trivia(self) -> bool {
        self.in_group(TokenGroup::Trivia)
    }

    pub fn is_name(self) -> bool {
        self.in_group(TokenGroup::Name)
    }

    pub fn is_punctuation(self) -> bool {
        self.in_group(TokenGroup::Punctuation)
    }
}

// ── Token ─────────────────────────────────────────────────────────────────

/// An immutable span-plus-kind value. Byte offsets into the source string.
///
/// The scanner guarantees that the tokens of a source string are strictly
/// increasing in `start`, never overlap, and jointly cover every byte of the
/// input, trivia included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub len: usize,
}

impl Token {
    /// The zero-span stand-in used where no real token exists (empty input).
    pub const EMPTY: Token = Token { kind: TokenKind::Unknown, start: 0, len: 0 };

    pub fn new(kind: TokenKind, start: usize, len: usize) -> Self {
        Self { kind, start, len }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end()
    }

    /// The token's text, read back out of the source it was scanned from.
    pub fn text<'s>(&self, src: &'s str) -> &'s str {
        &src[self.start..self.end()]
    }
}
