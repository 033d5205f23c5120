use std::fmt::Display;

/// The kind of a lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    // Comments
    SingleComment,
    MultiComment,

    // Single Character tokens
    LeftCurly,
    RightCurly,
    Less,
    Greater,
    Comma,
    Dot,
    LeftParen,
    RightParen,
    LeftSquare,
    RightSquare,
    Hyphen,
    Colon,
    SemiColon,
    At,
    Pipe,
    Exclamation,
    Caret,

    // Compound Tokens
    Assignment,
    Range,
    Ellipsis,
    LeftVersionBrackets,
    RightVersionBrackets,
    XMLEndTag,
    XMLSingleTagEnd,

    // Identifiers
    /// Starts with an upper case letter and contains a lower case letter
    TypeOrModuleRef,
    /// Starts with a lower case letter
    ValueRefOrIdent,
    /// Only upper case letters, digits and hyphens
    ObjectClassRef,
    /// `&` followed by an upper case letter
    TypeField,
    /// `&` followed by a lower case letter
    ValueField,

    // Literals
    Number,
    RealNumber,
    BString,
    HString,
    CString,

    // Keywords
    KwAbsent,
    KwAbstractSyntax,
    KwAll,
    KwApplication,
    KwAutomatic,
    KwBegin,
    KwBit,
    KwBMPString,
    KwBoolean,
    KwBy,
    KwCharacter,
    KwChoice,
    KwClass,
    KwComponent,
    KwComponents,
    KwConstrained,
    KwContaining,
    KwDate,
    KwDateTime,
    KwDefault,
    KwDefinitions,
    KwDescendants,
    KwDuration,
    KwEmbedded,
    KwEncoded,
    KwEncodingControl,
    KwEnd,
    KwEnumerated,
    KwExcept,
    KwExplicit,
    KwExports,
    KwExtensibility,
    KwExternal,
    KwFalse,
    KwFrom,
    KwGeneralizedTime,
    KwGeneralString,
    KwGraphicString,
    KwIA5String,
    KwIdentifier,
    KwImplicit,
    KwImplied,
    KwImports,
    KwIncludes,
    KwInstance,
    KwInstructions,
    KwInteger,
    KwIntersection,
    KwISO646String,
    KwMax,
    KwMin,
    KwMinusInfinity,
    KwNotANumber,
    KwNull,
    KwNumericString,
    KwObject,
    KwObjectDescriptor,
    KwOctet,
    KwOf,
    KwOidIri,
    KwOptional,
    KwPattern,
    KwPdv,
    KwPlusInfinity,
    KwPresent,
    KwPrintableString,
    KwPrivate,
    KwReal,
    KwRelativeOid,
    KwRelativeOidIri,
    KwSequence,
    KwSet,
    KwSettings,
    KwSize,
    KwString,
    KwSuccessors,
    KwSyntax,
    KwT61String,
    KwTags,
    KwTeletexString,
    KwTime,
    KwTimeOfDay,
    KwTrue,
    KwTypeIdentifier,
    KwUnion,
    KwUnique,
    KwUniversal,
    KwUniversalString,
    KwUTCTime,
    KwUTF8String,
    KwVideotexString,
    KwVisibleString,
    KwWith,

    // Errors
    Unrecognised,
    NonTerminatedComment,
    NonTerminatedString,
    InvalidString,

    /// End of the token stream, or of the tokens belonging to one assignment
    Eof,
}

/// Data relating to a single lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token<'a> {
    /// The type of this token
    pub kind: TokenKind,

    /// The string value of the token, will be a valid string for the token kind
    /// so it can be parsed further, e.g. into a number.
    pub value: &'a str,

    /// Byte offset into the file that the token starts at.  The end location
    /// can be derived from this offset + the length of the value string.
    pub offset: usize,
}

impl Token<'_> {
    /// Byte offset one past the last byte of this token
    pub fn end(&self) -> usize {
        self.offset + self.value.len()
    }
}

/// String/Enum mapping for keywords
pub const KEYWORD_DATA: [(&str, TokenKind); 93] = [
    ("ABSENT", TokenKind::KwAbsent),
    ("ABSTRACT-SYNTAX", TokenKind::KwAbstractSyntax),
    ("ALL", TokenKind::KwAll),
    ("APPLICATION", TokenKind::KwApplication),
    ("AUTOMATIC", TokenKind::KwAutomatic),
    ("BEGIN", TokenKind::KwBegin),
    ("BIT", TokenKind::KwBit),
    ("BMPString", TokenKind::KwBMPString),
    ("BOOLEAN", TokenKind::KwBoolean),
    ("BY", TokenKind::KwBy),
    ("CHARACTER", TokenKind::KwCharacter),
    ("CHOICE", TokenKind::KwChoice),
    ("CLASS", TokenKind::KwClass),
    ("COMPONENT", TokenKind::KwComponent),
    ("COMPONENTS", TokenKind::KwComponents),
    ("CONSTRAINED", TokenKind::KwConstrained),
    ("CONTAINING", TokenKind::KwContaining),
    ("DATE", TokenKind::KwDate),
    ("DATE-TIME", TokenKind::KwDateTime),
    ("DEFAULT", TokenKind::KwDefault),
    ("DEFINITIONS", TokenKind::KwDefinitions),
    ("DESCENDANTS", TokenKind::KwDescendants),
    ("DURATION", TokenKind::KwDuration),
    ("EMBEDDED", TokenKind::KwEmbedded),
    ("ENCODED", TokenKind::KwEncoded),
    ("ENCODING-CONTROL", TokenKind::KwEncodingControl),
    ("END", TokenKind::KwEnd),
    ("ENUMERATED", TokenKind::KwEnumerated),
    ("EXCEPT", TokenKind::KwExcept),
    ("EXPLICIT", TokenKind::KwExplicit),
    ("EXPORTS", TokenKind::KwExports),
    ("EXTENSIBILITY", TokenKind::KwExtensibility),
    ("EXTERNAL", TokenKind::KwExternal),
    ("FALSE", TokenKind::KwFalse),
    ("FROM", TokenKind::KwFrom),
    ("GeneralizedTime", TokenKind::KwGeneralizedTime),
    ("GeneralString", TokenKind::KwGeneralString),
    ("GraphicString", TokenKind::KwGraphicString),
    ("IA5String", TokenKind::KwIA5String),
    ("IDENTIFIER", TokenKind::KwIdentifier),
    ("IMPLICIT", TokenKind::KwImplicit),
    ("IMPLIED", TokenKind::KwImplied),
    ("IMPORTS", TokenKind::KwImports),
    ("INCLUDES", TokenKind::KwIncludes),
    ("INSTANCE", TokenKind::KwInstance),
    ("INSTRUCTIONS", TokenKind::KwInstructions),
    ("INTEGER", TokenKind::KwInteger),
    ("INTERSECTION", TokenKind::KwIntersection),
    ("ISO646String", TokenKind::KwISO646String),
    ("MAX", TokenKind::KwMax),
    ("MIN", TokenKind::KwMin),
    ("MINUS-INFINITY", TokenKind::KwMinusInfinity),
    ("NOT-A-NUMBER", TokenKind::KwNotANumber),
    ("NULL", TokenKind::KwNull),
    ("NumericString", TokenKind::KwNumericString),
    ("OBJECT", TokenKind::KwObject),
    ("ObjectDescriptor", TokenKind::KwObjectDescriptor),
    ("OCTET", TokenKind::KwOctet),
    ("OF", TokenKind::KwOf),
    ("OID-IRI", TokenKind::KwOidIri),
    ("OPTIONAL", TokenKind::KwOptional),
    ("PATTERN", TokenKind::KwPattern),
    ("PDV", TokenKind::KwPdv),
    ("PLUS-INFINITY", TokenKind::KwPlusInfinity),
    ("PRESENT", TokenKind::KwPresent),
    ("PrintableString", TokenKind::KwPrintableString),
    ("PRIVATE", TokenKind::KwPrivate),
    ("REAL", TokenKind::KwReal),
    ("RELATIVE-OID", TokenKind::KwRelativeOid),
    ("RELATIVE-OID-IRI", TokenKind::KwRelativeOidIri),
    ("SEQUENCE", TokenKind::KwSequence),
    ("SET", TokenKind::KwSet),
    ("SETTINGS", TokenKind::KwSettings),
    ("SIZE", TokenKind::KwSize),
    ("STRING", TokenKind::KwString),
    ("SUCCESSORS", TokenKind::KwSuccessors),
    ("SYNTAX", TokenKind::KwSyntax),
    ("T61String", TokenKind::KwT61String),
    ("TAGS", TokenKind::KwTags),
    ("TeletexString", TokenKind::KwTeletexString),
    ("TIME", TokenKind::KwTime),
    ("TIME-OF-DAY", TokenKind::KwTimeOfDay),
    ("TRUE", TokenKind::KwTrue),
    ("TYPE-IDENTIFIER", TokenKind::KwTypeIdentifier),
    ("UNION", TokenKind::KwUnion),
    ("UNIQUE", TokenKind::KwUnique),
    ("UNIVERSAL", TokenKind::KwUniversal),
    ("UniversalString", TokenKind::KwUniversalString),
    ("UTCTime", TokenKind::KwUTCTime),
    ("UTF8String", TokenKind::KwUTF8String),
    ("VideotexString", TokenKind::KwVideotexString),
    ("VisibleString", TokenKind::KwVisibleString),
    ("WITH", TokenKind::KwWith),
];

/// Reserved words that may not be used as a literal word inside a `WITH SYNTAX`
/// specification, X.681 (02/2021) 10.6.
const NON_LITERAL_KEYWORDS: &[TokenKind] = &[
    TokenKind::KwBit,
    TokenKind::KwBoolean,
    TokenKind::KwCharacter,
    TokenKind::KwChoice,
    TokenKind::KwDate,
    TokenKind::KwDateTime,
    TokenKind::KwDuration,
    TokenKind::KwEmbedded,
    TokenKind::KwEnd,
    TokenKind::KwEnumerated,
    TokenKind::KwExternal,
    TokenKind::KwFalse,
    TokenKind::KwInstance,
    TokenKind::KwInteger,
    TokenKind::KwIntersection,
    TokenKind::KwMinusInfinity,
    TokenKind::KwNotANumber,
    TokenKind::KwNull,
    TokenKind::KwObject,
    TokenKind::KwOctet,
    TokenKind::KwPlusInfinity,
    TokenKind::KwReal,
    TokenKind::KwRelativeOid,
    TokenKind::KwSequence,
    TokenKind::KwSet,
    TokenKind::KwTime,
    TokenKind::KwTimeOfDay,
    TokenKind::KwTrue,
    TokenKind::KwUnion,
];

impl TokenKind {
    /// Is this token a comment
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::SingleComment | TokenKind::MultiComment)
    }

    /// Is this token produced by the lexer to describe invalid source text
    pub fn is_error(self) -> bool {
        matches!(
            self,
            TokenKind::Unrecognised
                | TokenKind::NonTerminatedComment
                | TokenKind::NonTerminatedString
                | TokenKind::InvalidString
        )
    }

    /// Is this token a reserved word
    pub fn is_keyword(self) -> bool {
        self >= TokenKind::KwAbsent && self <= TokenKind::KwWith
    }

    /// An identifier starting with an upper case letter, so a type, module,
    /// value set, object set or object class reference.
    pub fn is_uppercase_ref(self) -> bool {
        matches!(self, TokenKind::TypeOrModuleRef | TokenKind::ObjectClassRef)
    }

    /// Can this token appear as a literal word in a `WITH SYNTAX` list, or in
    /// an object defined with that syntax.
    pub fn is_syntax_word(self) -> bool {
        self == TokenKind::ObjectClassRef
            || (self.is_keyword() && !NON_LITERAL_KEYWORDS.contains(&self) && self.keyword_is_word())
    }

    /// Keywords with lower case letters (e.g. `UTF8String`) are never words
    fn keyword_is_word(self) -> bool {
        self.keyword()
            .is_some_and(|k| !k.chars().any(|c| c.is_ascii_lowercase()))
    }

    /// Get the source text of a keyword
    pub fn keyword(self) -> Option<&'static str> {
        KEYWORD_DATA
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(name, _)| *name)
    }

    /// Is this the first token of a restricted character string type
    pub fn is_string_type(self) -> bool {
        matches!(
            self,
            TokenKind::KwBMPString
                | TokenKind::KwGeneralString
                | TokenKind::KwGraphicString
                | TokenKind::KwIA5String
                | TokenKind::KwISO646String
                | TokenKind::KwNumericString
                | TokenKind::KwPrintableString
                | TokenKind::KwTeletexString
                | TokenKind::KwT61String
                | TokenKind::KwUniversalString
                | TokenKind::KwUTF8String
                | TokenKind::KwVideotexString
                | TokenKind::KwVisibleString
        )
    }

    /// Can this token begin a builtin type
    pub fn is_builtin_type_start(self) -> bool {
        self.is_string_type()
            || matches!(
                self,
                TokenKind::KwBit
                    | TokenKind::KwBoolean
                    | TokenKind::KwCharacter
                    | TokenKind::KwChoice
                    | TokenKind::KwDate
                    | TokenKind::KwDateTime
                    | TokenKind::KwDuration
                    | TokenKind::KwEmbedded
                    | TokenKind::KwEnumerated
                    | TokenKind::KwExternal
                    | TokenKind::KwGeneralizedTime
                    | TokenKind::KwInstance
                    | TokenKind::KwInteger
                    | TokenKind::KwNull
                    | TokenKind::KwObject
                    | TokenKind::KwObjectDescriptor
                    | TokenKind::KwOctet
                    | TokenKind::KwOidIri
                    | TokenKind::KwReal
                    | TokenKind::KwRelativeOid
                    | TokenKind::KwRelativeOidIri
                    | TokenKind::KwSequence
                    | TokenKind::KwSet
                    | TokenKind::KwTime
                    | TokenKind::KwTimeOfDay
                    | TokenKind::KwUTCTime
                    | TokenKind::LeftSquare
            )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(keyword) = self.keyword() {
            return write!(f, "`{keyword}`");
        }

        let text = match self {
            TokenKind::SingleComment | TokenKind::MultiComment => "comment",
            TokenKind::LeftCurly => "`{`",
            TokenKind::RightCurly => "`}`",
            TokenKind::Less => "`<`",
            TokenKind::Greater => "`>`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
            TokenKind::LeftSquare => "`[`",
            TokenKind::RightSquare => "`]`",
            TokenKind::Hyphen => "`-`",
            TokenKind::Colon => "`:`",
            TokenKind::SemiColon => "`;`",
            TokenKind::At => "`@`",
            TokenKind::Pipe => "`|`",
            TokenKind::Exclamation => "`!`",
            TokenKind::Caret => "`^`",
            TokenKind::Assignment => "`::=`",
            TokenKind::Range => "`..`",
            TokenKind::Ellipsis => "`...`",
            TokenKind::LeftVersionBrackets => "`[[`",
            TokenKind::RightVersionBrackets => "`]]`",
            TokenKind::XMLEndTag => "`</`",
            TokenKind::XMLSingleTagEnd => "`/>`",
            TokenKind::TypeOrModuleRef => "type reference",
            TokenKind::ValueRefOrIdent => "identifier",
            TokenKind::ObjectClassRef => "object class reference",
            TokenKind::TypeField => "type field reference",
            TokenKind::ValueField => "value field reference",
            TokenKind::Number => "number",
            TokenKind::RealNumber => "real number",
            TokenKind::BString => "binary string",
            TokenKind::HString => "hexadecimal string",
            TokenKind::CString => "character string",
            TokenKind::Unrecognised => "unrecognised character",
            TokenKind::NonTerminatedComment => "unterminated comment",
            TokenKind::NonTerminatedString => "unterminated string",
            TokenKind::InvalidString => "invalid string",
            TokenKind::Eof => "end of input",
            _ => "keyword",
        };

        f.write_str(text)
    }
}
