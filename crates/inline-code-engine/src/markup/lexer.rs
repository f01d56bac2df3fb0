//! # Lexer - Tokenizing Inline Markup
//!
//! Breaks fixture markup such as `hello <code class="inline-code">world</code>`
//! into open tags, close tags and text runs using the [Logos] lexer
//! generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! Like the rest of this module the lexer is lossless: every byte of the
//! input lands in exactly one token, and a stray `<` that does not start a
//! tag is kept as text rather than dropped.

use logos::Logos;

/// Token kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<tag attr="value">` or self-closing `<tag/>`
    #[regex(r#"<[A-Za-z][A-Za-z0-9-]*(\s+[A-Za-z_:][A-Za-z0-9_:.-]*="[^"]*")*\s*/?>"#)]
    OpenTag,

    /// `</tag>`
    #[regex(r"</[A-Za-z][A-Za-z0-9-]*\s*>")]
    CloseTag,

    /// Anything up to the next `<`
    #[regex(r"[^<]+")]
    Text,
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Lex the input into tokens paired with their byte spans.
pub fn lex(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        // Logos error means a `<` that does not open a tag - treat as text
        let kind = result.unwrap_or(TokenKind::Text);
        tokens.push((Token { kind, text }, span));
    }

    tokens
}
