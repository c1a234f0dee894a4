//! Logos lexer for HTML fragments.
//!
//! Tags are lexed as whole tokens (the attribute scanner in the parser picks
//! them apart) so the lexer stays context free. Anything the grammar cannot
//! place, including a stray `<`, is surfaced as text rather than an error.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token<'src> {
    /// `<!-- ... -->`, dropped by the parser.
    #[regex(r"<!--([^-]|-[^-]|--[^>])*-->")]
    Comment,

    /// `<!doctype ...>` and other markup declarations, dropped.
    #[regex(r"<![^>]*>")]
    Doctype,

    /// A full closing tag, e.g. `</p>`.
    #[regex(r"</[a-zA-Z][^>]*>", |lex| lex.slice())]
    CloseTag(&'src str),

    /// A full opening (or self-closing) tag with its attributes. Quoted
    /// attribute values may contain `>` so the quotes are part of the
    /// pattern.
    #[regex(r#"<[a-zA-Z]([^>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    OpenTag(&'src str),

    /// A run of character data up to the next `<`.
    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    /// A `<` that does not begin a well-formed tag.
    #[token("<")]
    Stray,
}

/// Lex `input` into tokens. Slices the lexer cannot classify are folded back
/// in as text, so every byte of the input is accounted for.
pub(crate) fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut lexer = Token::lexer(input);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(()) => tokens.push(Token::Text(lexer.slice())),
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_simple_fragment() {
        let tokens = tokenize("<p>hi</p>");
        assert_eq!(
            tokens,
            vec![
                Token::OpenTag("<p>"),
                Token::Text("hi"),
                Token::CloseTag("</p>"),
            ]
        );
    }

    #[test]
    fn test_tokenize_attribute_value_with_gt() {
        let tokens = tokenize(r#"<a title="a > b">x</a>"#);
        assert_eq!(tokens[0], Token::OpenTag(r#"<a title="a > b">"#));
    }

    #[test]
    fn test_tokenize_stray_angle_bracket() {
        let tokens = tokenize("1 < 2");
        assert_eq!(
            tokens,
            vec![Token::Text("1 "), Token::Stray, Token::Text(" 2")]
        );
    }

    #[test]
    fn test_tokenize_comment_containing_gt() {
        let tokens = tokenize("<!-- a > b -->x");
        assert_eq!(tokens, vec![Token::Comment, Token::Text("x")]);
    }
}
