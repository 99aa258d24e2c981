// small hand lexer for the grammar file format:
//
// <grammar> ::= (<lhs> ("->" | ":=") <alt> ("|" <alt>)* ";")*
// <alt>     ::= (<identifier> | <string>)*
//
// comments: '#' / '//' to end of line, '/* ... */' block
// strings do not span lines, and '\' escapes the next character

use std::{iter::Peekable, str::Chars};

use crate::token::{LexError, Location, ReservedWord, Token, TokenKind, TokenStream};

pub struct GrammarLexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
    column: u32,
    lookahead: Option<Token>,
}

impl<'a> GrammarLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            lookahead: None,
        }
    }

    fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn second(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next()
    }

    // eats whitespace and comments; a block comment running off the end is an error
    fn skip_trivia(&mut self) -> Result<(), (LexError, Location)> {
        loop {
            match self.chars.peek().copied() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => self.skip_line(),
                Some('/') if self.second() == Some('/') => self.skip_line(),
                Some('/') if self.second() == Some('*') => {
                    let start = self.location();
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.chars.peek() == Some(&'/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err((LexError::UnterminatedComment, start));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.chars.peek().copied() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let mut name = String::new();
        while let Some(c) = self.chars.peek().copied() {
            if c.is_ascii_alphanumeric() || c == '_' || (c == '\'' && !name.is_empty()) {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        TokenKind::Identifier(name)
    }

    fn lex_string(&mut self, quote: char) -> TokenKind {
        self.bump();
        let mut text = String::new();
        loop {
            match self.chars.peek().copied() {
                None | Some('\n') => return TokenKind::Error(LexError::UnterminatedString),
                Some('\\') => {
                    self.bump();
                    match self.chars.peek().copied() {
                        None | Some('\n') => {
                            return TokenKind::Error(LexError::UnterminatedString);
                        }
                        Some(escaped) => {
                            text.push(escaped);
                            self.bump();
                        }
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }

        if quote == '\'' {
            TokenKind::SingleQuoted(text)
        } else {
            TokenKind::DoubleQuoted(text)
        }
    }

    fn lex_token(&mut self) -> Token {
        if let Err((e, location)) = self.skip_trivia() {
            return Token::new(TokenKind::Error(e), location);
        }

        let location = self.location();
        let c = match self.chars.peek().copied() {
            Some(c) => c,
            None => return Token::new(TokenKind::EndOfFile, location),
        };

        let kind = match c {
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_identifier(),
            '\'' | '"' => self.lex_string(c),
            '-' if self.second() == Some('>') => {
                self.bump();
                self.bump();
                TokenKind::Reserved(ReservedWord::Arrow)
            }
            ':' if self.second() == Some('=') => {
                self.bump();
                self.bump();
                TokenKind::Reserved(ReservedWord::Assign)
            }
            c if c.is_ascii_punctuation() => {
                self.bump();
                TokenKind::Delimiter(c)
            }
            c => {
                self.bump();
                TokenKind::Error(LexError::UnexpectedCharacter(c))
            }
        };

        Token::new(kind, location)
    }
}

impl<'a> TokenStream for GrammarLexer<'a> {
    fn advance(&mut self) -> Token {
        match self.lookahead.take() {
            Some(tok) => tok,
            None => self.lex_token(),
        }
    }

    fn peek(&mut self) -> &Token {
        let tok = match self.lookahead.take() {
            Some(tok) => tok,
            None => self.lex_token(),
        };
        self.lookahead.insert(tok)
    }
}

impl<'a> Iterator for GrammarLexer<'a> {
    type Item = Token;

    // stops after the first EndOfFile, unlike `advance`
    fn next(&mut self) -> Option<Token> {
        if self.peek().is_eof() {
            return None;
        }
        Some(self.advance())
    }
}

#[cfg(test)]
mod tests {
    use super::GrammarLexer;
    use crate::token::{LexError, Location, ReservedWord, TokenKind, TokenStream};

    fn kinds(source: &str) -> Vec<TokenKind> {
        GrammarLexer::new(source).map(|t| t.kind).collect()
    }

    #[test]
    fn identifiers_and_reserved_words() {
        let toks = kinds("E -> E '+' T | T ;");
        assert_eq!(
            toks,
            vec![
                TokenKind::Identifier("E".into()),
                TokenKind::Reserved(ReservedWord::Arrow),
                TokenKind::Identifier("E".into()),
                TokenKind::SingleQuoted("+".into()),
                TokenKind::Identifier("T".into()),
                TokenKind::Delimiter('|'),
                TokenKind::Identifier("T".into()),
                TokenKind::Delimiter(';'),
            ]
        );
    }

    #[test]
    fn assign_and_double_quotes() {
        let toks = kinds(r#"list := "a\"b" item_2 ;"#);
        assert_eq!(toks[1], TokenKind::Reserved(ReservedWord::Assign));
        assert_eq!(toks[2], TokenKind::DoubleQuoted("a\"b".into()));
        assert_eq!(toks[3], TokenKind::Identifier("item_2".into()));
    }

    #[test]
    fn comments_are_stripped() {
        let source = "# hash comment\nA // slash comment\n/* block\n comment */ -> 'x';";
        let toks = kinds(source);
        assert_eq!(toks.len(), 4);
        assert_eq!(toks[0], TokenKind::Identifier("A".into()));
    }

    #[test]
    fn locations_track_lines() {
        let mut lexer = GrammarLexer::new("A ->\n  'b' ;");
        lexer.advance();
        lexer.advance();
        let b = lexer.advance();
        assert_eq!(b.location, Location::new(2, 3));
    }

    #[test]
    fn errors() {
        assert_eq!(
            kinds("A -> 'oops\n;")[2],
            TokenKind::Error(LexError::UnterminatedString)
        );
        assert_eq!(
            kinds("/* never closed")[0],
            TokenKind::Error(LexError::UnterminatedComment)
        );
        assert_eq!(
            kinds("A -> \u{00e9} ;")[2],
            TokenKind::Error(LexError::UnexpectedCharacter('\u{00e9}'))
        );
    }

    #[test]
    fn end_of_file_repeats() {
        let mut lexer = GrammarLexer::new("  ");
        assert!(lexer.advance().is_eof());
        assert!(lexer.advance().is_eof());
        assert!(lexer.peek().is_eof());
    }
}
