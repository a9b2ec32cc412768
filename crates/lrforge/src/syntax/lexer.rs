//! Lexer implementation.

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Token<'input> {
    At,
    Colon,
    VertBar,
    Bang,
    Question,
    Star,
    Plus,
    LParen,
    RParen,
    HashLBracket,
    RBracket,
    Epsilon,
    Newline,
    Ident(&'input str),
    Literal(&'input str),
}

lexgen::lexer! {
    pub Lexer -> Token<'input>;

    let whitespace = [' ' '\t'];
    let newline = '\r'* '\n' | '\r';
    let ident = ($$XID_Start | '_') $$XID_Continue*;
    let escape = '\\' ['\\' '\'' '"'];

    rule Init {
        $whitespace+,
        $newline = Token::Newline,
        "//" => |lexer| {
            lexer.switch(LexerRule::LineComment)
        },
        "'" => |lexer| {
            lexer.switch(LexerRule::Literal)
        },
        '"' => |lexer| {
            lexer.switch(LexerRule::DoubleQuotedLiteral)
        },
        "@" = Token::At,
        ":" = Token::Colon,
        "|" = Token::VertBar,
        "!" = Token::Bang,
        "?" = Token::Question,
        "*" = Token::Star,
        "+" = Token::Plus,
        "(" = Token::LParen,
        ")" = Token::RParen,
        "#[" = Token::HashLBracket,
        "]" = Token::RBracket,
        $ident => |lexer| {
            let token = match lexer.match_() {
                "ε" => Token::Epsilon,
                ident => Token::Ident(ident),
            };
            lexer.return_(token)
        },
    }

    rule LineComment {
        $newline => |lexer| {
            lexer.switch_and_return(LexerRule::Init, Token::Newline)
        },
        _,
    }

    // The returned text keeps its escape sequences; see `syntax::unescape`.
    rule Literal {
        $escape => |lexer| lexer.continue_(),
        "'" => |lexer| {
            let text = lexer.match_();
            let text = &text[1..text.len() - 1];
            lexer.switch_and_return(LexerRule::Init, Token::Literal(text))
        },
        _ => |lexer| lexer.continue_(),
    }

    rule DoubleQuotedLiteral {
        $escape => |lexer| lexer.continue_(),
        '"' => |lexer| {
            let text = lexer.match_();
            let text = &text[1..text.len() - 1];
            lexer.switch_and_return(LexerRule::Init, Token::Literal(text))
        },
        _ => |lexer| lexer.continue_(),
    }
}
