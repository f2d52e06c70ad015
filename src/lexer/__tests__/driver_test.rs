use crate::lexer::{Lexer, RegexRule, StringLiteralRule};
use crate::{LexerError, TextSpan};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    If,
    Id(String),
    Num(String),
    Op(char),
    Str(String),
}

fn text(s: &[u8]) -> String {
    String::from_utf8_lossy(s).into_owned()
}

/// Keyword above identifier above whitespace, each in its own major band.
fn keyword_lexer() -> Lexer<u8, Token> {
    let mut lexer: Lexer<u8, Token> = Lexer::new("test.src");
    lexer.add_rule(Box::new(
        RegexRule::new("if", "if", |_, _: TextSpan| Some(Token::If)).unwrap(),
    ));
    lexer.dec_priority_major();
    lexer.add_rule(Box::new(
        RegexRule::new("identifier", "[A-Za-z_][A-Za-z0-9_]*", |s: &[u8], _| {
            Some(Token::Id(text(s)))
        })
        .unwrap(),
    ));
    lexer.dec_priority_major();
    lexer.add_rule(Box::new(RegexRule::skip("space", "[ \t\r\n]+").unwrap()));
    lexer
}

fn collect(lexer: &mut Lexer<u8, Token>, input: &[u8]) -> Result<Vec<Token>, LexerError> {
    let mut tokens: Vec<Rc<Token>> = lexer.feed_all(input)?;
    tokens.extend(lexer.feed_end()?);
    Ok(tokens.iter().map(|t| (**t).clone()).collect())
}

#[test]
fn keyword_wins_ties_but_longest_match_wins_overall() {
    let mut lexer = keyword_lexer();
    let tokens = collect(&mut lexer, b"if ifx").unwrap();
    assert_eq!(tokens, vec![Token::If, Token::Id("ifx".into())]);
}

#[test]
fn keyword_prefix_of_identifier() {
    let mut lexer = keyword_lexer();
    let tokens = collect(&mut lexer, b"ifl").unwrap();
    assert_eq!(tokens, vec![Token::Id("ifl".into())]);
}

#[test]
fn skip_rules_consume_without_emitting() {
    let mut lexer = keyword_lexer();
    let tokens = collect(&mut lexer, b"if hello world\tif \r if\n iff").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::If,
            Token::Id("hello".into()),
            Token::Id("world".into()),
            Token::If,
            Token::If,
            Token::Id("iff".into()),
        ]
    );
}

#[test]
fn block_comments_swallow_keywords() {
    let mut lexer: Lexer<u8, Token> = Lexer::new("test.src");
    lexer.add_rule(Box::new(
        RegexRule::skip("comment", "/\\*(!\\*/)\\*/").unwrap(),
    ));
    lexer.dec_priority_major();
    lexer.add_rule(Box::new(
        RegexRule::new("if", "if", |_, _: TextSpan| Some(Token::If)).unwrap(),
    ));
    lexer.dec_priority_major();
    lexer.add_rule(Box::new(
        RegexRule::new("identifier", "[A-Za-z_][A-Za-z0-9_]*", |s: &[u8], _| {
            Some(Token::Id(text(s)))
        })
        .unwrap(),
    ));
    lexer.dec_priority_major();
    lexer.add_rule(Box::new(RegexRule::skip("space", "[ \t\r\n]+").unwrap()));

    let tokens = collect(&mut lexer, b"if /* x */ y").unwrap();
    assert_eq!(tokens, vec![Token::If, Token::Id("y".into())]);

    let tokens = collect(&mut lexer, b"if /*hello world   fi if ll*/ fi if").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::If,
            Token::Id("fi".into()),
            Token::If,
        ]
    );
}

#[test]
fn minor_groups_break_equal_length_ties() {
    // Keyword and identifier in the same band, different minor groups.
    let mut lexer: Lexer<u8, Token> = Lexer::new("test.src");
    lexer.add_rule(Box::new(
        RegexRule::new("if", "if", |_, _: TextSpan| Some(Token::If)).unwrap(),
    ));
    lexer.dec_priority_minor();
    lexer.add_rule(Box::new(
        RegexRule::new("identifier", "[A-Za-z_][A-Za-z0-9_]*", |s: &[u8], _| {
            Some(Token::Id(text(s)))
        })
        .unwrap(),
    ));
    lexer.dec_priority_major();
    lexer.add_rule(Box::new(RegexRule::skip("space", " +").unwrap()));

    let tokens = collect(&mut lexer, b"if ifl if").unwrap();
    assert_eq!(
        tokens,
        vec![Token::If, Token::Id("ifl".into()), Token::If]
    );
}

#[test]
fn guards_gate_rules_on_the_previous_token() {
    // A signed number is only a single token where a sign cannot be a binary
    // operator: at the start of the input or right after '=' or '('.
    let signed_allowed = |last: Option<&Token>| {
        matches!(last, None | Some(Token::Op('=')) | Some(Token::Op('(')))
    };

    let mut lexer: Lexer<u8, Token> = Lexer::new("test.src");
    lexer.add_rule(Box::new(
        RegexRule::new("signed", "-[0-9]+", |s: &[u8], _| Some(Token::Num(text(s))))
            .unwrap()
            .with_guard(signed_allowed),
    ));
    lexer.add_rule(Box::new(
        RegexRule::new("number", "[0-9]+", |s: &[u8], _| Some(Token::Num(text(s)))).unwrap(),
    ));
    lexer.add_rule(Box::new(
        RegexRule::new("identifier", "[a-z]+", |s: &[u8], _| Some(Token::Id(text(s)))).unwrap(),
    ));
    lexer.add_rule(Box::new(
        RegexRule::new("op", "[-=()+]", |s: &[u8], _| Some(Token::Op(s[0] as char))).unwrap(),
    ));
    lexer.dec_priority_major();
    lexer.add_rule(Box::new(RegexRule::skip("space", " +").unwrap()));

    let tokens = collect(&mut lexer, b"x=-5").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Id("x".into()),
            Token::Op('='),
            Token::Num("-5".into()),
        ]
    );

    let tokens = collect(&mut lexer, b"5-3").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Num("5".into()),
            Token::Op('-'),
            Token::Num("3".into()),
        ]
    );
}

#[test]
fn string_literal_rule_decodes_escapes() {
    let mut lexer: Lexer<u8, Token> = Lexer::new("test.src");
    lexer.add_rule(Box::new(StringLiteralRule::new("string", |s: &[u8], _| {
        Some(Token::Str(text(s)))
    })));
    lexer.add_rule(Box::new(
        RegexRule::new("identifier", "[a-z]+", |s: &[u8], _| Some(Token::Id(text(s)))).unwrap(),
    ));
    lexer.dec_priority_major();
    lexer.add_rule(Box::new(RegexRule::skip("space", " +").unwrap()));

    let tokens = collect(&mut lexer, b"say \"a\\tb\\n\" done").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Id("say".into()),
            Token::Str("a\tb\n".into()),
            Token::Id("done".into()),
        ]
    );

    // Unterminated literal.
    let mut lexer: Lexer<u8, Token> = Lexer::new("test.src");
    lexer.add_rule(Box::new(StringLiteralRule::new("string", |s: &[u8], _| {
        Some(Token::Str(text(s)))
    })));
    assert!(matches!(
        collect(&mut lexer, b"\"abc"),
        Err(LexerError::UnexpectedEof { .. })
    ));
}

#[test]
fn unmatchable_input_reports_position() {
    let mut lexer = keyword_lexer();
    match collect(&mut lexer, b"hello\nwor%ld") {
        Err(LexerError::NoMatch { position, pointer, .. }) => {
            assert_eq!(position.line, 2);
            assert_eq!(position.column, 4);
            assert_eq!(pointer, 9);
        }
        other => panic!("expected NoMatch, got {:?}", other),
    }
}

#[test]
fn duplicate_rules_conflict_at_match_time() {
    let mut lexer: Lexer<u8, Token> = Lexer::new("test.src");
    lexer.add_rule(Box::new(
        RegexRule::new("word", "[a-z]+", |s: &[u8], _| Some(Token::Id(text(s)))).unwrap(),
    ));
    lexer.add_rule(Box::new(
        RegexRule::new("word", "[a-z]+", |s: &[u8], _| Some(Token::Id(text(s)))).unwrap(),
    ));
    assert!(matches!(
        collect(&mut lexer, b"abc"),
        Err(LexerError::RuleConflict { first: "word", second: "word", .. })
    ));
}

#[test]
fn reset_clears_session_state() {
    let mut lexer = keyword_lexer();
    let _ = collect(&mut lexer, b"if hello").unwrap();
    lexer.reset();
    assert_eq!(lexer.source().len(), 0);
    let tokens = collect(&mut lexer, b"world").unwrap();
    assert_eq!(tokens, vec![Token::Id("world".into())]);
}
