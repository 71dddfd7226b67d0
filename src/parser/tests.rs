use rstest::rstest;

use crate::error::TagParseError;

use super::{parse_tag, Attributes, Token, TokenKind, Tokenizer, TokenizerConfig, TokenizerFeature};

const LOREM_IPSUM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. In lorem quam, fermentum id porttitor ac, iaculis eu arcu. Aliquam vulputate tempus felis consequat elementum.";

fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn spans(input: &str) -> Vec<&str> {
    Tokenizer::new(input).map(|tk| tk.span).collect()
}

#[test]
pub fn just_text() {
    let mut tokenizer = Tokenizer::new(LOREM_IPSUM);
    let tok = tokenizer.next().unwrap();
    assert!(tok.is_text());
    assert!(tok.tag().is_none());
    assert_eq!(tok.span, LOREM_IPSUM);
    assert!(tokenizer.next().is_none())
}

const SIMPLE: &str = "[bold]This is a test![/bold] and it's very cool.";

#[test]
pub fn simple_tags() {
    let mut tokenizer = Tokenizer::new(SIMPLE);
    let bold_tag = tokenizer.next().unwrap();
    assert!(bold_tag.is_open("bold"));
    assert!(!bold_tag.is_close("bold"));
    assert!(!bold_tag.is_self_close("bold"));

    assert!(matches!(
        tokenizer.next(),
        Some(Token {
            kind: TokenKind::Text,
            span: "This is a test!",
            ..
        })
    ));

    assert!(tokenizer.next().unwrap().is_close("bold"));
    assert!(tokenizer.next().unwrap().is_text());
    assert!(tokenizer.next().is_none());
}

#[test]
pub fn newline_forms() {
    let tokens: Vec<_> = Tokenizer::new("a\nb\r\nc\rd").collect();
    let newlines: Vec<_> = tokens
        .iter()
        .filter(|tk| tk.is_newline())
        .map(|tk| tk.span)
        .collect();
    assert_eq!(newlines, ["\n", "\r\n", "\r"]);
    assert_eq!(tokens.len(), 7);
}

const NO_TAG_BLEED: &str = "[bar ]foo";

#[test]
pub fn no_tag_bleed() {
    let mut tokenizer = Tokenizer::new(NO_TAG_BLEED);
    let bar = tokenizer.next().unwrap();
    assert_eq!(bar.span, "[bar ]");
    let text = tokenizer.next().unwrap();
    assert_eq!(text.span, "foo");
}

const UNCLOSED_TAG: &str = "[not_a_tag=real ";

#[test]
pub fn unclosed_tag() {
    let mut tokenizer = Tokenizer::new(UNCLOSED_TAG);

    let tok = tokenizer.next().unwrap();
    assert!(tok.is_text());
    assert_eq!(tok.span, UNCLOSED_TAG);
    assert!(tokenizer.next().is_none());
}

#[test]
pub fn failed_tag_stops_at_next_opener() {
    assert_eq!(spans("[b x=\"1\"y] [i]z"), ["[b x=\"1\"y] ", "[i]", "z"]);
    assert_eq!(spans("a [b\nc]"), ["a ", "[b", "\n", "c]"]);
}

#[test]
pub fn multibyte_text_is_kept_whole() {
    assert_eq!(spans("héllo [ü] wörld"), ["héllo ", "[ü] wörld"]);
    assert_eq!(spans("[b]日本[/b]"), ["[b]", "日本", "[/b]"]);
}

const TAG_KINDS: &str = "[open][open args][open=args][/close][br/][img src=x /]";

#[test]
pub fn tag_kinds() {
    let tokens: Vec<_> = Tokenizer::new(TAG_KINDS).collect();
    assert!(tokens[0].is_open("open"));
    assert!(tokens[1].is_open("open"));
    assert_eq!(tokens[1].tag().unwrap().attributes, attrs(&[("args", "")]));
    assert!(tokens[2].is_open("open"));
    assert_eq!(tokens[2].tag().unwrap().attributes, attrs(&[("open", "args")]));
    assert!(tokens[3].is_close("close"));
    assert!(tokens[4].is_self_close("br"));
    assert!(tokens[5].is_self_close("img"));
    assert_eq!(tokens.len(), 6);
}

#[test]
pub fn custom_delimiters() {
    let config = TokenizerConfig {
        open: '<',
        close: '>',
        ..TokenizerConfig::default()
    };
    let tokens: Vec<_> = Tokenizer::with_config("<b>[x]</b>", config).collect();
    assert!(tokens[0].is_open("b"));
    assert_eq!(tokens[1].span, "[x]");
    assert!(tokens[2].is_close("b"));
}

#[rstest]
#[case("[test=value]", "test", attrs(&[("test", "value")]))]
#[case("[TeSt]", "test", attrs(&[]))]
#[case("[ test  key = 'a b' ]", "test", attrs(&[("key", "a b")]))]
#[case("[t k=1 K=2]", "t", attrs(&[("k", "2")]))]
#[case("[t k=\"say \\\"hi\\\"\"]", "t", attrs(&[("k", "say \"hi\"")]))]
#[case("[t k='a\\\\b\\n']", "t", attrs(&[("k", "a\\b\\n")]))]
#[case("[t=\"v\" other]", "t", attrs(&[("t", "v"), ("other", "")]))]
#[case("[*]", "*", attrs(&[]))]
#[case("[t k=]", "t", attrs(&[("k", "")]))]
pub fn tag_grammar_accepts(#[case] input: &str, #[case] name: &str, #[case] expected: Attributes) {
    let decl = parse_tag(input, 0, &TokenizerConfig::default()).unwrap();
    assert_eq!(decl.name, name);
    assert_eq!(decl.attributes, expected);
    assert_eq!(decl.end, input.len());
    assert!(!decl.closing);
}

#[rstest]
#[case("[/test=value]")]
#[case("[/test key=value]")]
#[case("[/test/]")]
#[case("[t k=\"v\"x]")]
#[case("[]")]
#[case("[ = x]")]
#[case("[t !]")]
#[case("[t\nk]")]
#[case("[t k=\"a\nb\"]")]
pub fn tag_grammar_rejects_malformed(#[case] input: &str) {
    let err = parse_tag(input, 0, &TokenizerConfig::default()).unwrap_err();
    assert!(matches!(err, TagParseError::Malformed { .. }), "{input}: {err:?}");
}

#[rstest]
#[case("[")]
#[case("[test")]
#[case("[test k=\"unterminated")]
#[case("[test k=v")]
#[case("[/test ")]
pub fn tag_grammar_runs_out_of_input(#[case] input: &str) {
    assert_eq!(
        parse_tag(input, 0, &TokenizerConfig::default()),
        Err(TagParseError::OutOfInput)
    );
}

#[test]
pub fn closing_tag_flags() {
    let decl = parse_tag("x[ / quote ]", 1, &TokenizerConfig::default()).unwrap();
    assert!(decl.closing);
    assert_eq!(decl.name, "quote");
    assert_eq!(decl.end, 12);
}

#[test]
pub fn optional_syntax_can_be_disabled() {
    let config = TokenizerConfig {
        features: TokenizerFeature::empty(),
        ..TokenizerConfig::default()
    };
    assert!(parse_tag("[br/]", 0, &config).is_err());
    assert!(parse_tag("[url=x]", 0, &config).is_err());
    assert!(parse_tag("[url href=x]", 0, &config).is_ok());

    let decl = parse_tag("[br /]", 0, &TokenizerConfig::default()).unwrap();
    assert!(decl.self_closing);
}
