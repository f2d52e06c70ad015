use crate::regex;
use crate::utf8::Utf8Matcher;
use crate::IMatcher;

fn check(pattern: &str, accepts: &[&str], rejects: &[&str]) {
    let mut dfa = regex::compile::<u8>(pattern).unwrap();
    let mut nfa = regex::nfa_matcher::<u8>(pattern).unwrap();
    for text in accepts {
        assert!(
            dfa.test(text.as_bytes()),
            "DFA for {:?} should accept {:?}",
            pattern,
            text
        );
        assert!(
            nfa.test(text.as_bytes()),
            "NFA for {:?} should accept {:?}",
            pattern,
            text
        );
    }
    for text in rejects {
        assert!(
            !dfa.test(text.as_bytes()),
            "DFA for {:?} should reject {:?}",
            pattern,
            text
        );
        assert!(
            !nfa.test(text.as_bytes()),
            "NFA for {:?} should reject {:?}",
            pattern,
            text
        );
    }
}

#[test]
fn basic_patterns() {
    check("aa*", &["aa", "a", "aaa"], &["", "b", "aab"]);
    check("a*", &["", "a", "aa"], &["aabaa", "b"]);
    check("ab", &["ab"], &["ba", "b", "a", ""]);
    check("aa", &["aa"], &["ab", "bb", "aaa", "a", ""]);
    check("a", &["a"], &["aa", ""]);
    check(
        "a|b|c|d|e",
        &["a", "b", "c", "d", "e"],
        &["", "ab", "ba", "de", "ed", "ee", "dd"],
    );
    check("(a)", &["a"], &["", "aa"]);
    check("(a|bd)", &["bd", "a"], &["b", "d", "ab", "ad"]);
    check("(a())", &["a"], &["", "aa"]);
    check("([a-bc])", &["a", "b", "c"], &["", "aa", "bb", "cc", "ab"]);
    check("(a(a(a(a(a)))))", &["aaaaa"], &["a"]);
}

#[test]
fn quantifiers() {
    check("a?", &["a", ""], &["aa"]);
    check("a+", &["aaa", "a", "aa", "aaaaa"], &["", "aabaa"]);
    check("a{,}", &["a", ""], &["ab"]);
    check("a{2,4}", &["aa", "aaa", "aaaa"], &["a", "aaaaa", ""]);
    check("(ab){2}", &["abab"], &["ab", "ababab"]);
}

#[test]
fn epsilon_heavy_patterns() {
    // Chained optional prefixes exercise deep ε-closures.
    check("(|a)b", &["b", "ab"], &["", "a", "bb"]);
    check("(|a)(|b)(|c)", &["", "a", "b", "c", "ab", "ac", "bc", "abc"], &["ba", "cb", "aa"]);
    check("a{0}", &[""], &["a"]);
}

#[test]
fn bracket_classes() {
    check("[^0-9]+", &["abc"], &["a1234", ""]);
    check("[^ab]", &["c", "z", "0"], &["a", "b", "", "cc"]);
    check("[^a-cx-z]", &["d", "w"], &["a", "b", "c", "x", "y", "z"]);
    check("[a-]", &["a", "-"], &["b", ""]);
    check("[\\]\\\\]", &["]", "\\"], &["[", ""]);
}

#[test]
fn complement_groups() {
    check("(!1234)", &["431", "", "123", "234", "12 34"], &["1234", "x1234", "1234x", "x1234y"]);
    check("a(!d)f", &["acf", "af", "abcf"], &["adf", "axdf", "adxf"]);
}

#[test]
fn block_comment_pattern() {
    check(
        "/\\*(!\\*/)\\*/",
        &["/* comment */", "/**/", "/* x ** y */", "/* asdf */"],
        &["", "/* a */ /* b */", "/* asdf */ ", "/* a", "a */"],
    );
}

#[test]
fn dead_and_match_states_stream() {
    let mut matcher = regex::compile::<u8>("ab*c").unwrap();
    matcher.reset();
    assert!(!matcher.is_match() && !matcher.is_dead());
    matcher.feed(b'a');
    assert!(!matcher.is_match() && !matcher.is_dead());
    matcher.feed(b'b');
    matcher.feed(b'c');
    assert!(matcher.is_match());
    matcher.feed(b'c');
    assert!(matcher.is_dead() && !matcher.is_match());
}

#[test]
fn unicode_alphabet_matchers() {
    let mut matcher = Utf8Matcher::new(regex::compile::<u32>("[α-ω]+").unwrap());
    assert!(matcher.test_str("αβγ"));
    assert!(matcher.test_str("ω"));
    assert!(!matcher.test_str("αxγ"));
    assert!(!matcher.test_str(""));

    // A match only counts on a sequence boundary.
    matcher.reset();
    matcher.feed_byte(0xCE); // first byte of 'α'
    assert!(!matcher.is_match());
    matcher.feed_byte(0xB1);
    assert!(matcher.is_match());

    // Malformed input kills the matcher.
    matcher.reset();
    matcher.feed_byte(0xFF);
    assert!(matcher.is_dead());
}

#[test]
fn wildcard_spans_the_alphabet() {
    check(".", &["a", "z", " ", "\n"], &["", "ab"]);
    check(".+", &["a", "xyz", "  "], &[""]);
    check("a.c", &["abc", "a.c", "axc"], &["ac", "abbc"]);
    check("\\.", &["."], &["a"]);
}

#[test]
fn matches_agree_with_the_regex_crate() {
    // Patterns restricted to the dialect both engines share.
    let cases = [
        ("[a-c]*", "abc"),
        ("(ab|cd)+", "abcd"),
        ("x[0-9][0-9]*y", "x019y"),
        ("a(b|c)*d", "abcd"),
    ];
    for (pattern, alphabet) in cases {
        let oracle = ::regex::Regex::new(&format!("^(?:{})$", pattern)).unwrap();
        let mut matcher = regex::compile::<u8>(pattern).unwrap();

        let mut inputs: Vec<String> = vec![String::new()];
        let mut frontier: Vec<String> = vec![String::new()];
        for _ in 0..4 {
            let mut next = Vec::new();
            for prefix in &frontier {
                for c in alphabet.chars() {
                    let mut extended = prefix.clone();
                    extended.push(c);
                    next.push(extended);
                }
            }
            inputs.extend(next.iter().cloned());
            frontier = next;
        }

        for input in &inputs {
            assert_eq!(
                matcher.test(input.as_bytes()),
                oracle.is_match(input),
                "pattern {:?} disagrees with the oracle on {:?}",
                pattern,
                input
            );
        }
    }
}
