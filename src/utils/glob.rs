//! 글로브 패턴 매칭 (외부 크레이트 없이 구현)
//!
//! `*` (0개 이상 임의 문자), `?` (임의 1문자), `[abc]` / `[a-z]` / `[!abc]` 문자 클래스 지원.
//! 배치 작업 선택은 대소문자 구분, 실시간 검색은 대소문자 무시.

/// 패턴에 글로브 와일드카드(`*`, `?`, `[`)가 포함되어 있는지 확인
pub fn is_glob_pattern(s: &str) -> bool {
    s.contains('*') || s.contains('?') || s.contains('[')
}

/// 글로브 패턴 매칭 (대소문자 구분, UTF-8 안전)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let tokens = tokenize(pattern);
    let text: Vec<char> = text.chars().collect();
    match_tokens(&tokens, &text)
}

/// 글로브 패턴 매칭 (대소문자 무시)
pub fn glob_match_ignore_case(pattern: &str, text: &str) -> bool {
    glob_match(&pattern.to_lowercase(), &text.to_lowercase())
}

/// 실시간 검색용 매칭
///
/// 와일드카드가 없으면 부분 문자열 검색(`*text*`)으로 취급합니다.
pub fn search_match(query: &str, text: &str) -> bool {
    if is_glob_pattern(query) {
        glob_match_ignore_case(query, text)
    } else {
        text.to_lowercase().contains(&query.to_lowercase())
    }
}

/// 패턴 토큰
enum Token {
    /// `*`
    Star,
    /// `?`
    Any,
    Class(CharClass),
    Literal(char),
}

impl Token {
    /// `*`가 아닌 토큰이 문자 하나와 일치하는지
    fn matches(&self, c: char) -> bool {
        match self {
            Token::Star => true,
            Token::Any => true,
            Token::Class(class) => class.matches(c),
            Token::Literal(l) => *l == c,
        }
    }
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                // 연속된 `*`는 하나로
                if !matches!(tokens.last(), Some(Token::Star)) {
                    tokens.push(Token::Star);
                }
                i += 1;
            }
            '?' => {
                tokens.push(Token::Any);
                i += 1;
            }
            '[' => match parse_class(&chars[i + 1..]) {
                Some((class, consumed)) => {
                    tokens.push(Token::Class(class));
                    i += 1 + consumed;
                }
                // 닫히지 않은 `[`는 일반 문자로 취급
                None => {
                    tokens.push(Token::Literal('['));
                    i += 1;
                }
            },
            c => {
                tokens.push(Token::Literal(c));
                i += 1;
            }
        }
    }
    tokens
}

/// 마지막 `*` 위치만 기억하는 역추적 매칭 (O(패턴 × 텍스트))
fn match_tokens(tokens: &[Token], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    // (마지막 `*` 다음 토큰 위치, 그 `*`가 소비를 시작한 텍스트 위치)
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(Token::Star) => {
                p += 1;
                backtrack = Some((p, t));
            }
            Some(token) if token.matches(text[t]) => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                // `*`가 한 문자 더 소비하도록 되돌림
                Some((star_p, star_t)) => {
                    p = star_p;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    tokens[p..].iter().all(|token| matches!(token, Token::Star))
}

/// 문자 클래스 (`[...]`)
struct CharClass {
    negated: bool,
    items: Vec<ClassItem>,
}

enum ClassItem {
    Single(char),
    Range(char, char),
}

impl CharClass {
    fn matches(&self, c: char) -> bool {
        let hit = self.items.iter().any(|item| match *item {
            ClassItem::Single(s) => s == c,
            ClassItem::Range(lo, hi) => lo <= c && c <= hi,
        });
        hit != self.negated
    }
}

/// `[` 다음부터 클래스를 파싱. 반환값: (클래스, `]`까지 소비한 문자 수)
fn parse_class(rest: &[char]) -> Option<(CharClass, usize)> {
    let mut i = 0;
    let negated = matches!(rest.first(), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut items = Vec::new();
    let mut first = true;
    while i < rest.len() {
        let c = rest[i];
        // 첫 문자의 `]`는 리터럴
        if c == ']' && !first {
            return Some((CharClass { negated, items }, i + 1));
        }
        first = false;

        if i + 2 < rest.len() && rest[i + 1] == '-' && rest[i + 2] != ']' {
            items.push(ClassItem::Range(c, rest[i + 2]));
            i += 3;
        } else {
            items.push(ClassItem::Single(c));
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("*.rs"));
        assert!(is_glob_pattern("test?"));
        assert!(is_glob_pattern("file[0-9]"));
        assert!(!is_glob_pattern("hello"));
        assert!(!is_glob_pattern(""));
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        assert!(glob_match("hello", "hello"));
        assert!(!glob_match("hello", "HELLO"));
        assert!(glob_match_ignore_case("hello", "HELLO"));
    }

    #[test]
    fn test_star_wildcard() {
        assert!(glob_match("*.txt", "a.txt"));
        assert!(!glob_match("*.txt", "c.log"));
        assert!(glob_match("test*", "test"));
        assert!(glob_match("*test*", "my_test_file"));
        assert!(glob_match("*", ""));
        assert!(glob_match("*", ".hidden"));
    }

    #[test]
    fn test_question_wildcard() {
        assert!(glob_match("file?.doc", "file1.doc"));
        assert!(!glob_match("file?.doc", "file10.doc"));
        assert!(!glob_match("test?", "test"));
    }

    #[test]
    fn test_character_classes() {
        assert!(glob_match("file[0-9].txt", "file7.txt"));
        assert!(!glob_match("file[0-9].txt", "fileA.txt"));
        assert!(glob_match("[abc]*", "banana"));
        assert!(!glob_match("[!abc]*", "banana"));
        assert!(glob_match("[!abc]*", "date"));
        assert!(glob_match("[]]x", "]x"));
    }

    #[test]
    fn test_unterminated_class_is_literal() {
        assert!(glob_match("[abc", "[abc"));
        assert!(!glob_match("[abc", "a"));
    }

    #[test]
    fn test_search_match_substring_without_wildcards() {
        assert!(search_match("REP", "annual_report.pdf"));
        assert!(search_match("kb", "notes.txt (1.5 KB)"));
        assert!(!search_match("zip", "notes.txt"));
    }

    #[test]
    fn test_search_match_glob_ignores_case() {
        assert!(search_match("*.PDF", "annual_report.pdf"));
        assert!(!search_match("*.pdf", "annual_report.pdf.bak"));
    }

    #[test]
    fn test_unicode_filenames() {
        assert!(glob_match("*테스트*", "나의_테스트_파일"));
        assert!(glob_match("?.txt", "한.txt"));
    }

    #[test]
    fn test_many_stars_stay_linear() {
        let pattern = format!("{}b", "*a".repeat(8));
        let text = "a".repeat(200);
        let started = std::time::Instant::now();
        assert!(!glob_match(&pattern, &text));
        assert!(glob_match(&pattern, &format!("{}b", text)));
        assert!(started.elapsed() < std::time::Duration::from_millis(500));
    }

    #[test]
    fn test_star_backtracks_across_classes() {
        assert!(glob_match("*[0-9].log", "app-v2.1.log"));
        assert!(glob_match("a*b*c", "aXbYbZc"));
        assert!(!glob_match("a*b*c", "aXbYbZ"));
        assert!(glob_match("**.txt", "a.txt"));
    }
}
