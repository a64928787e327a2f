use super::token::{mark_unary, Lexicon, Operator, Token, Word};
use super::{Error, LineNumber, Options};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Lex one statement of `line` starting at byte `offset`.
/// Returns the tokens and the offset just past the statement.
/// An empty token list means the line is exhausted.
pub fn lex(
    line: &str,
    offset: usize,
    lexicon: &Lexicon,
    options: &Options,
) -> Result<(Vec<Token>, usize)> {
    if offset > line.len() || !line.is_char_boundary(offset) {
        return Err(error!(Internal; "PROGRAM COUNTER OUT OF LINE"));
    }
    let mut lexer = BasicLexer {
        src: line,
        pos: offset,
        lexicon,
        packed: options.packed_keywords,
        dot_as_zero: options.dot_as_zero,
    };
    let tokens = lexer.statement()?;
    Ok((tokens, lexer.pos))
}

/// Lex every statement of a line, discarding the result.
pub fn check_line(line: &str, lexicon: &Lexicon, options: &Options) -> Result<()> {
    let mut offset = 0;
    loop {
        let (tokens, next) = lex(line, offset, lexicon, options)?;
        if tokens.is_empty() {
            return Ok(());
        }
        offset = next;
    }
}

/// Upper-cases a line of program text, leaving quoted strings alone.
pub fn uppercase_program(line: &str) -> String {
    let mut quote: Option<char> = None;
    line.chars()
        .map(|ch| match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                ch
            }
            None => {
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                }
                ch.to_ascii_uppercase()
            }
        })
        .collect()
}

/// A leading decimal line number and the bytes it spans.
pub fn line_number_prefix(s: &str) -> Option<(LineNumber, usize)> {
    let start = s.len() - s.trim_start_matches(is_basic_whitespace).len();
    let digits = s[start..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let end = start + digits;
    if let Some((_, len)) = scan_real(&s[start..]) {
        if len > digits {
            return None;
        }
    }
    s[start..end].parse::<LineNumber>().ok().map(|n| (n, end))
}

/// Scans an integer at the start of `s`: decimal with optional sign,
/// or `$` and hex digits. Text that reads further as a real is rejected.
pub fn scan_integer(s: &str) -> Option<(i64, usize)> {
    if let Some(hex) = s.strip_prefix('$') {
        let digits = hex.bytes().take_while(u8::is_ascii_hexdigit).count();
        if digits == 0 {
            return None;
        }
        return u64::from_str_radix(&hex[..digits], 16)
            .ok()
            .map(|n| (n as i64, digits + 1));
    }
    let bytes = s.as_bytes();
    let sign = match bytes.first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    };
    let digits = bytes[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let len = sign + digits;
    if let Some((_, real_len)) = scan_real(s) {
        if real_len > len {
            return None;
        }
    }
    s[..len].parse::<i64>().ok().map(|n| (n, len))
}

/// Scans a real at the start of `s`: optional sign, digits with an
/// optional fraction, and an optional exponent.
pub fn scan_real(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let mut len = match bytes.first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    };
    let whole = bytes[len..].iter().take_while(|b| b.is_ascii_digit()).count();
    len += whole;
    let mut fraction = 0;
    if bytes.get(len) == Some(&b'.') {
        fraction = bytes[len + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if whole + fraction > 0 {
            len += 1 + fraction;
        }
    }
    if whole + fraction == 0 {
        return None;
    }
    if let Some(b'E') | Some(b'e') = bytes.get(len) {
        let mut exp = len + 1;
        if let Some(b'+') | Some(b'-') = bytes.get(exp) {
            exp += 1;
        }
        let digits = bytes[exp.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits > 0 {
            len = exp + digits;
        }
    }
    s[..len].parse::<f64>().ok().map(|n| (n, len))
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r' || c == '\n'
}

fn word_len(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_alphanumeric).count()
}

struct BasicLexer<'a> {
    src: &'a str,
    pos: usize,
    lexicon: &'a Lexicon,
    packed: bool,
    dot_as_zero: bool,
}

impl<'a> BasicLexer<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start_matches(is_basic_whitespace).len();
    }

    fn statement(&mut self) -> Result<Vec<Token>> {
        let mut tokens: Vec<Token> = vec![];
        loop {
            self.skip_whitespace();
            let ch = match self.rest().chars().next() {
                Some(ch) => ch,
                None => break,
            };
            if ch == ':' {
                self.pos += 1;
                break;
            }
            if let Some(word) = self.keyword() {
                tokens.push(Token::Word(word));
                match word {
                    Word::Rem => {
                        tokens.push(Token::String(self.rest().into()));
                        self.pos = self.src.len();
                        break;
                    }
                    Word::Data => self.packed = false,
                    _ => {}
                }
                continue;
            }
            if let Some(name) = self.command() {
                tokens.push(Token::Command(name));
                continue;
            }
            if ch == '"' || ch == '\'' {
                tokens.push(self.string(ch)?);
                continue;
            }
            if let Some(op) = self.operator() {
                tokens.push(Token::Operator(op));
                continue;
            }
            if let Some(token) = self.number() {
                tokens.push(token);
                continue;
            }
            match ch {
                '(' => {
                    self.pos += 1;
                    tokens.push(Token::LParen);
                }
                ')' => {
                    self.pos += 1;
                    tokens.push(Token::RParen);
                }
                ',' => {
                    self.pos += 1;
                    tokens.push(Token::Comma);
                }
                '#' => tokens.push(self.file_handle()?),
                c if c.is_ascii_alphabetic() => {
                    let name = self.identifier();
                    let rest = self.rest();
                    if rest.starts_with('.')
                        && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
                    {
                        self.pos += 1;
                        let member = self.identifier();
                        tokens.push(Token::Module(name));
                        tokens.push(Token::Ident(member));
                    } else {
                        tokens.push(Token::Ident(name));
                    }
                }
                _ => return Err(error!(Syntax; "UNEXPECTED CHARACTER")),
            }
        }
        mark_unary(&mut tokens);
        Ok(tokens)
    }

    fn keyword(&mut self) -> Option<Word> {
        let rest = self.rest();
        if rest.starts_with('?') {
            self.pos += 1;
            return Some(Word::Print);
        }
        if self.packed {
            let (word, len) = self.lexicon.keyword_prefix(rest)?;
            self.pos += len;
            return Some(word);
        }
        let len = word_len(rest);
        let word = Word::from_str(&rest[..len])?;
        self.pos += len;
        Some(word)
    }

    fn command(&mut self) -> Option<Rc<str>> {
        let rest = self.rest();
        if self.packed {
            let name = self.lexicon.command_prefix(rest)?;
            self.pos += name.len();
            return Some(name);
        }
        let len = word_len(rest);
        if len == 0 || !self.lexicon.is_command(&rest[..len]) {
            return None;
        }
        self.pos += len;
        Some(rest[..len].into())
    }

    fn string(&mut self, delimiter: char) -> Result<Token> {
        let body = &self.rest()[1..];
        match body.find(delimiter) {
            Some(end) => {
                self.pos += end + 2;
                Ok(Token::String(body[..end].into()))
            }
            None => Err(error!(Syntax; "UNTERMINATED STRING")),
        }
    }

    fn operator(&mut self) -> Option<Operator> {
        let rest = self.rest();
        if let Some((op, len)) = self.lexicon.operator_prefix(rest) {
            if self.packed || word_len(rest) == len {
                self.pos += len;
                return Some(op);
            }
        }
        if rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        for len in [2, 1] {
            if let Some(op) = rest.get(..len).and_then(Operator::from_str) {
                self.pos += len;
                return Some(op);
            }
        }
        None
    }

    fn number(&mut self) -> Option<Token> {
        let rest = self.rest();
        if let Some((_, len)) = scan_integer(rest) {
            self.pos += len;
            return Some(Token::Integer(rest[..len].into()));
        }
        if let Some((_, len)) = scan_real(rest) {
            self.pos += len;
            return Some(Token::Number(rest[..len].into()));
        }
        if self.dot_as_zero && rest.starts_with('.') {
            self.pos += 1;
            return Some(Token::Number(".".into()));
        }
        None
    }

    fn file_handle(&mut self) -> Result<Token> {
        let digits = &self.rest()[1..];
        let len = digits.bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 {
            return Err(error!(Syntax; "EXPECTED FILE NUMBER"));
        }
        self.pos += len + 1;
        Ok(Token::FileHandle(digits[..len].into()))
    }

    fn identifier(&mut self) -> Rc<str> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut len = 1;
        while len < bytes.len() && bytes[len].is_ascii_alphanumeric() {
            if self.packed && self.starts_reserved(&rest[len..]) {
                break;
            }
            len += 1;
        }
        if let Some(b'$') | Some(b'%') = bytes.get(len) {
            len += 1;
        }
        self.pos += len;
        rest[..len].into()
    }

    fn starts_reserved(&self, s: &str) -> bool {
        self.lexicon.keyword_prefix(s).is_some()
            || self.lexicon.command_prefix(s).is_some()
            || self.lexicon.operator_prefix(s).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(s: &str) -> Vec<Token> {
        let mut lexicon = Lexicon::default();
        lexicon.add_command("SAVE");
        let (tokens, _) = lex(s, 0, &lexicon, &Options::default()).unwrap();
        tokens
    }

    #[test]
    fn test_float_is_not_integer() {
        assert_eq!(lex_all("1.23"), vec![Token::Number("1.23".into())]);
        assert_eq!(lex_all("123"), vec![Token::Integer("123".into())]);
        assert_eq!(lex_all("1E3"), vec![Token::Number("1E3".into())]);
        assert_eq!(lex_all("$FF"), vec![Token::Integer("$FF".into())]);
    }

    #[test]
    fn test_scan_integer() {
        assert_eq!(scan_integer("-42"), Some((-42, 3)));
        assert_eq!(scan_integer("$10"), Some((16, 3)));
        assert_eq!(scan_integer("4.5"), None);
        assert_eq!(scan_integer("99999999999999999999"), None);
        assert_eq!(scan_real("99999999999999999999").map(|(_, l)| l), Some(20));
    }

    #[test]
    fn test_statement_offsets() {
        let line = "A=1:PRINT A";
        let lexicon = Lexicon::default();
        let options = Options::default();
        let (first, next) = lex(line, 0, &lexicon, &options).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(next, 4);
        let (second, next) = lex(line, next, &lexicon, &options).unwrap();
        assert_eq!(second[0], Token::Word(Word::Print));
        let (third, _) = lex(line, next, &lexicon, &options).unwrap();
        assert!(third.is_empty());
    }

    #[test]
    fn test_rem_swallows_colons() {
        let tokens = lex_all("REM A:B");
        assert_eq!(tokens, vec![Token::Word(Word::Rem), Token::String(" A:B".into())]);
    }

    #[test]
    fn test_module_qualifier() {
        assert_eq!(
            lex_all("M.X$=1"),
            vec![
                Token::Module("M".into()),
                Token::Ident("X$".into()),
                Token::Operator(Operator::Equal),
                Token::Integer("1".into()),
            ]
        );
    }

    #[test]
    fn test_unary_after_operator() {
        assert_eq!(
            lex_all("A=-2"),
            vec![
                Token::Ident("A".into()),
                Token::Operator(Operator::Equal),
                Token::Unary(Operator::Minus),
                Token::Integer("2".into()),
            ]
        );
        assert_eq!(lex_all("NOT A")[0], Token::Unary(Operator::Not));
    }

    #[test]
    fn test_keywords_need_word_end() {
        assert_eq!(lex_all("TOTAL"), vec![Token::Ident("TOTAL".into())]);
        assert_eq!(lex_all("ORDER"), vec![Token::Ident("ORDER".into())]);
        assert_eq!(lex_all("SAVE")[0], Token::Command("SAVE".into()));
        assert_eq!(lex_all("?1")[0], Token::Word(Word::Print));
    }

    #[test]
    fn test_packed_keywords() {
        let options = Options {
            packed_keywords: true,
            ..Options::default()
        };
        let (tokens, _) = lex("FORI=1TO9", 0, &Lexicon::default(), &options).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word(Word::For),
                Token::Ident("I".into()),
                Token::Operator(Operator::Equal),
                Token::Integer("1".into()),
                Token::Word(Word::To),
                Token::Integer("9".into()),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let r = lex("PRINT \"ABC", 0, &Lexicon::default(), &Options::default());
        assert!(r.is_err());
    }

    #[test]
    fn test_uppercase_program() {
        assert_eq!(uppercase_program("print \"hi\";a$"), "PRINT \"hi\";A$");
        assert_eq!(uppercase_program("x='it''s'"), "X='it''s'");
    }

    #[test]
    fn test_line_number_prefix() {
        assert_eq!(line_number_prefix(" 10 PRINT"), Some((10, 3)));
        assert_eq!(line_number_prefix("1.5"), None);
        assert_eq!(line_number_prefix("PRINT"), None);
    }
}
