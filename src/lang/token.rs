use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Number(Rc<str>),
    Integer(Rc<str>),
    String(Rc<str>),
    Ident(Rc<str>),
    Comma,
    Operator(Operator),
    Unary(Operator),
    Word(Word),
    Command(Rc<str>),
    LParen,
    RParen,
    Module(Rc<str>),
    FileHandle(Rc<str>),
}

impl Token {
    pub fn is_word(&self, word: Word) -> bool {
        matches!(self, Token::Word(w) if *w == word)
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        matches!(self, Token::Operator(o) if *o == op)
    }

    /// Tokens after which `+`, `-` start a new operand.
    fn expects_operand(&self) -> bool {
        matches!(
            self,
            Token::Operator(_)
                | Token::Unary(_)
                | Token::Word(_)
                | Token::LParen
                | Token::Comma
                | Token::Command(_)
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            Number(s) | Integer(s) | Ident(s) | Command(s) => write!(f, "{}", s),
            String(s) => write!(f, "\"{}\"", s),
            Comma => write!(f, ","),
            Operator(op) | Unary(op) => write!(f, "{}", op),
            Word(w) => write!(f, "{}", w),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            Module(s) => write!(f, "{}.", s),
            FileHandle(s) => write!(f, "#{}", s),
        }
    }
}

/// Marks `NOT` and operand-position `+`/`-` as unary.
pub fn mark_unary(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        let op = match &tokens[i] {
            Token::Operator(op) => *op,
            _ => continue,
        };
        let unary = match op {
            Operator::Not => true,
            Operator::Plus | Operator::Minus => i == 0 || tokens[i - 1].expects_operand(),
            _ => false,
        };
        if unary {
            tokens[i] = Token::Unary(op);
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Caret,
    Multiply,
    Divide,
    Plus,
    Minus,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Not,
    And,
    Or,
    Semicolon,
}

impl Operator {
    pub fn from_str(s: &str) -> Option<Operator> {
        use Operator::*;
        Some(match s {
            "^" => Caret,
            "*" => Multiply,
            "/" => Divide,
            "+" => Plus,
            "-" => Minus,
            "=" => Equal,
            "<>" | "><" => NotEqual,
            "<" => Less,
            "<=" | "=<" => LessEqual,
            ">" => Greater,
            ">=" | "=>" => GreaterEqual,
            "NOT" => Not,
            "AND" => And,
            "OR" => Or,
            ";" => Semicolon,
            _ => return None,
        })
    }

    pub fn precedence(self) -> u8 {
        use Operator::*;
        match self {
            Semicolon => 1,
            And | Or => 2,
            NotEqual | Less | LessEqual | Greater | GreaterEqual => 3,
            Equal => 4,
            Plus | Minus => 5,
            Multiply | Divide => 6,
            Caret => 7,
            Not => 8,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        let s = match self {
            Caret => "^",
            Multiply => "*",
            Divide => "/",
            Plus => "+",
            Minus => "-",
            Equal => "=",
            NotEqual => "<>",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Not => "NOT",
            And => "AND",
            Or => "OR",
            Semicolon => ";",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Word {
    Clr,
    Data,
    Def,
    Delete,
    Dim,
    Dump,
    End,
    Fn,
    For,
    Get,
    GetKey,
    Gosub,
    Goto,
    If,
    Input,
    Let,
    List,
    Module,
    New,
    Next,
    On,
    Print,
    Read,
    Rem,
    Restore,
    Return,
    Run,
    ScnClr,
    Step,
    Then,
    To,
    Using,
}

const WORDS: &[(&str, Word)] = &[
    ("?", Word::Print),
    ("CLR", Word::Clr),
    ("DATA", Word::Data),
    ("DEF", Word::Def),
    ("DELETE", Word::Delete),
    ("DIM", Word::Dim),
    ("DUMP", Word::Dump),
    ("END", Word::End),
    ("FN", Word::Fn),
    ("FOR", Word::For),
    ("GET", Word::Get),
    ("GETKEY", Word::GetKey),
    ("GOSUB", Word::Gosub),
    ("GOTO", Word::Goto),
    ("IF", Word::If),
    ("INPUT", Word::Input),
    ("LET", Word::Let),
    ("LIST", Word::List),
    ("MODULE", Word::Module),
    ("NEW", Word::New),
    ("NEXT", Word::Next),
    ("ON", Word::On),
    ("PRINT", Word::Print),
    ("READ", Word::Read),
    ("REM", Word::Rem),
    ("RESTORE", Word::Restore),
    ("RETURN", Word::Return),
    ("RUN", Word::Run),
    ("SCNCLR", Word::ScnClr),
    ("STEP", Word::Step),
    ("THEN", Word::Then),
    ("TO", Word::To),
    ("USING", Word::Using),
];

impl Word {
    pub fn from_str(s: &str) -> Option<Word> {
        WORDS.iter().find(|(text, _)| *text == s).map(|(_, w)| *w)
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let text = WORDS
            .iter()
            .skip(1)
            .find(|(_, w)| w == self)
            .map_or("?", |(text, _)| *text);
        write!(f, "{}", text)
    }
}

/// Reserved words and registered command names known to the lexer.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    commands: BTreeSet<Rc<str>>,
}

impl Lexicon {
    pub fn add_command(&mut self, name: &str) {
        self.commands.insert(name.into());
    }

    pub fn is_command(&self, name: &str) -> bool {
        self.commands.contains(name)
    }

    /// Longest keyword the text starts with.
    pub fn keyword_prefix(&self, s: &str) -> Option<(Word, usize)> {
        WORDS
            .iter()
            .filter(|(text, _)| s.starts_with(*text))
            .max_by_key(|(text, _)| text.len())
            .map(|(text, w)| (*w, text.len()))
    }

    /// Longest command name the text starts with.
    pub fn command_prefix(&self, s: &str) -> Option<Rc<str>> {
        self.commands
            .iter()
            .filter(|name| s.starts_with(&***name))
            .max_by_key(|name| name.len())
            .cloned()
    }

    pub fn operator_prefix(&self, s: &str) -> Option<(Operator, usize)> {
        ["AND", "NOT", "OR"]
            .iter()
            .find(|text| s.starts_with(*text))
            .and_then(|text| Operator::from_str(text).map(|op| (op, text.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_round_trip() {
        assert_eq!(Word::from_str("GETKEY"), Some(Word::GetKey));
        assert_eq!(Word::from_str("?"), Some(Word::Print));
        assert_eq!(Word::Print.to_string(), "PRINT");
        assert_eq!(Word::from_str("PRINTER"), None);
    }

    #[test]
    fn test_longest_keyword_prefix() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.keyword_prefix("GETKEYA$"), Some((Word::GetKey, 6)));
        assert_eq!(lexicon.keyword_prefix("GETA$"), Some((Word::Get, 3)));
        assert_eq!(lexicon.keyword_prefix("XYZ"), None);
    }

    #[test]
    fn test_mark_unary() {
        let mut tokens = vec![
            Token::Ident("A".into()),
            Token::Operator(Operator::Equal),
            Token::Operator(Operator::Minus),
            Token::Integer("5".into()),
            Token::Operator(Operator::Minus),
            Token::Integer("1".into()),
        ];
        mark_unary(&mut tokens);
        assert_eq!(tokens[2], Token::Unary(Operator::Minus));
        assert_eq!(tokens[4], Token::Operator(Operator::Minus));
    }
}
