use super::LineNumber;

pub struct Error {
    code: ErrorCode,
    line_number: Option<LineNumber>,
    message: &'static str,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            line_number: None,
            message: "",
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn line_number(&self) -> Option<LineNumber> {
        self.line_number
    }

    /// Detail text for logs. Never shown to the user.
    pub fn detail(&self) -> &'static str {
        self.message
    }

    pub fn is_break(&self) -> bool {
        self.code == ErrorCode::Break
    }

    pub fn in_line_number(self, line: LineNumber) -> Error {
        Error {
            line_number: Some(line),
            ..self
        }
    }

    pub fn message(self, message: &'static str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error { message, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Internal = 1,
    Syntax,
    FileNotFound,
    IllegalDevice,
    UndefdStatement,
    TypeMismatch,
    IllegalQuantity,
    BadSubscript,
    UnimplementedCommand,
    OutOfData,
    NextWithoutFor,
    ReturnWithoutGosub,
    FormulaTooComplex,
    Break,
    UndefdModule,
    ArgumentCount = 101,
    VariableUndefined,
}

impl ErrorCode {
    pub fn text(self) -> &'static str {
        use ErrorCode::*;
        match self {
            Internal => "INTERNAL ERROR",
            Syntax => "SYNTAX ERROR",
            FileNotFound => "FILE NOT FOUND ERROR",
            IllegalDevice => "ILLEGAL DEVICE NUMBER ERROR",
            UndefdStatement => "UNDEF'D STATEMENT ERROR",
            TypeMismatch => "TYPE MISMATCH ERROR",
            IllegalQuantity => "ILLEGAL QUANTITY ERROR",
            BadSubscript => "BAD SUBSCRIPT ERROR",
            UnimplementedCommand => "UNIMPLEMENTED COMMAND ERROR",
            OutOfData => "OUT OF DATA ERROR",
            NextWithoutFor => "NEXT WITHOUT FOR ERROR",
            ReturnWithoutGosub => "RETURN WITHOUT GOSUB ERROR",
            FormulaTooComplex => "FORMULA TOO COMPLEX ERROR",
            Break => "BREAK",
            UndefdModule => "UNDEF'D MODULE ERROR",
            ArgumentCount => "ARGUMENT COUNT ERROR",
            VariableUndefined => "VARIABLE UNDEFINED ERROR",
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "Error {{ {} }}", self)
        } else {
            write!(f, "Error {{ {}; {} }}", self, self.message)
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.line_number {
            Some(line_number) if line_number >= 0 => {
                write!(f, "{} IN {}", self.code.text(), line_number)
            }
            _ => write!(f, "{}", self.code.text()),
        }
    }
}
