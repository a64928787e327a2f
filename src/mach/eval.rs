use super::{Item, ModuleId, Operation, Runtime, Stack, Val};
use crate::error;
use crate::lang::{scan_integer, Error, Operator, Token, Word};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

const MAX_STACK: usize = 256;
const MAX_FN_DEPTH: usize = 64;

/// A storage slot found by [`Runtime::resolve_place`].
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Scalar {
        module: ModuleId,
        name: Rc<str>,
    },
    Element {
        module: ModuleId,
        name: Rc<str>,
        offset: usize,
    },
}

impl Place {
    pub fn name(&self) -> &Rc<str> {
        match self {
            Place::Scalar { name, .. } | Place::Element { name, .. } => name,
        }
    }

    pub fn module(&self) -> ModuleId {
        match self {
            Place::Scalar { module, .. } | Place::Element { module, .. } => *module,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    Binary(Operator),
    Unary(Operator),
    Paren,
}

/// Shunting-yard state for one top-level sub-expression.
struct Frame {
    items: Vec<Item>,
    vals: Stack<Val>,
    ops: Stack<Pending>,
}

impl Frame {
    fn new() -> Frame {
        Frame {
            items: vec![],
            vals: Stack::new("EXPRESSION TOO COMPLEX", MAX_STACK),
            ops: Stack::new("EXPRESSION TOO COMPLEX", MAX_STACK),
        }
    }

    fn reduce(&mut self) -> Result<()> {
        match self.ops.pop()? {
            Pending::Binary(op) => {
                if self.vals.len() < 2 {
                    return Err(error!(Syntax; "MISSING OPERAND"));
                }
                let (lhs, rhs) = self.vals.pop_2()?;
                self.vals.push(Operation::binary(op, lhs, rhs)?)
            }
            Pending::Unary(op) => {
                if self.vals.is_empty() {
                    return Err(error!(Syntax; "MISSING OPERAND"));
                }
                let val = self.vals.pop()?;
                let val = match op {
                    Operator::Minus => Operation::negate(val)?,
                    Operator::Plus => val,
                    _ => Operation::not(val)?,
                };
                self.vals.push(val)
            }
            Pending::Paren => Err(error!(Syntax; "MISSING CLOSING PARENTHESIS")),
        }
    }

    fn push_operator(&mut self, op: Operator) -> Result<()> {
        while let Some(top) = self.ops.last() {
            let precedence = match top {
                Pending::Binary(top) | Pending::Unary(top) => top.precedence(),
                Pending::Paren => break,
            };
            if precedence < op.precedence() {
                break;
            }
            self.reduce()?;
        }
        self.ops.push(Pending::Binary(op))
    }

    fn close_paren(&mut self) -> Result<()> {
        loop {
            match self.ops.last() {
                Some(Pending::Paren) => {
                    self.ops.pop()?;
                    return Ok(());
                }
                Some(_) => self.reduce()?,
                None => return Err(error!(Syntax)),
            }
        }
    }

    /// Collapses pending operators and moves the value to the output.
    fn flush(&mut self) -> Result<()> {
        if self.vals.is_empty() {
            let ops: Vec<Pending> = self.ops.drain_all().collect();
            for op in ops {
                match op {
                    Pending::Binary(op) | Pending::Unary(op) => {
                        self.items.push(Item::Separator(op.to_string().into()))
                    }
                    Pending::Paren => return Err(error!(Syntax; "MISSING CLOSING PARENTHESIS")),
                }
            }
            return Ok(());
        }
        while !self.ops.is_empty() {
            self.reduce()?;
        }
        if self.vals.len() != 1 {
            return Err(error!(Syntax; "MISSING OPERATOR"));
        }
        let val = self.vals.pop()?;
        self.items.push(Item::Val(val));
        Ok(())
    }

    fn separator(&mut self, text: &str) -> Result<()> {
        self.flush()?;
        self.items.push(Item::Separator(text.into()));
        Ok(())
    }

    fn drain<F>(&mut self, runtime: &mut Runtime, sink: &mut F) -> Result<()>
    where
        F: FnMut(&mut Runtime, Item) -> Result<()>,
    {
        for item in self.items.drain(..) {
            sink(runtime, item)?;
        }
        Ok(())
    }
}

/// Index of the `)` matching the `(` at `open`.
pub(super) fn matching_paren(tokens: &[Token], open: usize) -> Result<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(index);
                }
            }
            _ => {}
        }
    }
    Err(error!(Syntax; "MISSING CLOSING PARENTHESIS"))
}

pub(super) fn parse_number(s: &str) -> Result<Val> {
    if s == "." {
        return Ok(Val::Real(0.0));
    }
    match s.parse::<f64>() {
        Ok(n) => Ok(Val::Real(n)),
        Err(_) => Err(error!(Syntax; "BAD NUMBER")),
    }
}

pub(super) fn parse_integer(s: &str) -> Result<Val> {
    match scan_integer(s) {
        Some((n, len)) if len == s.len() => Ok(Val::Integer(n)),
        _ => parse_number(s),
    }
}

/// Literal token standing in for a DEF FN argument.
fn literal_token(param: &str, val: Val) -> Result<Token> {
    Ok(match Val::coerce_for(param, val)? {
        Val::Integer(n) => Token::Integer(n.to_string().into()),
        Val::Real(n) => Token::Number(format!("{:?}", n).into()),
        Val::Text(s) => Token::String(s),
    })
}

impl Runtime {
    /// Evaluates `tokens` from `start` into values and separators.
    /// Stops at a keyword or an unbalanced `)` and returns its index.
    pub(super) fn evaluate(&mut self, tokens: &[Token], start: usize) -> Result<(Vec<Item>, usize)> {
        let mut items = vec![];
        let next = self.evaluate_with(tokens, start, |_, item| {
            items.push(item);
            Ok(())
        })?;
        Ok((items, next))
    }

    /// Like [`Runtime::evaluate`], handing each item to `sink` as soon as
    /// it is complete so output columns stay current for TAB and POS.
    pub(super) fn evaluate_with<F>(&mut self, tokens: &[Token], start: usize, mut sink: F) -> Result<usize>
    where
        F: FnMut(&mut Runtime, Item) -> Result<()>,
    {
        let mut frame = Frame::new();
        let mut depth = 0usize;
        let mut operand_done = false;
        let mut fn_call = false;
        let mut index = start;
        while let Some(token) = tokens.get(index) {
            let starts_operand = token.is_word(Word::Fn)
                || matches!(
                    token,
                    Token::Number(_)
                        | Token::Integer(_)
                        | Token::String(_)
                        | Token::Ident(_)
                        | Token::Module(_)
                        | Token::LParen
                        | Token::Unary(_)
                );
            if starts_operand && operand_done {
                if depth > 0 {
                    return Err(error!(Syntax; "MISSING OPERATOR"));
                }
                frame.separator(";")?;
                frame.drain(self, &mut sink)?;
                operand_done = false;
            }
            match token {
                Token::Number(s) => {
                    frame.vals.push(parse_number(s)?)?;
                    operand_done = true;
                }
                Token::Integer(s) => {
                    frame.vals.push(parse_integer(s)?)?;
                    operand_done = true;
                }
                Token::String(s) => {
                    frame.vals.push(Val::Text(s.clone()))?;
                    operand_done = true;
                }
                Token::Ident(_) | Token::Module(_) => {
                    let (val, next) = self.operand(tokens, index, fn_call)?;
                    frame.vals.push(val)?;
                    fn_call = false;
                    operand_done = true;
                    index = next;
                    continue;
                }
                Token::Word(Word::Fn) => fn_call = true,
                Token::Word(_) => break,
                Token::Unary(op) => frame.ops.push(Pending::Unary(*op))?,
                Token::Operator(Operator::Semicolon) if depth == 0 => {
                    frame.separator(";")?;
                    frame.drain(self, &mut sink)?;
                    operand_done = false;
                }
                Token::Comma if depth == 0 => {
                    frame.separator(",")?;
                    frame.drain(self, &mut sink)?;
                    operand_done = false;
                }
                Token::Comma => return Err(error!(Syntax; "COMMA INSIDE PARENTHESES")),
                Token::Operator(op) => {
                    if !operand_done {
                        return Err(error!(Syntax; "MISSING OPERAND"));
                    }
                    frame.push_operator(*op)?;
                    operand_done = false;
                }
                Token::LParen => {
                    frame.ops.push(Pending::Paren)?;
                    depth += 1;
                }
                Token::RParen => {
                    if depth == 0 {
                        break;
                    }
                    if !operand_done {
                        return Err(error!(Syntax; "MISSING OPERAND"));
                    }
                    frame.close_paren()?;
                    depth -= 1;
                }
                Token::Command(_) | Token::FileHandle(_) => {
                    return Err(error!(Syntax; "UNEXPECTED TOKEN IN EXPRESSION"))
                }
            }
            index += 1;
        }
        if fn_call {
            return Err(error!(Syntax; "FN WITHOUT NAME"));
        }
        frame.flush()?;
        frame.drain(self, &mut sink)?;
        Ok(index)
    }

    /// Evaluates a whole token slice to exactly one value.
    pub(super) fn evaluate_single(&mut self, tokens: &[Token]) -> Result<Val> {
        let (items, next) = self.evaluate(tokens, 0)?;
        if next != tokens.len() {
            return Err(error!(Syntax));
        }
        Item::single(&items)
    }

    /// Values of a parenthesized argument list, separators dropped.
    pub(super) fn arguments(&mut self, tokens: &[Token]) -> Result<Vec<Val>> {
        if tokens.is_empty() {
            return Ok(vec![]);
        }
        let (items, next) = self.evaluate(tokens, 0)?;
        if next != tokens.len() {
            return Err(error!(Syntax));
        }
        Ok(Item::values(&items))
    }

    pub(super) fn indices(&mut self, tokens: &[Token]) -> Result<Vec<usize>> {
        let mut index = vec![];
        for val in self.arguments(tokens)? {
            let n = val.to_int()?;
            if n < 0 {
                return Err(error!(BadSubscript; "NEGATIVE SUBSCRIPT"));
            }
            index.push(n as usize);
        }
        Ok(index)
    }

    /// Variable, array element, or function call starting at `index`.
    fn operand(&mut self, tokens: &[Token], index: usize, fn_call: bool) -> Result<(Val, usize)> {
        let (module, name_at) = match &tokens[index] {
            Token::Module(name) => (self.find_module(name)?, index + 1),
            _ => (self.scopes.variables(), index),
        };
        let name = match tokens.get(name_at) {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err(error!(Syntax; "EXPECTED NAME")),
        };
        let key: Rc<str> = if fn_call {
            format!("FN{}", name).into()
        } else {
            name.clone()
        };
        let open = name_at + 1;
        if tokens.get(open) != Some(&Token::LParen) {
            if fn_call || self.modules[module].functions.contains_key(&key) {
                return Ok((self.call_def(module, &key, vec![])?, open));
            }
            let var = &mut self.modules[module].var;
            var.touch(&name);
            return Ok((var.fetch(&name), open));
        }
        let close = matching_paren(tokens, open)?;
        let inner = &tokens[open + 1..close];
        if !fn_call && self.modules[module].var.has_array(&name) {
            let index = self.indices(inner)?;
            let var = &self.modules[module].var;
            let offset = var.array_offset(&name, &index)?;
            return Ok((var.fetch_array(&name, offset)?, close + 1));
        }
        let args = self.arguments(inner)?;
        if !fn_call {
            if let Some(function) = self.registry.function(&name) {
                return Ok((function(self, &args)?, close + 1));
            }
        }
        if self.modules[module].functions.contains_key(&key) {
            return Ok((self.call_def(module, &key, args)?, close + 1));
        }
        Err(error!(VariableUndefined))
    }

    /// Calls a DEF FN by substituting arguments into a copy of its body.
    fn call_def(&mut self, module: ModuleId, key: &str, args: Vec<Val>) -> Result<Val> {
        let def = match self.modules[module].functions.get(key) {
            Some(def) => def.clone(),
            None => return Err(error!(VariableUndefined; "FUNCTION NOT DEFINED")),
        };
        if def.params.len() != args.len() {
            return Err(error!(ArgumentCount));
        }
        if self.fn_depth >= MAX_FN_DEPTH {
            return Err(error!(FormulaTooComplex; "FN NESTED TOO DEEP"));
        }
        let mut body = Vec::with_capacity(def.body.len());
        for (index, token) in def.body.iter().enumerate() {
            let qualified = index > 0 && matches!(def.body[index - 1], Token::Module(_));
            match token {
                Token::Ident(name) if !qualified => {
                    match def.params.iter().position(|param| param == name) {
                        Some(arg) => body.push(literal_token(name, args[arg].clone())?),
                        None => body.push(token.clone()),
                    }
                }
                _ => body.push(token.clone()),
            }
        }
        self.fn_depth += 1;
        let result = self.evaluate_single(&body);
        self.fn_depth -= 1;
        result
    }

    /// Resolves an assignable name at `index`. Targets create missing
    /// modules and dimension missing arrays to 10.
    pub(super) fn resolve_place(
        &mut self,
        tokens: &[Token],
        index: usize,
        target: bool,
    ) -> Result<Option<(Place, usize)>> {
        let (module, name_at) = match tokens.get(index) {
            Some(Token::Module(name)) if target => (self.module_id(name), index + 1),
            Some(Token::Module(name)) => (self.find_module(name)?, index + 1),
            Some(Token::Ident(_)) => (self.scopes.variables(), index),
            _ => return Ok(None),
        };
        let name = match tokens.get(name_at) {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err(error!(Syntax; "EXPECTED NAME")),
        };
        let open = name_at + 1;
        if tokens.get(open) != Some(&Token::LParen) {
            self.modules[module].var.touch(&name);
            return Ok(Some((Place::Scalar { module, name }, open)));
        }
        let close = matching_paren(tokens, open)?;
        let index = self.indices(&tokens[open + 1..close])?;
        let var = &mut self.modules[module].var;
        if !var.has_array(&name) {
            if !target {
                return Ok(None);
            }
            var.dimension_array(&name, vec![10; index.len()])?;
        }
        let offset = var.array_offset(&name, &index)?;
        Ok(Some((Place::Element { module, name, offset }, close + 1)))
    }

    pub(super) fn fetch_place(&self, place: &Place) -> Result<Val> {
        match place {
            Place::Scalar { module, name } => Ok(self.modules[*module].var.fetch(name)),
            Place::Element {
                module,
                name,
                offset,
            } => self.modules[*module].var.fetch_array(name, *offset),
        }
    }

    pub(super) fn store_place(&mut self, place: &Place, val: Val) -> Result<()> {
        match place {
            Place::Scalar { module, name } => self.modules[*module].var.store(name, val),
            Place::Element {
                module,
                name,
                offset,
            } => self.modules[*module].var.store_array(name, *offset, val),
        }
    }
}
