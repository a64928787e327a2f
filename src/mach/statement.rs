use super::eval::{matching_paren, parse_integer, parse_number, Place};
use super::runtime::OpenFile;
use super::{
    format_using, DataCursor, ForLoop, FunctionDef, Gosub, Item, ModuleId, Operation,
    ProgramCounter, Runtime, Val,
};
use crate::error;
use crate::lang::{lex, Error, LineNumber, Operator, Token, Word};
use std::collections::VecDeque;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

impl Runtime {
    /// Executes one lexed statement.
    pub(super) fn dispatch(&mut self, tokens: &[Token]) -> Result<()> {
        match tokens.first() {
            None => Ok(()),
            Some(Token::Command(name)) => self.r#command(name, tokens),
            Some(Token::Ident(_)) | Some(Token::Module(_)) => self.r#let(tokens, 0),
            Some(Token::Word(word)) => match word {
                Word::Clr => self.r#clr(),
                Word::Data | Word::Rem => Ok(()),
                Word::Def => self.r#def(tokens),
                Word::Delete => self.r#delete(tokens),
                Word::Dim => self.r#dim(tokens),
                Word::Dump => self.r#dump(),
                Word::End => {
                    self.end_module();
                    Ok(())
                }
                Word::For => self.r#for(tokens),
                Word::Get => self.r#get(tokens, false),
                Word::GetKey => self.r#get(tokens, true),
                Word::Gosub => self.r#gosub(tokens),
                Word::Goto => self.r#goto(tokens),
                Word::If => self.r#if(tokens),
                Word::Input => self.r#input(tokens),
                Word::Let => self.r#let(tokens, 1),
                Word::List => self.r#list(tokens),
                Word::Module => self.r#module(tokens),
                Word::New => self.new_statement(),
                Word::Next => self.r#next(tokens),
                Word::On => self.r#on(tokens),
                Word::Print => self.print_statement(tokens),
                Word::Read => self.r#read(tokens),
                Word::Restore => self.r#restore(tokens),
                Word::Return => self.r#return(),
                Word::Run => self.r#run(tokens),
                Word::ScnClr => self.r#scnclr(),
                Word::Fn | Word::Step | Word::Then | Word::To | Word::Using => {
                    Err(error!(UnimplementedCommand))
                }
            },
            Some(_) => Err(error!(Syntax)),
        }
    }

    fn line_argument(&mut self, tokens: &[Token]) -> Result<LineNumber> {
        self.evaluate_single(tokens)?.to_int()
    }

    pub(super) fn goto_line(&mut self, line_number: LineNumber) -> Result<()> {
        self.enter_code();
        let module = self.code_module();
        if line_number < 0 || !module.listing.contains(line_number) {
            return Err(error!(UndefdStatement));
        }
        module.pc = ProgramCounter::at(line_number);
        Ok(())
    }

    fn gosub_line(&mut self, line_number: LineNumber) -> Result<()> {
        let module = self.code_module();
        let frame = Gosub {
            resume: module.pc,
            for_depth: module.for_stack.len(),
        };
        let entered = self.enter_code();
        let module = self.code_module();
        if line_number < 0 || !module.listing.contains(line_number) {
            return Err(error!(UndefdStatement));
        }
        // The caller resumes from its own pc once the entered module ends.
        let frame = if entered {
            Gosub {
                resume: ProgramCounter::end(),
                for_depth: module.for_stack.len(),
            }
        } else {
            frame
        };
        module.gosub_stack.push(frame)?;
        module.pc = ProgramCounter::at(line_number);
        Ok(())
    }

    /// Abandons the rest of the current line.
    fn skip_line(&mut self) {
        let module = self.code_module();
        if let Some(line_number) = module.pc.line {
            module.pc.offset = module.listing.get(line_number).map_or(0, |text| text.len());
        }
    }

    fn r#command(&mut self, name: &str, tokens: &[Token]) -> Result<()> {
        let command = match self.registry.command(name) {
            Some(command) => command,
            None => return Err(error!(UnimplementedCommand)),
        };
        let (items, next) = self.evaluate(tokens, 1)?;
        if next != tokens.len() {
            return Err(error!(Syntax));
        }
        command(self, &items)
    }

    fn r#clr(&mut self) -> Result<()> {
        let module = self.var_module();
        module.var.clear();
        module.for_stack.clear();
        Ok(())
    }

    fn r#def(&mut self, tokens: &[Token]) -> Result<()> {
        let fn_word = tokens.get(1).map_or(false, |t| t.is_word(Word::Fn));
        let mut index = if fn_word { 2 } else { 1 };
        let name = match tokens.get(index) {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err(error!(Syntax; "EXPECTED FUNCTION NAME")),
        };
        let key: Rc<str> = if fn_word {
            format!("FN{}", name).into()
        } else {
            name
        };
        index += 1;
        let mut params = vec![];
        if tokens.get(index) == Some(&Token::LParen) {
            let close = matching_paren(tokens, index)?;
            let inner = &tokens[index + 1..close];
            for (n, token) in inner.iter().enumerate() {
                match (n % 2, token) {
                    (0, Token::Ident(param)) => params.push(param.clone()),
                    (1, Token::Comma) if n + 1 < inner.len() => {}
                    _ => return Err(error!(Syntax; "BAD PARAMETER LIST")),
                }
            }
            index = close + 1;
        }
        if !tokens.get(index).map_or(false, |t| t.is_operator(Operator::Equal)) {
            return Err(error!(Syntax; "EXPECTED ="));
        }
        let body = tokens[index + 1..].to_vec();
        if body.is_empty() {
            return Err(error!(Syntax; "EMPTY FUNCTION BODY"));
        }
        self.var_module()
            .functions
            .insert(key, Rc::new(FunctionDef { params, body }));
        Ok(())
    }

    fn r#delete(&mut self, tokens: &[Token]) -> Result<()> {
        if tokens.len() < 2 {
            return Err(error!(Syntax; "DELETE NEEDS A RANGE"));
        }
        let (from, to) = line_range(&tokens[1..])?;
        self.var_module().listing.remove_range(from..=to);
        Ok(())
    }

    fn r#dim(&mut self, tokens: &[Token]) -> Result<()> {
        let mut index = 1;
        while index < tokens.len() {
            let (module, name_at) = match &tokens[index] {
                Token::Module(name) => (self.module_id(name), index + 1),
                Token::Ident(_) => (self.scopes.variables(), index),
                _ => return Err(error!(Syntax)),
            };
            let name = match tokens.get(name_at) {
                Some(Token::Ident(name)) => name.clone(),
                _ => return Err(error!(Syntax)),
            };
            let mut next = name_at + 1;
            if tokens.get(next) == Some(&Token::LParen) {
                let close = matching_paren(tokens, next)?;
                let bounds = self.indices(&tokens[next + 1..close])?;
                self.modules[module].var.dimension_array(&name, bounds)?;
                next = close + 1;
            } else {
                self.modules[module]
                    .var
                    .store(&name, Val::zero_for(&name))?;
            }
            match tokens.get(next) {
                None => break,
                Some(Token::Comma) => index = next + 1,
                Some(_) => return Err(error!(Syntax)),
            }
        }
        Ok(())
    }

    fn r#dump(&mut self) -> Result<()> {
        let module = &self.modules[self.scopes.variables()];
        let mut text = format!("MODULE {}\n", module.name());
        for (name, val) in module.var.variables() {
            match val {
                Val::Text(s) => text.push_str(&format!("{} = \"{}\"\n", name, s)),
                _ => text.push_str(&format!("{} = {}\n", name, val)),
            }
        }
        for (name, array) in module.var.arrays() {
            let bounds: Vec<String> = array.bounds().iter().map(|b| b.to_string()).collect();
            text.push_str(&format!("{}({})\n", name, bounds.join(",")));
        }
        self.print(&text);
        Ok(())
    }

    fn r#for(&mut self, tokens: &[Token]) -> Result<()> {
        let (place, next) = match self.resolve_place(tokens, 1, false)? {
            Some((place @ Place::Scalar { .. }, next)) => (place, next),
            _ => return Err(error!(Syntax; "EXPECTED LOOP VARIABLE")),
        };
        if place.name().ends_with('$') {
            return Err(error!(TypeMismatch; "TEXT LOOP VARIABLE"));
        }
        if !tokens.get(next).map_or(false, |t| t.is_operator(Operator::Equal)) {
            return Err(error!(Syntax; "EXPECTED ="));
        }
        let (items, to_at) = self.evaluate(tokens, next + 1)?;
        if !tokens.get(to_at).map_or(false, |t| t.is_word(Word::To)) {
            return Err(error!(Syntax; "EXPECTED TO"));
        }
        let start = Item::single(&items)?;
        let (items, step_at) = self.evaluate(tokens, to_at + 1)?;
        let end = Item::single(&items)?.to_f64()?;
        let step = match tokens.get(step_at) {
            None => 1.0,
            Some(token) if token.is_word(Word::Step) => {
                let (items, done) = self.evaluate(tokens, step_at + 1)?;
                if done != tokens.len() {
                    return Err(error!(Syntax));
                }
                Item::single(&items)?.to_f64()?
            }
            Some(_) => return Err(error!(Syntax)),
        };
        self.store_place(&place, start)?;
        let module = place.module();
        let var_name = place.name().clone();
        let code = self.code_module();
        let floor = code.loop_floor();
        if let Some(position) = code
            .for_stack
            .iter()
            .skip(floor)
            .position(|l| l.var_name == var_name && l.module == module)
        {
            code.for_stack.truncate(floor + position);
        }
        let resume = code.pc;
        code.for_stack.push(ForLoop {
            var_name,
            module,
            end,
            step,
            resume,
        })
    }

    fn r#get(&mut self, tokens: &[Token], wait: bool) -> Result<()> {
        let (place, next) = match self.resolve_place(tokens, 1, true)? {
            Some(found) => found,
            None => return Err(error!(Syntax)),
        };
        if next != tokens.len() {
            return Err(error!(Syntax));
        }
        let key = if wait || self.host.key_available() {
            Some(self.host.read_key()?)
        } else {
            None
        };
        let val = if place.name().ends_with('$') {
            Val::Text(key.map(String::from).unwrap_or_default().into())
        } else {
            Val::Integer(key.and_then(|k| k.to_digit(10)).unwrap_or(0) as i64)
        };
        self.store_place(&place, val)
    }

    fn r#gosub(&mut self, tokens: &[Token]) -> Result<()> {
        let line_number = self.line_argument(&tokens[1..])?;
        self.gosub_line(line_number)
    }

    fn r#goto(&mut self, tokens: &[Token]) -> Result<()> {
        let line_number = self.line_argument(&tokens[1..])?;
        self.goto_line(line_number)
    }

    fn r#if(&mut self, tokens: &[Token]) -> Result<()> {
        let (items, next) = self.evaluate(tokens, 1)?;
        let truth = Item::single(&items)?.to_f64()? != 0.0;
        match tokens.get(next) {
            Some(Token::Word(Word::Then)) => {
                if !truth {
                    self.skip_line();
                    return Ok(());
                }
                let rest = &tokens[next + 1..];
                match rest {
                    [Token::Integer(_)] => {
                        let line_number = self.line_argument(rest)?;
                        self.goto_line(line_number)
                    }
                    _ => self.dispatch(rest),
                }
            }
            Some(Token::Word(Word::Goto)) => {
                if !truth {
                    self.skip_line();
                    return Ok(());
                }
                self.dispatch(&tokens[next..])
            }
            _ => Err(error!(Syntax; "EXPECTED THEN")),
        }
    }

    fn r#input(&mut self, tokens: &[Token]) -> Result<()> {
        if let Some(Token::FileHandle(handle)) = tokens.get(1) {
            let handle = parse_handle(handle)?;
            let index = if tokens.get(2) == Some(&Token::Comma) { 3 } else { 2 };
            let places = self.input_places(tokens, index)?;
            return self.input_file(handle, &places);
        }
        let mut index = 1;
        let mut prompt = String::new();
        if let Some(Token::String(text)) = tokens.get(index) {
            match tokens.get(index + 1) {
                Some(token) if token.is_operator(Operator::Semicolon) => prompt.push_str(text),
                Some(Token::Comma) => {
                    prompt.push_str(text);
                    prompt.push('\n');
                }
                _ => return Err(error!(Syntax)),
            }
            index += 2;
        }
        prompt.push_str("? ");
        let places = self.input_places(tokens, index)?;
        loop {
            self.print(&prompt);
            match self.input_fields(&places) {
                Ok(()) => return Ok(()),
                Err(error) if error.is_break() => return Err(error),
                Err(error) => {
                    log::debug!("{:?}", error);
                    self.print("?REDO FROM START\n");
                }
            }
        }
    }

    fn input_places(&mut self, tokens: &[Token], mut index: usize) -> Result<Vec<Place>> {
        let mut places = vec![];
        loop {
            let (place, next) = match self.resolve_place(tokens, index, true)? {
                Some(found) => found,
                None => return Err(error!(Syntax; "EXPECTED VARIABLE")),
            };
            places.push(place);
            match tokens.get(next) {
                None => return Ok(places),
                Some(Token::Comma) => index = next + 1,
                Some(_) => return Err(error!(Syntax)),
            }
        }
    }

    fn input_fields(&mut self, places: &[Place]) -> Result<()> {
        let mut fields = self.read_fields()?;
        for place in places {
            let field = loop {
                if let Some(field) = fields.pop_front() {
                    break field;
                }
                self.print("?? ");
                fields = self.read_fields()?;
            };
            self.store_field(place, &field)?;
        }
        Ok(())
    }

    fn read_fields(&mut self) -> Result<VecDeque<String>> {
        let line = self.host.read_line()?;
        self.column = 0;
        if line.trim().is_empty() {
            return Ok(VecDeque::new());
        }
        Ok(split_fields(&line))
    }

    fn input_file(&mut self, handle: i64, places: &[Place]) -> Result<()> {
        let mut fields = VecDeque::new();
        for place in places {
            let field = loop {
                if let Some(field) = fields.pop_front() {
                    break field;
                }
                let line = match self.files.get_mut(&handle) {
                    Some(OpenFile::Read { lines }) => match lines.pop_front() {
                        Some(line) => line,
                        None => return Err(error!(OutOfData; "END OF FILE")),
                    },
                    _ => return Err(error!(IllegalDevice)),
                };
                fields = split_fields(&line);
            };
            self.store_field(place, &field)?;
        }
        Ok(())
    }

    fn store_field(&mut self, place: &Place, field: &str) -> Result<()> {
        let text = Val::Text(field.into());
        let val = if place.name().ends_with('$') {
            text
        } else {
            Val::Real(text.to_f64()?)
        };
        self.store_place(place, val)
    }

    fn r#let(&mut self, tokens: &[Token], start: usize) -> Result<()> {
        let (place, next) = match self.resolve_place(tokens, start, true)? {
            Some(found) => found,
            None => return Err(error!(Syntax)),
        };
        if !tokens.get(next).map_or(false, |t| t.is_operator(Operator::Equal)) {
            return Err(error!(Syntax; "EXPECTED ="));
        }
        let (items, end) = self.evaluate(tokens, next + 1)?;
        if end != tokens.len() {
            return Err(error!(Syntax));
        }
        let val = Item::single(&items)?;
        self.store_place(&place, val)
    }

    fn r#list(&mut self, tokens: &[Token]) -> Result<()> {
        let (from, to) = line_range(&tokens[1..])?;
        let lines: Vec<String> = self.modules[self.scopes.variables()]
            .listing
            .lines(from..=to)
            .map(|(n, text)| format!("{:<3} {}\n", n, text))
            .collect();
        for line in lines {
            if self.host.interrupted() {
                return Err(error!(Break));
            }
            self.print(&line);
        }
        Ok(())
    }

    fn r#module(&mut self, tokens: &[Token]) -> Result<()> {
        let name = match tokens {
            [_, Token::Ident(name)] | [_, Token::String(name)] => name.clone(),
            _ => return Err(error!(Syntax; "EXPECTED MODULE NAME")),
        };
        let id = self.module_id(&name);
        self.scopes.enter_variables(id);
        log::debug!("variable scope is module {:?}", name);
        Ok(())
    }

    fn new_statement(&mut self) -> Result<()> {
        self.var_module().clear();
        self.code_module().pc = ProgramCounter::end();
        Ok(())
    }

    fn r#next(&mut self, tokens: &[Token]) -> Result<()> {
        let mut targets: Vec<Option<(ModuleId, Rc<str>)>> = vec![];
        if tokens.len() == 1 {
            targets.push(None);
        }
        let mut index = 1;
        while index < tokens.len() {
            let (module, name_at) = match &tokens[index] {
                Token::Module(name) => (self.find_module(name)?, index + 1),
                _ => (self.scopes.variables(), index),
            };
            match tokens.get(name_at) {
                Some(Token::Ident(name)) => targets.push(Some((module, name.clone()))),
                _ => return Err(error!(Syntax)),
            }
            match tokens.get(name_at + 1) {
                None => break,
                Some(Token::Comma) => index = name_at + 2,
                Some(_) => return Err(error!(Syntax)),
            }
        }
        for target in targets {
            if !self.next_loop(target)? {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Steps one loop. Returns true when the loop finished.
    fn next_loop(&mut self, target: Option<(ModuleId, Rc<str>)>) -> Result<bool> {
        let code = self.code_module();
        let floor = code.loop_floor();
        let position = match &target {
            None if code.for_stack.len() > floor => Some(code.for_stack.len() - 1),
            None => None,
            Some((module, name)) => code
                .for_stack
                .iter()
                .enumerate()
                .skip(floor)
                .rev()
                .find(|(_, l)| l.var_name == *name && l.module == *module)
                .map(|(i, _)| i),
        };
        let position = match position {
            Some(position) => position,
            None => return Err(error!(NextWithoutFor)),
        };
        code.for_stack.truncate(position + 1);
        let active = match code.for_stack.last() {
            Some(active) => active.clone(),
            None => return Err(error!(NextWithoutFor)),
        };
        let place = Place::Scalar {
            module: active.module,
            name: active.var_name.clone(),
        };
        let val = self.fetch_place(&place)?;
        let val = Operation::binary(Operator::Plus, val, Val::Real(active.step))?;
        self.store_place(&place, val)?;
        let current = self.fetch_place(&place)?.to_f64()?;
        let done = if active.step > 0.0 {
            current > active.end
        } else if active.step < 0.0 {
            current < active.end
        } else {
            true
        };
        let code = self.code_module();
        if done {
            code.for_stack.pop()?;
        } else {
            code.pc = active.resume;
        }
        Ok(done)
    }

    fn r#on(&mut self, tokens: &[Token]) -> Result<()> {
        let (items, next) = self.evaluate(tokens, 1)?;
        let selector = Item::single(&items)?.to_int()?;
        let gosub = match tokens.get(next) {
            Some(Token::Word(Word::Goto)) => false,
            Some(Token::Word(Word::Gosub)) => true,
            _ => return Err(error!(Syntax; "EXPECTED GOTO OR GOSUB")),
        };
        let (items, end) = self.evaluate(tokens, next + 1)?;
        if end != tokens.len() {
            return Err(error!(Syntax));
        }
        let lines = Item::values(&items);
        if selector < 1 || selector as usize > lines.len() {
            return Ok(());
        }
        let line_number = lines[selector as usize - 1].to_int()?;
        if gosub {
            self.gosub_line(line_number)
        } else {
            self.goto_line(line_number)
        }
    }

    fn print_statement(&mut self, tokens: &[Token]) -> Result<()> {
        let mut index = 1;
        let mut file = None;
        if let Some(Token::FileHandle(handle)) = tokens.get(1) {
            let handle = parse_handle(handle)?;
            match self.files.get(&handle) {
                Some(OpenFile::Write { .. }) => file = Some(handle),
                _ => return Err(error!(IllegalDevice)),
            }
            index = if tokens.get(2) == Some(&Token::Comma) { 3 } else { 2 };
        }
        self.print_file = file;
        let result = if tokens.get(index).map_or(false, |t| t.is_word(Word::Using)) {
            self.print_using(tokens, index + 1)
        } else {
            self.print_items(tokens, index)
        };
        self.print_file = None;
        result
    }

    fn print_items(&mut self, tokens: &[Token], index: usize) -> Result<()> {
        let mut newline = true;
        let next = self.evaluate_with(tokens, index, |runtime, item| {
            newline = !item.is_separator();
            runtime.print_item(&item);
            Ok(())
        })?;
        if next != tokens.len() {
            return Err(error!(Syntax));
        }
        if newline {
            self.print("\n");
        }
        Ok(())
    }

    fn print_item(&mut self, item: &Item) {
        match item {
            Item::Val(Val::Text(s)) => self.print(s),
            Item::Val(val) => self.print(&format!(" {} ", val)),
            Item::Separator(s) if &**s == "," => {
                if self.print_file.is_some() {
                    self.print("    ");
                } else {
                    let pad = 10 - self.column % 10;
                    self.print(&" ".repeat(pad));
                }
            }
            Item::Separator(_) => {}
        }
    }

    fn print_using(&mut self, tokens: &[Token], index: usize) -> Result<()> {
        let (items, next) = self.evaluate(tokens, index)?;
        if next != tokens.len() {
            return Err(error!(Syntax));
        }
        let format = match items.first() {
            Some(Item::Val(Val::Text(format))) => format.clone(),
            Some(_) => return Err(error!(TypeMismatch; "USING NEEDS A FORMAT STRING")),
            None => return Err(error!(Syntax)),
        };
        let values = Item::values(&items[1..]);
        let text = format_using(&format, &values)?;
        self.print(&text);
        if !items.last().map_or(false, Item::is_separator) {
            self.print("\n");
        }
        Ok(())
    }

    fn r#read(&mut self, tokens: &[Token]) -> Result<()> {
        if tokens.len() < 2 {
            return Err(error!(Syntax; "READ NEEDS A VARIABLE"));
        }
        let mut index = 1;
        while index < tokens.len() {
            let (place, next) = match self.resolve_place(tokens, index, true)? {
                Some(found) => found,
                None => return Err(error!(Syntax)),
            };
            let val = self.read_data()?;
            if val.is_text() != place.name().ends_with('$') {
                return Err(error!(TypeMismatch; "DATA TYPE"));
            }
            self.store_place(&place, val)?;
            match tokens.get(next) {
                None => break,
                Some(Token::Comma) => index = next + 1,
                Some(_) => return Err(error!(Syntax)),
            }
        }
        Ok(())
    }

    fn read_data(&mut self) -> Result<Val> {
        let code = self.scopes.code();
        loop {
            let cursor = self.modules[code].data;
            let line_number = match cursor.line {
                Some(line_number) => line_number,
                None => match self.modules[code].listing.first_from(0) {
                    Some(first) => {
                        self.modules[code].data = DataCursor {
                            line: Some(first),
                            index: 0,
                        };
                        continue;
                    }
                    None => return Err(error!(OutOfData)),
                },
            };
            let items = self.data_items(code, line_number)?;
            if let Some(val) = items.into_iter().nth(cursor.index) {
                self.modules[code].data.index += 1;
                return Ok(val);
            }
            match self.modules[code].listing.next_after(line_number) {
                Some(next) if next >= 0 => {
                    self.modules[code].data = DataCursor {
                        line: Some(next),
                        index: 0,
                    };
                }
                _ => return Err(error!(OutOfData)),
            }
        }
    }

    /// Items of every DATA statement on a line.
    fn data_items(&self, module: ModuleId, line_number: LineNumber) -> Result<Vec<Val>> {
        let text = match self.modules[module].listing.get(line_number) {
            Some(text) => text.clone(),
            None => return Ok(vec![]),
        };
        let mut items = vec![];
        let mut offset = 0;
        loop {
            let (tokens, next) = lex(&text, offset, &self.lexicon, &self.options)?;
            if tokens.is_empty() {
                return Ok(items);
            }
            offset = next;
            if tokens[0].is_word(Word::Data) {
                for chunk in tokens[1..].split(|t| *t == Token::Comma) {
                    items.push(data_value(chunk)?);
                }
            }
        }
    }

    fn r#restore(&mut self, tokens: &[Token]) -> Result<()> {
        let cursor = if tokens.len() > 1 {
            let line_number = self.line_argument(&tokens[1..])?;
            if line_number < 0 || !self.code_module().listing.contains(line_number) {
                return Err(error!(UndefdStatement));
            }
            DataCursor {
                line: Some(line_number),
                index: 0,
            }
        } else {
            DataCursor::default()
        };
        self.code_module().data = cursor;
        Ok(())
    }

    fn r#return(&mut self) -> Result<()> {
        let module = self.code_module();
        if module.gosub_stack.is_empty() {
            return Err(error!(ReturnWithoutGosub));
        }
        let frame = module.gosub_stack.pop()?;
        module.for_stack.truncate(frame.for_depth);
        module.pc = frame.resume;
        if frame.resume.is_end() {
            self.end_module();
        }
        Ok(())
    }

    fn r#run(&mut self, tokens: &[Token]) -> Result<()> {
        let start = if tokens.len() > 1 {
            Some(self.line_argument(&tokens[1..])?)
        } else {
            None
        };
        self.var_module().auto_numbering = 0;
        self.enter_code();
        let module = self.code_module();
        module.for_stack.clear();
        module.gosub_stack.clear();
        module.data = DataCursor::default();
        match module.listing.first_from(start.unwrap_or(0)) {
            Some(line_number) => {
                module.pc = ProgramCounter::at(line_number);
                Ok(())
            }
            None if start.is_some() => Err(error!(UndefdStatement)),
            None => {
                self.end_module();
                Ok(())
            }
        }
    }

    fn r#scnclr(&mut self) -> Result<()> {
        self.host.clear_screen();
        self.column = 0;
        Ok(())
    }
}

fn parse_handle(text: &str) -> Result<i64> {
    match text.parse::<i64>() {
        Ok(handle) => Ok(handle),
        Err(_) => Err(error!(IllegalDevice)),
    }
}

/// Splits an input line at commas, dropping surrounding quotes.
fn split_fields(line: &str) -> VecDeque<String> {
    line.split(',')
        .map(|field| {
            let field = field.trim();
            match field.strip_prefix('"').and_then(|f| f.strip_suffix('"')) {
                Some(inner) => inner.to_string(),
                None => field.to_string(),
            }
        })
        .collect()
}

fn data_value(chunk: &[Token]) -> Result<Val> {
    Ok(match chunk {
        [] => Val::Text("".into()),
        [Token::String(s)] => Val::Text(s.clone()),
        [Token::Integer(s)] => parse_integer(s)?,
        [Token::Number(s)] => parse_number(s)?,
        [Token::Unary(Operator::Minus), Token::Integer(s)] => Operation::negate(parse_integer(s)?)?,
        [Token::Unary(Operator::Minus), Token::Number(s)] => Operation::negate(parse_number(s)?)?,
        [Token::Unary(Operator::Plus), Token::Integer(s)] => parse_integer(s)?,
        [Token::Unary(Operator::Plus), Token::Number(s)] => parse_number(s)?,
        _ => {
            let words: Vec<String> = chunk.iter().map(|t| t.to_string()).collect();
            Val::Text(words.join(" ").into())
        }
    })
}

/// `[from][-[to]]` as used by LIST and DELETE.
fn line_range(tokens: &[Token]) -> Result<(LineNumber, LineNumber)> {
    fn number(text: &str) -> Result<LineNumber> {
        match text.parse::<LineNumber>() {
            Ok(n) => Ok(n),
            Err(_) => Err(error!(Syntax; "BAD LINE NUMBER")),
        }
    }
    match tokens {
        [] => Ok((0, LineNumber::MAX)),
        [Token::Integer(n)] => {
            let n = number(n)?;
            Ok((n, n))
        }
        [Token::Integer(n), Token::Operator(Operator::Minus)] => Ok((number(n)?, LineNumber::MAX)),
        [Token::Unary(Operator::Minus), Token::Integer(m)] => Ok((0, number(m)?)),
        [Token::Integer(n), Token::Operator(Operator::Minus), Token::Integer(m)] => {
            Ok((number(n)?, number(m)?))
        }
        _ => Err(error!(Syntax; "BAD LINE RANGE")),
    }
}
