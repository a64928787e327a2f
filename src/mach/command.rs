use super::registry::{CommandFn, Registry};
use super::runtime::OpenFile;
use super::{Item, Listing, Runtime, Val, MEMORY_SIZE};
use crate::error;
use crate::lang::Error;
use std::collections::VecDeque;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

type Builtin = fn(&mut Runtime, &[Item]) -> Result<()>;

const COMMANDS: &[(&str, Builtin)] = &[
    ("AUTO", r#auto),
    ("CLOSE", r#close),
    ("FAST", r#fast),
    ("FIND", r#find),
    ("LOAD", r#load),
    ("OPEN", r#open),
    ("POKE", r#poke),
    ("QSAVE", r#qsave),
    ("QUIT", r#quit),
    ("RENUMBER", r#renumber),
    ("SAVE", r#save),
    ("SLEEP", r#sleep),
    ("SLOW", r#slow),
    ("STOP", r#stop),
    ("TROFF", r#troff),
    ("TRON", r#tron),
];

pub fn register(registry: &mut Registry) {
    for (name, builtin) in COMMANDS {
        let command: CommandFn = Rc::new(*builtin);
        registry.add_command(name, command);
    }
}

/// Argument values, checking the count.
fn values(items: &[Item], min: usize, max: usize) -> Result<Vec<Val>> {
    let vals = Item::values(items);
    if vals.len() < min || vals.len() > max {
        return Err(error!(ArgumentCount));
    }
    Ok(vals)
}

fn file_name(val: &Val) -> Result<String> {
    match val {
        Val::Text(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Val::Text(_) => Err(error!(FileNotFound; "EMPTY FILE NAME")),
        _ => Err(error!(TypeMismatch; "FILE NAME MUST BE TEXT")),
    }
}

fn handle(val: &Val) -> Result<i64> {
    match val.to_int()? {
        n @ 1..=254 => Ok(n),
        _ => Err(error!(IllegalDevice)),
    }
}

fn r#auto(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    let vals = values(items, 0, 1)?;
    let step = match vals.first() {
        Some(val) => val.to_int()?,
        None => 0,
    };
    if step < 0 {
        return Err(error!(IllegalQuantity));
    }
    runtime.var_module().auto_numbering = step;
    Ok(())
}

fn r#close(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    let vals = values(items, 1, 1)?;
    let handle = handle(&vals[0])?;
    match runtime.files.remove(&handle) {
        Some(OpenFile::Write { name, text }) => runtime.host.write_file(&name, &text),
        Some(OpenFile::Read { .. }) => Ok(()),
        None => Err(error!(IllegalDevice; "FILE NOT OPEN")),
    }
}

fn r#fast(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    values(items, 0, 0)?;
    runtime.code_module().fast = true;
    Ok(())
}

fn r#slow(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    values(items, 0, 0)?;
    runtime.code_module().fast = false;
    Ok(())
}

fn r#find(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    let vals = values(items, 1, 1)?;
    let pattern: Vec<char> = match &vals[0] {
        Val::Text(s) => format!("*{}*", s.to_uppercase()).chars().collect(),
        _ => return Err(error!(TypeMismatch)),
    };
    let found: Vec<String> = runtime
        .var_module()
        .listing
        .lines(0..=i64::MAX)
        .filter(|(_, text)| {
            let text: Vec<char> = text.to_uppercase().chars().collect();
            wildcard(&pattern, &text)
        })
        .map(|(n, text)| format!("{:<3} {}\n", n, text))
        .collect();
    for line in found {
        if runtime.host.interrupted() {
            return Err(error!(Break));
        }
        runtime.print(&line);
    }
    Ok(())
}

/// `*` matches any run of characters, `?` exactly one.
fn wildcard(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

fn r#load(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    let vals = values(items, 1, 1)?;
    let name = file_name(&vals[0])?;
    let text = runtime.host.read_file(&name)?;
    let listing = Listing::load_str(&text)?;
    log::debug!("loaded {} into module {:?}", name, runtime.current_module());
    let module = runtime.var_module();
    module.clear();
    module.listing = listing;
    module.file_name = Some(name);
    Ok(())
}

fn r#open(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    let vals = values(items, 3, 3)?;
    let handle = handle(&vals[0])?;
    if runtime.files.contains_key(&handle) {
        return Err(error!(IllegalDevice; "FILE ALREADY OPEN"));
    }
    let target = file_name(&vals[2])?;
    let (name, mode) = match target.rsplit_once(',') {
        Some((name, mode)) => (name.trim().to_string(), mode.trim().to_uppercase()),
        None => (target.clone(), "W".to_string()),
    };
    let file = match mode.as_str() {
        "R" => {
            let text = runtime.host.read_file(&name)?;
            let lines: VecDeque<String> = text.lines().map(|l| l.to_string()).collect();
            OpenFile::Read { lines }
        }
        "W" => OpenFile::Write {
            name,
            text: String::new(),
        },
        _ => return Err(error!(IllegalQuantity; "MODE MUST BE R OR W")),
    };
    runtime.files.insert(handle, file);
    Ok(())
}

fn r#poke(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    let vals = values(items, 2, 2)?;
    let address = vals[0].to_int()?;
    let value = vals[1].to_int()?;
    if address < 0 || address as usize >= MEMORY_SIZE || !(0..=255).contains(&value) {
        return Err(error!(IllegalQuantity));
    }
    runtime.memory[address as usize] = value as u8;
    Ok(())
}

fn r#qsave(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    values(items, 0, 0)?;
    let module = runtime.var_module();
    let name = match &module.file_name {
        Some(name) => name.clone(),
        None => return Err(error!(FileNotFound; "NO FILE NAME YET")),
    };
    let text = module.listing.to_text();
    log::debug!("saving {}", name);
    runtime.host.write_file(&name, &text)
}

fn r#quit(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    let vals = values(items, 0, 1)?;
    let code = match vals.first() {
        Some(val) => val.to_int()? as i32,
        None => 0,
    };
    runtime.quit = Some(code);
    Ok(())
}

fn r#renumber(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    let vals = values(items, 0, 4)?;
    let arg = |i: usize, default: i64| -> Result<i64> {
        match vals.get(i) {
            Some(val) => val.to_int(),
            None => Ok(default),
        }
    };
    let (new_start, step, old_start, milestone) = (arg(0, 10)?, arg(1, 10)?, arg(2, 0)?, arg(3, 0)?);
    runtime
        .var_module()
        .listing
        .renumber(new_start, step, old_start, milestone)
}

fn r#save(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    let vals = values(items, 1, 1)?;
    let name = file_name(&vals[0])?;
    if runtime.host.file_exists(&name) {
        runtime.print("FILE EXISTS. OVERWRITE (Y/N)?");
        let answer = runtime.host.read_line()?;
        runtime.column = 0;
        if !answer.trim().eq_ignore_ascii_case("Y") {
            return Ok(());
        }
    }
    let module = runtime.var_module();
    let text = module.listing.to_text();
    module.file_name = Some(name.clone());
    log::debug!("saving {}", name);
    runtime.host.write_file(&name, &text)
}

fn r#sleep(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    let vals = values(items, 1, 1)?;
    let seconds = vals[0].to_f64()?;
    if seconds.is_nan() || seconds < 0.0 {
        return Err(error!(IllegalQuantity));
    }
    runtime.host.sleep((seconds * 1000.0) as u64);
    Ok(())
}

fn r#stop(_: &mut Runtime, items: &[Item]) -> Result<()> {
    values(items, 0, 0)?;
    Err(error!(Break))
}

fn r#tron(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    values(items, 0, 0)?;
    runtime.code_module().trace = true;
    Ok(())
}

fn r#troff(runtime: &mut Runtime, items: &[Item]) -> Result<()> {
    values(items, 0, 0)?;
    runtime.code_module().trace = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, text: &str) -> bool {
        let pattern: Vec<char> = pattern.chars().collect();
        let text: Vec<char> = text.chars().collect();
        wildcard(&pattern, &text)
    }

    #[test]
    fn test_wildcard() {
        assert!(matches("*PRINT*", "10 PRINT X"));
        assert!(matches("*P?INT*", "PRINT"));
        assert!(matches("*", ""));
        assert!(!matches("*GOTO*", "PRINT X"));
        assert!(matches("A*C", "ABBBC"));
        assert!(!matches("A*C", "ABBBD"));
    }
}
