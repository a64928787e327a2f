use crate::error;
use crate::lang::{line_number_prefix, uppercase_program, Error, LineNumber};
use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Line holding typed statements in immediate mode.
pub const IMMEDIATE_LINE: LineNumber = -2;
/// Terminator following the immediate line.
pub const IMMEDIATE_END: LineNumber = -1;

/// ## Program text of one module, ordered by line number

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    source: BTreeMap<LineNumber, Rc<str>>,
}

impl Listing {
    pub fn clear(&mut self) {
        self.source.clear();
    }

    /// True when no numbered lines exist.
    pub fn is_empty(&self) -> bool {
        self.source.range(0..).next().is_none()
    }

    pub fn insert(&mut self, line_number: LineNumber, text: &str) {
        self.source.insert(line_number, text.into());
    }

    pub fn remove(&mut self, line_number: LineNumber) -> bool {
        self.source.remove(&line_number).is_some()
    }

    pub fn remove_range(&mut self, range: RangeInclusive<LineNumber>) -> bool {
        let to_remove: Vec<LineNumber> = self.lines(range).map(|(k, _)| k).collect();
        for line_number in &to_remove {
            self.source.remove(line_number);
        }
        !to_remove.is_empty()
    }

    pub fn get(&self, line_number: LineNumber) -> Option<&Rc<str>> {
        self.source.get(&line_number)
    }

    pub fn contains(&self, line_number: LineNumber) -> bool {
        self.source.contains_key(&line_number)
    }

    /// First numbered line at or after `line_number`.
    pub fn first_from(&self, line_number: LineNumber) -> Option<LineNumber> {
        self.source
            .range(line_number.max(0)..)
            .next()
            .map(|(k, _)| *k)
    }

    /// Line following `line_number`, sentinels included.
    pub fn next_after(&self, line_number: LineNumber) -> Option<LineNumber> {
        use std::ops::Bound::{Excluded, Unbounded};
        self.source
            .range((Excluded(line_number), Unbounded))
            .next()
            .map(|(k, _)| *k)
    }

    /// Numbered lines within `range`.
    pub fn lines(
        &self,
        range: RangeInclusive<LineNumber>,
    ) -> impl Iterator<Item = (LineNumber, &str)> {
        let (start, end) = ((*range.start()).max(0), *range.end());
        self.source
            .range(start..)
            .take_while(move |(k, _)| **k <= end)
            .map(|(k, v)| (*k, &**v))
    }

    pub fn list_line(&self, line_number: LineNumber) -> Option<String> {
        self.get(line_number)
            .map(|text| format!("{:<3} {}", line_number, text))
    }

    /// Persistence format: `"<n> <text>\r\n"` for every numbered line.
    pub fn to_text(&self) -> String {
        self.lines(0..=LineNumber::MAX)
            .map(|(n, text)| format!("{} {}\r\n", n, text))
            .collect()
    }

    /// Parses saved program text.
    pub fn load_str(text: &str) -> Result<Listing> {
        let mut listing = Listing::default();
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        for (index, line) in text.lines().enumerate() {
            let line = uppercase_program(line.trim_end_matches('\r'));
            if line.trim().is_empty() {
                continue;
            }
            match line_number_prefix(&line) {
                Some((number, len)) => {
                    let rest = line[len..].trim_start();
                    if rest.is_empty() {
                        listing.remove(number);
                    } else {
                        listing.insert(number, rest);
                    }
                }
                None => {
                    log::debug!("line {} of file has no line number", index + 1);
                    return Err(error!(Syntax; "DIRECT STATEMENT IN FILE"));
                }
            }
        }
        Ok(listing)
    }

    pub fn renumber(
        &mut self,
        new_start: LineNumber,
        step: LineNumber,
        old_start: LineNumber,
        milestone: LineNumber,
    ) -> Result<()> {
        if new_start < 0 || step <= 0 || milestone < 0 {
            return Err(error!(IllegalQuantity));
        }
        let mut changes: HashMap<LineNumber, LineNumber> = HashMap::default();
        let mut last_kept: Option<LineNumber> = None;
        let mut new_num = new_start;
        for &line_number in self.source.keys().filter(|n| **n >= 0) {
            if line_number < old_start {
                last_kept = Some(line_number);
                continue;
            }
            if milestone > 0 && line_number > new_num && line_number % milestone == 0 {
                new_num = line_number;
            }
            if let Some(kept) = last_kept {
                if kept >= new_num {
                    return Err(error!(UndefdStatement; "LINE NUMBERS WOULD OVERLAP"));
                }
            }
            changes.insert(line_number, new_num);
            new_num = match new_num.checked_add(step) {
                Some(num) => num,
                None => return Err(error!(IllegalQuantity)),
            };
        }
        let mut source = BTreeMap::default();
        for (line_number, text) in &self.source {
            if *line_number < 0 {
                source.insert(*line_number, text.clone());
                continue;
            }
            let number = changes.get(line_number).copied().unwrap_or(*line_number);
            source.insert(number, rewrite_references(text, &changes).into());
        }
        self.source = source;
        Ok(())
    }
}

/// Rewrites line numbers following GOTO, GOSUB and THEN.
fn rewrite_references(text: &str, changes: &HashMap<LineNumber, LineNumber>) -> String {
    const JUMPS: [&str; 3] = ["GOTO", "GOSUB", "THEN"];
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
        } else if b == b'"' || b == b'\'' {
            quote = Some(b);
        } else if i == 0 || !bytes[i - 1].is_ascii_alphanumeric() {
            if let Some(jump) = JUMPS.iter().find(|j| text[i..].starts_with(**j)) {
                out.push_str(jump);
                i += jump.len();
                let list = *jump != "THEN";
                loop {
                    while i < bytes.len() && bytes[i] == b' ' {
                        out.push(' ');
                        i += 1;
                    }
                    let digits = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
                    if digits == 0 {
                        break;
                    }
                    let old = &text[i..i + digits];
                    match old.parse::<LineNumber>().ok().and_then(|n| changes.get(&n)) {
                        Some(new) => out.push_str(&new.to_string()),
                        None => out.push_str(old),
                    }
                    i += digits;
                    let spaces = bytes[i..].iter().take_while(|b| **b == b' ').count();
                    if !list || bytes.get(i + spaces) != Some(&b',') {
                        break;
                    }
                    out.push_str(&text[i..i + spaces + 1]);
                    i += spaces + 1;
                }
                continue;
            }
        }
        match text[i..].chars().next() {
            Some(ch) => {
                out.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }
    out
}
