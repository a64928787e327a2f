use super::Val;
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## PRINT USING
///
/// `#` holds a digit, `.` the decimal point, `,` groups thousands,
/// `$` floats a currency sign, a leading or trailing `+`/`-` places the
/// sign, and `^^^^` asks for exponent form. Text fields are a run of
/// `#`, with a leading `=` to centre or `>` to right align.
/// Values that do not fit print as a row of `*`.

#[derive(Debug, PartialEq)]
enum Field {
    Literal(String),
    Text { width: usize, align: Align },
    Number(NumberField),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Align {
    Left,
    Centre,
    Right,
}

#[derive(Debug, Default, PartialEq)]
struct NumberField {
    width: usize,
    digits: usize,
    decimals: Option<usize>,
    comma: bool,
    dollar: bool,
    leading_sign: Option<char>,
    trailing_sign: Option<char>,
    exponent: bool,
}

pub fn format_using(format: &str, vals: &[Val]) -> Result<String> {
    let fields = parse_format(format);
    if !fields.iter().any(|f| !matches!(f, Field::Literal(_))) {
        return Err(error!(IllegalQuantity; "NO FIELDS IN FORMAT"));
    }
    let mut out = String::new();
    let mut vals = vals.iter().peekable();
    'outer: loop {
        for field in &fields {
            match field {
                Field::Literal(text) => out.push_str(text),
                Field::Text { width, align } => match vals.next() {
                    Some(val) => out.push_str(&format_text(val, *width, *align)),
                    None => break 'outer,
                },
                Field::Number(number) => match vals.next() {
                    Some(val) => out.push_str(&format_number(number, val.to_f64()?)),
                    None => break 'outer,
                },
            }
        }
        if vals.peek().is_none() {
            break;
        }
    }
    Ok(out)
}

fn parse_format(format: &str) -> Vec<Field> {
    let chars: Vec<char> = format.chars().collect();
    let mut fields = vec![];
    let mut literal = String::new();
    let mut i = 0;
    while i < chars.len() {
        let rest = &chars[i..];
        if let Some((field, len)) = text_field(rest).or_else(|| number_field(rest)) {
            if !literal.is_empty() {
                fields.push(Field::Literal(std::mem::take(&mut literal)));
            }
            fields.push(field);
            i += len;
        } else {
            literal.push(chars[i]);
            i += 1;
        }
    }
    if !literal.is_empty() {
        fields.push(Field::Literal(literal));
    }
    fields
}

fn text_field(chars: &[char]) -> Option<(Field, usize)> {
    let align = match chars.first() {
        Some('=') => Align::Centre,
        Some('>') => Align::Right,
        _ => return None,
    };
    let hashes = chars[1..].iter().take_while(|&&c| c == '#').count();
    if hashes == 0 {
        return None;
    }
    Some((
        Field::Text {
            width: hashes + 1,
            align,
        },
        hashes + 1,
    ))
}

fn number_field(chars: &[char]) -> Option<(Field, usize)> {
    let mut field = NumberField::default();
    let mut i = 0;
    if let Some(&c @ ('+' | '-')) = chars.first() {
        if matches!(chars.get(1), Some('#' | '$' | '.')) {
            field.leading_sign = Some(c);
            i += 1;
        }
    }
    if chars.get(i) == Some(&'$') {
        field.dollar = true;
        i += 1;
    }
    while let Some(&c) = chars.get(i) {
        match c {
            '#' if field.decimals.is_none() => field.digits += 1,
            '#' => field.decimals = field.decimals.map(|d| d + 1),
            ',' if field.decimals.is_none() && field.digits > 0 => field.comma = true,
            '.' if field.decimals.is_none() => field.decimals = Some(0),
            _ => break,
        }
        i += 1;
    }
    if field.digits == 0 && field.decimals.map_or(true, |d| d == 0) {
        return None;
    }
    if chars[i..].starts_with(&['^', '^', '^', '^']) {
        field.exponent = true;
        i += 4;
    }
    if field.leading_sign.is_none() {
        if let Some(&c @ ('+' | '-')) = chars.get(i) {
            field.trailing_sign = Some(c);
            i += 1;
        }
    }
    field.width = i;
    Some((Field::Number(field), i))
}

fn format_text(val: &Val, width: usize, align: Align) -> String {
    let text = val.to_string();
    let len = text.chars().count();
    if len > width {
        return "*".repeat(width);
    }
    let pad = width - len;
    match align {
        Align::Left => format!("{}{}", text, " ".repeat(pad)),
        Align::Right => format!("{}{}", " ".repeat(pad), text),
        Align::Centre => {
            let left = pad / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(pad - left))
        }
    }
}

fn format_number(field: &NumberField, n: f64) -> String {
    let decimals = field.decimals.unwrap_or(0);
    let negative = n < 0.0;
    let mut body = if field.exponent {
        let text = format!("{:.*e}", decimals, n.abs());
        match text.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}E{}{:02}", mantissa, sign, exp.abs())
            }
            None => text,
        }
    } else {
        let text = format!("{:.*}", decimals, n.abs());
        if field.comma {
            group_thousands(&text)
        } else {
            text
        }
    };
    if field.decimals == Some(0) && !body.contains('.') && !field.exponent {
        body.push('.');
    }
    if field.dollar {
        body.insert(0, '$');
    }
    match (field.leading_sign, field.trailing_sign) {
        (Some('+'), _) => body.insert(0, if negative { '-' } else { '+' }),
        (Some(_), _) => body.insert(0, if negative { '-' } else { ' ' }),
        (None, Some('+')) => body.push(if negative { '-' } else { '+' }),
        (None, Some(_)) => body.push(if negative { '-' } else { ' ' }),
        (None, None) if negative => body.insert(0, '-'),
        (None, None) => {}
    }
    let len = body.chars().count();
    if len > field.width {
        "*".repeat(field.width)
    } else {
        format!("{}{}", " ".repeat(field.width - len), body)
    }
}

fn group_thousands(text: &str) -> String {
    let (whole, fraction) = match text.find('.') {
        Some(index) => text.split_at(index),
        None => (text, ""),
    };
    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.push_str(fraction);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn using(format: &str, vals: &[Val]) -> String {
        format_using(format, vals).unwrap()
    }

    #[test]
    fn test_digits_and_decimals() {
        assert_eq!(using("###.##", &[Val::Real(3.14159)]), "  3.14");
        assert_eq!(using("##", &[Val::Integer(7)]), " 7");
        assert_eq!(using("##", &[Val::Integer(123)]), "**");
    }

    #[test]
    fn test_currency_and_grouping() {
        assert_eq!(using("$#,###.##", &[Val::Real(1234.5)]), "$1,234.50");
    }

    #[test]
    fn test_signs() {
        assert_eq!(using("+##", &[Val::Integer(5)]), " +5");
        assert_eq!(using("##-", &[Val::Integer(-5)]), " 5-");
        assert_eq!(using("###", &[Val::Integer(-5)]), " -5");
    }

    #[test]
    fn test_text_fields() {
        assert_eq!(using("=#####", &[Val::Text("AB".into())]), "  AB  ");
        assert_eq!(using(">###", &[Val::Text("AB".into())]), "  AB");
        assert_eq!(using("=#", &[Val::Text("ABC".into())]), "**");
    }

    #[test]
    fn test_fields_repeat_for_extra_values() {
        assert_eq!(
            using("[##]", &[Val::Integer(1), Val::Integer(2)]),
            "[ 1][ 2]"
        );
    }

    #[test]
    fn test_format_without_fields() {
        assert!(format_using("ABC", &[Val::Integer(1)]).is_err());
    }
}
