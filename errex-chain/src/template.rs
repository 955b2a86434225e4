//! printf-style substitution for template nodes
//!
//! A directive is `%[flags][width][.precision]verb`, each consuming one
//! argument. Supported verbs:
//!
//! - `%s`, `%v`: the argument's `Display` form; precision truncates it
//! - `%d`: the `Display` form; `+` forces a sign on numbers
//! - `%q`: the `Display` form, double-quoted and escaped
//! - `%x`, `%X`: integers in hex, anything else as hex-encoded bytes
//! - `%f`, `%F`: the argument parsed as a float, precision 6 by default
//!
//! Flags are `-` (pad on the right), `0` (pad numbers with zeros) and `+`.
//! `%%` is a literal percent sign. Arguments are only known through
//! `Display`, so `%x` and `%f` parse that text and `*` widths are not
//! supported. Nothing here fails: a mismatch between verbs and arguments is
//! written into the output in a recognizable form (`%!s(MISSING)`,
//! `%!(EXTRA ...)`, `%!f(abc)`) and logged at debug level.

use std::fmt::{Display, Write};
use std::iter::Peekable;
use std::str::Chars;

use tracing::debug;

/// Flags, width and precision of one directive
#[derive(Debug, Default, PartialEq)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

impl Spec {
    fn parse(chars: &mut Peekable<Chars<'_>>) -> Self {
        let mut spec = Spec::default();
        while let Some(&c) = chars.peek() {
            match c {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = take_number(chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(chars).unwrap_or(0));
        }
        spec
    }

    /// Pad `body` to the width; zero padding goes after any sign.
    fn pad(&self, body: String, numeric: bool) -> String {
        let len = body.chars().count();
        let Some(width) = self.width.filter(|&w| w > len) else {
            return body;
        };
        let fill = width - len;
        if self.left {
            format!("{}{}", body, " ".repeat(fill))
        } else if self.zero && numeric {
            let sign_len = if body.starts_with(['-', '+']) { 1 } else { 0 };
            let (sign, digits) = body.split_at(sign_len);
            format!("{}{}{}", sign, "0".repeat(fill), digits)
        } else {
            format!("{}{}", " ".repeat(fill), body)
        }
    }

    fn sign(&self, body: String) -> String {
        if self.plus && !body.starts_with('-') {
            format!("+{}", body)
        } else {
            body
        }
    }
}

fn take_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        number = Some(number.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
    }
    number
}

/// Format one argument, or `None` if the verb does not apply to it.
fn format_arg(verb: char, spec: &Spec, arg: &dyn Display) -> Option<String> {
    let text = arg.to_string();
    let formatted = match verb {
        's' | 'v' => {
            let body = match spec.precision {
                Some(precision) => text.chars().take(precision).collect(),
                None => text,
            };
            spec.pad(body, false)
        }
        'd' => {
            let numeric = text.parse::<f64>().is_ok();
            let body = if numeric { spec.sign(text) } else { text };
            spec.pad(body, numeric)
        }
        'q' => spec.pad(format!("{:?}", text), false),
        'x' | 'X' => {
            let body = match text.parse::<i128>() {
                Ok(n) if n < 0 => format!("-{:x}", n.unsigned_abs()),
                Ok(n) => format!("{:x}", n),
                Err(_) => text.bytes().map(|b| format!("{:02x}", b)).collect(),
            };
            let body = if verb == 'X' { body.to_uppercase() } else { body };
            spec.pad(body, true)
        }
        'f' | 'F' => {
            let value = text.parse::<f64>().ok()?;
            let body = format!("{:.*}", spec.precision.unwrap_or(6), value);
            spec.pad(spec.sign(body), true)
        }
        _ => return None,
    };
    Some(formatted)
}

/// Format `template` with `args`.
pub(crate) fn format_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut pending = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let spec = Spec::parse(&mut chars);
        let Some(verb) = chars.next() else {
            debug!(template, "template ends inside a directive");
            out.push_str("%!(NOVERB)");
            break;
        };

        let Some(arg) = pending.next() else {
            debug!(template, %verb, "template verb has no argument");
            let _ = write!(out, "%!{}(MISSING)", verb);
            continue;
        };

        match format_arg(verb, &spec, *arg) {
            Some(formatted) => out.push_str(&formatted),
            None => {
                debug!(template, %verb, "template verb does not apply to argument");
                let _ = write!(out, "%!{}({})", verb, arg);
            }
        }
    }

    let extra: Vec<String> = pending.map(|arg| arg.to_string()).collect();
    if !extra.is_empty() {
        debug!(template, count = extra.len(), "unused template arguments");
        let _ = write!(out, "%!(EXTRA {})", extra.join(", "));
    }

    out
}

/// Stringify and concatenate `args`, used when the node being filled is not a template.
pub(crate) fn concat_args(args: &[&dyn Display]) -> String {
    args.iter().map(|arg| arg.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_verbs_in_order() {
        assert_eq!(format_template("sub%s", &[&"1"]), "sub1");
        assert_eq!(format_template("v=%d", &[&7]), "v=7");
        assert_eq!(
            format_template("%s failed after %d tries", &[&"connect", &3]),
            "connect failed after 3 tries"
        );
        assert_eq!(format_template("value %v", &[&1.5]), "value 1.5");
    }

    #[test]
    fn test_quoted_verb() {
        assert_eq!(format_template("key %q", &[&"a b"]), "key \"a b\"");
    }

    #[test]
    fn test_literal_percent() {
        assert_eq!(format_template("100%% of %s", &[&"disk"]), "100% of disk");
        assert_eq!(format_template("no verbs", &[]), "no verbs");
    }

    #[test]
    fn test_missing_argument() {
        assert_eq!(format_template("%s and %s", &[&"a"]), "a and %!s(MISSING)");
        assert_eq!(format_template("%d", &[]), "%!d(MISSING)");
    }

    #[test]
    fn test_extra_arguments() {
        assert_eq!(format_template("%s", &[&"a", &"b", &2]), "a%!(EXTRA b, 2)");
        assert_eq!(format_template("plain", &[&"x"]), "plain%!(EXTRA x)");
    }

    #[test]
    fn test_unknown_verb_and_trailing_percent() {
        assert_eq!(format_template("%z", &[&255]), "%!z(255)");
        assert_eq!(format_template("50%", &[]), "50%!(NOVERB)");
        assert_eq!(format_template("50%-5", &[]), "50%!(NOVERB)");
    }

    #[test]
    fn test_width_and_flags() {
        assert_eq!(format_template("[%5d]", &[&7]), "[    7]");
        assert_eq!(format_template("[%-10s]", &[&"left"]), "[left      ]");
        assert_eq!(format_template("[%05d]", &[&42]), "[00042]");
        assert_eq!(format_template("[%05d]", &[&-42]), "[-0042]");
        assert_eq!(format_template("[%+d]", &[&5]), "[+5]");
        assert_eq!(format_template("[%05s]", &[&"ab"]), "[   ab]");
        assert_eq!(format_template("[%2s]", &[&"longer"]), "[longer]");
    }

    #[test]
    fn test_precision() {
        assert_eq!(format_template("%.2f", &[&1.23456]), "1.23");
        assert_eq!(format_template("%f", &[&1.5]), "1.500000");
        assert_eq!(format_template("%8.3f|", &[&-2.5]), "  -2.500|");
        assert_eq!(format_template("%.3s", &[&"abcdef"]), "abc");
        assert_eq!(format_template("%.f", &[&2.6]), "3");
    }

    #[test]
    fn test_hex() {
        assert_eq!(format_template("%x", &[&255]), "ff");
        assert_eq!(format_template("%X", &[&255]), "FF");
        assert_eq!(format_template("%x", &[&-255]), "-ff");
        assert_eq!(format_template("%04x", &[&10]), "000a");
        assert_eq!(format_template("%x", &[&"hi"]), "6869");
    }

    #[test]
    fn test_verb_not_applicable() {
        assert_eq!(format_template("%f", &[&"abc"]), "%!f(abc)");
        assert_eq!(format_template("%d items", &[&"some"]), "some items");
    }

    #[test]
    fn test_concat_args() {
        assert_eq!(concat_args(&[&"test"]), "test");
        assert_eq!(concat_args(&[&"a", &1, &"b"]), "a1b");
        assert_eq!(concat_args(&[]), "");
    }
}
