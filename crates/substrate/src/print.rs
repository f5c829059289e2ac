//! `{T}` / `{T:K}` placeholder formatter and the `print()` dispatch that
//! writes the expanded template to standard output in one write.

use crate::bytes::{format_u64, IntFormat};
use crate::os::OsError;
use crate::string::{Str8, Str16};
use std::io::{self, Write};

/// One positional argument to [`format`]/[`print`]. The variant selects `T`;
/// an integer variant additionally accepts a `K` base override.
#[derive(Debug, Clone)]
pub enum FormatArg<'a> {
    StringOs(&'a str),
    OsCodeUnit(u32),
    String8(Str8<'a>),
    String16(Str16<'a>),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    S8(i8),
    S16(i16),
    S32(i32),
    S64(i64),
    S128(i128),
    OsErrorArg(OsError),
    StringOsList(&'a [String]),
}

/// Numeric base override for `{T:K}`.
#[derive(Debug, Clone, Copy)]
enum Base {
    Decimal,
    Binary,
    Octal,
    Hex,
}

impl Base {
    fn parse(c: &str) -> Option<Base> {
        match c {
            "d" => Some(Base::Decimal),
            "b" => Some(Base::Binary),
            "o" => Some(Base::Octal),
            "x" => Some(Base::Hex),
            _ => None,
        }
    }

    fn to_int_format(self) -> IntFormat {
        match self {
            Base::Decimal => IntFormat::Decimal,
            Base::Binary => IntFormat::Binary,
            Base::Octal => IntFormat::Octal,
            Base::Hex => IntFormat::Hex,
        }
    }
}

fn known_placeholder_type(t: &str) -> bool {
    matches!(
        t,
        "SOs" | "OsC" | "S8" | "S16" | "u8" | "u16" | "u32" | "u64" | "u128" | "s8" | "s16"
            | "s32" | "s64" | "s128" | "EOs" | "SOsL"
    )
}

fn write_int(out: &mut String, value: u64, format: IntFormat, signed: bool) {
    let mut buf = [0u8; crate::bytes::FORMAT_BUFFER_MAX];
    let written = format_u64(&mut buf, value, format, signed, false);
    out.push_str(&String::from_utf8_lossy(&buf[..written]));
}

fn render_arg(t: &str, base: Option<Base>, arg: &FormatArg<'_>, out: &mut String) {
    let format = base.map_or(IntFormat::Decimal, Base::to_int_format);

    match (t, arg) {
        ("SOs", FormatArg::StringOs(s)) => out.push_str(s),
        ("OsC", FormatArg::OsCodeUnit(c)) => {
            if let Some(ch) = char::from_u32(*c) {
                out.push(ch);
            }
        }
        ("S8", FormatArg::String8(s)) => out.push_str(&s.as_str()),
        ("S16", FormatArg::String16(s)) => {
            let utf16 = s.as_units();
            out.extend(char::decode_utf16(utf16.iter().copied()).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)));
        }
        ("u8", FormatArg::U8(v)) => write_int(out, u64::from(*v), format, false),
        ("u16", FormatArg::U16(v)) => write_int(out, u64::from(*v), format, false),
        ("u32", FormatArg::U32(v)) => write_int(out, u64::from(*v), format, false),
        ("u64", FormatArg::U64(v)) => write_int(out, *v, format, false),
        ("u128", FormatArg::U128(v)) => out.push_str(&format_u128(*v, format)),
        ("s8", FormatArg::S8(v)) => write_int(out, *v as i64 as u64, format, true),
        ("s16", FormatArg::S16(v)) => write_int(out, *v as i64 as u64, format, true),
        ("s32", FormatArg::S32(v)) => write_int(out, *v as i64 as u64, format, true),
        ("s64", FormatArg::S64(v)) => write_int(out, *v as u64, format, true),
        ("s128", FormatArg::S128(v)) => out.push_str(&format_i128(*v, format)),
        ("EOs", FormatArg::OsErrorArg(e)) => out.push_str(&e.message()),
        ("SOsL", FormatArg::StringOsList(list)) => out.push_str(&list.join(" ")),
        _ => {
            // Argument type doesn't match the placeholder's declared type;
            // render nothing rather than guess, matching a type-checked call
            // site that would never reach this state in practice.
        }
    }
}

fn format_u128(value: u128, format: IntFormat) -> String {
    match format {
        IntFormat::Decimal => format!("{value}"),
        IntFormat::Hex => format!("{value:x}"),
        IntFormat::Octal => format!("{value:o}"),
        IntFormat::Binary => format!("{value:b}"),
    }
}

fn format_i128(value: i128, format: IntFormat) -> String {
    match format {
        IntFormat::Decimal => format!("{value}"),
        IntFormat::Hex => format!("{value:x}"),
        IntFormat::Octal => format!("{value:o}"),
        IntFormat::Binary => format!("{value:b}"),
    }
}

/// Expands `template`'s `{T}`/`{T:K}` placeholders against `args`, consumed
/// in order. Unknown placeholders are emitted verbatim including the braces.
#[must_use]
pub fn format(template: &str, args: &[FormatArg<'_>]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    let mut arg_index = 0usize;

    while let Some((start, c)) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let Some(end) = template[start..].find('}').map(|i| start + i) else {
            out.push('{');
            continue;
        };
        let inner = &template[start + 1..end];
        let (t, base) = match inner.split_once(':') {
            Some((t, k)) => (t, Base::parse(k)),
            None => (inner, None),
        };

        if known_placeholder_type(t) && arg_index < args.len() {
            render_arg(t, base, &args[arg_index], &mut out);
            arg_index += 1;
        } else {
            out.push_str(&template[start..=end]);
        }

        // Advance the outer iterator past the consumed placeholder.
        while let Some(&(idx, _)) = chars.peek() {
            if idx > end {
                break;
            }
            chars.next();
        }
    }

    out
}

/// Writes `format(template, args)` to standard output in a single write,
/// matching the "buffer per call, write once" contract.
pub fn print(template: &str, args: &[FormatArg<'_>]) -> io::Result<()> {
    let rendered = format(template, args);
    io::stdout().write_all(rendered.as_bytes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_placeholder_defaults_to_decimal() {
        let rendered = format("value={u32}", &[FormatArg::U32(42)]);
        assert_eq!(rendered, "value=42");
    }

    #[test]
    fn base_override_selects_hex() {
        let rendered = format("byte={u8:x}", &[FormatArg::U8(255)]);
        assert_eq!(rendered, "byte=ff");
    }

    #[test]
    fn unknown_placeholder_is_verbatim() {
        let rendered = format("{Nope}", &[]);
        assert_eq!(rendered, "{Nope}");
    }

    #[test]
    fn signed_negative_renders_with_sign() {
        let rendered = format("{s32}", &[FormatArg::S32(-5)]);
        assert_eq!(rendered, "-5");
    }

    #[test]
    fn string_os_list_joins_with_spaces() {
        let list = vec!["clang".to_string(), "-o".to_string(), "out".to_string()];
        let rendered = format("{SOsL}", &[FormatArg::StringOsList(&list)]);
        assert_eq!(rendered, "clang -o out");
    }
}
