//! Canonical JSON encoding used as the input to block hashing.
//!
//! Hashes of previous blocks must be reproducible by any implementation that
//! reconstructs the same field set, so the byte layout is pinned down exactly:
//!
//! - object keys sorted lexicographically
//! - `", "` between items and `": "` between a key and its value
//! - floats in shortest round-trip form, exponent written as `e+16` / `e-07`
//! - ASCII-only output, everything outside `0x20..=0x7E` escaped as `\uXXXX`
//!
//! This is the layout produced by the widely used `sort_keys` JSON encoders
//! (Python's `json.dumps(obj, sort_keys=True)` among them), which makes
//! digests comparable across languages.

use crate::crypto::{HashWriter, Sha256Hash};
use crate::error::Result;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io;

/// `serde_json` formatter emitting the canonical layout described above.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_f64(writer, f64::from(value))
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // Quotes, backslashes and C0 controls never reach this point; serde_json
        // escapes those itself with the same short forms.
        if fragment.bytes().all(is_printable_ascii) {
            return writer.write_all(fragment.as_bytes());
        }
        for ch in fragment.chars() {
            if ch.is_ascii() && is_printable_ascii(ch as u8) {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

fn is_printable_ascii(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte)
}

/// Formats a finite float as its shortest round-trip decimal.
///
/// Plain notation is used for decimal exponents in `-4..16`; outside that
/// range the exponent carries an explicit sign and at least two digits.
/// When seventeen digits are needed, an exact tie on the last digit rounds
/// to even.
pub fn format_float(value: f64) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let (mut digits, mut exponent) = decimal_digits(&format!("{:?}", value));
    // Debug output breaks 17-digit ties upward; exact formatting does not.
    if digits.len() == 17 {
        (digits, exponent) = decimal_digits(&format!("{:.16e}", value));
    }

    let sign = if value.is_sign_negative() { "-" } else { "" };
    format!("{}{}", sign, layout_decimal(&digits, exponent))
}

/// Splits a Rust float rendering (`123.45`, `1.5e-7`, `-1.0847e11`) into its
/// significant digits and the decimal exponent of the first one.
fn decimal_digits(repr: &str) -> (String, i32) {
    let repr = repr.trim_start_matches('-');
    let (mantissa, shift) = match repr.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse::<i32>().unwrap_or(0)),
        None => (repr, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all: String = int_part.chars().chain(frac_part.chars()).collect();
    let leading_zeros = all.len() - all.trim_start_matches('0').len();
    let digits = all.trim_matches('0').to_string();
    let exponent = int_part.len() as i32 - 1 - leading_zeros as i32 + shift;
    (digits, exponent)
}

/// Places the decimal point the way Python's `repr` does.
fn layout_decimal(digits: &str, exponent: i32) -> String {
    if !(-4..16).contains(&exponent) {
        let (head, tail) = digits.split_at(1);
        let sign = if exponent < 0 { '-' } else { '+' };
        let mantissa = if tail.is_empty() {
            head.to_string()
        } else {
            format!("{}.{}", head, tail)
        };
        return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
    }

    if exponent < 0 {
        return format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits);
    }
    let int_len = exponent as usize + 1;
    if digits.len() <= int_len {
        format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
    } else {
        format!("{}.{}", &digits[..int_len], &digits[int_len..])
    }
}

/// Writes the canonical encoding of `value` into `writer`.
///
/// The value is routed through `serde_json::Value`, whose maps are ordered by
/// key, so struct field declaration order never leaks into the output.
pub fn write_canonical<T, W>(value: &T, writer: W) -> Result<()>
where
    T: Serialize + ?Sized,
    W: io::Write,
{
    let tree = serde_json::to_value(value)?;
    let mut serializer = Serializer::with_formatter(writer, CanonicalFormatter);
    tree.serialize(&mut serializer)?;
    Ok(())
}

/// Returns the canonical encoding of `value` as a string.
pub fn to_canonical_string<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    write_canonical(value, &mut buf)?;
    // The formatter only ever emits ASCII.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// SHA-256 over the canonical encoding of `value`.
pub fn digest<T>(value: &T) -> Result<Sha256Hash>
where
    T: Serialize + ?Sized,
{
    let mut writer = HashWriter::new();
    write_canonical(value, &mut writer)?;
    Ok(writer.finalize())
}
