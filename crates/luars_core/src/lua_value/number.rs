//! Number <-> text conversions used by display and string coercion.

use crate::lua_value::LuaValue;

/// Format a float the way C's `printf("%.14g")` does.
pub fn format_float(n: f64) -> String {
    if n.is_nan() {
        return if n.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if n.is_infinite() {
        return if n < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    const PRECISION: i32 = 14;
    // Rounding to 14 significant digits decides the exponent
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, n);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= PRECISION {
        let mantissa = trim_fraction(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp).max(0) as usize;
        let fixed = format!("{:.*}", decimals, n);
        trim_fraction(&fixed).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Parse a Lua numeric literal as found in a coercible string.
///
/// Accepts surrounding whitespace, an optional sign, decimal integers and
/// floats with exponents, hexadecimal integers and hexadecimal floats.
/// Returns `None` when the text is not a number.
pub fn str_to_number(s: &str) -> Option<LuaValue> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (negative, rest) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    if rest.starts_with("0x") || rest.starts_with("0X") {
        let hex_part = &rest[2..];
        if hex_part.is_empty() {
            return None;
        }
        if hex_part.contains(['.', 'p', 'P']) {
            let f = parse_hex_float(hex_part)?;
            return Some(LuaValue::float(if negative { -f } else { f }));
        }
        // hex integers wrap around on overflow
        let mut acc: u64 = 0;
        for ch in hex_part.chars() {
            let digit = ch.to_digit(16)?;
            acc = acc.wrapping_mul(16).wrapping_add(digit as u64);
        }
        let i = acc as i64;
        return Some(LuaValue::integer(if negative { i.wrapping_neg() } else { i }));
    }

    if rest.is_empty()
        || !rest
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }

    if !rest.contains(['.', 'e', 'E']) {
        if let Ok(i) = s.parse::<i64>() {
            return Some(LuaValue::integer(i));
        }
    }

    // Floats, and decimal integers too large for i64
    s.parse::<f64>().ok().map(LuaValue::float)
}

/// Parse the digits of a hexadecimal float after the `0x` prefix,
/// e.g. `1.8p+1` = 3.0.
fn parse_hex_float(s: &str) -> Option<f64> {
    let (mantissa_str, exp_str) = match s.find(['p', 'P']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };

    let mut mantissa = 0.0f64;
    let mut found_dot = false;
    let mut any_digit = false;
    let mut fraction_digits = 0i32;

    for ch in mantissa_str.chars() {
        if ch == '.' {
            if found_dot {
                return None;
            }
            found_dot = true;
        } else {
            let digit = ch.to_digit(16)?;
            any_digit = true;
            mantissa = mantissa * 16.0 + digit as f64;
            if found_dot {
                fraction_digits += 1;
            }
        }
    }
    if !any_digit {
        return None;
    }

    let exponent: i32 = match exp_str {
        Some(e) if e.is_empty() => return None,
        Some(e) => e.parse().ok()?,
        None => 0,
    };

    Some(mantissa * 2.0f64.powi(exponent - 4 * fraction_digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(1.0 / 3.0), "0.33333333333333");
        assert_eq!(format_float(1e14), "1e+14");
        assert_eq!(format_float(123456789012346.0), "1.2345678901235e+14");
        assert_eq!(format_float(12345678901234.0), "12345678901234");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(0.0), "0");
    }

    #[test]
    fn test_str_to_number() {
        assert_eq!(str_to_number("42"), Some(LuaValue::integer(42)));
        assert_eq!(str_to_number("  -7  "), Some(LuaValue::integer(-7)));
        assert_eq!(str_to_number("0x10"), Some(LuaValue::integer(16)));
        assert_eq!(str_to_number("1.5"), Some(LuaValue::float(1.5)));
        assert_eq!(str_to_number("1e2"), Some(LuaValue::float(100.0)));
        assert_eq!(str_to_number("0x1.8p1"), Some(LuaValue::float(3.0)));
        assert_eq!(str_to_number(""), None);
        assert_eq!(str_to_number("abc"), None);
        assert_eq!(str_to_number("inf"), None);
        assert_eq!(str_to_number("nan"), None);
        assert_eq!(str_to_number("0x"), None);
        assert_eq!(str_to_number("1 2"), None);
    }
}
