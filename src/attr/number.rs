/// Split a leading SVG number (`[+-]digits[.digits][e[+-]digits]`) from `s`.
pub(crate) fn split_number(s: &str) -> Option<(f64, &str)> {
    let b = s.as_bytes();
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < b.len() && b[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return None;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    let v: f64 = s[..i].parse().ok()?;
    v.is_finite().then_some((v, &s[i..]))
}

/// A single number with nothing else but whitespace around it.
pub fn parse_number(s: &str) -> Option<f64> {
    let (v, rest) = split_number(s.trim())?;
    rest.is_empty().then_some(v)
}

/// Comma and/or whitespace separated numbers. Stops at the first token that is not a number.
pub fn parse_number_list(s: &str) -> Vec<f64> {
    let mut out = Vec::new();
    let mut rest = s;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        match split_number(rest) {
            Some((v, r)) => {
                out.push(v);
                rest = r;
            }
            None => break,
        }
    }
    out
}

/// `<number> [<number>]`; the second value defaults to the first.
pub fn parse_number_optional_number(s: &str) -> Option<(f64, f64)> {
    match parse_number_list(s).as_slice() {
        [a] => Some((*a, *a)),
        [a, b] => Some((*a, *b)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/attr/number.rs"]
mod tests;
