//! Aggregation expander: rewrites nested window-function calls into flat
//! expressions over materialized temp series.

use crate::engine::error::EngineError;
use crate::engine::eval;
use crate::engine::materialize::Materializer;

/// A window aggregate over a trailing span of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFn {
    Sma,
    Highest,
    Lowest,
}

impl WindowFn {
    fn marker(self) -> &'static str {
        match self {
            WindowFn::Sma => "sma",
            WindowFn::Highest => "highest",
            WindowFn::Lowest => "lowest",
        }
    }
}

#[derive(Debug)]
struct CallSite {
    func: WindowFn,
    start: usize,
    open: usize,
    close: usize,
}

/// Replace every window-function call site in `text` with the name of a
/// freshly materialized temp series.
///
/// Sites are processed rightmost-first so a replacement never shifts the
/// span of an unprocessed site. Each call's input sub-expression is
/// recursively materialized (bottoming out at base series or constants)
/// before the window is applied, so nested aggregations always see a fully
/// computed inner series. Identical call text is computed once per pass.
pub fn expand_aggregations(
    text: &str,
    mat: &mut Materializer,
) -> Result<String, EngineError> {
    let mut out = text.to_string();
    while let Some(site) = rightmost_call_site(&out)? {
        let call_text = out[site.start..=site.close].to_string();
        let key = eval::canonical_key(&call_text)?;

        let temp = match mat.memo_get(&key) {
            Some(temp) => temp,
            None => {
                let args = split_top_level_args(&out[site.open + 1..site.close]);
                if args.len() < 2 {
                    return Err(EngineError::EvalError(format!(
                        "{} expects an input and a lookback length",
                        site.func.marker()
                    )));
                }
                let length = resolve_length(mat, &args[1])?;
                let shift = match args.get(2) {
                    Some(arg) => resolve_shift(mat, arg)?,
                    None => 0,
                };

                let input_name = mat.series_for_expression(&args[0])?;
                let input = mat.series_values(&input_name);
                let windowed = apply_window(site.func, &input, length, shift);
                let temp = mat.intern_temp(windowed);
                mat.memo_insert(key, temp.clone());
                temp
            }
        };

        out.replace_range(site.start..=site.close, &temp);
    }
    Ok(out)
}

/// Apply a window function at every index. Windows clip to available
/// history near the series start; missing history is never treated as
/// zero. `shift` moves the window end that many bars back, clamped at 0.
pub fn apply_window(func: WindowFn, input: &[f64], length: usize, shift: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(input.len());
    for i in 0..input.len() {
        let end = i.saturating_sub(shift);
        let lo = (end + 1).saturating_sub(length);
        let window = &input[lo..=end];
        let value = match func {
            WindowFn::Sma => window.iter().sum::<f64>() / window.len() as f64,
            WindowFn::Highest => window.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            WindowFn::Lowest => window.iter().copied().fold(f64::INFINITY, f64::min),
        };
        out.push(value);
    }
    out
}

/// Find the rightmost window-function call site, scanning with balanced
/// parentheses so nested parens in arguments are not mistaken for the
/// call's own close.
fn rightmost_call_site(text: &str) -> Result<Option<CallSite>, EngineError> {
    let bytes = text.as_bytes();
    let mut best: Option<CallSite> = None;

    for func in [WindowFn::Sma, WindowFn::Highest, WindowFn::Lowest] {
        let marker = func.marker();
        let mut from = 0;
        while let Some(found) = text[from..].find(marker) {
            let start = from + found;
            from = start + 1;

            // whole-word occurrences only
            if start > 0 {
                let prev = bytes[start - 1];
                if prev.is_ascii_alphanumeric() || prev == b'_' {
                    continue;
                }
            }
            let mut j = start + marker.len();
            if j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                continue;
            }
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j >= bytes.len() || bytes[j] != b'(' {
                continue;
            }

            let open = j;
            let close = matching_paren(text, open).ok_or_else(|| {
                EngineError::EvalError(format!(
                    "unbalanced parentheses in {} call",
                    marker
                ))
            })?;

            if best.as_ref().map(|b| start > b.start).unwrap_or(true) {
                best = Some(CallSite {
                    func,
                    start,
                    open,
                    close,
                });
            }
        }
    }
    Ok(best)
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split an argument list at top-level commas only.
fn split_top_level_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in args.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                out.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() || !out.is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

/// A lookback length is evaluated immediately as a constant; it is never
/// time-varying.
fn resolve_length(mat: &Materializer, text: &str) -> Result<usize, EngineError> {
    let value = mat.eval_scalar(text)?;
    if !value.is_finite() {
        return Err(EngineError::EvalError(format!(
            "lookback length `{}` is not finite",
            text.trim()
        )));
    }
    let length = value.round();
    if length < 1.0 {
        return Err(EngineError::EvalError(format!(
            "lookback length `{}` must be at least 1",
            text.trim()
        )));
    }
    Ok(length as usize)
}

fn resolve_shift(mat: &Materializer, text: &str) -> Result<usize, EngineError> {
    let value = mat.eval_scalar(text)?;
    if !value.is_finite() {
        return Err(EngineError::EvalError(format!(
            "window offset `{}` is not finite",
            text.trim()
        )));
    }
    Ok(value.round().max(0.0) as usize)
}
