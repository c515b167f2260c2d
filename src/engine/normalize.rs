//! Formula normalizer: one raw expression to canonical evaluator-ready text.

use regex::{Captures, Regex};

/// Normalize a raw DSL expression.
///
/// Maps window-function aliases to canonical markers, rewrites bracket
/// offsets on base series into `offset(series, n)` calls, strips
/// presentation-only directives, and canonicalizes base-series and scalar
/// function casing. Def-to-def references are left untouched; resolving
/// them is the materializer's job.
pub fn normalize(expr: &str) -> String {
    let text = strip_directives(expr);
    let text = map_aliases(&text);
    let text = rewrite_bracket_offsets(&text);
    let text = canonicalize_names(&text);
    text.trim().to_string()
}

/// Remove color/line-weight/paint-strategy setters, `declare` statements,
/// and label/alert annotations. None of these have a numeric effect.
fn strip_directives(expr: &str) -> String {
    let method_re = Regex::new(
        r"(?i)\.\s*(setdefaultcolor|setlineweight|setpaintingstrategy|setstyle|hidebubble|hidetitle)\s*\([^)]*\)",
    )
    .unwrap();
    let declare_re = Regex::new(r"(?i)\bdeclare\s+\w+").unwrap();
    let annotation_re = Regex::new(r"(?i)\b(addlabel|alert)\s*\([^)]*\)").unwrap();

    let text = method_re.replace_all(expr, "");
    let text = declare_re.replace_all(&text, "");
    annotation_re.replace_all(&text, "").into_owned()
}

/// Map DSL aliases to canonical window-function markers and canonical
/// scalar-function names.
fn map_aliases(expr: &str) -> String {
    let alias_re = Regex::new(
        r"(?i)\b(simplemovingavg|average|highest|lowest|absvalue|power|abs|min|max|log|sqrt|pow|floor|ceil|round)\s*\(",
    )
    .unwrap();
    alias_re
        .replace_all(expr, |caps: &Captures| {
            let canonical = match caps[1].to_ascii_lowercase().as_str() {
                "simplemovingavg" | "average" => "sma",
                "highest" => "highest",
                "lowest" => "lowest",
                "absvalue" => "abs",
                "power" => "pow",
                other => return format!("{}(", other),
            };
            format!("{}(", canonical)
        })
        .into_owned()
}

/// Rewrite `SERIES[N]` (fixed base-series names only, case-insensitive)
/// into an `offset(series, N)` accessor call.
fn rewrite_bracket_offsets(expr: &str) -> String {
    let offset_re = Regex::new(
        r"(?i)\b(open|high|low|close|volume|oi|delta|gamma|theo|mark|ask|bid)\s*\[\s*(\d+)\s*\]",
    )
    .unwrap();
    offset_re
        .replace_all(expr, |caps: &Captures| {
            format!("offset({}, {})", caps[1].to_ascii_lowercase(), &caps[2])
        })
        .into_owned()
}

/// Canonicalize base-series name casing.
fn canonicalize_names(expr: &str) -> String {
    let series_re = Regex::new(
        r"(?i)\b(open|high|low|close|volume|oi|delta|gamma|theo|mark|ask|bid)\b",
    )
    .unwrap();
    series_re
        .replace_all(expr, |caps: &Captures| caps[1].to_ascii_lowercase())
        .into_owned()
}
