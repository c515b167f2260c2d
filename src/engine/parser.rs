//! Script parser: raw study text to inputs, defs, and ordered plots.

use crate::models::script::{InputDecl, ParsedScript, PlotDecl};
use regex::Regex;
use std::collections::HashMap;

/// Parse a study script into its declarations.
///
/// Comments are stripped and `and`/`or` keywords rewritten before any
/// declaration is extracted. Input names are substituted whole-word
/// throughout the remaining text, with caller overrides taking precedence
/// over declared defaults. Each plot is also registered as a def so later
/// statements may reference earlier plot output. Malformed declarations
/// are skipped without recovery.
pub fn parse_script(source: &str, overrides: &HashMap<String, String>) -> ParsedScript {
    let text = strip_comments(source);
    let text = rewrite_keywords(&text);

    let (text, inputs) = extract_inputs(&text, overrides);

    let decl_re = Regex::new(r"(?i)\b(def|plot)\s+(\w+)\s*=\s*([^;]+);").unwrap();
    let mut defs: HashMap<String, String> = HashMap::new();
    let mut plots: Vec<PlotDecl> = Vec::new();

    for cap in decl_re.captures_iter(&text) {
        let kind = cap[1].to_ascii_lowercase();
        let name = cap[2].to_string();
        let expression = cap[3].trim().to_string();

        defs.insert(name.clone(), expression.clone());
        if kind == "plot" {
            plots.push(PlotDecl { name, expression });
        }
    }

    ParsedScript {
        inputs,
        defs,
        plots,
    }
}

/// Remove `//` line comments and `/* */` block comments, normalizing line
/// endings. Comment bodies are replaced with a space so adjacent tokens
/// stay separated.
fn strip_comments(source: &str) -> String {
    let source = source.replace("\r\n", "\n");
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Rewrite whole-word `and`/`or` to `&&`/`||`. Word-boundary matching only,
/// so identifiers like `band` survive.
fn rewrite_keywords(text: &str) -> String {
    let and_re = Regex::new(r"(?i)\band\b").unwrap();
    let or_re = Regex::new(r"(?i)\bor\b").unwrap();
    let text = and_re.replace_all(text, "&&");
    or_re.replace_all(&text, "||").into_owned()
}

/// Extract `input NAME = VALUE;` declarations in order and substitute every
/// input name, whole-word, with its effective value in the remaining text.
fn extract_inputs(
    text: &str,
    overrides: &HashMap<String, String>,
) -> (String, Vec<InputDecl>) {
    let input_re = Regex::new(r"(?i)\binput\s+(\w+)\s*=\s*([^;]+);").unwrap();

    let mut inputs = Vec::new();
    for cap in input_re.captures_iter(text) {
        inputs.push(InputDecl {
            name: cap[1].to_string(),
            default: cap[2].trim().to_string(),
        });
    }

    let mut remaining = input_re.replace_all(text, "").into_owned();
    for input in &inputs {
        let effective = overrides
            .get(&input.name)
            .map(|s| s.as_str())
            .unwrap_or(&input.default);
        let name_re = Regex::new(&format!(r"\b{}\b", regex::escape(&input.name))).unwrap();
        remaining = name_re.replace_all(&remaining, effective).into_owned();
    }

    (remaining, inputs)
}
