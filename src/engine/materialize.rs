//! Dependency-aware series materializer.
//!
//! Resolves def-to-def references with DFS coloring, drives the
//! aggregation expander and expression evaluator, and memoizes every
//! computed series. All state is local to one (symbol, request) pair;
//! nothing is shared across concurrent scans.

use crate::engine::error::EngineError;
use crate::engine::eval::{self, EvalContext, Expr, SeriesLookup};
use crate::engine::expand;
use crate::engine::normalize::normalize;
use crate::models::candle::{series_matrix, Candle};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::warn;

pub struct Materializer<'a> {
    base: HashMap<String, Vec<f64>>,
    defs: &'a HashMap<String, String>,
    len: usize,
    /// Materialized def/plot series.
    cache: HashMap<String, Vec<f64>>,
    /// Anonymous series created while expanding window-function calls.
    temps: HashMap<String, Vec<f64>>,
    /// Canonical expression key -> temp name, shared across this pass.
    memo: HashMap<String, String>,
    /// DFS coloring: names on the active recursion stack.
    in_progress: HashSet<String>,
    /// Names whose formulas failed to compile; extraction reports null.
    failed: HashSet<String>,
    temp_counter: usize,
}

impl<'a> Materializer<'a> {
    pub fn new(candles: &[Candle], defs: &'a HashMap<String, String>) -> Self {
        Self {
            base: series_matrix(candles),
            defs,
            len: candles.len(),
            cache: HashMap::new(),
            temps: HashMap::new(),
            memo: HashMap::new(),
            in_progress: HashSet::new(),
            failed: HashSet::new(),
            temp_counter: 0,
        }
    }

    pub fn series_len(&self) -> usize {
        self.len
    }

    /// Whether a name's formula failed to compile or evaluate.
    pub fn is_failed(&self, name: &str) -> bool {
        self.failed.contains(name)
    }

    /// Materialize a name into its full length-N series.
    ///
    /// Memoized. Cycles are broken by binding the revisited name to a
    /// zero-filled series; compile failures zero-fill the one name and are
    /// recorded, leaving sibling materializations unaffected. Unknown
    /// names resolve to a base series when one matches, else to constant
    /// zero. This method never errors: batch scans stay resilient to
    /// partial scripts.
    pub fn materialize(&mut self, name: &str) -> Vec<f64> {
        if let Some(series) = self.cache.get(name) {
            return series.clone();
        }
        if !self.defs.contains_key(name) {
            if let Some(series) = self.base.get(name) {
                return series.clone();
            }
            return vec![0.0; self.len];
        }
        if self.in_progress.contains(name) {
            warn!(
                name = %name,
                "circular dependency detected, binding zero-filled series"
            );
            let zeros = vec![0.0; self.len];
            self.cache.insert(name.to_string(), zeros.clone());
            return zeros;
        }

        self.in_progress.insert(name.to_string());
        let result = self.materialize_def(name);
        self.in_progress.remove(name);

        let series = match result {
            Ok(series) => series,
            Err(e) => {
                warn!(
                    name = %name,
                    error = %e,
                    "formula failed, binding zero-filled series"
                );
                self.failed.insert(name.to_string());
                vec![0.0; self.len]
            }
        };
        self.cache.insert(name.to_string(), series.clone());
        series
    }

    fn materialize_def(&mut self, name: &str) -> Result<Vec<f64>, EngineError> {
        let raw = self.defs.get(name).cloned().unwrap_or_default();
        let normalized = normalize(&raw);

        // Every def referenced as a whole word is a dependency and must be
        // fully materialized first. A def naming itself recurses into the
        // in-progress check above, which breaks the cycle.
        for dep in self.dependencies_of(&normalized) {
            self.materialize(&dep);
        }

        let flat = expand::expand_aggregations(&normalized, self)?;
        let ast = eval::compile(&flat).map_err(|e| EngineError::CompileError {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.evaluate_series(&ast)
    }

    fn dependencies_of(&self, text: &str) -> Vec<String> {
        let mut deps: Vec<String> = self
            .defs
            .keys()
            .filter(|dep| whole_word_match(text, dep))
            .cloned()
            .collect();
        // deterministic materialization order
        deps.sort();
        deps
    }

    fn evaluate_series(&self, ast: &Expr) -> Result<Vec<f64>, EngineError> {
        let mut out = Vec::with_capacity(self.len);
        for index in 0..self.len {
            let ctx = EvalContext {
                lookup: self,
                index,
            };
            out.push(eval::eval(ast, &ctx)?);
        }
        Ok(out)
    }

    /// Materialize an arbitrary sub-expression into a named series and
    /// return that name. Direct references to known series are returned
    /// as-is; anything else is expanded, evaluated at every index, and
    /// interned as a temp series, memoized by canonical token stream.
    pub(crate) fn series_for_expression(&mut self, text: &str) -> Result<String, EngineError> {
        let trimmed = text.trim();
        if is_identifier(trimmed) {
            if self.defs.contains_key(trimmed) {
                self.materialize(trimmed);
                return Ok(trimmed.to_string());
            }
            if self.base.contains_key(trimmed) || self.temps.contains_key(trimmed) {
                return Ok(trimmed.to_string());
            }
            // unknown names bind to constant zero, never an error
            let zeros = vec![0.0; self.len];
            return Ok(self.intern_temp(zeros));
        }

        let key = eval::canonical_key(trimmed)?;
        if let Some(temp) = self.memo.get(&key) {
            return Ok(temp.clone());
        }
        let flat = expand::expand_aggregations(trimmed, self)?;
        let ast = eval::compile(&flat)?;
        let series = self.evaluate_series(&ast)?;
        let temp = self.intern_temp(series);
        self.memo.insert(key, temp.clone());
        Ok(temp)
    }

    /// Evaluate an expression once as a constant, at the latest index.
    /// Window-function lookbacks are resolved through this and are never
    /// time-varying.
    pub(crate) fn eval_scalar(&self, text: &str) -> Result<f64, EngineError> {
        let ast = eval::compile(text.trim())?;
        let ctx = EvalContext {
            lookup: self,
            index: self.len.saturating_sub(1),
        };
        eval::eval(&ast, &ctx)
    }

    /// Current values for a named series, zero-filled when unknown.
    pub(crate) fn series_values(&self, name: &str) -> Vec<f64> {
        self.series(name)
            .map(|s| s.to_vec())
            .unwrap_or_else(|| vec![0.0; self.len])
    }

    pub(crate) fn intern_temp(&mut self, series: Vec<f64>) -> String {
        let name = format!("__series{}", self.temp_counter);
        self.temp_counter += 1;
        self.temps.insert(name.clone(), series);
        name
    }

    pub(crate) fn memo_get(&self, key: &str) -> Option<String> {
        self.memo.get(key).cloned()
    }

    pub(crate) fn memo_insert(&mut self, key: String, temp: String) {
        self.memo.insert(key, temp);
    }
}

impl SeriesLookup for Materializer<'_> {
    fn series(&self, name: &str) -> Option<&[f64]> {
        self.temps
            .get(name)
            .or_else(|| self.cache.get(name))
            .or_else(|| self.base.get(name))
            .map(|v| v.as_slice())
    }
}

fn whole_word_match(text: &str, word: &str) -> bool {
    Regex::new(&format!(r"\b{}\b", regex::escape(word)))
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
