//! Parsed study-script structure.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An `input NAME = VALUE;` declaration, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDecl {
    pub name: String,
    /// Declared default, as raw text. The effective value is the caller
    /// override when one is supplied.
    pub default: String,
}

/// A named, user-visible output expression. Every plot is also registered
/// as a def under the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotDecl {
    pub name: String,
    pub expression: String,
}

/// Result of parsing one study script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedScript {
    /// Input declarations in source order, with their declared defaults.
    pub inputs: Vec<InputDecl>,
    /// Raw expressions by name. Plots are included so later defs and plots
    /// may reference earlier plot output.
    pub defs: HashMap<String, String>,
    /// The ordered user-visible plot list.
    pub plots: Vec<PlotDecl>,
}

impl ParsedScript {
    pub fn def(&self, name: &str) -> Option<&str> {
        self.defs.get(name).map(|s| s.as_str())
    }
}
