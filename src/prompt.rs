//! Layered prompt builder for the decision engine.
//!
//! Prompts are assembled from plain-text template fragments stored under the
//! configured prompts directory (default `config/prompts/`). Each layer is
//! appended in order; a missing file is skipped, or replaced by a built-in
//! fallback where one exists, so the service stays functional with no config
//! directory at all.
//!
//! Variable substitution uses `{{key}}` syntax and is applied once at
//! [`build()`](PromptBuilder::build) time, after all layers are joined.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::alert::TradeAlert;

const SEPARATOR: &str = "\n\n";

/// System message sent with every completion when `system.md` is absent.
pub const FALLBACK_SYSTEM: &str =
    "You output trading decisions with strict risk levels. No extra words.";

/// Decision rules used when `decision_rules.md` is absent.
///
/// The `{{snapshot}}` placeholder receives the rendered market snapshot block.
const FALLBACK_RULES: &str = r#"You are my trade decision engine for GOLD on 15m.

Follow ONLY these rules:

RULE 1: BUY
- Bullish continuation if price broke and is holding ABOVE 4060.397 (resistance).
- Entry after retest and confirmation above that level (example: 4062+).
- Stop below 4030.
- Take profit 4090.
We only output BUY if that condition is active now.

RULE 2: SELL
- Bearish move if price FAILED to hold above 4060.397 and formed a lower high under it.
- Expect move down toward 3986.
- Entry around 4030.
- Stop above 4062.
- Take profit 3986.
We only output SELL if that condition is active now.

RULE 3: WAIT
- If neither clean setup is active, output WAIT.
- WAIT if price is just ranging between 4030 and 4060 with no control.

{{snapshot}}

OUTPUT FORMAT:
Return exactly ONE LINE in one of these formats:
1) "BUY | entry: #### | stop: #### | tp: ####"
2) "SELL | entry: #### | stop: #### | tp: ####"
3) "WAIT | reason: ....""#;

/// Fluent builder that assembles a layered prompt from template files.
pub struct PromptBuilder {
    prompts_dir: PathBuf,
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    /// Create a builder rooted at `prompts_dir` (e.g. `"config/prompts"`).
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            parts: Vec::new(),
            vars: HashMap::new(),
        }
    }

    /// Append a layer by loading `filename` from the prompts directory.
    /// Silently skips the layer when the file does not exist.
    pub fn layer(mut self, filename: &str) -> Self {
        let path = self.prompts_dir.join(filename);
        match fs::read_to_string(&path) {
            Ok(text) => {
                let trimmed = text.trim().to_string();
                if !trimmed.is_empty() {
                    self.parts.push(trimmed);
                }
            }
            Err(_) => {
                tracing::debug!("prompt: layer '{}' not found — skipped", path.display());
            }
        }
        self
    }

    /// Append a layer from `filename`, falling back to `fallback` text when
    /// the file is missing or empty.
    pub fn layer_or(mut self, filename: &str, fallback: &str) -> Self {
        let path = self.prompts_dir.join(filename);
        let text = fs::read_to_string(&path).unwrap_or_else(|_| {
            tracing::debug!("prompt: layer '{}' not found — using built-in", path.display());
            fallback.to_string()
        });
        let trimmed = text.trim().to_string();
        let trimmed = if trimmed.is_empty() { fallback.trim().to_string() } else { trimmed };
        if !trimmed.is_empty() {
            self.parts.push(trimmed);
        }
        self
    }

    /// Directly append a text fragment.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        let s = text.into();
        let trimmed = s.trim().to_string();
        if !trimmed.is_empty() {
            self.parts.push(trimmed);
        }
        self
    }

    /// Register a `{{key}}` → `value` substitution applied at build time.
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Assemble all layers, join with blank lines, and apply variable substitution.
    pub fn build(self) -> String {
        let mut prompt = self.parts.join(SEPARATOR);
        for (k, v) in &self.vars {
            let placeholder = format!("{{{{{}}}}}", k);
            prompt = prompt.replace(&placeholder, v);
        }
        prompt
    }
}

/// Build the user prompt for one alert: decision rules with the market
/// snapshot substituted in.
pub fn decision_prompt(prompts_dir: impl AsRef<Path>, alert: &TradeAlert) -> String {
    PromptBuilder::new(prompts_dir.as_ref())
        .layer_or("decision_rules.md", FALLBACK_RULES)
        .var("snapshot", alert.snapshot())
        .build()
}

/// Build the system prompt (from `system.md`, or the built-in line).
pub fn system_prompt(prompts_dir: impl AsRef<Path>) -> String {
    PromptBuilder::new(prompts_dir.as_ref())
        .layer_or("system.md", FALLBACK_SYSTEM)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn alert() -> TradeAlert {
        serde_json::from_value(json!({ "symbol": "XAUUSD", "price": 4061.2 })).unwrap()
    }

    fn prompts_dir_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
            f.write_all(content.as_bytes()).unwrap();
        }
        dir
    }

    #[test]
    fn builder_assembles_layers_in_order() {
        let dir = prompts_dir_with(&[("a.md", "first"), ("b.md", "second")]);
        let result = PromptBuilder::new(dir.path()).layer("a.md").layer("b.md").build();
        assert_eq!(result, "first\n\nsecond");
    }

    #[test]
    fn builder_skips_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = PromptBuilder::new(dir.path())
            .layer("nonexistent_file_xyz.md")
            .append("hello")
            .build();
        assert_eq!(result, "hello");
    }

    #[test]
    fn builder_substitutes_variable() {
        let dir = TempDir::new().unwrap();
        let result = PromptBuilder::new(dir.path())
            .append("Snapshot: {{snapshot}}")
            .var("snapshot", "price: 4061.2")
            .build();
        assert!(result.contains("price: 4061.2"));
        assert!(!result.contains("{{snapshot}}"));
    }

    #[test]
    fn layer_or_prefers_file() {
        let dir = prompts_dir_with(&[("system.md", "Be terse.")]);
        let result = PromptBuilder::new(dir.path()).layer_or("system.md", "fallback").build();
        assert_eq!(result, "Be terse.");
    }

    #[test]
    fn layer_or_falls_back_when_missing_or_empty() {
        let dir = prompts_dir_with(&[("empty.md", "   \n")]);
        let missing = PromptBuilder::new(dir.path()).layer_or("nope.md", "fallback").build();
        assert_eq!(missing, "fallback");
        let empty = PromptBuilder::new(dir.path()).layer_or("empty.md", "fallback").build();
        assert_eq!(empty, "fallback");
    }

    #[test]
    fn decision_prompt_embeds_snapshot() {
        let dir = TempDir::new().unwrap();
        let prompt = decision_prompt(dir.path(), &alert());
        assert!(prompt.contains("RULE 1: BUY"));
        assert!(prompt.contains("Market snapshot:"));
        assert!(prompt.contains("symbol: XAUUSD"));
        assert!(prompt.contains("OUTPUT FORMAT:"));
        assert!(!prompt.contains("{{snapshot}}"));
    }

    #[test]
    fn decision_prompt_uses_template_file() {
        let dir = prompts_dir_with(&[("decision_rules.md", "Custom rules.\n\n{{snapshot}}")]);
        let prompt = decision_prompt(dir.path(), &alert());
        assert!(prompt.starts_with("Custom rules."));
        assert!(prompt.contains("symbol: XAUUSD"));
    }

    #[test]
    fn system_prompt_fallback() {
        let dir = TempDir::new().unwrap();
        assert_eq!(system_prompt(dir.path()), FALLBACK_SYSTEM);
    }
}
