//! Boa-backed interpreter
//!
//! [`BoaInterpreter`] owns one Boa `Context` for the life of the process, so
//! global bindings made by one invocation (`x = 5`, `let y = 1`,
//! `function f() {}`) are visible to every later one.
//!
//! Boa only exposes script parsing, so expression parsing is done by checking
//! that the text may begin an expression statement and then parsing it wrapped
//! in parentheses. The text must also parse as a script by itself, otherwise
//! stray parentheses in it could close the wrapping ones. Text that is several
//! statements, or a declaration, fails and falls through to
//! [`Interpreter::parse_script`].

use boa_engine::{Context, Script, Source};
use serde_json::Value as JsonValue;

use crate::resource_limits::ResourceLimits;
use crate::runtime::conversions::js_value_to_json;
use crate::runtime::{Fault, Interpreter};

/// Boa JavaScript engine with a persistent global context.
///
/// Boa's `Context` is `!Send`; construct this on the thread that will use it.
pub struct BoaInterpreter {
    ctx: Context,
}

impl BoaInterpreter {
    pub fn new() -> Self {
        Self::with_limits(&ResourceLimits::default())
    }

    /// Creates an interpreter with the cooperative limits from `limits` applied.
    pub fn with_limits(limits: &ResourceLimits) -> Self {
        let mut ctx = Context::default();

        if let Some(limit) = limits.loop_iteration_limit {
            ctx.runtime_limits_mut().set_loop_iteration_limit(limit);
        }
        if let Some(limit) = limits.recursion_limit {
            ctx.runtime_limits_mut().set_recursion_limit(limit);
        }

        Self { ctx }
    }

    fn parse(&mut self, text: &str) -> Result<Script, Fault> {
        Script::parse(Source::from_bytes(text), None, &mut self.ctx)
            .map_err(|e| Fault::new(e.to_string()))
    }
}

impl Default for BoaInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter for BoaInterpreter {
    type Executable = Script;

    fn parse_expression(&mut self, code: &str) -> Result<Script, Fault> {
        if !may_start_expression(code) {
            return Err(Fault::new("SyntaxError: not an expression"));
        }
        // Unbalanced text such as `1) + (2` would pair with the wrapping
        // parens, so the text has to stand on its own first.
        self.parse(code)?;
        // Newlines keep a trailing line comment from swallowing the paren.
        self.parse(&format!("(\n{}\n)", code))
    }

    fn parse_script(&mut self, code: &str) -> Result<Script, Fault> {
        self.parse(code)
    }

    fn evaluate(&mut self, script: Script) -> Result<JsonValue, Fault> {
        let value = script
            .evaluate(&mut self.ctx)
            .map_err(|e| Fault::new(e.to_string()))?;
        js_value_to_json(value, &mut self.ctx)
    }
}

/// Whether `code` may begin an expression statement.
///
/// An expression statement cannot start with `{`, `function`, `async function`,
/// `class` or `let [`; those are blocks and declarations.
fn may_start_expression(code: &str) -> bool {
    let text = code.trim_start();
    if text.is_empty() || text.starts_with('{') {
        return false;
    }

    match leading_word(text) {
        "function" | "class" => false,
        "async" => leading_word(text["async".len()..].trim_start()) != "function",
        "let" => !text["let".len()..].trim_start().starts_with('['),
        _ => true,
    }
}

fn leading_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(text.len());
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{execute, Outcome};

    #[test]
    fn test_plain_expressions_may_start_expression() {
        assert!(may_start_expression("2 + 2"));
        assert!(may_start_expression("  x = 5"));
        assert!(may_start_expression("(function () { return 1; })()"));
        assert!(may_start_expression("functional + 1"));
        assert!(may_start_expression("async () => 1"));
    }

    #[test]
    fn test_declarations_and_blocks_are_not_expressions() {
        assert!(!may_start_expression(""));
        assert!(!may_start_expression("   "));
        assert!(!may_start_expression("{ a: 1 }"));
        assert!(!may_start_expression("function f() { return 1; }"));
        assert!(!may_start_expression("async  function f() {}"));
        assert!(!may_start_expression("class A {}"));
        assert!(!may_start_expression("let [a, b] = [1, 2]"));
    }

    #[test]
    fn test_leading_word() {
        assert_eq!(leading_word("function(x)"), "function");
        assert_eq!(leading_word("$el.value"), "$el");
        assert_eq!(leading_word("+1"), "");
    }

    #[test]
    fn test_parse_expression_rejects_statement_list() {
        let mut interpreter = BoaInterpreter::new();
        assert!(interpreter.parse_expression("let a = 1; a + 1").is_err());
        assert!(interpreter.parse_script("let a = 1; a + 1").is_ok());
    }

    #[test]
    fn test_parse_expression_rejects_unbalanced_parens() {
        let mut interpreter = BoaInterpreter::new();
        assert!(interpreter.parse_expression("1) + (2").is_err());
        assert!(interpreter.parse_expression("1); y = 9; (1").is_err());
        assert!(interpreter.parse_expression("(1) + (2)").is_ok());
    }

    #[test]
    fn test_unbalanced_text_faults_without_side_effects() {
        let mut interpreter = BoaInterpreter::new();

        let outcome = execute(&mut interpreter, "1); y = 9; (1");
        match outcome {
            Outcome::Fault(fault) => assert!(fault.description().contains("SyntaxError")),
            other => panic!("expected fault, got {:?}", other),
        }
        assert!(execute(&mut interpreter, "1) + (2").is_fault());
        assert_eq!(
            execute(&mut interpreter, "typeof y"),
            Outcome::Value(serde_json::json!("undefined"))
        );
    }

    #[test]
    fn test_parse_expression_accepts_trailing_line_comment() {
        let mut interpreter = BoaInterpreter::new();
        let script = interpreter.parse_expression("40 + 2 // answer").unwrap();
        assert_eq!(interpreter.evaluate(script).unwrap(), serde_json::json!(42));
    }
}
