#[cfg(test)]
mod tests {
    use crate::resource_limits::ResourceLimits;
    use crate::runtime::{execute, BoaInterpreter, Fault, Interpreter, Outcome, SharedContext};
    use serde_json::{json, Value as JsonValue};
    use std::sync::{Arc, Mutex};

    /// Wraps an interpreter and records which collaborator calls were made.
    struct Recording<I> {
        inner: I,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl<I: Interpreter> Interpreter for Recording<I> {
        type Executable = I::Executable;

        fn parse_expression(&mut self, code: &str) -> Result<I::Executable, Fault> {
            self.calls.lock().unwrap().push("parse_expression");
            self.inner.parse_expression(code)
        }

        fn parse_script(&mut self, code: &str) -> Result<I::Executable, Fault> {
            self.calls.lock().unwrap().push("parse_script");
            self.inner.parse_script(code)
        }

        fn evaluate(&mut self, executable: I::Executable) -> Result<JsonValue, Fault> {
            self.calls.lock().unwrap().push("evaluate");
            self.inner.evaluate(executable)
        }
    }

    fn recording() -> (Recording<BoaInterpreter>, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let interpreter = Recording {
            inner: BoaInterpreter::new(),
            calls: calls.clone(),
        };
        (interpreter, calls)
    }

    fn eval(interpreter: &mut BoaInterpreter, code: &str) -> JsonValue {
        match execute(interpreter, code) {
            Outcome::Value(value) => value,
            Outcome::Fault(fault) => panic!("unexpected fault for {:?}: {}", code, fault),
        }
    }

    fn fault(interpreter: &mut BoaInterpreter, code: &str) -> String {
        match execute(interpreter, code) {
            Outcome::Fault(fault) => fault.into_description(),
            Outcome::Value(value) => panic!("expected fault for {:?}, got {}", code, value),
        }
    }

    #[test]
    fn test_expression_value() {
        let mut interpreter = BoaInterpreter::new();
        assert_eq!(eval(&mut interpreter, "2 + 2"), json!(4));
    }

    #[test]
    fn test_expression_is_parsed_once() {
        let (mut interpreter, calls) = recording();
        assert_eq!(execute(&mut interpreter, "6 * 7"), Outcome::Value(json!(42)));
        assert_eq!(*calls.lock().unwrap(), vec!["parse_expression", "evaluate"]);
    }

    #[test]
    fn test_statement_list_falls_back_to_script() {
        let (mut interpreter, calls) = recording();
        let outcome = execute(&mut interpreter, "var a = 20; var b = 22; a + b");

        assert_eq!(outcome, Outcome::Value(json!(42)));
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["parse_expression", "parse_script", "evaluate"]
        );
    }

    #[test]
    fn test_unparseable_code_reports_script_fault() {
        let (mut interpreter, calls) = recording();
        let outcome = execute(&mut interpreter, "this is not valid javascript ))");

        match outcome {
            Outcome::Fault(fault) => assert!(fault.description().contains("SyntaxError")),
            other => panic!("expected fault, got {:?}", other),
        }
        assert_eq!(*calls.lock().unwrap(), vec!["parse_expression", "parse_script"]);
    }

    #[test]
    fn test_undefined_name_is_a_fault() {
        let mut interpreter = BoaInterpreter::new();
        let description = fault(&mut interpreter, "notDefinedAnywhere + 1");
        assert!(description.contains("ReferenceError"), "{}", description);
        assert!(description.contains("notDefinedAnywhere"));
    }

    #[test]
    fn test_thrown_error_is_a_fault() {
        let mut interpreter = BoaInterpreter::new();
        let description = fault(&mut interpreter, "throw new Error('intentional error')");
        assert!(description.contains("intentional error"));
    }

    #[test]
    fn test_assignment_persists_across_invocations() {
        let mut interpreter = BoaInterpreter::new();
        assert_eq!(eval(&mut interpreter, "x = 5"), json!(5));
        assert_eq!(eval(&mut interpreter, "x + 1"), json!(6));
    }

    #[test]
    fn test_declarations_persist_across_invocations() {
        let mut interpreter = BoaInterpreter::new();
        assert_eq!(eval(&mut interpreter, "let y = 2"), json!(null));
        assert_eq!(eval(&mut interpreter, "function triple(n) { return n * 3; }"), json!(null));
        assert_eq!(eval(&mut interpreter, "triple(y)"), json!(6));
    }

    #[test]
    fn test_fault_does_not_discard_earlier_state() {
        let mut interpreter = BoaInterpreter::new();
        eval(&mut interpreter, "counter = 1");
        fault(&mut interpreter, "counter = missing");
        assert_eq!(eval(&mut interpreter, "counter"), json!(1));
    }

    #[test]
    fn test_structured_results() {
        let mut interpreter = BoaInterpreter::new();
        assert_eq!(
            eval(&mut interpreter, "({ deep: { list: [1, 'two', true, null] } })"),
            json!({"deep": {"list": [1, "two", true, null]}})
        );
        assert_eq!(eval(&mut interpreter, "[1, 2, 3].map(n => n * 2)"), json!([2, 4, 6]));
    }

    #[test]
    fn test_number_rendering() {
        let mut interpreter = BoaInterpreter::new();
        assert_eq!(eval(&mut interpreter, "0.5 + 0.25"), json!(0.75));
        assert_eq!(eval(&mut interpreter, "10 / 2"), json!(5));
        assert_eq!(eval(&mut interpreter, "0 / 0"), json!("NaN"));
        assert_eq!(eval(&mut interpreter, "-1 / 0"), json!("-Infinity"));
    }

    #[test]
    fn test_undefined_and_symbols_are_null() {
        let mut interpreter = BoaInterpreter::new();
        assert_eq!(eval(&mut interpreter, "undefined"), json!(null));
        assert_eq!(eval(&mut interpreter, "Symbol('s')"), json!(null));
    }

    #[test]
    fn test_function_result_is_rendered_as_string() {
        let mut interpreter = BoaInterpreter::new();
        assert!(eval(&mut interpreter, "(function named() {})").is_string());
    }

    #[test]
    fn test_self_referencing_result_is_a_fault() {
        let mut interpreter = BoaInterpreter::new();
        let description = fault(&mut interpreter, "var loop = {}; loop.self = loop; loop");
        assert!(description.contains("nests deeper"));
    }

    #[test]
    fn test_loop_iteration_limit_turns_runaway_loop_into_fault() {
        let limits = ResourceLimits::new().with_loop_iteration_limit(10_000);
        let mut interpreter = BoaInterpreter::with_limits(&limits);

        let outcome = execute(&mut interpreter, "while (true) {}");
        assert!(outcome.is_fault());

        // The context is still usable afterwards.
        assert_eq!(eval(&mut interpreter, "1 + 1"), json!(2));
    }

    #[test]
    fn test_recursion_limit_turns_deep_recursion_into_fault() {
        let limits = ResourceLimits::new().with_recursion_limit(64);
        let mut interpreter = BoaInterpreter::with_limits(&limits);

        eval(&mut interpreter, "function down(n) { return down(n + 1); }");
        assert!(execute(&mut interpreter, "down(0)").is_fault());
    }

    #[test]
    fn test_panicking_interpreter_is_reported_as_fault() {
        struct Panicky;

        impl Interpreter for Panicky {
            type Executable = ();

            fn parse_expression(&mut self, _code: &str) -> Result<(), Fault> {
                Ok(())
            }

            fn parse_script(&mut self, _code: &str) -> Result<(), Fault> {
                Ok(())
            }

            fn evaluate(&mut self, _executable: ()) -> Result<JsonValue, Fault> {
                panic!("engine bug");
            }
        }

        match execute(&mut Panicky, "anything") {
            Outcome::Fault(fault) => assert_eq!(fault.description(), "interpreter panicked: engine bug"),
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shared_context_keeps_state_between_submissions() {
        let context = SharedContext::spawn(BoaInterpreter::new).unwrap();

        let first = context.submit("x = 5").unwrap();
        first.started.await.unwrap();
        assert_eq!(first.outcome.await.unwrap(), Outcome::Value(json!(5)));
        assert!(first.done.load(std::sync::atomic::Ordering::Acquire));

        let second = context.submit("x + 1").unwrap();
        assert_eq!(second.outcome.await.unwrap(), Outcome::Value(json!(6)));
    }

    #[tokio::test]
    async fn test_shared_context_is_shared_between_handles() {
        let context = SharedContext::spawn(BoaInterpreter::new).unwrap();
        let other = context.clone();

        context.submit("var shared = 'hello'").unwrap().outcome.await.unwrap();
        let outcome = other.submit("shared + ' world'").unwrap().outcome.await.unwrap();
        assert_eq!(outcome, Outcome::Value(json!("hello world")));
    }
}
