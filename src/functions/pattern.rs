use crate::ast::{Scope, Sequence, Value};
use crate::error::Result;
use crate::functions::Registry;
use exprule_macros::builtin;
use log::trace;
use regex::{Regex, RegexBuilder};

pub fn register(registry: &mut Registry) {
    registry.register_function("matchString", match_string);
    registry.register_function("findAllString", find_all_string);
}

fn compile(pattern: &str, scope: &Scope<'_>) -> Result<Regex> {
    trace!("Compiling pattern {}", pattern);
    let regex = RegexBuilder::new(pattern)
        .size_limit(scope.config().regex_size_limit)
        .build()?;
    Ok(regex)
}

/// Whether `pattern` matches anywhere in `subject`.
#[builtin("matchString")]
pub fn match_string(pattern: String, subject: String) -> Result<Value> {
    let regex = compile(&pattern, scope)?;
    Ok(Value::Bool(regex.is_match(&subject)))
}

/// Up to `limit` successive non-overlapping matches; a negative limit returns all of them.
#[builtin("findAllString")]
pub fn find_all_string(pattern: String, subject: String, limit: i64) -> Result<Value> {
    let regex = compile(&pattern, scope)?;
    let matches = regex
        .find_iter(&subject)
        .map(|found| found.as_str().to_string());
    let found: Vec<String> = match usize::try_from(limit) {
        Ok(limit) => matches.take(limit).collect(),
        Err(_) => matches.collect(),
    };
    Ok(Value::Seq(Sequence::Str(found)))
}

#[cfg(test)]
mod tests {
    use crate::ast::{Environment, Evaluator, Value};
    use crate::config::Config;
    use crate::error::Error;
    use std::collections::HashMap;

    fn environment() -> Environment {
        HashMap::from([
            ("ms".to_string(), Value::from("12abc789_==+and m")),
            ("n".to_string(), Value::Int(2)),
        ])
    }

    fn eval(expression: &str) -> Result<Value, Error> {
        Evaluator::new().run(expression, &environment())
    }

    #[test]
    fn test_match_string() {
        assert_eq!(eval(r#"matchString("abc[0-9]+.*m", ms)"#), Ok(Value::Bool(true)));
        assert_eq!(eval(r#"matchString("^abc", ms)"#), Ok(Value::Bool(false)));
        assert_eq!(eval(r#"matchString("", "")"#), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_match_string_errors() {
        assert!(matches!(eval(r#"matchString("(", ms)"#), Err(Error::Regex(_))));
        assert!(matches!(
            eval("matchString(1, ms)"),
            Err(Error::ArgumentType { position: 1, .. })
        ));
        assert!(matches!(
            eval(r#"matchString("a")"#),
            Err(Error::ArgumentCount { expected: 2, .. })
        ));
    }

    #[test]
    fn test_find_all_string() {
        assert_eq!(
            eval(r#"findAllString("[0-9]", ms, -1)"#),
            Ok(Value::from(vec!["1", "2", "7", "8", "9"]))
        );
        assert_eq!(
            eval(r#"findAllString("[0-9]+", ms, n)"#),
            Ok(Value::from(vec!["12", "789"]))
        );
        assert_eq!(
            eval(r#"findAllString("[0-9]", ms, 0)"#),
            Ok(Value::from(Vec::<String>::new()))
        );
        assert_eq!(
            eval(r#"findAllString("x", ms, -1)"#),
            Ok(Value::from(Vec::<String>::new()))
        );
    }

    #[test]
    fn test_find_all_string_errors() {
        assert!(matches!(
            eval(r#"findAllString("[", ms, -1)"#),
            Err(Error::Regex(_))
        ));
        assert!(matches!(
            eval(r#"findAllString("a", ms, 1.0)"#),
            Err(Error::ArgumentType { position: 3, .. })
        ));
        assert!(matches!(
            eval(r#"findAllString("a", ms)"#),
            Err(Error::ArgumentCount { expected: 3, .. })
        ));
    }

    #[test]
    fn test_regex_size_limit() {
        let evaluator = Evaluator::with_config(Config::default().with_regex_size_limit(16));
        let result = evaluator.run(r#"matchString("a{1000}", ms)"#, &environment());
        assert!(matches!(result, Err(Error::Regex(_))));
    }
}
