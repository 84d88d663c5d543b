pub mod ast;
pub mod config;
pub mod error;
pub mod functions;

pub use ast::{Environment, Evaluator, Node, Value};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};

/// Evaluates `expression` against `environment` with the built-in functions.
pub fn run(expression: &str, environment: &Environment) -> Result<Value> {
    Evaluator::new().run(expression, environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn data_source() -> Environment {
        HashMap::from([
            ("str".to_string(), Value::from("abc123")),
            ("it".to_string(), Value::Int(123432423)),
            ("it2".to_string(), Value::Int(2)),
            ("bl".to_string(), Value::Bool(true)),
            ("arrary".to_string(), Value::from(vec!["0a", "1b"])),
            (
                "mp".to_string(),
                Value::Map(HashMap::from([
                    ("md".to_string(), Value::from(vec![1_i32, 2, 3])),
                    ("ms".to_string(), Value::from("12abc789_==+and m")),
                ])),
            ),
        ])
    }

    #[test]
    fn test_run() {
        let env = data_source();
        let cases = [
            (r#"(2+1-2)*(-2)/(mp["md"][1])"#, Value::Int(-1)),
            ("((5%it2)+2-3)/100", Value::Int(0)),
            (r#"bl&&(mp["md"][it2]-1==2)"#, Value::Bool(true)),
            (r#"contains(arrary,"1b")&&it>1.0&&it2<=3"#, Value::Bool(true)),
            (
                r#"(!matchString("abc[0-9]+.*m",mp["ms"])||!bl)==false"#,
                Value::Bool(true),
            ),
            (
                r#"((!matchString("abc[0-9]+.*m",mp["ms"])||!bl)==false)&&(555%2+0.1234*10>(it2/5-1.0123)||contains(newSlice("abc","cfg","123"),"cfg"))"#,
                Value::Bool(true),
            ),
        ];

        for (expression, expected) in cases {
            match run(expression, &env) {
                Ok(value) => assert_eq!(value, expected, "{}", expression),
                Err(err) => panic!("run expr error: {} ({})", err, expression),
            }
        }
    }

    #[test]
    fn test_run_reports_failures() {
        let env = data_source();

        let err = run(r#""xx"+100"#, &env).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);
        assert!(err.to_string().contains("invalid binary operation"));

        let err = run("it2 +", &env).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_missing_field_is_lenient_wrong_type_is_not() {
        let env = data_source();
        assert_eq!(run("mp.absent", &env), Ok(Value::Nil));
        assert_eq!(run(r#"isEmpty(mp["absent"])"#, &env), Ok(Value::Bool(true)));
        assert!(run("mp.ms > 1", &env).is_err());
    }

    #[test]
    fn test_concurrent_runs() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let env = HashMap::from([("n".to_string(), Value::Int(i))]);
                    run("n * 10 + 1", &env)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let value = handle.join().unwrap();
            assert_eq!(value, Ok(Value::Int(i as i64 * 10 + 1)));
        }
    }
}
