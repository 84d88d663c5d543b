use exprule::{Environment, Value};
use std::collections::HashMap;

fn main() {
    pretty_env_logger::init();

    let record: Environment = HashMap::from([
        ("age".to_string(), Value::Int(34)),
        ("tags".to_string(), Value::from(vec!["vip", "early"])),
        (
            "profile".to_string(),
            Value::Map(HashMap::from([
                ("email".to_string(), Value::from("ann@example.com")),
                ("score".to_string(), Value::Float(0.75)),
            ])),
        ),
    ]);

    let expressions = [
        r#"age > 18 && contains(tags, "vip")"#,
        r#"matchString("@example\\.com$", profile.email)"#,
        "profile.score * 100 - 0.5",
        "isEmpty(profile.phone)",
        r#"profile.email + 1"#,
    ];

    for expression in expressions {
        match exprule::run(expression, &record) {
            Ok(value) => println!("{} => {}", expression, value),
            Err(err) => println!("{} failed ({:?}): {}", expression, err.kind(), err),
        }
    }
}
