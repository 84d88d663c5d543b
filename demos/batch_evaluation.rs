use exprule::{Environment, Evaluator, Value};
use std::collections::HashMap;

fn main() {
    pretty_env_logger::init();

    let records: Vec<Environment> = vec![
        HashMap::from([
            ("age".to_string(), Value::Int(20)),
            ("tags".to_string(), Value::from(vec!["vip"])),
        ]),
        HashMap::from([
            ("age".to_string(), Value::Int(16)),
            ("tags".to_string(), Value::from(vec!["vip", "new"])),
        ]),
        HashMap::from([("age".to_string(), Value::Int(42))]),
    ];

    let expression = r#"age > 18 && contains(tags, "vip")"#;

    let evaluator = Evaluator::new();
    let results = evaluator
        .run_batch(expression, &records)
        .expect("Failed to parse");
    for (i, result) in results.iter().enumerate() {
        println!("Result {}: {:?}", i, result);
    }
}
