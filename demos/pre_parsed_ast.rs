use exprule::{Evaluator, Value};
use std::collections::HashMap;

fn main() {
    pretty_env_logger::init();

    let evaluator = Evaluator::new();

    let expression = r#"order["total"] >= 100.0 && !isEmpty(order.coupon)"#;
    let ast = evaluator
        .parse_expression(expression)
        .expect("Failed to parse");
    println!("{:#?}", ast);

    let context = HashMap::from([(
        "order".to_string(),
        Value::Map(HashMap::from([
            ("total".to_string(), Value::Float(129.5)),
            ("coupon".to_string(), Value::from("SPRING")),
        ])),
    )]);

    match evaluator.evaluate(&ast, &context) {
        Ok(result) => println!("Result: {}", result),
        Err(err) => println!("Error: {}", err),
    }
}
