use crate::ast::{LiteralKind, Node, Operator, UnaryOperator};
use crate::error::{Error, Result};
use log::debug;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "./expression.pest"]
pub struct ExpressionParser;

impl ExpressionParser {
    pub fn parse_expression(input: &str) -> Result<Node> {
        debug!("Parsing expression: {}", input);
        let parse_result = ExpressionParser::parse(Rule::expression, input)?
            .next()
            .ok_or_else(|| Error::Parse("Failed to parse expression".to_string()))?;

        let root = parse_result
            .into_inner()
            .next()
            .ok_or_else(|| Error::Parse("Empty expression".to_string()))?;
        let node = Self::build_node(root)?;
        debug!("Parsed tree: {:?}", node);
        Ok(node)
    }

    fn build_node(pair: Pair<Rule>) -> Result<Node> {
        match pair.as_rule() {
            Rule::or_expression
            | Rule::and_expression
            | Rule::comparison_expression
            | Rule::additive_expression
            | Rule::multiplicative_expression => Self::build_binary_expression(pair),
            Rule::unary_expression => Self::build_unary_expression(pair),
            Rule::postfix_expression => Self::build_postfix_expression(pair),
            _ => Self::build_primary_expression(pair),
        }
    }

    /// Folds `operand (operator operand)*` into a left-associative chain.
    fn build_binary_expression(pair: Pair<Rule>) -> Result<Node> {
        let mut pairs = pair.into_inner();
        let first = pairs.next().ok_or_else(|| missing("left operand"))?;
        let mut node = Self::build_node(first)?;

        while let Some(operator_pair) = pairs.next() {
            let operator = Operator::try_from(operator_pair.as_str()).map_err(Error::Parse)?;
            let right = pairs
                .next()
                .ok_or_else(|| missing("right operand"))
                .and_then(Self::build_node)?;
            node = Node::binary(node, operator, right);
        }

        Ok(node)
    }

    fn build_unary_expression(pair: Pair<Rule>) -> Result<Node> {
        let mut operators = Vec::new();
        let mut operand = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::NOT | Rule::MINUS | Rule::PLUS => {
                    operators.push(UnaryOperator::try_from(inner.as_str()).map_err(Error::Parse)?)
                }
                _ => operand = Some(Self::build_node(inner)?),
            }
        }

        let mut node = operand.ok_or_else(|| missing("unary operand"))?;
        // Innermost operator applies first.
        for operator in operators.into_iter().rev() {
            node = Node::unary(operator, node);
        }
        Ok(node)
    }

    fn build_postfix_expression(pair: Pair<Rule>) -> Result<Node> {
        let mut pairs = pair.into_inner();
        let primary = pairs.next().ok_or_else(|| missing("primary expression"))?;
        let mut node = Self::build_primary_expression(primary)?;

        for suffix in pairs {
            node = match suffix.as_rule() {
                Rule::call => {
                    let args = suffix
                        .into_inner()
                        .map(Self::build_node)
                        .collect::<Result<Vec<_>>>()?;
                    Node::call(node, args)
                }
                Rule::selector => {
                    let field = suffix
                        .into_inner()
                        .next()
                        .ok_or_else(|| missing("field name"))?;
                    Node::selector(node, field.as_str())
                }
                Rule::index => {
                    let index = suffix
                        .into_inner()
                        .next()
                        .ok_or_else(|| missing("index expression"))?;
                    Node::index(node, Self::build_node(index)?)
                }
                rule => return Err(Error::Parse(format!("Unexpected suffix: {:?}", rule))),
            };
        }

        Ok(node)
    }

    fn build_primary_expression(pair: Pair<Rule>) -> Result<Node> {
        match pair.as_rule() {
            Rule::integer => Ok(Node::literal(LiteralKind::Int, pair.as_str())),
            Rule::float => Ok(Node::literal(LiteralKind::Float, pair.as_str())),
            Rule::string | Rule::raw_string => {
                Ok(Node::literal(LiteralKind::String, pair.as_str()))
            }
            Rule::char => Ok(Node::literal(LiteralKind::Char, pair.as_str())),
            Rule::identifier => Ok(Node::identifier(pair.as_str())),
            Rule::group => {
                let inner = pair
                    .into_inner()
                    .next()
                    .ok_or_else(|| missing("grouped expression"))?;
                Ok(Node::paren(Self::build_node(inner)?))
            }
            rule => {
                debug!("Unexpected rule in primary expression: {:?}", rule);
                Err(Error::Parse(format!(
                    "Unexpected rule in primary expression: {:?}",
                    rule
                )))
            }
        }
    }
}

fn missing(what: &str) -> Error {
    Error::Parse(format!("Missing {}", what))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(raw: &str) -> Node {
        Node::literal(LiteralKind::Int, raw)
    }

    #[test]
    fn test_simple_binary_expression() {
        let ast = ExpressionParser::parse_expression("age > 18").unwrap();
        assert_eq!(
            ast,
            Node::binary(Node::identifier("age"), Operator::GreaterThan, int("18"))
        );
    }

    #[test]
    fn test_precedence() {
        let ast = ExpressionParser::parse_expression("1 + 2 * 3 == 7 && ok || done").unwrap();
        let product = Node::binary(int("2"), Operator::Multiply, int("3"));
        let sum = Node::binary(int("1"), Operator::Add, product);
        let comparison = Node::binary(sum, Operator::Equal, int("7"));
        let and = Node::binary(comparison, Operator::And, Node::identifier("ok"));
        let expected = Node::binary(and, Operator::Or, Node::identifier("done"));
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_left_associativity() {
        let ast = ExpressionParser::parse_expression("1+2-2").unwrap();
        let expected = Node::binary(
            Node::binary(int("1"), Operator::Add, int("2")),
            Operator::Subtract,
            int("2"),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        let ast = ExpressionParser::parse_expression("!a == b").unwrap();
        let expected = Node::binary(
            Node::unary(UnaryOperator::Not, Node::identifier("a")),
            Operator::Equal,
            Node::identifier("b"),
        );
        assert_eq!(ast, expected);

        let ast = ExpressionParser::parse_expression("-(-2)").unwrap();
        let expected = Node::unary(
            UnaryOperator::Negate,
            Node::paren(Node::unary(UnaryOperator::Negate, int("2"))),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_stacked_unary_operators() {
        let ast = ExpressionParser::parse_expression("!!flag").unwrap();
        let expected = Node::unary(
            UnaryOperator::Not,
            Node::unary(UnaryOperator::Not, Node::identifier("flag")),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_literal_kinds() {
        let cases = [
            ("01230", LiteralKind::Int),
            ("1.01", LiteralKind::Float),
            ("1.", LiteralKind::Float),
            (".5", LiteralKind::Float),
            ("2.5E-3", LiteralKind::Float),
            ("1e3", LiteralKind::Float),
            ("\"abc\\\"d\"", LiteralKind::String),
            ("`raw text`", LiteralKind::String),
            ("'a'", LiteralKind::Char),
        ];
        for (input, kind) in cases {
            let ast = ExpressionParser::parse_expression(input).unwrap();
            assert_eq!(ast, Node::literal(kind, input), "input: {}", input);
        }
    }

    #[test]
    fn test_postfix_chain() {
        let ast = ExpressionParser::parse_expression(r#"mp["md"][1]"#).unwrap();
        let expected = Node::index(
            Node::index(
                Node::identifier("mp"),
                Node::literal(LiteralKind::String, "\"md\""),
            ),
            int("1"),
        );
        assert_eq!(ast, expected);

        let ast = ExpressionParser::parse_expression("user.profile.score").unwrap();
        let expected = Node::selector(
            Node::selector(Node::identifier("user"), "profile"),
            "score",
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_function_call() {
        let ast = ExpressionParser::parse_expression(r#"contains(tags, "vip")"#).unwrap();
        let expected = Node::call(
            Node::identifier("contains"),
            vec![
                Node::identifier("tags"),
                Node::literal(LiteralKind::String, "\"vip\""),
            ],
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_function_call_no_args_and_trailing_comma() {
        let ast = ExpressionParser::parse_expression("newSlice()").unwrap();
        assert_eq!(ast, Node::call(Node::identifier("newSlice"), vec![]));

        let ast = ExpressionParser::parse_expression(r#"newSlice("a",)"#).unwrap();
        assert_eq!(
            ast,
            Node::call(
                Node::identifier("newSlice"),
                vec![Node::literal(LiteralKind::String, "\"a\"")]
            )
        );
    }

    #[test]
    fn test_unicode_identifier_and_string() {
        let ast = ExpressionParser::parse_expression(r#"名字 == "-a中国_+=""#).unwrap();
        let expected = Node::binary(
            Node::identifier("名字"),
            Operator::Equal,
            Node::literal(LiteralKind::String, "\"-a中国_+=\""),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_excess_whitespace() {
        let ast = ExpressionParser::parse_expression("   (   it2   +  10  )   ").unwrap();
        let expected = Node::paren(Node::binary(
            Node::identifier("it2"),
            Operator::Add,
            int("10"),
        ));
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_invalid_syntax() {
        for input in [
            "",
            "price > ",
            "(1 + 2",
            "1 + 2)",
            "a b",
            "price > 100 @ volume",
            "0x1F",
            "\"unterminated",
            "a.",
            "f(,)",
        ] {
            let result = ExpressionParser::parse_expression(input);
            match result {
                Err(Error::Parse(message)) => assert!(!message.is_empty()),
                other => panic!("expected parse error for {:?}, got {:?}", input, other),
            }
        }
    }
}
