use super::*;
use crate::expressions::{ConstantNumber, FHead, NumericExpr, NumericOp};

/// Translates a `Number` terminal.
pub(super) fn translate_number(node: &Node) -> Result<ConstantNumber> {
    expect_rule(node, Rule::Number)?;
    node.text()
        .parse()
        .map_err(|_| TranslateError::malformed_term("a number", node))
}

/// Translates a function application `(f ?x a)` or a bare function symbol `f`.
pub fn translate_fhead(node: &Node) -> Result<FHead> {
    expect_rule(node, Rule::FHead)?;
    let name = symbol_of(node, Rule::FunctionSymbol)?;
    let args = node
        .children_of(Rule::Term)
        .map(translate_term)
        .collect::<Result<Vec<_>>>()?;
    Ok(FHead::new(name, args))
}

/// Translates an `FExp` node.
///
/// Operations with more than two operands, e.g., `(+ a b c)`, are read as nested binary operations
/// associated to the left: `(+ (+ a b) c)`.
pub fn translate_numeric_expression(node: &Node) -> Result<NumericExpr> {
    expect_rule(node, Rule::FExp)?;
    if let [single] = node.children() {
        return match single.rule() {
            Rule::Number => Ok(NumericExpr::Number(translate_number(single)?)),
            Rule::FHead => Ok(NumericExpr::Head(translate_fhead(single)?)),
            _ => Err(TranslateError::malformed_term("a number or a function application", single)),
        };
    }
    let operands = node
        .children()
        .iter()
        .filter_map(|c| match c.rule() {
            Rule::FExp => Some(c),
            Rule::FExp2 => c.first_of(Rule::FExp),
            _ => None,
        })
        .map(translate_numeric_expression)
        .collect::<Result<Vec<_>>>()?;
    match node.first_of(Rule::BinaryOp) {
        Some(op_node) => {
            let op: NumericOp = op_node
                .text()
                .parse()
                .map_err(|_| TranslateError::malformed_term("a numeric operator", op_node))?;
            let mut operands = operands.into_iter();
            let (Some(first), Some(second)) = (operands.next(), operands.next()) else {
                return Err(TranslateError::malformed_term("at least two operands", node));
            };
            let init = NumericExpr::binary(op, first, second);
            Ok(operands.fold(init, |lhs, rhs| NumericExpr::binary(op, lhs, rhs)))
        }
        None => match <[NumericExpr; 1]>::try_from(operands) {
            Ok([negated]) => Ok(NumericExpr::negation(negated)),
            Err(_) => Err(TranslateError::malformed_term("a single operand in a negation", node)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Term;

    fn tok(s: &str) -> Node {
        Node::token(s)
    }

    fn number(v: &str) -> Node {
        Node::new(Rule::FExp, vec![Node::leaf(Rule::Number, v)])
    }

    fn head(name: &str, args: &[&str]) -> Node {
        let mut children = vec![tok("("), Node::new(Rule::FunctionSymbol, vec![Node::leaf(Rule::Name, name)])];
        for a in args {
            children.push(Node::new(Rule::Term, vec![Node::leaf(Rule::Variable, *a)]));
        }
        children.push(tok(")"));
        Node::new(Rule::FExp, vec![Node::new(Rule::FHead, children)])
    }

    fn op(op: &str, first: Node, rest: Vec<Node>) -> Node {
        let mut children = vec![tok("("), Node::leaf(Rule::BinaryOp, op), first];
        children.extend(rest.into_iter().map(|e| Node::new(Rule::FExp2, vec![e])));
        children.push(tok(")"));
        Node::new(Rule::FExp, children)
    }

    #[test]
    fn leaves() {
        assert_eq!(translate_numeric_expression(&number("2.5")).unwrap(), NumericExpr::number(2.5));
        assert_eq!(
            translate_numeric_expression(&head("speed", &["?r"])).unwrap(),
            NumericExpr::Head(FHead::new("speed", vec![Term::parse("?r")]))
        );
        let var = Node::new(Rule::FExp, vec![Node::leaf(Rule::Variable, "?duration")]);
        assert!(matches!(
            translate_numeric_expression(&var),
            Err(TranslateError::MalformedTerm { .. })
        ));
    }

    #[test]
    fn nary_fold_left() {
        let e = op("+", number("1"), vec![number("2"), number("3")]);
        let expected = NumericExpr::binary(
            NumericOp::Add,
            NumericExpr::binary(NumericOp::Add, NumericExpr::number(1.0), NumericExpr::number(2.0)),
            NumericExpr::number(3.0),
        );
        assert_eq!(translate_numeric_expression(&e).unwrap(), expected);
    }

    #[test]
    fn unary_negation() {
        let e = Node::new(Rule::FExp, vec![tok("("), tok("-"), head("f", &[]), tok(")")]);
        assert_eq!(
            translate_numeric_expression(&e).unwrap(),
            NumericExpr::negation(NumericExpr::Head(FHead::new("f", vec![])))
        );
    }
}
