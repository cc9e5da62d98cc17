use std::rc::Rc;

use tracing::trace;

use crate::{
    runtime::{
        builtins::apply_primitive,
        env::Environment,
        print::PrintHandler,
        stack::ensure_sufficient_stack,
        Arity, Closure, RuntimeError,
        RuntimeError::{ArityError, NameError, TypeError},
        Value,
        Value::{BoolValue, ClosureValue, NumberValue, PrimitiveValue, StringValue},
    },
    syntax::tree::{
        Expr,
        Expr::{ApplyExpr, IdExpr, IfExpr, LambdaExpr, LitExpr},
        Lit,
        Lit::{LitBool, LitNumber, LitString},
    },
};

pub(crate) trait Eval {
    fn eval_in(&self, env: &Environment, out: &PrintHandler) -> Result<Value, RuntimeError>;
}

impl<T: Eval> Eval for Box<T> {
    fn eval_in(&self, env: &Environment, out: &PrintHandler) -> Result<Value, RuntimeError> {
        (**self).eval_in(env, out)
    }
}

impl Eval for Expr {
    fn eval_in(&self, env: &Environment, out: &PrintHandler) -> Result<Value, RuntimeError> {
        ensure_sufficient_stack(|| match self {
            LitExpr(lit) => lit.eval_in(env, out),
            IdExpr(id) => env
                .lookup(id.as_str())
                .cloned()
                .ok_or_else(|| NameError(id.clone())),
            IfExpr(cond, then, otherwise) => eval_if(env, out, cond, then, otherwise),
            LambdaExpr(lambda) => Ok(ClosureValue(Rc::new(Closure {
                lambda: Rc::clone(lambda),
                env: env.clone(),
            }))),
            ApplyExpr(f, args) => eval_apply(env, out, f, args),
        })
    }
}

impl Eval for Lit {
    fn eval_in(&self, _: &Environment, _: &PrintHandler) -> Result<Value, RuntimeError> {
        match self {
            LitNumber(n) => Ok(NumberValue(*n)),
            LitString(s) => Ok(StringValue(s.clone())),
            LitBool(b) => Ok(BoolValue(*b)),
        }
    }
}

/// Evaluates `expr`, sending `println` output to stdout.
pub fn evaluate(expr: &Expr, env: &Environment) -> Result<Value, RuntimeError> {
    expr.eval_in(env, &PrintHandler::Stdout)
}

pub fn evaluate_with(
    expr: &Expr,
    env: &Environment,
    out: &PrintHandler,
) -> Result<Value, RuntimeError> {
    expr.eval_in(env, out)
}

fn eval_if(
    env: &Environment,
    out: &PrintHandler,
    cond: &Expr,
    then: &Expr,
    otherwise: &Expr,
) -> Result<Value, RuntimeError> {
    match cond.eval_in(env, out)? {
        BoolValue(true) => then.eval_in(env, out),
        BoolValue(false) => otherwise.eval_in(env, out),
        _ => Err(TypeError("condition must be boolean".to_owned())),
    }
}

fn eval_apply(
    env: &Environment,
    out: &PrintHandler,
    f: &Expr,
    args: &[Expr],
) -> Result<Value, RuntimeError> {
    let callee = f.eval_in(env, out)?;
    let args = args
        .iter()
        .map(|arg| arg.eval_in(env, out))
        .collect::<Result<Vec<_>, _>>()?;

    match callee {
        PrimitiveValue(op) => apply_primitive(op.as_str(), args, out),
        ClosureValue(closure) => apply_closure(&closure, args, out),
        _ => Err(TypeError("cannot apply non-function value".to_owned())),
    }
}

fn apply_closure(
    closure: &Closure,
    args: Vec<Value>,
    out: &PrintHandler,
) -> Result<Value, RuntimeError> {
    let params = &closure.lambda.params;
    if params.len() != args.len() {
        return Err(ArityError {
            callee: "closure".to_owned(),
            expected: Arity::Exactly(params.len()),
            got: args.len(),
        });
    }

    trace!(?params, "apply closure");
    let env = closure.env.extend(params.iter().cloned().zip(args));
    closure.lambda.body.eval_in(&env, out)
}

#[cfg(test)]
mod tests {
    use super::evaluate_with;
    use crate::{
        runtime::{
            builtins::Builtins,
            env::Environment,
            print::{buffer_handler, PrintHandler},
            RuntimeError, Value,
            Value::{BoolValue, ClosureValue, NumberValue, StringValue},
        },
        syntax::tree::Expr,
    };
    use pretty_assertions::assert_eq;

    fn top_env() -> Environment {
        Builtins::init(&Environment::new())
    }

    fn eval(expr: &Expr) -> Result<Value, RuntimeError> {
        evaluate_with(expr, &top_env(), &PrintHandler::Silent)
    }

    fn call(op: &str, args: Vec<Expr>) -> Expr {
        Expr::apply(Expr::id(op), args)
    }

    #[test]
    fn literals_evaluate_to_themselves() {
        assert_eq!(eval(&Expr::number(42)), Ok(NumberValue(42)));
        assert_eq!(eval(&Expr::string("hello")), Ok(StringValue("hello".to_owned())));
        assert_eq!(eval(&Expr::bool(false)), Ok(BoolValue(false)));
    }

    #[test]
    fn identifiers_resolve_through_the_environment() {
        assert_eq!(eval(&Expr::id("true")), Ok(BoolValue(true)));
        assert_eq!(
            eval(&Expr::id("nope")),
            Err(RuntimeError::NameError("nope".to_owned()))
        );
    }

    #[test]
    fn if_picks_a_branch() {
        let pick = |cond| Expr::if_else(Expr::id(cond), Expr::number(1), Expr::number(2));
        assert_eq!(eval(&pick("true")), Ok(NumberValue(1)));
        assert_eq!(eval(&pick("false")), Ok(NumberValue(2)));
    }

    #[test]
    fn if_never_evaluates_the_other_branch() {
        let boom = call("/", vec![Expr::number(1), Expr::number(0)]);
        let expr = Expr::if_else(Expr::bool(true), Expr::number(1), boom.clone());
        assert_eq!(eval(&expr), Ok(NumberValue(1)));

        let expr = Expr::if_else(Expr::bool(false), boom, Expr::number(2));
        assert_eq!(eval(&expr), Ok(NumberValue(2)));
    }

    #[test]
    fn if_requires_a_boolean_condition() {
        let out = buffer_handler();
        let expr = Expr::if_else(
            Expr::number(0),
            call("println", vec![Expr::string("then")]),
            call("println", vec![Expr::string("else")]),
        );
        assert_eq!(
            evaluate_with(&expr, &top_env(), &out),
            Err(RuntimeError::TypeError("condition must be boolean".to_owned()))
        );
        assert_eq!(out.get_output(), "");
    }

    #[test]
    fn if_propagates_condition_failure() {
        let expr = Expr::if_else(Expr::id("missing"), Expr::number(1), Expr::number(2));
        assert_eq!(
            eval(&expr),
            Err(RuntimeError::NameError("missing".to_owned()))
        );
    }

    #[test]
    fn lambda_captures_the_defining_environment() {
        let env = top_env();
        let value = evaluate_with(
            &Expr::lambda(&["x"], Expr::id("x")),
            &env,
            &PrintHandler::Silent,
        )
        .unwrap();
        match value {
            ClosureValue(closure) => {
                assert_eq!(closure.lambda.params, vec!["x".to_owned()]);
                assert!(closure.env.ptr_eq(&env));
            }
            other => panic!("expected a closure, got {:?}", other),
        }
    }

    #[test]
    fn closures_are_lexically_scoped() {
        // ((x) => ((y) => (+ x y))) applied to 3, then to 4
        let adder = Expr::lambda(
            &["x"],
            Expr::lambda(&["y"], call("+", vec![Expr::id("x"), Expr::id("y")])),
        );
        let add3 = Expr::apply(adder, vec![Expr::number(3)]);
        assert_eq!(
            eval(&Expr::apply(add3.clone(), vec![Expr::number(4)])),
            Ok(NumberValue(7))
        );

        // a caller binding named `x` does not leak into the closure
        let caller = Expr::apply(
            Expr::lambda(&["f", "x"], Expr::apply(Expr::id("f"), vec![Expr::number(4)])),
            vec![add3, Expr::number(100)],
        );
        assert_eq!(eval(&caller), Ok(NumberValue(7)));
    }

    #[test]
    fn free_variables_are_not_dynamically_scoped() {
        // the body refers to `y`, which only the caller binds
        let expr = Expr::apply(
            Expr::lambda(&["f", "y"], Expr::apply(Expr::id("f"), vec![])),
            vec![Expr::lambda(&[], Expr::id("y")), Expr::number(1)],
        );
        assert_eq!(eval(&expr), Err(RuntimeError::NameError("y".to_owned())));
    }

    #[test]
    fn parameters_shadow_outer_bindings() {
        let expr = Expr::apply(
            Expr::lambda(&["true"], Expr::id("true")),
            vec![Expr::number(5)],
        );
        assert_eq!(eval(&expr), Ok(NumberValue(5)));
    }

    #[test]
    fn closure_arity_is_checked() {
        let expr = Expr::apply(
            Expr::lambda(&["x"], Expr::id("x")),
            vec![Expr::number(1), Expr::number(2)],
        );
        assert!(matches!(
            eval(&expr),
            Err(RuntimeError::ArityError { got: 2, .. })
        ));
    }

    #[test]
    fn applying_a_non_function_fails() {
        let expr = Expr::apply(Expr::number(42), vec![Expr::number(1)]);
        assert_eq!(
            eval(&expr),
            Err(RuntimeError::TypeError("cannot apply non-function value".to_owned()))
        );
    }

    #[test]
    fn arguments_evaluate_left_to_right_and_stop_at_the_first_failure() {
        let out = buffer_handler();
        let expr = call(
            "seq",
            vec![
                call("println", vec![Expr::string("a")]),
                Expr::id("missing"),
                call("println", vec![Expr::string("b")]),
            ],
        );
        assert_eq!(
            evaluate_with(&expr, &top_env(), &out),
            Err(RuntimeError::NameError("missing".to_owned()))
        );
        assert_eq!(out.get_output(), "a\n");
    }

    #[test]
    fn callee_failure_skips_the_arguments() {
        let out = buffer_handler();
        let expr = Expr::apply(
            Expr::id("missing"),
            vec![call("println", vec![Expr::string("a")])],
        );
        assert!(evaluate_with(&expr, &top_env(), &out).is_err());
        assert_eq!(out.get_output(), "");
    }

    #[test]
    fn deep_recursion_completes() {
        // count = (n self) => if (<= n 0) 0 else (+ 1 (self (- n 1) self))
        let count = Expr::lambda(
            &["n", "self"],
            Expr::if_else(
                call("<=", vec![Expr::id("n"), Expr::number(0)]),
                Expr::number(0),
                call(
                    "+",
                    vec![
                        Expr::number(1),
                        Expr::apply(
                            Expr::id("self"),
                            vec![
                                call("-", vec![Expr::id("n"), Expr::number(1)]),
                                Expr::id("self"),
                            ],
                        ),
                    ],
                ),
            ),
        );
        let expr = Expr::apply(
            Expr::lambda(
                &["count"],
                Expr::apply(Expr::id("count"), vec![Expr::number(20_000), Expr::id("count")]),
            ),
            vec![count],
        );
        assert_eq!(eval(&expr), Ok(NumberValue(20_000)));
    }
}
