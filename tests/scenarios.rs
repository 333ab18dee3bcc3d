//! End-to-end pipeline scenarios: grammar -> sets -> collection -> table ->
//! interpreter, exercised the way a caller actually uses this crate.
use std::fmt;

use parsegen::{
    build, Associativity, GrammarSpec, InterpError, LlInterpreter, LrInterpreter, Mode, Options,
    RhsAlt, SemanticActionEvaluator, Value,
};

fn init_logging() {
    let _ = env_logger::try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum CalcTag {
    Plus,
    Star,
    Caret,
    Number,
    End,
}

impl fmt::Display for CalcTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            CalcTag::Plus => "+",
            CalcTag::Star => "*",
            CalcTag::Caret => "^",
            CalcTag::Number => "NUMBER",
            CalcTag::End => "$",
        };
        write!(f, "{s}")
    }
}

fn calc_lexer() -> lexan::LexicalAnalyzer<CalcTag> {
    lexan::LexicalAnalyzer::new(
        &[
            (CalcTag::Plus, "+"),
            (CalcTag::Star, "*"),
            (CalcTag::Caret, "^"),
        ],
        &[(CalcTag::Number, "[0-9]+")],
        &[r"\s+"],
        CalcTag::End,
    )
    .unwrap()
}

struct ArithmeticEvaluator<'g> {
    grammar: &'g parsegen::Grammar,
}

impl<'g> SemanticActionEvaluator for ArithmeticEvaluator<'g> {
    fn evaluate(&self, production_number: u32, args: &[Value]) -> Result<Value, InterpError> {
        let production = self
            .grammar
            .get_production(production_number)
            .expect("evaluator only sees known productions");
        match production.rhs().len() {
            1 => {
                let Value::Token(lexeme) = &args[0] else {
                    panic!("NUMBER production's single child must be a token")
                };
                Ok(Value::Int(lexeme.parse().expect("NUMBER lexeme is digits")))
            }
            3 => {
                let left = match &args[0] {
                    Value::Int(n) => *n,
                    _ => panic!("left operand must already be reduced to Int"),
                };
                let right = match &args[2] {
                    Value::Int(n) => *n,
                    _ => panic!("right operand must already be reduced to Int"),
                };
                let result = match production.rhs()[1].name() {
                    "+" => left + right,
                    "*" => left * right,
                    "^" => {
                        let mut acc = 1i64;
                        for _ in 0..right {
                            acc *= left;
                        }
                        acc
                    }
                    other => panic!("unexpected operator {other}"),
                };
                Ok(Value::Int(result))
            }
            _ => Ok(args.first().cloned().unwrap_or(Value::Unit)),
        }
    }
}

fn eval_calc(spec: &GrammarSpec, input: &str) -> i64 {
    let options = Options {
        mode: spec.mode,
        resolve_conflicts: true,
        case_insensitive: false,
        capture_locations: true,
    };
    let built = build(spec, &options).expect("grammar builds");
    let table = built.lr_table.as_ref().expect("LR mode produces a table");
    let evaluator = ArithmeticEvaluator {
        grammar: &built.grammar,
    };
    let interpreter = LrInterpreter::new(&built.grammar, table, &evaluator);
    let lexer = calc_lexer();
    let mut stream = lexer.token_stream(input.to_string(), "test");
    let accepted = interpreter
        .parse(&mut stream, |tag| tag.to_string())
        .unwrap_or_else(|e| panic!("parse of {input:?} failed: {e}"));
    match accepted.value {
        Value::Int(n) => n,
        other => panic!("expected Int result, got {other:?}"),
    }
}

/// S1 - additive calculator, LALR(1): precedence resolves all 4
/// shift/reduce conflicts on {+, *}.
#[test]
fn s1_additive_calculator_respects_precedence() {
    init_logging();
    let spec = GrammarSpec::new(Mode::Lalr1BySlr1)
        .with_operator(Associativity::Left, &["+"])
        .with_operator(Associativity::Left, &["*"])
        .with_production(
            "E",
            vec![
                RhsAlt::new("E + E"),
                RhsAlt::new("E * E"),
                RhsAlt::new("NUMBER"),
            ],
        );

    let options = Options {
        mode: spec.mode,
        resolve_conflicts: true,
        ..Options::default()
    };
    let built = build(&spec, &options).unwrap();
    let table = built.lr_table.as_ref().unwrap();
    assert_eq!(table.conflicts().len(), 4);
    assert!(!table.has_unresolved_conflicts());

    assert_eq!(eval_calc(&spec, "1+2*3"), 7);
    assert_eq!(eval_calc(&spec, "1*2+3"), 5);
}

/// S2 - right-associative exponent, higher precedence than `*`, which is
/// higher than `+`.
#[test]
fn s2_right_associative_exponent_folds_right_to_left() {
    init_logging();
    let spec = GrammarSpec::new(Mode::Lalr1BySlr1)
        .with_operator(Associativity::Left, &["+"])
        .with_operator(Associativity::Left, &["*"])
        .with_operator(Associativity::Right, &["^"])
        .with_production(
            "E",
            vec![
                RhsAlt::new("E + E"),
                RhsAlt::new("E * E"),
                RhsAlt::new("E ^ E"),
                RhsAlt::new("NUMBER"),
            ],
        );

    assert_eq!(eval_calc(&spec, "2^2^2^2"), 65536);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum IfTag {
    If,
    Then,
    Else,
    X,
    End,
}

impl fmt::Display for IfTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            IfTag::If => "if",
            IfTag::Then => "then",
            IfTag::Else => "else",
            IfTag::X => "x",
            IfTag::End => "$",
        };
        write!(f, "{s}")
    }
}

struct AcceptEverythingEvaluator;
impl SemanticActionEvaluator for AcceptEverythingEvaluator {
    fn evaluate(&self, _production_number: u32, _args: &[Value]) -> Result<Value, InterpError> {
        Ok(Value::Unit)
    }
}

/// S3 - dangling else, SLR(1): one shift/reduce conflict on `else`;
/// `resolve_conflicts` makes shift win, binding `else` to the inner `if`.
#[test]
fn s3_dangling_else_shift_wins_with_resolution() {
    init_logging();
    let spec = GrammarSpec::new(Mode::Slr1).with_production(
        "S",
        vec![
            RhsAlt::new("if E then S"),
            RhsAlt::new("if E then S else S"),
            RhsAlt::new("x"),
        ],
    );
    let spec = spec.with_production("E", vec![RhsAlt::new("x")]);

    let options = Options {
        mode: Mode::Slr1,
        resolve_conflicts: true,
        ..Options::default()
    };
    let built = build(&spec, &options).unwrap();
    let table = built.lr_table.as_ref().unwrap();
    assert_eq!(table.conflicts().len(), 1);
    assert!(!table.has_unresolved_conflicts());

    let lexer = lexan::LexicalAnalyzer::new(
        &[
            (IfTag::If, "if"),
            (IfTag::Then, "then"),
            (IfTag::Else, "else"),
            (IfTag::X, "x"),
        ],
        &[],
        &[r"\s+"],
        IfTag::End,
    )
    .unwrap();
    let mut stream = lexer.token_stream("if x then if x then x else x".to_string(), "test");
    let evaluator = AcceptEverythingEvaluator;
    let interpreter = LrInterpreter::new(&built.grammar, table, &evaluator);
    interpreter
        .parse(&mut stream, |tag| tag.to_string())
        .expect("dangling else resolves and the input parses");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum ArithLlTag {
    LParen,
    RParen,
    Plus,
    Id,
    End,
}

impl fmt::Display for ArithLlTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ArithLlTag::LParen => "(",
            ArithLlTag::RParen => ")",
            ArithLlTag::Plus => "+",
            ArithLlTag::Id => "id",
            ArithLlTag::End => "$",
        };
        write!(f, "{s}")
    }
}

/// Closure-backed LL(1) evaluator: each `id` is worth 1, `E' -> + T E'`
/// folds its tail into a running sum, and `T -> ( E )` passes the
/// parenthesized value through untouched.
struct ArithLlEvaluator;

impl SemanticActionEvaluator for ArithLlEvaluator {
    fn evaluate(&self, production_number: u32, args: &[Value]) -> Result<Value, InterpError> {
        let as_int = |v: &Value| match v {
            Value::Int(n) => *n,
            other => panic!("expected an already-reduced Int, got {other:?}"),
        };
        match production_number {
            // E -> T E'
            1 => Ok(Value::Int(as_int(&args[0]) + as_int(&args[1]))),
            // E' -> + T E'
            2 => Ok(Value::Int(as_int(&args[1]) + as_int(&args[2]))),
            // E' -> ε
            3 => Ok(Value::Int(0)),
            // T -> ( E )
            4 => Ok(args[1].clone()),
            // T -> id
            5 => Ok(Value::Int(1)),
            other => panic!("unexpected production {other} in arithmetic LL grammar"),
        }
    }
}

/// S4 - LL(1) arithmetic: FIRST/FOLLOW leave no PREDICT collision, and
/// `id+id+id` is accepted and folds to the expected synthesized value.
#[test]
fn s4_ll1_arithmetic_has_no_collision_and_accepts() {
    init_logging();
    let spec = GrammarSpec::new(Mode::Ll1)
        .with_start("E")
        .with_production("E", vec![RhsAlt::new("T E'")])
        .with_production("E'", vec![RhsAlt::new("+ T E'"), RhsAlt::new("")])
        .with_production("T", vec![RhsAlt::new("( E )"), RhsAlt::new("id")]);

    let options = Options {
        mode: Mode::Ll1,
        ..Options::default()
    };
    let built = build(&spec, &options).unwrap();
    let table = built.ll_table.as_ref().unwrap();
    assert!(table.conflicts().is_empty());

    let lexer = lexan::LexicalAnalyzer::new(
        &[
            (ArithLlTag::LParen, "("),
            (ArithLlTag::RParen, ")"),
            (ArithLlTag::Plus, "+"),
        ],
        &[(ArithLlTag::Id, "id")],
        &[r"\s+"],
        ArithLlTag::End,
    )
    .unwrap();
    let mut stream = lexer.token_stream("id+id+id".to_string(), "test");
    let evaluator = ArithLlEvaluator;
    let interpreter = LlInterpreter::new(&built.grammar, table, &evaluator);
    let accepted = interpreter
        .parse(&mut stream, |tag| tag.to_string())
        .expect("id+id+id is accepted by the LL(1) table");
    match accepted.value {
        Value::Int(3) => {}
        other => panic!("expected id+id+id to fold to 3, got {other:?}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum EmptyTag {
    End,
}

impl fmt::Display for EmptyTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "$")
    }
}

/// S5 - reduce/reduce on empty productions: one conflict recorded on `$`,
/// lower-numbered production wins when resolution is enabled.
#[test]
fn s5_reduce_reduce_on_empty_resolves_to_lower_numbered_production() {
    init_logging();
    let spec = GrammarSpec::new(Mode::Slr1)
        .with_production("S", vec![RhsAlt::new("A"), RhsAlt::new("B")])
        .with_production("A", vec![RhsAlt::new("")])
        .with_production("B", vec![RhsAlt::new("")]);

    let options = Options {
        mode: Mode::Slr1,
        resolve_conflicts: true,
        ..Options::default()
    };
    let built = build(&spec, &options).unwrap();
    let table = built.lr_table.as_ref().unwrap();

    assert_eq!(table.conflicts().len(), 1);
    assert_eq!(
        table.conflicts()[0].kind,
        parsegen::lr_table::ConflictKind::ReduceReduce
    );
    assert!(!table.has_unresolved_conflicts());

    match table.action(0, "$") {
        Some(parsegen::Action::Reduce(3)) => {}
        other => panic!("expected reduce(3) (A -> epsilon) to win, got {other:?}"),
    }

    let lexer =
        lexan::LexicalAnalyzer::new(&[], &[], &[], EmptyTag::End).unwrap();
    let mut stream = lexer.token_stream(String::new(), "test");
    let evaluator = AcceptEverythingEvaluator;
    let interpreter = LrInterpreter::new(&built.grammar, table, &evaluator);
    interpreter
        .parse(&mut stream, |tag| tag.to_string())
        .expect("empty input accepts via the resolved reduce/reduce cell");
}
