use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Mul, Neg, Sub},
    rc::Rc,
};

/// An immutable expression tree.
///
/// Cloning an [`Expression`] is cheap, the underlying [`Node`] is reference
/// counted so sub-trees can be shared between several parents.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    node: Rc<Node>,
}

/// The different shapes an [`Expression`] can take.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(i64),
    Variable(SmolStr),
    /// Negate the operand.
    Negate(Expression),
    /// An expression involving two operands.
    Binary {
        left: Expression,
        right: Expression,
        op: BinaryOperation,
    },
    /// The natural logarithm of the operand.
    NaturalLog(Expression),
}

/// An operation that can be applied to two arguments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOperation {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl BinaryOperation {
    pub fn symbol(self) -> char {
        match self {
            BinaryOperation::Plus => '+',
            BinaryOperation::Minus => '-',
            BinaryOperation::Times => '*',
            BinaryOperation::Divide => '/',
            BinaryOperation::Power => '^',
        }
    }
}

/// A flat tag for each kind of [`Node`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Constant,
    Variable,
    Negate,
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    NaturalLog,
}

impl Kind {
    /// How many child expressions a node of this kind holds.
    pub fn arity(self) -> usize {
        match self {
            Kind::Constant | Kind::Variable => 0,
            Kind::Negate | Kind::NaturalLog => 1,
            Kind::Add
            | Kind::Subtract
            | Kind::Multiply
            | Kind::Divide
            | Kind::Power => 2,
        }
    }

    fn as_binary_op(self) -> Option<BinaryOperation> {
        match self {
            Kind::Add => Some(BinaryOperation::Plus),
            Kind::Subtract => Some(BinaryOperation::Minus),
            Kind::Multiply => Some(BinaryOperation::Times),
            Kind::Divide => Some(BinaryOperation::Divide),
            Kind::Power => Some(BinaryOperation::Power),
            _ => None,
        }
    }
}

impl From<BinaryOperation> for Kind {
    fn from(op: BinaryOperation) -> Kind {
        match op {
            BinaryOperation::Plus => Kind::Add,
            BinaryOperation::Minus => Kind::Subtract,
            BinaryOperation::Times => Kind::Multiply,
            BinaryOperation::Divide => Kind::Divide,
            BinaryOperation::Power => Kind::Power,
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Constant => write!(f, "constant"),
            Kind::Variable => write!(f, "variable"),
            Kind::Negate => write!(f, "-"),
            Kind::NaturalLog => write!(f, "ln"),
            other => match other.as_binary_op() {
                Some(op) => write!(f, "{}", op.symbol()),
                None => unreachable!("{:?} is a binary kind", other),
            },
        }
    }
}

/// Reasons an [`Expression`] can't be constructed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Cannot divide by 0")]
    DivideByZero,
    #[error("A \"{kind}\" node takes {expected} operands, but {found} were provided")]
    WrongArity {
        kind: Kind,
        expected: usize,
        found: usize,
    },
    #[error("A \"{kind}\" node can't be built from operands")]
    NotCompound { kind: Kind },
}

impl Expression {
    /// Wrap a [`Node`], checking it against the tree's invariants.
    pub fn new(node: Node) -> Result<Self, ConstructionError> {
        if let Node::Binary {
            right,
            op: BinaryOperation::Divide,
            ..
        } = &node
        {
            // only a literal zero is caught here, "x/(1-1)" is fine
            if let Node::Constant(0) = right.node() {
                return Err(ConstructionError::DivideByZero);
            }
        }

        Ok(Expression {
            node: Rc::new(node),
        })
    }

    /// Build a compound node from its kind and a list of operands.
    pub fn compound(
        kind: Kind,
        operands: &[Expression],
    ) -> Result<Self, ConstructionError> {
        if kind.arity() == 0 {
            return Err(ConstructionError::NotCompound { kind });
        }

        if operands.len() != kind.arity() {
            return Err(ConstructionError::WrongArity {
                kind,
                expected: kind.arity(),
                found: operands.len(),
            });
        }

        match (kind, operands) {
            (Kind::Negate, [operand]) => Ok(Expression::negate(operand.clone())),
            (Kind::NaturalLog, [operand]) => {
                Ok(Expression::natural_log(operand.clone()))
            },
            (_, [left, right]) => match kind.as_binary_op() {
                Some(op) => Expression::binary(op, left.clone(), right.clone()),
                None => unreachable!("{:?} takes two operands", kind),
            },
            _ => unreachable!("The arity was checked above"),
        }
    }

    pub fn constant(value: i64) -> Self {
        Expression::leaf(Node::Constant(value))
    }

    pub fn variable<S: Into<SmolStr>>(name: S) -> Self {
        Expression::leaf(Node::Variable(name.into()))
    }

    pub fn negate(operand: Expression) -> Self {
        Expression::leaf(Node::Negate(operand))
    }

    pub fn natural_log(operand: Expression) -> Self {
        Expression::leaf(Node::NaturalLog(operand))
    }

    pub fn binary(
        op: BinaryOperation,
        left: Expression,
        right: Expression,
    ) -> Result<Self, ConstructionError> {
        Expression::new(Node::Binary { left, right, op })
    }

    pub fn divide(
        left: Expression,
        right: Expression,
    ) -> Result<Self, ConstructionError> {
        Expression::binary(BinaryOperation::Divide, left, right)
    }

    /// Raise this expression to some power.
    pub fn pow(self, exponent: Expression) -> Expression {
        Expression::infallible(BinaryOperation::Power, self, exponent)
    }

    pub fn node(&self) -> &Node { &self.node }

    pub fn kind(&self) -> Kind {
        match self.node() {
            Node::Constant(_) => Kind::Constant,
            Node::Variable(_) => Kind::Variable,
            Node::Negate(_) => Kind::Negate,
            Node::NaturalLog(_) => Kind::NaturalLog,
            Node::Binary { op, .. } => Kind::from(*op),
        }
    }

    /// Do these two handles point at the very same node?
    pub fn ptr_eq(&self, other: &Expression) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// The distinct variable names used in this expression, in order of
    /// first appearance.
    pub fn variables(&self) -> Vec<SmolStr> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<SmolStr>) {
        match self.node() {
            Node::Constant(_) => {},
            Node::Variable(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            },
            Node::Negate(operand) | Node::NaturalLog(operand) => {
                operand.collect_variables(names)
            },
            Node::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            },
        }
    }

    // Nodes which can never violate an invariant.
    fn leaf(node: Node) -> Self {
        Expression {
            node: Rc::new(node),
        }
    }

    fn infallible(
        op: BinaryOperation,
        left: Expression,
        right: Expression,
    ) -> Self {
        debug_assert_ne!(op, BinaryOperation::Divide);
        Expression::leaf(Node::Binary { left, right, op })
    }
}

// define some operator overloads to make constructing an expression easier.
// There is no `Div` because dividing can fail.

impl Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        Expression::infallible(BinaryOperation::Plus, self, rhs)
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression {
        Expression::infallible(BinaryOperation::Minus, self, rhs)
    }
}

impl Mul for Expression {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        Expression::infallible(BinaryOperation::Times, self, rhs)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Self::Output { Expression::negate(self) }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Constant(value) => write!(f, "{}", value),
            Node::Variable(name) => write!(f, "{}", name),
            Node::Negate(operand) => write!(f, "-({})", operand),
            Node::NaturalLog(operand) => write!(f, "ln({})", operand),
            Node::Binary { left, right, op } => {
                write!(f, "({}){}({})", left, op.symbol(), right)
            },
        }
    }
}
