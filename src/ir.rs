// Copyright 2026 Cornell University
// released under MIT License
// author: Kevin Laeufer <laeufer@cornell.edu>
// author: Francis Pham <fdp25@cornell.edu>

use cranelift_entity::{entity_impl, PrimaryMap};
use rustc_hash::FxHashMap;
use std::ops::Index;

use crate::errors::EvalError;

/// The two-valued level observed from a sensor or written to an actuator.
/// There is deliberately no "unknown" level.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Signal {
    High,
    Low,
}

impl Signal {
    /// Spelling of the level in the target language.
    pub fn token(&self) -> &'static str {
        match self {
            Signal::High => "HIGH",
            Signal::Low => "LOW",
        }
    }
}

/// Direction of a brick: `In` reads the pin (sensor), `Out` drives it (actuator).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Dir {
    In,
    Out,
}

#[derive(Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct BrickId(u32);
entity_impl!(BrickId, "brick");

#[derive(Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct StateId(u32);
entity_impl!(StateId, "state");

#[derive(Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct ExprId(u32);
entity_impl!(ExprId, "expr");

/// An addressable I/O point: a named pin with a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brick {
    name: String,
    pin: u8,
    dir: Dir,
}

impl Brick {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn dir(&self) -> Dir {
        self.dir
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum BinOp {
    And,
    Or,
}

impl BinOp {
    /// Spelling of the operator in the target language.
    pub fn token(&self) -> &'static str {
        match self {
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

/// A boolean guard node. `Primary` compares one brick's observed signal to an
/// expected level; `Binary` combines two sub-guards. Grouping is dictated by
/// the tree shape alone, never by operator precedence.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Expr {
    // leaf
    Primary(BrickId, Signal),
    // unary
    Unary(UnaryOp, ExprId),
    // binary
    Binary(BinOp, ExprId, ExprId),
}

/// An effect applied while a state is active: force a level onto an actuator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub actuator: BrickId,
    pub value: Signal,
}

/// A guarded edge of the state graph. The target is held by id, not by
/// ownership, since states reference each other through transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub guard: ExprId,
    pub next: StateId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    name: String,
    pub actions: Vec<Action>,
    pub transitions: Vec<Transition>,
}

impl State {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The whole compilable unit: declared bricks, declared states, the initial
/// state and the guard expression arena. Bricks, states and expressions live
/// in flat maps addressed by stable ids; anything that needs to point at them
/// stores the id. A `Binary` or `Unary` node can only reference ids that were
/// handed out before it was created, so guard trees are acyclic by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub name: String,
    pub initial: Option<StateId>,
    bricks: PrimaryMap<BrickId, Brick>,
    brick_by_name: FxHashMap<String, BrickId>,
    states: PrimaryMap<StateId, State>,
    state_by_name: FxHashMap<String, StateId>,
    exprs: PrimaryMap<ExprId, Expr>,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial: None,
            bricks: PrimaryMap::new(),
            brick_by_name: FxHashMap::default(),
            states: PrimaryMap::new(),
            state_by_name: FxHashMap::default(),
            exprs: PrimaryMap::new(),
        }
    }

    fn brick(&mut self, name: String, pin: u8, dir: Dir) -> BrickId {
        let id = self.bricks.push(Brick {
            name: name.clone(),
            pin,
            dir,
        });
        // first declaration wins; duplicates are rejected by validation
        self.brick_by_name.entry(name).or_insert(id);
        id
    }

    /// declare a sensor on the given pin
    pub fn sensor(&mut self, name: impl Into<String>, pin: u8) -> BrickId {
        self.brick(name.into(), pin, Dir::In)
    }

    /// declare an actuator on the given pin
    pub fn actuator(&mut self, name: impl Into<String>, pin: u8) -> BrickId {
        self.brick(name.into(), pin, Dir::Out)
    }

    /// declare a state with no actions and no outgoing transitions
    pub fn state(&mut self, name: impl Into<String>) -> StateId {
        let name = name.into();
        let id = self.states.push(State {
            name: name.clone(),
            actions: Vec::default(),
            transitions: Vec::default(),
        });
        self.state_by_name.entry(name).or_insert(id);
        id
    }

    /// add a new guard expression node to the app
    pub fn e(&mut self, expr: Expr) -> ExprId {
        self.exprs.push(expr)
    }

    pub fn primary(&mut self, brick: BrickId, value: Signal) -> ExprId {
        self.e(Expr::Primary(brick, value))
    }

    pub fn and(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.e(Expr::Binary(BinOp::And, lhs, rhs))
    }

    pub fn or(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.e(Expr::Binary(BinOp::Or, lhs, rhs))
    }

    pub fn not(&mut self, inner: ExprId) -> ExprId {
        self.e(Expr::Unary(UnaryOp::Not, inner))
    }

    /// append an on-entry action to a state
    pub fn act(&mut self, state: StateId, actuator: BrickId, value: Signal) {
        self.states[state].actions.push(Action { actuator, value });
    }

    /// append an outgoing transition to a state; declaration order is the
    /// order in which guards are checked by the generated program
    pub fn when(&mut self, state: StateId, guard: ExprId, next: StateId) {
        self.states[state].transitions.push(Transition { guard, next });
    }

    pub fn brick_id_from_name(&self, name: &str) -> Option<BrickId> {
        self.brick_by_name.get(name).copied()
    }

    pub fn state_id_from_name(&self, name: &str) -> Option<StateId> {
        self.state_by_name.get(name).copied()
    }

    /// bricks in declaration order
    pub fn bricks(&self) -> impl Iterator<Item = (BrickId, &Brick)> {
        self.bricks.iter()
    }

    /// states in declaration order
    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states.iter()
    }

    pub fn get_brick(&self, id: BrickId) -> Option<&Brick> {
        self.bricks.get(id)
    }

    pub fn get_state(&self, id: StateId) -> Option<&State> {
        self.states.get(id)
    }

    pub fn get_expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id)
    }

    /// Evaluate a guard tree against a snapshot of sensor readings.
    /// This is plain expression evaluation; it does not step the state machine.
    pub fn eval_guard(
        &self,
        expr: ExprId,
        readings: &FxHashMap<BrickId, Signal>,
    ) -> Result<bool, EvalError> {
        match self.exprs.get(expr) {
            None => Err(EvalError::DanglingExpr(expr)),
            Some(Expr::Primary(brick, expected)) => match readings.get(brick) {
                Some(observed) => Ok(observed == expected),
                None => {
                    let name = match self.bricks.get(*brick) {
                        Some(b) => b.name().to_string(),
                        None => brick.to_string(),
                    };
                    Err(EvalError::MissingReading(name))
                }
            },
            Some(Expr::Unary(UnaryOp::Not, inner)) => Ok(!self.eval_guard(*inner, readings)?),
            Some(Expr::Binary(BinOp::And, lhs, rhs)) => {
                Ok(self.eval_guard(*lhs, readings)? && self.eval_guard(*rhs, readings)?)
            }
            Some(Expr::Binary(BinOp::Or, lhs, rhs)) => {
                Ok(self.eval_guard(*lhs, readings)? || self.eval_guard(*rhs, readings)?)
            }
        }
    }
}

impl Index<BrickId> for App {
    type Output = Brick;

    fn index(&self, index: BrickId) -> &Self::Output {
        &self.bricks[index]
    }
}

impl Index<&BrickId> for App {
    type Output = Brick;

    fn index(&self, index: &BrickId) -> &Self::Output {
        &self.bricks[*index]
    }
}

impl Index<StateId> for App {
    type Output = State;

    fn index(&self, index: StateId) -> &Self::Output {
        &self.states[index]
    }
}

impl Index<&StateId> for App {
    type Output = State;

    fn index(&self, index: &StateId) -> &Self::Output {
        &self.states[*index]
    }
}

impl Index<ExprId> for App {
    type Output = Expr;

    fn index(&self, index: ExprId) -> &Self::Output {
        &self.exprs[index]
    }
}

impl Index<&ExprId> for App {
    type Output = Expr;

    fn index(&self, index: &ExprId) -> &Self::Output {
        &self.exprs[*index]
    }
}
