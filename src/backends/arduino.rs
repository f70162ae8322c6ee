// Copyright 2026 Cornell University
// released under MIT License
// author: Kevin Laeufer <laeufer@cornell.edu>
// author: Francis Pham <fdp25@cornell.edu>

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::diagnostic::DiagnosticHandler;
use crate::errors::GenerateResult;
use crate::ir::{Action, App, Brick, Dir, Expr, ExprId, State, Transition, UnaryOp};
use crate::validate;

/// Compile the whole model into a Wiring sketch. The model is checked first
/// and nothing is written on a validation failure; a successful call emits
/// the full sketch. Generation is a pure function of the model: the same app
/// always produces byte-identical text.
pub fn to_wiring(
    app: &App,
    handler: &mut DiagnosticHandler,
    out: &mut impl Write,
) -> GenerateResult<()> {
    validate::check(app, handler)?;

    // header
    writeln!(out, "// Wiring code generated from an ArduinoML model")?;
    writeln!(out, "// Application name: {}", app.name)?;
    writeln!(out)?;
    writeln!(out, "long time = 0;")?;
    writeln!(out, "long debounce = 200;")?;
    writeln!(out)?;

    // one enum constant per state, in declaration order
    let state_names: Vec<&str> = app.states().map(|(_, s)| s.name()).collect();
    writeln!(out, "enum STATE {{{}}};", state_names.join(", "))?;

    // initial state marker
    if let Some(initial) = app.initial {
        writeln!(out, "STATE currentState = {};", app[initial].name())?;
    }
    writeln!(out)?;

    // pin setup, once per brick, in declaration order
    writeln!(out, "void setup() {{")?;
    for (_, brick) in app.bricks() {
        brick_to_wiring(out, brick)?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;

    // the polling section
    writeln!(out, "void loop() {{")?;
    writeln!(out, "  switch (currentState) {{")?;
    for (_, state) in app.states() {
        state_to_wiring(out, app, state)?;
    }
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;

    log::debug!("generated wiring sketch for application '{}'", app.name);

    Ok(())
}

pub fn to_wiring_string(app: &App, handler: &mut DiagnosticHandler) -> GenerateResult<String> {
    let mut out = Vec::new();
    to_wiring(app, handler, &mut out)?;
    let out = String::from_utf8(out).unwrap();
    Ok(out)
}

/// Generate the sketch and write it to `<dir>/<app name>.ino`.
pub fn write_ino_file(
    app: &App,
    handler: &mut DiagnosticHandler,
    dir: impl AsRef<Path>,
) -> GenerateResult<PathBuf> {
    let sketch = to_wiring_string(app, handler)?;
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.ino", app.name));
    std::fs::write(&path, sketch)?;
    log::debug!("wrote generated sketch to {}", path.display());
    Ok(path)
}

fn brick_to_wiring(out: &mut impl Write, brick: &Brick) -> std::io::Result<()> {
    let (mode, kind) = match brick.dir() {
        Dir::In => ("INPUT", "Sensor"),
        Dir::Out => ("OUTPUT", "Actuator"),
    };
    writeln!(
        out,
        "  pinMode({}, {}); // {} [{}]",
        brick.pin(),
        mode,
        brick.name(),
        kind
    )
}

/// One `case` per state: its actions in declared order, then its transition
/// ladder in declared order.
fn state_to_wiring(out: &mut impl Write, app: &App, state: &State) -> std::io::Result<()> {
    writeln!(out, "    case {}:", state.name())?;
    for action in &state.actions {
        action_to_wiring(out, app, action)?;
    }
    for transition in &state.transitions {
        transition_to_wiring(out, app, transition)?;
    }
    writeln!(out, "      break;")
}

fn action_to_wiring(out: &mut impl Write, app: &App, action: &Action) -> std::io::Result<()> {
    writeln!(
        out,
        "      digitalWrite({}, {});",
        app[action.actuator].pin(),
        action.value.token()
    )
}

/// The `break` inside the `if` leaves the surrounding `switch`, so the first
/// transition whose guard holds wins and no later guard is even read in that
/// poll cycle.
fn transition_to_wiring(
    out: &mut impl Write,
    app: &App,
    transition: &Transition,
) -> std::io::Result<()> {
    writeln!(
        out,
        "      if (({}) && millis() - time > debounce) {{",
        expr_to_wiring(app, transition.guard)
    )?;
    writeln!(out, "        time = millis();")?;
    writeln!(out, "        currentState = {};", app[transition.next].name())?;
    writeln!(out, "        break;")?;
    writeln!(out, "      }}")
}

/// Render a guard tree as a target-language condition. Grouping comes from
/// the tree shape alone: both operands of a binary node are parenthesized
/// individually, leaf or composite, so the target compiler's precedence
/// rules never get a say.
pub fn expr_to_wiring(app: &App, expr_id: ExprId) -> String {
    match &app[expr_id] {
        Expr::Primary(brick, value) => {
            format!("digitalRead({}) == {}", app[brick].pin(), value.token())
        }
        Expr::Unary(UnaryOp::Not, inner) => "!(".to_owned() + &expr_to_wiring(app, *inner) + ")",
        Expr::Binary(op, lhs, rhs) => format!(
            "({}) {} ({})",
            expr_to_wiring(app, *lhs),
            op.token(),
            expr_to_wiring(app, *rhs)
        ),
    }
}
