// Copyright 2026 Cornell University
// released under MIT License
// author: Kevin Laeufer <laeufer@cornell.edu>
// author: Ernest Ng <eyn5@cornell.edu>

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use crate::diagnostic::{DiagnosticHandler, ErrorKey, Level};
use crate::errors::ModelError;
use crate::ir::{App, BrickId, Dir, Expr, ExprId, UnaryOp};

lazy_static::lazy_static! {
    /// Words that cannot be used as brick or state names: keywords of the
    /// target language plus the identifiers the wiring backend emits itself.
    static ref RESERVED: FxHashSet<&'static str> = [
        // C/C++ keywords
        "auto", "bool", "break", "case", "char", "class", "const", "continue",
        "default", "delete", "do", "double", "else", "enum", "extern", "false",
        "float", "for", "goto", "if", "int", "long", "new", "private",
        "protected", "public", "return", "short", "signed", "sizeof", "static",
        "struct", "switch", "template", "this", "true", "typedef", "union",
        "unsigned", "void", "volatile", "while",
        // Arduino core
        "HIGH", "LOW", "INPUT", "OUTPUT", "setup", "loop", "pinMode",
        "digitalRead", "digitalWrite", "millis",
        // emitted by the wiring backend
        "STATE", "currentState", "time", "debounce",
    ]
    .into_iter()
    .collect();
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct Checker<'a> {
    handler: &'a mut DiagnosticHandler,
    first: Option<ModelError>,
}

impl Checker<'_> {
    fn error(&mut self, key: ErrorKey, err: ModelError) {
        self.handler
            .emit_model_diagnostic(key, &err.to_string(), Level::Error);
        if self.first.is_none() {
            self.first = Some(err);
        }
    }

    fn warning(&mut self, key: ErrorKey, message: &str) {
        self.handler.emit_model_diagnostic(key, message, Level::Warning);
    }
}

/// Check every structural precondition of the model before generation.
/// All findings are reported through the handler; the first error is
/// returned so callers can abort without producing partial output.
pub fn check(app: &App, handler: &mut DiagnosticHandler) -> Result<(), ModelError> {
    let mut ck = Checker {
        handler,
        first: None,
    };

    if app.name.is_empty() {
        ck.error(ErrorKey::AppKey, ModelError::EmptyAppName);
    } else if !app.name.starts_with(|c: char| c.is_ascii_uppercase()) {
        ck.warning(ErrorKey::AppKey, "application name should start with a capital");
    }

    let mut pins_seen: FxHashMap<u8, BrickId> = FxHashMap::default();
    for (id, brick) in app.bricks() {
        if brick.name().is_empty() {
            ck.error(ErrorKey::BrickKey(id), ModelError::EmptyBrickName);
        } else if !is_identifier(brick.name()) {
            ck.error(
                ErrorKey::BrickKey(id),
                ModelError::InvalidName(brick.name().to_string()),
            );
        } else if RESERVED.contains(brick.name()) {
            ck.error(
                ErrorKey::BrickKey(id),
                ModelError::ReservedName(brick.name().to_string()),
            );
        } else if app.brick_id_from_name(brick.name()) != Some(id) {
            ck.error(
                ErrorKey::BrickKey(id),
                ModelError::DuplicateBrick(brick.name().to_string()),
            );
        }

        if let Some(&other) = pins_seen.get(&brick.pin()) {
            let message = format!(
                "pin {} is assigned to both '{}' and '{}'",
                brick.pin(),
                app[other].name(),
                brick.name()
            );
            ck.warning(ErrorKey::BrickKey(id), &message);
        } else {
            pins_seen.insert(brick.pin(), id);
        }
    }

    for (id, state) in app.states() {
        if state.name().is_empty() {
            ck.error(ErrorKey::StateKey(id), ModelError::EmptyStateName);
        } else if !is_identifier(state.name()) {
            ck.error(
                ErrorKey::StateKey(id),
                ModelError::InvalidName(state.name().to_string()),
            );
        } else if RESERVED.contains(state.name()) {
            ck.error(
                ErrorKey::StateKey(id),
                ModelError::ReservedName(state.name().to_string()),
            );
        } else if app.state_id_from_name(state.name()) != Some(id) {
            ck.error(
                ErrorKey::StateKey(id),
                ModelError::DuplicateState(state.name().to_string()),
            );
        }
    }

    match app.initial {
        None => ck.error(ErrorKey::InitialKey, ModelError::NoInitialState),
        Some(id) if app.get_state(id).is_none() => {
            ck.error(ErrorKey::InitialKey, ModelError::DanglingInitialState)
        }
        Some(_) => {}
    }

    // guard trees must form a forest: every node has exactly one parent
    let mut guard_nodes_seen: FxHashSet<ExprId> = FxHashSet::default();

    for (sid, state) in app.states() {
        for (ii, action) in state.actions.iter().enumerate() {
            match app.get_brick(action.actuator) {
                None => ck.error(
                    ErrorKey::ActionKey(sid, ii),
                    ModelError::UndeclaredActionBrick {
                        state: state.name().to_string(),
                    },
                ),
                Some(brick) if brick.dir() == Dir::In => ck.error(
                    ErrorKey::ActionKey(sid, ii),
                    ModelError::ActionOnSensor {
                        state: state.name().to_string(),
                        brick: brick.name().to_string(),
                    },
                ),
                Some(_) => {}
            }
        }

        for (ii, transition) in state.transitions.iter().enumerate() {
            if app.get_state(transition.next).is_none() {
                ck.error(
                    ErrorKey::TransitionKey(sid, ii),
                    ModelError::DanglingTargetState {
                        state: state.name().to_string(),
                        index: ii,
                    },
                );
            }
            check_guard(
                app,
                &mut ck,
                state.name(),
                ii,
                transition.guard,
                &mut guard_nodes_seen,
            );
        }
    }

    match ck.first {
        Some(err) => Err(err),
        None => {
            log::debug!(
                "validated application '{}' ({} bricks, {} states)",
                app.name,
                app.bricks().count(),
                app.states().count()
            );
            Ok(())
        }
    }
}

fn check_guard(
    app: &App,
    ck: &mut Checker,
    state_name: &str,
    index: usize,
    expr: ExprId,
    seen: &mut FxHashSet<ExprId>,
) {
    if !seen.insert(expr) {
        ck.error(ErrorKey::ExprKey(expr), ModelError::SharedGuardNode { node: expr });
        return;
    }
    match app.get_expr(expr) {
        None => ck.error(
            ErrorKey::ExprKey(expr),
            ModelError::DanglingGuardNode {
                state: state_name.to_string(),
                index,
            },
        ),
        Some(Expr::Primary(brick, _)) => match app.get_brick(*brick) {
            None => ck.error(
                ErrorKey::ExprKey(expr),
                ModelError::UndeclaredGuardBrick {
                    state: state_name.to_string(),
                },
            ),
            Some(b) if b.dir() == Dir::Out => ck.error(
                ErrorKey::ExprKey(expr),
                ModelError::GuardOnActuator {
                    state: state_name.to_string(),
                    brick: b.name().to_string(),
                },
            ),
            Some(_) => {}
        },
        Some(Expr::Unary(UnaryOp::Not, inner)) => {
            check_guard(app, ck, state_name, index, *inner, seen)
        }
        Some(Expr::Binary(_, lhs, rhs)) => {
            check_guard(app, ck, state_name, index, *lhs, seen);
            check_guard(app, ck, state_name, index, *rhs, seen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::tests::{build_dual_check_alarm, build_security_system};
    use crate::ir::Signal;
    use strip_ansi_escapes::strip_str;

    fn handler() -> DiagnosticHandler {
        DiagnosticHandler::default()
    }

    #[test]
    fn security_system_is_well_formed() {
        let app = build_security_system();
        let mut handler = handler();
        assert_eq!(check(&app, &mut handler), Ok(()));
        assert!(handler.error_string().is_empty());
    }

    #[test]
    fn dual_check_alarm_is_well_formed() {
        let app = build_dual_check_alarm();
        let mut handler = handler();
        assert_eq!(check(&app, &mut handler), Ok(()));
    }

    #[test]
    fn lowercase_app_name_is_only_a_warning() {
        let mut app = build_security_system();
        app.name = "securitySystem".to_string();
        let mut handler = handler();
        assert_eq!(check(&app, &mut handler), Ok(()));

        let content = strip_str(handler.error_string());
        assert!(content.contains("warning: application name should start with a capital"));
    }

    #[test]
    fn duplicate_brick_name_is_rejected() {
        let mut app = build_security_system();
        app.sensor("door", 7);
        let mut handler = handler();
        assert_eq!(
            check(&app, &mut handler),
            Err(ModelError::DuplicateBrick("door".to_string()))
        );
        assert!(strip_str(handler.error_string()).contains("duplicate brick name 'door'"));
    }

    #[test]
    fn duplicate_state_name_is_rejected() {
        let mut app = build_security_system();
        app.state("safe");
        let mut handler = handler();
        assert_eq!(
            check(&app, &mut handler),
            Err(ModelError::DuplicateState("safe".to_string()))
        );
    }

    #[test]
    fn reserved_word_as_state_name_is_rejected() {
        let mut app = build_security_system();
        app.state("while");
        let mut handler = handler();
        assert_eq!(
            check(&app, &mut handler),
            Err(ModelError::ReservedName("while".to_string()))
        );
    }

    #[test]
    fn non_identifier_brick_name_is_rejected() {
        let mut app = build_security_system();
        app.sensor("front door", 7);
        let mut handler = handler();
        assert_eq!(
            check(&app, &mut handler),
            Err(ModelError::InvalidName("front door".to_string()))
        );
    }

    #[test]
    fn missing_initial_state_is_rejected() {
        let mut app = build_security_system();
        app.initial = None;
        let mut handler = handler();
        assert_eq!(check(&app, &mut handler), Err(ModelError::NoInitialState));
    }

    #[test]
    fn dangling_initial_state_is_rejected() {
        // a state id minted by a different app does not resolve here
        let mut donor = crate::ir::App::new("Donor");
        donor.state("a");
        donor.state("b");
        let stray = donor.state("c");

        let mut app = build_security_system();
        app.initial = Some(stray);
        let mut handler = handler();
        assert_eq!(
            check(&app, &mut handler),
            Err(ModelError::DanglingInitialState)
        );
    }

    #[test]
    fn dangling_target_state_is_rejected() {
        let mut donor = crate::ir::App::new("Donor");
        donor.state("a");
        donor.state("b");
        let stray = donor.state("c");

        let mut app = build_security_system();
        let safe = app.state_id_from_name("safe").unwrap();
        let motion = app.brick_id_from_name("motion").unwrap();
        let guard = app.primary(motion, Signal::High);
        app.when(safe, guard, stray);

        let mut handler = handler();
        assert_eq!(
            check(&app, &mut handler),
            Err(ModelError::DanglingTargetState {
                state: "safe".to_string(),
                index: 1,
            })
        );
    }

    #[test]
    fn action_on_sensor_is_rejected() {
        let mut app = build_security_system();
        let safe = app.state_id_from_name("safe").unwrap();
        let motion = app.brick_id_from_name("motion").unwrap();
        app.act(safe, motion, Signal::High);

        let mut handler = handler();
        assert_eq!(
            check(&app, &mut handler),
            Err(ModelError::ActionOnSensor {
                state: "safe".to_string(),
                brick: "motion".to_string(),
            })
        );
    }

    #[test]
    fn guard_on_actuator_is_rejected() {
        let mut app = build_security_system();
        let safe = app.state_id_from_name("safe").unwrap();
        let alarm_state = app.state_id_from_name("alarm").unwrap();
        let led = app.brick_id_from_name("alarm").unwrap();
        let guard = app.primary(led, Signal::High);
        app.when(safe, guard, alarm_state);

        let mut handler = handler();
        assert_eq!(
            check(&app, &mut handler),
            Err(ModelError::GuardOnActuator {
                state: "safe".to_string(),
                brick: "alarm".to_string(),
            })
        );
    }

    #[test]
    fn shared_guard_node_is_rejected() {
        let mut app = build_security_system();
        let safe = app.state_id_from_name("safe").unwrap();
        let alarm_state = app.state_id_from_name("alarm").unwrap();
        let motion = app.brick_id_from_name("motion").unwrap();

        // reuse one primary node in two guard positions
        let shared = app.primary(motion, Signal::High);
        app.when(safe, shared, alarm_state);
        app.when(alarm_state, shared, safe);

        let mut handler = handler();
        assert_eq!(
            check(&app, &mut handler),
            Err(ModelError::SharedGuardNode { node: shared })
        );
    }

    #[test]
    fn duplicate_pin_is_a_warning() {
        let mut app = build_security_system();
        app.sensor("window", 9); // same pin as "motion"
        let mut handler = handler();
        assert_eq!(check(&app, &mut handler), Ok(()));

        let content = strip_str(handler.error_string());
        assert!(content.contains("warning: pin 9 is assigned to both 'motion' and 'window'"));
    }

    #[test]
    fn all_findings_are_reported_not_just_the_first() {
        let mut app = build_security_system();
        app.sensor("door", 7);
        app.state("safe");
        let mut handler = handler();
        assert!(check(&app, &mut handler).is_err());

        let content = strip_str(handler.error_string());
        assert!(content.contains("duplicate brick name 'door'"));
        assert!(content.contains("duplicate state name 'safe'"));
    }
}
