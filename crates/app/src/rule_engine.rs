//! Rule engine — reacts to semantic events by evaluating and executing rules.
//!
//! For each `"<event> <alias>"` key, every rule listening for it evaluates
//! its guard against the registry and runs its `then` or `else` branch.
//! Failures are logged and only skip the offending atom: the rest of the
//! sequence and the other rules still run.

use unibridge_domain::circuit::CircuitKind;
use unibridge_domain::error::{BridgeError, RuleError};
use unibridge_domain::gesture::{TimerKind, Timers};
use unibridge_domain::rule::{Action, Command, Condition, RuleSet, TriggerKey};

use crate::output::{self, Outputs};
use crate::ports::{Controller, Notifier};
use crate::registry::CircuitRegistry;

/// Everything a rule may touch while it runs.
pub struct RuleEnv<'a, C: ?Sized> {
    pub registry: &'a mut CircuitRegistry,
    pub outputs: Outputs<'a, C>,
    pub notifier: &'a dyn Notifier,
    pub timers: &'a mut dyn Timers,
}

/// Holds the compiled rule set.
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: RuleSet,
}

impl RuleEngine {
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Run every rule listening for `key`. Returns how many fired.
    #[tracing::instrument(skip_all, fields(trigger = %key))]
    pub fn dispatch<C>(&self, key: &TriggerKey, env: &mut RuleEnv<'_, C>) -> usize
    where
        C: Controller + ?Sized,
    {
        let mut fired = 0;
        for rule in self.rules.matching(key) {
            tracing::info!("rule fired");
            let holds = evaluate_condition(&rule.condition, env.registry);
            execute_action(rule.branch(holds), env);
            fired += 1;
        }
        fired
    }
}

/// Evaluate a guard. Unknown circuits and circuits without an on/off state
/// make an atom false.
#[must_use]
pub fn evaluate_condition(condition: &Condition, registry: &CircuitRegistry) -> bool {
    match condition {
        Condition::Always => true,
        Condition::Never => false,
        Condition::Any(items) => items.iter().any(|item| evaluate_condition(item, registry)),
        Condition::State { alias, on } => match test_state(registry, condition, alias.as_str()) {
            Ok(state) => state == *on,
            Err(err) => {
                tracing::warn!(%err, "rule authoring error");
                false
            }
        },
    }
}

fn test_state(registry: &CircuitRegistry, condition: &Condition, alias: &str) -> Result<bool, RuleError> {
    let circuit = registry
        .get(alias)
        .ok_or_else(|| RuleError::UnknownCircuit(alias.to_string()))?;
    circuit
        .kind
        .switched_on()
        .ok_or_else(|| RuleError::UnsupportedCondition {
            condition: condition.to_string(),
            alias: alias.to_string(),
            circuit_type: circuit.circuit_type(),
        })
}

/// Execute a branch, atom by atom.
pub fn execute_action<C>(action: &Action, env: &mut RuleEnv<'_, C>)
where
    C: Controller + ?Sized,
{
    match action {
        Action::Noop => {}
        Action::Sequence(items) => {
            for item in items {
                execute_action(item, env);
            }
        }
        Action::Command(command) => {
            if let Err(err) = execute_command(command, env) {
                tracing::warn!(%err, %command, "rule action failed");
            }
        }
    }
}

fn execute_command<C>(command: &Command, env: &mut RuleEnv<'_, C>) -> Result<(), BridgeError>
where
    C: Controller + ?Sized,
{
    if let Command::Webhook { event } = command {
        tracing::info!(%event, "triggering webhook");
        env.notifier.notify(event);
        return Ok(());
    }

    let Some(alias) = command.target() else {
        return Ok(());
    };
    let source_level = match command {
        Command::CopyLevel { source, .. } => Some(copy_source(env.registry, command, source.as_str())?),
        _ => None,
    };
    let circuit = env
        .registry
        .get_mut(alias.as_str())
        .ok_or_else(|| RuleError::UnknownCircuit(alias.to_string()))?;
    let circuit_type = circuit.circuit_type();
    let unsupported = || RuleError::UnsupportedCommand {
        command: command.to_string(),
        alias: alias.to_string(),
        circuit_type,
    };

    match (&mut circuit.kind, command) {
        (CircuitKind::AnalogOutput(_), Command::On { .. } | Command::Off { .. }) => {
            let on = matches!(command, Command::On { .. });
            output::switch(&mut env.outputs, circuit, on)
        }
        (CircuitKind::AnalogOutput(dimmer), Command::Set { level, .. }) => {
            dimmer.value = level.clamp(0.0, 100.0);
            dimmer.on = dimmer.value > 0.0;
            circuit.touch();
            output::write_analog(&mut env.outputs, circuit)
        }
        (CircuitKind::AnalogOutput(dimmer), Command::CopyLevel { .. }) => {
            if let Some(level) = source_level {
                dimmer.value = level;
            }
            circuit.touch();
            output::write_analog(&mut env.outputs, circuit)
        }
        (CircuitKind::RelayOutput(relay), Command::Switch { .. }) => {
            let on = !relay.on;
            output::switch(&mut env.outputs, circuit, on)
        }
        (CircuitKind::RelayOutput(_) | CircuitKind::DigitalOutput(_), Command::On { .. }) => {
            output::switch(&mut env.outputs, circuit, true)
        }
        (CircuitKind::RelayOutput(_) | CircuitKind::DigitalOutput(_), Command::Off { .. }) => {
            output::switch(&mut env.outputs, circuit, false)
        }
        (CircuitKind::RelayOutput(relay), Command::Timer { delay, .. }) => {
            if let Some(pending) = relay.timer.take() {
                tracing::info!(%alias, "relay timer reset");
                env.timers.cancel(pending);
            } else {
                tracing::info!(%alias, ?delay, "relay timer set");
                relay.timer = Some(env.timers.arm(alias, TimerKind::RelayOff, *delay));
            }
            Ok(())
        }
        _ => Err(unsupported().into()),
    }
}

fn copy_source(registry: &CircuitRegistry, command: &Command, source: &str) -> Result<f64, RuleError> {
    let circuit = registry
        .get(source)
        .ok_or_else(|| RuleError::UnknownCircuit(source.to_string()))?;
    circuit.kind.level().ok_or_else(|| RuleError::UnsupportedCommand {
        command: command.to_string(),
        alias: source.to_string(),
        circuit_type: circuit.circuit_type(),
    })
}
