//! Bridge — the single context struct and its event loop.
//!
//! The bridge owns the registry, the rule engine, the connection state, the
//! scheduler and the three ports. Every input reaches it as a
//! [`BridgeEvent`] on one queue and is handled to completion before the next
//! one is taken, so no state is ever shared between tasks.

use std::collections::{BTreeMap, HashMap};

use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use unibridge_domain::alias::Alias;
use unibridge_domain::circuit::{AnalogTuning, CircuitKind, CircuitView};
use unibridge_domain::error::{BridgeError, ClassificationError, NotFoundError};
use unibridge_domain::gesture::{TimerId, TimerKind};
use unibridge_domain::layout::{Aggregation, Layout};
use unibridge_domain::normalizer::{EventNormalizer, Normalized};
use unibridge_domain::raw::RawDevice;
use unibridge_domain::rule::{RuleSet, TriggerEvent, TriggerKey};

use crate::event_queue::{BridgeEvent, EventQueue};
use crate::handle::{BridgeHandle, CommandRequest, Intent};
use crate::output::{self, Outputs};
use crate::ports::{Controller, ControllerEvent, ControllerEvents, Notifier, Presentation};
use crate::registry::CircuitRegistry;
use crate::rule_engine::{RuleEngine, RuleEnv};
use crate::scheduler::Scheduler;
use crate::supervisor::{
    ConnectOutcome, ConnectionState, RECONNECT_DELAY, WATCHDOG_PERIOD, Watchdog,
};

/// Static configuration of the bridge.
#[derive(Debug, Default)]
pub struct BridgeSettings {
    /// Explicit `"<TYPE> <address>" → alias` mapping.
    pub aliases: HashMap<String, String>,
    /// Per-alias analog tuning.
    pub tuning: HashMap<String, AnalogTuning>,
    /// `room → aliases`; only listed circuits are exposed.
    pub rooms: BTreeMap<String, Vec<String>>,
    pub aggregation: Aggregation,
    pub rules: RuleSet,
}

pub struct Bridge<C, P, N> {
    controller: C,
    presentation: P,
    notifier: N,
    normalizer: EventNormalizer,
    layout: Layout,
    registry: CircuitRegistry,
    engine: RuleEngine,
    state: ConnectionState,
    scheduler: Scheduler,
    queue: EventQueue,
    watchdog: Option<AbortHandle>,
    reconnect: Option<AbortHandle>,
}

impl<C, P, N> Bridge<C, P, N>
where
    C: Controller,
    P: Presentation,
    N: Notifier,
{
    pub fn new(settings: BridgeSettings, controller: C, presentation: P, notifier: N) -> Self {
        let queue = EventQueue::new();
        Self {
            controller,
            presentation,
            notifier,
            normalizer: EventNormalizer::new(settings.aliases),
            layout: Layout::new(&settings.rooms, settings.aggregation),
            registry: CircuitRegistry::new(settings.tuning),
            engine: RuleEngine::new(settings.rules),
            state: ConnectionState::default(),
            scheduler: Scheduler::new(queue.sender()),
            queue,
            watchdog: None,
            reconnect: None,
        }
    }

    /// A handle for consumer intents.
    #[must_use]
    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle::new(self.queue.sender())
    }

    #[must_use]
    pub fn registry(&self) -> &CircuitRegistry {
        &self.registry
    }

    #[must_use]
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Connect, then process events until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(rules = self.engine.rules().len(), "bridge starting");
        self.start();
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                event = self.queue.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
            }
        }
        self.shutdown();
    }

    /// Issue the first connect attempt.
    pub fn start(&mut self) {
        self.connect();
    }

    /// Wait for the next event and handle it. Returns `false` once the queue
    /// is closed.
    pub async fn step(&mut self) -> bool {
        match self.queue.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Handle every event already queued, without waiting. Returns how many.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Stop timers and close the connection.
    pub fn shutdown(&mut self) {
        tracing::info!("bridge stopping");
        self.queue.close();
        self.scheduler.cancel_all();
        if let Some(reconnect) = self.reconnect.take() {
            reconnect.abort();
        }
        self.teardown();
    }

    pub fn handle_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Controller(ControllerEvent::Connected) => self.on_connected(),
            BridgeEvent::Controller(ControllerEvent::Message(batch)) => {
                for raw in &batch {
                    self.process_raw(raw);
                }
            }
            BridgeEvent::Controller(ControllerEvent::Error(err)) => {
                tracing::warn!(%err, "connection error");
                self.teardown();
                self.connect();
            }
            BridgeEvent::TimerFired { alias, kind, timer } => self.on_timer(&alias, kind, timer),
            BridgeEvent::WatchdogTick => {
                if self.state.tick() == Watchdog::Reset {
                    tracing::warn!("communication watchdog triggered, resetting connection");
                    self.teardown();
                    self.connect();
                }
            }
            BridgeEvent::Reconnect => {
                self.reconnect = None;
                self.connect();
            }
            BridgeEvent::Command(request) => self.on_command(request),
        }
    }

    // ── connection supervision ─────────────────────────────────────

    fn connect(&mut self) {
        self.state.connecting();
        let events = ControllerEvents::new(self.queue.sender());
        match self.controller.connect(events) {
            Ok(()) => tracing::debug!("connect attempt dispatched"),
            Err(err) => {
                tracing::warn!(%err, delay = ?RECONNECT_DELAY, "problem connecting to the controller, retrying");
                self.state.disconnected();
                self.retry_later();
            }
        }
    }

    fn retry_later(&mut self) {
        if let Some(previous) = self.reconnect.take() {
            previous.abort();
        }
        self.reconnect = Some(self.scheduler.schedule_reconnect(RECONNECT_DELAY));
    }

    fn teardown(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.abort();
        }
        match self.controller.close() {
            Ok(()) => tracing::debug!("connection closed"),
            Err(err) => tracing::debug!(%err, "error while disconnecting, connection may already be closed"),
        }
        self.state.disconnected();
    }

    fn on_connected(&mut self) {
        let outcome = self.state.connected();
        tracing::info!(?outcome, "connected to the controller");
        if let Some(previous) = self.watchdog.replace(self.scheduler.spawn_watchdog(WATCHDOG_PERIOD)) {
            previous.abort();
        }

        let devices = match self.controller.devices() {
            Ok(devices) => devices,
            Err(err) => {
                tracing::warn!(%err, delay = ?RECONNECT_DELAY, "cannot enumerate devices, retrying");
                self.teardown();
                self.retry_later();
                return;
            }
        };

        match outcome {
            ConnectOutcome::First => {
                for raw in &devices {
                    self.register(raw);
                }
                tracing::info!(circuits = self.registry.len(), "circuits registered");
            }
            ConnectOutcome::Reconnection => {
                self.state.begin_replay();
                for raw in &devices {
                    self.process_raw(raw);
                }
                self.state.end_replay();
                tracing::info!(devices = devices.len(), "state resynchronised");
            }
        }
    }

    // ── registration & raw events ──────────────────────────────────

    fn normalize(&self, raw: &RawDevice) -> Option<Normalized> {
        match self.normalizer.normalize(raw) {
            Ok(normalized) => Some(normalized),
            Err(err @ ClassificationError::UnsupportedKind { .. }) => {
                tracing::trace!(%err, circuit = %raw.circuit, "ignoring device");
                None
            }
            Err(err @ ClassificationError::NoAlias { .. }) => {
                tracing::trace!(%err, "ignoring unnamed device");
                None
            }
        }
    }

    fn register(&mut self, raw: &RawDevice) {
        let Some(Normalized {
            circuit_type,
            alias,
        }) = self.normalize(raw)
        else {
            return;
        };
        let exposure = self.layout.expose(&alias, circuit_type);
        let (circuit, created) = self
            .registry
            .register(alias, circuit_type, &raw.circuit, raw.value);
        if !created {
            return;
        }
        tracing::debug!(alias = %circuit.alias, %circuit_type, address = %circuit.address, "circuit registered");
        if let Some(exposure) = exposure {
            circuit.exposure = Some(exposure.clone());
            self.presentation.expose(&exposure, &circuit.view());
        }
    }

    fn process_raw(&mut self, raw: &RawDevice) {
        self.state.record_activity();
        let Some(Normalized {
            circuit_type,
            alias,
        }) = self.normalize(raw)
        else {
            return;
        };
        let dry_run = self.state.is_dry_run();
        let Some(circuit) = self.registry.get_mut(alias.as_str()) else {
            tracing::trace!(%alias, "event for untracked circuit");
            return;
        };
        if circuit.circuit_type() != circuit_type {
            tracing::trace!(%alias, %circuit_type, "event type does not match the registered circuit");
            return;
        }

        let events: Vec<TriggerEvent> = match &mut circuit.kind {
            CircuitKind::RelayOutput(_) | CircuitKind::DigitalOutput(_) => {
                circuit.apply_raw(raw.value);
                let on = raw.value.as_bool();
                vec![if on { TriggerEvent::On } else { TriggerEvent::Off }]
            }
            CircuitKind::AnalogOutput(_) => {
                circuit.apply_raw(raw.value);
                vec![TriggerEvent::Change]
            }
            CircuitKind::AnalogInput(input) => {
                let previous = input.value;
                let sensitivity = input.tuning.sensitivity;
                circuit.apply_raw(raw.value);
                let moved = circuit
                    .kind
                    .level()
                    .is_some_and(|value| (value - previous).abs() > sensitivity);
                if moved {
                    vec![TriggerEvent::Move]
                } else {
                    Vec::new()
                }
            }
            CircuitKind::DigitalInput(input) => {
                let pressed = raw.value.as_bool();
                if !input.update(pressed) {
                    return;
                }
                let gestures = if dry_run {
                    Vec::new()
                } else {
                    input.transition(pressed, &alias, &mut self.scheduler)
                };
                circuit.touch();
                gestures.into_iter().map(TriggerEvent::from).collect()
            }
        };

        if circuit.exposure.is_some() {
            self.presentation.update(&circuit.view());
        }
        for event in events {
            self.fire(TriggerKey::new(event, alias.clone()));
        }
    }

    fn fire(&mut self, key: TriggerKey) {
        if self.state.is_dry_run() {
            return;
        }
        tracing::debug!(trigger = %key, "event");
        let mut env = RuleEnv {
            registry: &mut self.registry,
            outputs: Outputs::new(&mut self.controller, self.state.is_connected()),
            notifier: &self.notifier,
            timers: &mut self.scheduler,
        };
        self.engine.dispatch(&key, &mut env);
    }

    // ── timers ─────────────────────────────────────────────────────

    fn on_timer(&mut self, alias: &Alias, kind: TimerKind, timer: TimerId) {
        self.scheduler.complete(timer);
        let Some(circuit) = self.registry.get_mut(alias.as_str()) else {
            return;
        };
        match (kind, &mut circuit.kind) {
            (TimerKind::LongClick | TimerKind::DoubleClick, CircuitKind::DigitalInput(input)) => {
                let Some(gesture) = input.on_timer(kind, timer) else {
                    tracing::trace!(%timer, %alias, "stale gesture timer");
                    return;
                };
                circuit.touch();
                if circuit.exposure.is_some() {
                    self.presentation.update(&circuit.view());
                }
                self.fire(TriggerKey::new(gesture, alias.clone()));
            }
            (TimerKind::RelayOff, CircuitKind::RelayOutput(relay)) if relay.timer == Some(timer) => {
                relay.timer = None;
                tracing::info!(%alias, "relay timer fired");
                let mut outputs = Outputs::new(&mut self.controller, self.state.is_connected());
                if let Err(err) = output::switch(&mut outputs, circuit, false) {
                    tracing::warn!(%err, %alias, "relay timer could not switch off");
                }
            }
            _ => tracing::trace!(%timer, %alias, "stale timer"),
        }
    }

    // ── consumer commands ──────────────────────────────────────────

    fn on_command(&mut self, request: CommandRequest) {
        let CommandRequest {
            alias,
            intent,
            reply,
        } = request;
        let result = self.execute_intent(&alias, intent);
        if let Err(err) = &result {
            tracing::warn!(%err, %alias, ?intent, "consumer command failed");
        }
        if reply.send(result).is_err() {
            tracing::debug!(%alias, "consumer went away before the reply");
        }
    }

    #[tracing::instrument(skip(self))]
    fn execute_intent(&mut self, alias: &Alias, intent: Intent) -> Result<CircuitView, BridgeError> {
        let circuit = self
            .registry
            .get_mut(alias.as_str())
            .ok_or_else(|| NotFoundError {
                alias: alias.to_string(),
            })?;
        let mut outputs = Outputs::new(&mut self.controller, self.state.is_connected());
        match intent {
            Intent::SetOn(on) => output::switch(&mut outputs, circuit, on)?,
            Intent::SetLevel(level) => output::set_level(&mut outputs, circuit, level)?,
            Intent::Read => output::refresh(&mut outputs, circuit)?,
            Intent::Identify => {
                let room = circuit.exposure.as_ref().map(|exposure| exposure.room.as_str());
                tracing::info!(room, %alias, "identify");
            }
        }
        let view = circuit.view();
        if circuit.exposure.is_some() && intent != Intent::Identify {
            self.presentation.update(&view);
        }
        Ok(view)
    }
}
