//! Domain dependency activation.
//!
//! Before a caller uses a protocol domain, the domain's declared
//! dependencies (and theirs, transitively) must each have had their
//! `enable`-shaped call issued exactly once on this connection. The
//! activator owns that bookkeeping: a static dependency graph, a
//! per-domain activation state, and single-flight deduplication so
//! concurrent callers never race the same activation call.
//!
//! Activation tracks "dependency satisfied", not runtime enablement: a
//! domain stays `Activated` for the life of the connection even if its
//! `disable` method is called later.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::dispatcher::RequestDispatcher;

// ============================================================================
// DependencyGraph
// ============================================================================

/// Declared shape of one domain.
#[derive(Debug, Clone)]
struct DomainSpec {
    /// Direct dependencies, in declared order.
    dependencies: Vec<String>,
    /// Activation method, if the domain defines one.
    activation: Option<String>,
}

/// Static, data-only dependency declarations for protocol domains.
///
/// Dependencies are plain domain names; the graph never holds live
/// domain objects. A domain referenced without a declaration is treated
/// as dependency-free with a default `<Domain>.enable` activation call.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: FxHashMap<String, DomainSpec>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a domain with its direct dependencies and activation
    /// method (`None` for domains without an enable call).
    ///
    /// Re-declaring a domain replaces its previous declaration.
    pub fn declare(&mut self, domain: &str, dependencies: &[&str], activation: Option<&str>) {
        self.nodes.insert(
            domain.to_owned(),
            DomainSpec {
                dependencies: dependencies.iter().map(|d| (*d).to_owned()).collect(),
                activation: activation.map(str::to_owned),
            },
        );
    }

    /// Declares a domain lazily on first reference, with the default
    /// `<Domain>.enable` activation. Existing declarations win.
    fn declare_if_absent(&mut self, domain: &str, dependencies: &[&str]) {
        if !self.nodes.contains_key(domain) {
            let activation = format!("{domain}.enable");
            self.declare(domain, dependencies, Some(&activation));
        }
    }

    /// Returns the direct dependencies of a domain, in declared order.
    fn dependencies_of(&self, domain: &str) -> Vec<String> {
        self.nodes
            .get(domain)
            .map(|spec| spec.dependencies.clone())
            .unwrap_or_default()
    }

    /// Returns the activation method of a domain, defaulting to
    /// `<Domain>.enable` for undeclared ones.
    fn activation_method(&self, domain: &str) -> Option<String> {
        match self.nodes.get(domain) {
            Some(spec) => spec.activation.clone(),
            None => Some(format!("{domain}.enable")),
        }
    }

    /// Resolves the activation order for `root`: every transitive
    /// dependency before its dependents, direct dependencies in declared
    /// order, `root` last.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CyclicDependency`] if the reachable subgraph
    /// contains a cycle. Detection happens here, before any activation
    /// call is issued.
    fn resolve_order(&self, root: &str) -> Result<Vec<String>> {
        let mut order = Vec::new();
        let mut visiting = FxHashSet::default();
        let mut done = FxHashSet::default();
        self.visit(root, &mut visiting, &mut done, &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        domain: &str,
        visiting: &mut FxHashSet<String>,
        done: &mut FxHashSet<String>,
        order: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(domain) {
            return Ok(());
        }
        if !visiting.insert(domain.to_owned()) {
            return Err(Error::cyclic(domain));
        }

        for dependency in self.dependencies_of(domain) {
            self.visit(&dependency, visiting, done, order)?;
        }

        visiting.remove(domain);
        done.insert(domain.to_owned());
        order.push(domain.to_owned());
        Ok(())
    }
}

// ============================================================================
// DomainActivator
// ============================================================================

/// Per-domain activation state.
///
/// `Activating` carries the watch handle late arrivals wait on; the
/// absence of an entry means `NotActivated`.
enum DomainState {
    Activating(watch::Receiver<bool>),
    Activated,
}

/// What this caller must do for one domain, decided under the state
/// lock.
enum Role {
    Done,
    Wait(watch::Receiver<bool>),
    Lead(watch::Sender<bool>),
}

/// Ensures domains are activated in dependency order, exactly once each.
pub(crate) struct DomainActivator {
    dispatcher: Arc<RequestDispatcher>,
    graph: Mutex<DependencyGraph>,
    states: Mutex<FxHashMap<String, DomainState>>,
}

impl DomainActivator {
    /// Creates an activator issuing activation calls through
    /// `dispatcher`, with `graph` as the dependency declarations.
    pub(crate) fn new(dispatcher: Arc<RequestDispatcher>, graph: DependencyGraph) -> Self {
        Self {
            dispatcher,
            graph: Mutex::new(graph),
            states: Mutex::new(FxHashMap::default()),
        }
    }

    /// Activates `domain` and its transitive dependencies.
    ///
    /// `dependencies` is the caller's declaration of the domain's direct
    /// dependencies, used when the graph has no entry for it yet.
    ///
    /// # Errors
    ///
    /// - [`Error::CyclicDependency`] if the dependency closure contains
    ///   a cycle; no activation call is issued in that case
    /// - any error from an activation call itself, which leaves that
    ///   domain `NotActivated` so a later call may retry
    pub(crate) async fn ensure_activated(&self, domain: &str, dependencies: &[&str]) -> Result<()> {
        let order = {
            let mut graph = self.graph.lock();
            graph.declare_if_absent(domain, dependencies);
            graph.resolve_order(domain)?
        };

        for name in order {
            self.activate(&name).await?;
        }
        Ok(())
    }

    /// Activates a single domain with single-flight deduplication.
    async fn activate(&self, domain: &str) -> Result<()> {
        loop {
            let role = {
                let mut states = self.states.lock();
                match states.get(domain) {
                    Some(DomainState::Activated) => Role::Done,
                    Some(DomainState::Activating(rx)) => Role::Wait(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(false);
                        states.insert(domain.to_owned(), DomainState::Activating(rx));
                        Role::Lead(tx)
                    }
                }
            };

            match role {
                Role::Done => return Ok(()),

                Role::Wait(mut rx) => {
                    // Ok: the leader broadcast success. Err: the leader
                    // dropped the sender after a failed attempt; the
                    // state entry is gone, so take over on the next spin.
                    let _ = rx.changed().await;
                    if *rx.borrow() {
                        return Ok(());
                    }
                }

                Role::Lead(tx) => {
                    let method = self.graph.lock().activation_method(domain);
                    let outcome = match &method {
                        Some(method) => self.dispatcher.call(method, None).await.map(drop),
                        None => Ok(()),
                    };

                    return match outcome {
                        Ok(()) => {
                            self.states
                                .lock()
                                .insert(domain.to_owned(), DomainState::Activated);
                            let _ = tx.send(true);
                            debug!(domain, method = method.as_deref(), "Domain activated");
                            Ok(())
                        }
                        Err(e) => {
                            self.states.lock().remove(domain);
                            warn!(domain, error = %e, "Domain activation failed");
                            Err(e)
                        }
                    };
                }
            }
        }
    }

    /// Returns `true` if the domain has completed activation.
    #[cfg(test)]
    fn is_activated(&self, domain: &str) -> bool {
        matches!(self.states.lock().get(domain), Some(DomainState::Activated))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    use crate::protocol::{RemoteError, ResponseFrame, ResponseOutcome};

    use super::super::dispatcher::IoCommand;

    /// Remote stand-in: answers every activation call successfully (or
    /// rejects the methods listed in `reject`) and records the order.
    fn respond_to_calls(
        dispatcher: Arc<RequestDispatcher>,
        mut command_rx: mpsc::UnboundedReceiver<IoCommand>,
        calls: Arc<Mutex<Vec<String>>>,
        reject: &'static [&'static str],
        delay: Duration,
    ) {
        tokio::spawn(async move {
            while let Some(command) = command_rx.recv().await {
                let IoCommand::Send { id, text } = command else {
                    break;
                };
                let frame: Value = serde_json::from_str(&text).expect("outbound JSON");
                let method = frame["method"].as_str().expect("method").to_owned();
                calls.lock().push(method.clone());

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }

                let outcome = if reject.contains(&method.as_str()) {
                    ResponseOutcome::Error(RemoteError {
                        code: -32601,
                        message: "method rejected".into(),
                        data: None,
                    })
                } else {
                    ResponseOutcome::Success(json!({}))
                };
                let _ = dispatcher.on_response(ResponseFrame { id, outcome });
            }
        });
    }

    fn setup(
        graph: DependencyGraph,
        reject: &'static [&'static str],
        delay: Duration,
    ) -> (Arc<DomainActivator>, Arc<Mutex<Vec<String>>>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(RequestDispatcher::new(command_tx));
        let calls = Arc::new(Mutex::new(Vec::new()));
        respond_to_calls(
            Arc::clone(&dispatcher),
            command_rx,
            Arc::clone(&calls),
            reject,
            delay,
        );
        (
            Arc::new(DomainActivator::new(dispatcher, graph)),
            calls,
        )
    }

    #[tokio::test]
    async fn test_chain_activates_dependencies_first_exactly_once() {
        let mut graph = DependencyGraph::new();
        graph.declare("Runtime", &[], Some("Runtime.enable"));
        graph.declare("Debugger", &["Runtime"], Some("Debugger.enable"));
        graph.declare("Page", &["Debugger"], Some("Page.enable"));

        let (activator, calls) = setup(graph, &[], Duration::ZERO);

        activator.ensure_activated("Page", &[]).await.expect("activate");

        assert_eq!(
            *calls.lock(),
            vec!["Runtime.enable", "Debugger.enable", "Page.enable"]
        );
        assert!(activator.is_activated("Runtime"));
        assert!(activator.is_activated("Page"));
    }

    #[tokio::test]
    async fn test_diamond_dependency_activates_shared_node_once() {
        let mut graph = DependencyGraph::new();
        graph.declare("A", &[], Some("A.enable"));
        graph.declare("B", &["A"], Some("B.enable"));
        graph.declare("C", &["A"], Some("C.enable"));
        graph.declare("D", &["B", "C"], Some("D.enable"));

        let (activator, calls) = setup(graph, &[], Duration::ZERO);

        activator.ensure_activated("D", &[]).await.expect("activate");

        assert_eq!(*calls.lock(), vec!["A.enable", "B.enable", "C.enable", "D.enable"]);
    }

    #[tokio::test]
    async fn test_repeat_activation_is_noop() {
        let mut graph = DependencyGraph::new();
        graph.declare("Network", &[], Some("Network.enable"));

        let (activator, calls) = setup(graph, &[], Duration::ZERO);

        activator.ensure_activated("Network", &[]).await.expect("first");
        activator.ensure_activated("Network", &[]).await.expect("second");

        assert_eq!(*calls.lock(), vec!["Network.enable"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_activation_is_single_flight() {
        let mut graph = DependencyGraph::new();
        graph.declare("Network", &[], Some("Network.enable"));

        // A response delay keeps the first activation in flight while
        // the other callers arrive.
        let (activator, calls) = setup(graph, &[], Duration::from_millis(50));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let activator = Arc::clone(&activator);
                tokio::spawn(async move { activator.ensure_activated("Network", &[]).await })
            })
            .collect();

        for task in tasks {
            task.await.expect("join").expect("activate");
        }
        assert_eq!(*calls.lock(), vec!["Network.enable"]);
    }

    #[tokio::test]
    async fn test_cycle_fails_without_issuing_calls() {
        let mut graph = DependencyGraph::new();
        graph.declare("A", &["B"], Some("A.enable"));
        graph.declare("B", &["A"], Some("B.enable"));

        let (activator, calls) = setup(graph, &[], Duration::ZERO);

        let err = activator.ensure_activated("A", &[]).await.unwrap_err();
        assert!(matches!(err, Error::CyclicDependency { .. }));
        assert!(calls.lock().is_empty(), "no activation call may be issued");
    }

    #[tokio::test]
    async fn test_self_cycle_fails() {
        let mut graph = DependencyGraph::new();
        graph.declare("A", &["A"], Some("A.enable"));

        let (activator, calls) = setup(graph, &[], Duration::ZERO);

        let err = activator.ensure_activated("A", &[]).await.unwrap_err();
        assert!(matches!(err, Error::CyclicDependency { .. }));
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_domain_without_activation_method_activates_silently() {
        let mut graph = DependencyGraph::new();
        graph.declare("IO", &[], None);

        let (activator, calls) = setup(graph, &[], Duration::ZERO);

        activator.ensure_activated("IO", &[]).await.expect("activate");

        assert!(calls.lock().is_empty());
        assert!(activator.is_activated("IO"));
    }

    #[tokio::test]
    async fn test_undeclared_domain_uses_caller_dependencies() {
        let mut graph = DependencyGraph::new();
        graph.declare("Runtime", &[], Some("Runtime.enable"));

        let (activator, calls) = setup(graph, &[], Duration::ZERO);

        // "Console" is not in the graph; the caller declares its deps.
        activator
            .ensure_activated("Console", &["Runtime"])
            .await
            .expect("activate");

        assert_eq!(*calls.lock(), vec!["Runtime.enable", "Console.enable"]);
    }

    #[tokio::test]
    async fn test_failed_activation_resets_state_for_retry() {
        let mut graph = DependencyGraph::new();
        graph.declare("Page", &[], Some("Page.enable"));

        static REJECT_FIRST: &[&str] = &["Page.enable"];

        // First attempt rejected remotely.
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(RequestDispatcher::new(command_tx));
        let calls = Arc::new(Mutex::new(Vec::new()));
        respond_to_calls(
            Arc::clone(&dispatcher),
            command_rx,
            Arc::clone(&calls),
            REJECT_FIRST,
            Duration::ZERO,
        );
        let activator = DomainActivator::new(Arc::clone(&dispatcher), graph);

        let err = activator.ensure_activated("Page", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Remote { .. }));
        assert!(!activator.is_activated("Page"));

        // A later attempt issues the call again.
        let _ = activator.ensure_activated("Page", &[]).await;
        assert_eq!(calls.lock().len(), 2);
    }
}
