//! Static domain dependency declarations.
//!
//! Dependencies are data, not object graphs: each entry names the
//! domains that must be enabled before the keyed domain is usable, plus
//! the domain's activation method. The activator walks this table; the
//! wrappers in this module's siblings carry matching `DEPENDENCIES`
//! consts for callers that build their own graphs.

// ============================================================================
// Imports
// ============================================================================

use crate::connection::DependencyGraph;

// ============================================================================
// Default Graph
// ============================================================================

/// Builds the dependency graph for the standard protocol domains.
///
/// Used by [`Connection::connect`]; callers attaching their own
/// transport may extend it or start from an empty graph.
///
/// [`Connection::connect`]: crate::Connection::connect
#[must_use]
pub fn default_graph() -> DependencyGraph {
    let mut graph = DependencyGraph::new();

    graph.declare("Runtime", &[], Some("Runtime.enable"));
    graph.declare("Network", &[], Some("Network.enable"));
    graph.declare("DOM", &[], Some("DOM.enable"));
    graph.declare("IO", &[], None);
    graph.declare("Debugger", &["Runtime"], Some("Debugger.enable"));
    graph.declare("Log", &["Runtime", "Network"], Some("Log.enable"));
    graph.declare(
        "Page",
        &["Debugger", "DOM", "IO", "Network", "Runtime"],
        Some("Page.enable"),
    );

    graph
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::json;

    use crate::Connection;
    use crate::transport::testing;

    #[tokio::test]
    async fn test_default_graph_is_acyclic_for_every_domain() {
        // Activating Page pulls in the whole standard graph; a cycle
        // would surface as CyclicDependency before any call.
        let (transport, mut remote) = testing::pair();
        let connection = Connection::attach(Box::new(transport), default_graph());

        let activation = {
            let connection = connection.clone();
            tokio::spawn(async move { connection.ensure_activated("Page", &[]).await })
        };

        let mut methods = Vec::new();
        while methods.len() < 5 {
            let (id, method, _) = remote.next_call().await.expect("call");
            methods.push(method);
            remote.respond_success(id, json!({}));
        }
        activation.await.expect("join").expect("activate");

        // Dependencies come before Page; IO (no enable) is silent.
        assert_eq!(methods.last().expect("page"), "Page.enable");
        assert!(!methods.contains(&"IO.enable".to_owned()));
        assert!(methods.contains(&"Runtime.enable".to_owned()));
        assert!(
            methods.iter().position(|m| m == "Runtime.enable")
                < methods.iter().position(|m| m == "Debugger.enable")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_calls_before_dependency_responses() {
        // Debugger activation must not start until Runtime's enable has
        // completed.
        let (transport, mut remote) = testing::pair();
        let connection = Connection::attach(Box::new(transport), default_graph());

        let activation = {
            let connection = connection.clone();
            tokio::spawn(async move { connection.ensure_activated("Debugger", &[]).await })
        };

        let (id, method, _) = remote.next_call().await.expect("call");
        assert_eq!(method, "Runtime.enable");

        // While Runtime's response is withheld, nothing else goes out.
        let early = tokio::time::timeout(Duration::from_millis(50), remote.next_call()).await;
        assert!(early.is_err(), "Debugger.enable must wait for Runtime");
        remote.respond_success(id, json!({}));

        let (id, method, _) = remote.next_call().await.expect("call");
        assert_eq!(method, "Debugger.enable");
        remote.respond_success(id, json!({}));

        activation.await.expect("join").expect("activate");
    }
}
