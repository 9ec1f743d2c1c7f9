//! Ready-node scheduler for the task graph.
//!
//! Executes every node whose dependencies have all succeeded, in parallel
//! on the rayon pool. A completion loop on the calling thread receives
//! results over a crossbeam channel and launches newly-ready nodes.
//!
//! Guarantees:
//! - a node starts only after all of its dependencies succeeded (series)
//! - independent nodes run concurrently with no ordering (parallel)
//! - dependents of a failed node are skipped, transitively
//! - the run always drains: every node ends succeeded, failed, or skipped

use super::{GraphError, TaskGraph};
use crossbeam::channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Pending,
    Running,
    Done,
    Failed,
    Skipped,
}

/// Outcome of one graph run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub succeeded: Vec<String>,
    /// `(task name, error message)` per failed node.
    pub failed: Vec<(String, String)>,
    /// Nodes never started because a dependency failed.
    pub skipped: Vec<String>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turn the report into a `Result`, erroring on the first failure.
    pub fn into_result(self) -> anyhow::Result<Self> {
        match self.failed.first() {
            Some((name, message)) => {
                anyhow::bail!("task '{}' failed: {}", name, message)
            }
            None => Ok(self),
        }
    }
}

/// Run the graph to completion.
///
/// Validation errors are reported before anything executes; action errors
/// are collected in the report, never panicked on.
pub fn run<C: Sync>(graph: &TaskGraph<C>, ctx: &C) -> Result<RunReport, GraphError> {
    let index = graph.validate()?;
    let nodes = graph.nodes();
    let n = nodes.len();

    let mut report = RunReport::default();
    if n == 0 {
        return Ok(report);
    }

    let mut pending_deps: Vec<usize> = nodes.iter().map(|n| n.dependencies.len()).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, node) in nodes.iter().enumerate() {
        for dep in &node.dependencies {
            dependents[index[dep.as_str()]].push(i);
        }
    }

    let mut state = vec![NodeState::Pending; n];
    let (tx, rx) = channel::unbounded::<(usize, Result<(), String>)>();

    rayon::scope(|scope| {
        let mut active = 0usize;

        // Launch helper: mark running and hand the action to the pool.
        let mut launch = |i: usize, state: &mut [NodeState], active: &mut usize| {
            state[i] = NodeState::Running;
            *active += 1;
            let tx = tx.clone();
            let node = &nodes[i];
            scope.spawn(move |_| {
                let result = node.execute(ctx).map_err(|e| format!("{e:#}"));
                let _ = tx.send((i, result));
            });
        };

        for i in 0..n {
            if pending_deps[i] == 0 {
                launch(i, &mut state, &mut active);
            }
        }

        while active > 0 {
            let (i, result) = rx.recv().expect("scheduler channel closed");
            active -= 1;

            match result {
                Ok(()) => {
                    state[i] = NodeState::Done;
                    report.succeeded.push(nodes[i].name.clone());
                    for &d in &dependents[i].clone() {
                        if state[d] != NodeState::Pending {
                            continue;
                        }
                        pending_deps[d] -= 1;
                        if pending_deps[d] == 0 {
                            launch(d, &mut state, &mut active);
                        }
                    }
                }
                Err(message) => {
                    state[i] = NodeState::Failed;
                    report.failed.push((nodes[i].name.clone(), message));

                    // Transitive dependents can never run; skip them now.
                    let mut stack = dependents[i].clone();
                    while let Some(d) = stack.pop() {
                        if state[d] == NodeState::Pending {
                            state[d] = NodeState::Skipped;
                            report.skipped.push(nodes[d].name.clone());
                            stack.extend(dependents[d].iter().copied());
                        }
                    }
                }
            }
        }
    });

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Shared execution trace for order assertions.
    type Trace = Arc<Mutex<Vec<&'static str>>>;

    fn record(trace: &Trace, name: &'static str) -> anyhow::Result<()> {
        trace.lock().push(name);
        Ok(())
    }

    #[test]
    fn test_series_order_is_strict() {
        let trace: Trace = Arc::default();
        let mut graph = TaskGraph::new();
        for (name, deps) in [("a", vec![]), ("b", vec!["a"]), ("c", vec!["b"])] {
            let trace = Arc::clone(&trace);
            let deps: Vec<&str> = deps;
            graph.add_task(name, &deps, move |_: &()| record(&trace, name));
        }

        let report = run(&graph, &()).unwrap();
        assert!(report.is_success());
        assert_eq!(*trace.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parallel_siblings_all_run() {
        let trace: Trace = Arc::default();
        let mut graph = TaskGraph::new();
        {
            let trace = Arc::clone(&trace);
            graph.add_task("clean", &[], move |_: &()| record(&trace, "clean"));
        }
        for name in ["images", "fonts", "styles", "scripts", "views"] {
            let trace = Arc::clone(&trace);
            graph.add_task(name, &["clean"], move |_: &()| record(&trace, name));
        }

        let report = run(&graph, &()).unwrap();
        assert!(report.is_success());

        let order = trace.lock();
        assert_eq!(order.len(), 6);
        // clean is strictly first; sibling order is unspecified
        assert_eq!(order[0], "clean");
        assert_eq!(report.succeeded.len(), 6);
    }

    #[test]
    fn test_failed_node_skips_dependents() {
        let trace: Trace = Arc::default();
        let mut graph = TaskGraph::new();
        graph.add_task("build", &[], |_: &()| anyhow::bail!("disk on fire"));
        {
            let trace = Arc::clone(&trace);
            graph.add_task("copy", &["build"], move |_: &()| record(&trace, "copy"));
        }
        {
            let trace = Arc::clone(&trace);
            graph.add_task("publish", &["copy"], move |_: &()| {
                record(&trace, "publish")
            });
        }

        let report = run(&graph, &()).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.failed[0].0, "build");
        assert!(report.failed[0].1.contains("disk on fire"));
        assert_eq!(report.skipped, vec!["copy", "publish"]);
        assert!(trace.lock().is_empty());

        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_sibling_unaffected_by_failure() {
        let trace: Trace = Arc::default();
        let mut graph = TaskGraph::new();
        graph.add_task("bad", &[], |_: &()| anyhow::bail!("nope"));
        {
            let trace = Arc::clone(&trace);
            graph.add_task("good", &[], move |_: &()| record(&trace, "good"));
        }

        let report = run(&graph, &()).unwrap();
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.succeeded, vec!["good"]);
        assert_eq!(*trace.lock(), vec!["good"]);
    }

    #[test]
    fn test_diamond_dependency_runs_once_after_both() {
        let trace: Trace = Arc::default();
        let mut graph = TaskGraph::new();
        for name in ["left", "right"] {
            let trace = Arc::clone(&trace);
            graph.add_task(name, &[], move |_: &()| record(&trace, name));
        }
        {
            let trace = Arc::clone(&trace);
            graph.add_task("join", &["left", "right"], move |_: &()| {
                record(&trace, "join")
            });
        }

        let report = run(&graph, &()).unwrap();
        assert!(report.is_success());

        let order = trace.lock();
        assert_eq!(order.len(), 3);
        assert_eq!(order[2], "join");
    }

    #[test]
    fn test_validation_error_runs_nothing() {
        let trace: Trace = Arc::default();
        let mut graph = TaskGraph::new();
        {
            let trace = Arc::clone(&trace);
            graph.add_task("a", &["missing"], move |_: &()| record(&trace, "a"));
        }
        assert!(run(&graph, &()).is_err());
        assert!(trace.lock().is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let graph: TaskGraph<()> = TaskGraph::new();
        let report = run(&graph, &()).unwrap();
        assert!(report.is_success());
        assert!(report.succeeded.is_empty());
    }
}
