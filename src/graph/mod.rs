//! Explicit task graph.
//!
//! The build orchestration is data, not control flow: a set of nodes
//! `{name, action, dependencies}` validated up front (duplicates, unknown
//! dependencies, cycles) and executed by the scheduler in
//! [`scheduler::run`]. Series composition is a dependency edge; parallel
//! composition is the absence of one.
//!
//! The graph is generic over the context passed to actions, so scheduling
//! semantics are testable without any filesystem side effects.

mod scheduler;

pub use scheduler::{RunReport, run};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Task graph validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("duplicate task name: {0}")]
    DuplicateTask(String),

    #[error("task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("dependency cycle involving task '{0}'")]
    Cycle(String),
}

type Action<C> = Box<dyn Fn(&C) -> anyhow::Result<()> + Send + Sync>;

/// One node of the task graph.
pub struct TaskNode<C> {
    pub name: String,
    pub dependencies: Vec<String>,
    action: Action<C>,
}

impl<C> TaskNode<C> {
    pub(crate) fn execute(&self, ctx: &C) -> anyhow::Result<()> {
        (self.action)(ctx)
    }
}

/// A directed acyclic graph of named tasks.
pub struct TaskGraph<C> {
    nodes: Vec<TaskNode<C>>,
}

impl<C> Default for TaskGraph<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TaskGraph<C> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a task with its dependencies.
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        dependencies: &[&str],
        action: impl Fn(&C) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.nodes.push(TaskNode {
            name: name.into(),
            dependencies: dependencies.iter().map(|d| (*d).to_string()).collect(),
            action: Box::new(action),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn nodes(&self) -> &[TaskNode<C>] {
        &self.nodes
    }

    /// Validate the graph and return the name → index map.
    ///
    /// Checks, in order: duplicate names, unknown dependencies, cycles.
    pub fn validate(&self) -> Result<FxHashMap<&str, usize>, GraphError> {
        let mut index = FxHashMap::default();
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(node.name.as_str(), i).is_some() {
                return Err(GraphError::DuplicateTask(node.name.clone()));
            }
        }

        for node in &self.nodes {
            for dep in &node.dependencies {
                if !index.contains_key(dep.as_str()) {
                    return Err(GraphError::UnknownDependency {
                        task: node.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        self.check_acyclic(&index)?;
        Ok(index)
    }

    /// Kahn's algorithm; any unprocessed node sits on a cycle.
    fn check_acyclic(&self, index: &FxHashMap<&str, usize>) -> Result<(), GraphError> {
        let n = self.nodes.len();
        let mut pending: Vec<usize> = self.nodes.iter().map(|n| n.dependencies.len()).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, node) in self.nodes.iter().enumerate() {
            for dep in &node.dependencies {
                dependents[index[dep.as_str()]].push(i);
            }
        }

        let mut ready: Vec<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
        let mut processed = 0;
        while let Some(i) = ready.pop() {
            processed += 1;
            for &d in &dependents[i] {
                pending[d] -= 1;
                if pending[d] == 0 {
                    ready.push(d);
                }
            }
        }

        if processed < n {
            let stuck = self
                .nodes
                .iter()
                .enumerate()
                .find(|(i, _)| pending[*i] > 0)
                .map(|(_, node)| node.name.clone())
                .unwrap_or_default();
            return Err(GraphError::Cycle(stuck));
        }
        Ok(())
    }
}
