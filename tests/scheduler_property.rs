use std::collections::{BTreeSet, HashSet, VecDeque};

use proptest::prelude::*;
use tbwatch::dag::{DagGraph, Scheduler, TaskState};
use tbwatch::engine::TaskOutcome;

// Strategy to generate an acyclic graph as (name, deps) pairs.
// Acyclicity holds because task N may only depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(|raw_deps| {
            raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let deps: BTreeSet<String> = if i == 0 {
                        BTreeSet::new()
                    } else {
                        potential
                            .into_iter()
                            .map(|d| format!("task_{}", d % i))
                            .collect()
                    };
                    (format!("task_{i}"), deps.into_iter().collect())
                })
                .collect()
        })
    })
}

fn build_graph(edges: &[(String, Vec<String>)]) -> DagGraph {
    DagGraph::from_edges(edges.iter().map(|(n, d)| (n.as_str(), d.as_slice())))
}

proptest! {
    #[test]
    fn scheduler_respects_dependencies_and_terminates(
        edges in dag_strategy(10),
        failing_indices in proptest::collection::vec(0..10usize, 0..3),
        lifo in any::<bool>(),
    ) {
        let failing: HashSet<String> = failing_indices
            .iter()
            .filter(|&&i| i < edges.len())
            .map(|i| format!("task_{i}"))
            .collect();

        let mut scheduler = Scheduler::new(build_graph(&edges));
        let mut executing: VecDeque<String> = VecDeque::new();
        let mut started: HashSet<String> = HashSet::new();
        let mut succeeded: HashSet<String> = HashSet::new();
        let mut aborted = false;

        for task in scheduler.start() {
            prop_assert!(started.insert(task.name.clone()), "task started twice");
            executing.push_back(task.name);
        }

        let mut steps = 0;
        while let Some(name) = if lifo { executing.pop_back() } else { executing.pop_front() } {
            steps += 1;
            prop_assert!(steps <= 100, "simulation did not terminate");

            let outcome = if failing.contains(&name) {
                aborted = true;
                TaskOutcome::Failed
            } else {
                succeeded.insert(name.clone());
                TaskOutcome::Success
            };

            let scheduled = scheduler.handle_completion(&name, outcome);
            if aborted {
                prop_assert!(scheduled.is_empty(), "task launched after abort");
            }
            for task in scheduled {
                for dep in &task.deps {
                    prop_assert!(succeeded.contains(dep), "{} started before {}", task.name, dep);
                }
                prop_assert!(started.insert(task.name.clone()), "task started twice");
                executing.push_back(task.name);
            }
        }

        prop_assert!(scheduler.is_finished());
        prop_assert_eq!(scheduler.is_aborted(), aborted);

        for (name, _) in &edges {
            let state = scheduler.state_of(name);
            if !started.contains(name) {
                prop_assert_eq!(state, Some(TaskState::Skipped));
            }
        }
        if !aborted {
            prop_assert_eq!(succeeded.len(), edges.len());
        }
    }
}
