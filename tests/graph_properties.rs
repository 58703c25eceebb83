//! Property tests over randomly wired curricula
//!
//! Dependencies are drawn from the whole id range, so generated graphs
//! routinely contain cycles and connectors feeding other connectors.

use std::collections::{HashSet, VecDeque};

use proptest::prelude::*;
use subjects_graph::domain::{
    Availability, Connector, CurriculumGraph, DependencyGroup, Prerequisite, Scales, Status,
    StatusId, Subject,
};
use subjects_graph::Scene;

const STATUSES: [&str; 3] = ["INACTIVE", "PENDING", "APPROVED"];

fn scales() -> Scales {
    Scales::new(
        vec![
            Status::new("INACTIVE", "Not started", "#111827"),
            Status::new("PENDING", "Pending final exam", "#2255d4"),
            Status::new("APPROVED", "Approved", "#3b82f6"),
        ],
        vec![
            Availability::new("NOT_AVAILABLE", "Not available", "#6b7280"),
            Availability::new("ENROLL", "Can enroll", "#22c55e"),
            Availability::new("APPROVE", "Can take final exam", "#387dd9"),
        ],
    )
    .unwrap()
}

#[derive(Debug, Clone)]
struct Plan {
    /// Status index and raw dependency indices per subject
    subjects: Vec<(usize, Vec<usize>)>,
    /// Raw dependency and target indices per connector
    connectors: Vec<(Vec<usize>, Vec<usize>)>,
}

impl Plan {
    fn ids(&self) -> Vec<String> {
        let subjects = (0..self.subjects.len()).map(|i| format!("S{}", i));
        let connectors = (0..self.connectors.len()).map(|i| format!("C{}", i));
        subjects.chain(connectors).collect()
    }

    /// Declared subject dependencies, self references dropped
    fn subject_dependencies(&self, i: usize) -> Vec<String> {
        let ids = self.ids();
        let mut deps: Vec<String> = self.subjects[i]
            .1
            .iter()
            .map(|raw| raw % ids.len())
            .filter(|&d| d != i)
            .map(|d| ids[d].clone())
            .collect();
        deps.dedup();
        deps
    }

    fn build(&self) -> CurriculumGraph {
        let ids = self.ids();
        let pick = |raw: &Vec<usize>| -> Vec<String> {
            raw.iter().map(|r| ids[r % ids.len()].clone()).collect()
        };

        let subjects = self.subjects.iter().enumerate().map(|(i, (status, _))| {
            let deps = self.subject_dependencies(i);
            Subject::new(format!("S{}", i), format!("Subject {}", i))
                .with_status(STATUSES[*status])
                .with_prerequisite(Prerequisite::new(
                    "ENROLL",
                    vec![DependencyGroup::new("PENDING", deps.clone())],
                ))
                .with_prerequisite(Prerequisite::new(
                    "APPROVE",
                    vec![DependencyGroup::new("APPROVED", deps)],
                ))
        });
        let connectors = self
            .connectors
            .iter()
            .enumerate()
            .map(|(i, (deps, targets))| Connector::new(format!("C{}", i), pick(deps), pick(targets)));

        CurriculumGraph::new(scales(), subjects.collect::<Vec<_>>(), connectors.collect::<Vec<_>>())
    }
}

fn plan_strategy() -> impl Strategy<Value = Plan> {
    let subjects = prop::collection::vec((0..3usize, prop::collection::vec(0..12usize, 0..4)), 1..8);
    let connectors = prop::collection::vec(
        (
            prop::collection::vec(0..12usize, 0..3),
            prop::collection::vec(0..12usize, 0..3),
        ),
        0..4,
    );
    (subjects, connectors).prop_map(|(subjects, connectors)| Plan {
        subjects,
        connectors,
    })
}

fn sorted_links(graph: &CurriculumGraph) -> Vec<(String, String)> {
    let mut links: Vec<_> = graph
        .display_links()
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
    links.sort();
    links
}

fn availability_ranks(graph: &CurriculumGraph) -> Vec<(String, usize)> {
    graph
        .nodes()
        .map(|node| {
            let rank = graph
                .scales()
                .find_availability_rank(&node.availability().id)
                .unwrap();
            (node.id().to_string(), rank)
        })
        .collect()
}

/// True if `target` is upstream of `start` through the drawn links
fn reaches(graph: &CurriculumGraph, start: &str, target: &str) -> bool {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start.to_string()]);
    while let Some(id) = queue.pop_front() {
        if id == target {
            return true;
        }
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(node) = graph.node(&id) {
            queue.extend(node.dependencies().iter().map(|dep| dep.id().to_string()));
        }
    }
    false
}

proptest! {
    #[test]
    fn simplify_is_idempotent(plan in plan_strategy()) {
        let graph = plan.build();
        let mut again = graph.clone();
        again.simplify();

        prop_assert_eq!(sorted_links(&graph), sorted_links(&again));
    }

    #[test]
    fn reduction_keeps_every_dependency_reachable(plan in plan_strategy()) {
        let graph = plan.build();

        for i in 0..plan.subjects.len() {
            let id = format!("S{}", i);
            for dep in plan.subject_dependencies(i) {
                prop_assert!(reaches(&graph, &id, &dep), "{} lost its path to {}", id, dep);
            }
        }
    }

    #[test]
    fn arrow_ids_are_unique(plan in plan_strategy()) {
        let scene = Scene::capture(&plan.build());

        let ids: HashSet<_> = scene.arrows.iter().map(|a| a.id.as_str()).collect();
        prop_assert_eq!(ids.len(), scene.arrows.len());
        prop_assert_eq!(scene.shape_count(), plan.ids().len());
    }

    #[test]
    fn raising_a_status_never_lowers_availability(
        plan in plan_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let graph = plan.build();
        let i = pick.index(plan.subjects.len());
        let id = format!("S{}", i);

        let mut raised = graph.clone();
        raised.set_status(&id, StatusId::new("APPROVED"));

        let before = availability_ranks(&graph);
        let after = availability_ranks(&raised);
        for ((node, old), (_, new)) in before.iter().zip(after.iter()) {
            prop_assert!(new >= old, "{} dropped from {} to {}", node, old, new);
        }
    }
}
