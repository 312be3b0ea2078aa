//! Property-based tests for the dispatcher and the pure git helpers.
//!
//! These tests use proptest to generate random batches and verify that
//! ordering and counting invariants hold regardless of timing.

#[cfg(test)]
mod proptest_tests {
    use crate::dispatch::Dispatcher;
    use crate::executor::{ExecutionRequest, Executor};
    use crate::git::{self, WorkingTreeStatus};
    use crate::testing::{repositories, DelayTool};
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::time::Duration;

    // ============================================================================
    // Dispatcher property tests
    // ============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Property: results come back in request order whatever the completion order
        #[test]
        fn results_follow_request_order(
            delays in prop::collection::vec(0u64..6, 0..12),
            jobs in 1usize..9,
        ) {
            let count = delays.len();
            let tool = Arc::new(DelayTool::explicit(
                delays.iter().map(|ms| Duration::from_millis(*ms)).collect(),
            ));
            let executor = Executor::new(tool.clone());
            let requests: Vec<ExecutionRequest> = repositories(count)
                .into_iter()
                .map(|repo| ExecutionRequest::new(repo, vec!["status".to_string()], false))
                .collect();

            let dispatcher = Dispatcher::new(jobs).unwrap();
            let results = dispatcher.run(&executor, &requests, &mut Vec::new()).unwrap();

            prop_assert_eq!(results.len(), count);
            for (i, result) in results.iter().enumerate() {
                prop_assert_eq!(result.repository.discovery_order, i);
                prop_assert_eq!(result.stdout.trim(), result.repository.name.as_str());
            }
            prop_assert!(tool.peak_in_flight() <= jobs);
        }
    }

    // ============================================================================
    // git helper property tests
    // ============================================================================

    proptest! {
        /// Property: a composed trailer is always read back unchanged
        #[test]
        fn chain_trailer_is_recoverable(
            message in "[A-Za-z][A-Za-z0-9 .,]{0,40}",
            name in "[a-z][a-z0-9_-]{0,20}",
            id in "[0-9a-f]{40}",
        ) {
            let trailer = git::chain_trailer(&name, Some(&id));
            let composed = git::compose_message(&message, Some(&trailer));
            prop_assert!(composed.starts_with(message.trim_end()));
            prop_assert_eq!(git::parse_chain_trailer(&composed).unwrap(), Some((name, id)));
        }

        /// Property: porcelain entry counts match the lines generated
        #[test]
        fn status_counts_match_lines(
            staged in 0usize..5,
            unstaged in 0usize..5,
            untracked in 0usize..5,
        ) {
            let mut porcelain = String::from("## main\n");
            for i in 0..staged {
                porcelain.push_str(&format!("A  staged{}.txt\n", i));
            }
            for i in 0..unstaged {
                porcelain.push_str(&format!(" M changed{}.txt\n", i));
            }
            for i in 0..untracked {
                porcelain.push_str(&format!("?? new{}.txt\n", i));
            }

            let status = WorkingTreeStatus::parse(&porcelain);
            prop_assert_eq!(status.staged, staged);
            prop_assert_eq!(status.unstaged, unstaged);
            prop_assert_eq!(status.untracked, untracked);
            prop_assert_eq!(status.is_dirty(), staged + unstaged + untracked > 0);
        }
    }
}
