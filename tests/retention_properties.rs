//! Property tests for the retention planner

use cv_api::{ContentViewVersion, Environment};
use cv_lifecycle::{RetentionDecision, RetentionPolicy};
use proptest::prelude::*;

fn history(deployed: &[bool]) -> Vec<ContentViewVersion> {
    let total = deployed.len() as u64;
    deployed
        .iter()
        .enumerate()
        .map(|(i, live)| ContentViewVersion {
            id: 100 + i as u64,
            version: format!("{}.0", total - i as u64),
            environments: if *live {
                vec![Environment {
                    id: 7,
                    name: "QA".to_string(),
                    label: "QA".to_string(),
                }]
            } else {
                Vec::new()
            },
        })
        .collect()
}

proptest! {
    #[test]
    fn short_histories_are_kept(deployed in prop::collection::vec(any::<bool>(), 0..=3)) {
        let plan = RetentionPolicy::default().plan(&history(&deployed));
        prop_assert_eq!(plan.deletions().count(), 0);
        prop_assert_eq!(plan.blocked().count(), 0);
    }

    #[test]
    fn newest_versions_are_never_deleted(
        deployed in prop::collection::vec(any::<bool>(), 0..20),
        keep in 1usize..6,
    ) {
        let versions = history(&deployed);
        let plan = RetentionPolicy::keep_last_n(keep).plan(&versions);

        for entry in plan.entries.iter().take(keep) {
            prop_assert_eq!(entry.decision, RetentionDecision::Keep);
        }
        prop_assert_eq!(plan.entries.len(), versions.len());
    }

    #[test]
    fn older_versions_deleted_unless_deployed(
        deployed in prop::collection::vec(any::<bool>(), 0..20),
        keep in 1usize..6,
    ) {
        let plan = RetentionPolicy::keep_last_n(keep).plan(&history(&deployed));

        for (entry, live) in plan.entries.iter().zip(&deployed).skip(keep) {
            let expected = if *live { RetentionDecision::Blocked } else { RetentionDecision::Delete };
            prop_assert_eq!(entry.decision, expected);
        }
        prop_assert_eq!(
            plan.candidates().count(),
            RetentionPolicy::keep_last_n(keep).obsolete_count(deployed.len())
        );
    }
}
