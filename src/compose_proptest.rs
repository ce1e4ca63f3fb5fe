//! Property-based tests for the reconciler and the selection resolver.
//!
//! Documents are generated from a small alphabet of template-like lines so
//! that markers, comment prefixes and block delimiters collide often.

#[cfg(test)]
mod proptest_tests {
    use crate::catalog::{AppDescriptor, ApplicationCatalog};
    use crate::compose::{reconcile, strip_comment_prefix, ComposeDocument};
    use crate::selection::{resolve, ALL};
    use proptest::prelude::*;

    fn catalog() -> ApplicationCatalog {
        ApplicationCatalog::new(vec![
            AppDescriptor::new("1", "Static website", "base.conf", &[]),
            AppDescriptor::new("2", "Wazuh", "delphi.conf", &["1515", "1514", "55000"]),
            AppDescriptor::new("3", "Jenkins", "jenkins.conf", &[])
                .with_block("uncomment if using Jenkins", "# <- finish"),
            AppDescriptor::new("4", "Mailcow", "mailcow.conf", &["25", "587"]),
        ])
        .unwrap()
    }

    fn template_line() -> impl Strategy<Value = String> {
        let body = prop_oneof![
            Just("- \"80:80\"".to_string()),
            Just("- \"1515:1515\"".to_string()),
            Just("- \"587:587\"".to_string()),
            Just("uncomment if using Jenkins".to_string()),
            Just("<- finish".to_string()),
            Just("jenkins:".to_string()),
            "[a-z: \"-]{0,12}",
        ];
        ("[ \t]{0,4}", "(# ?){0,3}", "[ ]{0,2}", body)
            .prop_map(|(indent, hashes, gap, body)| format!("{indent}{hashes}{gap}{body}"))
    }

    fn document() -> impl Strategy<Value = ComposeDocument> {
        prop::collection::vec(template_line(), 0..24)
            .prop_map(|lines| ComposeDocument::from_text(&lines.join("\n")))
    }

    fn selection_input() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(ALL.to_string()),
            prop::sample::subsequence(vec!["1", "2", "3", "4"], 1..=4)
                .prop_map(|keys| keys.join(",")),
        ]
    }

    proptest! {
        /// Property: stripping a comment prefix twice equals stripping it once
        #[test]
        fn strip_comment_prefix_is_a_projection(line in "[ \t#a-z]{0,16}") {
            let once = strip_comment_prefix(&line);
            prop_assert_eq!(strip_comment_prefix(&once), once);
        }

        /// Property: reconcile(reconcile(D, S), S) == reconcile(D, S)
        #[test]
        fn reconcile_is_idempotent(doc in document(), raw in selection_input()) {
            let catalog = catalog();
            let selection = resolve(&raw, "", &catalog).unwrap();
            let once = reconcile(&doc, &selection);
            let twice = reconcile(&once.document, &selection);
            prop_assert_eq!(&once.document, &twice.document);
            prop_assert!(twice.changed_lines.is_empty());
        }

        /// Property: lines are never added, removed or reordered, and only
        /// changed lines differ from the input
        #[test]
        fn reconcile_only_edits_reported_lines(doc in document(), raw in selection_input()) {
            let catalog = catalog();
            let selection = resolve(&raw, "", &catalog).unwrap();
            let result = reconcile(&doc, &selection);

            prop_assert_eq!(doc.lines().len(), result.document.lines().len());
            for (index, (before, after)) in doc.lines().iter().zip(result.document.lines()).enumerate() {
                if result.changed_lines.contains(&(index + 1)) {
                    prop_assert_eq!(&strip_comment_prefix(before), after);
                } else {
                    prop_assert_eq!(before, after);
                }
            }
        }

        /// Property: without the block app selected, lines carrying no selected
        /// marker are byte-identical after reconciliation
        #[test]
        fn unmarked_lines_are_untouched(doc in document(), keys in prop::sample::subsequence(vec!["1", "2", "4"], 1..=3)) {
            let catalog = catalog();
            let selection = resolve(&keys.join(","), "", &catalog).unwrap();
            let result = reconcile(&doc, &selection);

            for (before, after) in doc.lines().iter().zip(result.document.lines()) {
                let stripped = strip_comment_prefix(before);
                let marked = selection
                    .apps()
                    .iter()
                    .any(|app| app.markers.iter().any(|m| stripped.contains(m.as_str())));
                if !marked {
                    prop_assert_eq!(before, after);
                }
            }
        }

        /// Property: with the block app selected, lines carrying no selected
        /// marker and lying outside every start..finish span are byte-identical
        #[test]
        fn lines_outside_selected_blocks_are_untouched(
            doc in document(),
            others in prop::sample::subsequence(vec!["1", "2", "4"], 0..=3)
        ) {
            let catalog = catalog();
            let mut keys = others;
            keys.push("3");
            let selection = resolve(&keys.join(","), "", &catalog).unwrap();
            let result = reconcile(&doc, &selection);

            let mut open = false;
            for (before, after) in doc.lines().iter().zip(result.document.lines()) {
                let stripped = strip_comment_prefix(before);
                let covered = open || stripped.contains("uncomment if using Jenkins");
                open = covered && !stripped.contains("<- finish");

                let marked = selection
                    .apps()
                    .iter()
                    .any(|app| app.markers.iter().any(|m| stripped.contains(m.as_str())));
                if !marked && !covered {
                    prop_assert_eq!(before, after);
                }
            }
        }

        /// Property: resolve(canonical(S)) == S
        #[test]
        fn canonical_selection_round_trips(raw in selection_input()) {
            let catalog = catalog();
            let selection = resolve(&raw, "", &catalog).unwrap();
            let again = resolve(&selection.canonical(), "", &catalog).unwrap();
            prop_assert_eq!(selection, again);
        }

        /// Property: the document text survives a split/join unchanged
        #[test]
        fn document_text_round_trips(text in "[a-z#\n ]{0,40}") {
            prop_assert_eq!(ComposeDocument::from_text(&text).to_text(), text);
        }
    }
}
