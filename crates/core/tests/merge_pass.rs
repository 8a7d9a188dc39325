mod common;

use common::*;
use jarweave_core::{DuplicatePolicy, InjectorOutcome, MergeConfig, MergeError, MergeRequest};
use jarweave_core::MergeInput;
use jarweave_java::{read_split_constant, read_static_constant};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_two_archive_scenario() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("A.jar");
    let b = temp.path().join("B.jar");
    let out = temp.path().join("out.jar");

    let foo = b"plain class bytes".to_vec();
    let route = route_holder("r1");
    let service = service_holder(r#"{"t1":"t2,t3"}"#);
    write_jar(&a, &[("pkg/Foo.class", foo.clone()), (ROUTE_HOLDER, route.clone())]);
    write_jar(&b, &[(SERVICE_HOLDER, service.clone()), (INJECTOR, injector("b"))]);

    let report = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a, b], vec![], &out))
        .unwrap();

    let entries = read_jar(&out);
    assert_eq!(
        names(&entries),
        vec!["pkg/Foo.class", ROUTE_HOLDER, SERVICE_HOLDER, INJECTOR]
    );
    assert_eq!(entries[0].1, foo);
    assert_eq!(entries[1].1, route);
    assert_eq!(entries[2].1, service);
    assert_ne!(entries[3].1, injector("b"));

    assert_eq!(report.entries_written, 4);
    assert_eq!(report.entries_scanned, 2);
    assert_eq!(report.scan_failures, 0);
    assert_eq!(
        report.metadata.route_maps,
        BTreeSet::from(["r1".to_string()])
    );
    assert_eq!(report.metadata.flow_tasks.len(), 1);
    assert_eq!(report.metadata.flow_tasks["t1"], "t2,t3");
    assert_eq!(
        report.graph.dependencies("t1"),
        Some(&BTreeSet::from(["t2".to_string(), "t3".to_string()]))
    );
    assert_eq!(report.task_order, Some(vec!["t1".to_string()]));
    assert!(matches!(report.injector, InjectorOutcome::Rewritten { .. }));

    let injected = &entries[3].1;
    assert_eq!(
        read_static_constant(injected, "ROUTERMAP").unwrap().as_deref(),
        Some(r#"["r1"]"#)
    );
    assert_eq!(
        read_static_constant(injected, "FLOW_TASK_JSON")
            .unwrap()
            .as_deref(),
        Some(r#"{"t1":"t2,t3"}"#)
    );
    assert_eq!(
        read_static_constant(injected, "TAG").unwrap().as_deref(),
        Some("b")
    );
}

#[test]
fn test_injector_is_last_even_when_first_in_input() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let out = temp.path().join("out.jar");
    write_jar(
        &a,
        &[
            (INJECTOR, injector("a")),
            ("x/One.class", b"1".to_vec()),
            ("x/Two.class", b"2".to_vec()),
        ],
    );

    merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a], vec![], &out))
        .unwrap();

    let entries = read_jar(&out);
    assert_eq!(names(&entries), vec!["x/One.class", "x/Two.class", INJECTOR]);
}

#[test]
fn test_first_injector_wins() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let b = temp.path().join("b.jar");
    let out = temp.path().join("out.jar");
    write_jar(&a, &[(INJECTOR, injector("first"))]);
    write_jar(&b, &[(INJECTOR, injector("second"))]);

    let report = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a, b], vec![], &out))
        .unwrap();

    let entries = read_jar(&out);
    assert_eq!(names(&entries), vec![INJECTOR]);
    assert_eq!(
        read_static_constant(&entries[0].1, "TAG").unwrap().as_deref(),
        Some("first")
    );
    assert_eq!(report.injectors_ignored, 1);
}

#[test]
fn test_no_injector_skips_rewrite() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let out = temp.path().join("out.jar");
    write_jar(&a, &[(ROUTE_HOLDER, route_holder("r1"))]);

    let report = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a], vec![], &out))
        .unwrap();

    assert_eq!(report.injector, InjectorOutcome::Absent);
    assert_eq!(names(&read_jar(&out)), vec![ROUTE_HOLDER]);
}

#[test]
fn test_malformed_holder_is_copied_through() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let out = temp.path().join("out.jar");
    let garbage = b"\xCA\xFE\xBA\xBE truncated".to_vec();
    write_jar(
        &a,
        &[
            (ROUTE_HOLDER, garbage.clone()),
            (SERVICE_HOLDER, service_holder("not json")),
        ],
    );

    let report = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a], vec![], &out))
        .unwrap();

    let entries = read_jar(&out);
    assert_eq!(names(&entries), vec![ROUTE_HOLDER, SERVICE_HOLDER]);
    assert_eq!(entries[0].1, garbage);
    assert_eq!(report.scan_failures, 2);
    assert!(report.metadata.is_empty());
}

#[test]
fn test_flow_tasks_last_write_wins_across_inputs() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let b = temp.path().join("b.jar");
    let out = temp.path().join("out.jar");
    write_jar(
        &a,
        &[
            (ROUTE_HOLDER, route_holder("r1")),
            (SERVICE_HOLDER, service_holder(r#"{"t1":"early","t2":""}"#)),
        ],
    );
    write_jar(
        &b,
        &[
            ("a/RouterMap__TheRouter__lib.class", route_holder("r1")),
            (
                "a/ServiceProvider__TheRouter__lib.class",
                service_holder(r#"{"t1":"t2"}"#),
            ),
        ],
    );

    let report = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a, b], vec![], &out))
        .unwrap();

    assert_eq!(report.metadata.route_maps.len(), 1);
    assert_eq!(report.metadata.flow_tasks["t1"], "t2");
    assert_eq!(report.metadata.flow_tasks["t2"], "");
    assert_eq!(
        report.task_order,
        Some(vec!["t2".to_string(), "t1".to_string()])
    );
}

#[test]
fn test_collision_fails_and_leaves_no_output() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let b = temp.path().join("b.jar");
    let out = temp.path().join("out.jar");
    write_jar(&a, &[("pkg/Foo.class", b"a".to_vec())]);
    write_jar(&b, &[("pkg/Foo.class", b"b".to_vec())]);

    let err = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a, b], vec![], &out))
        .unwrap_err();

    match err {
        MergeError::Collision {
            name,
            first,
            second,
        } => {
            assert_eq!(name, "pkg/Foo.class");
            assert!(first.contains("a.jar"));
            assert!(second.contains("b.jar"));
        }
        other => panic!("expected collision, got {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn test_keep_first_policy() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let b = temp.path().join("b.jar");
    let out = temp.path().join("out.jar");
    write_jar(&a, &[("pkg/Foo.class", b"a".to_vec())]);
    write_jar(
        &b,
        &[
            ("pkg/Foo.class", b"b".to_vec()),
            ("pkg/Bar.class", b"c".to_vec()),
        ],
    );

    let config = MergeConfig {
        duplicate_policy: DuplicatePolicy::KeepFirst,
        ..Default::default()
    };
    let report = merger(config)
        .merge(&MergeRequest::new(vec![a, b], vec![], &out))
        .unwrap();

    let entries = read_jar(&out);
    assert_eq!(names(&entries), vec!["pkg/Foo.class", "pkg/Bar.class"]);
    assert_eq!(entries[0].1, b"a");
    assert_eq!(report.duplicates_skipped, 1);
}

#[test]
fn test_duplicate_directory_entries_collapse() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let b = temp.path().join("b.jar");
    let out = temp.path().join("out.jar");
    write_jar(&a, &[("META-INF/", Vec::new()), ("x/A.class", b"a".to_vec())]);
    write_jar(&b, &[("META-INF/", Vec::new()), ("x/B.class", b"b".to_vec())]);

    merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a, b], vec![], &out))
        .unwrap();

    assert_eq!(
        names(&read_jar(&out)),
        vec!["META-INF/", "x/A.class", "x/B.class"]
    );
}

#[test]
fn test_directory_inputs() {
    let temp = TempDir::new().unwrap();
    let classes = temp.path().join("classes");
    std::fs::create_dir_all(classes.join("a")).unwrap();
    std::fs::create_dir_all(classes.join("com/therouter")).unwrap();
    std::fs::create_dir_all(classes.join("pkg")).unwrap();
    std::fs::write(classes.join("pkg/Foo.class"), b"foo").unwrap();
    std::fs::write(classes.join(ROUTE_HOLDER), route_holder("r-dir")).unwrap();
    std::fs::write(classes.join(INJECTOR), injector("dir")).unwrap();

    let lib = temp.path().join("lib.jar");
    write_jar(&lib, &[("lib/Lib.class", b"lib".to_vec())]);
    let out = temp.path().join("out.jar");

    let report = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![lib], vec![classes], &out))
        .unwrap();

    let entries = read_jar(&out);
    assert_eq!(
        names(&entries),
        vec!["lib/Lib.class", ROUTE_HOLDER, "pkg/Foo.class", INJECTOR]
    );
    assert_eq!(entries[2].1, b"foo");
    assert!(report.metadata.route_maps.contains("r-dir"));
    assert!(matches!(report.injector, InjectorOutcome::Rewritten { .. }));
}

#[test]
fn test_missing_input_is_fatal() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out.jar");
    let missing = temp.path().join("missing.jar");

    let err = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![missing.clone()], vec![], &out))
        .unwrap_err();

    match err {
        MergeError::InputOpen { path, .. } => assert_eq!(path, missing),
        other => panic!("expected input open failure, got {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn test_missing_directory_is_fatal() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out.jar");

    let err = merger(MergeConfig::default())
        .merge(&MergeRequest::new(
            Vec::<PathBuf>::new(),
            vec![temp.path().join("nope")],
            &out,
        ))
        .unwrap_err();
    assert!(matches!(err, MergeError::InputOpen { .. }));
}

#[test]
fn test_cycle_fails_before_output_is_persisted() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let out = temp.path().join("out.jar");
    write_jar(
        &a,
        &[(SERVICE_HOLDER, service_holder(r#"{"t1":"t2","t2":"t1"}"#))],
    );

    let err = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a.clone()], vec![], &out))
        .unwrap_err();
    match err {
        MergeError::CyclicFlowTask(cycle) => assert_eq!(cycle.cycle, vec!["t1", "t2", "t1"]),
        other => panic!("expected cycle, got {other:?}"),
    }
    assert!(!out.exists());

    let config = MergeConfig {
        check_flow_task_cycles: false,
        ..Default::default()
    };
    let report = merger(config)
        .merge(&MergeRequest::new(vec![a], vec![], &out))
        .unwrap();
    assert_eq!(report.task_order, None);
    assert!(out.exists());
}

#[test]
fn test_unparseable_injector_is_passed_through() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let out = temp.path().join("out.jar");
    write_jar(
        &a,
        &[(INJECTOR, b"garbage".to_vec()), ("x/A.class", b"a".to_vec())],
    );

    let report = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a], vec![], &out))
        .unwrap();

    let entries = read_jar(&out);
    assert_eq!(names(&entries), vec!["x/A.class", INJECTOR]);
    assert_eq!(entries[1].1, b"garbage");
    assert!(matches!(report.injector, InjectorOutcome::PassedThrough { .. }));
}

#[test]
fn test_batch_size_does_not_change_result() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let mut entries: Vec<(String, Vec<u8>)> = (0..10)
        .map(|i| (format!("a/RouterMap__TheRouter__m{i}.class"), route_holder(&format!("r{i}"))))
        .collect();
    entries.push((
        "a/ServiceProvider__TheRouter__x.class".to_string(),
        service_holder(r#"{"t":"a"}"#),
    ));
    entries.push((
        "a/ServiceProvider__TheRouter__y.class".to_string(),
        service_holder(r#"{"t":"b"}"#),
    ));
    let borrowed: Vec<(&str, Vec<u8>)> = entries
        .iter()
        .map(|(name, bytes)| (name.as_str(), bytes.clone()))
        .collect();
    write_jar(&a, &borrowed);

    let mut results = Vec::new();
    for batch in [1, 3, 64] {
        let out = temp.path().join(format!("out-{batch}.jar"));
        let config = MergeConfig {
            scan_batch_size: batch,
            ..Default::default()
        };
        let report = merger(config)
            .merge(&MergeRequest::new(vec![a.clone()], vec![], &out))
            .unwrap();
        assert_eq!(report.metadata.flow_tasks["t"], "b");
        results.push((report.metadata, names(&read_jar(&out)).join(",")));
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
}

#[test]
fn test_inspect_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    write_jar(
        &a,
        &[
            (ROUTE_HOLDER, route_holder("r1")),
            (SERVICE_HOLDER, service_holder(r#"{"t1":"t2","t3":"t3"}"#)),
            (INJECTOR, injector("a")),
        ],
    );

    let inspection = merger(MergeConfig::default())
        .inspect(&[MergeInput::Archive(a)])
        .unwrap();

    assert_eq!(inspection.entries, 3);
    assert_eq!(inspection.entries_scanned, 2);
    assert!(inspection.injector.unwrap().ends_with(INJECTOR));
    assert_eq!(inspection.dangling, vec![("t1".to_string(), "t2".to_string())]);
    assert_eq!(inspection.cycle, Some(vec!["t3".to_string(), "t3".to_string()]));
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn test_large_metadata_is_still_embedded() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let out = temp.path().join("out.jar");

    let holders: Vec<(String, Vec<u8>)> = (0..80)
        .map(|i| {
            let value = format!("r{i:02}-{}", "x".repeat(1000));
            (format!("a/RouterMap__TheRouter__m{i:02}.class"), route_holder(&value))
        })
        .collect();
    let mut entries: Vec<(&str, Vec<u8>)> = holders
        .iter()
        .map(|(name, bytes)| (name.as_str(), bytes.clone()))
        .collect();
    entries.push((INJECTOR, injector("a")));
    write_jar(&a, &entries);

    let report = merger(MergeConfig::default())
        .merge(&MergeRequest::new(vec![a], vec![], &out))
        .unwrap();

    assert_eq!(report.metadata.route_maps.len(), 80);
    assert!(matches!(report.injector, InjectorOutcome::Rewritten { .. }));

    let output = read_jar(&out);
    let injected = &output.last().unwrap().1;
    let embedded = read_split_constant(injected, "ROUTERMAP").unwrap().unwrap();
    assert!(embedded.len() > u16::MAX as usize);
    let fragments: BTreeSet<String> = serde_json::from_str(&embedded).unwrap();
    assert_eq!(fragments, report.metadata.route_maps);
}

#[test]
fn test_output_inside_input_directory_is_not_merged() {
    let temp = TempDir::new().unwrap();
    let classes = temp.path().join("classes");
    std::fs::create_dir_all(classes.join("pkg")).unwrap();
    std::fs::write(classes.join("pkg/Foo.class"), b"foo").unwrap();
    let out = classes.join("out.jar");

    for _ in 0..2 {
        let report = merger(MergeConfig::default())
            .merge(&MergeRequest::new(Vec::<PathBuf>::new(), vec![classes.clone()], &out))
            .unwrap();
        assert_eq!(report.entries_written, 1);
        assert_eq!(names(&read_jar(&out)), vec!["pkg/Foo.class"]);
    }

    let leftovers: Vec<_> = std::fs::read_dir(&classes)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 2);
}

#[test]
fn test_inspect_rejects_collisions_like_merge() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.jar");
    let b = temp.path().join("b.jar");
    write_jar(&a, &[(ROUTE_HOLDER, route_holder("r1"))]);
    write_jar(&b, &[(ROUTE_HOLDER, route_holder("r2"))]);
    let inputs = [MergeInput::Archive(a), MergeInput::Archive(b)];

    let err = merger(MergeConfig::default()).inspect(&inputs).unwrap_err();
    assert!(matches!(err, MergeError::Collision { .. }));

    let inspection = merger(MergeConfig {
        duplicate_policy: DuplicatePolicy::KeepFirst,
        ..Default::default()
    })
    .inspect(&inputs)
    .unwrap();
    assert_eq!(inspection.duplicates_skipped, 1);
    assert_eq!(inspection.entries_scanned, 1);
    assert_eq!(
        inspection.metadata.route_maps,
        BTreeSet::from(["r1".to_string()])
    );
}
