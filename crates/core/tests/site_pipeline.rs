use std::fs;
use std::path::Path;

use tempfile::tempdir;
use traitdex_core::{FragmentLoader, ModuleCatalog, SiteIndex};
use traitdex_registry::BridgeStage;

fn write_docs_tree(root: &Path) {
    // The catalog deliberately omits diem_framework.
    fs::write(
        root.join("crates.js"),
        r#"window.ALL_CRATES = ["jsonrpc_integration_tests","smoke_test"];"#,
    )
    .unwrap();

    let test_dir = root.join("implementors/forge/interface");
    fs::create_dir_all(&test_dir).unwrap();
    fs::write(
        test_dir.join("trait.Test.js"),
        concat!(
            "(function() {var implementors = {};\n",
            r#"implementors["jsonrpc_integration_tests"] = [{"text":"impl Test for CurrencyInfo","synthetic":false,"types":["jsonrpc_integration_tests::CurrencyInfo"]}];"#,
            "\n",
            r#"implementors["smoke_test"] = [{"text":"impl Test for EventFetcher","synthetic":false,"types":["smoke_test::event_fetcher::EventFetcher"]},{"text":"impl Test for LaunchFullnode","synthetic":false,"types":["smoke_test::fullnode::LaunchFullnode"]}];"#,
            "\n",
            "if (window.register_implementors) {window.register_implementors(implementors);} else {window.pending_implementors = implementors;}})()\n",
        ),
    )
    .unwrap();
    // Not a payload file; the loader must skip it.
    fs::write(test_dir.join("main.js"), "window.boot();\n").unwrap();

    let resource_dir = root.join("implementors/move_core_types");
    fs::create_dir_all(&resource_dir).unwrap();
    fs::write(
        resource_dir.join("trait.Resource.js"),
        concat!(
            "(function() {var implementors = {};\n",
            r#"implementors["diem_framework"] = [{"text":"impl Resource for Account","synthetic":false,"types":["diem_framework::Account"]}];"#,
            "\n",
            "})()\n",
        ),
    )
    .unwrap();

    // One malformed line; the whole file must drop, its good line included.
    let broken_dir = root.join("implementors/broken");
    fs::create_dir_all(&broken_dir).unwrap();
    fs::write(
        broken_dir.join("trait.Bad.js"),
        concat!(
            r#"implementors["ok_mod"] = [{"text":"impl Bad for Survivor","synthetic":false,"types":["ok_mod::Survivor"]}];"#,
            "\n",
            r#"implementors["zzz_broken"] = [{"text": }];"#,
            "\n",
        ),
    )
    .unwrap();
}

#[test]
fn load_report_counts_every_outcome() {
    let dir = tempdir().unwrap();
    write_docs_tree(dir.path());

    let outcome = FragmentLoader::new(dir.path()).load().unwrap();

    assert_eq!(outcome.report.files_seen, 4);
    assert_eq!(outcome.report.fragments_loaded, 2);
    assert_eq!(
        outcome.report.files_skipped, 2,
        "main.js is not a payload and trait.Bad.js is malformed"
    );
    assert_eq!(outcome.report.malformed_lines, 1);
    assert_eq!(outcome.report.records_loaded, 4);
}

#[test]
fn docs_tree_flows_into_a_merged_snapshot() {
    let dir = tempdir().unwrap();
    write_docs_tree(dir.path());

    let outcome = FragmentLoader::new(dir.path()).load().unwrap();
    let site = SiteIndex::new();
    let handle = site.submit_handle();
    for fragment in outcome.fragments {
        handle.submit(fragment);
    }
    assert_eq!(site.stage(), BridgeStage::Buffering);

    let drained = site.activate().unwrap();
    assert_eq!(drained, 2);

    let snapshot = site.snapshot().unwrap();
    let stats = snapshot.stats();
    assert_eq!(stats.capability_count, 2);
    assert_eq!(stats.record_count, 4);

    let test_modules: Vec<_> = snapshot
        .capability("forge::interface::Test")
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(test_modules, ["jsonrpc_integration_tests", "smoke_test"]);

    // Wire payloads carry no explicit target; it is derived on ingest.
    let records = snapshot
        .records("forge::interface::Test", "smoke_test")
        .unwrap();
    assert_eq!(records[0].target_type, "smoke_test::event_fetcher::EventFetcher");
    assert_eq!(records[1].target_type, "smoke_test::fullnode::LaunchFullnode");
}

#[test]
fn malformed_line_drops_the_whole_fragment() {
    let dir = tempdir().unwrap();
    write_docs_tree(dir.path());

    let outcome = FragmentLoader::new(dir.path()).load().unwrap();
    assert_eq!(outcome.report.malformed_lines, 1);

    let site = SiteIndex::new();
    for fragment in outcome.fragments {
        site.submit(fragment);
    }
    site.activate().unwrap();

    // ok_mod shares a file with the broken line, so it never merges.
    let snapshot = site.snapshot().unwrap();
    assert!(snapshot.capability("broken::Bad").is_none());
    assert!(snapshot.records("broken::Bad", "ok_mod").is_none());
}

#[test]
fn catalog_cross_check_reports_unlisted_modules() {
    let dir = tempdir().unwrap();
    write_docs_tree(dir.path());

    let catalog = ModuleCatalog::from_path(&dir.path().join("crates.js")).unwrap();
    let outcome = FragmentLoader::new(dir.path()).load().unwrap();
    let site = SiteIndex::new();
    for fragment in outcome.fragments {
        site.submit(fragment);
    }
    site.activate_with_catalog(&catalog).unwrap();

    let missing = site.snapshot().unwrap().modules_missing_from(&catalog);
    assert_eq!(missing, ["diem_framework"]);
}

#[test]
fn reregistration_through_the_pipeline_replaces_wholesale() {
    let dir = tempdir().unwrap();
    let cap_dir = dir.path().join("implementors/x");
    fs::create_dir_all(&cap_dir).unwrap();
    fs::write(
        cap_dir.join("trait.Trait.js"),
        concat!(
            r#"implementors["module_x"] = [{"text":"impl for R1","synthetic":false,"types":["module_x::R1"]},{"text":"impl for R2","synthetic":false,"types":["module_x::R2"]}];"#,
            "\n",
        ),
    )
    .unwrap();

    let site = SiteIndex::new();
    let first_load = FragmentLoader::new(dir.path()).load().unwrap();
    for fragment in first_load.fragments {
        site.submit(fragment);
    }

    // The same payload ships again with a shrunken record list.
    fs::write(
        cap_dir.join("trait.Trait.js"),
        concat!(
            r#"implementors["module_x"] = [{"text":"impl for R5","synthetic":false,"types":["module_x::R5"]}];"#,
            "\n",
        ),
    )
    .unwrap();
    let second_load = FragmentLoader::new(dir.path()).load().unwrap();
    for fragment in second_load.fragments {
        site.submit(fragment);
    }

    site.activate().unwrap();
    let snapshot = site.snapshot().unwrap();
    let records = snapshot.records("x::Trait", "module_x").unwrap();
    let targets: Vec<_> = records.iter().map(|r| r.target_type.as_str()).collect();
    assert_eq!(targets, ["module_x::R5"]);
}

#[test]
fn missing_fragment_directory_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(FragmentLoader::new(dir.path()).load().is_err());
}
