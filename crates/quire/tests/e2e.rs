// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: configuration through bootstrap, discovery and serving.

use quire::serve::{start, ServeOverrides};
use quire_config::QuireConfig;
use quire_test_utils::packages::PackageTree;

fn config_for(tree: &PackageTree) -> QuireConfig {
    let mut config = QuireConfig::default();
    config.server.host = "127.0.0.1".into();
    config.server.port = 0;
    config.extensions.search_paths = vec![tree.path().display().to_string()];
    config
}

const BLOG_MANIFEST: &str = r#"
[[extension]]
name = "blog"
version = "1.0.0"

[extension.settings]
blog_layout = "article"
"#;

#[tokio::test]
async fn discovered_package_is_served_and_activated() {
    let tree = PackageTree::new().unwrap();
    tree.extension_package("quire-blog", "1.0.0", BLOG_MANIFEST).unwrap();
    tree.package("plain-lib", "2.0.0").unwrap();

    let handle = start(
        &config_for(&tree),
        ServeOverrides {
            activate: vec!["blog".into(), "lorem".into()],
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let body: serde_json::Value =
        reqwest::get(format!("http://{}/__quire/extensions", handle.local_addr()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(body["activated"], serde_json::json!(["blog", "lorem"]));
    let names: Vec<&str> = body["registered"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"blog"));
    assert_eq!(names.len(), 10);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn activating_an_unknown_extension_fails_startup() {
    let tree = PackageTree::new().unwrap();
    let err = start(
        &config_for(&tree),
        ServeOverrides {
            activate: vec!["missing".into()],
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("unknown extension `missing`"));
}

#[test]
fn discover_reports_only_marked_packages() {
    let tree = PackageTree::new().unwrap();
    tree.extension_package("quire-blog", "1.0.0", BLOG_MANIFEST).unwrap();
    tree.package("plain-lib", "2.0.0").unwrap();

    let out = quire::extensions::discover(&config_for(&tree)).unwrap();
    assert!(out.starts_with("scanned 2 package(s), activated 1\n"));
    assert!(out.contains("activated  quire-blog"));
}

#[test]
fn disabled_packages_are_skipped() {
    let tree = PackageTree::new().unwrap();
    tree.extension_package("quire-blog", "1.0.0", BLOG_MANIFEST).unwrap();
    let mut config = config_for(&tree);
    config.extensions.disabled = vec!["quire-blog".into()];

    let out = quire::extensions::list(&config, false).unwrap();
    assert!(!out.contains("blog"));
    assert!(out.contains("lorem"));
}

#[test]
fn list_as_json() {
    let tree = PackageTree::new().unwrap();
    let mut config = config_for(&tree);
    config.extensions.builtin = false;
    tree.extension_package("quire-blog", "1.0.0", BLOG_MANIFEST).unwrap();

    let out = quire::extensions::list(&config, true).unwrap();
    let statuses: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(statuses, serde_json::json!([{ "name": "blog", "state": "ready" }]));
}

#[test]
fn search_finds_builtins_that_list_registers() {
    let tree = PackageTree::new().unwrap();
    let listed = quire::extensions::list(&config_for(&tree), false).unwrap();

    let found = quire::extensions::search("asset hash");
    assert!(found.starts_with("asset_hash  "));
    assert_eq!(found.lines().count(), 1);
    assert!(listed.contains("asset_hash"));
}
