//! Catalog file integration tests
//!
//! - TOML and JSON catalogs load in declaration order
//! - Integrity errors fail at load time, not at resolution
//! - File provenance reaches the resolved artifact

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use vod_preset::catalog::CatalogOrigin;
use vod_preset::source::sha256_hex;
use vod_preset::{Catalog, CatalogError, PresetError, ResolvedArtifact, RuntimeOverrides};

const TOML_CATALOG: &str = r#"
[[preset]]
name = "base"
[preset.overrides]
ratelimit = 100
fmt = "a"

[[preset]]
name = "twitch"
[preset.overrides]
ratelimit = 50

[[preset]]
name = "audio"
[preset.overrides]
postprocessors = ["extract"]

[[preset]]
name = "twitch-audio"
parents = ["audio", "twitch"]
notice = "Downloads audio only."
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_toml_catalog_scenario() {
    let dir = TempDir::new().unwrap();
    let contents = format!("base = \"base\"\n{}", TOML_CATALOG);
    let path = write(&dir, "presets.toml", &contents);

    let catalog = Catalog::load(&path).unwrap();
    assert_eq!(
        catalog.registry().list_selectable_names(),
        vec!["base", "twitch", "audio", "twitch-audio"]
    );
    assert_eq!(catalog.notice("twitch-audio"), Some("Downloads audio only."));

    let resolved = catalog.registry().resolve("twitch-audio").unwrap();
    assert_eq!(
        serde_json::Value::Object(resolved.options),
        json!({"ratelimit": 50, "fmt": "a", "postprocessors": ["extract"]})
    );
}

#[test]
fn test_json_catalog_with_inline_inherits() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "presets.json",
        r#"{
            "preset": [
                {"name": "_default", "overrides": {"ratelimit": 6250000}},
                {"name": "_audio-only", "overrides": {"format": "bestaudio/best"}},
                {"name": "youtube-audio", "overrides": {"_inherits": ["_audio-only"]}}
            ]
        }"#,
    );

    let catalog = Catalog::load(&path).unwrap();
    assert_eq!(catalog.registry().list_selectable_names(), vec!["youtube-audio"]);

    let resolved = catalog.registry().resolve("youtube-audio").unwrap();
    assert_eq!(resolved.get_str("format"), Some("bestaudio/best"));
    assert!(!resolved.contains_key("_inherits"));
}

#[test]
fn test_catalog_integrity_errors() {
    let dir = TempDir::new().unwrap();

    let duplicate = write(
        &dir,
        "dup.toml",
        "[[preset]]\nname = \"_default\"\n[[preset]]\nname = \"a\"\n[[preset]]\nname = \"a\"\n",
    );
    assert!(matches!(
        Catalog::load(&duplicate),
        Err(CatalogError::Engine(PresetError::DuplicateName(ref n))) if n == "a"
    ));

    let dangling = write(
        &dir,
        "dangling.toml",
        "[[preset]]\nname = \"_default\"\n[[preset]]\nname = \"a\"\nparents = [\"ghost\"]\n",
    );
    let err = Catalog::load(&dangling).unwrap_err();
    assert!(err.to_string().contains("ghost"));

    let no_base = write(&dir, "nobase.toml", "[[preset]]\nname = \"a\"\n");
    assert!(matches!(
        Catalog::load(&no_base),
        Err(CatalogError::Engine(PresetError::MissingBase(_)))
    ));

    let conflicting = write(
        &dir,
        "conflict.toml",
        "[[preset]]\nname = \"_default\"\n[[preset]]\nname = \"b\"\n[[preset]]\nname = \"a\"\nparents = [\"b\"]\n[preset.overrides]\n_inherits = [\"b\"]\n",
    );
    assert!(matches!(
        Catalog::load(&conflicting),
        Err(CatalogError::Engine(PresetError::ConflictingParents(_)))
    ));
}

#[test]
fn test_parse_error_reported() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.toml", "[[preset]\nname = ");
    assert!(matches!(Catalog::load(&path), Err(CatalogError::Parse(_))));
}

#[test]
fn test_artifact_carries_file_provenance() {
    let dir = TempDir::new().unwrap();
    let contents = format!("base = \"base\"\n{}", TOML_CATALOG);
    let path = write(&dir, "presets.toml", &contents);

    let catalog = Catalog::load(&path).unwrap();
    let overrides = RuntimeOverrides::new().with("ratelimit", "1000000");
    let resolved = catalog
        .registry()
        .resolver()
        .resolve_with("twitch", &overrides)
        .unwrap();
    let artifact = ResolvedArtifact::new(resolved, catalog.source().clone(), &overrides);

    assert_eq!(artifact.catalog.origin, CatalogOrigin::File);
    assert_eq!(artifact.catalog.digest, Some(sha256_hex(contents.as_bytes())));
    assert_eq!(artifact.options["ratelimit"], 1000000);
}
