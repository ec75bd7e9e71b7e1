use std::io::Write;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.output.directory = Some(PathBuf::from("from-file"));
    raw.logging.level = Some("info".to_string());
    raw.documents = Some(RawDocuments::List(vec!["a".to_string()]));

    let overrides = BuildOverrides {
        output_dir: Some(PathBuf::from("from-cli")),
        log_level: Some("debug".to_string()),
        documents: vec!["x".to_string(), "y".to_string()],
        ..Default::default()
    };

    raw.apply_build_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.output.directory, PathBuf::from("from-cli"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(
        settings.documents,
        vec![DocumentId::new("x"), DocumentId::new("y")]
    );
}

#[test]
fn defaults_are_applied() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.source.snapshot_dir, PathBuf::from(DEFAULT_SNAPSHOT_DIR));
    assert_eq!(settings.output.directory, PathBuf::from(DEFAULT_OUTPUT_DIR));
    assert!(settings.output.clean);
    assert_eq!(settings.output.naming, PageNaming::Positional);
    assert!(settings.output.assets_dir.is_none());
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.path, PathBuf::from(DEFAULT_CACHE_PATH));
    assert!(settings.documents.is_empty());
    assert_eq!(settings.logging.format, LogFormat::Compact);
}

#[test]
fn comma_separated_documents_are_split_and_trimmed() {
    let ids = build_documents(Some(RawDocuments::Joined(" a1, b2 ,,c3 ".to_string())))
        .expect("documents");
    assert_eq!(
        ids,
        vec![
            DocumentId::new("a1"),
            DocumentId::new("b2"),
            DocumentId::new("c3")
        ]
    );
}

#[test]
fn duplicate_documents_are_rejected() {
    let err = build_documents(Some(RawDocuments::List(vec![
        "a".to_string(),
        " a ".to_string(),
    ])))
    .expect_err("duplicate");
    assert!(matches!(err, LoadError::Invalid { key: "documents", .. }));
}

#[test]
fn unknown_naming_mode_is_invalid() {
    let mut raw = RawSettings::default();
    raw.output.naming = Some("random".to_string());
    let err = Settings::from_raw(raw).expect_err("invalid naming");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "output.naming",
            ..
        }
    ));
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "logging.level",
            ..
        })
    ));
}

#[test]
fn no_cache_and_json_flags_apply() {
    let mut raw = RawSettings::default();
    let overrides = BuildOverrides {
        no_cache: true,
        log_json: Some(true),
        naming: Some(NamingArg::Title),
        ..Default::default()
    };

    raw.apply_build_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(!settings.cache.enabled);
    assert_eq!(settings.logging.format, LogFormat::Json);
    assert_eq!(settings.output.naming, PageNaming::Title);
}

#[test]
fn default_to_build_command() {
    let args = CliArgs::parse_from(["blocksite"]);
    assert!(args.command.is_none());
}

#[test]
fn parse_build_arguments() {
    let args = CliArgs::parse_from([
        "blocksite",
        "build",
        "--document",
        "first",
        "--document",
        "second",
        "--clean",
        "false",
        "--naming",
        "title",
        "--cache-path",
        "/tmp/cache.json",
    ]);
    match args.command.expect("build command") {
        Command::Build(build) => {
            assert_eq!(build.overrides.documents, vec!["first", "second"]);
            assert_eq!(build.overrides.clean, Some(false));
            assert_eq!(build.overrides.naming, Some(NamingArg::Title));
            assert_eq!(
                build.overrides.cache.cache_path.as_deref(),
                Some(std::path::Path::new("/tmp/cache.json"))
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_cache_clear_arguments() {
    let args = CliArgs::parse_from(["blocksite", "cache", "clear", "--cache-path", "c.json"]);
    match args.command.expect("cache command") {
        Command::Cache(CacheArgs {
            command: CacheCommand::Clear(clear),
        }) => {
            assert_eq!(
                clear.cache.cache_path.as_deref(),
                Some(std::path::Path::new("c.json"))
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn config_file_layer_is_read() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config");
    writeln!(
        file,
        r#"
documents = ["home", "guide"]

[source]
snapshot_dir = "fixtures/snapshot"

[output]
directory = "public"
naming = "title"

[site]
title = "Handbook"
"#
    )
    .expect("write config");

    let path = file.path().to_string_lossy().to_string();
    let args = CliArgs::parse_from(["blocksite", "--config-file", path.as_str()]);
    let settings = load(&args).expect("settings");

    assert_eq!(
        settings.documents,
        vec![DocumentId::new("home"), DocumentId::new("guide")]
    );
    assert_eq!(settings.source.snapshot_dir, PathBuf::from("fixtures/snapshot"));
    assert_eq!(settings.output.directory, PathBuf::from("public"));
    assert_eq!(settings.output.naming, PageNaming::Title);
    assert_eq!(settings.site.title, "Handbook");
}

#[test]
fn environment_layer_splits_document_lists() {
    let mut vars = config::Map::new();
    vars.insert("BLOCKSITE__DOCUMENTS".to_string(), "home, guide".to_string());
    vars.insert("BLOCKSITE__OUTPUT__DIRECTORY".to_string(), "public".to_string());
    vars.insert("BLOCKSITE__CACHE__ENABLED".to_string(), "false".to_string());

    let raw: RawSettings = Config::builder()
        .add_source(environment().source(Some(vars)))
        .build()
        .expect("config builds")
        .try_deserialize()
        .expect("raw settings");
    assert!(matches!(raw.documents, Some(RawDocuments::Joined(_))));

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.documents,
        vec![DocumentId::new("home"), DocumentId::new("guide")]
    );
    assert_eq!(settings.output.directory, PathBuf::from("public"));
    assert!(!settings.cache.enabled);
}
