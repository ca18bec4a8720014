use std::io::Write;

use isomaker_config::{ConfigError, ConfigValidationError, IsoMakerConfig};

#[test]
fn loads_full_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(
        file,
        r#"
[iso9660]
level = 1
rock_ridge_level = 0

[joliet]
level = 0

[udf]
enabled = true

[logging]
level = "debug"
json = true
"#
    )
    .expect("write config");

    let config = IsoMakerConfig::load_from_path(file.path()).expect("config should load");
    assert_eq!(config.iso9660.level, 1);
    assert_eq!(config.iso9660.rock_ridge_level, 0);
    assert_eq!(config.joliet.level, 0);
    assert!(config.udf.enabled);
    assert!(!config.hfs.enabled);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("isomaker.toml");

    let err = IsoMakerConfig::load_from_path(&path).expect_err("missing file");
    match err {
        ConfigError::Io { path: reported, .. } => {
            assert!(reported.ends_with("isomaker.toml"), "got {reported}")
        }
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn out_of_range_levels_fail_validation() {
    let err = IsoMakerConfig::load_from_str("[iso9660]\nlevel = 4\n").expect_err("level 4");
    match err {
        ConfigError::Invalid(errors) => assert_eq!(
            errors,
            vec![ConfigValidationError::Iso9660Level { value: 4, max: 3 }]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }
}
