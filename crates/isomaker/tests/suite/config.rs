use std::sync::Arc;

use isomaker::{
    ContentStream, IsoMaker, IsoMakerConfig, IsoMakerError, NamespaceKind, NamespaceSet,
};

#[derive(Debug)]
struct Fixed(u64);

impl ContentStream for Fixed {
    fn size(&self) -> u64 {
        self.0
    }
}

fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("isomaker=trace")
        .with_test_writer()
        .try_init();
}

#[test]
fn builder_follows_loaded_configuration() {
    let config = IsoMakerConfig::load_from_str(
        r#"
[iso9660]
level = 2
rock_ridge_level = 2

[joliet]
level = 1
rock_ridge_level = 1

[hfs]
enabled = true
"#,
    )
    .unwrap();

    let maker = IsoMaker::with_config(&config).unwrap();
    let iso = maker.namespace(NamespaceKind::Iso9660);
    assert_eq!((iso.level(), iso.rock_ridge_level()), (2, 2));
    let joliet = maker.namespace(NamespaceKind::Joliet);
    assert_eq!((joliet.level(), joliet.rock_ridge_level()), (1, 1));
    assert!(maker.namespace(NamespaceKind::Hfs).is_enabled());
    assert!(!maker.namespace(NamespaceKind::Udf).is_enabled());
}

#[test]
fn default_configuration_matches_a_fresh_builder() {
    let configured = IsoMaker::with_config(&IsoMakerConfig::default()).unwrap();
    let fresh = IsoMaker::new();
    for kind in NamespaceKind::ALL {
        let (a, b) = (configured.namespace(kind), fresh.namespace(kind));
        assert_eq!(a.level(), b.level(), "{kind}");
        assert_eq!(a.rock_ridge_level(), b.rock_ridge_level(), "{kind}");
    }
}

#[test]
fn bindings_survive_an_unsupported_namespace() {
    init_test_tracing();
    let config = IsoMakerConfig::load_from_str("[udf]\nenabled = true\n").unwrap();
    let mut maker = IsoMaker::with_config(&config).unwrap();

    let stream: Arc<dyn ContentStream> = Arc::new(Fixed(2048));
    let err = maker
        .add_file_with_stream("/boot/loader.bin", stream)
        .unwrap_err();
    assert_eq!(err, IsoMakerError::NotSupported(NamespaceKind::Udf));

    let file = maker
        .lookup(NamespaceKind::Iso9660, "/boot/loader.bin")
        .expect("primary binding kept");
    assert_eq!(
        maker.lookup(NamespaceKind::Joliet, "/boot/loader.bin"),
        Some(file)
    );
    let object = maker.object(file).unwrap();
    assert_eq!(object.name_in(NamespaceKind::Udf), None);
    assert_eq!(object.source().and_then(|s| s.known_size()), Some(2048));
}

#[test]
fn selecting_only_unsupported_namespaces_fails_cleanly() {
    let config = IsoMakerConfig::load_from_str("[hfs]\nenabled = true\n").unwrap();
    let mut maker = IsoMaker::with_config(&config).unwrap();
    let dir = maker.add_unnamed_dir().unwrap();

    let err = maker.obj_set_path(dir, NamespaceSet::HFS, "/x").unwrap_err();
    assert_eq!(err, IsoMakerError::NotSupported(NamespaceKind::Hfs));
    assert!(!maker.object(dir).unwrap().is_named());
}

#[test]
fn disabled_namespaces_in_the_selection_are_ignored() {
    let mut maker = IsoMaker::new();
    let dir = maker.add_unnamed_dir().unwrap();
    maker
        .obj_set_path(dir, NamespaceSet::ISO9660 | NamespaceSet::UDF, "/x")
        .unwrap();
    assert!(maker
        .object(dir)
        .unwrap()
        .name_in(NamespaceKind::Iso9660)
        .is_some());
}
