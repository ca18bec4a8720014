use isomaker::{
    FileSource, IsoMaker, IsoMakerError, NamespaceKind, NamespaceSet, NamespaceStats, ObjectKind,
};

const ISO: NamespaceKind = NamespaceKind::Iso9660;
const JOLIET: NamespaceKind = NamespaceKind::Joliet;

#[test]
fn adding_the_same_directory_twice_fails() {
    let mut maker = IsoMaker::new();
    maker.add_dir("/music").expect("first add");

    let err = maker.add_dir("/music").expect_err("second add");
    assert!(
        matches!(err, IsoMakerError::AlreadyExists { ref name, .. } if name == "music"),
        "{err:?}"
    );
}

#[test]
fn rebinding_fails_and_keeps_the_first_binding() {
    let mut maker = IsoMaker::new();
    let dir = maker.add_unnamed_dir().unwrap();
    maker
        .obj_set_path(dir, NamespaceSet::ISO9660, "/first")
        .unwrap();

    let err = maker
        .obj_set_path(dir, NamespaceSet::ISO9660, "/second")
        .unwrap_err();
    assert!(matches!(err, IsoMakerError::WrongOrder(_)), "{err:?}");

    assert_eq!(maker.node_path(ISO, dir).as_deref(), Some("/FIRST"));
    assert_eq!(maker.lookup(ISO, "/first"), Some(dir));
    assert_eq!(maker.lookup(ISO, "/second"), None);
}

#[test]
fn configuration_freezes_once_content_exists() {
    let mut maker = IsoMaker::new();
    maker.add_dir("/boot").unwrap();

    for result in [
        maker.set_iso9660_level(2),
        maker.set_joliet_level(1),
        maker.set_rock_ridge_level(2),
        maker.set_joliet_rock_ridge_level(1),
    ] {
        assert!(matches!(result, Err(IsoMakerError::WrongOrder(_))), "{result:?}");
    }
    assert_eq!(maker.namespace(ISO).level(), 3);
}

#[test]
fn lookup_returns_the_node_just_created() {
    let mut maker = IsoMaker::new();
    let file = maker
        .add_file_with_host_path("/docs/Release Notes.txt", "/tmp/notes.txt")
        .unwrap();

    let node = maker
        .lookup_node(ISO, "/docs/Release Notes.txt")
        .expect("bound node");
    assert_eq!(maker.object(file).unwrap().name_in(ISO), Some(node));

    let name_node = maker.namespace(ISO).get(node).unwrap();
    assert_eq!(name_node.specified_name(), "Release Notes.txt");
    assert_eq!(name_node.name(), "RELEASENOTES.TXT");
    assert_eq!(name_node.depth(), 2);
    assert!(!name_node.is_dir());
}

#[test]
fn dot_segments_never_create_nodes() {
    let mut maker = IsoMaker::new();
    maker.set_joliet_level(0).unwrap();
    let c = maker.add_unnamed_dir().unwrap();
    maker.obj_set_path(c, NamespaceSet::ALL, "/a/./b/../c").unwrap();

    assert_eq!(maker.lookup(ISO, "/a/c"), Some(c));
    assert_eq!(maker.lookup(ISO, "/a/b"), None);
    assert_eq!(maker.lookup(ISO, "/b"), None);
    // `c`, the root and `a`.
    assert_eq!(maker.object_count(), 3);
    assert_eq!(
        maker.namespace(ISO).stats(),
        NamespaceStats {
            names: 3,
            directories: 3
        }
    );
}

#[test]
fn parent_segments_are_clamped_at_the_root() {
    let mut maker = IsoMaker::new();
    let dir = maker.add_dir("/../../../etc").unwrap();
    assert_eq!(maker.lookup(ISO, "/etc"), Some(dir));
    assert_eq!(maker.node_path(ISO, dir).as_deref(), Some("/ETC"));
}

#[test]
fn names_that_normalize_alike_get_numbered() {
    let mut maker = IsoMaker::new();
    let a = maker.add_dir("/re-port").unwrap();
    let b = maker.add_dir("/report").unwrap();
    let c = maker.add_dir("/re port").unwrap();

    assert_eq!(maker.node_path(ISO, a).as_deref(), Some("/REPORT"));
    assert_eq!(maker.node_path(ISO, b).as_deref(), Some("/REPORT1"));
    assert_eq!(maker.node_path(ISO, c).as_deref(), Some("/REPORT2"));

    // Joliet keeps the specified spelling.
    assert_eq!(maker.node_path(JOLIET, b).as_deref(), Some("/report"));
}

#[test]
fn identical_names_are_numbered_in_the_primary_namespace() {
    let mut maker = IsoMaker::new();
    maker.set_joliet_level(0).unwrap();
    let first = maker.add_unnamed_dir().unwrap();
    maker
        .obj_set_path(first, NamespaceSet::ISO9660, "/report")
        .unwrap();
    let second = maker.add_unnamed_dir().unwrap();
    maker
        .obj_set_path(second, NamespaceSet::ISO9660, "/report")
        .unwrap();

    assert_eq!(maker.node_path(ISO, first).as_deref(), Some("/REPORT"));
    assert_eq!(maker.node_path(ISO, second).as_deref(), Some("/REPORT1"));
    // Lookup by specified name finds the first entry.
    assert_eq!(maker.lookup(ISO, "/report"), Some(first));
}

#[test]
fn joliet_rejects_an_existing_specified_name() {
    let mut maker = IsoMaker::new();
    let first = maker.add_dir("/Music").unwrap();

    let err = maker.add_dir("/MUSIC").unwrap_err();
    assert_eq!(
        err,
        IsoMakerError::AlreadyExists {
            namespace: JOLIET,
            name: "MUSIC".to_owned(),
        }
    );

    // The primary namespace still took the second directory.
    let second = maker.objects().last().unwrap().index();
    assert_ne!(second, first);
    assert_eq!(maker.node_path(ISO, second).as_deref(), Some("/MUSIC1"));
    assert_eq!(maker.node_path(JOLIET, second), None);
}

#[test]
fn level_one_produces_eight_dot_three_names() {
    let mut maker = IsoMaker::new();
    maker.set_iso9660_level(1).unwrap();
    let file = maker
        .add_file_with_host_path("/Programs/installer-setup.exe", "/tmp/setup.exe")
        .unwrap();

    assert_eq!(
        maker.node_path(ISO, file).as_deref(),
        Some("/PROGRAMS/INSTALLE.EXE")
    );
}

#[test]
fn descending_into_a_file_fails() {
    let mut maker = IsoMaker::new();
    maker
        .add_file_with_host_path("/readme", "/tmp/readme")
        .unwrap();

    let expected = IsoMakerError::NotADirectory {
        component: "readme".to_owned(),
    };
    assert_eq!(maker.add_dir("/readme/sub").unwrap_err(), expected);
    // A component cancelled by `..` is still checked against the tree.
    assert_eq!(maker.add_dir("/readme/../x").unwrap_err(), expected);
    assert_eq!(maker.lookup(ISO, "/x"), None);
}

#[test]
fn cancelled_components_that_exist_are_walked_through() {
    let mut maker = IsoMaker::new();
    maker.add_dir("/a/b").unwrap();
    maker
        .add_file_with_host_path("/a/b/f", "/tmp/f")
        .unwrap();
    let before = maker.object_count();

    let x = maker.add_dir("/a/b/../x").unwrap();
    assert_eq!(maker.lookup(ISO, "/a/x"), Some(x));
    assert_eq!(maker.lookup(ISO, "/a/b/../x"), Some(x));
    assert_eq!(maker.object_count(), before + 1);

    let err = maker.add_dir("/a/b/f/../y").unwrap_err();
    assert!(matches!(err, IsoMakerError::NotADirectory { .. }), "{err:?}");
    assert_eq!(maker.lookup(ISO, "/a/b/f/../y"), None);

    // Nothing below a missing cancelled component is consulted or created.
    let z = maker.add_dir("/a/nope/deeper/../../z").unwrap();
    assert_eq!(maker.lookup(ISO, "/a/z"), Some(z));
    assert_eq!(maker.lookup(ISO, "/a/nope"), None);
}

#[test]
fn malformed_paths_are_rejected() {
    let mut maker = IsoMaker::new();
    let dir = maker.add_unnamed_dir().unwrap();
    for path in ["", "relative/path", "/trailing/", "/a/..", "/."] {
        let err = maker
            .obj_set_path(dir, NamespaceSet::ISO9660, path)
            .unwrap_err();
        assert!(
            matches!(err, IsoMakerError::InvalidName { .. }),
            "{path:?}: {err:?}"
        );
    }
    assert_eq!(maker.namespace(ISO).root(), None);
}

#[test]
fn a_directory_can_be_bound_as_the_root() {
    let mut maker = IsoMaker::new();
    let root = maker.add_unnamed_dir().unwrap();
    maker.obj_set_path(root, NamespaceSet::ALL, "/").unwrap();

    let etc = maker.add_dir("/etc").unwrap();
    let iso = maker.namespace(ISO);
    let root_node = iso.root().unwrap();
    let root_name = iso.get(root_node).unwrap();
    assert_eq!(root_name.object(), root);
    assert_eq!(root_name.parent(), None);
    assert_eq!(maker.node_path(ISO, root).as_deref(), Some("/"));
    assert_eq!(maker.lookup(ISO, "/"), Some(root));
    assert_eq!(maker.lookup(ISO, "/etc"), Some(etc));

    let other = maker.add_unnamed_dir().unwrap();
    let err = maker
        .obj_set_path(other, NamespaceSet::ISO9660, "/")
        .unwrap_err();
    assert!(matches!(err, IsoMakerError::AlreadyExists { .. }), "{err:?}");
}

#[test]
fn a_file_cannot_be_the_root() {
    let mut maker = IsoMaker::new();
    let file = maker
        .add_unnamed_file(FileSource::host_path("/tmp/x"))
        .unwrap();
    let err = maker
        .obj_set_path(file, NamespaceSet::ISO9660, "/")
        .unwrap_err();
    assert!(matches!(err, IsoMakerError::NotADirectory { .. }), "{err:?}");
}

#[test]
fn the_first_unnamed_directory_becomes_the_root() {
    let mut maker = IsoMaker::new();
    let first = maker.add_unnamed_dir().unwrap();
    let file = maker
        .add_file_with_host_path("/hello.txt", "/tmp/hello.txt")
        .unwrap();

    assert_eq!(maker.lookup(ISO, "/"), Some(first));
    assert_eq!(maker.lookup(JOLIET, "/"), Some(first));
    assert_eq!(maker.object_count(), 2);
    assert_eq!(maker.object(file).unwrap().kind(), ObjectKind::File);
}

#[test]
fn disabled_namespaces_are_skipped() {
    let mut maker = IsoMaker::new();
    maker.set_joliet_level(0).unwrap();
    let dir = maker.add_dir("/only-primary").unwrap();

    assert!(maker.object(dir).unwrap().name_in(ISO).is_some());
    assert_eq!(maker.object(dir).unwrap().name_in(JOLIET), None);
    assert_eq!(maker.namespace(JOLIET).root(), None);
}

#[test]
fn stats_track_names_and_directories() {
    let mut maker = IsoMaker::new();
    maker.add_dir("/a/b").unwrap();
    maker.add_file_with_host_path("/a/b/f", "/tmp/f").unwrap();

    let expected = NamespaceStats {
        names: 4,
        directories: 3,
    };
    assert_eq!(maker.namespace(ISO).stats(), expected);
    assert_eq!(maker.namespace(JOLIET).stats(), expected);
}

#[test]
fn post_order_lists_children_before_parents() {
    let mut maker = IsoMaker::new();
    let b = maker.add_dir("/a/b").unwrap();
    let f = maker.add_file_with_host_path("/c", "/tmp/c").unwrap();
    let a = maker.lookup(ISO, "/a").unwrap();
    let root = maker.lookup(ISO, "/").unwrap();

    let order: Vec<_> = maker
        .post_order(ISO)
        .map(|node| maker.namespace(ISO).get(node).unwrap().object())
        .collect();
    assert_eq!(order, vec![b, a, f, root]);
}

#[test]
fn shared_handle_allows_multiple_owners() {
    let shared = IsoMaker::new().into_shared();
    let other = shared.clone();

    shared.borrow_mut().add_dir("/x").unwrap();
    assert!(other.borrow().lookup(ISO, "/x").is_some());
}
