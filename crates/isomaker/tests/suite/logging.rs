use std::io;
use std::sync::{Arc, Mutex};

use isomaker::{IsoMaker, IsoMakerConfig, NamespaceKind, NamespaceSet};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log buffer mutex poisoned");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = self.0.lock().expect("log buffer mutex poisoned");
        out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter(self.0.clone())
    }
}

/// Runs `f` with warnings and errors written to a buffer, returning what was logged.
fn capture_warnings(f: impl FnOnce()) -> String {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::WARN)
        .with_writer(logs.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    logs.contents()
}

fn maker_with_udf() -> IsoMaker {
    let config = IsoMakerConfig::load_from_str("[udf]\nenabled = true\n").unwrap();
    IsoMaker::with_config(&config).unwrap()
}

#[test]
fn partial_commit_warns_with_the_failed_namespace() {
    let mut maker = maker_with_udf();

    let logs = capture_warnings(|| {
        let err = maker.add_dir("/boot").unwrap_err();
        assert_eq!(
            err,
            isomaker::IsoMakerError::NotSupported(NamespaceKind::Udf)
        );
    });

    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("object bound in some namespaces only"), "{logs}");
    assert!(logs.contains("failed=[Udf]"), "{logs}");
    assert!(logs.contains("path=\"/boot\""), "{logs}");
    assert!(maker.lookup(NamespaceKind::Iso9660, "/boot").is_some());
}

#[test]
fn total_failure_does_not_warn() {
    let mut maker = maker_with_udf();
    let dir = maker.add_unnamed_dir().unwrap();

    let logs = capture_warnings(|| {
        maker
            .obj_set_path(dir, NamespaceSet::UDF, "/x")
            .unwrap_err();
    });

    assert!(
        !logs.contains("object bound in some namespaces only"),
        "{logs}"
    );
}

#[test]
fn full_success_does_not_warn() {
    let mut maker = IsoMaker::new();

    let logs = capture_warnings(|| {
        maker.add_dir("/a/b/../c").unwrap();
    });

    assert!(logs.is_empty(), "{logs}");
}
