//! Test fixtures shared by the workspace crates.

use std::path::PathBuf;
use test_context::TestContext;
use uuid::Uuid;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Routes `log` output through the test harness.
pub struct UsingLogger;

impl TestContext for UsingLogger {
    fn setup() -> UsingLogger {
        init_logger();
        UsingLogger
    }
}

/// Scratch data directory, removed again after the test. Nothing is created
/// up front, so code under test sees a fresh install.
pub struct UsingDataDir {
    pub dir: PathBuf,
}

impl TestContext for UsingDataDir {
    fn setup() -> UsingDataDir {
        init_logger();
        let dir = std::env::temp_dir().join(format!("reflex-test-{}", Uuid::new_v4()));
        UsingDataDir { dir }
    }

    fn teardown(self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}
