use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Throwaway Git repository for tests, with pinned author identities and
/// commit dates so history assertions are deterministic.
pub struct ScratchRepo {
    dir: TempDir,
}

impl ScratchRepo {
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("create scratch dir");
        let repo = Self { dir };
        repo.git(&["init", "-q", "-b", "main"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, contents).expect("write scratch file");
    }

    /// Stages everything and commits as `author` at `date`
    /// (e.g. "2021-01-01T12:00:00 +0000").
    pub fn commit(&self, author: &str, date: &str, message: &str) {
        self.git(&["add", "-A"]);

        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
        let status = Command::new("git")
            .current_dir(self.dir.path())
            .env("GIT_AUTHOR_NAME", author)
            .env("GIT_AUTHOR_EMAIL", &email)
            .env("GIT_COMMITTER_NAME", author)
            .env("GIT_COMMITTER_EMAIL", &email)
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_DATE", date)
            .args(["commit", "-q", "-m", message])
            .status()
            .expect("run git commit");
        assert!(status.success(), "git commit failed");
    }

    fn git(&self, args: &[&str]) {
        let status = Command::new("git")
            .current_dir(self.dir.path())
            .args(args)
            .status()
            .expect("run git");
        assert!(status.success(), "git {args:?} failed");
    }
}
