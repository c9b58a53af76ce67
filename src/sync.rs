//! File synchronization - per-artifact state machine with the sticky
//! interactive conflict/removal resolution protocol.
//!
//! Each target path is entered once per run:
//! `INSPECT -> {IDENTICAL, CREATE, CONFLICT}`, conflicts resolved through
//! the shared session state. Artifacts are processed in a fixed,
//! configuration-independent order by the orchestrator, so repeated runs
//! produce identical prompt ordering.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::session::{Answer, Prompter, Session};
use crate::ui;

/// Transition taken for one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Destination was missing; written.
    Created,
    /// Destination already matched byte-for-byte; untouched.
    Identical,
    /// Conflict resolved by overwriting.
    Overwritten,
    /// Conflict or removal declined for this artifact only.
    Skipped,
    /// Stale artifact deleted.
    Removed,
    /// Stale artifact was already absent.
    Absent,
    /// User chose to quit: no further writes may happen.
    Quit,
}

const CONFLICT_HELP: &str = "        Y - yes, overwrite
        n - no, do not overwrite
        a - all, overwrite this and all others
        q - quit, abort
        d - diff, show the differences between the old and the new
        h - help, show this help";

const REMOVAL_HELP: &str = "        Y - yes, remove
        n - no, do not remove
        a - all, remove this and all others
        q - quit, abort
        h - help, show this help";

pub struct SyncEngine<'a> {
    appdir: PathBuf,
    session: &'a mut Session,
    prompter: &'a mut dyn Prompter,
}

impl<'a> SyncEngine<'a> {
    pub fn new(appdir: &Path, session: &'a mut Session, prompter: &'a mut dyn Prompter) -> Self {
        Self {
            appdir: appdir.to_path_buf(),
            session,
            prompter,
        }
    }

    /// Synchronize one artifact: write `proposed` to `name` (relative to
    /// the target directory), prompting when there is a conflict.
    pub fn write(&mut self, name: &str, proposed: &[u8]) -> Result<Outcome> {
        self.mkdirs(name)?;

        let dest = self.appdir.join(name);

        let current = match fs::read(&dest) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e).with_context(|| format!("Could not read {}", dest.display()));
            }
        };

        let Some(current) = current else {
            fs::write(&dest, proposed)
                .with_context(|| format!("Could not write {}", dest.display()))?;
            ui::create(name);
            return Ok(Outcome::Created);
        };

        if current == proposed {
            ui::identical(name);
            return Ok(Outcome::Identical);
        }

        if self.session.all() {
            fs::write(&dest, proposed)
                .with_context(|| format!("Could not write {}", dest.display()))?;
            ui::force(name);
            return Ok(Outcome::Overwritten);
        }

        ui::conflict(name);
        loop {
            let reply = self
                .prompter
                .ask(&format!(
                    "Overwrite {}? (enter \"h\" for help) [Ynaqdh]",
                    dest.display()
                ))?
                .to_lowercase();

            match reply.as_str() {
                "" | "y" | "a" => {
                    self.session.record(if reply == "a" {
                        Answer::All
                    } else {
                        Answer::Yes
                    });
                    fs::write(&dest, proposed)
                        .with_context(|| format!("Could not write {}", dest.display()))?;
                    ui::force(name);
                    return Ok(Outcome::Overwritten);
                }
                "n" => {
                    self.session.record(Answer::No);
                    ui::skip(name);
                    return Ok(Outcome::Skipped);
                }
                "q" => {
                    self.session.record(Answer::Quit);
                    return Ok(Outcome::Quit);
                }
                "d" => {
                    // redisplay only; session state untouched
                    show_diff(name, &current, proposed);
                }
                _ => {
                    println!("{CONFLICT_HELP}");
                }
            }
        }
    }

    /// Remove an artifact the active configuration no longer needs,
    /// prompting before doing so. Already absent is success.
    pub fn remove(&mut self, name: &str) -> Result<Outcome> {
        let dest = self.appdir.join(name);

        if !dest.exists() {
            return Ok(Outcome::Absent);
        }

        if self.session.all() {
            return self.unlink(name, &dest);
        }

        ui::exist(name);
        loop {
            let reply = self
                .prompter
                .ask(&format!(
                    "Remove {}? (enter \"h\" for help) [Ynaqh]",
                    dest.display()
                ))?
                .to_lowercase();

            match reply.as_str() {
                "" | "y" | "a" => {
                    self.session.record(if reply == "a" {
                        Answer::All
                    } else {
                        Answer::Yes
                    });
                    return self.unlink(name, &dest);
                }
                "n" => {
                    self.session.record(Answer::No);
                    ui::skip(name);
                    return Ok(Outcome::Skipped);
                }
                "q" => {
                    self.session.record(Answer::Quit);
                    return Ok(Outcome::Quit);
                }
                _ => {
                    println!("{REMOVAL_HELP}");
                }
            }
        }
    }

    fn unlink(&self, name: &str, dest: &Path) -> Result<Outcome> {
        match fs::remove_file(dest) {
            Ok(()) => {
                ui::remove(name);
                Ok(Outcome::Removed)
            }
            // lost a race with something else deleting it: still success
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Outcome::Absent),
            Err(e) => Err(e).with_context(|| format!("Could not remove {}", dest.display())),
        }
    }

    /// Create missing ancestor directories, logging each new one once.
    fn mkdirs(&self, name: &str) -> Result<()> {
        let Some(parent) = Path::new(name).parent() else {
            return Ok(());
        };

        let mut partial = PathBuf::new();
        for component in parent.components() {
            partial.push(component);
            let dir = self.appdir.join(&partial);
            if !dir.exists() {
                fs::create_dir(&dir)
                    .with_context(|| format!("Could not create directory {}", dir.display()))?;
                ui::mkdir(&partial.to_string_lossy());
            }
        }
        Ok(())
    }
}

/// Print the proposed content followed by a unified diff against the
/// current file. Binary content is reported, not dumped.
fn show_diff(name: &str, current: &[u8], proposed: &[u8]) {
    let (Ok(current), Ok(proposed)) = (
        std::str::from_utf8(current),
        std::str::from_utf8(proposed),
    ) else {
        println!("        (binary files differ)");
        return;
    };

    println!("{proposed}");
    let diff = similar::TextDiff::from_lines(current, proposed);
    print!(
        "{}",
        diff.unified_diff()
            .context_radius(3)
            .header(&format!("{name} (current)"), &format!("{name} (proposed)"))
    );
    println!();
}
