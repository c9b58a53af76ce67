//! Package-manager backends. Each backend maps the four reconciler
//! operations onto one concrete external command set; exactly one
//! lockfile convention is authoritative at a time.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::options::Options;
use crate::runner;

/// Every lockfile any supported manager may leave behind.
pub const LOCKFILES: [&str; 4] = [
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "bun.lockb",
];

/// The backend protocol consumed by the reconciler. Implementations run
/// one external command per operation, inheriting stdio.
pub trait PackageManager {
    fn name(&self) -> &'static str;

    /// The lockfile this manager owns.
    fn lockfile(&self) -> &'static str;

    fn install(&self, appdir: &Path, packages: &[String]) -> Result<()>;

    fn install_dev(&self, appdir: &Path, packages: &[String]) -> Result<()>;

    fn remove(&self, appdir: &Path, packages: &[String]) -> Result<()>;

    /// Run a bare install when this manager's lockfile is absent.
    fn ensure_lockfile_installed(&self, appdir: &Path) -> Result<()> {
        if !appdir.join(self.lockfile()).exists() {
            self.bare_install(appdir)?;
        }
        Ok(())
    }

    fn bare_install(&self, appdir: &Path) -> Result<()>;
}

/// Select the backend the configuration names (npm when none is named).
pub fn select(opts: &Options) -> Box<dyn PackageManager> {
    if opts.bun {
        Box::new(Bun)
    } else if opts.pnpm {
        Box::new(Pnpm)
    } else if opts.yarn {
        Box::new(Yarn)
    } else {
        Box::new(Npm)
    }
}

/// Lockfiles belonging to managers other than the selected one.
pub fn stale_lockfiles(selected: &dyn PackageManager) -> Vec<PathBuf> {
    LOCKFILES
        .iter()
        .filter(|name| **name != selected.lockfile())
        .map(PathBuf::from)
        .collect()
}

fn run(appdir: &Path, cmd: &str, base: &[&str], packages: &[String]) -> Result<()> {
    let mut args: Vec<&str> = base.to_vec();
    args.extend(packages.iter().map(String::as_str));
    runner::run_in(appdir, cmd, &args)
}

pub struct Npm;

impl PackageManager for Npm {
    fn name(&self) -> &'static str {
        "npm"
    }

    fn lockfile(&self) -> &'static str {
        "package-lock.json"
    }

    fn install(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "npm", &["install"], packages)
    }

    fn install_dev(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "npm", &["install", "--save-dev"], packages)
    }

    fn remove(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "npm", &["uninstall"], packages)
    }

    fn bare_install(&self, appdir: &Path) -> Result<()> {
        runner::run_in(appdir, "npm", &["install"])
    }
}

pub struct Pnpm;

impl PackageManager for Pnpm {
    fn name(&self) -> &'static str {
        "pnpm"
    }

    fn lockfile(&self) -> &'static str {
        "pnpm-lock.yaml"
    }

    fn install(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "pnpm", &["add"], packages)
    }

    fn install_dev(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "pnpm", &["add", "-D"], packages)
    }

    fn remove(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "pnpm", &["remove"], packages)
    }

    fn bare_install(&self, appdir: &Path) -> Result<()> {
        runner::run_in(appdir, "pnpm", &["install"])
    }
}

pub struct Yarn;

impl PackageManager for Yarn {
    fn name(&self) -> &'static str {
        "yarn"
    }

    fn lockfile(&self) -> &'static str {
        "yarn.lock"
    }

    fn install(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "yarn", &["add"], packages)
    }

    fn install_dev(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        let mut args: Vec<&str> = vec!["add"];
        args.extend(packages.iter().map(String::as_str));
        args.push("--dev");
        runner::run_in(appdir, "yarn", &args)
    }

    fn remove(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "yarn", &["remove"], packages)
    }

    fn bare_install(&self, appdir: &Path) -> Result<()> {
        runner::run_in(appdir, "yarn", &["install"])
    }
}

pub struct Bun;

impl PackageManager for Bun {
    fn name(&self) -> &'static str {
        "bun"
    }

    fn lockfile(&self) -> &'static str {
        "bun.lockb"
    }

    fn install(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "bun", &["add"], packages)
    }

    fn install_dev(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "bun", &["add", "-d"], packages)
    }

    fn remove(&self, appdir: &Path, packages: &[String]) -> Result<()> {
        run(appdir, "bun", &["remove"], packages)
    }

    fn bare_install(&self, appdir: &Path) -> Result<()> {
        runner::run_in(appdir, "bun", &["install"])
    }
}
