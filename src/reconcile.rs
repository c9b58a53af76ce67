//! Manifest reconciliation - diffs the calculator's desired dependency
//! sets against what the manifest already records and issues minimal
//! install/uninstall operations through the selected backend.

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;

use crate::deps;
use crate::manifest::Manifest;
use crate::options::Options;
use crate::pm::PackageManager;

/// Packages under this namespace belong to host-platform tooling and are
/// never proposed for removal, whatever the desired set says.
const PROTECTED_NAMESPACE: &str = "@flydotio";

/// Minimal operations needed to converge the manifest's dependency maps.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Drift {
    pub install: Vec<String>,
    pub install_dev: Vec<String>,
    pub remove: Vec<String>,
}

impl Drift {
    pub fn is_empty(&self) -> bool {
        self.install.is_empty() && self.install_dev.is_empty() && self.remove.is_empty()
    }
}

/// Compute drift against the *existing* manifest. "Present" is what the
/// manifest recorded when it was read; it is not re-read here.
pub fn drift(manifest: &Manifest, opts: &Options) -> Drift {
    let desired = deps::dependencies(opts);
    let desired_dev = deps::dev_dependencies(opts);

    let present = manifest.dependencies();
    let present_dev = manifest.dev_dependencies();

    let install = desired
        .iter()
        .filter(|pkg| !present.contains(*pkg))
        .cloned()
        .collect();
    let install_dev = desired_dev
        .iter()
        .filter(|pkg| !present_dev.contains(*pkg))
        .cloned()
        .collect();

    let desired_union: BTreeSet<&String> = desired.iter().chain(desired_dev.iter()).collect();
    let remove = present
        .union(&present_dev)
        .filter(|pkg| !pkg.contains(PROTECTED_NAMESPACE))
        .filter(|pkg| !desired_union.contains(pkg))
        .cloned()
        .collect();

    Drift {
        install,
        install_dev,
        remove,
    }
}

/// Converge dependencies through the backend, one invocation per class.
pub fn apply(
    appdir: &Path,
    drift: &Drift,
    backend: &dyn PackageManager,
) -> Result<()> {
    if !drift.install.is_empty() {
        backend.install(appdir, &drift.install)?;
    }
    if !drift.install_dev.is_empty() {
        backend.install_dev(appdir, &drift.install_dev)?;
    }
    if !drift.remove.is_empty() {
        backend.remove(appdir, &drift.remove)?;
    }
    Ok(())
}

/// Align `scripts.build`, `scripts.start` and the module-system marker
/// with the calculator output. Returns whether the manifest needs a
/// rewrite (any tracked field drifted).
pub fn update_scripts(manifest: &mut Manifest, opts: &Options) -> bool {
    let build = deps::build(opts);
    let start = deps::start(opts);

    let mut changed = manifest.set_script("build", build.as_deref());
    changed |= manifest.set_script("start", Some(&start));
    changed |= manifest.set_module_marker(opts.esm);
    changed
}
