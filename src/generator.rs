//! Run orchestration: lockfile cleanup, dependency reconciliation,
//! manifest update, then artifact synchronization in a fixed,
//! configuration-independent order so repeated runs produce identical
//! prompt ordering.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::css;
use crate::manifest::Manifest;
use crate::options::Options;
use crate::pm;
use crate::reconcile;
use crate::runner;
use crate::session::{Prompter, Session};
use crate::sync::{Outcome, SyncEngine};
use crate::templates;
use crate::ui;

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Done,
    /// User chose quit at a prompt; remaining steps were not performed.
    Quit,
}

/// A sync step that may short-circuit the whole run on `q`.
macro_rules! step {
    ($outcome:expr) => {
        if $outcome? == Outcome::Quit {
            return Ok(Completion::Quit);
        }
    };
}

pub struct Generator<'a> {
    opts: &'a Options,
    appdir: PathBuf,
    engine: SyncEngine<'a>,
}

/// Scaffold the demo app into `appdir` according to the resolved options.
pub fn run(
    opts: &Options,
    appdir: &Path,
    session: &mut Session,
    prompter: &mut dyn Prompter,
) -> Result<Completion> {
    let engine = SyncEngine::new(appdir, session, prompter);
    Generator {
        opts,
        appdir: appdir.to_path_buf(),
        engine,
    }
    .run()
}

impl Generator<'_> {
    fn run(&mut self) -> Result<Completion> {
        let manifest = Manifest::load(&self.appdir)?;
        let backend = pm::select(self.opts);

        // exactly one lockfile convention stays authoritative
        for lockfile in pm::stale_lockfiles(backend.as_ref()) {
            step!(self.engine.remove(&lockfile.to_string_lossy()));
        }

        // minimal install/uninstall operations against the backend
        let drift = reconcile::drift(&manifest, self.opts);
        log::debug!("dependency drift: {drift:?}");
        reconcile::apply(&self.appdir, &drift, backend.as_ref())?;

        // installers rewrite the manifest; reload before comparing scripts
        let mut manifest = Manifest::reload_or_create(&self.appdir)?;
        backend.ensure_lockfile_installed(&self.appdir)?;

        if reconcile::update_scripts(&mut manifest, self.opts) {
            ui::update("package.json");
            manifest.save(&self.appdir)?;
        }

        // typed-language support files
        if self.opts.typescript {
            step!(self.write("tsconfig.json", templates::render_tsconfig(self.opts).as_bytes()));
            step!(self.engine.remove("server.js"));
            step!(self.write("src/server.ts", templates::render_server(self.opts).as_bytes()));
        } else {
            step!(self.engine.remove("tsconfig.json"));
            step!(self.write("server.js", templates::render_server(self.opts).as_bytes()));
            step!(self.engine.remove("src/server.ts"));
        }

        // ORM schema and migration files
        if self.opts.drizzle {
            step!(self.write(
                "src/db/schema.ts",
                templates::render_schema_drizzle(self.opts).as_bytes()
            ));
        } else {
            step!(self.engine.remove("src/db/schema.ts"));
        }

        if self.opts.prisma {
            step!(self.write(
                "prisma/schema.prisma",
                templates::render_schema_prisma(self.opts).as_bytes()
            ));
            self.generate_prisma_migrations()?;
        } else {
            step!(self.engine.remove("prisma/schema.prisma"));
        }

        // client-side script
        if self.opts.websocket && !self.opts.htmx {
            step!(self.write("public/client.js", templates::CLIENT_JS.as_bytes()));
        } else {
            step!(self.engine.remove("public/client.js"));
        }

        // static assets
        step!(self.write("public/favicon.ico", templates::FAVICON));
        step!(self.write("public/brandmark-light.svg", templates::BRANDMARK));

        // CSS and markup views
        if self.opts.tailwindcss {
            step!(self.write(
                "tailwind.config.js",
                templates::render_tailwind_config(self.opts).as_bytes()
            ));
            step!(self.write("src/input.css", templates::INPUT_CSS.as_bytes()));
            step!(self.sync_views(&templates::render_index_html(self.opts)));
        } else {
            let derived = css::derive(&templates::render_index_html(self.opts))?;
            step!(self.sync_views(&derived.markup));

            step!(self.engine.remove("tailwind.config.js"));
            step!(self.engine.remove("src/input.css"));
            step!(self.write("public/index.css", derived.stylesheet.as_bytes()));
        }

        if !self.appdir.join(".git").exists() {
            runner::run_in(&self.appdir, "git", &["init", "-b", "main"])?;
        }

        Ok(Completion::Done)
    }

    fn write(&mut self, name: &str, proposed: &[u8]) -> Result<Outcome> {
        self.engine.write(name, proposed)
    }

    /// Write the markup view for the selected template extension and
    /// remove the views a different configuration may have produced.
    fn sync_views(&mut self, markup: &str) -> Result<Outcome> {
        let selected = crate::deps::template_extension(self.opts);

        for extension in ["tmpl", "ejs", "mustache"] {
            let name = format!("views/index.{extension}");
            let outcome = if extension == selected {
                self.engine.write(&name, markup.as_bytes())?
            } else {
                self.engine.remove(&name)?
            };
            if outcome == Outcome::Quit {
                return Ok(Outcome::Quit);
            }
        }

        Ok(Outcome::Identical)
    }

    /// Seed the initial prisma migration when none exists yet. Under
    /// sqlite the database URL points at a local file.
    fn generate_prisma_migrations(&self) -> Result<()> {
        if self.appdir.join("prisma/migrations").exists() {
            return Ok(());
        }

        let args = ["prisma", "migrate", "dev", "--name", "init"];
        if self.opts.sqlite && std::env::var_os("DATABASE_URL").is_none() {
            let url = format!(
                "file:{}",
                self.appdir.join("production.sqlite3").display()
            );
            runner::run_in_with_env(&self.appdir, "npx", &args, &[("DATABASE_URL", url)])
        } else {
            runner::run_in(&self.appdir, "npx", &args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ScriptedPrompter;
    use std::fs;
    use tempfile::TempDir;

    /// Prompter that fails the test when consulted.
    struct NoPrompts;

    impl Prompter for NoPrompts {
        fn ask(&mut self, prompt: &str) -> Result<String> {
            panic!("unexpected prompt: {prompt}");
        }
    }

    fn sync_artifacts(
        opts: &Options,
        appdir: &Path,
        session: &mut Session,
        prompter: &mut dyn Prompter,
    ) -> Result<Completion> {
        // everything after the package-manager boundary: artifact sync only
        let engine = SyncEngine::new(appdir, session, prompter);
        let mut generator = Generator {
            opts,
            appdir: appdir.to_path_buf(),
            engine,
        };

        if opts.typescript {
            step!(generator.write(
                "tsconfig.json",
                templates::render_tsconfig(opts).as_bytes()
            ));
            step!(generator.engine.remove("server.js"));
            step!(generator.write(
                "src/server.ts",
                templates::render_server(opts).as_bytes()
            ));
        } else {
            step!(generator.engine.remove("tsconfig.json"));
            step!(generator.write("server.js", templates::render_server(opts).as_bytes()));
            step!(generator.engine.remove("src/server.ts"));
        }

        step!(generator.write("public/favicon.ico", templates::FAVICON));

        if opts.tailwindcss {
            step!(generator.sync_views(&templates::render_index_html(opts)));
        } else {
            let derived = css::derive(&templates::render_index_html(opts))?;
            step!(generator.sync_views(&derived.markup));
            step!(generator.write("public/index.css", derived.stylesheet.as_bytes()));
        }

        Ok(Completion::Done)
    }

    #[test]
    fn fresh_directory_scaffolds_cleanly() {
        let tmp = TempDir::new().unwrap();
        let opts = Options::default();
        let mut session = Session::new(false);
        let mut prompter = NoPrompts;

        let completion =
            sync_artifacts(&opts, tmp.path(), &mut session, &mut prompter).unwrap();
        assert_eq!(completion, Completion::Done);

        assert!(tmp.path().join("server.js").exists());
        assert!(tmp.path().join("public/favicon.ico").exists());
        assert!(tmp.path().join("views/index.tmpl").exists());
        assert!(tmp.path().join("public/index.css").exists());
        assert!(!tmp.path().join("tsconfig.json").exists());
    }

    #[test]
    fn second_run_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let opts = Options::default();

        let mut session = Session::new(false);
        let mut prompter = NoPrompts;
        sync_artifacts(&opts, tmp.path(), &mut session, &mut prompter).unwrap();

        // second run over its own output: every artifact identical, no
        // prompts, nothing rewritten
        let before = fs::read(tmp.path().join("server.js")).unwrap();
        let mut session = Session::new(false);
        let mut prompter = NoPrompts;
        let completion =
            sync_artifacts(&opts, tmp.path(), &mut session, &mut prompter).unwrap();
        assert_eq!(completion, Completion::Done);
        assert_eq!(fs::read(tmp.path().join("server.js")).unwrap(), before);
    }

    #[test]
    fn switching_engines_removes_the_other_views() {
        let tmp = TempDir::new().unwrap();

        let mut session = Session::new(false);
        let mut prompter = NoPrompts;
        sync_artifacts(&Options::default(), tmp.path(), &mut session, &mut prompter).unwrap();
        assert!(tmp.path().join("views/index.tmpl").exists());

        // now scaffold with ejs, approving the removal of the tmpl view
        // and the conflicting shared artifacts
        let opts = {
            let mut o = Options::default();
            o.ejs = true;
            o
        };
        let mut session = Session::new(true); // force
        let mut prompter = NoPrompts;
        sync_artifacts(&opts, tmp.path(), &mut session, &mut prompter).unwrap();

        assert!(tmp.path().join("views/index.ejs").exists());
        assert!(!tmp.path().join("views/index.tmpl").exists());
    }

    #[test]
    fn typescript_run_replaces_plain_entry_point() {
        let tmp = TempDir::new().unwrap();

        let mut session = Session::new(false);
        let mut prompter = NoPrompts;
        sync_artifacts(&Options::default(), tmp.path(), &mut session, &mut prompter).unwrap();
        assert!(tmp.path().join("server.js").exists());

        let opts = {
            let mut o = Options::default();
            o.typescript = true;
            o
        };
        let mut session = Session::new(true);
        let mut prompter = NoPrompts;
        sync_artifacts(&opts, tmp.path(), &mut session, &mut prompter).unwrap();

        assert!(tmp.path().join("src/server.ts").exists());
        assert!(tmp.path().join("tsconfig.json").exists());
        assert!(!tmp.path().join("server.js").exists());
    }

    #[test]
    fn quit_stops_before_later_artifacts() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("server.js"), "hand edited").unwrap();

        let mut session = Session::new(false);
        let mut prompter = ScriptedPrompter::new(&["q"]);
        let completion =
            sync_artifacts(&Options::default(), tmp.path(), &mut session, &mut prompter)
                .unwrap();

        assert_eq!(completion, Completion::Quit);
        // the conflicting file was left alone and nothing later was written
        assert_eq!(
            fs::read_to_string(tmp.path().join("server.js")).unwrap(),
            "hand edited"
        );
        assert!(!tmp.path().join("public/favicon.ico").exists());
    }

    #[test]
    fn derived_stylesheet_written_without_css_framework() {
        let tmp = TempDir::new().unwrap();
        let mut session = Session::new(false);
        let mut prompter = NoPrompts;
        sync_artifacts(&Options::default(), tmp.path(), &mut session, &mut prompter).unwrap();

        let css = fs::read_to_string(tmp.path().join("public/index.css")).unwrap();
        assert!(css.starts_with("@tailwind base;"));
        assert!(css.contains(".container {@apply"));

        let view = fs::read_to_string(tmp.path().join("views/index.tmpl")).unwrap();
        assert!(view.contains(r#"class="container""#));
        assert!(view.contains("@@COUNT@@"));
    }
}
