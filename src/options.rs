//! Option resolution - cross-resolves the raw flag set into a canonical,
//! internally consistent configuration.
//!
//! Rules fire once each, in a fixed order; there is no fixed-point
//! iteration. Pathological flag combinations therefore resolve
//! deterministically, not necessarily optimally.

use std::env;

use crate::cli::Cli;
use crate::runner;

/// The resolved configuration for one run. Built once, immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub force: bool,
    pub bun: bool,
    pub pnpm: bool,
    pub yarn: bool,
    pub esm: bool,
    pub ejs: bool,
    pub mustache: bool,
    pub express: bool,
    pub htmx: bool,
    pub mongodb: bool,
    pub postgresql: bool,
    pub prisma: bool,
    pub drizzle: bool,
    pub knex: bool,
    pub redis: bool,
    pub sqlite: bool,
    pub tailwindcss: bool,
    pub typescript: bool,
    pub websocket: bool,
}

impl Options {
    /// Resolve the raw CLI flags, probing the environment for an
    /// alternate runtime.
    pub fn resolve(cli: &Cli) -> Self {
        Self::resolve_with_probe(cli, bun_runtime_detected())
    }

    /// Resolution with an injected runtime probe result (testable).
    pub fn resolve_with_probe(cli: &Cli, bun_detected: bool) -> Self {
        let mut opts = Self {
            force: cli.force,
            bun: cli.bun,
            pnpm: cli.pnpm,
            yarn: cli.yarn,
            esm: cli.esm,
            ejs: cli.ejs,
            mustache: cli.mustache,
            express: cli.express,
            htmx: cli.htmx,
            mongodb: cli.mongodb,
            postgresql: cli.postgresql,
            prisma: cli.prisma,
            drizzle: cli.drizzle,
            knex: cli.knex,
            redis: cli.redis,
            sqlite: cli.sqlite,
            tailwindcss: cli.tailwindcss,
            typescript: cli.typescript,
            websocket: cli.websocket,
        };

        // pub/sub updates are delivered over websockets
        if opts.redis {
            opts.websocket = true;
        }

        // drizzle schemas are typescript source
        if opts.drizzle {
            opts.typescript = true;
        }

        // an explicit relational database wins over the embedded one
        if opts.postgresql {
            opts.sqlite = false;
        }

        // an ORM without an explicit relational flag defaults to sqlite
        if (opts.prisma || opts.knex) && !opts.postgresql {
            opts.sqlite = true;
        }

        // runtime probe: only when no package manager was named explicitly
        if bun_detected && !opts.bun && !opts.pnpm && !opts.yarn {
            log::debug!("bun runtime detected, selecting bun as package manager");
            opts.bun = true;
        }

        opts
    }

    /// True iff any ORM flag is active.
    pub fn orm(&self) -> bool {
        self.prisma || self.knex || self.drizzle
    }
}

/// Probe the environment for the bun runtime.
fn bun_runtime_detected() -> bool {
    env::var_os("BUN_INSTALL").is_some() || runner::command_exists("bun")
}
