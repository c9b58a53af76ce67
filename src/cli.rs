use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "demogen")]
#[command(version)]
#[command(about = "Scaffold a runnable realtime demo web app into an existing project", long_about = None)]
pub struct Cli {
    /// Directory to scaffold into (defaults to the current directory)
    pub appdir: Option<PathBuf>,

    /// Force overwrite of existing files (no prompts)
    #[arg(short, long)]
    pub force: bool,

    /// Use bun as the package installer
    #[arg(long)]
    pub bun: bool,

    /// Use pnpm as the package manager
    #[arg(long)]
    pub pnpm: bool,

    /// Use yarn as the package manager
    #[arg(long)]
    pub yarn: bool,

    /// Use imports (es6) instead of require (cjs)
    #[arg(long)]
    pub esm: bool,

    /// Use Embedded JavaScript templating (ejs)
    #[arg(long)]
    pub ejs: bool,

    /// Use mustache templates
    #[arg(long)]
    pub mustache: bool,

    /// Use the express web server
    #[arg(long)]
    pub express: bool,

    /// Use htmx for socket updates
    #[arg(long)]
    pub htmx: bool,

    /// Use mongodb
    #[arg(long, visible_alias = "mongo")]
    pub mongodb: bool,

    /// Use postgresql
    #[arg(long, visible_aliases = ["postgres", "pg"])]
    pub postgresql: bool,

    /// Use the prisma ORM for databases
    #[arg(long)]
    pub prisma: bool,

    /// Use the drizzle ORM for databases
    #[arg(long)]
    pub drizzle: bool,

    /// Use the knex ORM for databases
    #[arg(long)]
    pub knex: bool,

    /// Use redis pub/sub
    #[arg(long)]
    pub redis: bool,

    /// Use sqlite3
    #[arg(long, visible_alias = "sqlite3")]
    pub sqlite: bool,

    /// Use tailwindcss
    #[arg(long, visible_aliases = ["tailwind", "tw"])]
    pub tailwindcss: bool,

    /// Generate typescript
    #[arg(long, visible_alias = "ts")]
    pub typescript: bool,

    /// Use websockets for real-time updates
    #[arg(long, visible_alias = "ws")]
    pub websocket: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
