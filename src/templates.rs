//! Embedded artifact templates and their rendering. Generator-side
//! rendering is plain `{{name}}` placeholder substitution; the bodies
//! themselves carry no invariants.

use std::fmt::Write as _;

use crate::deps;
use crate::options::Options;

pub const SERVER: &str = include_str!("../templates/server.tmpl");
pub const SERVER_EXPRESS: &str = include_str!("../templates/server-express.tmpl");
pub const INDEX_HTML: &str = include_str!("../templates/index.html");
pub const TSCONFIG: &str = include_str!("../templates/tsconfig.json.tmpl");
pub const SCHEMA_PRISMA: &str = include_str!("../templates/schema.prisma.tmpl");
pub const SCHEMA_DRIZZLE: &str = include_str!("../templates/schema.drizzle.tmpl");
pub const TAILWIND_CONFIG: &str = include_str!("../templates/tailwind.config.js.tmpl");
pub const INPUT_CSS: &str = include_str!("../templates/input.css");
pub const CLIENT_JS: &str = include_str!("../templates/client.js");
pub const FAVICON: &[u8] = include_bytes!("../templates/favicon.ico");
pub const BRANDMARK: &[u8] = include_bytes!("../templates/brandmark-light.svg");

/// Substitute `{{name}}` placeholders. Unknown placeholders are left
/// untouched so template-side tokens (e.g. the view's own `{{ count }}`)
/// pass through.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{{{name}}}}}"), value);
    }
    out
}

/// The import header of the server entry point, one line per binding in
/// ascending binding-name order.
pub fn import_lines(opts: &Options) -> String {
    let mut out = String::new();
    for (binding, module) in deps::imports(opts) {
        if opts.esm {
            let _ = writeln!(out, "import {binding} from '{module}'");
        } else {
            let _ = writeln!(out, "const {binding} = require('{module}')");
        }
    }
    out.trim_end().to_string()
}

/// The server entry point. Every binding `deps::imports` emits for the
/// option set is consumed by the rendered body, and the body only
/// references bindings that were imported.
pub fn render_server(opts: &Options) -> String {
    if opts.express {
        render_express_server(opts)
    } else {
        render_plain_server(opts)
    }
}

fn render_plain_server(opts: &Options) -> String {
    let render_view = if opts.ejs {
        "ejs.render(template, { count })"
    } else if opts.mustache {
        "mustache.render(template, { count })"
    } else {
        "template.replaceAll('@@COUNT@@', String(count))"
    };

    let ws_setup = if opts.websocket {
        "\n// socket server; upgrades on /websocket are routed to it below\nconst wss = new WebSocketServer({ noServer: true })\n"
    } else {
        ""
    };

    let ws_routes = if opts.websocket {
        "\nserver.on('upgrade', (request, socket, head) => {\n  const { pathname } = url.parse(request.url)\n\n  if (pathname === '/websocket') {\n    wss.handleUpgrade(request, socket, head, ws => wss.emit('connection', ws, request))\n  } else {\n    socket.destroy()\n  }\n})\n\nwss.on('connection', ws => {\n  if (count) ws.send(String(count))\n})\n"
    } else {
        ""
    };

    let listen = "server.listen(port, () => {\n  console.log(`Server is listening on port ${port}`)\n})";

    let imports = import_lines(opts);
    let db_setup = db_setup(opts);
    let bump_count = bump_count(opts);
    let ws_broadcast = ws_broadcast(opts, "wss.clients");
    let startup = startup(listen, &async_setup(opts, "wss.clients"));

    render(
        SERVER,
        &[
            ("imports", &imports),
            ("db_setup", &db_setup),
            ("ws_setup", ws_setup),
            ("bump_count", &bump_count),
            ("ws_broadcast", &ws_broadcast),
            ("view_ext", deps::template_extension(opts)),
            ("render_view", render_view),
            ("ws_routes", ws_routes),
            ("startup", &startup),
        ],
    )
}

fn render_express_server(opts: &Options) -> String {
    let view_setup = if opts.ejs {
        "\n// render views with ejs\napp.set('view engine', 'ejs')\napp.set('views', './views')\n"
    } else if opts.mustache {
        "\n// render views with mustache\napp.engine('mustache', mustacheExpress())\napp.set('view engine', 'mustache')\napp.set('views', './views')\n"
    } else {
        ""
    };

    let ws_setup = if opts.websocket {
        "\n// fan realtime updates out to every connected client\nconst websocket = expressWs(app)\napp.ws('/websocket', () => {})\n"
    } else {
        ""
    };

    let respond = if opts.ejs || opts.mustache {
        "  response.render('index', { count })"
    } else {
        "  const template = fs.readFileSync('views/index.tmpl', 'utf-8')\n\n  response.set('Content-Type', 'text/html')\n  response.send(template.replaceAll('@@COUNT@@', String(count)))"
    };

    let listen = "app.listen(port, () => {\n  console.log(`Server is listening on port ${port}`)\n})";

    let clients = "websocket.getWss().clients";
    let imports = import_lines(opts);
    let db_setup = db_setup(opts);
    let bump_count = bump_count(opts);
    let ws_broadcast = ws_broadcast(opts, clients);
    let startup = startup(listen, &async_setup(opts, clients));

    render(
        SERVER_EXPRESS,
        &[
            ("imports", &imports),
            ("view_setup", view_setup),
            ("db_setup", &db_setup),
            ("ws_setup", ws_setup),
            ("bump_count", &bump_count),
            ("ws_broadcast", &ws_broadcast),
            ("respond", respond),
            ("startup", &startup),
        ],
    )
}

/// Module-scope client setup for the selected data layer, plus the
/// redis connections when pub-sub is on.
fn db_setup(opts: &Options) -> String {
    const SQLITE_URL: &str =
        "process.env.DATABASE_URL ||= url.pathToFileURL('production.sqlite3').toString()\n";

    let mut out = String::new();

    if opts.prisma {
        out.push_str("\n// database client; migrations are applied before the server starts\n");
        if opts.sqlite {
            out.push_str(SQLITE_URL);
        }
        out.push_str(
            "execSync('npx prisma migrate deploy', { stdio: 'inherit' })\nconst prisma = new PrismaClient()\n",
        );
    } else if opts.drizzle {
        out.push_str("\n// database client, backed by the schema under src/db\n");
        if opts.sqlite {
            out.push_str(SQLITE_URL);
            out.push_str(
                "const database = new Database(new URL(process.env.DATABASE_URL).pathname.slice(1))\nconst db = drizzle(database, { schema })\nmigrate(db, { migrationsFolder: './migrations' })\n",
            );
        } else {
            out.push_str(
                "const pool = new Pool({ connectionString: process.env.DATABASE_URL })\nconst db = drizzle(pool, { schema })\n",
            );
        }
    } else if opts.knex {
        out.push_str("\n// knex database handle\n");
        if opts.sqlite {
            out.push_str(SQLITE_URL);
            out.push_str(
                "const db = knex({\n  client: 'sqlite3',\n  connection: { filename: new URL(process.env.DATABASE_URL).pathname.slice(1) },\n  useNullAsDefault: true\n})\n",
            );
        } else {
            out.push_str(
                "const db = knex({ client: 'pg', connection: process.env.DATABASE_URL })\n",
            );
        }
    } else if opts.mongodb {
        out.push_str(
            "\n// mongo client\nconst client = new mongodb.MongoClient(process.env.DATABASE_URL || 'mongodb://localhost:27017/app')\n",
        );
    } else if opts.postgresql {
        out.push_str(
            "\n// postgres client\nconst db = new pg.Client({ connectionString: process.env.DATABASE_URL })\n",
        );
    } else if opts.sqlite {
        out.push_str("\n// sqlite database\n");
        out.push_str(SQLITE_URL);
        out.push_str(
            "const db = new sqlite3.Database(new URL(process.env.DATABASE_URL).pathname.slice(1))\ndb.run('CREATE TABLE IF NOT EXISTS \"counters\" ( \"count\" INTEGER )')\n",
        );
    }

    if opts.redis {
        out.push_str(
            "\n// redis connections: one publishes counter updates, one fans them out\nconst publisher = redis.createClient({ url: process.env.REDIS_URL })\nconst subscriber = publisher.duplicate()\n",
        );
    }

    out
}

fn bump_count(opts: &Options) -> String {
    if opts.prisma {
        "  const counter = await prisma.counter.findFirst()\n  count = (counter?.count ?? 0) + 1\n\n  if (counter) {\n    await prisma.counter.update({ where: { id: counter.id }, data: { count } })\n  } else {\n    await prisma.counter.create({ data: { count } })\n  }"
    } else if opts.drizzle {
        "  const rows = await db.select().from(schema.counters)\n  count = (rows[0]?.count ?? 0) + 1\n\n  if (rows.length) {\n    await db.update(schema.counters).set({ count })\n  } else {\n    await db.insert(schema.counters).values({ id: 1, count })\n  }"
    } else if opts.knex {
        "  const counter = await db('counters').first()\n  count = (counter?.count ?? 0) + 1\n\n  if (counter) {\n    await db('counters').update({ count })\n  } else {\n    await db('counters').insert({ count })\n  }"
    } else if opts.mongodb {
        "  const counters = client.db().collection('counters')\n  await counters.updateOne({}, { $inc: { count: 1 } }, { upsert: true })\n  count = (await counters.findOne({})).count"
    } else if opts.postgresql {
        "  const counter = await db.query('SELECT \"count\" FROM \"counters\"')\n\n  if (counter.rows.length) {\n    count = counter.rows[0].count + 1\n    await db.query('UPDATE \"counters\" SET \"count\" = $1', [count])\n  } else {\n    count = 1\n    await db.query('INSERT INTO \"counters\" VALUES($1)', [count])\n  }"
    } else if opts.sqlite {
        "  await new Promise((resolve, reject) => {\n    db.get('SELECT \"count\" FROM \"counters\"', (err, row) => {\n      if (err) return reject(err)\n\n      count = (row?.count ?? 0) + 1\n      const query = row\n        ? 'UPDATE \"counters\" SET \"count\" = ?'\n        : 'INSERT INTO \"counters\" VALUES(?)'\n\n      db.run(query, [count], err => (err ? reject(err) : resolve()))\n    })\n  })"
    } else {
        "  count += 1"
    }
    .to_string()
}

fn ws_broadcast(opts: &Options, clients: &str) -> String {
    if opts.redis {
        "\n  publisher.publish('counters', String(count))\n".to_string()
    } else if opts.websocket {
        format!("\n  for (const client of {clients}) {{\n    client.send(String(count))\n  }}\n")
    } else {
        String::new()
    }
}

/// Setup that has to await before the server starts listening.
fn async_setup(opts: &Options, clients: &str) -> String {
    let mut out = String::new();

    if opts.prisma {
        // migrations already ran synchronously at module scope
    } else if opts.drizzle {
        if !opts.sqlite {
            out.push_str("  await migrate(db, { migrationsFolder: './migrations' })\n");
        }
    } else if opts.knex {
        out.push_str(
            "  if (!await db.schema.hasTable('counters')) {\n    await db.schema.createTable('counters', table => table.integer('count'))\n  }\n",
        );
    } else if opts.mongodb {
        out.push_str("  await client.connect()\n");
    } else if opts.postgresql {
        out.push_str(
            "  await db.connect()\n  await db.query('CREATE TABLE IF NOT EXISTS \"counters\" ( \"count\" INTEGER )')\n",
        );
    }

    if opts.redis {
        let _ = write!(
            out,
            "  await publisher.connect()\n  await subscriber.connect()\n\n  await subscriber.subscribe('counters', message => {{\n    for (const client of {clients}) {{\n      client.send(message)\n    }}\n  }})\n"
        );
    }

    out
}

/// The listen call, wrapped in an async block when setup has to await
/// first. CommonJS entry points have no top-level await.
fn startup(listen: &str, setup: &str) -> String {
    if setup.is_empty() {
        return listen.to_string();
    }

    let mut out = String::from(";(async () => {\n");
    out.push_str(setup);
    out.push('\n');
    for line in listen.lines() {
        let _ = writeln!(out, "  {line}");
    }
    out.push_str("})()");
    out
}

pub fn render_tsconfig(opts: &Options) -> String {
    let (module, resolution) = if opts.esm {
        ("NodeNext", "NodeNext")
    } else {
        ("CommonJS", "Node10")
    };
    render(
        TSCONFIG,
        &[("module", module), ("module_resolution", resolution)],
    )
}

pub fn render_schema_prisma(opts: &Options) -> String {
    let provider = if opts.sqlite {
        "sqlite"
    } else if opts.mongodb {
        "mongodb"
    } else {
        "postgresql"
    };
    render(
        SCHEMA_PRISMA,
        &[("provider", provider), ("url", "env(\"DATABASE_URL\")")],
    )
}

pub fn render_schema_drizzle(opts: &Options) -> String {
    let (core_module, table_fn) = if opts.sqlite {
        ("sqlite-core", "sqliteTable")
    } else {
        ("pg-core", "pgTable")
    };
    render(
        SCHEMA_DRIZZLE,
        &[("core_module", core_module), ("table_fn", table_fn)],
    )
}

pub fn render_tailwind_config(opts: &Options) -> String {
    render(
        TAILWIND_CONFIG,
        &[("view_ext", deps::template_extension(opts))],
    )
}

pub fn render_index_html(opts: &Options) -> String {
    let client_script = if opts.htmx {
        "\n    <script src=\"https://unpkg.com/htmx.org@1.9.12\"></script>"
    } else if opts.websocket {
        "\n    <script src=\"/client.js\" defer></script>"
    } else {
        ""
    };

    render(
        INDEX_HTML,
        &[
            ("count", deps::count(opts)),
            ("client_script", client_script),
        ],
    )
}
