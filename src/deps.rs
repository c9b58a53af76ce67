//! Dependency set calculation - pure, total functions of the resolved
//! configuration. Unsupported combinations yield empty/default values
//! rather than failing.

use std::collections::BTreeMap;

use crate::options::Options;

/// Runtime package list, in a fixed append order gated per active flag.
pub fn dependencies(opts: &Options) -> Vec<String> {
    let mut list = Vec::new();
    let mut push = |pkg: &str| list.push(pkg.to_string());

    if opts.ejs {
        push("ejs");
    }
    if opts.postgresql {
        push("pg");
    }
    if opts.mongodb {
        push("mongodb");
    }
    if opts.redis {
        push("redis");
    }
    if opts.prisma {
        push("@prisma/client");
        push("prisma");
    }
    if opts.drizzle {
        push("drizzle-orm");
        push("drizzle-kit");
    }
    if opts.knex {
        push("knex");
    }

    if opts.sqlite {
        if opts.drizzle {
            push("better-sqlite3");
        } else {
            push("sqlite3");
        }
    }

    if opts.express {
        push("express");
        if opts.websocket {
            push("express-ws");
        }
        if opts.mustache {
            push("mustache-express");
        }
    } else {
        if opts.websocket {
            push("ws");
        }
        if opts.mustache {
            push("mustache");
        }
    }

    list
}

/// Development package list: type declarations under typescript, plus the
/// CSS framework's build tool when selected.
pub fn dev_dependencies(opts: &Options) -> Vec<String> {
    let mut list = Vec::new();
    let mut push = |pkg: &str| list.push(pkg.to_string());

    if opts.typescript {
        push("@types/node");
        push("typescript");

        // drizzle supplies its own pg types only partially; prisma and
        // knex bring their own
        if opts.postgresql && (!opts.orm() || opts.drizzle) {
            push("@types/pg");
        }

        if opts.mustache {
            push("@types/mustache");
        }

        if opts.sqlite && opts.drizzle {
            push("@types/better-sqlite3");
        }

        if opts.express {
            push("@types/express");
            if opts.websocket {
                push("@types/express-ws");
            }
        } else {
            if opts.ejs {
                push("@types/ejs");
            }
            if opts.websocket {
                push("@types/ws");
            }
        }
    }

    if opts.tailwindcss {
        push("tailwindcss");
    }

    list
}

/// Build pipeline: migration generation first, then compilation, then CSS.
/// `None` when no step applies.
pub fn build(opts: &Options) -> Option<String> {
    let mut steps: Vec<String> = Vec::new();

    if opts.prisma {
        steps.push("prisma generate".to_string());
    }

    if opts.typescript {
        steps.push("tsc".to_string());
    }

    if opts.tailwindcss {
        steps.push("tailwindcss -i src/input.css -o public/index.css".to_string());
    }

    if opts.drizzle {
        let dialect = if opts.sqlite { "sqlite" } else { "pg" };
        steps.push(format!(
            "drizzle-kit generate:{dialect} --out src/db/migrations --schema src/db/schema.ts"
        ));
    }

    if steps.is_empty() {
        None
    } else {
        Some(steps.join(" && "))
    }
}

/// Start command: points at the compiled output under typescript.
pub fn start(opts: &Options) -> String {
    if opts.typescript {
        "node build/server.js".to_string()
    } else {
        "node server.js".to_string()
    }
}

/// The counter placeholder token embedded in the markup view.
pub fn count(opts: &Options) -> &'static str {
    if opts.mustache {
        "{{ count }}"
    } else if opts.ejs {
        "<%= count %>"
    } else {
        "@@COUNT@@"
    }
}

/// Extension of the markup view file.
pub fn template_extension(opts: &Options) -> &'static str {
    if opts.ejs {
        "ejs"
    } else if opts.mustache {
        "mustache"
    } else {
        "tmpl"
    }
}

/// Import bindings required by the generated server entry point, keyed by
/// binding name. A `BTreeMap` keeps the generated output deterministic:
/// iteration is strictly ascending lexicographic.
pub fn imports(opts: &Options) -> BTreeMap<String, String> {
    let mut list: BTreeMap<String, String> = BTreeMap::new();
    let mut add = |binding: &str, module: &str| {
        list.insert(binding.to_string(), module.to_string());
    };

    if opts.prisma {
        add("{ PrismaClient }", "@prisma/client");
        add("{ execSync }", "node:child_process");
    } else if opts.drizzle {
        add("schema", "./db/schema");

        if opts.sqlite {
            add("{ drizzle }", "drizzle-orm/better-sqlite3");
            add("Database", "better-sqlite3");
            add("{ migrate }", "drizzle-orm/better-sqlite3/migrator");
        } else {
            add("{ drizzle }", "drizzle-orm/node-postgres");
            add("{ Pool }", "pg");
            add("{ migrate }", "drizzle-orm/node-postgres/migrator");
        }
    } else if opts.knex {
        if opts.typescript {
            add("{ knex }", "knex");
        } else {
            add("knex", "knex");
        }
    } else if opts.mongodb {
        add("mongodb", "mongodb");
    } else if opts.postgresql {
        add("pg", "pg");
    } else if opts.sqlite {
        add("sqlite3", "sqlite3");
    } else {
        add("fs", "node:fs");
    }

    if opts.redis {
        add("redis", "redis");
    }

    if opts.sqlite {
        add("url", "node:url");
    }

    if opts.express {
        add("express", "express");
        if opts.websocket {
            add("expressWs", "express-ws");
        }
        // view engines render through express; only the plain template
        // is read off disk
        if !opts.ejs && !opts.mustache {
            add("fs", "node:fs");
        }
        if opts.mustache {
            add("mustacheExpress", "mustache-express");
        }
    } else {
        add("http", "node:http");
        add("url", "node:url");
        add("fs", "node:fs");
        if opts.ejs {
            add("ejs", "ejs");
        }
        if opts.mustache {
            add("mustache", "mustache");
        }
        if opts.websocket {
            add("{ WebSocketServer }", "ws");
        }
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(f: impl FnOnce(&mut Options)) -> Options {
        let mut o = Options::default();
        f(&mut o);
        o
    }

    fn all_flag_combos() -> Vec<Options> {
        // one representative per interacting flag family, crossed
        let mut combos = Vec::new();
        for express in [false, true] {
            for websocket in [false, true] {
                for typescript in [false, true] {
                    for engine in 0..3 {
                        for db in 0..4 {
                            for orm in 0..4 {
                                let mut o = Options {
                                    express,
                                    websocket,
                                    typescript,
                                    ..Options::default()
                                };
                                match engine {
                                    1 => o.ejs = true,
                                    2 => o.mustache = true,
                                    _ => {}
                                }
                                match db {
                                    1 => o.sqlite = true,
                                    2 => o.postgresql = true,
                                    3 => o.mongodb = true,
                                    _ => {}
                                }
                                match orm {
                                    1 => o.prisma = true,
                                    2 => o.drizzle = true,
                                    3 => o.knex = true,
                                    _ => {}
                                }
                                combos.push(o);
                            }
                        }
                    }
                }
            }
        }
        combos
    }

    #[test]
    fn no_duplicate_dependencies_for_any_configuration() {
        for o in all_flag_combos() {
            for list in [dependencies(&o), dev_dependencies(&o)] {
                let mut seen = std::collections::HashSet::new();
                for pkg in &list {
                    assert!(seen.insert(pkg.clone()), "duplicate {pkg} in {o:?}");
                }
            }
        }
    }

    #[test]
    fn imports_keys_strictly_ascending() {
        for o in all_flag_combos() {
            let imports = imports(&o);
            let keys: Vec<_> = imports.keys().collect();
            let mut sorted = keys.clone();
            sorted.sort();
            assert_eq!(keys, sorted);
        }
    }

    #[test]
    fn redis_dependency_appears_exactly_once() {
        let o = opts(|o| {
            o.redis = true;
            o.websocket = true;
        });
        let deps = dependencies(&o);
        assert_eq!(deps.iter().filter(|p| *p == "redis").count(), 1);
    }

    #[test]
    fn sqlite_driver_depends_on_orm() {
        let o = opts(|o| o.sqlite = true);
        assert!(dependencies(&o).contains(&"sqlite3".to_string()));

        let o = opts(|o| {
            o.sqlite = true;
            o.drizzle = true;
        });
        let deps = dependencies(&o);
        assert!(deps.contains(&"better-sqlite3".to_string()));
        assert!(!deps.contains(&"sqlite3".to_string()));
    }

    #[test]
    fn express_selects_adapter_packages() {
        let o = opts(|o| {
            o.express = true;
            o.websocket = true;
            o.mustache = true;
        });
        let deps = dependencies(&o);
        assert!(deps.contains(&"express-ws".to_string()));
        assert!(deps.contains(&"mustache-express".to_string()));
        assert!(!deps.contains(&"ws".to_string()));

        let o = opts(|o| {
            o.websocket = true;
            o.mustache = true;
        });
        let deps = dependencies(&o);
        assert!(deps.contains(&"ws".to_string()));
        assert!(deps.contains(&"mustache".to_string()));
    }

    #[test]
    fn pg_types_omitted_when_orm_supplies_them() {
        let o = opts(|o| {
            o.typescript = true;
            o.postgresql = true;
            o.prisma = true;
        });
        assert!(!dev_dependencies(&o).contains(&"@types/pg".to_string()));

        let o = opts(|o| {
            o.typescript = true;
            o.postgresql = true;
        });
        assert!(dev_dependencies(&o).contains(&"@types/pg".to_string()));

        let o = opts(|o| {
            o.typescript = true;
            o.postgresql = true;
            o.drizzle = true;
        });
        assert!(dev_dependencies(&o).contains(&"@types/pg".to_string()));
    }

    #[test]
    fn build_pipeline_ordering() {
        let o = opts(|o| {
            o.prisma = true;
            o.typescript = true;
            o.tailwindcss = true;
        });
        let build = build(&o).unwrap();
        assert_eq!(
            build,
            "prisma generate && tsc && tailwindcss -i src/input.css -o public/index.css"
        );
    }

    #[test]
    fn build_empty_when_no_step_applies() {
        assert_eq!(build(&Options::default()), None);
    }

    #[test]
    fn drizzle_migration_step_tracks_database() {
        let o = opts(|o| {
            o.drizzle = true;
            o.typescript = true;
            o.sqlite = true;
        });
        assert!(build(&o).unwrap().contains("generate:sqlite"));

        let o = opts(|o| {
            o.drizzle = true;
            o.typescript = true;
        });
        assert!(build(&o).unwrap().contains("generate:pg"));
    }

    #[test]
    fn start_points_at_compiled_output_under_typescript() {
        assert_eq!(start(&Options::default()), "node server.js");
        assert_eq!(
            start(&opts(|o| o.typescript = true)),
            "node build/server.js"
        );
    }

    #[test]
    fn template_extension_per_engine() {
        assert_eq!(template_extension(&Options::default()), "tmpl");
        assert_eq!(template_extension(&opts(|o| o.ejs = true)), "ejs");
        assert_eq!(template_extension(&opts(|o| o.mustache = true)), "mustache");
    }

    #[test]
    fn count_placeholder_per_engine() {
        assert_eq!(count(&Options::default()), "@@COUNT@@");
        assert_eq!(count(&opts(|o| o.ejs = true)), "<%= count %>");
        assert_eq!(count(&opts(|o| o.mustache = true)), "{{ count }}");
    }

    #[test]
    fn framework_less_imports_include_http_stack() {
        let imports = imports(&Options::default());
        assert_eq!(imports.get("http").map(String::as_str), Some("node:http"));
        assert_eq!(imports.get("fs").map(String::as_str), Some("node:fs"));
        assert_eq!(imports.get("url").map(String::as_str), Some("node:url"));
    }

    #[test]
    fn express_imports_skip_fs_when_a_view_engine_renders() {
        let plain = imports(&opts(|o| o.express = true));
        assert!(plain.contains_key("fs"));

        let ejs = imports(&opts(|o| {
            o.express = true;
            o.ejs = true;
        }));
        assert!(!ejs.contains_key("fs"));

        let mustache = imports(&opts(|o| {
            o.express = true;
            o.mustache = true;
        }));
        assert!(!mustache.contains_key("fs"));
        assert!(mustache.contains_key("mustacheExpress"));
    }

    #[test]
    fn orm_imports_are_mutually_exclusive() {
        let o = opts(|o| {
            o.prisma = true;
            o.sqlite = true;
        });
        let imports = imports(&o);
        assert!(imports.contains_key("{ PrismaClient }"));
        assert!(!imports.contains_key("{ drizzle }"));
        assert!(!imports.contains_key("knex"));
    }
}
