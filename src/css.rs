//! CSS derivation fallback. When no CSS framework is selected, the class
//! usage of the rendered markup is extracted statically and a minimal
//! stylesheet is synthesized, so the demo styles itself without invoking
//! a CSS build tool.

use anyhow::{Result, bail};
use regex::Regex;

/// Semantic identifiers handed out to class attributes in document order.
const NAME_POOL: [&str; 3] = ["container", "image", "counter"];

/// Stylesheet plus the markup rewritten to use the short identifiers.
#[derive(Debug)]
pub struct DerivedCss {
    pub stylesheet: String,
    pub markup: String,
}

/// Scan `markup` for every `class="..."` occurrence in document order,
/// emit one `@apply` rule block per occurrence named from the fixed pool,
/// and rewrite each occurrence to the short name. A template with more
/// class attributes than pool entries is an error.
pub fn derive(markup: &str) -> Result<DerivedCss> {
    let class_re = Regex::new(r#"class="(.*?)""#).expect("valid regex");

    let classes: Vec<String> = class_re
        .captures_iter(markup)
        .map(|c| c[1].to_string())
        .collect();

    if classes.len() > NAME_POOL.len() {
        bail!(
            "markup uses {} class attributes but the fallback name pool has only {}",
            classes.len(),
            NAME_POOL.len()
        );
    }

    let mut stylesheet = String::from("@tailwind base;\n@layer base {\n");
    let mut rewritten = markup.to_string();

    for (class_list, name) in classes.iter().zip(NAME_POOL) {
        stylesheet.push_str(&format!(".{name} {{@apply {class_list};}}\n"));
        rewritten = rewritten.replacen(class_list.as_str(), name, 1);
    }

    stylesheet.push('}');

    Ok(DerivedCss {
        stylesheet,
        markup: rewritten,
    })
}
