//! Example: parse a stylesheet and dump it as JSON
//!
//! Usage: `cargo run --example dump_stylesheet [path.rcss]`

use anyhow::Context;
use rcss_core::{ParserConfig, StyleSheet, StyleSheetSpecification};

const SAMPLE: &str = r#"
/* Built-in sample */
body { font-size: 14px; color: #333; }
div.panel, div.dialog { margin: 4px 8px; background: white; }
li:nth-child(odd):hover { background-color: rgba(0, 0, 0, 0.1); }

@keyframes fade-in {
    from { opacity: 0; }
    50%, 75% { opacity: 0.8; }
    to { opacity: 1; }
}
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let spec = StyleSheetSpecification::with_defaults();
    let sheet = match std::env::args().nth(1) {
        Some(path) => StyleSheet::load_file(&path, &spec, ParserConfig::default())
            .with_context(|| format!("loading {}", path))?,
        None => StyleSheet::parse_str(SAMPLE, "sample.rcss", &spec),
    };

    println!("{} rules, {} keyframes", sheet.rule_count, sheet.keyframes.len());
    for diagnostic in sheet.diagnostics.iter() {
        println!("{}", diagnostic);
    }

    println!("{}", serde_json::to_string_pretty(&sheet.tree.snapshot())?);
    println!("{}", serde_json::to_string_pretty(&sheet.keyframes)?);
    Ok(())
}
