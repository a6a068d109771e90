use anyhow::Result;
use serde::Serialize;

use super::output::{render, OutputFormat};
use crate::config::AssistConfig;

#[derive(Serialize)]
struct ChainView<'a> {
    role: &'static str,
    patterns: &'a [String],
    invalid: Vec<InvalidPattern<'a>>,
}

#[derive(Serialize)]
struct InvalidPattern<'a> {
    pattern: &'a str,
    error: String,
}

pub fn cmd_selectors(config: &AssistConfig, format: &OutputFormat) -> Result<()> {
    let catalog = config.catalog();
    let views: Vec<ChainView<'_>> = catalog
        .chains()
        .map(|chain| ChainView {
            role: chain.role().name(),
            patterns: chain.patterns(),
            invalid: chain
                .invalid_patterns()
                .into_iter()
                .map(|(pattern, err)| InvalidPattern {
                    pattern,
                    error: err.to_string(),
                })
                .collect(),
        })
        .collect();

    if let Some(rendered) = render(&views, format)? {
        println!("{rendered}");
        return Ok(());
    }

    for view in &views {
        println!("{}:", view.role);
        for (idx, pattern) in view.patterns.iter().enumerate() {
            let broken = view.invalid.iter().find(|bad| bad.pattern == pattern.as_str());
            match broken {
                Some(bad) => println!("  {}. {}  (invalid: {})", idx + 1, pattern, bad.error),
                None => println!("  {}. {}", idx + 1, pattern),
            }
        }
    }
    Ok(())
}
