use std::path::PathBuf;

use action_locator::ElementResolver;
use anyhow::{Context, Result};
use clap::Args;
use field_extractor::FieldExtractor;
use host_dom::{Page, PageFixture};
use mailassist_core_types::ExtractionResult;

use super::output::{render, OutputFormat};
use crate::config::AssistConfig;

#[derive(Args, Clone, Debug)]
pub struct ProbeArgs {
    /// Page fixture (YAML)
    #[arg(long, value_name = "FILE")]
    pub page: PathBuf,

    /// Also extract from the fixture's compose subtree
    #[arg(long)]
    pub with_compose: bool,
}

pub fn probe(args: &ProbeArgs, config: &AssistConfig) -> Result<ExtractionResult> {
    let fixture = PageFixture::load(&args.page)
        .with_context(|| format!("Failed to load page fixture {}", args.page.display()))?;

    let mut specs = fixture.body;
    if args.with_compose {
        specs.extend(fixture.compose);
    }
    let page = Page::from_specs(&specs);
    let extractor = FieldExtractor::new(page, ElementResolver::new(config.catalog()));
    Ok(extractor.extract())
}

pub fn cmd_probe(args: ProbeArgs, config: &AssistConfig, format: &OutputFormat) -> Result<()> {
    let result = probe(&args, config)?;
    match render(&result, format)? {
        Some(rendered) => println!("{rendered}"),
        None => {
            println!("Sender:    {}", result.sender_name);
            println!("Recipient: {}", result.recipient_name);
            println!("Subject:   {}", result.subject);
            println!("Body:");
            for line in result.body_text.lines() {
                println!("  {line}");
            }
        }
    }
    Ok(())
}
