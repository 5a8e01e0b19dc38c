use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tracing::info;

use fvkit_tree::Firmware;
use fvkit_visitors::{CommandRegistry, EditConfig, MatchPolicy, OutputFormat, Report};

use crate::cli::Cli;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let registry = CommandRegistry::with_builtin_commands();
    if cli.list {
        cmd_list(&registry);
        return Ok(());
    }

    let config = edit_config(&cli)?;
    let Some(tree_path) = cli.tree.as_deref() else {
        anyhow::bail!("no firmware tree given");
    };
    let mut tree = load_tree(tree_path)?;
    let reports = run_chain(&registry, &mut tree, &cli.commands, &config)?;

    match config.output_format {
        OutputFormat::Text => {
            for report in &reports {
                print!("{}", render_text(report));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&tree)?;
        fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
        info!(path = %path.display(), "tree written");
    }
    if let Some(path) = &cli.image {
        let image = tree.buf()?;
        fs::write(path, &image).with_context(|| format!("cannot write {}", path.display()))?;
        info!(path = %path.display(), size = image.len(), "image written");
    }
    Ok(())
}

/// Config file first, then command-line overrides.
fn edit_config(cli: &Cli) -> anyhow::Result<EditConfig> {
    let mut config = match &cli.config {
        Some(path) => EditConfig::load(path)?,
        None => EditConfig::default(),
    };
    if cli.strict {
        config.match_policy = MatchPolicy::ExactlyOne;
    }
    if let Some(format) = cli.format {
        config.output_format = format.into();
    }
    Ok(config)
}

fn load_tree(path: &Path) -> anyhow::Result<Firmware> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a firmware tree", path.display()))
}

/// Build the chain up front so argument errors surface before any command
/// touches the tree, then run it in order.
fn run_chain(
    registry: &CommandRegistry,
    tree: &mut Firmware,
    args: &[String],
    config: &EditConfig,
) -> anyhow::Result<Vec<Report>> {
    let mut chain = registry.parse_chain(args, config)?;
    let mut reports = Vec::with_capacity(chain.len());
    for command in chain.iter_mut() {
        command
            .run(tree)
            .with_context(|| format!("{} failed", command.name()))?;
        reports.push(command.report(tree));
    }
    Ok(reports)
}

fn cmd_list(registry: &CommandRegistry) {
    println!("{}", "Commands:".bold());
    for spec in registry.specs() {
        println!(
            "  {:<12} {} arg(s)  {}",
            spec.name.cyan(),
            spec.arg_count,
            spec.help
        );
    }
}

fn render_text(report: &Report) -> String {
    let mut out = format!(
        "{} {}: {}\n",
        "✓".green().bold(),
        report.command.bold(),
        report.summary
    );
    for m in &report.matches {
        out.push_str(&format!("  {:<14} {}", m.path.yellow(), m.kind));
        if let Some(guid) = m.guid {
            out.push_str(&format!(" {}", guid.to_string().cyan()));
        }
        if let Some(name) = &m.name {
            out.push_str(&format!(" {name}"));
        }
        if let Some(size) = m.size {
            out.push_str(&format!(" ({size:#x} bytes)"));
        }
        out.push('\n');
    }
    for (key, count) in &report.counts {
        out.push_str(&format!("  {key:<40} {count}\n"));
    }
    out
}
