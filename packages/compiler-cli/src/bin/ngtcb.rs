//! ngtcb: prints the type-check blocks of components described in JSON.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Deserialize;

use ng_template_compiler_cli::ngtsc::typecheck::api::TypeCheckingConfig;
use ng_template_compiler_cli::ngtsc::typecheck::src::{
    ComponentDescription, MemberChecker, TemplateDiagnostic, TypeCheckingContext,
};

#[derive(Parser)]
#[command(name = "ngtcb", version)]
#[command(about = "Generates type-check blocks for Angular templates", long_about = None)]
struct Cli {
    /// JSON component description, or `-` for stdin
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Check with every strictness flag on
    #[arg(long, conflicts_with = "basic")]
    strict: bool,

    /// Check with the basic (non-strict) flags
    #[arg(long)]
    basic: bool,

    /// Print the diagnostics found while generating as JSON
    #[arg(long)]
    diagnostics: bool,

    /// Check component member reads against the declared `members`
    #[arg(long)]
    check: bool,
}

/// Either one component or a program of components with a shared config.
#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Program {
        #[serde(default)]
        config: Option<TypeCheckingConfig>,
        components: Vec<ComponentDescription>,
    },
    Component(Box<ComponentDescription>),
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let text = read_input(&cli.input)?;
    let input: Input = serde_json::from_str(&text).with_context(|| format!("invalid input {}", cli.input.display()))?;
    let (config, components) = match input {
        Input::Program { config, components } => (config, components),
        Input::Component(component) => (None, vec![*component]),
    };
    let config = if cli.strict {
        TypeCheckingConfig::full()
    } else if cli.basic {
        TypeCheckingConfig::basic()
    } else {
        config.unwrap_or_else(TypeCheckingConfig::full)
    };

    let mut context = TypeCheckingContext::new(config);
    let mut checker = MemberChecker::new();
    for description in components {
        if let Some(members) = &description.members {
            checker = checker.with_component(description.component.name.clone(), members.iter().cloned());
        }
        let name = description.component.name.clone();
        let registration = description.into_registration().with_context(|| format!("failed to bind {}", name))?;
        context.add_component(registration);
    }

    let tcbs = context.generate()?;
    info!("generated {} type-check blocks", tcbs.len());
    for tcb in &tcbs {
        println!("{}\n", tcb.source);
    }

    if cli.diagnostics {
        let diagnostics: Vec<&TemplateDiagnostic> = tcbs.iter().flat_map(|tcb| &tcb.diagnostics).collect();
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    }

    if cli.check {
        let diagnostics = context.check(&checker)?;
        for diagnostic in &diagnostics {
            eprintln!("{}", diagnostic.format(None));
        }
        if diagnostics.iter().any(TemplateDiagnostic::is_error) {
            process::exit(1);
        }
    }
    Ok(())
}
