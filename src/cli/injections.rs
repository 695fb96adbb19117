//! List built-in registration modules.

use crate::collector::CollectorHandle;
use crate::injections::{Injector, modules_for_injection};
use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

/// Command to list registration modules and the records they register.
#[derive(Args)]
pub struct InjectionsCommand {
    /// Only list the module for this top-level unit
    #[arg(long)]
    unit: Option<String>,
}

impl InjectionsCommand {
    pub fn execute(&self) -> Result<()> {
        let modules: Vec<_> = modules_for_injection()
            .into_iter()
            .filter(|module| self.unit.as_deref().is_none_or(|unit| module.unit == unit))
            .collect();

        if modules.is_empty() {
            match &self.unit {
                Some(unit) => bail!("No registration module for unit '{}'", unit),
                None => {
                    println!("No registration modules");
                    return Ok(());
                }
            }
        }

        for module in modules {
            // A throwaway injector; nothing is installed anywhere
            let injector = Injector::with_modules(CollectorHandle::default(), Vec::new());
            (module.inject)(&injector).with_context(|| format!("Registration module {} failed", module.name))?;

            println!("{} {}", module.name.bold(), format!("({})", module.unit).dimmed());
            for (unit, _, record) in injector.records() {
                let path = record.options.path.as_deref().unwrap_or(&unit);
                let mut line = format!("  {} {}", path.cyan(), record.entry.key());
                if !record.bounds.is_unbounded() {
                    line.push_str(&format!(" [{}]", record.bounds));
                }
                if let Some(description) = &record.options.description {
                    line.push_str(&format!(" - {description}"));
                }
                println!("{line}");
            }
        }
        Ok(())
    }
}
