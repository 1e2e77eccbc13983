//! Dynamic inventory output and deploy mode

use super::{Context, print_json};
use colored::Colorize;
use hostflow_core::{DeployMode, InventoryFilter, Vars};

/// Print the rendered document, or one host's vars with `--host`
///
/// Output is the only thing written to stdout so the automation engine can
/// consume it directly.
pub fn handle(
    ctx: &Context,
    host: Option<&str>,
    hosts: Option<Vec<String>>,
    groups: Option<Vec<String>>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        // Unknown hosts get an empty object, as the engine expects
        let vars: Vars = ctx
            .inventory
            .host(host)
            .map(|h| h.vars().clone())
            .unwrap_or_default();
        return print_json(&vars);
    }

    let mut filter = InventoryFilter::new();
    if let Some(hosts) = hosts {
        filter = filter.with_hosts(hosts);
    }
    if let Some(groups) = groups {
        filter = filter.with_groups(groups);
    }

    let document = if filter.is_active() {
        ctx.inventory.render(Some(&filter))
    } else {
        ctx.inventory.render(None)
    };
    println!("{}", document.to_json_pretty()?);
    Ok(())
}

pub fn set_deploy(ctx: &mut Context, mode: DeployMode) -> anyhow::Result<()> {
    let access = ctx.access();
    ctx.inventory.set_deploy_mode(mode, &access);
    ctx.save()?;
    println!("{} Deploy mode set to {}", "✓".green(), mode.to_string().cyan());
    Ok(())
}
