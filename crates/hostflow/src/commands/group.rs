//! hostflow group command handlers

use super::{Context, print_json, print_projection};
use crate::GroupCommands;
use colored::Colorize;

pub fn handle(cmd: GroupCommands, ctx: &mut Context) -> anyhow::Result<()> {
    match cmd {
        GroupCommands::Add { group } => {
            let access = ctx.access();
            ctx.inventory.add_group(&group, &access)?;
            ctx.save()?;
            println!("{} Added group {}", "✓".green(), group.cyan());
        }
        GroupCommands::Remove { group } => {
            if ctx.inventory.remove_group(&group) {
                ctx.save()?;
                println!("{} Removed group {}", "✓".green(), group.cyan());
            } else {
                println!("{} Group {} does not exist", "-".dimmed(), group.cyan());
            }
        }
        GroupCommands::AddHost { group, host } => {
            ctx.inventory.add_host_to_group(&host, &group)?;
            ctx.save()?;
            println!(
                "{} Added host {} to group {}",
                "✓".green(),
                host.cyan(),
                group.yellow()
            );
        }
        GroupCommands::RemoveHost { group, host } => {
            ctx.inventory.remove_host(&host, Some(&group))?;
            ctx.save()?;
            println!(
                "{} Removed host {} from group {}",
                "✓".green(),
                host.cyan(),
                group.yellow()
            );
        }
        GroupCommands::ListHosts { json } => {
            let rows = ctx.inventory.group_hosts();
            if json {
                return print_json(&rows);
            }
            print_projection("Groups:", &rows);
        }
        GroupCommands::ListServices { json } => {
            let rows = ctx.inventory.group_services();
            if json {
                return print_json(&rows);
            }
            print_projection("Groups:", &rows);
        }
        GroupCommands::SetVar { group, key, value } => {
            ctx.inventory.set_group_var(&group, &key, &value)?;
            ctx.save()?;
            println!("{} {} {}={}", "✓".green(), group.yellow(), key, value);
        }
    }
    Ok(())
}
