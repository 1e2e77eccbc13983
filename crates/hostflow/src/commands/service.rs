use super::{Context, print_json, print_projection};
use crate::ServiceCommands;
use colored::Colorize;

pub fn handle(cmd: ServiceCommands, ctx: &mut Context) -> anyhow::Result<()> {
    match cmd {
        ServiceCommands::AddGroup { service, group } => {
            ctx.inventory.add_service(&service, &group)?;
            ctx.save()?;
            println!(
                "{} Placed service {} in group {}",
                "✓".green(),
                service.cyan(),
                group.yellow()
            );
        }
        ServiceCommands::RemoveGroup { service, group } => {
            ctx.inventory.remove_service(&service, &group)?;
            ctx.save()?;
            println!(
                "{} Removed service {} from group {}",
                "✓".green(),
                service.cyan(),
                group.yellow()
            );
        }
        ServiceCommands::List { json } => {
            let rows = ctx.inventory.service_groups();
            if json {
                return print_json(&rows);
            }
            print_projection("Services:", &rows);
        }
    }
    Ok(())
}
