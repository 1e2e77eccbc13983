//! hostflow host command handlers

use super::{Context, print_json, print_projection};
use crate::HostCommands;
use colored::Colorize;
use hostflow_remote::{Credentials, InstallOutcome, Provisioner, SshRemoteAccess, load_setup_file};
use std::path::Path;

pub async fn handle(cmd: HostCommands, ctx: &mut Context) -> anyhow::Result<()> {
    match cmd {
        HostCommands::Add { host } => handle_add(ctx, &host),
        HostCommands::Remove { host } => handle_remove(ctx, &host),
        HostCommands::List { json } => handle_list(ctx, json),
        HostCommands::SetVar { host, key, value } => {
            ctx.inventory.set_host_var(&host, &key, &value)?;
            ctx.save()?;
            println!("{} {} {}={}", "✓".green(), host.cyan(), key, value);
            Ok(())
        }
        HostCommands::Check { host } => handle_check(ctx, &host).await,
        HostCommands::Setup {
            host,
            password,
            user,
            file,
        } => match (host, file) {
            (_, Some(file)) => handle_setup_file(ctx, &file).await,
            (Some(host), None) => {
                let Some(password) = password else {
                    anyhow::bail!("--password is required when setting up a single host");
                };
                handle_setup(ctx, &host, Credentials::new(user, password)).await
            }
            (None, None) => anyhow::bail!("either a host or --file is required"),
        },
        HostCommands::Teardown {
            host,
            password,
            user,
        } => handle_teardown(ctx, &host, Credentials::new(user, password)).await,
    }
}

fn provisioner(ctx: &Context) -> Provisioner<SshRemoteAccess> {
    let settings = &ctx.config.settings;
    Provisioner::new(SshRemoteAccess::new(
        settings.ssh_key_file.clone(),
        settings.ssh_user.clone(),
    ))
}

fn handle_add(ctx: &mut Context, host: &str) -> anyhow::Result<()> {
    if ctx.inventory.add_host(host) {
        ctx.save()?;
        println!("{} Added host {}", "✓".green(), host.cyan());
    } else {
        println!("{} Host {} already exists", "-".dimmed(), host.cyan());
    }
    Ok(())
}

fn handle_remove(ctx: &mut Context, host: &str) -> anyhow::Result<()> {
    if !ctx.inventory.contains_host(host) {
        println!("{} Host {} is not registered", "-".dimmed(), host.cyan());
        return Ok(());
    }
    ctx.inventory.remove_host(host, None)?;
    ctx.save()?;
    println!("{} Removed host {}", "✓".green(), host.cyan());
    Ok(())
}

fn handle_list(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let rows = ctx.inventory.host_groups();
    if json {
        return print_json(&rows);
    }
    print_projection("Hosts:", &rows);
    Ok(())
}

async fn handle_check(ctx: &Context, host: &str) -> anyhow::Result<()> {
    ctx.require_host(host)?;
    provisioner(ctx).check(host).await?;
    println!("{} Host {} is reachable", "✓".green(), host.cyan());
    Ok(())
}

async fn handle_setup(ctx: &Context, host: &str, credentials: Credentials) -> anyhow::Result<()> {
    ctx.require_host(host)?;
    match provisioner(ctx).install(host, &credentials).await? {
        InstallOutcome::Installed => {
            println!("{} Host {} set up", "✓".green(), host.cyan());
        }
        InstallOutcome::AlreadyInstalled => {
            println!(
                "{} Host {} is already set up",
                "-".dimmed(),
                host.cyan()
            );
        }
    }
    Ok(())
}

async fn handle_setup_file(ctx: &Context, path: &Path) -> anyhow::Result<()> {
    let hosts = load_setup_file(path)?;
    for (host, _) in &hosts {
        ctx.require_host(host)?;
    }

    let results = provisioner(ctx).install_all(&hosts).await;
    let mut failed = 0;
    for (host, result) in &results {
        match result {
            Ok(InstallOutcome::Installed) => {
                println!("{} Host {} set up", "✓".green(), host.cyan());
            }
            Ok(InstallOutcome::AlreadyInstalled) => {
                println!(
                    "{} Host {} is already set up",
                    "-".dimmed(),
                    host.cyan()
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("{} {}", "✗".red(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} hosts failed to set up", failed, results.len());
    }
    Ok(())
}

async fn handle_teardown(
    ctx: &Context,
    host: &str,
    credentials: Credentials,
) -> anyhow::Result<()> {
    ctx.require_host(host)?;
    provisioner(ctx).uninstall(host, &credentials).await?;
    println!("{} Host {} torn down", "✓".green(), host.cyan());
    Ok(())
}
