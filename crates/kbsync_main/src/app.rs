use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use kbsync_domain::Environment;
use kbsync_infra::KbInfra;
use kbsync_services::KbServices;
use tracing::{debug, error};

use crate::cli::{Cli, Command};
use crate::console::{self, ConsoleReporter};

/// Runs one subcommand. The exit code is a failure whenever anything was
/// counted as failed, missing or unreachable.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let env = Environment::new(cli.endpoint.clone())
        .qdrant_url(cli.qdrant_url.clone())
        .timeout(cli.timeout());
    debug!(endpoint = %env.graphql_endpoint, qdrant = %env.qdrant_url, "Using environment");

    let infra = KbInfra::new(&env).context("Failed to set up clients")?;
    let services = KbServices::new(Arc::new(infra));

    let clean = match cli.command {
        Command::ImportSqlPairs { file, throttle } => {
            let config = env.transfer_config(throttle.schedule()?);
            let tally = services
                .sql_pair_importer(&config)
                .run(&file, &ConsoleReporter)
                .await
                .with_context(|| format!("Failed to import {}", file.display()))?;
            tally.is_clean()
        }
        Command::ImportInstructions { file, project_id, throttle } => {
            let mut config = env.transfer_config(throttle.schedule()?);
            config.project_id = project_id;
            let tally = services
                .instruction_importer(&config)
                .run(&file, &ConsoleReporter)
                .await
                .with_context(|| format!("Failed to import {}", file.display()))?;
            tally.is_clean()
        }
        Command::Export { output_dir, project_id } => {
            let report = services.exporter().export(&output_dir, project_id.as_deref()).await;
            console::print_export(&report);
            report.is_clean()
        }
        Command::ExportMdl { hash, output_dir } => {
            let export = services
                .mdl_exporter()
                .export(&hash, &output_dir)
                .await
                .with_context(|| format!("Failed to export MDL for {hash}"))?;
            console::print_mdl(&export);
            true
        }
        Command::Verify => {
            let report = services.verifier().verify().await;
            console::print_verification(&report);
            report.passed()
        }
        Command::CheckInstructions { expect } => {
            let report = services
                .inspector()
                .instructions(&expect)
                .await
                .context("Failed to read instructions from Qdrant")?;
            console::print_instructions(&report);
            report.missing().is_empty()
        }
        Command::Health => {
            let report = services.verifier().health(&env.app_url()).await;
            console::print_health(&report);
            report.reachable()
        }
    };

    if !clean {
        error!("Finished with failures");
    }
    Ok(if clean { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
