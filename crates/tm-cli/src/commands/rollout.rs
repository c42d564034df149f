//! Rollout command implementation

use anyhow::{Context, Result};
use tm_core::DirectoryScriptSource;
use tm_rollout::{RolloutEngine, RolloutMode, RolloutOptions, RolloutOutcome};

use crate::cli::{GlobalArgs, RolloutArgs};
use crate::context::RuntimeContext;

/// Execute the rollout command
pub(crate) async fn execute(args: &RolloutArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let options = rollout_options(args, &ctx);
    log::debug!(
        "Rolling out {} ({} mode, replace variables: {})",
        options.directory.display(),
        options.mode,
        options.replace_variables
    );

    let variables = ctx.config.substitution_provider();
    let source = DirectoryScriptSource::new();
    let engine = RolloutEngine::new(ctx.store.as_ref(), &source).with_substitution(&variables);

    let outcome = engine
        .run(&options, &mut |line: &str| println!("{}", line))
        .await
        .context("Rollout failed")?;

    match &outcome {
        RolloutOutcome::NoScripts => println!("Nothing to roll out"),
        RolloutOutcome::UpToDate => println!("Ledger is up to date"),
        RolloutOutcome::Applied { migrations } => {
            for migration in migrations {
                println!(
                    "  {} (iteration {})",
                    migration.migration_id, migration.iteration
                );
            }
        }
    }

    Ok(())
}

/// Command line flags win over the `rollout:` config section
fn rollout_options(args: &RolloutArgs, ctx: &RuntimeContext) -> RolloutOptions {
    let as_single_migrations = if args.single {
        true
    } else if args.combined {
        false
    } else {
        ctx.config.rollout.as_single_migrations
    };

    RolloutOptions::new(ctx.rollout_dir(args.directory.as_deref()))
        .with_mode(RolloutMode::from_single_flag(as_single_migrations))
        .with_replace_variables(args.replace_variables || ctx.config.rollout.replace_variables)
}

#[cfg(test)]
#[path = "rollout_test.rs"]
mod tests;
