use anyhow::{bail, Context as _, Result};
use ctxsync::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

const USAGE: &str = "usage: ctxsync <sales-transaction|product-discovery|pricing-sync|CONTEXT> \
[--config PATH] [--access-token TOKEN] [--instance-url URL] [--halt-on-bind-failure]";

#[derive(Debug, Default)]
struct Args {
    task: String,
    config: Option<PathBuf>,
    overrides: CredentialOverrides,
    halt_on_bind_failure: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut task = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .with_context(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--access-token" => parsed.overrides.access_token = Some(value("--access-token")?),
            "--instance-url" => parsed.overrides.instance_url = Some(value("--instance-url")?),
            "--halt-on-bind-failure" => parsed.halt_on_bind_failure = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ if task.is_none() => task = Some(arg.clone()),
            _ => bail!("unexpected argument {arg}"),
        }
    }

    parsed.task = task.context("missing task")?;
    Ok(parsed)
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    let spec = if args.task == "pricing-sync" {
        None
    } else {
        let spec = config
            .context_spec(&args.task)
            .with_context(|| format!("unknown task or context '{}'", args.task))?;
        Some(spec)
    };

    let credentials = Credentials::resolve(&args.overrides, &config.org)?;
    let client: Arc<dyn ApiTransport> = Arc::new(RestClient::new(
        &credentials,
        config.api_version(),
        config.request_timeout(),
    )?);

    let Some(spec) = spec else {
        let outcome = PricingSyncTrigger::new(client).run().await?;
        return Ok(if outcome.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    };

    let mut options = config.sync_options();
    options.halt_on_bind_failure |= args.halt_on_bind_failure;

    let result = ContextSyncWorkflow::new(client, spec, options)?.run().await;
    Ok(match result.outcome() {
        Outcome::Complete => ExitCode::SUCCESS,
        Outcome::CompletedWithWarnings => ExitCode::from(3),
        Outcome::Failed => ExitCode::from(1),
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    ctxsync::logging::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            match e.downcast_ref::<SyncError>() {
                Some(err) if !err.is_configuration() => ExitCode::from(1),
                _ => ExitCode::from(2),
            }
        }
    }
}
