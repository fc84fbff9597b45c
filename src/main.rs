mod app;

use env_logger::Env;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let summary = app::run()?;
    log::debug!(
        "{} converted, {} failed",
        summary.converted,
        summary.failed()
    );

    Ok(())
}
