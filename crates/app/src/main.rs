use std::io::{self, BufRead, Write};

use scrivener_app::Session;
use scrivener_infra::EditorConfig;

fn main() -> anyhow::Result<()> {
    let config = EditorConfig::from_env();
    scrivener_observability::init_with_filter(&config.log_filter);

    let session = Session::new(&config);
    tracing::info!(id_prefix = %config.id_prefix, "session started");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        match session.run_line(&line) {
            Ok(Some(output)) => writeln!(stdout, "{output}")?,
            Ok(None) => {}
            Err(e) => writeln!(stdout, "error: {e:#}")?,
        }
    }

    tracing::info!("session finished");
    Ok(())
}
