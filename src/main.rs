use std::path::{Path, PathBuf};
use std::{env, fs, io};

use anyhow::{Context, bail};
use privprofile::ConfigStore;
use privprofile::registry::{TerminalConfirm, write_registry_value};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: privprofile <file> [<section> <key> <value>]";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = env::args().skip(1).collect::<Vec<String>>();

    match args.as_slice() {
        [path] => dump(&PathBuf::from(path)),
        [path, section, key, value] => {
            let path = PathBuf::from(path);
            write_registry_value(section, key, value, &path, &TerminalConfirm)
                .with_context(|| format!("failed to write {section}/{key}"))?;
            info!("wrote [{section}] {key}={value} to {}", path.display());
            Ok(())
        }
        _ => bail!(USAGE),
    }
}

fn dump(path: &Path) -> anyhow::Result<()> {
    let file = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let profile = ConfigStore::from_reader(file)?;

    profile.save(io::stdout().lock())?;
    Ok(())
}
