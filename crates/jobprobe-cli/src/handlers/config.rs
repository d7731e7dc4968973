//! `jobprobe config`

use crate::commands::ConfigArgs;
use crate::error::CliResult;

/// Print the effective configuration as YAML
pub fn execute(args: &ConfigArgs) -> CliResult<()> {
    let config = args.source.resolve()?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
