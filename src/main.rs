use clap::Parser;

use nag::cli::{default_envfile_path, RunOptions};
use nag::config::MAX_DEFAULT_MINUTES;

#[derive(Parser)]
#[command(name = "nag")]
#[command(about = "Terminal countdown timer that nags until you stop it")]
#[command(version)]
struct Args {
    /// Path to environment file
    #[arg(long)]
    envfile: Option<std::path::PathBuf>,

    /// Start with this many minutes on the clock
    #[arg(long, short = 'm', value_parser = clap::value_parser!(u64).range(1..=MAX_DEFAULT_MINUTES as u64))]
    minutes: Option<u64>,

    /// Alarm sound to select at start (see --list-alarms)
    #[arg(long, short = 'a')]
    alarm: Option<String>,

    /// Print the available alarm sounds and exit
    #[arg(long)]
    list_alarms: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let envfile = args.envfile.or_else(|| Some(default_envfile_path()));
    let options = RunOptions {
        envfile,
        minutes: args.minutes,
        alarm: args.alarm,
        list_alarms: args.list_alarms,
    };

    let code = nag::run(options).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
