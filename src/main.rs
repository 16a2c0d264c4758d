mod app;
mod opt;
mod prompt;

use anyhow::Context;
use anyhow::Result;
use app::App;
use opt::Command;
use std::io;
use tracing_subscriber::EnvFilter;
use vocab_srs::Config;
use vocab_srs::Jitter;
use vocab_srs::NoJitter;
use vocab_srs::RandomJitter;
use vocab_srs::Reviewer;
use vocab_srs::SqliteStore;
use vocab_srs::UtcClock;

fn main() -> Result<()> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{}", opt::HELP);
        return Ok(());
    }

    let mut config = Config::from_env()?;
    let opt = opt::parse(args)?;

    if let Some(path) = opt.path {
        config.db_path = path;
    }
    if opt.no_jitter {
        config.jitter = false;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;

    let jitter: Box<dyn Jitter> = if config.jitter {
        Box::new(RandomJitter::new())
    } else {
        Box::new(NoJitter)
    };

    let reviewer = Reviewer::new(store, config.scheduler(), UtcClock, jitter)
        .with_put_attempts(config.put_attempts);

    let mut app = App::new(reviewer);

    match opt.command {
        Command::Init => app.init(),
        Command::Review {
            user_id,
            item_id,
            outcome,
        } => app.review(user_id, item_id, &outcome),
        Command::Study { user_id, limit } => app.study(&user_id, limit),
        Command::Due {
            user_id,
            mastered,
            limit,
        } => app.due(&user_id, mastered, limit),
        Command::Show { user_id, item_id } => app.show(user_id, item_id),
        Command::Stats { user_id } => app.stats(&user_id),
        Command::Remove { user_id, item_id } => app.remove(user_id, item_id),
    }
}
