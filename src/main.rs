use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use engine::prelude::*;

#[derive(Parser, Debug)]
#[command(about = "Run a scenario and dump its distance fields")]
struct Args {
    /// Scenario file to load.
    scenario: PathBuf,

    /// Number of turns to run before dumping.
    #[arg(long, default_value_t = 0)]
    turns: u64,

    /// Field kinds to dump, all declared fields if not given.
    #[arg(long = "field", value_name = "KIND")]
    fields: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = Args::parse();

    let scenario = Scenario::load(&args.scenario)?;
    let mut r = Runtime::from_scenario(&scenario)?;
    log::info!(
        "loaded {:?}, {}x{} map, {} entities",
        args.scenario,
        r.map().width(),
        r.map().height(),
        r.ecs().len()
    );

    for _ in 0..args.turns {
        r.tick().with_context(|| format!("turn {}", r.turn()))?;
    }

    println!("turn {}", r.turn());
    println!("{}", r.render());

    let kinds: Vec<String> = if args.fields.is_empty() {
        r.fields().kinds().map(|(k, _)| k.to_owned()).collect()
    } else {
        args.fields
    };

    for kind in kinds {
        println!();
        if !r.fields().is_declared(&kind) {
            log::warn!("unknown field {kind:?}");
            continue;
        }
        match r.field(&kind) {
            Some(field) if field.is_computed() => {
                println!("{kind}:");
                println!("{}", field.render(r.map()));
            }
            _ => println!("{kind}: not computed"),
        }
    }

    Ok(())
}
