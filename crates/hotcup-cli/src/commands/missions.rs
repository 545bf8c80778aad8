use clap::Subcommand;
use hotcup_core::{random, Config, MissionSelector};

#[derive(Subcommand)]
pub enum MissionsAction {
    /// List the configured missions and titles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Draw explosion results without playing
    Pick {
        /// How many to draw
        #[arg(long, default_value = "1")]
        count: u32,
        /// Fixed random seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub fn run(action: MissionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let selector = MissionSelector::from_config(&config.missions)?;

    match action {
        MissionsAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&config.missions)?);
                return Ok(());
            }
            println!("Titles:");
            for title in selector.titles() {
                println!("  {title}");
            }
            println!("Missions:");
            for (i, mission) in selector.missions().iter().enumerate() {
                println!("  {:>2}. {mission}", i + 1);
            }
        }
        MissionsAction::Pick { count, seed } => {
            let mut rng = match seed.or(config.seed) {
                Some(seed) => random::seeded(seed),
                None => random::from_entropy(),
            };
            for _ in 0..count.max(1) {
                let result = selector.pick(&mut rng);
                println!("{} / {}", result.title, result.mission);
            }
        }
    }
    Ok(())
}
