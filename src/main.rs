//! IPL Score Prediction CLI
//!
//! Predicts a final innings score from venue, teams, striker and bowler.

use clap::{Parser, Subcommand};
use ipl::{Config, IplError, PredictError, Result};

#[derive(Parser)]
#[command(name = "ipl")]
#[command(about = "IPL innings score prediction", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the final score for a match context
    Predict {
        /// Stadium
        #[arg(long)]
        venue: String,
        /// Team currently batting
        #[arg(long)]
        batting_team: String,
        /// Team currently bowling
        #[arg(long)]
        bowling_team: String,
        /// Batsman on strike
        #[arg(long)]
        striker: String,
        /// Bowler delivering
        #[arg(long)]
        bowler: String,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// List the valid choices for a field
    Choices {
        /// venue, batting_team, bowling_team, striker or bowler
        field: String,
    },
    /// Report catalog labels the encoders do not know
    Check,
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show model information
    Info,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        log::debug!("No config at {}, using defaults", cli.config);
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Predict {
            venue,
            batting_team,
            bowling_team,
            striker,
            bowler,
            format,
        } => {
            let ctx = ipl::MatchContext::new(venue, batting_team, bowling_team, striker, bowler);
            commands::predict(&config, &ctx, format)
        }
        Commands::Choices { field } => commands::choices(&config, &field),
        Commands::Check => commands::check(&config),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        match e {
            IplError::Predict(PredictError::Inference { cause }) => {
                log::debug!("Inference failure: {}", cause);
                eprintln!("Error: prediction failed due to an internal model error");
            }
            other => eprintln!("Error: {}", other),
        }
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use burn::backend::NdArray;
    use ipl::data::LabelCatalog;
    use ipl::model::{BurnRegressor, ScoreModelConfig};
    use ipl::predict::{format_prediction, Artifacts, Predictor};
    use ipl::{Field, MatchContext};

    type MyBackend = NdArray<f32>;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("artifacts")?;
        std::fs::create_dir_all("data")?;
        println!("Created artifacts/ and data/ directories");

        println!("\nNext steps:");
        println!("  1. Place the encoder, scaler and model artifacts under artifacts/");
        println!("  2. Copy the ball-by-ball dataset to {}", config.data.catalog_path);
        println!("  3. Run 'ipl check' to verify the catalog against the encoders");
        println!("  4. Run 'ipl predict --venue ... --batting-team ... --bowling-team ... --striker ... --bowler ...'");

        Ok(())
    }

    pub fn predict(config: &Config, ctx: &MatchContext, format: OutputFormat) -> Result<()> {
        let model_file = config.artifacts.model_file();
        if !std::path::Path::new(&model_file).exists() {
            return Err(IplError::NoModel(model_file));
        }

        let artifacts = Artifacts::load(&config.artifacts)?;

        let device = Default::default();
        let model_config = ScoreModelConfig::from_model_config(&config.model);
        let model =
            BurnRegressor::<MyBackend>::load(device, &config.artifacts.model, &model_config)?;

        let predictor = Predictor::new(artifacts, model);
        let result = predictor.predict(ctx)?;

        match format {
            OutputFormat::Table => {
                print!("{}", format_prediction(ctx, &result));
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "venue": ctx.venue(),
                    "batting_team": ctx.batting_team(),
                    "bowling_team": ctx.bowling_team(),
                    "striker": ctx.striker(),
                    "bowler": ctx.bowler(),
                    "raw": result.raw,
                    "score": result.score,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Csv => {
                println!("venue,batting_team,bowling_team,striker,bowler,raw,score");
                println!(
                    "{},{},{},{},{},{:.3},{}",
                    csv_field(ctx.venue()),
                    csv_field(ctx.batting_team()),
                    csv_field(ctx.bowling_team()),
                    csv_field(ctx.striker()),
                    csv_field(ctx.bowler()),
                    result.raw,
                    result.score
                );
            }
        }

        Ok(())
    }

    pub fn choices(config: &Config, field: &str) -> Result<()> {
        let field = Field::from_name(field).ok_or_else(|| {
            IplError::Parse(format!(
                "Unknown field: {}. Use venue, batting_team, bowling_team, striker, or bowler.",
                field
            ))
        })?;

        let catalog = LabelCatalog::from_csv_path(&config.data.catalog_path)?;
        for choice in catalog.choices(field) {
            println!("{}", choice);
        }

        Ok(())
    }

    pub fn check(config: &Config) -> Result<()> {
        let catalog = LabelCatalog::from_csv_path(&config.data.catalog_path)?;
        let artifacts = Artifacts::load(&config.artifacts)?;

        let unknown = catalog.unknown_labels(&artifacts.encoders);

        println!("Catalog Check");
        println!("───────────────────────────────");
        for field in Field::ALL {
            let missing = unknown.iter().filter(|(f, _)| *f == field).count();
            println!(
                "  {:<14} {:>5} choices, {:>4} unknown to encoder",
                field.name(),
                catalog.choices(field).len(),
                missing
            );
        }

        if !unknown.is_empty() {
            println!("\nLabels that would be rejected:");
            for (field, label) in &unknown {
                println!("  {}: {:?}", field, label);
            }
        }

        catalog.verify(&artifacts.encoders)
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let model_file = config.artifacts.model_file();
        if !std::path::Path::new(&model_file).exists() {
            return Err(IplError::NoModel(model_file));
        }

        println!("Model Information");
        println!("───────────────────────────────");
        println!("  Path:           {}", model_file);
        println!("  Input dim:      {}", ipl::features::FeatureVector::DIM);
        println!("  Hidden dims:    {:?}", config.model.hidden_dims);
        println!("  Scaler:         {}", config.artifacts.scaler);
        for field in Field::ALL {
            println!(
                "  {:<16}{}",
                format!("{} encoder:", field.name()),
                config.artifacts.encoder_path(field)
            );
        }

        Ok(())
    }

    /// Quote a value if it would break a CSV row
    fn csv_field(value: &str) -> String {
        if value.contains([',', '"', '\n']) {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}
