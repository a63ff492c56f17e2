use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

// Import the library
use vpaid_ad_unit::host::{MemorySlot, MemoryVideoSlot};
use vpaid_ad_unit::{
    parser, AdEvent, AdUnitConfig, CanPlay, CreativeData, EnvironmentVars, TokioScheduler,
    ViewMode, VpaidAd,
};

/// Host-side harness for the sample VPAID ad unit
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ad contract version the unit answers with
    Handshake {
        /// Version the simulated player offers
        #[arg(short, long, default_value = "2.0")]
        player_version: String,
    },

    /// Parse an AdParameters JSON file and print its overlays and videos
    Inspect {
        /// Path to the AdParameters file
        #[arg(short, long)]
        input: PathBuf,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Play one scripted impression against an in-memory player
    Play(PlayArgs),
}

#[derive(Args)]
struct PlayArgs {
    /// Path to the AdParameters file
    #[arg(short, long)]
    input: PathBuf,

    /// Ad unit config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 640)]
    width: i32,

    #[arg(long, default_value_t = 360)]
    height: i32,

    #[arg(long, default_value = "normal")]
    view_mode: String,

    /// Desired bitrate in kbps
    #[arg(long, default_value_t = 256.0)]
    bitrate: f64,

    /// MIME type the simulated video element can play (repeatable)
    #[arg(long = "supports", default_value = "video/mp4")]
    supports: Vec<String>,

    /// Number of overlay clicks to simulate
    #[arg(long, default_value_t = 2)]
    clicks: u32,

    /// Seconds the first click adds to the duration
    #[arg(long)]
    extend_on_click: Option<f64>,

    /// Deny autoplay; the harness resumes the ad explicitly
    #[arg(long)]
    no_autoplay: bool,

    /// Make the ad skippable and skip it right after it starts
    #[arg(long)]
    skip: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Handshake { player_version } => {
            let ad = VpaidAd::new(TokioScheduler::new());
            println!("{}", ad.handshake_version(&player_version));
        }
        Commands::Inspect { input, pretty } => {
            let content = tokio::fs::read_to_string(&input).await?;
            let parameters = parser::parse_ad_parameters(&content)?;

            if pretty {
                println!("{:#?}", parameters);
            } else {
                println!("{:?}", parameters);
            }
        }
        Commands::Play(args) => {
            // stopAd defers AdStopped through spawn_local
            let local = tokio::task::LocalSet::new();
            local.run_until(play(args)).await?;
        }
    }

    Ok(())
}

async fn play(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ad_parameters = tokio::fs::read_to_string(&args.input).await?;

    let mut config = match &args.config {
        Some(path) => AdUnitConfig::from_file(path)?,
        None => AdUnitConfig::default(),
    };
    if args.extend_on_click.is_some() {
        config.click_duration_extension = args.extend_on_click;
    }

    let slot = MemorySlot::new();
    let video = args
        .supports
        .iter()
        .fold(MemoryVideoSlot::new(), |video, mime_type| {
            video.supporting(mime_type, CanPlay::Probably)
        });

    let mut ad = VpaidAd::with_config(config, TokioScheduler::new());
    println!("handshake: {}", ad.handshake_version("2.0"));

    for event in AdEvent::ALL {
        ad.subscribe(
            |name: &&'static str| println!("event: {}", name),
            event.as_str(),
            event.as_str(),
        );
    }

    let environment = EnvironmentVars::new(slot.clone(), video.clone())
        .with_autoplay(!args.no_autoplay);
    ad.init_ad(
        args.width,
        args.height,
        ViewMode::from(args.view_mode.as_str()),
        args.bitrate,
        &CreativeData::new(ad_parameters),
        environment,
    )?;
    ad.start_ad()?;
    println!("overlays rendered: {}", slot.images().len());

    if args.skip {
        ad.set_ad_skippable_state(true);
        ad.skip_ad();
        ad.stop_ad();
    } else {
        for _ in 0..args.clicks {
            ad.overlay_clicked();
        }

        if ad.state().is_linear() {
            if args.no_autoplay {
                ad.resume_ad();
            }
            println!("playing: {:?}", video.src().map(|src| src.to_string()));

            let duration = ad.get_ad_duration();
            for step in 0..=4 {
                ad.video_time_update(duration * f64::from(step) / 4.0, duration);
            }
            ad.video_ended();
        } else {
            ad.stop_ad();
        }
    }

    println!("remaining time: {:.2}s", ad.get_ad_remaining_time());

    // Give the deferred AdStopped a chance to fire before the runtime exits
    tokio::time::sleep(ad.config().stop_delay() + Duration::from_millis(25)).await;

    Ok(())
}
