use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use scorecard::config::Config;
use scorecard::policies::{gpa, snow_day};
use scorecard::scoring::{
    self, classify, Configuration, InputRecord, ScoreResult, ScoringPolicy,
};
use scorecard::weather::{fetch_locations, Forecast, WeatherClient};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score snow-day closure odds from forecast or manual conditions
    SnowDay {
        /// Configured location name (or a free-form place to geocode)
        #[arg(long)]
        location: Option<String>,

        /// Score every configured location, ranked by odds
        #[arg(long)]
        all: bool,

        /// Expected snowfall in cm (manual mode)
        #[arg(long)]
        snowfall: Option<f64>,

        /// Expected low temperature in °C (manual mode)
        #[arg(long, allow_negative_numbers = true)]
        temperature: Option<f64>,

        /// Precipitation probability 0-100 (manual mode)
        #[arg(long)]
        precipitation: Option<f64>,

        /// Peak wind speed in km/h (manual mode)
        #[arg(long)]
        wind: Option<f64>,

        /// School type: public, private, boarding
        #[arg(long, default_value = "public")]
        school: String,

        /// District posture: cautious, standard, aggressive
        #[arg(long, default_value = "standard")]
        district: String,

        /// Show an hour-by-hour trend (forecast mode only)
        #[arg(long)]
        hourly: bool,

        /// Reuse the inputs from the previous run
        #[arg(long)]
        last: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Print a plain-text summary suitable for copy/paste
        #[arg(long)]
        summary: bool,
    },
    /// Weighted GPA from a course list
    Gpa {
        /// Course as name:grade:credits, e.g. Algebra:A:3 (repeatable).
        /// Use "-" as the grade for courses not yet graded.
        #[arg(long = "course")]
        courses: Vec<String>,

        /// GPA scale maximum (4.0, 4.3, 5.0, ...)
        #[arg(long, default_value_t = 4.0)]
        scale: f64,

        /// Reuse the course list from the previous run
        #[arg(long)]
        last: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Print a plain-text summary suitable for copy/paste
        #[arg(long)]
        summary: bool,
    },
    /// WCAG contrast ratio between two hex colors
    Contrast {
        /// Foreground color, e.g. "#336699"
        foreground: String,
        /// Background color, e.g. "#ffffff"
        background: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a hex color to its RGB components
    Hex {
        /// Color, e.g. "#1a2b3c" or "abc"
        color: String,
    },
    /// Percentage change between two values
    Percent {
        #[arg(allow_negative_numbers = true)]
        from: f64,
        #[arg(allow_negative_numbers = true)]
        to: f64,
    },
    /// Tempo-synced note and reverb timings for a BPM
    Reverb {
        bpm: f64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score an input file against a custom policy file
    Score {
        /// Policy YAML file
        policy: PathBuf,
        /// Input YAML file (field: value mapping)
        input: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a starter config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Clear the cached forecast responses
    ClearCache,
}

#[derive(Parser, Debug)]
#[command(name = "scorecard")]
#[command(about = "Multi-factor calculators driven by weighted scoring policies", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/scorecard/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Bypass the forecast cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();

    // Load config
    let config_path = cli.config.clone().map(PathBuf::from);
    let config = match scorecard::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.verbose {
        eprintln!(
            "Loaded {} locations, {} policy override sections",
            config.locations.len(),
            config.overrides.len()
        );
    }

    let code = match cli.command {
        Commands::SnowDay {
            ref location,
            all,
            snowfall,
            temperature,
            precipitation,
            wind,
            ref school,
            ref district,
            hourly,
            last,
            json,
            summary,
        } => {
            run_snow_day(
                &cli,
                &config,
                SnowDayArgs {
                    location: location.clone(),
                    all,
                    snowfall,
                    temperature,
                    precipitation,
                    wind,
                    school: school.clone(),
                    district: district.clone(),
                    hourly,
                    last,
                    json,
                    summary,
                },
            )
            .await
        }
        Commands::Gpa {
            ref courses,
            scale,
            last,
            json,
            summary,
        } => run_gpa(&config, courses, scale, last, json, summary),
        Commands::Contrast {
            ref foreground,
            ref background,
            json,
        } => run_contrast(foreground, background, json),
        Commands::Hex { ref color } => run_hex(color),
        Commands::Percent { from, to } => run_percent(from, to),
        Commands::Reverb { bpm, json } => run_reverb(bpm, json),
        Commands::Score {
            ref policy,
            ref input,
            json,
        } => run_custom(&config, policy, input, json),
        Commands::Init { force } => run_init(cli.config.clone().map(PathBuf::from), force),
        Commands::ClearCache => match scorecard::weather::cache::clear_cache() {
            Ok(()) => {
                println!("Forecast cache cleared.");
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to clear cache: {}", e);
                EXIT_CONFIG
            }
        },
    };

    std::process::exit(code);
}

/// Validate a policy and resolve its configuration from the config file's
/// override section. All problems are reported at once.
fn resolve_policy_config(config: &Config, policy: &ScoringPolicy) -> Result<Configuration, i32> {
    if let Err(errors) = scoring::validate_policy(policy) {
        eprintln!("Policy errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(EXIT_CONFIG);
    }

    let overrides = config.overrides_for(&policy.name);
    let problems = scoring::check_overrides(&policy.params, &overrides);
    if !problems.is_empty() {
        eprintln!("Config errors in overrides.{}:", policy.name);
        for problem in problems {
            eprintln!("  - {}", problem);
        }
        return Err(EXIT_CONFIG);
    }

    match policy.default_config().with_overrides(&policy.params, &overrides) {
        Ok(resolved) => Ok(resolved),
        Err(e) => {
            eprintln!("Config error in overrides.{}: {}", policy.name, e);
            Err(EXIT_CONFIG)
        }
    }
}

struct SnowDayArgs {
    location: Option<String>,
    all: bool,
    snowfall: Option<f64>,
    temperature: Option<f64>,
    precipitation: Option<f64>,
    wind: Option<f64>,
    school: String,
    district: String,
    hourly: bool,
    last: bool,
    json: bool,
    summary: bool,
}

impl SnowDayArgs {
    fn manual_conditions(&self) -> snow_day::Conditions {
        snow_day::Conditions {
            snowfall_cm: self.snowfall.unwrap_or(0.0),
            temperature_c: self.temperature.unwrap_or(0.0),
            precipitation_pct: self.precipitation.unwrap_or(0.0),
            wind_kmh: self.wind.unwrap_or(0.0),
            school: self.school.clone(),
            district: self.district.clone(),
        }
    }

    fn has_manual_values(&self) -> bool {
        self.snowfall.is_some()
            || self.temperature.is_some()
            || self.precipitation.is_some()
            || self.wind.is_some()
    }
}

async fn run_snow_day(cli: &Cli, config: &Config, args: SnowDayArgs) -> i32 {
    let policy = snow_day::policy();
    let resolved = match resolve_policy_config(config, &policy) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if args.all {
        return run_snow_day_all(cli, config, &policy, &resolved, &args).await;
    }

    // Figure out conditions: saved inputs, forecast, or manual flags.
    let mut forecast: Option<Forecast> = None;
    let conditions = if args.last {
        let state = match scorecard::recall::load_recall_state(&scorecard::recall::get_recall_path()) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to load saved inputs: {}", e);
                return EXIT_CONFIG;
            }
        };
        match state.restore::<snow_day::Conditions>("snow-day") {
            Some(saved) => saved,
            None => {
                eprintln!("No saved snow-day inputs yet. Run once without --last first.");
                return EXIT_INPUT;
            }
        }
    } else if let Some(ref location) = args.location {
        match fetch_conditions(cli, config, location, &args).await {
            Ok((conditions, fetched)) => {
                forecast = Some(fetched);
                conditions
            }
            Err(code) => return code,
        }
    } else {
        args.manual_conditions()
    };

    let result = match scoring::score(&conditions.to_input(), &policy, &resolved) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Scoring error: {}", e);
            return EXIT_INPUT;
        }
    };

    // Remember this run's inputs for --last
    if !args.last {
        let recall_path = scorecard::recall::get_recall_path();
        if let Ok(mut state) = scorecard::recall::load_recall_state(&recall_path) {
            if state.remember("snow-day", &conditions).is_ok() {
                if let Err(e) = scorecard::recall::save_recall_state(&recall_path, &state) {
                    if cli.verbose {
                        eprintln!("Warning: failed to save inputs: {}", e);
                    }
                }
            }
        }
    }

    if args.json {
        return print_json(&result);
    }

    let use_colors = scorecard::output::should_use_colors();
    if args.summary {
        println!(
            "{}",
            scorecard::output::format_summary("Snow day odds", &result, 100.0, 0)
        );
        return EXIT_SUCCESS;
    }

    println!(
        "{}",
        scorecard::output::format_headline(&result, 100.0, 0, use_colors)
    );
    println!();
    println!(
        "{}",
        scorecard::output::format_breakdown_table(&result, false, 0, use_colors)
    );

    if args.hourly {
        match forecast {
            Some(ref fetched) => {
                println!();
                print_hourly_trend(fetched, &policy, &resolved, &args);
            }
            None => {
                eprintln!();
                eprintln!("--hourly needs a forecast; pass --location as well.");
            }
        }
    }

    EXIT_SUCCESS
}

/// Fetch a forecast and reduce it to scoring conditions. Falls back to
/// manual flags when the fetch fails and any were given.
async fn fetch_conditions(
    cli: &Cli,
    config: &Config,
    location: &str,
    args: &SnowDayArgs,
) -> Result<(snow_day::Conditions, Forecast), i32> {
    let client = match build_weather_client(cli, config) {
        Ok(c) => c,
        Err(code) => return Err(code),
    };

    let query = config
        .find_location(location)
        .map(|l| l.query.clone())
        .unwrap_or_else(|| location.to_string());

    let fetch_start = Instant::now();
    let fetched = match client.forecast_for(&query).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Forecast failed: {}", e);
            if args.has_manual_values() {
                eprintln!("Falling back to the manually entered conditions.");
                // No forecast to attach; synthesize a single-sample one so
                // the caller has nothing hourly to show.
                let conditions = args.manual_conditions();
                return Ok((
                    conditions,
                    Forecast {
                        location: scorecard::weather::Location {
                            name: query,
                            latitude: 0.0,
                            longitude: 0.0,
                        },
                        hours: vec![],
                    },
                ));
            }
            eprintln!("Enter conditions manually with --snowfall/--temperature/--wind.");
            return Err(EXIT_NETWORK);
        }
    };

    if cli.verbose {
        eprintln!(
            "Fetched {} hours for {} in {:?}",
            fetched.hours.len(),
            fetched.location.name,
            fetch_start.elapsed()
        );
    }

    let outlook = match fetched.outlook(24) {
        Some(o) => o,
        None => {
            eprintln!("Forecast for '{}' came back empty.", query);
            return Err(EXIT_NETWORK);
        }
    };

    Ok((
        snow_day::Conditions {
            snowfall_cm: outlook.snowfall_cm,
            temperature_c: outlook.temperature_c,
            precipitation_pct: outlook.precipitation_pct,
            wind_kmh: outlook.wind_kmh,
            school: args.school.clone(),
            district: args.district.clone(),
        },
        fetched,
    ))
}

/// Score every configured location concurrently and print them ranked by
/// odds, highest first.
async fn run_snow_day_all(
    cli: &Cli,
    config: &Config,
    policy: &ScoringPolicy,
    resolved: &Configuration,
    args: &SnowDayArgs,
) -> i32 {
    if config.locations.is_empty() {
        eprintln!("No locations configured.");
        eprintln!("Add locations to ~/.config/scorecard/config.yaml:");
        eprintln!("  locations:");
        eprintln!("    - name: home");
        eprintln!("      query: \"Ottawa\"");
        return EXIT_CONFIG;
    }

    let client = match build_weather_client(cli, config) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let queries: Vec<(String, String)> = config
        .locations
        .iter()
        .map(|l| {
            (
                l.name.clone().unwrap_or_else(|| l.query.clone()),
                l.query.clone(),
            )
        })
        .collect();

    let mut scored: Vec<(String, ScoreResult)> = Vec::new();
    let mut any_succeeded = false;

    for (name, fetch_result) in fetch_locations(&client, &queries).await {
        match fetch_result {
            Ok(forecast) => {
                let Some(outlook) = forecast.outlook(24) else {
                    eprintln!("Forecast for {} came back empty.", name);
                    continue;
                };
                let conditions = snow_day::Conditions {
                    snowfall_cm: outlook.snowfall_cm,
                    temperature_c: outlook.temperature_c,
                    precipitation_pct: outlook.precipitation_pct,
                    wind_kmh: outlook.wind_kmh,
                    school: args.school.clone(),
                    district: args.district.clone(),
                };
                match scoring::score(&conditions.to_input(), policy, resolved) {
                    Ok(result) => {
                        scored.push((name, result));
                        any_succeeded = true;
                    }
                    Err(e) => eprintln!("Scoring {} failed: {}", name, e),
                }
            }
            Err(e) => {
                eprintln!("Forecast failed: {} - {}", name, e);
                // Continue with the other locations
            }
        }
    }

    if !any_succeeded {
        eprintln!("All forecasts failed. Check your network connection.");
        return EXIT_NETWORK;
    }

    // Sort by score descending, then by name for stable ties
    scored.sort_by(|a, b| {
        b.1.total
            .partial_cmp(&a.1.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    if args.json {
        let entries: Vec<serde_json::Value> = scored
            .iter()
            .map(|(name, result)| {
                serde_json::json!({
                    "location": name,
                    "total": result.total,
                    "tier": result.tier.label,
                })
            })
            .collect();
        match serde_json::to_string_pretty(&entries) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize results: {}", e);
                return EXIT_INPUT;
            }
        }
        return EXIT_SUCCESS;
    }

    let name_width = scored
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(8);
    for (name, result) in &scored {
        println!(
            "{:<name_width$}  {}  {:>3} {:<12}  {}",
            name,
            scorecard::output::format_score_bar(result.total, 100.0, 10),
            scorecard::output::format_value(result.total, 0),
            result.tier.label,
            result.tier.message
        );
    }

    EXIT_SUCCESS
}

fn build_weather_client(cli: &Cli, config: &Config) -> Result<WeatherClient, i32> {
    let timeout = match config.weather_timeout() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return Err(EXIT_CONFIG);
        }
    };
    let cache = match config.cache_config(cli.no_cache) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return Err(EXIT_CONFIG);
        }
    };
    if cli.verbose {
        let cache_status = if cache.enabled {
            "enabled"
        } else {
            "disabled (--no-cache)"
        };
        eprintln!("Forecast cache: {}", cache_status);
    }
    WeatherClient::new(timeout, cache).map_err(|e| {
        eprintln!("Failed to create weather client: {}", e);
        EXIT_NETWORK
    })
}

/// Print one scored line per forecast hour for the next 24 hours.
fn print_hourly_trend(
    forecast: &Forecast,
    policy: &ScoringPolicy,
    resolved: &Configuration,
    args: &SnowDayArgs,
) {
    println!("Hourly trend:");
    for hour in forecast.hours.iter().take(24) {
        let conditions = snow_day::Conditions {
            snowfall_cm: hour.snowfall_cm,
            temperature_c: hour.temperature_c,
            precipitation_pct: hour.precipitation_pct,
            wind_kmh: hour.wind_kmh,
            school: args.school.clone(),
            district: args.district.clone(),
        };
        // Each hour is scored independently; one malformed sample just
        // drops out of the trend.
        let Ok(result) = scoring::score(&conditions.to_input(), policy, resolved) else {
            continue;
        };
        let time = hour.time.get(11..16).unwrap_or(hour.time.as_str());
        println!(
            "  {}  {}  {:>3} {}",
            time,
            scorecard::output::format_score_bar(result.total, 100.0, 10),
            scorecard::output::format_value(result.total, 0),
            result.tier.label
        );
    }
}

fn run_gpa(
    config: &Config,
    course_specs: &[String],
    scale: f64,
    last: bool,
    json: bool,
    summary: bool,
) -> i32 {
    if !scale.is_finite() || scale <= 0.0 {
        eprintln!("Invalid --scale {}: must be a positive number.", scale);
        return EXIT_INPUT;
    }

    let recall_path = scorecard::recall::get_recall_path();
    let specs: Vec<String> = if last {
        let state = match scorecard::recall::load_recall_state(&recall_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to load saved inputs: {}", e);
                return EXIT_CONFIG;
            }
        };
        match state.restore::<Vec<String>>("gpa") {
            Some(saved) => saved,
            None => {
                eprintln!("No saved course list yet. Run once without --last first.");
                return EXIT_INPUT;
            }
        }
    } else {
        course_specs.to_vec()
    };

    if specs.is_empty() {
        eprintln!("No courses given. Pass --course name:grade:credits (repeatable).");
        return EXIT_INPUT;
    }

    let mut courses = Vec::with_capacity(specs.len());
    for spec in &specs {
        match gpa::parse_course(spec) {
            Ok(course) => courses.push(course),
            Err(e) => {
                eprintln!("Invalid course: {}", e);
                return EXIT_INPUT;
            }
        }
    }

    let (policy, input, build_errors) = gpa::build(&courses, scale);
    let resolved = match resolve_policy_config(config, &policy) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let (result, skipped) = match scoring::score_partial(&input, &policy, &resolved) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Scoring error: {}", e);
            return EXIT_INPUT;
        }
    };

    // Field-level messages for excluded courses; the average continues
    // without them.
    for error in build_errors.iter().chain(skipped.iter()) {
        eprintln!("Warning: {} (course excluded)", error);
    }

    if !last {
        if let Ok(mut state) = scorecard::recall::load_recall_state(&recall_path) {
            if state.remember("gpa", &specs).is_ok() {
                let _ = scorecard::recall::save_recall_state(&recall_path, &state);
            }
        }
    }

    if json {
        return print_json(&result);
    }

    let use_colors = scorecard::output::should_use_colors();
    if summary {
        println!(
            "{}",
            scorecard::output::format_summary("GPA", &result, scale, 2)
        );
        return EXIT_SUCCESS;
    }

    println!(
        "{}",
        scorecard::output::format_headline(&result, scale, 2, use_colors)
    );
    println!();
    println!(
        "{}",
        scorecard::output::format_breakdown_table(&result, true, 2, use_colors)
    );
    EXIT_SUCCESS
}

fn run_contrast(foreground: &str, background: &str, json: bool) -> i32 {
    use scorecard::tools::color;

    let fg = match color::parse_hex(foreground) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_INPUT;
        }
    };
    let bg = match color::parse_hex(background) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_INPUT;
        }
    };

    let ratio = color::contrast_ratio(fg, bg);
    let bands = color::wcag_bands();
    let Some(tier) = classify(ratio, &bands) else {
        eprintln!("No contrast bands defined");
        return EXIT_CONFIG;
    };

    if json {
        let value = serde_json::json!({
            "foreground": fg,
            "background": bg,
            "ratio": ratio,
            "tier": tier.label,
            "message": tier.message,
        });
        match serde_json::to_string_pretty(&value) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                return EXIT_INPUT;
            }
        }
        return EXIT_SUCCESS;
    }

    println!("{} on {}", fg, bg);
    println!("Contrast ratio: {:.2}:1", ratio);
    println!("{}: {}", tier.label, tier.message);
    EXIT_SUCCESS
}

fn run_hex(color: &str) -> i32 {
    match scorecard::tools::color::parse_hex(color) {
        Ok(rgb) => {
            println!("{}", rgb);
            println!("r: {}  g: {}  b: {}", rgb.r, rgb.g, rgb.b);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            EXIT_INPUT
        }
    }
}

fn run_percent(from: f64, to: f64) -> i32 {
    match scorecard::tools::percent::percent_change(from, to) {
        Ok(change) => {
            println!("{} → {}: {:+.2}%", from, to, change);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            EXIT_INPUT
        }
    }
}

fn run_reverb(bpm: f64, json: bool) -> i32 {
    use scorecard::tools::reverb;

    let notes = match reverb::note_timings(bpm) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_INPUT;
        }
    };
    let presets = match reverb::reverb_presets(bpm) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_INPUT;
        }
    };

    if json {
        let value = serde_json::json!({ "bpm": bpm, "notes": notes, "reverb": presets });
        match serde_json::to_string_pretty(&value) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                return EXIT_INPUT;
            }
        }
        return EXIT_SUCCESS;
    }

    println!("Note timings at {} BPM:", bpm);
    println!("{:>6}  {:>9}  {:>9}  {:>9}", "NOTE", "MS", "DOTTED", "TRIPLET");
    for note in &notes {
        println!(
            "{:>6}  {:>9.1}  {:>9.1}  {:>9.1}",
            note.note, note.ms, note.dotted_ms, note.triplet_ms
        );
    }
    println!();
    println!("Reverb (pre-delay + decay = whole bars):");
    for preset in &presets {
        println!(
            "  {:<6} pre-delay {:>6.1} ms, decay {:>7.1} ms ({} bar{})",
            preset.name,
            preset.pre_delay_ms,
            preset.decay_ms,
            preset.bars,
            if preset.bars == 1.0 { "" } else { "s" }
        );
    }
    EXIT_SUCCESS
}

fn run_custom(config: &Config, policy_path: &PathBuf, input_path: &PathBuf, json: bool) -> i32 {
    let policy_text = match std::fs::read_to_string(policy_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to read {}: {}", policy_path.display(), e);
            return EXIT_INPUT;
        }
    };
    let policy: ScoringPolicy = match serde_saphyr::from_str(&policy_text) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Invalid policy file {}: {}", policy_path.display(), e);
            return EXIT_INPUT;
        }
    };

    let input_text = match std::fs::read_to_string(input_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path.display(), e);
            return EXIT_INPUT;
        }
    };
    let input: InputRecord = match serde_saphyr::from_str(&input_text) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Invalid input file {}: {}", input_path.display(), e);
            return EXIT_INPUT;
        }
    };

    let resolved = match resolve_policy_config(config, &policy) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let (result, skipped) = match scoring::score_partial(&input, &policy, &resolved) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Scoring error: {}", e);
            return EXIT_INPUT;
        }
    };
    for error in &skipped {
        eprintln!("Warning: {} (factor skipped)", error);
    }

    if json {
        return print_json(&result);
    }

    let (max, decimals) = match policy.combine {
        scorecard::scoring::Combine::SumClamped { max, .. } => (max, 0),
        scorecard::scoring::Combine::WeightedAverage { max_scale } => (max_scale, 2),
    };

    let use_colors = scorecard::output::should_use_colors();
    println!(
        "{}",
        scorecard::output::format_headline(&result, max, decimals, use_colors)
    );
    println!();
    println!(
        "{}",
        scorecard::output::format_breakdown_table(
            &result,
            matches!(
                policy.combine,
                scorecard::scoring::Combine::WeightedAverage { .. }
            ),
            decimals,
            use_colors
        )
    );
    EXIT_SUCCESS
}

fn run_init(path: Option<PathBuf>, force: bool) -> i32 {
    match scorecard::config::write_default_config(path, force) {
        Ok(written) => {
            println!("Config written to {}", written.display());
            println!("Run `scorecard snow-day --location <place>` to get started.");
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            EXIT_CONFIG
        }
    }
}

fn print_json(result: &ScoreResult) -> i32 {
    match scorecard::output::to_json(result) {
        Ok(json) => {
            println!("{}", json);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize result: {}", e);
            EXIT_INPUT
        }
    }
}
