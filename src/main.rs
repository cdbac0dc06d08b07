use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use ecosort::generate::preview;
use ecosort::io_utils::{ecosort_cli_error, simple_cli_error, CliError};
use ecosort::reference::snap_size;
use ecosort::{
    compare_runs, compare_to_reference, export_language_comparison, export_records,
    export_statistics, generate_list, generate_lists, parse_list, seeded_rng, Algorithm, Config,
    ImpactModel, LlmClient, LlmError, ProcessCpuMeter, ReferenceTable, RunRecord, Sampler,
    Session, StatisticsTable,
};

/// Measure sorting algorithms and estimate their energy and CO2 footprint.
#[derive(Parser)]
#[command(name = "ecosort")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log sampler details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Sample a single algorithm
    Sort {
        /// Algorithm name, e.g. "merge" or "Quick Sort"
        algorithm: String,
        /// Length of the generated list
        #[arg(long, default_value_t = 1_000)]
        size: usize,
        /// Sort these whitespace separated integers instead of a generated list
        #[arg(long)]
        values: Option<String>,
        /// Seed for list generation
        #[arg(long)]
        seed: Option<u64>,
        /// Number of sorted elements to print
        #[arg(long, default_value_t = 20)]
        show: usize,
        /// Number of runs
        #[arg(long, default_value_t = 1)]
        repeat: usize,
        /// Write every run to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write per-algorithm means to this CSV file
        #[arg(long)]
        stats_csv: Option<PathBuf>,
    },
    /// Sample every algorithm on the same list
    CompareAll {
        #[arg(long, default_value_t = 1_000)]
        size: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 1)]
        repeat: usize,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        stats_csv: Option<PathBuf>,
    },
    /// Compare a run with the C, Java and Go reference measurements
    Reference {
        algorithm: String,
        /// List length; snapped to 1000, 10000 or 100000
        #[arg(long, default_value_t = 10_000)]
        size: usize,
        /// Use this elapsed time instead of sampling a run
        #[arg(long)]
        time: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
        /// Write the reference rows to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Print the whole reference table
    References,
    /// Generate one random list per configured size and preview them
    Lists {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 10)]
        show: usize,
    },
    /// Compare an algorithm with a local language model on the same list
    Llm {
        /// Model name; the first installed model when omitted
        #[arg(long)]
        model: Option<String>,
        #[arg(long, default_value_t = 100)]
        size: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "quick")]
        algorithm: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default(cli.config.as_deref())
        .map_err(|e| ecosort_cli_error("loading configuration", e))?;

    match cli.command {
        Cmd::Sort {
            algorithm,
            size,
            values,
            seed,
            show,
            repeat,
            csv,
            stats_csv,
        } => {
            let alg = parse_algorithm(&algorithm)?;
            let list = match values {
                Some(v) => parse_list(&v).map_err(|e| ecosort_cli_error("reading values", e))?,
                None => generate_list(size, cfg.max_value, &mut seeded_rng(seed)),
            };
            alg.check_input(list.len(), cfg.bogo_max_len)
                .map_err(|e| ecosort_cli_error(alg.display_name(), e))?;

            let mut sampler = new_sampler()?;
            let model = cfg.impact_model();
            let mut session = Session::new();
            let bar = progress(repeat as u64);
            let mut sorted = Vec::new();
            for _ in 0..repeat.max(1) {
                let (record, out) = measure(&mut sampler, &model, alg, &list);
                session.push(record);
                sorted = out;
                bar.inc(1);
            }
            bar.finish_and_clear();

            for r in session.records() {
                print_run(r);
            }
            let (head, more) = preview(&sorted, show);
            println!("result: {:?}{}", head, if more { " ..." } else { "" });
            if session.len() > 1 {
                print_statistics(&session.statistics());
            }
            write_csvs(&session, csv, stats_csv)?;
        }

        Cmd::CompareAll {
            size,
            seed,
            repeat,
            csv,
            stats_csv,
        } => {
            let list = generate_list(size, cfg.max_value, &mut seeded_rng(seed));
            let mut sampler = new_sampler()?;
            let model = cfg.impact_model();
            let mut session = Session::new();

            let runnable: Vec<Algorithm> = Algorithm::ALL
                .into_iter()
                .filter(|alg| match alg.check_input(list.len(), cfg.bogo_max_len) {
                    Ok(()) => true,
                    Err(e) => {
                        eprintln!("skipping {}: {e}", alg.display_name());
                        false
                    }
                })
                .collect();

            let bar = progress((runnable.len() * repeat.max(1)) as u64);
            for _ in 0..repeat.max(1) {
                for &alg in &runnable {
                    bar.set_message(alg.display_name());
                    let (record, _) = measure(&mut sampler, &model, alg, &list);
                    session.push(record);
                    bar.inc(1);
                }
            }
            bar.finish_and_clear();

            print_header();
            for r in session.records() {
                print_row(r);
            }
            print_statistics(&session.statistics());
            write_csvs(&session, csv, stats_csv)?;
        }

        Cmd::Reference {
            algorithm,
            size,
            time,
            seed,
            csv,
        } => {
            let alg = parse_algorithm(&algorithm)?;
            let table = ReferenceTable::global();
            let entries = table.lookup_all(alg.key(), size);
            if entries.is_empty() {
                eprintln!("warning: no reference data for {}", alg.display_name());
                return Ok(());
            }

            let run = match time {
                Some(t) => RunRecord {
                    algorithm_name: alg.display_name().to_string(),
                    elapsed_seconds: t,
                    cpu_percent: 0.0,
                    energy_wh: 0.0,
                    co2_g: 0.0,
                },
                None => {
                    let list = generate_list(size, cfg.max_value, &mut seeded_rng(seed));
                    let mut sampler = new_sampler()?;
                    measure(&mut sampler, &cfg.impact_model(), alg, &list).0
                }
            };

            let bucket = snap_size(size);
            if bucket != size {
                eprintln!("list of {size} elements approximated to the {bucket} element benchmark");
            }
            println!("{} (~{} elements)", alg.display_name(), bucket);
            println!(
                "{:<10} {:>12} {:>8} {:>12} {:>10} {:>9}",
                "language", "time (s)", "cpu (%)", "energy (Wh)", "co2 (g)", "speedup"
            );
            println!(
                "{:<10} {:>12.6} {:>8.2} {:>12.6} {:>10.4} {:>8.2}x",
                "rust", run.elapsed_seconds, run.cpu_percent, run.energy_wh, run.co2_g, 1.0
            );
            for c in compare_to_reference(&run, &entries) {
                println!(
                    "{:<10} {:>12.6} {:>8.2} {:>12.6} {:>10.4} {:>8.2}x",
                    c.entry.language.as_str(),
                    c.entry.elapsed_seconds,
                    c.entry.cpu_percent,
                    c.entry.energy_wh,
                    c.entry.co2_g,
                    c.speedup
                );
            }
            println!("speedup > 1.00x means the reference language was faster");

            if let Some(path) = csv {
                let written = export_language_comparison(&entries, alg.key(), bucket, Some(&path))
                    .map_err(|e| ecosort_cli_error("exporting comparison", e))?;
                eprintln!("wrote {}", written.display());
            }
        }

        Cmd::References => {
            println!(
                "{:<6} {:<10} {:>7} {:>12} {:>8} {:>12} {:>8}",
                "lang", "algorithm", "size", "time (s)", "cpu (%)", "energy (Wh)", "co2 (g)"
            );
            for e in ReferenceTable::global().iter() {
                println!(
                    "{:<6} {:<10} {:>7} {:>12.6} {:>8.2} {:>12.6} {:>8.4}",
                    e.language.as_str(),
                    e.algorithm.key(),
                    e.size_bucket,
                    e.elapsed_seconds,
                    e.cpu_percent,
                    e.energy_wh,
                    e.co2_g
                );
            }
        }

        Cmd::Lists { seed, show } => {
            let lists = generate_lists(&cfg.list_sizes, cfg.max_value, &mut seeded_rng(seed));
            for (size, list) in &lists {
                let (head, more) = preview(list, show);
                println!("{size:>7}: {:?}{}", head, if more { " ..." } else { "" });
            }
        }

        Cmd::Llm {
            model,
            size,
            seed,
            algorithm,
        } => {
            let alg = parse_algorithm(&algorithm)?;
            let list = generate_list(size, cfg.max_value, &mut seeded_rng(seed));
            alg.check_input(list.len(), cfg.bogo_max_len)
                .map_err(|e| ecosort_cli_error(alg.display_name(), e))?;

            let client = LlmClient::from_config(&cfg);
            if !client.is_available() {
                return Err(simple_cli_error(&format!(
                    "model runner {:?} not found. Install it from https://ollama.ai",
                    client.command
                ))
                .into());
            }
            let model_name = match model {
                Some(m) => m,
                None => client
                    .list_models()
                    .map_err(|e| ecosort_cli_error("listing models", e.into()))?
                    .into_iter()
                    .next()
                    .ok_or_else(|| ecosort_cli_error("listing models", LlmError::NoModels.into()))?,
            };

            let impact = cfg.impact_model();
            let mut sampler = new_sampler()?;
            let (baseline, _) = measure(&mut sampler, &impact, alg, &list);

            eprintln!(
                "querying {model_name} with a list of {} elements (first {} in the prompt)",
                list.len(),
                list.len().min(client.prompt_limit)
            );
            let prompt = client.build_prompt(&list);
            let llm_run = client
                .query(&mut sampler, &model_name, &prompt)
                .map_err(|e| ecosort_cli_error(&format!("querying {model_name}"), e.into()))?;
            let llm_record = llm_run.to_record(&impact);

            print_header();
            print_row(&baseline);
            print_row(&llm_record);
            let f = compare_runs(&baseline, &llm_record);
            println!("the model took {:.1}x the time", f.time_factor);
            println!("the model used {:.1}x the energy", f.energy_factor);
            println!("response: {}", llm_run.response());
        }
    }
    Ok(())
}

fn parse_algorithm(name: &str) -> Result<Algorithm, CliError> {
    Algorithm::from_name(name).ok_or_else(|| {
        simple_cli_error(&format!(
            "unknown algorithm {name:?}. Choose one of merge, quick, bubble, insertion, bogo."
        ))
    })
}

fn new_sampler() -> Result<Sampler<ProcessCpuMeter>, CliError> {
    Sampler::for_current_process().map_err(|e| ecosort_cli_error("starting cpu sampler", e))
}

fn measure(
    sampler: &mut Sampler<ProcessCpuMeter>,
    model: &ImpactModel,
    alg: Algorithm,
    list: &[i64],
) -> (RunRecord, Vec<i64>) {
    let sample = sampler.sample(|| alg.sort(list));
    let record = RunRecord::new(&sample, &sample.estimate(model), alg.display_name());
    (record, sample.into_payload())
}

fn progress(len: u64) -> ProgressBar {
    if len <= 1 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    bar
}

fn print_run(r: &RunRecord) {
    println!("algorithm: {}", r.algorithm_name);
    println!("time: {:.6}s", r.elapsed_seconds);
    println!("cpu: {:.2}%", r.cpu_percent);
    println!("energy: {:.6} Wh", r.energy_wh);
    println!("co2: {:.4} g", r.co2_g);
}

fn print_header() {
    println!(
        "{:<16} {:>12} {:>8} {:>12} {:>10}",
        "algorithm", "time (s)", "cpu (%)", "energy (Wh)", "co2 (g)"
    );
}

fn print_row(r: &RunRecord) {
    println!(
        "{:<16} {:>12.6} {:>8.2} {:>12.6} {:>10.4}",
        r.algorithm_name, r.elapsed_seconds, r.cpu_percent, r.energy_wh, r.co2_g
    );
}

fn print_statistics(stats: &StatisticsTable) {
    println!();
    println!(
        "{:<16} {:>12} {:>12} {:>10} {:>5}",
        "mean of", "time (s)", "energy (Wh)", "co2 (g)", "runs"
    );
    for s in stats {
        println!(
            "{:<16} {:>12.6} {:>12.6} {:>10.4} {:>5}",
            s.algorithm_name, s.mean_time, s.mean_energy, s.mean_co2, s.sample_count
        );
    }
}

fn write_csvs(
    session: &Session,
    csv: Option<PathBuf>,
    stats_csv: Option<PathBuf>,
) -> Result<(), CliError> {
    if let Some(path) = csv {
        if let Some(written) = export_records(session.records(), Some(&path))
            .map_err(|e| ecosort_cli_error("exporting results", e))?
        {
            eprintln!("wrote {}", written.display());
        }
    }
    if let Some(path) = stats_csv {
        if let Some(written) = export_statistics(&session.statistics(), Some(&path))
            .map_err(|e| ecosort_cli_error("exporting statistics", e))?
        {
            eprintln!("wrote {}", written.display());
        }
    }
    Ok(())
}
