use std::io::Write;
use std::process::exit;

use anyhow::anyhow;
use anyhow::Result;
use clap::ArgAction;
use clap::Parser;
use colored::*;
use env_logger::Builder;
use log::info;

use sparsefold::energy::Dangles;
use sparsefold::energy::EnergyParams;
use sparsefold::energy::NucleotideVec;
use sparsefold::fold::SparseFold;
use sparsefold::fold::Statistics;
use sparsefold::fold::INF;
use sparsefold::pseudoknot::alt_restrictions;
use sparsefold::pseudoknot::overlay;
use sparsefold::read_sequence_input;
use sparsefold::structure::Restriction;

#[derive(Debug, Parser)]
#[command(name = "sparsefold")]
#[command(author, version)]
#[command(about = "Time- and space-efficient sparsified minimum free energy folding of RNAs")]
pub struct Cli {
    /// RNA sequence; read from standard input when absent
    #[arg(value_name = "SEQUENCE")]
    pub sequence: Option<String>,

    /// Print trace arrow and candidate statistics (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Mark candidate base pairs with { } instead of ( )
    #[arg(short, long)]
    pub mark_candidates: bool,

    /// Restriction structure of the same length as the sequence
    #[arg(short = 'r', long = "input-structure", value_name = "STRUCTURE")]
    pub input_structure: Option<String>,

    /// Dangling end model (1 or 2)
    #[arg(short, long, default_value_t = 2, value_name = "N")]
    pub dangles: u8,

    /// Fold both pseudoknot planes and overlay the results
    #[arg(short, long)]
    pub pseudoknot: bool,

    /// Disable trace arrow garbage collection and candidate list shrinking
    #[arg(long = "noGC")]
    pub no_gc: bool,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            // no prefix, just the message
            writeln!(buf, "{}", record.args())
        })
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                print!("{}", e);
                exit(0);
            }
            eprintln!("{}", e);
            exit(1);
        }
    };
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "ERROR:".red(), e);
        exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let dangles = Dangles::try_from(cli.dangles)
        .map_err(|d| anyhow!("unsupported dangle model '{}' (supported: 1, 2)", d))?;

    let input = read_sequence_input(cli.sequence.clone())?;
    let seq = NucleotideVec::try_from(input.as_str())?;
    let n = seq.len();

    let restricted = match &cli.input_structure {
        Some(s) => s.clone(),
        None => ".".repeat(n),
    };
    if restricted.chars().count() != n {
        return Err(anyhow!("input sequence and structure are not the same size"));
    }

    let params = EnergyParams::turner2004();
    let garbage_collect = !cli.no_gc;
    info!(
        "folding {} nt with dangle model {:?}, garbage collection {}",
        n, dangles, garbage_collect
    );

    println!("{}", seq);

    let (mfe, structure, stats) = if cli.pseudoknot {
        fold_two_planes(&seq, &params, &restricted, dangles, garbage_collect, cli.mark_candidates)?
    } else {
        let restriction = Restriction::parse(&restricted)?;
        let mut folder = SparseFold::new(&seq, &params, restriction, dangles, garbage_collect)?;
        let mfe = folder.fold();
        if mfe >= INF {
            return Err(anyhow!("the restriction admits no structure"));
        }
        let structure = folder.trace_back(cli.mark_candidates);
        (mfe, structure, folder.statistics())
    };

    println!(
        "{} ({})",
        structure,
        format!("{:.2}", mfe as f64 / 100.0).green()
    );

    if cli.verbose > 0 {
        println!();
        println!("TA cnt:\t{}", stats.arrows);
        println!("TA max:\t{}", stats.arrows_max);
        println!("TA av:\t{}", stats.arrows_avoided);
        println!("TA rm:\t{}", stats.arrows_erased);
        println!();
        println!("Can num:\t{}", stats.candidates);
        println!("Can cap:\t{}", stats.candidates_capacity);
        println!("TAs num:\t{}", stats.arrows);
        println!("TAs cap:\t{}", stats.arrows_capacity);
    }

    Ok(())
}

/// Fold the two pseudoknot planes under complementary restrictions and
/// overlay the results; the combined energy is the sum of both folds.
fn fold_two_planes(
    seq: &NucleotideVec,
    params: &EnergyParams,
    restricted: &str,
    dangles: Dangles,
    garbage_collect: bool,
    mark_candidates: bool,
) -> Result<(i32, String, Statistics)> {
    let (alt1, alt2) = alt_restrictions(restricted);

    let mut folder = SparseFold::new(
        seq,
        params,
        Restriction::parse(&alt1)?,
        dangles,
        garbage_collect,
    )?;
    let mfe1 = folder.fold();
    if mfe1 >= INF {
        return Err(anyhow!("the restriction admits no structure"));
    }

    folder.reset();
    folder.set_restriction(Restriction::parse(&alt2)?)?;
    let mfe2 = folder.fold();
    if mfe2 >= INF {
        return Err(anyhow!("the restriction admits no structure"));
    }
    let second = folder.trace_back(mark_candidates);

    Ok((mfe1 + mfe2, overlay(&second, restricted), folder.statistics()))
}
