use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use log::{debug, warn, LevelFilter};
use rayon::prelude::*;

use gff2gff3::{convert_file, Conversion, ConvertOptions};

const INPUT_EXT: &str = "gff";
const OUTPUT_EXT: &str = "gff3";

#[derive(Parser, Debug)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    /// GFF2 files to convert
    files: Vec<PathBuf>,

    /// Convert every *.gff file in this directory
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory for the GFF3 files [default: next to the input file]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// JSON file with conversion options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write ##sequence-region directives
    #[arg(long)]
    sequence_region: bool,

    /// Write ### after every gene
    #[arg(long)]
    resolution_directive: bool,

    /// Replace the source column of all features
    #[arg(long)]
    source: Option<String>,

    /// Write only mRNAs with their exons and CDS, without gene records
    #[arg(long)]
    transcripts_only: bool,

    /// Do not group features without gene_id/transcript_id by position
    #[arg(long)]
    no_adjacency: bool,

    /// Number of files converted in parallel [default: all cores]
    #[arg(short, long)]
    threads: Option<usize>,

    /// Log progress to stderr (RUST_LOG overrides this)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> anyhow::Result<ConvertOptions> {
        let mut options = match &self.config {
            Some(path) => ConvertOptions::from_json_file(path)?,
            None => ConvertOptions::default(),
        };
        if self.sequence_region {
            options.sequence_region = true;
        }
        if self.resolution_directive {
            options.resolution_directive = true;
        }
        if self.transcripts_only {
            options.transcripts_only = true;
        }
        if self.no_adjacency {
            options.adjacency_grouping = false;
        }
        if let Some(source) = &self.source {
            options.source = Some(source.clone());
        }
        Ok(options)
    }

    fn input_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = self.files.clone();
        if let Some(dir) = &self.input_dir {
            let mut found = vec![];
            for entry in fs::read_dir(dir).with_context(|| format!("Cannot read {}", dir.display()))? {
                let path = entry?.path();
                if path.is_file() && has_input_extension(&path) {
                    found.push(path);
                }
            }
            found.sort();
            files.extend(found);
        }
        Ok(unique_inputs(files, |input| self.output_path(input)))
    }

    fn output_path(&self, input: &Path) -> PathBuf {
        let out = input.with_extension(OUTPUT_EXT);
        match (&self.output_dir, out.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => out,
        }
    }
}

/// Drops repeated inputs and inputs that their own output would overwrite
fn unique_inputs<F>(files: Vec<PathBuf>, output_path: F) -> Vec<PathBuf>
where
    F: Fn(&Path) -> PathBuf,
{
    let mut seen = HashSet::new();
    let mut res = vec![];
    for file in files {
        let input = fs::canonicalize(&file).unwrap_or_else(|_| file.clone());
        if !seen.insert(input.clone()) {
            debug!("{} was given more than once", file.display());
            continue;
        }
        let output = output_path(&file);
        if output == file || fs::canonicalize(&output).ok().as_ref() == Some(&input) {
            warn!("Skipping {}, it would be overwritten by its output", file.display());
            continue;
        }
        res.push(file);
    }
    res
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(INPUT_EXT))
}

fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.filter_level(default_level(verbose)),
    };
    builder.init();
}

/// Converts one file and writes the output only if the conversion succeeded
fn convert_one(input: &Path, output: &Path, options: &ConvertOptions) -> anyhow::Result<Conversion> {
    let conversion = convert_file(input, options)?;
    let tmp = output.with_extension(format!("{}.tmp", OUTPUT_EXT));
    let written = fs::File::create(&tmp)
        .map_err(anyhow::Error::from)
        .and_then(|file| Ok(conversion.write_to(std::io::BufWriter::new(file))?))
        .and_then(|_| Ok(fs::rename(&tmp, output)?));
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err.context(format!("Cannot write {}", output.display())));
    }
    debug!("Wrote {}", output.display());
    Ok(conversion)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let options = cli.options()?;
    let files = cli.input_files()?;
    if files.is_empty() {
        match &cli.input_dir {
            Some(dir) => println!("No GFF2 files found in {}", dir.display()),
            None => println!("No input files given"),
        }
        return Ok(());
    }

    if let Some(dir) = &cli.output_dir {
        fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    }

    let results: Vec<(PathBuf, PathBuf, anyhow::Result<Conversion>)> = files
        .par_iter()
        .map(|input| {
            let output = cli.output_path(input);
            let res = convert_one(input, &output, &options);
            (input.clone(), output, res)
        })
        .collect();

    let mut failed = 0;
    for (input, output, res) in &results {
        println!("Converting {} → {}", input.display(), output.display());
        match res {
            Ok(conversion) => {
                for warning in &conversion.warnings {
                    println!("  warning: {}", warning);
                }
            }
            Err(err) => {
                failed += 1;
                eprintln!("  failed: {:#}", err);
            }
        }
    }

    println!(
        "Converted {} of {} files",
        results.len() - failed,
        results.len()
    );
    if failed > 0 {
        bail!("{} files could not be converted", failed);
    }
    Ok(())
}
