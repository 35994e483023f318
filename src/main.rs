use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use survey_correlate::data::{loader, writer};
use survey_correlate::heatmap::save_heatmap;
use survey_correlate::normalize::NormalizationReport;
use survey_correlate::{AnalysisConfig, AnalysisReport, RatingScale, SurveyAnalysis};

#[derive(Parser)]
#[command(name = "survey-correlate")]
#[command(version)]
#[command(about = "Clean survey ratings and report significant correlations", long_about = None)]
struct Cli {
    /// Survey table (.csv, .json or .parquet)
    input: PathBuf,

    /// Print the column names of the input and exit
    #[arg(long)]
    list_columns: bool,

    /// Rating questions to analyze, comma separated or repeated
    #[arg(short, long = "columns", value_delimiter = ',')]
    columns: Vec<String>,

    /// Directory receiving all output files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// File name of the cleaned table; the extension picks the format
    #[arg(long, default_value = "cleaned_data.csv")]
    cleaned_name: String,

    /// Lowest valid rating
    #[arg(long, default_value_t = 1.0)]
    scale_min: f64,

    /// Highest valid rating
    #[arg(long, default_value_t = 10.0)]
    scale_max: f64,

    /// Significance level for the p-value
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,

    /// Smallest absolute correlation worth reporting
    #[arg(long, default_value_t = 0.2)]
    min_r: f64,

    /// Skip rendering the heatmap
    #[arg(long)]
    no_heatmap: bool,
}

impl Cli {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            scale: RatingScale {
                min: self.scale_min,
                max: self.scale_max,
            },
            min_abs_correlation: self.min_r,
            significance_level: self.alpha,
            ..AnalysisConfig::default()
        }
    }

    fn selected_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut dataset = loader::load_file(&cli.input)?;

    if cli.list_columns {
        println!("Columns in {}:", cli.input.display());
        for (i, name) in dataset.column_names.iter().enumerate() {
            println!("  {i:>3}  {name}");
        }
        return Ok(());
    }

    let columns = cli.selected_columns();
    if columns.is_empty() {
        bail!("no columns selected; pass --columns (see --list-columns)");
    }

    let report = SurveyAnalysis::new(cli.config()).run(&mut dataset, &columns)?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;
    let out = |name: &str| cli.output_dir.join(name);

    writer::write_dataset(&out(&cli.cleaned_name), &dataset)?;
    writer::write_matrix_csv(&out("correlation_matrix.csv"), &report.correlations.coefficients)?;
    writer::write_matrix_csv(&out("p_value_matrix.csv"), &report.correlations.p_values)?;
    writer::write_summary(&out("correlation_summary.txt"), &report.summary)?;
    if !cli.no_heatmap {
        save_heatmap(&report.correlations.coefficients, &out("correlation_heatmap.png"))?;
    }

    print_report(&report)?;
    println!("\nResults written to {}", cli.output_dir.display());
    Ok(())
}

fn print_cleaning(report: &NormalizationReport) {
    println!("=== Cleaning ===");
    for col in &report.columns {
        println!(
            "{}: {} ratings kept, {} missing ({} empty, {} without a number, {} out of range)",
            col.column,
            col.kept,
            col.missing_after(),
            col.was_missing,
            col.unparseable,
            col.out_of_range
        );
    }
}

fn print_report(report: &AnalysisReport) -> Result<()> {
    print_cleaning(&report.normalization);

    println!("\n=== Correlation matrix ===");
    println!("{}", writer::format_matrix(&report.correlations.coefficients)?);
    println!("\n=== P-value matrix ===");
    println!("{}", writer::format_matrix(&report.correlations.p_values)?);
    println!("\n=== Paired responses ===");
    println!(
        "{}",
        writer::format_counts(report.correlations.columns(), &report.correlations.paired_rows)?
    );

    println!("\n=== Summary ===");
    if report.summary.is_empty() {
        println!("No significant correlations found.");
    } else {
        print!("{}", report.summary.render());
    }
    Ok(())
}
