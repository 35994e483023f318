//! End-to-end tests: load a survey file, analyze it, write every artifact.

use std::fs;
use std::path::Path;

use survey_correlate::data::{loader, writer};
use survey_correlate::heatmap::save_heatmap;
use survey_correlate::{CellValue, SurveyAnalysis, SurveyError};

const SURVEY_CSV: &str = "\
Respondent,Team,Q1,Q2,Q3,Q4
r1,Red,High-10,9,1,5
r2,Blue,8,Agree 8,3,5
r3,Red,N/A,7,4,5
r4,Blue,6,six,5,5
r5,Red,4,4 out of 10,7,5
r6,Blue,Low-2,2,9,5
r7,Red,15,3,8,
";

fn write_input(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("survey.csv");
    fs::write(&path, SURVEY_CSV).unwrap();
    path
}

#[test]
fn test_csv_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());

    let mut dataset = loader::load_file(&input).unwrap();
    assert_eq!(dataset.column_names, vec!["Respondent", "Team", "Q1", "Q2", "Q3", "Q4"]);

    let report = SurveyAnalysis::default()
        .run(&mut dataset, &["Q1", "Q2", "Q3", "Q4"])
        .unwrap();

    // Range invariant on every selected column.
    for name in ["Q1", "Q2", "Q3", "Q4"] {
        let idx = dataset.column_index(name).unwrap();
        for cell in dataset.column(idx) {
            match cell {
                CellValue::Null => {}
                CellValue::Float(v) => assert!((1.0..=10.0).contains(v)),
                other => panic!("{name}: unexpected cell {other:?}"),
            }
        }
    }
    // "15" is out of range, "N/A" has no digits.
    let q1 = dataset.column_index("Q1").unwrap();
    assert_eq!(dataset.responses[6].cells[q1], CellValue::Null);
    assert_eq!(dataset.responses[2].cells[q1], CellValue::Null);
    assert_eq!(dataset.responses[0].cells[q1], CellValue::Float(10.0));
    // Unselected text column untouched.
    assert_eq!(dataset.responses[0].cells[1], CellValue::Text("Red".into()));

    let corr = &report.correlations;
    // Matrix order follows the selection: Q1, Q2, Q3, Q4.
    assert_eq!(corr.columns(), &["Q1", "Q2", "Q3", "Q4"]);
    // Q4 is constant: undefined against everything else.
    assert_eq!(corr.coefficients.at(0, 3), None);
    assert_eq!(corr.p_values.at(3, 2), None);
    assert_eq!(corr.coefficients.at(3, 3), Some(1.0));
    assert_eq!(corr.p_values.at(3, 3), Some(0.0));

    // Q1 and Q3 move in opposite directions.
    let r13 = corr.coefficients.at(0, 2).unwrap();
    assert!(r13 < -0.9, "r = {r13}");
    assert_eq!(Some(r13), corr.coefficients.at(2, 0));

    // Every reported finding clears both thresholds; every qualifying pair is
    // reported.
    let findings: Vec<_> = report.summary.findings().collect();
    for f in &findings {
        assert!(f.coefficient.abs() >= 0.2 && f.p_value < 0.05);
    }
    let columns = corr.columns();
    for (i, a) in columns.iter().enumerate() {
        for (j, b) in columns.iter().enumerate() {
            if i == j {
                continue;
            }
            let qualifies = matches!(
                (corr.coefficients.at(i, j), corr.p_values.at(i, j)),
                (Some(r), Some(p)) if r.abs() >= 0.2 && p < 0.05
            );
            let reported = findings.iter().any(|f| &f.column == a && &f.other == b);
            assert_eq!(qualifies, reported, "{a} vs {b}");
        }
    }
    assert!(!report.summary.render().contains("### Q4:"));

    // Artifacts.
    let out = dir.path();
    writer::write_dataset(&out.join("cleaned_data.csv"), &dataset).unwrap();
    writer::write_matrix_csv(&out.join("correlation_matrix.csv"), &corr.coefficients).unwrap();
    writer::write_matrix_csv(&out.join("p_value_matrix.csv"), &corr.p_values).unwrap();
    writer::write_summary(&out.join("correlation_summary.txt"), &report.summary).unwrap();
    save_heatmap(&corr.coefficients, &out.join("correlation_heatmap.png")).unwrap();

    let cleaned = loader::load_file(&out.join("cleaned_data.csv")).unwrap();
    assert_eq!(cleaned.column_names, dataset.column_names);
    assert_eq!(cleaned.len(), dataset.len());
    assert_eq!(cleaned.responses[0].cells[0], CellValue::Text("r1".into()));

    let matrix_csv = fs::read_to_string(out.join("correlation_matrix.csv")).unwrap();
    let first_line = matrix_csv.lines().next().unwrap();
    assert_eq!(first_line, "column,Q1,Q2,Q3,Q4");
    assert!(matrix_csv.contains("Q4,,,,1"));

    let summary = fs::read_to_string(out.join("correlation_summary.txt")).unwrap();
    assert_eq!(summary, report.summary.render());
    assert!(out.join("correlation_heatmap.png").exists());
}

#[test]
fn test_unknown_column_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut dataset = loader::load_file(&write_input(dir.path())).unwrap();

    let err = SurveyAnalysis::default()
        .run(&mut dataset, &["Q1", "Q9"])
        .unwrap_err();
    assert_eq!(
        err,
        SurveyError::UnknownColumns {
            missing: vec!["Q9".into()],
            available: ["Respondent", "Team", "Q1", "Q2", "Q3", "Q4"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    );
}

#[test]
fn test_json_and_parquet_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut dataset = loader::load_file(&write_input(dir.path())).unwrap();
    SurveyAnalysis::default()
        .run(&mut dataset, &["Q1", "Q2"])
        .unwrap();

    for name in ["cleaned.json", "cleaned.parquet"] {
        let path = dir.path().join(name);
        writer::write_dataset(&path, &dataset).unwrap();
        let reloaded = loader::load_file(&path).unwrap();
        assert_eq!(reloaded.column_names, dataset.column_names, "{name}");
        let q1 = reloaded.column_index("Q1").unwrap();
        let values: Vec<Option<f64>> = reloaded.column(q1).map(CellValue::as_f64).collect();
        assert_eq!(
            values,
            vec![Some(10.0), Some(8.0), None, Some(6.0), Some(4.0), Some(2.0), None],
            "{name}"
        );
    }
}

#[test]
fn test_unselected_columns_written_back_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("zips.csv");
    fs::write(
        &input,
        "Name,Zip,Q1,Q2\nInfinity,02139,1,2\nNan,00501,2,4\nTrue,1e3,3,High-6\n",
    )
    .unwrap();

    let mut dataset = loader::load_file(&input).unwrap();
    SurveyAnalysis::default()
        .run(&mut dataset, &["Q1", "Q2"])
        .unwrap();

    let output = dir.path().join("cleaned.csv");
    writer::write_dataset(&output, &dataset).unwrap();
    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "Name,Zip,Q1,Q2\nInfinity,02139,1,2\nNan,00501,2,4\nTrue,1e3,3,6\n"
    );
}
