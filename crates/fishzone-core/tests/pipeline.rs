use std::fs;
use std::path::PathBuf;

use fishzone_core::{load_and_train, DatasetError, HeatmapWeight, PipelineError, TrainParams, Zone};

const HEADER: &str = "scientific_name,latitude,longitude,state,water_type,season,gear_type,\
sea_surface_temp_C,chlorophyll_mg_m3,depth_m,min_legal_size_cm,juvenile_range_cm,\
economic_value_in_INR_per_kg,seasonal_disease,zone_label,river_name";

/// Eight rows per zone spread over two states; Red rows carry every risk
/// indicator, Green rows none.
fn sample_csv() -> String {
    let mut lines = vec![HEADER.to_string()];
    for i in 0..8 {
        let state = if i % 2 == 0 { "Kerala" } else { "Goa" };
        let lat = 9.0 + i as f64 * 0.1;
        lines.push(format!(
            "Scomberomorus commerson,{lat},76.0,{state},Marine,Winter,Hook and Line,28,0.8,{},30,35-60,720,,Green,",
            60 + i
        ));
        lines.push(format!(
            "Rastrelliger kanagurta,{lat},75.5,{state},Marine,Monsoon,Gillnet,29,2.6,{},14,8-12,180,,Yellow,",
            28 - i
        ));
        lines.push(format!(
            "Penaeus monodon,{lat},76.3,{state},Brackish,Post-Monsoon,Trawl,30,3.8,{},12,3-8,750,White spot,Red,Vembanad",
            5 + i
        ));
    }
    lines.join("\n")
}

fn write_csv(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("fisheries.csv");
    fs::write(&path, contents).unwrap();
    path
}

fn params() -> TrainParams {
    TrainParams { n_estimators: 40, ..Default::default() }
}

#[test]
fn trains_and_serves_state_queries() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, &sample_csv());
    let ctx = load_and_train(&path, &params()).unwrap();

    assert_eq!(ctx.table().len(), 24);
    let eval = ctx.evaluation();
    assert_eq!(eval.n_train + eval.n_test, 24);
    assert_eq!(eval.labels, [Zone::Green, Zone::Yellow, Zone::Red]);
    let cm_total: usize = eval.confusion_matrix.iter().flatten().sum();
    assert_eq!(cm_total, eval.n_test);

    let advisories = ctx.advisories_for_state("kerala", Some("Periyar"));
    assert_eq!(advisories.len(), 12);
    for adv in &advisories {
        assert_eq!(adv.river_name.as_deref(), Some("Periyar"));
        let last = adv.risk_factors.last().unwrap();
        assert!(last.starts_with("Model confidence for "), "{last}");
    }

    assert!(ctx.advisories_for_state("Odisha", None).is_empty());

    let points = ctx.heatmap_points("Goa", None, HeatmapWeight::Depth);
    assert_eq!(points.len(), 12);
    assert!(points.iter().all(|p| p.value > 0.0));

    assert_eq!(ctx.available_states(), vec!["Goa", "Kerala"]);
    assert_eq!(ctx.available_rivers(None), vec!["Vembanad"]);
}

#[test]
fn fully_risky_records_are_red() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, &sample_csv());
    let ctx = load_and_train(&path, &params()).unwrap();

    let reds: Vec<_> = ctx
        .advisories_for_state("Goa", None)
        .into_iter()
        .filter(|a| a.species == "Penaeus monodon")
        .collect();
    assert_eq!(reds.len(), 4);
    for adv in reds {
        assert_eq!(adv.zone, Zone::Red);
        assert!(adv.risk_factors.contains(&"Seasonal disease reported: White spot.".to_string()));
        assert!(adv.economic_note.starts_with("Species has very high economic value"));
    }
}

#[test]
fn same_seed_gives_same_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, &sample_csv());
    let a = load_and_train(&path, &params()).unwrap();
    let b = load_and_train(&path, &params()).unwrap();
    assert_eq!(a.evaluation(), b.evaluation());
    assert_eq!(a.model(), b.model());
}

#[test]
fn missing_file_and_column_are_hard_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_and_train(dir.path().join("absent.csv"), &params()).unwrap_err();
    assert!(matches!(err, PipelineError::Dataset(DatasetError::NotFound(_))));

    let without_depth = sample_csv().replace("depth_m", "depth_ft");
    let path = write_csv(&dir, &without_depth);
    let err = load_and_train(&path, &params()).unwrap_err();
    match err {
        PipelineError::Dataset(DatasetError::MissingColumn(col)) => assert_eq!(col, "depth_m"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn single_zone_dataset_cannot_train() {
    let dir = tempfile::tempdir().unwrap();
    let csv = sample_csv();
    let only_green: Vec<&str> = csv.lines().filter(|l| !l.contains(",Yellow,") && !l.contains(",Red,")).collect();
    let path = write_csv(&dir, &only_green.join("\n"));
    let err = load_and_train(&path, &params()).unwrap_err();
    assert!(matches!(err, PipelineError::Classifier(_)));
}
