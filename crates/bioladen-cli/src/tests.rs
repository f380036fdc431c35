use super::*;

fn run_args(argv: &[&str]) -> RunArgs {
    let cli = Cli::try_parse_from(argv).expect("expected valid cli args");
    match cli.command {
        Commands::Run(args) => args,
        Commands::Extract { .. } => panic!("expected run command"),
    }
}

#[test]
fn run_without_flags_uses_defaults() {
    let args = run_args(&["bioladen", "run"]);
    assert!(args.input.is_none());
    assert!(args.postal_codes.is_empty());
    assert!(!args.headed);

    let input = search::build_run_input(&args).unwrap();
    assert_eq!(input.postal_codes, vec!["20095"]);
    assert!((input.radius_km - 25.0).abs() < f64::EPSILON);
    assert_eq!(input.deduplicate_by, DedupMode::DetailUrl);
    assert_eq!(input.max_concurrency, 1);
}

#[test]
fn repeated_postal_codes_and_overrides() {
    let args = run_args(&[
        "bioladen",
        "run",
        "--postal-code",
        "10115",
        "--postal-code",
        "80331",
        "--radius-km",
        "10",
        "--dedup-by",
        "composite",
        "--max-concurrency",
        "3",
        "--headed",
    ]);
    assert!(args.headed);

    let input = search::build_run_input(&args).unwrap();
    assert_eq!(input.postal_codes, vec!["10115", "80331"]);
    assert!((input.radius_km - 10.0).abs() < f64::EPSILON);
    assert_eq!(input.deduplicate_by, DedupMode::Composite);
    assert_eq!(input.max_concurrency, 3);
}

#[test]
fn unknown_dedup_mode_is_rejected() {
    assert!(Cli::try_parse_from(["bioladen", "run", "--dedup-by", "name"]).is_err());
}

#[test]
fn zero_concurrency_fails_validation() {
    let args = run_args(&["bioladen", "run", "--max-concurrency", "0"]);
    assert!(search::build_run_input(&args).is_err());
}

#[test]
fn input_file_is_overridden_by_flags() {
    let dir = std::env::temp_dir().join(format!("bioladen-cli-input-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("input.yaml");
    std::fs::write(
        &path,
        "postalCodes: [20095, \"22767\"]\nradiusKm: 50\nfilters:\n  lieferservice: false\n",
    )
    .unwrap();

    let args = run_args(&[
        "bioladen",
        "run",
        "--input",
        path.to_str().unwrap(),
        "--radius-km",
        "5",
    ]);
    let input = search::build_run_input(&args).unwrap();

    assert_eq!(input.postal_codes, vec!["20095", "22767"]);
    assert!((input.radius_km - 5.0).abs() < f64::EPSILON);
    assert!(input.filters.biolaeden);
    assert!(!input.filters.lieferservice);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn extract_takes_file_and_page_url() {
    let cli = Cli::try_parse_from([
        "bioladen",
        "extract",
        "saved.html",
        "--page-url",
        "https://www.bioladen.de/bio-haendler-suche?plz=20095",
    ])
    .unwrap();
    match cli.command {
        Commands::Extract { html, page_url } => {
            assert_eq!(html, PathBuf::from("saved.html"));
            assert!(page_url.ends_with("plz=20095"));
        }
        Commands::Run(_) => panic!("expected extract command"),
    }
}

#[test]
fn extract_defaults_page_url_to_search_page() {
    let cli = Cli::try_parse_from(["bioladen", "extract", "saved.html"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Extract { ref page_url, .. } if page_url == DEFAULT_START_URL
    ));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["bioladen"]).is_err());
}
