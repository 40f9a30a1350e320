use std::collections::HashSet;
use std::fs;

use gff2gff3::models::Attributes;
use gff2gff3::{convert_file, convert_lines, ConvertError, ConvertOptions, Warning};

fn column9(line: &str) -> &str {
    line.rsplit('\t').next().unwrap()
}

fn id_and_parent(line: &str) -> (Option<String>, Option<String>) {
    let attrs = Attributes::from_gff3(column9(line)).unwrap();
    (
        attrs.get("ID").map(|s| s.to_string()),
        attrs.get("Parent").map(|s| s.to_string()),
    )
}

fn feature_lines(lines: &[String]) -> Vec<&String> {
    lines.iter().filter(|l| !l.starts_with('#')).collect()
}

#[test]
fn gene_and_exon_without_transcript() {
    let conversion = convert_lines(
        vec![
            "chr1\tGMC\tgene\t100\t500\t.\t+\t.\tgene_id \"g1\";",
            "chr1\tGMC\texon\t100\t200\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";",
        ],
        &ConvertOptions::default(),
    )
    .unwrap();

    assert_eq!(conversion.lines[0], "##gff-version 3");
    let gene = conversion.lines.iter().position(|l| l.contains("ID=gene1")).unwrap();
    let exon = conversion
        .lines
        .iter()
        .position(|l| l.contains("ID=exon1;Parent=gene1"))
        .unwrap();
    assert!(gene < exon);
    assert!(conversion.warnings.is_empty());
}

#[test]
fn invalid_coordinates_abort_the_file() {
    let err = convert_file("tests/data/invalid_coordinates.gff", &ConvertOptions::default())
        .unwrap_err();
    match err {
        ConvertError::InvalidCoordinate { line, start, end, .. } => {
            assert_eq!(line, 2);
            assert_eq!(start, "4200");
            assert_eq!(end, "500");
        }
        _ => panic!("expected InvalidCoordinate, got {:?}", err),
    }

    let err = convert_lines(
        vec!["chr1\tGMC\tgene\t500\t100\t.\t+\t.\tgene_id \"g1\";"],
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::InvalidCoordinate { line: 1, .. }));
}

#[test]
fn malformed_line_abort_the_file() {
    let err = convert_lines(
        vec![
            "chr1\tGMC\tgene\t100\t500\t.\t+\t.\tgene_id \"g1\";",
            "chr1\tGMC\tgene\t100\t500",
        ],
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::MalformedLine { line: 2, .. }));
}

#[test]
fn exon_without_keys_is_promoted() {
    let conversion = convert_lines(
        vec!["chr1\tGMC\texon\t100\t200\t.\t+\t.\tnote \"no keys\";"],
        &ConvertOptions::default(),
    )
    .unwrap();
    assert_eq!(
        conversion.lines[1],
        "chr1\tGMC\texon\t100\t200\t.\t+\t.\tID=exon1;note=no keys"
    );
    assert_eq!(conversion.warnings.len(), 1);
    match &conversion.warnings[0] {
        Warning::OrphanFeature {
            feature_type,
            attributes,
            promoted_to,
            ..
        } => {
            assert_eq!(feature_type, "exon");
            assert_eq!(attributes.get("note"), Some("no keys"));
            assert!(promoted_to.is_none());
        }
        w => panic!("unexpected warning {:?}", w),
    }
}

#[test]
fn semicolons_in_values_are_encoded() {
    let conversion = convert_lines(
        vec!["chr1\tGMC\tgene\t100\t500\t.\t+\t.\tgene_id \"g1\"; note \"contains; semicolon\";"],
        &ConvertOptions::default(),
    )
    .unwrap();
    let col = column9(&conversion.lines[1]);
    assert_eq!(col, "ID=gene1;gene_id=g1;note=contains%3B semicolon");
    for pair in col.split(';') {
        assert_eq!(pair.matches('=').count(), 1, "{} is not a key=value pair", pair);
    }
    let attrs = Attributes::from_gff3(col).unwrap();
    assert_eq!(attrs.get("note"), Some("contains; semicolon"));
}

#[test]
fn gmc_example_file() {
    let conversion = convert_file("tests/data/gmc_example.gff", &ConvertOptions::default()).unwrap();
    let features = feature_lines(&conversion.lines);
    assert_eq!(features.len(), 17);
    assert_eq!(conversion.warnings.len(), 5);

    let ids: Vec<String> = features
        .iter()
        .map(|l| id_and_parent(l).0.unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            "gene1", "mRNA1", "exon1", "CDS1", "exon2", "CDS2", "exon3", "CDS3", "mRNA2", "exon4",
            "exon5", "mRNA3", "exon6", "CDS4", "exon7", "CDS5", "exon8",
        ]
    );

    // the synthetic transcript spans its exons
    let synthetic = features[11];
    assert_eq!(
        synthetic.as_str(),
        "contig7\tGMC\tmRNA\t6000\t7300\t.\t-\t.\tID=mRNA3;gene_id=CG5678;transcript_id=CG5678-RA"
    );
    assert!(features[16].starts_with("contig9\tGMC\texon\t100\t300\t95.5\t+\t.\tID=exon8;"));
}

#[test]
fn every_parent_is_defined_before_use() {
    let conversion = convert_file("tests/data/gmc_example.gff", &ConvertOptions::default()).unwrap();
    let mut seen: HashSet<String> = HashSet::new();
    for line in feature_lines(&conversion.lines) {
        let (id, parent) = id_and_parent(line);
        if let Some(parent) = parent {
            assert!(seen.contains(&parent), "Parent {} used before definition", parent);
        }
        assert!(seen.insert(id.unwrap()), "duplicate ID in {}", line);
    }
}

#[test]
fn sibling_order_is_preserved() {
    let conversion = convert_file("tests/data/gmc_example.gff", &ConvertOptions::default()).unwrap();
    let starts_under = |parent: &str| -> Vec<u64> {
        feature_lines(&conversion.lines)
            .into_iter()
            .filter(|l| id_and_parent(l).1.as_deref() == Some(parent))
            .map(|l| l.split('\t').nth(3).unwrap().parse().unwrap())
            .collect()
    };
    assert_eq!(starts_under("mRNA1"), vec![500, 650, 1500, 1500, 3800, 3800]);
    assert_eq!(starts_under("mRNA2"), vec![500, 3800]);
    assert_eq!(starts_under("gene1"), vec![500, 500]);
}

#[test]
fn legacy_attributes_survive() {
    let conversion = convert_file("tests/data/gmc_example.gff", &ConvertOptions::default()).unwrap();
    let exon2 = conversion
        .lines
        .iter()
        .find(|l| l.contains("ID=exon2;"))
        .unwrap();
    let attrs = Attributes::from_gff3(column9(exon2)).unwrap();
    assert_eq!(attrs.get("Parent"), Some("mRNA1"));
    assert_eq!(attrs.get("gene_id"), Some("CG1234"));
    assert_eq!(attrs.get("transcript_id"), Some("CG1234-RA"));
    assert_eq!(attrs.get("note"), Some("exon 2; extended"));
}

#[test]
fn output_file_round_trip() {
    let conversion = convert_file("tests/data/gmc_example.gff", &ConvertOptions::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gmc_example.gff3");
    conversion.write_to(fs::File::create(&path).unwrap()).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("##gff-version 3\n"));
    assert!(written.ends_with('\n'));
    assert!(!written.ends_with("\n\n"));
    assert_eq!(written.lines().count(), conversion.lines.len());
}

#[test]
fn options_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.json");
    fs::write(&path, r#"{"sequence_region": true, "source": "GEP"}"#).unwrap();
    let options = ConvertOptions::from_json_file(&path).unwrap();
    assert!(options.adjacency_grouping);

    let conversion = convert_file("tests/data/gmc_example.gff", &options).unwrap();
    assert_eq!(conversion.lines[1], "##sequence-region contig7 500 7300");
    assert_eq!(conversion.lines[2], "##sequence-region contig9 100 300");
    assert!(feature_lines(&conversion.lines)
        .iter()
        .all(|l| l.split('\t').nth(1) == Some("GEP")));

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        ConvertOptions::from_json_file(&path),
        Err(ConvertError::Config(_))
    ));
}

#[test]
fn independent_conversions_do_not_share_counters() {
    let first = convert_file("tests/data/gmc_example.gff", &ConvertOptions::default()).unwrap();
    let second = convert_file("tests/data/gmc_example.gff", &ConvertOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn transcript_ids_shared_by_two_genes() {
    let conversion = convert_lines(
        vec![
            "chr1\tGMC\tgene\t100\t500\t.\t+\t.\tgene_id \"g1\";",
            "chr1\tGMC\tmRNA\t100\t500\t.\t+\t.\tgene_id \"g1\"; transcript_id \"1\";",
            "chr1\tGMC\texon\t100\t200\t.\t+\t.\tgene_id \"g1\"; transcript_id \"1\";",
            "chr1\tGMC\tgene\t9000\t9500\t.\t+\t.\tgene_id \"g2\";",
            "chr1\tGMC\tmRNA\t9000\t9500\t.\t+\t.\tgene_id \"g2\"; transcript_id \"1\";",
            "chr1\tGMC\texon\t9000\t9100\t.\t+\t.\tgene_id \"g2\"; transcript_id \"1\";",
        ],
        &ConvertOptions::default(),
    )
    .unwrap();
    let links: Vec<(Option<String>, Option<String>)> = feature_lines(&conversion.lines)
        .into_iter()
        .map(|l| id_and_parent(l))
        .collect();
    let expected = [
        ("gene1", None),
        ("mRNA1", Some("gene1")),
        ("exon1", Some("mRNA1")),
        ("gene2", None),
        ("mRNA2", Some("gene2")),
        ("exon2", Some("mRNA2")),
    ];
    assert_eq!(
        links,
        expected
            .iter()
            .map(|(id, parent)| (Some(id.to_string()), parent.map(|p| p.to_string())))
            .collect::<Vec<_>>()
    );
}

#[test]
fn transcripts_only_layout() {
    let options = ConvertOptions {
        transcripts_only: true,
        ..ConvertOptions::default()
    };
    let conversion = convert_file("tests/data/gmc_example.gff", &options).unwrap();
    let features = feature_lines(&conversion.lines);
    let types: Vec<&str> = features.iter().map(|l| l.split('\t').nth(2).unwrap()).collect();
    assert_eq!(
        types,
        vec![
            "mRNA", "exon", "CDS", "exon", "CDS", "exon", "CDS", "mRNA", "exon", "exon", "mRNA",
            "exon", "CDS", "exon", "CDS",
        ]
    );
    for line in &features {
        let (_, parent) = id_and_parent(line);
        let is_mrna = line.split('\t').nth(2) == Some("mRNA");
        assert_eq!(parent.is_none(), is_mrna, "{}", line);
    }
}
