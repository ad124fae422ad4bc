use assert_cmd::Command;

mod common;

use common::{touch, write_file, write_subreadset, CURRENT_STS};

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("pbdataset").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("pbdataset").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("pbdataset 0.1.0\n");
}

#[test]
fn summarize_prints_dataset_tree() {
    let temp = tempfile::tempdir().unwrap();
    touch(&temp.path().join("m1.subreads.bam"));
    touch(&temp.path().join("m1.subreads.bam.pbi"));
    let xml = temp.path().join("m1.subreadset.xml");
    write_subreadset(&xml, "movie-1", &[("m1.subreads.bam", None)], 4);

    let mut cmd = Command::cargo_bin("pbdataset").unwrap();
    cmd.args(["summarize", "--kind", "subreadset"]).arg(&xml);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("SubreadSet (1 resource(s)"))
        .stdout(predicates::str::contains("name: movie-1"))
        .stdout(predicates::str::contains("records: 4"))
        .stdout(predicates::str::contains("index: "));
}

#[test]
fn summarize_json_output() {
    let temp = tempfile::tempdir().unwrap();
    let bam = temp.path().join("m1.subreads.bam");
    touch(&bam);

    let mut cmd = Command::cargo_bin("pbdataset").unwrap();
    cmd.args(["summarize", "--kind", "SubreadSet", "--output", "json"])
        .arg(&bam);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"kind\": \"SubreadSet\""))
        .stdout(predicates::str::contains("PacBio.SubreadFile.SubreadBamFile"));
}

#[test]
fn summarize_rejects_unknown_kind() {
    let mut cmd = Command::cargo_bin("pbdataset").unwrap();
    cmd.args(["summarize", "--kind", "NoSuchSet", "reads.bam"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Unknown dataset kind"));
}

#[test]
fn summarize_rejects_unknown_output_format() {
    let temp = tempfile::tempdir().unwrap();
    let bam = temp.path().join("m1.subreads.bam");
    touch(&bam);

    let mut cmd = Command::cargo_bin("pbdataset").unwrap();
    cmd.args(["summarize", "--output", "csv"]).arg(&bam);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Unsupported format"));
}

#[test]
fn metadata_command_prints_record() {
    let temp = tempfile::tempdir().unwrap();
    let xml = temp.path().join("set.xml");
    write_subreadset(&xml, "m1", &[("m1.subreads.bam", None)], 9);

    let mut cmd = Command::cargo_bin("pbdataset").unwrap();
    cmd.args(["metadata", "--output", "yaml"]).arg(&xml);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("tag: DataSetMetadata"))
        .stdout(predicates::str::contains("NumRecords"));
}

#[test]
fn metadata_command_fails_without_metadata() {
    let temp = tempfile::tempdir().unwrap();
    let xml = temp.path().join("empty.xml");
    write_file(&xml, "<SubreadSet/>");

    let mut cmd = Command::cargo_bin("pbdataset").unwrap();
    cmd.arg("metadata").arg(&xml);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Unable to parse metadata from"));
}

#[test]
fn stats_command_prints_summary_stats() {
    let temp = tempfile::tempdir().unwrap();
    let sts = temp.path().join("m1.sts.xml");
    write_file(&sts, CURRENT_STS);

    let mut cmd = Command::cargo_bin("pbdataset").unwrap();
    cmd.arg("stats").arg(&sts);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"tag\": \"SummaryStats\""))
        .stdout(predicates::str::contains("ReadLenDist"));
}

#[test]
fn summarize_infers_kind_from_xml_root() {
    let temp = tempfile::tempdir().unwrap();
    touch(&temp.path().join("m1.subreads.bam"));
    let xml = temp.path().join("m1.subreadset.xml");
    write_subreadset(&xml, "movie-1", &[("m1.subreads.bam", None)], 1);

    let mut cmd = Command::cargo_bin("pbdataset").unwrap();
    cmd.args(["summarize", "--no-stats"]).arg(&xml);
    cmd.assert()
        .success()
        .stdout(predicates::str::starts_with("SubreadSet (1 resource(s)"));
}
