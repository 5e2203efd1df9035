use std::sync::Arc;

use tempfile::tempdir;

use super::*;
use crate::constants::MSG_VOTERS_FAILED;
use crate::constants::VOTER_CSV_FILE_NAME;
use crate::test_utils::voter;
use crate::test_utils::FakeBackend;
use crate::ElectionStatus;
use crate::ErrorCode;
use crate::PemiraApi;
use crate::Voter;

fn roll() -> VoterRoll {
    VoterRoll::new(vec![
        voter("Maria", "1001"),
        Voter {
            name: "Simanjuntak, Yosua".into(),
            student_id: "1002".into(),
            department: "Teknik \"Sipil\"".into(),
            cohort: "2021".into(),
        },
        voter("Paulus", "2001"),
    ])
}

#[test]
fn test_search_filters_and_total_follows() {
    let mut roll = roll();
    assert_eq!(roll.total(), 3);

    roll.set_search("100");
    assert_eq!(roll.total(), 2);

    roll.set_search("sipil");
    assert_eq!(roll.filtered()[0].student_id, "1002");

    roll.set_search("2021");
    assert_eq!(roll.total(), 1);
}

#[test]
fn test_csv_quotes_special_fields() {
    let csv = roll().to_csv();
    let lines: Vec<_> = csv.split('\n').collect();

    assert_eq!(lines[0], "Nama,NIM,Jurusan,Angkatan");
    assert_eq!(lines[1], "Maria,1001,Informatika,2022");
    assert_eq!(lines[2], "\"Simanjuntak, Yosua\",1002,\"Teknik \"\"Sipil\"\"\",2021");
    assert_eq!(lines.len(), 4);
    assert!(!csv.ends_with('\n'));
}

#[test]
fn test_csv_exports_filtered_list_only() {
    let mut roll = roll();
    roll.set_search("paulus");
    assert_eq!(roll.to_csv(), "Nama,NIM,Jurusan,Angkatan\nPaulus,2001,Informatika,2022");

    roll.set_search("nobody");
    assert_eq!(roll.to_csv(), "Nama,NIM,Jurusan,Angkatan");
}

#[test]
fn test_escape_csv_field() {
    assert_eq!(escape_csv_field("plain"), "plain");
    assert_eq!(escape_csv_field("a\nb"), "\"a\nb\"");
    assert_eq!(escape_csv_field("\""), "\"\"\"\"");
}

#[tokio::test]
async fn test_export_writes_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(VOTER_CSV_FILE_NAME);

    let written = roll().export(&path).await.unwrap();

    assert_eq!(written, 3);
    let content = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(content.starts_with("Nama,NIM,Jurusan,Angkatan\n"));
}

#[tokio::test]
async fn test_load_from_backend() {
    let backend = Arc::new(FakeBackend::new(ElectionStatus::Open));
    backend.add_voter(voter("Maria", "1001")).await.unwrap();

    let roll = VoterRoll::load(backend.as_ref()).await.unwrap();
    assert_eq!(roll.total(), 1);

    backend.fail("list_voters", ErrorCode::ServerError.into());
    assert_eq!(
        VoterRoll::load(backend.as_ref()).await.unwrap_err(),
        MSG_VOTERS_FAILED
    );
}
